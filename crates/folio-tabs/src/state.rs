//! Panel swap state
//!
//! ```text
//! Settled
//!   ↓ activate (a different panel is visible)
//! FadingOut
//!   ↓ opacity transition end on the outgoing panel
//! Settled
//! ```
//!
//! A new activation while fading replaces the incoming panel; the outgoing
//! panel keeps fading and at most one completion is awaited per group.

use folio_dom::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapState {
    /// No completion pending
    #[default]
    Settled,
    /// Waiting for `outgoing` to fade out before revealing `incoming`
    FadingOut {
        outgoing: NodeId,
        incoming: Option<NodeId>,
    },
}

impl SwapState {
    pub fn is_settled(&self) -> bool {
        matches!(self, SwapState::Settled)
    }

    pub fn outgoing(&self) -> Option<NodeId> {
        match self {
            SwapState::Settled => None,
            SwapState::FadingOut { outgoing, .. } => Some(*outgoing),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwapState::Settled => "settled",
            SwapState::FadingOut { .. } => "fading_out",
        }
    }
}

impl std::fmt::Display for SwapState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
