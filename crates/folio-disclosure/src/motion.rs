//! Section motion state machine
//!
//! ```text
//! Idle
//!   ↓ toggle
//! Opening / Closing (AwaitingFrame)
//!   ↓ next frame
//! Opening / Closing (AwaitingTransition)
//!   ↓ height transition end
//! Idle
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Start value written, waiting for the next frame to write the end value
    AwaitingFrame,
    /// End value written, waiting for the height transition to finish
    AwaitingTransition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    Idle,
    Opening(Stage),
    Closing(Stage),
}

impl Motion {
    pub fn can_transition_to(&self, target: Motion) -> bool {
        use Stage::*;

        match (self, target) {
            (Motion::Idle, Motion::Opening(AwaitingFrame)) => true,
            (Motion::Idle, Motion::Closing(AwaitingFrame)) => true,
            (Motion::Opening(AwaitingFrame), Motion::Opening(AwaitingTransition)) => true,
            (Motion::Closing(AwaitingFrame), Motion::Closing(AwaitingTransition)) => true,
            // Completion, or a forced completion from either stage
            (Motion::Opening(_), Motion::Idle) => true,
            (Motion::Closing(_), Motion::Idle) => true,
            _ => false,
        }
    }

    pub fn is_animating(&self) -> bool {
        !matches!(self, Motion::Idle)
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Motion::Idle => None,
            Motion::Opening(stage) | Motion::Closing(stage) => Some(*stage),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Motion::Idle => "idle",
            Motion::Opening(Stage::AwaitingFrame) => "opening:frame",
            Motion::Opening(Stage::AwaitingTransition) => "opening:transition",
            Motion::Closing(Stage::AwaitingFrame) => "closing:frame",
            Motion::Closing(Stage::AwaitingTransition) => "closing:transition",
        }
    }
}

impl std::fmt::Display for Motion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(Motion::Idle.can_transition_to(Motion::Opening(Stage::AwaitingFrame)));
        assert!(Motion::Idle.can_transition_to(Motion::Closing(Stage::AwaitingFrame)));
        assert!(Motion::Opening(Stage::AwaitingFrame)
            .can_transition_to(Motion::Opening(Stage::AwaitingTransition)));
        assert!(Motion::Closing(Stage::AwaitingTransition).can_transition_to(Motion::Idle));
        assert!(Motion::Opening(Stage::AwaitingFrame).can_transition_to(Motion::Idle));
    }

    #[test]
    fn test_invalid_transitions() {
        // A second toggle can never start while one is in flight
        assert!(!Motion::Opening(Stage::AwaitingTransition)
            .can_transition_to(Motion::Closing(Stage::AwaitingFrame)));
        // Stages only move forward
        assert!(!Motion::Opening(Stage::AwaitingTransition)
            .can_transition_to(Motion::Opening(Stage::AwaitingFrame)));
        assert!(!Motion::Idle.can_transition_to(Motion::Idle));
        assert!(!Motion::Idle.can_transition_to(Motion::Opening(Stage::AwaitingTransition)));
    }

    #[test]
    fn test_animating_flag() {
        assert!(!Motion::Idle.is_animating());
        assert!(Motion::Closing(Stage::AwaitingFrame).is_animating());
        assert_eq!(Motion::Idle.stage(), None);
    }
}
