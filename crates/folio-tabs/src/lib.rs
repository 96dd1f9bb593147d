//! Folio Tab Groups
//!
//! A tab group pairs an ordered strip of tabs with a set of panels through a
//! shared id attribute. Selecting a tab fades the visible panel out, then
//! reveals the matching one. Only the active tab is reachable with the Tab
//! key; arrow keys, Home and End move focus and selection together.

mod error;
mod group;
pub mod nav;
mod spec;
mod state;
mod tab;

pub use error::TabError;
pub use group::{Activation, KeyOutcome, TabGroup};
pub use nav::NavTarget;
pub use spec::GroupSpec;
pub use state::SwapState;
pub use tab::{PanelEntry, TabEntry};

pub type Result<T> = std::result::Result<T, TabError>;
