//! Folio Collapsible Sections
//!
//! Replaces the native `details` toggle with a height animation:
//! ```text
//! Idle ──toggle──> Opening(frame) ──frame──> Opening(transition) ──height end──> Idle
//! Idle ──toggle──> Closing(frame) ──frame──> Closing(transition) ──height end──> Idle
//! ```
//! Toggles that arrive while a section is not idle are dropped, never queued.

mod error;
mod markup;
mod motion;
mod section;

pub use error::DisclosureError;
pub use markup::DisclosureMarkup;
pub use motion::{Motion, Stage};
pub use section::{Section, Toggle};

pub type Result<T> = std::result::Result<T, DisclosureError>;
