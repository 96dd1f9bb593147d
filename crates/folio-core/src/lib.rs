//! Folio Core
//!
//! Coordination layer for the portfolio page behaviors. A [`Page`] owns the
//! document and every controller; input events, rendering frames and
//! transition completions all flow through it on a virtual clock, so a whole
//! interaction can be replayed deterministically.

mod config;
mod error;
mod handle;
mod page;
mod render;
mod runtime;

pub use config::Config;
pub use error::CoreError;
pub use handle::PageHandle;
pub use page::{Dispatch, Page};
pub use render::{Animated, RenderEngine, RunningTransition, TransitionRule};

// Re-export controller crates
pub use folio_disclosure::{DisclosureError, DisclosureMarkup, Motion, Section, Stage, Toggle};
pub use folio_dom::{
    Document, DomError, Host, Key, Length, NodeId, Property, Query, TransitionEnd,
};
pub use folio_tabs::{Activation, GroupSpec, KeyOutcome, SwapState, TabError, TabGroup};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
