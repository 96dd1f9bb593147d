//! Tab group error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabError {
    #[error("Document error: {0}")]
    Dom(#[from] folio_dom::DomError),

    #[error("Invalid group spec '{group}': {reason}")]
    InvalidSpec { group: String, reason: String },
}
