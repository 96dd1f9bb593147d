//! Collapsible section error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DisclosureError {
    #[error("Document error: {0}")]
    Dom(#[from] folio_dom::DomError),

    #[error("Invalid motion transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid markup contract: {0}")]
    InvalidMarkup(String),
}
