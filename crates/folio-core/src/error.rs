//! Core error types

use folio_dom::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Document error: {0}")]
    Dom(#[from] folio_dom::DomError),

    #[error("Tab group error: {0}")]
    Tab(#[from] folio_tabs::TabError),

    #[error("Collapsible section error: {0}")]
    Disclosure(#[from] folio_disclosure::DisclosureError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Node {0} is not part of this page")]
    UnknownNode(NodeId),

    #[error("Page did not settle within {0} frames")]
    SettleLimit(usize),
}
