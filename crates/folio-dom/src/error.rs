//! Document error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(usize),

    #[error("Node {0} is not an element")]
    NotAnElement(usize),

    #[error("Cannot insert node {child} into {parent}")]
    HierarchyRequest { parent: usize, child: usize },

    #[error("Invalid query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },

    #[error("Invalid length: {0}")]
    InvalidLength(String),
}
