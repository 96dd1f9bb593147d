//! Folio Document Layer
//!
//! Headless document tree that the page controllers read and mutate.
//! Nodes live in an arena and are addressed by [`NodeId`]; element discovery
//! goes through [`Query`] and always yields document order.
//!
//! Controllers never talk to a renderer directly. Everything they need from
//! the environment (measuring, layout flushes, next-frame callbacks) goes
//! through the [`Host`] trait.

mod document;
mod error;
mod event;
mod host;
mod html;
mod layout;
mod query;

pub use document::{Document, Element, Length, NodeId, NodeKind};
pub use error::DomError;
pub use event::{Key, Property, TransitionEnd};
pub use host::{Host, RecordingHost};
pub use layout::{is_rendered, BlockLayout, Layout};
pub use query::Query;

pub type Result<T> = std::result::Result<T, DomError>;
