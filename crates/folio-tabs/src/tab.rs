//! Tab and panel entries

use folio_dom::{Document, NodeId};
use serde::{Deserialize, Serialize};

/// A tab in the strip. Tabs whose id attribute is missing or empty keep
/// their place in traversal order but cannot be selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabEntry {
    pub node: NodeId,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelEntry {
    pub node: NodeId,
    pub id: Option<String>,
}

impl TabEntry {
    pub fn read(doc: &Document, node: NodeId, id_attribute: &str) -> Self {
        Self {
            node,
            id: read_id(doc, node, id_attribute),
        }
    }
}

impl PanelEntry {
    pub fn read(doc: &Document, node: NodeId, id_attribute: &str) -> Self {
        Self {
            node,
            id: read_id(doc, node, id_attribute),
        }
    }
}

pub(crate) fn read_id(doc: &Document, node: NodeId, id_attribute: &str) -> Option<String> {
    doc.attribute(node, id_attribute)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
