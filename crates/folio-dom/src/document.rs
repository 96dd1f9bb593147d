//! Arena document tree
//!
//! The tree owns every node; parents and children refer to each other by
//! [`NodeId`]. Moving a node (for example into a freshly created wrapper)
//! detaches it from its previous parent first, so a node is never reachable
//! from two places.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomError;
use crate::query::Query;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A resolved value of the inline `height` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Length {
    Px(u32),
    Auto,
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(px) => write!(f, "{}px", px),
            Length::Auto => f.write_str("auto"),
        }
    }
}

impl std::str::FromStr for Length {
    type Err = DomError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("auto") {
            return Ok(Length::Auto);
        }
        if value == "0" {
            return Ok(Length::Px(0));
        }

        let number = value
            .strip_suffix("px")
            .ok_or_else(|| DomError::InvalidLength(s.to_string()))?;
        let px: f64 = number
            .trim()
            .parse()
            .map_err(|_| DomError::InvalidLength(s.to_string()))?;
        if !px.is_finite() || px < 0.0 {
            return Err(DomError::InvalidLength(s.to_string()));
        }

        Ok(Length::Px(px.round() as u32))
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    /// Attributes in insertion order, `style` excluded
    attrs: Vec<(String, String)>,
    /// Inline style declarations in insertion order
    style: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            style: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(key, _)| key == name)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn style_property(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(key, _)| key == property)
            .map(|(_, value)| value.as_str())
    }

    pub fn style_declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.style.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn set_attr(&mut self, name: &str, value: &str) {
        if name == "style" {
            self.style = parse_style(value);
            return;
        }
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub(crate) fn remove_attr(&mut self, name: &str) -> bool {
        if name == "style" {
            let had = !self.style.is_empty();
            self.style.clear();
            return had;
        }
        let before = self.attrs.len();
        self.attrs.retain(|(key, _)| key != name);
        self.attrs.len() != before
    }

    fn set_style_property(&mut self, property: &str, value: &str) {
        match self.style.iter_mut().find(|(key, _)| key == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.style.push((property.to_string(), value.to_string())),
        }
    }

    fn remove_style_property(&mut self, property: &str) {
        self.style.retain(|(key, _)| key != property);
    }
}

fn parse_style(text: &str) -> Vec<(String, String)> {
    text.split(';')
        .filter_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();
            (!key.is_empty() && !value.is_empty()).then(|| (key, value.to_string()))
        })
        .collect()
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    active_element: Option<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            active_element: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|node| &node.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        match self.nodes.get_mut(id.0) {
            Some(Node {
                kind: NodeKind::Element(element),
                ..
            }) => Ok(element),
            Some(_) => Err(DomError::NotAnElement(id.0)),
            None => Err(DomError::NodeNotFound(id.0)),
        }
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(DomError::NodeNotFound(id.0))
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::tag)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element children only, in order
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
            .collect()
    }

    /// Ancestors from the parent up to the document root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Descendants of `scope` in document (pre-)order, `scope` excluded
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeKind::Element(Element::new(tag)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Text(text.to_string()))
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.node(parent)?;
        self.node(child)?;

        if matches!(parent_node.kind, NodeKind::Text(_))
            || child == self.root
            || child == parent
            // A leaf cannot be an ancestor of `parent`
            || (!self.children(child).is_empty() && self.is_ancestor_of(child, parent))
        {
            return Err(DomError::HierarchyRequest {
                parent: parent.0,
                child: child.0,
            });
        }

        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Remove a node from its parent; the node and its subtree stay in the arena
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.nodes[parent.0].children.retain(|child| *child != id);
        self.nodes[id.0].parent = None;
    }

    // === Attributes ===

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attr(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id)
            .map(|element| element.has_attr(name))
            .unwrap_or(false)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        self.element_mut(id)?.set_attr(&name.to_ascii_lowercase(), value);
        Ok(())
    }

    /// Returns whether the attribute was present
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<bool> {
        Ok(self.element_mut(id)?.remove_attr(&name.to_ascii_lowercase()))
    }

    // === Class list ===

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id)
            .map(|element| element.has_class(class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        self.toggle_class(id, class, true)
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        self.toggle_class(id, class, false)
    }

    /// Force the class on or off, like `classList.toggle(class, force)`
    pub fn toggle_class(&mut self, id: NodeId, class: &str, on: bool) -> Result<()> {
        let element = self.element_mut(id)?;
        let mut classes: Vec<String> = element.classes().map(str::to_string).collect();
        let present = classes.iter().any(|c| c == class);

        match (on, present) {
            (true, false) => classes.push(class.to_string()),
            (false, true) => classes.retain(|c| c != class),
            _ => return Ok(()),
        }

        if classes.is_empty() {
            element.remove_attr("class");
        } else {
            element.set_attr("class", &classes.join(" "));
        }
        Ok(())
    }

    // === Visibility, focus order and inline style ===

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.has_attribute(id, "hidden")
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> Result<()> {
        if hidden {
            self.set_attribute(id, "hidden", "")
        } else {
            self.remove_attribute(id, "hidden").map(|_| ())
        }
    }

    pub fn tab_index(&self, id: NodeId) -> Option<i32> {
        self.attribute(id, "tabindex")
            .and_then(|value| value.trim().parse().ok())
    }

    pub fn set_tab_index(&mut self, id: NodeId, index: i32) -> Result<()> {
        self.set_attribute(id, "tabindex", &index.to_string())
    }

    pub fn style_property(&self, id: NodeId, property: &str) -> Option<&str> {
        self.element(id)
            .and_then(|element| element.style_property(property))
    }

    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) -> Result<()> {
        self.element_mut(id)?
            .set_style_property(&property.to_ascii_lowercase(), value);
        Ok(())
    }

    pub fn remove_style_property(&mut self, id: NodeId, property: &str) -> Result<()> {
        self.element_mut(id)?
            .remove_style_property(&property.to_ascii_lowercase());
        Ok(())
    }

    /// Inline height, `None` when unset or unparsable
    pub fn height(&self, id: NodeId) -> Option<Length> {
        self.style_property(id, "height")
            .and_then(|value| value.parse().ok())
    }

    pub fn set_height(&mut self, id: NodeId, height: Length) -> Result<()> {
        self.set_style_property(id, "height", &height.to_string())
    }

    // === Focus ===

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    pub fn focus(&mut self, id: NodeId) -> Result<()> {
        self.element_mut(id)?;
        self.active_element = Some(id);
        Ok(())
    }

    pub fn blur(&mut self) {
        self.active_element = None;
    }

    // === Text and queries ===

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.text(node))
            .collect()
    }

    pub fn matches(&self, id: NodeId, query: &Query) -> bool {
        query.matches(self, id)
    }

    /// Every matching element in the document, in document order
    pub fn query_all(&self, query: &Query) -> Vec<NodeId> {
        self.query_all_within(self.root, query)
    }

    /// Matching descendants of `scope`, in document order
    pub fn query_all_within(&self, scope: NodeId, query: &Query) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.matches(*id, query))
            .collect()
    }

    pub fn query_first(&self, query: &Query) -> Option<NodeId> {
        self.query_first_within(self.root, query)
    }

    pub fn query_first_within(&self, scope: NodeId, query: &Query) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| self.matches(*id, query))
    }

    /// Nearest inclusive ancestor matching the query
    pub fn closest(&self, id: NodeId, query: &Query) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|node| self.matches(*node, query))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
