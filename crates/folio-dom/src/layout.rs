//! Layout measurement
//!
//! Headless stand-in for the rendering engine's box model. Only block
//! heights are modeled because that is all the controllers measure.

use std::collections::HashMap;

use crate::document::{Document, Length, NodeId, NodeKind};

pub trait Layout: Send + Sync {
    /// Natural (content) height of `node`, ignoring its own inline height.
    /// This is what `scrollHeight` reports.
    fn natural_height(&self, doc: &Document, node: NodeId) -> u32;
}

/// Stacks every rendered child vertically.
///
/// Text contributes one line per non-blank source line. A descendant with an
/// explicit pixel height contributes exactly that height.
#[derive(Debug, Clone)]
pub struct BlockLayout {
    pub line_height: u32,
}

impl BlockLayout {
    pub fn new(line_height: u32) -> Self {
        Self { line_height }
    }

    /// Outer height of `node` when it does not depend on its content
    fn fixed_height(&self, doc: &Document, node: NodeId) -> Option<u32> {
        match doc.kind(node) {
            Some(NodeKind::Text(text)) => {
                let lines = text.lines().filter(|line| !line.trim().is_empty()).count();
                let lines = u32::try_from(lines).unwrap_or(u32::MAX);
                Some(lines.saturating_mul(self.line_height))
            }
            Some(NodeKind::Element(_)) => {
                if doc.is_hidden(node) {
                    return Some(0);
                }
                match doc.height(node) {
                    Some(Length::Px(px)) => Some(px),
                    Some(Length::Auto) | None => None,
                }
            }
            _ => Some(0),
        }
    }
}

impl Default for BlockLayout {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Layout for BlockLayout {
    fn natural_height(&self, doc: &Document, node: NodeId) -> u32 {
        // Pre-order collect every box sized by its content, then sum in
        // reverse so children are measured before their parents
        let mut order = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(
                boxed_children(doc, id).filter(|child| self.fixed_height(doc, *child).is_none()),
            );
        }

        let mut content: HashMap<NodeId, u32> = HashMap::with_capacity(order.len());
        for id in order.into_iter().rev() {
            let total = boxed_children(doc, id)
                .map(|child| {
                    self.fixed_height(doc, child)
                        .or_else(|| content.get(&child).copied())
                        .unwrap_or(0)
                })
                .fold(0u32, u32::saturating_add);
            content.insert(id, total);
        }

        content.get(&node).copied().unwrap_or(0)
    }
}

/// Children that generate a box inside `node`
fn boxed_children(doc: &Document, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    let closed_details = is_closed_details(doc, node);
    doc.children(node)
        .iter()
        .copied()
        .filter(move |child| !closed_details || doc.tag_name(*child) == Some("summary"))
}

fn is_closed_details(doc: &Document, node: NodeId) -> bool {
    doc.tag_name(node) == Some("details") && !doc.has_attribute(node, "open")
}

/// Whether `node` would generate a box: not hidden itself, no hidden
/// ancestor, and not inside the body of a closed `details`.
pub fn is_rendered(doc: &Document, node: NodeId) -> bool {
    if !doc.contains(node) || doc.is_hidden(node) {
        return false;
    }

    let mut child = node;
    for ancestor in doc.ancestors(node) {
        if doc.is_hidden(ancestor) {
            return false;
        }
        if is_closed_details(doc, ancestor) && doc.tag_name(child) != Some("summary") {
            return false;
        }
        child = ancestor;
    }

    // Detached subtrees end at a node other than the document root
    child == doc.root()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Query;

    #[test]
    fn test_text_lines() {
        let doc = Document::parse_html("<div id=\"c\"><p>one</p><p>two\nthree</p>\n  </div>");
        let div = doc.query_first(&Query::tag("div")).unwrap();
        assert_eq!(BlockLayout::new(10).natural_height(&doc, div), 30);
    }

    #[test]
    fn test_explicit_heights_and_hidden() {
        let mut doc = Document::parse_html("<div><p>a</p><p>b</p><p hidden>c</p></div>");
        let div = doc.query_first(&Query::tag("div")).unwrap();
        let first = doc.query_first(&Query::tag("p")).unwrap();
        doc.set_height(first, Length::Px(0)).unwrap();

        assert_eq!(BlockLayout::new(10).natural_height(&doc, div), 10);
        // Own height is ignored when measuring content
        doc.set_height(div, Length::Px(3)).unwrap();
        assert_eq!(BlockLayout::new(10).natural_height(&doc, div), 10);
    }

    #[test]
    fn test_closed_details_render_summary_only() {
        let mut doc = Document::parse_html(
            "<details><summary>Title</summary><p>body</p></details>",
        );
        let details = doc.query_first(&Query::tag("details")).unwrap();
        let summary = doc.query_first(&Query::tag("summary")).unwrap();
        let body = doc.query_first(&Query::tag("p")).unwrap();
        let layout = BlockLayout::new(10);

        assert_eq!(layout.natural_height(&doc, details), 10);
        assert!(is_rendered(&doc, summary));
        assert!(!is_rendered(&doc, body));

        doc.set_attribute(details, "open", "").unwrap();
        assert_eq!(layout.natural_height(&doc, details), 20);
        assert!(is_rendered(&doc, body));
    }

    #[test]
    fn test_detached_nodes_are_not_rendered() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        assert!(!is_rendered(&doc, div));
        doc.append_child(doc.root(), div).unwrap();
        assert!(is_rendered(&doc, div));
    }

    #[test]
    fn test_deeply_nested_content() {
        let mut doc = Document::new();
        let mut parent = doc.root();
        for _ in 0..60_000 {
            let div = doc.create_element("div");
            doc.append_child(parent, div).unwrap();
            parent = div;
        }
        let text = doc.create_text("leaf");
        doc.append_child(parent, text).unwrap();

        let outer = doc.children(doc.root())[0];
        assert_eq!(BlockLayout::new(10).natural_height(&doc, outer), 10);
        assert!(is_rendered(&doc, parent));
    }

    #[test]
    fn test_heights_saturate() {
        let mut doc = Document::parse_html("<div><p>a</p><p>b\nc</p></div>");
        let div = doc.query_first(&Query::tag("div")).unwrap();
        assert_eq!(BlockLayout::new(u32::MAX).natural_height(&doc, div), u32::MAX);

        let first = doc.query_first(&Query::tag("p")).unwrap();
        doc.set_height(first, Length::Px(u32::MAX)).unwrap();
        assert_eq!(BlockLayout::new(1).natural_height(&doc, div), u32::MAX);
    }
}
