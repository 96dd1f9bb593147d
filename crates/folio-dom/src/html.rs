//! HTML loading and serialization
//!
//! Parsing is delegated to `scraper` (html5ever), then the parsed tree is
//! copied into the arena so it can be mutated freely.

use scraper::Html;

use crate::document::{Document, Element, NodeId, NodeKind};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

impl Document {
    /// Parse a full HTML document; comments and doctypes are dropped
    pub fn parse_html(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = Document::new();
        let root = doc.root();

        // Explicit stack so deeply nested markup cannot overflow the call stack
        let mut stack = vec![(root, parsed.tree.root())];
        while let Some((parent, node)) = stack.pop() {
            let id = match node.value() {
                scraper::Node::Document => parent,
                scraper::Node::Element(element) => {
                    let id = doc.create_element(element.name());
                    for (name, value) in element.attrs() {
                        // Fresh element, cannot fail
                        let _ = doc.set_attribute(id, name, value);
                    }
                    id
                }
                scraper::Node::Text(text) => doc.create_text(text),
                _ => continue,
            };

            if id != parent && doc.append_child(parent, id).is_err() {
                continue;
            }
            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((id, child));
            }
        }

        tracing::debug!(nodes = doc.len(), "Parsed HTML document");
        doc
    }

    /// Serialize a node and its subtree back to HTML
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![Chunk::Node(id)];

        while let Some(chunk) = stack.pop() {
            let id = match chunk {
                Chunk::Node(id) => id,
                Chunk::Close(tag) => {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                    continue;
                }
            };

            match self.kind(id) {
                Some(NodeKind::Document) => {}
                Some(NodeKind::Text(text)) => {
                    out.push_str(&escape_text(text));
                    continue;
                }
                Some(NodeKind::Element(element)) => {
                    write_open_tag(element, &mut out);
                    if VOID_ELEMENTS.contains(&element.tag()) {
                        continue;
                    }
                    stack.push(Chunk::Close(element.tag()));
                }
                None => continue,
            }
            stack.extend(self.children(id).iter().rev().map(|child| Chunk::Node(*child)));
        }

        out
    }
}

enum Chunk<'a> {
    Node(NodeId),
    Close(&'a str),
}

fn write_open_tag(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(element.tag());
    for (name, value) in element.attrs() {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
    }

    let style = element
        .style_declarations()
        .map(|(k, v)| format!("{}: {};", k, v))
        .collect::<Vec<_>>()
        .join(" ");
    if !style.is_empty() {
        out.push_str(" style=\"");
        out.push_str(&escape_attr(&style));
        out.push('"');
    }
    out.push('>');
}

fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(input: &str) -> String {
    escape_text(input).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Query;

    #[test]
    fn test_parse_preserves_order() {
        let doc = Document::parse_html(
            r#"<ul><li data-id="a">A</li><li data-id="b">B</li><li data-id="c">C</li></ul>"#,
        );
        let items = doc.query_all(&Query::parse("li[data-id]").unwrap());
        let ids: Vec<_> = items
            .iter()
            .map(|id| doc.attribute(*id, "data-id").unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_keeps_boolean_and_style_attributes() {
        let doc = Document::parse_html(
            r#"<details open><summary>Title</summary><div style="height: 10px">x</div></details>"#,
        );
        let details = doc.query_first(&Query::tag("details")).unwrap();
        assert!(doc.has_attribute(details, "open"));

        let div = doc.query_first(&Query::tag("div")).unwrap();
        assert_eq!(doc.style_property(div, "height"), Some("10px"));
    }

    #[test]
    fn test_outer_html() {
        let doc = Document::parse_html(
            r#"<section class="panel"><p>a &amp; b</p><br></section>"#,
        );
        let section = doc.query_first(&Query::tag("section")).unwrap();
        assert_eq!(
            doc.outer_html(section),
            r#"<section class="panel"><p>a &amp; b</p><br></section>"#
        );
    }

    #[test]
    fn test_deeply_nested_round_trip() {
        let depth = 20_000;
        let html = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let doc = Document::parse_html(&html);

        let outer = doc.query_first(&Query::tag("div")).unwrap();
        assert_eq!(doc.outer_html(outer), html);
        assert_eq!(doc.query_all(&Query::tag("div")).len(), depth);
    }
}
