//! Capability queries
//!
//! A [`Query`] is a selector list: one or more comma-separated chains of
//! compound selectors joined by descendant (whitespace) or child (`>`)
//! combinators, e.g. `#projects .menu-pill[data-project-id], details > p`.
//! A compound is an optional tag name (or `*`) followed by any number of
//! `#id`, `.class`, `[attr]` and `[attr=value]` conditions. Sibling
//! combinators and pseudo-classes are not supported.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::{Document, Element, NodeId};
use crate::error::DomError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrMatch {
    Present(String),
    Equals(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn parse(source: &str) -> std::result::Result<Self, String> {
        let mut compound = Compound::default();
        let mut chars = source.chars().peekable();

        if chars.peek() == Some(&'*') {
            chars.next();
        } else if chars.peek().is_some_and(|c| is_ident_char(*c)) {
            compound.tag = Some(take_ident(&mut chars).to_ascii_lowercase());
        }

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    let class = take_ident(&mut chars);
                    if class.is_empty() {
                        return Err("expected class name after '.'".to_string());
                    }
                    compound.classes.push(class);
                }
                '#' => {
                    let id = take_ident(&mut chars);
                    if id.is_empty() {
                        return Err("expected id after '#'".to_string());
                    }
                    if compound.id.as_ref().is_some_and(|existing| *existing != id) {
                        return Err("conflicting ids in one compound".to_string());
                    }
                    compound.id = Some(id);
                }
                '[' => {
                    let name = take_ident(&mut chars).to_ascii_lowercase();
                    if name.is_empty() {
                        return Err("expected attribute name after '['".to_string());
                    }
                    match chars.next() {
                        Some(']') => compound.attrs.push(AttrMatch::Present(name)),
                        Some('=') => {
                            let value = take_value(&mut chars)
                                .ok_or_else(|| "unterminated attribute value".to_string())?;
                            if chars.next() != Some(']') {
                                return Err("expected ']'".to_string());
                            }
                            compound.attrs.push(AttrMatch::Equals(name, value));
                        }
                        _ => return Err("expected ']' or '='".to_string()),
                    }
                }
                other => return Err(format!("unsupported character '{}'", other)),
            }
        }

        Ok(compound)
    }

    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if element.tag() != tag {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if element.attr("id") != Some(id.as_str()) {
                return false;
            }
        }

        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }

        self.attrs.iter().all(|attr| match attr {
            AttrMatch::Present(name) => element.has_attr(name),
            AttrMatch::Equals(name, value) => element.attr(name) == Some(value.as_str()),
        })
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => f.write_str(tag)?,
            None if self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty() => {
                f.write_str("*")?
            }
            None => {}
        }
        if let Some(id) = &self.id {
            write!(f, "#{}", id)?;
        }
        for class in &self.classes {
            write!(f, ".{}", class)?;
        }
        for attr in &self.attrs {
            match attr {
                AttrMatch::Present(name) => write!(f, "[{}]", name)?,
                AttrMatch::Equals(name, value) => write!(f, "[{}=\"{}\"]", name, value)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    compound: Compound,
    /// Relation to the step on its left; `None` for the leftmost step
    combinator: Option<Combinator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Compound(String),
    Child,
    Comma,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Query {
    /// Alternatives of a selector list; each is a left-to-right chain
    groups: Vec<Vec<Step>>,
}

impl Query {
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: &str| DomError::InvalidQuery {
            query: input.to_string(),
            reason: reason.to_string(),
        };

        let tokens = tokenize(input).map_err(invalid)?;

        let mut groups = Vec::new();
        let mut steps: Vec<Step> = Vec::new();
        let mut pending: Option<Combinator> = None;
        for token in tokens.into_iter().chain(std::iter::once(Token::Comma)) {
            match token {
                Token::Compound(text) => {
                    let compound = Compound::parse(&text).map_err(|reason| invalid(&reason))?;
                    let combinator = if steps.is_empty() {
                        None
                    } else {
                        Some(pending.take().unwrap_or(Combinator::Descendant))
                    };
                    steps.push(Step {
                        compound,
                        combinator,
                    });
                }
                Token::Child => {
                    if steps.is_empty() || pending.is_some() {
                        return Err(invalid("unexpected '>'"));
                    }
                    pending = Some(Combinator::Child);
                }
                Token::Comma => {
                    if pending.is_some() {
                        return Err(invalid("selector ends with '>'"));
                    }
                    if steps.is_empty() {
                        return Err(invalid("empty selector"));
                    }
                    groups.push(std::mem::take(&mut steps));
                }
            }
        }

        Ok(Query { groups })
    }

    fn single(compound: Compound) -> Self {
        Self {
            groups: vec![vec![Step {
                compound,
                combinator: None,
            }]],
        }
    }

    /// Query for a bare tag name
    pub fn tag(name: &str) -> Self {
        Self::single(Compound {
            tag: Some(name.to_ascii_lowercase()),
            ..Compound::default()
        })
    }

    /// Query matching any element
    pub fn any() -> Self {
        Self::single(Compound::default())
    }

    /// Same query, additionally requiring `class` on the matched element
    pub fn with_class(mut self, class: &str) -> Self {
        for subject in self.subjects_mut() {
            subject.classes.push(class.to_string());
        }
        self
    }

    /// Same query, additionally requiring the attribute on the matched element
    pub fn with_attr(mut self, name: &str) -> Self {
        for subject in self.subjects_mut() {
            subject.attrs.push(AttrMatch::Present(name.to_ascii_lowercase()));
        }
        self
    }

    fn subjects_mut(&mut self) -> impl Iterator<Item = &mut Compound> {
        self.groups
            .iter_mut()
            .filter_map(|steps| steps.last_mut())
            .map(|step| &mut step.compound)
    }

    /// Whether element `id` of `doc` matches any alternative of the list
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.groups.iter().any(|steps| matches_chain(doc, id, steps))
    }
}

/// Match right to left: the last step against `id`, earlier steps against
/// its ancestors. Recursion depth is bounded by the chain length.
fn matches_chain(doc: &Document, id: NodeId, steps: &[Step]) -> bool {
    let Some((last, rest)) = steps.split_last() else {
        return false;
    };
    if !doc.element(id).is_some_and(|element| last.compound.matches(element)) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }

    match last.combinator.unwrap_or(Combinator::Descendant) {
        Combinator::Child => doc
            .parent(id)
            .is_some_and(|parent| matches_chain(doc, parent, rest)),
        Combinator::Descendant => doc
            .ancestors(id)
            .any(|ancestor| matches_chain(doc, ancestor, rest)),
    }
}

/// Split selector text into compounds and top-level punctuation. Brackets
/// and quoted attribute values are kept intact.
fn tokenize(input: &str) -> std::result::Result<Vec<Token>, &'static str> {
    fn flush(tokens: &mut Vec<Token>, current: &mut String) {
        if !current.is_empty() {
            tokens.push(Token::Compound(std::mem::take(current)));
        }
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        if let Some(open) = quote {
            current.push(c);
            if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' if in_brackets => {
                quote = Some(c);
                current.push(c);
            }
            '[' if !in_brackets => {
                in_brackets = true;
                current.push(c);
            }
            ']' if in_brackets => {
                in_brackets = false;
                current.push(c);
            }
            _ if in_brackets => current.push(c),
            '>' => {
                flush(&mut tokens, &mut current);
                tokens.push(Token::Child);
            }
            ',' => {
                flush(&mut tokens, &mut current);
                tokens.push(Token::Comma);
            }
            c if c.is_whitespace() => flush(&mut tokens, &mut current),
            _ => current.push(c),
        }
    }

    if quote.is_some() {
        return Err("unterminated attribute value");
    }
    if in_brackets {
        return Err("expected ']'");
    }
    flush(&mut tokens, &mut current);
    Ok(tokens)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(c) = chars.peek().copied() {
        if !is_ident_char(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

fn take_value(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    match chars.peek().copied() {
        Some(quote @ ('"' | '\'')) => {
            chars.next();
            let mut out = String::new();
            for c in chars.by_ref() {
                if c == quote {
                    return Some(out);
                }
                out.push(c);
            }
            None
        }
        Some(_) => {
            let value = take_ident(chars);
            (!value.is_empty()).then_some(value)
        }
        None => None,
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, steps) in self.groups.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            for step in steps {
                match step.combinator {
                    Some(Combinator::Descendant) => f.write_str(" ")?,
                    Some(Combinator::Child) => f.write_str(" > ")?,
                    None => {}
                }
                write!(f, "{}", step.compound)?;
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for Query {
    type Err = DomError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Query::parse(s)
    }
}

impl TryFrom<String> for Query {
    type Error = DomError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Query::parse(&value)
    }
}

impl From<Query> for String {
    fn from(query: Query) -> Self {
        query.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    const NAV: &str = r#"
        <section id="projects">
          <nav>
            <button class="menu-pill is-active" data-project-id="atlas">Atlas</button>
          </nav>
        </section>
        <section id="skills">
          <button class="menu-pill" data-skill-id="rust">Rust</button>
        </section>
    "#;

    fn find(doc: &Document, selector: &str) -> Vec<NodeId> {
        doc.query_all(&Query::parse(selector).unwrap())
    }

    #[test]
    fn test_parse_compound() {
        let query = Query::parse(".menu-pill.is-active[data-project-id]").unwrap();
        assert_eq!(query.to_string(), ".menu-pill.is-active[data-project-id]");

        let query = Query::parse("details").unwrap();
        assert_eq!(query, Query::tag("details"));

        let query = Query::parse("div[role='tab']").unwrap();
        assert_eq!(query.to_string(), "div[role=\"tab\"]");

        let query = Query::parse("section#projects").unwrap();
        assert_eq!(query.to_string(), "section#projects");
    }

    #[test]
    fn test_parse_chains_and_lists() {
        let query = Query::parse("#projects   .menu-pill").unwrap();
        assert_eq!(query.to_string(), "#projects .menu-pill");

        let query = Query::parse("details>p").unwrap();
        assert_eq!(query.to_string(), "details > p");

        let query = Query::parse("details, .faq").unwrap();
        assert_eq!(query.to_string(), "details, .faq");

        // Separators inside attribute values are literal
        let query = Query::parse("[data-label='a, b > c']").unwrap();
        assert_eq!(query.to_string(), "[data-label=\"a, b > c\"]");
    }

    #[test]
    fn test_parse_errors() {
        assert!(Query::parse("").is_err());
        assert!(Query::parse("   ").is_err());
        assert!(Query::parse(".").is_err());
        assert!(Query::parse("#").is_err());
        assert!(Query::parse("[data-x").is_err());
        assert!(Query::parse("[data-x='open").is_err());
        assert!(Query::parse("details >").is_err());
        assert!(Query::parse("> p").is_err());
        assert!(Query::parse("div > > p").is_err());
        assert!(Query::parse("details,").is_err());
        assert!(Query::parse("a, , b").is_err());
        assert!(Query::parse("li + li").is_err());
        assert!(Query::parse("a:hover").is_err());
    }

    #[test]
    fn test_matching() {
        let mut doc = Document::new();
        let pill = doc.create_element("button");
        doc.append_child(doc.root(), pill).unwrap();
        doc.set_attribute(pill, "class", "menu-pill is-active").unwrap();
        doc.set_attribute(pill, "data-project-id", "atlas").unwrap();

        assert!(doc.matches(pill, &Query::parse(".menu-pill[data-project-id]").unwrap()));
        assert!(doc.matches(pill, &Query::parse("button.is-active").unwrap()));
        assert!(doc.matches(pill, &Query::parse("[data-project-id=atlas]").unwrap()));
        assert!(doc.matches(pill, &Query::parse("*").unwrap()));
        assert!(doc.matches(pill, &Query::any().with_class("menu-pill")));
        assert!(!doc.matches(pill, &Query::parse("[data-skill-id]").unwrap()));
        assert!(!doc.matches(pill, &Query::parse("a.menu-pill").unwrap()));
        assert!(!doc.matches(doc.root(), &Query::any()));
    }

    #[test]
    fn test_descendant_and_child_combinators() {
        let doc = Document::parse_html(NAV);
        let atlas = find(&doc, "[data-project-id=atlas]");
        let rust = find(&doc, "[data-skill-id=rust]");

        assert_eq!(find(&doc, "#projects .menu-pill"), atlas);
        assert_eq!(find(&doc, "section#skills > .menu-pill"), rust);
        assert_eq!(find(&doc, "#projects nav > button"), atlas);
        // The pill sits under nav, not directly under the section
        assert!(find(&doc, "#projects > .menu-pill").is_empty());
        assert!(find(&doc, "#skills nav .menu-pill").is_empty());
    }

    #[test]
    fn test_descendant_backtracks_past_nearest_ancestor() {
        let doc = Document::parse_html(
            r#"<div class="outer"><div class="inner"><span><p class="leaf">x</p></span></div></div>"#,
        );
        let leaf = find(&doc, ".leaf");
        // Nearest div ancestor is .inner, whose parent is a div
        assert_eq!(find(&doc, "div > div .leaf"), leaf);
        assert_eq!(find(&doc, ".outer > .inner span > p"), leaf);
        assert!(find(&doc, ".outer > span .leaf").is_empty());
    }

    #[test]
    fn test_selector_list_keeps_document_order() {
        let doc = Document::parse_html(NAV);
        let both = find(&doc, "[data-skill-id], [data-project-id]");
        let mut expected = find(&doc, "[data-project-id]");
        expected.extend(find(&doc, "[data-skill-id]"));
        assert_eq!(both, expected);
    }

    #[test]
    fn test_builders_extend_every_alternative() {
        let doc = Document::parse_html(NAV);
        let query = Query::parse("#projects button, #skills button")
            .unwrap()
            .with_class("is-active");
        assert_eq!(query.to_string(), "#projects button.is-active, #skills button.is-active");
        assert_eq!(doc.query_all(&query), find(&doc, "[data-project-id=atlas]"));
    }

    #[test]
    fn test_serde_as_string() {
        let query: Query = serde_json::from_str("\".project-panel\"").unwrap();
        assert_eq!(query, Query::parse(".project-panel").unwrap());
        assert_eq!(serde_json::to_string(&query).unwrap(), "\".project-panel\"");

        let query: Query = serde_json::from_str("\"#projects .menu-pill\"").unwrap();
        assert_eq!(serde_json::to_string(&query).unwrap(), "\"#projects .menu-pill\"");
    }
}
