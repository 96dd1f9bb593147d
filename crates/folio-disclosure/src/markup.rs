//! Markup contract for collapsible sections

use folio_dom::Query;
use serde::{Deserialize, Serialize};

use crate::error::DisclosureError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisclosureMarkup {
    /// Elements that become animated sections
    pub section: Query,
    /// Trigger inside each section; sections without one are skipped
    pub header: Query,
    /// Tag of the generated content wrapper
    pub wrapper_tag: String,
    /// Class given to the generated content wrapper
    pub wrapper_class: String,
    /// Presence marker for the open state
    pub open_attribute: String,
    /// Mirror of the animating guard
    pub animating_attribute: String,
}

impl DisclosureMarkup {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("wrapper_tag", &self.wrapper_tag),
            ("wrapper_class", &self.wrapper_class),
            ("open_attribute", &self.open_attribute),
            ("animating_attribute", &self.animating_attribute),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() || value.contains(char::is_whitespace) {
                return Err(DisclosureError::InvalidMarkup(format!(
                    "{} must be a single non-empty token, got '{}'",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for DisclosureMarkup {
    fn default() -> Self {
        Self {
            section: Query::tag("details"),
            header: Query::tag("summary"),
            wrapper_tag: "div".to_string(),
            wrapper_class: "details-content".to_string(),
            open_attribute: "open".to_string(),
            animating_attribute: "data-animating".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DisclosureMarkup::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_blank_tokens() {
        let markup = DisclosureMarkup {
            wrapper_class: "two classes".to_string(),
            ..Default::default()
        };
        assert!(markup.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let markup: DisclosureMarkup =
            serde_json::from_str(r#"{ "section": ".faq", "wrapper_class": "faq-body" }"#).unwrap();
        assert_eq!(markup.section, Query::parse(".faq").unwrap());
        assert_eq!(markup.header, Query::tag("summary"));
        assert_eq!(markup.wrapper_class, "faq-body");
    }
}
