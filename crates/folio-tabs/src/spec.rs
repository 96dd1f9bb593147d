//! Markup contract for a tab group

use folio_dom::Query;
use serde::{Deserialize, Serialize};

use crate::error::TabError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Group name used in logs and lookups
    pub name: String,
    /// Tab elements, in traversal order
    pub tabs: Query,
    /// Panel elements
    pub panels: Query,
    /// Attribute carrying the id shared by a tab and its panel
    pub id_attribute: String,
    /// Tab already marked active by the markup, if any
    #[serde(default)]
    pub initial: Option<Query>,
    /// Class marking the active tab and the fully shown panel
    #[serde(default = "default_active_class")]
    pub active_class: String,
}

fn default_active_class() -> String {
    "is-active".to_string()
}

impl GroupSpec {
    /// Project cards: `.menu-pill[data-project-id]` tabs over `.project-panel`s
    pub fn projects() -> Self {
        Self {
            name: "projects".to_string(),
            tabs: Query::any().with_class("menu-pill").with_attr("data-project-id"),
            panels: Query::any().with_class("project-panel"),
            id_attribute: "data-project-id".to_string(),
            initial: Some(
                Query::any()
                    .with_class("menu-pill")
                    .with_class("is-active")
                    .with_attr("data-project-id"),
            ),
            active_class: default_active_class(),
        }
    }

    /// Skill categories: `.menu-pill[data-skill-id]` tabs over `.skills-panel`s
    pub fn skills() -> Self {
        Self {
            name: "skills".to_string(),
            tabs: Query::any().with_class("menu-pill").with_attr("data-skill-id"),
            panels: Query::any()
                .with_class("skills-panel")
                .with_attr("data-skill-id"),
            id_attribute: "data-skill-id".to_string(),
            initial: Some(
                Query::any()
                    .with_class("skills-category-pill")
                    .with_class("is-active")
                    .with_attr("data-skill-id"),
            ),
            active_class: default_active_class(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| TabError::InvalidSpec {
            group: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.id_attribute.trim().is_empty() || self.id_attribute.contains(char::is_whitespace)
        {
            return Err(invalid("id_attribute must be a single attribute name"));
        }
        if self.active_class.trim().is_empty() || self.active_class.contains(char::is_whitespace)
        {
            return Err(invalid("active_class must be a single class name"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_specs() {
        let projects = GroupSpec::projects();
        assert!(projects.validate().is_ok());
        assert_eq!(projects.tabs.to_string(), ".menu-pill[data-project-id]");
        assert_eq!(projects.panels.to_string(), ".project-panel");

        let skills = GroupSpec::skills();
        assert!(skills.validate().is_ok());
        assert_eq!(
            skills.initial.unwrap().to_string(),
            ".skills-category-pill.is-active[data-skill-id]"
        );
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let spec: GroupSpec = serde_json::from_str(
            r#"{
                "name": "talks",
                "tabs": ".talk-tab[data-talk-id]",
                "panels": ".talk-panel[data-talk-id]",
                "id_attribute": "data-talk-id"
            }"#,
        )
        .unwrap();
        assert_eq!(spec.active_class, "is-active");
        assert!(spec.initial.is_none());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_invalid_spec() {
        let spec = GroupSpec {
            id_attribute: String::new(),
            ..GroupSpec::projects()
        };
        assert!(spec.validate().is_err());
    }
}
