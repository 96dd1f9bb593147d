//! Page configuration

use std::collections::HashSet;

use folio_disclosure::DisclosureMarkup;
use folio_dom::Query;
use folio_tabs::GroupSpec;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::render::TransitionRule;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Time between two rendering frames
    pub frame_interval_ms: u64,
    /// Force-complete an entity still waiting for a completion this long
    /// after its transition began. Unset means wait forever.
    pub stall_timeout_ms: Option<u64>,
    /// Height of one line of text in the headless layout
    pub line_height: u32,
    /// Upper bound on frames run by a single `settle`
    pub settle_frame_limit: usize,
    /// Collapsible section markup
    pub disclosure: DisclosureMarkup,
    /// Tab groups to look for, in initialization order
    pub tab_groups: Vec<GroupSpec>,
    /// Style transitions known to the rendering engine
    pub transitions: Vec<TransitionRule>,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_interval_ms == 0 {
            return Err(CoreError::Config(
                "frame_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.settle_frame_limit == 0 {
            return Err(CoreError::Config(
                "settle_frame_limit must be greater than zero".to_string(),
            ));
        }
        if self.stall_timeout_ms == Some(0) {
            return Err(CoreError::Config(
                "stall_timeout_ms must be greater than zero when set".to_string(),
            ));
        }

        self.disclosure.validate()?;

        let mut names = HashSet::new();
        for group in &self.tab_groups {
            group.validate()?;
            if !names.insert(group.name.as_str()) {
                return Err(CoreError::Config(format!(
                    "duplicate tab group name '{}'",
                    group.name
                )));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let active_class = "is-active";
        let transitions = vec![
            TransitionRule::height(Query::any().with_class("details-content"), 300),
            TransitionRule::opacity(Query::any().with_class("project-panel"), active_class, 200),
            TransitionRule::opacity(Query::any().with_class("skills-panel"), active_class, 200),
        ];

        Self {
            frame_interval_ms: 16,
            stall_timeout_ms: None,
            line_height: 20,
            settle_frame_limit: 10_000,
            disclosure: DisclosureMarkup::default(),
            tab_groups: vec![GroupSpec::projects(), GroupSpec::skills()],
            transitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_interval_ms, 16);
        assert_eq!(config.stall_timeout_ms, None);
        assert_eq!(config.transitions.len(), 3);
        let names: Vec<&str> = config.tab_groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["projects", "skills"]);
    }

    #[test]
    fn test_partial_json() {
        let config = Config::from_json(r#"{ "stall_timeout_ms": 1000, "tab_groups": [] }"#).unwrap();
        assert_eq!(config.stall_timeout_ms, Some(1000));
        assert!(config.tab_groups.is_empty());
        assert_eq!(config.disclosure, DisclosureMarkup::default());
        assert_eq!(config.transitions.len(), 3);
    }

    #[test]
    fn test_json_round_trip() {
        let config = Config::default();
        let json = config.to_json().unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Config::from_json(r#"{ "frame_interval_ms": 0 }"#),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{ "disclosure": { "section": "details >" } }"#),
            Err(CoreError::Serialization(_))
        ));

        let mut config = Config::default();
        config.tab_groups.push(GroupSpec::projects());
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }
}
