//! Input and rendering event vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::NodeId;

/// Keyboard keys, named after the DOM `KeyboardEvent.key` values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Enter,
    Space,
    Other(String),
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowRight" | "Right" => Key::ArrowRight,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "Home" => Key::Home,
            "End" => Key::End,
            "Enter" => Key::Enter,
            " " | "Spacebar" => Key::Space,
            other => Key::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Key::ArrowRight => "ArrowRight",
            Key::ArrowLeft => "ArrowLeft",
            Key::ArrowUp => "ArrowUp",
            Key::ArrowDown => "ArrowDown",
            Key::Home => "Home",
            Key::End => "End",
            Key::Enter => "Enter",
            Key::Space => " ",
            Key::Other(name) => name,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Space => f.write_str("Space"),
            other => f.write_str(other.name()),
        }
    }
}

/// Style property named by a transition-completion notification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Property {
    Height,
    Opacity,
    Other(String),
}

impl Property {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "height" => Property::Height,
            "opacity" => Property::Opacity,
            other => Property::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Property::Height => "height",
            Property::Opacity => "opacity",
            Property::Other(name) => name,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Property {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Property::from_name(s))
    }
}

impl From<String> for Property {
    fn from(name: String) -> Self {
        Property::from_name(&name)
    }
}

impl From<Property> for String {
    fn from(property: Property) -> Self {
        property.as_str().to_string()
    }
}

/// A finished style transition on `target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEnd {
    pub target: NodeId,
    pub property: Property,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("ArrowRight"), Key::ArrowRight);
        assert_eq!(Key::from_name(" "), Key::Space);
        assert_eq!(Key::from_name("Home"), Key::Home);
        assert_eq!(Key::from_name("Tab"), Key::Other("Tab".to_string()));
        assert_eq!(Key::Space.name(), " ");
        assert_eq!(Key::Space.to_string(), "Space");
    }

    #[test]
    fn test_property_names() {
        assert_eq!(Property::from_name("height"), Property::Height);
        assert_eq!(Property::from_name("Opacity"), Property::Opacity);
        assert_eq!(
            Property::from_name("padding-top"),
            Property::Other("padding-top".to_string())
        );
        assert_eq!(Property::Other("transform".to_string()).to_string(), "transform");
        assert_eq!("height".parse::<Property>().unwrap(), Property::Height);
    }
}
