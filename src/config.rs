//! Configuration file support
//!
//! A configuration file is TOML with an optional `[compose]` table and any
//! number of declared components:
//!
//! ```toml
//! [compose]
//! max_depth = 8
//! strict = true
//!
//! [[component]]
//! name = "ick-card"
//! tag = "article"
//! classes = "card"
//! fields = ["title"]
//! body = "<h2>{{ Me.title }}</h2>"
//! css = ".card { border: 1px solid; }"
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::component::{Container, DeclaredComponent};
use crate::html::{AttributeError, AttributeSet, ClassSet};
use crate::registry::{ComponentRegistry, RegistryError};
use crate::ComposeConfig;

/// Errors that can occur when loading a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to register component: {0}")]
    Registry(#[from] RegistryError),
    #[error("Invalid container of component {name}: {source}")]
    InvalidContainer {
        name: String,
        source: AttributeError,
    },
}

/// A component declared in the configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComponentDecl {
    pub name: String,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub classes: String,
    #[serde(default)]
    pub attributes: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub css: String,
    /// Field names, each bound as text
    #[serde(default)]
    pub fields: Vec<String>,
}

fn default_tag() -> String {
    "div".to_string()
}

impl ComponentDecl {
    fn container(&self) -> Result<Container, ConfigError> {
        let invalid = |source| ConfigError::InvalidContainer {
            name: self.name.clone(),
            source,
        };
        AttributeSet::parse(&self.attributes).map_err(invalid)?;
        ClassSet::parse(&self.classes).map_err(invalid)?;
        Ok(Container::new(self.tag.as_str())
            .with_classes(self.classes.as_str())
            .with_attributes(self.attributes.as_str())
            .with_style(self.style.as_str()))
    }
}

/// Contents of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub compose: ComposeConfig,
    #[serde(default, rename = "component")]
    pub components: Vec<ComponentDecl>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Build a registry holding the built-in and the declared components
    pub fn registry(&self) -> Result<ComponentRegistry, ConfigError> {
        let mut registry = ComponentRegistry::standard();
        for decl in &self.components {
            let container = Arc::new(decl.container()?);
            let body: Arc<str> = Arc::from(decl.body.as_str());
            let fields = decl.fields.clone();
            let schema = DeclaredComponent::schema(decl.fields.iter().map(|f| f.as_str()));
            registry.register_with(
                &decl.name,
                &decl.css,
                move || {
                    DeclaredComponent::new(
                        container.clone(),
                        body.clone(),
                        fields.iter().map(|f| f.as_str()),
                    )
                },
                schema,
            )?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[compose]
max_depth = 4
strict = true

[[component]]
name = "ick-card"
tag = "article"
classes = "card"
attributes = "role=note"
fields = ["title"]
body = "<h2>{{ Me.title }}</h2>"
css = ".card { border: 1px solid; }"

[[component]]
name = "ick-divider"
tag = "hr"
"#;

    #[test]
    fn test_parse_config() {
        let config = Config::from_str(CONFIG).expect("Should parse");
        assert_eq!(config.compose.max_depth, 4);
        assert!(config.compose.strict);
        assert!(!config.compose.strict_undefined);
        assert_eq!(config.components.len(), 2);

        let card = &config.components[0];
        assert_eq!(card.tag, "article");
        assert_eq!(card.fields, vec!["title".to_string()]);
        assert_eq!(config.components[1].body, "");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").expect("Should parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.compose.max_depth, crate::MAX_DEPTH);
    }

    #[test]
    fn test_default_tag_is_div() {
        let config = Config::from_str("[[component]]\nname = \"ick-box\"\n").unwrap();
        assert_eq!(config.components[0].tag, "div");
    }

    #[test]
    fn test_registry_holds_declared_components() {
        let registry = Config::from_str(CONFIG).unwrap().registry().unwrap();
        assert_eq!(registry.names(), vec!["ick-card", "ick-divider", "ick-text"]);
        let card = registry.lookup("ick-card").unwrap();
        assert_eq!(card.css(), Some(".card { border: 1px solid; }"));
        assert_eq!(registry.lookup("ick-divider").unwrap().css(), None);
    }

    #[test]
    fn test_registry_rejects_unprefixed_name() {
        let config = Config::from_str("[[component]]\nname = \"card\"\n").unwrap();
        assert!(matches!(
            config.registry(),
            Err(ConfigError::Registry(RegistryError::MissingPrefix { .. }))
        ));
    }

    #[test]
    fn test_registry_rejects_invalid_container() {
        let config =
            Config::from_str("[[component]]\nname = \"ick-x\"\nclasses = \"a b#c\"\n").unwrap();
        assert!(matches!(
            config.registry(),
            Err(ConfigError::InvalidContainer { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = Config::from_str("this is not valid toml {{{{");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
