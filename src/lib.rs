//! ick-compose - expands custom component tags embedded in html text
//!
//! Components are registered by name in a [`ComponentRegistry`]. Their body
//! templates are executed, then scanned for embedded `<ick-.../>` tags which
//! are instantiated, bound and composed recursively into plain html.
//!
//! # Example
//!
//! ```rust
//! use ick_compose::{compose_fragment, ComponentRegistry};
//!
//! let registry = ComponentRegistry::standard();
//! let composition = compose_fragment("Hello <ick-text Content='Bob'/>!", &registry).unwrap();
//! assert_eq!(composition.html, "Hello <span id='ick-text-0'>Bob</span>!");
//! ```

pub mod component;
pub mod composer;
pub mod config;
pub mod error;
pub mod html;
pub mod registry;
pub mod scanner;
pub mod template;

pub use component::{Component, Composable, Container, FieldSchema, Setup};
pub use composer::{Composer, Composition, Instance, MAX_DEPTH};
pub use config::{Config, ConfigError};
pub use error::{ComposeError, ComposeFailure, TagSyntaxError};
pub use registry::{ComponentRegistry, RegistryError};

use serde::Deserialize;

/// Configuration of a composition
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Nesting bound; composing at this depth fails
    pub max_depth: usize,
    /// Fail on embedded tags naming no registered component
    pub strict: bool,
    /// Fail on undefined template variables
    pub strict_undefined: bool,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            strict: false,
            strict_undefined: false,
        }
    }
}

impl ComposeConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enable or disable strict mode for unregistered components
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_strict_undefined(mut self, strict: bool) -> Self {
        self.strict_undefined = strict;
        self
    }
}

/// Compose a component with default configuration and no root data
///
/// # Example
///
/// ```rust
/// use ick_compose::{compose, component::Text, ComponentRegistry};
///
/// let registry = ComponentRegistry::standard();
/// let composition = compose(&Text::new("<ick-text Content=nested/>"), &registry).unwrap();
/// assert_eq!(
///     composition.html,
///     "<span id='ick-text-0'><span id='ick-text-1'>nested</span></span>"
/// );
/// ```
pub fn compose(
    component: &dyn Composable,
    registry: &ComponentRegistry,
) -> Result<Composition, ComposeFailure> {
    compose_with_config(component, registry, ComposeConfig::default())
}

/// Compose a component with custom configuration
pub fn compose_with_config(
    component: &dyn Composable,
    registry: &ComponentRegistry,
    config: ComposeConfig,
) -> Result<Composition, ComposeFailure> {
    Composer::new(registry, config).compose(component, &serde_json::Value::Null)
}

/// Expand the component tags of a text with default configuration
pub fn compose_fragment(
    text: &str,
    registry: &ComponentRegistry,
) -> Result<Composition, ComposeFailure> {
    Composer::new(registry, ComposeConfig::default())
        .compose_fragment(text, &serde_json::Value::Null)
}
