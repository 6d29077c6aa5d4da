//! Components: the capability every composable type provides
//!
//! A component describes the element wrapping it (the [`Container`]), a body
//! template, and the overrides set on the instance before rendering
//! ([`Setup`]). Types registered by name also declare a [`FieldSchema`] so
//! that tag-site attributes can be bound onto their fields.
//!
//! # Example
//!
//! ```rust
//! use ick_compose::component::{Component, Composable, Container, FieldSchema, Setup};
//!
//! #[derive(Default)]
//! struct Badge {
//!     label: String,
//!     count: i64,
//!     setup: Setup,
//! }
//!
//! impl Composable for Badge {
//!     fn container(&self, _id: &str) -> Container {
//!         Container::new("span").with_classes("badge")
//!     }
//!
//!     fn body(&self) -> String {
//!         format!("{} ({})", self.label, self.count)
//!     }
//!
//!     fn setup(&self) -> &Setup {
//!         &self.setup
//!     }
//!
//!     fn setup_mut(&mut self) -> &mut Setup {
//!         &mut self.setup
//!     }
//! }
//!
//! impl Component for Badge {
//!     fn fields() -> FieldSchema<Self> {
//!         FieldSchema::<Self>::new()
//!             .text("Label", |b, v| b.label = v)
//!             .int("Count", |b, v| b.count = v)
//!     }
//! }
//! ```

mod binding;
mod declared;
mod text;

use std::any::Any;

use crate::html::{AttributeSet, ClassSet, Style};

pub use binding::{parse_duration, FieldBindingError, FieldKind, FieldSchema, FieldValue};
pub use declared::DeclaredComponent;
pub use text::Text;

pub(crate) use binding::short_type_name;

/// Access to the concrete type behind a `dyn Composable`
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Full type name of the concrete type
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Metadata of the element wrapping a component
///
/// Classes, attributes and style are given in their html text form and are
/// parsed when the opening tag is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub tag: String,
    pub classes: String,
    pub attributes: String,
    pub style: String,
}

impl Default for Container {
    fn default() -> Self {
        Self::new("div")
    }
}

impl Container {
    /// Create a container with no default classes, attributes nor style
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: String::new(),
            attributes: String::new(),
            style: String::new(),
        }
    }

    /// Set the default classes, space separated
    pub fn with_classes(mut self, classes: impl Into<String>) -> Self {
        self.classes = classes.into();
        self
    }

    /// Set the default attributes, e.g. `hidden tabIndex=2`
    pub fn with_attributes(mut self, attributes: impl Into<String>) -> Self {
        self.attributes = attributes.into();
        self
    }

    /// Set the default inline style
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }
}

/// Overrides a component sets on itself, or receives from its tag site,
/// before being rendered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Setup {
    /// Forced id, never replaced by a generated one
    pub id: Option<String>,
    pub classes: ClassSet,
    pub attributes: AttributeSet,
    pub style: Style,
}

impl Setup {
    /// Force the id of the component
    pub fn force_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = Some(id.into());
        self
    }
}

/// Capability set required to compose a component
pub trait Composable: AsAny + Send {
    /// Container metadata for the element wrapping the component
    fn container(&self, id: &str) -> Container;

    /// Body template, executed then scanned for embedded components
    fn body(&self) -> String;

    fn setup(&self) -> &Setup;

    fn setup_mut(&mut self) -> &mut Setup;

    /// Value exposed to the body template as `Me`
    fn template_data(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// A composable type that can be registered and instantiated by name
pub trait Component: Composable + Default {
    /// Fields bindable from tag-site attributes
    fn fields() -> FieldSchema<Self> {
        FieldSchema::new()
    }
}
