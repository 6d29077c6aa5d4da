//! Built-in text component

use serde_json::json;

use super::{Component, Composable, Container, FieldSchema, Setup};

/// An inline `span` whose body is its `Content`
///
/// Registered as `ick-text` in the standard registry:
///
/// ```text
/// Hello <ick-text Content="Bob"/>
/// ```
#[derive(Debug, Clone, Default)]
pub struct Text {
    pub content: String,
    setup: Setup,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            setup: Setup::default(),
        }
    }
}

impl Composable for Text {
    fn container(&self, _id: &str) -> Container {
        Container::new("span")
    }

    fn body(&self) -> String {
        self.content.clone()
    }

    fn setup(&self) -> &Setup {
        &self.setup
    }

    fn setup_mut(&mut self) -> &mut Setup {
        &mut self.setup
    }

    fn template_data(&self) -> serde_json::Value {
        json!({ "Content": self.content })
    }
}

impl Component for Text {
    fn fields() -> FieldSchema<Self> {
        FieldSchema::<Self>::new().text("Content", |text, value| text.content = value)
    }
}
