//! Components declared as data instead of code

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Composable, Container, FieldSchema, Setup};

/// A component whose container, body and fields come from a declaration
///
/// Every declared field is a text field exposed to the body template as
/// `Me.<field>`; unbound fields read as an empty string.
#[derive(Debug, Clone)]
pub struct DeclaredComponent {
    container: Arc<Container>,
    body: Arc<str>,
    values: BTreeMap<String, String>,
    setup: Setup,
}

impl DeclaredComponent {
    /// Create an instance with every field set to an empty string
    pub fn new<'a>(
        container: Arc<Container>,
        body: Arc<str>,
        fields: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            container,
            body,
            values: fields
                .into_iter()
                .map(|name| (name.to_string(), String::new()))
                .collect(),
            setup: Setup::default(),
        }
    }

    /// Schema binding each field name as text
    pub fn schema<'a>(fields: impl IntoIterator<Item = &'a str>) -> FieldSchema<Self> {
        fields
            .into_iter()
            .fold(FieldSchema::<Self>::new(), |schema, name| {
                let key = name.to_string();
                schema.text(name, move |component, value| {
                    component.values.insert(key.clone(), value);
                })
            })
    }

    /// Current value of a field
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(|v| v.as_str())
    }
}

impl Composable for DeclaredComponent {
    fn container(&self, _id: &str) -> Container {
        (*self.container).clone()
    }

    fn body(&self) -> String {
        self.body.to_string()
    }

    fn setup(&self) -> &Setup {
        &self.setup
    }

    fn setup_mut(&mut self) -> &mut Setup {
        &mut self.setup
    }

    fn template_data(&self) -> serde_json::Value {
        self.values
            .iter()
            .map(|(name, value)| (name.clone(), serde_json::Value::from(value.as_str())))
            .collect::<serde_json::Map<_, _>>()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> DeclaredComponent {
        DeclaredComponent::new(
            Arc::new(Container::new("div").with_classes("card")),
            Arc::from("<h2>{{ Me.title }}</h2>"),
            ["title", "subtitle"],
        )
    }

    #[test]
    fn test_fields_start_empty() {
        let component = card();
        assert_eq!(component.value("title"), Some(""));
        assert_eq!(component.template_data()["subtitle"], "");
    }

    #[test]
    fn test_schema_binds_values() {
        let schema = DeclaredComponent::schema(["title", "subtitle"]);
        let mut component = card();
        assert!(schema.bind(&mut component, "Title", "Hello").unwrap());
        assert_eq!(component.value("title"), Some("Hello"));
        assert_eq!(component.template_data()["title"], "Hello");
        assert!(!schema.bind(&mut component, "other", "x").unwrap());
    }

    #[test]
    fn test_container_and_body() {
        let component = card();
        assert_eq!(component.container("id").classes, "card");
        assert_eq!(component.body(), "<h2>{{ Me.title }}</h2>");
    }
}
