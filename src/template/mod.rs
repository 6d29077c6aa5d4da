//! Template executor - the substitution pass run over a body before scanning
//!
//! The composer runs exactly one executor pass per composition level and
//! never looks at how substitution happens. Templates see three values:
//!
//! - `Id`: id of the component being composed
//! - `Me`: the component's own data
//! - `Root`: the data of the enclosing component, or the caller's root data
//!
//! ```rust
//! use ick_compose::template::{MiniJinjaExecutor, TemplateContext, TemplateExecutor};
//! use serde_json::json;
//!
//! let context = TemplateContext::new("ick-card-0", json!({"Title": "Hello"}), json!(null));
//! let html = MiniJinjaExecutor::new()
//!     .execute("<h2 id='{{ Id }}-title'>{{ Me.Title }}</h2>", &context)
//!     .unwrap();
//! assert_eq!(html, "<h2 id='ick-card-0-title'>Hello</h2>");
//! ```

mod jinja;

use serde::Serialize;
use thiserror::Error;

pub use jinja::MiniJinjaExecutor;

/// Substitution pass failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TemplateError {
    message: String,
}

impl TemplateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Data a body template is executed against
///
/// Built fresh for every composition level and serialized with the names the
/// templates use.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateContext {
    pub id: String,
    pub me: serde_json::Value,
    pub root: serde_json::Value,
}

impl TemplateContext {
    pub fn new(id: impl Into<String>, me: serde_json::Value, root: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            me,
            root,
        }
    }
}

/// Executes the substitution syntax of a body template
pub trait TemplateExecutor: Send + Sync {
    /// Resolve `body` against `context`
    fn execute(&self, body: &str, context: &TemplateContext) -> Result<String, TemplateError>;
}

/// Executor returning bodies unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl TemplateExecutor for Verbatim {
    fn execute(&self, body: &str, _context: &TemplateContext) -> Result<String, TemplateError> {
        Ok(body.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_serializes_with_template_names() {
        let context = TemplateContext::new("x-0", json!({"a": 1}), json!("root"));
        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value, json!({"Id": "x-0", "Me": {"a": 1}, "Root": "root"}));
    }

    #[test]
    fn test_verbatim_keeps_markup() {
        let context = TemplateContext::new("x-0", json!(null), json!(null));
        let body = "{{ Id }} <ick-text/>";
        assert_eq!(Verbatim.execute(body, &context).unwrap(), body);
    }
}
