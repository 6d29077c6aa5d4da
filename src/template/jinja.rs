//! MiniJinja-backed executor

use minijinja::{Environment, UndefinedBehavior, Value};

use super::{TemplateContext, TemplateError, TemplateExecutor};

impl From<minijinja::Error> for TemplateError {
    fn from(err: minijinja::Error) -> Self {
        TemplateError::new(err.to_string())
    }
}

/// Jinja-syntax executor
///
/// Bodies are rendered without auto-escaping: the result is markup that is
/// scanned for embedded components afterwards.
pub struct MiniJinjaExecutor {
    env: Environment<'static>,
}

impl MiniJinjaExecutor {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Fail on undefined variables instead of rendering them empty
    pub fn with_strict_undefined(mut self, strict: bool) -> Self {
        self.env.set_undefined_behavior(if strict {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });
        self
    }

    /// The underlying environment, to register filters or functions
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl Default for MiniJinjaExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns true if the text holds any jinja delimiter
fn has_syntax(body: &str) -> bool {
    body.contains("{{") || body.contains("{%") || body.contains("{#")
}

impl TemplateExecutor for MiniJinjaExecutor {
    fn execute(&self, body: &str, context: &TemplateContext) -> Result<String, TemplateError> {
        if !has_syntax(body) {
            return Ok(body.to_string());
        }
        Ok(self.env.render_str(body, Value::from_serialize(context))?)
    }
}
