//! Inline style text

use std::fmt;

/// Inline style accumulator
///
/// No CSS parsing happens here: appended text lands after the existing text
/// and the browser cascade decides which declaration wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style(String);

impl Style {
    /// Create an empty style
    pub fn new() -> Self {
        Self::default()
    }

    /// Append style text
    ///
    /// A `;` separator is inserted when the current text does not already end
    /// with one.
    pub fn push(&mut self, text: &str) -> &mut Self {
        let text = text.trim();
        if text.is_empty() {
            return self;
        }
        if !self.0.is_empty() && !self.0.ends_with(';') {
            self.0.push(';');
        }
        self.0.push_str(text);
        self
    }

    /// The accumulated text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if nothing has been appended
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Style {
    fn from(text: &str) -> Self {
        let mut style = Style::new();
        style.push(text);
        style
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
