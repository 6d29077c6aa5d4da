//! Attribute set of an html element
//!
//! Attributes are kept sorted by name so that serialization is deterministic.
//! A boolean attribute is stored with an empty value.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::name::is_valid_name;

/// Errors raised while parsing or updating attributes and classes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// Name does not follow the html name grammar
    #[error("attribute name {name:?} is not valid")]
    InvalidName { name: String },

    /// Class token does not follow the html name grammar
    #[error("class token {token:?} is not valid")]
    InvalidClass { token: String },

    /// `=` found with no attribute name before it
    #[error("'=' found without attribute name in {text:?}")]
    MissingName { text: String },

    /// Quoted value never closed
    #[error("unterminated quoted value for attribute {name:?}")]
    UnterminatedQuote { name: String },

    /// Value holding both quote characters, which no delimiter can enclose
    #[error("ambiguous quotes in the value of attribute {name:?}: {value:?}")]
    AmbiguousQuotes { name: String, value: String },
}

/// Reject a value that cannot be delimited by either quote character
fn check_quotes(name: &str, value: &str) -> Result<(), AttributeError> {
    if value.contains('\'') && value.contains('"') {
        return Err(AttributeError::AmbiguousQuotes {
            name: name.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// A set of attributes, unique by name and ordered by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    map: BTreeMap<String, String>,
}

impl AttributeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a space separated attribute list
    ///
    /// Each attribute is either a bare name (boolean attribute) or a
    /// `name=value` pair. Values may be delimited by `'` or `"`, in which case
    /// they can contain spaces. Spaces around `=` are allowed.
    ///
    /// ```rust
    /// use ick_compose::html::AttributeSet;
    ///
    /// let attrs = AttributeSet::parse("zero=0 bool=False one=1 two three=3").unwrap();
    /// assert_eq!(attrs.to_string(), "bool=false one=1 three=3 two zero=0");
    /// ```
    pub fn parse(text: &str) -> Result<Self, AttributeError> {
        let mut set = Self::new();
        let mut rest = text;
        loop {
            let (names_part, after) = match rest.split_once('=') {
                Some((names, after)) => (names, Some(after)),
                None => (rest, None),
            };

            let names: Vec<&str> = names_part.split_whitespace().collect();
            for name in &names {
                if !is_valid_name(name) {
                    return Err(AttributeError::InvalidName {
                        name: (*name).to_string(),
                    });
                }
                set.map.insert((*name).to_string(), String::new());
            }

            let Some(after) = after else {
                break;
            };
            let Some(name) = names.last() else {
                return Err(AttributeError::MissingName {
                    text: text.to_string(),
                });
            };

            let after = after.trim_start();
            let (value, remaining) = match after.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let inner = &after[1..];
                    match inner.find(quote) {
                        Some(end) => (&inner[..end], &inner[end + 1..]),
                        None => {
                            return Err(AttributeError::UnterminatedQuote {
                                name: (*name).to_string(),
                            })
                        }
                    }
                }
                _ => match after.find(char::is_whitespace) {
                    Some(end) => (&after[..end], &after[end..]),
                    None => (after, ""),
                },
            };
            check_quotes(name, value)?;
            set.map.insert((*name).to_string(), value.to_string());
            rest = remaining;
        }
        Ok(set)
    }

    /// Get the value of an attribute, `Some("")` for a boolean attribute
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(|s| s.as_str())
    }

    /// Check if an attribute is present
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Set an attribute, replacing any existing value
    ///
    /// The name is trimmed and validated. Surrounding spaces and quote
    /// delimiters are removed from the value. An empty value sets a boolean
    /// attribute.
    pub fn set(&mut self, name: &str, value: &str) -> Result<&mut Self, AttributeError> {
        let name = name.trim();
        if !is_valid_name(name) {
            return Err(AttributeError::InvalidName {
                name: name.to_string(),
            });
        }
        let value = value.trim_matches(|c| c == ' ' || c == '"' || c == '\'');
        check_quotes(name, value)?;
        self.map.insert(name.to_string(), value.to_string());
        Ok(self)
    }

    /// Insert an already validated name with a raw value
    pub(crate) fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.map.insert(name.into(), value.into());
    }

    /// Remove an attribute, returning its value if it was present
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.map.remove(name)
    }

    /// Copy every attribute of `other` into this set
    ///
    /// Existing attributes are only replaced when `overwrite` is true.
    pub fn merge(&mut self, other: &AttributeSet, overwrite: bool) -> &mut Self {
        for (name, value) in &other.map {
            if overwrite || !self.map.contains_key(name) {
                self.map.insert(name.clone(), value.clone());
            }
        }
        self
    }

    /// Returns true if the attribute is present and its value is neither
    /// `false` nor `0`
    pub fn is_true(&self, name: &str) -> bool {
        match self.get(name) {
            Some(value) => !matches!(value.to_lowercase().as_str(), "false" | "0"),
            None => false,
        }
    }

    /// Toggle a boolean attribute
    ///
    /// Returns true if the attribute is present after the call.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.map.remove(name).is_some() {
            false
        } else {
            self.map.insert(name.to_string(), String::new());
            true
        }
    }

    /// Subset made of the `data-*` attributes
    pub fn data(&self) -> AttributeSet {
        let map = self
            .map
            .iter()
            .filter(|(name, _)| name.len() > 5 && name.starts_with("data-"))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        AttributeSet { map }
    }

    /// The `tabIndex` attribute, 0 when absent or not a number
    pub fn tab_index(&self) -> i64 {
        self.get("tabIndex")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// Set the `tabIndex` attribute
    pub fn set_tab_index(&mut self, index: i64) -> &mut Self {
        self.map.insert("tabIndex".to_string(), index.to_string());
        self
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the set holds no attribute
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Check that every value can be serialized inside quotes
    ///
    /// Values inserted without validation, such as tag-site attributes, are
    /// checked here before the set is written into markup.
    pub fn validate(&self) -> Result<(), AttributeError> {
        self.map
            .iter()
            .try_for_each(|(name, value)| check_quotes(name, value))
    }

    /// Iterate over `(name, value)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl fmt::Display for AttributeSet {
    /// Serialize as `name`, `name=value` or `name='value'`, sorted by name
    ///
    /// A `true` value is written as the bare name, `false` is lower-cased and
    /// numbers are left unquoted. Other values are quoted with `'`, or `"`
    /// when the value contains a `'`. A value holding both quotes, which
    /// [`validate`](Self::validate) rejects, has its `"` written as `&quot;`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.map.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(name)?;
            let lower = value.to_lowercase();
            if value.is_empty() || lower == "true" {
                continue;
            }
            if lower == "false" {
                write!(f, "={}", lower)?;
            } else if value.parse::<f64>().is_ok() {
                write!(f, "={}", value)?;
            } else if !value.contains('\'') {
                write!(f, "='{}'", value)?;
            } else if !value.contains('"') {
                write!(f, "=\"{}\"", value)?;
            } else {
                write!(f, "=\"{}\"", value.replace('"', "&quot;"))?;
            }
        }
        Ok(())
    }
}
