//! Class set of an html element

use std::fmt;

use indexmap::IndexSet;

use super::attributes::AttributeError;
use super::name::is_valid_name;

/// Distinct class tokens kept in first-insertion order
///
/// Tokens are case sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSet {
    tokens: IndexSet<String>,
}

impl ClassSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whitespace separated token list
    pub fn parse(text: &str) -> Result<Self, AttributeError> {
        let mut set = Self::new();
        set.add_tokens(text.split_whitespace())?;
        Ok(set)
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the set holds no token
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `index` in insertion order
    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get_index(index).map(|s| s.as_str())
    }

    /// Check if a token is in the set
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Add every token of `other` not already present
    pub fn add_classes(&mut self, other: &ClassSet) -> &mut Self {
        for token in &other.tokens {
            if !self.tokens.contains(token) {
                self.tokens.insert(token.clone());
            }
        }
        self
    }

    /// Add tokens, skipping the ones already present
    ///
    /// Fails on the first invalid token; tokens before it are kept.
    pub fn add_tokens<'a>(
        &mut self,
        tokens: impl IntoIterator<Item = &'a str>,
    ) -> Result<&mut Self, AttributeError> {
        for token in tokens {
            let token = token.trim();
            if !is_valid_name(token) {
                return Err(AttributeError::InvalidClass {
                    token: token.to_string(),
                });
            }
            if !self.tokens.contains(token) {
                self.tokens.insert(token.to_string());
            }
        }
        Ok(self)
    }

    /// Remove tokens, ignoring the ones not present
    pub fn remove_tokens<'a>(&mut self, tokens: impl IntoIterator<Item = &'a str>) -> &mut Self {
        for token in tokens {
            self.tokens.shift_remove(token.trim());
        }
        self
    }

    /// Remove `token` if present, add it otherwise
    ///
    /// Returns true if the token is in the set after the call.
    pub fn toggle(&mut self, token: &str) -> Result<bool, AttributeError> {
        if self.tokens.shift_remove(token) {
            return Ok(false);
        }
        self.add_tokens([token])?;
        Ok(true)
    }

    /// Replace `old` by `new` at the same position
    ///
    /// Returns false if `old` is not in the set. When `new` is already
    /// present, `old` is simply removed.
    pub fn replace(&mut self, old: &str, new: &str) -> Result<bool, AttributeError> {
        let new = new.trim();
        if !is_valid_name(new) {
            return Err(AttributeError::InvalidClass {
                token: new.to_string(),
            });
        }
        let Some(index) = self.tokens.get_index_of(old) else {
            return Ok(false);
        };
        if self.tokens.contains(new) {
            self.tokens.shift_remove_index(index);
        } else {
            self.tokens.insert(new.to_string());
            let last = self.tokens.len() - 1;
            self.tokens.move_index(last, index);
            self.tokens.shift_remove_index(index + 1);
        }
        Ok(true)
    }

    /// Iterate over tokens in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|s| s.as_str())
    }
}

impl fmt::Display for ClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(token)?;
        }
        Ok(())
    }
}
