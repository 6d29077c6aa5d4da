//! Tag scanner - splits template text into literal runs and embedded tags
//!
//! An embedded tag opens with `<` followed by the reserved prefix and closes
//! with `/>`:
//!
//! ```text
//! Hello <ick-text Content="Bob" hidden tabIndex=1/>!
//! ```
//!
//! The scanner is a hand-written state machine. Literal text is passed through
//! untouched; inside a tag it walks the tag name, then attribute names and
//! values. Any syntax error is fatal: the iterator yields the error and then
//! stops.

use crate::error::{Span, TagSyntaxError};
use crate::html::is_name_char;

/// Closing delimiter of an embedded tag
pub const CLOSE_DELIMITER: &str = "/>";

/// One attribute as written at the tag site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    pub name: String,
    /// Value as found between the delimiters, empty for a boolean attribute
    pub value: String,
}

/// A finalized embedded tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Full tag name, prefix included, as written
    pub name: String,
    /// Attributes in the order they were written
    pub attributes: Vec<RawAttribute>,
    /// Byte range of the whole tag, delimiters included
    pub span: Span,
}

/// A piece of scanned text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text to copy verbatim
    Text(&'a str),
    /// An embedded component tag
    Tag(Tag),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Undecided,
    Quoted(char),
    Unquoted,
}

/// States inside a tag; literal runs are handled by the iterator itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    TagName,
    AttrName,
    AttrValue(Quote),
}

/// Iterator over the tokens of a template text
pub struct Scanner<'a> {
    source: &'a str,
    open: String,
    pos: usize,
    failed: bool,
}

impl<'a> Scanner<'a> {
    /// Create a scanner recognizing tags that start with `<` + `prefix`
    pub fn new(source: &'a str, prefix: &str) -> Self {
        Self {
            source,
            open: format!("<{}", prefix),
            pos: 0,
            failed: false,
        }
    }

    fn is_open_at(&self, at: usize) -> bool {
        self.source[at..].starts_with(&self.open)
    }

    /// Scan a tag whose open delimiter starts at `self.pos`
    fn scan_tag(&mut self) -> Result<Tag, TagSyntaxError> {
        let source = self.source;
        let start = self.pos;
        let name_start = start + 1;
        let suffix_start = start + self.open.len();

        let mut state = State::TagName;
        let mut i = suffix_start;
        let mut name_end = suffix_start;
        let mut attributes = Vec::new();
        // span of the attribute name being read
        let mut pending: Option<Span> = None;
        // attribute waiting for its value
        let mut attr_name = String::new();
        let mut value_start = 0;

        let tag_name = |end: usize| source[name_start..end].to_string();

        loop {
            let rest = &source[i..];
            let Some(c) = rest.chars().next() else {
                return Err(match state {
                    State::AttrValue(Quote::Quoted(_)) => TagSyntaxError::UnterminatedQuote {
                        span: start..i,
                        name: attr_name,
                    },
                    _ => TagSyntaxError::UnterminatedTag {
                        span: start..i,
                        tag: tag_name(name_end),
                    },
                });
            };
            let closing = rest.starts_with(CLOSE_DELIMITER);
            let width = c.len_utf8();

            match state {
                State::TagName => {
                    if c.is_ascii_whitespace() || closing {
                        if name_end == suffix_start {
                            return Err(TagSyntaxError::EmptyTagName { span: start..i + width });
                        }
                        if closing {
                            i += CLOSE_DELIMITER.len();
                            break;
                        }
                        state = State::AttrName;
                        i += width;
                        continue;
                    }
                    if !is_name_char(c, false) {
                        return Err(TagSyntaxError::InvalidTagName {
                            span: start..i + width,
                            fragment: source[name_start..i + width].to_string(),
                        });
                    }
                    i += width;
                    name_end = i;
                }

                State::AttrName => {
                    if c.is_ascii_whitespace() {
                        if let Some(span) = pending.take() {
                            attributes.push(RawAttribute {
                                name: source[span].to_string(),
                                value: String::new(),
                            });
                        }
                        i += width;
                        continue;
                    }
                    if closing {
                        if let Some(span) = pending.take() {
                            attributes.push(RawAttribute {
                                name: source[span].to_string(),
                                value: String::new(),
                            });
                        }
                        i += CLOSE_DELIMITER.len();
                        break;
                    }
                    if c == '=' {
                        let Some(span) = pending.take() else {
                            return Err(TagSyntaxError::MissingAttributeName {
                                span: start..i + width,
                                tag: tag_name(name_end),
                            });
                        };
                        attr_name = source[span].to_string();
                        state = State::AttrValue(Quote::Undecided);
                        i += width;
                        continue;
                    }
                    let first = pending.is_none();
                    if !is_name_char(c, first) {
                        let from = pending.as_ref().map_or(i, |span| span.start);
                        return Err(TagSyntaxError::InvalidAttributeName {
                            span: from..i + width,
                            fragment: source[from..i + width].to_string(),
                        });
                    }
                    pending = Some(match pending {
                        Some(span) => span.start..i + width,
                        None => i..i + width,
                    });
                    i += width;
                }

                State::AttrValue(Quote::Undecided) => {
                    if c.is_ascii_whitespace() {
                        i += width;
                    } else if c == '"' || c == '\'' {
                        state = State::AttrValue(Quote::Quoted(c));
                        i += width;
                        value_start = i;
                    } else if closing {
                        return Err(TagSyntaxError::EmptyValue {
                            span: start..i + CLOSE_DELIMITER.len(),
                            name: attr_name,
                        });
                    } else {
                        // the current character opens the value, read it again
                        state = State::AttrValue(Quote::Unquoted);
                        value_start = i;
                    }
                }

                State::AttrValue(Quote::Quoted(quote)) => {
                    if c == quote {
                        attributes.push(RawAttribute {
                            name: std::mem::take(&mut attr_name),
                            value: source[value_start..i].to_string(),
                        });
                        state = State::AttrName;
                    }
                    i += width;
                }

                State::AttrValue(Quote::Unquoted) => {
                    if c.is_ascii_whitespace() || closing {
                        attributes.push(RawAttribute {
                            name: std::mem::take(&mut attr_name),
                            value: source[value_start..i].to_string(),
                        });
                        state = State::AttrName;
                        if closing {
                            i += CLOSE_DELIMITER.len();
                            break;
                        }
                    }
                    i += width;
                }
            }
        }

        self.pos = i;
        Ok(Tag {
            name: tag_name(name_end),
            attributes,
            span: start..i,
        })
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token<'a>, TagSyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.source.len() {
            return None;
        }

        if self.is_open_at(self.pos) {
            return match self.scan_tag() {
                Ok(tag) => Some(Ok(Token::Tag(tag))),
                Err(err) => {
                    self.failed = true;
                    Some(Err(err))
                }
            };
        }

        // literal run up to the next open delimiter or the end of the text
        let start = self.pos;
        let end = self.source[start..]
            .find(&self.open)
            .map_or(self.source.len(), |at| start + at);
        self.pos = end;
        Some(Ok(Token::Text(&self.source[start..end])))
    }
}

/// Scan a whole text, stopping at the first syntax error
pub fn scan<'a>(source: &'a str, prefix: &str) -> Result<Vec<Token<'a>>, TagSyntaxError> {
    Scanner::new(source, prefix).collect()
}
