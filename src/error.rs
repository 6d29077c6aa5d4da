//! Error types for tag scanning and composition

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::component::FieldBindingError;
use crate::html::AttributeError;
use crate::template::TemplateError;

/// Byte range in scanned text
pub type Span = std::ops::Range<usize>;

/// Malformed embedded component tag
///
/// Scanning stops at the first syntax error; nothing is emitted for the tag
/// being scanned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagSyntaxError {
    #[error("tag found without name")]
    EmptyTagName { span: Span },

    #[error("invalid character found in tag name: {fragment:?}")]
    InvalidTagName { span: Span, fragment: String },

    #[error("invalid character found in attribute name: {fragment:?}")]
    InvalidAttributeName { span: Span, fragment: String },

    #[error("'=' found without attribute name in tag {tag:?}")]
    MissingAttributeName { span: Span, tag: String },

    #[error("attribute {name:?} with empty value")]
    EmptyValue { span: Span, name: String },

    #[error("unterminated quoted value for attribute {name:?}")]
    UnterminatedQuote { span: Span, name: String },

    #[error("tag {tag:?} is not closed with '/>'")]
    UnterminatedTag { span: Span, tag: String },
}

impl TagSyntaxError {
    /// Byte range of the offending text
    pub fn span(&self) -> &Span {
        match self {
            TagSyntaxError::EmptyTagName { span }
            | TagSyntaxError::InvalidTagName { span, .. }
            | TagSyntaxError::InvalidAttributeName { span, .. }
            | TagSyntaxError::MissingAttributeName { span, .. }
            | TagSyntaxError::EmptyValue { span, .. }
            | TagSyntaxError::UnterminatedQuote { span, .. }
            | TagSyntaxError::UnterminatedTag { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    ///
    /// `source` must be the text the scanner ran over.
    pub fn format(&self, source: &str, filename: &str) -> String {
        let message = self.to_string();
        let span = char_span(source, self.span());

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(&message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => message,
        }
    }
}

/// Errors that can occur while composing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// Malformed embedded tag in the executed body of a component
    #[error("{error}")]
    TagSyntax {
        error: TagSyntaxError,
        /// Text the scanner ran over
        text: String,
    },

    #[error("template of {id} failed: {source}")]
    TemplateExecution { id: String, source: TemplateError },

    /// Embedded tag naming no registered component, strict mode only
    #[error("unable to unfold unregistered {name} component")]
    UnregisteredComponent { name: String },

    #[error("maximum composition depth {max} reached at depth {depth}")]
    RecursionLimit { depth: usize, max: usize },

    #[error(transparent)]
    FieldBinding(#[from] FieldBindingError),

    /// Container default attributes or classes that cannot be parsed
    #[error("invalid container of {id}: {source}")]
    Container { id: String, source: AttributeError },
}

impl ComposeError {
    /// Render the error for a terminal
    ///
    /// Tag syntax errors are shown with the scanned text as context.
    pub fn report(&self, filename: &str) -> String {
        match self {
            ComposeError::TagSyntax { error, text } => error.format(text, filename),
            other => format!("Error: {}", other),
        }
    }
}

/// A failed composition: the error and the output built before it occurred
///
/// The partial output is never rolled back; callers decide whether it is
/// usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error}")]
pub struct ComposeFailure {
    pub error: ComposeError,
    pub partial: String,
}

impl ComposeFailure {
    pub fn new(error: ComposeError, partial: impl Into<String>) -> Self {
        Self {
            error,
            partial: partial.into(),
        }
    }
}

/// Convert a byte span into the char span ariadne expects
fn char_span(source: &str, span: &Span) -> Span {
    let clamp = |at: usize| {
        let mut at = at.min(source.len());
        while !source.is_char_boundary(at) {
            at -= 1;
        }
        source[..at].chars().count()
    };
    clamp(span.start)..clamp(span.end)
}
