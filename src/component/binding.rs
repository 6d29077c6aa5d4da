//! Declarative field binding
//!
//! A component type declares, once, which tag-site attributes map onto its
//! fields and how each value is coerced. Attributes matching a declared field
//! are "bound"; every other attribute stays an html attribute of the
//! component's element.
//!
//! ```rust
//! use ick_compose::component::FieldSchema;
//! use std::time::Duration;
//!
//! #[derive(Default)]
//! struct Clock {
//!     label: String,
//!     tick: Duration,
//! }
//!
//! let schema = FieldSchema::<Clock>::new()
//!     .text("Label", |c, v| c.label = v)
//!     .duration("Tick", |c, v| c.tick = v);
//!
//! let mut clock = Clock::default();
//! schema.bind(&mut clock, "tick", "1.5s").unwrap();
//! assert_eq!(clock.tick, Duration::from_millis(1500));
//! ```

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Type a bound attribute value is coerced to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Int,
    Duration,
    Bool,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Int => "integer",
            FieldKind::Duration => "duration",
            FieldKind::Bool => "boolean",
        };
        f.write_str(name)
    }
}

/// A coerced attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Duration(Duration),
    Bool(bool),
}

impl FieldKind {
    /// Coerce a raw attribute value, returning the failure reason on error
    pub fn coerce(self, raw: &str) -> Result<FieldValue, String> {
        match self {
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Int => raw
                .trim()
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|e| e.to_string()),
            FieldKind::Duration => parse_duration(raw).map(FieldValue::Duration),
            FieldKind::Bool => {
                let lower = raw.trim().to_lowercase();
                Ok(FieldValue::Bool(!matches!(lower.as_str(), "false" | "0")))
            }
        }
    }
}

/// Attribute value that cannot be coerced to its field type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot bind {value:?} to {kind} field {field:?} of {component}: {reason}")]
pub struct FieldBindingError {
    pub component: String,
    pub field: String,
    pub kind: FieldKind,
    pub value: String,
    pub reason: String,
}

type Setter<C> = Box<dyn Fn(&mut C, FieldValue) + Send + Sync>;

struct Field<C> {
    name: String,
    kind: FieldKind,
    setter: Setter<C>,
}

/// Per-type table of bindable fields
///
/// Field names match attribute names case-insensitively.
pub struct FieldSchema<C> {
    fields: Vec<Field<C>>,
}

impl<C> Default for FieldSchema<C> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<C> fmt::Debug for FieldSchema<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.fields.iter().map(|field| (&field.name, field.kind)))
            .finish()
    }
}

impl<C: 'static> FieldSchema<C> {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    fn with_field(mut self, name: &str, kind: FieldKind, setter: Setter<C>) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            kind,
            setter,
        });
        self
    }

    /// Declare a text field
    pub fn text(self, name: &str, set: impl Fn(&mut C, String) + Send + Sync + 'static) -> Self {
        self.with_field(
            name,
            FieldKind::Text,
            Box::new(move |target, value| {
                if let FieldValue::Text(v) = value {
                    set(target, v)
                }
            }),
        )
    }

    /// Declare an integer field
    pub fn int(self, name: &str, set: impl Fn(&mut C, i64) + Send + Sync + 'static) -> Self {
        self.with_field(
            name,
            FieldKind::Int,
            Box::new(move |target, value| {
                if let FieldValue::Int(v) = value {
                    set(target, v)
                }
            }),
        )
    }

    /// Declare a duration field, written like `300ms`, `1.5h` or `2h45m`
    pub fn duration(
        self,
        name: &str,
        set: impl Fn(&mut C, Duration) + Send + Sync + 'static,
    ) -> Self {
        self.with_field(
            name,
            FieldKind::Duration,
            Box::new(move |target, value| {
                if let FieldValue::Duration(v) = value {
                    set(target, v)
                }
            }),
        )
    }

    /// Declare a boolean field; a bare attribute is true, `false` and `0`
    /// are false
    pub fn boolean(self, name: &str, set: impl Fn(&mut C, bool) + Send + Sync + 'static) -> Self {
        self.with_field(
            name,
            FieldKind::Bool,
            Box::new(move |target, value| {
                if let FieldValue::Bool(v) = value {
                    set(target, v)
                }
            }),
        )
    }

    fn find(&self, name: &str) -> Option<&Field<C>> {
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }

    /// Kind of the field matching an attribute name
    pub fn kind(&self, name: &str) -> Option<FieldKind> {
        self.find(name).map(|field| field.kind)
    }

    /// Declared field names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    /// Bind a raw attribute value onto `target`
    ///
    /// Returns `Ok(false)` when no field matches `name`.
    pub fn bind(&self, target: &mut C, name: &str, raw: &str) -> Result<bool, FieldBindingError> {
        let Some(field) = self.find(name) else {
            return Ok(false);
        };
        let value = field.kind.coerce(raw).map_err(|reason| FieldBindingError {
            component: short_type_name(std::any::type_name::<C>()).to_string(),
            field: field.name.clone(),
            kind: field.kind,
            value: raw.to_string(),
            reason,
        })?;
        (field.setter)(target, value);
        Ok(true)
    }
}

/// Last path segment of a type name, generics removed
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parse a duration such as `300ms`, `-0`, `1.5h` or `2h45m`
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. Every number
/// needs a unit, except a lone `0`. Negative durations are rejected.
pub fn parse_duration(text: &str) -> Result<Duration, String> {
    let mut rest = text.trim();
    if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('-') {
        if stripped == "0" {
            return Ok(Duration::ZERO);
        }
        return Err(format!("negative duration {:?}", text));
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(format!("invalid duration {:?}", text));
    }

    let not_digit = |c: char| !c.is_ascii_digit();
    let out_of_range = || format!("duration {:?} out of range", text);
    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, tail) = rest.split_at(rest.find(not_digit).unwrap_or(rest.len()));
        let (fraction, tail) = match tail.strip_prefix('.') {
            Some(after) => after.split_at(after.find(not_digit).unwrap_or(after.len())),
            None => ("", tail),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(format!("invalid duration {:?}", text));
        }

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            "" => return Err(format!("missing unit in duration {:?}", text)),
            other => return Err(format!("unknown unit {:?} in duration {:?}", other, text)),
        };

        if !whole.is_empty() {
            let whole: u128 = whole.parse().map_err(|_| out_of_range())?;
            total = whole
                .checked_mul(scale)
                .and_then(|v| total.checked_add(v))
                .ok_or_else(out_of_range)?;
        }
        if !fraction.is_empty() {
            // digits past nanosecond precision cannot change the result
            let digits = &fraction[..fraction.len().min(18)];
            let numerator: u128 = digits.parse().map_err(|_| out_of_range())?;
            let denominator = 10u128.pow(digits.len() as u32);
            total = total
                .checked_add(numerator * scale / denominator)
                .ok_or_else(out_of_range)?;
        }
        rest = tail;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| out_of_range())?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}
