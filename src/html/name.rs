//! HTML name grammar shared by tag names, attribute names and class tokens
//!
//! The first character of a name is drawn from a narrower set than the
//! characters that follow it: digits, `-`, `.` and a few combining ranges are
//! only allowed after the first position.

/// Ranges allowed at any position, including the first one
const START_RANGES: &[(char, char)] = &[
    ('a', 'z'),
    ('A', 'Z'),
    ('_', '_'),
    (':', ':'),
    ('\u{C0}', '\u{D6}'),
    ('\u{D8}', '\u{F6}'),
    ('\u{F8}', '\u{2FF}'),
    ('\u{370}', '\u{37D}'),
    ('\u{37F}', '\u{1FFF}'),
    ('\u{200C}', '\u{200D}'),
    ('\u{2070}', '\u{218F}'),
    ('\u{2C00}', '\u{2FEF}'),
    ('\u{3001}', '\u{D7FF}'),
    ('\u{F900}', '\u{FDCF}'),
    ('\u{FDF0}', '\u{FFFD}'),
    ('\u{10000}', '\u{EFFFF}'),
];

/// Extra ranges allowed after the first position
const CONTINUE_RANGES: &[(char, char)] = &[
    ('-', '-'),
    ('.', '.'),
    ('0', '9'),
    ('\u{B7}', '\u{B7}'),
    ('\u{300}', '\u{36F}'),
    ('\u{203F}', '\u{2040}'),
];

fn in_ranges(ranges: &[(char, char)], c: char) -> bool {
    ranges.iter().any(|&(from, to)| c >= from && c <= to)
}

/// Check a single character against the name grammar
///
/// `first` selects the stricter rule applied to the leading character.
pub fn is_name_char(c: char, first: bool) -> bool {
    if in_ranges(START_RANGES, c) {
        return true;
    }
    !first && in_ranges(CONTINUE_RANGES, c)
}

/// Returns true if `name` is a non-empty, valid HTML name
///
/// The name must already be trimmed.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_char(first, true) => chars.all(|c| is_name_char(c, false)),
        _ => false,
    }
}
