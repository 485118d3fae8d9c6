//! Text-level helpers: escaping, character filtering and numeric canonicalization.

use std::borrow::Cow;

/// Escape the five XML metacharacters.
///
/// `&` becomes `&amp;` without touching the entities produced for `<`, `>`,
/// `'` and `"`, so `A&B<C` yields `A&amp;B&lt;C`.
#[must_use]
pub fn escape_text(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(raw)
}

/// Remove characters that XML 1.0 does not allow in a document.
///
/// Tab, line feed and carriage return are kept; other control characters and
/// the non-characters `U+FFFE`/`U+FFFF` are dropped.
#[must_use]
pub fn strip_invalid_chars(raw: &str) -> Cow<'_, str> {
    if raw.chars().all(is_xml_char) {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(raw.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Canonicalize the decimal text of a number.
///
/// When the text has a fractional point and no exponent marker, trailing `0`s
/// are removed and then a trailing lone `.`. Integral and exponential forms
/// are returned unchanged.
///
/// ```
/// use valxml::canonical_number;
///
/// assert_eq!(canonical_number("3.140000"), "3.14");
/// assert_eq!(canonical_number("5.000"), "5");
/// assert_eq!(canonical_number("1.0E10"), "1.0E10");
/// assert_eq!(canonical_number("100"), "100");
/// ```
#[must_use]
pub fn canonical_number(text: &str) -> Cow<'_, str> {
    let has_point = text.find('.').is_some_and(|i| i > 0);
    if !has_point || text.contains(['e', 'E']) {
        return Cow::Borrowed(text);
    }
    let trimmed = text.trim_end_matches('0');
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    Cow::Borrowed(trimmed)
}
