//! Element name transforms.
//!
//! Record tags are derived from type names and property tags from property
//! names with the same acronym-aware decapitalization rule:
//!
//! | Input      | Output     |
//! |------------|------------|
//! | `A`        | `a`        |
//! | `UserId`   | `userId`   |
//! | `URLPath`  | `urLPath`  |
//!
//! The `URLPath` case is intentional: when the second character is upper-case
//! exactly the first two characters are lowered, which existing consumers of
//! the format rely on.

use std::borrow::Cow;

/// How record and property names become element tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TagNaming {
    /// Apply [`decapitalize`].
    #[default]
    Decapitalize,
    /// Use names as declared.
    Verbatim,
}

impl TagNaming {
    /// Parse a naming mode from its configuration spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "decapitalize" => Some(Self::Decapitalize),
            "verbatim" => Some(Self::Verbatim),
            _ => None,
        }
    }

    /// Turn a declared name into a tag.
    #[must_use]
    pub fn apply<'a>(self, name: &'a str) -> Cow<'a, str> {
        match self {
            Self::Decapitalize => decapitalize(name),
            Self::Verbatim => Cow::Borrowed(name),
        }
    }
}

/// Lower the leading capital of a type or property name.
///
/// Names that do not start with an upper-case letter are returned unchanged.
#[must_use]
pub fn decapitalize(s: &str) -> Cow<'_, str> {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return Cow::Borrowed(s);
    };
    if !first.is_uppercase() {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    out.extend(first.to_lowercase());
    match chars.next() {
        None => {}
        Some(second) if second.is_uppercase() => {
            out.extend(second.to_lowercase());
            out.push_str(chars.as_str());
        }
        Some(second) => {
            out.push(second);
            out.push_str(chars.as_str());
        }
    }
    Cow::Owned(out)
}

/// Extract the property name from an accessor-style name.
///
/// `getUserId` yields `UserId` and `isActive` yields `Active`. Names without a
/// `get`/`is` prefix, or whose remainder is empty or does not start with an
/// upper-case letter, are not accessors.
#[must_use]
pub fn property_name(accessor: &str) -> Option<&str> {
    let rest = accessor
        .strip_prefix("get")
        .or_else(|| accessor.strip_prefix("is"))?;
    rest.chars()
        .next()
        .filter(|c| c.is_uppercase())
        .map(|_| rest)
}

/// The unqualified name of a Rust type path.
///
/// `alloc::vec::Vec<my::Order>` becomes `Vec` and `my::model::Order` becomes
/// `Order`.
#[must_use]
pub fn simple_type_name(type_path: &str) -> &str {
    let path = type_path
        .trim_start_matches('&')
        .trim_start_matches("mut ");
    let path = path.split('<').next().unwrap_or(path);
    path.rsplit("::").next().unwrap_or(path)
}

/// Whether `name` is a legal XML 1.0 element name.
#[must_use]
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_name_start_char(c) => chars.all(is_name_char),
        _ => false,
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}
