//! Serializer configuration.
//!
//! Configuration can be built in code or read from environment variables.

use std::fmt::Write as _;

use crate::error::{XmlError, XmlResult};
use crate::naming::{TagNaming, is_xml_name};

/// Root element name used when the caller does not name one.
pub const DEFAULT_ROOT_NAME: &str = "xmlData";

/// Date-time pattern used for temporal values: four-digit year through seconds.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration for [`XmlSerializer`](crate::XmlSerializer).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct XmlConfig {
    /// Root element name.
    pub root_name: String,
    /// Whether documents start with an XML declaration line.
    pub xml_declaration: bool,
    /// `chrono` format pattern for temporal values.
    pub datetime_format: String,
    /// Maximum nesting depth of the value tree.
    pub max_depth: usize,
    /// Reject root names, keys and tags that are not XML names.
    pub validate_names: bool,
    /// Drop characters XML 1.0 does not allow from text values.
    pub strip_invalid_chars: bool,
    /// How record and property names become tags.
    pub tag_naming: TagNaming,
    /// Log level filter for binaries embedding the serializer.
    pub log_level: String,
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.to_owned(),
            xml_declaration: true,
            datetime_format: DEFAULT_DATETIME_FORMAT.to_owned(),
            max_depth: DEFAULT_MAX_DEPTH,
            validate_names: true,
            strip_invalid_chars: true,
            tag_naming: TagNaming::default(),
            log_level: "info".to_owned(),
        }
    }
}

impl XmlConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup function.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("VALXML_ROOT_NAME") {
            config.root_name = v;
        }
        if let Some(v) = lookup("VALXML_XML_DECLARATION") {
            config.xml_declaration = parse_flag(&v);
        }
        if let Some(v) = lookup("VALXML_DATETIME_FORMAT") {
            config.datetime_format = v;
        }
        if let Some(v) = lookup("VALXML_MAX_DEPTH").and_then(|v| v.parse().ok()) {
            config.max_depth = v;
        }
        if let Some(v) = lookup("VALXML_VALIDATE_NAMES") {
            config.validate_names = parse_flag(&v);
        }
        if let Some(v) = lookup("VALXML_STRIP_INVALID_CHARS") {
            config.strip_invalid_chars = parse_flag(&v);
        }
        if let Some(v) = lookup("VALXML_TAG_NAMING").and_then(|v| TagNaming::parse(&v)) {
            config.tag_naming = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Check that the configuration can produce documents.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::Config`] for a zero depth limit or an invalid
    /// date-time pattern, and [`XmlError::InvalidName`] for a bad root name
    /// when name validation is on.
    pub fn validate(&self) -> XmlResult<()> {
        if self.max_depth == 0 {
            return Err(XmlError::Config("max depth must be at least 1".to_owned()));
        }
        if self.validate_names && !is_xml_name(&self.root_name) {
            return Err(XmlError::InvalidName(self.root_name.clone()));
        }
        // chrono reports bad patterns only when formatting.
        let probe = chrono::NaiveDateTime::default();
        let mut buf = String::new();
        if write!(buf, "{}", probe.format(&self.datetime_format)).is_err() {
            return Err(XmlError::Config(format!(
                "invalid datetime format: {}",
                self.datetime_format
            )));
        }
        Ok(())
    }
}

fn parse_flag(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = XmlConfig::default();
        assert_eq!(config.root_name, "xmlData");
        assert!(config.xml_declaration);
        assert_eq!(config.datetime_format, "%Y-%m-%d %H:%M:%S");
        assert_eq!(config.max_depth, 128);
        assert!(config.validate_names);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_should_read_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("VALXML_ROOT_NAME", "response"),
            ("VALXML_XML_DECLARATION", "false"),
            ("VALXML_MAX_DEPTH", "8"),
            ("VALXML_VALIDATE_NAMES", "0"),
            ("VALXML_TAG_NAMING", "verbatim"),
            ("LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let config = XmlConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_owned()));

        assert_eq!(config.root_name, "response");
        assert!(!config.xml_declaration);
        assert_eq!(config.max_depth, 8);
        assert!(!config.validate_names);
        assert_eq!(config.tag_naming, TagNaming::Verbatim);
        assert_eq!(config.log_level, "debug");
        assert!(config.strip_invalid_chars);
    }

    #[test]
    fn test_should_ignore_unparsable_values() {
        let config = XmlConfig::from_lookup(|k| match k {
            "VALXML_MAX_DEPTH" => Some("deep".to_owned()),
            "VALXML_TAG_NAMING" => Some("snake".to_owned()),
            _ => None,
        });
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.tag_naming, TagNaming::Decapitalize);
    }

    #[test]
    fn test_should_reject_invalid_config() {
        let zero = XmlConfig {
            max_depth: 0,
            ..XmlConfig::default()
        };
        assert!(matches!(zero.validate(), Err(XmlError::Config(_))));

        let bad_root = XmlConfig {
            root_name: "1root".to_owned(),
            ..XmlConfig::default()
        };
        assert!(matches!(bad_root.validate(), Err(XmlError::InvalidName(_))));

        let bad_format = XmlConfig {
            datetime_format: "%Q".to_owned(),
            ..XmlConfig::default()
        };
        assert!(matches!(bad_format.validate(), Err(XmlError::Config(_))));
    }

    #[test]
    fn test_should_deserialize_partial_json_config() {
        let config: XmlConfig =
            serde_json::from_str(r#"{"rootName":"doc","tagNaming":"verbatim"}"#)
                .expect("valid config");
        assert_eq!(config.root_name, "doc");
        assert_eq!(config.tag_naming, TagNaming::Verbatim);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }
}
