//! XML emission: turning a [`Value`] tree into markup.
//!
//! Each value shape has a fixed rendering:
//!
//! - Absent: nothing
//! - Number: canonical decimal text (`3.140000` → `3.14`)
//! - Bool: `true`/`false`
//! - Text: escaped text
//! - Mapping: `<key>value</key>` followed by a newline, per entry
//! - TypeTag / Enumerated: the bare name
//! - Temporal: the configured date-time pattern
//! - Sequence: elements back to back, no wrapper
//! - Record: `<typeName>` around one child per non-empty property
//!
//! The document wrapper adds the root element and, optionally, the
//! `<?xml version="1.0" encoding="utf-8"?>` declaration line.

use std::fmt::Write as _;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::{debug, warn};

use crate::config::{DEFAULT_ROOT_NAME, XmlConfig};
use crate::error::{XmlError, XmlResult};
use crate::naming::is_xml_name;
use crate::ser::ValueSerializer;
use crate::text::{canonical_number, escape_text, strip_invalid_chars};
use crate::value::{Mapping, Number, Record, ToValue, Value};

/// Converts values to XML under a fixed configuration.
///
/// The serializer holds no per-call state and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct XmlSerializer {
    config: XmlConfig,
}

impl XmlSerializer {
    /// Create a serializer from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if [`XmlConfig::validate`] rejects the configuration.
    pub fn new(config: XmlConfig) -> XmlResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &XmlConfig {
        &self.config
    }

    /// Convert a value into a document using the configured root name and
    /// declaration setting.
    ///
    /// # Errors
    ///
    /// See [`XmlSerializer::convert_with`].
    pub fn convert(&self, value: &Value) -> XmlResult<String> {
        self.convert_with(&self.config.root_name, value, self.config.xml_declaration)
    }

    /// Convert a value into a document with an explicit root name.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::InvalidName`] for an invalid root name, mapping key
    /// or tag when name validation is on, and [`XmlError::DepthExceeded`] when
    /// the value nests deeper than the configured limit.
    pub fn convert_with(
        &self,
        root_name: &str,
        value: &Value,
        append_version_header: bool,
    ) -> XmlResult<String> {
        self.check_name(root_name)?;
        let body = self.emit(value)?;

        let mut buf = Vec::with_capacity(body.len() + 2 * root_name.len() + 48);
        let mut writer = Writer::new(&mut buf);
        if append_version_header {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
            writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
        }
        writer.write_event(Event::Start(BytesStart::new(root_name)))?;
        writer.write_event(Event::Text(BytesText::from_escaped(body.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new(root_name)))?;

        debug!(root = root_name, bytes = buf.len(), "converted value to XML");
        String::from_utf8(buf).map_err(|e| XmlError::Malformed(e.to_string()))
    }

    /// Convert anything implementing [`ToValue`] into a document.
    ///
    /// # Errors
    ///
    /// See [`XmlSerializer::convert_with`].
    pub fn convert_value<T: ToValue + ?Sized>(&self, value: &T) -> XmlResult<String> {
        self.convert(&value.to_value())
    }

    /// Convert any `serde::Serialize` value into a document.
    ///
    /// # Errors
    ///
    /// Fails if the value cannot be represented (see [`crate::to_value`]) or
    /// for the reasons listed on [`XmlSerializer::convert_with`]. Variant tags
    /// follow the configured [`XmlConfig::tag_naming`].
    pub fn serialize<T: serde::Serialize + ?Sized>(&self, value: &T) -> XmlResult<String> {
        let value = value.serialize(ValueSerializer::new(self.config.tag_naming))?;
        self.convert(&value)
    }

    /// Emit the markup for a value without a root element.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::InvalidName`] or [`XmlError::DepthExceeded`] as for
    /// [`XmlSerializer::convert_with`].
    pub fn emit(&self, value: &Value) -> XmlResult<String> {
        let mut out = String::new();
        self.write_value(&mut out, value, 0)?;
        Ok(out)
    }

    fn write_value(&self, out: &mut String, value: &Value, depth: usize) -> XmlResult<()> {
        if depth > self.config.max_depth {
            return Err(XmlError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }

        // Scalar shapes are matched before structural ones, and Record stays
        // last as the shape for everything that is not recognized otherwise.
        match value {
            Value::Absent => {}
            Value::Number(n) => write_number(out, n),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Text(s) => self.write_text(out, s),
            Value::Mapping(m) => self.write_mapping(out, m, depth)?,
            Value::TypeTag(name) | Value::Enumerated(name) => out.push_str(name),
            Value::Temporal(dt) => {
                write!(out, "{}", dt.format(&self.config.datetime_format)).map_err(|_| {
                    XmlError::Config(format!(
                        "invalid datetime format: {}",
                        self.config.datetime_format
                    ))
                })?;
            }
            Value::Sequence(items) => {
                for item in items {
                    self.write_value(out, item, depth + 1)?;
                }
            }
            Value::Record(record) => self.write_record(out, record, depth)?,
        }
        Ok(())
    }

    fn write_text(&self, out: &mut String, s: &str) {
        if self.config.strip_invalid_chars {
            out.push_str(&escape_text(&strip_invalid_chars(s)));
        } else {
            out.push_str(&escape_text(s));
        }
    }

    fn write_mapping(&self, out: &mut String, mapping: &Mapping, depth: usize) -> XmlResult<()> {
        for (key, value) in mapping.iter() {
            self.check_name(key)?;
            open_tag(out, key);
            self.write_value(out, value, depth + 1)?;
            close_tag(out, key);
            out.push('\n');
        }
        Ok(())
    }

    fn write_record(&self, out: &mut String, record: &Record, depth: usize) -> XmlResult<()> {
        let tag = self.config.tag_naming.apply(record.type_name());
        self.check_name(&tag)?;

        open_tag(out, &tag);
        out.push('\n');
        for property in record.properties() {
            let value = match &property.value {
                Ok(value @ Value::TypeTag(_)) => {
                    debug!(
                        record = %tag,
                        property = %property.name,
                        kind = value.kind(),
                        "skipping type tag property"
                    );
                    continue;
                }
                Ok(value) => value,
                Err(e) => {
                    warn!(
                        record = %tag,
                        property = %property.name,
                        error = e.message(),
                        "failed to read property, omitting it"
                    );
                    continue;
                }
            };

            let mut body = String::new();
            self.write_value(&mut body, value, depth + 1)?;
            if body.is_empty() {
                debug!(
                    record = %tag,
                    property = %property.name,
                    kind = value.kind(),
                    "omitting empty property"
                );
                continue;
            }

            let child = self.config.tag_naming.apply(&property.name);
            self.check_name(&child)?;
            open_tag(out, &child);
            out.push_str(&body);
            close_tag(out, &child);
            out.push('\n');
        }
        close_tag(out, &tag);
        out.push('\n');
        Ok(())
    }

    fn check_name(&self, name: &str) -> XmlResult<()> {
        if self.config.validate_names && !is_xml_name(name) {
            return Err(XmlError::InvalidName(name.to_owned()));
        }
        Ok(())
    }
}

fn write_number(out: &mut String, n: &Number) {
    match n {
        Number::Decimal(text) => out.push_str(&canonical_number(text)),
        other => out.push_str(&canonical_number(&other.to_string())),
    }
}

fn open_tag(out: &mut String, tag: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
}

fn close_tag(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Convert a value into a document named `root_name` with default settings.
///
/// # Errors
///
/// See [`XmlSerializer::convert_with`].
pub fn convert(root_name: &str, value: &Value, append_version_header: bool) -> XmlResult<String> {
    XmlSerializer::default().convert_with(root_name, value, append_version_header)
}

/// Convert a value into a document named `root_name`, with the declaration.
///
/// # Errors
///
/// See [`XmlSerializer::convert_with`].
pub fn convert_named(root_name: &str, value: &Value) -> XmlResult<String> {
    convert(root_name, value, true)
}

/// Convert a value into an `xmlData` document, with the declaration.
///
/// # Errors
///
/// See [`XmlSerializer::convert_with`].
pub fn convert_default(value: &Value) -> XmlResult<String> {
    convert(DEFAULT_ROOT_NAME, value, true)
}

/// Convert anything implementing [`ToValue`] into a document, with the declaration.
///
/// # Errors
///
/// See [`XmlSerializer::convert_with`].
pub fn to_xml<T: ToValue + ?Sized>(root_name: &str, value: &T) -> XmlResult<String> {
    convert(root_name, &value.to_value(), true)
}

/// Emit the markup for a value with default settings.
///
/// # Errors
///
/// See [`XmlSerializer::emit`].
pub fn emit(value: &Value) -> XmlResult<String> {
    XmlSerializer::default().emit(value)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::error::PropertyError;
    use crate::naming::TagNaming;
    use crate::value::Property;

    /// Sort the child lines of a single-record document so property order
    /// does not matter.
    fn sorted_lines(xml: &str) -> Vec<&str> {
        let mut lines: Vec<&str> = xml.lines().collect();
        lines.sort_unstable();
        lines
    }

    fn point(x: i32) -> Value {
        Record::new("Record").property("X", x).into()
    }

    #[test]
    fn test_should_emit_absent_as_empty() {
        assert_eq!(emit(&Value::Absent).expect("emit"), "");
        let map = Mapping::new().with("a", Value::Absent);
        assert_eq!(emit(&map.into()).expect("emit"), "<a></a>\n");
    }

    #[test]
    fn test_should_emit_canonical_numbers() {
        let cases = [
            (Value::from(Number::decimal("3.140000")), "3.14"),
            (Value::from(Number::decimal("5.000")), "5"),
            (Value::from(Number::decimal("1.0E10")), "1.0E10"),
            (Value::from(2.5_f64), "2.5"),
            (Value::from(5.0_f64), "5"),
            (Value::from(0.1_f32), "0.1"),
            (Value::from(1.5_f32), "1.5"),
            (Value::from(-42_i64), "-42"),
            (Value::from(u64::MAX), "18446744073709551615"),
        ];
        for (value, expected) in cases {
            assert_eq!(emit(&value).expect("emit"), expected);
        }
    }

    #[test]
    fn test_should_emit_scalars() {
        assert_eq!(emit(&true.into()).expect("emit"), "true");
        assert_eq!(emit(&false.into()).expect("emit"), "false");
        assert_eq!(emit(&"A&B<C".into()).expect("emit"), "A&amp;B&lt;C");
        assert_eq!(emit(&Value::enumerated("ACTIVE")).expect("emit"), "ACTIVE");
        assert_eq!(emit(&Value::type_tag::<Record>()).expect("emit"), "Record");
    }

    #[test]
    fn test_should_emit_full_date_time() {
        let dt = NaiveDate::from_ymd_opt(2018, 9, 5)
            .and_then(|d| d.and_hms_opt(11, 6, 0))
            .expect("valid date-time");
        assert_eq!(emit(&dt.into()).expect("emit"), "2018-09-05 11:06:00");

        let custom = XmlSerializer::new(XmlConfig {
            datetime_format: "%d/%m/%Y".to_owned(),
            ..XmlConfig::default()
        })
        .expect("valid config");
        assert_eq!(custom.emit(&dt.into()).expect("emit"), "05/09/2018");
    }

    #[test]
    fn test_should_strip_invalid_characters_from_text() {
        let value = Value::text("a\u{1}b");
        assert_eq!(emit(&value).expect("emit"), "ab");

        let raw = XmlSerializer::new(XmlConfig {
            strip_invalid_chars: false,
            ..XmlConfig::default()
        })
        .expect("valid config");
        assert_eq!(raw.emit(&value).expect("emit"), "a\u{1}b");
    }

    #[test]
    fn test_should_convert_mapping_document() {
        let map = Mapping::new().with("id", 7).with("name", "A&B");
        let xml = convert("xmlData", &map.into(), true).expect("convert");
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<xmlData><id>7</id>\n<name>A&amp;B</name>\n</xmlData>"
        );
    }

    #[test]
    fn test_should_omit_declaration_when_not_requested() {
        let xml = convert("data", &Value::from(1), false).expect("convert");
        assert_eq!(xml, "<data>1</data>");
    }

    #[test]
    fn test_should_use_default_root_name() {
        let xml = convert_default(&Value::Absent).expect("convert");
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<xmlData></xmlData>"
        );
        let named = convert_named("resp", &"ok".into()).expect("convert");
        assert!(named.ends_with("<resp>ok</resp>"));
    }

    #[test]
    fn test_should_concatenate_sequence_of_records() {
        let list = Value::Sequence(vec![point(1), point(2)]);
        assert_eq!(
            emit(&list).expect("emit"),
            "<record>\n<x>1</x>\n</record>\n<record>\n<x>2</x>\n</record>\n"
        );
    }

    #[test]
    fn test_should_concatenate_scalar_sequence_without_separator() {
        let list = Value::from(vec![1, 2, 3]);
        assert_eq!(emit(&list).expect("emit"), "123");
    }

    #[test]
    fn test_should_emit_record_properties() {
        let user = Record::new("UserInfo")
            .property("UserId", 7)
            .property("URLPath", "/home")
            .property("Active", true);
        let xml = emit(&user.into()).expect("emit");

        assert_eq!(
            sorted_lines(&xml),
            sorted_lines("<userInfo>\n<active>true</active>\n<userId>7</userId>\n<urLPath>/home</urLPath>\n</userInfo>\n")
        );
        assert!(xml.starts_with("<userInfo>\n"));
        assert!(xml.ends_with("</userInfo>\n"));
    }

    #[test]
    fn test_should_omit_empty_and_type_tag_properties() {
        let base = Record::new("Item").property("Name", "pen");
        let with_extras = base
            .clone()
            .property("Note", Value::Absent)
            .property("Empty", "")
            .property("Kind", Value::type_tag::<Record>())
            .property("Parts", Value::Sequence(Vec::new()));

        assert_eq!(
            emit(&with_extras.into()).expect("emit"),
            emit(&base.into()).expect("emit")
        );
    }

    #[test]
    fn test_should_omit_failed_properties_and_continue() {
        let rec = Record::new("Account")
            .property("Id", 1)
            .try_property("Balance", Err(PropertyError::new("ledger offline")))
            .property("Owner", "ann");
        let xml = emit(&rec.into()).expect("emit");

        let mut pushed = Record::new("Account").property("Id", 1);
        pushed.push(Property::failed("Limit", PropertyError::new("timeout")));
        assert_eq!(emit(&pushed.into()).expect("emit"), "<account>\n<id>1</id>\n</account>\n");

        assert!(!xml.contains("balance"));
        assert!(xml.contains("<id>1</id>"));
        assert!(xml.contains("<owner>ann</owner>"));
    }

    #[test]
    fn test_should_be_stable_across_repeated_calls() {
        let rec: Value = Record::new("Order")
            .property("Id", 9)
            .property("Lines", vec![point(1), point(2)])
            .into();
        let first = emit(&rec).expect("emit");
        let second = emit(&rec).expect("emit");
        assert_eq!(sorted_lines(&first), sorted_lines(&second));
    }

    #[test]
    fn test_should_keep_names_verbatim_when_configured() {
        let ser = XmlSerializer::new(XmlConfig {
            tag_naming: TagNaming::Verbatim,
            ..XmlConfig::default()
        })
        .expect("valid config");
        let xml = ser
            .emit(&Record::new("UserInfo").property("UserId", 1).into())
            .expect("emit");
        assert_eq!(xml, "<UserInfo>\n<UserId>1</UserId>\n</UserInfo>\n");
    }

    #[test]
    fn test_should_reject_invalid_names() {
        let bad_key = Mapping::new().with("two words", 1);
        assert!(matches!(
            emit(&bad_key.into()),
            Err(XmlError::InvalidName(ref n)) if n == "two words"
        ));
        assert!(matches!(
            convert("<root>", &Value::Absent, false),
            Err(XmlError::InvalidName(_))
        ));
    }

    #[test]
    fn test_should_pass_names_through_when_validation_is_off() {
        let ser = XmlSerializer::new(XmlConfig {
            validate_names: false,
            ..XmlConfig::default()
        })
        .expect("valid config");
        let xml = ser
            .emit(&Mapping::new().with("1st", "x").into())
            .expect("emit");
        assert_eq!(xml, "<1st>x</1st>\n");
    }

    #[test]
    fn test_should_fail_past_max_depth() {
        let ser = XmlSerializer::new(XmlConfig {
            max_depth: 2,
            ..XmlConfig::default()
        })
        .expect("valid config");

        let shallow = Value::Sequence(vec![Value::Sequence(vec![1.into()])]);
        assert_eq!(ser.emit(&shallow).expect("emit"), "1");

        let deep = Value::Sequence(vec![shallow]);
        assert!(matches!(
            ser.emit(&deep),
            Err(XmlError::DepthExceeded { limit: 2 })
        ));
    }

    #[test]
    fn test_should_convert_to_value_types() {
        let xml = to_xml("nums", &vec![1_u8, 2]).expect("convert");
        assert!(xml.ends_with("<nums>12</nums>"));
    }

    #[test]
    fn test_should_convert_with_configured_root() {
        let ser = XmlSerializer::new(XmlConfig {
            root_name: "response".to_owned(),
            xml_declaration: false,
            ..XmlConfig::default()
        })
        .expect("valid config");
        assert_eq!(
            ser.convert(&Value::from(true)).expect("convert"),
            "<response>true</response>"
        );
    }

    #[test]
    fn test_should_name_serde_variant_tags_from_config() {
        #[derive(serde::Serialize)]
        enum Event {
            Opened(u32),
            Closed { at: u32 },
        }

        let ser = XmlSerializer::new(XmlConfig {
            xml_declaration: false,
            tag_naming: TagNaming::Verbatim,
            ..XmlConfig::default()
        })
        .expect("valid config");
        assert_eq!(
            ser.serialize(&Event::Opened(1)).expect("serialize"),
            "<xmlData><Opened>1</Opened>\n</xmlData>"
        );
        assert_eq!(
            ser.serialize(&Event::Closed { at: 2 }).expect("serialize"),
            "<xmlData><Closed>\n<at>2</at>\n</Closed>\n</xmlData>"
        );
    }
}
