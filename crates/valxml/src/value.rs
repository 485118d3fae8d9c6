//! The value model the emitter walks.
//!
//! [`Value`] is a closed sum type: every input is exactly one variant, and
//! anything that is not a scalar, a collection or a type/enum name is a
//! [`Record`] with explicitly declared properties.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

use crate::error::PropertyError;
use crate::naming::{property_name, simple_type_name};

/// A value to be serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// No value; emits nothing.
    #[default]
    Absent,
    /// A number; emits its canonical decimal text.
    Number(Number),
    /// A boolean; emits `true` or `false`.
    Bool(bool),
    /// A string; emits escaped text.
    Text(String),
    /// Key/value entries; emits one element per entry.
    Mapping(Mapping),
    /// The simple name of a type.
    TypeTag(String),
    /// The display name of an enum member.
    Enumerated(String),
    /// A date-time; emits the configured formatter's output.
    Temporal(NaiveDateTime),
    /// A collection; emits its elements back to back.
    Sequence(Vec<Value>),
    /// A structured object; emits a tag named after its type.
    Record(Record),
}

impl Value {
    /// Create a text value.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Create an enum member value.
    #[must_use]
    pub fn enumerated(name: impl Into<String>) -> Self {
        Self::Enumerated(name.into())
    }

    /// The type tag of `T`, named by its unqualified type name.
    #[must_use]
    pub fn type_tag<T: ?Sized>() -> Self {
        Self::TypeTag(simple_type_name(std::any::type_name::<T>()).to_owned())
    }

    /// A short name for the variant, used in the emitter's log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::Mapping(_) => "mapping",
            Self::TypeTag(_) => "typeTag",
            Self::Enumerated(_) => "enumerated",
            Self::Temporal(_) => "temporal",
            Self::Sequence(_) => "sequence",
            Self::Record(_) => "record",
        }
    }
}

/// A numeric value.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A single-precision float, rendered at its own precision.
    Float32(f32),
    /// A double-precision float.
    Float(f64),
    /// Decimal text as produced by an arbitrary-precision source, such as
    /// `3.140000` or `1.0E10`.
    Decimal(String),
}

impl Number {
    /// Create a number from pre-rendered decimal text.
    #[must_use]
    pub fn decimal(text: impl Into<String>) -> Self {
        Self::Decimal(text.into())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::UInt(n) => write!(f, "{n}"),
            Self::Float32(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Decimal(s) => f.write_str(s),
        }
    }
}

/// Ordered key/value entries with unique keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, Value)>,
}

impl Mapping {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the previous value for the key.
    ///
    /// A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Builder-style [`Mapping::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

/// A structured object with a type name and declared properties.
///
/// Properties keep their declaration order.
///
/// ```
/// use valxml::{Record, Value};
///
/// let user = Record::new("UserInfo")
///     .property("UserId", 7)
///     .property("Name", "Ada")
///     .accessor("getEmail", Value::Absent);
/// assert_eq!(user.properties().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: String,
    properties: Vec<Property>,
}

impl Record {
    /// Create a record for the given type name, e.g. `UserInfo`.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: Vec::new(),
        }
    }

    /// Create a record named after `T`'s unqualified type name.
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self::new(simple_type_name(std::any::type_name::<T>()))
    }

    /// Add a property.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(Property::new(name, value));
        self
    }

    /// Add a property whose accessor may fail.
    #[must_use]
    pub fn try_property(
        mut self,
        name: impl Into<String>,
        value: Result<Value, PropertyError>,
    ) -> Self {
        self.push(Property {
            name: name.into(),
            value,
        });
        self
    }

    /// Add a property declared by accessor name (`getUserId`, `isActive`).
    ///
    /// Names that are not accessor-shaped do not describe a property and are
    /// ignored.
    #[must_use]
    pub fn accessor(self, accessor: &str, value: impl Into<Value>) -> Self {
        match property_name(accessor) {
            Some(name) => self.property(name, value),
            None => {
                tracing::trace!(accessor, "ignoring non-accessor name");
                self
            }
        }
    }

    /// Append a property.
    pub fn push(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// The declared type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The declared properties.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }
}

/// One declared record property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Declared name, before tag naming is applied.
    pub name: String,
    /// The property value, or the failure to read it.
    pub value: Result<Value, PropertyError>,
}

impl Property {
    /// Create a property holding a value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: Ok(value.into()),
        }
    }

    /// Create a property whose accessor failed.
    #[must_use]
    pub fn failed(name: impl Into<String>, error: PropertyError) -> Self {
        Self {
            name: name.into(),
            value: Err(error),
        }
    }
}

/// Conversion of Rust values into [`Value`].
///
/// Record types implement this by building a [`Record`]:
///
/// ```
/// use valxml::{Record, ToValue, Value};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl ToValue for Point {
///     fn to_value(&self) -> Value {
///         Record::of::<Self>()
///             .property("X", self.x)
///             .property("Y", self.y)
///             .into()
///     }
/// }
/// ```
pub trait ToValue {
    /// Convert into a value tree.
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Absent, ToValue::to_value)
    }
}

impl ToValue for () {
    fn to_value(&self) -> Value {
        Value::Absent
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

macro_rules! impl_number {
    ($variant:ident as $target:ty: $($ty:ty),+ $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Number(Number::$variant(<$target>::from(*self)))
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    v.to_value()
                }
            }
        )+
    };
}

impl_number!(Int as i64: i8, i16, i32, i64);
impl_number!(UInt as u64: u8, u16, u32, u64);
impl_number!(Float32 as f32: f32);
impl_number!(Float as f64: f64);

// Pointer-sized integers are at most 64 bits on every supported target.
#[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
impl ToValue for isize {
    fn to_value(&self) -> Value {
        Value::Number(Number::Int(*self as i64))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
impl ToValue for usize {
    fn to_value(&self) -> Value {
        Value::Number(Number::UInt(*self as u64))
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value {
        Value::Temporal(*self)
    }
}

impl ToValue for NaiveDate {
    fn to_value(&self) -> Value {
        Value::Temporal(self.and_time(chrono::NaiveTime::MIN))
    }
}

impl<Tz: TimeZone> ToValue for DateTime<Tz> {
    fn to_value(&self) -> Value {
        Value::Temporal(self.naive_local())
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue, S> ToValue for HashSet<T, S> {
    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for BTreeSet<T> {
    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(ToValue::to_value).collect())
    }
}

impl<K: fmt::Display, V: ToValue, S> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        Value::Mapping(self.iter().map(|(k, v)| (k.to_string(), v.to_value())).collect())
    }
}

impl<K: fmt::Display, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Mapping(self.iter().map(|(k, v)| (k.to_string(), v.to_value())).collect())
    }
}

impl ToValue for Mapping {
    fn to_value(&self) -> Value {
        Value::Mapping(self.clone())
    }
}

impl ToValue for Record {
    fn to_value(&self) -> Value {
        Value::Record(self.clone())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        Self::Number(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::Temporal(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        v.to_value()
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Self::Temporal(v.naive_local())
    }
}

impl From<Mapping> for Value {
    fn from(v: Mapping) -> Self {
        Self::Mapping(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Absent, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    struct Order;

    #[test]
    fn test_should_replace_mapping_key_in_place() {
        let mut m = Mapping::new().with("a", 1).with("b", 2);
        let old = m.insert("a", 3);

        assert_eq!(old, Some(Value::from(1)));
        let keys: Vec<_> = m.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(m.get("a"), Some(&Value::from(3)));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_should_name_type_tags_by_simple_name() {
        assert_eq!(Value::type_tag::<Order>(), Value::TypeTag("Order".into()));
        assert_eq!(Value::type_tag::<Vec<Order>>(), Value::TypeTag("Vec".into()));
        assert_eq!(Record::of::<Order>().type_name(), "Order");
    }

    #[test]
    fn test_should_declare_record_properties_by_accessor() {
        let rec = Record::new("UserInfo")
            .accessor("getUserId", 7)
            .accessor("isActive", true)
            .accessor("hashCode", 1)
            .accessor("getter", 2);

        let names: Vec<_> = rec.properties().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["UserId", "Active"]);
    }

    #[test]
    fn test_should_convert_std_types() {
        assert_eq!(Some(5_u8).to_value(), Value::Number(Number::UInt(5)));
        assert_eq!(5_usize.to_value(), Value::Number(Number::UInt(5)));
        assert_eq!((-5_isize).to_value(), Value::Number(Number::Int(-5)));
        assert_eq!(0.1_f32.to_value(), Value::Number(Number::Float32(0.1)));
        assert_eq!(None::<i32>.to_value(), Value::Absent);
        assert_eq!(
            vec!["a", "b"].to_value(),
            Value::Sequence(vec![Value::text("a"), Value::text("b")])
        );

        let map: BTreeMap<u32, &str> = [(2, "two"), (1, "one")].into_iter().collect();
        let Value::Mapping(m) = map.to_value() else {
            panic!("expected mapping");
        };
        let keys: Vec<_> = m.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["1", "2"]);
    }

    #[test]
    fn test_should_convert_dates_to_temporal() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
        let Value::Temporal(dt) = date.to_value() else {
            panic!("expected temporal");
        };
        assert_eq!(dt.to_string(), "2024-03-01 00:00:00");
    }

    #[test]
    fn test_should_render_number_text() {
        assert_eq!(Number::Int(-3).to_string(), "-3");
        assert_eq!(Number::Float(2.5).to_string(), "2.5");
        assert_eq!(Number::Float32(0.1).to_string(), "0.1");
        assert_eq!(Number::decimal("3.140000").to_string(), "3.140000");
    }
}
