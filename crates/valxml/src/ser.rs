//! Building [`Value`] trees from `serde::Serialize` types.
//!
//! Named structs and struct variants become records named after the type (or
//! variant), unit structs become records without properties, unit variants
//! become enumerated values and maps become mappings. Newtypes are
//! transparent. Newtype and tuple variants use the externally tagged layout
//! `{variant: content}`; the variant key is named with the serializer's
//! [`TagNaming`], the same rule record tags get at emission, so
//! `Shape::Circle(3)` and `Shape::Square { side: 3 }` both open with a
//! lower-cased tag by default.

use serde::Serialize;
use serde::ser::{self, Impossible};

use crate::error::{XmlError, XmlResult};
use crate::naming::TagNaming;
use crate::text::canonical_number;
use crate::value::{Mapping, Number, Property, Record, Value};

/// Convert a `Serialize` value into a [`Value`].
///
/// # Errors
///
/// Returns [`XmlError::UnsupportedKey`] for map keys that are not scalars and
/// [`XmlError::Serde`] for errors raised by the value's `Serialize` impl.
///
/// ```
/// use valxml::{Value, to_value};
///
/// #[derive(serde::Serialize)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(matches!(value, Value::Record(_)));
/// ```
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> XmlResult<Value> {
    value.serialize(ValueSerializer::default())
}

/// A `serde::Serializer` whose output is a [`Value`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSerializer {
    naming: TagNaming,
}

impl ValueSerializer {
    /// Create a serializer that names variant tags with `naming`.
    #[must_use]
    pub fn new(naming: TagNaming) -> Self {
        Self { naming }
    }

    fn convert<T: Serialize + ?Sized>(self, value: &T) -> XmlResult<Value> {
        value.serialize(self)
    }

    fn tagged(self, variant: &str, content: Value) -> Value {
        Value::Mapping(Mapping::new().with(self.naming.apply(variant), content))
    }
}

fn int(v: impl Into<i64>) -> Value {
    Value::Number(Number::Int(v.into()))
}

fn uint(v: impl Into<u64>) -> Value {
    Value::Number(Number::UInt(v.into()))
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = XmlError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = SeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = RecordBuilder;
    type SerializeStructVariant = RecordBuilder;

    fn serialize_bool(self, v: bool) -> XmlResult<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> XmlResult<Value> {
        Ok(int(v))
    }

    fn serialize_i16(self, v: i16) -> XmlResult<Value> {
        Ok(int(v))
    }

    fn serialize_i32(self, v: i32) -> XmlResult<Value> {
        Ok(int(v))
    }

    fn serialize_i64(self, v: i64) -> XmlResult<Value> {
        Ok(int(v))
    }

    fn serialize_i128(self, v: i128) -> XmlResult<Value> {
        Ok(Value::Number(
            i64::try_from(v).map_or_else(|_| Number::Decimal(v.to_string()), Number::Int),
        ))
    }

    fn serialize_u8(self, v: u8) -> XmlResult<Value> {
        Ok(uint(v))
    }

    fn serialize_u16(self, v: u16) -> XmlResult<Value> {
        Ok(uint(v))
    }

    fn serialize_u32(self, v: u32) -> XmlResult<Value> {
        Ok(uint(v))
    }

    fn serialize_u64(self, v: u64) -> XmlResult<Value> {
        Ok(uint(v))
    }

    fn serialize_u128(self, v: u128) -> XmlResult<Value> {
        Ok(Value::Number(
            u64::try_from(v).map_or_else(|_| Number::Decimal(v.to_string()), Number::UInt),
        ))
    }

    fn serialize_f32(self, v: f32) -> XmlResult<Value> {
        Ok(Value::Number(Number::Float32(v)))
    }

    fn serialize_f64(self, v: f64) -> XmlResult<Value> {
        Ok(Value::Number(Number::Float(v)))
    }

    fn serialize_char(self, v: char) -> XmlResult<Value> {
        Ok(Value::Text(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> XmlResult<Value> {
        Ok(Value::Text(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> XmlResult<Value> {
        Ok(Value::Sequence(v.iter().map(|b| uint(*b)).collect()))
    }

    fn serialize_none(self) -> XmlResult<Value> {
        Ok(Value::Absent)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> XmlResult<Value> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> XmlResult<Value> {
        Ok(Value::Absent)
    }

    fn serialize_unit_struct(self, name: &'static str) -> XmlResult<Value> {
        Ok(Value::Record(Record::new(name)))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> XmlResult<Value> {
        Ok(Value::Enumerated(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> XmlResult<Value> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> XmlResult<Value> {
        Ok(self.tagged(variant, self.convert(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> XmlResult<SeqBuilder> {
        Ok(SeqBuilder::new(self, None, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> XmlResult<SeqBuilder> {
        Ok(SeqBuilder::new(self, None, len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> XmlResult<SeqBuilder> {
        Ok(SeqBuilder::new(self, None, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> XmlResult<SeqBuilder> {
        Ok(SeqBuilder::new(self, Some(variant), len))
    }

    fn serialize_map(self, _len: Option<usize>) -> XmlResult<MapBuilder> {
        Ok(MapBuilder::new(self))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> XmlResult<RecordBuilder> {
        Ok(RecordBuilder::new(self, name))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> XmlResult<RecordBuilder> {
        Ok(RecordBuilder::new(self, variant))
    }
}

/// Collects sequence, tuple and tuple-variant elements.
#[derive(Debug)]
pub struct SeqBuilder {
    ser: ValueSerializer,
    variant: Option<&'static str>,
    items: Vec<Value>,
}

impl SeqBuilder {
    fn new(ser: ValueSerializer, variant: Option<&'static str>, len: usize) -> Self {
        Self {
            ser,
            variant,
            items: Vec::with_capacity(len),
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> XmlResult<()> {
        self.items.push(self.ser.convert(value)?);
        Ok(())
    }

    fn finish(self) -> Value {
        let seq = Value::Sequence(self.items);
        match self.variant {
            Some(variant) => self.ser.tagged(variant, seq),
            None => seq,
        }
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = XmlError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> XmlResult<()> {
        self.push(value)
    }

    fn end(self) -> XmlResult<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = XmlError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> XmlResult<()> {
        self.push(value)
    }

    fn end(self) -> XmlResult<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = XmlError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> XmlResult<()> {
        self.push(value)
    }

    fn end(self) -> XmlResult<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SeqBuilder {
    type Ok = Value;
    type Error = XmlError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> XmlResult<()> {
        self.push(value)
    }

    fn end(self) -> XmlResult<Value> {
        Ok(self.finish())
    }
}

/// Collects map entries.
///
/// An entry whose key serializes as `None` is dropped.
#[derive(Debug)]
pub struct MapBuilder {
    ser: ValueSerializer,
    mapping: Mapping,
    pending_key: Option<Option<String>>,
}

impl MapBuilder {
    fn new(ser: ValueSerializer) -> Self {
        Self {
            ser,
            mapping: Mapping::new(),
            pending_key: None,
        }
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = XmlError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> XmlResult<()> {
        self.pending_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> XmlResult<()> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| XmlError::Serde("map value serialized before its key".to_owned()))?;
        if let Some(key) = key {
            self.mapping.insert(key, self.ser.convert(value)?);
        }
        Ok(())
    }

    fn end(self) -> XmlResult<Value> {
        Ok(Value::Mapping(self.mapping))
    }
}

/// Collects struct fields into a [`Record`].
#[derive(Debug)]
pub struct RecordBuilder {
    ser: ValueSerializer,
    record: Record,
}

impl RecordBuilder {
    fn new(ser: ValueSerializer, name: &str) -> Self {
        Self {
            ser,
            record: Record::new(name),
        }
    }

    fn field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> XmlResult<()> {
        self.record.push(Property::new(key, self.ser.convert(value)?));
        Ok(())
    }
}

impl ser::SerializeStruct for RecordBuilder {
    type Ok = Value;
    type Error = XmlError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> XmlResult<()> {
        self.field(key, value)
    }

    fn end(self) -> XmlResult<Value> {
        Ok(Value::Record(self.record))
    }
}

impl ser::SerializeStructVariant for RecordBuilder {
    type Ok = Value;
    type Error = XmlError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> XmlResult<()> {
        self.field(key, value)
    }

    fn end(self) -> XmlResult<Value> {
        Ok(Value::Record(self.record))
    }
}

/// Renders map keys as text. `None` keys yield `Ok(None)`.
struct KeySerializer;

fn unsupported(kind: &str) -> XmlError {
    XmlError::UnsupportedKey(format!("{kind} cannot be used as an element name"))
}

type KeyResult = XmlResult<Option<String>>;

impl ser::Serializer for KeySerializer {
    type Ok = Option<String>;
    type Error = XmlError;

    type SerializeSeq = Impossible<Option<String>, XmlError>;
    type SerializeTuple = Impossible<Option<String>, XmlError>;
    type SerializeTupleStruct = Impossible<Option<String>, XmlError>;
    type SerializeTupleVariant = Impossible<Option<String>, XmlError>;
    type SerializeMap = Impossible<Option<String>, XmlError>;
    type SerializeStruct = Impossible<Option<String>, XmlError>;
    type SerializeStructVariant = Impossible<Option<String>, XmlError>;

    fn serialize_bool(self, v: bool) -> KeyResult {
        Ok(Some(v.to_string()))
    }

    fn serialize_i8(self, v: i8) -> KeyResult {
        Ok(Some(v.to_string()))
    }

    fn serialize_i16(self, v: i16) -> KeyResult {
        Ok(Some(v.to_string()))
    }

    fn serialize_i32(self, v: i32) -> KeyResult {
        Ok(Some(v.to_string()))
    }

    fn serialize_i64(self, v: i64) -> KeyResult {
        Ok(Some(v.to_string()))
    }

    fn serialize_i128(self, v: i128) -> KeyResult {
        Ok(Some(v.to_string()))
    }

    fn serialize_u8(self, v: u8) -> KeyResult {
        Ok(Some(v.to_string()))
    }

    fn serialize_u16(self, v: u16) -> KeyResult {
        Ok(Some(v.to_string()))
    }

    fn serialize_u32(self, v: u32) -> KeyResult {
        Ok(Some(v.to_string()))
    }

    fn serialize_u64(self, v: u64) -> KeyResult {
        Ok(Some(v.to_string()))
    }

    fn serialize_u128(self, v: u128) -> KeyResult {
        Ok(Some(v.to_string()))
    }

    fn serialize_f32(self, v: f32) -> KeyResult {
        Ok(Some(canonical_number(&v.to_string()).into_owned()))
    }

    fn serialize_f64(self, v: f64) -> KeyResult {
        Ok(Some(canonical_number(&v.to_string()).into_owned()))
    }

    fn serialize_char(self, v: char) -> KeyResult {
        Ok(Some(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> KeyResult {
        Ok(Some(v.to_owned()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> KeyResult {
        Err(unsupported("bytes"))
    }

    fn serialize_none(self) -> KeyResult {
        Ok(None)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> KeyResult {
        value.serialize(self)
    }

    fn serialize_unit(self) -> KeyResult {
        Ok(None)
    }

    fn serialize_unit_struct(self, name: &'static str) -> KeyResult {
        Ok(Some(name.to_owned()))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> KeyResult {
        Ok(Some(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> KeyResult {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> KeyResult {
        Err(unsupported(&format!("variant {variant}")))
    }

    fn serialize_seq(self, _len: Option<usize>) -> XmlResult<Self::SerializeSeq> {
        Err(unsupported("a sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> XmlResult<Self::SerializeTuple> {
        Err(unsupported("a tuple"))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> XmlResult<Self::SerializeTupleStruct> {
        Err(unsupported(name))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> XmlResult<Self::SerializeTupleVariant> {
        Err(unsupported(&format!("variant {variant}")))
    }

    fn serialize_map(self, _len: Option<usize>) -> XmlResult<Self::SerializeMap> {
        Err(unsupported("a map"))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> XmlResult<Self::SerializeStruct> {
        Err(unsupported(name))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> XmlResult<Self::SerializeStructVariant> {
        Err(unsupported(&format!("variant {variant}")))
    }
}
