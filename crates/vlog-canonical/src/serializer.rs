//! Strict serde serializer producing [`CanonicalValue`] trees.

use serde::ser::{self, Impossible, Serialize};
use std::collections::BTreeMap;
use unicode_normalization::UnicodeNormalization;

use crate::canonicalizer::{CanonicalValue, CanonicalizationError, Path};

type Result<T> = std::result::Result<T, CanonicalizationError>;

/// Struct name serde_json uses to carry an arbitrary-precision number as text.
const NUMBER_TOKEN: &str = "$serde_json::private::Number";

pub(crate) fn nfc(s: &str) -> String {
    s.nfc().collect()
}

pub(crate) struct ValueSerializer {
    path: Path,
}

impl ValueSerializer {
    pub(crate) fn new(path: Path) -> Self {
        Self { path }
    }
}

impl ser::Serializer for ValueSerializer {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantSeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = VariantMapBuilder;

    fn serialize_bool(self, v: bool) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Integer(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Integer(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Integer(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Integer(v.into()))
    }

    fn serialize_i128(self, v: i128) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Integer(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Integer(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Integer(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Integer(v.into()))
    }

    fn serialize_u128(self, v: u128) -> Result<CanonicalValue> {
        i128::try_from(v)
            .map(CanonicalValue::Integer)
            .map_err(|_| CanonicalizationError::IntegerOutOfRange(self.path.to_string()))
    }

    fn serialize_f32(self, _v: f32) -> Result<CanonicalValue> {
        Err(CanonicalizationError::FloatNotAllowed(self.path.to_string()))
    }

    fn serialize_f64(self, _v: f64) -> Result<CanonicalValue> {
        Err(CanonicalizationError::FloatNotAllowed(self.path.to_string()))
    }

    fn serialize_char(self, v: char) -> Result<CanonicalValue> {
        let mut buf = [0u8; 4];
        Ok(CanonicalValue::String(nfc(v.encode_utf8(&mut buf))))
    }

    fn serialize_str(self, v: &str) -> Result<CanonicalValue> {
        Ok(CanonicalValue::String(nfc(v)))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<CanonicalValue> {
        Err(CanonicalizationError::BytesNotAllowed(self.path.to_string()))
    }

    fn serialize_none(self) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<CanonicalValue> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<CanonicalValue> {
        Ok(CanonicalValue::String(nfc(variant)))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<CanonicalValue> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<CanonicalValue> {
        let key = nfc(variant);
        let inner = value.serialize(ValueSerializer::new(self.path.push_field(&key)))?;
        let mut map = BTreeMap::new();
        map.insert(key, inner);
        Ok(CanonicalValue::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder> {
        Ok(SeqBuilder::new(self.path, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder> {
        Ok(SeqBuilder::new(self.path, len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqBuilder> {
        Ok(SeqBuilder::new(self.path, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantSeqBuilder> {
        let key = nfc(variant);
        let inner = SeqBuilder::new(self.path.push_field(&key), len);
        Ok(VariantSeqBuilder { key, inner })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapBuilder> {
        Ok(MapBuilder::new(self.path))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<MapBuilder> {
        let mut builder = MapBuilder::new(self.path);
        builder.number = name == NUMBER_TOKEN;
        Ok(builder)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<VariantMapBuilder> {
        let key = nfc(variant);
        let inner = MapBuilder::new(self.path.push_field(&key));
        Ok(VariantMapBuilder { key, inner })
    }
}

pub(crate) struct SeqBuilder {
    path: Path,
    items: Vec<CanonicalValue>,
}

impl SeqBuilder {
    fn new(path: Path, capacity: usize) -> Self {
        Self {
            path,
            items: Vec::with_capacity(capacity),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let path = self.path.push_index(self.items.len());
        self.items.push(value.serialize(ValueSerializer::new(path))?);
        Ok(())
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Array(self.items))
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Array(self.items))
    }
}

pub(crate) struct VariantSeqBuilder {
    key: String,
    inner: SeqBuilder,
}

impl ser::SerializeTupleVariant for VariantSeqBuilder {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.inner.push(value)
    }

    fn end(self) -> Result<CanonicalValue> {
        let mut map = BTreeMap::new();
        map.insert(self.key, CanonicalValue::Array(self.inner.items));
        Ok(CanonicalValue::Object(map))
    }
}

pub(crate) struct MapBuilder {
    path: Path,
    entries: BTreeMap<String, CanonicalValue>,
    pending_key: Option<String>,
    number: bool,
    number_text: Option<String>,
}

impl MapBuilder {
    fn new(path: Path) -> Self {
        Self {
            path,
            entries: BTreeMap::new(),
            pending_key: None,
            number: false,
            number_text: None,
        }
    }

    fn capture_number<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        match value.serialize(ValueSerializer::new(self.path.clone()))? {
            CanonicalValue::String(text) => {
                self.number_text = Some(text);
                Ok(())
            }
            _ => Err(CanonicalizationError::Other(format!(
                "malformed number at {}",
                self.path
            ))),
        }
    }

    fn insert<T: ?Sized + Serialize>(&mut self, key: String, value: &T) -> Result<()> {
        let child = value.serialize(ValueSerializer::new(self.path.push_field(&key)))?;
        // Keys that collide after normalization: last one wins.
        self.entries.insert(key, child);
        Ok(())
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.pending_key = Some(key.serialize(KeySerializer { path: &self.path })?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self.pending_key.take().ok_or_else(|| {
            CanonicalizationError::Other(format!("map value without key at {}", self.path))
        })?;
        self.insert(key, value)
    }

    fn end(self) -> Result<CanonicalValue> {
        Ok(CanonicalValue::Object(self.entries))
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        if self.number {
            return self.capture_number(value);
        }
        self.insert(nfc(key), value)
    }

    fn end(self) -> Result<CanonicalValue> {
        if self.number {
            let text = self.number_text.unwrap_or_default();
            return parse_number(&text, &self.path);
        }
        Ok(CanonicalValue::Object(self.entries))
    }
}

/// Integers of any width up to `i128`; anything with a fraction or exponent
/// is a float.
fn parse_number(text: &str, path: &Path) -> Result<CanonicalValue> {
    if text.is_empty() || text.contains(['.', 'e', 'E']) {
        return Err(CanonicalizationError::FloatNotAllowed(path.to_string()));
    }
    text.parse::<i128>()
        .map(CanonicalValue::Integer)
        .map_err(|_| CanonicalizationError::IntegerOutOfRange(path.to_string()))
}

pub(crate) struct VariantMapBuilder {
    key: String,
    inner: MapBuilder,
}

impl ser::SerializeStructVariant for VariantMapBuilder {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.inner.insert(nfc(key), value)
    }

    fn end(self) -> Result<CanonicalValue> {
        let mut map = BTreeMap::new();
        map.insert(self.key, CanonicalValue::Object(self.inner.entries));
        Ok(CanonicalValue::Object(map))
    }
}

/// Accepts only string-like map keys.
struct KeySerializer<'a> {
    path: &'a Path,
}

impl KeySerializer<'_> {
    fn reject(&self) -> CanonicalizationError {
        CanonicalizationError::NonStringKey(self.path.to_string())
    }
}

impl ser::Serializer for KeySerializer<'_> {
    type Ok = String;
    type Error = CanonicalizationError;

    type SerializeSeq = Impossible<String, CanonicalizationError>;
    type SerializeTuple = Impossible<String, CanonicalizationError>;
    type SerializeTupleStruct = Impossible<String, CanonicalizationError>;
    type SerializeTupleVariant = Impossible<String, CanonicalizationError>;
    type SerializeMap = Impossible<String, CanonicalizationError>;
    type SerializeStruct = Impossible<String, CanonicalizationError>;
    type SerializeStructVariant = Impossible<String, CanonicalizationError>;

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(nfc(v))
    }

    fn serialize_char(self, v: char) -> Result<String> {
        let mut buf = [0u8; 4];
        Ok(nfc(v.encode_utf8(&mut buf)))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String> {
        value.serialize(self)
    }

    fn serialize_bool(self, _v: bool) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_i8(self, _v: i8) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_i16(self, _v: i16) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_i32(self, _v: i32) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_i64(self, _v: i64) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_u8(self, _v: u8) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_u16(self, _v: u16) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_u32(self, _v: u32) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_u64(self, _v: u64) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_i128(self, _v: i128) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_u128(self, _v: u128) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_f32(self, _v: f32) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_f64(self, _v: f64) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_none(self) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_unit(self) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(self.reject())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(self.reject())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(self.reject())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(self.reject())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(self.reject())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(self.reject())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(self.reject())
    }
}
