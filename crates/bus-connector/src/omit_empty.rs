//! Serialization that leaves empty values out of JSON objects.
//!
//! [`OmitEmpty`] wraps any `Serialize` value and forwards it to the target
//! serializer one call at a time, so nothing is staged in memory. Map
//! entries and struct fields whose value serializes as `null`, `""`, `[]` or
//! `{}` are skipped before their key is written. Sequence elements are never
//! skipped, but objects nested inside them are filtered the same way.
//!
//! Emptiness is decided by [`is_empty`], which inspects only the outermost
//! shape of a value. A struct whose fields are all empty is not itself
//! empty: it is written as `{}`.

use serde::ser::{self, Serialize, Serializer};
use std::fmt;

#[cfg(test)]
#[path = "omit_empty_tests.rs"]
mod tests;

/// A value serialized with empty object entries left out
pub struct OmitEmpty<'a, T: ?Sized>(pub &'a T);

impl<T: Serialize + ?Sized> Serialize for OmitEmpty<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(OmitEmptySerializer(serializer))
    }
}

/// Whether `value` serializes as `null`, `""`, `[]` or `{}`
///
/// A value that fails to serialize is reported as not empty, so the error
/// surfaces when it is written.
pub fn is_empty<T: Serialize + ?Sized>(value: &T) -> bool {
    value.serialize(EmptinessCheck).unwrap_or(false)
}

// ============================================================================
// Forwarding serializer
// ============================================================================

struct OmitEmptySerializer<S>(S);

impl<S: Serializer> Serializer for OmitEmptySerializer<S> {
    type Ok = S::Ok;
    type Error = S::Error;
    type SerializeSeq = OmitEmptyCompound<S::SerializeSeq>;
    type SerializeTuple = OmitEmptyCompound<S::SerializeTuple>;
    type SerializeTupleStruct = OmitEmptyCompound<S::SerializeTupleStruct>;
    type SerializeTupleVariant = OmitEmptyCompound<S::SerializeTupleVariant>;
    type SerializeMap = OmitEmptyCompound<S::SerializeMap>;
    type SerializeStruct = OmitEmptyCompound<S::SerializeStruct>;
    type SerializeStructVariant = OmitEmptyCompound<S::SerializeStructVariant>;

    fn serialize_bool(self, v: bool) -> Result<S::Ok, S::Error> {
        self.0.serialize_bool(v)
    }

    fn serialize_i8(self, v: i8) -> Result<S::Ok, S::Error> {
        self.0.serialize_i8(v)
    }

    fn serialize_i16(self, v: i16) -> Result<S::Ok, S::Error> {
        self.0.serialize_i16(v)
    }

    fn serialize_i32(self, v: i32) -> Result<S::Ok, S::Error> {
        self.0.serialize_i32(v)
    }

    fn serialize_i64(self, v: i64) -> Result<S::Ok, S::Error> {
        self.0.serialize_i64(v)
    }

    fn serialize_i128(self, v: i128) -> Result<S::Ok, S::Error> {
        self.0.serialize_i128(v)
    }

    fn serialize_u8(self, v: u8) -> Result<S::Ok, S::Error> {
        self.0.serialize_u8(v)
    }

    fn serialize_u16(self, v: u16) -> Result<S::Ok, S::Error> {
        self.0.serialize_u16(v)
    }

    fn serialize_u32(self, v: u32) -> Result<S::Ok, S::Error> {
        self.0.serialize_u32(v)
    }

    fn serialize_u64(self, v: u64) -> Result<S::Ok, S::Error> {
        self.0.serialize_u64(v)
    }

    fn serialize_u128(self, v: u128) -> Result<S::Ok, S::Error> {
        self.0.serialize_u128(v)
    }

    fn serialize_f32(self, v: f32) -> Result<S::Ok, S::Error> {
        self.0.serialize_f32(v)
    }

    fn serialize_f64(self, v: f64) -> Result<S::Ok, S::Error> {
        self.0.serialize_f64(v)
    }

    fn serialize_char(self, v: char) -> Result<S::Ok, S::Error> {
        self.0.serialize_char(v)
    }

    fn serialize_str(self, v: &str) -> Result<S::Ok, S::Error> {
        self.0.serialize_str(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<S::Ok, S::Error> {
        self.0.serialize_bytes(v)
    }

    fn serialize_none(self) -> Result<S::Ok, S::Error> {
        self.0.serialize_none()
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<S::Ok, S::Error> {
        self.0.serialize_some(&OmitEmpty(value))
    }

    fn serialize_unit(self) -> Result<S::Ok, S::Error> {
        self.0.serialize_unit()
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<S::Ok, S::Error> {
        self.0.serialize_unit_struct(name)
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<S::Ok, S::Error> {
        self.0.serialize_unit_variant(name, variant_index, variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<S::Ok, S::Error> {
        self.0.serialize_newtype_struct(name, &OmitEmpty(value))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<S::Ok, S::Error> {
        self.0
            .serialize_newtype_variant(name, variant_index, variant, &OmitEmpty(value))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, S::Error> {
        self.0.serialize_seq(len).map(OmitEmptyCompound::new)
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, S::Error> {
        self.0.serialize_tuple(len).map(OmitEmptyCompound::new)
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, S::Error> {
        self.0
            .serialize_tuple_struct(name, len)
            .map(OmitEmptyCompound::new)
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, S::Error> {
        self.0
            .serialize_tuple_variant(name, variant_index, variant, len)
            .map(OmitEmptyCompound::new)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, S::Error> {
        self.0.serialize_map(len).map(OmitEmptyCompound::new)
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, S::Error> {
        self.0
            .serialize_struct(name, len)
            .map(OmitEmptyCompound::new)
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, S::Error> {
        self.0
            .serialize_struct_variant(name, variant_index, variant, len)
            .map(OmitEmptyCompound::new)
    }

    fn is_human_readable(&self) -> bool {
        self.0.is_human_readable()
    }
}

struct OmitEmptyCompound<C> {
    inner: C,
    // Key of a map entry written through `serialize_key`, held until its
    // value shows whether the entry is kept
    pending_key: Option<serde_json::Value>,
}

impl<C> OmitEmptyCompound<C> {
    fn new(inner: C) -> Self {
        Self {
            inner,
            pending_key: None,
        }
    }
}

impl<C: ser::SerializeSeq> ser::SerializeSeq for OmitEmptyCompound<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_element(&OmitEmpty(value))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTuple> ser::SerializeTuple for OmitEmptyCompound<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_element(&OmitEmpty(value))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTupleStruct> ser::SerializeTupleStruct for OmitEmptyCompound<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_field(&OmitEmpty(value))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTupleVariant> ser::SerializeTupleVariant for OmitEmptyCompound<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_field(&OmitEmpty(value))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeMap> ser::SerializeMap for OmitEmptyCompound<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), C::Error> {
        let key = serde_json::to_value(key).map_err(<C::Error as ser::Error>::custom)?;
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), C::Error> {
        let key = self.pending_key.take().ok_or_else(|| {
            <C::Error as ser::Error>::custom("map value serialized before its key")
        })?;
        if is_empty(value) {
            return Ok(());
        }
        self.inner.serialize_entry(&key, &OmitEmpty(value))
    }

    fn serialize_entry<K, V>(&mut self, key: &K, value: &V) -> Result<(), C::Error>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        if is_empty(value) {
            return Ok(());
        }
        self.inner.serialize_entry(key, &OmitEmpty(value))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeStruct> ser::SerializeStruct for OmitEmptyCompound<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), C::Error> {
        if is_empty(value) {
            return self.inner.skip_field(key);
        }
        self.inner.serialize_field(key, &OmitEmpty(value))
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), C::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeStructVariant> ser::SerializeStructVariant for OmitEmptyCompound<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), C::Error> {
        if is_empty(value) {
            return self.inner.skip_field(key);
        }
        self.inner.serialize_field(key, &OmitEmpty(value))
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), C::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

// ============================================================================
// Emptiness check
// ============================================================================

/// Serializer that answers whether a value's JSON form is empty
///
/// Compound values are not descended into: the first element or entry is
/// enough to make them non-empty.
struct EmptinessCheck;

#[derive(Debug)]
struct EmptinessCheckError(String);

impl fmt::Display for EmptinessCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for EmptinessCheckError {}

impl ser::Error for EmptinessCheckError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

impl Serializer for EmptinessCheck {
    type Ok = bool;
    type Error = EmptinessCheckError;
    type SerializeSeq = ElementCount;
    type SerializeTuple = ElementCount;
    type SerializeTupleStruct = ElementCount;
    type SerializeTupleVariant = ElementCount;
    type SerializeMap = ElementCount;
    type SerializeStruct = ElementCount;
    type SerializeStructVariant = ElementCount;

    fn serialize_bool(self, _v: bool) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_i8(self, _v: i8) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_i16(self, _v: i16) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_i32(self, _v: i32) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_i64(self, _v: i64) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_i128(self, _v: i128) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_u8(self, _v: u8) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_u16(self, _v: u16) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_u32(self, _v: u32) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_u64(self, _v: u64) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_u128(self, _v: u128) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_f32(self, _v: f32) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_f64(self, _v: f64) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_char(self, _v: char) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_str(self, v: &str) -> Result<bool, Self::Error> {
        Ok(v.is_empty())
    }

    // JSON writes bytes as an array of numbers
    fn serialize_bytes(self, v: &[u8]) -> Result<bool, Self::Error> {
        Ok(v.is_empty())
    }

    fn serialize_none(self) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<bool, Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<bool, Self::Error> {
        Ok(variant.is_empty())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<bool, Self::Error> {
        value.serialize(self)
    }

    // Variants carrying data are written as a one-entry object
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<ElementCount, Self::Error> {
        Ok(ElementCount::empty())
    }

    fn serialize_tuple(self, _len: usize) -> Result<ElementCount, Self::Error> {
        Ok(ElementCount::empty())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<ElementCount, Self::Error> {
        Ok(ElementCount::empty())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<ElementCount, Self::Error> {
        Ok(ElementCount::non_empty())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<ElementCount, Self::Error> {
        Ok(ElementCount::empty())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<ElementCount, Self::Error> {
        Ok(ElementCount::empty())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<ElementCount, Self::Error> {
        Ok(ElementCount::non_empty())
    }
}

/// Tracks whether a compound value received any element
struct ElementCount {
    empty: bool,
}

impl ElementCount {
    fn empty() -> Self {
        Self { empty: true }
    }

    fn non_empty() -> Self {
        Self { empty: false }
    }

    fn record(&mut self) -> Result<(), EmptinessCheckError> {
        self.empty = false;
        Ok(())
    }
}

impl ser::SerializeSeq for ElementCount {
    type Ok = bool;
    type Error = EmptinessCheckError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Self::Error> {
        self.record()
    }

    fn end(self) -> Result<bool, Self::Error> {
        Ok(self.empty)
    }
}

impl ser::SerializeTuple for ElementCount {
    type Ok = bool;
    type Error = EmptinessCheckError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Self::Error> {
        self.record()
    }

    fn end(self) -> Result<bool, Self::Error> {
        Ok(self.empty)
    }
}

impl ser::SerializeTupleStruct for ElementCount {
    type Ok = bool;
    type Error = EmptinessCheckError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Self::Error> {
        self.record()
    }

    fn end(self) -> Result<bool, Self::Error> {
        Ok(self.empty)
    }
}

impl ser::SerializeTupleVariant for ElementCount {
    type Ok = bool;
    type Error = EmptinessCheckError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Self::Error> {
        self.record()
    }

    fn end(self) -> Result<bool, Self::Error> {
        Ok(self.empty)
    }
}

impl ser::SerializeMap for ElementCount {
    type Ok = bool;
    type Error = EmptinessCheckError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, _key: &T) -> Result<(), Self::Error> {
        self.record()
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Self::Error> {
        self.record()
    }

    fn end(self) -> Result<bool, Self::Error> {
        Ok(self.empty)
    }
}

impl ser::SerializeStruct for ElementCount {
    type Ok = bool;
    type Error = EmptinessCheckError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        _value: &T,
    ) -> Result<(), Self::Error> {
        self.record()
    }

    fn end(self) -> Result<bool, Self::Error> {
        Ok(self.empty)
    }
}

impl ser::SerializeStructVariant for ElementCount {
    type Ok = bool;
    type Error = EmptinessCheckError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        _value: &T,
    ) -> Result<(), Self::Error> {
        self.record()
    }

    fn end(self) -> Result<bool, Self::Error> {
        Ok(self.empty)
    }
}
