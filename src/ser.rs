//! Serde serialization into the generic tree.
//!
//! [`NodeSerializer`] turns any `Serialize` value into a [`KvNode`], which the
//! writers then render in the requested format. KeyValues has no booleans and
//! no null, so:
//!
//! - `bool` becomes `Int32` 0 or 1
//! - `None` and unit fields are left out of their parent object
//! - integers that fit use `Int32`, wider signed values `Int64`, and `u64`
//!   always uses `UInt64`
//! - `f64` narrows to `f32`
//!
//! ```rust
//! use serde::Serialize;
//! use serde_keyvalues::{to_node, KvNode};
//!
//! #[derive(Serialize)]
//! struct Player { name: String, score: i32, nick: Option<String> }
//!
//! let node = to_node(&Player { name: "gordon".into(), score: 3, nick: None }).unwrap();
//! assert_eq!(node.get("score").and_then(KvNode::as_i64), Some(3));
//! assert!(node.get("nick").is_none());
//! ```

use crate::{Error, KvMap, KvNode, KvValue, Result};
use serde::{ser, Serialize};

/// A serializer producing `Some(node)`, or `None` for values KeyValues omits.
pub struct NodeSerializer;

pub struct SerializeVec {
    vec: Vec<KvNode>,
}

pub struct SerializeMap {
    map: KvMap,
    current_key: Option<String>,
}

/// Wraps a single field in a one-entry object named after an enum variant.
pub struct SerializeVariant {
    variant: &'static str,
    inner: SerializeMap,
}

fn leaf(value: KvValue) -> Result<Option<KvNode>> {
    Ok(Some(KvNode::Value(value)))
}

fn narrow_i64(v: i64) -> KvValue {
    match i32::try_from(v) {
        Ok(i) => KvValue::Int32(i),
        Err(_) => KvValue::Int64(v),
    }
}

impl ser::Serializer for NodeSerializer {
    type Ok = Option<KvNode>;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = ser::Impossible<Option<KvNode>, Error>;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeVariant;

    fn serialize_bool(self, v: bool) -> Result<Option<KvNode>> {
        leaf(KvValue::Int32(i32::from(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<Option<KvNode>> {
        leaf(KvValue::Int32(i32::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Option<KvNode>> {
        leaf(KvValue::Int32(i32::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Option<KvNode>> {
        leaf(KvValue::Int32(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Option<KvNode>> {
        leaf(narrow_i64(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Option<KvNode>> {
        leaf(KvValue::Int32(i32::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Option<KvNode>> {
        leaf(KvValue::Int32(i32::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Option<KvNode>> {
        leaf(narrow_i64(i64::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Option<KvNode>> {
        leaf(KvValue::UInt64(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Option<KvNode>> {
        leaf(KvValue::Float(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Option<KvNode>> {
        leaf(KvValue::Float(v as f32))
    }

    fn serialize_char(self, v: char) -> Result<Option<KvNode>> {
        leaf(KvValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Option<KvNode>> {
        leaf(KvValue::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Option<KvNode>> {
        let vec = v
            .iter()
            .map(|&b| KvNode::Value(KvValue::Int32(i32::from(b))))
            .collect();
        Ok(Some(KvNode::Array(vec)))
    }

    fn serialize_none(self) -> Result<Option<KvNode>> {
        Ok(None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Option<KvNode>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Option<KvNode>> {
        Ok(None)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Option<KvNode>> {
        Ok(None)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Option<KvNode>> {
        leaf(KvValue::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Option<KvNode>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Option<KvNode>>
    where
        T: ?Sized + Serialize,
    {
        let mut map = KvMap::new();
        if let Some(node) = to_optional_node(value)? {
            map.insert(variant.to_string(), node);
        }
        Ok(Some(KvNode::Object(map)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::unsupported_type("tuple variants"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeVariant> {
        Ok(SerializeVariant {
            variant,
            inner: SerializeMap::new(),
        })
    }
}

impl SerializeVec {
    fn new(capacity: usize) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        // arrays have no holes to leave
        let node = to_optional_node(value)?
            .ok_or_else(|| Error::unsupported_type("null array elements"))?;
        self.vec.push(node);
        Ok(())
    }
}

impl SerializeMap {
    fn new() -> Self {
        SerializeMap {
            map: KvMap::new(),
            current_key: None,
        }
    }

    fn insert<T: ?Sized + Serialize>(&mut self, key: String, value: &T) -> Result<()> {
        if let Some(node) = to_optional_node(value)? {
            self.map.insert(key, node);
        }
        Ok(())
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Option<KvNode>;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Option<KvNode>> {
        Ok(Some(KvNode::Array(self.vec)))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Option<KvNode>;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Option<KvNode>> {
        Ok(Some(KvNode::Array(self.vec)))
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Option<KvNode>;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Option<KvNode>> {
        Ok(Some(KvNode::Array(self.vec)))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Option<KvNode>;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        // numeric keys are allowed and written in decimal
        let key = match to_optional_node(key)? {
            Some(KvNode::Value(KvValue::String(s))) => s,
            Some(KvNode::Value(value)) if value.value_type() != crate::KvValueType::Float => {
                value.to_string()
            }
            _ => return Err(Error::custom("map keys must be strings or integers")),
        };
        self.current_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Option<KvNode>> {
        Ok(Some(KvNode::Object(self.map)))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Option<KvNode>;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Option<KvNode>> {
        Ok(Some(KvNode::Object(self.map)))
    }
}

impl ser::SerializeStructVariant for SerializeVariant {
    type Ok = Option<KvNode>;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.inner.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Option<KvNode>> {
        let mut outer = KvMap::new();
        outer.insert(self.variant.to_string(), KvNode::Object(self.inner.map));
        Ok(Some(KvNode::Object(outer)))
    }
}

fn to_optional_node<T: Serialize + ?Sized>(value: &T) -> Result<Option<KvNode>> {
    value.serialize(NodeSerializer)
}

/// Converts a value into a [`KvNode`].
///
/// # Errors
///
/// Fails for values with no KeyValues representation: a top-level `None` or
/// unit, tuple variants, `i128`/`u128`, or `None` inside a sequence.
pub fn to_node<T: Serialize + ?Sized>(value: &T) -> Result<KvNode> {
    to_optional_node(value)?.ok_or_else(|| Error::unsupported_type("a null document"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    enum Shape {
        Point,
        Circle(f32),
        Rect { w: i32, h: i32 },
    }

    #[test]
    fn test_primitives() {
        assert_eq!(to_node(&true).unwrap(), KvNode::from(1));
        assert_eq!(to_node(&7u8).unwrap(), KvNode::from(7));
        assert_eq!(to_node(&(1i64 << 40)).unwrap(), KvNode::from(1i64 << 40));
        assert_eq!(to_node(&5u64).unwrap(), KvNode::from(5u64));
        assert_eq!(to_node(&u32::MAX).unwrap(), KvNode::from(i64::from(u32::MAX)));
        assert_eq!(to_node(&0.5f64).unwrap(), KvNode::from(0.5f32));
        assert_eq!(to_node(&'x').unwrap(), KvNode::from("x"));
    }

    #[test]
    fn test_none_is_dropped_from_objects() {
        let mut map = BTreeMap::new();
        map.insert("a", Some(1));
        map.insert("b", None);
        let node = to_node(&map).unwrap();
        assert_eq!(node.as_object().map(KvMap::len), Some(1));
        assert!(to_node(&None::<i32>).is_err());
        assert!(to_node(&vec![Some(1), None]).is_err());
    }

    #[test]
    fn test_integer_map_keys() {
        let mut map = BTreeMap::new();
        map.insert(3, "three");
        let node = to_node(&map).unwrap();
        assert_eq!(node.get("3").and_then(KvNode::as_str), Some("three"));
    }

    #[test]
    fn test_enums() {
        assert_eq!(to_node(&Shape::Point).unwrap(), KvNode::from("Point"));
        let circle = to_node(&Shape::Circle(2.0)).unwrap();
        assert_eq!(circle.get("Circle"), Some(&KvNode::from(2.0f32)));
        let rect = to_node(&Shape::Rect { w: 1, h: 2 }).unwrap();
        assert_eq!(
            rect.get("Rect").and_then(|r| r.get("h")).and_then(KvNode::as_i64),
            Some(2)
        );
    }
}
