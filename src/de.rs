//! Serde deserialization from the generic tree.
//!
//! KV1 text stores every scalar as a string, so the deserializer is lenient:
//! a string converts to whatever numeric or boolean type the target asks for,
//! and an object whose keys are `"0"`, `"1"`, ... in order reads as a sequence.
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_keyvalues::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Window { width: u32, fullscreen: bool, tags: Vec<String> }
//!
//! let text = r#""window" { "width" "1280" "fullscreen" "1" "tags" { "0" "a" "1" "b" } }"#;
//! let window: Window = from_str(text).unwrap();
//! assert_eq!(window, Window { width: 1280, fullscreen: true, tags: vec!["a".into(), "b".into()] });
//! ```

use crate::{Error, KvMap, KvNode, KvValue, Result};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{de, forward_to_deserialize_any};

/// A deserializer reading from an owned [`KvNode`].
pub struct NodeDeserializer {
    node: KvNode,
}

impl NodeDeserializer {
    #[must_use]
    pub fn new(node: KvNode) -> Self {
        NodeDeserializer { node }
    }

    fn mismatch(&self, expected: &str) -> Error {
        Error::type_mismatch(expected, &self.node.describe())
    }

    fn signed(&self) -> Result<i64> {
        let value = match &self.node {
            KvNode::Value(KvValue::String(s)) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| parse_hex(s).and_then(|u| i64::try_from(u).ok()))
            }
            KvNode::Value(value) => value.as_i64(),
            _ => None,
        };
        value.ok_or_else(|| self.mismatch("integer"))
    }

    fn unsigned(&self) -> Result<u64> {
        let value = match &self.node {
            KvNode::Value(KvValue::String(s)) => {
                let s = s.trim();
                s.parse::<u64>().ok().or_else(|| parse_hex(s))
            }
            KvNode::Value(value) => value.as_u64(),
            _ => None,
        };
        value.ok_or_else(|| self.mismatch("unsigned integer"))
    }

    fn float(&self) -> Result<f64> {
        let value = match &self.node {
            KvNode::Value(KvValue::String(s)) => s.trim().parse::<f64>().ok(),
            KvNode::Value(value) => value.as_f32().map(f64::from),
            _ => None,
        };
        value.ok_or_else(|| self.mismatch("float"))
    }

    fn boolean(&self) -> Result<bool> {
        let value = match &self.node {
            KvNode::Value(KvValue::String(s)) => match s.trim() {
                "1" => Some(true),
                "0" => Some(false),
                other if other.eq_ignore_ascii_case("true") => Some(true),
                other if other.eq_ignore_ascii_case("false") => Some(false),
                _ => None,
            },
            KvNode::Value(value) => match value.as_i64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            _ => None,
        };
        value.ok_or_else(|| self.mismatch("boolean"))
    }
}

fn parse_hex(s: &str) -> Option<u64> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok()
}

/// An object keyed `"0"`, `"1"`, ... in order, as KV1 writes arrays.
fn indexed_elements(map: &KvMap) -> bool {
    map.keys()
        .enumerate()
        .all(|(i, key)| key.parse::<usize>() == Ok(i))
}

impl<'de> de::Deserializer<'de> for NodeDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.node {
            KvNode::Value(KvValue::String(s)) => visitor.visit_string(s),
            KvNode::Value(KvValue::Int32(i)) | KvNode::Value(KvValue::Pointer(i)) => {
                visitor.visit_i32(i)
            }
            KvNode::Value(KvValue::UInt64(u)) => visitor.visit_u64(u),
            KvNode::Value(KvValue::Int64(i)) => visitor.visit_i64(i),
            KvNode::Value(KvValue::Float(f)) => visitor.visit_f32(f),
            KvNode::Array(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            KvNode::Object(map) => visitor.visit_map(MapDeserializer::new(map)),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_bool(self.boolean()?)
    }

    fn deserialize_i8<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i64(self.signed()?)
    }

    fn deserialize_i16<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i64(self.signed()?)
    }

    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i64(self.signed()?)
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i64(self.signed()?)
    }

    fn deserialize_u8<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u64(self.unsigned()?)
    }

    fn deserialize_u16<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u64(self.unsigned()?)
    }

    fn deserialize_u32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u64(self.unsigned()?)
    }

    fn deserialize_u64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u64(self.unsigned()?)
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f64(self.float()?)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f64(self.float()?)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.node {
            KvNode::Value(KvValue::String(s)) => visitor.visit_string(s),
            KvNode::Value(value) => visitor.visit_string(value.to_string()),
            _ => Err(self.mismatch("string")),
        }
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        // absent keys become None through serde's missing-field handling
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.node {
            KvNode::Array(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            KvNode::Object(map) if indexed_elements(&map) => {
                let items = map.into_iter().map(|(_, node)| node).collect();
                visitor.visit_seq(SeqDeserializer::new(items))
            }
            _ => Err(self.mismatch("sequence")),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.node {
            KvNode::Object(map) => visitor.visit_map(MapDeserializer::new(map)),
            _ => Err(self.mismatch("object")),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.node {
            KvNode::Value(KvValue::String(variant)) => visitor.visit_enum(variant.into_deserializer()),
            KvNode::Object(map) if map.len() == 1 => {
                let (variant, value) = map
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::custom("empty enum object"))?;
                visitor.visit_enum(EnumDeserializer { variant, value })
            }
            _ => Err(self.mismatch("enum")),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        i128 u128
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<KvNode>,
}

impl SeqDeserializer {
    fn new(vec: Vec<KvNode>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(node) => seed.deserialize(NodeDeserializer::new(node)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, KvNode>,
    value: Option<KvNode>,
}

impl MapDeserializer {
    fn new(map: KvMap) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(NodeDeserializer::new(KvNode::from(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(NodeDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: KvNode,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(NodeDeserializer::new(KvNode::from(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: KvNode,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            KvNode::Object(map) if map.is_empty() => Ok(()),
            other => Err(Error::type_mismatch("unit variant", &other.describe())),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(NodeDeserializer::new(self.value))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(NodeDeserializer::new(self.value), visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_map(NodeDeserializer::new(self.value), visitor)
    }
}

/// Converts a [`KvNode`] into any deserializable type.
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] when the tree's shape does not fit `T`.
pub fn from_node<T: DeserializeOwned>(node: KvNode) -> Result<T> {
    T::deserialize(NodeDeserializer::new(node))
}
