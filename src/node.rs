//! The generic, format-independent KeyValues tree.
//!
//! Every reader produces the same shape: a [`KvDocument`] holding the root's
//! name and a [`KvNode`]. A node is either a typed leaf ([`KvValue`]), an
//! ordered object ([`KvMap`]) or an array.
//!
//! ## Examples
//!
//! ```rust
//! use serde_keyvalues::{parse_document, KvFormat, KvOptions, KvValue};
//!
//! let text = "<!-- kv3 encoding:text:version{e21c7f3c-8a33-41c5-9977-a76d3a32aa0d} format:generic:version{7412167c-06e9-4698-aff2-e63eb59037e7} -->\n{\n  nums = [1, 2, 3]\n}\n";
//! let options = KvOptions::new().with_format(KvFormat::KeyValues3Text);
//! let doc = parse_document(text, &options).unwrap();
//!
//! let nums = doc.value().get("nums").and_then(|n| n.as_array()).unwrap();
//! assert_eq!(nums[2].as_value(), Some(&KvValue::Int32(3)));
//! ```

use crate::{KvMap, KvValue};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A node of the generic tree.
#[derive(Clone, Debug, PartialEq)]
pub enum KvNode {
    Value(KvValue),
    Object(KvMap),
    Array(Vec<KvNode>),
}

/// A parsed document: the root's name plus its node.
///
/// KV3 documents are always named `"root"`. KV1 documents take the name of
/// their first key.
#[derive(Clone, Debug, PartialEq)]
pub struct KvDocument {
    name: String,
    value: KvNode,
}

impl KvDocument {
    #[must_use]
    pub fn new(name: impl Into<String>, value: KvNode) -> Self {
        KvDocument {
            name: name.into(),
            value,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &KvNode {
        &self.value
    }

    #[must_use]
    pub fn into_value(self) -> KvNode {
        self.value
    }
}

impl KvNode {
    #[inline]
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, KvNode::Value(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, KvNode::Object(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, KvNode::Array(_))
    }

    /// If the node is a leaf, returns its value.
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> Option<&KvValue> {
        match self {
            KvNode::Value(v) => Some(v),
            _ => None,
        }
    }

    /// If the node is a string leaf, returns it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(KvValue::as_str)
    }

    /// If the node is an integer leaf, returns it widened to `i64`.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(KvValue::as_i64)
    }

    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&KvMap> {
        match self {
            KvNode::Object(obj) => Some(obj),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<KvNode>> {
        match self {
            KvNode::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Looks up a child by key when this node is an object.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&KvNode> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// A short description of the node kind, used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            KvNode::Value(v) => v.value_type().to_string(),
            KvNode::Object(_) => "object".to_string(),
            KvNode::Array(_) => "array".to_string(),
        }
    }
}

impl fmt::Display for KvNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KvNode::Value(v) => write!(f, "{}", v),
            KvNode::Object(obj) => write!(f, "{{object with {} keys}}", obj.len()),
            KvNode::Array(arr) => write!(f, "[array of {}]", arr.len()),
        }
    }
}

impl Serialize for KvNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            KvNode::Value(KvValue::String(s)) => serializer.serialize_str(s),
            KvNode::Value(KvValue::Int32(i)) | KvNode::Value(KvValue::Pointer(i)) => {
                serializer.serialize_i32(*i)
            }
            KvNode::Value(KvValue::UInt64(u)) => serializer.serialize_u64(*u),
            KvNode::Value(KvValue::Int64(i)) => serializer.serialize_i64(*i),
            KvNode::Value(KvValue::Float(f)) => serializer.serialize_f32(*f),
            KvNode::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            KvNode::Object(obj) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(obj.len()))?;
                for (k, v) in obj.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for KvNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct KvNodeVisitor;

        impl<'de> Visitor<'de> for KvNodeVisitor {
            type Value = KvNode;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any KeyValues value, object or array")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(KvNode::Value(KvValue::Int32(i32::from(value))))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(KvNode::Value(match i32::try_from(value) {
                    Ok(i) => KvValue::Int32(i),
                    Err(_) => KvValue::Int64(value),
                }))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(KvNode::Value(match i32::try_from(value) {
                    Ok(i) => KvValue::Int32(i),
                    Err(_) => KvValue::UInt64(value),
                }))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(KvNode::Value(KvValue::Float(value as f32)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(KvNode::Value(KvValue::String(value.to_string())))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(KvNode::Value(KvValue::String(value)))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Err(E::custom("KeyValues has no null value"))
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(KvNode::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = KvMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    values.insert(key, value);
                }
                Ok(KvNode::Object(values))
            }
        }

        deserializer.deserialize_any(KvNodeVisitor)
    }
}

impl From<KvValue> for KvNode {
    fn from(value: KvValue) -> Self {
        KvNode::Value(value)
    }
}

impl From<i32> for KvNode {
    fn from(value: i32) -> Self {
        KvNode::Value(KvValue::Int32(value))
    }
}

impl From<u64> for KvNode {
    fn from(value: u64) -> Self {
        KvNode::Value(KvValue::UInt64(value))
    }
}

impl From<i64> for KvNode {
    fn from(value: i64) -> Self {
        KvNode::Value(KvValue::Int64(value))
    }
}

impl From<f32> for KvNode {
    fn from(value: f32) -> Self {
        KvNode::Value(KvValue::Float(value))
    }
}

/// Narrows to `f32`, the only float KeyValues stores.
impl From<f64> for KvNode {
    fn from(value: f64) -> Self {
        KvNode::Value(KvValue::Float(value as f32))
    }
}

impl From<bool> for KvNode {
    fn from(value: bool) -> Self {
        KvNode::Value(KvValue::Int32(i32::from(value)))
    }
}

impl From<String> for KvNode {
    fn from(value: String) -> Self {
        KvNode::Value(KvValue::String(value))
    }
}

impl From<&str> for KvNode {
    fn from(value: &str) -> Self {
        KvNode::Value(KvValue::String(value.to_string()))
    }
}

impl From<KvMap> for KvNode {
    fn from(value: KvMap) -> Self {
        KvNode::Object(value)
    }
}

impl From<Vec<KvNode>> for KvNode {
    fn from(value: Vec<KvNode>) -> Self {
        KvNode::Array(value)
    }
}
