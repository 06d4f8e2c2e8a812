//! Leaf values and literal coercion.
//!
//! This module provides [`KvValue`], the typed scalar stored at the leaves of a
//! KeyValues tree, and [`coerce_literal`], which decides the type of an unquoted
//! literal read from KV3 text.
//!
//! ## Coercion Order
//!
//! An unquoted literal is classified by the first rule that matches:
//!
//! 1. `0x` followed by exactly 16 hex digits becomes [`KvValue::UInt64`]
//! 2. a base-10 integer in `i32` range becomes [`KvValue::Int32`]
//! 3. a decimal or exponential number becomes [`KvValue::Float`]
//! 4. anything else is kept verbatim as [`KvValue::String`]
//!
//! ```rust
//! use serde_keyvalues::{coerce_literal, KvValue};
//!
//! assert_eq!(coerce_literal("0x0000000000000001"), KvValue::UInt64(1));
//! assert_eq!(coerce_literal("42"), KvValue::Int32(42));
//! assert_eq!(coerce_literal("42.5"), KvValue::Float(42.5));
//! assert_eq!(coerce_literal("abc"), KvValue::String("abc".to_string()));
//! ```

use std::fmt;

/// "0x" plus two hex digits per byte of a `u64`.
const HEX_BLOB_LEN: usize = 2 + 2 * std::mem::size_of::<u64>();

/// The type tag of a [`KvValue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KvValueType {
    String,
    Int32,
    UInt64,
    Int64,
    Float,
    Pointer,
}

impl fmt::Display for KvValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KvValueType::String => "string",
            KvValueType::Int32 => "int32",
            KvValueType::UInt64 => "uint64",
            KvValueType::Int64 => "int64",
            KvValueType::Float => "float",
            KvValueType::Pointer => "pointer",
        };
        f.write_str(name)
    }
}

/// A typed scalar leaf.
///
/// Text formats produce `String`, `Int32`, `UInt64` and `Float`. The binary
/// format can additionally carry `Int64` and `Pointer` values.
///
/// # Examples
///
/// ```rust
/// use serde_keyvalues::{KvValue, KvValueType};
///
/// let value = KvValue::from(7);
/// assert_eq!(value.value_type(), KvValueType::Int32);
/// assert_eq!(value.as_i64(), Some(7));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum KvValue {
    String(String),
    Int32(i32),
    UInt64(u64),
    Int64(i64),
    Float(f32),
    Pointer(i32),
}

impl KvValue {
    /// Returns the type tag of this value.
    #[inline]
    #[must_use]
    pub const fn value_type(&self) -> KvValueType {
        match self {
            KvValue::String(_) => KvValueType::String,
            KvValue::Int32(_) => KvValueType::Int32,
            KvValue::UInt64(_) => KvValueType::UInt64,
            KvValue::Int64(_) => KvValueType::Int64,
            KvValue::Float(_) => KvValueType::Float,
            KvValue::Pointer(_) => KvValueType::Pointer,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, KvValue::String(_))
    }

    /// If the value is a string, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            KvValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an `i64` if it is an integer of any width.
    ///
    /// `UInt64` values above `i64::MAX` return `None`.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            KvValue::Int32(i) | KvValue::Pointer(i) => Some(i64::from(*i)),
            KvValue::Int64(i) => Some(*i),
            KvValue::UInt64(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Returns the value as a `u64` if it is a non-negative integer.
    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            KvValue::UInt64(u) => Some(*u),
            KvValue::Int32(i) | KvValue::Pointer(i) => u64::try_from(*i).ok(),
            KvValue::Int64(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Returns the value as an `f32` if it is numeric.
    #[inline]
    #[must_use]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            KvValue::Float(f) => Some(*f),
            KvValue::Int32(i) | KvValue::Pointer(i) => Some(*i as f32),
            KvValue::Int64(i) => Some(*i as f32),
            KvValue::UInt64(u) => Some(*u as f32),
            KvValue::String(_) => None,
        }
    }
}

/// Classifies an unquoted literal and converts it to a typed value.
///
/// This is a total function: every input yields exactly one variant. Quoted
/// literals must not be passed through here; they are always strings.
#[must_use]
pub fn coerce_literal(text: &str) -> KvValue {
    if let Some(value) = parse_hex_blob(text) {
        return KvValue::UInt64(value);
    }

    if let Ok(value) = text.trim_start().parse::<i32>() {
        return KvValue::Int32(value);
    }

    if let Some(value) = parse_float_literal(text) {
        return KvValue::Float(value);
    }

    KvValue::String(text.to_string())
}

/// Decodes `0x` + 16 hex digits as a big-endian `u64`.
fn parse_hex_blob(text: &str) -> Option<u64> {
    if text.len() != HEX_BLOB_LEN || !(text.starts_with("0x") || text.starts_with("0X")) {
        return None;
    }

    let digits = &text[2..];
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    u64::from_str_radix(digits, 16).ok()
}

fn parse_float_literal(text: &str) -> Option<f32> {
    let body = text.trim_start();
    match body {
        "NaN" => return Some(f32::NAN),
        "Infinity" | "+Infinity" => return Some(f32::INFINITY),
        "-Infinity" => return Some(f32::NEG_INFINITY),
        _ => {}
    }

    // `str::parse::<f32>` also accepts "inf" and "nan", which stay strings here.
    if !is_decimal_literal(body) {
        return None;
    }
    body.parse::<f32>().ok()
}

/// `[+-]? digits? ('.' digits?)? ([eE] [+-]? digits)?` with at least one mantissa digit.
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let mut mantissa_digits = count_digits(&bytes[i..]);
    i += mantissa_digits;

    if bytes.get(i) == Some(&b'.') {
        i += 1;
        let fraction_digits = count_digits(&bytes[i..]);
        mantissa_digits += fraction_digits;
        i += fraction_digits;
    }

    if mantissa_digits == 0 {
        return false;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exponent_digits = count_digits(&bytes[i..]);
        if exponent_digits == 0 {
            return false;
        }
        i += exponent_digits;
    }

    i == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

impl fmt::Display for KvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KvValue::String(s) => f.write_str(s),
            KvValue::Int32(i) | KvValue::Pointer(i) => write!(f, "{}", i),
            KvValue::UInt64(u) => write!(f, "{}", u),
            KvValue::Int64(i) => write!(f, "{}", i),
            KvValue::Float(fl) => write!(f, "{}", fl),
        }
    }
}

impl From<i32> for KvValue {
    fn from(value: i32) -> Self {
        KvValue::Int32(value)
    }
}

impl From<u64> for KvValue {
    fn from(value: u64) -> Self {
        KvValue::UInt64(value)
    }
}

impl From<i64> for KvValue {
    fn from(value: i64) -> Self {
        KvValue::Int64(value)
    }
}

impl From<f32> for KvValue {
    fn from(value: f32) -> Self {
        KvValue::Float(value)
    }
}

impl From<String> for KvValue {
    fn from(value: String) -> Self {
        KvValue::String(value)
    }
}

impl From<&str> for KvValue {
    fn from(value: &str) -> Self {
        KvValue::String(value.to_string())
    }
}

impl TryFrom<KvValue> for String {
    type Error = crate::Error;

    fn try_from(value: KvValue) -> crate::Result<Self> {
        match value {
            KvValue::String(s) => Ok(s),
            other => Err(crate::Error::type_mismatch(
                "string",
                &other.value_type().to_string(),
            )),
        }
    }
}

impl TryFrom<KvValue> for i32 {
    type Error = crate::Error;

    fn try_from(value: KvValue) -> crate::Result<Self> {
        match value {
            KvValue::Int32(i) => Ok(i),
            other => Err(crate::Error::type_mismatch(
                "int32",
                &other.value_type().to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_blob_is_big_endian() {
        assert_eq!(
            coerce_literal("0x0102030405060708"),
            KvValue::UInt64(0x0102_0304_0506_0708)
        );
        assert_eq!(
            coerce_literal("0XFFFFFFFFFFFFFFFF"),
            KvValue::UInt64(u64::MAX)
        );
        assert_eq!(coerce_literal("0x0000000000000001"), KvValue::UInt64(1));
    }

    #[test]
    fn test_hex_blob_requires_exact_shape() {
        // too short: not an integer in base 10 either
        assert_eq!(
            coerce_literal("0x01"),
            KvValue::String("0x01".to_string())
        );
        assert_eq!(
            coerce_literal("0x000000000000000G"),
            KvValue::String("0x000000000000000G".to_string())
        );
        assert_eq!(
            coerce_literal("0x+000000000000001"),
            KvValue::String("0x+000000000000001".to_string())
        );
    }

    #[test]
    fn test_int32_range() {
        assert_eq!(coerce_literal("42"), KvValue::Int32(42));
        assert_eq!(coerce_literal("-7"), KvValue::Int32(-7));
        assert_eq!(coerce_literal("+7"), KvValue::Int32(7));
        assert_eq!(coerce_literal(" 12"), KvValue::Int32(12));
        assert_eq!(coerce_literal("2147483647"), KvValue::Int32(i32::MAX));
        // one past i32::MAX falls through to float
        assert_eq!(coerce_literal("2147483648"), KvValue::Float(2_147_483_648.0));
    }

    #[test]
    fn test_float_shapes() {
        assert_eq!(coerce_literal("42.5"), KvValue::Float(42.5));
        assert_eq!(coerce_literal("-.5"), KvValue::Float(-0.5));
        assert_eq!(coerce_literal("1."), KvValue::Float(1.0));
        assert_eq!(coerce_literal("1e3"), KvValue::Float(1000.0));
        assert_eq!(coerce_literal("2.5E-1"), KvValue::Float(0.25));
        assert_eq!(
            coerce_literal("-Infinity"),
            KvValue::Float(f32::NEG_INFINITY)
        );
        assert!(matches!(coerce_literal("NaN"), KvValue::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_strings_fall_through() {
        for text in ["abc", "inf", "nan", "1e", "e5", ".", "-", "1.2.3", "12abc", "true"] {
            assert_eq!(coerce_literal(text), KvValue::String(text.to_string()), "{text}");
        }
    }

    #[test]
    fn test_accessors() {
        assert_eq!(KvValue::Pointer(5).as_i64(), Some(5));
        assert_eq!(KvValue::UInt64(u64::MAX).as_i64(), None);
        assert_eq!(KvValue::Int32(-1).as_u64(), None);
        assert_eq!(KvValue::Int32(3).as_f32(), Some(3.0));
        assert_eq!(KvValue::from("x").as_str(), Some("x"));
        assert!(String::try_from(KvValue::Int32(1)).is_err());
        assert_eq!(i32::try_from(KvValue::Int32(9)).unwrap(), 9);
    }
}
