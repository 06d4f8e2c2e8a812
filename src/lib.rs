//! # serde_keyvalues
//!
//! Reading and writing Valve's KeyValues formats, with Serde support.
//!
//! ## Formats
//!
//! - **KeyValues1 text**: `"key" "value"` pairs and `{ }` objects, with optional
//!   `[$PLATFORM]` conditionals. Every scalar is a string.
//! - **KeyValues3 text**: a `<!-- kv3 ... -->` header, `key = value` pairs,
//!   arrays, and typed literals (integers, floats, 64-bit hex blobs)
//! - **Binary KeyValues1**: the typed binary encoding used by Steam files
//!
//! All readers emit the same structural events, which [`TreeBuilder`] turns
//! into a [`KvDocument`]. Writers render a document back out, and the Serde
//! layer maps Rust types onto the tree.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_keyvalues::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Video {
//!     width: u32,
//!     height: u32,
//!     vsync: bool,
//! }
//!
//! let video = Video { width: 1920, height: 1080, vsync: true };
//!
//! let text = to_string("video", &video).unwrap();
//! assert!(text.starts_with("\"video\"\n{\n"));
//!
//! let back: Video = from_str(&text).unwrap();
//! assert_eq!(back, video);
//! ```
//!
//! ### KeyValues3
//!
//! ```rust
//! use serde_keyvalues::{parse_document, KvFormat, KvOptions, KvValue};
//!
//! let text = "<!-- kv3 encoding:text:version{e21c7f3c-8a33-41c5-9977-a76d3a32aa0d} format:generic:version{7412167c-06e9-4698-aff2-e63eb59037e7} -->
//! {
//!     scale = 1.5
//!     id = 0x00000000000000FF
//!     names = [\"a\", \"b\"]
//! }";
//! let options = KvOptions::new().with_format(KvFormat::KeyValues3Text);
//! let doc = parse_document(text, &options).unwrap();
//!
//! assert_eq!(doc.name(), "root");
//! assert_eq!(doc.value().get("scale").and_then(|n| n.as_value()), Some(&KvValue::Float(1.5)));
//! assert_eq!(doc.value().get("id").and_then(|n| n.as_value()), Some(&KvValue::UInt64(255)));
//! ```
//!
//! ### Building Trees with kv!
//!
//! ```rust
//! use serde_keyvalues::{kv, write_document, KvDocument, KvFormat, KvOptions};
//!
//! let doc = KvDocument::new("root", kv!({ "name": "Alyx", "ammo": [18, 6] }));
//! let options = KvOptions::new().with_format(KvFormat::KeyValues3Text);
//! let text = String::from_utf8(write_document(&doc, &options).unwrap()).unwrap();
//! assert!(text.contains("name = \"Alyx\""));
//! ```
//!
//! ## Logging
//!
//! Readers and writers emit [`tracing`] events: `debug` per document and
//! `trace` per token and structural event. Install any subscriber to see them.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Serde round trip through KV1 text
//! - **`dynamic_values.rs`** - Walking a parsed tree and converting between formats
//!
//! Run any example with: `cargo run --example <name>`

pub mod de;
pub mod error;
pub mod listener;
pub mod macros;
pub mod map;
pub mod node;
pub mod options;
pub mod reader;
pub mod ser;
pub mod value;
pub mod writer;

pub use de::{from_node, NodeDeserializer};
pub use error::{Error, ParseErrorKind, Position, Result};
pub use listener::{Event, EventRecorder, ParseListener, TreeBuilder};
pub use map::KvMap;
pub use node::{KvDocument, KvNode};
pub use options::{default_conditions, Indent, KvFormat, KvOptions, DEFAULT_MAX_DEPTH};
pub use reader::{
    parse_document, parse_document_slice, read_slice_with_listener, read_with_listener,
    Kv1BinaryReader, Kv1TextReader, Kv3TextReader, VisitingReader,
};
pub use ser::{to_node, NodeSerializer};
pub use value::{coerce_literal, KvValue, KvValueType};
pub use writer::{write_document, write_document_string};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Serialize any `T: Serialize` to KV1 text under the root key `name`.
///
/// # Examples
///
/// ```rust
/// use serde_keyvalues::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let text = to_string("point", &Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(text, "\"point\"\n{\n\t\"x\"\t\t\"1\"\n\t\"y\"\t\t\"2\"\n}\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value has no KeyValues representation.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(name: &str, value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(name, value, &KvOptions::default())
}

/// Serialize any `T: Serialize` to text in the format chosen by `options`.
///
/// # Errors
///
/// Returns an error if the value cannot be represented, or if `options` asks
/// for the binary format.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(name: &str, value: &T, options: &KvOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let document = KvDocument::new(name, to_node(value)?);
    write_document_string(&document, options)
}

/// Serialize any `T: Serialize` to bytes in any format, binary included.
///
/// # Examples
///
/// ```rust
/// use serde_keyvalues::{from_slice_with_options, to_vec_with_options, KvFormat, KvOptions};
/// use std::collections::BTreeMap;
///
/// let options = KvOptions::new().with_format(KvFormat::KeyValues1Binary);
/// let mut scores = BTreeMap::new();
/// scores.insert("alice".to_string(), 10);
///
/// let bytes = to_vec_with_options("scores", &scores, &options).unwrap();
/// let back: BTreeMap<String, i32> = from_slice_with_options(&bytes, &options).unwrap();
/// assert_eq!(back, scores);
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be represented in the format.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec_with_options<T>(name: &str, value: &T, options: &KvOptions) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    let document = KvDocument::new(name, to_node(value)?);
    write_document(&document, options)
}

/// Serialize any `T: Serialize` to a writer as KV1 text.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, name: &str, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, name, value, &KvOptions::default())
}

/// Serialize any `T: Serialize` to a writer in the format chosen by `options`.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(
    mut writer: W,
    name: &str,
    value: &T,
    options: &KvOptions,
) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let bytes = to_vec_with_options(name, value, options)?;
    writer
        .write_all(&bytes)
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize `T` from the root of a KV1 text document. The root key is ignored.
///
/// # Examples
///
/// ```rust
/// use serde_keyvalues::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("point { x 1 y 2 }").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is malformed or does not fit `T`. Parse
/// errors carry the line and column.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_str_with_options(s, &KvOptions::default())
}

/// Deserialize `T` from text in the format chosen by `options`.
///
/// # Errors
///
/// Returns an error if the input is malformed or does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options<T>(s: &str, options: &KvOptions) -> Result<T>
where
    T: DeserializeOwned,
{
    from_node(parse_document(s, options)?.into_value())
}

/// Deserialize `T` from bytes of KV1 text.
///
/// # Errors
///
/// Returns an error if the bytes are not UTF-8, are malformed, or do not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    from_slice_with_options(v, &KvOptions::default())
}

/// Deserialize `T` from bytes in any format, binary included.
///
/// # Errors
///
/// Returns an error if the input is malformed or does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice_with_options<T>(v: &[u8], options: &KvOptions) -> Result<T>
where
    T: DeserializeOwned,
{
    from_node(parse_document_slice(v, options)?.into_value())
}

/// Deserialize `T` from an I/O stream of KV1 text.
///
/// # Examples
///
/// ```rust
/// use serde_keyvalues::from_reader;
/// use std::collections::HashMap;
/// use std::io::Cursor;
///
/// let map: HashMap<String, String> = from_reader(Cursor::new(b"cfg { \"fov\" \"90\" }")).unwrap();
/// assert_eq!(map["fov"], "90");
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is malformed, or it does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    from_reader_with_options(reader, &KvOptions::default())
}

/// Deserialize `T` from an I/O stream in the format chosen by `options`.
///
/// # Errors
///
/// Returns an error if reading fails, the input is malformed, or it does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader_with_options<R, T>(mut reader: R, options: &KvOptions) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_slice_with_options(&bytes, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
    }

    fn user() -> User {
        User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
        }
    }

    #[test]
    fn test_serialize_deserialize_point() {
        let point = Point { x: 1, y: 2 };
        let text = to_string("point", &point).unwrap();
        let point_back: Point = from_str(&text).unwrap();
        assert_eq!(point, point_back);
    }

    #[test]
    fn test_serialize_deserialize_user_every_format() {
        for format in [
            KvFormat::KeyValues1Text,
            KvFormat::KeyValues3Text,
            KvFormat::KeyValues1Binary,
        ] {
            let options = KvOptions::new().with_format(format);
            let bytes = to_vec_with_options("user", &user(), &options).unwrap();
            let user_back: User = from_slice_with_options(&bytes, &options).unwrap();
            assert_eq!(user(), user_back, "format {:?}", format);
        }
    }

    #[test]
    fn test_to_string_rejects_binary() {
        let options = KvOptions::new().with_format(KvFormat::KeyValues1Binary);
        assert!(matches!(
            to_string_with_options("p", &Point { x: 1, y: 2 }, &options),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_to_writer() {
        let mut buffer = Vec::new();
        to_writer(&mut buffer, "point", &Point { x: 3, y: 4 }).unwrap();
        let point: Point = from_slice(&buffer).unwrap();
        assert_eq!(point, Point { x: 3, y: 4 });
    }
}
