//! Writers for the KeyValues formats.
//!
//! Writers work on the generic tree. KV1 (text and binary) has no arrays, so
//! arrays are written as objects keyed `"0"`, `"1"`, ... in element order.

mod binary;
mod kv1;
mod kv3;

use crate::options::{KvFormat, KvOptions};
use crate::{Error, KvDocument, KvNode, Result};
use tracing::debug;

/// Writes `document` in the configured format.
///
/// # Examples
///
/// ```rust
/// use serde_keyvalues::{kv, write_document, KvDocument, KvOptions};
///
/// let doc = KvDocument::new("root", kv!({ "name": "value" }));
/// let bytes = write_document(&doc, &KvOptions::new()).unwrap();
/// assert_eq!(String::from_utf8(bytes).unwrap(), "\"root\"\n{\n\t\"name\"\t\t\"value\"\n}\n");
/// ```
///
/// # Errors
///
/// Fails on invalid options or when the tree holds something the format cannot
/// represent.
pub fn write_document(document: &KvDocument, options: &KvOptions) -> Result<Vec<u8>> {
    options.validate()?;
    debug!(format = ?options.format, name = document.name(), "writing document");

    match options.format {
        KvFormat::KeyValues1Text => Ok(kv1::write(document, options)?.into_bytes()),
        KvFormat::KeyValues3Text => Ok(kv3::write(document, options)?.into_bytes()),
        KvFormat::KeyValues1Binary => binary::write(document),
    }
}

/// Writes `document` as text. Binary output is rejected.
pub fn write_document_string(document: &KvDocument, options: &KvOptions) -> Result<String> {
    options.validate()?;
    match options.format {
        KvFormat::KeyValues1Text => kv1::write(document, options),
        KvFormat::KeyValues3Text => kv3::write(document, options),
        KvFormat::KeyValues1Binary => Err(Error::invalid_argument(
            "binary KeyValues cannot be written to a string",
        )),
    }
}

/// The children of a container as named nodes. Array elements are named by index.
pub(crate) fn named_children(node: &KvNode) -> Vec<(String, &KvNode)> {
    match node {
        KvNode::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        KvNode::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        KvNode::Value(_) => Vec::new(),
    }
}

/// Appends `text` in double quotes, escaping `\\ \" \n \t \r`.
pub(crate) fn write_escaped(output: &mut String, text: &str) {
    output.push('"');
    for ch in text.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            _ => output.push(ch),
        }
    }
    output.push('"');
}
