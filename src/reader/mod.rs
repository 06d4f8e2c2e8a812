//! Readers for the KeyValues formats.
//!
//! Every reader implements [`VisitingReader`] and reports what it reads as
//! events on a [`ParseListener`]. The text formats share one tokenizer-driven
//! state machine; the binary format is walked directly.

mod binary;
mod condition;
mod cursor;
mod kv1;
mod kv3;
mod state;
mod token;

pub(crate) use binary::node_type;
pub use binary::Kv1BinaryReader;
pub use kv1::Kv1TextReader;
pub use kv3::Kv3TextReader;

use crate::listener::{ParseListener, TreeBuilder};
use crate::options::{KvFormat, KvOptions};
use crate::{Error, KvDocument, Result};
use tracing::debug;

/// A reader that streams one document into a listener.
pub trait VisitingReader {
    /// Reads a single top-level document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed input, or whatever error the
    /// listener raised.
    fn read_object(&mut self, listener: &mut dyn ParseListener) -> Result<()>;
}

/// Reads text in the configured format, reporting events to `listener`.
///
/// # Errors
///
/// Fails on invalid options, on malformed input, or when `options.format` is
/// binary (use [`read_slice_with_listener`]).
pub fn read_with_listener(
    text: &str,
    options: &KvOptions,
    listener: &mut dyn ParseListener,
) -> Result<()> {
    options.validate()?;
    debug!(format = ?options.format, len = text.len(), "reading document");

    match options.format {
        KvFormat::KeyValues1Text => Kv1TextReader::new(text.chars(), options).read_object(listener),
        KvFormat::KeyValues3Text => Kv3TextReader::new(text.chars())
            .with_max_depth(options.max_depth)
            .read_object(listener),
        KvFormat::KeyValues1Binary => Err(Error::invalid_argument(
            "binary KeyValues must be read from bytes",
        )),
    }
}

/// Reads bytes in the configured format. Text formats must be UTF-8.
pub fn read_slice_with_listener(
    bytes: &[u8],
    options: &KvOptions,
    listener: &mut dyn ParseListener,
) -> Result<()> {
    if options.format.is_text() {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::invalid_argument(&format!("input is not valid UTF-8: {}", e)))?;
        return read_with_listener(text, options, listener);
    }

    options.validate()?;
    debug!(len = bytes.len(), "reading binary document");
    Kv1BinaryReader::new(bytes)
        .with_max_depth(options.max_depth)
        .read_object(listener)
}

/// Parses text into a [`KvDocument`].
///
/// # Examples
///
/// ```rust
/// use serde_keyvalues::{parse_document, KvOptions};
///
/// let doc = parse_document("\"settings\" { \"volume\" \"7\" }", &KvOptions::new()).unwrap();
/// assert_eq!(doc.name(), "settings");
/// assert_eq!(doc.value().get("volume").and_then(|n| n.as_str()), Some("7"));
/// ```
///
/// # Errors
///
/// See [`read_with_listener`].
pub fn parse_document(text: &str, options: &KvOptions) -> Result<KvDocument> {
    let mut builder = TreeBuilder::new();
    read_with_listener(text, options, &mut builder)?;
    builder.finish()
}

/// Parses bytes into a [`KvDocument`].
pub fn parse_document_slice(bytes: &[u8], options: &KvOptions) -> Result<KvDocument> {
    let mut builder = TreeBuilder::new();
    read_slice_with_listener(bytes, options, &mut builder)?;
    builder.finish()
}
