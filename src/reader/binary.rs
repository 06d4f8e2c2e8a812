//! Binary KeyValues1.
//!
//! Each node is a type byte, a NUL-terminated UTF-8 name and a little-endian
//! payload. Objects hold child nodes up to an end marker.

use super::VisitingReader;
use crate::error::Position;
use crate::listener::ParseListener;
use crate::options::DEFAULT_MAX_DEPTH;
use crate::{Error, KvValue, Result};
use std::io::{self, Read};
use tracing::{debug, trace};

/// Node type bytes of the binary encoding.
pub(crate) mod node_type {
    pub(crate) const OBJECT: u8 = 0;
    pub(crate) const STRING: u8 = 1;
    pub(crate) const INT32: u8 = 2;
    pub(crate) const FLOAT32: u8 = 3;
    pub(crate) const POINTER: u8 = 4;
    pub(crate) const WIDE_STRING: u8 = 5;
    pub(crate) const COLOR: u8 = 6;
    pub(crate) const UINT64: u8 = 7;
    pub(crate) const END: u8 = 8;
    pub(crate) const INT64: u8 = 10;
    pub(crate) const ALTERNATE_END: u8 = 11;
}

/// Reads binary KV1 from any byte source.
pub struct Kv1BinaryReader<R: Read> {
    source: R,
    offset: usize,
    depth: usize,
    max_depth: usize,
}

impl<R: Read> Kv1BinaryReader<R> {
    pub fn new(source: R) -> Self {
        Kv1BinaryReader {
            source,
            offset: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn position(&self) -> Position {
        Position::offset(self.offset)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.source.read_exact(buf) {
            Ok(()) => {
                self.offset += buf.len();
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(Error::unexpected_eof(self.position()))
            }
            Err(e) => Err(Error::io(&e.to_string())),
        }
    }

    fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_u8(&mut self) -> Result<u8> {
        let [byte] = self.read_bytes::<1>()?;
        Ok(byte)
    }

    fn read_cstring(&mut self) -> Result<String> {
        let start = self.position();
        let mut bytes = Vec::new();
        loop {
            match self.read_u8()? {
                0 => break,
                byte => bytes.push(byte),
            }
        }
        String::from_utf8(bytes).map_err(|_| Error::syntax(start, "string is not valid UTF-8"))
    }

    fn read_node(
        &mut self,
        kind: u8,
        position: Position,
        listener: &mut dyn ParseListener,
    ) -> Result<()> {
        let name = self.read_cstring()?;
        trace!(kind, %name, %position, "binary node");

        if kind == node_type::OBJECT {
            if self.depth >= self.max_depth {
                return Err(Error::depth_exceeded(position, self.max_depth));
            }
            listener.on_object_start(&name)?;
            self.depth += 1;
            self.read_children(listener)?;
            self.depth -= 1;
            return listener.on_object_end();
        }

        let value = self.read_value(kind, position)?;
        listener.on_key_value_pair(&name, value)
    }

    fn read_children(&mut self, listener: &mut dyn ParseListener) -> Result<()> {
        loop {
            let position = self.position();
            match self.read_u8()? {
                node_type::END | node_type::ALTERNATE_END => return Ok(()),
                kind => self.read_node(kind, position, listener)?,
            }
        }
    }

    fn read_value(&mut self, kind: u8, position: Position) -> Result<KvValue> {
        let value = match kind {
            node_type::STRING => KvValue::String(self.read_cstring()?),
            // colors are four RGBA bytes, exposed as their integer value
            node_type::INT32 | node_type::COLOR => {
                KvValue::Int32(i32::from_le_bytes(self.read_bytes()?))
            }
            node_type::FLOAT32 => KvValue::Float(f32::from_le_bytes(self.read_bytes()?)),
            node_type::POINTER => KvValue::Pointer(i32::from_le_bytes(self.read_bytes()?)),
            node_type::UINT64 => KvValue::UInt64(u64::from_le_bytes(self.read_bytes()?)),
            node_type::INT64 => KvValue::Int64(i64::from_le_bytes(self.read_bytes()?)),
            node_type::WIDE_STRING => {
                return Err(Error::syntax(position, "wide string nodes are not supported"))
            }
            other => {
                return Err(Error::syntax(
                    position,
                    &format!("unknown node type {:#04x}", other),
                ))
            }
        };
        Ok(value)
    }
}

impl<R: Read> VisitingReader for Kv1BinaryReader<R> {
    fn read_object(&mut self, listener: &mut dyn ParseListener) -> Result<()> {
        let position = self.position();
        let kind = self.read_u8()?;
        if kind == node_type::END || kind == node_type::ALTERNATE_END {
            return Err(Error::syntax(position, "document has no root node"));
        }

        self.read_node(kind, position, listener)?;
        debug!(bytes = self.offset, "binary document complete");
        Ok(())
    }
}
