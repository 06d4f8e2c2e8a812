//! Structural events and the listeners that consume them.
//!
//! Readers never build trees themselves. They drive a [`ParseListener`] with a
//! well-nested sequence of events, so every format shares one downstream
//! consumer:
//!
//! - [`TreeBuilder`] assembles a [`KvDocument`]
//! - [`EventRecorder`] keeps the raw [`Event`] list, handy for inspection
//!
//! A container that sits directly inside an array is started with an empty name.
//!
//! ```rust
//! use serde_keyvalues::{Event, EventRecorder, KvOptions, KvValue, read_with_listener};
//!
//! let mut recorder = EventRecorder::new();
//! read_with_listener("\"root\" { \"key\" \"value\" }", &KvOptions::new(), &mut recorder).unwrap();
//! assert_eq!(
//!     recorder.events(),
//!     &[
//!         Event::ObjectStart("root".to_string()),
//!         Event::KeyValuePair("key".to_string(), KvValue::String("value".to_string())),
//!         Event::ObjectEnd,
//!     ]
//! );
//! ```

use crate::{Error, KvDocument, KvMap, KvNode, KvValue, Result};

/// Receiver of structural events.
///
/// Implementations may stream straight into typed objects; returning an error
/// aborts the parse.
pub trait ParseListener {
    fn on_object_start(&mut self, name: &str) -> Result<()>;
    fn on_object_end(&mut self) -> Result<()>;
    fn on_array_start(&mut self, name: &str) -> Result<()>;
    fn on_array_end(&mut self) -> Result<()>;
    fn on_key_value_pair(&mut self, name: &str, value: KvValue) -> Result<()>;
    fn on_array_value(&mut self, value: KvValue) -> Result<()>;
}

/// One structural event.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    ObjectStart(String),
    ObjectEnd,
    ArrayStart(String),
    ArrayEnd,
    KeyValuePair(String, KvValue),
    ArrayValue(KvValue),
}

/// A listener that records every event it receives.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<Event>,
}

impl EventRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl ParseListener for EventRecorder {
    fn on_object_start(&mut self, name: &str) -> Result<()> {
        self.events.push(Event::ObjectStart(name.to_string()));
        Ok(())
    }

    fn on_object_end(&mut self) -> Result<()> {
        self.events.push(Event::ObjectEnd);
        Ok(())
    }

    fn on_array_start(&mut self, name: &str) -> Result<()> {
        self.events.push(Event::ArrayStart(name.to_string()));
        Ok(())
    }

    fn on_array_end(&mut self) -> Result<()> {
        self.events.push(Event::ArrayEnd);
        Ok(())
    }

    fn on_key_value_pair(&mut self, name: &str, value: KvValue) -> Result<()> {
        self.events
            .push(Event::KeyValuePair(name.to_string(), value));
        Ok(())
    }

    fn on_array_value(&mut self, value: KvValue) -> Result<()> {
        self.events.push(Event::ArrayValue(value));
        Ok(())
    }
}

#[derive(Debug)]
enum Frame {
    Object { name: String, map: KvMap },
    Array { name: String, items: Vec<KvNode> },
}

/// A listener that assembles the generic tree.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stack: Vec<Frame>,
    document: Option<KvDocument>,
}

impl TreeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the finished document.
    ///
    /// # Errors
    ///
    /// Fails if no root was produced or a container is still open.
    pub fn finish(self) -> Result<KvDocument> {
        if !self.stack.is_empty() {
            return Err(Error::custom("document ended with unclosed containers"));
        }
        self.document
            .ok_or_else(|| Error::custom("document produced no root"))
    }

    /// Attaches a completed node to the innermost open container, or makes it
    /// the document root.
    fn attach(&mut self, name: String, node: KvNode) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::Object { map, .. }) => {
                map.insert(name, node);
                Ok(())
            }
            Some(Frame::Array { items, .. }) => {
                items.push(node);
                Ok(())
            }
            None if self.document.is_none() => {
                self.document = Some(KvDocument::new(name, node));
                Ok(())
            }
            None => Err(Error::custom("document already has a root")),
        }
    }
}

impl ParseListener for TreeBuilder {
    fn on_object_start(&mut self, name: &str) -> Result<()> {
        self.stack.push(Frame::Object {
            name: name.to_string(),
            map: KvMap::new(),
        });
        Ok(())
    }

    fn on_object_end(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Object { name, map }) => self.attach(name, KvNode::Object(map)),
            _ => Err(Error::custom("object end without a matching object start")),
        }
    }

    fn on_array_start(&mut self, name: &str) -> Result<()> {
        self.stack.push(Frame::Array {
            name: name.to_string(),
            items: Vec::new(),
        });
        Ok(())
    }

    fn on_array_end(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Array { name, items }) => self.attach(name, KvNode::Array(items)),
            _ => Err(Error::custom("array end without a matching array start")),
        }
    }

    fn on_key_value_pair(&mut self, name: &str, value: KvValue) -> Result<()> {
        match self.stack.last() {
            Some(Frame::Array { .. }) => {
                Err(Error::custom("key-value pair delivered inside an array"))
            }
            _ => self.attach(name.to_string(), KvNode::Value(value)),
        }
    }

    fn on_array_value(&mut self, value: KvValue) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::Array { items, .. }) => {
                items.push(KvNode::Value(value));
                Ok(())
            }
            _ => Err(Error::custom("array value delivered outside an array")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_builder_nests_containers() {
        let mut builder = TreeBuilder::new();
        builder.on_object_start("root").unwrap();
        builder.on_array_start("list").unwrap();
        builder.on_array_value(KvValue::Int32(1)).unwrap();
        builder.on_object_start("").unwrap();
        builder
            .on_key_value_pair("k", KvValue::from("v"))
            .unwrap();
        builder.on_object_end().unwrap();
        builder.on_array_end().unwrap();
        builder.on_object_end().unwrap();

        let doc = builder.finish().unwrap();
        assert_eq!(doc.name(), "root");
        let list = doc.value().get("list").and_then(KvNode::as_array).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].get("k").and_then(KvNode::as_str), Some("v"));
    }

    #[test]
    fn test_tree_builder_root_value() {
        let mut builder = TreeBuilder::new();
        builder
            .on_key_value_pair("key", KvValue::from("value"))
            .unwrap();
        let doc = builder.finish().unwrap();
        assert_eq!(doc.name(), "key");
        assert_eq!(doc.value().as_str(), Some("value"));
    }

    #[test]
    fn test_tree_builder_rejects_mismatched_end() {
        let mut builder = TreeBuilder::new();
        builder.on_object_start("root").unwrap();
        assert!(builder.on_array_end().is_err());
    }

    #[test]
    fn test_unfinished_tree_is_an_error() {
        let mut builder = TreeBuilder::new();
        builder.on_object_start("root").unwrap();
        assert!(builder.finish().is_err());
        assert!(TreeBuilder::new().finish().is_err());
    }
}
