//! Ordered map type for KeyValues objects.
//!
//! [`KvMap`] wraps an [`IndexMap`] so object children keep the order they were
//! read in. Writers emit children in that same order, which is what lets a
//! parsed document survive a round trip with its layout intact.
//!
//! A key that appears twice in one object keeps its first position and takes
//! the value of its last occurrence.
//!
//! ## Examples
//!
//! ```rust
//! use serde_keyvalues::{KvMap, KvNode};
//!
//! let mut map = KvMap::new();
//! map.insert("name".to_string(), KvNode::from("Bob"));
//! map.insert("age".to_string(), KvNode::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Bob"));
//! ```

use crate::KvNode;
use indexmap::IndexMap;

/// An insertion-ordered map of string keys to tree nodes.
///
/// # Examples
///
/// ```rust
/// use serde_keyvalues::{KvMap, KvNode};
///
/// let mut map = KvMap::new();
/// map.insert("first".to_string(), KvNode::from(1));
/// map.insert("second".to_string(), KvNode::from(2));
///
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KvMap(IndexMap<String, KvNode>);

impl KvMap {
    #[must_use]
    pub fn new() -> Self {
        KvMap(IndexMap::new())
    }

    /// Replacing an existing key returns the old node; the key stays where it was.
    pub fn insert(&mut self, key: String, value: KvNode) -> Option<KvNode> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&KvNode> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys in the order they were first read.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, KvNode> {
        self.0.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, KvNode> {
        self.0.iter()
    }
}

impl IntoIterator for KvMap {
    type Item = (String, KvNode);
    type IntoIter = indexmap::map::IntoIter<String, KvNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a KvMap {
    type Item = (&'a String, &'a KvNode);
    type IntoIter = indexmap::map::Iter<'a, String, KvNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, KvNode)> for KvMap {
    fn from_iter<T: IntoIterator<Item = (String, KvNode)>>(iter: T) -> Self {
        KvMap(IndexMap::from_iter(iter))
    }
}
