//! Configuration options for reading and writing KeyValues.
//!
//! This module provides:
//!
//! - [`KvOptions`]: main configuration struct
//! - [`KvFormat`]: which KeyValues variant to read or write
//! - [`Indent`]: indentation style for the text writers
//!
//! ## Examples
//!
//! ```rust
//! use serde_keyvalues::{Indent, KvFormat, KvOptions};
//!
//! let options = KvOptions::new()
//!     .with_format(KvFormat::KeyValues3Text)
//!     .with_indent(Indent::Spaces(2));
//! assert!(options.validate().is_ok());
//!
//! // KV1 conditionals evaluate against an explicit symbol list
//! let options = KvOptions::new().with_conditions(["X360"]);
//! assert_eq!(options.conditions, vec!["X360".to_string()]);
//! ```

use crate::{Error, Result};

/// The KeyValues variant to read or write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KvFormat {
    /// Classic quoted `"key" "value"` text.
    #[default]
    KeyValues1Text,
    /// KV3 text with a `<!-- kv3 ... -->` header and typed literals.
    KeyValues3Text,
    /// Binary KV1 as used by Steam's `appinfo`/`shortcuts` files.
    KeyValues1Binary,
}

impl KvFormat {
    #[must_use]
    pub const fn is_text(&self) -> bool {
        !matches!(self, KvFormat::KeyValues1Binary)
    }
}

/// Indentation used by the text writers.
///
/// # Examples
///
/// ```rust
/// use serde_keyvalues::Indent;
///
/// assert_eq!(Indent::Tab.unit(), "\t");
/// assert_eq!(Indent::Spaces(2).unit(), "  ");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Indent {
    #[default]
    Tab,
    Spaces(usize),
}

impl Indent {
    /// Returns the text of one indentation level.
    #[must_use]
    pub fn unit(&self) -> String {
        match self {
            Indent::Tab => "\t".to_string(),
            Indent::Spaces(n) => " ".repeat(*n),
        }
    }
}

/// Configuration for readers and writers.
#[derive(Clone, Debug)]
pub struct KvOptions {
    pub format: KvFormat,
    /// KV1 text only: decode and encode `\n`, `\t`, `\r`, `\\` and `\"`.
    pub has_escape_sequences: bool,
    /// KV1 conditional symbols (without the `$`) that evaluate to true.
    pub conditions: Vec<String>,
    pub indent: Indent,
    /// Readers reject objects and arrays nested deeper than this.
    pub max_depth: usize,
}

/// Nesting limit used unless [`KvOptions::with_max_depth`] overrides it.
pub const DEFAULT_MAX_DEPTH: usize = 256;

impl Default for KvOptions {
    fn default() -> Self {
        KvOptions {
            format: KvFormat::default(),
            has_escape_sequences: true,
            conditions: default_conditions(),
            indent: Indent::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// The conditional symbols describing the host platform.
#[must_use]
pub fn default_conditions() -> Vec<String> {
    let symbols: &[&str] = if cfg!(target_os = "windows") {
        &["WIN32", "WINDOWS"]
    } else if cfg!(target_os = "macos") {
        &["OSX", "POSIX"]
    } else if cfg!(target_os = "linux") {
        &["LINUX", "POSIX"]
    } else {
        &[]
    };
    symbols.iter().map(|s| s.to_string()).collect()
}

impl KvOptions {
    /// Creates default options: KV1 text, escapes on, host conditions, tab indent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_keyvalues::{KvFormat, KvOptions};
    ///
    /// let options = KvOptions::new();
    /// assert_eq!(options.format, KvFormat::KeyValues1Text);
    /// assert!(options.has_escape_sequences);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_format(mut self, format: KvFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_escape_sequences(mut self, enabled: bool) -> Self {
        self.has_escape_sequences = enabled;
        self
    }

    /// Replaces the conditional symbols used when reading KV1 text.
    #[must_use]
    pub fn with_conditions<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions = conditions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Checks the options before any reading or writing starts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for empty or whitespace-containing
    /// condition names, names that still carry their `$`, a zero-width
    /// space indent, or a zero nesting limit.
    pub fn validate(&self) -> Result<()> {
        for condition in &self.conditions {
            if condition.is_empty() || condition.chars().any(char::is_whitespace) {
                return Err(Error::invalid_argument(&format!(
                    "condition name {:?} must be non-empty and contain no whitespace",
                    condition
                )));
            }
            if condition.starts_with('$') {
                return Err(Error::invalid_argument(&format!(
                    "condition name {:?} must be given without its '$'",
                    condition
                )));
            }
        }

        if self.indent == Indent::Spaces(0) {
            return Err(Error::invalid_argument("indent width must be at least one space"));
        }

        if self.max_depth == 0 {
            return Err(Error::invalid_argument("max_depth must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_conditions() {
        assert!(KvOptions::new().with_conditions([""]).validate().is_err());
        assert!(KvOptions::new().with_conditions(["A B"]).validate().is_err());
        assert!(KvOptions::new().with_conditions(["$WIN32"]).validate().is_err());
        assert!(KvOptions::new().with_conditions(["WIN32"]).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_indent() {
        let err = KvOptions::new()
            .with_indent(Indent::Spaces(0))
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_validate_rejects_zero_depth() {
        assert_eq!(KvOptions::new().max_depth, DEFAULT_MAX_DEPTH);
        assert!(KvOptions::new().with_max_depth(0).validate().is_err());
        assert!(KvOptions::new().with_max_depth(1).validate().is_ok());
    }

    #[test]
    fn test_binary_is_not_text() {
        assert!(KvFormat::KeyValues1Text.is_text());
        assert!(KvFormat::KeyValues3Text.is_text());
        assert!(!KvFormat::KeyValues1Binary.is_text());
    }
}
