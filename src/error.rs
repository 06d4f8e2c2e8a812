//! Error types for KeyValues reading and writing.
//!
//! Every failure surfaces as a single [`Error`]. Parse failures are reported as
//! [`Error::Parse`], which carries a human-readable message plus the low-level
//! [`ParseErrorKind`] that caused it:
//!
//! - **UnexpectedEndOfInput**: the source ran out while a token, object or array
//!   was still incomplete
//! - **Syntax**: a character sequence does not form any valid token
//! - **InvalidState**: a well-formed token arrived where the grammar does not
//!   allow it (for example `]` while a key was expected)
//!
//! ## Examples
//!
//! ```rust
//! use serde_keyvalues::{parse_document, KvOptions, ParseErrorKind};
//!
//! let err = parse_document("root\n{\n", &KvOptions::new()).unwrap_err();
//! assert!(matches!(err.kind(), Some(ParseErrorKind::UnexpectedEndOfInput { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// A location in the input.
///
/// Text readers report 1-based lines and columns. The binary reader reports a
/// byte offset, stored with `line == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }

    /// A position inside a binary stream.
    #[must_use]
    pub const fn offset(offset: usize) -> Self {
        Position {
            line: 0,
            column: offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "byte offset {}", self.column)
        } else {
            write!(f, "line {}, column {}", self.line, self.column)
        }
    }
}

/// The low-level reason a parse failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    /// The source was exhausted while a token or construct was incomplete.
    #[error("unexpected end of input at {position}")]
    UnexpectedEndOfInput { position: Position },

    /// The characters do not form a valid token.
    #[error("syntax error at {position}: {msg}")]
    Syntax { position: Position, msg: String },

    /// A valid token arrived in a state that cannot accept it.
    #[error("unexpected {token} while {state} at {position}")]
    InvalidState {
        position: Position,
        token: String,
        state: String,
    },
}

impl ParseErrorKind {
    /// Where in the input the failure was detected.
    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            ParseErrorKind::UnexpectedEndOfInput { position }
            | ParseErrorKind::Syntax { position, .. }
            | ParseErrorKind::InvalidState { position, .. } => *position,
        }
    }
}

/// Represents all possible errors that can occur while reading or writing KeyValues.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The document is not valid input.
    #[error("{message}")]
    Parse {
        message: String,
        #[source]
        cause: ParseErrorKind,
    },

    /// Invalid options or input handed to an entry point before parsing began.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// A value that the selected format cannot represent
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// A tree node could not be mapped onto the requested Rust type
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Wraps a low-level parse failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_keyvalues::{Error, ParseErrorKind, Position};
    ///
    /// let cause = ParseErrorKind::UnexpectedEndOfInput { position: Position::new(3, 1) };
    /// let err = Error::parse("Found end of file while trying to read token.", cause);
    /// assert!(err.to_string().contains("end of file"));
    /// ```
    pub fn parse(message: &str, cause: ParseErrorKind) -> Self {
        Error::Parse {
            message: message.to_string(),
            cause,
        }
    }

    /// Creates a syntax failure at `position`.
    pub fn syntax(position: Position, msg: &str) -> Self {
        Error::parse(
            "The syntax is incorrect.",
            ParseErrorKind::Syntax {
                position,
                msg: msg.to_string(),
            },
        )
    }

    /// Creates a failure for a token that the current state cannot accept.
    pub fn invalid_state(position: Position, token: &str, state: &str) -> Self {
        Error::parse(
            &format!("Unexpected {token} while {state}."),
            ParseErrorKind::InvalidState {
                position,
                token: token.to_string(),
                state: state.to_string(),
            },
        )
    }

    /// Creates a failure for input that ended before the document was complete.
    pub fn unexpected_eof(position: Position) -> Self {
        Error::parse(
            "Found end of file when another token type was expected.",
            ParseErrorKind::UnexpectedEndOfInput { position },
        )
    }

    /// Creates a failure for objects or arrays nested past `max_depth`.
    pub fn depth_exceeded(position: Position, max_depth: usize) -> Self {
        Error::parse(
            "Maximum nesting depth exceeded.",
            ParseErrorKind::Syntax {
                position,
                msg: format!("more than {max_depth} nested objects or arrays"),
            },
        )
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(msg: &str) -> Self {
        Error::InvalidArgument(msg.to_string())
    }

    /// Creates a type mismatch error for the object mapper.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_keyvalues::Error;
    ///
    /// let err = Error::type_mismatch("integer", "object");
    /// assert!(err.to_string().contains("expected integer"));
    /// ```
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an unsupported type error for values a format cannot hold.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// The low-level parse failure, if this error came from a reader.
    #[must_use]
    pub fn kind(&self) -> Option<&ParseErrorKind> {
        match self {
            Error::Parse { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_parse_error_keeps_cause() {
        let err = Error::invalid_state(Position::new(4, 1), "']'", "expecting a key");
        let source = err.source().expect("cause should be attached");
        assert!(source.to_string().contains("line 4, column 1"));
        assert!(matches!(
            err.kind(),
            Some(ParseErrorKind::InvalidState { .. })
        ));
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(2, 7).to_string(), "line 2, column 7");
        assert_eq!(Position::offset(12).to_string(), "byte offset 12");
    }

    #[test]
    fn test_non_parse_errors_have_no_kind() {
        assert!(Error::custom("boom").kind().is_none());
        assert!(Error::invalid_argument("bad").kind().is_none());
    }
}
