//! Tokens produced by the text tokenizers.

use super::cursor::ReadResult;
use crate::error::Position;
use std::fmt;

/// The smallest lexical unit of KeyValues text.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    /// KV3 `<!-- ... -->`, carrying the inner text.
    Header(String),
    Identifier(String),
    QuotedString(String),
    Assignment,
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    /// KV3 array element separator.
    Comma,
    /// KV1 `[$SYMBOL]` suffix, carrying the text between the brackets.
    Condition(String),
    Comment(String),
    EndOfFile,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Header(_) => f.write_str("header"),
            Token::Identifier(text) => write!(f, "identifier '{}'", text),
            Token::QuotedString(text) => write!(f, "string \"{}\"", text),
            Token::Assignment => f.write_str("'='"),
            Token::ObjectStart => f.write_str("'{'"),
            Token::ObjectEnd => f.write_str("'}'"),
            Token::ArrayStart => f.write_str("'['"),
            Token::ArrayEnd => f.write_str("']'"),
            Token::Comma => f.write_str("','"),
            Token::Condition(text) => write!(f, "conditional '[{}]'", text),
            Token::Comment(_) => f.write_str("comment"),
            Token::EndOfFile => f.write_str("end of file"),
        }
    }
}

/// A token together with the position it started at.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SpannedToken {
    pub(crate) token: Token,
    pub(crate) position: Position,
}

/// A source of tokens for the state machine.
pub(crate) trait Tokenizer {
    /// Reads the next token. `EndOfFile` is returned exactly once; reading
    /// past it fails with `UnexpectedEndOfInput`.
    fn read_next_token(&mut self) -> ReadResult<SpannedToken>;
}
