//! KeyValues3 text.
//!
//! ```text
//! <!-- kv3 encoding:text:version{...} format:generic:version{...} -->
//! {
//!     name = "value"
//!     count = 5
//!     list = [ 1, 2.5, "three" ]
//!     child = { flag = 0x0000000000000001 }
//!     model = resource:"models/dog.vmdl"
//! }
//! ```
//!
//! Unquoted literals are coerced with [`coerce_literal`](crate::coerce_literal).
//! A flag such as `resource:` or `soundevent:` is skipped and the literal after
//! it becomes the value.

use super::cursor::{CharReader, ReadResult};
use super::state::{drive, Dialect, StateMachine};
use super::token::{SpannedToken, Token, Tokenizer};
use super::VisitingReader;
use crate::listener::ParseListener;
use crate::options::DEFAULT_MAX_DEPTH;
use crate::Result;

const MULTILINE_QUOTE: &str = "\"\"\"";

fn is_delimiter(ch: char) -> bool {
    matches!(ch, '{' | '}' | '[' | ']' | '=' | ',' | '"')
}

pub(crate) struct Kv3Tokenizer<I: Iterator<Item = char>> {
    reader: CharReader<I>,
    reached_end: bool,
}

impl<I: Iterator<Item = char>> Kv3Tokenizer<I> {
    pub(crate) fn new(source: I) -> Self {
        Kv3Tokenizer {
            reader: CharReader::new(source),
            reached_end: false,
        }
    }

    fn read_header(&mut self) -> ReadResult<String> {
        for expected in "<!--".chars() {
            self.reader.read_expected(expected)?;
        }
        let text = self.read_until("-->")?;
        Ok(text.trim().to_string())
    }

    /// Consumes characters through `terminator`, returning what came before it.
    fn read_until(&mut self, terminator: &str) -> ReadResult<String> {
        let mut text = String::new();
        while !text.ends_with(terminator) {
            text.push(self.reader.next()?);
        }
        text.truncate(text.len() - terminator.len());
        Ok(text)
    }

    fn read_string(&mut self) -> ReadResult<String> {
        self.reader.read_expected('"')?;
        if self.reader.peek() != Some('"') {
            return self.reader.read_quoted_body(true);
        }

        self.reader.next()?;
        if self.reader.peek() != Some('"') {
            // ""
            return Ok(String::new());
        }
        self.reader.next()?;

        let text = self.read_until(MULTILINE_QUOTE)?;
        let text = text
            .strip_prefix("\r\n")
            .or_else(|| text.strip_prefix('\n'))
            .unwrap_or(&text);
        let text = text.strip_suffix('\n').unwrap_or(text);
        let text = text.strip_suffix('\r').unwrap_or(text);
        Ok(text.to_string())
    }

    fn read_comment(&mut self) -> ReadResult<String> {
        self.reader.read_expected('/')?;
        match self.reader.peek() {
            Some('/') => {
                self.reader.next()?;
                Ok(self.reader.read_to_end_of_line()?.trim().to_string())
            }
            Some('*') => {
                self.reader.next()?;
                Ok(self.read_until("*/")?.trim().to_string())
            }
            Some(_) => Err(self.reader.syntax_error("expected '/' or '*' after '/'")),
            None => Err(self.reader.end_of_input()),
        }
    }

    fn single(&mut self, token: Token) -> ReadResult<Token> {
        self.reader.next()?;
        Ok(token)
    }
}

impl<I: Iterator<Item = char>> Tokenizer for Kv3Tokenizer<I> {
    fn read_next_token(&mut self) -> ReadResult<SpannedToken> {
        self.reader.skip_whitespace();
        let position = self.reader.position();

        let token = match self.reader.peek() {
            None if self.reached_end => return Err(self.reader.end_of_input()),
            None => {
                self.reached_end = true;
                Token::EndOfFile
            }
            Some('<') => Token::Header(self.read_header()?),
            Some('{') => self.single(Token::ObjectStart)?,
            Some('}') => self.single(Token::ObjectEnd)?,
            Some('[') => self.single(Token::ArrayStart)?,
            Some(']') => self.single(Token::ArrayEnd)?,
            Some('=') => self.single(Token::Assignment)?,
            Some(',') => self.single(Token::Comma)?,
            Some('"') => Token::QuotedString(self.read_string()?),
            Some('/') => Token::Comment(self.read_comment()?),
            Some(_) => Token::Identifier(self.reader.read_unquoted(is_delimiter)?),
        };

        Ok(SpannedToken { token, position })
    }
}

/// Reads KeyValues3 text from a character source. The root object is
/// reported with the name `root`.
pub struct Kv3TextReader<I: Iterator<Item = char>> {
    tokenizer: Kv3Tokenizer<I>,
    max_depth: usize,
}

impl<I: Iterator<Item = char>> Kv3TextReader<I> {
    pub fn new(source: I) -> Self {
        Kv3TextReader {
            tokenizer: Kv3Tokenizer::new(source),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl<I: Iterator<Item = char>> VisitingReader for Kv3TextReader<I> {
    fn read_object(&mut self, listener: &mut dyn ParseListener) -> Result<()> {
        let mut machine =
            StateMachine::new(Dialect::KeyValues3, &[], listener).with_max_depth(self.max_depth);
        drive(&mut self.tokenizer, &mut machine)
    }
}
