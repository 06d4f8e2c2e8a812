//! KeyValues1 text.
//!
//! ```text
//! "root"
//! {
//!     "key"   "value"
//!     "sub"   { "x" "1" }
//!     "only"  "win"   [$WIN32]
//! }
//! ```
//!
//! Keys and values may also be unquoted. Values are never coerced: every
//! scalar arrives as a string.

use super::cursor::{CharReader, ReadResult};
use super::state::{drive, Dialect, StateMachine};
use super::token::{SpannedToken, Token, Tokenizer};
use super::VisitingReader;
use crate::listener::ParseListener;
use crate::options::KvOptions;
use crate::{ParseErrorKind, Result};

fn is_delimiter(ch: char) -> bool {
    matches!(ch, '{' | '}' | '"' | '[' | ']')
}

pub(crate) struct Kv1Tokenizer<I: Iterator<Item = char>> {
    reader: CharReader<I>,
    escapes: bool,
    reached_end: bool,
}

impl<I: Iterator<Item = char>> Kv1Tokenizer<I> {
    pub(crate) fn new(source: I, escapes: bool) -> Self {
        Kv1Tokenizer {
            reader: CharReader::new(source),
            escapes,
            reached_end: false,
        }
    }

    fn read_comment(&mut self) -> ReadResult<String> {
        self.reader.read_expected('/')?;
        self.reader.read_expected('/')?;
        Ok(self.reader.read_to_end_of_line()?.trim().to_string())
    }

    fn read_condition(&mut self) -> ReadResult<String> {
        self.reader.read_expected('[')?;
        let mut text = String::new();
        loop {
            let position = self.reader.position();
            match self.reader.next()? {
                ']' => return Ok(text.trim().to_string()),
                '\n' | '[' => {
                    return Err(ParseErrorKind::Syntax {
                        position,
                        msg: "unterminated conditional".to_string(),
                    })
                }
                ch => text.push(ch),
            }
        }
    }
}

impl<I: Iterator<Item = char>> Tokenizer for Kv1Tokenizer<I> {
    fn read_next_token(&mut self) -> ReadResult<SpannedToken> {
        self.reader.skip_whitespace();
        let position = self.reader.position();

        let token = match self.reader.peek() {
            None if self.reached_end => return Err(self.reader.end_of_input()),
            None => {
                self.reached_end = true;
                Token::EndOfFile
            }
            Some('{') => {
                self.reader.next()?;
                Token::ObjectStart
            }
            Some('}') => {
                self.reader.next()?;
                Token::ObjectEnd
            }
            Some(']') => {
                self.reader.next()?;
                Token::ArrayEnd
            }
            Some('"') => Token::QuotedString(self.reader.read_quoted(self.escapes)?),
            Some('[') => Token::Condition(self.read_condition()?),
            Some('/') => Token::Comment(self.read_comment()?),
            Some(_) => Token::Identifier(self.reader.read_unquoted(is_delimiter)?),
        };

        Ok(SpannedToken { token, position })
    }
}

/// Reads KeyValues1 text from a character source.
pub struct Kv1TextReader<I: Iterator<Item = char>> {
    tokenizer: Kv1Tokenizer<I>,
    conditions: Vec<String>,
    max_depth: usize,
}

impl<I: Iterator<Item = char>> Kv1TextReader<I> {
    /// Uses the escape handling and conditional symbols from `options`.
    pub fn new(source: I, options: &KvOptions) -> Self {
        Kv1TextReader {
            tokenizer: Kv1Tokenizer::new(source, options.has_escape_sequences),
            conditions: options.conditions.clone(),
            max_depth: options.max_depth,
        }
    }
}

impl<I: Iterator<Item = char>> VisitingReader for Kv1TextReader<I> {
    fn read_object(&mut self, listener: &mut dyn ParseListener) -> Result<()> {
        let mut machine = StateMachine::new(Dialect::KeyValues1, &self.conditions, listener)
            .with_max_depth(self.max_depth);
        drive(&mut self.tokenizer, &mut machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Token> {
        let mut tokenizer = Kv1Tokenizer::new(text.chars(), true);
        let mut out = Vec::new();
        loop {
            let spanned = tokenizer.read_next_token().unwrap();
            let done = spanned.token == Token::EndOfFile;
            out.push(spanned.token);
            if done {
                return out;
            }
        }
    }

    #[test]
    fn test_tokenizes_object() {
        assert_eq!(
            tokens("\"root\"\n{\n  key \"value\" // note\n}"),
            vec![
                Token::QuotedString("root".to_string()),
                Token::ObjectStart,
                Token::Identifier("key".to_string()),
                Token::QuotedString("value".to_string()),
                Token::Comment("note".to_string()),
                Token::ObjectEnd,
                Token::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_unquoted_stops_at_delimiters() {
        assert_eq!(
            tokens("a{b}c\"d\""),
            vec![
                Token::Identifier("a".to_string()),
                Token::ObjectStart,
                Token::Identifier("b".to_string()),
                Token::ObjectEnd,
                Token::Identifier("c".to_string()),
                Token::QuotedString("d".to_string()),
                Token::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_condition_and_stray_bracket() {
        assert_eq!(
            tokens("[ $WIN32 ] ]"),
            vec![
                Token::Condition("$WIN32".to_string()),
                Token::ArrayEnd,
                Token::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_end_of_file_only_once() {
        let mut tokenizer = Kv1Tokenizer::new("".chars(), true);
        assert_eq!(
            tokenizer.read_next_token().unwrap().token,
            Token::EndOfFile
        );
        assert!(matches!(
            tokenizer.read_next_token(),
            Err(ParseErrorKind::UnexpectedEndOfInput { .. })
        ));
    }

    #[test]
    fn test_single_slash_is_syntax_error() {
        let mut tokenizer = Kv1Tokenizer::new("/x".chars(), true);
        assert!(matches!(
            tokenizer.read_next_token(),
            Err(ParseErrorKind::Syntax { .. })
        ));
    }

    #[test]
    fn test_condition_cannot_span_lines() {
        let mut tokenizer = Kv1Tokenizer::new("[$A\n]".chars(), true);
        assert!(matches!(
            tokenizer.read_next_token(),
            Err(ParseErrorKind::Syntax { .. })
        ));
    }
}
