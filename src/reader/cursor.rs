//! Character cursor shared by the text tokenizers.

use crate::error::{ParseErrorKind, Position};
use std::iter::Fuse;

pub(crate) type ReadResult<T> = std::result::Result<T, ParseErrorKind>;

/// A character source with exactly one character of buffered lookahead.
pub(crate) struct CharReader<I: Iterator<Item = char>> {
    source: Fuse<I>,
    peeked: Option<Option<char>>,
    line: usize,
    column: usize,
}

impl<I: Iterator<Item = char>> CharReader<I> {
    pub(crate) fn new(source: I) -> Self {
        CharReader {
            source: source.fuse(),
            peeked: None,
            line: 1,
            column: 1,
        }
    }

    /// Position of the next unread character.
    pub(crate) fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub(crate) fn peek(&mut self) -> Option<char> {
        if let Some(peeked) = self.peeked {
            return peeked;
        }
        let next = self.source.next();
        self.peeked = Some(next);
        next
    }

    pub(crate) fn next(&mut self) -> ReadResult<char> {
        let next = match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.source.next(),
        };

        match next {
            Some(ch) => {
                if ch == '\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
                Ok(ch)
            }
            None => Err(self.end_of_input()),
        }
    }

    pub(crate) fn read_expected(&mut self, expected: char) -> ReadResult<()> {
        let position = self.position();
        let next = self.next()?;
        if next != expected {
            return Err(ParseErrorKind::Syntax {
                position,
                msg: format!("expected '{}' but got '{}'", expected, next),
            });
        }
        Ok(())
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            // peeked, cannot fail
            let _ = self.next();
        }
    }

    /// Consumes characters up to (not including) the next newline or the end of input.
    pub(crate) fn read_to_end_of_line(&mut self) -> ReadResult<String> {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            text.push(self.next()?);
        }
        Ok(text.trim_end_matches('\r').to_string())
    }

    /// Reads a `"`-delimited string, starting at the opening quote.
    ///
    /// With `escapes` set, `\\ \" \n \t \r` are decoded and any other escape is
    /// a syntax error. Without it a backslash is an ordinary character.
    pub(crate) fn read_quoted(&mut self, escapes: bool) -> ReadResult<String> {
        self.read_expected('"')?;
        self.read_quoted_body(escapes)
    }

    /// Like [`read_quoted`](Self::read_quoted), with the opening quote already consumed.
    pub(crate) fn read_quoted_body(&mut self, escapes: bool) -> ReadResult<String> {
        let mut text = String::new();

        loop {
            let position = self.position();
            match self.next()? {
                '"' => return Ok(text),
                '\\' if escapes => {
                    let escaped = self.next()?;
                    text.push(match escaped {
                        '\\' => '\\',
                        '"' => '"',
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => {
                            return Err(ParseErrorKind::Syntax {
                                position,
                                msg: format!("unknown escaped character '\\{}'", other),
                            })
                        }
                    });
                }
                ch => text.push(ch),
            }
        }
    }

    /// Reads characters until `is_delimiter` or whitespace, without consuming the stop character.
    pub(crate) fn read_unquoted(&mut self, is_delimiter: impl Fn(char) -> bool) -> ReadResult<String> {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || is_delimiter(ch) {
                break;
            }
            text.push(self.next()?);
        }
        Ok(text)
    }

    pub(crate) fn end_of_input(&self) -> ParseErrorKind {
        ParseErrorKind::UnexpectedEndOfInput {
            position: self.position(),
        }
    }

    pub(crate) fn syntax_error(&self, msg: &str) -> ParseErrorKind {
        ParseErrorKind::Syntax {
            position: self.position(),
            msg: msg.to_string(),
        }
    }
}
