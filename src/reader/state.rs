//! The parser state machine shared by the KV1 and KV3 text readers.
//!
//! The machine keeps one [`ParseContext`] per open object or array plus a single
//! current [`ParserSubState`]. Tokens either advance the state, emit a
//! structural event to the listener, or are rejected with `InvalidState`.
//!
//! After a value, a key token implicitly closes the finished pair and becomes
//! the next key of the same object, so sibling pairs never need separators.

use super::condition;
use super::token::{SpannedToken, Token, Tokenizer};
use crate::error::{Error, ParseErrorKind, Position, Result};
use crate::listener::{Event, ParseListener};
use crate::options::DEFAULT_MAX_DEPTH;
use crate::value::{coerce_literal, KvValue};
use std::fmt;
use tracing::{debug, trace};

/// KV3 documents carry no root key of their own.
pub(crate) const KV3_ROOT_NAME: &str = "root";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Dialect {
    KeyValues1,
    KeyValues3,
}

/// The phase within the innermost open context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ParserSubState {
    Header,
    BeforeKey,
    BetweenKeyAndValue,
    BeforeValue,
    AfterValue,
    InArray,
    Finished,
}

impl fmt::Display for ParserSubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ParserSubState::Header => "expecting the document header",
            ParserSubState::BeforeKey => "expecting a key",
            ParserSubState::BetweenKeyAndValue => "between a key and its value",
            ParserSubState::BeforeValue => "expecting a value",
            ParserSubState::AfterValue => "after a value",
            ParserSubState::InArray => "inside an array",
            ParserSubState::Finished => "after the end of the document",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ContextKind {
    Object,
    Array,
}

#[derive(Debug)]
struct ParseContext {
    kind: ContextKind,
    pending_key: Option<String>,
    has_entries: bool,
    /// Arrays: an element was read and a `,` or `]` must follow.
    awaiting_separator: bool,
    /// KV1: the subtree was excluded by a false conditional.
    discarded: bool,
    /// KV3 root: `{` was present, so `}` (not end of file) must close it.
    explicit_brace: bool,
}

impl ParseContext {
    fn new(kind: ContextKind, discarded: bool, explicit_brace: bool) -> Self {
        ParseContext {
            kind,
            pending_key: None,
            has_entries: false,
            awaiting_separator: false,
            discarded,
            explicit_brace,
        }
    }
}

pub(crate) struct StateMachine<'a> {
    dialect: Dialect,
    conditions: &'a [String],
    listener: &'a mut dyn ParseListener,
    stack: Vec<ParseContext>,
    state: ParserSubState,
    /// KV1 key read while no context is open.
    root_key: Option<String>,
    /// KV1 pair held back until we know no conditional follows it.
    deferred: Option<(String, KvValue)>,
    discard_next: bool,
    /// Depth of discarded subtrees currently open; events are dropped while non-zero.
    suppressed: usize,
    /// KV1: a root candidate was dropped by a false conditional.
    root_excluded: bool,
    max_depth: usize,
    events: usize,
}

/// KV3 values such as `resource:"x.vmdl"` carry a flag before the literal.
fn is_flag_prefix(text: &str) -> bool {
    text.ends_with(':') || text.ends_with('+')
}

impl<'a> StateMachine<'a> {
    pub(crate) fn new(
        dialect: Dialect,
        conditions: &'a [String],
        listener: &'a mut dyn ParseListener,
    ) -> Self {
        let state = match dialect {
            Dialect::KeyValues1 => ParserSubState::BeforeKey,
            Dialect::KeyValues3 => ParserSubState::Header,
        };
        StateMachine {
            dialect,
            conditions,
            listener,
            stack: Vec::new(),
            state,
            root_key: None,
            deferred: None,
            discard_next: false,
            suppressed: 0,
            root_excluded: false,
            max_depth: DEFAULT_MAX_DEPTH,
            events: 0,
        }
    }

    pub(crate) fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub(crate) fn state(&self) -> ParserSubState {
        self.state
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.state == ParserSubState::Finished
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn feed(&mut self, spanned: SpannedToken) -> Result<()> {
        let SpannedToken { token, position } = spanned;

        match token {
            Token::Comment(_) => return Ok(()),
            Token::Condition(expression) => return self.read_condition(expression, position),
            _ => {}
        }

        self.flush_deferred()?;

        use ParserSubState as S;
        match (self.state, token) {
            (S::Header, Token::Header(_)) => self.open_root(false),
            (S::Header, Token::ObjectStart) => self.open_root(true),

            (S::BeforeKey, Token::ObjectStart) if self.awaiting_root_brace() => {
                if let Some(root) = self.stack.last_mut() {
                    root.explicit_brace = true;
                }
                Ok(())
            }

            (S::BeforeKey, Token::Identifier(key) | Token::QuotedString(key)) => {
                self.set_key(key);
                Ok(())
            }

            // implicit close: the finished pair ends and this token starts the next one
            (S::AfterValue, Token::Identifier(key) | Token::QuotedString(key))
                if !self.stack.is_empty() || (self.root_excluded && self.events == 0) =>
            {
                self.set_key(key);
                Ok(())
            }

            (S::BeforeKey | S::AfterValue, Token::ObjectEnd) if !self.stack.is_empty() => {
                self.close_object(position)
            }

            (S::BetweenKeyAndValue, Token::Assignment) if self.dialect == Dialect::KeyValues3 => {
                self.state = S::BeforeValue;
                Ok(())
            }

            // KV1 has no assignment operator; the value follows the key directly
            (S::BetweenKeyAndValue, token) if self.dialect == Dialect::KeyValues1 => {
                self.read_value(token, position)
            }

            (S::BeforeValue, token) => self.read_value(token, position),

            (S::InArray, Token::Comma) if self.top_awaits_separator() => {
                if let Some(array) = self.stack.last_mut() {
                    array.awaiting_separator = false;
                }
                Ok(())
            }

            (S::InArray, Token::ArrayEnd) => self.close_array(),

            (S::InArray, token) if !self.top_awaits_separator() => {
                self.read_element(token, position)
            }

            (S::BeforeKey | S::AfterValue, Token::EndOfFile) => self.finish_document(position),

            (_, Token::EndOfFile) => Err(Error::unexpected_eof(position)),

            (_, token) => Err(self.invalid(&token, position)),
        }
    }

    fn invalid(&self, token: &Token, position: Position) -> Error {
        Error::invalid_state(position, &token.to_string(), &self.state.to_string())
    }

    fn awaiting_root_brace(&self) -> bool {
        self.dialect == Dialect::KeyValues3
            && self.stack.len() == 1
            && !self.stack[0].explicit_brace
            && !self.stack[0].has_entries
    }

    fn top_awaits_separator(&self) -> bool {
        self.stack
            .last()
            .is_some_and(|context| context.awaiting_separator)
    }

    fn emit(&mut self, event: Event) -> Result<()> {
        if self.suppressed > 0 {
            trace!(?event, "suppressed by conditional");
            return Ok(());
        }

        trace!(?event, depth = self.stack.len(), "emit");
        self.events += 1;
        match event {
            Event::ObjectStart(name) => self.listener.on_object_start(&name),
            Event::ObjectEnd => self.listener.on_object_end(),
            Event::ArrayStart(name) => self.listener.on_array_start(&name),
            Event::ArrayEnd => self.listener.on_array_end(),
            Event::KeyValuePair(name, value) => self.listener.on_key_value_pair(&name, value),
            Event::ArrayValue(value) => self.listener.on_array_value(value),
        }
    }

    fn flush_deferred(&mut self) -> Result<()> {
        match self.deferred.take() {
            Some((key, value)) => self.emit(Event::KeyValuePair(key, value)),
            None => Ok(()),
        }
    }

    fn set_key(&mut self, key: String) {
        match self.stack.last_mut() {
            Some(context) => {
                context.pending_key = Some(key);
                context.has_entries = true;
            }
            None => self.root_key = Some(key),
        }
        self.state = ParserSubState::BetweenKeyAndValue;
    }

    fn take_key(&mut self, position: Position) -> Result<String> {
        let key = match self.stack.last_mut() {
            Some(context) => context.pending_key.take(),
            None => self.root_key.take(),
        };
        key.ok_or_else(|| {
            Error::parse(
                "Value without a key.",
                ParseErrorKind::InvalidState {
                    position,
                    token: "value".to_string(),
                    state: self.state.to_string(),
                },
            )
        })
    }

    fn open_root(&mut self, explicit_brace: bool) -> Result<()> {
        self.emit(Event::ObjectStart(KV3_ROOT_NAME.to_string()))?;
        self.stack
            .push(ParseContext::new(ContextKind::Object, false, explicit_brace));
        self.state = ParserSubState::BeforeKey;
        Ok(())
    }

    fn read_value(&mut self, token: Token, position: Position) -> Result<()> {
        match token {
            Token::QuotedString(text) => self.complete_pair(KvValue::String(text), position),
            Token::Identifier(text)
                if self.dialect == Dialect::KeyValues3 && is_flag_prefix(&text) =>
            {
                trace!(flag = %text, "value flag");
                self.state = ParserSubState::BeforeValue;
                Ok(())
            }
            Token::Identifier(text) => {
                let value = match self.dialect {
                    Dialect::KeyValues1 => KvValue::String(text),
                    Dialect::KeyValues3 => coerce_literal(&text),
                };
                self.complete_pair(value, position)
            }
            Token::ObjectStart => {
                let name = self.take_key(position)?;
                self.open_container(ContextKind::Object, name, position)
            }
            Token::ArrayStart if self.dialect == Dialect::KeyValues3 => {
                let name = self.take_key(position)?;
                self.open_container(ContextKind::Array, name, position)
            }
            Token::EndOfFile => Err(Error::unexpected_eof(position)),
            other => Err(self.invalid(&other, position)),
        }
    }

    fn complete_pair(&mut self, value: KvValue, position: Position) -> Result<()> {
        let key = self.take_key(position)?;
        let discarded = std::mem::take(&mut self.discard_next);
        self.state = ParserSubState::AfterValue;

        if discarded {
            return Ok(());
        }
        match self.dialect {
            Dialect::KeyValues1 => {
                self.deferred = Some((key, value));
                Ok(())
            }
            Dialect::KeyValues3 => self.emit(Event::KeyValuePair(key, value)),
        }
    }

    fn read_element(&mut self, token: Token, position: Position) -> Result<()> {
        match token {
            Token::QuotedString(text) => self.push_element(KvValue::String(text)),
            Token::Identifier(text) if is_flag_prefix(&text) => Ok(()),
            Token::Identifier(text) => self.push_element(coerce_literal(&text)),
            Token::ObjectStart => {
                self.open_container(ContextKind::Object, String::new(), position)
            }
            Token::ArrayStart => self.open_container(ContextKind::Array, String::new(), position),
            Token::EndOfFile => Err(Error::unexpected_eof(position)),
            other => Err(self.invalid(&other, position)),
        }
    }

    fn push_element(&mut self, value: KvValue) -> Result<()> {
        self.emit(Event::ArrayValue(value))?;
        if let Some(array) = self.stack.last_mut() {
            array.awaiting_separator = true;
        }
        Ok(())
    }

    fn open_container(
        &mut self,
        kind: ContextKind,
        name: String,
        position: Position,
    ) -> Result<()> {
        if self.stack.len() >= self.max_depth {
            return Err(Error::depth_exceeded(position, self.max_depth));
        }

        let discarded = std::mem::take(&mut self.discard_next);
        if discarded {
            self.suppressed += 1;
        }

        match kind {
            ContextKind::Object => {
                self.emit(Event::ObjectStart(name))?;
                self.state = ParserSubState::BeforeKey;
            }
            ContextKind::Array => {
                self.emit(Event::ArrayStart(name))?;
                self.state = ParserSubState::InArray;
            }
        }
        self.stack.push(ParseContext::new(kind, discarded, true));
        Ok(())
    }

    fn close_object(&mut self, position: Position) -> Result<()> {
        let closes_braceless_root = self.dialect == Dialect::KeyValues3
            && self.stack.len() == 1
            && !self.stack[0].explicit_brace;
        let top_is_object = self
            .stack
            .last()
            .is_some_and(|context| context.kind == ContextKind::Object);

        if closes_braceless_root || !top_is_object {
            return Err(self.invalid(&Token::ObjectEnd, position));
        }

        self.pop_context(Event::ObjectEnd)
    }

    fn close_array(&mut self) -> Result<()> {
        self.pop_context(Event::ArrayEnd)
    }

    fn pop_context(&mut self, end: Event) -> Result<()> {
        self.emit(end)?;
        let Some(context) = self.stack.pop() else {
            return Ok(());
        };
        if context.discarded {
            self.suppressed -= 1;
        }
        self.resume_parent();

        // another root candidate may follow an excluded one
        if context.discarded && self.stack.is_empty() {
            self.root_excluded = true;
            self.state = ParserSubState::BeforeKey;
        }
        Ok(())
    }

    fn resume_parent(&mut self) {
        self.state = match self.stack.last_mut() {
            None => ParserSubState::Finished,
            Some(parent) if parent.kind == ContextKind::Object => ParserSubState::AfterValue,
            Some(parent) => {
                parent.awaiting_separator = true;
                ParserSubState::InArray
            }
        };
    }

    fn finish_document(&mut self, position: Position) -> Result<()> {
        match self.stack.len() {
            0 if self.root_excluded && self.events == 0 => Err(Error::parse(
                "The document root was excluded by a conditional.",
                ParseErrorKind::Syntax {
                    position,
                    msg: "no root outside false conditionals".to_string(),
                },
            )),
            // KV1 document whose root is a single key/value pair
            0 if self.state == ParserSubState::AfterValue => {
                self.state = ParserSubState::Finished;
                Ok(())
            }
            1 if self.dialect == Dialect::KeyValues3 && !self.stack[0].explicit_brace => {
                self.pop_context(Event::ObjectEnd)
            }
            _ => Err(Error::unexpected_eof(position)),
        }
    }

    fn read_condition(&mut self, expression: String, position: Position) -> Result<()> {
        let holds = condition::evaluate(&expression, self.conditions)
            .map_err(|msg| Error::syntax(position, &msg))?;

        match self.state {
            ParserSubState::AfterValue if self.deferred.is_some() => {
                if holds {
                    self.flush_deferred()
                } else {
                    trace!(%expression, "conditional excluded value");
                    self.deferred = None;
                    if self.stack.is_empty() {
                        self.root_excluded = true;
                    }
                    Ok(())
                }
            }
            ParserSubState::BetweenKeyAndValue
                if self.dialect == Dialect::KeyValues1 && !self.discard_next =>
            {
                self.discard_next = !holds;
                Ok(())
            }
            _ => Err(self.invalid(&Token::Condition(expression), position)),
        }
    }
}

/// Pulls tokens into the state machine until the document is complete.
///
/// Tokenizer failures are wrapped into [`Error::Parse`] here, keeping the
/// low-level cause.
pub(crate) fn drive<T: Tokenizer>(tokenizer: &mut T, machine: &mut StateMachine<'_>) -> Result<()> {
    while !machine.is_finished() {
        let spanned = tokenizer.read_next_token().map_err(wrap_token_error)?;
        trace!(
            token = %spanned.token,
            state = %machine.state(),
            depth = machine.depth(),
            "read token"
        );
        machine.feed(spanned)?;
    }

    debug!(events = machine.events, "document complete");
    Ok(())
}

fn wrap_token_error(cause: ParseErrorKind) -> Error {
    let message = match cause {
        ParseErrorKind::UnexpectedEndOfInput { .. } => {
            "Found end of file while trying to read token."
        }
        _ => "Found malformed input while trying to read token.",
    };
    Error::parse(message, cause)
}
