//! The TINY source lexer.

use tinyc_util::{Handler, Phase, TokenLocation};

use crate::cursor::Cursor;
use crate::lexicon::Lexicon;
use crate::token::{Token, TokenKind, TokenValue};

/// States of the token-level machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    None,
    Start,
    Number,
    Identifier,
    Comment,
    Operator,
    EndOfFile,
}

/// Streaming lexer over one source file.
///
/// `next_token` produces one token per call and `token` re-reads the
/// most recent one, which gives the parser its single token of
/// lookahead.
///
/// # Example
///
/// ```
/// use tinyc_lex::{Lexer, TokenKind, TokenValue};
/// use tinyc_util::Handler;
///
/// let handler = Handler::new();
/// let mut lexer = Lexer::new("t.tiny", "read x", &handler);
///
/// assert_eq!(lexer.next_token().value(), TokenValue::Read);
/// assert_eq!(lexer.next_token().kind(), TokenKind::Identifier);
/// assert_eq!(lexer.next_token().kind(), TokenKind::EndOfFile);
/// ```
pub struct Lexer<'a> {
    file_name: String,
    cursor: Cursor<'a>,
    lexicon: Lexicon,
    state: State,
    buffer: String,
    location: TokenLocation,
    token: Token,
    handler: &'a Handler,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `source`, reporting through `handler`.
    /// `file_name` only feeds diagnostic locations.
    pub fn new(file_name: impl Into<String>, source: &'a str, handler: &'a Handler) -> Self {
        Self {
            file_name: file_name.into(),
            cursor: Cursor::new(source),
            lexicon: Lexicon::new(),
            state: State::None,
            buffer: String::new(),
            location: TokenLocation::default(),
            token: Token::default(),
            handler,
        }
    }

    /// The most recently produced token.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Runs the state machine until the next token has been stored, and
    /// returns it. At end of input this yields `EndOfFile` forever.
    pub fn next_token(&mut self) -> Token {
        self.state = State::Start;

        loop {
            match self.state {
                State::None => break,
                State::Start => self.handle_start_state(),
                State::Number => self.handle_number_state(),
                State::Identifier => self.handle_identifier_state(),
                State::Comment => self.handle_comment_state(),
                State::Operator => self.handle_operator_state(),
                State::EndOfFile => self.handle_end_of_file_state(),
            }
        }

        self.token.clone()
    }

    fn update_token_location(&mut self) {
        self.location = TokenLocation::new(
            self.file_name.clone(),
            self.cursor.line(),
            self.cursor.column(),
        );
    }

    fn make_token(&mut self, kind: TokenKind, value: TokenValue, precedence: i32) {
        let name = std::mem::take(&mut self.buffer);
        self.token = Token::new(kind, value, self.location.clone(), precedence, name);
        self.state = State::None;
    }

    fn make_int_token(&mut self, int_value: i64) {
        let name = std::mem::take(&mut self.buffer);
        self.token = Token::with_int(
            TokenKind::Number,
            TokenValue::Unreserved,
            self.location.clone(),
            -1,
            name,
            int_value,
        );
        self.state = State::None;
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.cursor.current_char(), Some(c) if c.is_ascii_whitespace()) {
            self.cursor.advance();
        }
    }

    fn error_report(&self, message: &str) {
        self.handler
            .report(Phase::Token, self.location.clone(), message);
    }

    fn handle_start_state(&mut self) {
        self.skip_whitespace();
        self.state = match self.cursor.current_char() {
            None => State::EndOfFile,
            Some(c) if c.is_ascii_digit() => State::Number,
            Some(c) if c.is_ascii_alphabetic() => State::Identifier,
            Some('{') => State::Comment,
            Some(_) => State::Operator,
        };
    }

    fn handle_comment_state(&mut self) {
        self.update_token_location();
        while self.cursor.current_char() != Some('}') {
            if self.cursor.is_at_end() {
                self.error_report("End of file happened in comment, } is expected");
                break;
            }
            self.cursor.advance();
        }
        self.state = State::Start;
        self.cursor.advance();
    }

    fn handle_number_state(&mut self) {
        self.update_token_location();
        while let Some(c) = self.cursor.current_char() {
            if !c.is_ascii_digit() {
                break;
            }
            self.buffer.push(c);
            self.cursor.advance();
        }

        let int_value = match self.buffer.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                self.error_report(&format!("number '{}' is out of range", self.buffer));
                0
            }
        };
        self.make_int_token(int_value);
    }

    fn handle_identifier_state(&mut self) {
        self.update_token_location();
        while let Some(c) = self.cursor.current_char() {
            if !c.is_ascii_alphabetic() {
                break;
            }
            self.buffer.push(c);
            self.cursor.advance();
        }

        match self.lexicon.get(&self.buffer) {
            Some(record) => self.make_token(record.kind, record.value, record.precedence),
            None => self.make_token(TokenKind::Identifier, TokenValue::Unreserved, -1),
        }
    }

    fn handle_operator_state(&mut self) {
        self.update_token_location();
        if let Some(c) = self.cursor.current_char() {
            self.buffer.push(c);
        }
        if let Some(peek) = self.cursor.peek_char() {
            self.buffer.push(peek);
        }

        // Longest match first: try the two-character lexeme, then shrink.
        if self.buffer.chars().count() == 2 {
            if let Some(record) = self.lexicon.get(&self.buffer) {
                self.cursor.advance();
                self.make_token(record.kind, record.value, record.precedence);
                self.cursor.advance();
                return;
            }
            self.buffer.pop();
        }

        if let Some(record) = self.lexicon.get(&self.buffer) {
            self.make_token(record.kind, record.value, record.precedence);
            self.cursor.advance();
            return;
        }

        self.error_report(&format!("invalid character '{}'", self.buffer));
        self.buffer.clear();
        self.cursor.advance();
        self.state = State::Start;
    }

    fn handle_end_of_file_state(&mut self) {
        self.update_token_location();
        self.make_token(TokenKind::EndOfFile, TokenValue::Unreserved, -1);
    }
}
