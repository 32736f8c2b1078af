//! Lexer for textual TM assembly.

use rustc_hash::FxHashMap;
use tinyc_util::{Handler, Phase};

/// Coarse category of a TM token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Instruction,
    Operator,
    EndOfFile,
    Unknown,
}

/// Exact identity of a TM token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenValue {
    // operators
    LeftParenthesis,  // (
    RightParenthesis, // )
    Comma,            // ,
    Colon,            // :
    Positive,         // +
    Negative,         // -

    Number,

    EndOfFile,

    // RO  opcode r,s,t
    Halt,
    In,
    Out,
    Add,
    Sub,
    Mul,
    Div,

    // RM  opcode r,d(s)
    Ld,
    Lda,
    Ldc,
    St,
    Jlt,
    Jle,
    Jge,
    Jgt,
    Jeq,
    Jne,

    Unreserved,
}

/// A TM token: lexeme text plus its classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub name: String,
    pub value: TokenValue,
    pub kind: TokenKind,
}

impl Token {
    fn new(name: impl Into<String>, value: TokenValue, kind: TokenKind) -> Self {
        Self {
            name: name.into(),
            value,
            kind,
        }
    }
}

impl Default for Token {
    fn default() -> Self {
        Self::new("", TokenValue::Unreserved, TokenKind::Unknown)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    None,
    Start,
    Instruction,
    Number,
    Comment,
    Operator,
    EndOfFile,
}

/// Tokenizer for TM assembly text.
///
/// Same shape as the source lexer: a small state machine with a
/// one-character lookahead, recovering from bad input by consuming it
/// and rescanning, so the assembler always sees a terminating
/// `EndOfFile` token.
pub struct Scanner<'a> {
    chars: std::str::Chars<'a>,
    current: Option<char>,
    dictionary: FxHashMap<&'static str, (TokenValue, TokenKind)>,
    state: State,
    buffer: String,
    token: Token,
    handler: &'a Handler,
}

impl<'a> Scanner<'a> {
    pub fn new(code: &'a str, handler: &'a Handler) -> Self {
        use TokenKind::{Instruction, Operator};
        use TokenValue::*;

        let mut dictionary = FxHashMap::default();
        dictionary.insert("HALT", (Halt, Instruction));
        dictionary.insert("IN", (In, Instruction));
        dictionary.insert("OUT", (Out, Instruction));
        dictionary.insert("ADD", (Add, Instruction));
        dictionary.insert("SUB", (Sub, Instruction));
        dictionary.insert("MUL", (Mul, Instruction));
        dictionary.insert("DIV", (Div, Instruction));

        dictionary.insert("LD", (Ld, Instruction));
        dictionary.insert("LDA", (Lda, Instruction));
        dictionary.insert("LDC", (Ldc, Instruction));
        dictionary.insert("ST", (St, Instruction));
        dictionary.insert("JLT", (Jlt, Instruction));
        dictionary.insert("JLE", (Jle, Instruction));
        dictionary.insert("JGE", (Jge, Instruction));
        dictionary.insert("JGT", (Jgt, Instruction));
        dictionary.insert("JEQ", (Jeq, Instruction));
        dictionary.insert("JNE", (Jne, Instruction));

        dictionary.insert("(", (LeftParenthesis, Operator));
        dictionary.insert(")", (RightParenthesis, Operator));
        dictionary.insert(",", (Comma, Operator));
        dictionary.insert(":", (Colon, Operator));
        dictionary.insert("+", (Positive, Operator));
        dictionary.insert("-", (Negative, Operator));

        let mut scanner = Self {
            chars: code.chars(),
            current: None,
            dictionary,
            state: State::None,
            buffer: String::new(),
            token: Token::default(),
            handler,
        };
        scanner.next_char();
        scanner
    }

    /// The most recently produced token.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Produces the next token; `EndOfFile` forever once input ends.
    pub fn next_token(&mut self) -> Token {
        self.state = State::Start;

        loop {
            match self.state {
                State::None => break,
                State::Start => self.handle_start_state(),
                State::Instruction => self.handle_instruction_state(),
                State::Number => self.handle_number_state(),
                State::Comment => self.handle_comment_state(),
                State::Operator => self.handle_operator_state(),
                State::EndOfFile => self.handle_end_of_file_state(),
            }
        }

        self.token.clone()
    }

    fn next_char(&mut self) {
        self.current = self.chars.next();
    }

    fn make_token(&mut self, value: TokenValue, kind: TokenKind) {
        let name = std::mem::take(&mut self.buffer);
        self.token = Token::new(name, value, kind);
        self.state = State::None;
    }

    fn error_report(&self, message: &str) {
        self.handler.report_bare(Phase::VmToken, message);
    }

    fn handle_start_state(&mut self) {
        while matches!(self.current, Some(c) if c.is_ascii_whitespace()) {
            self.next_char();
        }
        self.state = match self.current {
            None => State::EndOfFile,
            Some(c) if c.is_ascii_alphabetic() => State::Instruction,
            Some(c) if c.is_ascii_digit() => State::Number,
            Some('*') => State::Comment,
            Some(_) => State::Operator,
        };
    }

    fn handle_instruction_state(&mut self) {
        while let Some(c) = self.current {
            if !c.is_ascii_alphabetic() {
                break;
            }
            self.buffer.push(c);
            self.next_char();
        }

        match self.dictionary.get(self.buffer.as_str()).copied() {
            Some((value, kind)) => self.make_token(value, kind),
            None => {
                self.error_report(&format!("invalid instruction '{}'", self.buffer));
                self.buffer.clear();
                self.state = State::Start;
            }
        }
    }

    fn handle_number_state(&mut self) {
        while let Some(c) = self.current {
            if !c.is_ascii_digit() {
                break;
            }
            self.buffer.push(c);
            self.next_char();
        }
        self.make_token(TokenValue::Number, TokenKind::Number);
    }

    fn handle_comment_state(&mut self) {
        // To end of line; end of input also terminates the comment.
        while !matches!(self.current, None | Some('\n') | Some('\r')) {
            self.next_char();
        }
        if self.current == Some('\r') && self.chars.clone().next() == Some('\n') {
            self.next_char();
        }
        self.next_char();
        self.state = State::Start;
    }

    fn handle_operator_state(&mut self) {
        if let Some(c) = self.current {
            self.buffer.push(c);
        }
        match self.dictionary.get(self.buffer.as_str()).copied() {
            Some((value, kind)) => {
                self.make_token(value, kind);
                self.next_char();
            }
            None => {
                self.error_report(&format!("invalid operator '{}'", self.buffer));
                self.buffer.clear();
                self.next_char();
                self.state = State::Start;
            }
        }
    }

    fn handle_end_of_file_state(&mut self) {
        self.buffer.clear();
        self.token = Token::new("eof", TokenValue::EndOfFile, TokenKind::EndOfFile);
        self.state = State::None;
    }
}
