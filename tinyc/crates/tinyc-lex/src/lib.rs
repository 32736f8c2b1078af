//! tinyc-lex - Lexical Analyzer for TINY Source
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! The lexer transforms TINY source text into a stream of tokens. It is a
//! small deterministic state machine driven one character at a time:
//!
//! ```text
//!            +--------------------------------------+
//!            v                                      |
//! [Start] --digit--> [Number] ----> token ----> [None]
//!    |    --alpha--> [Identifier] -> token --------^
//!    |    --'{'----> [Comment] --'}'--> back to Start
//!    |    --EOF----> [EndOfFile] -> token
//!    +----otherwise> [Operator] ---> token
//! ```
//!
//! Each `next_token()` call enters `Start`, runs the machine until a
//! terminal state stores a token, and returns it. The machine keeps a
//! one-character lookahead (the current character) and can peek one
//! character beyond it, which is exactly enough to recognise the only
//! multi-character operator, `:=`.
//!
//! TOKEN SHAPE:
//! ------------
//! A token couples a coarse `TokenKind` (identifier, keyword, operator,
//! number, delimiter, eof) with a fine-grained `TokenValue` naming the
//! exact lexeme, plus the source location, the lexeme text, an optional
//! integer payload for numbers, and the operator precedence recorded in
//! the lexicon (unused by the parser, which encodes precedence in its
//! grammar positions).
//!
//! ERROR POLICY:
//! -------------
//! Lexical problems (an unterminated comment, a character no token can
//! start with) are reported through the shared diagnostic handler and
//! lexing continues, so a single run surfaces every lexical error. The
//! lexer always makes progress: an offending character is consumed
//! before rescanning, and end of input always produces an `EndOfFile`
//! token.

pub mod cursor;
pub mod lexer;
pub mod lexicon;
pub mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use lexicon::{Lexicon, TokenRecord};
pub use token::{Token, TokenKind, TokenValue};
