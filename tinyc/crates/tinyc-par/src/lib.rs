//! tinyc-par - Recursive-Descent Parser for TINY
//!
//! ============================================================================
//! GRAMMAR
//! ============================================================================
//!
//! The parser is a textbook top-down recursive-descent parser with one
//! token of lookahead, one function per non-terminal:
//!
//! ```ebnf
//! program     = stmt_seq ;
//! stmt_seq    = stmt { ";" stmt } ;
//! stmt        = if_stmt | repeat_stmt | assign_stmt | read_stmt | write_stmt ;
//! if_stmt     = "if" expr "then" stmt_seq [ "else" stmt_seq ] "end" ;
//! repeat_stmt = "repeat" stmt_seq "until" expr ;
//! assign_stmt = identifier ":=" expr ;
//! read_stmt   = "read" identifier ;
//! write_stmt  = "write" expr ;
//! expr        = simple_expr [ ( "=" | "<" ) simple_expr ] ;
//! simple_expr = term { ( "+" | "-" ) term } ;
//! term        = factor { ( "*" | "/" ) factor } ;
//! factor      = identifier | number | "(" expr ")" ;
//! ```
//!
//! Relational operators are non-associative by construction (at most one
//! per `expr`); the arithmetic levels are left-associative because they
//! fold inside a loop. A statement sequence ends when the lookahead is
//! one of `else`, `end`, `until`, or end of file.
//!
//! ERROR RECOVERY:
//! ---------------
//! Two helpers drive recovery. `validate_*` only answers whether the
//! lookahead matches (optionally consuming it); `expect_*` additionally
//! reports "Expected X, but find Y" on a mismatch. A failed sub-parse
//! returns `None` for the child slot and the caller decides whether the
//! statement can still be built; the driver refuses to run later stages
//! once anything was reported.

pub mod ast;
mod expr;
mod stmt;

#[cfg(test)]
mod edge_cases;

pub use ast::{traverse, Ast, AstKind, ExprType};

use tinyc_lex::{Lexer, TokenKind, TokenValue};
use tinyc_util::{Handler, Phase};

/// The TINY parser. Owns the lexer that supplies its one-token
/// lookahead.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    handler: &'a Handler,
}

impl<'a> Parser<'a> {
    /// Creates a parser and primes the lookahead with the first token.
    pub fn new(mut lexer: Lexer<'a>, handler: &'a Handler) -> Self {
        lexer.next_token();
        Self { lexer, handler }
    }

    /// Parses a whole program into a statement sequence.
    ///
    /// An empty token stream is an error ("Unexpected end of file.").
    pub fn parse(&mut self) -> Option<Box<Ast>> {
        if self.lexer.token().kind() == TokenKind::EndOfFile {
            self.error_report("Unexpected end of file.");
            return None;
        }
        self.parse_statement_sequence()
    }

    pub(crate) fn parse_statement_sequence(&mut self) -> Option<Box<Ast>> {
        let mut head = self.parse_statement();

        let mut current = &mut head;
        while let Some(node) = current {
            if self.is_end_of_statement_sequence() {
                break;
            }
            self.expect_value(TokenValue::Semicolon, ";", true);
            node.next = self.parse_statement();
            current = &mut node.next;
        }

        head
    }

    fn is_end_of_statement_sequence(&self) -> bool {
        match self.lexer.token().value() {
            TokenValue::Else | TokenValue::End | TokenValue::Until => true,
            TokenValue::Semicolon => false,
            _ => self.lexer.token().kind() == TokenKind::EndOfFile,
        }
    }

    fn parse_statement(&mut self) -> Option<Box<Ast>> {
        match self.lexer.token().value() {
            TokenValue::If => self.parse_if_statement(),
            TokenValue::Repeat => self.parse_repeat_statement(),
            TokenValue::Read => self.parse_read_statement(),
            TokenValue::Write => self.parse_write_statement(),
            _ => {
                if self.lexer.token().kind() == TokenKind::Identifier {
                    self.parse_assign_statement()
                } else {
                    self.error_report(&format!(
                        "unknown token '{}'",
                        self.lexer.token().name()
                    ));
                    None
                }
            }
        }
    }

    pub(crate) fn validate_kind(&mut self, kind: TokenKind, advance: bool) -> bool {
        if self.lexer.token().kind() != kind {
            return false;
        }
        if advance {
            self.lexer.next_token();
        }
        true
    }

    pub(crate) fn validate_value(&mut self, value: TokenValue, advance: bool) -> bool {
        if self.lexer.token().value() != value {
            return false;
        }
        if advance {
            self.lexer.next_token();
        }
        true
    }

    pub(crate) fn expect_kind(
        &mut self,
        kind: TokenKind,
        description: &str,
        advance: bool,
    ) -> bool {
        if self.lexer.token().kind() != kind {
            self.error_report(&format!(
                "Expected '{}', but find {} {}",
                description,
                self.lexer.token().kind().description(),
                self.lexer.token().name()
            ));
            return false;
        }
        if advance {
            self.lexer.next_token();
        }
        true
    }

    pub(crate) fn expect_value(&mut self, value: TokenValue, name: &str, advance: bool) -> bool {
        if self.lexer.token().value() != value {
            self.error_report(&format!(
                "Expected '{}', but find {}",
                name,
                self.lexer.token().name()
            ));
            return false;
        }
        if advance {
            self.lexer.next_token();
        }
        true
    }

    pub(crate) fn error_report(&self, message: &str) {
        self.handler
            .report(Phase::Syntax, self.lexer.token().location().clone(), message);
    }
}
