//! Statement parsing.

use tinyc_lex::{TokenKind, TokenValue};

use crate::ast::{Ast, AstKind};
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_if_statement(&mut self) -> Option<Box<Ast>> {
        let location = self.lexer.token().location().clone();
        if !self.validate_value(TokenValue::If, true) {
            return None;
        }
        let test_part = self.parse_expression();
        if !self.expect_value(TokenValue::Then, "then", true) {
            return None;
        }
        let then_part = self.parse_statement_sequence();

        let mut else_part = None;
        match self.lexer.token().value() {
            TokenValue::End => {}
            TokenValue::Else => {
                self.lexer.next_token(); // eat "else"
                else_part = self.parse_statement_sequence();
                if !self.expect_value(TokenValue::End, "end", false) {
                    return None;
                }
            }
            _ => {
                self.error_report(&format!(
                    "invalid token '{}'",
                    self.lexer.token().name()
                ));
                return None;
            }
        }
        self.lexer.next_token(); // eat "end"

        Some(Ast::boxed(
            AstKind::If {
                test_part,
                then_part,
                else_part,
            },
            location,
        ))
    }

    pub(crate) fn parse_repeat_statement(&mut self) -> Option<Box<Ast>> {
        let location = self.lexer.token().location().clone();
        if !self.validate_value(TokenValue::Repeat, true) {
            return None;
        }
        let body_part = self.parse_statement_sequence();
        if !self.expect_value(TokenValue::Until, "until", true) {
            return None;
        }
        let test_part = self.parse_expression();

        Some(Ast::boxed(
            AstKind::Repeat {
                body_part,
                test_part,
            },
            location,
        ))
    }

    pub(crate) fn parse_assign_statement(&mut self) -> Option<Box<Ast>> {
        let location = self.lexer.token().location().clone();
        if !self.validate_kind(TokenKind::Identifier, false) {
            return None;
        }
        let variable = Some(Ast::boxed(
            AstKind::Variable(self.lexer.token().name().to_string()),
            location.clone(),
        ));
        self.lexer.next_token(); // eat the variable
        if !self.expect_value(TokenValue::Assign, ":=", true) {
            return None;
        }
        let expression = self.parse_expression();

        Some(Ast::boxed(
            AstKind::Assign {
                variable,
                expression,
            },
            location,
        ))
    }

    pub(crate) fn parse_read_statement(&mut self) -> Option<Box<Ast>> {
        let location = self.lexer.token().location().clone();
        if !self.validate_value(TokenValue::Read, true) {
            return None;
        }
        if !self.expect_kind(TokenKind::Identifier, "identifier", false) {
            return None;
        }
        let variable = Some(Ast::boxed(
            AstKind::Variable(self.lexer.token().name().to_string()),
            self.lexer.token().location().clone(),
        ));
        self.lexer.next_token(); // eat the variable

        Some(Ast::boxed(AstKind::Read { variable }, location))
    }

    pub(crate) fn parse_write_statement(&mut self) -> Option<Box<Ast>> {
        let location = self.lexer.token().location().clone();
        if !self.validate_value(TokenValue::Write, true) {
            return None;
        }
        let expression = self.parse_expression();

        Some(Ast::boxed(AstKind::Write { expression }, location))
    }
}
