//! Expression parsing.
//!
//! Three levels encode the precedence: `expr` (one optional relational
//! operator, non-associative), `simple_expr` (`+`/`-`, left-assoc),
//! `term` (`*`/`/`, left-assoc). `factor` bottoms out at identifiers,
//! numbers, and parenthesised expressions; there is no unary minus.

use tinyc_lex::{TokenKind, TokenValue};

use crate::ast::{Ast, AstKind};
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_expression(&mut self) -> Option<Box<Ast>> {
        let location = self.lexer.token().location().clone();
        let left_part = self.parse_simple_expression();

        let operator_value = self.lexer.token().value();
        if operator_value != TokenValue::Less && operator_value != TokenValue::Equal {
            return left_part;
        }
        let operator_name = self.lexer.token().name().to_string();

        self.lexer.next_token(); // eat the operator
        let right_part = self.parse_simple_expression();

        Some(Ast::boxed(
            AstKind::Expression {
                operator_name,
                operator_value,
                left_part,
                right_part,
            },
            location,
        ))
    }

    fn parse_simple_expression(&mut self) -> Option<Box<Ast>> {
        let location = self.lexer.token().location().clone();
        let mut left_part = self.parse_term();

        loop {
            let operator_value = self.lexer.token().value();
            if operator_value != TokenValue::Plus && operator_value != TokenValue::Minus {
                break;
            }
            let operator_name = self.lexer.token().name().to_string();

            self.lexer.next_token(); // eat the operator
            let right_part = self.parse_term();
            left_part = Some(Ast::boxed(
                AstKind::Expression {
                    operator_name,
                    operator_value,
                    left_part,
                    right_part,
                },
                location.clone(),
            ));
        }

        left_part
    }

    fn parse_term(&mut self) -> Option<Box<Ast>> {
        let location = self.lexer.token().location().clone();
        let mut left_part = self.parse_factor();

        loop {
            let operator_value = self.lexer.token().value();
            if operator_value != TokenValue::Multiply && operator_value != TokenValue::Divide {
                break;
            }
            let operator_name = self.lexer.token().name().to_string();

            self.lexer.next_token(); // eat the operator
            let right_part = self.parse_factor();
            left_part = Some(Ast::boxed(
                AstKind::Expression {
                    operator_name,
                    operator_value,
                    left_part,
                    right_part,
                },
                location.clone(),
            ));
        }

        left_part
    }

    fn parse_factor(&mut self) -> Option<Box<Ast>> {
        let location = self.lexer.token().location().clone();

        match self.lexer.token().kind() {
            TokenKind::Identifier => {
                let result = Ast::boxed(
                    AstKind::Variable(self.lexer.token().name().to_string()),
                    location,
                );
                self.lexer.next_token(); // eat the variable
                Some(result)
            }
            TokenKind::Number => {
                let result = Ast::boxed(
                    AstKind::Constant(self.lexer.token().int_value().unwrap_or(0)),
                    location,
                );
                self.lexer.next_token(); // eat the constant
                Some(result)
            }
            _ => {
                if !self.expect_value(TokenValue::LeftParenthesis, "(", true) {
                    return None;
                }
                let result = self.parse_expression();
                if !self.expect_value(TokenValue::RightParenthesis, ")", true) {
                    return None;
                }
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tinyc_lex::{Lexer, TokenValue};
    use tinyc_util::Handler;

    use crate::ast::{Ast, AstKind};
    use crate::Parser;

    /// Parses `source` as a lone write statement and returns its
    /// expression subtree.
    fn parse_expr(source: &str) -> (Option<Box<Ast>>, Handler) {
        let handler = Handler::new();
        let source_text = format!("write {source}");
        let root = {
            let lexer = Lexer::new("test.tiny", &source_text, &handler);
            let mut parser = Parser::new(lexer, &handler);
            parser.parse()
        };
        let expression = root.map(|ast| match ast.kind {
            AstKind::Write { expression } => expression,
            other => panic!("expected write, got {other:?}"),
        });
        (expression.flatten(), handler)
    }

    fn operator(ast: &Ast) -> TokenValue {
        match &ast.kind {
            AstKind::Expression { operator_value, .. } => *operator_value,
            other => panic!("expected expression, got {other:?}"),
        }
    }

    fn parts<'t>(ast: &'t Ast) -> (&'t Ast, &'t Ast) {
        match &ast.kind {
            AstKind::Expression {
                left_part,
                right_part,
                ..
            } => (left_part.as_ref().unwrap(), right_part.as_ref().unwrap()),
            other => panic!("expected expression, got {other:?}"),
        }
    }

    #[test]
    fn test_factor_constant() {
        let (expr, handler) = parse_expr("42");
        assert_eq!(expr.unwrap().kind, AstKind::Constant(42));
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_factor_variable() {
        let (expr, _) = parse_expr("x");
        assert_eq!(expr.unwrap().kind, AstKind::Variable("x".to_string()));
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        // 2 + 3 * 4 parses as 2 + (3 * 4)
        let (expr, handler) = parse_expr("2 + 3 * 4");
        assert!(!handler.has_errors());
        let expr = expr.unwrap();
        assert_eq!(operator(&expr), TokenValue::Plus);
        let (left, right) = parts(&expr);
        assert_eq!(left.kind, AstKind::Constant(2));
        assert_eq!(operator(right), TokenValue::Multiply);
    }

    #[test]
    fn test_addition_is_left_associative() {
        // 1 - 2 + 3 parses as (1 - 2) + 3
        let (expr, _) = parse_expr("1 - 2 + 3");
        let expr = expr.unwrap();
        assert_eq!(operator(&expr), TokenValue::Plus);
        let (left, right) = parts(&expr);
        assert_eq!(operator(left), TokenValue::Minus);
        assert_eq!(right.kind, AstKind::Constant(3));
    }

    #[test]
    fn test_parentheses_override_precedence() {
        // (2 + 3) * 4
        let (expr, handler) = parse_expr("(2 + 3) * 4");
        assert!(!handler.has_errors());
        let expr = expr.unwrap();
        assert_eq!(operator(&expr), TokenValue::Multiply);
        let (left, _) = parts(&expr);
        assert_eq!(operator(left), TokenValue::Plus);
    }

    #[test]
    fn test_relational_operator_tops_the_tree() {
        let (expr, _) = parse_expr("x + 1 < y * 2");
        let expr = expr.unwrap();
        assert_eq!(operator(&expr), TokenValue::Less);
        let (left, right) = parts(&expr);
        assert_eq!(operator(left), TokenValue::Plus);
        assert_eq!(operator(right), TokenValue::Multiply);
    }

    #[test]
    fn test_expression_keeps_operator_lexeme() {
        let (expr, _) = parse_expr("1 = 2");
        match expr.unwrap().kind {
            AstKind::Expression { operator_name, .. } => assert_eq!(operator_name, "="),
            other => panic!("expected expression, got {other:?}"),
        }
    }

    #[test]
    fn test_unbalanced_parenthesis_is_reported() {
        let (expr, handler) = parse_expr("(1 + 2");
        assert!(expr.is_none());
        assert!(handler.diagnostics()[0].message.contains("Expected ')'"));
    }

    #[test]
    fn test_garbage_factor_is_reported() {
        let (expr, handler) = parse_expr(";");
        assert!(expr.is_none());
        assert!(handler.diagnostics()[0].message.contains("Expected '('"));
    }
}
