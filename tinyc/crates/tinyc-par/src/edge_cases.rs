//! Edge case tests for tinyc-par.

use tinyc_lex::{Lexer, TokenKind};
use tinyc_util::Handler;

use crate::ast::{Ast, AstKind};
use crate::Parser;

fn parse_source(source: &str) -> (Option<Box<Ast>>, Handler) {
    let handler = Handler::new();
    let root = {
        let lexer = Lexer::new("test.tiny", source, &handler);
        let mut parser = Parser::new(lexer, &handler);
        parser.parse()
    };
    (root, handler)
}

/// EDGE CASE: the parser consumes every token of a well-formed program,
/// leaving only the trailing EOF.
#[test]
fn test_edge_all_tokens_consumed() {
    let sources = [
        "x := 5; write x",
        "read x; if x < 0 then write 0 else write x end",
        "read n; f := 1; repeat f := f * n; n := n - 1 until n = 0; write f",
    ];
    for source in sources {
        let handler = Handler::new();
        let lexer = Lexer::new("test.tiny", source, &handler);
        let mut parser = Parser::new(lexer, &handler);
        let root = parser.parse();
        assert!(root.is_some(), "parse failed for {source:?}");
        assert!(!handler.has_errors(), "errors for {source:?}");
        assert_eq!(
            parser.lexer.token().kind(),
            TokenKind::EndOfFile,
            "lookahead not at EOF for {source:?}"
        );
    }
}

/// EDGE CASE: comments may appear anywhere between tokens.
#[test]
fn test_edge_comments_between_tokens() {
    let (root, handler) = parse_source("{ head } x { mid } := { mid } 1 { tail }");
    assert!(!handler.has_errors());
    assert!(matches!(root.unwrap().kind, AstKind::Assign { .. }));
}

/// EDGE CASE: deeply nested statement sequences keep their structure.
#[test]
fn test_edge_nested_sequences() {
    let (root, handler) = parse_source(
        "if a < 1 then if b < 2 then write 1; write 2 end else write 3 end",
    );
    assert!(!handler.has_errors());
    match root.unwrap().kind {
        AstKind::If {
            then_part,
            else_part,
            ..
        } => {
            let inner = then_part.unwrap();
            match inner.kind {
                AstKind::If {
                    then_part: inner_then,
                    else_part: inner_else,
                    ..
                } => {
                    // "write 1; write 2" is a two-element chain.
                    let first = inner_then.unwrap();
                    assert!(first.next.is_some());
                    assert!(inner_else.is_none());
                }
                other => panic!("expected nested if, got {other:?}"),
            }
            assert!(else_part.is_some());
        }
        other => panic!("expected if, got {other:?}"),
    }
}

/// EDGE CASE: a repeat whose body ends right before `until` takes no
/// trailing semicolon.
#[test]
fn test_edge_no_trailing_semicolon_before_until() {
    let (root, handler) = parse_source("repeat write 1 until x = 0");
    assert!(!handler.has_errors());
    assert!(matches!(root.unwrap().kind, AstKind::Repeat { .. }));
}

/// EDGE CASE: a semicolon directly before `end` is a syntax error (the
/// grammar has separators, not terminators).
#[test]
fn test_edge_trailing_semicolon_inside_if_is_reported() {
    let (_, handler) = parse_source("if x < 1 then write x; end");
    assert!(handler.has_errors());
}

/// EDGE CASE: error inside a nested sequence does not lose the
/// diagnostics from the enclosing context.
#[test]
fn test_edge_errors_accumulate() {
    let (_, handler) = parse_source("x := ; y := ");
    assert!(handler.error_count() >= 2);
}
