//! The TINY abstract syntax tree.
//!
//! One owned sum type covers statements and expressions. Statements are
//! chained into sequences through the `next` link; expression subtrees
//! never use it. Each node owns its children and its `next` sibling
//! outright, so dropping a parent releases the whole subtree. A child
//! slot is `None` when the corresponding sub-parse failed; later stages
//! treat a missing child as an empty sequence or a `Void` expression.

use tinyc_lex::TokenValue;
use tinyc_util::TokenLocation;

/// The type the analyzer assigns to an expression node.
///
/// Every node starts `Void`; after analysis, every expression-shaped
/// node carries `Integer` or `Boolean`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExprType {
    #[default]
    Void,
    Integer,
    Boolean,
}

impl ExprType {
    /// The name used in type-mismatch diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ExprType::Void => "void",
            ExprType::Integer => "integer",
            ExprType::Boolean => "boolean",
        }
    }
}

/// Node payload, one variant per syntactic form.
#[derive(Debug, PartialEq)]
pub enum AstKind {
    If {
        test_part: Option<Box<Ast>>,
        then_part: Option<Box<Ast>>,
        else_part: Option<Box<Ast>>,
    },
    Repeat {
        body_part: Option<Box<Ast>>,
        test_part: Option<Box<Ast>>,
    },
    Assign {
        variable: Option<Box<Ast>>,
        expression: Option<Box<Ast>>,
    },
    Read {
        variable: Option<Box<Ast>>,
    },
    Write {
        expression: Option<Box<Ast>>,
    },
    /// A binary operation; carries the operator lexeme for printing and
    /// the `TokenValue` for semantic dispatch.
    Expression {
        operator_name: String,
        operator_value: TokenValue,
        left_part: Option<Box<Ast>>,
        right_part: Option<Box<Ast>>,
    },
    Constant(i64),
    Variable(String),
}

/// A node: payload, source location of its first token, the type slot
/// the analyzer fills in, and the statement-sequence sibling link.
#[derive(Debug, PartialEq)]
pub struct Ast {
    pub kind: AstKind,
    pub location: TokenLocation,
    pub expr_type: ExprType,
    pub next: Option<Box<Ast>>,
}

impl Ast {
    /// Creates a node with a `Void` type slot and no sibling.
    pub fn new(kind: AstKind, location: TokenLocation) -> Self {
        Self {
            kind,
            location,
            expr_type: ExprType::Void,
            next: None,
        }
    }

    /// Boxed convenience constructor; parser child slots are boxed.
    pub fn boxed(kind: AstKind, location: TokenLocation) -> Box<Self> {
        Box::new(Self::new(kind, location))
    }
}

/// Walks a statement sequence, invoking `pre` before and `post` after
/// each node's children, children in canonical order (if: test, then,
/// else; repeat: body, test; assign: variable, expression; read:
/// variable; write: expression; expression: left, right), then follows
/// the `next` chain.
///
/// The walker owns only *how* to walk; both passes of the analyzer are
/// expressed as hooks over it. Pass a no-op closure for the hook a pass
/// does not need.
pub fn traverse<F, G>(node: &mut Option<Box<Ast>>, pre: &mut F, post: &mut G)
where
    F: FnMut(&mut Ast),
    G: FnMut(&mut Ast),
{
    let mut current = node;
    while let Some(ast) = current {
        pre(&mut **ast);

        match &mut ast.kind {
            AstKind::If {
                test_part,
                then_part,
                else_part,
            } => {
                traverse(test_part, &mut *pre, &mut *post);
                traverse(then_part, &mut *pre, &mut *post);
                traverse(else_part, &mut *pre, &mut *post);
            }
            AstKind::Repeat {
                body_part,
                test_part,
            } => {
                traverse(body_part, &mut *pre, &mut *post);
                traverse(test_part, &mut *pre, &mut *post);
            }
            AstKind::Assign {
                variable,
                expression,
            } => {
                traverse(variable, &mut *pre, &mut *post);
                traverse(expression, &mut *pre, &mut *post);
            }
            AstKind::Read { variable } => traverse(variable, &mut *pre, &mut *post),
            AstKind::Write { expression } => traverse(expression, &mut *pre, &mut *post),
            AstKind::Expression {
                left_part,
                right_part,
                ..
            } => {
                traverse(left_part, &mut *pre, &mut *post);
                traverse(right_part, &mut *pre, &mut *post);
            }
            AstKind::Constant(_) | AstKind::Variable(_) => {}
        }

        post(&mut **ast);
        current = &mut ast.next;
    }
}
