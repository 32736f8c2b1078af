//! tinyc-sem - Semantic Analysis
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! Semantic analysis runs two passes over the AST, both phrased as hooks
//! over the parser crate's shared `traverse` walker:
//!
//! PASS 1 - SYMBOL TABLE (pre-order)
//! ---------------------------------
//! Every `Variable` node is inserted into the symbol table. The first
//! insertion of a name assigns the next dense index (the variable's
//! offset in the VM's global memory region); later insertions only
//! append the use location. TINY has no declarations, so use *is*
//! definition, and reading a variable before assigning it is not an
//! error.
//!
//! PASS 2 - TYPE CHECK (post-order)
//! --------------------------------
//! Types flow bottom-up into each node's `expr_type` slot:
//!
//! - `Variable`, `Constant` are `Integer`.
//! - `=` and `<` produce `Boolean` unconditionally; the operand types
//!   are deliberately not checked.
//! - `+ - * /` require two `Integer` operands and produce `Integer`;
//!   otherwise the node is reported and left `Void`.
//! - `if`/`repeat` tests must be `Boolean`; assigned expressions, read
//!   targets, and written expressions must be `Integer`.
//!
//! Diagnostics are `cannot convert from 'X' to 'Y'` with the node's
//! location. The analyzer never changes tree structure, only the type
//! slots.

pub mod symbol_table;

pub use symbol_table::{SymbolRecord, SymbolTable};

use tinyc_lex::TokenValue;
use tinyc_par::{traverse, Ast, AstKind, ExprType};
use tinyc_util::{Handler, Phase};

/// The semantic analyzer: owns the symbol table it builds and reports
/// through the shared handler.
pub struct Analyzer<'a> {
    symbol_table: SymbolTable,
    handler: &'a Handler,
}

impl<'a> Analyzer<'a> {
    pub fn new(handler: &'a Handler) -> Self {
        Self {
            symbol_table: SymbolTable::new(),
            handler,
        }
    }

    /// Pass 1: indexes every variable use.
    pub fn build_symbol_table(&mut self, root: &mut Option<Box<Ast>>) {
        let table = &mut self.symbol_table;
        traverse(
            root,
            &mut |node| {
                if let AstKind::Variable(name) = &node.kind {
                    table.insert(name, &node.location);
                }
            },
            &mut |_| {},
        );
    }

    /// Pass 2: assigns expression types bottom-up and reports
    /// mismatches.
    pub fn type_check(&mut self, root: &mut Option<Box<Ast>>) {
        let handler = self.handler;
        traverse(root, &mut |_| {}, &mut |node| {
            Self::check_node(handler, node);
        });
    }

    /// The code generator's window into the table: index of `name`, or
    /// -1 when undefined.
    pub fn lookup_symbol_table(&self, name: &str) -> i32 {
        self.symbol_table.lookup(name)
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }

    /// The type of a child slot; a missing child reads as `Void` so a
    /// broken parse shows up as a mismatch instead of a crash.
    fn child_type(child: &Option<Box<Ast>>) -> ExprType {
        child.as_ref().map_or(ExprType::Void, |ast| ast.expr_type)
    }

    fn check_node(handler: &Handler, node: &mut Ast) {
        let report = |message: String| {
            handler.report(Phase::Semantic, node.location.clone(), message);
        };

        let assigned = match &node.kind {
            AstKind::Variable(_) | AstKind::Constant(_) => Some(ExprType::Integer),

            AstKind::Expression {
                operator_value,
                left_part,
                right_part,
                ..
            } => {
                if *operator_value == TokenValue::Equal || *operator_value == TokenValue::Less {
                    Some(ExprType::Boolean)
                } else {
                    let left = Self::child_type(left_part);
                    let right = Self::child_type(right_part);
                    if left == ExprType::Integer && right == ExprType::Integer {
                        Some(ExprType::Integer)
                    } else {
                        report(format!(
                            "cannot convert from '{}' to '{}'",
                            right.name(),
                            left.name()
                        ));
                        None
                    }
                }
            }

            AstKind::If { test_part, .. } | AstKind::Repeat { test_part, .. } => {
                let test = Self::child_type(test_part);
                if test != ExprType::Boolean {
                    report(format!(
                        "cannot convert from '{}' to 'boolean'",
                        test.name()
                    ));
                }
                None
            }

            AstKind::Assign { expression, .. } | AstKind::Write { expression } => {
                let expression = Self::child_type(expression);
                if expression != ExprType::Integer {
                    report(format!(
                        "cannot convert from '{}' to 'integer'",
                        expression.name()
                    ));
                }
                None
            }

            AstKind::Read { variable } => {
                let variable = Self::child_type(variable);
                if variable != ExprType::Integer {
                    report(format!(
                        "cannot convert from '{}' to 'integer'",
                        variable.name()
                    ));
                }
                None
            }
        };

        if let Some(expr_type) = assigned {
            node.expr_type = expr_type;
        }
    }
}
