//! tinyc-gen - TM Code Generation
//!
//! ============================================================================
//! TARGET MODEL
//! ============================================================================
//!
//! The generator lowers the typed AST to textual TM assembly. TM is a
//! register machine with 8 integer registers and two instruction
//! encodings:
//!
//! ```text
//! RO:  N:   OP r,s,t       register-only (HALT IN OUT ADD SUB MUL DIV)
//! RM:  N:   OP r,d(s)      register-memory (LD LDA LDC ST and jumps)
//! ```
//!
//! Five registers are used by convention: `ac`/`ac1` (accumulators),
//! `gp` (base of the global region, variables live at their symbol
//! index), `mp` (base of the scratch region used as an expression
//! stack), and `pc`.
//!
//! EXPRESSION DISCIPLINE:
//! ----------------------
//! Expressions evaluate into `ac`, postorder. A binary operation
//! computes its left operand, parks it in the scratch region at
//! `tmp_offset`, computes the right operand, reloads the left value
//! into `ac1`, and combines. Relational operators materialise 0/1 in
//! `ac` with a SUB / conditional-jump / LDC / LDA / LDC sequence.
//!
//! BACKPATCHING:
//! -------------
//! `if` needs branches to lines that are not known yet. The emitter
//! keeps a dense `current_line` counter; reserving a slot is just
//! bumping the counter and remembering its value, and the reserved line
//! is emitted later, physically out of order, once the branch distance
//! is known. Line numbers stay dense 1..k, and the VM keys instructions
//! by line number, so the physical order of the text does not matter.
//!
//! The jump arithmetic accounts for the machine bumping `pc` after
//! every instruction: a conditional jump at line L with displacement d
//! lands on line L + d + 1.

use std::fmt;

use tinyc_lex::TokenValue;
use tinyc_par::{Ast, AstKind};
use tinyc_sem::Analyzer;
use tinyc_util::{Handler, Phase, TokenLocation};

/// The TM registers the generator uses, by convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg {
    /// Accumulator.
    Ac,
    /// Secondary accumulator.
    Ac1,
    /// Global pointer: base of the variable region.
    Gp,
    /// Memory pointer: base of the scratch region.
    Mp,
    /// Program counter.
    Pc,
}

impl Reg {
    /// The register's machine index.
    pub fn index(self) -> i64 {
        match self {
            Reg::Ac => 0,
            Reg::Ac1 => 1,
            Reg::Gp => 5,
            Reg::Mp => 6,
            Reg::Pc => 7,
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Emits a TM program for one analyzed AST.
///
/// Holds the analyzer for symbol offsets, the output buffer, the dense
/// line counter, and the scratch-region high-water offset.
pub struct CodeGenerator<'a> {
    analyzer: &'a Analyzer<'a>,
    file_name: String,
    buffer: String,
    current_line: i64,
    tmp_offset: i64,
    trace_code: bool,
    handler: &'a Handler,
}

impl<'a> CodeGenerator<'a> {
    /// Creates a generator. With `trace_code` set, the output carries
    /// `*` comment lines and per-instruction trailing comments; they
    /// are not counted as instruction lines.
    pub fn new(
        analyzer: &'a Analyzer<'a>,
        file_name: impl Into<String>,
        trace_code: bool,
        handler: &'a Handler,
    ) -> Self {
        Self {
            analyzer,
            file_name: file_name.into(),
            buffer: String::new(),
            current_line: 0,
            tmp_offset: 0,
            trace_code,
            handler,
        }
    }

    /// Generates the complete program: prelude, body, HALT epilogue.
    pub fn generate(&mut self, root: &Option<Box<Ast>>) -> String {
        self.generate_prelude();
        self.generate_statement_sequence(root);
        self.emit_comment_line("* End of execution");
        self.emit_ro("HALT", Reg::Ac, Reg::Ac, Reg::Ac, "");
        std::mem::take(&mut self.buffer)
    }

    // ------------------------------------------------------------------
    // Emission primitives
    // ------------------------------------------------------------------

    /// A `*` comment line; only emitted in trace mode.
    fn emit_comment_line(&mut self, comment: &str) {
        if self.trace_code {
            self.buffer.push_str(comment);
            self.buffer.push('\n');
        }
    }

    fn push_trailing_comment(&mut self, comment: &str) {
        if self.trace_code {
            self.buffer.push_str("\t\t* ");
            self.buffer.push_str(comment);
        }
        self.buffer.push('\n');
    }

    /// `N:   OP r,s,t` on the next line.
    fn emit_ro(&mut self, op: &str, r: Reg, s: Reg, t: Reg, comment: &str) {
        self.current_line += 1;
        let text = format!("{}:   {} {},{},{}", self.current_line, op, r, s, t);
        self.buffer.push_str(&text);
        self.push_trailing_comment(comment);
    }

    /// `N:   OP r,d(s)` on the next line.
    fn emit_rm(&mut self, op: &str, r: Reg, d: i64, s: Reg, comment: &str) {
        self.current_line += 1;
        self.emit_rm_at(self.current_line, op, r, d, s, comment);
    }

    /// `N:   OP r,d(s)` for an explicitly numbered line; used to fill a
    /// previously reserved slot.
    fn emit_rm_at(&mut self, line: i64, op: &str, r: Reg, d: i64, s: Reg, comment: &str) {
        let text = format!("{}:   {} {},{}({})", line, op, r, d, s);
        self.buffer.push_str(&text);
        self.push_trailing_comment(comment);
    }

    fn error_report(&self, location: &TokenLocation, message: &str) {
        self.handler
            .report(Phase::Codegen, location.clone(), message);
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn generate_prelude(&mut self) {
        self.emit_comment_line("* TINY Compilation to TM Code");
        let file_comment = format!("* File: {}", self.file_name);
        self.emit_comment_line(&file_comment);
        self.emit_comment_line("* Standard prelude:");
        self.emit_rm("LD", Reg::Mp, 0, Reg::Ac, "load maxaddress from location 0");
        self.emit_rm("ST", Reg::Ac, 0, Reg::Ac, "clear location 0");
        self.emit_comment_line("* End of standard prelude.");
    }

    fn generate_statement_sequence(&mut self, node: &Option<Box<Ast>>) {
        let mut current = node;
        while let Some(ast) = current {
            match &ast.kind {
                AstKind::If { .. } => self.generate_if_statement(ast),
                AstKind::Repeat { .. } => self.generate_repeat_statement(ast),
                AstKind::Assign { .. } => self.generate_assign_statement(ast),
                AstKind::Read { .. } => self.generate_read_statement(ast),
                AstKind::Write { .. } => self.generate_write_statement(ast),
                AstKind::Expression { .. } => self.generate_expression(ast),
                AstKind::Constant(_) | AstKind::Variable(_) => {
                    self.error_report(&ast.location, "Invalid ast type");
                }
            }
            current = &ast.next;
        }
    }

    fn generate_if_statement(&mut self, ast: &Ast) {
        let AstKind::If {
            test_part,
            then_part,
            else_part,
        } = &ast.kind
        else {
            return;
        };

        self.emit_comment_line("* -> if");
        if let Some(test) = test_part {
            self.generate_expression(test);
        }

        self.emit_comment_line("* if: jump to else belongs here");
        self.current_line += 1;
        let saved_loc = self.current_line;

        self.generate_statement_sequence(then_part);

        self.emit_comment_line("* if: jump to end belongs here");
        self.current_line += 1;
        let saved_loc2 = self.current_line;

        let to_false = self.current_line - saved_loc;
        self.emit_rm_at(saved_loc, "JEQ", Reg::Ac, to_false, Reg::Pc, "if: jmp to false");

        if else_part.is_some() {
            self.generate_statement_sequence(else_part);
        }

        let to_end = self.current_line - saved_loc2;
        self.emit_rm_at(saved_loc2, "LDA", Reg::Pc, to_end, Reg::Pc, "jmp to end");
        self.emit_comment_line("* <- if");
    }

    fn generate_repeat_statement(&mut self, ast: &Ast) {
        let AstKind::Repeat {
            body_part,
            test_part,
        } = &ast.kind
        else {
            return;
        };

        self.emit_comment_line("* -> repeat");
        self.emit_comment_line("* repeat: jump after body comes back here");
        let saved_loc = self.current_line + 1;

        self.generate_statement_sequence(body_part);
        if let Some(test) = test_part {
            self.generate_expression(test);
        }

        let back = saved_loc - self.current_line - 2;
        self.emit_rm("JEQ", Reg::Ac, back, Reg::Pc, "repeat: jmp back to body");
        self.emit_comment_line("* <- repeat");
    }

    fn generate_assign_statement(&mut self, ast: &Ast) {
        let AstKind::Assign {
            variable,
            expression,
        } = &ast.kind
        else {
            return;
        };

        self.emit_comment_line("* -> assign");
        if let Some(expression) = expression {
            self.generate_expression(expression);
        }
        if let Some(offset) = self.variable_offset(variable) {
            self.emit_rm("ST", Reg::Ac, offset, Reg::Gp, "assign: store value");
        } else {
            self.error_report(&ast.location, "Invalid ast type");
        }
        self.emit_comment_line("* <- assign");
    }

    fn generate_read_statement(&mut self, ast: &Ast) {
        let AstKind::Read { variable } = &ast.kind else {
            return;
        };

        self.emit_ro("IN", Reg::Ac, Reg::Ac, Reg::Ac, "read integer value");
        if let Some(offset) = self.variable_offset(variable) {
            self.emit_rm("ST", Reg::Ac, offset, Reg::Gp, "read: store value");
        } else {
            self.error_report(&ast.location, "Invalid ast type");
        }
    }

    fn generate_write_statement(&mut self, ast: &Ast) {
        let AstKind::Write { expression } = &ast.kind else {
            return;
        };

        if let Some(expression) = expression {
            self.generate_expression(expression);
        }
        self.emit_ro("OUT", Reg::Ac, Reg::Ac, Reg::Ac, "write ac");
    }

    /// The gp offset of an assign/read target.
    fn variable_offset(&self, variable: &Option<Box<Ast>>) -> Option<i64> {
        match variable.as_deref() {
            Some(Ast {
                kind: AstKind::Variable(name),
                ..
            }) => Some(i64::from(self.analyzer.lookup_symbol_table(name))),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn generate_expression(&mut self, ast: &Ast) {
        match &ast.kind {
            AstKind::Variable(name) => {
                self.emit_comment_line("* -> Id");
                let offset = i64::from(self.analyzer.lookup_symbol_table(name));
                self.emit_rm("LD", Reg::Ac, offset, Reg::Gp, "load id value");
                self.emit_comment_line("* <- Id");
            }

            AstKind::Constant(value) => {
                self.emit_comment_line("* -> Const");
                self.emit_rm("LDC", Reg::Ac, *value, Reg::Ac, "load const");
                self.emit_comment_line("* <- Const");
            }

            AstKind::Expression {
                operator_value,
                left_part,
                right_part,
                ..
            } => {
                self.emit_comment_line("* -> op");
                if let Some(left) = left_part {
                    self.generate_expression(left);
                }
                self.emit_rm("ST", Reg::Ac, self.tmp_offset, Reg::Mp, "op: push left");
                self.tmp_offset += 1;
                if let Some(right) = right_part {
                    self.generate_expression(right);
                }
                self.tmp_offset -= 1;
                self.emit_rm("LD", Reg::Ac1, self.tmp_offset, Reg::Mp, "op: load left");

                match operator_value {
                    TokenValue::Plus => {
                        self.emit_ro("ADD", Reg::Ac, Reg::Ac1, Reg::Ac, "op +");
                    }
                    TokenValue::Minus => {
                        self.emit_ro("SUB", Reg::Ac, Reg::Ac1, Reg::Ac, "op -");
                    }
                    TokenValue::Multiply => {
                        self.emit_ro("MUL", Reg::Ac, Reg::Ac1, Reg::Ac, "op *");
                    }
                    TokenValue::Divide => {
                        self.emit_ro("DIV", Reg::Ac, Reg::Ac1, Reg::Ac, "op /");
                    }
                    TokenValue::Less => {
                        self.emit_ro("SUB", Reg::Ac, Reg::Ac1, Reg::Ac, "op <");
                        self.generate_boolean_result("JLT");
                    }
                    TokenValue::Equal => {
                        self.emit_ro("SUB", Reg::Ac, Reg::Ac1, Reg::Ac, "op =");
                        self.generate_boolean_result("JEQ");
                    }
                    _ => self.error_report(&ast.location, "Invalid operator"),
                }
                self.emit_comment_line("* <- op");
            }

            _ => {}
        }
    }

    /// Materialises 0/1 in ac from the comparison result of ac1 - ac.
    fn generate_boolean_result(&mut self, jump_op: &str) {
        self.emit_rm(jump_op, Reg::Ac, 2, Reg::Pc, "br if true");
        self.emit_rm("LDC", Reg::Ac, 0, Reg::Ac, "false case");
        self.emit_rm("LDA", Reg::Pc, 1, Reg::Pc, "unconditional jmp");
        self.emit_rm("LDC", Reg::Ac, 1, Reg::Ac, "true case");
    }
}
