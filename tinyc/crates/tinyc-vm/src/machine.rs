//! TM assembler and interpreter.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use tinyc_util::{Handler, Phase};

use crate::scanner::{Scanner, TokenKind, TokenValue};

/// Number of machine registers.
pub const REGISTER_COUNT: usize = 8;

/// Program counter register index.
const PC: usize = 7;
/// Memory pointer register index; selects the scratch region.
const MP: usize = 6;

/// One decoded TM instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub line: i64,
    pub value: TokenValue,
    pub param1: i64,
    pub param2: i64,
    pub param3: i64,
    pub name: String,
}

/// The Tiny Machine: assembles a textual program into a line-keyed
/// instruction map, then interprets it.
///
/// I/O is injected: `run` takes the reader serving `IN` and the writer
/// receiving `OUT`, so the driver passes the process streams and tests
/// pass byte buffers.
pub struct VirtualMachine<'a> {
    scanner: Scanner<'a>,
    instructions: BTreeMap<i64, Instruction>,
    registers: [i64; REGISTER_COUNT],
    global_mem: Vec<i64>,
    tmp_mem: Vec<i64>,
    handler: &'a Handler,
}

impl<'a> VirtualMachine<'a> {
    /// Creates a machine over the program text and primes the first
    /// token.
    pub fn new(code: &'a str, handler: &'a Handler) -> Self {
        let mut scanner = Scanner::new(code, handler);
        scanner.next_token();
        Self {
            scanner,
            instructions: BTreeMap::new(),
            registers: [0; REGISTER_COUNT],
            global_mem: Vec::new(),
            tmp_mem: Vec::new(),
            handler,
        }
    }

    // ------------------------------------------------------------------
    // Assembly
    // ------------------------------------------------------------------

    /// Parses every instruction line into the line-keyed map. Stops at
    /// end of input or on the first malformed line.
    pub fn build_instructions(&mut self) {
        while !self.is_end_of_file()
            && !self.handler.has_errors_in(Phase::VmSyntax)
            && !self.handler.has_errors_in(Phase::VmToken)
        {
            if let Some(instruction) = self.parse_code_line() {
                self.instructions.insert(instruction.line, instruction);
            }
        }
    }

    /// Number of assembled instructions.
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// The assembled instruction stored for `line`, if any.
    pub fn instruction_at(&self, line: i64) -> Option<&Instruction> {
        self.instructions.get(&line)
    }

    /// Renders the instruction table, one `line name p1 p2 p3` row per
    /// instruction, for debugging.
    pub fn dump_instructions(&self) -> String {
        let mut out = String::new();
        for instruction in self.instructions.values() {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\n",
                instruction.line,
                instruction.name,
                instruction.param1,
                instruction.param2,
                instruction.param3
            ));
        }
        out
    }

    fn is_end_of_file(&self) -> bool {
        self.scanner.token().value == TokenValue::EndOfFile
    }

    /// One line: `N : OP p1 , [+|-] p2 ( p3 )` or `... , p3`.
    fn parse_code_line(&mut self) -> Option<Instruction> {
        let line = self.parse_number()?;

        if !self.expect_value(TokenValue::Colon, ":", true) {
            return None;
        }

        if !self.expect_kind(TokenKind::Instruction, "instruction", false) {
            return None;
        }
        let value = self.scanner.token().value;
        let name = self.scanner.token().name.clone();
        self.scanner.next_token();

        let param1 = self.parse_number()?;

        if !self.expect_value(TokenValue::Comma, ",", true) {
            return None;
        }

        let mut positive = true;
        if matches!(
            self.scanner.token().value,
            TokenValue::Positive | TokenValue::Negative
        ) {
            positive = self.scanner.token().value == TokenValue::Positive;
            self.scanner.next_token();
        }
        let mut param2 = self.parse_number()?;
        if !positive {
            param2 = -param2;
        }

        let param3 = if self.validate_value(TokenValue::LeftParenthesis, true) {
            let param3 = self.parse_number()?;
            if !self.expect_value(TokenValue::RightParenthesis, ")", true) {
                return None;
            }
            param3
        } else if self.validate_value(TokenValue::Comma, true) {
            self.parse_number()?
        } else {
            self.error_report(&format!(
                "expected ',' or '(', but find {}",
                self.scanner.token().name
            ));
            return None;
        };

        Some(Instruction {
            line,
            value,
            param1,
            param2,
            param3,
            name,
        })
    }

    /// Expects a number token, consumes it, and returns its value.
    fn parse_number(&mut self) -> Option<i64> {
        if !self.expect_value(TokenValue::Number, "number", false) {
            return None;
        }
        let parsed = match self.scanner.token().name.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.error_report(&format!(
                    "number '{}' is out of range",
                    self.scanner.token().name
                ));
                None
            }
        };
        self.scanner.next_token();
        parsed
    }

    fn validate_value(&mut self, value: TokenValue, advance: bool) -> bool {
        if self.scanner.token().value != value {
            return false;
        }
        if advance {
            self.scanner.next_token();
        }
        true
    }

    fn expect_value(&mut self, value: TokenValue, name: &str, advance: bool) -> bool {
        if self.scanner.token().value != value {
            self.error_report(&format!(
                "Expected '{}', but find {}",
                name,
                self.scanner.token().name
            ));
            return false;
        }
        if advance {
            self.scanner.next_token();
        }
        true
    }

    fn expect_kind(&mut self, kind: TokenKind, name: &str, advance: bool) -> bool {
        if self.scanner.token().kind != kind {
            self.error_report(&format!(
                "Expected '{}', but find {}",
                name,
                self.scanner.token().name
            ));
            return false;
        }
        if advance {
            self.scanner.next_token();
        }
        true
    }

    fn error_report(&self, message: &str) {
        self.handler.report_bare(Phase::VmSyntax, message);
    }

    fn runtime_error(&self, message: &str) {
        self.handler.report_bare(Phase::VmRuntime, message);
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Interprets the assembled program. Execution stops at HALT, when
    /// `pc` leaves the instruction map, or on a runtime error.
    pub fn run<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) {
        self.registers = [0; REGISTER_COUNT];
        self.registers[PC] = 1;
        let mut running = true;

        while running {
            let pc = self.registers[PC];
            let Some(instruction) = self.instructions.get(&pc) else {
                break;
            };
            let value = instruction.value;
            let p1 = instruction.param1;
            let p2 = instruction.param2;
            let p3 = instruction.param3;

            let registers_valid = match value {
                TokenValue::Add | TokenValue::Sub | TokenValue::Mul | TokenValue::Div => {
                    self.check_register_number(p1)
                        && self.check_register_number(p2)
                        && self.check_register_number(p3)
                }
                _ => self.check_register_number(p1) && self.check_register_number(p3),
            };
            if !registers_valid {
                self.runtime_error(&format!("invalid register number at line {pc}"));
                break;
            }
            let r1 = p1 as usize;
            let r3 = p3 as usize;

            match value {
                TokenValue::Halt => {
                    running = false;
                }

                TokenValue::In => match read_integer(input) {
                    Some(read) => self.registers[r1] = read,
                    None => {
                        self.runtime_error("failed to read integer from input");
                        running = false;
                    }
                },

                TokenValue::Out => {
                    if writeln!(output, "{}", self.registers[r1]).is_err() {
                        self.runtime_error("failed to write to output");
                        running = false;
                    }
                }

                TokenValue::Add => {
                    self.registers[r1] =
                        self.registers[p2 as usize].wrapping_add(self.registers[r3]);
                }
                TokenValue::Sub => {
                    self.registers[r1] =
                        self.registers[p2 as usize].wrapping_sub(self.registers[r3]);
                }
                TokenValue::Mul => {
                    self.registers[r1] =
                        self.registers[p2 as usize].wrapping_mul(self.registers[r3]);
                }
                TokenValue::Div => {
                    if self.registers[r3] == 0 {
                        self.runtime_error(&format!("division by zero at line {pc}"));
                        running = false;
                    } else {
                        self.registers[r1] = self.registers[p2 as usize] / self.registers[r3];
                    }
                }

                TokenValue::Ld => {
                    let address = p2 + self.registers[r3];
                    match self.load_memory(address, p3 == MP as i64) {
                        Some(loaded) => self.registers[r1] = loaded,
                        None => running = false,
                    }
                }
                TokenValue::Lda => {
                    self.registers[r1] = p2 + self.registers[r3];
                }
                TokenValue::Ldc => {
                    self.registers[r1] = p2;
                }
                TokenValue::St => {
                    let address = p2 + self.registers[r3];
                    if !self.store_memory(address, self.registers[r1], p3 == MP as i64) {
                        running = false;
                    }
                }

                TokenValue::Jlt
                | TokenValue::Jle
                | TokenValue::Jge
                | TokenValue::Jgt
                | TokenValue::Jeq
                | TokenValue::Jne => {
                    let tested = self.registers[r1];
                    let taken = match value {
                        TokenValue::Jlt => tested < 0,
                        TokenValue::Jle => tested <= 0,
                        TokenValue::Jge => tested >= 0,
                        TokenValue::Jgt => tested > 0,
                        TokenValue::Jeq => tested == 0,
                        _ => tested != 0,
                    };
                    if taken {
                        self.registers[PC] = p2 + self.registers[r3];
                    }
                }

                _ => {
                    self.runtime_error(&format!("invalid instruction at line {pc}"));
                    running = false;
                }
            }

            if running {
                self.registers[PC] += 1;
            }
        }

        let _ = output.flush();
    }

    fn check_register_number(&self, number: i64) -> bool {
        (0..REGISTER_COUNT as i64).contains(&number)
    }

    /// Reads a cell; unwritten cells read as zero.
    fn load_memory(&self, address: i64, tmp_region: bool) -> Option<i64> {
        if address < 0 {
            self.runtime_error(&format!("memory address {address} out of range"));
            return None;
        }
        let region = if tmp_region {
            &self.tmp_mem
        } else {
            &self.global_mem
        };
        Some(region.get(address as usize).copied().unwrap_or(0))
    }

    /// Writes a cell, growing the region to at least twice the index.
    fn store_memory(&mut self, address: i64, value: i64, tmp_region: bool) -> bool {
        if address < 0 {
            self.runtime_error(&format!("memory address {address} out of range"));
            return false;
        }
        let index = address as usize;
        let region = if tmp_region {
            &mut self.tmp_mem
        } else {
            &mut self.global_mem
        };
        if index >= region.len() {
            region.resize((index * 2).max(index + 1), 0);
        }
        region[index] = value;
        true
    }
}

/// Reads one whitespace-delimited decimal integer, with an optional
/// leading sign. Returns `None` at end of input or on a malformed
/// number.
fn read_integer<R: BufRead>(input: &mut R) -> Option<i64> {
    // Skip leading whitespace.
    loop {
        let buf = input.fill_buf().ok()?;
        if buf.is_empty() {
            return None;
        }
        let skip = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
        let exhausted = skip == buf.len();
        input.consume(skip);
        if !exhausted {
            break;
        }
    }

    let mut text = String::new();
    {
        let buf = input.fill_buf().ok()?;
        if !buf.is_empty() && (buf[0] == b'-' || buf[0] == b'+') {
            text.push(buf[0] as char);
            input.consume(1);
        }
    }
    loop {
        let buf = input.fill_buf().ok()?;
        if buf.is_empty() {
            break;
        }
        let digits = buf.iter().take_while(|b| b.is_ascii_digit()).count();
        text.extend(buf[..digits].iter().map(|&b| b as char));
        let more = digits == buf.len();
        input.consume(digits);
        if !more {
            break;
        }
    }

    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinyc_util::Diagnostic;

    fn run_program(code: &str, stdin: &str) -> (String, Vec<Diagnostic>) {
        let handler = Handler::new();
        let output = {
            let mut vm = VirtualMachine::new(code, &handler);
            vm.build_instructions();
            let mut input = stdin.as_bytes();
            let mut output = Vec::new();
            vm.run(&mut input, &mut output);
            output
        };
        (String::from_utf8(output).unwrap(), handler.diagnostics())
    }

    fn no_errors(diagnostics: &[Diagnostic]) -> bool {
        diagnostics.is_empty()
    }

    fn has_phase(diagnostics: &[Diagnostic], phase: Phase) -> bool {
        diagnostics.iter().any(|d| d.phase == phase)
    }

    #[test]
    fn test_assemble_rm_form() {
        let handler = Handler::new();
        let mut vm = VirtualMachine::new("1:   LD 6,0(0)\n", &handler);
        vm.build_instructions();
        assert!(!handler.has_errors());
        let instruction = vm.instruction_at(1).unwrap();
        assert_eq!(instruction.value, TokenValue::Ld);
        assert_eq!(
            (instruction.param1, instruction.param2, instruction.param3),
            (6, 0, 0)
        );
        assert_eq!(instruction.name, "LD");
    }

    #[test]
    fn test_assemble_ro_comma_form() {
        let handler = Handler::new();
        let mut vm = VirtualMachine::new("1:   ADD 0,1,0\n", &handler);
        vm.build_instructions();
        assert!(!handler.has_errors());
        let instruction = vm.instruction_at(1).unwrap();
        assert_eq!(instruction.value, TokenValue::Add);
        assert_eq!(
            (instruction.param1, instruction.param2, instruction.param3),
            (0, 1, 0)
        );
    }

    #[test]
    fn test_both_third_operand_forms_decode_identically() {
        let handler = Handler::new();
        let mut paren = VirtualMachine::new("1:   LDC 0,5(0)\n", &handler);
        paren.build_instructions();
        let mut comma = VirtualMachine::new("1:   LDC 0,5,0\n", &handler);
        comma.build_instructions();
        assert!(!handler.has_errors());
        assert_eq!(paren.instruction_at(1), comma.instruction_at(1));
    }

    #[test]
    fn test_signed_second_operand() {
        let handler = Handler::new();
        let mut vm = VirtualMachine::new("1:   JEQ 0,-16(7)\n2:   LDA 7,+3(7)\n", &handler);
        vm.build_instructions();
        assert!(!handler.has_errors());
        assert_eq!(vm.instruction_at(1).unwrap().param2, -16);
        assert_eq!(vm.instruction_at(2).unwrap().param2, 3);
    }

    #[test]
    fn test_comment_lines_are_skipped() {
        let handler = Handler::new();
        let mut vm = VirtualMachine::new("* prelude\n1:   HALT 0,0,0\t\t* stop\n", &handler);
        vm.build_instructions();
        assert!(!handler.has_errors());
        assert_eq!(vm.instruction_count(), 1);
    }

    #[test]
    fn test_out_of_order_lines_are_keyed_by_number() {
        // Backpatched programs emit reserved lines late.
        let handler = Handler::new();
        let mut vm =
            VirtualMachine::new("2:   OUT 0,0,0\n1:   LDC 0,9(0)\n3:   HALT 0,0,0\n", &handler);
        vm.build_instructions();
        assert!(!handler.has_errors());
        assert_eq!(vm.instruction_at(1).unwrap().value, TokenValue::Ldc);
        assert_eq!(vm.instruction_at(2).unwrap().value, TokenValue::Out);
    }

    #[test]
    fn test_malformed_line_is_reported() {
        let handler = Handler::new();
        let mut vm = VirtualMachine::new("1:   LDC 0 5\n", &handler);
        vm.build_instructions();
        assert!(handler.has_errors_in(Phase::VmSyntax));
        assert!(handler.diagnostics()[0].message.contains("Expected ','"));
    }

    #[test]
    fn test_missing_third_operand_is_reported() {
        let handler = Handler::new();
        let mut vm = VirtualMachine::new("1:   LDC 0,5\n", &handler);
        vm.build_instructions();
        assert!(handler.has_errors_in(Phase::VmSyntax));
        assert!(handler.diagnostics()[0]
            .message
            .contains("expected ',' or '('"));
    }

    #[test]
    fn test_dump_lists_instructions() {
        let handler = Handler::new();
        let mut vm = VirtualMachine::new("1:   LDC 0,9(0)\n2:   HALT 0,0,0\n", &handler);
        vm.build_instructions();
        let dump = vm.dump_instructions();
        assert!(dump.contains("1\tLDC\t0\t9\t0"));
        assert!(dump.contains("2\tHALT\t0\t0\t0"));
    }

    #[test]
    fn test_run_ldc_out() {
        let (output, diagnostics) =
            run_program("1:   LDC 0,9(0)\n2:   OUT 0,0,0\n3:   HALT 0,0,0\n", "");
        assert_eq!(output, "9\n");
        assert!(no_errors(&diagnostics));
    }

    #[test]
    fn test_run_in_echo() {
        let (output, diagnostics) =
            run_program("1:   IN 0,0,0\n2:   OUT 0,0,0\n3:   HALT 0,0,0\n", "42\n");
        assert_eq!(output, "42\n");
        assert!(no_errors(&diagnostics));
    }

    #[test]
    fn test_run_reads_negative_integers() {
        let (output, _) = run_program("1:   IN 0,0,0\n2:   OUT 0,0,0\n3:   HALT 0,0,0\n", "-7");
        assert_eq!(output, "-7\n");
    }

    #[test]
    fn test_run_arithmetic() {
        let code = "\
1:   LDC 1,6(0)
2:   LDC 2,3(0)
3:   ADD 0,1,2
4:   OUT 0,0,0
5:   SUB 0,1,2
6:   OUT 0,0,0
7:   MUL 0,1,2
8:   OUT 0,0,0
9:   DIV 0,1,2
10:   OUT 0,0,0
11:   HALT 0,0,0
";
        let (output, diagnostics) = run_program(code, "");
        assert_eq!(output, "9\n3\n18\n2\n");
        assert!(no_errors(&diagnostics));
    }

    #[test]
    fn test_run_integer_division_truncates() {
        let code = "\
1:   LDC 1,7(0)
2:   LDC 2,2(0)
3:   DIV 0,1,2
4:   OUT 0,0,0
5:   HALT 0,0,0
";
        let (output, _) = run_program(code, "");
        assert_eq!(output, "3\n");
    }

    #[test]
    fn test_division_by_zero_traps() {
        let code = "\
1:   LDC 1,7(0)
2:   LDC 2,0(0)
3:   DIV 0,1,2
4:   OUT 0,0,0
5:   HALT 0,0,0
";
        let (output, diagnostics) = run_program(code, "");
        assert_eq!(output, "");
        assert!(has_phase(&diagnostics, Phase::VmRuntime));
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("division by zero")));
    }

    #[test]
    fn test_memory_store_and_load_by_region() {
        // gp (register 5) stays 0; store into global cell 3, reload.
        let code = "\
1:   LDC 0,11(0)
2:   ST 0,3(5)
3:   LDC 0,0(0)
4:   LD 0,3(5)
5:   OUT 0,0,0
6:   HALT 0,0,0
";
        let (output, diagnostics) = run_program(code, "");
        assert_eq!(output, "11\n");
        assert!(no_errors(&diagnostics));
    }

    #[test]
    fn test_tmp_region_is_separate_from_global() {
        // Write different values at index 0 of each region.
        let code = "\
1:   LDC 0,5(0)
2:   ST 0,0(5)
3:   LDC 0,8(0)
4:   ST 0,0(6)
5:   LD 0,0(5)
6:   OUT 0,0,0
7:   LD 0,0(6)
8:   OUT 0,0,0
9:   HALT 0,0,0
";
        let (output, diagnostics) = run_program(code, "");
        assert_eq!(output, "5\n8\n");
        assert!(no_errors(&diagnostics));
    }

    #[test]
    fn test_memory_grows_on_demand() {
        let code = "\
1:   LDC 0,1(0)
2:   ST 0,500(5)
3:   LD 0,500(5)
4:   OUT 0,0,0
5:   HALT 0,0,0
";
        let (output, diagnostics) = run_program(code, "");
        assert_eq!(output, "1\n");
        assert!(no_errors(&diagnostics));
    }

    #[test]
    fn test_unwritten_memory_reads_zero() {
        let (output, _) = run_program("1:   LD 0,9(5)\n2:   OUT 0,0,0\n3:   HALT 0,0,0\n", "");
        assert_eq!(output, "0\n");
    }

    #[test]
    fn test_conditional_jump_taken_and_not_taken() {
        // ac = 0: JEQ at line 2 jumps to 2+2+1 = 5, skipping the first OUT.
        let code = "\
1:   LDC 0,0(0)
2:   JEQ 0,2(7)
3:   LDC 0,111(0)
4:   OUT 0,0,0
5:   LDC 0,222(0)
6:   OUT 0,0,0
7:   HALT 0,0,0
";
        let (output, diagnostics) = run_program(code, "");
        assert_eq!(output, "222\n");
        assert!(no_errors(&diagnostics));

        // ac = 1: JEQ falls through and both OUTs execute.
        let code = code.replace("LDC 0,0(0)", "LDC 0,1(0)");
        let (output, _) = run_program(&code, "");
        assert_eq!(output, "111\n222\n");
    }

    #[test]
    fn test_lda_pc_is_unconditional_jump() {
        let code = "\
1:   LDA 7,1(7)
2:   OUT 0,0,0
3:   HALT 0,0,0
";
        // pc := 1+1 = 2, then +1 lands on 3: the OUT is skipped.
        let (output, diagnostics) = run_program(code, "");
        assert_eq!(output, "");
        assert!(no_errors(&diagnostics));
    }

    #[test]
    fn test_invalid_register_aborts() {
        let (output, diagnostics) = run_program("1:   OUT 9,0,0\n2:   HALT 0,0,0\n", "");
        assert_eq!(output, "");
        assert!(has_phase(&diagnostics, Phase::VmRuntime));
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("invalid register number")));
    }

    #[test]
    fn test_missing_input_is_a_runtime_error() {
        let (_, diagnostics) = run_program("1:   IN 0,0,0\n2:   HALT 0,0,0\n", "");
        assert!(has_phase(&diagnostics, Phase::VmRuntime));
    }

    #[test]
    fn test_pc_walking_off_the_map_stops() {
        let (output, diagnostics) = run_program("1:   LDC 0,5(0)\n2:   OUT 0,0,0\n", "");
        assert_eq!(output, "5\n");
        assert!(no_errors(&diagnostics));
    }

    #[test]
    fn test_determinism() {
        let code = "\
1:   IN 0,0,0
2:   LDC 1,3(0)
3:   MUL 0,0,1
4:   OUT 0,0,0
5:   HALT 0,0,0
";
        let (first, _) = run_program(code, "14\n");
        let (second, _) = run_program(code, "14\n");
        assert_eq!(first, second);
        assert_eq!(first, "42\n");
    }
}
