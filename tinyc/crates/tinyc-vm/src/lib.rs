//! tinyc-vm - The Tiny Machine
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! The virtual machine consumes the textual TM program the code
//! generator emits, in two sub-phases:
//!
//! 1. ASSEMBLE
//!    A dedicated lexer tokenizes the text (mnemonics, numbers, the
//!    six single-character operators, `*` comments running to end of
//!    line), and the assembler parses one instruction per line:
//!
//!    ```text
//!    N : OP p1 , [+|-] p2 ( p3 )      the RM form
//!    N : OP p1 , [+|-] p2 , p3        the RO form
//!    ```
//!
//!    Both third-operand spellings are accepted for either instruction
//!    class. Decoded instructions land in a map keyed by the source
//!    line number N, so the physical order of lines is irrelevant and
//!    backpatched programs execute correctly.
//!
//! 2. RUN
//!    Registers are zeroed, `pc` starts at 1, and the fetch loop
//!    executes the instruction at line `pc` until a HALT, a missing
//!    line, or a runtime error. Every instruction ends with `pc += 1`;
//!    taken jumps set `pc` to `p2 + reg[p3]` first, so they land one
//!    line past that sum.
//!
//! MEMORY MODEL:
//! -------------
//! Two integer regions grow on demand: the global region (variables,
//! addressed off `gp`) and the scratch region (expression spills,
//! addressed off `mp`). LD and ST pick the region by base register:
//! `p3 == mp` selects scratch, anything else the global region. Reads
//! beyond the high-water mark return 0; writes resize to at least twice
//! the index. A negative address, an out-of-range register number, and
//! division by zero are runtime errors that stop execution.

pub mod machine;
pub mod scanner;

pub use machine::{Instruction, VirtualMachine};
pub use scanner::{Scanner, Token, TokenKind, TokenValue};
