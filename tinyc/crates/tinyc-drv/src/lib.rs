//! tinyc-drv - Pipeline Driver
//!
//! ============================================================================
//! PIPELINE
//! ============================================================================
//!
//! The driver wires the phase crates into the complete toolchain:
//!
//! ```text
//! Source file (.tiny)
//!        │
//!        ▼
//!   [Lexer] ──▶ Token Stream          tinyc-lex
//!        │
//!        ▼
//!   [Parser] ──▶ AST                  tinyc-par
//!        │
//!        ▼
//!   [Analyzer] ──▶ Typed AST          tinyc-sem
//!        │          + Symbol Table
//!        ▼
//!   [CodeGen] ──▶ TM Assembly Text    tinyc-gen
//!        │
//!        ▼
//!   [Assemble] ──▶ Instruction Map    tinyc-vm
//!        │
//!        ▼
//!   [Run] ──▶ stdin / stdout          tinyc-vm
//! ```
//!
//! All stages report into one shared `Handler`; within a stage,
//! reporting never aborts (so one run surfaces every problem the stage
//! can find), and the driver gates at stage boundaries:
//!
//! - lexical, syntax, or semantic errors stop before code generation;
//! - codegen errors stop before assembly;
//! - assembly errors stop before execution.
//!
//! Diagnostics are printed to stderr, one per line, after the pipeline
//! finishes. Exit codes: 0 on success, 1 when any diagnostic was
//! produced, 2 for internal errors (unreadable source file, I/O).
//!
//! The emitted TM program only ever lives in memory; `--emit-asm`
//! optionally persists a copy, and nothing else touches disk.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use tinyc_gen::CodeGenerator;
use tinyc_lex::Lexer;
use tinyc_par::Parser;
use tinyc_sem::Analyzer;
use tinyc_util::{Handler, Phase, SourceError};
use tinyc_vm::VirtualMachine;

/// One toolchain invocation, as configured from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    /// The TINY source file.
    pub file: PathBuf,

    /// Emit trace comments into the generated assembly (on by
    /// default).
    pub trace_code: bool,

    /// Also write the generated assembly to this path.
    pub emit_asm: Option<PathBuf>,

    /// Print the symbol table after analysis.
    pub dump_symbols: bool,
}

/// What the compile half of the pipeline produced.
pub struct CompileOutput {
    /// The TM program text; `None` when an error gate stopped
    /// generation.
    pub tm_code: Option<String>,

    /// Rendered symbol table, for `--dump-symbols`.
    pub symbol_dump: String,
}

/// Runs lexing, parsing, analysis, and code generation over `source`.
///
/// Lexical, syntax, and semantic errors gate code generation; the
/// analysis itself always runs so its diagnostics accompany the
/// parser's in one pass.
pub fn compile(
    file_name: &str,
    source: &str,
    trace_code: bool,
    handler: &Handler,
) -> CompileOutput {
    tracing::debug!(file = file_name, "parsing");
    let mut root = {
        let lexer = Lexer::new(file_name, source, handler);
        let mut parser = Parser::new(lexer, handler);
        parser.parse()
    };

    tracing::debug!("running semantic analysis");
    let mut analyzer = Analyzer::new(handler);
    analyzer.build_symbol_table(&mut root);
    analyzer.type_check(&mut root);
    let symbol_dump = analyzer.symbol_table().to_string();

    let front_end_failed = handler.has_errors_in(Phase::Token)
        || handler.has_errors_in(Phase::Syntax)
        || handler.has_errors_in(Phase::Semantic);
    let tm_code = if front_end_failed {
        None
    } else {
        tracing::debug!("generating TM code");
        let mut generator = CodeGenerator::new(&analyzer, file_name, trace_code, handler);
        let code = generator.generate(&root);
        if handler.has_errors_in(Phase::Codegen) {
            None
        } else {
            Some(code)
        }
    };

    CompileOutput {
        tm_code,
        symbol_dump,
    }
}

/// Assembles and runs a TM program against the given streams. Assembly
/// errors gate execution.
pub fn execute<R: BufRead, W: Write>(
    tm_code: &str,
    handler: &Handler,
    input: &mut R,
    output: &mut W,
) {
    tracing::debug!("assembling TM program");
    let mut vm = VirtualMachine::new(tm_code, handler);
    vm.build_instructions();
    if handler.has_errors_in(Phase::VmToken) || handler.has_errors_in(Phase::VmSyntax) {
        return;
    }

    tracing::debug!(instructions = vm.instruction_count(), "executing");
    if tracing::enabled!(tracing::Level::TRACE) {
        tracing::trace!("instruction table:\n{}", vm.dump_instructions());
    }
    vm.run(input, output);
}

/// The complete run for one configured invocation: read the file, run
/// the pipeline, execute over the process streams, print diagnostics.
/// Returns the process exit code.
pub fn run_file(config: &Config) -> anyhow::Result<i32> {
    let file_name = config.file.display().to_string();
    let source = std::fs::read_to_string(&config.file).map_err(|source| SourceError::Open {
        path: config.file.clone(),
        source,
    })?;

    let handler = Handler::new();
    let compiled = compile(&file_name, &source, config.trace_code, &handler);

    if config.dump_symbols {
        eprint!("{}", compiled.symbol_dump);
    }
    if let (Some(tm_code), Some(path)) = (&compiled.tm_code, &config.emit_asm) {
        std::fs::write(path, tm_code)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if let Some(tm_code) = &compiled.tm_code {
        if !handler.has_errors() {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            execute(tm_code, &handler, &mut stdin.lock(), &mut stdout.lock());
        }
    }

    for diagnostic in handler.diagnostics() {
        eprintln!("{diagnostic}");
    }
    Ok(if handler.has_errors() { 1 } else { 0 })
}
