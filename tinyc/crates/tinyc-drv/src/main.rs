//! tinyc - compile and run TINY programs on the Tiny Machine.
//!
//! This is the command-line entry point. It parses arguments with
//! clap, initialises logging, and hands the configuration to the
//! pipeline driver in the library crate.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tinyc_drv::Config;

/// Compile a TINY source file to TM assembly and run it.
///
/// Diagnostics go to stderr; the program's `write` output goes to
/// stdout and `read` pulls decimal integers from stdin.
#[derive(Parser, Debug)]
#[command(name = "tinyc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile and run a TINY program on the Tiny Machine", long_about = None)]
struct Cli {
    /// The .tiny source file
    file: PathBuf,

    /// Do not emit trace comments into the generated assembly
    #[arg(long)]
    no_trace: bool,

    /// Also write the generated TM assembly to this path
    #[arg(long, value_name = "PATH")]
    emit_asm: Option<PathBuf>,

    /// Print the symbol table after analysis
    #[arg(long)]
    dump_symbols: bool,

    /// Enable verbose logging
    #[arg(short, long, env = "TINYC_VERBOSE")]
    verbose: bool,
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("TINYC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize logging: {error}"))
}

fn main() {
    let cli = Cli::parse();

    if let Err(error) = init_logging(cli.verbose) {
        eprintln!("error: {error}");
        process::exit(2);
    }

    let config = Config {
        file: cli.file,
        trace_code: !cli.no_trace,
        emit_asm: cli.emit_asm,
        dump_symbols: cli.dump_symbols,
    };

    match tinyc_drv::run_file(&config) {
        Ok(code) => process::exit(code),
        Err(error) => {
            eprintln!("error: {error:#}");
            process::exit(2);
        }
    }
}
