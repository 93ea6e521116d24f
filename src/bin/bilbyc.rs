//! `bilbyc`: compile a Bilby program to stack-machine assembly.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bilby::vm::{Machine, MachineConfig};
use bilby::{BilbyError, CompilationError, CompileOptions, ParseError};

#[derive(Parser)]
#[command(name = "bilbyc", about = "Compile Bilby programs to stack-machine assembly", version)]
struct Cli {
    /// Source file to compile
    input: PathBuf,

    /// Output file (defaults to the input with an `.asm` extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Execute the program in the emulator instead of writing assembly
    #[arg(long)]
    run: bool,

    /// Leave out the runtime environment
    #[arg(long)]
    no_prelude: bool,

    /// Leave out `%%` comments
    #[arg(long)]
    no_comments: bool,

    /// Prefix for generated labels
    #[arg(long, default_value = "")]
    label_prefix: String,

    /// Emulator step limit
    #[arg(long, default_value_t = MachineConfig::default().step_limit)]
    step_limit: u64,

    /// Log compiler phases (overrides BILBY_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&cli.input, &error);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("BILBY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn execute(cli: &Cli) -> Result<(), BilbyError> {
    let source = fs::read_to_string(&cli.input).map_err(|source| BilbyError::Io {
        path: cli.input.display().to_string(),
        source,
    })?;

    let options = CompileOptions {
        emit_prelude: !cli.no_prelude,
        label_prefix: cli.label_prefix.clone(),
        comments: !cli.no_comments,
    };
    let asm = bilby::compile(&source, &options)?;

    if cli.run {
        let mut machine = Machine::new(MachineConfig {
            step_limit: cli.step_limit,
            ..MachineConfig::default()
        });
        machine.run(&asm)?;
        print!("{}", machine.output());
        return Ok(());
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("asm"));
    fs::write(&output, asm.to_string()).map_err(|source| BilbyError::Io {
        path: output.display().to_string(),
        source,
    })?;
    tracing::info!(output = %output.display(), instructions = asm.len(), "wrote assembly");
    Ok(())
}

/// Print errors as `file:line:col: message`.
fn report(input: &Path, error: &BilbyError) {
    let file = input.display();
    match error {
        BilbyError::Parse(errors) => {
            for error in errors {
                eprintln!("{file}:{}", parse_message(error));
            }
        }
        BilbyError::Lex(error) => eprintln!("{file}:{}: {error}", error.span()),
        BilbyError::Compilation(errors) => {
            for error in errors {
                eprintln!("{file}:{}", compilation_message(error));
            }
            eprintln!("{file}: {error}");
        }
        BilbyError::Runtime(error) => eprintln!("{file}: runtime error: {error}"),
        BilbyError::Io { .. } => eprintln!("bilbyc: {error}"),
    }
}

fn parse_message(error: &ParseError) -> String {
    format!("{}: {}: {}", error.span, error.kind, error.message)
}

fn compilation_message(error: &CompilationError) -> String {
    let span = error.span();
    let text = error.to_string();
    let prefix = format!("at {span}: ");
    let message = text.strip_prefix(&prefix).unwrap_or(&text);
    format!("{span}: {}: {message}", error.kind())
}
