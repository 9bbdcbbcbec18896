use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use nuru_cli::{read_source, run_source, CliError, ReplConfig, ReplSession};
use nuru_eval::{run_tests, EvalConfig, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_ITERATIONS};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "nuru", author, version, about = "Lugha ya programu ya Kiswahili")]
#[command(
    args_conflicts_with_subcommands = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Nuru file to run (.nr or .sw). Starts the REPL when omitted
    file: Option<PathBuf>,

    /// Condition checks allowed per `wakati` loop
    #[arg(
        long,
        env = "NURU_MAX_ITERATIONS",
        default_value_t = DEFAULT_MAX_ITERATIONS,
        global = true
    )]
    max_iterations: u64,

    /// Function calls that may be active at once
    #[arg(
        long,
        env = "NURU_MAX_CALL_DEPTH",
        default_value_t = DEFAULT_MAX_CALL_DEPTH,
        global = true
    )]
    max_call_depth: usize,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print help
    #[arg(short = 'h', long, visible_alias = "msaada", action = ArgAction::Help, global = true)]
    help: Option<bool>,

    /// Print version
    #[arg(short = 'V', long, visible_alias = "toleo", action = ArgAction::Version)]
    version: Option<bool>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pima_ test functions of a file
    Pima {
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print help
    Msaada,

    /// Print version
    #[command(visible_alias = "version")]
    Toleo,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("NURU_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_file(path: &Path, config: EvalConfig) -> Result<ExitCode, CliError> {
    let source = read_source(path)?;
    let report = run_source(&source, &path.display().to_string(), config)?;
    for line in &report.output {
        println!("{line}");
    }
    match &report.error {
        Some(err) => {
            eprintln!("{err}");
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

fn test_file(path: &Path, json: bool, config: EvalConfig) -> Result<ExitCode, CliError> {
    let source = read_source(path)?;
    let summary = run_tests(&source, &path.display().to_string(), config);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }
    Ok(if summary.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = EvalConfig {
        max_iterations: cli.max_iterations,
        max_call_depth: cli.max_call_depth,
    };
    debug!(
        max_iterations = config.max_iterations,
        max_call_depth = config.max_call_depth,
        "starting"
    );

    match (cli.command, cli.file) {
        (Some(Commands::Pima { file, json }), _) => test_file(&file, json, config),
        (Some(Commands::Msaada), _) => {
            println!("{}", Cli::command().render_help());
            Ok(ExitCode::SUCCESS)
        }
        (Some(Commands::Toleo), _) => {
            println!("{}", Cli::command().render_version());
            Ok(ExitCode::SUCCESS)
        }
        (None, Some(file)) => run_file(&file, config),
        (None, None) => {
            ReplSession::new(ReplConfig::default(), config)?.run()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
