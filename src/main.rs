//! Binary entry point for the duet CLI.
//!
//! JSON goes to stdout, logs go to stderr. On failure an error response is
//! printed and the process exits with the error's code.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use duet::cli::{run_check, run_dump, run_fmt, run_outline};
use duet::config::{CliOverrides, Config};
use duet::error::{DuetError, OutputErrorCode};
use duet::lint::Rule;
use duet::output::{emit_response, ErrorResponse};
use duet::NodeKind;

// ============================================================================
// CLI Structure
// ============================================================================

/// Inspect, check and reformat duet source files.
#[derive(Parser, Debug)]
#[command(name = "duet", version, about = "Inspect, check and reformat duet source files")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Configuration file (default: duet.toml in the current directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for outline and check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    /// Full JSON response (default).
    #[default]
    Json,
    /// Human-readable text.
    Text,
}

/// Output format for fmt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum FmtFormat {
    /// The regenerated source (default).
    #[default]
    Text,
    /// JSON response with the source and a `changed` flag.
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the structural outline of a file.
    Outline {
        file: PathBuf,
        /// Render nodes of this kind without their children (repeatable).
        #[arg(long, value_parser = parse_kind)]
        collapse: Vec<NodeKind>,
        #[arg(long, value_enum, default_value_t = ReportFormat::default())]
        format: ReportFormat,
    },
    /// Lint a file. Exits with code 5 when there are findings.
    Check {
        file: PathBuf,
        /// Deepest allowed statement nesting.
        #[arg(long)]
        max_depth: Option<usize>,
        /// Turn a rule off (repeatable).
        #[arg(long, value_enum)]
        disable: Vec<Rule>,
        #[arg(long, value_enum, default_value_t = ReportFormat::default())]
        format: ReportFormat,
    },
    /// Print the canonical source of a file.
    Fmt {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = FmtFormat::default())]
        format: FmtFormat,
    },
    /// Print a JSON snapshot of the tree.
    Dump { file: PathBuf },
}

fn parse_kind(s: &str) -> Result<NodeKind, String> {
    s.parse()
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(global: &GlobalArgs, overrides: CliOverrides) -> Result<Config, DuetError> {
    Config::resolve(global.config.as_deref(), Path::new("."))?.with_overrides(overrides)
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<ExitCode, DuetError> {
    let mut stdout = io::stdout();
    match cli.command {
        Command::Outline {
            file,
            collapse,
            format,
        } => {
            let config = load_config(
                &cli.global,
                CliOverrides {
                    collapse,
                    ..Default::default()
                },
            )?;
            let response = run_outline(&file, &config)?;
            match format {
                ReportFormat::Json => emit_response(&response, &mut stdout)?,
                ReportFormat::Text => write!(stdout, "{}", response.outline.to_text())?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Check {
            file,
            max_depth,
            disable,
            format,
        } => {
            let config = load_config(
                &cli.global,
                CliOverrides {
                    max_depth,
                    disabled: disable,
                    ..Default::default()
                },
            )?;
            let response = run_check(&file, &config)?;
            match format {
                ReportFormat::Json => emit_response(&response, &mut stdout)?,
                ReportFormat::Text => {
                    for finding in &response.findings {
                        writeln!(stdout, "{}: {}", response.file, finding)?;
                    }
                }
            }
            if response.findings.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(OutputErrorCode::LintFindings.code()))
            }
        }
        Command::Fmt { file, format } => {
            let response = run_fmt(&file)?;
            match format {
                FmtFormat::Text => write!(stdout, "{}", response.source)?,
                FmtFormat::Json => emit_response(&response, &mut stdout)?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Dump { file } => {
            let response = run_dump(&file)?;
            emit_response(&response, &mut stdout)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
