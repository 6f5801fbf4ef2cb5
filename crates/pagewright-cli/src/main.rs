//! Runs pagewright workflows against a configured console environment.
//!
//! Each workflow gets its own browser session, which is always quit when
//! the workflow ends. The exit code reflects the first failure.
//!
//! # Usage
//!
//! ```bash
//! # Sign in to the default environment
//! pagewright login
//!
//! # Sign in to QA, headless
//! pagewright --env qa --headless login
//!
//! # Pick the showing date range and gift source on the create form
//! pagewright gift-dates --start 2025-07-08 --end 2025-07-09 --source Purchase
//!
//! # Print the resolved configuration
//! pagewright config show
//!
//! # Write a default config file
//! pagewright config init
//! ```

mod flows;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use pagewright_core::config::{ConfigError, SuiteConfig, FALLBACK_ENV};
use pagewright_core::error::{FailureKind, Interaction, InteractionError};
use pagewright_core::session::BrowserSession;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use flows::gift::{fill_gift_dates, GiftDates};
use flows::login::{login, LoginOutcome};

/// Browser workflow runner for the admin console.
#[derive(Parser)]
#[command(name = "pagewright")]
#[command(about = "Run browser workflows against an admin console environment")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.pagewright/config.json)
    #[arg(short, long, env = "PAGEWRIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// Environment name from the config file
    #[arg(short, long, env = "PAGEWRIGHT_ENV")]
    env: Option<String>,

    /// Run the browser headless, whatever the config says
    #[arg(long)]
    headless: bool,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and wait for the dashboard
    Login,

    /// Sign in, then pick the showing date range and gift source on the
    /// gift creation form
    GiftDates {
        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last day of the range (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// Gift source option label
        #[arg(long, default_value = "Purchase")]
        source: String,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the resolved configuration as JSON
    Show,
    /// Write a default config file if none exists
    Init,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Usage(String),
    Browser(String),
    Flow(InteractionError),
    Rejected(String),
    Io(std::io::Error),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Flow(_) | CliError::Rejected(_) => ExitCode::from(1),
            CliError::Usage(_) => ExitCode::from(2),
            CliError::Browser(_) => ExitCode::from(3),
            CliError::Config(_) | CliError::Io(_) => ExitCode::from(4),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Config error: {}", e),
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::Browser(msg) => write!(f, "Browser error: {}", msg),
            CliError::Flow(e) => write!(f, "Flow failed ({}): {}", e.kind().as_str(), e),
            CliError::Rejected(reason) => write!(f, "Login rejected: {}", reason),
            CliError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

/// Log to stderr and to `<log_dir>/pagewright_<timestamp>.log`.
///
/// `RUST_LOG` overrides the default filter. The returned guard flushes the
/// file writer on drop.
fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,pagewright_core=info,pagewright=info"))
    };
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_filter(filter());

    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("Warning: cannot create log dir {}: {}", log_dir.display(), e);
        tracing_subscriber::registry().with(stderr_layer).init();
        return None;
    }

    let file_name = format!("pagewright_{}.log", Local::now().format("%Y%m%d_%H%M%S"));
    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(filter());

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Some(guard)
}

/// Logging for commands that never open a browser: stderr only.
fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// A browser workflow picked on the command line.
enum Flow {
    Login,
    GiftDates(GiftDates),
}

impl Flow {
    fn name(&self) -> &'static str {
        match self {
            Flow::Login => "login",
            Flow::GiftDates(_) => "gift-dates",
        }
    }
}

fn load_config(path: Option<&Path>, headless: bool) -> Result<SuiteConfig, CliError> {
    let mut config = SuiteConfig::load_or_default(path).map_err(CliError::Config)?;
    if headless {
        config.browser.headless = true;
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let flow = match cli.command {
        Command::Config { action: ConfigAction::Init } => {
            init_stderr_logging();
            return init_config(cli.config.as_deref());
        }
        Command::Config { action: ConfigAction::Show } => {
            init_stderr_logging();
            return show_config(&load_config(cli.config.as_deref(), cli.headless)?);
        }
        Command::Login => Flow::Login,
        Command::GiftDates { start, end, source } => {
            if end < start {
                return Err(CliError::Usage(format!(
                    "--end {} is before --start {}",
                    end, start
                )));
            }
            Flow::GiftDates(GiftDates { start, end, source })
        }
    };

    let config = load_config(cli.config.as_deref(), cli.headless)?;
    let _guard = init_logging(&config.log_dir());
    let env = config.environment(cli.env.as_deref());
    if env.url.is_empty() {
        return Err(CliError::Usage(format!(
            "environment {:?} has no url; run `pagewright config init` and edit the file",
            cli.env.as_deref().unwrap_or(FALLBACK_ENV)
        )));
    }

    let flow_name = flow.name();
    let session = BrowserSession::connect(flow_name, &config, &env)
        .await
        .map_err(|e| CliError::Browser(e.to_string()))?;
    info!(flow = flow_name, session = %session.id(), url = %env.url, "Running workflow");

    let started = Instant::now();
    let (username, password) = (env.username.clone(), env.password.clone());
    let outcome = match flow {
        Flow::Login => {
            session
                .run(|page| async move { login(&page, &username, &password).await })
                .await
        }
        Flow::GiftDates(dates) => {
            session
                .run(|page| async move {
                    signed_in(login(&page, &username, &password).await)?;
                    fill_gift_dates(&page, &dates).await?;
                    Ok(LoginOutcome::Dashboard)
                })
                .await
        }
    };

    let result = match outcome {
        Ok(LoginOutcome::Dashboard) => Ok(()),
        Ok(LoginOutcome::Rejected(reason)) => Err(CliError::Rejected(reason)),
        Err(e) => Err(CliError::Flow(e)),
    };
    report(cli.format, flow_name, started.elapsed().as_millis() as u64, &result);
    result
}

/// A rejected sign-in aborts any flow that needs to be signed in.
fn signed_in(outcome: Interaction<LoginOutcome>) -> Interaction<()> {
    match outcome? {
        LoginOutcome::Dashboard => Ok(()),
        LoginOutcome::Rejected(reason) => Err(InteractionError::Unknown(format!(
            "login rejected: {}",
            reason
        ))),
    }
}

fn report(format: OutputFormat, flow: &str, elapsed_ms: u64, result: &Result<(), CliError>) {
    let kind = match result {
        Ok(()) => None,
        Err(CliError::Flow(e)) => Some(e.kind()),
        Err(_) => Some(FailureKind::Unknown),
    };
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "flow": flow,
                    "passed": result.is_ok(),
                    "elapsed_ms": elapsed_ms,
                    "kind": kind,
                    "reason": result.as_ref().err().map(|e| e.to_string()),
                })
            );
        }
        OutputFormat::Text => match result {
            Ok(()) => println!("PASS {} ({}ms)", flow, elapsed_ms),
            Err(e) => println!("FAIL {} ({}ms): {}", flow, elapsed_ms, e),
        },
    }
}

fn show_config(config: &SuiteConfig) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(&config.redacted())
        .map_err(|e| CliError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
    println!("{}", json);
    Ok(())
}

fn init_config(explicit: Option<&Path>) -> Result<(), CliError> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(SuiteConfig::default_path);
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    SuiteConfig::default().save(&path).map_err(CliError::Io)?;
    println!("Wrote {}", path.display());
    Ok(())
}
