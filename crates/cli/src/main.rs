// shelvd-import - legacy catalog migration into a shelvd database

mod exit_codes;
mod migrate;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;
use shelvd_migrate::MigrateError;

use exit_codes::{migrate_exit_code, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "shelvd-import")]
#[command(about = "Import a legacy FileMaker catalog export into shelvd")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an import described by a config file
    #[command(after_help = "\
Examples:
  shelvd-import run catalog.migrate.toml
  shelvd-import run catalog.migrate.toml --json > report.json
  shelvd-import run catalog.migrate.toml --output report.json --quiet

Re-running the same config is safe: rows already imported are skipped,
and an interrupted run picks up after its last committed batch.")]
    Run {
        /// Path to the .migrate.toml config
        config: PathBuf,

        /// Print the JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Only log warnings and errors
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Parse and validate a config without touching sources or the database
    Validate {
        /// Path to the .migrate.toml config
        config: PathBuf,
    },

    /// Create the destination schema in a new or existing database
    Init {
        /// Path to the SQLite database
        db: PathBuf,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  shelvd-migrate ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  shelvd-migrate ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = matches!(cli.command, Some(Commands::Run { quiet: true, .. }));
    env_logger::Builder::from_env(Env::default().default_filter_or(if quiet { "warn" } else { "info" })).init();

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: shelvd-import <command> [options]");
            eprintln!("       shelvd-import --help for more information");
            Ok(())
        }
        Some(Commands::Run { config, json, output, quiet: _ }) => migrate::cmd_run(config, json, output),
        Some(Commands::Validate { config }) => migrate::cmd_validate(config),
        Some(Commands::Init { db }) => migrate::cmd_init(db),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with proper exit code.
    pub fn migrate(err: MigrateError) -> Self {
        let code = migrate_exit_code(&err);
        let hint = match &err {
            MigrateError::NoOwner => Some("create a user first, or set store.owner in the config".to_string()),
            MigrateError::UnknownOwner(_) => Some("check store.owner in the config".to_string()),
            MigrateError::ReferenceLoad { .. } => {
                Some("run `shelvd-import init` and populate the reference tables".to_string())
            }
            MigrateError::Batch { .. } => {
                Some("fix the cause and re-run the same command; committed batches are skipped".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
