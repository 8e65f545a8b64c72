// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::PathBuf;

use mtqa::app_config::{Config, LogLevel};
use mtqa::app_controller::{Controller, TranslateOutcome};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a batch file into every language of its sequence
    Translate {
        /// Batch input (defaults to batch.json in the working directory)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
    },

    /// Print surface QA findings for a batch output as JSON
    Qa {
        /// Batch output (defaults to batch_output.json)
        #[arg(value_name = "BATCH_OUTPUT")]
        batch_output: Option<PathBuf>,
    },

    /// Compute corpus BLEU and chrF against the reference files
    Evaluate {
        /// Batch output (defaults to batch_output.json)
        #[arg(value_name = "BATCH_OUTPUT")]
        batch_output: Option<PathBuf>,
    },

    /// Map chrF onto the 1-5 scale
    MapScores {
        /// Automatic scores (defaults to auto_scores.csv)
        #[arg(value_name = "AUTO_SCORES")]
        auto_scores: Option<PathBuf>,
    },

    /// Score every language on the six-dimension rubric
    ScoreDisplay {
        /// Batch output (defaults to batch_output.json)
        #[arg(value_name = "BATCH_OUTPUT")]
        batch_output: Option<PathBuf>,
    },

    /// Join rated automatic scores with human ratings
    Merge {
        /// Rated automatic scores (defaults to auto_scores_rated.csv)
        #[arg(value_name = "AUTO_RATED")]
        auto_rated: Option<PathBuf>,
    },

    /// Export (item, language) pairs for human raters
    ExportHuman {
        /// Batch output (defaults to batch_output.json)
        #[arg(value_name = "BATCH_OUTPUT")]
        batch_output: Option<PathBuf>,
    },

    /// Generate shell completions for mtqa
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// mtqa - Machine translation with quality assessment
///
/// Translates free-text batches into Malayalam, Kannada, Tamil, Telugu and
/// Hindi through a local Ollama model, then checks and scores the results.
#[derive(Parser, Debug)]
#[command(name = "mtqa")]
#[command(version = "0.1.0")]
#[command(about = "Batch machine translation with QA and scoring")]
#[command(long_about = "mtqa translates batches of text through a local Ollama model and scores the output.

EXAMPLES:
    mtqa translate                      # Translate batch.json into batch_output.json
    mtqa translate chapter1.json        # Translate a specific batch file
    mtqa qa                             # Print QA findings as JSON
    mtqa evaluate                       # Write auto_scores.csv from refs/<language>.txt
    mtqa map-scores                     # Write auto_scores_rated.csv
    mtqa score-display                  # Write scoring_display.csv
    mtqa merge                          # Write combined_summary.csv
    mtqa export-human                   # Write for_raters.csv
    mtqa completions bash > mtqa.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in mtqa.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "mtqa.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Model name to use for translation
    #[arg(short, long, global = true, env = "OLLAMA_MODEL")]
    model: Option<String>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::decoration(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "mtqa", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config)?;
    if let Some(model) = &cli.model {
        config.translation.model = model.clone();
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    run_command(&controller, cli.command).await
}

async fn run_command(controller: &Controller, command: Commands) -> Result<()> {
    match command {
        Commands::Translate { input } => match controller.run_translate(input).await? {
            TranslateOutcome::Written { path, records } => {
                info!("Wrote results for {} items to {:?}", records.len(), path);
            }
            TranslateOutcome::Fallback { record } => {
                for (language, text) in record.translation.iter() {
                    println!("[{}]", language);
                    println!("{}", text);
                }
            }
        },
        Commands::Qa { batch_output } => {
            let report = controller.run_qa(batch_output)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialize QA report")?
            );
        }
        Commands::Evaluate { batch_output } => {
            controller.run_evaluate(batch_output)?;
        }
        Commands::MapScores { auto_scores } => {
            controller.run_map_scores(auto_scores)?;
        }
        Commands::ScoreDisplay { batch_output } => {
            controller.run_score_display(batch_output)?;
        }
        Commands::Merge { auto_rated } => {
            controller.run_merge(auto_rated)?;
        }
        Commands::ExportHuman { batch_output } => {
            let rows = controller.run_export_human(batch_output)?;
            info!("Exported {} rows for raters", rows);
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
