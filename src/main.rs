// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use crate::app_config::{Config, Direction};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod capability;
mod engine;
mod errors;
mod language_utils;
mod translation;

/// CLI Wrapper for Direction to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliDirection {
    /// French source, English target
    FrEn,
    /// English source, French target
    EnFr,
}

impl From<CliDirection> for Direction {
    fn from(cli_direction: CliDirection) -> Self {
        match cli_direction {
            CliDirection::FrEn => Direction::FrenchToEnglish,
            CliDirection::EnFr => Direction::EnglishToFrench,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate text between French and English (default command)
    #[command(alias = "translate")]
    Translate(TranslateArgs),

    /// Show the host environment and engine state
    Status,

    /// Generate shell completions for tradwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Text to translate; reads stdin when omitted and no --file is given
    #[arg(value_name = "TEXT")]
    text: Option<String>,

    /// Read the text to translate from a file
    #[arg(short = 'i', long)]
    file: Option<PathBuf>,

    /// Translation direction
    #[arg(short, long, value_enum)]
    direction: Option<CliDirection>,

    /// Swap source and target languages of the configured direction
    #[arg(short, long, conflicts_with = "direction")]
    reverse: bool,

    /// Model name in the engine's local store
    #[arg(short, long)]
    model: Option<String>,

    /// Engine endpoint URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config_path: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// tradwai - TRADuction With AI
///
/// A streaming French/English translation tool driven by a local LLM
/// inference engine. Text never leaves the machine.
#[derive(Parser, Debug)]
#[command(name = "tradwai")]
#[command(author = "tradwai Team")]
#[command(version = "1.0.0")]
#[command(about = "Local AI-powered French/English translation")]
#[command(long_about = "tradwai splits the input into paragraphs and streams a translation for each
one from a local inference engine, so partial output appears as it is generated.

EXAMPLES:
    tradwai \"Bonjour tout le monde\"          # Translate French text to English
    tradwai -d en-fr \"Hello world\"           # Translate English text to French
    tradwai -r \"Hello world\"                 # Swap the configured direction
    cat lettre.txt | tradwai                 # Translate stdin
    tradwai -i lettre.txt                    # Translate a file
    tradwai -m mistral:7b \"Bonjour\"          # Use a specific model
    tradwai status                           # Engine and environment report
    tradwai completions bash                 # Generate bash completions

CONFIGURATION:
    Settings live in conf.json (working directory first, then the user
    config directory). A default file is created on first run.

ENGINE:
    The engine is a local Ollama server (http://localhost:11434 by
    default). Model weights are fetched into its local store on first use
    and reused afterwards.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Text to translate; reads stdin when omitted and no --file is given
    #[arg(value_name = "TEXT")]
    text: Option<String>,

    /// Read the text to translate from a file
    #[arg(short = 'i', long)]
    file: Option<PathBuf>,

    /// Translation direction
    #[arg(short, long, value_enum)]
    direction: Option<CliDirection>,

    /// Swap source and target languages of the configured direction
    #[arg(short, long, conflicts_with = "direction")]
    reverse: bool,

    /// Model name in the engine's local store
    #[arg(short, long)]
    model: Option<String>,

    /// Engine endpoint URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config_path: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
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

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "tradwai", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Status) => {
            let config = load_config(None, &None)?;
            let controller = Controller::with_config(config)?;
            controller.run_status().await
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let translate_args = TranslateArgs {
                text: cli.text,
                file: cli.file,
                direction: cli.direction,
                reverse: cli.reverse,
                model: cli.model,
                endpoint: cli.endpoint,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_translate(translate_args).await
        }
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_config(options.config_path.as_deref(), &options.log_level)?;

    // Override config with CLI options if provided
    if let Some(direction) = &options.direction {
        config.direction = direction.clone().into();
    } else if options.reverse {
        config.direction = config.direction.reversed();
    }

    if let Some(model) = &options.model {
        config.engine.model = model.clone();
    }

    if let Some(endpoint) = &options.endpoint {
        config.engine.endpoint = endpoint.clone();
    }

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let text = read_input(&options)?;
    if text.is_empty() {
        warn!("Nothing to translate");
        return Ok(());
    }

    let controller = Controller::with_config(config)?;
    controller.run_text(&text).await
}

/// Load the configuration file, creating a default one when missing
fn load_config(path: Option<&str>, log_level: &Option<CliLogLevel>) -> Result<Config> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    if Path::new(&config_path).exists() {
        let file = File::open(&config_path)
            .context(format!("Failed to open config file: {:?}", config_path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {:?}", config_path))?;
        Ok(config)
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at {:?}, creating default config.",
            config_path
        );

        let mut config = Config::default();
        if let Some(log_level) = log_level {
            config.log_level = log_level.clone().into();
        }

        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context(format!("Failed to create config directory: {:?}", parent))?;
            }
        }
        std::fs::write(&config_path, config_json)
            .context(format!("Failed to write default config to file: {:?}", config_path))?;

        Ok(config)
    }
}

/// Resolve the text to translate from the argument, a file or stdin
fn read_input(options: &TranslateArgs) -> Result<String> {
    if let Some(text) = &options.text {
        if options.file.is_some() {
            return Err(anyhow!("TEXT and --file are mutually exclusive"));
        }
        return Ok(text.clone());
    }

    if let Some(path) = &options.file {
        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read input file: {:?}", path))?;
        // A final newline is file formatting, not a blank paragraph
        return Ok(text.strip_suffix('\n').unwrap_or(&text).to_string());
    }

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok(text.strip_suffix('\n').unwrap_or(&text).to_string())
}

// @returns: log LevelFilter for a config log level
fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}
