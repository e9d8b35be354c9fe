use std::path::PathBuf;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "reload-runner")]
#[command(version)]
#[command(about = "Settings resolution and rebuild gating for a live-reload build supervisor")]
#[command(long_about = "Resolves runner settings from defaults, RUNNER_* environment variables and a YAML config file, then answers which paths and watcher events should trigger a rebuild.")]
pub struct Cli {
    /// Config file to load on top of defaults and environment
    #[arg(short, long, global = true, value_name = "PATH", help = "Config file (defaults to ./runner.conf when present)")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Output format for `show`
    #[arg(long, global = true, default_value = "yaml", help = "Output format")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the resolved settings table
    Show,
    /// Classify paths against the resolved settings
    Check {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },
    /// Decide whether raw watcher events trigger a rebuild
    Event {
        #[arg(value_name = "EVENT", required = true)]
        events: Vec<String>,
    },
    /// Print the escape code configured for an output role
    Color {
        #[arg(value_name = "ROLE")]
        role: String,
    },
    /// Create the tmp directory
    Init,
    /// Manage the build-error log
    Log {
        #[command(subcommand)]
        action: LogAction,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum LogAction {
    /// Append a message, creating the log if needed
    Append {
        #[arg(value_name = "MESSAGE")]
        message: String,
    },
    /// Delete the log
    Clear,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// YAML, the config file format (default)
    Yaml,
    /// JSON output for scripting
    Json,
}

impl Cli {
    pub fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }
}
