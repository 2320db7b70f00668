//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::pipeline::RoutePreference;

/// TripGuide - guided road trip planning in the terminal
#[derive(Parser)]
#[command(
    name = "tripguide",
    about = "Guided road trip planning chat",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/tripguide/logs/tripguide.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to chat)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive guided chat
    Chat,

    /// Parse itinerary text and print it as day cards or JSON
    Render {
        /// File with the itinerary text (reads stdin when omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the guided questions
    Flow,

    /// Plan a whole trip in one request
    Plan {
        /// Starting location
        #[arg(long, default_value = "")]
        from: String,

        /// Destination
        #[arg(long, default_value = "")]
        to: String,

        /// Trip length in days
        #[arg(short, long)]
        days: Option<u32>,

        /// Driving hours per day (1-12)
        #[arg(long)]
        hours: Option<f64>,

        /// Fastest route wanted (yes or no)
        #[arg(long, value_name = "YES|NO")]
        hurry: Option<RoutePreference>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for the render command
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

/// Location of the log file
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripguide")
        .join("logs")
        .join("tripguide.log")
}
