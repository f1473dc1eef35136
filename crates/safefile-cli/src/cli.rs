//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use safefile::SafeFileConfig;

/// safefile - crash-safe single-file persistence
#[derive(Parser, Debug)]
#[command(name = "safefile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Skip fsync of written files and their directory
    #[arg(long, env = "SAFEFILE_NO_SYNC", global = true)]
    pub no_sync: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the safety state and which artifacts exist
    State {
        /// Path of the logical file
        #[arg(required = true)]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Collapse leftover artifacts into a single base file
    Recover {
        /// Path of the logical file
        #[arg(required = true)]
        path: PathBuf,
    },

    /// Print the committed content, recovering first when safe
    Read {
        /// Path of the logical file
        #[arg(required = true)]
        path: PathBuf,
    },

    /// Commit new content read from stdin or a file
    Write {
        /// Path of the logical file
        #[arg(required = true)]
        path: PathBuf,

        /// Read content from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

/// Output format for the state command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    /// Returns the durability configuration selected by the flags.
    pub fn config(&self) -> SafeFileConfig {
        if self.no_sync {
            SafeFileConfig::unsynced()
        } else {
            SafeFileConfig::default()
        }
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
