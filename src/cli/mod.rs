//! CLI module for Sok.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Sok - Semantic Video Search
///
/// A CLI tool and HTTP service for searching a video catalog with natural language.
/// The name "Sok" comes from the Norwegian word for "search."
#[derive(Parser, Debug)]
#[command(name = "sok")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Sok: provision the warehouse and verify configuration
    Init,

    /// Load a CSV video catalog into the warehouse
    Load {
        /// Path to the catalog CSV file
        csv: String,
    },

    /// Show the first rows of the loaded catalog
    Preview {
        /// Number of rows to show
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Search the catalog with a natural-language query
    Search {
        /// Search query
        query: String,

        /// Earliest year to include (inclusive)
        #[arg(long)]
        year_from: Option<i32>,

        /// Latest year to include (inclusive)
        #[arg(long)]
        year_to: Option<i32>,

        /// Result page to show (1-indexed)
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Start HTTP API server for interactive sessions
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
