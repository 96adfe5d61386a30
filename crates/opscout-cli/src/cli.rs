//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};
use opscout::RetrievalMode;

// ============================================================================
// CLI argument types
// ============================================================================

/// Search a catalog of operators by description, keyword or pattern.
#[derive(Parser, Debug)]
#[command(name = "opscout", author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "OPSCOUT_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search operators.
    Search {
        /// Free-text query, or a regex in `regex` mode.
        query: String,

        /// Maximum number of results (clamped to the configured maximum).
        #[arg(short, long)]
        limit: Option<usize>,

        /// Retrieval mode: regex, bm25, vector or hybrid.
        #[arg(short, long, default_value = "vector")]
        mode: RetrievalMode,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show full details of one operator.
    Details {
        /// Exact operator name.
        name: String,

        /// Print the record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Build or validate the persisted semantic index.
    Index {
        /// Discard the persisted index and rebuild.
        #[arg(short, long)]
        force: bool,

        /// Check index freshness without rebuilding.
        #[arg(long)]
        check: bool,
    },

    /// Print version information.
    Version,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Print the effective configuration as TOML.
    Show,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "retrieval.max_limit").
        key: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
