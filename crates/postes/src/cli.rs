//! Clap derive structures for the `postes` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use postes_core::SubstationId;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// postes -- substation and PLC concentrator inventory reader
#[derive(Debug, Parser)]
#[command(
    name = "postes",
    version,
    about = "Inspect electrical substations and their PLC concentrators",
    long_about = "Lists substations with their concentrator counts, filtered by \
        business owner (BO) and geolocation.\n\n\
        Reads an inventory file into memory (--inventory) or a SQLite \
        database (--database).",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Inventory file (JSON, YAML or TOML) loaded into memory
    #[arg(long, short = 'i', env = "POSTES_INVENTORY", global = true)]
    pub inventory: Option<PathBuf>,

    /// SQLite inventory database (takes precedence over --inventory)
    #[arg(long, short = 'd', env = "POSTES_DATABASE", global = true)]
    pub database: Option<PathBuf>,

    /// Output format [default: table, or the config value]
    #[arg(long, short = 'o', env = "POSTES_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto, or the config value]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List substations with their concentrator counts
    #[command(alias = "ls")]
    List(FilterArgs),

    /// Show one substation with its concentrator counts
    #[command(alias = "get")]
    Show {
        /// Substation id (id_poste)
        id: SubstationId,
    },

    /// List the concentrators assigned to a substation
    #[command(alias = "conc")]
    Devices {
        /// Substation id (id_poste)
        id: SubstationId,
    },

    /// List the distinct business owners (BO)
    #[command(alias = "bo")]
    Owners,

    /// Totals across the selected substations
    Summary(FilterArgs),

    /// Load an inventory file into a SQLite database, replacing its contents
    Import(ImportArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Filter Arguments ──────────────────────────────────────────

/// Substation selection shared by `list` and `summary`.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Only substations assigned to this business owner (exact match)
    #[arg(long = "bo", value_name = "LABEL")]
    pub owner: Option<String>,

    /// Only substations with both latitude and longitude
    #[arg(long, short = 'g')]
    pub with_coords: bool,
}

// ── Import ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Inventory file (JSON, YAML or TOML)
    pub file: PathBuf,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display current resolved configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn non_positive_id_is_a_usage_error() {
        let err = Cli::try_parse_from(["postes", "show", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn filter_flags_parse() {
        let cli = Cli::try_parse_from(["postes", "list", "--bo", "BO1", "-g"]).unwrap();
        match cli.command {
            Command::List(args) => {
                assert_eq!(args.owner.as_deref(), Some("BO1"));
                assert!(args.with_coords);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
