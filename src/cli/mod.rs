//! CLI interface using clap
//!
//! Provides the command-line interface for modoc

mod commands;

pub use commands::*;

use crate::plan::MergeMode;
use crate::source::DocumentKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// modoc - Documentation content resolution for module reference sites
#[derive(Parser, Debug)]
#[command(name = "modoc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Path to the project (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    pub path: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan the document set for a project
    Plan(PlanArgs),

    /// Parse command help into a reference model
    Help(HelpArgs),

    /// Split an example body into code and remarks
    Classify(ClassifyArgs),

    /// Show or change configuration
    Config(ConfigArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Arguments for plan command
#[derive(Parser, Debug, Default)]
pub struct PlanArgs {
    /// Merge preference between local and remote copies
    #[arg(short, long)]
    pub mode: Option<MergeMode>,

    /// Fetch remote documents for this run
    #[arg(short, long, conflicts_with = "offline")]
    pub remote: bool,

    /// Never contact the remote repository
    #[arg(long)]
    pub offline: bool,

    /// Keep identical local and remote copies
    #[arg(long)]
    pub show_duplicates: bool,

    /// Skip local documents when the remote is reachable
    #[arg(long)]
    pub exclude_local: bool,

    /// Only include these kinds (repeatable)
    #[arg(long = "include", value_name = "KIND")]
    pub include: Vec<DocumentKind>,

    /// Leave these kinds out (repeatable)
    #[arg(long = "exclude", value_name = "KIND")]
    pub exclude: Vec<DocumentKind>,

    /// Repository slug (e.g., "owner/name")
    #[arg(long)]
    pub repository: Option<String>,

    /// Branch to read remote documents from
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Access token for the repository provider
    #[arg(long)]
    pub token: Option<String>,

    /// File holding the introduction text
    #[arg(long)]
    pub introduction: Option<PathBuf>,

    /// Print item contents in text output
    #[arg(long)]
    pub content: bool,
}

/// Arguments for help command
#[derive(Parser, Debug, Default)]
pub struct HelpArgs {
    /// Help files: JSON object graphs or raw text dumps
    pub files: Vec<PathBuf>,

    /// Capture raw help for these commands with the configured help program
    #[arg(short, long = "command", value_name = "NAME")]
    pub commands: Vec<String>,

    /// Command name used when the help carries none
    #[arg(long)]
    pub name: Option<String>,

    /// Show only the examples
    #[arg(short, long)]
    pub examples: bool,
}

/// Arguments for classify command
#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// File holding the example body ("-" reads stdin)
    #[arg(default_value = "-")]
    pub input: String,

    /// Also split trailing narrative from plain code
    #[arg(short, long)]
    pub strict: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Show current configuration
    #[arg(long)]
    pub show: bool,

    /// Set a configuration value (key=value)
    #[arg(long)]
    pub set: Option<String>,

    /// Get a configuration value
    #[arg(long)]
    pub get: Option<String>,

    /// Reset to defaults
    #[arg(long)]
    pub reset: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["modoc", "plan", "--mode", "prefer-remote", "--remote"]);
        assert!(matches!(cli.command, Commands::Plan(_)));

        if let Commands::Plan(args) = cli.command {
            assert_eq!(args.mode, Some(MergeMode::PreferRemote));
            assert!(args.remote);
        }
    }

    #[test]
    fn test_plan_kind_filters() {
        let cli = Cli::parse_from([
            "modoc", "plan", "--include", "readme", "--include", "license", "--exclude", "upgrade",
        ]);
        if let Commands::Plan(args) = cli.command {
            assert_eq!(args.include, vec![DocumentKind::Readme, DocumentKind::License]);
            assert_eq!(args.exclude, vec![DocumentKind::Upgrade]);
        } else {
            panic!("expected plan command");
        }
    }

    #[test]
    fn test_remote_conflicts_with_offline() {
        assert!(Cli::try_parse_from(["modoc", "plan", "--remote", "--offline"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["modoc", "classify", "--strict", "-o", "json", "-p", "/tmp"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.path, "/tmp");
        if let Commands::Classify(args) = cli.command {
            assert!(args.strict);
            assert_eq!(args.input, "-");
        }
    }
}
