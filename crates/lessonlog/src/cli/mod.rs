//! Command-line interface for lessonlog.
//!
//! This module provides the CLI structure for the `lessonlog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    sort_state, ConfigCommand, FontCommand, FormCommand, ImportCommand, ReportCommand,
    ResetCommand, SchoolCommand, ShowCommand, SortArg, StatusCommand, StrategyCommand,
    SubjectCommand, ViewArg,
};

use crate::logging::Verbosity;

/// lessonlog - Record teaching activity and report on it
///
/// Keeps lesson counts, strategy usage, extracurricular activities and
/// resource-room usage in a local store, and renders charts and summaries.
#[derive(Debug, Parser)]
#[command(name = "lessonlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a view
    Show(ShowCommand),

    /// Edit general form fields and counters
    #[command(subcommand)]
    Form(FormCommand),

    /// Manage teaching-strategy rows
    #[command(subcommand)]
    Strategy(StrategyCommand),

    /// Print the report
    Report(ReportCommand),

    /// Edit school information
    #[command(subcommand)]
    School(SchoolCommand),

    /// Manage the subject list
    #[command(subcommand)]
    Subject(SubjectCommand),

    /// Set the interface font size
    Font(FontCommand),

    /// Restore all data to its initial values
    Reset(ResetCommand),

    /// Print all stored data as JSON
    Export,

    /// Replace all stored data from an exported JSON file
    Import(ImportCommand),

    /// Show store status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "lessonlog");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["lessonlog", "-q", "export"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);

        let cli = Cli::try_parse_from(["lessonlog", "-vv", "export"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Trace);

        let cli = Cli::try_parse_from(["lessonlog", "export"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_parse_show_defaults_to_dashboard() {
        let cli = Cli::try_parse_from(["lessonlog", "show"]).unwrap();
        match cli.command {
            Command::Show(show) => {
                assert_eq!(show.view, ViewArg::Dashboard);
                assert!(show.sort.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_show_with_repeated_sort() {
        let cli = Cli::try_parse_from([
            "lessonlog", "show", "dashboard", "--sort", "active", "--sort", "active",
        ])
        .unwrap();
        match cli.command {
            Command::Show(show) => assert_eq!(show.sort, vec![SortArg::Active, SortArg::Active]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_form_set_negative_value() {
        let cli = Cli::try_parse_from(["lessonlog", "form", "set", "units", "-3"]).unwrap();
        match cli.command {
            Command::Form(FormCommand::Set { field, value }) => {
                assert_eq!(field, "units");
                assert_eq!(value, "-3");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_strategy_delete() {
        let cli = Cli::try_parse_from(["lessonlog", "strategy", "delete", "4", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Strategy(StrategyCommand::Delete { id: 4, yes: true })
        ));
    }

    #[test]
    fn test_describe_needs_text_or_generate() {
        assert!(Cli::try_parse_from(["lessonlog", "strategy", "describe", "1"]).is_err());
        assert!(Cli::try_parse_from([
            "lessonlog", "strategy", "describe", "1", "--text", "x", "--generate"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["lessonlog", "strategy", "describe", "1", "--generate"]).is_ok());
    }

    #[test]
    fn test_parse_font_accepts_negative() {
        let cli = Cli::try_parse_from(["lessonlog", "font", "-5"]).unwrap();
        assert!(matches!(cli.command, Command::Font(FontCommand { size: -5 })));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["lessonlog", "-c", "/custom/config.toml", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_school_logo() {
        let cli = Cli::try_parse_from(["lessonlog", "school", "logo", "logo.png"]).unwrap();
        match cli.command {
            Command::School(SchoolCommand::Logo { file }) => {
                assert_eq!(file, PathBuf::from("logo.png"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
