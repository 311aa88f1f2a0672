//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::sort::{SortColumn, SortState};
use crate::view::View;

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// View to render
    #[arg(value_enum, default_value = "dashboard")]
    pub view: ViewArg,

    /// Sort the strategy grid; repeat to toggle direction
    #[arg(short, long = "sort", value_enum, value_name = "COLUMN")]
    pub sort: Vec<SortArg>,
}

/// Form commands.
#[derive(Debug, Subcommand)]
pub enum FormCommand {
    /// Set a form field, e.g. `units` or `resourceRooms.library`
    Set {
        /// Field path
        field: String,
        /// New value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

/// Strategy grid commands.
#[derive(Debug, Subcommand)]
pub enum StrategyCommand {
    /// List strategy rows
    List {
        /// Sort by a counter column; repeat to toggle direction
        #[arg(short, long = "sort", value_enum, value_name = "COLUMN")]
        sort: Vec<SortArg>,
    },

    /// Append a blank strategy row
    Add,

    /// Edit one column of a strategy row
    Edit {
        /// Strategy id
        id: u32,
        /// Column: name, description, traditional, active or research
        field: String,
        /// New value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Delete a strategy row
    Delete {
        /// Strategy id
        id: u32,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Set or generate a strategy description
    Describe {
        /// Strategy id
        id: u32,
        /// Description text
        #[arg(long, conflicts_with = "generate", required_unless_present = "generate")]
        text: Option<String>,
        /// Generate the description with the text-generation service
        #[arg(long)]
        generate: bool,
    },

    /// Ask the text-generation service for a new strategy name
    Suggest {
        /// Name this existing row instead of adding a new one
        #[arg(long)]
        id: Option<u32>,
    },
}

/// Report command arguments.
#[derive(Debug, Args)]
pub struct ReportCommand {
    /// Include a generated narrative
    #[arg(short, long)]
    pub generate: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// School information commands.
#[derive(Debug, Subcommand)]
pub enum SchoolCommand {
    /// Set a school field: name, branch or academic-year
    Set {
        /// Field name
        field: String,
        /// New value
        value: String,
    },

    /// Use an image file as the school logo
    Logo {
        /// Image file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Remove the school logo
    ClearLogo,
}

/// Subject list commands.
#[derive(Debug, Subcommand)]
pub enum SubjectCommand {
    /// List subjects
    List,

    /// Add a subject
    Add {
        /// Subject name
        name: String,
    },

    /// Delete a subject
    Delete {
        /// Subject name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Font command arguments.
#[derive(Debug, Args)]
pub struct FontCommand {
    /// Font size in pixels (clamped to 12-22)
    #[arg(allow_negative_numbers = true)]
    pub size: i64,
}

/// Reset command arguments.
#[derive(Debug, Args)]
pub struct ResetCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// JSON document written by `export`
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// View argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    /// Data entry
    Dashboard,
    /// Charts and report
    Reports,
    /// School info, subjects and appearance
    Settings,
}

impl From<ViewArg> for View {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Dashboard => Self::Dashboard,
            ViewArg::Reports => Self::Reports,
            ViewArg::Settings => Self::Settings,
        }
    }
}

/// Sortable column argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Traditional counter
    Traditional,
    /// Active counter
    Active,
    /// Research counter
    Research,
}

impl From<SortArg> for SortColumn {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Traditional => Self::Traditional,
            SortArg::Active => Self::Active,
            SortArg::Research => Self::Research,
        }
    }
}

/// Treat each `--sort` flag as a header click.
#[must_use]
pub fn sort_state(clicks: &[SortArg]) -> SortState {
    let columns: Vec<SortColumn> = clicks.iter().copied().map(SortColumn::from).collect();
    SortState::from_clicks(&columns)
}
