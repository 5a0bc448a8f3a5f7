pub mod browse;
pub mod config;
pub mod export;
pub mod load;
pub mod summary;
pub mod total;
pub mod view;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::query::{CategoryFilter, Projection};
use crate::views::ViewId;

#[derive(Parser)]
#[command(
    name = "playledger",
    version,
    about = "Browse Google Play loyalty and purchase exports. File types are detected from content, so any filename works."
)]
pub struct Cli {
    /// Print debug diagnostics to stderr (same as RUST_LOG=playledger=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect each file's type and show which views are available.
    Summary {
        /// JSON export files, in upload order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print one view as a table.
    View {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// View to show (default: the first populated one)
        #[arg(long, value_enum)]
        view: Option<ViewId>,
        /// Category, document type or status to keep; "all" keeps everything
        #[arg(long, default_value = "all")]
        filter: CategoryFilter,
        /// Case-insensitive text to look for
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Print a single total, such as total spent or total refunded.
    Total {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, value_enum)]
        projection: Projection,
    },
    /// Write a filtered view to CSV.
    Export {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, value_enum)]
        view: ViewId,
        #[arg(long, default_value = "all")]
        filter: CategoryFilter,
        #[arg(long, default_value = "")]
        search: String,
        /// Output CSV path
        #[arg(long)]
        output: PathBuf,
    },
    /// Interactively browse every loaded view.
    Browse {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
    /// Show or change settings.
    Config {
        /// chrono format for timestamps, e.g. "%Y-%m-%d"
        #[arg(long = "date-format")]
        date_format: Option<String>,
        /// Enable or disable colored output
        #[arg(long)]
        color: Option<bool>,
        /// Rows per page in the browser
        #[arg(long = "page-size")]
        page_size: Option<usize>,
        /// Print the current settings
        #[arg(long)]
        show: bool,
    },
}
