use crate::types::FileFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and convert LAS point cloud files.
#[derive(Debug, Clone, Parser)]
#[clap(version)]
pub struct AppOptions {
    /// Verbosity of the command line output.
    #[clap(long, default_value = "info", global = true)]
    pub log_level: log::Level,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Prints the header of a LAS file as JSON.
    Info(Info),

    /// Prints the point records of a LAS file.
    Dump(Dump),

    /// Point cloud file conversion.
    Convert(Convert),

    /// Opens a window to view the points of a LAS file.
    Show(Show),
}

#[derive(Debug, Clone, Parser)]
pub struct Info {
    /// Print the JSON on a single line.
    #[clap(long)]
    pub compact: bool,

    pub file: PathBuf,
}

#[derive(Debug, Clone, Parser)]
pub struct Dump {
    /// Only print the first N points.
    #[clap(long)]
    pub first: Option<usize>,

    /// Only print the last N points.
    ///
    /// Can be combined with --first.
    #[clap(long)]
    pub last: Option<usize>,

    /// Print the stored integer coordinates instead of real-world ones.
    #[clap(long)]
    pub raw: bool,

    /// Browse the points in an interactive table.
    #[clap(long)]
    pub tui: bool,

    pub input: PathBuf,
}

#[derive(Debug, Clone, Parser)]
pub struct Convert {
    #[clap(short, long)]
    pub from: Option<FileFormat>,

    #[clap(short, long)]
    pub to: Option<FileFormat>,

    #[clap(short, long)]
    pub input: PathBuf,

    #[clap(short, long)]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Parser)]
pub struct Show {
    /// Show the points in batches of this size. Press 'n' for the next
    /// batch. All points are shown at once if unset.
    #[clap(long)]
    pub batch_size: Option<usize>,

    pub input: PathBuf,
}
