//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rodeo: catalog a directory tree into relational table schemas
#[derive(Parser)]
#[command(name = "rodeo")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Catalog a directory and print a CREATE TABLE command per table
    Wrangle {
        /// Root directory to catalog
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// Print the catalog as JSON instead of DDL
        #[arg(long)]
        json: bool,

        /// Write the output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Generate the schema of a single structured file
    Schema {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Write a sample preview of predicted values for one table
    Sample {
        /// Root directory to catalog
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// Table to preview (e.g. root_images)
        #[arg(value_name = "TABLE")]
        table: String,

        /// Skip the remote vision service
        #[arg(long)]
        no_vision: bool,

        /// Annotation cache file
        #[arg(long, default_value = ".rodeo-cache.json")]
        cache: PathBuf,

        /// Directory the preview file is written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Maximum rows in the preview
        #[arg(long, default_value = "20")]
        rows: usize,
    },
}
