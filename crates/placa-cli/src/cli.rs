//! CLI definition using clap

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use placa_types::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "placa-scan")]
#[command(version)]
#[command(about = "Mercosul license-plate detection and reporting from camera frames")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect the plate in a single image region
    Detect {
        /// Path to image file
        image: PathBuf,

        /// Capturing source identifier (camera, lane, gate)
        #[arg(long, short = 's')]
        source: Option<String>,

        /// Frame quality estimate (0.0-1.0)
        #[arg(long)]
        quality: Option<f64>,

        /// Do not append the result to the detection history
        #[arg(long)]
        no_store: bool,
    },

    /// Detect plates for every image in a folder
    Batch {
        /// Path to folder containing images
        folder: PathBuf,

        /// Output file for results (JSON)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Number of parallel detections. 0 = auto (CPU count). Uses 4 if not specified.
        #[arg(long, short = 'j')]
        jobs: Option<usize>,

        /// Capturing source identifier applied to every record
        #[arg(long, short = 's')]
        source: Option<String>,

        /// Do not append results to the detection history
        #[arg(long)]
        no_store: bool,
    },

    /// Aggregate the detection history over a date range
    Report {
        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Last day of the range (YYYY-MM-DD). Defaults to --from.
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Also export the range's records as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Show recent detection history
    History {
        /// Limit number of entries shown
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set the specialized plate-engine command
        #[arg(long)]
        set_plate_engine: Option<String>,

        /// Set the general OCR fallback command
        #[arg(long)]
        set_ocr_engine: Option<String>,

        /// Set the confidence threshold (0.0-1.0)
        #[arg(long)]
        set_threshold: Option<f64>,

        /// Set the per-engine timeout in milliseconds
        #[arg(long)]
        set_timeout_ms: Option<u64>,

        /// Enable/disable preprocessing before the fallback engine
        #[arg(long)]
        set_preprocess: Option<bool>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}
