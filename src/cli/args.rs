use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::EndpointKind;

#[derive(Parser)]
#[command(name = "izbori-scraper")]
#[command(about = "Polling-station results scraper with CSV export")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Settings file [default: izbori.toml when present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a range of polling stations and export one CSV row per station
    Scrape {
        #[arg(short, long, help = "First polling station ID (inclusive)")]
        start_id: u32,

        #[arg(short, long, help = "Last polling station ID (inclusive)")]
        end_id: u32,

        #[arg(short, long, help = "Election snapshot identifier")]
        result_key: Option<String>,

        #[arg(long, value_enum, default_value = "candidates")]
        endpoint: EndpointKind,

        #[arg(
            short,
            long,
            help = "Output CSV file path [default: output/polling-stations-{YYMMDD}.csv]"
        )]
        output_file: Option<PathBuf>,

        #[arg(long, help = "Concurrent requests [default: CPU count]")]
        max_workers: Option<usize>,

        #[arg(long, help = "Report progress in station order")]
        ordered: bool,

        #[arg(long, help = "Per-request timeout in seconds [default: 10]")]
        timeout_secs: Option<u64>,

        #[arg(long, help = "Print each raw response (truncated)")]
        show_raw: bool,

        #[arg(short, long, help = "Hide the progress bar and per-station lines")]
        quiet: bool,
    },

    /// Parse a saved response file and print the record as JSON
    Parse {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long, value_enum, default_value = "candidates")]
        endpoint: EndpointKind,
    },

    /// Display information about an exported CSV file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}
