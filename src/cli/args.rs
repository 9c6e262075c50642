use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "csv-weather")]
#[command(about = "Load daily weather CSV files with station meta-headers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Suppress progress output")]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        help = "Settings file [default: csv-weather.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

/// Parsing options shared by commands that load weather files.
#[derive(clap::Args, Debug, Clone)]
pub struct LoadArgs {
    #[arg(long, help = "Ignore and do not write cache files")]
    pub no_cache: bool,

    #[arg(long, help = "Single-character field delimiter")]
    pub delimiter: Option<char>,

    #[arg(long, help = "chrono format of the date column, e.g. %Y-%m-%d")]
    pub date_format: Option<String>,

    #[arg(long, help = "Reference ET model: PM (Penman-Monteith) or P (Penman)")]
    pub et_model: Option<String>,

    #[arg(long, help = "Override the cache directory")]
    pub cache_dir: Option<PathBuf>,

    #[arg(long, help = "Fail when two columns map to the same field")]
    pub strict_headers: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load one or more weather files and summarise them
    Load {
        #[arg(required = true, help = "Weather CSV files")]
        files: Vec<PathBuf>,

        #[command(flatten)]
        options: LoadArgs,

        #[arg(long, help = "Print summaries as JSON")]
        json: bool,

        #[arg(long, help = "Print the full ingest report per file")]
        report: bool,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Load a weather file and write its observations to Parquet
    Export {
        #[arg(help = "Weather CSV file")]
        file: PathBuf,

        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: output/csv-weather-{stem}-{YYMMDD}.parquet]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, default_value = "snappy")]
        compression: String,

        #[command(flatten)]
        options: LoadArgs,
    },

    /// Display information about a Parquet export
    Info {
        #[arg(help = "Parquet file")]
        file: PathBuf,

        #[arg(short, long, default_value = "5")]
        sample: usize,
    },

    /// Print the cache file used for a weather file
    CachePath {
        #[arg(help = "Weather CSV file")]
        file: PathBuf,

        #[arg(long, help = "Override the cache directory")]
        cache_dir: Option<PathBuf>,
    },
}
