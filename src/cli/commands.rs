use crate::cache::CacheManager;
use crate::cli::args::{Cli, Commands, LoadArgs};
use crate::meteo::EtModel;
use crate::provider::{CsvWeatherDataProvider, ProviderOptions};
use crate::settings::Settings;
use crate::utils::progress::ProgressReporter;
use crate::utils::generate_default_parquet_filename;
use crate::writers::ParquetWriter;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// One line of `load` output.
#[derive(Debug, Serialize)]
pub struct LoadSummary {
    pub file: String,
    pub station: String,
    pub country: String,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub observations: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub from_cache: bool,
    pub cache_file: Option<String>,
}

impl LoadSummary {
    pub fn from_provider(provider: &CsvWeatherDataProvider) -> Self {
        let report = provider.report();
        Self {
            file: provider.source().display().to_string(),
            station: provider.station().station.clone(),
            country: provider.station().country.clone(),
            first_date: provider.first_date(),
            last_date: provider.last_date(),
            observations: provider.len(),
            skipped: report.skipped(),
            duplicates: report.duplicate_dates,
            from_cache: report.from_cache,
            cache_file: provider.cache_path().map(|p| p.display().to_string()),
        }
    }

    fn line(&self) -> String {
        let span = match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => format!("{} to {}", first, last),
            _ => "no data".to_string(),
        };
        format!(
            "{} ({}, {}): {} days, {}, {} rows skipped{}",
            self.station,
            self.country,
            self.file,
            self.observations,
            span,
            self.skipped,
            if self.from_cache { " [cached]" } else { "" }
        )
    }
}

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let settings = Settings::load_from(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Load {
            files,
            options,
            json,
            report,
            max_workers,
        } => {
            let options = provider_options(&settings, &options)?;
            let progress =
                ProgressReporter::new(files.len() as u64, "Loading weather files...", cli.quiet || json);

            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(max_workers.max(1))
                .build()
                .context("Failed to build worker pool")?;

            let results: Vec<(PathBuf, crate::Result<CsvWeatherDataProvider>)> = pool.install(|| {
                files
                    .par_iter()
                    .map(|file| {
                        let result = CsvWeatherDataProvider::new(file, options.clone());
                        progress.increment(1);
                        (file.clone(), result)
                    })
                    .collect()
            });

            let mut providers = Vec::new();
            let mut failures = 0;
            for (file, result) in results {
                match result {
                    Ok(provider) => providers.push(provider),
                    Err(e) => {
                        failures += 1;
                        error!("Failed to load {}: {}", file.display(), e);
                    }
                }
            }
            progress.finish_with_message(&format!("Loaded {} of {} files", providers.len(), files.len()));

            let summaries: Vec<LoadSummary> =
                providers.iter().map(LoadSummary::from_provider).collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                for (provider, summary) in providers.iter().zip(&summaries) {
                    println!("{}", summary.line());
                    if report {
                        println!("{}", provider.report().summary());
                    }
                }
            }

            if providers.is_empty() && failures > 0 {
                bail!("No weather file could be loaded");
            }
        }

        Commands::Export {
            file,
            output_file,
            compression,
            options,
        } => {
            let writer = ParquetWriter::new().with_compression(&compression)?;
            let options = provider_options(&settings, &options)?;

            let progress = ProgressReporter::new_spinner("Loading weather file...", cli.quiet);
            let provider = CsvWeatherDataProvider::new(&file, options)
                .with_context(|| format!("Failed to load {}", file.display()))?;
            progress.finish_with_message(&format!(
                "Loaded {} observations for {}",
                provider.len(),
                provider.station().station
            ));

            let output_file =
                output_file.unwrap_or_else(|| generate_default_parquet_filename(&file));
            if let Some(parent) = output_file.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let written = writer.write_observations(
                provider.station(),
                provider.observations().iter(),
                &output_file,
            )?;
            println!("Wrote {} observations to {}", written, output_file.display());

            let file_info = writer.get_file_info(&output_file)?;
            println!("\n{}", file_info.summary());
        }

        Commands::Info { file, sample } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;
            println!("\n{}", file_info.summary());

            if sample > 0 {
                println!("\nSample Records (showing up to {}):", sample);
                for (i, obs) in writer.read_observations(&file, sample)?.iter().enumerate() {
                    println!(
                        "{}. {}: tmin={:.1}°C, tmax={:.1}°C, rain={:.2} cm, et0={:.3} cm",
                        i + 1,
                        obs.day,
                        obs.tmin,
                        obs.tmax,
                        obs.rain,
                        obs.et0
                    );
                }
            }
        }

        Commands::CachePath { file, cache_dir } => {
            let cache = CacheManager::new(cache_dir.unwrap_or(settings.cache_dir));
            let path = cache.cache_path(&file);
            let state = if cache.is_cache_valid(&file) {
                "fresh"
            } else if path.exists() {
                "stale"
            } else {
                "absent"
            };
            println!("{} ({})", path.display(), state);
        }
    }

    Ok(())
}

fn provider_options(settings: &Settings, args: &LoadArgs) -> Result<ProviderOptions> {
    let mut options = ProviderOptions::from_settings(settings)?
        .with_cache(!args.no_cache)
        .with_strict_headers(args.strict_headers);

    if let Some(delimiter) = args.delimiter {
        if !delimiter.is_ascii() {
            bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
        }
        options = options.with_delimiter(delimiter as u8);
    }
    if let Some(date_format) = &args.date_format {
        options = options.with_date_format(date_format.clone());
    }
    if let Some(et_model) = &args.et_model {
        options = options.with_et_model(et_model.parse::<EtModel>()?);
    }
    if let Some(cache_dir) = &args.cache_dir {
        options = options.with_cache_dir(cache_dir.clone());
    }

    Ok(options)
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .try_init()
        .context("Failed to initialise logging")?;

    Ok(())
}
