//! Weather data provider backed by a CSV file with a station meta-header.
//!
//! All work happens in the constructor: the source is either restored from a
//! fresh cache snapshot or parsed row by row, after which the provider is an
//! immutable, date-indexed view of the observations.
//!
//! ```no_run
//! use csv_weather_provider::CsvWeatherDataProvider;
//! use chrono::NaiveDate;
//!
//! let provider = CsvWeatherDataProvider::open("nl1.csv")?;
//! let day = NaiveDate::from_ymd_opt(2006, 1, 1).unwrap();
//! if let Some(obs) = provider.get(day) {
//!     println!("ET0 on {}: {} cm/day", day, obs.et0);
//! }
//! # Ok::<(), csv_weather_provider::ProviderError>(())
//! ```

use crate::cache::{CacheManager, CacheSnapshot, ParseOptions};
use crate::error::{ProviderError, Result};
use crate::meteo::{EtModel, MeteoFormulas, StandardFormulas};
use crate::models::{StationMetadata, WeatherObservation};
use crate::processors::IngestReport;
use crate::readers::WeatherFileReader;
use crate::settings::Settings;
use crate::store::TimeSeriesStore;
use crate::utils::constants::{
    DEFAULT_DATE_FORMAT, DEFAULT_DELIMITER, DEFAULT_SENTINEL, META_HEADER_TIMEOUT_SECS,
};
use chrono::NaiveDate;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct ProviderOptions {
    pub delimiter: u8,
    pub date_format: String,
    pub et_model: EtModel,
    pub cache_dir: PathBuf,
    pub use_cache: bool,
    pub strict_headers: bool,
    pub sentinel: String,
    pub meta_header_timeout: Duration,
    formulas: Arc<dyn MeteoFormulas>,
}

impl ProviderOptions {
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            et_model: EtModel::default(),
            cache_dir: Settings::default_cache_dir(),
            use_cache: true,
            strict_headers: false,
            sentinel: DEFAULT_SENTINEL.to_string(),
            meta_header_timeout: Duration::from_secs(META_HEADER_TIMEOUT_SECS),
            formulas: Arc::new(StandardFormulas),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            delimiter: settings.delimiter_byte()?,
            date_format: settings.date_format.clone(),
            et_model: settings.et_model,
            cache_dir: settings.cache_dir.clone(),
            sentinel: settings.sentinel.clone(),
            meta_header_timeout: settings.meta_header_timeout(),
            ..Self::new()
        })
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    pub fn with_et_model(mut self, et_model: EtModel) -> Self {
        self.et_model = et_model;
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn with_strict_headers(mut self, strict_headers: bool) -> Self {
        self.strict_headers = strict_headers;
        self
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn with_meta_header_timeout(mut self, timeout: Duration) -> Self {
        self.meta_header_timeout = timeout;
        self
    }

    /// Replace the radiation and evapotranspiration formulas.
    pub fn with_formulas(mut self, formulas: Arc<dyn MeteoFormulas>) -> Self {
        self.formulas = formulas;
        self
    }

    pub fn formulas(&self) -> Arc<dyn MeteoFormulas> {
        Arc::clone(&self.formulas)
    }
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProviderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderOptions")
            .field("delimiter", &(self.delimiter as char))
            .field("date_format", &self.date_format)
            .field("et_model", &self.et_model)
            .field("cache_dir", &self.cache_dir)
            .field("use_cache", &self.use_cache)
            .field("strict_headers", &self.strict_headers)
            .field("sentinel", &self.sentinel)
            .field("meta_header_timeout", &self.meta_header_timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct CsvWeatherDataProvider {
    source: PathBuf,
    station: StationMetadata,
    store: TimeSeriesStore,
    report: IngestReport,
    et_model: EtModel,
    cache_path: Option<PathBuf>,
}

impl CsvWeatherDataProvider {
    /// Load with options from [`Settings::load`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let settings = Settings::load()?;
        Self::new(path, ProviderOptions::from_settings(&settings)?)
    }

    pub fn new(path: impl AsRef<Path>, options: ProviderOptions) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ProviderError::SourceNotFound(path.to_path_buf()));
        }
        let source = path.canonicalize()?;

        let cache = options
            .use_cache
            .then(|| CacheManager::new(&options.cache_dir));

        let parse_options = ParseOptions::from_options(&options);
        if let Some(cache) = &cache {
            if let Some(snapshot) = cache.load_valid(&source, &parse_options) {
                info!(
                    "Loaded {} observations for '{}' from cache {}",
                    snapshot.observations.len(),
                    snapshot.station.station,
                    cache.cache_path(&source).display()
                );
                let store: TimeSeriesStore = snapshot.observations.into_iter().collect();
                return Ok(Self {
                    report: IngestReport::cached(store.len()),
                    cache_path: Some(cache.cache_path(&source)),
                    source,
                    station: snapshot.station,
                    store,
                    et_model: options.et_model,
                });
            }
        }

        let parsed = WeatherFileReader::from_options(&options).read(&source)?;
        info!(
            "Read {} of {} rows for '{}' from {}",
            parsed.report.stored,
            parsed.report.data_rows,
            parsed.station.station,
            source.display()
        );

        let cache_path = cache.and_then(|cache| {
            let snapshot = CacheSnapshot {
                options: parse_options,
                station: parsed.station.clone(),
                observations: parsed.store.to_vec(),
            };
            cache.save_or_warn(&source, &snapshot)
        });

        Ok(Self {
            source,
            station: parsed.station,
            store: parsed.store,
            report: parsed.report,
            et_model: options.et_model,
            cache_path,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn station(&self) -> &StationMetadata {
        &self.station
    }

    /// Multi-line description of the data source.
    pub fn description(&self) -> Vec<String> {
        let mut lines = self.station.description_lines();
        lines.push(format!("Data file: {}", self.source.display()));
        lines
    }

    pub fn observations(&self) -> &TimeSeriesStore {
        &self.store
    }

    pub fn get(&self, day: NaiveDate) -> Option<&WeatherObservation> {
        self.store.get(day)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.store.first_date()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.store.last_date()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn report(&self) -> &IngestReport {
        &self.report
    }

    pub fn loaded_from_cache(&self) -> bool {
        self.report.from_cache
    }

    pub fn et_model(&self) -> EtModel {
        self.et_model
    }

    /// Cache file backing this provider, when caching is on and the
    /// snapshot was read or written successfully.
    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }
}
