use crate::error::{ProviderError, Result};
use crate::meteo::EtModel;
use crate::utils::constants::{
    CACHE_DIR_NAME, CONFIG_FILE, DEFAULT_DATE_FORMAT, DEFAULT_SENTINEL, ENV_PREFIX,
    META_HEADER_TIMEOUT_SECS,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime settings, layered as defaults, then `csv-weather.toml` (or an
/// explicit file), then `CSV_WEATHER_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub cache_dir: PathBuf,
    pub meta_header_timeout_secs: u64,
    pub sentinel: String,
    pub delimiter: String,
    pub date_format: String,
    pub et_model: EtModel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: Self::default_cache_dir(),
            meta_header_timeout_secs: META_HEADER_TIMEOUT_SECS,
            sentinel: DEFAULT_SENTINEL.to_string(),
            delimiter: ",".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            et_model: EtModel::default(),
        }
    }
}

impl Settings {
    /// Load using `csv-weather.toml` in the working directory when present.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load with `path` as a required settings file, or the optional default
    /// file when `None`.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let builder = Config::builder()
            .set_default("cache_dir", defaults.cache_dir.to_string_lossy().to_string())?
            .set_default(
                "meta_header_timeout_secs",
                defaults.meta_header_timeout_secs as i64,
            )?
            .set_default("sentinel", defaults.sentinel)?
            .set_default("delimiter", defaults.delimiter)?
            .set_default("date_format", defaults.date_format)?
            .set_default("et_model", defaults.et_model.code())?;

        let builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name(CONFIG_FILE).required(false)),
        };

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.delimiter_byte()?;
        Ok(settings)
    }

    /// Platform cache directory, or the temp directory when there is none.
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(CACHE_DIR_NAME)
    }

    /// The delimiter must be a single ASCII character.
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(ProviderError::Config(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            ))),
        }
    }

    pub fn meta_header_timeout(&self) -> Duration {
        Duration::from_secs(self.meta_header_timeout_secs)
    }
}
