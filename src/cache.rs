//! Binary snapshot cache of parsed weather files.
//!
//! There is one snapshot per source file stem. It is considered fresh when
//! its modification time is strictly newer than that of the source file.
//! A snapshot also records the options that shaped the parse. Loading with
//! different options is a miss. Every failure here is recoverable: callers
//! fall back to parsing the source.

use crate::error::CacheError;
use crate::meteo::EtModel;
use crate::models::{StationMetadata, WeatherObservation};
use crate::provider::ProviderOptions;
use crate::utils::constants::{CACHE_EXTENSION, PROVIDER_TYPE_NAME};
use bincode::config::{Configuration, Fixint, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// Options that change what parsing a file produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    pub et_model: EtModel,
    pub delimiter: u8,
    pub date_format: String,
    pub sentinel: String,
    pub strict_headers: bool,
}

impl ParseOptions {
    pub fn from_options(options: &ProviderOptions) -> Self {
        Self {
            et_model: options.et_model,
            delimiter: options.delimiter,
            date_format: options.date_format.clone(),
            sentinel: options.sentinel.clone(),
            strict_headers: options.strict_headers,
        }
    }
}

/// Everything needed to rebuild a provider without touching the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub options: ParseOptions,
    pub station: StationMetadata,
    pub observations: Vec<WeatherObservation>,
}

#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// `<cache_dir>/CsvWeatherDataProvider_<stem>.cache`
    pub fn cache_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        self.cache_dir
            .join(format!("{}_{}.{}", PROVIDER_TYPE_NAME, stem, CACHE_EXTENSION))
    }

    /// True when a snapshot exists and is strictly newer than `source`.
    pub fn is_cache_valid(&self, source: &Path) -> bool {
        let cache_path = self.cache_path(source);
        match (modified(&cache_path), modified(source)) {
            (Some(cache_time), Some(source_time)) => cache_time > source_time,
            _ => false,
        }
    }

    pub fn load(&self, cache_path: &Path) -> Result<CacheSnapshot, CacheError> {
        let bytes =
            fs::read(cache_path).map_err(|e| CacheError::Read(cache_path.to_path_buf(), e))?;
        let (snapshot, _) = bincode::serde::decode_from_slice::<CacheSnapshot, _>(
            &bytes,
            BINCODE_CONFIG,
        )
        .map_err(|e| CacheError::Decode(cache_path.to_path_buf(), Box::from(e)))?;
        Ok(snapshot)
    }

    /// Load the snapshot for `source` if it is fresh, decodes, and was built
    /// with the same `options`. Any other outcome is a miss.
    pub fn load_valid(&self, source: &Path, options: &ParseOptions) -> Option<CacheSnapshot> {
        if !self.is_cache_valid(source) {
            debug!("No fresh cache for {}", source.display());
            return None;
        }

        let cache_path = self.cache_path(source);
        let result = self.load(&cache_path).and_then(|snapshot| {
            if snapshot.options.et_model != options.et_model {
                Err(CacheError::ModelMismatch {
                    path: cache_path.clone(),
                    expected: options.et_model.to_string(),
                    found: snapshot.options.et_model.to_string(),
                })
            } else if snapshot.options != *options {
                Err(CacheError::OptionsMismatch(cache_path.clone()))
            } else {
                Ok(snapshot)
            }
        });

        match result {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!("Ignoring cache: {}", e);
                None
            }
        }
    }

    /// Write the snapshot for `source`. The file is written to a temporary
    /// path in the cache directory and renamed into place.
    pub fn save(&self, source: &Path, snapshot: &CacheSnapshot) -> Result<PathBuf, CacheError> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| CacheError::DirCreation(self.cache_dir.clone(), e))?;

        let cache_path = self.cache_path(source);
        let bytes = bincode::serde::encode_to_vec(snapshot, BINCODE_CONFIG)
            .map_err(|e| CacheError::Encode(Box::from(e)))?;

        let mut tmp = NamedTempFile::new_in(&self.cache_dir)
            .map_err(|e| CacheError::Write(cache_path.clone(), e))?;
        tmp.write_all(&bytes)
            .map_err(|e| CacheError::Write(cache_path.clone(), e))?;
        tmp.persist(&cache_path)
            .map_err(|e| CacheError::Write(cache_path.clone(), e.error))?;

        debug!(
            "Wrote {} observations to cache {}",
            snapshot.observations.len(),
            cache_path.display()
        );
        Ok(cache_path)
    }

    /// Like [`CacheManager::save`] but only logs failures.
    pub fn save_or_warn(&self, source: &Path, snapshot: &CacheSnapshot) -> Option<PathBuf> {
        match self.save(source, snapshot) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to write cache file: {}", e);
                None
            }
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
