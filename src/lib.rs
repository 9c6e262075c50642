//! Daily weather data from CSV files with a station meta-header.
//!
//! [`CsvWeatherDataProvider`] reads the station metadata block, maps the
//! column header onto canonical fields, converts every row to model units,
//! derives reference evapotranspiration and keeps the result in a
//! date-indexed [`TimeSeriesStore`]. Parsed files are cached as binary
//! snapshots keyed on the source file's modification time.

pub mod cache;
pub mod cli;
pub mod error;
pub mod meteo;
pub mod models;
pub mod processors;
pub mod provider;
pub mod readers;
pub mod settings;
pub mod store;
pub mod utils;
pub mod writers;

pub use error::{ProviderError, Result, RowError};
pub use meteo::EtModel;
pub use models::{StationMetadata, WeatherObservation};
pub use provider::{CsvWeatherDataProvider, ProviderOptions};
pub use store::TimeSeriesStore;
