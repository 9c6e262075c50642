/// Line marking the end of the meta-header
pub const DEFAULT_SENTINEL: &str = "## Daily weather data";

/// Parsing defaults
pub const DEFAULT_DELIMITER: u8 = b',';
pub const DEFAULT_DATE_FORMAT: &str = "%Y%m%d";
pub const META_HEADER_TIMEOUT_SECS: u64 = 30;

/// Snow depth value meaning "not observed"
pub const NODATA_VALUE: f64 = -99.0;

/// Sunshine duration range (hours, exclusive) for IRRAD in sunshine mode
pub const SUNSHINE_MIN_HOURS: f64 = 0.0;
pub const SUNSHINE_MAX_HOURS: f64 = 24.0;

/// Cache naming
pub const PROVIDER_TYPE_NAME: &str = "CsvWeatherDataProvider";
pub const CACHE_EXTENSION: &str = "cache";
pub const CACHE_DIR_NAME: &str = "csv_weather";

/// Configuration
pub const CONFIG_FILE: &str = "csv-weather.toml";
pub const ENV_PREFIX: &str = "CSV_WEATHER";

/// Export defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
