use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

/// Generate default Parquet filename with format: csv-weather-{stem}-{YYMMDD}.parquet
pub fn generate_default_parquet_filename(source: &Path) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("weather");

    let filename = format!(
        "csv-weather-{}-{:02}{:02}{:02}.parquet",
        stem, year, month, day
    );
    PathBuf::from("output").join(filename)
}
