use chrono::NaiveDate;
use csv_weather_provider::error::RowErrorKind;
use csv_weather_provider::meteo::{
    angstrom, EtInput, EtModel, MeteoError, MeteoFormulas, ReferenceEt, StandardFormulas,
};
use csv_weather_provider::writers::ParquetWriter;
use csv_weather_provider::{CsvWeatherDataProvider, ProviderError, ProviderOptions};
use pretty_assertions::assert_eq;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const HEADER_ROW: &str = "DAY,IRRAD,TMIN,TMAX,VAP,WIND,RAIN,SNOWDEPTH";

fn meta_header(has_sunshine: bool) -> String {
    format!(
        "## Site Characteristics\n\
         Country = 'Netherlands'\n\
         Station = 'Test station'\n\
         Description = 'Synthetic data for tests'\n\
         Source = 'Unit tests'\n\
         Contact = 'nobody'\n\
         Longitude = 5.0; Latitude = 52.0; Elevation = 10.0\n\
         AngstromA = 0.25; AngstromB = 0.5; HasSunshine = {}\n\
         ## Daily weather data\n",
        if has_sunshine { "True" } else { "False" }
    )
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    fn options(&self) -> ProviderOptions {
        ProviderOptions::new().with_cache_dir(self.cache_dir())
    }

    /// Write a weather file whose mtime lies in the past, so a cache written
    /// afterwards is strictly newer.
    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        set_mtime(&path, SystemTime::now() - Duration::from_secs(60));
        path
    }

    fn weather_file(&self, name: &str, rows: &[&str]) -> PathBuf {
        let mut contents = meta_header(false);
        contents.push_str(HEADER_ROW);
        contents.push('\n');
        for row in rows {
            contents.push_str(row);
            contents.push('\n');
        }
        self.write(name, &contents)
    }
}

fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const ROWS: [&str; 3] = [
    "20100101,5000,2.0,10.0,1.0,3.0,0.0,",
    "20100102,6000,1.0,8.0,1.2,2.0,5.0,10",
    "20100103,4000,-1.0,4.0,0.8,4.5,1.0,-99",
];

#[test]
fn test_sunshine_hours_row() {
    let fixture = Fixture::new();
    let mut contents = meta_header(true);
    contents.push_str("DAY,IRRAD,TMIN,TMAX,VAP,WIND,RAIN\n");
    contents.push_str("20100101,8.5,2.0,10.0,1.0,3.0,0.0\n");
    let path = fixture.write("sunshine.csv", &contents);

    let provider = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();

    assert_eq!(provider.len(), 1);
    let obs = provider.get(date(2010, 1, 1)).unwrap();
    let expected = angstrom(date(2010, 1, 1), 52.0, 8.5, 0.25, 0.5).unwrap();
    assert_eq!(obs.irrad, expected);
    assert!(obs.irrad > 0.0);
    assert!(obs.e0 > 0.0);
    assert!(obs.es0 > 0.0);
    assert!(obs.et0 > 0.0);
    assert_eq!(obs.snow_depth, None);
    assert_eq!(provider.report().sunshine_rows, 1);
}

#[test]
fn test_units_and_location() {
    let fixture = Fixture::new();
    let path = fixture.weather_file("units.csv", &ROWS);

    let provider = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();
    let obs = provider.get(date(2010, 1, 2)).unwrap();

    assert_eq!(obs.irrad, 6_000_000.0);
    assert_eq!(obs.rain, 0.5);
    assert_eq!(obs.snow_depth, Some(10.0));
    assert_eq!(obs.latitude, 52.0);
    assert_eq!(obs.longitude, 5.0);
    assert_eq!(obs.elevation, 10.0);
    assert_eq!(provider.get(date(2010, 1, 3)).unwrap().snow_depth, None);
    assert_eq!(provider.first_date(), Some(date(2010, 1, 1)));
    assert_eq!(provider.last_date(), Some(date(2010, 1, 3)));
}

#[test]
fn test_bad_date_row_is_skipped() {
    let fixture = Fixture::new();
    let path = fixture.weather_file(
        "baddate.csv",
        &[ROWS[0], "notadate,5000,2.0,10.0,1.0,3.0,0.0,", ROWS[2]],
    );

    let provider = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();

    assert_eq!(provider.len(), 2);
    assert!(provider.get(date(2010, 1, 3)).is_some());
    let report = provider.report();
    assert_eq!(report.data_rows, 3);
    assert_eq!(report.conversion_errors, 1);
    assert_eq!(report.skipped_rows[0].kind, RowErrorKind::Conversion);
    // Meta-header (9 lines) + header row + first data row
    assert_eq!(report.skipped_rows[0].line, 12);
}

#[test]
fn test_missing_values_drop_rows() {
    let fixture = Fixture::new();
    let path = fixture.weather_file(
        "missing.csv",
        &[
            ROWS[0],
            "20100102,6000,NaN,8.0,1.2,2.0,5.0,",
            "20100103,4000,-1.0,4.0,,4.5,1.0,",
            "20100104,4000,-1.0,4.0,0.8",
        ],
    );

    let provider = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();

    assert_eq!(provider.len(), 1);
    assert_eq!(provider.report().missing_data, 3);
    // stored + skipped == data rows
    assert_eq!(
        provider.report().stored + provider.report().skipped(),
        provider.report().data_rows
    );
}

#[test]
fn test_snowdepth_column_is_optional() {
    let fixture = Fixture::new();
    let mut contents = meta_header(false);
    contents.push_str("w_date;srad;tmin;tmax;vprs_tx;wind;rain;station_id\n");
    contents.push_str("01-01-2010;5000;2.0;10.0;1.0;3.0;0.0;NL1\n");
    let path = fixture.write("aliases.csv", &contents);

    let options = fixture
        .options()
        .with_delimiter(b';')
        .with_date_format("%d-%m-%Y");
    let provider = CsvWeatherDataProvider::new(&path, options).unwrap();

    assert_eq!(provider.len(), 1);
    assert_eq!(provider.get(date(2010, 1, 1)).unwrap().snow_depth, None);
    assert_eq!(provider.report().ignored_columns, vec!["station_id".to_string()]);
}

#[test]
fn test_cache_round_trip() {
    let fixture = Fixture::new();
    let path = fixture.weather_file("cached.csv", &ROWS);

    let first = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();
    assert!(!first.loaded_from_cache());
    let cache_path = first.cache_path().unwrap().to_path_buf();
    assert_eq!(
        cache_path,
        fixture.cache_dir().join("CsvWeatherDataProvider_cached.cache")
    );
    assert!(cache_path.exists());

    let second = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();
    assert!(second.loaded_from_cache());
    assert_eq!(second.station(), first.station());
    assert_eq!(second.observations(), first.observations());
}

#[test]
fn test_modified_source_invalidates_cache() {
    let fixture = Fixture::new();
    let path = fixture.weather_file("stale.csv", &ROWS[..2]);

    let first = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();
    assert_eq!(first.len(), 2);

    let mut contents = fs::read_to_string(&path).unwrap();
    contents.push_str(ROWS[2]);
    contents.push('\n');
    fs::write(&path, contents).unwrap();
    set_mtime(&path, SystemTime::now() + Duration::from_secs(10));

    let second = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();
    assert!(!second.loaded_from_cache());
    assert_eq!(second.len(), 3);
}

#[test]
fn test_cache_disabled() {
    let fixture = Fixture::new();
    let path = fixture.weather_file("nocache.csv", &ROWS);

    let provider = CsvWeatherDataProvider::new(&path, fixture.options().with_cache(false)).unwrap();
    assert!(provider.cache_path().is_none());
    assert!(!fixture.cache_dir().exists());
}

#[test]
fn test_cache_built_with_other_et_model_is_ignored() {
    let fixture = Fixture::new();
    let path = fixture.weather_file("models.csv", &ROWS);

    let penman =
        CsvWeatherDataProvider::new(&path, fixture.options().with_et_model(EtModel::Penman))
            .unwrap();
    let monteith = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();

    assert!(!monteith.loaded_from_cache());
    assert_eq!(monteith.et_model(), EtModel::PenmanMonteith);
    let day = date(2010, 1, 1);
    assert_eq!(penman.get(day).unwrap().e0, monteith.get(day).unwrap().e0);
}

#[test]
fn test_idempotent() {
    let fixture = Fixture::new();
    let path = fixture.weather_file("repeat.csv", &ROWS);
    let options = fixture.options().with_cache(false);

    let first = CsvWeatherDataProvider::new(&path, options.clone()).unwrap();
    let second = CsvWeatherDataProvider::new(&path, options).unwrap();
    assert_eq!(first.observations(), second.observations());
}

#[test]
fn test_duplicate_dates_keep_last_row() {
    let fixture = Fixture::new();
    let path = fixture.weather_file(
        "duplicates.csv",
        &[ROWS[0], "20100101,5000,3.0,12.0,1.0,3.0,0.0,"],
    );

    let provider = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();
    assert_eq!(provider.len(), 1);
    assert_eq!(provider.get(date(2010, 1, 1)).unwrap().tmax, 12.0);
    assert_eq!(provider.report().duplicate_dates, 1);
}

#[test]
fn test_strict_headers() {
    let fixture = Fixture::new();
    let mut contents = meta_header(false);
    contents.push_str("DAY,IRRAD,tmin,TMIN,TMAX,VAP,WIND,RAIN\n");
    contents.push_str("20100101,5000,1.0,2.0,10.0,1.0,3.0,0.0\n");
    let path = fixture.write("ambiguous.csv", &contents);

    let lenient = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();
    assert_eq!(lenient.get(date(2010, 1, 1)).unwrap().tmin, 2.0);

    let strict = CsvWeatherDataProvider::new(&path, fixture.options().with_strict_headers(true));
    assert!(matches!(strict, Err(ProviderError::AmbiguousHeader { .. })));
}

#[test]
fn test_code_in_meta_header_is_rejected() {
    let fixture = Fixture::new();
    let contents = meta_header(false).replace(
        "Contact = 'nobody'",
        "Contact = open('/etc/passwd').read()",
    ) + HEADER_ROW;
    let path = fixture.write("inject.csv", &contents);

    assert!(matches!(
        CsvWeatherDataProvider::new(&path, fixture.options()),
        Err(ProviderError::InvalidMetaHeader { line: 6, .. })
    ));
}

#[test]
fn test_missing_metadata_key() {
    let fixture = Fixture::new();
    let contents = meta_header(false).replace("Elevation = 10.0", "") + HEADER_ROW;
    let path = fixture.write("nokey.csv", &contents);

    assert!(matches!(
        CsvWeatherDataProvider::new(&path, fixture.options()),
        Err(ProviderError::MissingMetadataKey("Elevation"))
    ));
}

#[test]
fn test_angstrom_out_of_range() {
    let fixture = Fixture::new();
    let contents = meta_header(false).replace("AngstromB = 0.5", "AngstromB = 0.9") + HEADER_ROW;
    let path = fixture.write("angstrom.csv", &contents);

    assert!(matches!(
        CsvWeatherDataProvider::new(&path, fixture.options()),
        Err(ProviderError::OutOfRange(_))
    ));
}

#[test]
fn test_missing_sentinel() {
    let fixture = Fixture::new();
    let contents = meta_header(false).replace("## Daily weather data\n", "");
    let path = fixture.write("nosentinel.csv", &contents);

    assert!(matches!(
        CsvWeatherDataProvider::new(&path, fixture.options()),
        Err(ProviderError::SentinelNotFound(_))
    ));
}

#[test]
fn test_source_not_found() {
    let fixture = Fixture::new();
    let result = CsvWeatherDataProvider::new(fixture.dir.path().join("nope.csv"), fixture.options());
    assert!(matches!(result, Err(ProviderError::SourceNotFound(_))));
}

#[test]
fn test_header_only_file() {
    let fixture = Fixture::new();
    let path = fixture.weather_file("empty.csv", &[]);

    let provider = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();
    assert!(provider.is_empty());
    assert_eq!(provider.report().data_rows, 0);
}

/// Standard formulas, except that evapotranspiration fails on 2010-01-01.
struct DryDayFailure;

impl MeteoFormulas for DryDayFailure {
    fn angstrom(&self, day: NaiveDate, lat: f64, hours: f64, a: f64, b: f64) -> Result<f64, MeteoError> {
        StandardFormulas.angstrom(day, lat, hours, a, b)
    }

    fn reference_et(&self, input: &EtInput, model: EtModel) -> Result<ReferenceEt, MeteoError> {
        if input.day == NaiveDate::from_ymd_opt(2010, 1, 1).unwrap() {
            Err(MeteoError::NonFinite("reference_et"))
        } else {
            StandardFormulas.reference_et(input, model)
        }
    }
}

#[test]
fn test_derived_quantity_failure_skips_row() {
    let fixture = Fixture::new();
    let path = fixture.weather_file("derived.csv", &ROWS);

    let options = fixture.options().with_formulas(Arc::new(DryDayFailure));
    let provider = CsvWeatherDataProvider::new(&path, options).unwrap();

    assert_eq!(provider.len(), 2);
    assert!(provider.get(date(2010, 1, 1)).is_none());
    assert_eq!(provider.report().derived_errors, 1);
}

#[test]
fn test_parquet_export() {
    let fixture = Fixture::new();
    let path = fixture.weather_file("export.csv", &ROWS);
    let provider = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();

    let output_path = fixture.dir.path().join("export.parquet");
    let writer = ParquetWriter::new().with_compression("zstd").unwrap();
    let written = writer
        .write_observations(provider.station(), provider.observations().iter(), &output_path)
        .unwrap();
    assert_eq!(written, 3);

    let file_info = writer.get_file_info(&output_path).unwrap();
    assert_eq!(file_info.total_rows, 3);

    let read = writer.read_observations(&output_path, 10).unwrap();
    assert_eq!(read, provider.observations().to_vec());
}

#[test]
fn test_unwritable_cache_dir_keeps_provider_usable() {
    let fixture = Fixture::new();
    let path = fixture.weather_file("readonly.csv", &ROWS);
    let blocker = fixture.dir.path().join("not-a-dir");
    fs::write(&blocker, "file").unwrap();

    let provider =
        CsvWeatherDataProvider::new(&path, ProviderOptions::new().with_cache_dir(blocker.join("cache")))
            .unwrap();

    assert!(provider.cache_path().is_none());
    assert!(!provider.loaded_from_cache());
    assert_eq!(provider.len(), ROWS.len());
}

#[test]
fn test_meta_header_timeout_aborts_construction() {
    let fixture = Fixture::new();
    let path = fixture.weather_file("slow.csv", &ROWS);

    let result = CsvWeatherDataProvider::new(
        &path,
        fixture.options().with_meta_header_timeout(Duration::ZERO),
    );
    assert!(matches!(result, Err(ProviderError::MetaHeaderTimeout(_))));
    assert!(!fixture.cache_dir().exists());
}

#[test]
fn test_blank_lines_are_not_data_rows() {
    let fixture = Fixture::new();
    let path = fixture.weather_file("blank.csv", &[ROWS[0], "   ", ROWS[1], " , ,", ROWS[2]]);

    let provider = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();
    let report = provider.report();

    assert_eq!(provider.len(), 3);
    assert_eq!(report.data_rows, 3);
    assert_eq!(report.skipped(), 0);
}

#[test]
fn test_cache_built_with_other_delimiter_is_ignored() {
    let fixture = Fixture::new();
    let path = fixture.weather_file("delimiter.csv", &ROWS);

    let wrong =
        CsvWeatherDataProvider::new(&path, fixture.options().with_delimiter(b';')).unwrap();
    assert!(wrong.is_empty());
    assert!(wrong.cache_path().is_some());

    let right = CsvWeatherDataProvider::new(&path, fixture.options()).unwrap();
    assert!(!right.loaded_from_cache());
    assert_eq!(right.len(), 3);
}
