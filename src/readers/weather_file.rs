use crate::error::{ProviderError, Result, RowError};
use crate::meteo::{EtModel, MeteoFormulas};
use crate::models::{Radiation, StationMetadata, WeatherObservation};
use crate::processors::{DerivedQuantityCalculator, IngestReport};
use crate::provider::ProviderOptions;
use crate::readers::{HeaderTranslator, MetaHeaderParser, RecordParser};
use crate::store::TimeSeriesStore;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of parsing a weather file from scratch.
#[derive(Debug, Clone)]
pub struct ParsedWeatherFile {
    pub station: StationMetadata,
    pub store: TimeSeriesStore,
    pub report: IngestReport,
}

/// Reads a meta-header plus CSV weather file into a time series.
pub struct WeatherFileReader {
    delimiter: u8,
    date_format: String,
    et_model: EtModel,
    strict_headers: bool,
    meta_parser: MetaHeaderParser,
    formulas: Arc<dyn MeteoFormulas>,
}

impl WeatherFileReader {
    pub fn from_options(options: &ProviderOptions) -> Self {
        Self {
            delimiter: options.delimiter,
            date_format: options.date_format.clone(),
            et_model: options.et_model,
            strict_headers: options.strict_headers,
            meta_parser: MetaHeaderParser::new()
                .with_sentinel(options.sentinel.clone())
                .with_timeout(options.meta_header_timeout),
            formulas: options.formulas(),
        }
    }

    pub fn read(&self, path: &Path) -> Result<ParsedWeatherFile> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        self.read_from(reader)
    }

    pub fn read_from<R: BufRead>(&self, mut reader: R) -> Result<ParsedWeatherFile> {
        let meta = self.meta_parser.parse(&mut reader)?;
        let station = meta.station;
        let line_offset = meta.line_count as u64;
        debug!(
            "Meta-header for station '{}' ends at line {}",
            station.station, line_offset
        );

        let mut csv_reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let mut rows = csv_reader.records();

        let mut store = TimeSeriesStore::new();
        let mut report = IngestReport::new();

        let header = match rows.next() {
            Some(header) => header?,
            None => {
                warn!("No column header after the meta-header, file holds no observations");
                return Ok(ParsedWeatherFile {
                    station,
                    store,
                    report,
                });
            }
        };

        let mapping = HeaderTranslator::new()
            .with_strict(self.strict_headers)
            .translate(header.iter())?;
        for field in mapping.missing_required() {
            warn!("No column found for {}, every row will be skipped", field);
        }
        report.ignored_columns = mapping.ignored_columns().to_vec();

        let parser = RecordParser::new()
            .with_date_format(self.date_format.clone())
            .with_sunshine_mode(station.has_sunshine);
        let calculator =
            DerivedQuantityCalculator::new(self.formulas.as_ref(), &station, self.et_model);

        for result in rows {
            let row = match result {
                Ok(row) => row,
                Err(e) if e.is_io_error() => return Err(ProviderError::Csv(e)),
                Err(e) => {
                    report.data_rows += 1;
                    let line = line_offset + e.position().map_or(0, |p| p.line());
                    let error = RowError::Conversion {
                        field: "row",
                        value: String::new(),
                        reason: e.to_string(),
                    };
                    warn!("Failed reading row at line {}: {}. Skipping...", line, error);
                    report.record_skip(line, &error);
                    continue;
                }
            };
            let line = line_offset + row_line(&row);
            if row.iter().all(str::is_empty) {
                debug!("Skipping blank line {}", line);
                continue;
            }
            report.data_rows += 1;

            let raw = mapping.raw_record(&row);
            let outcome = parser.convert(&raw).and_then(|converted| {
                let from_sunshine = matches!(converted.irrad, Radiation::SunshineHours(_));
                calculator
                    .derive(converted)
                    .map(|derived| (derived, from_sunshine))
            });

            match outcome {
                Ok((derived, from_sunshine)) => {
                    if from_sunshine {
                        report.sunshine_rows += 1;
                    }
                    let day = derived.day;
                    if store
                        .insert(WeatherObservation::from_derived(derived, &station))
                        .is_some()
                    {
                        warn!("Duplicate date {} at line {}, keeping the later row", day, line);
                        report.record_duplicate();
                    }
                }
                Err(error) => {
                    warn!("Failed reading row at line {}: {}. Skipping...", line, error);
                    report.record_skip(line, &error);
                }
            }
        }

        report.stored = store.len();
        Ok(ParsedWeatherFile {
            station,
            store,
            report,
        })
    }
}

fn row_line(row: &StringRecord) -> u64 {
    row.position().map_or(0, |p| p.line())
}
