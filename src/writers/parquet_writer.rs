use crate::error::{ProviderError, Result};
use crate::models::{StationMetadata, WeatherObservation};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// `NaiveDate::num_days_from_ce` of 1970-01-01, the Date32 epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProviderError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write observations of one station, one row group per
    /// `row_group_size` days.
    pub fn write_observations<'a, I>(
        &self,
        station: &StationMetadata,
        observations: I,
        path: &Path,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = &'a WeatherObservation>,
    {
        let observations: Vec<&WeatherObservation> = observations.into_iter().collect();
        let schema = Self::create_schema();

        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        for chunk in observations.chunks(self.row_group_size.max(1)) {
            let batch = Self::observations_to_batch(station, chunk, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        Ok(observations.len())
    }

    fn create_schema() -> Arc<Schema> {
        let fields = vec![
            Field::new("date", DataType::Date32, false),
            Field::new("station", DataType::Utf8, false),
            Field::new("latitude", DataType::Float64, false),
            Field::new("longitude", DataType::Float64, false),
            Field::new("elevation", DataType::Float64, false),
            Field::new("irrad", DataType::Float64, false),
            Field::new("tmin", DataType::Float64, false),
            Field::new("tmax", DataType::Float64, false),
            Field::new("vap", DataType::Float64, false),
            Field::new("wind", DataType::Float64, false),
            Field::new("rain", DataType::Float64, false),
            Field::new("snowdepth", DataType::Float64, true),
            Field::new("e0", DataType::Float64, false),
            Field::new("es0", DataType::Float64, false),
            Field::new("et0", DataType::Float64, false),
        ];

        Arc::new(Schema::new(fields))
    }

    fn observations_to_batch(
        station: &StationMetadata,
        observations: &[&WeatherObservation],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let column = |value: fn(&WeatherObservation) -> f64| -> ArrayRef {
            Arc::new(Float64Array::from(
                observations.iter().map(|&o| value(o)).collect::<Vec<f64>>(),
            ))
        };

        let dates: Vec<i32> = observations
            .iter()
            .map(|o| o.day.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
            .collect();
        let stations: Vec<&str> = observations
            .iter()
            .map(|_| station.station.as_str())
            .collect();
        let snow_depths: Vec<Option<f64>> = observations.iter().map(|o| o.snow_depth).collect();

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Date32Array::from(dates)),
                Arc::new(StringArray::from(stations)),
                column(|o| o.latitude),
                column(|o| o.longitude),
                column(|o| o.elevation),
                column(|o| o.irrad),
                column(|o| o.tmin),
                column(|o| o.tmax),
                column(|o| o.vap),
                column(|o| o.wind),
                column(|o| o.rain),
                Arc::new(Float64Array::from(snow_depths)),
                column(|o| o.e0),
                column(|o| o.es0),
                column(|o| o.et0),
            ],
        )?;

        Ok(batch)
    }

    /// Read back up to `limit` observations.
    pub fn read_observations(&self, path: &Path, limit: usize) -> Result<Vec<WeatherObservation>> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(limit.clamp(1, 8192))
            .build()?;

        let mut observations = Vec::new();
        for batch_result in reader {
            let batch = batch_result?;
            let dates = typed_column::<Date32Array>(&batch, "date")?;
            let float = |name: &str| typed_column::<Float64Array>(&batch, name);
            let (latitude, longitude, elevation) =
                (float("latitude")?, float("longitude")?, float("elevation")?);
            let (irrad, tmin, tmax) = (float("irrad")?, float("tmin")?, float("tmax")?);
            let (vap, wind, rain) = (float("vap")?, float("wind")?, float("rain")?);
            let snowdepth = float("snowdepth")?;
            let (e0, es0, et0) = (float("e0")?, float("es0")?, float("et0")?);

            for i in 0..batch.num_rows() {
                if observations.len() >= limit {
                    return Ok(observations);
                }
                let day = NaiveDate::from_num_days_from_ce_opt(
                    dates.value(i) + UNIX_EPOCH_DAYS_FROM_CE,
                )
                .ok_or_else(|| {
                    ProviderError::Config("Invalid date in Parquet file".to_string())
                })?;

                observations.push(WeatherObservation {
                    day,
                    latitude: latitude.value(i),
                    longitude: longitude.value(i),
                    elevation: elevation.value(i),
                    irrad: irrad.value(i),
                    tmin: tmin.value(i),
                    tmax: tmax.value(i),
                    vap: vap.value(i),
                    wind: wind.value(i),
                    rain: rain.value(i),
                    snow_depth: snowdepth.is_valid(i).then(|| snowdepth.value(i)),
                    e0: e0.value(i),
                    es0: es0.value(i),
                    et0: et0.value(i),
                });
            }
        }

        Ok(observations)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();
        let compression = if row_groups > 0 && metadata.row_group(0).num_columns() > 0 {
            metadata.row_group(0).column(0).compression()
        } else {
            self.compression
        };

        Ok(ParquetFileInfo {
            total_rows: metadata.file_metadata().num_rows(),
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size: std::fs::metadata(path)?.len(),
            compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn typed_column<'b, T: 'static>(batch: &'b RecordBatch, name: &str) -> Result<&'b T> {
    batch
        .column_by_name(name)
        .and_then(|column| column.as_any().downcast_ref::<T>())
        .ok_or_else(|| ProviderError::Config(format!("Invalid {} column in Parquet file", name)))
}

#[derive(Debug, Clone)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
            self.total_rows as f64 / self.row_groups.max(1) as f64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::station::sample_station;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn observations(count: u32) -> Vec<WeatherObservation> {
        (0..count)
            .map(|i| WeatherObservation {
                day: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + chrono::Days::new(i as u64),
                latitude: 51.97,
                longitude: 5.67,
                elevation: 7.0,
                irrad: 5e6,
                tmin: 2.0,
                tmax: 10.0 + i as f64,
                vap: 1.0,
                wind: 3.0,
                rain: 0.5,
                snow_depth: if i % 2 == 0 { None } else { Some(3.0) },
                e0: 0.07,
                es0: 0.05,
                et0: 0.2,
            })
            .collect()
    }

    #[test]
    fn test_unsupported_compression() {
        assert!(ParquetWriter::new().with_compression("brotli2").is_err());
        assert!(ParquetWriter::new().with_compression("ZSTD").is_ok());
    }

    #[test]
    fn test_write_and_read_back() -> Result<()> {
        let writer = ParquetWriter::new().with_row_group_size(4);
        let temp_file = NamedTempFile::new()?;
        let written = observations(10);

        let count = writer.write_observations(&sample_station(), &written, temp_file.path())?;
        assert_eq!(count, 10);

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 10);
        assert_eq!(info.row_groups, 3);
        assert_eq!(info.row_group_sizes, vec![4, 4, 2]);
        assert!(info.summary().contains("Total rows: 10"));

        let read = writer.read_observations(temp_file.path(), 100)?;
        assert_eq!(read, written);
        assert_eq!(writer.read_observations(temp_file.path(), 3)?.len(), 3);

        Ok(())
    }

    #[test]
    fn test_write_empty() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;

        let none: Vec<WeatherObservation> = Vec::new();

        let count = writer.write_observations(&sample_station(), &none, temp_file.path())?;
        assert_eq!(count, 0);
        assert_eq!(writer.get_file_info(temp_file.path())?.total_rows, 0);
        Ok(())
    }
}
