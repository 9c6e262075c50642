use crate::error::RowError;
use crate::models::{CanonicalField, ConvertedRecord, Radiation, RawRecord};
use crate::utils::constants::{
    DEFAULT_DATE_FORMAT, NODATA_VALUE, SUNSHINE_MAX_HOURS, SUNSHINE_MIN_HOURS,
};
use chrono::NaiveDate;

/// Converts raw text rows into typed values in model units.
pub struct RecordParser {
    date_format: String,
    sunshine_mode: bool,
}

impl RecordParser {
    pub fn new() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            sunshine_mode: false,
        }
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    /// When set, IRRAD values strictly between 0 and 24 are sunshine hours.
    pub fn with_sunshine_mode(mut self, sunshine_mode: bool) -> Self {
        self.sunshine_mode = sunshine_mode;
        self
    }

    pub fn convert(&self, raw: &RawRecord) -> Result<ConvertedRecord, RowError> {
        Ok(ConvertedRecord {
            day: self.parse_day(raw)?,
            irrad: self.parse_radiation(raw)?,
            tmin: required(raw, CanonicalField::Tmin)?,
            tmax: required(raw, CanonicalField::Tmax)?,
            vap: required(raw, CanonicalField::Vap)?,
            wind: required(raw, CanonicalField::Wind)?,
            rain: required(raw, CanonicalField::Rain)?,
            snow_depth: parse_snow_depth(raw)?,
        })
    }

    fn parse_day(&self, raw: &RawRecord) -> Result<NaiveDate, RowError> {
        let field = CanonicalField::Day;
        let text = match raw.get(field) {
            Some(text) if !text.is_empty() => text,
            _ => return Err(RowError::MissingData { field: field.as_str() }),
        };
        NaiveDate::parse_from_str(text, &self.date_format).map_err(|e| RowError::Conversion {
            field: field.as_str(),
            value: text.to_string(),
            reason: e.to_string(),
        })
    }

    fn parse_radiation(&self, raw: &RawRecord) -> Result<Radiation, RowError> {
        let field = CanonicalField::Irrad;
        let value = parse_number(field, raw.get(field))?
            .ok_or(RowError::MissingData { field: field.as_str() })?;

        // The range check uses the value as written in the file
        if self.sunshine_mode && value > SUNSHINE_MIN_HOURS && value < SUNSHINE_MAX_HOURS {
            Ok(Radiation::SunshineHours(value))
        } else {
            Ok(Radiation::Flux(field.conversion().apply(value)))
        }
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a numeric cell. Empty cells and NaN count as missing.
pub fn parse_number(field: CanonicalField, text: Option<&str>) -> Result<Option<f64>, RowError> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    match text.parse::<f64>() {
        Ok(value) if value.is_nan() => Ok(None),
        Ok(value) if value.is_infinite() => Err(RowError::Conversion {
            field: field.as_str(),
            value: text.to_string(),
            reason: "not a finite number".to_string(),
        }),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(RowError::Conversion {
            field: field.as_str(),
            value: text.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn required(raw: &RawRecord, field: CanonicalField) -> Result<f64, RowError> {
    parse_number(field, raw.get(field))?
        .map(|value| field.conversion().apply(value))
        .ok_or(RowError::MissingData { field: field.as_str() })
}

fn parse_snow_depth(raw: &RawRecord) -> Result<Option<f64>, RowError> {
    let field = CanonicalField::SnowDepth;
    Ok(parse_number(field, raw.get(field))?
        .filter(|value| *value != NODATA_VALUE)
        .map(|value| field.conversion().apply(value)))
}
