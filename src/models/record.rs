use crate::models::CanonicalField;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One data row as text, keyed by canonical field after header translation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    values: BTreeMap<CanonicalField, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: CanonicalField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }
}

impl FromIterator<(CanonicalField, String)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (CanonicalField, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Daily radiation as found in the file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Radiation {
    /// Global radiation in J/m2/day.
    Flux(f64),
    /// Sunshine duration in hours, still to be turned into a flux.
    SunshineHours(f64),
}

/// A row after unit conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedRecord {
    pub day: NaiveDate,
    pub irrad: Radiation,
    pub tmin: f64,
    pub tmax: f64,
    pub vap: f64,
    pub wind: f64,
    pub rain: f64,
    pub snow_depth: Option<f64>,
}

/// A converted row with radiation resolved to a flux and reference
/// evapotranspiration appended (cm/day).
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRecord {
    pub day: NaiveDate,
    pub irrad: f64,
    pub tmin: f64,
    pub tmax: f64,
    pub vap: f64,
    pub wind: f64,
    pub rain: f64,
    pub snow_depth: Option<f64>,
    pub e0: f64,
    pub es0: f64,
    pub et0: f64,
}
