use crate::models::{DerivedRecord, StationMetadata};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of weather at a station, the unit of storage.
///
/// Units: irrad J/m2/day, tmin/tmax Celsius, vap hPa, wind m/s,
/// rain cm/day, snow_depth cm, e0/es0/et0 cm/day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub day: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
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

impl WeatherObservation {
    pub fn from_derived(record: DerivedRecord, station: &StationMetadata) -> Self {
        Self {
            day: record.day,
            latitude: station.latitude,
            longitude: station.longitude,
            elevation: station.elevation,
            irrad: record.irrad,
            tmin: record.tmin,
            tmax: record.tmax,
            vap: record.vap,
            wind: record.wind,
            rain: record.rain,
            snow_depth: record.snow_depth,
            e0: record.e0,
            es0: record.es0,
            et0: record.et0,
        }
    }

    pub fn temp_avg(&self) -> f64 {
        (self.tmin + self.tmax) / 2.0
    }
}
