use serde::{Deserialize, Serialize};
use validator::Validate;

/// Station description and site constants read from the meta-header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationMetadata {
    pub country: String,

    #[validate(length(min = 1))]
    pub station: String,
    pub description: String,
    pub source: String,
    pub contact: String,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    pub elevation: f64,

    pub angstrom_a: f64,
    pub angstrom_b: f64,

    /// IRRAD values in (0, 24) are sunshine hours rather than radiation.
    pub has_sunshine: bool,
}

impl StationMetadata {
    pub fn description_lines(&self) -> Vec<String> {
        vec![
            "Weather data for:".to_string(),
            format!("Country: {}", self.country),
            format!("Station: {}", self.station),
            format!("Description: {}", self.description),
            format!("Source: {}", self.source),
            format!("Contact: {}", self.contact),
        ]
    }
}

#[cfg(test)]
pub(crate) fn sample_station() -> StationMetadata {
    StationMetadata {
        country: "Netherlands".to_string(),
        station: "Wageningen, Haarweg".to_string(),
        description: "Observed data from Station Haarweg in Wageningen".to_string(),
        source: "Meteorology and Air Quality Group, Wageningen University".to_string(),
        contact: "Peter Uithol".to_string(),
        longitude: 5.67,
        latitude: 51.97,
        elevation: 7.0,
        angstrom_a: 0.18,
        angstrom_b: 0.55,
        has_sunshine: false,
    }
}
