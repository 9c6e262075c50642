use serde::{Deserialize, Serialize};

/// Canonical observation columns, independent of the labels used in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalField {
    Day,
    Irrad,
    Tmin,
    Tmax,
    Vap,
    Wind,
    Rain,
    SnowDepth,
}

/// Unit conversion applied to a raw cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Parsed with the configured date format.
    Date,
    /// kJ/m2/day -> J/m2/day
    KilojouleToJoule,
    /// mm/day -> cm/day
    MillimeterToCentimeter,
    Identity,
}

impl Conversion {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Conversion::KilojouleToJoule => value * 1000.0,
            Conversion::MillimeterToCentimeter => value / 10.0,
            Conversion::Identity | Conversion::Date => value,
        }
    }
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 8] = [
        CanonicalField::Day,
        CanonicalField::Irrad,
        CanonicalField::Tmin,
        CanonicalField::Tmax,
        CanonicalField::Vap,
        CanonicalField::Wind,
        CanonicalField::Rain,
        CanonicalField::SnowDepth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Day => "DAY",
            CanonicalField::Irrad => "IRRAD",
            CanonicalField::Tmin => "TMIN",
            CanonicalField::Tmax => "TMAX",
            CanonicalField::Vap => "VAP",
            CanonicalField::Wind => "WIND",
            CanonicalField::Rain => "RAIN",
            CanonicalField::SnowDepth => "SNOWDEPTH",
        }
    }

    /// Column labels accepted for this field. Matching is case-sensitive.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::Day => &["w_date", "DAY"],
            CanonicalField::Irrad => &["srad", "RADIATION", "IRRAD"],
            CanonicalField::Tmin => &["tmin", "TEMPERATURE_MIN", "TMIN"],
            CanonicalField::Tmax => &["tmax", "TEMPERATURE_MAX", "TMAX"],
            CanonicalField::Vap => &["vprs_tx", "VAPOURPRESSURE", "VAP"],
            CanonicalField::Wind => &["wind", "WINDSPEED", "WIND"],
            CanonicalField::Rain => &["rain", "PRECIPITATION", "RAIN"],
            CanonicalField::SnowDepth => &["snowdepth", "SNOWDEPTH"],
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.aliases().contains(&label))
    }

    pub fn conversion(&self) -> Conversion {
        match self {
            CanonicalField::Day => Conversion::Date,
            CanonicalField::Irrad => Conversion::KilojouleToJoule,
            CanonicalField::Rain => Conversion::MillimeterToCentimeter,
            CanonicalField::Tmin
            | CanonicalField::Tmax
            | CanonicalField::Vap
            | CanonicalField::Wind
            | CanonicalField::SnowDepth => Conversion::Identity,
        }
    }

    /// Only snow depth may be missing without discarding the row.
    pub fn is_optional(&self) -> bool {
        matches!(self, CanonicalField::SnowDepth)
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
