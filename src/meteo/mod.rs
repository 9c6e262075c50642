//! Physical formulas used to derive radiation and reference
//! evapotranspiration.
//!
//! The ingestion pipeline only talks to these through [`MeteoFormulas`], so a
//! provider can be built with alternative (or deliberately failing)
//! implementations.

pub mod angstrom;
pub mod astro;
pub mod evapotranspiration;

pub use angstrom::{angstrom, check_angstrom_ab};
pub use astro::{astro, AstroOutput};
pub use evapotranspiration::{penman, penman_monteith, reference_et, EtInput, EtModel, ReferenceEt};

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeteoError {
    #[error("Latitude {0} outside [-90, 90]")]
    InvalidLatitude(f64),

    #[error("No daylight on {day} at latitude {latitude}")]
    NoDaylight { day: NaiveDate, latitude: f64 },

    #[error("{0}")]
    AngstromOutOfRange(String),

    #[error("Unknown evapotranspiration model '{0}', expected 'PM' or 'P'")]
    UnknownEtModel(String),

    #[error("{0} produced a non-finite value")]
    NonFinite(&'static str),
}

pub trait MeteoFormulas: Send + Sync {
    /// Radiation (J/m2/day) from sunshine duration (hours).
    fn angstrom(
        &self,
        day: NaiveDate,
        latitude: f64,
        sunshine_hours: f64,
        a: f64,
        b: f64,
    ) -> Result<f64, MeteoError>;

    /// E0, ES0 and ET0 in mm/day.
    fn reference_et(&self, input: &EtInput, model: EtModel) -> Result<ReferenceEt, MeteoError>;
}

/// The Angstrom and Penman/Penman-Monteith formulas of this module.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFormulas;

impl MeteoFormulas for StandardFormulas {
    fn angstrom(
        &self,
        day: NaiveDate,
        latitude: f64,
        sunshine_hours: f64,
        a: f64,
        b: f64,
    ) -> Result<f64, MeteoError> {
        angstrom(day, latitude, sunshine_hours, a, b)
    }

    fn reference_et(&self, input: &EtInput, model: EtModel) -> Result<ReferenceEt, MeteoError> {
        reference_et(input, model)
    }
}
