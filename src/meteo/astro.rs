use super::MeteoError;
use chrono::{Datelike, NaiveDate};
use std::f64::consts::PI;

const RAD: f64 = 0.0174533;
/// Sun elevation (degrees) used for the photoperiodic day length.
const ANGLE: f64 = -4.0;

/// Astronomic day length, radiation and related quantities for one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AstroOutput {
    /// Astronomical day length (base = 0 degrees), hours.
    pub day_length: f64,
    /// Photoperiodic day length (base = -4 degrees), hours.
    pub day_length_photoperiodic: f64,
    pub sinld: f64,
    pub cosld: f64,
    /// Diffuse irradiation perpendicular to the sun beam, J/m2/s.
    pub difpp: f64,
    /// Daily atmospheric transmission.
    pub atmospheric_transmission: f64,
    /// Daily integral of sine of solar height, corrected for lower transmission at low elevation.
    pub dsinbe: f64,
    /// Angot (top of atmosphere) radiation, J/m2/day.
    pub angot: f64,
}

/// Daily astronomic quantities for `latitude` (degrees) given the measured
/// global radiation (J/m2/day).
pub fn astro(day: NaiveDate, latitude: f64, radiation: f64) -> Result<AstroOutput, MeteoError> {
    if latitude.abs() > 90.0 || latitude.is_nan() {
        return Err(MeteoError::InvalidLatitude(latitude));
    }

    let iday = day.ordinal() as f64;

    // Declination and solar constant for this day
    let dec = -((23.45 * RAD).sin() * (2.0 * PI * (iday + 10.0) / 365.0).cos()).asin();
    let sc = 1370.0 * (1.0 + 0.033 * (2.0 * PI * iday / 365.0).cos());

    let sinld = (RAD * latitude).sin() * dec.sin();
    let cosld = (RAD * latitude).cos() * dec.cos();
    let aob = sinld / cosld;

    // Day length hits 24h or 0h near the poles; clamp instead of asin(>1).
    let (day_length, dsinb, dsinbe) = if aob.abs() <= 1.0 {
        let dayl = 12.0 * (1.0 + 2.0 * aob.asin() / PI);
        let root = (1.0 - aob * aob).sqrt();
        let dsinb = 3600.0 * (dayl * sinld + 24.0 * cosld * root / PI);
        let dsinbe = 3600.0
            * (dayl * (sinld + 0.4 * (sinld * sinld + cosld * cosld * 0.5))
                + 12.0 * cosld * (2.0 + 3.0 * 0.4 * sinld) * root / PI);
        (dayl, dsinb, dsinbe)
    } else {
        let dayl = if aob > 1.0 { 24.0 } else { 0.0 };
        let dsinb = 3600.0 * (dayl * sinld);
        let dsinbe = 3600.0 * (dayl * (sinld + 0.4 * (sinld * sinld + cosld * cosld * 0.5)));
        (dayl, dsinb, dsinbe)
    };

    let aob_corr = (-(ANGLE * RAD).sin() + sinld) / cosld;
    let day_length_photoperiodic = if aob_corr.abs() <= 1.0 {
        12.0 * (1.0 + 2.0 * aob_corr.asin() / PI)
    } else if aob_corr > 1.0 {
        24.0
    } else {
        0.0
    };

    let angot = sc * dsinb;
    let atmospheric_transmission = if day_length > 0.0 {
        radiation / angot
    } else {
        0.0
    };

    let frdif = if atmospheric_transmission > 0.75 {
        0.23
    } else if atmospheric_transmission > 0.35 {
        1.33 - 1.46 * atmospheric_transmission
    } else if atmospheric_transmission > 0.07 {
        1.0 - 2.3 * (atmospheric_transmission - 0.07).powi(2)
    } else {
        1.0
    };
    let difpp = frdif * atmospheric_transmission * 0.5 * sc;

    Ok(AstroOutput {
        day_length,
        day_length_photoperiodic,
        sinld,
        cosld,
        difpp,
        atmospheric_transmission,
        dsinbe,
        angot,
    })
}
