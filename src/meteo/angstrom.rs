use super::astro::astro;
use super::MeteoError;
use chrono::NaiveDate;

const MIN_A: f64 = 0.1;
const MAX_A: f64 = 0.4;
const MIN_B: f64 = 0.3;
const MAX_B: f64 = 0.7;
const MIN_SUM_AB: f64 = 0.6;
const MAX_SUM_AB: f64 = 0.9;

/// Checks Angstrom coefficients against their plausible ranges.
///
/// Signs are dropped before checking, so the returned pair may differ from
/// the input.
pub fn check_angstrom_ab(a: f64, b: f64) -> Result<(f64, f64), MeteoError> {
    let a = a.abs();
    let b = b.abs();
    let sum = a + b;

    if !(MIN_A..=MAX_A).contains(&a) {
        return Err(MeteoError::AngstromOutOfRange(format!(
            "Angstrom A value {} outside [{}, {}]",
            a, MIN_A, MAX_A
        )));
    }
    if !(MIN_B..=MAX_B).contains(&b) {
        return Err(MeteoError::AngstromOutOfRange(format!(
            "Angstrom B value {} outside [{}, {}]",
            b, MIN_B, MAX_B
        )));
    }
    if !(MIN_SUM_AB..=MAX_SUM_AB).contains(&sum) {
        return Err(MeteoError::AngstromOutOfRange(format!(
            "Angstrom A+B value {} outside [{}, {}]",
            sum, MIN_SUM_AB, MAX_SUM_AB
        )));
    }

    Ok((a, b))
}

/// Global radiation (J/m2/day) estimated from sunshine duration with the
/// Angstrom formula `Angot * (A + B * n/N)`.
pub fn angstrom(
    day: NaiveDate,
    latitude: f64,
    sunshine_hours: f64,
    a: f64,
    b: f64,
) -> Result<f64, MeteoError> {
    let astro = astro(day, latitude, 0.0)?;
    if astro.day_length <= 0.0 {
        return Err(MeteoError::NoDaylight { day, latitude });
    }
    Ok(astro.angot * (a + b * (sunshine_hours / astro.day_length)))
}
