use super::astro::astro;
use super::MeteoError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Method used for the reference crop evapotranspiration (ET0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EtModel {
    #[default]
    #[serde(rename = "PM")]
    PenmanMonteith,
    #[serde(rename = "P")]
    Penman,
}

impl EtModel {
    pub fn code(&self) -> &'static str {
        match self {
            EtModel::PenmanMonteith => "PM",
            EtModel::Penman => "P",
        }
    }
}

impl FromStr for EtModel {
    type Err = MeteoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PM" => Ok(EtModel::PenmanMonteith),
            "P" => Ok(EtModel::Penman),
            other => Err(MeteoError::UnknownEtModel(other.to_string())),
        }
    }
}

impl std::fmt::Display for EtModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Inputs of the reference evapotranspiration calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EtInput {
    pub day: NaiveDate,
    /// Degrees
    pub latitude: f64,
    /// Metres above sea level
    pub elevation: f64,
    /// Celsius
    pub tmin: f64,
    /// Celsius
    pub tmax: f64,
    /// Global radiation, J/m2/day
    pub irrad: f64,
    /// Vapour pressure, hPa
    pub vap: f64,
    /// Mean wind speed at 2 m, m/s
    pub wind: f64,
    pub angstrom_a: f64,
    pub angstrom_b: f64,
}

/// Potential evaporation of open water (E0), bare soil (ES0) and
/// transpiration of a reference canopy (ET0), mm/day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceEt {
    pub e0: f64,
    pub es0: f64,
    pub et0: f64,
}

/// E0 and ES0 always come from Penman; ET0 follows `model`.
pub fn reference_et(input: &EtInput, model: EtModel) -> Result<ReferenceEt, MeteoError> {
    let mut et = penman(input)?;
    if model == EtModel::PenmanMonteith {
        et.et0 = penman_monteith(input)?;
    }
    Ok(et)
}

fn limit(min: f64, max: f64, value: f64) -> f64 {
    value.max(min).min(max)
}

/// Penman (1948) potential evaporation, mm/day.
pub fn penman(input: &EtInput) -> Result<ReferenceEt, MeteoError> {
    // psychrometric instrument constant (mbar/Celsius)
    const PSYCON: f64 = 0.67;
    // albedo for water surface, soil surface and canopy
    const REFCFW: f64 = 0.05;
    const REFCFS: f64 = 0.15;
    const REFCFC: f64 = 0.25;
    // latent heat of evaporation of water (J/kg = J/mm)
    const LHVAP: f64 = 2.45e6;
    // Stefan Boltzmann constant (J/m2/d/K4)
    const STBC: f64 = 4.9e-3;

    let tmpa = (input.tmin + input.tmax) / 2.0;
    let tdif = input.tmax - input.tmin;
    let bu = 0.54 + 0.35 * limit(0.0, 1.0, (tdif - 12.0) / 4.0);

    let pbar = 1013.0 * (-0.034 * input.elevation / (tmpa + 273.0)).exp();
    let gamma = PSYCON * pbar / 1013.0;

    // Saturated vapour pressure after Goudriaan (1977), mbar
    let svap = 6.10588 * (17.32491 * tmpa / (tmpa + 238.102)).exp();
    let delta = 238.102 * 17.32491 * svap / (tmpa + 238.102).powi(2);
    let vap = input.vap.min(svap);

    // n/N estimated from the atmospheric transmission via the Angstrom formula
    let astro = astro(input.day, input.latitude, input.irrad)?;
    let relssd = limit(
        0.0,
        1.0,
        (astro.atmospheric_transmission - input.angstrom_a.abs()) / input.angstrom_b.abs(),
    );

    // Net outgoing long-wave radiation after Brunt (1932)
    let rb = STBC * (tmpa + 273.0).powi(4) * (0.56 - 0.079 * vap.sqrt()) * (0.1 + 0.9 * relssd);

    let rnw = (input.irrad * (1.0 - REFCFW) - rb) / LHVAP;
    let rns = (input.irrad * (1.0 - REFCFS) - rb) / LHVAP;
    let rnc = (input.irrad * (1.0 - REFCFC) - rb) / LHVAP;

    let deficit = (svap - vap).max(0.0);
    let ea = 0.26 * deficit * (0.5 + bu * input.wind);
    let eac = 0.26 * deficit * (1.0 + bu * input.wind);

    let e0 = (delta * rnw + gamma * ea) / (delta + gamma);
    let es0 = (delta * rns + gamma * ea) / (delta + gamma);
    let et0 = (delta * rnc + gamma * eac) / (delta + gamma);

    let et = ReferenceEt {
        e0: e0.max(0.0),
        es0: es0.max(0.0),
        et0: et0.max(0.0),
    };
    if !(et.e0.is_finite() && et.es0.is_finite() && et.et0.is_finite()) {
        return Err(MeteoError::NonFinite("Penman"));
    }
    Ok(et)
}

fn sat_vapour_pressure_kpa(temp: f64) -> f64 {
    0.6108 * ((17.27 * temp) / (237.3 + temp)).exp()
}

/// FAO-56 Penman-Monteith reference crop evapotranspiration, mm/day.
pub fn penman_monteith(input: &EtInput) -> Result<f64, MeteoError> {
    // psychrometric instrument constant (kPa/Celsius)
    const PSYCON: f64 = 0.665;
    // albedo and surface resistance (s/m) of the reference crop
    const REFCFC: f64 = 0.23;
    const CRES: f64 = 70.0;
    const LHVAP: f64 = 2.45e6;
    const STBC: f64 = 4.903e-3;
    // Soil heat flux is neglected at the daily time step
    const G: f64 = 0.0;

    let tmpa = (input.tmin + input.tmax) / 2.0;
    // hPa -> kPa
    let vap = input.vap / 10.0;

    let t = 293.0;
    let patm = 101.3 * ((t - 0.0065 * input.elevation) / t).powf(5.26);
    let gamma = PSYCON * patm * 1.0e-3;

    let svap_tmpa = sat_vapour_pressure_kpa(tmpa);
    let delta = (4098.0 * svap_tmpa) / (tmpa + 237.3).powi(2);

    let svap = (sat_vapour_pressure_kpa(input.tmax) + sat_vapour_pressure_kpa(input.tmin)) / 2.0;
    let vap = vap.min(svap);

    let stb_tmax = STBC * (input.tmax + 273.15).powi(4);
    let stb_tmin = STBC * (input.tmin + 273.15).powi(4);
    let rnl_tmp = ((stb_tmax + stb_tmin) / 2.0) * (0.34 - 0.14 * vap.sqrt());

    let astro = astro(input.day, input.latitude, input.irrad)?;
    let clear_sky = (0.75 + 2e-05 * input.elevation) * astro.angot;
    if clear_sky <= 0.0 {
        return Ok(0.0);
    }

    let rnl = rnl_tmp * (1.35 * (input.irrad / clear_sky) - 0.35);
    let rn = ((1.0 - REFCFC) * input.irrad - rnl) / LHVAP;
    let ea = (900.0 / (tmpa + 273.0)) * input.wind * (svap - vap);
    let modified_gamma = gamma * (1.0 + (CRES / 208.0 * input.wind));

    let et0 = (delta * (rn - G)) / (delta + modified_gamma)
        + (gamma * ea) / (delta + modified_gamma);

    if !et0.is_finite() {
        return Err(MeteoError::NonFinite("Penman-Monteith"));
    }
    Ok(et0.max(0.0))
}
