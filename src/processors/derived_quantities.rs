use crate::error::RowError;
use crate::meteo::{EtInput, EtModel, MeteoFormulas};
use crate::models::{ConvertedRecord, DerivedRecord, Radiation, StationMetadata};

/// Resolves sunshine hours to radiation and appends E0/ES0/ET0 in cm/day.
pub struct DerivedQuantityCalculator<'a> {
    formulas: &'a dyn MeteoFormulas,
    station: &'a StationMetadata,
    et_model: EtModel,
}

impl<'a> DerivedQuantityCalculator<'a> {
    pub fn new(
        formulas: &'a dyn MeteoFormulas,
        station: &'a StationMetadata,
        et_model: EtModel,
    ) -> Self {
        Self {
            formulas,
            station,
            et_model,
        }
    }

    pub fn derive(&self, record: ConvertedRecord) -> Result<DerivedRecord, RowError> {
        let irrad = match record.irrad {
            Radiation::Flux(value) => value,
            Radiation::SunshineHours(hours) => self
                .formulas
                .angstrom(
                    record.day,
                    self.station.latitude,
                    hours,
                    self.station.angstrom_a,
                    self.station.angstrom_b,
                )
                .map_err(|e| RowError::DerivedQuantity(e.to_string()))?,
        };

        let input = EtInput {
            day: record.day,
            latitude: self.station.latitude,
            elevation: self.station.elevation,
            tmin: record.tmin,
            tmax: record.tmax,
            irrad,
            vap: record.vap,
            wind: record.wind,
            angstrom_a: self.station.angstrom_a,
            angstrom_b: self.station.angstrom_b,
        };
        let et = self
            .formulas
            .reference_et(&input, self.et_model)
            .map_err(|e| RowError::DerivedQuantity(e.to_string()))?;

        // mm/day -> cm/day
        Ok(DerivedRecord {
            day: record.day,
            irrad,
            tmin: record.tmin,
            tmax: record.tmax,
            vap: record.vap,
            wind: record.wind,
            rain: record.rain,
            snow_depth: record.snow_depth,
            e0: et.e0 / 10.0,
            es0: et.es0 / 10.0,
            et0: et.et0 / 10.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meteo::{MeteoError, ReferenceEt, StandardFormulas};
    use crate::models::station::sample_station;
    use chrono::NaiveDate;

    struct FixedFormulas;

    impl MeteoFormulas for FixedFormulas {
        fn angstrom(&self, _: NaiveDate, _: f64, hours: f64, _: f64, _: f64) -> Result<f64, MeteoError> {
            Ok(hours * 1_000_000.0)
        }

        fn reference_et(&self, _: &EtInput, _: EtModel) -> Result<ReferenceEt, MeteoError> {
            Ok(ReferenceEt {
                e0: 4.0,
                es0: 3.0,
                et0: 2.0,
            })
        }
    }

    struct FailingFormulas;

    impl MeteoFormulas for FailingFormulas {
        fn angstrom(&self, _: NaiveDate, _: f64, _: f64, _: f64, _: f64) -> Result<f64, MeteoError> {
            Err(MeteoError::NonFinite("angstrom"))
        }

        fn reference_et(&self, _: &EtInput, _: EtModel) -> Result<ReferenceEt, MeteoError> {
            Err(MeteoError::NonFinite("penman"))
        }
    }

    fn record(irrad: Radiation) -> ConvertedRecord {
        ConvertedRecord {
            day: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            irrad,
            tmin: 2.0,
            tmax: 10.0,
            vap: 1.0,
            wind: 3.0,
            rain: 0.5,
            snow_depth: None,
        }
    }

    #[test]
    fn test_scales_to_cm_per_day() {
        let station = sample_station();
        let calculator = DerivedQuantityCalculator::new(&FixedFormulas, &station, EtModel::default());
        let derived = calculator.derive(record(Radiation::Flux(5e6))).unwrap();

        assert_eq!(derived.irrad, 5e6);
        assert_eq!(derived.e0, 0.4);
        assert_eq!(derived.es0, 0.3);
        assert_eq!(derived.et0, 0.2);
        assert_eq!(derived.rain, 0.5);
    }

    #[test]
    fn test_sunshine_hours_use_angstrom() {
        let station = sample_station();
        let calculator = DerivedQuantityCalculator::new(&FixedFormulas, &station, EtModel::default());
        let derived = calculator.derive(record(Radiation::SunshineHours(8.5))).unwrap();
        assert_eq!(derived.irrad, 8.5e6);
    }

    #[test]
    fn test_standard_formulas_give_positive_et() {
        let station = sample_station();
        let formulas = StandardFormulas;
        for model in [EtModel::PenmanMonteith, EtModel::Penman] {
            let calculator = DerivedQuantityCalculator::new(&formulas, &station, model);
            let derived = calculator.derive(record(Radiation::Flux(5e6))).unwrap();
            assert!(derived.e0 > 0.0);
            assert!(derived.es0 > 0.0);
            assert!(derived.et0 > 0.0);
        }
    }

    #[test]
    fn test_failure_becomes_row_error() {
        let station = sample_station();
        let calculator = DerivedQuantityCalculator::new(&FailingFormulas, &station, EtModel::default());
        assert!(matches!(
            calculator.derive(record(Radiation::Flux(5e6))),
            Err(RowError::DerivedQuantity(_))
        ));
        assert!(matches!(
            calculator.derive(record(Radiation::SunshineHours(6.0))),
            Err(RowError::DerivedQuantity(_))
        ));
    }
}
