use crate::models::WeatherObservation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeBounds;

/// Daily observations keyed by date, at most one per day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesStore {
    observations: BTreeMap<NaiveDate, WeatherObservation>,
}

impl TimeSeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an observation, returning the one it replaced for the same day.
    pub fn insert(&mut self, observation: WeatherObservation) -> Option<WeatherObservation> {
        self.observations.insert(observation.day, observation)
    }

    pub fn get(&self, day: NaiveDate) -> Option<&WeatherObservation> {
        self.observations.get(&day)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.observations.contains_key(&day)
    }

    /// Observations in date order.
    pub fn iter(&self) -> impl Iterator<Item = &WeatherObservation> {
        self.observations.values()
    }

    pub fn range<R: RangeBounds<NaiveDate>>(
        &self,
        range: R,
    ) -> impl Iterator<Item = &WeatherObservation> {
        self.observations.range(range).map(|(_, observation)| observation)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn to_vec(&self) -> Vec<WeatherObservation> {
        self.observations.values().cloned().collect()
    }
}

impl FromIterator<WeatherObservation> for TimeSeriesStore {
    fn from_iter<I: IntoIterator<Item = WeatherObservation>>(iter: I) -> Self {
        let mut store = Self::new();
        for observation in iter {
            store.insert(observation);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(day: NaiveDate, tmax: f64) -> WeatherObservation {
        WeatherObservation {
            day,
            latitude: 52.0,
            longitude: 5.0,
            elevation: 10.0,
            irrad: 5e6,
            tmin: 2.0,
            tmax,
            vap: 1.0,
            wind: 3.0,
            rain: 0.5,
            snow_depth: None,
            e0: 0.07,
            es0: 0.05,
            et0: 0.2,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_ordered_and_unique() {
        let mut store: TimeSeriesStore = [
            observation(date(2000, 1, 3), 10.0),
            observation(date(2000, 1, 1), 11.0),
            observation(date(2000, 1, 2), 12.0),
        ]
        .into_iter()
        .collect();

        let replaced = store.insert(observation(date(2000, 1, 2), 13.0));
        assert_eq!(replaced.map(|o| o.tmax), Some(12.0));
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(date(2000, 1, 2)).map(|o| o.tmax), Some(13.0));

        let days: Vec<NaiveDate> = store.iter().map(|o| o.day).collect();
        assert_eq!(days, vec![date(2000, 1, 1), date(2000, 1, 2), date(2000, 1, 3)]);
        assert_eq!(store.first_date(), Some(date(2000, 1, 1)));
        assert_eq!(store.last_date(), Some(date(2000, 1, 3)));
        assert_eq!(store.range(date(2000, 1, 2)..).count(), 2);
    }

    #[test]
    fn test_empty() {
        let store = TimeSeriesStore::new();
        assert!(store.is_empty());
        assert_eq!(store.first_date(), None);
        assert!(store.get(date(2000, 1, 1)).is_none());
    }
}
