pub mod field;
pub mod observation;
pub mod record;
pub mod station;

pub use field::{CanonicalField, Conversion};
pub use observation::WeatherObservation;
pub use record::{ConvertedRecord, DerivedRecord, Radiation, RawRecord};
pub use station::StationMetadata;
