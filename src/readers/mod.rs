pub mod header_translator;
pub mod meta_header;
pub mod record_parser;
pub mod weather_file;

pub use header_translator::{CanonicalFieldMap, HeaderTranslator};
pub use meta_header::{MetaHeader, MetaHeaderParser};
pub use record_parser::{parse_number, RecordParser};
pub use weather_file::{ParsedWeatherFile, WeatherFileReader};
