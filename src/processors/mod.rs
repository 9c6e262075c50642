pub mod derived_quantities;
pub mod ingest_report;

pub use derived_quantities::DerivedQuantityCalculator;
pub use ingest_report::{IngestReport, SkippedRow};
