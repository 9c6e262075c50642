use crate::error::{RowError, RowErrorKind};
use serde::Serialize;

/// Maximum number of skipped rows listed in the summary.
const SUMMARY_WARNING_LIMIT: usize = 10;

/// Outcome of loading one weather file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub from_cache: bool,
    pub data_rows: usize,
    pub stored: usize,
    pub conversion_errors: usize,
    pub missing_data: usize,
    pub derived_errors: usize,
    pub duplicate_dates: usize,
    pub sunshine_rows: usize,
    pub ignored_columns: Vec<String>,
    pub skipped_rows: Vec<SkippedRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub kind: RowErrorKind,
    pub message: String,
}

impl IngestReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report for a store restored from cache.
    pub fn cached(stored: usize) -> Self {
        Self {
            from_cache: true,
            data_rows: stored,
            stored,
            ..Self::default()
        }
    }

    pub fn record_skip(&mut self, line: u64, error: &RowError) {
        match error.kind() {
            RowErrorKind::Conversion => self.conversion_errors += 1,
            RowErrorKind::MissingData => self.missing_data += 1,
            RowErrorKind::DerivedQuantity => self.derived_errors += 1,
        }
        self.skipped_rows.push(SkippedRow {
            line,
            kind: error.kind(),
            message: error.to_string(),
        });
    }

    pub fn record_duplicate(&mut self) {
        self.duplicate_dates += 1;
    }

    pub fn skipped(&self) -> usize {
        self.conversion_errors + self.missing_data + self.derived_errors
    }

    pub fn success_rate(&self) -> f64 {
        if self.data_rows == 0 {
            0.0
        } else {
            100.0 * (self.data_rows - self.skipped()) as f64 / self.data_rows as f64
        }
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Ingest Report ===\n");
        if self.from_cache {
            summary.push_str("Source: cache\n");
        }
        summary.push_str(&format!("Data Rows: {}\n", self.data_rows));
        summary.push_str(&format!(
            "Stored Days: {} ({:.1}% of rows accepted)\n",
            self.stored,
            self.success_rate()
        ));
        summary.push_str(&format!("Conversion Errors: {}\n", self.conversion_errors));
        summary.push_str(&format!("Missing Data: {}\n", self.missing_data));
        summary.push_str(&format!("Derived Quantity Errors: {}\n", self.derived_errors));
        summary.push_str(&format!("Duplicate Dates: {}\n", self.duplicate_dates));
        if self.sunshine_rows > 0 {
            summary.push_str(&format!("Rows From Sunshine Hours: {}\n", self.sunshine_rows));
        }
        if !self.ignored_columns.is_empty() {
            summary.push_str(&format!(
                "Ignored Columns: {}\n",
                self.ignored_columns.join(", ")
            ));
        }

        if !self.skipped_rows.is_empty() {
            summary.push_str(&format!("\nFirst {} Skipped Rows:\n", SUMMARY_WARNING_LIMIT));
            for skipped in self.skipped_rows.iter().take(SUMMARY_WARNING_LIMIT) {
                summary.push_str(&format!("  line {}: {}\n", skipped.line, skipped.message));
            }
        }

        summary
    }
}
