//! Mapping of source column labels onto canonical fields.

use crate::error::{ProviderError, Result};
use crate::models::{CanonicalField, RawRecord};
use csv::StringRecord;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Column index of every canonical field found in the header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalFieldMap {
    columns: BTreeMap<CanonicalField, (usize, String)>,
    ignored: Vec<String>,
}

impl CanonicalFieldMap {
    pub fn index_of(&self, field: CanonicalField) -> Option<usize> {
        self.columns.get(&field).map(|(index, _)| *index)
    }

    /// Source label the field was mapped from.
    pub fn label_of(&self, field: CanonicalField) -> Option<&str> {
        self.columns.get(&field).map(|(_, label)| label.as_str())
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.columns.contains_key(&field)
    }

    /// Required fields with no matching column. Rows will fail on these.
    pub fn missing_required(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|field| !field.is_optional() && !self.contains(*field))
            .collect()
    }

    /// Labels that matched no alias.
    pub fn ignored_columns(&self) -> &[String] {
        &self.ignored
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Pick the mapped cells out of a data row. Cells past the end of a
    /// short row are left out of the record.
    pub fn raw_record(&self, row: &StringRecord) -> RawRecord {
        self.columns
            .iter()
            .filter_map(|(field, (index, _))| {
                row.get(*index).map(|value| (*field, value.to_string()))
            })
            .collect()
    }
}

pub struct HeaderTranslator {
    strict: bool,
}

impl HeaderTranslator {
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// In strict mode two columns mapping to one field is an error instead of
    /// last-one-wins.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn translate<'a, I>(&self, labels: I) -> Result<CanonicalFieldMap>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = CanonicalFieldMap::default();

        for (index, label) in labels.into_iter().enumerate() {
            let label = label.trim();
            let Some(field) = CanonicalField::from_label(label) else {
                debug!("Ignoring column '{}'", label);
                map.ignored.push(label.to_string());
                continue;
            };

            if let Some((_, previous)) = map.columns.get(&field) {
                if self.strict {
                    return Err(ProviderError::AmbiguousHeader {
                        field: field.as_str(),
                        first: previous.clone(),
                        second: label.to_string(),
                    });
                }
                warn!(
                    "Columns '{}' and '{}' both map to {}, using '{}'",
                    previous, label, field, label
                );
            }

            map.columns.insert(field, (index, label.to_string()));
        }

        Ok(map)
    }
}

impl Default for HeaderTranslator {
    fn default() -> Self {
        Self::new()
    }
}
