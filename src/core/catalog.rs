use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::models::{BikeType, VehicleRecord};

/// Errors that can occur while loading the catalog file
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog root must be a JSON array")]
    NotAnArray,
}

/// A data-integrity problem found while loading one catalog record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogWarning {
    pub index: usize,
    pub id: Option<String>,
    pub problem: String,
}

/// The whitelisted vehicles, loaded once and read-only afterwards
///
/// Records keep the file order, which is the tie-breaker for equal scores.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<VehicleRecord>,
    by_id: HashMap<String, usize>,
    warnings: Vec<CatalogWarning>,
}

impl Catalog {
    /// Build a catalog from already decoded records
    pub fn from_records(records: Vec<VehicleRecord>) -> Self {
        let mut catalog = Self::default();
        for record in records {
            catalog.push(record, None);
        }
        catalog
    }

    /// Load and validate the catalog file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json_str(&raw)?;

        tracing::info!(
            "Loaded {} bikes from {} ({} warnings)",
            catalog.len(),
            path.as_ref().display(),
            catalog.warnings.len()
        );
        for warning in &catalog.warnings {
            tracing::warn!(
                "Catalog record #{} ({}): {}",
                warning.index,
                warning.id.as_deref().unwrap_or("no id"),
                warning.problem
            );
        }

        Ok(catalog)
    }

    /// Parse a JSON array of records
    ///
    /// Records with missing or invalid required fields are reported as
    /// warnings but stay usable; only non-object entries are skipped.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let root: Value = serde_json::from_str(raw)?;
        let Value::Array(entries) = root else {
            return Err(CatalogError::NotAnArray);
        };

        let mut catalog = Self::default();
        for (index, entry) in entries.into_iter().enumerate() {
            if !entry.is_object() {
                catalog.warn(index, None, "record is not an object, skipped");
                continue;
            }

            let problems = validate_record(&entry);
            // Lenient field decoders make this infallible for objects
            let record: VehicleRecord = match serde_json::from_value(entry) {
                Ok(record) => record,
                Err(e) => {
                    catalog.warn(index, None, &format!("undecodable record, skipped: {}", e));
                    continue;
                }
            };
            for problem in problems {
                catalog.warn(index, record.id.clone(), &problem);
            }
            catalog.push(record, Some(index));
        }

        Ok(catalog)
    }

    fn push(&mut self, record: VehicleRecord, index: Option<usize>) {
        let position = self.records.len();
        if let Some(id) = record.id.clone() {
            if self.by_id.contains_key(&id) {
                self.warn(index.unwrap_or(position), Some(id), "duplicate id, lookups use the first record");
            } else {
                self.by_id.insert(id, position);
            }
        }
        self.records.push(record);
    }

    fn warn(&mut self, index: usize, id: Option<String>, problem: &str) {
        self.warnings.push(CatalogWarning {
            index,
            id,
            problem: problem.to_string(),
        });
    }

    pub fn get(&self, id: &str) -> Option<&VehicleRecord> {
        self.by_id.get(id).map(|&i| &self.records[i])
    }

    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }

    pub fn warnings(&self) -> &[CatalogWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Required-field checks on the raw JSON of one record
fn validate_record(entry: &Value) -> Vec<String> {
    let mut problems = Vec::new();

    for field in ["id", "name", "manufacturer", "category"] {
        let present = entry
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        if !present {
            problems.push(format!("missing {}", field));
        }
    }

    if let Some(category) = entry.get("category").and_then(Value::as_str) {
        if !category.trim().is_empty() && BikeType::parse(category).is_none() {
            problems.push(format!("unknown category '{}'", category));
        }
    }

    problems
}
