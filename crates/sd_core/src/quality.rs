//! Data-quality ledger filled during load.
//!
//! Per-row problems (bad keys, bad dates, bad measures, duplicate dimension
//! keys) never abort the pipeline; they are counted here so they can be
//! logged and audited. Samples are capped to keep the ledger small.

use std::collections::BTreeMap;

use crate::errors::InvalidDateError;
use crate::table::TableName;

/// Maximum number of individual issues retained per category.
pub const SAMPLE_CAP: usize = 20;

/// A key cell that did not coerce to an integer; the key became absent.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyCoercionWarning {
    pub table: TableName,
    pub column: String,
    /// 1-based data row in the normalized table.
    pub row: usize,
    pub raw: Option<String>,
}

/// Match statistics for one left-join stage.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinStageReport {
    pub stage: String,
    pub rows_in: usize,
    pub rows_out: usize,
    pub matched: usize,
    pub unmatched: usize,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataQualityReport {
    /// Rows per table after normalization (dimensions: before dedup).
    pub rows_loaded: BTreeMap<TableName, usize>,
    /// `(table, column)` → count of absent keys after coercion.
    pub key_warnings: BTreeMap<String, usize>,
    pub key_warning_samples: Vec<KeyCoercionWarning>,
    /// Dimension rows dropped because an earlier row had the same key.
    pub duplicate_keys_dropped: BTreeMap<TableName, usize>,
    pub invalid_dates: usize,
    pub invalid_date_samples: Vec<InvalidDateError>,
    /// `column` → count of measure cells that did not parse (value left absent).
    pub invalid_measures: BTreeMap<String, usize>,
    pub join_stages: Vec<JoinStageReport>,
}

impl DataQualityReport {
    pub fn record_key_warning(&mut self, w: KeyCoercionWarning) {
        *self
            .key_warnings
            .entry(format!("{}.{}", w.table, w.column))
            .or_insert(0) += 1;
        if self.key_warning_samples.len() < SAMPLE_CAP {
            self.key_warning_samples.push(w);
        }
    }

    pub fn record_invalid_date(&mut self, e: InvalidDateError) {
        self.invalid_dates += 1;
        if self.invalid_date_samples.len() < SAMPLE_CAP {
            self.invalid_date_samples.push(e);
        }
    }

    pub fn record_invalid_measure(&mut self, column: &str) {
        *self.invalid_measures.entry(column.to_string()).or_insert(0) += 1;
    }

    pub fn record_duplicates(&mut self, table: TableName, dropped: usize) {
        if dropped > 0 {
            *self.duplicate_keys_dropped.entry(table).or_insert(0) += dropped;
        }
    }

    pub fn total_key_warnings(&self) -> usize {
        self.key_warnings.values().sum()
    }

    pub fn total_duplicates_dropped(&self) -> usize {
        self.duplicate_keys_dropped.values().sum()
    }

    pub fn total_invalid_measures(&self) -> usize {
        self.invalid_measures.values().sum()
    }

    /// True when no per-row issue was recorded.
    pub fn is_clean(&self) -> bool {
        self.total_key_warnings() == 0
            && self.total_duplicates_dropped() == 0
            && self.invalid_dates == 0
            && self.total_invalid_measures() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_keep_growing_past_sample_cap() {
        let mut q = DataQualityReport::default();
        for row in 1..=(SAMPLE_CAP + 5) {
            q.record_key_warning(KeyCoercionWarning {
                table: TableName::Customers,
                column: "Customer Key".into(),
                row,
                raw: Some("x".into()),
            });
        }
        assert_eq!(q.key_warnings["customers.Customer Key"], SAMPLE_CAP + 5);
        assert_eq!(q.key_warning_samples.len(), SAMPLE_CAP);
        assert!(!q.is_clean());
    }

    #[test]
    fn zero_duplicates_are_not_recorded() {
        let mut q = DataQualityReport::default();
        q.record_duplicates(TableName::Cities, 0);
        assert!(q.duplicate_keys_dropped.is_empty());
        assert!(q.is_clean());
    }
}
