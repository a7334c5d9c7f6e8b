//! LOAD stage: data source → normalized tables → typed facts and dimensions.
//! - Every source is read before anything is joined; the first fatal error stops the load.
//! - Header repair is driven by the source's `promote_header` flag.
//! - Per-row issues land in the `DataQualityReport` and are logged, never raised.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use sd_algo::extract::{
    extract_cities, extract_customers, extract_employees, extract_sales, extract_stock_items,
};
use sd_algo::{normalize_table, Dimensions};
use sd_core::{DataQualityReport, SalesFact, TableName};
use sd_io::source::DataSource;

use crate::PipelineError;

/// What was loaded for one source, echoed in the dashboard output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEcho {
    pub table: TableName,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Data rows after header repair.
    pub rows: usize,
}

/// Typed output of the load stage.
#[derive(Debug, Clone)]
pub struct LoadedTables {
    pub facts: Vec<SalesFact>,
    pub dims: Dimensions,
    pub quality: DataQualityReport,
    /// In `TableName::ALL` order.
    pub inputs: Vec<InputEcho>,
}

/// Read and type all five tables from `source`.
pub fn load_tables(source: &dyn DataSource) -> Result<LoadedTables, PipelineError> {
    let mut quality = DataQualityReport::default();
    let mut inputs = Vec::with_capacity(TableName::ALL.len());
    let mut facts = Vec::new();
    let mut dims = Dimensions::default();

    for table in TableName::ALL {
        let st = source.load(table)?;
        let normalized = normalize_table(st.raw, st.promote_header)?;
        inputs.push(InputEcho {
            table,
            location: st.location,
            sha256: st.sha256,
            rows: normalized.len(),
        });

        match table {
            TableName::Sales => facts = extract_sales(&normalized, &mut quality)?,
            TableName::Customers => dims.customers = extract_customers(&normalized, &mut quality)?,
            TableName::Cities => dims.cities = extract_cities(&normalized, &mut quality)?,
            TableName::StockItems => {
                dims.stock_items = extract_stock_items(&normalized, &mut quality)?
            }
            TableName::Employees => dims.employees = extract_employees(&normalized, &mut quality)?,
        }
        debug!(table = %table, rows = normalized.len(), "normalized");
    }

    log_quality(&quality);
    info!(
        facts = facts.len(),
        customers = dims.customers.len(),
        cities = dims.cities.len(),
        stock_items = dims.stock_items.len(),
        employees = dims.employees.len(),
        "sources loaded"
    );
    Ok(LoadedTables { facts, dims, quality, inputs })
}

fn log_quality(q: &DataQualityReport) {
    for (column, n) in &q.key_warnings {
        warn!(column = %column, count = n, "key values not coercible to integers; treated as absent");
    }
    for w in &q.key_warning_samples {
        debug!(table = %w.table, column = %w.column, row = w.row, raw = ?w.raw, "absent key");
    }
    for (table, n) in &q.duplicate_keys_dropped {
        warn!(table = %table, count = n, "duplicate dimension keys dropped (first occurrence kept)");
    }
    if q.invalid_dates > 0 {
        warn!(count = q.invalid_dates, "invoice dates not parseable; rows excluded from every view");
        for e in &q.invalid_date_samples {
            debug!(row = e.row, raw = %e.raw, "invalid invoice date");
        }
    }
    for (column, n) in &q.invalid_measures {
        warn!(column = %column, count = n, "measure values not parseable; treated as absent");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sd_core::columns::sales;
    use sd_core::{RawTable, SchemaError};
    use sd_io::source::InMemorySource;

    pub(crate) fn fixture() -> InMemorySource {
        InMemorySource::new()
            .with_table(
                RawTable::from_strs(
                    TableName::Sales,
                    &sales::REQUIRED,
                    &[&["1001", "2015-03-15", "7", "1", "", "", "Mug", "1", "100", "100", "20", "120", "20"]],
                ),
                false,
            )
            .with_table(
                RawTable::from_strs(
                    TableName::Customers,
                    &["Dimension.Customer"],
                    &[&["Customer Key", "Customer"], &["7", "Acme"]],
                ),
                true,
            )
            .with_table(
                RawTable::from_strs(
                    TableName::Cities,
                    &["City Key", "City", "State Province", "Sales Territory"],
                    &[&["1", "Abbeville", "Alabama", "Southeast"]],
                ),
                false,
            )
            .with_table(
                RawTable::from_strs(
                    TableName::StockItems,
                    &["caption"],
                    &[&["Stock Item Key", "Stock Item"]],
                ),
                true,
            )
            .with_table(
                RawTable::from_strs(TableName::Employees, &["Employee Key", "Preferred Name"], &[]),
                false,
            )
    }

    #[test]
    fn loads_all_tables_with_header_repair() {
        let loaded = load_tables(&fixture()).unwrap();
        assert_eq!(loaded.facts.len(), 1);
        assert_eq!(loaded.dims.customers.len(), 1);
        assert_eq!(loaded.dims.cities.len(), 1);
        assert!(loaded.dims.stock_items.is_empty());
        let tables: Vec<TableName> = loaded.inputs.iter().map(|i| i.table).collect();
        assert_eq!(tables, TableName::ALL);
        assert_eq!(loaded.inputs[1].location, "memory:customers");
        assert_eq!(loaded.inputs[1].rows, 1);
    }

    #[test]
    fn missing_column_after_normalization_aborts() {
        let src = fixture().with_table(
            RawTable::from_strs(TableName::Customers, &["Customer Key", "Customer"], &[&["7", "Acme"]]),
            true,
        );
        match load_tables(&src) {
            Err(PipelineError::Schema(SchemaError::MissingColumn { table, column })) => {
                assert_eq!(table, TableName::Customers);
                assert_eq!(column, "Customer Key");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_table_is_an_io_error() {
        let src = InMemorySource::new();
        assert!(matches!(load_tables(&src), Err(PipelineError::Io(_))));
    }
}
