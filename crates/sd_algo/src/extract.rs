//! Typed extraction from normalized tables.
//!
//! Required columns are checked first (fatal). After that every per-row
//! problem is recorded in the `DataQualityReport` and the row is kept with
//! the offending value absent. Dimension rows without a usable key are
//! dropped; duplicates keep their first occurrence.

use sd_core::columns::{cities, customers, employees, sales, stock_items};
use sd_core::{
    coerce_key, CityRow, CustomerRow, DataQualityReport, EmployeeRow, KeyCoercion,
    KeyCoercionWarning, Money, RawTable, SalesFact, SchemaError, StockItemRow, SurrogateKey,
    TableName,
};

use crate::dates::derive_period;
use crate::normalize::{dedup_on_key, require_columns};

/// The four deduplicated dimension tables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dimensions {
    pub customers: Vec<CustomerRow>,
    pub cities: Vec<CityRow>,
    pub stock_items: Vec<StockItemRow>,
    pub employees: Vec<EmployeeRow>,
}

fn text(cell: Option<&str>) -> Option<String> {
    cell.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn key_cell(
    table: &RawTable,
    row: usize,
    col: usize,
    column: &str,
    q: &mut DataQualityReport,
) -> Option<SurrogateKey> {
    match coerce_key(table.cell(row, col)) {
        KeyCoercion::Parsed(k) => Some(k),
        KeyCoercion::Absent(raw) => {
            q.record_key_warning(KeyCoercionWarning {
                table: table.name,
                column: column.to_string(),
                row: row + 1,
                raw,
            });
            None
        }
    }
}

fn money_cell(table: &RawTable, row: usize, col: usize, column: &str, q: &mut DataQualityReport) -> Option<Money> {
    let raw = table.cell(row, col)?;
    if raw.trim().is_empty() {
        return None;
    }
    match Money::parse(raw) {
        Ok(m) => Some(m),
        Err(_) => {
            q.record_invalid_measure(column);
            None
        }
    }
}

fn quantity_cell(table: &RawTable, row: usize, col: usize, q: &mut DataQualityReport) -> Option<i64> {
    let raw = table.cell(row, col)?;
    if raw.trim().is_empty() {
        return None;
    }
    // Same integer shapes as keys ("5", "5.0").
    match coerce_key(Some(raw)) {
        KeyCoercion::Parsed(k) => Some(k.get()),
        KeyCoercion::Absent(_) => {
            q.record_invalid_measure(sales::QUANTITY);
            None
        }
    }
}

/// Build the sales facts, deriving each row's period.
pub fn extract_sales(table: &RawTable, q: &mut DataQualityReport) -> Result<Vec<SalesFact>, SchemaError> {
    let [
        invoice_id,
        invoice_date,
        customer_key,
        city_key,
        stock_item_key,
        salesperson_key,
        description,
        quantity,
        unit_price,
        total_excl,
        tax_amount,
        total_incl,
        profit,
    ] = require_columns(table, &sales::REQUIRED)?;
    q.rows_loaded.insert(TableName::Sales, table.len());

    let mut out = Vec::with_capacity(table.len());
    for r in 0..table.len() {
        let row = r + 1;
        let date_raw = table.cell(r, invoice_date);
        let period = match derive_period(row, date_raw) {
            Ok(p) => Some(p),
            Err(e) => {
                q.record_invalid_date(e);
                None
            }
        };
        out.push(SalesFact {
            row,
            invoice_id: text(table.cell(r, invoice_id)),
            invoice_date: text(date_raw),
            period,
            customer_key: key_cell(table, r, customer_key, sales::CUSTOMER_KEY, q),
            city_key: key_cell(table, r, city_key, sales::CITY_KEY, q),
            stock_item_key: key_cell(table, r, stock_item_key, sales::STOCK_ITEM_KEY, q),
            salesperson_key: key_cell(table, r, salesperson_key, sales::SALESPERSON_KEY, q),
            description: text(table.cell(r, description)),
            quantity: quantity_cell(table, r, quantity, q),
            unit_price: money_cell(table, r, unit_price, sales::UNIT_PRICE, q),
            total_excluding_tax: money_cell(table, r, total_excl, sales::TOTAL_EXCLUDING_TAX, q),
            tax_amount: money_cell(table, r, tax_amount, sales::TAX_AMOUNT, q),
            total_including_tax: money_cell(table, r, total_incl, sales::TOTAL_INCLUDING_TAX, q),
            profit: money_cell(table, r, profit, sales::PROFIT, q),
        });
    }
    Ok(out)
}

/// Shared shape of every dimension: coerce the key, drop keyless rows,
/// keep the first row per key.
fn extract_dimension<T, F>(
    table: &RawTable,
    key_col: usize,
    key_name: &str,
    q: &mut DataQualityReport,
    build: F,
) -> Vec<T>
where
    F: Fn(SurrogateKey, usize) -> T,
{
    q.rows_loaded.insert(table.name, table.len());
    let mut rows = Vec::with_capacity(table.len());
    for r in 0..table.len() {
        if let Some(key) = key_cell(table, r, key_col, key_name, q) {
            rows.push((key, build(key, r)));
        }
    }
    let (kept, dropped) = dedup_on_key(rows, |(k, _)| *k);
    q.record_duplicates(table.name, dropped);
    kept.into_iter().map(|(_, row)| row).collect()
}

pub fn extract_customers(table: &RawTable, q: &mut DataQualityReport) -> Result<Vec<CustomerRow>, SchemaError> {
    let [key, name] = require_columns(table, &customers::REQUIRED)?;
    Ok(extract_dimension(table, key, customers::KEY, q, |k, r| CustomerRow {
        key: k,
        name: text(table.cell(r, name)),
    }))
}

pub fn extract_cities(table: &RawTable, q: &mut DataQualityReport) -> Result<Vec<CityRow>, SchemaError> {
    let [key, city, state, territory] = require_columns(table, &cities::REQUIRED)?;
    Ok(extract_dimension(table, key, cities::KEY, q, |k, r| CityRow {
        key: k,
        city: text(table.cell(r, city)),
        state_province: text(table.cell(r, state)),
        sales_territory: text(table.cell(r, territory)),
    }))
}

pub fn extract_stock_items(table: &RawTable, q: &mut DataQualityReport) -> Result<Vec<StockItemRow>, SchemaError> {
    let [key, name] = require_columns(table, &stock_items::REQUIRED)?;
    Ok(extract_dimension(table, key, stock_items::KEY, q, |k, r| StockItemRow {
        key: k,
        name: text(table.cell(r, name)),
    }))
}

pub fn extract_employees(table: &RawTable, q: &mut DataQualityReport) -> Result<Vec<EmployeeRow>, SchemaError> {
    let [key, name] = require_columns(table, &employees::REQUIRED)?;
    Ok(extract_dimension(table, key, employees::KEY, q, |k, r| EmployeeRow {
        key: k,
        preferred_name: text(table.cell(r, name)),
    }))
}
