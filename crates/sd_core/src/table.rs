//! Uniform tabular records as returned by any data source: an ordered header
//! and ordered rows of optional cell text. Absent cells are `None`, never "".

use core::fmt;
use core::str::FromStr;

use crate::errors::CoreError;

/// The five sources the dashboard reads.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TableName {
    Sales,
    Customers,
    Cities,
    StockItems,
    Employees,
}

impl TableName {
    /// Load order (facts first, then the dimensions in join order).
    pub const ALL: [TableName; 5] = [
        TableName::Sales,
        TableName::Customers,
        TableName::Cities,
        TableName::StockItems,
        TableName::Employees,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Sales => "sales",
            TableName::Customers => "customers",
            TableName::Cities => "cities",
            TableName::StockItems => "stock_items",
            TableName::Employees => "employees",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableName::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownTable(s.to_string()))
    }
}

/// A table exactly as read from storage, before any repair or coercion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawTable {
    pub name: TableName,
    /// First physical row. May be a caption rather than the real header.
    pub header: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(name: TableName, header: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { name, header, rows }
    }

    /// Convenience constructor for fixtures: `""` becomes an absent cell.
    pub fn from_strs(name: TableName, header: &[&str], rows: &[&[&str]]) -> Self {
        let header = header.iter().map(|h| h.to_string()).collect();
        let rows = rows
            .iter()
            .map(|r| {
                r.iter()
                    .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                    .collect()
            })
            .collect();
        Self { name, header, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first header cell equal to `column` (exact match after trim).
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == column)
    }

    /// Cell text at (`row`, `col`). Short rows read as absent.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }
}
