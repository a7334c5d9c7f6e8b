//! crates/sd_core/src/errors.rs
//! Error and signal types shared across the workspace. No I/O here.

use core::fmt;

use crate::table::TableName;

/// Minimal error set for core-domain parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CoreError {
    InvalidMoney(String),
    InvalidQuarter(String),
    InvalidYearMonth(String),
    MonthOutOfRange(u32),
    UnknownTable(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidMoney(s) => write!(f, "invalid money amount: {s:?}"),
            CoreError::InvalidQuarter(s) => write!(f, "invalid quarter label: {s:?}"),
            CoreError::InvalidYearMonth(s) => write!(f, "invalid year-month label: {s:?}"),
            CoreError::MonthOutOfRange(m) => write!(f, "month out of range: {m}"),
            CoreError::UnknownTable(s) => write!(f, "unknown table: {s:?}"),
        }
    }
}

impl std::error::Error for CoreError {}

/// Structural defects found while normalizing a source table. Fatal for the table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SchemaError {
    /// Header promotion was requested but the table has no row to promote.
    NoHeaderRow { table: TableName },
    /// A required column is absent after normalization.
    MissingColumn { table: TableName, column: &'static str },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::NoHeaderRow { table } => {
                write!(f, "{table}: no row available to promote to header")
            }
            SchemaError::MissingColumn { table, column } => {
                write!(f, "{table}: required column {column:?} is missing")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// A ratio was requested over a zero denominator.
///
/// Returned as the `Err` side of every margin/share/average computation. It is
/// a value, not a failure: callers render it as "undefined", never as zero.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct DivisionUndefined;

impl fmt::Display for DivisionUndefined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("division undefined (zero denominator)")
    }
}

impl std::error::Error for DivisionUndefined {}

/// An invoice date could not be parsed into a calendar date.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InvalidDateError {
    /// 1-based data row in the source table.
    pub row: usize,
    /// Raw cell text (empty when the cell was absent).
    pub raw: String,
}

impl fmt::Display for InvalidDateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: unparseable invoice date {:?}", self.row, self.raw)
    }
}

impl std::error::Error for InvalidDateError {}
