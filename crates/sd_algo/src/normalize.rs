//! Table Normalizer: header repair, required-column checks, key dedup.

use std::collections::BTreeSet;

use sd_core::{RawTable, SchemaError};

/// Replace the header with the first data row and drop that row.
///
/// Some exports carry a caption line above the real header; this repairs them.
/// Header cells are trimmed and absent cells become empty names.
pub fn promote_header(raw: RawTable) -> Result<RawTable, SchemaError> {
    let RawTable { name, rows, .. } = raw;
    let mut rows = rows.into_iter();
    let first = rows.next().ok_or(SchemaError::NoHeaderRow { table: name })?;
    let header = first
        .into_iter()
        .map(|c| c.map(|s| s.trim().to_string()).unwrap_or_default())
        .collect();
    Ok(RawTable::new(name, header, rows.collect()))
}

/// Apply header repair when requested; otherwise just trim header names.
pub fn normalize_table(raw: RawTable, promote: bool) -> Result<RawTable, SchemaError> {
    if promote {
        return promote_header(raw);
    }
    let RawTable { name, header, rows } = raw;
    let header = header.into_iter().map(|h| h.trim().to_string()).collect();
    Ok(RawTable::new(name, header, rows))
}

/// Column positions for `names`, in the same order, or the first missing column.
pub fn require_columns<const N: usize>(
    table: &RawTable,
    names: &[&'static str; N],
) -> Result<[usize; N], SchemaError> {
    let mut out = [0usize; N];
    for (slot, &column) in out.iter_mut().zip(names.iter()) {
        *slot = table
            .column_index(column)
            .ok_or(SchemaError::MissingColumn { table: table.name, column })?;
    }
    Ok(out)
}

/// Keep the first row for each key; later rows with a seen key are dropped.
/// Returns the surviving rows in their original order and the drop count.
pub fn dedup_on_key<T, K, F>(rows: Vec<T>, key: F) -> (Vec<T>, usize)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let before = rows.len();
    let mut seen = BTreeSet::new();
    let kept: Vec<T> = rows.into_iter().filter(|r| seen.insert(key(r))).collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sd_core::TableName;

    fn captioned() -> RawTable {
        RawTable::from_strs(
            TableName::Customers,
            &["Dimension.Customer"],
            &[&[" Customer Key ", "Customer", ""], &["7", "Acme", "x"]],
        )
    }

    #[test]
    fn promotion_uses_first_data_row_as_header() {
        let t = promote_header(captioned()).unwrap();
        assert_eq!(t.header, vec!["Customer Key", "Customer", ""]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.cell(0, 1), Some("Acme"));
    }

    #[test]
    fn promotion_without_rows_is_a_schema_error() {
        let raw = RawTable::from_strs(TableName::StockItems, &["caption"], &[]);
        assert_eq!(
            promote_header(raw),
            Err(SchemaError::NoHeaderRow { table: TableName::StockItems })
        );
    }

    #[test]
    fn missing_required_column_is_named() {
        let t = normalize_table(captioned(), false).unwrap();
        let err = require_columns(&t, &["Customer Key"]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumn { table: TableName::Customers, column: "Customer Key" }
        );

        let t = normalize_table(captioned(), true).unwrap();
        assert_eq!(require_columns(&t, &["Customer", "Customer Key"]).unwrap(), [1, 0]);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let rows = vec![(7, "Acme"), (8, "Beta"), (7, "Acme Duplicate"), (7, "again")];
        let (kept, dropped) = dedup_on_key(rows, |r| r.0);
        assert_eq!(kept, vec![(7, "Acme"), (8, "Beta")]);
        assert_eq!(dropped, 2);
    }
}
