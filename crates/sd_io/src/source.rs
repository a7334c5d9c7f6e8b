//! Data Source Adapter: turns storage into uniform `RawTable`s.
//!
//! The rest of the engine only sees an ordered header plus ordered rows of
//! optional cell text. Whether the bytes came from a delimited file, a
//! workbook, or a test fixture is decided here and nowhere else.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use sd_core::{RawTable, TableName};
use tracing::{debug, info};

use crate::encoding::decode_strict;
use crate::hasher::{sha256_hex, verify_digest};
use crate::manifest::{ResolvedManifest, ResolvedSource, SourceFormat};
use crate::{IoError, IoResult};

/// A loaded table plus what the normalizer needs to know about it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceTable {
    pub raw: RawTable,
    /// The first data row holds the real header.
    pub promote_header: bool,
    /// Where it came from (path or fixture label), for messages and the run summary.
    pub location: String,
    /// SHA-256 of the raw bytes, when the source has bytes.
    pub sha256: Option<String>,
}

/// Anything that can hand out the five tables.
pub trait DataSource {
    fn load(&self, table: TableName) -> IoResult<SourceTable>;
}

// ------------------------------------------------------------------------
// File-backed source
// ------------------------------------------------------------------------

/// Reads the sources named by a resolved manifest.
#[derive(Clone, Debug)]
pub struct FileSource {
    manifest: ResolvedManifest,
}

impl FileSource {
    pub fn new(manifest: ResolvedManifest) -> Self {
        Self { manifest }
    }
}

impl DataSource for FileSource {
    fn load(&self, table: TableName) -> IoResult<SourceTable> {
        let src = self
            .manifest
            .source(table)
            .ok_or_else(|| IoError::Manifest(format!("no source configured for {table}")))?;
        let location = src.path.display().to_string();

        let bytes = fs::read(&src.path).map_err(|e| IoError::Read(format!("{location}: {e}")))?;
        let digest = sha256_hex(&bytes);
        verify_digest(table.as_str(), src.expected_sha256.as_deref(), &digest)?;

        let raw = match src.format {
            SourceFormat::Csv => read_delimited(table, &bytes, src)?,
            SourceFormat::Xlsx => read_workbook(table, &src.path, src.sheet.as_deref())?,
        };
        info!(
            table = %table,
            path = %location,
            format = src.format.as_str(),
            rows = raw.len(),
            columns = raw.header.len(),
            "loaded source"
        );
        debug!(table = %table, sha256 = %digest);

        Ok(SourceTable { raw, promote_header: src.promote_header, location, sha256: Some(digest) })
    }
}

/// Parse delimited text. The first physical record is taken as the header;
/// header repair happens later, in the normalizer.
fn read_delimited(table: TableName, bytes: &[u8], src: &ResolvedSource) -> IoResult<RawTable> {
    let location = src.path.display().to_string();
    let text = decode_strict(bytes, src.encoding, &location)?;
    parse_delimited(table, &text, &location)
}

/// Parse already-decoded delimited text into a `RawTable`.
pub fn parse_delimited(table: TableName, text: &str, location: &str) -> IoResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(|e| IoError::Csv { path: location.to_string(), msg: e.to_string() })?;
        match header {
            None => header = Some(rec.iter().map(str::to_string).collect()),
            Some(_) => rows.push(
                rec.iter()
                    .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                    .collect(),
            ),
        }
    }
    Ok(RawTable::new(table, header.unwrap_or_default(), rows))
}

#[cfg(feature = "xlsx")]
fn read_workbook(table: TableName, path: &Path, sheet: Option<&str>) -> IoResult<RawTable> {
    use calamine::{open_workbook_auto, Reader};

    let location = path.display().to_string();
    let err = |msg: String| IoError::Spreadsheet { path: location.clone(), msg };

    let mut wb = open_workbook_auto(path).map_err(|e| err(e.to_string()))?;
    let range = match sheet {
        Some(name) => wb.worksheet_range(name).map_err(|e| err(format!("sheet {name:?}: {e}")))?,
        None => wb
            .worksheet_range_at(0)
            .ok_or_else(|| err("workbook has no worksheets".to_string()))?
            .map_err(|e| err(e.to_string()))?,
    };

    let mut grid = range.rows();
    let header: Vec<String> = grid
        .next()
        .map(|r| r.iter().map(|c| cell_text(c).unwrap_or_default()).collect())
        .unwrap_or_default();
    let rows = grid.map(|r| r.iter().map(cell_text).collect()).collect();

    Ok(RawTable::new(table, header, rows))
}

/// Workbook cell as table text. Whole floats below 2^53 print without a
/// fraction so numeric key columns read back as integers.
#[cfg(feature = "xlsx")]
fn cell_text(v: &calamine::Data) -> Option<String> {
    use calamine::Data;

    match v {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => Some(format!("{f:.0}")),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Some(match dt.as_datetime() {
            Some(ndt) => ndt.to_string(),
            None => dt.as_f64().to_string(),
        }),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(_) => None,
    }
}

#[cfg(not(feature = "xlsx"))]
fn read_workbook(_table: TableName, path: &Path, _sheet: Option<&str>) -> IoResult<RawTable> {
    Err(IoError::Spreadsheet {
        path: path.display().to_string(),
        msg: "spreadsheet sources require the `xlsx` feature".to_string(),
    })
}

// ------------------------------------------------------------------------
// In-memory source (fixtures, embedding)
// ------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
    tables: BTreeMap<TableName, SourceTable>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `raw` under its own table name, replacing any earlier entry.
    pub fn with_table(mut self, raw: RawTable, promote_header: bool) -> Self {
        let name = raw.name;
        self.tables.insert(
            name,
            SourceTable { raw, promote_header, location: format!("memory:{name}"), sha256: None },
        );
        self
    }
}

impl DataSource for InMemorySource {
    fn load(&self, table: TableName) -> IoResult<SourceTable> {
        self.tables
            .get(&table)
            .cloned()
            .ok_or_else(|| IoError::Read(format!("memory:{table}: table not provided")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_first_record_is_header_and_empty_cells_are_absent() {
        let t = parse_delimited(
            TableName::Cities,
            "City Key,City,State Province,Sales Territory\n1,Abbeville,Alabama,Southeast\n2,,Texas,\n",
            "t.csv",
        )
        .unwrap();
        assert_eq!(t.header[3], "Sales Territory");
        assert_eq!(t.len(), 2);
        assert_eq!(t.cell(1, 1), None);
        assert_eq!(t.cell(1, 2), Some("Texas"));
        assert_eq!(t.cell(1, 3), None);
    }

    #[test]
    fn ragged_rows_are_accepted() {
        let t = parse_delimited(TableName::Customers, "caption\nCustomer Key,Customer\n7,Acme\n", "t.csv")
            .unwrap();
        assert_eq!(t.header, vec!["caption".to_string()]);
        assert_eq!(t.rows[0], vec![Some("Customer Key".into()), Some("Customer".into())]);
    }

    #[test]
    fn quoted_commas_stay_in_one_cell() {
        let t = parse_delimited(TableName::Sales, "Description\n\"Mug, large\"\n", "t.csv").unwrap();
        assert_eq!(t.cell(0, 0), Some("Mug, large"));
    }

    #[test]
    fn empty_text_yields_empty_table() {
        let t = parse_delimited(TableName::Sales, "", "t.csv").unwrap();
        assert!(t.header.is_empty());
        assert!(t.is_empty());
    }

    #[test]
    fn in_memory_source_returns_registered_tables_only() {
        let src = InMemorySource::new()
            .with_table(RawTable::from_strs(TableName::Customers, &["Customer Key"], &[&["7"]]), true);
        let got = src.load(TableName::Customers).unwrap();
        assert!(got.promote_header);
        assert_eq!(got.location, "memory:customers");
        assert!(src.load(TableName::Cities).is_err());
    }

    #[cfg(feature = "xlsx")]
    mod workbook_cells {
        use super::super::cell_text;
        use calamine::{CellErrorType, Data, ExcelDateTime, ExcelDateTimeType};
        use sd_core::keys::{coerce_key, KeyCoercion};
        use sd_core::SurrogateKey;

        fn text(v: Data) -> Option<String> {
            cell_text(&v)
        }

        #[test]
        fn whole_floats_read_back_as_integer_keys() {
            assert_eq!(text(Data::Float(3.0)).as_deref(), Some("3"));
            assert_eq!(text(Data::Float(-12.0)).as_deref(), Some("-12"));
            let cell = text(Data::Float(3.0));
            assert_eq!(coerce_key(cell.as_deref()), KeyCoercion::Parsed(SurrogateKey::new(3)));
        }

        #[test]
        fn fractional_and_huge_floats_keep_their_digits() {
            assert_eq!(text(Data::Float(2.5)).as_deref(), Some("2.5"));
            assert_eq!(text(Data::Float(1e20)).as_deref(), Some("100000000000000000000"));
            let cell = text(Data::Float(2.5));
            assert!(matches!(coerce_key(cell.as_deref()), KeyCoercion::Absent(_)));
        }

        #[test]
        fn ints_strings_and_bools() {
            assert_eq!(text(Data::Int(42)).as_deref(), Some("42"));
            assert_eq!(text(Data::String("Kayla".into())).as_deref(), Some("Kayla"));
            assert_eq!(text(Data::Bool(true)).as_deref(), Some("TRUE"));
            assert_eq!(text(Data::Bool(false)).as_deref(), Some("FALSE"));
        }

        #[test]
        fn blank_and_error_cells_are_absent() {
            assert_eq!(text(Data::Empty), None);
            assert_eq!(text(Data::String(String::new())), None);
            assert_eq!(text(Data::Error(CellErrorType::NA)), None);
        }

        #[test]
        fn dates_render_as_iso_text() {
            let dt = ExcelDateTime::new(45_000.5, ExcelDateTimeType::DateTime, false);
            assert_eq!(text(Data::DateTime(dt)).as_deref(), Some("2023-03-15 12:00:00"));
            assert_eq!(
                text(Data::DateTimeIso("2016-05-31T00:00:00".into())).as_deref(),
                Some("2016-05-31T00:00:00")
            );
            assert_eq!(text(Data::DurationIso("PT1H".into())).as_deref(), Some("PT1H"));
        }
    }
}
