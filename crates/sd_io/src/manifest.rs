// crates/sd_io/src/manifest.rs
//
// Scope:
// - Types (external Manifest, per-source specs, optional digests, limits)
// - Per-table defaults (format from extension, latin1 dimensions, header repair)
// - Validation of the external manifest (shape & offline policy, no I/O)
// - Path resolution + existence/type checks
// - Entry points: load_manifest → validate → resolve
//
// • Offline-only: any path with a scheme ("://", "http:", "https:") is rejected.
// • Paths are resolved relative to the manifest's directory.
// • Digests (if provided) are 64-lower-hex and are verified by the source
//   adapter against the raw file bytes.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use sd_core::{AggregateLimits, TableName};
use serde::{Deserialize, Serialize};

use crate::encoding::resolve_label;
use crate::hasher::is_lower_hex_64;
use crate::{looks_like_url, IoError, IoResult};

const MAX_MANIFEST_BYTES: u64 = 4 * 1024 * 1024;

/// On-disk layout of a source.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Delimited text with a comma separator.
    Csv,
    /// Spreadsheet workbook (xlsx/xlsm/xls/ods), read through calamine.
    Xlsx,
}

impl SourceFormat {
    /// Guess from a file extension; anything unrecognized is delimited text.
    pub fn from_path(path: &str) -> Self {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => SourceFormat::Xlsx,
            _ => SourceFormat::Csv,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Xlsx => "xlsx",
        }
    }
}

/// One source entry as written in the manifest. Unset fields take the
/// per-table defaults from [`SourceDefaults::for_table`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSpec {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<SourceFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promote_header: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
}

impl SourceSpec {
    pub fn at(path: impl Into<String>) -> Self {
        Self { path: path.into(), format: None, encoding: None, promote_header: None, sheet: None }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sources {
    pub sales: SourceSpec,
    pub customers: SourceSpec,
    pub cities: SourceSpec,
    pub stock_items: SourceSpec,
    pub employees: SourceSpec,
}

impl Sources {
    pub fn get(&self, table: TableName) -> &SourceSpec {
        match table {
            TableName::Sales => &self.sales,
            TableName::Customers => &self.customers,
            TableName::Cities => &self.cities,
            TableName::StockItems => &self.stock_items,
            TableName::Employees => &self.employees,
        }
    }
}

/// External manifest accepted by the loader.
///
/// `id` is optional and only echoed in the dashboard output.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub sources: Sources,
    /// Optional SHA-256 (lowercase hex) of each source's raw bytes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs_sha256: BTreeMap<TableName, String>,
    #[serde(default)]
    pub limits: AggregateLimits,
}

/// Conventional file name of each source in a data directory.
pub fn default_file_name(table: TableName) -> &'static str {
    match table {
        TableName::Sales => "FactSale.csv",
        TableName::Customers => "DimCustomer.csv",
        TableName::Cities => "DimCity.csv",
        TableName::StockItems => "DimStockItem.csv",
        TableName::Employees => "DimEmployee.xlsx",
    }
}

/// Per-table defaults applied where a source entry leaves a field unset.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SourceDefaults {
    pub encoding: &'static str,
    pub promote_header: bool,
}

impl SourceDefaults {
    pub fn for_table(table: TableName) -> Self {
        match table {
            TableName::Customers | TableName::StockItems => {
                Self { encoding: "latin1", promote_header: true }
            }
            TableName::Cities => Self { encoding: "latin1", promote_header: false },
            TableName::Sales | TableName::Employees => {
                Self { encoding: "utf-8", promote_header: false }
            }
        }
    }
}

impl Manifest {
    /// The conventional layout of a data directory, without a manifest file.
    pub fn for_directory_defaults() -> Self {
        let spec = |t: TableName| SourceSpec::at(default_file_name(t));
        Manifest {
            id: None,
            sources: Sources {
                sales: spec(TableName::Sales),
                customers: spec(TableName::Customers),
                cities: spec(TableName::Cities),
                stock_items: spec(TableName::StockItems),
                employees: spec(TableName::Employees),
            },
            inputs_sha256: BTreeMap::new(),
            limits: AggregateLimits::default(),
        }
    }

    /// Validate and resolve the conventional layout under `dir`.
    pub fn for_directory(dir: &Path) -> IoResult<ResolvedManifest> {
        let man = Self::for_directory_defaults();
        validate_manifest(&man)?;
        resolve_sources(dir, &man)
    }
}

/// A source with every default applied and its path resolved.
#[derive(Clone, Debug)]
pub struct ResolvedSource {
    pub table: TableName,
    pub path: PathBuf,
    pub format: SourceFormat,
    pub encoding: &'static Encoding,
    pub promote_header: bool,
    pub sheet: Option<String>,
    pub expected_sha256: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ResolvedManifest {
    pub id: Option<String>,
    pub base_dir: PathBuf,
    /// In `TableName::ALL` order.
    pub sources: Vec<ResolvedSource>,
    pub limits: AggregateLimits,
}

impl ResolvedManifest {
    pub fn source(&self, table: TableName) -> Option<&ResolvedSource> {
        self.sources.iter().find(|s| s.table == table)
    }
}

// ---------- helpers (pure) ----------

#[inline]
fn join_under(base: &Path, rel: &str) -> PathBuf {
    let p = Path::new(rel);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

// ---------- validation (shape, offline, digest shape; no I/O) ----------

/// Validate manifest shape and offline path policy. Does not touch the filesystem.
pub fn validate_manifest(man: &Manifest) -> IoResult<()> {
    if let Some(id) = &man.id {
        if id.trim().is_empty() {
            return Err(IoError::Manifest("id must not be empty".into()));
        }
    }

    for table in TableName::ALL {
        let spec = man.sources.get(table);
        if spec.path.trim().is_empty() {
            return Err(IoError::Manifest(format!("sources.{table}.path must not be empty")));
        }
        if looks_like_url(&spec.path) {
            return Err(IoError::Manifest(format!(
                "sources.{table}.path must be a local path (offline only): {}",
                spec.path
            )));
        }
        if let Some(label) = &spec.encoding {
            resolve_label(label)?;
        }
        let format = spec.format.unwrap_or_else(|| SourceFormat::from_path(&spec.path));
        if spec.sheet.is_some() && format != SourceFormat::Xlsx {
            return Err(IoError::Manifest(format!(
                "sources.{table}.sheet is only meaningful for spreadsheet sources"
            )));
        }
    }

    for (table, hex) in &man.inputs_sha256 {
        if !is_lower_hex_64(hex) {
            return Err(IoError::Manifest(format!(
                "inputs_sha256.{table} must be 64 lowercase hex characters"
            )));
        }
    }

    let l = &man.limits;
    if l.top_n == 0 || l.state_rows == 0 {
        return Err(IoError::Manifest("limits.top_n and limits.state_rows must be >= 1".into()));
    }
    Ok(())
}

// ---------- resolution (defaults + base dir + existence/type checks) ----------

/// Apply per-table defaults, resolve paths under `base_dir` and require each
/// source to exist as a regular file.
pub fn resolve_sources(base_dir: &Path, man: &Manifest) -> IoResult<ResolvedManifest> {
    let mut sources = Vec::with_capacity(TableName::ALL.len());
    for table in TableName::ALL {
        let spec = man.sources.get(table);
        let defaults = SourceDefaults::for_table(table);
        let path = join_under(base_dir, &spec.path);
        must_exist_file(table, &path)?;

        let encoding = resolve_label(spec.encoding.as_deref().unwrap_or(defaults.encoding))?;
        sources.push(ResolvedSource {
            table,
            format: spec.format.unwrap_or_else(|| SourceFormat::from_path(&spec.path)),
            encoding,
            promote_header: spec.promote_header.unwrap_or(defaults.promote_header),
            sheet: spec.sheet.clone(),
            expected_sha256: man.inputs_sha256.get(&table).cloned(),
            path,
        });
    }
    Ok(ResolvedManifest {
        id: man.id.clone(),
        base_dir: base_dir.to_path_buf(),
        sources,
        limits: man.limits,
    })
}

fn must_exist_file(table: TableName, p: &Path) -> IoResult<()> {
    let md = fs::metadata(p)
        .map_err(|e| IoError::Read(format!("{table} source {}: {e}", p.display())))?;
    if !md.is_file() {
        return Err(IoError::Path(format!("{table} source is not a file: {}", p.display())));
    }
    Ok(())
}

// ---------- top-level load ----------

/// Read, schema-check and deserialize a manifest file. No resolution.
pub fn load_manifest(manifest_path: &Path) -> IoResult<Manifest> {
    let f = fs::File::open(manifest_path)
        .map_err(|e| IoError::Read(format!("{}: {e}", manifest_path.display())))?;
    let mut buf = Vec::new();
    f.take(MAX_MANIFEST_BYTES)
        .read_to_end(&mut buf)
        .map_err(|e| IoError::Read(format!("{}: {e}", manifest_path.display())))?;

    let value: serde_json::Value = serde_json::from_slice(&buf)?;
    crate::schema::validate_manifest_value(&value)?;
    let man: Manifest = serde_json::from_value(value)?;
    validate_manifest(&man)?;
    Ok(man)
}

/// Load a manifest, validate it, and resolve its sources under the
/// manifest's own directory.
pub fn load_and_resolve_manifest(manifest_path: &Path) -> IoResult<ResolvedManifest> {
    let man = load_manifest(manifest_path)?;
    let base = match manifest_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    resolve_sources(&base, &man)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_guessed_from_extension() {
        assert_eq!(SourceFormat::from_path("DimEmployee.XLSX"), SourceFormat::Xlsx);
        assert_eq!(SourceFormat::from_path("FactSale.csv"), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path("noext"), SourceFormat::Csv);
    }

    #[test]
    fn directory_defaults_match_conventional_layout() {
        let m = Manifest::for_directory_defaults();
        assert_eq!(m.sources.employees.path, "DimEmployee.xlsx");
        assert!(validate_manifest(&m).is_ok());
        assert!(SourceDefaults::for_table(TableName::Customers).promote_header);
        assert!(!SourceDefaults::for_table(TableName::Cities).promote_header);
        assert_eq!(SourceDefaults::for_table(TableName::Cities).encoding, "latin1");
    }

    #[test]
    fn url_paths_are_rejected() {
        let mut m = Manifest::for_directory_defaults();
        m.sources.sales.path = "https://example.org/FactSale.csv".into();
        let err = validate_manifest(&m).unwrap_err();
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn bad_digest_shape_is_rejected() {
        let mut m = Manifest::for_directory_defaults();
        m.inputs_sha256.insert(TableName::Sales, "xyz".into());
        assert!(matches!(validate_manifest(&m), Err(IoError::Manifest(_))));
    }

    #[test]
    fn sheet_on_csv_source_is_rejected() {
        let mut m = Manifest::for_directory_defaults();
        m.sources.cities.sheet = Some("Sheet1".into());
        assert!(validate_manifest(&m).is_err());
    }

    #[test]
    fn unknown_fields_fail_deserialization() {
        let raw = r#"{"sources":{
            "sales":{"path":"a.csv","delimiter":";"},
            "customers":{"path":"b.csv"},"cities":{"path":"c.csv"},
            "stock_items":{"path":"d.csv"},"employees":{"path":"e.xlsx"}}}"#;
        assert!(serde_json::from_str::<Manifest>(raw).is_err());
    }

    #[test]
    fn missing_file_fails_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::for_directory(dir.path()).unwrap_err();
        assert!(matches!(err, IoError::Read(_)));
    }
}
