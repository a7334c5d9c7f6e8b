// crates/sd_cli/src/args.rs
//
// Offline CLI argument surface for `sdash`.
//
// Rules:
// - Exactly one of: --manifest <file>  XOR  --data-dir <dir>
// - No networked paths (any scheme:// is rejected)
// - --year / --quarter / --territory narrow the default selection; an omitted flag keeps
//   every observed value for that facet
// - --out <dir> writes dashboard.json; --render picks the stdout format
// - --validate-only loads and reports data quality without aggregating

use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{ArgGroup, Parser, ValueEnum};

use sd_core::Quarter;
use sd_io::looks_like_url;

/// Stdout format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Text,
    Json,
}

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "sdash",
    version,
    disable_help_subcommand = true,
    about = "Offline sales dashboard: load, filter, aggregate, render"
)]
#[command(group(ArgGroup::new("source").required(true).args(["manifest", "data_dir"])))]
pub struct Args {
    // --- Sources ---
    /// Manifest JSON naming the five sources (paths resolve against its directory).
    #[arg(long)]
    pub manifest: Option<PathBuf>,
    /// Directory holding FactSale.csv, DimCustomer.csv, DimCity.csv, DimStockItem.csv, DimEmployee.xlsx.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    // --- Selection ---
    /// Calendar year to keep (repeatable).
    #[arg(long = "year", value_name = "YEAR")]
    pub years: Vec<i32>,
    /// Quarter to keep, `Q1`..`Q4` (repeatable).
    #[arg(long = "quarter", value_name = "QUARTER", value_parser = parse_quarter)]
    pub quarters: Vec<Quarter>,
    /// Sales territory to keep (repeatable).
    #[arg(long = "territory", value_name = "NAME")]
    pub territories: Vec<String>,

    // --- Output ---
    /// Directory to write dashboard.json into (created if missing).
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Format printed on stdout.
    #[arg(long, value_enum, default_value_t = RenderFormat::Text)]
    pub render: RenderFormat,
    /// Override the ranking length (top products, customers, salespeople).
    #[arg(long, value_parser = parse_top)]
    pub top: Option<usize>,

    // --- Control ---
    /// Load and report data quality only; no aggregation.
    #[arg(long)]
    pub validate_only: bool,
    /// Log filter when RUST_LOG is unset (e.g. `debug`, `sd_io=debug,info`).
    #[arg(long, default_value = "info")]
    pub log_level: String,
    /// Only warnings and errors on stderr.
    #[arg(long)]
    pub quiet: bool,
}

/// Errors surfaced by argument validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NonLocalPath(p) => write!(f, "path must be local (no scheme): {p}"),
            CliError::NotFound(p) => write!(f, "not found: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

fn parse_quarter(s: &str) -> Result<Quarter, String> {
    Quarter::from_str(s).map_err(|e| e.to_string())
}

fn parse_top(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("must be at least 1".into()),
        Ok(n) => Ok(n),
        Err(_) => Err("must be a positive integer".into()),
    }
}

impl Args {
    /// `None` when the flag was not given, so the full facet is kept.
    pub fn years_filter(&self) -> Option<Vec<i32>> {
        non_empty(&self.years)
    }

    pub fn quarters_filter(&self) -> Option<Vec<Quarter>> {
        non_empty(&self.quarters)
    }

    pub fn territories_filter(&self) -> Option<Vec<String>> {
        non_empty(&self.territories)
    }
}

fn non_empty<T: Clone>(v: &[T]) -> Option<Vec<T>> {
    if v.is_empty() {
        None
    } else {
        Some(v.to_vec())
    }
}

/// Entry point used by main.rs. Clap itself exits with code 2 on usage errors.
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

/// Path checks after clap has enforced the flag combinations.
pub fn validate(args: Args) -> Result<Args, CliError> {
    for p in [args.manifest.as_deref(), args.data_dir.as_deref(), args.out.as_deref()]
        .into_iter()
        .flatten()
    {
        ensure_local_path(p)?;
    }
    if let Some(m) = &args.manifest {
        if !m.is_file() {
            return Err(CliError::NotFound(format!("--manifest {}", m.display())));
        }
    }
    if let Some(d) = &args.data_dir {
        if !d.is_dir() {
            return Err(CliError::NotFound(format!("--data-dir {}", d.display())));
        }
    }
    Ok(args)
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    match p.to_str() {
        Some(s) if looks_like_url(s) => Err(CliError::NonLocalPath(s.to_string())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("sdash").chain(argv.iter().copied()))
    }

    #[test]
    fn exactly_one_source_is_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--manifest", "m.json", "--data-dir", "d"]).is_err());
        assert!(parse(&["--data-dir", "d"]).is_ok());
    }

    #[test]
    fn repeated_selection_flags_collect() {
        let a = parse(&[
            "--data-dir", "d", "--year", "2015", "--year", "2016", "--quarter", "q2", "--territory", "Far West",
        ])
        .unwrap();
        assert_eq!(a.years_filter(), Some(vec![2015, 2016]));
        assert_eq!(a.quarters_filter(), Some(vec![Quarter::Q2]));
        assert_eq!(a.territories_filter(), Some(vec!["Far West".to_string()]));
        assert_eq!(a.render, RenderFormat::Text);
    }

    #[test]
    fn omitted_selection_flags_keep_full_facets() {
        let a = parse(&["--data-dir", "d"]).unwrap();
        assert_eq!(a.years_filter(), None);
        assert_eq!(a.quarters_filter(), None);
        assert_eq!(a.territories_filter(), None);
    }

    #[test]
    fn bad_quarter_and_zero_top_are_usage_errors() {
        assert!(parse(&["--data-dir", "d", "--quarter", "Q5"]).is_err());
        assert!(parse(&["--data-dir", "d", "--top", "0"]).is_err());
        assert_eq!(parse(&["--data-dir", "d", "--top", "3"]).unwrap().top, Some(3));
    }

    #[test]
    fn url_paths_are_rejected() {
        let a = parse(&["--manifest", "https://example.org/m.json"]).unwrap();
        assert!(matches!(validate(a), Err(CliError::NonLocalPath(_))));
        assert!(ensure_local_path(Path::new("/tmp/data")).is_ok());
    }

    #[test]
    fn missing_source_paths_are_reported() {
        let a = parse(&["--data-dir", "does/not/exist"]).unwrap();
        assert!(matches!(validate(a), Err(CliError::NotFound(_))));
    }
}
