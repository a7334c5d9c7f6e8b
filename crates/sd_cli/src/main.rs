// crates/sd_cli/src/main.rs
//
// Wires up: exit codes, typed error mapping, logging, CLI parsing, the
// validate-only short-circuit, and the full run path
// (load → context → selection → dashboard → report → outputs).

mod args;

mod exitcodes {
    pub const OK: u8 = 0;
    pub const VALIDATION: u8 = 2;
    pub const IO: u8 = 4;
    pub const PIPELINE: u8 = 5;
}

use std::fmt;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Args, RenderFormat};

use sd_core::DataQualityReport;
use sd_io::canonical_json;
use sd_pipeline::{build_dashboard, DataContext, PipelineError};
use sd_report::{build_model, ReportModel};

const DASHBOARD_FILE: &str = "dashboard.json";

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Manifest shape, schema, digest expectations.
    Validation(String),
    /// Reading, decoding or writing files.
    Io(String),
    /// Unusable table structure or a join invariant broken.
    Pipeline(String),
    /// Report build or output.
    Render(String),
}

impl fmt::Display for MainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
            MainError::Pipeline(m) => write!(f, "pipeline: {m}"),
            MainError::Render(m) => write!(f, "render: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("sdash: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION);
        }
    };
    init_logging(&args);

    let outcome = if args.validate_only { validate_only(&args) } else { run_once(&args) };
    match outcome {
        Ok(()) => ExitCode::from(exitcodes::OK),
        Err(e) => {
            eprintln!("sdash: error: {e}");
            ExitCode::from(map_error(&e))
        }
    }
}

/// RUST_LOG wins; otherwise `--log-level` (or `warn` under `--quiet`). Logs go to stderr.
fn init_logging(args: &Args) {
    let level = if args.quiet { "warn" } else { args.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_context(args: &Args) -> Result<DataContext, MainError> {
    let ctx = match (&args.manifest, &args.data_dir) {
        (Some(m), _) => DataContext::from_manifest_path(m),
        (None, Some(d)) => DataContext::from_directory(d),
        (None, None) => return Err(MainError::Validation("one of --manifest or --data-dir is required".into())),
    };
    ctx.map_err(map_pipeline_err)
}

/// Validate-only path: load everything, print the data-quality summary, no aggregation.
fn validate_only(args: &Args) -> Result<(), MainError> {
    let ctx = load_context(args)?;
    let q = ctx.quality();
    match args.render {
        RenderFormat::Json => {
            let text = serde_json::to_string_pretty(q).map_err(|e| MainError::Render(e.to_string()))?;
            println!("{text}");
        }
        RenderFormat::Text => print!("{}", quality_summary(q, ctx.rows().len())),
    }
    Ok(())
}

fn quality_summary(q: &DataQualityReport, rows: usize) -> String {
    let mut out = format!("validate-only: inputs OK ({rows} sales rows)\n");
    for (table, n) in &q.rows_loaded {
        out.push_str(&format!("  {table}: {n} rows\n"));
    }
    out.push_str(&format!("  key warnings: {}\n", q.total_key_warnings()));
    out.push_str(&format!("  duplicate keys dropped: {}\n", q.total_duplicates_dropped()));
    out.push_str(&format!("  invalid dates: {}\n", q.invalid_dates));
    out.push_str(&format!("  invalid measures: {}\n", q.total_invalid_measures()));
    out
}

fn run_once(args: &Args) -> Result<(), MainError> {
    let ctx = load_context(args)?;

    let mut limits = ctx.limits();
    if let Some(n) = args.top {
        limits.top_n = n;
    }

    let sel = ctx.selection(args.years_filter(), args.quarters_filter(), args.territories_filter());
    for t in sel.territories.difference(&ctx.facets().territories) {
        warn!(territory = %t, "selected territory not present in the data");
    }
    for y in sel.years.difference(&ctx.facets().years) {
        warn!(year = y, "selected year not present in the data");
    }

    let dashboard = build_dashboard(&ctx, &sel, &limits);
    let model = build_model(&dashboard).map_err(|e| MainError::Render(e.to_string()))?;

    if let Some(out) = &args.out {
        write_dashboard(out, &model)?;
    }

    let rendered = match args.render {
        RenderFormat::Text => render_text_report(&model)?,
        RenderFormat::Json => render_json_report(&model)?,
    };
    print!("{rendered}");
    Ok(())
}

fn write_dashboard(out_dir: &Path, model: &ReportModel) -> Result<(), MainError> {
    fs::create_dir_all(out_dir).map_err(|e| MainError::Io(format!("mkdir {}: {e}", out_dir.display())))?;
    let path = out_dir.join(DASHBOARD_FILE);
    canonical_json::write_canonical_file(model, &path)
        .map_err(|e| MainError::Io(format!("write {DASHBOARD_FILE}: {e}")))?;
    info!(path = %path.display(), "dashboard written");
    Ok(())
}

// Always accept the concrete model type; gate body by feature.
fn render_text_report(model: &ReportModel) -> Result<String, MainError> {
    #[cfg(feature = "report-text")]
    {
        sd_report::render_text(model).map_err(|e| MainError::Render(e.to_string()))
    }
    #[cfg(not(feature = "report-text"))]
    {
        let _ = model;
        Err(MainError::Render("text renderer not enabled (build with feature `report-text`)".into()))
    }
}

fn render_json_report(model: &ReportModel) -> Result<String, MainError> {
    #[cfg(feature = "report-json")]
    {
        sd_report::render_json(model).map_err(|e| MainError::Render(e.to_string()))
    }
    #[cfg(not(feature = "report-json"))]
    {
        let _ = model;
        Err(MainError::Render("json renderer not enabled (build with feature `report-json`)".into()))
    }
}

/// Map our typed errors to the exit-code table.
fn map_error(e: &MainError) -> u8 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Io(_) => IO,
        MainError::Pipeline(_) => PIPELINE,
        MainError::Render(_) => PIPELINE,
    }
}

/// Translate PipelineError into MainError buckets.
fn map_pipeline_err(e: PipelineError) -> MainError {
    use sd_io::IoError;
    match e {
        PipelineError::Io(io) => match io {
            IoError::Manifest(_) | IoError::Schema(_) | IoError::Json { .. } | IoError::Digest { .. } => {
                MainError::Validation(io.to_string())
            }
            IoError::Read(_)
            | IoError::Encoding { .. }
            | IoError::Csv { .. }
            | IoError::Spreadsheet { .. }
            | IoError::Path(_) => MainError::Io(io.to_string()),
        },
        PipelineError::Schema(s) => MainError::Pipeline(s.to_string()),
        PipelineError::Join(j) => MainError::Pipeline(j.to_string()),
    }
}
