//! render_json.rs: Report JSON renderer.
//!
//! Section order follows `ReportModel` field order:
//! cover → inputs → selection → facets → kpis → monthly series → rankings →
//! territory share → states → preview → quality.
//! Undefined percents are `null`; money values are decimal strings with two places.

use serde_json::Value;

use crate::{ReportError, ReportModel};

/// The report as a JSON value (for canonical writers and further embedding).
pub fn render_json_value(m: &ReportModel) -> Result<Value, ReportError> {
    serde_json::to_value(m).map_err(|e| ReportError::Render(e.to_string()))
}

/// Pretty-printed report JSON with a trailing newline.
pub fn render_json(m: &ReportModel) -> Result<String, ReportError> {
    let mut out = serde_json::to_string_pretty(m).map_err(|e| ReportError::Render(e.to_string()))?;
    out.push('\n');
    Ok(out)
}
