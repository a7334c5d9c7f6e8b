//! sd_report/src/lib.rs: Pure offline report model + renderers (JSON/text).
//!
//! Determinism rules:
//! - No I/O here. Callers hand over a `DashboardView` already built in memory.
//! - Money is rendered from integer cents; percents use one decimal without float math.
//! - An undefined ratio is `null` in JSON and `n/a` in text, never `0`.
//! - Stable section order and field names.

#![deny(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use sd_algo::{MaybeRatio, PreviewRow, RankedRow};
use sd_core::rounding::percent_one_decimal;
use sd_core::{JoinStageReport, Money};
use sd_pipeline::DashboardView;

#[cfg(feature = "render_json")]
pub mod render_json;
#[cfg(feature = "render_text")]
pub mod render_text;

#[cfg(feature = "render_json")]
pub use render_json::{render_json, render_json_value};
#[cfg(feature = "render_text")]
pub use render_text::render_text;

// ===== Errors =====

#[derive(Debug)]
pub enum ReportError {
    /// Two parts of the dashboard disagree about the same quantity.
    Inconsistent(&'static str),
    /// Serialization or formatting failed.
    Render(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Inconsistent(what) => write!(f, "inconsistent dashboard: {what}"),
            ReportError::Render(msg) => write!(f, "render: {msg}"),
        }
    }
}

impl std::error::Error for ReportError {}

// ===== Model =====

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Cover {
    pub engine: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_id: Option<String>,
    pub rows_total: usize,
    pub rows_selected: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InputLine {
    pub table: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    pub rows: usize,
}

/// Years, quarters and territories, used both for the selection and the observed facets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FacetBlock {
    pub years: Vec<i32>,
    pub quarters: Vec<String>,
    pub territories: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KpiBlock {
    pub revenue: String,
    pub profit: String,
    pub total_excluding_tax: String,
    pub margin_pct: Option<String>,
    pub orders: usize,
    pub average_order_value: Option<String>,
    pub rows: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RevenuePoint {
    pub year_month: String,
    pub revenue: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MarginPoint {
    pub year_month: String,
    pub profit: String,
    pub total_excluding_tax: String,
    pub margin_pct: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankedLine {
    pub rank: usize,
    pub label: String,
    pub revenue: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rankings {
    pub products: Vec<RankedLine>,
    pub customers: Vec<RankedLine>,
    pub salespeople: Vec<RankedLine>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShareLine {
    pub territory: String,
    pub revenue: String,
    pub share_pct: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StateLine {
    pub state_province: String,
    pub revenue: String,
    pub profit: String,
    pub margin_pct: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PreviewLine {
    pub invoice_date: Option<String>,
    pub customer: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<String>,
    pub total_including_tax: Option<String>,
    pub profit: Option<String>,
    pub state_province: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QualityBlock {
    pub clean: bool,
    pub rows_loaded: BTreeMap<String, usize>,
    pub key_warnings: BTreeMap<String, usize>,
    pub duplicate_keys_dropped: BTreeMap<String, usize>,
    pub invalid_dates: usize,
    pub invalid_measures: BTreeMap<String, usize>,
    pub join_stages: Vec<JoinStageReport>,
}

/// Top-level report model; field order is the section order of every renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportModel {
    pub cover: Cover,
    pub inputs: Vec<InputLine>,
    pub selection: FacetBlock,
    pub facets: FacetBlock,
    pub kpis: KpiBlock,
    pub monthly_revenue: Vec<RevenuePoint>,
    pub monthly_margin: Vec<MarginPoint>,
    pub rankings: Rankings,
    pub territory_share: Vec<ShareLine>,
    pub states: Vec<StateLine>,
    pub preview: Vec<PreviewLine>,
    pub quality: QualityBlock,
}

// ===== Mapping =====

/// Build the report model from one dashboard. No recomputation beyond formatting.
pub fn build_model(d: &DashboardView) -> Result<ReportModel, ReportError> {
    if d.view.kpis.rows != d.view_rows {
        return Err(ReportError::Inconsistent("kpi row count differs from the filtered view"));
    }
    if d.view.preview.len() > d.view_rows {
        return Err(ReportError::Inconsistent("preview is longer than the filtered view"));
    }
    let rows_total = d
        .quality
        .join_stages
        .first()
        .map(|s| s.rows_out)
        .unwrap_or(d.view_rows);

    let k = &d.view.kpis;
    Ok(ReportModel {
        cover: Cover {
            engine: d.engine.name.clone(),
            version: d.engine.version.clone(),
            manifest_id: d.manifest_id.clone(),
            rows_total,
            rows_selected: d.view_rows,
        },
        inputs: d
            .inputs
            .iter()
            .map(|i| InputLine {
                table: i.table.as_str().to_string(),
                location: i.location.clone(),
                sha256: i.sha256.clone(),
                rows: i.rows,
            })
            .collect(),
        selection: facet_block(&d.selection.years, &d.selection.quarters, &d.selection.territories),
        facets: facet_block(&d.facets.years, &d.facets.quarters, &d.facets.territories),
        kpis: KpiBlock {
            revenue: k.revenue.to_decimal_string(),
            profit: k.profit.to_decimal_string(),
            total_excluding_tax: k.total_excluding_tax.to_decimal_string(),
            margin_pct: pct(&k.margin),
            orders: k.orders,
            average_order_value: k.average_order_value.as_ref().ok().map(|m| m.to_decimal_string()),
            rows: k.rows,
        },
        monthly_revenue: d
            .view
            .monthly_revenue
            .iter()
            .map(|m| RevenuePoint {
                year_month: m.year_month.to_string(),
                revenue: m.revenue.to_decimal_string(),
            })
            .collect(),
        monthly_margin: d
            .view
            .monthly_margin
            .iter()
            .map(|m| MarginPoint {
                year_month: m.year_month.to_string(),
                profit: m.profit.to_decimal_string(),
                total_excluding_tax: m.total_excluding_tax.to_decimal_string(),
                margin_pct: pct(&m.margin),
            })
            .collect(),
        rankings: Rankings {
            products: ranked(&d.view.top_products),
            customers: ranked(&d.view.top_customers),
            salespeople: ranked(&d.view.top_salespeople),
        },
        territory_share: d
            .view
            .territory_share
            .iter()
            .map(|t| ShareLine {
                territory: t.territory.clone(),
                revenue: t.revenue.to_decimal_string(),
                share_pct: pct(&t.share),
            })
            .collect(),
        states: d
            .view
            .state_rollup
            .iter()
            .map(|s| StateLine {
                state_province: s.state_province.clone(),
                revenue: s.revenue.to_decimal_string(),
                profit: s.profit.to_decimal_string(),
                margin_pct: pct(&s.margin),
            })
            .collect(),
        preview: d.view.preview.iter().map(preview_line).collect(),
        quality: QualityBlock {
            clean: d.quality.is_clean(),
            rows_loaded: d
                .quality
                .rows_loaded
                .iter()
                .map(|(t, n)| (t.as_str().to_string(), *n))
                .collect(),
            key_warnings: d.quality.key_warnings.clone(),
            duplicate_keys_dropped: d
                .quality
                .duplicate_keys_dropped
                .iter()
                .map(|(t, n)| (t.as_str().to_string(), *n))
                .collect(),
            invalid_dates: d.quality.invalid_dates,
            invalid_measures: d.quality.invalid_measures.clone(),
            join_stages: d.quality.join_stages.clone(),
        },
    })
}

fn facet_block<'a>(
    years: impl IntoIterator<Item = &'a i32>,
    quarters: impl IntoIterator<Item = &'a sd_core::Quarter>,
    territories: impl IntoIterator<Item = &'a String>,
) -> FacetBlock {
    FacetBlock {
        years: years.into_iter().copied().collect(),
        quarters: quarters.into_iter().map(|q| q.as_str().to_string()).collect(),
        territories: territories.into_iter().cloned().collect(),
    }
}

fn ranked(rows: &[RankedRow]) -> Vec<RankedLine> {
    rows.iter()
        .enumerate()
        .map(|(i, r)| RankedLine {
            rank: i + 1,
            label: r.label.clone(),
            revenue: r.revenue.to_decimal_string(),
        })
        .collect()
}

fn preview_line(p: &PreviewRow) -> PreviewLine {
    PreviewLine {
        invoice_date: p.invoice_date.clone(),
        customer: p.customer.clone(),
        description: p.description.clone(),
        quantity: p.quantity,
        unit_price: p.unit_price.map(Money::to_decimal_string),
        total_including_tax: p.total_including_tax.map(Money::to_decimal_string),
        profit: p.profit.map(Money::to_decimal_string),
        state_province: p.state_province.clone(),
    }
}

/// One-decimal percent, or `None` when the ratio is undefined.
fn pct(r: &MaybeRatio) -> Option<String> {
    r.as_ref().ok().map(percent_one_decimal)
}

// ===== Presentation utilities =====

/// Group the integer part of a decimal string in threes: `"1234567"` → `"1,234,567"`.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Dollars with cents and thousands separators: `-$1,234.50`.
pub fn dollars(m: Money) -> String {
    let cents = m.cents();
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", group_thousands(&(abs / 100).to_string()), abs % 100)
}

/// Whole dollars for headline cards: `$1,235` (cents rounded half away from zero).
pub fn dollars_whole(m: Money) -> String {
    let units = m.whole_units_rounded();
    let sign = if units < 0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(&units.unsigned_abs().to_string()))
}

/// Count with thousands separators.
pub fn count(n: usize) -> String {
    group_thousands(&n.to_string())
}

/// `"12.3%"` from a model percent, or `"n/a"` when it was undefined.
pub fn percent_or_na(p: Option<&str>) -> String {
    match p {
        Some(p) => format!("{p}%"),
        None => "n/a".to_string(),
    }
}

/// Text form of a model money string; falls back to the raw string if it is not a decimal.
pub fn money_text(decimal: &str) -> String {
    Money::parse_total(decimal).map(dollars).unwrap_or_else(|_| decimal.to_string())
}

/// Headline (whole-dollar) text form of a model money string.
pub fn money_headline(decimal: &str) -> String {
    Money::parse_total(decimal).map(dollars_whole).unwrap_or_else(|_| decimal.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sd_core::rounding::new_ratio_checked;
    use sd_core::DivisionUndefined;

    #[test]
    fn dollars_group_thousands_and_keep_sign() {
        assert_eq!(dollars(Money::from_cents(0)), "$0.00");
        assert_eq!(dollars(Money::from_cents(99)), "$0.99");
        assert_eq!(dollars(Money::from_cents(123_456_789)), "$1,234,567.89");
        assert_eq!(dollars(Money::from_cents(-100_050)), "-$1,000.50");
        assert_eq!(money_text("180000000000000000.00"), "$180,000,000,000,000,000.00");
        assert_eq!(money_headline("180000000000000000.49"), "$180,000,000,000,000,000");
    }

    #[test]
    fn whole_dollars_round_cents() {
        assert_eq!(dollars_whole(Money::from_cents(123_450)), "$1,235");
        assert_eq!(dollars_whole(Money::from_cents(99_949)), "$999");
        assert_eq!(dollars_whole(Money::from_cents(-150)), "-$2");
        assert_eq!(count(1_000_000), "1,000,000");
        assert_eq!(count(999), "999");
    }

    #[test]
    fn undefined_percent_is_not_zero() {
        assert_eq!(pct(&Err(DivisionUndefined)), None);
        assert_eq!(percent_or_na(None), "n/a");
        let r = new_ratio_checked(25, 2).unwrap();
        let p = pct(&Ok(r));
        assert_eq!(p.as_deref(), Some("12.5"));
        assert_eq!(percent_or_na(p.as_deref()), "12.5%");
    }

    #[test]
    fn model_money_strings_render_as_dollars() {
        assert_eq!(money_text("1234.50"), "$1,234.50");
        assert_eq!(money_headline("1234.50"), "$1,235");
        assert_eq!(money_text("-0.05"), "-$0.05");
    }
}
