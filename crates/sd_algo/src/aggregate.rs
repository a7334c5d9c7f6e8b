// crates/sd_algo/src/aggregate.rs
//
// Aggregation Engine over a filtered view.
//
// - Money is summed in exact integer cents; absent measures contribute nothing.
// - Every ratio is `Result<Ratio, DivisionUndefined>`; a zero denominator is
//   reported, never rendered as 0.
// - Groupings use BTreeMap so output order never depends on hash seeds.
// - Rows whose group label is absent are excluded from that grouping.
//
// Two margin definitions coexist and are kept distinct:
//   kpi margin   = Σ profit / Σ total excluding tax × 100
//   state margin = Σ profit / (Σ revenue − Σ profit) × 100

use std::collections::{BTreeMap, BTreeSet};

use sd_core::determinism::top_n_by_amount;
use sd_core::rounding::{new_ratio_checked, percent_of};
use sd_core::{
    AggregateLimits, DivisionUndefined, EnrichedFact, Money, Ratio, YearMonth,
};

/// A ratio that may be undefined.
pub type MaybeRatio = Result<Ratio, DivisionUndefined>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KpiSummary {
    /// Σ total including tax.
    pub revenue: Money,
    pub profit: Money,
    pub total_excluding_tax: Money,
    /// Σ profit / Σ total excluding tax × 100.
    pub margin: MaybeRatio,
    /// Distinct present invoice ids.
    pub orders: usize,
    /// Revenue / orders, rounded half-even to the cent.
    pub average_order_value: Result<Money, DivisionUndefined>,
    pub rows: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyRevenue {
    pub year_month: YearMonth,
    pub revenue: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyMargin {
    pub year_month: YearMonth,
    pub profit: Money,
    pub total_excluding_tax: Money,
    pub margin: MaybeRatio,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedRow {
    pub label: String,
    pub revenue: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerritoryShare {
    pub territory: String,
    pub revenue: Money,
    /// Percent of the grouped total.
    pub share: MaybeRatio,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateRow {
    pub state_province: String,
    pub revenue: Money,
    pub profit: Money,
    /// Σ profit / (Σ revenue − Σ profit) × 100.
    pub margin: MaybeRatio,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewRow {
    pub invoice_date: Option<String>,
    pub customer: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<Money>,
    pub total_including_tax: Option<Money>,
    pub profit: Option<Money>,
    pub state_province: Option<String>,
}

/// Everything the dashboard shows for one selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateView {
    pub kpis: KpiSummary,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub monthly_margin: Vec<MonthlyMargin>,
    pub top_products: Vec<RankedRow>,
    pub top_customers: Vec<RankedRow>,
    pub top_salespeople: Vec<RankedRow>,
    pub territory_share: Vec<TerritoryShare>,
    pub state_rollup: Vec<StateRow>,
    pub preview: Vec<PreviewRow>,
}

// ----------------------------- helpers -----------------------------

#[inline]
fn revenue_of(r: &EnrichedFact) -> Money {
    r.fact.total_including_tax.unwrap_or(Money::ZERO)
}

#[inline]
fn profit_of(r: &EnrichedFact) -> Money {
    r.fact.profit.unwrap_or(Money::ZERO)
}

#[inline]
fn excl_tax_of(r: &EnrichedFact) -> Money {
    r.fact.total_excluding_tax.unwrap_or(Money::ZERO)
}

/// Σ revenue per present label.
fn revenue_by<'a, F>(view: &[&'a EnrichedFact], label: F) -> BTreeMap<&'a str, Money>
where
    F: Fn(&'a EnrichedFact) -> Option<&'a str>,
{
    let mut acc: BTreeMap<&'a str, Money> = BTreeMap::new();
    for &row in view {
        if let Some(l) = label(row) {
            *acc.entry(l).or_insert(Money::ZERO) += revenue_of(row);
        }
    }
    acc
}

fn ranked<'a, F>(view: &[&'a EnrichedFact], n: usize, label: F) -> Vec<RankedRow>
where
    F: Fn(&'a EnrichedFact) -> Option<&'a str>,
{
    let rows: Vec<RankedRow> = revenue_by(view, label)
        .into_iter()
        .map(|(l, revenue)| RankedRow { label: l.to_string(), revenue })
        .collect();
    top_n_by_amount(rows, n, |r| (r.label.as_str(), r.revenue))
}

// ----------------------------- KPIs & series -----------------------------

pub fn kpi_summary(view: &[&EnrichedFact]) -> KpiSummary {
    let revenue: Money = view.iter().map(|r| revenue_of(r)).sum();
    let profit: Money = view.iter().map(|r| profit_of(r)).sum();
    let total_excluding_tax: Money = view.iter().map(|r| excl_tax_of(r)).sum();
    let orders = view
        .iter()
        .filter_map(|r| r.fact.invoice_id.as_deref())
        .collect::<BTreeSet<&str>>()
        .len();
    let average_order_value = new_ratio_checked(revenue.cents(), orders as i128)
        .map(|r| Money::from_total_cents(r.round_half_even()));

    KpiSummary {
        revenue,
        profit,
        total_excluding_tax,
        margin: kpi_margin(profit, total_excluding_tax),
        orders,
        average_order_value,
        rows: view.len(),
    }
}

/// Profit as a percent of revenue excluding tax.
pub fn kpi_margin(profit: Money, total_excluding_tax: Money) -> MaybeRatio {
    percent_of(profit, total_excluding_tax)
}

/// Profit as a percent of cost, where cost = revenue − profit.
pub fn state_margin(revenue: Money, profit: Money) -> MaybeRatio {
    percent_of(profit, revenue - profit)
}

/// Σ revenue per year-month, ascending.
pub fn monthly_revenue(view: &[&EnrichedFact]) -> Vec<MonthlyRevenue> {
    let mut acc: BTreeMap<YearMonth, Money> = BTreeMap::new();
    for row in view {
        if let Some(p) = row.fact.period {
            *acc.entry(p.year_month).or_insert(Money::ZERO) += revenue_of(row);
        }
    }
    acc.into_iter().map(|(year_month, revenue)| MonthlyRevenue { year_month, revenue }).collect()
}

/// Σ profit, Σ revenue excluding tax and the margin per year-month, ascending.
pub fn monthly_profit_margin(view: &[&EnrichedFact]) -> Vec<MonthlyMargin> {
    let mut acc: BTreeMap<YearMonth, (Money, Money)> = BTreeMap::new();
    for row in view {
        if let Some(p) = row.fact.period {
            let e = acc.entry(p.year_month).or_insert((Money::ZERO, Money::ZERO));
            e.0 += profit_of(row);
            e.1 += excl_tax_of(row);
        }
    }
    acc.into_iter()
        .map(|(year_month, (profit, total_excluding_tax))| MonthlyMargin {
            year_month,
            profit,
            total_excluding_tax,
            margin: kpi_margin(profit, total_excluding_tax),
        })
        .collect()
}

// ----------------------------- rankings -----------------------------

/// Top `n` product descriptions by revenue.
pub fn top_products(view: &[&EnrichedFact], n: usize) -> Vec<RankedRow> {
    ranked(view, n, |r| r.fact.description.as_deref())
}

/// Top `n` customers by revenue, leaving out the Unknown member (key 0).
pub fn top_customers(view: &[&EnrichedFact], n: usize) -> Vec<RankedRow> {
    ranked(view, n, |r| match r.fact.customer_key {
        Some(k) if k.is_unknown() => None,
        _ => r.customer.as_deref(),
    })
}

/// Top `n` salespeople by revenue.
pub fn top_salespeople(view: &[&EnrichedFact], n: usize) -> Vec<RankedRow> {
    ranked(view, n, |r| r.salesperson.as_deref())
}

/// Revenue per territory with each territory's share, ascending by name.
pub fn territory_share(view: &[&EnrichedFact]) -> Vec<TerritoryShare> {
    let by = revenue_by(view, |r| r.sales_territory.as_deref());
    let total: Money = by.values().copied().sum();
    by.into_iter()
        .map(|(t, revenue)| TerritoryShare {
            territory: t.to_string(),
            revenue,
            share: percent_of(revenue, total),
        })
        .collect()
}

/// Revenue, profit and cost-based margin per state; top `limit` by revenue.
pub fn state_rollup(view: &[&EnrichedFact], limit: usize) -> Vec<StateRow> {
    let mut acc: BTreeMap<&str, (Money, Money)> = BTreeMap::new();
    for &row in view {
        if let Some(s) = row.state_province.as_deref() {
            let e = acc.entry(s).or_insert((Money::ZERO, Money::ZERO));
            e.0 += revenue_of(row);
            e.1 += profit_of(row);
        }
    }
    let rows: Vec<StateRow> = acc
        .into_iter()
        .map(|(s, (revenue, profit))| StateRow {
            state_province: s.to_string(),
            revenue,
            profit,
            margin: state_margin(revenue, profit),
        })
        .collect();
    top_n_by_amount(rows, limit, |r| (r.state_province.as_str(), r.revenue))
}

/// First `limit` rows of the view, in source order.
pub fn transaction_preview(view: &[&EnrichedFact], limit: usize) -> Vec<PreviewRow> {
    view.iter()
        .take(limit)
        .map(|r| PreviewRow {
            invoice_date: r.fact.invoice_date.clone(),
            customer: r.customer.clone(),
            description: r.fact.description.clone(),
            quantity: r.fact.quantity,
            unit_price: r.fact.unit_price,
            total_including_tax: r.fact.total_including_tax,
            profit: r.fact.profit,
            state_province: r.state_province.clone(),
        })
        .collect()
}

/// Compute every aggregate for one filtered view.
pub fn build_view(view: &[&EnrichedFact], limits: &AggregateLimits) -> AggregateView {
    AggregateView {
        kpis: kpi_summary(view),
        monthly_revenue: monthly_revenue(view),
        monthly_margin: monthly_profit_margin(view),
        top_products: top_products(view, limits.top_n),
        top_customers: top_customers(view, limits.top_n),
        top_salespeople: top_salespeople(view, limits.top_n),
        territory_share: territory_share(view),
        state_rollup: state_rollup(view, limits.state_rows),
        preview: transaction_preview(view, limits.preview_rows),
    }
}
