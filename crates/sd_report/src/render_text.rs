//! render_text.rs: Plain-text dashboard summary for terminals.
//! Same section order as the JSON renderer; headline cards use whole dollars,
//! tables use cents.

use std::fmt::{self, Write};

use crate::{count, money_headline, money_text, percent_or_na, RankedLine, ReportError, ReportModel};

pub fn render_text(m: &ReportModel) -> Result<String, ReportError> {
    let mut out = String::new();
    write_report(&mut out, m).map_err(|e| ReportError::Render(e.to_string()))?;
    Ok(out)
}

fn write_report(out: &mut String, m: &ReportModel) -> fmt::Result {
    // Cover
    let id = m.cover.manifest_id.as_deref().unwrap_or("data directory");
    writeln!(out, "Sales dashboard [{id}] ({} {})", m.cover.engine, m.cover.version)?;
    writeln!(out, "Rows selected: {} of {}", count(m.cover.rows_selected), count(m.cover.rows_total))?;
    writeln!(
        out,
        "Selection: years {} | quarters {} | territories {}",
        join_or_none(m.selection.years.iter().map(i32::to_string)),
        join_or_none(m.selection.quarters.iter().cloned()),
        join_or_none(m.selection.territories.iter().cloned()),
    )?;

    // KPIs
    let k = &m.kpis;
    heading(out, "KPIs")?;
    writeln!(out, "  Revenue    {}", money_headline(&k.revenue))?;
    writeln!(out, "  Profit     {}", money_headline(&k.profit))?;
    writeln!(out, "  Margin     {}", percent_or_na(k.margin_pct.as_deref()))?;
    writeln!(out, "  Orders     {}", count(k.orders))?;
    let aov = k.average_order_value.as_deref().map(money_headline).unwrap_or_else(|| "n/a".into());
    writeln!(out, "  Avg order  {aov}")?;

    heading(out, "Monthly revenue")?;
    if m.monthly_revenue.is_empty() {
        none(out)?;
    }
    for p in &m.monthly_revenue {
        writeln!(out, "  {}  {}", p.year_month, money_text(&p.revenue))?;
    }

    heading(out, "Monthly profit")?;
    if m.monthly_margin.is_empty() {
        none(out)?;
    }
    for p in &m.monthly_margin {
        writeln!(
            out,
            "  {}  {}  margin {}",
            p.year_month,
            money_text(&p.profit),
            percent_or_na(p.margin_pct.as_deref())
        )?;
    }

    ranking(out, "Top products", &m.rankings.products)?;
    ranking(out, "Top customers", &m.rankings.customers)?;
    ranking(out, "Top salespeople", &m.rankings.salespeople)?;

    heading(out, "Territory share")?;
    if m.territory_share.is_empty() {
        none(out)?;
    }
    for t in &m.territory_share {
        writeln!(
            out,
            "  {}  {}  {}",
            t.territory,
            money_text(&t.revenue),
            percent_or_na(t.share_pct.as_deref())
        )?;
    }

    heading(out, "States by revenue")?;
    if m.states.is_empty() {
        none(out)?;
    }
    for s in &m.states {
        writeln!(
            out,
            "  {}  revenue {}  profit {}  margin {}",
            s.state_province,
            money_text(&s.revenue),
            money_text(&s.profit),
            percent_or_na(s.margin_pct.as_deref())
        )?;
    }

    heading(out, &format!("Preview ({} rows)", m.preview.len()))?;
    for p in &m.preview {
        let cells = [
            p.invoice_date.clone(),
            p.customer.clone(),
            p.description.clone(),
            p.quantity.map(|q| q.to_string()),
            p.unit_price.as_deref().map(money_text),
            p.total_including_tax.as_deref().map(money_text),
            p.profit.as_deref().map(money_text),
            p.state_province.clone(),
        ];
        let line: Vec<String> = cells.into_iter().map(|c| c.unwrap_or_else(|| "-".into())).collect();
        writeln!(out, "  {}", line.join(" | "))?;
    }

    write_quality(out, m)
}

fn write_quality(out: &mut String, m: &ReportModel) -> fmt::Result {
    let q = &m.quality;
    heading(out, "Data quality")?;
    for (table, n) in &q.rows_loaded {
        writeln!(out, "  {table}: {} rows", count(*n))?;
    }
    if q.clean {
        return writeln!(out, "  no issues");
    }
    for (column, n) in &q.key_warnings {
        writeln!(out, "  {column}: {n} keys treated as absent")?;
    }
    for (table, n) in &q.duplicate_keys_dropped {
        writeln!(out, "  {table}: {n} duplicate keys dropped")?;
    }
    if q.invalid_dates > 0 {
        writeln!(out, "  {} rows with invalid invoice dates excluded", q.invalid_dates)?;
    }
    for (column, n) in &q.invalid_measures {
        writeln!(out, "  {column}: {n} unparseable values")?;
    }
    Ok(())
}

fn ranking(out: &mut String, title: &str, rows: &[RankedLine]) -> fmt::Result {
    heading(out, title)?;
    if rows.is_empty() {
        none(out)?;
    }
    for r in rows {
        writeln!(out, "  {:>2}. {}  {}", r.rank, r.label, money_text(&r.revenue))?;
    }
    Ok(())
}

fn heading(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{title}")
}

fn none(out: &mut String) -> fmt::Result {
    writeln!(out, "  (none)")
}

fn join_or_none(items: impl Iterator<Item = String>) -> String {
    let v: Vec<String> = items.collect();
    if v.is_empty() {
        "(none)".to_string()
    } else {
        v.join(", ")
    }
}
