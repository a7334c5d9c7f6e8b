//! Join Engine: four named left outer joins onto the sales facts.
//!
//! Each stage emits every input row exactly once. Dimension indices hold one
//! row per key, so a fact matches at most one dimension row. An absent fact
//! key never matches. Stages write disjoint fields of `EnrichedFact`, so
//! their order does not change the result.

use std::collections::BTreeMap;
use std::fmt;

use sd_core::{
    CityRow, CustomerRow, EmployeeRow, EnrichedFact, JoinStageReport, SalesFact, StockItemRow,
    SurrogateKey,
};

use crate::extract::Dimensions;

/// The join stages, in execution order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum JoinStage {
    Customers,
    Cities,
    StockItems,
    Employees,
}

impl JoinStage {
    pub const ALL: [JoinStage; 4] =
        [JoinStage::Customers, JoinStage::Cities, JoinStage::StockItems, JoinStage::Employees];

    pub fn name(self) -> &'static str {
        match self {
            JoinStage::Customers => "customers",
            JoinStage::Cities => "cities",
            JoinStage::StockItems => "stock_items",
            JoinStage::Employees => "employees",
        }
    }
}

impl fmt::Display for JoinStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum JoinError {
    /// A stage emitted a different number of rows than it received.
    RowCountDrift { stage: JoinStage, rows_in: usize, rows_out: usize },
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinError::RowCountDrift { stage, rows_in, rows_out } => write!(
                f,
                "join stage {stage} changed the row count ({rows_in} in, {rows_out} out)"
            ),
        }
    }
}

impl std::error::Error for JoinError {}

/// Lookup from surrogate key to a dimension row. The first row per key wins.
#[derive(Clone, Debug)]
pub struct DimIndex<'a, V> {
    map: BTreeMap<SurrogateKey, &'a V>,
}

impl<'a, V> DimIndex<'a, V> {
    pub fn build<F>(rows: &'a [V], key: F) -> Self
    where
        F: Fn(&V) -> SurrogateKey,
    {
        let mut map = BTreeMap::new();
        for row in rows {
            map.entry(key(row)).or_insert(row);
        }
        Self { map }
    }

    pub fn get(&self, key: Option<SurrogateKey>) -> Option<&'a V> {
        key.and_then(|k| self.map.get(&k).copied())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// One left-join stage over `rows`.
pub fn left_join<V>(
    stage: JoinStage,
    rows: Vec<EnrichedFact>,
    index: &DimIndex<'_, V>,
    fact_key: fn(&SalesFact) -> Option<SurrogateKey>,
    attach: fn(&mut EnrichedFact, &V),
) -> Result<(Vec<EnrichedFact>, JoinStageReport), JoinError> {
    let rows_in = rows.len();
    let mut matched = 0usize;
    let out: Vec<EnrichedFact> = rows
        .into_iter()
        .map(|mut row| {
            if let Some(dim) = index.get(fact_key(&row.fact)) {
                attach(&mut row, dim);
                matched += 1;
            }
            row
        })
        .collect();

    let rows_out = out.len();
    if rows_in != rows_out {
        return Err(JoinError::RowCountDrift { stage, rows_in, rows_out });
    }
    let report = JoinStageReport {
        stage: stage.name().to_string(),
        rows_in,
        rows_out,
        matched,
        unmatched: rows_out - matched,
    };
    Ok((out, report))
}

fn attach_customer(row: &mut EnrichedFact, d: &CustomerRow) {
    row.customer = d.name.clone();
}

fn attach_city(row: &mut EnrichedFact, d: &CityRow) {
    row.city = d.city.clone();
    row.state_province = d.state_province.clone();
    row.sales_territory = d.sales_territory.clone();
}

fn attach_stock_item(row: &mut EnrichedFact, d: &StockItemRow) {
    row.stock_item = d.name.clone();
}

fn attach_salesperson(row: &mut EnrichedFact, d: &EmployeeRow) {
    row.salesperson = d.preferred_name.clone();
}

/// Run all four stages. Returns the enriched facts (same length and order as
/// `facts`) and one report per stage.
pub fn enrich(
    facts: Vec<SalesFact>,
    dims: &Dimensions,
) -> Result<(Vec<EnrichedFact>, Vec<JoinStageReport>), JoinError> {
    let rows: Vec<EnrichedFact> = facts.into_iter().map(EnrichedFact::from_fact).collect();
    let mut reports = Vec::with_capacity(JoinStage::ALL.len());

    let idx = DimIndex::build(&dims.customers, |d| d.key);
    let (rows, r) = left_join(JoinStage::Customers, rows, &idx, |f| f.customer_key, attach_customer)?;
    reports.push(r);

    let idx = DimIndex::build(&dims.cities, |d| d.key);
    let (rows, r) = left_join(JoinStage::Cities, rows, &idx, |f| f.city_key, attach_city)?;
    reports.push(r);

    let idx = DimIndex::build(&dims.stock_items, |d| d.key);
    let (rows, r) =
        left_join(JoinStage::StockItems, rows, &idx, |f| f.stock_item_key, attach_stock_item)?;
    reports.push(r);

    let idx = DimIndex::build(&dims.employees, |d| d.key);
    let (rows, r) =
        left_join(JoinStage::Employees, rows, &idx, |f| f.salesperson_key, attach_salesperson)?;
    reports.push(r);

    Ok((rows, reports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::derive_period;
    use sd_core::Money;

    fn fact(row: usize, customer: Option<i64>, city: Option<i64>) -> SalesFact {
        SalesFact {
            row,
            invoice_id: Some(format!("{}", 1000 + row)),
            invoice_date: Some("2015-03-15".into()),
            period: derive_period(row, Some("2015-03-15")).ok(),
            customer_key: customer.map(SurrogateKey::new),
            city_key: city.map(SurrogateKey::new),
            total_including_tax: Some(Money::from_cents(12_000)),
            profit: Some(Money::from_cents(2_000)),
            ..SalesFact::default()
        }
    }

    fn acme() -> Dimensions {
        Dimensions {
            customers: vec![CustomerRow { key: SurrogateKey::new(7), name: Some("Acme".into()) }],
            ..Dimensions::default()
        }
    }

    #[test]
    fn single_customer_match_leaves_other_attributes_absent() {
        let (rows, reports) = enrich(vec![fact(1, Some(7), Some(99))], &acme()).unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.customer.as_deref(), Some("Acme"));
        assert_eq!(r.city, None);
        assert_eq!(r.state_province, None);
        assert_eq!(r.sales_territory, None);
        assert_eq!(r.stock_item, None);
        assert_eq!(r.salesperson, None);
        assert_eq!(r.year(), Some(2015));
        assert_eq!(r.fact.period.unwrap().year_month.to_string(), "2015-03");

        let names: Vec<&str> = reports.iter().map(|r| r.stage.as_str()).collect();
        assert_eq!(names, ["customers", "cities", "stock_items", "employees"]);
        assert_eq!((reports[0].matched, reports[0].unmatched), (1, 0));
        assert_eq!((reports[1].matched, reports[1].unmatched), (0, 1));
    }

    #[test]
    fn duplicate_dimension_keys_never_duplicate_facts() {
        let mut dims = acme();
        dims.customers.push(CustomerRow { key: SurrogateKey::new(7), name: Some("Acme 2".into()) });
        let (rows, _) = enrich(vec![fact(1, Some(7), None), fact(2, Some(7), None)], &dims).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.customer.as_deref() == Some("Acme")));
    }

    #[test]
    fn absent_fact_key_never_matches() {
        let mut dims = acme();
        dims.customers.push(CustomerRow { key: SurrogateKey::UNKNOWN, name: Some("Unknown".into()) });
        let (rows, reports) = enrich(vec![fact(1, None, None)], &dims).unwrap();
        assert_eq!(rows[0].customer, None);
        assert_eq!(reports[0].unmatched, 1);
    }

    #[test]
    fn output_preserves_input_order() {
        let facts: Vec<SalesFact> = (1..=5).map(|i| fact(i, Some(i as i64), None)).collect();
        let (rows, _) = enrich(facts, &Dimensions::default()).unwrap();
        let order: Vec<usize> = rows.iter().map(|r| r.fact.row).collect();
        assert_eq!(order, [1, 2, 3, 4, 5]);
    }
}
