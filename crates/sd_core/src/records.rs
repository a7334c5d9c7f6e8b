//! crates/sd_core/src/records.rs
//! Typed rows: sales facts, dimension rows, enriched facts, selections, facets.

use std::collections::BTreeSet;

use crate::keys::SurrogateKey;
use crate::money::Money;
use crate::period::{Period, Quarter};

/// One invoice line. Immutable once built; `period` is derived once at load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SalesFact {
    /// 1-based data row in the source table.
    pub row: usize,
    pub invoice_id: Option<String>,
    pub invoice_date: Option<String>,
    /// Absent when the invoice date did not parse.
    pub period: Option<Period>,
    pub customer_key: Option<SurrogateKey>,
    pub city_key: Option<SurrogateKey>,
    pub stock_item_key: Option<SurrogateKey>,
    pub salesperson_key: Option<SurrogateKey>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<Money>,
    pub total_excluding_tax: Option<Money>,
    pub tax_amount: Option<Money>,
    pub total_including_tax: Option<Money>,
    pub profit: Option<Money>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerRow {
    pub key: SurrogateKey,
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CityRow {
    pub key: SurrogateKey,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub sales_territory: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StockItemRow {
    pub key: SurrogateKey,
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeRow {
    pub key: SurrogateKey,
    pub preferred_name: Option<String>,
}

/// A sales fact plus the attributes pulled from the four dimensions.
/// Every dimension attribute is `None` when its join found no match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnrichedFact {
    pub fact: SalesFact,
    pub customer: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub sales_territory: Option<String>,
    pub stock_item: Option<String>,
    pub salesperson: Option<String>,
}

impl EnrichedFact {
    pub fn from_fact(fact: SalesFact) -> Self {
        Self { fact, ..Self::default() }
    }

    pub fn year(&self) -> Option<i32> {
        self.fact.period.map(|p| p.year)
    }

    pub fn quarter(&self) -> Option<Quarter> {
        self.fact.period.map(|p| p.quarter)
    }
}

/// Distinct observed values of each filterable field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Facets {
    pub years: BTreeSet<i32>,
    pub quarters: BTreeSet<Quarter>,
    pub territories: BTreeSet<String>,
}

/// A user's filter choice. Each field is a set-membership predicate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterSelection {
    pub years: BTreeSet<i32>,
    pub quarters: BTreeSet<Quarter>,
    pub territories: BTreeSet<String>,
}

impl FilterSelection {
    /// Default selection: everything observed.
    pub fn full(facets: &Facets) -> Self {
        Self {
            years: facets.years.clone(),
            quarters: facets.quarters.clone(),
            territories: facets.territories.clone(),
        }
    }

    pub fn with_years<I: IntoIterator<Item = i32>>(mut self, years: I) -> Self {
        self.years = years.into_iter().collect();
        self
    }

    pub fn with_quarters<I: IntoIterator<Item = Quarter>>(mut self, quarters: I) -> Self {
        self.quarters = quarters.into_iter().collect();
        self
    }

    pub fn with_territories<I, S>(mut self, territories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.territories = territories.into_iter().map(Into::into).collect();
        self
    }
}

/// Row limits for ranked and preview outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct AggregateLimits {
    pub top_n: usize,
    pub state_rows: usize,
    pub preview_rows: usize,
}

impl Default for AggregateLimits {
    fn default() -> Self {
        Self { top_n: 10, state_rows: 15, preview_rows: 100 }
    }
}
