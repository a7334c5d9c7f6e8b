//! Filter Engine: facets and the year × quarter × territory predicate.

use sd_core::{EnrichedFact, Facets, FilterSelection};

/// Distinct observed years, quarters and territories. Rows without a period
/// contribute no year/quarter; rows without a territory contribute none.
pub fn facets(rows: &[EnrichedFact]) -> Facets {
    let mut f = Facets::default();
    for row in rows {
        if let Some(p) = row.fact.period {
            f.years.insert(p.year);
            f.quarters.insert(p.quarter);
        }
        if let Some(t) = &row.sales_territory {
            f.territories.insert(t.clone());
        }
    }
    f
}

/// The ordered subsequence of `rows` satisfying every predicate of `sel`.
///
/// The territory predicate is disabled when the selection covers every
/// observed territory, so rows with no territory survive the default view.
/// That coverage check runs before the empty-set rule.
pub fn apply_filter<'a>(
    rows: &'a [EnrichedFact],
    sel: &FilterSelection,
    observed: &Facets,
) -> Vec<&'a EnrichedFact> {
    let territory_open = sel.territories.is_superset(&observed.territories);
    if sel.years.is_empty() || sel.quarters.is_empty() {
        return Vec::new();
    }
    if sel.territories.is_empty() && !territory_open {
        return Vec::new();
    }

    rows.iter()
        .filter(|r| match r.fact.period {
            Some(p) => sel.years.contains(&p.year) && sel.quarters.contains(&p.quarter),
            None => false,
        })
        .filter(|r| {
            territory_open
                || r.sales_territory.as_ref().is_some_and(|t| sel.territories.contains(t))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sd_core::{Period, Quarter, SalesFact};

    fn row(n: usize, date: Option<(i32, u32)>, territory: Option<&str>) -> EnrichedFact {
        EnrichedFact {
            fact: SalesFact {
                row: n,
                period: date.map(|(y, m)| Period::from_year_month(y, m).unwrap()),
                ..SalesFact::default()
            },
            sales_territory: territory.map(str::to_string),
            ..EnrichedFact::default()
        }
    }

    fn sample() -> Vec<EnrichedFact> {
        vec![
            row(1, Some((2015, 3)), Some("Southeast")),
            row(2, Some((2015, 5)), Some("Far West")),
            row(3, Some((2016, 1)), None),
            row(4, None, Some("Southeast")),
        ]
    }

    fn ids(v: &[&EnrichedFact]) -> Vec<usize> {
        v.iter().map(|r| r.fact.row).collect()
    }

    #[test]
    fn facets_are_sorted_and_skip_absent_values() {
        let f = facets(&sample());
        assert_eq!(f.years.iter().copied().collect::<Vec<_>>(), [2015, 2016]);
        assert_eq!(f.quarters.iter().copied().collect::<Vec<_>>(), [Quarter::Q1, Quarter::Q2]);
        assert_eq!(f.territories.iter().cloned().collect::<Vec<_>>(), ["Far West", "Southeast"]);
    }

    #[test]
    fn full_selection_keeps_every_row_with_a_period() {
        let rows = sample();
        let f = facets(&rows);
        let got = apply_filter(&rows, &FilterSelection::full(&f), &f);
        assert_eq!(ids(&got), [1, 2, 3]);
    }

    #[test]
    fn excluding_a_quarter_removes_its_rows() {
        let rows = sample();
        let f = facets(&rows);
        let sel = FilterSelection::full(&f).with_quarters([Quarter::Q2]);
        assert_eq!(ids(&apply_filter(&rows, &sel, &f)), [2]);
    }

    #[test]
    fn partial_territory_selection_drops_absent_territories() {
        let rows = sample();
        let f = facets(&rows);
        let sel = FilterSelection::full(&f).with_territories(["Southeast"]);
        assert_eq!(ids(&apply_filter(&rows, &sel, &f)), [1]);
    }

    #[test]
    fn selection_beyond_observed_territories_keeps_rows_without_one() {
        let rows = sample();
        let f = facets(&rows);
        let sel = FilterSelection::full(&f).with_territories(["Far West", "Southeast", "Plains"]);
        assert_eq!(ids(&apply_filter(&rows, &sel, &f)), [1, 2, 3]);

        let exact = FilterSelection::full(&f).with_territories(["Far West", "Southeast"]);
        assert_eq!(ids(&apply_filter(&rows, &exact, &f)), [1, 2, 3]);
    }

    #[test]
    fn empty_sets_yield_empty_views() {
        let rows = sample();
        let f = facets(&rows);
        assert!(apply_filter(&rows, &FilterSelection::full(&f).with_years(Vec::<i32>::new()), &f).is_empty());
        let no_territory = FilterSelection::full(&f).with_territories(Vec::<String>::new());
        assert!(apply_filter(&rows, &no_territory, &f).is_empty());
    }

    #[test]
    fn no_observed_territories_means_empty_selection_is_full() {
        let rows = vec![row(1, Some((2015, 3)), None)];
        let f = facets(&rows);
        assert!(f.territories.is_empty());
        let got = apply_filter(&rows, &FilterSelection::full(&f), &f);
        assert_eq!(ids(&got), [1]);
    }
}
