// Property tests: join row counts, filter monotonicity, sum identities, stable rankings.

use proptest::prelude::*;
use proptest::test_runner::Config;

use sd_algo::{
    apply_filter, enrich, facets, kpi_summary, monthly_revenue, top_products, Dimensions,
};
use sd_core::{
    CityRow, CustomerRow, EmployeeRow, FilterSelection, Money, Period, Quarter, SalesFact,
    StockItemRow, SurrogateKey,
};

const TERRITORIES: [&str; 3] = ["Far West", "Plains", "Southeast"];

fn arb_fact() -> impl Strategy<Value = SalesFact> {
    (
        prop::option::of(0i64..6),
        prop::option::of(0i64..6),
        prop::option::weighted(0.9, (2013i32..2017, 1u32..13)),
        -5_000i64..50_000,
        0usize..5,
    )
        .prop_map(|(customer, city, ym, cents, product)| SalesFact {
            invoice_id: Some(format!("{}", cents.rem_euclid(7))),
            period: ym.map(|(y, m)| Period::from_year_month(y, m).unwrap()),
            customer_key: customer.map(SurrogateKey::new),
            city_key: city.map(SurrogateKey::new),
            description: Some(format!("product-{product}")),
            total_including_tax: Some(Money::from_cents(cents)),
            total_excluding_tax: Some(Money::from_cents(cents / 2)),
            profit: Some(Money::from_cents(cents / 5)),
            ..SalesFact::default()
        })
}

fn arb_dims() -> impl Strategy<Value = Dimensions> {
    (
        prop::collection::vec(0i64..6, 0..8),
        prop::collection::vec((0i64..6, prop::option::of(0usize..3)), 0..8),
    )
        .prop_map(|(customer_keys, cities)| Dimensions {
            customers: customer_keys
                .into_iter()
                .map(|k| CustomerRow { key: SurrogateKey::new(k), name: Some(format!("c{k}")) })
                .collect(),
            cities: cities
                .into_iter()
                .map(|(k, t)| CityRow {
                    key: SurrogateKey::new(k),
                    city: None,
                    state_province: Some(format!("s{k}")),
                    sales_territory: t.map(|i| TERRITORIES[i].to_string()),
                })
                .collect(),
            stock_items: vec![StockItemRow { key: SurrogateKey::new(1), name: None }],
            employees: vec![EmployeeRow { key: SurrogateKey::new(1), preferred_name: None }],
        })
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn enrichment_never_changes_row_count(
        facts in prop::collection::vec(arb_fact(), 0..40),
        dims in arb_dims(),
    ) {
        let n = facts.len();
        let (rows, reports) = enrich(facts, &dims).unwrap();
        prop_assert_eq!(rows.len(), n);
        for r in &reports {
            prop_assert_eq!(r.rows_in, n);
            prop_assert_eq!(r.rows_out, n);
            prop_assert_eq!(r.matched + r.unmatched, n);
        }
    }

    #[test]
    fn filtering_only_shrinks_and_full_selection_is_identity(
        facts in prop::collection::vec(arb_fact(), 0..40),
        dims in arb_dims(),
        years in prop::collection::btree_set(2013i32..2017, 0..4),
        quarters in prop::collection::btree_set(prop::sample::select(Quarter::ALL.to_vec()), 0..4),
    ) {
        let (rows, _) = enrich(facts, &dims).unwrap();
        let observed = facets(&rows);
        let with_period = rows.iter().filter(|r| r.fact.period.is_some()).count();

        let full = apply_filter(&rows, &FilterSelection::full(&observed), &observed);
        prop_assert_eq!(full.len(), with_period);

        let sel = FilterSelection::full(&observed).with_years(years).with_quarters(quarters);
        let narrowed = apply_filter(&rows, &sel, &observed);
        prop_assert!(narrowed.len() <= full.len());
        prop_assert!(narrowed.len() <= rows.len());
    }

    #[test]
    fn monthly_revenue_sums_to_kpi_revenue(
        facts in prop::collection::vec(arb_fact(), 0..40),
        dims in arb_dims(),
    ) {
        let (rows, _) = enrich(facts, &dims).unwrap();
        let observed = facets(&rows);
        let view = apply_filter(&rows, &FilterSelection::full(&observed), &observed);
        let monthly: Money = monthly_revenue(&view).iter().map(|m| m.revenue).sum();
        prop_assert_eq!(monthly, kpi_summary(&view).revenue);
    }

    #[test]
    fn product_ranking_is_stable_across_runs(
        facts in prop::collection::vec(arb_fact(), 0..40),
    ) {
        let (rows, _) = enrich(facts, &Dimensions::default()).unwrap();
        let view: Vec<_> = rows.iter().collect();
        let first = top_products(&view, 10);
        let mut reversed = view.clone();
        reversed.reverse();
        prop_assert_eq!(&first, &top_products(&view, 10));
        prop_assert_eq!(&first, &top_products(&reversed, 10));
    }
}
