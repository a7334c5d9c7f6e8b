//! Determinism utilities: stable ordering for ranked outputs.
//!
//! Every ranking in the engine must be a total order so that re-running an
//! aggregation over the same view yields the same list, element for element.

use core::cmp::Ordering;

use crate::money::Money;

/// Ranked-row order: amount descending, then label ascending (byte order).
#[inline]
pub fn cmp_amount_desc_then_label(a: (&str, Money), b: (&str, Money)) -> Ordering {
    match b.1.cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        o => o,
    }
}

/// Sort `(label, amount)` rows into ranked order and keep the first `n`.
pub fn top_n_by_amount<T, F>(mut rows: Vec<T>, n: usize, key: F) -> Vec<T>
where
    F: Fn(&T) -> (&str, Money),
{
    rows.sort_by(|a, b| cmp_amount_desc_then_label(key(a), key(b)));
    rows.truncate(n);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_break_on_label() {
        let rows = vec![
            ("b".to_string(), Money::from_cents(5)),
            ("a".to_string(), Money::from_cents(5)),
            ("c".to_string(), Money::from_cents(9)),
        ];
        let got = top_n_by_amount(rows, 10, |r| (r.0.as_str(), r.1));
        let labels: Vec<&str> = got.iter().map(|r| r.0.as_str()).collect();
        assert_eq!(labels, ["c", "a", "b"]);
    }

    #[test]
    fn truncates_to_n() {
        let rows: Vec<(String, Money)> =
            (0..20).map(|i| (format!("p{i:02}"), Money::from_cents(i))).collect();
        let got = top_n_by_amount(rows, 3, |r| (r.0.as_str(), r.1));
        assert_eq!(got.len(), 3);
        assert_eq!(got[0].0, "p19");
    }
}
