use crate::domain::{AllocationRecord, Instrument, PreviewRow, RiskProfile};
use crate::error::AdvisorError;
use std::cmp::Ordering;

/// Allocations at or below this amount (currency units) are dropped.
pub const DE_MINIMIS_AMOUNT: f64 = 0.5;

/// Input affordances for amount entry. The engine itself accepts any positive amount.
pub const MIN_INVESTMENT: f64 = 100.0;
pub const INVESTMENT_STEP: f64 = 100.0;
pub const DEFAULT_INVESTMENT: f64 = 2000.0;

pub const DEFAULT_PREVIEW_LIMIT: usize = 10;

/// Cluster rows with their share of the cluster's total weight, before any
/// de-minimis filtering. Rows keep dataset order.
pub fn normalize_cluster<'a>(
    instruments: &'a [Instrument],
    profile: RiskProfile,
) -> Result<Vec<(&'a Instrument, f64)>, AdvisorError> {
    let cluster_id = profile.cluster_id();
    let subset: Vec<&Instrument> = instruments
        .iter()
        .filter(|i| i.cluster_id == cluster_id)
        .collect();

    if subset.is_empty() {
        return Ok(Vec::new());
    }

    let weight_sum: f64 = subset.iter().map(|i| i.weight).sum();
    if weight_sum == 0.0 {
        return Err(AdvisorError::ZeroWeightSum { cluster_id });
    }

    Ok(subset
        .into_iter()
        .map(|i| (i, i.weight / weight_sum))
        .collect())
}

/// Splits `total_investment` across the selected profile's cluster.
///
/// Returns every retained row ranked by amount, largest first; equal amounts
/// keep dataset order. An empty cluster yields an empty list.
pub fn allocate(
    instruments: &[Instrument],
    profile: Option<RiskProfile>,
    total_investment: f64,
) -> Result<Vec<AllocationRecord>, AdvisorError> {
    let profile = profile.ok_or(AdvisorError::NoProfileSelected)?;
    if !total_investment.is_finite() || total_investment <= 0.0 {
        return Err(AdvisorError::InvalidInvestment(total_investment));
    }

    let mut out: Vec<AllocationRecord> = normalize_cluster(instruments, profile)?
        .into_iter()
        .map(|(i, normalized_weight)| AllocationRecord {
            symbol: i.symbol.clone(),
            display_name: i.display_name.clone(),
            normalized_weight,
            invest_amount: normalized_weight * total_investment,
        })
        .filter(|r| r.invest_amount > DE_MINIMIS_AMOUNT)
        .collect();

    // `sort_by` is stable.
    out.sort_by(|a, b| {
        b.invest_amount
            .partial_cmp(&a.invest_amount)
            .unwrap_or(Ordering::Equal)
    });

    Ok(out)
}

/// First `limit` cluster rows in dataset order.
pub fn preview(instruments: &[Instrument], profile: RiskProfile, limit: usize) -> Vec<PreviewRow> {
    let cluster_id = profile.cluster_id();
    instruments
        .iter()
        .filter(|i| i.cluster_id == cluster_id)
        .take(limit)
        .map(PreviewRow::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(symbol: &str, cluster_id: i64, weight: f64) -> Instrument {
        Instrument::new(symbol, format!("{symbol} Inc"), "Tech", cluster_id, weight)
    }

    fn sample() -> Vec<Instrument> {
        vec![
            inst("A", 1, 3.0),
            inst("X", 0, 5.0),
            inst("B", 1, 1.0),
            inst("C", 2, 2.0),
        ]
    }

    #[test]
    fn splits_by_relative_weight() {
        let out = allocate(&sample(), Some(RiskProfile::Aggressive), 100.0).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].symbol, "A");
        assert_eq!(out[0].display_name, "A Inc");
        assert_eq!(out[0].normalized_weight, 0.75);
        assert_eq!(out[0].invest_amount, 75.0);
        assert_eq!(out[1].symbol, "B");
        assert_eq!(out[1].normalized_weight, 0.25);
        assert_eq!(out[1].invest_amount, 25.0);
    }

    #[test]
    fn ranks_by_amount_descending() {
        let rows = vec![inst("S", 2, 1.0), inst("L", 2, 6.0), inst("M", 2, 3.0)];
        let out = allocate(&rows, Some(RiskProfile::Conservative), 1000.0).unwrap();
        let symbols: Vec<_> = out.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["L", "M", "S"]);
    }

    #[test]
    fn ties_keep_dataset_order() {
        let rows = vec![
            inst("first", 0, 1.0),
            inst("big", 0, 2.0),
            inst("second", 0, 1.0),
            inst("third", 0, 1.0),
        ];
        let out = allocate(&rows, Some(RiskProfile::Moderate), 500.0).unwrap();
        let symbols: Vec<_> = out.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["big", "first", "second", "third"]);
    }

    #[test]
    fn duplicate_symbols_stay_separate_rows() {
        let rows = vec![inst("DUP", 0, 1.0), inst("DUP", 0, 1.0)];
        let out = allocate(&rows, Some(RiskProfile::Moderate), 100.0).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.invest_amount == 50.0));
    }

    #[test]
    fn missing_profile_is_an_error() {
        assert_eq!(
            allocate(&sample(), None, 100.0),
            Err(AdvisorError::NoProfileSelected)
        );
    }

    #[test]
    fn empty_cluster_is_empty_not_error() {
        let rows = vec![inst("A", 1, 1.0)];
        let out = allocate(&rows, Some(RiskProfile::Conservative), 100.0).unwrap();
        assert!(out.is_empty());
        assert!(allocate(&[], Some(RiskProfile::Moderate), 100.0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn all_zero_weights_fail() {
        let rows = vec![inst("A", 2, 0.0), inst("B", 2, 0.0), inst("C", 1, 4.0)];
        assert_eq!(
            allocate(&rows, Some(RiskProfile::Conservative), 100.0),
            Err(AdvisorError::ZeroWeightSum { cluster_id: 2 })
        );
    }

    #[test]
    fn rejects_non_positive_or_non_finite_amounts() {
        for amount in [0.0, -100.0, f64::NAN, f64::INFINITY] {
            let err = allocate(&sample(), Some(RiskProfile::Aggressive), amount).unwrap_err();
            assert_eq!(err.code(), "invalid_investment");
        }
    }

    #[test]
    fn accepts_amounts_off_the_input_grid() {
        let out = allocate(&sample(), Some(RiskProfile::Aggressive), 37.5).unwrap();
        assert_eq!(out[0].invest_amount, 37.5 * 0.75);
    }

    #[test]
    fn de_minimis_boundary_is_exclusive() {
        // 1/4 of 2.0 is exactly 0.5.
        let rows = vec![inst("BIG", 0, 3.0), inst("EDGE", 0, 1.0)];
        let out = allocate(&rows, Some(RiskProfile::Moderate), 2.0).unwrap();
        let symbols: Vec<_> = out.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["BIG"]);

        let out = allocate(&rows, Some(RiskProfile::Moderate), 2.0000004).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[1].invest_amount > DE_MINIMIS_AMOUNT);
    }

    #[test]
    fn zero_weight_rows_are_filtered() {
        let rows = vec![inst("A", 1, 1.0), inst("Z", 1, 0.0)];
        let out = allocate(&rows, Some(RiskProfile::Aggressive), 1000.0).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].symbol, "A");
    }

    #[test]
    fn normalized_weights_sum_to_one_before_filtering() {
        let rows: Vec<_> = (1..=40)
            .map(|i| inst(&format!("S{i}"), 0, (i as f64) * 0.37))
            .collect();
        let normalized = normalize_cluster(&rows, RiskProfile::Moderate).unwrap();
        assert_eq!(normalized.len(), 40);
        let sum: f64 = normalized.iter().map(|(_, w)| w).sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum was {sum}");

        // Small totals filter rows, but not the underlying shares.
        let filtered = allocate(&rows, Some(RiskProfile::Moderate), 100.0).unwrap();
        assert!(filtered.len() < 40);
    }

    #[test]
    fn doubling_the_amount_doubles_every_row() {
        let rows: Vec<_> = (1..=25)
            .map(|i| inst(&format!("S{i}"), 1, 1.0 + (i as f64).sqrt()))
            .collect();
        let base = allocate(&rows, Some(RiskProfile::Aggressive), 1300.0).unwrap();
        let doubled = allocate(&rows, Some(RiskProfile::Aggressive), 2600.0).unwrap();
        assert_eq!(base.len(), doubled.len());
        for (a, b) in base.iter().zip(&doubled) {
            assert_eq!(a.symbol, b.symbol);
            assert_eq!(b.invest_amount, a.invest_amount * 2.0);
        }
    }

    #[test]
    fn repeated_calls_are_identical() {
        let rows = sample();
        let first = allocate(&rows, Some(RiskProfile::Aggressive), 2000.0).unwrap();
        let second = allocate(&rows, Some(RiskProfile::Aggressive), 2000.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn preview_is_limited_and_in_dataset_order() {
        let rows: Vec<_> = (1..=12).map(|i| inst(&format!("P{i}"), 2, 1.0)).collect();
        let out = preview(&rows, RiskProfile::Conservative, DEFAULT_PREVIEW_LIMIT);
        assert_eq!(out.len(), 10);
        assert_eq!(out[0].symbol, "P1");
        assert_eq!(out[9].symbol, "P10");
        assert_eq!(out[0].sector, "Tech");
        assert!(preview(&rows, RiskProfile::Moderate, 10).is_empty());
    }
}
