//! Headline summary derived from a fetched price series
//!
//! Pure computation: first/last price, absolute and percentage change,
//! gain/loss direction, and a human-readable range label. Recomputed from
//! scratch whenever a new series is accepted, never updated incrementally.

use crate::data::PricePoint;

/// Whether the price moved up or down over the range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Positive,
    Negative,
}

/// Derived stats for the currently displayed price series
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Price at the start of the range
    pub first_price: f64,
    /// Price at the end of the range
    pub last_price: f64,
    /// `last_price - first_price`, displayed unscaled
    pub absolute_diff: f64,
    /// Magnitude of the change relative to the last price, in percent
    pub percentage_diff: f64,
    /// Human-readable label for the lookback range ("" when unmapped)
    pub range_label: &'static str,
    /// Gain or loss classification; zero change counts as a gain
    pub trend: Trend,
}

/// Label shown for each supported lookback duration
///
/// Unmapped durations yield an empty label rather than an error.
pub fn range_label(duration_days: u32) -> &'static str {
    match duration_days {
        1 => "TODAY",
        3 => "3 DAYS",
        30 => "1 MONTH",
        180 => "6 MONTH",
        365 => "1 YEAR",
        3650 => "ALL",
        _ => "",
    }
}

/// Derives the headline summary from a price series
///
/// Returns `None` for an empty series: no data means "unavailable", not a
/// zero-valued summary.
pub fn derive_summary(series: &[PricePoint], duration_days: u32) -> Option<Summary> {
    let first = series.first()?;
    let last = series.last()?;

    let absolute_diff = last.price - first.price;
    let percentage_diff = (absolute_diff / last.price * 100.0).abs();
    let trend = if absolute_diff >= 0.0 {
        Trend::Positive
    } else {
        Trend::Negative
    };

    Some(Summary {
        first_price: first.price,
        last_price: last.price,
        absolute_diff,
        percentage_diff,
        range_label: range_label(duration_days),
        trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                timestamp_ms: 1_700_000_000_000 + i as i64 * 60_000,
                price,
            })
            .collect()
    }

    #[test]
    fn test_empty_series_yields_no_summary() {
        assert!(derive_summary(&[], 1).is_none());
    }

    #[test]
    fn test_gain_over_range() {
        let summary = derive_summary(&series(&[100.0, 105.0, 110.0]), 1).unwrap();

        assert_eq!(summary.trend, Trend::Positive);
        assert!((summary.first_price - 100.0).abs() < 1e-9);
        assert!((summary.last_price - 110.0).abs() < 1e-9);
        assert!((summary.absolute_diff - 10.0).abs() < 1e-9);
        // 10 / 110 * 100
        assert!((summary.percentage_diff - 9.0909).abs() < 0.001);
        assert_eq!(summary.range_label, "TODAY");
    }

    #[test]
    fn test_loss_over_range() {
        let summary = derive_summary(&series(&[100.0, 90.0]), 3).unwrap();

        assert_eq!(summary.trend, Trend::Negative);
        assert!((summary.absolute_diff - (-10.0)).abs() < 1e-9);
        // |-10| / 90 * 100
        assert!((summary.percentage_diff - 11.1111).abs() < 0.001);
        assert_eq!(summary.range_label, "3 DAYS");
    }

    #[test]
    fn test_percentage_diff_is_non_negative() {
        let summary = derive_summary(&series(&[200.0, 150.0]), 30).unwrap();
        assert!(summary.percentage_diff >= 0.0);
    }

    #[test]
    fn test_flat_series_counts_as_gain() {
        let summary = derive_summary(&series(&[100.0, 100.0]), 365).unwrap();
        assert_eq!(summary.trend, Trend::Positive);
        assert!((summary.absolute_diff).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample_series() {
        let summary = derive_summary(&series(&[42.0]), 1).unwrap();
        assert!((summary.absolute_diff).abs() < 1e-9);
        assert_eq!(summary.trend, Trend::Positive);
    }

    #[test]
    fn test_derivation_is_pure() {
        let s = series(&[100.0, 108.0, 104.0]);
        let a = derive_summary(&s, 30).unwrap();
        let b = derive_summary(&s, 30).unwrap();
        assert_eq!(a, b, "Same series and duration yield the same summary");
    }

    #[test]
    fn test_range_label_table() {
        assert_eq!(range_label(1), "TODAY");
        assert_eq!(range_label(3), "3 DAYS");
        assert_eq!(range_label(30), "1 MONTH");
        assert_eq!(range_label(180), "6 MONTH");
        assert_eq!(range_label(365), "1 YEAR");
        assert_eq!(range_label(3650), "ALL");
    }

    #[test]
    fn test_range_label_unmapped_duration_is_empty() {
        assert_eq!(range_label(7), "");
        assert_eq!(range_label(0), "");
    }
}
