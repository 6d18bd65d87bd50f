//! Contractual penalty accrual.
//!
//! The contract charges a daily rate against the value of the undelivered
//! goods, where each day's charge is computed on the principal plus all
//! penalty already accrued: 0.1% per day for the first two weeks of delay,
//! 0.5% per day after that. The day-by-day loop is the form of record; the
//! closed-form compound-interest identity is only used by the tests.

/// Daily rate during the first two weeks of delay.
const TIER_ONE_DAILY_RATE: f64 = 0.001;
/// Daily rate from day 15 onward.
const TIER_TWO_DAILY_RATE: f64 = 0.005;
/// Length of the reduced-rate tier, in days.
const TIER_ONE_DAYS: i64 = 14;

/// Accrued penalty for `principal` after `overdue_days` of delay.
///
/// Deterministic in its arguments; no rounding is applied here, formatting
/// to kopecks happens at presentation.
pub fn accrue(principal: f64, overdue_days: i64) -> f64 {
    if overdue_days <= 0 {
        return 0.0;
    }

    let mut current = principal;
    let mut penalty = 0.0;

    let tier_one_days = overdue_days.min(TIER_ONE_DAYS);
    for _ in 0..tier_one_days {
        let delta = current * TIER_ONE_DAILY_RATE;
        penalty += delta;
        current += delta;
    }

    for _ in 0..overdue_days - tier_one_days {
        let delta = current * TIER_TWO_DAILY_RATE;
        penalty += delta;
        current += delta;
    }

    penalty
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TOLERANCE: f64 = 1e-6;

    fn tier_one_closed_form(principal: f64, days: i64) -> f64 {
        principal * ((1.0 + TIER_ONE_DAILY_RATE).powi(days as i32) - 1.0)
    }

    #[test]
    fn test_no_penalty_without_delay() {
        assert_eq!(accrue(1000.0, 0), 0.0);
        assert_eq!(accrue(1000.0, -3), 0.0);
        assert_eq!(accrue(0.0, 10), 0.0);
    }

    #[test]
    fn test_single_day() {
        assert!((accrue(1000.0, 1) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_two_weeks_compounds_rather_than_flat() {
        let penalty = accrue(1000.0, 14);
        // Compounded ≈ 14.0912, not the flat 14.0.
        assert!(penalty > 14.0);
        assert!((penalty - tier_one_closed_form(1000.0, 14)).abs() < TOLERANCE);
        assert!((penalty - 14.091).abs() < 1e-3);
    }

    #[test]
    fn test_second_tier_composes_on_first() {
        let principal = 2500.0;
        let days = 30;

        let tier_one = accrue(principal, 14);
        let expected = tier_one
            + (principal + tier_one)
                * ((1.0 + TIER_TWO_DAILY_RATE).powi((days - 14) as i32) - 1.0);

        assert!((accrue(principal, days) - expected).abs() < TOLERANCE);
    }

    #[test]
    fn test_day_fifteen_switches_rate() {
        let at_fourteen = accrue(1000.0, 14);
        let at_fifteen = accrue(1000.0, 15);
        let day_fifteen_delta = at_fifteen - at_fourteen;
        // The fifteenth day charges 0.5% of the compounded base.
        let expected = (1000.0 + at_fourteen) * TIER_TWO_DAILY_RATE;
        assert!((day_fifteen_delta - expected).abs() < TOLERANCE);
    }

    proptest! {
        /// Within the first tier the loop matches the closed-form compound sum.
        #[test]
        fn prop_tier_one_matches_closed_form(
            principal in 0.01f64..10_000_000.0,
            days in 0i64..=14,
        ) {
            let loop_form = accrue(principal, days);
            let closed_form = tier_one_closed_form(principal, days);
            prop_assert!((loop_form - closed_form).abs() < principal * 1e-9 + 1e-9);
        }

        /// Penalty grows monotonically with the number of overdue days.
        #[test]
        fn prop_monotonic_in_days(principal in 0.01f64..1_000_000.0, days in 1i64..200) {
            prop_assert!(accrue(principal, days) < accrue(principal, days + 1));
        }
    }
}
