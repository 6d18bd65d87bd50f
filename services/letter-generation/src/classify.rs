//! Overdue classification of reporting rows.
//!
//! The reference date is an explicit parameter: the caller fixes "now" once
//! per processing pass, so classification stays deterministic and testable.

use chrono::NaiveDate;

use pretenza_models::OverdueCategory;

/// Per-row classification result, consumed by the aggregator and never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_overdue: bool,
    pub days_overdue: i64,
    pub category: OverdueCategory,
}

/// Classify one reporting row.
///
/// Without an actual delivery date the row is measured against `now`
/// (category [`OverdueCategory::NotDelivered`]); with one, against the
/// actual date ([`OverdueCategory::DeliveredLate`]). On-time rows come back
/// with `is_overdue == false` and zero days.
pub fn classify(
    planned: NaiveDate,
    actual: Option<NaiveDate>,
    now: NaiveDate,
) -> Classification {
    match actual {
        None => {
            let overdue = now > planned;
            Classification {
                is_overdue: overdue,
                days_overdue: if overdue { (now - planned).num_days() } else { 0 },
                category: OverdueCategory::NotDelivered,
            }
        }
        Some(actual) => {
            let overdue = actual > planned;
            Classification {
                is_overdue: overdue,
                days_overdue: if overdue { (actual - planned).num_days() } else { 0 },
                category: OverdueCategory::DeliveredLate,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_delivered_exactly_on_time() {
        let planned = date(2025, 3, 1);
        let result = classify(planned, Some(planned), date(2025, 6, 1));
        assert!(!result.is_overdue);
        assert_eq!(result.days_overdue, 0);
    }

    #[test]
    fn test_delivered_early() {
        let result = classify(date(2025, 3, 10), Some(date(2025, 3, 1)), date(2025, 6, 1));
        assert!(!result.is_overdue);
        assert_eq!(result.days_overdue, 0);
    }

    #[test]
    fn test_delivered_one_day_late() {
        let result = classify(date(2025, 3, 1), Some(date(2025, 3, 2)), date(2025, 6, 1));
        assert!(result.is_overdue);
        assert_eq!(result.days_overdue, 1);
        assert_eq!(result.category, OverdueCategory::DeliveredLate);
    }

    #[test]
    fn test_not_delivered_five_days_past_plan() {
        let result = classify(date(2025, 3, 1), None, date(2025, 3, 6));
        assert!(result.is_overdue);
        assert_eq!(result.days_overdue, 5);
        assert_eq!(result.category, OverdueCategory::NotDelivered);
    }

    #[test]
    fn test_not_delivered_but_plan_still_ahead() {
        let result = classify(date(2025, 3, 10), None, date(2025, 3, 1));
        assert!(!result.is_overdue);
        assert_eq!(result.days_overdue, 0);
    }

    #[test]
    fn test_late_delivery_ignores_reference_date() {
        // Delivered 3 days late long before "now": the delay is still 3 days.
        let result = classify(date(2025, 1, 1), Some(date(2025, 1, 4)), date(2025, 12, 31));
        assert!(result.is_overdue);
        assert_eq!(result.days_overdue, 3);
    }
}
