//! Typed input rows for the two spreadsheet exports.
//!
//! The source tables are positional (no reliable headers), so each physical
//! row is converted into one of these records exactly once at ingestion.
//! Anything that fails required-field validation there is skipped with a
//! warning instead of surfacing as a scattered index/type error later.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One line of the delivery-reporting export.
///
/// `actual_date` is `None` while the delivery has not happened yet. The four
/// descriptive fields are free text carried verbatim into appendix positions.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ReportingRow {
    #[validate(length(min = 1, message = "Order identifier is required"))]
    pub order_id: String,
    #[validate(length(min = 1, message = "Contractor name is required"))]
    pub contractor: String,
    pub planned_date: NaiveDate,
    pub actual_date: Option<NaiveDate>,
    pub amount: f64,
    pub item_number: String,
    pub item_name: String,
    pub unit: String,
    pub quantity: String,
}

impl ReportingRow {
    /// Rows with no positive line amount never contribute a position.
    pub fn has_chargeable_amount(&self) -> bool {
        self.amount > 0.0
    }
}

/// One line of the document-registration export, keyed by order identifier.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct RegistrationRow {
    #[validate(length(min = 1, message = "Order identifier is required"))]
    pub order_id: String,
    pub entity_name: String,
    pub reg_number: String,
    pub reg_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reporting_row_validation() {
        let row = ReportingRow {
            order_id: "ORD-5".to_string(),
            contractor: "ООО \"Ромашка\"".to_string(),
            planned_date: date(2025, 3, 1),
            actual_date: None,
            amount: 1000.0,
            item_number: "A-1".to_string(),
            item_name: "Клапан".to_string(),
            unit: "шт".to_string(),
            quantity: "4".to_string(),
        };
        assert!(row.validate().is_ok());
        assert!(row.has_chargeable_amount());

        let empty_order = ReportingRow {
            order_id: String::new(),
            ..row.clone()
        };
        assert!(empty_order.validate().is_err());
    }

    #[test]
    fn test_zero_amount_is_not_chargeable() {
        let row = ReportingRow {
            order_id: "ORD-1".to_string(),
            contractor: "АО \"Вектор\"".to_string(),
            planned_date: date(2025, 1, 10),
            actual_date: Some(date(2025, 1, 20)),
            amount: 0.0,
            item_number: String::new(),
            item_name: String::new(),
            unit: String::new(),
            quantity: String::new(),
        };
        assert!(!row.has_chargeable_amount());
    }
}
