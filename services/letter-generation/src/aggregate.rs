//! Matching and aggregation of overdue reporting rows into letter records.
//!
//! One pass over the reporting table: classify, filter, normalize the
//! contractor, join against the registration table by order id, then
//! insert-or-update the (contractor, order) record. Row-level problems are
//! logged and skipped; only the caller's table reads can fail the pass.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use pretenza_models::{LetterKey, LetterRecord, Position, RegistrationRow, ReportingRow};

use crate::classify::classify;
use crate::normalize::{legal_form, normalize, short_name};
use crate::penalty::accrue;

/// Aggregate overdue reporting rows into one [`LetterRecord`] per distinct
/// (normalized contractor, order id) pair.
///
/// `now` is the reference date for rows without an actual delivery date.
/// Records come back in first-occurrence order; downstream must not rely on
/// that order.
pub fn aggregate(
    reporting: &[ReportingRow],
    registration: &[RegistrationRow],
    now: NaiveDate,
) -> Vec<LetterRecord> {
    // First registration row per order id wins, like the source exports.
    let mut registry: HashMap<&str, &RegistrationRow> = HashMap::new();
    for row in registration {
        registry.entry(row.order_id.as_str()).or_insert(row);
    }

    let mut records: HashMap<LetterKey, LetterRecord> = HashMap::new();
    let mut insertion_order: Vec<LetterKey> = Vec::new();

    for row in reporting {
        let classification = classify(row.planned_date, row.actual_date, now);
        if !classification.is_overdue {
            continue;
        }
        if !row.has_chargeable_amount() {
            debug!(
                order_id = %row.order_id,
                amount = row.amount,
                "Skipping overdue row without a chargeable amount"
            );
            continue;
        }

        let contractor = normalize(&row.contractor);

        let Some(registration_row) = registry.get(row.order_id.as_str()).copied() else {
            warn!(
                order_id = %row.order_id,
                contractor = %contractor,
                "No registration record for overdue order; row skipped"
            );
            continue;
        };

        let key = LetterKey {
            contractor: contractor.clone(),
            order_id: row.order_id.clone(),
        };

        let record = records.entry(key.clone()).or_insert_with(|| {
            insertion_order.push(key.clone());
            LetterRecord::new(
                row.order_id.clone(),
                contractor.clone(),
                short_name(&contractor),
                legal_form(&contractor),
                registration_row,
                row.planned_date,
                classification.category,
            )
        });

        let penalty = accrue(row.amount, classification.days_overdue);
        record.push_position(Position {
            item_number: row.item_number.clone(),
            item_name: row.item_name.clone(),
            unit: row.unit.clone(),
            quantity: row.quantity.clone(),
            amount: row.amount,
            days_overdue: classification.days_overdue,
            penalty,
        });
    }

    insertion_order
        .into_iter()
        .filter_map(|key| records.remove(&key))
        .collect()
}
