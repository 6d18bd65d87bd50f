//! Letter aggregates: the per-contractor-per-order output of a processing
//! pass, with the positions that back each letter's totals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rows::RegistrationRow;

/// Why a reporting row counted as overdue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OverdueCategory {
    /// No actual delivery date and the reference date is past the plan.
    NotDelivered,
    /// Delivered, but after the planned date.
    DeliveredLate,
}

impl OverdueCategory {
    /// Human-readable label used in appendix headers and status output.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotDelivered => "просрочено, не поставлено",
            Self::DeliveredLate => "поставлено с просрочкой",
        }
    }
}

/// One overdue reporting line matched to a registration record.
///
/// Owned exclusively by its parent [`LetterRecord`]; the amount and penalty
/// here are what the record's totals are built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub item_number: String,
    pub item_name: String,
    pub unit: String,
    pub quantity: String,
    pub amount: f64,
    pub days_overdue: i64,
    pub penalty: f64,
}

/// Aggregation key: normalized contractor name + order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LetterKey {
    pub contractor: String,
    pub order_id: String,
}

/// Aggregate root for one claim letter.
///
/// Created on the first overdue position seen for its key and seeded from the
/// matched registration row; totals are maintained incrementally by
/// [`LetterRecord::push_position`] and never mutated any other way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LetterRecord {
    pub order_id: String,
    pub contractor_name: String,
    pub short_name: String,
    pub legal_form: String,
    pub entity_name: String,
    pub reg_number: String,
    pub reg_date: Option<NaiveDate>,
    pub planned_date: NaiveDate,
    pub total_amount: f64,
    pub total_penalty: f64,
    pub position_count: usize,
    pub category: OverdueCategory,
    pub positions: Vec<Position>,
}

impl LetterRecord {
    /// Seed a record from the first contributing row's context. The planned
    /// date and category of that first row stick for the whole record.
    pub fn new(
        order_id: String,
        contractor_name: String,
        short_name: String,
        legal_form: String,
        registration: &RegistrationRow,
        planned_date: NaiveDate,
        category: OverdueCategory,
    ) -> Self {
        Self {
            order_id,
            contractor_name,
            short_name,
            legal_form,
            entity_name: registration.entity_name.clone(),
            reg_number: registration.reg_number.clone(),
            reg_date: registration.reg_date,
            planned_date,
            total_amount: 0.0,
            total_penalty: 0.0,
            position_count: 0,
            category,
            positions: Vec::new(),
        }
    }

    /// Append a position, updating the running totals in the same step so the
    /// record is never observable with totals out of sync with its positions.
    pub fn push_position(&mut self, position: Position) {
        self.total_amount += position.amount;
        self.total_penalty += position.penalty;
        self.position_count += 1;
        self.positions.push(position);
    }

    pub fn key(&self) -> LetterKey {
        LetterKey {
            contractor: self.contractor_name.clone(),
            order_id: self.order_id.clone(),
        }
    }
}
