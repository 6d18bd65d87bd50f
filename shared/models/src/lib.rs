//! # Pretenza Core Domain Models
//!
//! Core domain models for the Pretenza claim-letter system.
//!
//! ## Key Models
//!
//! - **ReportingRow**: one typed line of the delivery-reporting export
//! - **RegistrationRow**: one typed line of the document-registration export
//! - **Position**: an overdue reporting line matched to a registration record
//! - **LetterRecord**: the per-contractor-per-order aggregate behind one
//!   claim letter, with incrementally maintained totals
//!
//! All models serialize with serde; input-facing rows carry validator rules
//! so required-field checks happen once, at ingestion.

pub mod letter;
pub mod rows;


pub use letter::{LetterKey, LetterRecord, OverdueCategory, Position};
pub use rows::{RegistrationRow, ReportingRow};
