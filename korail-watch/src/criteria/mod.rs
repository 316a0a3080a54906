//! The search criteria set.
//!
//! Criteria are kept in a JSON array file and loaded once per run. Every
//! record is validated eagerly; errors name the record index and field.

mod file;
mod record;

pub use file::{CriteriaFile, DEFAULT_CRITERIA_FILE, parse_criteria};
pub use record::{CriterionRecord, validate_records};
