//! Common types used across the tracker

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Record identifier, taken from wall-clock milliseconds at creation
pub type RecordId = i64;

/// Next identifier for a new record.
///
/// Uses the current time in milliseconds, bumped past `last_issued` so ids
/// stay unique and increasing even when two records are created within the
/// same millisecond.
pub fn next_record_id(now_millis: i64, last_issued: Option<RecordId>) -> RecordId {
    match last_issued {
        Some(last) if last >= now_millis => last + 1,
        _ => now_millis,
    }
}

/// What a submitted roast form is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FormMode {
    /// Fresh entry
    #[default]
    New,
    /// Overwrite an existing record in place
    Editing { id: RecordId },
    /// New record prefilled from an existing one
    Duplicating {
        source_id: RecordId,
        source_date: NaiveDate,
    },
}

impl FormMode {
    /// Whether submitting in this mode creates a new record
    pub fn creates_record(&self) -> bool {
        !matches!(self, FormMode::Editing { .. })
    }
}

impl std::fmt::Display for FormMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormMode::New => write!(f, "New"),
            FormMode::Editing { id } => write!(f, "Editing #{}", id),
            FormMode::Duplicating { source_date, .. } => {
                write!(f, "Duplicating roast from {}", source_date)
            }
        }
    }
}
