//! Common identifier types.
//!
//! - [`AnalysisId`]: token handed out with every accepted upload
//! - [`RuleId`]: identifier returned when a fashion rule is created
//! - [`abbrev_uuid`]: Abbreviate UUIDs to first 8 chars for logging

use uuid::Uuid;

pub type AnalysisId = Uuid;
pub type RuleId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs.
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
