//! Stored validated-software records.
//!
//! The store keeps a validity window per rule; the kernel only sees the
//! `valid` flag materialized from it for the store's evaluation date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use softlcm_kernel::{RuleId, RuleScope, SoftwareId, ValidatedSoftware};

/// A validated-software rule as persisted, with its validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedSoftwareRecord {
    pub id: RuleId,
    pub software: SoftwareId,
    #[serde(default)]
    pub scope: RuleScope,
    pub start: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub preferred: bool,
}

impl ValidatedSoftwareRecord {
    pub fn new(id: impl Into<String>, software: impl Into<String>, start: NaiveDate) -> Self {
        Self {
            id: RuleId::new(id),
            software: SoftwareId::new(software),
            scope: RuleScope::default(),
            start,
            end: None,
            preferred: false,
        }
    }

    /// Whether `date` falls inside `[start, end]`. An open end never
    /// expires.
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.start <= date && self.end.is_none_or(|end| date <= end)
    }

    /// The kernel view of this record as of `date`.
    pub fn materialize(&self, date: NaiveDate) -> ValidatedSoftware {
        ValidatedSoftware {
            id: self.id.clone(),
            software: self.software.clone(),
            preferred: self.preferred,
            valid: self.is_valid_on(date),
            scope: self.scope.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn validity_window_is_inclusive() {
        let mut record = ValidatedSoftwareRecord::new("vs-1", "sw-1", date(2024, 1, 1));
        record.end = Some(date(2024, 12, 31));

        assert!(!record.is_valid_on(date(2023, 12, 31)));
        assert!(record.is_valid_on(date(2024, 1, 1)));
        assert!(record.is_valid_on(date(2024, 12, 31)));
        assert!(!record.is_valid_on(date(2025, 1, 1)));
    }

    #[test]
    fn open_ended_record_stays_valid() {
        let record = ValidatedSoftwareRecord::new("vs-1", "sw-1", date(2020, 5, 1));
        assert!(record.is_valid_on(date(2099, 1, 1)));
    }

    #[test]
    fn materialize_keeps_preferred_independent_of_validity() {
        let mut record = ValidatedSoftwareRecord::new("vs-1", "sw-1", date(2024, 1, 1));
        record.preferred = true;
        record.end = Some(date(2024, 3, 1));

        let expired = record.materialize(date(2024, 6, 1));
        assert!(expired.preferred);
        assert!(!expired.valid);
    }
}
