//! Compliance: is the assigned software among the validated versions?

use crate::rule::{SoftwareId, ValidatedSoftware};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which rules an assignment is checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceMode {
    /// Any validated rule.
    #[default]
    Validated,
    /// Only rules flagged preferred.
    Preferred,
}

impl ComplianceMode {
    pub fn preferred_only(self) -> bool {
        matches!(self, ComplianceMode::Preferred)
    }
}

/// Whether `assigned` is named by one of `rules`.
///
/// Absent assignment or no rules is non-compliant. Membership is by
/// software identity: several rules may name the same version.
pub fn is_compliant<'a>(
    assigned: Option<&SoftwareId>,
    rules: impl IntoIterator<Item = &'a ValidatedSoftware>,
    preferred_only: bool,
) -> bool {
    let Some(assigned) = assigned else {
        return false;
    };

    let versions: BTreeSet<&SoftwareId> = rules
        .into_iter()
        .filter(|rule| !preferred_only || rule.preferred)
        .map(|rule| &rule.software)
        .collect();

    versions.contains(assigned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<ValidatedSoftware> {
        vec![
            ValidatedSoftware::new("vs-1", "v1.0"),
            ValidatedSoftware::new("vs-2", "v2.0").preferred(true),
        ]
    }

    #[test]
    fn absent_assignment_is_never_compliant() {
        assert!(!is_compliant(None, &rules(), false));
        assert!(!is_compliant(None, &rules(), true));
    }

    #[test]
    fn empty_rules_are_never_compliant() {
        let assigned = SoftwareId::new("v1.0");
        assert!(!is_compliant(Some(&assigned), &Vec::<ValidatedSoftware>::new(), false));
    }

    #[test]
    fn membership_is_by_software_version() {
        let rules = rules();
        assert!(is_compliant(Some(&SoftwareId::new("v1.0")), &rules, false));
        assert!(!is_compliant(Some(&SoftwareId::new("v3.0")), &rules, false));
    }

    #[test]
    fn preferred_only_restricts_to_preferred_rules() {
        let rules = rules();
        assert!(!is_compliant(Some(&SoftwareId::new("v1.0")), &rules, true));
        assert!(is_compliant(Some(&SoftwareId::new("v2.0")), &rules, true));
    }
}
