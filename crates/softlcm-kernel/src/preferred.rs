//! Preferred selection: preferred rules in specificity order.
//!
//! Tiers are rule-disjoint, so no rule appears twice. Software versions
//! can: two distinct rules on different scope axes may both prefer the same
//! version. The list keeps both entries; `repeated_software` reports them.

use crate::rule::{SoftwareId, ValidatedSoftware};
use crate::scope::Tiers;
use std::collections::BTreeSet;

/// Preferred rules from `tiers`, most specific tier first.
///
/// With `valid_only`, rules whose `valid` flag is false are skipped.
pub fn preferred(tiers: &Tiers, valid_only: bool) -> Vec<ValidatedSoftware> {
    tiers
        .rules()
        .filter(|rule| rule.preferred && (!valid_only || rule.valid))
        .cloned()
        .collect()
}

/// Software versions named by more than one entry of a preferred list,
/// in order of their second appearance.
pub fn repeated_software(rules: &[ValidatedSoftware]) -> Vec<SoftwareId> {
    let mut seen = BTreeSet::new();
    let mut repeated = Vec::new();
    for rule in rules {
        if !seen.insert(&rule.software) && !repeated.contains(&rule.software) {
            repeated.push(rule.software.clone());
        }
    }
    repeated
}
