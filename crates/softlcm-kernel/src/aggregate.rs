//! Validated-set aggregation: the deduplicated union of all tiers.

use crate::rule::{RuleId, SoftwareId, ValidatedSoftware};
use crate::scope::Tiers;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A non-empty set of validated-software rules, keyed by rule id.
///
/// Absence of validated rules is expressed as `None` at the call site,
/// never as an empty `ValidatedSet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidatedSet(BTreeMap<RuleId, ValidatedSoftware>);

impl ValidatedSet {
    fn from_map(rules: BTreeMap<RuleId, ValidatedSoftware>) -> Option<Self> {
        if rules.is_empty() {
            None
        } else {
            Some(Self(rules))
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, id: &RuleId) -> bool {
        self.0.contains_key(id)
    }

    pub fn get(&self, id: &RuleId) -> Option<&ValidatedSoftware> {
        self.0.get(id)
    }

    /// Rules in rule-id order.
    pub fn iter(&self) -> impl Iterator<Item = &ValidatedSoftware> {
        self.0.values()
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = &RuleId> {
        self.0.keys()
    }

    /// Distinct software versions named by the set.
    pub fn software_ids(&self) -> BTreeSet<&SoftwareId> {
        self.0.values().map(|rule| &rule.software).collect()
    }

    pub fn into_rules(self) -> Vec<ValidatedSoftware> {
        self.0.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a ValidatedSet {
    type Item = &'a ValidatedSoftware;
    type IntoIter = std::collections::btree_map::Values<'a, RuleId, ValidatedSoftware>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.values()
    }
}

/// Union `tiers` into one validated set.
///
/// Returns `None` when no rule matched, or when `valid_only` filtered every
/// matched rule out.
pub fn aggregate(tiers: &Tiers, valid_only: bool) -> Option<ValidatedSet> {
    let union: BTreeMap<RuleId, ValidatedSoftware> = tiers
        .rules()
        .map(|rule| (rule.id.clone(), rule.clone()))
        .collect();
    if union.is_empty() {
        return None;
    }

    if !valid_only {
        return ValidatedSet::from_map(union);
    }

    let filtered = union.into_iter().filter(|(_, rule)| rule.valid).collect();
    ValidatedSet::from_map(filtered)
}
