//! Scope matching: asset → ordered rule tiers.
//!
//! ```text
//! Device         Asset ▷ TypeAndRole ▷ TypeOnly
//! DeviceType     TypeAny
//! InventoryItem  Asset
//! ```
//!
//! Tiers are ordered most specific first and are rule-disjoint: a rule
//! matched by a narrower tier is subtracted from every broader one.
//! Unset hierarchy references produce empty tiers without querying the
//! store.

use crate::asset::{Asset, Device, DeviceType, InventoryItem};
use crate::error::{Query, ResolveError};
use crate::rule::{RuleId, ValidatedSoftware};
use crate::store::RuleStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How precisely a tier's rules target the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specificity {
    /// The rule names the asset itself (device id or inventory part).
    Asset,
    /// The rule names the device's type and role.
    TypeAndRole,
    /// The rule names the device's type and no role.
    TypeOnly,
    /// The rule names the device type, with or without roles.
    TypeAny,
}

/// Rules matched at one specificity level, unique and in rule-id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tier {
    pub specificity: Specificity,
    pub rules: Vec<ValidatedSoftware>,
}

impl Tier {
    /// Build a tier, dropping duplicates and any rule in `exclude`.
    fn collect(
        specificity: Specificity,
        rules: impl IntoIterator<Item = ValidatedSoftware>,
        exclude: &BTreeSet<RuleId>,
    ) -> Self {
        let mut unique: BTreeMap<RuleId, ValidatedSoftware> = BTreeMap::new();
        for rule in rules {
            if exclude.contains(&rule.id) {
                continue;
            }
            unique.entry(rule.id.clone()).or_insert(rule);
        }
        Self {
            specificity,
            rules: unique.into_values().collect(),
        }
    }

    fn empty(specificity: Specificity) -> Self {
        Self {
            specificity,
            rules: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = &RuleId> {
        self.rules.iter().map(|rule| &rule.id)
    }
}

/// Ordered tiers for one asset, most specific first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tiers(Vec<Tier>);

impl Tiers {
    pub fn iter(&self) -> impl Iterator<Item = &Tier> {
        self.0.iter()
    }

    /// All rules in tier order.
    pub fn rules(&self) -> impl Iterator<Item = &ValidatedSoftware> {
        self.0.iter().flat_map(|tier| tier.rules.iter())
    }

    pub fn tier(&self, specificity: Specificity) -> Option<&Tier> {
        self.0.iter().find(|tier| tier.specificity == specificity)
    }

    /// Whether no tier holds a rule.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Tier::is_empty)
    }

    fn push(&mut self, tier: Tier, seen: &mut BTreeSet<RuleId>) {
        seen.extend(tier.rule_ids().cloned());
        self.0.push(tier);
    }
}

impl<'a> IntoIterator for &'a Tiers {
    type Item = &'a Tier;
    type IntoIter = std::slice::Iter<'a, Tier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Match `asset` against `store`, dispatching on asset kind.
pub fn match_scope(store: &dyn RuleStore, asset: &Asset) -> Result<Tiers, ResolveError> {
    match asset {
        Asset::Device(device) => match_device(store, device),
        Asset::DeviceType(device_type) => match_device_type(store, device_type),
        Asset::InventoryItem(item) => match_inventory_item(store, item),
    }
}

fn match_device(store: &dyn RuleStore, device: &Device) -> Result<Tiers, ResolveError> {
    let mut tiers = Tiers::default();
    let mut seen = BTreeSet::new();

    let explicit = store
        .rules_for_device(&device.id)
        .map_err(|e| ResolveError::lookup(Query::Device(device.id.clone()), e))?;
    tiers.push(Tier::collect(Specificity::Asset, explicit, &seen), &mut seen);

    let type_and_role = match (&device.device_type_id, &device.role_id) {
        (Some(device_type), Some(role)) => {
            let rules = store
                .rules_for_device_type_and_role(device_type, role)
                .map_err(|e| {
                    ResolveError::lookup(
                        Query::DeviceTypeAndRole(device_type.clone(), role.clone()),
                        e,
                    )
                })?;
            Tier::collect(Specificity::TypeAndRole, rules, &seen)
        }
        _ => Tier::empty(Specificity::TypeAndRole),
    };
    tiers.push(type_and_role, &mut seen);

    let type_only = match &device.device_type_id {
        Some(device_type) => {
            let rules = store
                .rules_for_device_type(device_type)
                .map_err(|e| ResolveError::lookup(Query::DeviceType(device_type.clone()), e))?;
            Tier::collect(
                Specificity::TypeOnly,
                rules
                    .into_iter()
                    .filter(|rule| rule.scope.targets_type_only(device_type)),
                &seen,
            )
        }
        None => Tier::empty(Specificity::TypeOnly),
    };
    tiers.push(type_only, &mut seen);

    Ok(tiers)
}

fn match_device_type(
    store: &dyn RuleStore,
    device_type: &DeviceType,
) -> Result<Tiers, ResolveError> {
    let rules = store
        .rules_for_device_type(&device_type.id)
        .map_err(|e| ResolveError::lookup(Query::DeviceType(device_type.id.clone()), e))?;

    let mut tiers = Tiers::default();
    let mut seen = BTreeSet::new();
    tiers.push(Tier::collect(Specificity::TypeAny, rules, &seen), &mut seen);
    Ok(tiers)
}

fn match_inventory_item(
    store: &dyn RuleStore,
    item: &InventoryItem,
) -> Result<Tiers, ResolveError> {
    let tier = match &item.part_id {
        Some(part) => {
            let rules = store
                .rules_for_inventory_item(part)
                .map_err(|e| ResolveError::lookup(Query::InventoryItem(part.clone()), e))?;
            Tier::collect(Specificity::Asset, rules, &BTreeSet::new())
        }
        None => Tier::empty(Specificity::Asset),
    };

    let mut tiers = Tiers::default();
    let mut seen = BTreeSet::new();
    tiers.push(tier, &mut seen);
    Ok(tiers)
}
