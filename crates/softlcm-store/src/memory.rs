//! Canonical in-memory state for software, rules and assignments.
//!
//! This is the reference backend for the kernel collaborators:
//! - answers scope queries in rule-id order
//! - materializes `valid` from each rule's window for the evaluation date,
//!   either a pinned `as_of` or today read from the clock at query time
//! - owns referential cleanup: deleting an asset or a software version
//!   cascades through rules and assignments here, not through events
//!
//! Every mutation bumps `revision`. Caches key on `StoreStamp`, which adds
//! the instance identity and the evaluation date to the revision.

use crate::record::ValidatedSoftwareRecord;
use crate::software::SoftwareVersion;
use chrono::{NaiveDate, Utc};
use softlcm_kernel::{
    AssetKind, AssetRef, AssignmentLookup, DeviceId, DeviceTypeId, InventoryItemId, LookupError,
    PartId, RoleId, RuleId, RuleStore, SoftwareId, ValidatedSoftware,
};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Errors raised while mutating the memory store.
#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("software not found: {0}")]
    SoftwareNotFound(SoftwareId),

    #[error("rule not found: {0}")]
    RuleNotFound(RuleId),

    #[error("software cannot be assigned to a {0}")]
    UnassignableKind(AssetKind),
}

/// What a cascading delete removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub rules_removed: usize,
    pub rules_rescoped: usize,
    pub assignments_removed: usize,
}

/// Identity of one store instance. A clone gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreId(Uuid);

impl StoreId {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a query answer depends on besides the query itself.
///
/// Two equal stamps mean the store would answer identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStamp {
    pub store: StoreId,
    pub revision: u64,
    pub evaluated_on: NaiveDate,
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// In-memory rule and assignment store.
#[derive(Debug)]
pub struct MemoryStore {
    id: StoreId,
    software: BTreeMap<SoftwareId, SoftwareVersion>,
    rules: BTreeMap<RuleId, ValidatedSoftwareRecord>,
    assignments: BTreeMap<AssetRef, SoftwareId>,
    as_of: Option<NaiveDate>,
    clock: fn() -> NaiveDate,
    revision: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::tracking_today()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            id: StoreId::fresh(),
            software: self.software.clone(),
            rules: self.rules.clone(),
            assignments: self.assignments.clone(),
            as_of: self.as_of,
            clock: self.clock,
            revision: self.revision,
        }
    }
}

impl MemoryStore {
    /// Empty store evaluating rule validity on the fixed date `as_of`.
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of: Some(as_of),
            ..Self::tracking_today()
        }
    }

    /// Empty store evaluating rule validity on today's UTC date, read at
    /// query time.
    pub fn tracking_today() -> Self {
        Self {
            id: StoreId::fresh(),
            software: BTreeMap::new(),
            rules: BTreeMap::new(),
            assignments: BTreeMap::new(),
            as_of: None,
            clock: utc_today,
            revision: 0,
        }
    }

    /// Replace the source of "today" used when no `as_of` is pinned.
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn id(&self) -> StoreId {
        self.id
    }

    /// Mutation counter; changes whenever stored state changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The pinned evaluation date, if any.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }

    /// The date rule validity is evaluated on right now.
    pub fn evaluation_date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(self.clock)
    }

    pub fn stamp(&self) -> StoreStamp {
        StoreStamp {
            store: self.id,
            revision: self.revision,
            evaluated_on: self.evaluation_date(),
        }
    }

    /// Pin the evaluation date, or follow the clock with `None`.
    pub fn set_as_of(&mut self, as_of: Option<NaiveDate>) {
        if self.as_of != as_of {
            self.as_of = as_of;
            self.bump();
        }
    }

    pub fn software(&self, id: &SoftwareId) -> Option<&SoftwareVersion> {
        self.software.get(id)
    }

    /// Iterate software versions in id order.
    pub fn software_versions(&self) -> impl Iterator<Item = &SoftwareVersion> {
        self.software.values()
    }

    pub fn rule(&self, id: &RuleId) -> Option<&ValidatedSoftwareRecord> {
        self.rules.get(id)
    }

    /// Iterate rule records in id order.
    pub fn rules(&self) -> impl Iterator<Item = &ValidatedSoftwareRecord> {
        self.rules.values()
    }

    /// Iterate assignments in asset order.
    pub fn assignments(&self) -> impl Iterator<Item = (&AssetRef, &SoftwareId)> {
        self.assignments.iter()
    }

    /// Insert or replace a software version. Returns the previous record.
    pub fn upsert_software(&mut self, software: SoftwareVersion) -> Option<SoftwareVersion> {
        self.bump();
        self.software.insert(software.id.clone(), software)
    }

    /// Insert or replace a rule. Its software version must exist.
    pub fn upsert_rule(
        &mut self,
        rule: ValidatedSoftwareRecord,
    ) -> Result<Option<ValidatedSoftwareRecord>, MemoryStoreError> {
        if !self.software.contains_key(&rule.software) {
            return Err(MemoryStoreError::SoftwareNotFound(rule.software));
        }
        self.bump();
        Ok(self.rules.insert(rule.id.clone(), rule))
    }

    pub fn delete_rule(&mut self, id: &RuleId) -> Result<ValidatedSoftwareRecord, MemoryStoreError> {
        let removed = self
            .rules
            .remove(id)
            .ok_or_else(|| MemoryStoreError::RuleNotFound(id.clone()))?;
        self.bump();
        Ok(removed)
    }

    /// Assign `software` to `asset`, replacing any previous assignment.
    ///
    /// Only devices and inventory items carry software.
    pub fn assign(
        &mut self,
        asset: AssetRef,
        software: SoftwareId,
    ) -> Result<Option<SoftwareId>, MemoryStoreError> {
        if asset.kind == AssetKind::DeviceType {
            return Err(MemoryStoreError::UnassignableKind(asset.kind));
        }
        let Some(version) = self.software.get(&software) else {
            return Err(MemoryStoreError::SoftwareNotFound(software));
        };
        if version.is_end_of_support(self.evaluation_date()) {
            warn!(
                asset = %asset,
                software = %version.label(),
                "assigned software is past end of support"
            );
        } else {
            debug!(asset = %asset, software = %version.label(), "assigned software");
        }
        self.bump();
        Ok(self.assignments.insert(asset, software))
    }

    /// The software version assigned to `asset`.
    pub fn assigned_version(&self, asset: &AssetRef) -> Option<&SoftwareVersion> {
        self.assignments
            .get(asset)
            .and_then(|software| self.software.get(software))
    }

    /// Assignments whose software has reached end of support on the
    /// evaluation date, in asset order.
    pub fn end_of_support_assignments(&self) -> Vec<(&AssetRef, &SoftwareVersion)> {
        let today = self.evaluation_date();
        self.assignments
            .iter()
            .filter_map(|(asset, software)| Some((asset, self.software.get(software)?)))
            .filter(|(_, version)| version.is_end_of_support(today))
            .collect()
    }

    pub fn unassign(&mut self, asset: &AssetRef) -> Option<SoftwareId> {
        let removed = self.assignments.remove(asset);
        if removed.is_some() {
            self.bump();
        }
        removed
    }

    /// Delete a software version with its rules and assignments.
    pub fn delete_software(
        &mut self,
        id: &SoftwareId,
    ) -> Result<(SoftwareVersion, CascadeSummary), MemoryStoreError> {
        let removed = self
            .software
            .remove(id)
            .ok_or_else(|| MemoryStoreError::SoftwareNotFound(id.clone()))?;

        let rules_before = self.rules.len();
        self.rules.retain(|_, rule| &rule.software != id);
        let assignments_before = self.assignments.len();
        self.assignments.retain(|_, software| software != id);

        let summary = CascadeSummary {
            rules_removed: rules_before - self.rules.len(),
            rules_rescoped: 0,
            assignments_removed: assignments_before - self.assignments.len(),
        };
        debug!(software = %id, ?summary, "deleted software version");
        self.bump();
        Ok((removed, summary))
    }

    /// Cascade for a deleted device: drop its assignment and remove it from
    /// every rule scope.
    pub fn delete_device(&mut self, id: &DeviceId) -> CascadeSummary {
        let assignment = self.assignments.remove(&AssetRef::device(id));
        let mut rescoped = 0;
        for rule in self.rules.values_mut() {
            if rule.scope.devices.remove(id) {
                rescoped += 1;
            }
        }
        self.finish_cascade("device", id.as_str(), assignment.is_some(), rescoped)
    }

    /// Cascade for a deleted inventory item: drop its assignment.
    ///
    /// Rules target parts, not items, so rule scopes are untouched.
    pub fn delete_inventory_item(&mut self, id: &InventoryItemId) -> CascadeSummary {
        let assignment = self.assignments.remove(&AssetRef::inventory_item(id));
        self.finish_cascade("inventory_item", id.as_str(), assignment.is_some(), 0)
    }

    /// Cascade for a deleted device type: remove it from every rule scope.
    pub fn delete_device_type(&mut self, id: &DeviceTypeId) -> CascadeSummary {
        let mut rescoped = 0;
        for rule in self.rules.values_mut() {
            if rule.scope.device_types.remove(id) {
                rescoped += 1;
            }
        }
        self.finish_cascade("device_type", id.as_str(), false, rescoped)
    }

    fn finish_cascade(
        &mut self,
        kind: &str,
        id: &str,
        assignment_removed: bool,
        rules_rescoped: usize,
    ) -> CascadeSummary {
        let summary = CascadeSummary {
            rules_removed: 0,
            rules_rescoped,
            assignments_removed: usize::from(assignment_removed),
        };
        if summary != CascadeSummary::default() {
            debug!(kind, id, ?summary, "cascaded asset delete");
            self.bump();
        }
        summary
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    fn select(&self, pred: impl Fn(&ValidatedSoftwareRecord) -> bool) -> Vec<ValidatedSoftware> {
        let today = self.evaluation_date();
        self.rules
            .values()
            .filter(|&rule| pred(rule))
            .map(|rule| rule.materialize(today))
            .collect()
    }
}

impl RuleStore for MemoryStore {
    fn rules_for_device(&self, device: &DeviceId) -> Result<Vec<ValidatedSoftware>, LookupError> {
        Ok(self.select(|rule| rule.scope.targets_device(device)))
    }

    fn rules_for_device_type_and_role(
        &self,
        device_type: &DeviceTypeId,
        role: &RoleId,
    ) -> Result<Vec<ValidatedSoftware>, LookupError> {
        Ok(self.select(|rule| rule.scope.targets_type_and_role(device_type, role)))
    }

    fn rules_for_device_type(
        &self,
        device_type: &DeviceTypeId,
    ) -> Result<Vec<ValidatedSoftware>, LookupError> {
        Ok(self.select(|rule| rule.scope.targets_device_type(device_type)))
    }

    fn rules_for_inventory_item(
        &self,
        part: &PartId,
    ) -> Result<Vec<ValidatedSoftware>, LookupError> {
        Ok(self.select(|rule| rule.scope.targets_part(part)))
    }
}

impl AssignmentLookup for MemoryStore {
    fn assigned_software(&self, asset: &AssetRef) -> Result<Option<SoftwareId>, LookupError> {
        Ok(self.assignments.get(asset).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use softlcm_kernel::{Asset, Device, InventoryItem, Resolver, ResolverConfig};
    use std::cell::Cell;

    thread_local! {
        static TODAY: Cell<NaiveDate> = const { Cell::new(NaiveDate::MIN) };
    }

    fn test_clock() -> NaiveDate {
        TODAY.with(Cell::get)
    }

    fn set_today(date: NaiveDate) {
        TODAY.with(|today| today.set(date));
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn record(id: &str, software: &str) -> ValidatedSoftwareRecord {
        ValidatedSoftwareRecord::new(id, software, date(2024, 1, 1))
    }

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new(date(2024, 6, 1));
        store.upsert_software(SoftwareVersion::new("v1.0", "cisco_ios", "1.0"));
        store.upsert_software(SoftwareVersion::new("v2.0", "cisco_ios", "2.0"));

        let mut explicit = record("vs-explicit", "v1.0");
        explicit.scope.devices.insert(DeviceId::new("D1"));
        store.upsert_rule(explicit).expect("software exists");

        let mut role = record("vs-role", "v2.0");
        role.preferred = true;
        role.scope.device_types.insert(DeviceTypeId::new("C1"));
        role.scope.roles.insert(RoleId::new("R1"));
        store.upsert_rule(role).expect("software exists");

        store
            .assign(AssetRef::new(AssetKind::Device, "D1"), SoftwareId::new("v1.0"))
            .expect("assignable");
        store
    }

    fn d1() -> Asset {
        Asset::from(Device::new("D1").with_type("C1").with_role("R1"))
    }

    #[test]
    fn resolves_through_the_kernel() {
        let store = seeded();
        let resolver = Resolver::new(&store, &store);

        let validated = resolver
            .resolve_validated(&d1())
            .expect("resolve should succeed")
            .expect("validated set must not be empty");
        assert_eq!(validated.len(), 2);
        assert!(resolver.check_compliance(&d1()).expect("check"));
    }

    #[test]
    fn rule_requires_existing_software() {
        let mut store = seeded();
        let err = store
            .upsert_rule(record("vs-x", "v-missing"))
            .expect_err("missing software must error");
        assert!(matches!(err, MemoryStoreError::SoftwareNotFound(id) if id.as_str() == "v-missing"));
    }

    #[test]
    fn device_types_cannot_carry_software() {
        let mut store = seeded();
        let err = store
            .assign(
                AssetRef::new(AssetKind::DeviceType, "C1"),
                SoftwareId::new("v1.0"),
            )
            .expect_err("device type assignment must error");
        assert!(matches!(
            err,
            MemoryStoreError::UnassignableKind(AssetKind::DeviceType)
        ));
    }

    #[test]
    fn validity_follows_as_of_date() {
        let mut store = seeded();
        let mut expiring = record("vs-expiring", "v2.0");
        expiring.end = Some(date(2024, 12, 31));
        expiring.scope.inventory_items.insert(PartId::new("P1"));
        store.upsert_rule(expiring).expect("software exists");

        let item = Asset::from(InventoryItem::new("inv-1").with_part("P1"));
        let config = ResolverConfig {
            valid_only: true,
            ..ResolverConfig::default()
        };

        {
            let resolver = Resolver::new(&store, &store).with_config(config);
            assert!(resolver.resolve_validated(&item).expect("resolve").is_some());
        }

        store.set_as_of(Some(date(2025, 1, 1)));
        let resolver = Resolver::new(&store, &store).with_config(config);
        assert!(resolver.resolve_validated(&item).expect("resolve").is_none());
    }

    #[test]
    fn deleting_software_cascades_to_rules_and_assignments() {
        let mut store = seeded();
        let before = store.revision();

        let (removed, summary) = store
            .delete_software(&SoftwareId::new("v1.0"))
            .expect("software exists");
        assert_eq!(removed.version, "1.0");
        assert_eq!(
            summary,
            CascadeSummary {
                rules_removed: 1,
                rules_rescoped: 0,
                assignments_removed: 1,
            }
        );
        assert!(store.rule(&RuleId::new("vs-explicit")).is_none());
        assert!(store.revision() > before);

        let resolver = Resolver::new(&store, &store);
        assert!(!resolver.check_compliance(&d1()).expect("check"));
    }

    #[test]
    fn deleting_device_rescopes_rules_and_drops_assignment() {
        let mut store = seeded();

        let summary = store.delete_device(&DeviceId::new("D1"));
        assert_eq!(summary.rules_rescoped, 1);
        assert_eq!(summary.assignments_removed, 1);

        let explicit = store
            .rule(&RuleId::new("vs-explicit"))
            .expect("rule is retained with an empty scope");
        assert!(explicit.scope.is_empty());
        assert_eq!(store.assignments().count(), 0);
    }

    #[test]
    fn deleting_unknown_asset_is_a_no_op() {
        let mut store = seeded();
        let before = store.revision();

        let summary = store.delete_inventory_item(&InventoryItemId::new("inv-404"));
        assert_eq!(summary, CascadeSummary::default());
        assert_eq!(store.revision(), before);
    }

    #[test]
    fn deleting_device_type_removes_it_from_scopes() {
        let mut store = seeded();

        let summary = store.delete_device_type(&DeviceTypeId::new("C1"));
        assert_eq!(summary.rules_rescoped, 1);

        let role = store.rule(&RuleId::new("vs-role")).expect("rule retained");
        assert!(role.scope.device_types.is_empty());
        assert!(!role.scope.roles.is_empty());
    }

    #[test]
    fn queries_return_rules_in_id_order() {
        let mut store = seeded();
        let mut extra = record("vs-a-first", "v2.0");
        extra.scope.devices.insert(DeviceId::new("D1"));
        store.upsert_rule(extra).expect("software exists");

        let ids: Vec<String> = store
            .rules_for_device(&DeviceId::new("D1"))
            .expect("query")
            .into_iter()
            .map(|rule| rule.id.to_string())
            .collect();
        assert_eq!(ids, vec!["vs-a-first", "vs-explicit"]);
    }

    #[test]
    fn tracking_store_rereads_the_clock_per_query() {
        set_today(date(2024, 12, 31));
        let mut store = MemoryStore::tracking_today().with_clock(test_clock);
        store.upsert_software(SoftwareVersion::new("v1.0", "cisco_ios", "1.0"));
        let mut expiring = record("vs-expiring", "v1.0");
        expiring.end = Some(date(2024, 12, 31));
        expiring.scope.devices.insert(DeviceId::new("D1"));
        store.upsert_rule(expiring).expect("software exists");
        store
            .assign(AssetRef::new(AssetKind::Device, "D1"), SoftwareId::new("v1.0"))
            .expect("assignable");

        let config = ResolverConfig {
            valid_only: true,
            ..ResolverConfig::default()
        };
        let resolver = Resolver::new(&store, &store).with_config(config);
        let revision = store.revision();
        let before = store.stamp();
        assert!(resolver.check_compliance(&d1()).expect("check"));

        set_today(date(2025, 1, 1));
        assert!(!resolver.check_compliance(&d1()).expect("check"));
        assert_eq!(store.revision(), revision);
        assert_eq!(store.as_of(), None);
        assert_ne!(store.stamp(), before);
        assert_eq!(store.stamp().evaluated_on, date(2025, 1, 1));
    }

    #[test]
    fn pinning_and_unpinning_as_of_bumps_revision() {
        set_today(date(2030, 1, 1));
        let mut store = MemoryStore::new(date(2024, 6, 1)).with_clock(test_clock);
        assert_eq!(store.evaluation_date(), date(2024, 6, 1));

        store.set_as_of(Some(date(2024, 6, 1)));
        assert_eq!(store.revision(), 0);

        store.set_as_of(None);
        assert_eq!(store.revision(), 1);
        assert_eq!(store.evaluation_date(), date(2030, 1, 1));
    }

    #[test]
    fn clone_gets_its_own_identity() {
        let store = seeded();
        let copy = store.clone();

        assert_ne!(store.id(), copy.id());
        assert_eq!(store.revision(), copy.revision());
        assert_ne!(store.stamp(), copy.stamp());
        assert_eq!(store.rules().count(), copy.rules().count());
    }

    #[test]
    fn deleting_rule_bumps_revision_once() {
        let mut store = seeded();
        let before = store.revision();

        let removed = store
            .delete_rule(&RuleId::new("vs-role"))
            .expect("rule exists");
        assert_eq!(removed.software.as_str(), "v2.0");
        assert_eq!(store.revision(), before + 1);

        let err = store
            .delete_rule(&RuleId::new("vs-role"))
            .expect_err("second delete must error");
        assert!(matches!(err, MemoryStoreError::RuleNotFound(id) if id.0 == "vs-role"));
        assert_eq!(store.revision(), before + 1);
    }

    #[test]
    fn unassign_bumps_revision_only_when_something_was_assigned() {
        let mut store = seeded();
        let assigned = AssetRef::new(AssetKind::Device, "D1");
        let before = store.revision();

        assert_eq!(store.unassign(&assigned), Some(SoftwareId::new("v1.0")));
        assert_eq!(store.revision(), before + 1);
        assert!(store.assigned_version(&assigned).is_none());

        assert_eq!(store.unassign(&assigned), None);
        assert_eq!(store.revision(), before + 1);

        let resolver = Resolver::new(&store, &store);
        assert!(!resolver.check_compliance(&d1()).expect("check"));
    }

    #[test]
    fn end_of_support_assignments_follow_evaluation_date() {
        let mut store = seeded();
        let mut eol = SoftwareVersion::new("v0.9", "cisco_ios", "0.9");
        eol.end_of_support = Some(date(2024, 3, 31));
        store.upsert_software(eol);
        let item = AssetRef::new(AssetKind::InventoryItem, "inv-1");
        store
            .assign(item.clone(), SoftwareId::new("v0.9"))
            .expect("assignable");

        let label = store
            .assigned_version(&item)
            .map(SoftwareVersion::label)
            .expect("assigned");
        assert_eq!(label, "cisco_ios - 0.9");

        let flagged: Vec<&AssetRef> = store
            .end_of_support_assignments()
            .into_iter()
            .map(|(asset, _)| asset)
            .collect();
        assert_eq!(flagged, vec![&item]);

        store.set_as_of(Some(date(2024, 3, 1)));
        assert!(store.end_of_support_assignments().is_empty());
    }
}
