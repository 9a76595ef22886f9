//! Validated-software rules and their scopes.

use crate::asset::{DeviceId, DeviceTypeId, PartId, RoleId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a validated-software rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a software version.
///
/// Compliance compares software by this identity, never by rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoftwareId(pub String);

impl SoftwareId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SoftwareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SoftwareId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Targeting criteria of a rule.
///
/// Every axis is a set; a rule matches an asset through any axis that
/// contains the asset's reference. `roles` narrows `device_types`: a rule
/// with types and no roles is type-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleScope {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub devices: BTreeSet<DeviceId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub device_types: BTreeSet<DeviceTypeId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub roles: BTreeSet<RoleId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub inventory_items: BTreeSet<PartId>,
}

impl RuleScope {
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
            && self.device_types.is_empty()
            && self.roles.is_empty()
            && self.inventory_items.is_empty()
    }

    pub fn targets_device(&self, id: &DeviceId) -> bool {
        self.devices.contains(id)
    }

    pub fn targets_device_type(&self, id: &DeviceTypeId) -> bool {
        self.device_types.contains(id)
    }

    pub fn targets_type_and_role(&self, device_type: &DeviceTypeId, role: &RoleId) -> bool {
        self.device_types.contains(device_type) && self.roles.contains(role)
    }

    /// Type-only scope: targets the type and names no role.
    pub fn targets_type_only(&self, device_type: &DeviceTypeId) -> bool {
        self.device_types.contains(device_type) && self.roles.is_empty()
    }

    pub fn targets_part(&self, part: &PartId) -> bool {
        self.inventory_items.contains(part)
    }
}

/// A rule asserting that a software version is validated for a scope.
///
/// `valid` and `preferred` are independent: a preferred rule may be out of
/// its validity window and a valid rule need not be preferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedSoftware {
    pub id: RuleId,
    pub software: SoftwareId,
    #[serde(default)]
    pub preferred: bool,
    #[serde(default = "default_valid")]
    pub valid: bool,
    #[serde(default)]
    pub scope: RuleScope,
}

fn default_valid() -> bool {
    true
}

impl ValidatedSoftware {
    pub fn new(id: impl Into<String>, software: impl Into<String>) -> Self {
        Self {
            id: RuleId::new(id),
            software: SoftwareId::new(software),
            preferred: false,
            valid: true,
            scope: RuleScope::default(),
        }
    }

    pub fn preferred(mut self, preferred: bool) -> Self {
        self.preferred = preferred;
        self
    }

    pub fn valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    pub fn for_device(mut self, id: impl Into<DeviceId>) -> Self {
        self.scope.devices.insert(id.into());
        self
    }

    pub fn for_device_type(mut self, id: impl Into<DeviceTypeId>) -> Self {
        self.scope.device_types.insert(id.into());
        self
    }

    pub fn for_role(mut self, id: impl Into<RoleId>) -> Self {
        self.scope.roles.insert(id.into());
        self
    }

    pub fn for_part(mut self, id: impl Into<PartId>) -> Self {
        self.scope.inventory_items.insert(id.into());
        self
    }
}
