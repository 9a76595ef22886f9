//! Collaborator contracts consumed by the resolver.
//!
//! The kernel owns no records. Rules and assignments live in whatever
//! backend implements these traits; `softlcm-store` provides the
//! in-memory reference implementation.

use crate::asset::{AssetRef, DeviceId, DeviceTypeId, PartId, RoleId};
use crate::error::LookupError;
use crate::rule::{SoftwareId, ValidatedSoftware};

/// Scope queries over validated-software rules.
///
/// Each query returns every rule whose scope axis contains the given
/// reference. Duplicates in a result are tolerated; the matcher
/// deduplicates by rule id.
pub trait RuleStore: Send + Sync {
    /// Rules whose `devices` contain `device`.
    fn rules_for_device(&self, device: &DeviceId) -> Result<Vec<ValidatedSoftware>, LookupError>;

    /// Rules whose `device_types` contain `device_type` and whose `roles`
    /// contain `role`.
    fn rules_for_device_type_and_role(
        &self,
        device_type: &DeviceTypeId,
        role: &RoleId,
    ) -> Result<Vec<ValidatedSoftware>, LookupError>;

    /// Rules whose `device_types` contain `device_type`, with or without
    /// roles.
    fn rules_for_device_type(
        &self,
        device_type: &DeviceTypeId,
    ) -> Result<Vec<ValidatedSoftware>, LookupError>;

    /// Rules whose `inventory_items` contain `part`.
    fn rules_for_inventory_item(
        &self,
        part: &PartId,
    ) -> Result<Vec<ValidatedSoftware>, LookupError>;
}

/// Typed `(asset kind, asset id) -> software` lookup.
pub trait AssignmentLookup: Send + Sync {
    /// The software version currently assigned to `asset`, if any.
    fn assigned_software(&self, asset: &AssetRef) -> Result<Option<SoftwareId>, LookupError>;
}

impl<T: RuleStore + ?Sized> RuleStore for &T {
    fn rules_for_device(&self, device: &DeviceId) -> Result<Vec<ValidatedSoftware>, LookupError> {
        (**self).rules_for_device(device)
    }

    fn rules_for_device_type_and_role(
        &self,
        device_type: &DeviceTypeId,
        role: &RoleId,
    ) -> Result<Vec<ValidatedSoftware>, LookupError> {
        (**self).rules_for_device_type_and_role(device_type, role)
    }

    fn rules_for_device_type(
        &self,
        device_type: &DeviceTypeId,
    ) -> Result<Vec<ValidatedSoftware>, LookupError> {
        (**self).rules_for_device_type(device_type)
    }

    fn rules_for_inventory_item(
        &self,
        part: &PartId,
    ) -> Result<Vec<ValidatedSoftware>, LookupError> {
        (**self).rules_for_inventory_item(part)
    }
}

impl<T: AssignmentLookup + ?Sized> AssignmentLookup for &T {
    fn assigned_software(&self, asset: &AssetRef) -> Result<Option<SoftwareId>, LookupError> {
        (**self).assigned_software(asset)
    }
}
