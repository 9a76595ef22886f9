//! Assets: the things software is validated for.
//!
//! An asset is one of three kinds. Each kind carries the hierarchy
//! references its scope matcher needs, and nothing else:
//!
//! ```text
//! Device         id, device_type_id?, role_id?
//! DeviceType     id
//! InventoryItem  id, part_id?
//! ```
//!
//! Unset references are legal and simply match nothing.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a device.
    DeviceId
);
string_id!(
    /// Identifier of a device type (the device class).
    DeviceTypeId
);
string_id!(
    /// Identifier of a device role.
    RoleId
);
string_id!(
    /// Identifier of an inventory item record.
    InventoryItemId
);
string_id!(
    /// Manufacturer part identifier of an inventory item.
    ///
    /// Rules target inventory items by part, not by record id.
    PartId
);

/// A device with its type and role references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type_id: Option<DeviceTypeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,
}

impl Device {
    pub fn new(id: impl Into<DeviceId>) -> Self {
        Self {
            id: id.into(),
            device_type_id: None,
            role_id: None,
        }
    }

    pub fn with_type(mut self, device_type_id: impl Into<DeviceTypeId>) -> Self {
        self.device_type_id = Some(device_type_id.into());
        self
    }

    pub fn with_role(mut self, role_id: impl Into<RoleId>) -> Self {
        self.role_id = Some(role_id.into());
        self
    }
}

/// A device type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceType {
    pub id: DeviceTypeId,
}

impl DeviceType {
    pub fn new(id: impl Into<DeviceTypeId>) -> Self {
        Self { id: id.into() }
    }
}

/// An inventory item (module, line card, transceiver, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<PartId>,
}

impl InventoryItem {
    pub fn new(id: impl Into<InventoryItemId>) -> Self {
        Self {
            id: id.into(),
            part_id: None,
        }
    }

    pub fn with_part(mut self, part_id: impl Into<PartId>) -> Self {
        self.part_id = Some(part_id.into());
        self
    }
}

/// Asset kind discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Device,
    DeviceType,
    InventoryItem,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Device => "device",
            AssetKind::DeviceType => "device_type",
            AssetKind::InventoryItem => "inventory_item",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed reference to an asset: `(kind, id)`.
///
/// This is the key of the software-assignment lookup.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    pub kind: AssetKind,
    pub id: String,
}

impl AssetRef {
    pub fn new(kind: AssetKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn device(id: &DeviceId) -> Self {
        Self::new(AssetKind::Device, id.as_str())
    }

    pub fn inventory_item(id: &InventoryItemId) -> Self {
        Self::new(AssetKind::InventoryItem, id.as_str())
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// An asset subject to software validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Asset {
    Device(Device),
    DeviceType(DeviceType),
    InventoryItem(InventoryItem),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Device(_) => AssetKind::Device,
            Asset::DeviceType(_) => AssetKind::DeviceType,
            Asset::InventoryItem(_) => AssetKind::InventoryItem,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Asset::Device(device) => device.id.as_str(),
            Asset::DeviceType(device_type) => device_type.id.as_str(),
            Asset::InventoryItem(item) => item.id.as_str(),
        }
    }

    pub fn asset_ref(&self) -> AssetRef {
        AssetRef::new(self.kind(), self.id())
    }
}

impl From<Device> for Asset {
    fn from(device: Device) -> Self {
        Asset::Device(device)
    }
}

impl From<DeviceType> for Asset {
    fn from(device_type: DeviceType) -> Self {
        Asset::DeviceType(device_type)
    }
}

impl From<InventoryItem> for Asset {
    fn from(item: InventoryItem) -> Self {
        Asset::InventoryItem(item)
    }
}
