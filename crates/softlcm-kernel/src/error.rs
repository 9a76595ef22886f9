//! Error types for softlcm resolution.
//!
//! Absent data is never an error here: a missing assignment, an unset role
//! or an empty tier all resolve to empty/false results. Errors are reserved
//! for collaborator failures and bad configuration.

use crate::asset::{AssetRef, DeviceId, DeviceTypeId, PartId, RoleId};
use std::fmt;

/// A collaborator (rule store or assignment lookup) could not answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The backing store is unreachable or refused the query.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store returned scope or assignment data it cannot interpret.
    #[error("malformed record {record}: {reason}")]
    Malformed { record: String, reason: String },
}

/// Which collaborator query failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Device(DeviceId),
    DeviceTypeAndRole(DeviceTypeId, RoleId),
    DeviceType(DeviceTypeId),
    InventoryItem(PartId),
    Assignment(AssetRef),
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Device(id) => write!(f, "rules for device {id}"),
            Query::DeviceTypeAndRole(device_type, role) => {
                write!(f, "rules for device type {device_type} and role {role}")
            }
            Query::DeviceType(id) => write!(f, "rules for device type {id}"),
            Query::InventoryItem(part) => write!(f, "rules for inventory part {part}"),
            Query::Assignment(asset) => write!(f, "software assigned to {asset}"),
        }
    }
}

/// Errors raised while resolving validated software for an asset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("lookup failed ({query}): {source}")]
    Lookup {
        query: Query,
        #[source]
        source: LookupError,
    },
}

impl ResolveError {
    pub fn lookup(query: Query, source: LookupError) -> Self {
        ResolveError::Lookup { query, source }
    }
}

/// Errors raised while loading resolver configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{path}: I/O error: {message}")]
    Io { path: String, message: String },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
