//! # softlcm kernel
//!
//! Resolves, for a network asset, which software versions are validated
//! for it, which of those are preferred, and whether the software assigned
//! to it is compliant.
//!
//! The kernel is storage-agnostic: rules and assignments are read through
//! the [`RuleStore`] and [`AssignmentLookup`] traits and nothing is cached
//! between calls.
//!
//! ## Pipeline
//!
//! ```text
//! Asset
//!   │  match_scope          per-kind dispatch, most specific tier first
//!   ▼
//! Tiers                     rule-disjoint: narrower matches subtracted
//!   ├── aggregate  ──► Option<ValidatedSet>   deduplicated union
//!   └── preferred  ──► Vec<ValidatedSoftware> tier order, no version dedup
//!                         │
//!                         ▼
//!                   is_compliant(assigned software)
//! ```

pub mod aggregate;
pub mod asset;
pub mod compliance;
pub mod config;
pub mod error;
pub mod preferred;
pub mod resolve;
pub mod rule;
pub mod scope;
pub mod store;

pub use aggregate::{ValidatedSet, aggregate};
pub use asset::{
    Asset, AssetKind, AssetRef, Device, DeviceId, DeviceType, DeviceTypeId, InventoryItem,
    InventoryItemId, PartId, RoleId,
};
pub use compliance::{ComplianceMode, is_compliant};
pub use config::{CacheConfig, Config, DEFAULT_CACHE_MAX_ENTRIES, ResolverConfig};
pub use error::{ConfigError, LookupError, Query, ResolveError};
pub use preferred::{preferred, repeated_software};
pub use resolve::{Resolver, SoftwareReport};
pub use rule::{RuleId, RuleScope, SoftwareId, ValidatedSoftware};
pub use scope::{Specificity, Tier, Tiers, match_scope};
pub use store::{AssignmentLookup, RuleStore};
