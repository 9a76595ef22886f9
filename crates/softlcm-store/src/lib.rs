//! # softlcm-store
//!
//! Memory layer for software, validated-software rules and assignments.
//!
//! This crate provides:
//! - `SoftwareVersion` and `ValidatedSoftwareRecord` (the stored records)
//! - `MemoryStore`, implementing the kernel's `RuleStore` and
//!   `AssignmentLookup` collaborators
//! - `StoreStamp`, the instance/revision/date triple caches key on
//! - explicit cascade deletes for software, devices, device types and
//!   inventory items
//!
//! ## Data model
//!
//! ```text
//! ValidatedSoftwareRecord (start..=end window)
//!     │  materialize(evaluation date)
//!     ▼
//! ValidatedSoftware (valid flag) ──► softlcm-kernel Resolver
//! ```

pub mod memory;
pub mod record;
pub mod software;

pub use memory::{CascadeSummary, MemoryStore, MemoryStoreError, StoreId, StoreStamp};
pub use record::ValidatedSoftwareRecord;
pub use software::SoftwareVersion;
