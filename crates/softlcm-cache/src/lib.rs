//! Resolution cache for software reports.
//!
//! The kernel recomputes every answer from the store. This crate memoizes
//! `SoftwareReport`s per asset instead, stamped with the store's
//! `StoreStamp` (instance, revision, evaluation date) and the resolver
//! config they were computed under. A stamp mismatch is a miss, so a
//! mutation anywhere in the store, a different store, or a new day all
//! invalidate every entry lazily.
//!
//! It does not own canonical state (that's `softlcm-store`) and does not
//! change resolution semantics (that's `softlcm-kernel`).

use softlcm_kernel::{
    Asset, AssetRef, CacheConfig, ResolveError, Resolver, ResolverConfig, SoftwareReport,
};
use softlcm_store::{MemoryStore, StoreStamp};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct CachedReport {
    stamp: StoreStamp,
    asset: Asset,
    resolver: ResolverConfig,
    report: SoftwareReport,
}

/// Hit/miss counters since construction or the last `clear`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Bounded report cache keyed by asset reference.
#[derive(Debug, Clone)]
pub struct ResolutionCache {
    config: CacheConfig,
    entries: BTreeMap<AssetRef, CachedReport>,
    insertion: VecDeque<AssetRef>,
    stats: CacheStats,
}

impl ResolutionCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: BTreeMap::new(),
            insertion: VecDeque::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Report for `asset`, served from cache when the stamp still matches.
    ///
    /// With caching disabled this is `Resolver::report` with no
    /// bookkeeping.
    pub fn report(
        &mut self,
        store: &MemoryStore,
        resolver: ResolverConfig,
        asset: &Asset,
    ) -> Result<SoftwareReport, ResolveError> {
        let compute = Resolver::new(store, store).with_config(resolver);
        if !self.config.enabled {
            return compute.report(asset);
        }

        let key = asset.asset_ref();
        let stamp = store.stamp();
        if let Some(entry) = self.entries.get(&key)
            && entry.stamp == stamp
            && entry.resolver == resolver
            && &entry.asset == asset
        {
            self.stats.hits += 1;
            trace!(asset = %key, revision = stamp.revision, "report cache hit");
            return Ok(entry.report.clone());
        }

        self.stats.misses += 1;
        let report = compute.report(asset)?;
        self.insert(
            key,
            CachedReport {
                stamp,
                asset: asset.clone(),
                resolver,
                report: report.clone(),
            },
        );
        Ok(report)
    }

    /// Drop the entry for `asset`. Returns whether one was present.
    pub fn invalidate(&mut self, asset: &AssetRef) -> bool {
        let removed = self.entries.remove(asset).is_some();
        if removed {
            self.insertion.retain(|key| key != asset);
            debug!(asset = %asset, "report cache entry invalidated");
        }
        removed
    }

    /// Drop entries whose stamp no longer matches `store`.
    pub fn prune_stale(&mut self, store: &MemoryStore) -> usize {
        let stamp = store.stamp();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.stamp == stamp);
        let entries = &self.entries;
        self.insertion.retain(|key| entries.contains_key(key));
        let pruned = before - self.entries.len();
        if pruned > 0 {
            debug!(
                pruned,
                store = %stamp.store,
                revision = stamp.revision,
                "pruned stale report cache entries"
            );
        }
        pruned
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion.clear();
        self.stats = CacheStats::default();
    }

    fn insert(&mut self, key: AssetRef, entry: CachedReport) {
        if self.config.max_entries == 0 {
            return;
        }
        if self.entries.insert(key.clone(), entry).is_some() {
            self.insertion.retain(|existing| existing != &key);
        }
        self.insertion.push_back(key);

        while self.entries.len() > self.config.max_entries {
            let Some(oldest) = self.insertion.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
            trace!(asset = %oldest, "report cache eviction");
        }
    }
}
