//! The resolver: scope matching, aggregation, preference and compliance
//! wired to the two collaborators.
//!
//! Every call recomputes from the collaborators; the resolver itself holds
//! only borrowed collaborators and a copy of its configuration.

use crate::aggregate::{ValidatedSet, aggregate};
use crate::asset::{Asset, AssetRef};
use crate::compliance::{ComplianceMode, is_compliant};
use crate::config::ResolverConfig;
use crate::error::{Query, ResolveError};
use crate::preferred::{preferred, repeated_software};
use crate::rule::{SoftwareId, ValidatedSoftware};
use crate::scope::{Tiers, match_scope};
use crate::store::{AssignmentLookup, RuleStore};
use serde::Serialize;
use tracing::{debug, warn};

/// Everything a presentation layer shows for one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftwareReport {
    pub asset: AssetRef,
    pub assigned: Option<SoftwareId>,
    /// Validated rules in rule-id order; empty when none matched.
    pub validated: Vec<ValidatedSoftware>,
    /// Preferred rules in specificity order.
    pub preferred: Vec<ValidatedSoftware>,
    /// Software versions preferred by more than one rule.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub repeated_preferred: Vec<SoftwareId>,
    pub compliance: ComplianceMode,
    pub compliant: bool,
}

/// Resolves validated software for assets.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    rules: &'a dyn RuleStore,
    assignments: &'a dyn AssignmentLookup,
    config: ResolverConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(rules: &'a dyn RuleStore, assignments: &'a dyn AssignmentLookup) -> Self {
        Self {
            rules,
            assignments,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> ResolverConfig {
        self.config
    }

    /// Ordered, rule-disjoint tiers for `asset`.
    pub fn tiers(&self, asset: &Asset) -> Result<Tiers, ResolveError> {
        let asset_ref = asset.asset_ref();
        let tiers = match_scope(self.rules, asset).inspect_err(|e| {
            warn!(asset = %asset_ref, error = %e, "scope match failed");
        })?;
        for tier in &tiers {
            debug!(
                asset = %asset_ref,
                specificity = ?tier.specificity,
                rules = tier.len(),
                "matched tier"
            );
        }
        Ok(tiers)
    }

    /// Deduplicated validated rules, `None` when nothing (valid) matched.
    pub fn resolve_validated(&self, asset: &Asset) -> Result<Option<ValidatedSet>, ResolveError> {
        let tiers = self.tiers(asset)?;
        Ok(aggregate(&tiers, self.config.valid_only))
    }

    /// Preferred rules, most specific tier first.
    pub fn resolve_preferred(&self, asset: &Asset) -> Result<Vec<ValidatedSoftware>, ResolveError> {
        let tiers = self.tiers(asset)?;
        Ok(self.preferred_from(asset, &tiers))
    }

    /// Software currently assigned to `asset`.
    pub fn assigned_software(&self, asset: &Asset) -> Result<Option<SoftwareId>, ResolveError> {
        let asset_ref = asset.asset_ref();
        self.assignments
            .assigned_software(&asset_ref)
            .map_err(|e| {
                warn!(asset = %asset_ref, error = %e, "assignment lookup failed");
                ResolveError::lookup(Query::Assignment(asset_ref.clone()), e)
            })
    }

    /// Whether the assigned software is among the validated versions.
    pub fn check_compliance(&self, asset: &Asset) -> Result<bool, ResolveError> {
        self.check(asset, false)
    }

    /// Whether the assigned software is among the preferred validated
    /// versions.
    pub fn check_preferred_compliance(&self, asset: &Asset) -> Result<bool, ResolveError> {
        self.check(asset, true)
    }

    /// Full report for `asset`, computed from a single scope match.
    pub fn report(&self, asset: &Asset) -> Result<SoftwareReport, ResolveError> {
        let assigned = self.assigned_software(asset)?;
        let tiers = self.tiers(asset)?;
        let validated = aggregate(&tiers, self.config.valid_only)
            .map(ValidatedSet::into_rules)
            .unwrap_or_default();
        let preferred = self.preferred_from(asset, &tiers);
        let compliance = self.config.compliance;
        let compliant = is_compliant(assigned.as_ref(), &validated, compliance.preferred_only());

        Ok(SoftwareReport {
            asset: asset.asset_ref(),
            assigned,
            validated,
            repeated_preferred: repeated_software(&preferred),
            preferred,
            compliance,
            compliant,
        })
    }

    fn check(&self, asset: &Asset, preferred_only: bool) -> Result<bool, ResolveError> {
        let Some(assigned) = self.assigned_software(asset)? else {
            return Ok(false);
        };
        let Some(validated) = self.resolve_validated(asset)? else {
            return Ok(false);
        };
        Ok(is_compliant(Some(&assigned), &validated, preferred_only))
    }

    fn preferred_from(&self, asset: &Asset, tiers: &Tiers) -> Vec<ValidatedSoftware> {
        let list = preferred(tiers, self.config.valid_only);
        let repeated = repeated_software(&list);
        if !repeated.is_empty() {
            debug!(
                asset = %asset.asset_ref(),
                software = ?repeated,
                "software preferred by more than one rule"
            );
        }
        list
    }
}
