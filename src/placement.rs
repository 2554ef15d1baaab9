// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The placement decision: the single entry point a `CreateVolume` handler
//! calls to learn where a new share should go.
//!
//! Control flow for one `CreateVolume`: build a target descriptor, snapshot
//! running ops, list candidate instances, classify them, and decide. This
//! module is the only place in the crate that talks to
//! [`crate::filer::FilerService`] directly; every other module is pure and
//! synchronous so it can be tested against literal fixtures.

use crate::capacity::{self, ExpansionPlan};
use crate::config::FeatureFlags;
use crate::eligibility;
use crate::errors::ControllerError;
use crate::filer::{check_canceled, FilerService};
use crate::model::{CreateVolumeRequest, MultishareInstance, Share};
use crate::{matcher, ops};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// The outcome of a single placement decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlacementDecision {
    /// Place the new share on `instance` as-is; it already has enough free
    /// capacity.
    PlaceOn(MultishareInstance),
    /// Expand `instance` to `target_bytes` first, then place the new share.
    /// The caller issues `InstanceUpdate` then `ShareCreate` once the
    /// update completes.
    ExpandThenPlace {
        /// The instance to expand.
        instance: MultishareInstance,
        /// The capacity to expand `instance` to, in bytes.
        target_bytes: u64,
    },
    /// No ready or non-ready matched instance exists; create a new one.
    CreateInstance,
    /// At least one matched instance is non-ready; retry later. Never
    /// returned alongside a create-instance decision — this is the safety
    /// property that keeps the core correct against a backend with no
    /// transactions.
    Wait,
}

/// Pick the best-fit ready instance: smallest resident `used` bytes,
/// breaking ties lexicographically by name for determinism.
fn pick_best_fit<'a>(
    ready: &'a [MultishareInstance],
    used_by_path: &HashMap<String, u64>,
) -> Option<&'a MultishareInstance> {
    ready.iter().min_by(|a, b| {
        let used_a = used_by_path.get(&a.resource_path()).copied().unwrap_or(0);
        let used_b = used_by_path.get(&b.resource_path()).copied().unwrap_or(0);
        used_a.cmp(&used_b).then_with(|| a.name.cmp(&b.name))
    })
}

/// Decide where a new share described by `request` should go.
///
/// Builds the target descriptor from `request`'s parameter map first (see
/// [`crate::model::TargetDescriptor::from_request`]), then snapshots
/// running operations, lists candidate instances, classifies them, and
/// plans capacity.
///
/// # Errors
///
/// Returns [`ControllerError::Canceled`] if `token` fires before or during
/// the decision, any error a [`FilerService`] call surfaces,
/// [`ControllerError::InvalidArgument`] if `request`'s parameter map is
/// missing the required storage-class fingerprint or a region, or
/// [`ControllerError::InvalidInstance`] from the matcher or eligibility
/// engine.
pub async fn decide(
    filer: &dyn FilerService,
    request: &CreateVolumeRequest,
    flags: &FeatureFlags,
    token: &CancellationToken,
) -> Result<PlacementDecision, ControllerError> {
    check_canceled(token)?;

    let target = crate::model::TargetDescriptor::from_request(request)?;

    let raw_ops = filer.list_operations(token).await?;
    let running_ops = ops::list_running(&raw_ops);
    debug!(count = running_ops.len(), "snapshotted running operations");

    check_canceled(token)?;
    let all_instances = filer.list_instances(&request.regions, token).await?;
    let matched = matcher::list_matched_instances(&all_instances, &target)?;
    debug!(
        fingerprint = %target.sc_fingerprint,
        matched = matched.len(),
        "matched candidate instances"
    );

    check_canceled(token)?;
    let mut share_counts: HashMap<String, u32> = HashMap::new();
    let mut used_by_path: HashMap<String, u64> = HashMap::new();
    let mut shares_by_path: HashMap<String, Vec<Share>> = HashMap::new();
    for instance in &matched {
        let shares = filer.list_shares(instance, token).await?;
        let path = instance.resource_path();
        share_counts.insert(path.clone(), u32::try_from(shares.len()).unwrap_or(u32::MAX));
        used_by_path.insert(path.clone(), capacity::used_bytes(&shares));
        shares_by_path.insert(path, shares);
    }

    let (ready, non_ready_count) =
        eligibility::classify_instances(&matched, &running_ops, &share_counts, flags)?;

    if non_ready_count > 0 {
        info!(
            fingerprint = %target.sc_fingerprint,
            non_ready_count,
            ready = ready.len(),
            "matched instances non-ready, waiting"
        );
        return Ok(PlacementDecision::Wait);
    }

    let Some(best) = pick_best_fit(&ready, &used_by_path) else {
        info!(fingerprint = %target.sc_fingerprint, "no matched instances, creating new one");
        return Ok(PlacementDecision::CreateInstance);
    };

    let used = used_by_path.get(&best.resource_path()).copied().unwrap_or(0);
    let ExpansionPlan {
        needs_expand,
        target_bytes,
    } = capacity::instance_needs_expand(best, used, request.requested_bytes);

    if needs_expand {
        info!(
            instance = %best.resource_path(),
            target_bytes,
            "instance needs expansion before placement"
        );
        Ok(PlacementDecision::ExpandThenPlace {
            instance: best.clone(),
            target_bytes,
        })
    } else {
        info!(instance = %best.resource_path(), "placing share on existing instance");
        Ok(PlacementDecision::PlaceOn(best.clone()))
    }
}

#[cfg(test)]
#[path = "placement_tests.rs"]
mod placement_tests;
