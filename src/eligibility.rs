// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The eligibility engine: combines the instance matcher and the operation
//! registry to classify each matched candidate as *ready*, *non-ready*, or
//! *ineligible*, enforcing per-instance share-count ceilings along the way.
//!
//! "Non-ready" means wait and retry — a resource is mutating and the
//! outcome is observable later. "Ineligible" means never a candidate for
//! this request. Deleting instances are excluded silently so their
//! teardown does not stall new placements.

use crate::config::FeatureFlags;
use crate::errors::ControllerError;
use crate::metrics;
use crate::model::{InstanceState, MultishareInstance, OpInfo, OpType, TargetDescriptor};
use crate::{matcher, ops};
use std::collections::HashMap;

/// The classification of a single matched instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Classification {
    Ready,
    NonReady,
    Ineligible,
}

fn classify(
    instance: &MultishareInstance,
    ops: &[OpInfo],
    share_count: u32,
    flags: &FeatureFlags,
) -> Result<Classification, ControllerError> {
    let op = ops::contains_op_with_instance_target_prefix(instance, ops)?;

    let classification = match instance.state {
        InstanceState::Ready => match op.map(|o| o.op_type) {
            Some(OpType::InstanceDelete) => Classification::Ineligible,
            Some(_) => Classification::NonReady,
            None => {
                let cap = flags.effective_cap(instance.max_share_count);
                if share_count < cap {
                    Classification::Ready
                } else {
                    Classification::Ineligible
                }
            }
        },
        InstanceState::Creating | InstanceState::Repairing => Classification::NonReady,
        InstanceState::Deleting | InstanceState::Error | InstanceState::Suspended => {
            Classification::Ineligible
        }
    };
    Ok(classification)
}

/// Classify every instance in `matched` against the `ops` snapshot and
/// `share_counts` (keyed by instance resource path), returning the ready
/// instances and a count of non-ready ones.
///
/// Pure and synchronous: `ops` and `share_counts` must already be captured
/// snapshots, never re-queried mid-decision.
///
/// # Errors
///
/// Returns [`ControllerError::InvalidInstance`] if any matched instance's
/// identity is incomplete.
pub fn classify_instances(
    matched: &[MultishareInstance],
    ops: &[OpInfo],
    share_counts: &HashMap<String, u32>,
    flags: &FeatureFlags,
) -> Result<(Vec<MultishareInstance>, usize), ControllerError> {
    let mut ready = Vec::new();
    let mut non_ready_count = 0usize;

    for instance in matched {
        let share_count = share_counts.get(&instance.resource_path()).copied().unwrap_or(0);
        match classify(instance, ops, share_count, flags)? {
            Classification::Ready => {
                metrics::record_eligibility_classification("ready");
                ready.push(instance.clone());
            }
            Classification::NonReady => {
                metrics::record_eligibility_classification("non_ready");
                non_ready_count += 1;
            }
            Classification::Ineligible => {
                metrics::record_eligibility_classification("ineligible");
            }
        }
    }

    Ok((ready, non_ready_count))
}

/// Run the full eligibility check: match candidates against `target`, then
/// classify them against the `ops` snapshot and `share_counts`.
///
/// Returns `Ok((ready, 0))` when nothing is non-ready. When at least one
/// matched instance is non-ready, returns
/// [`ControllerError::Unavailable`] carrying the partial `ready` list and
/// the non-ready count, so a caller that wants to proceed with the ready
/// set can destructure the error rather than use a side channel.
///
/// # Errors
///
/// Returns [`ControllerError::InvalidArgument`] if `target`'s reserved CIDR
/// is malformed, [`ControllerError::InvalidInstance`] if a matched
/// instance's identity is incomplete, or [`ControllerError::Unavailable`]
/// if any matched instance is non-ready.
pub fn run_eligible_instance_check(
    instances: &[MultishareInstance],
    ops: &[OpInfo],
    target: &TargetDescriptor,
    share_counts: &HashMap<String, u32>,
    flags: &FeatureFlags,
) -> Result<(Vec<MultishareInstance>, usize), ControllerError> {
    let matched = matcher::list_matched_instances(instances, target)?;
    let (ready, non_ready_count) = classify_instances(&matched, ops, share_counts, flags)?;

    if non_ready_count > 0 {
        return Err(ControllerError::Unavailable {
            ready,
            non_ready_count,
        });
    }
    Ok((ready, 0))
}

#[cfg(test)]
#[path = "eligibility_tests.rs"]
mod eligibility_tests;
