// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The operation registry: parses live backend operations into a typed,
//! filtered snapshot, and the `verifyNo*`/`containsOp*` query helpers built
//! on top of it.
//!
//! The snapshot returned by [`list_running`] must be treated as a captured
//! value, never a live view: every helper here takes `&[OpInfo]` rather than
//! re-querying the backend, so a single placement decision sees one
//! consistent picture of in-flight operations.

use crate::errors::ControllerError;
use crate::metrics;
use crate::model::{MultishareInstance, OpInfo, OpType, RawOperation, Share};
use crate::resource::ResourceId;

/// Classify a single raw operation into an [`OpInfo`], or `None` if it
/// should be dropped from the snapshot (already done, or targeting a
/// resource that isn't an instance or a share).
fn classify(raw: &RawOperation) -> Option<OpInfo> {
    if raw.done {
        return None;
    }
    let parsed = ResourceId::parse(&raw.target).ok()?;
    let op_type = match (&parsed, raw.verb.as_str()) {
        (ResourceId::Instance { .. }, "create") => OpType::InstanceCreate,
        (ResourceId::Instance { .. }, "update") => OpType::InstanceUpdate,
        (ResourceId::Instance { .. }, "delete") => OpType::InstanceDelete,
        (ResourceId::Share { .. }, "create") => OpType::ShareCreate,
        (ResourceId::Share { .. }, "update") => OpType::ShareUpdate,
        (ResourceId::Share { .. }, "delete") => OpType::ShareDelete,
        _ => OpType::Unknown,
    };
    Some(OpInfo {
        id: raw.name.clone(),
        target: raw.target.clone(),
        op_type,
    })
}

/// Snapshot the backend's current set of non-done operations whose target
/// parses as an instance or share path, discarding everything else
/// (backups, snapshots, and any other verb/resource combination).
///
/// Order is unspecified but stable within a single call.
#[must_use]
pub fn list_running(raw_operations: &[RawOperation]) -> Vec<OpInfo> {
    let running: Vec<OpInfo> = raw_operations.iter().filter_map(classify).collect();
    metrics::record_running_ops_snapshot(running.len());
    running
}

fn instance_path_of(instance: &MultishareInstance) -> Result<String, ControllerError> {
    if instance.project.is_empty() || instance.location.is_empty() || instance.name.is_empty() {
        return Err(ControllerError::InvalidInstance {
            reason: "instance project, location, and name must all be non-empty".to_string(),
        });
    }
    Ok(instance.resource_path())
}

fn share_path_of(share: &Share) -> Result<String, ControllerError> {
    if share.parent.is_empty() || share.name.is_empty() {
        return Err(ControllerError::InvalidShare {
            reason: "share parent and name must both be non-empty".to_string(),
        });
    }
    Ok(share.resource_path())
}

/// Return the first op whose target equals `instance`'s path exactly, or
/// begins with `<instance-path>/` (i.e. a share operation on that
/// instance).
///
/// # Errors
///
/// Returns [`ControllerError::InvalidInstance`] if `instance`'s identity is
/// incomplete.
pub fn contains_op_with_instance_target_prefix<'a>(
    instance: &MultishareInstance,
    ops: &'a [OpInfo],
) -> Result<Option<&'a OpInfo>, ControllerError> {
    let instance_path = instance_path_of(instance)?;
    let prefix = format!("{instance_path}/");
    Ok(ops
        .iter()
        .find(|op| op.target == instance_path || op.target.starts_with(&prefix)))
}

/// Return the first op of type `op_type` whose target's last path segment
/// equals `share_name`.
#[must_use]
pub fn contains_op_with_share_name<'a>(
    share_name: &str,
    op_type: OpType,
    ops: &'a [OpInfo],
) -> Option<&'a OpInfo> {
    ops.iter().find(|op| {
        op.op_type == op_type
            && op
                .target
                .rsplit('/')
                .next()
                .is_some_and(|leaf| leaf == share_name)
    })
}

/// Fail with [`ControllerError::Conflict`] iff any op's target equals
/// `instance`'s path exactly.
///
/// # Errors
///
/// Returns [`ControllerError::InvalidInstance`] if `instance`'s identity is
/// incomplete, or [`ControllerError::Conflict`] if a matching op is found.
pub fn verify_no_running_instance_ops(
    instance: &MultishareInstance,
    ops: &[OpInfo],
) -> Result<(), ControllerError> {
    let instance_path = instance_path_of(instance)?;
    if let Some(op) = ops.iter().find(|op| op.target == instance_path) {
        return Err(ControllerError::Conflict {
            target: op.target.clone(),
            op_id: op.id.clone(),
            op_type: op.op_type,
        });
    }
    Ok(())
}

/// Fail with [`ControllerError::Conflict`] iff any op targets `instance`
/// exactly or any share beneath it.
///
/// # Errors
///
/// Returns [`ControllerError::InvalidInstance`] if `instance`'s identity is
/// incomplete, or [`ControllerError::Conflict`] if a matching op is found.
pub fn verify_no_running_instance_or_share_ops_for_instance(
    instance: &MultishareInstance,
    ops: &[OpInfo],
) -> Result<(), ControllerError> {
    if let Some(op) = contains_op_with_instance_target_prefix(instance, ops)? {
        return Err(ControllerError::Conflict {
            target: op.target.clone(),
            op_id: op.id.clone(),
            op_type: op.op_type,
        });
    }
    Ok(())
}

/// Fail with [`ControllerError::Conflict`] iff any op targets `share`
/// exactly.
///
/// # Errors
///
/// Returns [`ControllerError::InvalidShare`] if `share`'s identity is
/// incomplete, or [`ControllerError::Conflict`] if a matching op is found.
pub fn verify_no_running_share_ops(share: &Share, ops: &[OpInfo]) -> Result<(), ControllerError> {
    let share_path = share_path_of(share)?;
    if let Some(op) = ops.iter().find(|op| op.target == share_path) {
        return Err(ControllerError::Conflict {
            target: op.target.clone(),
            op_id: op.id.clone(),
            op_type: op.op_type,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod ops_tests;
