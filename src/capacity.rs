// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The capacity planner: decides whether an instance must be expanded to
//! accommodate a new share, and by how much.
//!
//! Expansion is the minimum increment that makes `free` reach
//! `needed_bytes`. The arithmetic is written in the exact order the spec
//! pins — `capacity + (needed - (capacity - used))` — so a refactor can't
//! silently introduce a different (if numerically equivalent in the
//! unsigned-no-overflow case) evaluation order.

use crate::metrics;
use crate::model::MultishareInstance;

/// The result of [`instance_needs_expand`]: either the instance has enough
/// free capacity already, or it must be expanded to `target_bytes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpansionPlan {
    /// Whether the instance must be expanded before the new share fits.
    pub needs_expand: bool,
    /// The capacity the instance must be expanded to. `0` when
    /// `needs_expand` is `false`.
    pub target_bytes: u64,
}

/// Compute whether `instance` needs expanding to fit a new share requiring
/// `needed_bytes`, given `used_bytes` already resident on it (the sum of
/// every existing share's `capacity_bytes`, including in-flight creations).
///
/// If the instance already has the configured maximum number of shares,
/// this planner is not consulted — the eligibility engine rejects first.
#[must_use]
pub fn instance_needs_expand(
    instance: &MultishareInstance,
    used_bytes: u64,
    needed_bytes: u64,
) -> ExpansionPlan {
    let free = instance.capacity_bytes.saturating_sub(used_bytes);
    if needed_bytes <= free {
        metrics::record_capacity_check(false);
        return ExpansionPlan {
            needs_expand: false,
            target_bytes: 0,
        };
    }
    let target_bytes = instance.capacity_bytes + (needed_bytes - free);
    metrics::record_capacity_check(true);
    ExpansionPlan {
        needs_expand: true,
        target_bytes,
    }
}

/// Sum the `capacity_bytes` of every share in `shares`. This is the `used`
/// term [`instance_needs_expand`] expects, including shares whose creation
/// is still in flight.
#[must_use]
pub fn used_bytes(shares: &[crate::model::Share]) -> u64 {
    shares.iter().map(|s| s.capacity_bytes).sum()
}

#[cfg(test)]
#[path = "capacity_tests.rs"]
mod capacity_tests;
