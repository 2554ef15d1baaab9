// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The multishare controller's error taxonomy.
//!
//! This module provides a single `thiserror`-derived error type spanning the
//! kinds the placement core can surface: malformed input, incomplete resource
//! identity, in-flight conflicts, backend unavailability, cancellation, and
//! backend-call failure. The core performs no local recovery — every error
//! variant here is meant to bubble unchanged to the caller, which decides
//! whether to retry, surface a gRPC status, or abort.

use crate::model::MultishareInstance;
use thiserror::Error;

/// The set of error kinds the placement core can return.
///
/// Each kind maps to a policy described in the spec's error-handling design:
/// `InvalidArgument`/`InvalidInstance`/`InvalidShare` are surfaced without
/// retry, `Conflict` and `Unavailable` are retryable, `Canceled` aborts with
/// no side effects, and `Backend` is surfaced unchanged from the
/// [`FilerService`](crate::filer::FilerService) call that produced it.
#[derive(Error, Debug, Clone)]
pub enum ControllerError {
    /// Malformed request, bad CIDR literal, or any other input that is
    /// structurally invalid and will never succeed on retry.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Human-readable explanation of what was invalid.
        reason: String,
    },

    /// An instance identity is missing its project, location, or name.
    #[error("invalid instance identity: {reason}")]
    InvalidInstance {
        /// Human-readable explanation of what was missing or malformed.
        reason: String,
    },

    /// A share identity is missing its parent instance or name.
    #[error("invalid share identity: {reason}")]
    InvalidShare {
        /// Human-readable explanation of what was missing or malformed.
        reason: String,
    },

    /// A `verifyNoRunning*` check found an in-flight mutation on the target
    /// resource. Callers should surface this as retry-after.
    #[error("operation already running on {target}: op {op_id} ({op_type:?})")]
    Conflict {
        /// The resource path the conflicting operation targets.
        target: String,
        /// The id of the conflicting operation.
        op_id: String,
        /// The type of the conflicting operation.
        op_type: crate::model::OpType,
    },

    /// At least one matched instance is non-ready; the placement decision
    /// cannot proceed yet but a partial ready set may still be usable.
    #[error("{non_ready_count} matched instance(s) are non-ready, {} ready", ready.len())]
    Unavailable {
        /// Instances that passed every compatibility check and are currently
        /// ready to receive a new share.
        ready: Vec<MultishareInstance>,
        /// The number of matched instances that are mutating or otherwise
        /// not yet ready.
        non_ready_count: usize,
    },

    /// The caller's cancellation token fired while a placement decision was
    /// in flight. No backend state was mutated.
    #[error("operation canceled")]
    Canceled,

    /// A [`FilerService`](crate::filer::FilerService) call failed. The
    /// message is surfaced unchanged from the backend.
    #[error("backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
