// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The abstract `FilerService` backend interface.
//!
//! The placement core never talks to the cloud backend directly — every
//! interaction goes through this trait. Start-* calls return immediately
//! with an operation handle; observation of whether they completed happens
//! via [`FilerService::list_operations`]. Every method is a suspension
//! point: callers pass a [`CancellationToken`] and a canceled token must
//! cause the call to return [`ControllerError::Canceled`] without mutating
//! backend state.
//!
//! This is the only trait the core depends on; the cloud SDK wrapper that
//! implements it in production, the CSI gRPC surface that drives it, and
//! node-side mount logic are all external collaborators out of scope for
//! this crate. [`crate::mock`] provides an in-memory implementation used by
//! the demonstration binary and the test suite.

use crate::errors::ControllerError;
use crate::model::{MultishareInstance, RawOperation, Share};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// The abstract backend the placement core calls into.
///
/// Implementations should treat a canceled `token` as a hard stop: return
/// [`ControllerError::Canceled`] as soon as the token is observed fired, and
/// leave no partial backend mutation behind.
#[async_trait]
pub trait FilerService: Send + Sync {
    /// List all instances visible across `regions`.
    async fn list_instances(
        &self,
        regions: &[String],
        token: &CancellationToken,
    ) -> Result<Vec<MultishareInstance>, ControllerError>;

    /// List all shares currently resident on `instance`.
    async fn list_shares(
        &self,
        instance: &MultishareInstance,
        token: &CancellationToken,
    ) -> Result<Vec<Share>, ControllerError>;

    /// List all backend long-running operations, done or not.
    async fn list_operations(
        &self,
        token: &CancellationToken,
    ) -> Result<Vec<RawOperation>, ControllerError>;

    /// Start creating `instance`. Returns immediately with an operation id.
    async fn start_create_instance(
        &self,
        instance: &MultishareInstance,
        token: &CancellationToken,
    ) -> Result<String, ControllerError>;

    /// Start updating `instance` to `new_capacity_bytes`. Returns
    /// immediately with an operation id.
    async fn start_update_instance(
        &self,
        instance: &MultishareInstance,
        new_capacity_bytes: u64,
        token: &CancellationToken,
    ) -> Result<String, ControllerError>;

    /// Start deleting `instance`. Returns immediately with an operation id.
    async fn start_delete_instance(
        &self,
        instance: &MultishareInstance,
        token: &CancellationToken,
    ) -> Result<String, ControllerError>;

    /// Start creating `share`. Returns immediately with an operation id.
    async fn start_create_share(
        &self,
        share: &Share,
        token: &CancellationToken,
    ) -> Result<String, ControllerError>;

    /// Start updating `share`. Returns immediately with an operation id.
    async fn start_update_share(
        &self,
        share: &Share,
        token: &CancellationToken,
    ) -> Result<String, ControllerError>;

    /// Start deleting `share`. Returns immediately with an operation id.
    async fn start_delete_share(
        &self,
        share: &Share,
        token: &CancellationToken,
    ) -> Result<String, ControllerError>;
}

/// Return [`ControllerError::Canceled`] if `token` has already fired.
///
/// Called at the start of every placement suspension point so cancellation
/// is observed promptly rather than only after a backend round-trip.
pub fn check_canceled(token: &CancellationToken) -> Result<(), ControllerError> {
    if token.is_cancelled() {
        Err(ControllerError::Canceled)
    } else {
        Ok(())
    }
}
