// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! An in-memory [`FilerService`] implementation.
//!
//! Used by the demonstration binary (`src/bin/multishare-demo.rs`) and by
//! the integration test suite. It is not a substitute for a real cloud SDK
//! wrapper — it exists to exercise the placement core without a live
//! backend, the same role `wiremock` plays for the teacher crate's HTTP
//! integration tests.

use crate::errors::ControllerError;
use crate::filer::{check_canceled, FilerService};
use crate::model::{MultishareInstance, RawOperation, Share};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// An in-memory backend holding instances, shares, and long-running
/// operations in `Mutex`-guarded vectors.
///
/// Start-* calls record a not-done [`RawOperation`] and return its id
/// immediately, matching the real backend's asynchronous contract; call
/// [`InMemoryFiler::complete_operation`] to simulate the operation finishing,
/// optionally applying its effect to the instance/share lists.
#[derive(Default)]
pub struct InMemoryFiler {
    instances: Mutex<Vec<MultishareInstance>>,
    shares: Mutex<Vec<Share>>,
    operations: Mutex<Vec<RawOperation>>,
    next_op_id: AtomicU64,
}

impl InMemoryFiler {
    /// Construct an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend with a starting set of instances.
    #[must_use]
    pub fn with_instances(self, instances: Vec<MultishareInstance>) -> Self {
        *self.instances.lock().unwrap() = instances;
        self
    }

    /// Seed the backend with a starting set of shares.
    #[must_use]
    pub fn with_shares(self, shares: Vec<Share>) -> Self {
        *self.shares.lock().unwrap() = shares;
        self
    }

    /// Seed the backend with a starting set of in-flight operations.
    #[must_use]
    pub fn with_operations(self, operations: Vec<RawOperation>) -> Self {
        *self.operations.lock().unwrap() = operations;
        self
    }

    fn next_op_name(&self) -> String {
        let id = self.next_op_id.fetch_add(1, Ordering::SeqCst);
        format!("operation-{id}")
    }

    fn push_operation(&self, target: String, verb: &str) -> String {
        let name = self.next_op_name();
        self.operations.lock().unwrap().push(RawOperation {
            name: name.clone(),
            done: false,
            target,
            verb: verb.to_string(),
        });
        name
    }

    /// Mark the operation named `op_id` as done, without applying any
    /// side effect to the instance/share lists (callers apply their own
    /// effect first if desired).
    pub fn complete_operation(&self, op_id: &str) {
        if let Some(op) = self
            .operations
            .lock()
            .unwrap()
            .iter_mut()
            .find(|op| op.name == op_id)
        {
            op.done = true;
        }
    }

    /// Snapshot of every instance currently held, for test assertions.
    #[must_use]
    pub fn instances_snapshot(&self) -> Vec<MultishareInstance> {
        self.instances.lock().unwrap().clone()
    }
}

#[async_trait]
impl FilerService for InMemoryFiler {
    async fn list_instances(
        &self,
        regions: &[String],
        token: &CancellationToken,
    ) -> Result<Vec<MultishareInstance>, ControllerError> {
        check_canceled(token)?;
        let instances = self.instances.lock().unwrap();
        if regions.is_empty() {
            return Ok(instances.clone());
        }
        Ok(instances
            .iter()
            .filter(|i| regions.contains(&i.location))
            .cloned()
            .collect())
    }

    async fn list_shares(
        &self,
        instance: &MultishareInstance,
        token: &CancellationToken,
    ) -> Result<Vec<Share>, ControllerError> {
        check_canceled(token)?;
        let parent = instance.resource_path();
        Ok(self
            .shares
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.parent == parent)
            .cloned()
            .collect())
    }

    async fn list_operations(
        &self,
        token: &CancellationToken,
    ) -> Result<Vec<RawOperation>, ControllerError> {
        check_canceled(token)?;
        Ok(self.operations.lock().unwrap().clone())
    }

    async fn start_create_instance(
        &self,
        instance: &MultishareInstance,
        token: &CancellationToken,
    ) -> Result<String, ControllerError> {
        check_canceled(token)?;
        self.instances.lock().unwrap().push(instance.clone());
        Ok(self.push_operation(instance.resource_path(), "create"))
    }

    async fn start_update_instance(
        &self,
        instance: &MultishareInstance,
        new_capacity_bytes: u64,
        token: &CancellationToken,
    ) -> Result<String, ControllerError> {
        check_canceled(token)?;
        if let Some(existing) = self
            .instances
            .lock()
            .unwrap()
            .iter_mut()
            .find(|i| i.resource_path() == instance.resource_path())
        {
            existing.capacity_bytes = new_capacity_bytes;
        }
        Ok(self.push_operation(instance.resource_path(), "update"))
    }

    async fn start_delete_instance(
        &self,
        instance: &MultishareInstance,
        token: &CancellationToken,
    ) -> Result<String, ControllerError> {
        check_canceled(token)?;
        Ok(self.push_operation(instance.resource_path(), "delete"))
    }

    async fn start_create_share(
        &self,
        share: &Share,
        token: &CancellationToken,
    ) -> Result<String, ControllerError> {
        check_canceled(token)?;
        self.shares.lock().unwrap().push(share.clone());
        Ok(self.push_operation(share.resource_path(), "create"))
    }

    async fn start_update_share(
        &self,
        share: &Share,
        token: &CancellationToken,
    ) -> Result<String, ControllerError> {
        check_canceled(token)?;
        Ok(self.push_operation(share.resource_path(), "update"))
    }

    async fn start_delete_share(
        &self,
        share: &Share,
        token: &CancellationToken,
    ) -> Result<String, ControllerError> {
        check_canceled(token)?;
        Ok(self.push_operation(share.resource_path(), "delete"))
    }
}

#[cfg(test)]
#[path = "mock_tests.rs"]
mod mock_tests;
