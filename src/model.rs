// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Core data types for the multishare placement core.
//!
//! See the data model section of the placement spec: a [`MultishareInstance`]
//! is a backing filer uniquely identified by `(project, location, name)`; a
//! [`Share`] is a logical volume hosted on exactly one instance; an
//! [`OpInfo`] is a typed snapshot of a backend long-running operation; and a
//! [`TargetDescriptor`] is the immutable set of attributes a single placement
//! decision is made against.

use crate::config;
use crate::errors::ControllerError;
use std::collections::BTreeMap;

/// The lifecycle state of a [`MultishareInstance`], observed (not commanded)
/// by this core. Only `Ready` permits share operations; `Creating` and
/// `Repairing` are transient non-ready states, while `Error` and `Suspended`
/// are terminal for placement purposes until external intervention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstanceState {
    /// The instance is being provisioned.
    Creating,
    /// The instance accepts share operations.
    Ready,
    /// The instance is undergoing a repair operation.
    Repairing,
    /// The instance is being torn down.
    Deleting,
    /// The instance has entered an unrecoverable error state.
    Error,
    /// The instance has been administratively suspended.
    Suspended,
}

/// Network attributes of a [`MultishareInstance`], and the network the
/// target descriptor for a `CreateVolume` request is asking for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Network {
    /// The network name (e.g. "default").
    pub name: String,
    /// The connect mode (e.g. "direct-peering", "private-service-access").
    pub connect_mode: String,
    /// The reserved IP range, if the instance was provisioned into one.
    pub reserved_ip_range: Option<String>,
    /// The instance's assigned IP address, used for CIDR containment checks.
    pub ip: Option<std::net::Ipv4Addr>,
}

/// A backing filer instance, uniquely identified by `(project, location,
/// name)`. Invariants: `project`, `location`, and `name` are all non-empty
/// for any instance that participates in placement; `labels` always include
/// `{sc-fingerprint, cluster-location, cluster-name}` for controller-managed
/// instances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultishareInstance {
    /// GCP-style project identifier.
    pub project: String,
    /// Region or zone the instance lives in.
    pub location: String,
    /// Instance name, unique within `(project, location)`.
    pub name: String,
    /// Capability tier (e.g. "tier-1", "enterprise").
    pub tier: String,
    /// Network placement.
    pub network: Network,
    /// Optional CMEK key name.
    pub kms_key_name: Option<String>,
    /// Key-value labels, expected to include the three controller-ownership
    /// keys defined in [`crate::tags`].
    pub labels: BTreeMap<String, String>,
    /// Current provisioned capacity, in bytes.
    pub capacity_bytes: u64,
    /// Policy-configured share-count ceiling; `0` means "use the configured
    /// default" (see [`crate::config::FeatureFlags`]).
    pub max_share_count: u32,
    /// Current lifecycle state.
    pub state: InstanceState,
}

impl MultishareInstance {
    /// The canonical resource path for this instance.
    #[must_use]
    pub fn resource_path(&self) -> String {
        format!(
            "projects/{}/locations/{}/instances/{}",
            self.project, self.location, self.name
        )
    }
}

/// A logical volume hosted on exactly one instance. Invariant: `parent` is
/// fully specified; a share without parent identity is malformed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Share {
    /// Share name, unique within `parent`.
    pub name: String,
    /// The canonical resource path of the parent instance.
    pub parent: String,
    /// Provisioned capacity, in bytes.
    pub capacity_bytes: u64,
}

impl Share {
    /// The canonical resource path for this share.
    #[must_use]
    pub fn resource_path(&self) -> String {
        format!("{}/shares/{}", self.parent, self.name)
    }
}

/// The tagged enumeration of backend long-running operation kinds. Kept
/// exhaustive at compile time (no default arm in the classifier in
/// [`crate::ops`]) so a new backend verb cannot silently become `Unknown`
/// without a conscious decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpType {
    /// An instance is being created.
    InstanceCreate,
    /// An instance is being updated (e.g. capacity expansion).
    InstanceUpdate,
    /// An instance is being deleted.
    InstanceDelete,
    /// A share is being created.
    ShareCreate,
    /// A share is being updated.
    ShareUpdate,
    /// A share is being deleted.
    ShareDelete,
    /// The target is an instance or share, but the verb did not map to any
    /// of the six mutating kinds above.
    Unknown,
}

/// A snapshot of a single backend long-running operation, as returned by
/// [`crate::filer::FilerService::list_operations`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawOperation {
    /// Opaque operation identifier.
    pub name: String,
    /// Whether the backend considers the operation complete.
    pub done: bool,
    /// The resource path the operation targets.
    pub target: String,
    /// The backend verb (e.g. "create", "update", "delete"), used to
    /// classify the operation into an [`OpType`].
    pub verb: String,
}

/// A typed, classified operation entry produced by
/// [`crate::ops::list_running`]. Only operations whose target parses to an
/// instance or share path are tracked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpInfo {
    /// Opaque operation identifier.
    pub id: String,
    /// The resource path the operation targets.
    pub target: String,
    /// The classified operation kind.
    pub op_type: OpType,
}

/// The immutable set of attributes a single placement decision is made
/// against, built from a `CreateVolume` request's parameter map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetDescriptor {
    /// The storage-class fingerprint this request was provisioned for.
    pub sc_fingerprint: String,
    /// The cluster location label value.
    pub cluster_location: String,
    /// The cluster name label value.
    pub cluster_name: String,
    /// The region/location the request wants an instance in.
    pub location: String,
    /// The desired tier.
    pub tier: String,
    /// The desired network placement.
    pub network: Network,
    /// An optional CMEK key name.
    pub kms_key_name: Option<String>,
    /// An optional reserved IPv4 CIDR the instance's IP must fall within.
    pub reserved_ipv4_cidr: Option<String>,
    /// The number of bytes the new share requires.
    pub requested_bytes: u64,
}

/// A `CreateVolume` request's parameter map, as consumed by
/// [`crate::placement::decide`]. Parameter keys are listed in
/// [`crate::config`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateVolumeRequest {
    /// Raw request parameters, keyed exactly as the CSI request carries them.
    pub parameters: BTreeMap<String, String>,
    /// The regions to search for a matching instance.
    pub regions: Vec<String>,
    /// The number of bytes the new share requires.
    pub requested_bytes: u64,
    /// The cluster location this controller instance is deployed into.
    /// Not part of the CSI parameter map — injected by the driver from its
    /// own deployment identity, the same way `cluster-location`/
    /// `cluster-name` end up as labels on every instance it creates.
    pub cluster_location: String,
    /// The cluster name this controller instance is deployed into.
    pub cluster_name: String,
}

impl TargetDescriptor {
    /// Build a target descriptor from a `CreateVolume` request: read the
    /// parameter map per [`crate::config`]'s documented keys and defaults,
    /// and carry the request's region and cluster identity through
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidArgument`] if the request omits
    /// the required `multishare-instance-sc-label` parameter, or specifies
    /// no region.
    pub fn from_request(request: &CreateVolumeRequest) -> Result<Self, ControllerError> {
        let param = |key: &str| request.parameters.get(key).cloned();

        let sc_fingerprint = param(config::PARAM_SC_FINGERPRINT).ok_or_else(|| {
            ControllerError::InvalidArgument {
                reason: format!(
                    "request parameter '{}' is required",
                    config::PARAM_SC_FINGERPRINT
                ),
            }
        })?;
        let location = request.regions.first().cloned().ok_or_else(|| {
            ControllerError::InvalidArgument {
                reason: "request must specify at least one region".to_string(),
            }
        })?;

        let defaults = config::PlacementDefaults::default();
        let tier = param(config::PARAM_TIER).unwrap_or(defaults.tier);
        let network_name = param(config::PARAM_NETWORK).unwrap_or(defaults.network);
        let connect_mode = param(config::PARAM_CONNECT_MODE).unwrap_or(defaults.connect_mode);

        Ok(Self {
            sc_fingerprint,
            cluster_location: request.cluster_location.clone(),
            cluster_name: request.cluster_name.clone(),
            location,
            tier,
            network: Network {
                name: network_name,
                connect_mode,
                reserved_ip_range: None,
                ip: None,
            },
            kms_key_name: param(config::PARAM_KMS_KEY),
            reserved_ipv4_cidr: param(config::PARAM_RESERVED_IPV4_CIDR),
            requested_bytes: request.requested_bytes,
        })
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod model_tests;
