// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants and runtime configuration for the multishare controller.
//!
//! This module contains the numeric and string defaults used throughout the
//! crate, plus the `max-shares-per-instance` feature-flag plumbing described
//! by the placement spec. Constants are organized by category for easy
//! maintenance, following the same layout the teacher crate uses for its
//! global constants module.

use std::time::Duration;

// ============================================================================
// Request Parameter Keys
// ============================================================================

/// Request parameter key carrying the storage-class fingerprint (required).
pub const PARAM_SC_FINGERPRINT: &str = "multishare-instance-sc-label";

/// Request parameter key for the desired tier.
pub const PARAM_TIER: &str = "tier";

/// Request parameter key for the desired network name.
pub const PARAM_NETWORK: &str = "network";

/// Request parameter key for the desired connect mode.
pub const PARAM_CONNECT_MODE: &str = "connect-mode";

/// Request parameter key for an optional CMEK key name.
pub const PARAM_KMS_KEY: &str = "instance-encryption-kms-key";

/// Request parameter key for an optional reserved IPv4 CIDR.
pub const PARAM_RESERVED_IPV4_CIDR: &str = "reserved-ipv4-cidr";

// ============================================================================
// Placement Defaults
// ============================================================================

/// Default tier when the request omits `tier`.
pub const DEFAULT_TIER: &str = "tier-1";

/// The literal "enterprise" tier constant referenced by the spec's
/// compatibility predicate; compared as an exact string, never normalized.
pub const TIER_ENTERPRISE: &str = "enterprise";

/// Default network name when the request omits `network`.
pub const DEFAULT_NETWORK: &str = "default";

/// Default connect mode when the request omits `connect-mode`.
pub const DEFAULT_CONNECT_MODE: &str = "direct-peering";

/// Built-in share-count cap used when the `max-shares-per-instance` feature
/// flag is disabled, or enabled with no per-instance override.
pub const DEFAULT_SHARE_CAP: u32 = 10;

// ============================================================================
// Labels Written On Created Instances
// ============================================================================

/// Label key identifying the storage-class fingerprint an instance serves.
pub const LABEL_SC_FINGERPRINT: &str = "sc-fingerprint";

/// Label key identifying the cluster location that owns an instance.
pub const LABEL_CLUSTER_LOCATION: &str = "cluster-location";

/// Label key identifying the cluster name that owns an instance.
pub const LABEL_CLUSTER_NAME: &str = "cluster-name";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for the demonstration binary's Tokio runtime.
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Port for the Prometheus metrics HTTP server.
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for the Prometheus metrics endpoint.
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for the metrics HTTP server.
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";

// ============================================================================
// Feature Flags
// ============================================================================

/// The `max-shares-per-instance` feature flag: whether a per-instance
/// `maxShareCount` override is honored, and the cap applied when it is not.
///
/// When `enabled` is `false`, or an instance's `max_share_count` is `0`,
/// [`FeatureFlags::effective_cap`] falls back to `default_cap`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Whether a per-instance `maxShareCount` override is honored.
    pub enabled: bool,
    /// The built-in cap applied when disabled or unset.
    pub default_cap: u32,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enabled: false,
            default_cap: DEFAULT_SHARE_CAP,
        }
    }
}

impl FeatureFlags {
    /// Load feature flags from environment variables, falling back to the
    /// built-in defaults. Mirrors the `std::env::var(...).ok().and_then(...)`
    /// idiom the teacher crate uses for its Kubernetes client QPS/burst.
    #[must_use]
    pub fn from_env() -> Self {
        let enabled = std::env::var("MULTISHARE_MAX_SHARES_PER_INSTANCE_ENABLED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(false);
        let default_cap = std::env::var("MULTISHARE_DEFAULT_SHARE_CAP")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SHARE_CAP);
        Self {
            enabled,
            default_cap,
        }
    }

    /// Compute the effective share-count cap for an instance's configured
    /// `max_share_count` (`0` meaning "use the default").
    #[must_use]
    pub fn effective_cap(&self, instance_max_share_count: u32) -> u32 {
        if self.enabled && instance_max_share_count > 0 {
            instance_max_share_count
        } else {
            self.default_cap
        }
    }
}

/// Bundle of defaults applied when a `CreateVolume` request omits an
/// optional parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementDefaults {
    /// Default tier applied when the request omits `tier`.
    pub tier: String,
    /// Default network name applied when the request omits `network`.
    pub network: String,
    /// Default connect mode applied when the request omits `connect-mode`.
    pub connect_mode: String,
}

impl Default for PlacementDefaults {
    fn default() -> Self {
        Self {
            tier: DEFAULT_TIER.to_string(),
            network: DEFAULT_NETWORK.to_string(),
            connect_mode: DEFAULT_CONNECT_MODE.to_string(),
        }
    }
}

/// Default poll interval the demonstration binary uses between
/// `listOperations` snapshots.
#[must_use]
pub fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
