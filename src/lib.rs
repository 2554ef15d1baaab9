// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # multishare-ctrl - Placement manager for a multishare filer CSI driver
//!
//! `multishare-ctrl` is the placement and operations-safety core of a CSI-style
//! storage driver that packs many logical POSIX file shares onto a smaller pool
//! of backing filer instances. For every `CreateVolume` it decides whether to
//! place a new share on an existing instance, expand an existing instance to
//! fit it, or create a new instance — while a cloud backend that has no
//! transactions serially rejects concurrent mutations on the same resource.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - Canonical resource-path parsing and storage-class tagging ([`resource`], [`tags`])
//! - A typed registry of in-flight backend operations ([`ops`])
//! - A capacity planner that decides whether an instance needs expanding ([`capacity`])
//! - An instance matcher filtering candidates by label/network/CMEK/CIDR ([`matcher`])
//! - An eligibility engine classifying candidates as ready/non-ready/ineligible ([`eligibility`])
//! - The single-entry-point placement decision ([`placement`])
//!
//! ## Modules
//!
//! - [`filer`] - The abstract `FilerService` backend interface
//! - [`model`] - Core data types: instances, shares, operations, target descriptors
//! - [`resource`] - Canonical resource-path parsing (`ResourceId`)
//! - [`tags`] - Label/tag key constants tying instances to a storage-class fingerprint
//! - [`ops`] - Operation registry and the `verifyNo*`/`containsOp*` query helpers
//! - [`capacity`] - The capacity planner (`instance_needs_expand`)
//! - [`matcher`] - The instance matcher (`list_matched_instances`)
//! - [`eligibility`] - The eligibility engine (`run_eligible_instance_check`)
//! - [`placement`] - The placement decision entry point (`decide`)
//! - [`errors`] - The crate's error taxonomy
//! - [`config`] - Feature flags and placement defaults
//! - [`metrics`] - Prometheus metrics
//! - [`mock`] - An in-memory `FilerService` used by the demonstration binary and tests
//!
//! ## Example
//!
//! ```rust,no_run
//! use multishare_ctrl::model::{CreateVolumeRequest, Network, TargetDescriptor};
//!
//! let target = TargetDescriptor {
//!     sc_fingerprint: "sc-fast".to_string(),
//!     cluster_location: "us-central1".to_string(),
//!     cluster_name: "prod".to_string(),
//!     location: "us-central1".to_string(),
//!     tier: "tier-1".to_string(),
//!     network: Network {
//!         name: "default".to_string(),
//!         connect_mode: "direct-peering".to_string(),
//!         reserved_ip_range: None,
//!         ip: None,
//!     },
//!     kms_key_name: None,
//!     reserved_ipv4_cidr: None,
//!     requested_bytes: 100 * 1024 * 1024 * 1024,
//! };
//! let _ = target;
//! ```
//!
//! ## Features
//!
//! - **Operation safety** - never creates an instance while a matched instance is mutating
//! - **Best-fit placement** - ties broken by smallest resident usage, then by name
//! - **Structured errors** - one taxonomy for invalid input, conflicts, and backend failure

pub mod capacity;
pub mod config;
pub mod eligibility;
pub mod errors;
pub mod filer;
pub mod matcher;
pub mod metrics;
pub mod mock;
pub mod model;
pub mod ops;
pub mod placement;
pub mod resource;
pub mod tags;
