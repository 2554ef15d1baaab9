// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label/tag conventions tying instances to a storage-class fingerprint.
//!
//! An instance is *owned by this controller* exactly when its labels carry
//! all three keys below, each equal to the corresponding
//! [`crate::model::TargetDescriptor`] value. This module defines those keys
//! and the ownership predicate, following the same "constants module"
//! layout the teacher crate uses for its Kubernetes labels.

use crate::model::{MultishareInstance, TargetDescriptor};
use std::collections::BTreeMap;

pub use crate::config::{LABEL_CLUSTER_LOCATION, LABEL_CLUSTER_NAME, LABEL_SC_FINGERPRINT};

/// The three label keys every controller-managed instance must carry.
pub const OWNERSHIP_LABEL_KEYS: [&str; 3] = [
    LABEL_SC_FINGERPRINT,
    LABEL_CLUSTER_LOCATION,
    LABEL_CLUSTER_NAME,
];

/// Whether `labels` carries all three ownership keys, each equal to the
/// corresponding value on `target`.
#[must_use]
pub fn is_owned_by(labels: &BTreeMap<String, String>, target: &TargetDescriptor) -> bool {
    labels.get(LABEL_SC_FINGERPRINT).map(String::as_str) == Some(target.sc_fingerprint.as_str())
        && labels.get(LABEL_CLUSTER_LOCATION).map(String::as_str)
            == Some(target.cluster_location.as_str())
        && labels.get(LABEL_CLUSTER_NAME).map(String::as_str) == Some(target.cluster_name.as_str())
}

/// Build the label map written on an instance newly created for `target`.
#[must_use]
pub fn labels_for(target: &TargetDescriptor) -> BTreeMap<String, String> {
    BTreeMap::from([
        (LABEL_SC_FINGERPRINT.to_string(), target.sc_fingerprint.clone()),
        (
            LABEL_CLUSTER_LOCATION.to_string(),
            target.cluster_location.clone(),
        ),
        (LABEL_CLUSTER_NAME.to_string(), target.cluster_name.clone()),
    ])
}

/// Convenience wrapper over [`is_owned_by`] taking a [`MultishareInstance`]
/// directly.
#[must_use]
pub fn instance_is_owned_by(instance: &MultishareInstance, target: &TargetDescriptor) -> bool {
    is_owned_by(&instance.labels, target)
}

#[cfg(test)]
#[path = "tags_tests.rs"]
mod tags_tests;
