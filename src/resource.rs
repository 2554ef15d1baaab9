// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Canonical resource-path parsing for multishare instances and shares.
//!
//! Resource paths use the canonical form `projects/{P}/locations/{L}/instances/{I}`
//! for instances and `.../instances/{I}/shares/{S}` for shares. This is the only
//! text parsing performed by the core, and it is total: [`ResourceId::parse`]
//! either returns a typed `{instance | share}` identity or a [`ResourceId::parse`]
//! error, so downstream helpers work against the typed identity rather than raw
//! strings — the design note in the spec calls this out explicitly to avoid the
//! "share-vs-instance prefix" bug class.

use crate::errors::ControllerError;
use std::fmt;

/// A parsed, typed resource identity: either a multishare instance or a share
/// nested under one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceId {
    /// `projects/{project}/locations/{location}/instances/{name}`
    Instance {
        /// GCP-style project identifier.
        project: String,
        /// Region or zone the instance lives in.
        location: String,
        /// Instance name, unique within `(project, location)`.
        name: String,
    },
    /// `projects/{project}/locations/{location}/instances/{instance}/shares/{share}`
    Share {
        /// GCP-style project identifier.
        project: String,
        /// Region or zone the parent instance lives in.
        location: String,
        /// Parent instance name.
        instance: String,
        /// Share name, unique within the parent instance.
        share: String,
    },
}

impl ResourceId {
    /// Parse a canonical resource path, accepting either the instance or the
    /// share form and rejecting everything else (backups, snapshots, or any
    /// other resource kind).
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidArgument`] if `path` does not match
    /// either canonical form.
    pub fn parse(path: &str) -> Result<Self, ControllerError> {
        let segments: Vec<&str> = path.split('/').collect();
        match segments.as_slice() {
            ["projects", project, "locations", location, "instances", name] => {
                Ok(Self::Instance {
                    project: (*project).to_string(),
                    location: (*location).to_string(),
                    name: (*name).to_string(),
                })
            }
            ["projects", project, "locations", location, "instances", instance, "shares", share] => {
                Ok(Self::Share {
                    project: (*project).to_string(),
                    location: (*location).to_string(),
                    instance: (*instance).to_string(),
                    share: (*share).to_string(),
                })
            }
            _ => Err(ControllerError::InvalidArgument {
                reason: format!("'{path}' is not a valid instance or share resource path"),
            }),
        }
    }

    /// Returns the canonical path of the instance this resource belongs to:
    /// itself if this is already an instance, or its parent if this is a
    /// share.
    #[must_use]
    pub fn instance_path(&self) -> String {
        match self {
            Self::Instance { .. } => self.to_string(),
            Self::Share {
                project,
                location,
                instance,
                ..
            } => format!("projects/{project}/locations/{location}/instances/{instance}"),
        }
    }

    /// The final path segment: the instance name, or the share name for a
    /// share resource.
    #[must_use]
    pub fn leaf_name(&self) -> &str {
        match self {
            Self::Instance { name, .. } => name,
            Self::Share { share, .. } => share,
        }
    }

    /// Whether this resource is a share nested under `instance_path`.
    #[must_use]
    pub fn is_share_of(&self, instance_path: &str) -> bool {
        matches!(self, Self::Share { .. }) && self.instance_path() == instance_path
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance {
                project,
                location,
                name,
            } => write!(
                f,
                "projects/{project}/locations/{location}/instances/{name}"
            ),
            Self::Share {
                project,
                location,
                instance,
                share,
            } => write!(
                f,
                "projects/{project}/locations/{location}/instances/{instance}/shares/{share}"
            ),
        }
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod resource_tests;
