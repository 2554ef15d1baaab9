// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The instance matcher: filters candidate instances by storage-class
//! label, cluster identity, tier, network, connect-mode, CMEK key, and
//! reserved-IP CIDR containment.
//!
//! Any missing label, mismatched attribute, or out-of-CIDR IP excludes the
//! instance from the result. A malformed target CIDR fails the whole call
//! with [`ControllerError::InvalidArgument`] rather than silently excluding
//! every candidate.

use crate::errors::ControllerError;
use crate::model::{MultishareInstance, TargetDescriptor};
use crate::tags;
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

/// Whether `instance` is compatible with `target`, per every predicate in
/// the spec's instance-matcher compatibility rules. `cidr` is the parsed
/// reserved-IPv4 CIDR, if the target supplied one.
fn is_compatible(instance: &MultishareInstance, target: &TargetDescriptor, cidr: Option<Ipv4Net>) -> bool {
    if !tags::instance_is_owned_by(instance, target) {
        return false;
    }
    if instance.location != target.location {
        return false;
    }
    if instance.tier != target.tier {
        return false;
    }
    if instance.network.name != target.network.name
        || instance.network.connect_mode != target.network.connect_mode
    {
        return false;
    }
    if instance.kms_key_name != target.kms_key_name {
        return false;
    }
    if let Some(cidr) = cidr {
        match instance.network.ip {
            Some(ip) => {
                if !cidr.contains(&ip) {
                    return false;
                }
            }
            None => return false,
        }
    }
    true
}

/// Parse `target.reserved_ipv4_cidr`, if present.
///
/// # Errors
///
/// Returns [`ControllerError::InvalidArgument`] if the CIDR literal cannot
/// be parsed.
fn parse_target_cidr(target: &TargetDescriptor) -> Result<Option<Ipv4Net>, ControllerError> {
    match &target.reserved_ipv4_cidr {
        None => Ok(None),
        Some(literal) => literal
            .parse::<Ipv4Net>()
            .map(Some)
            .map_err(|e| ControllerError::InvalidArgument {
                reason: format!("reserved-ipv4-cidr '{literal}' is not a valid CIDR: {e}"),
            }),
    }
}

/// Return every instance in `instances` whose attributes are compatible
/// with `target`, per the spec's compatibility predicate.
///
/// `instances` is expected to already be the result of enumerating the
/// requested regions (callers typically get this from
/// [`crate::filer::FilerService::list_instances`]); this function performs
/// the filtering only.
///
/// # Errors
///
/// Returns [`ControllerError::InvalidArgument`] if `target`'s reserved CIDR
/// literal is malformed.
pub fn list_matched_instances(
    instances: &[MultishareInstance],
    target: &TargetDescriptor,
) -> Result<Vec<MultishareInstance>, ControllerError> {
    let cidr = parse_target_cidr(target)?;
    Ok(instances
        .iter()
        .filter(|instance| is_compatible(instance, target, cidr))
        .cloned()
        .collect())
}

/// Whether `ip` falls within `cidr`. Exposed standalone for tests and
/// callers that already have a parsed instance IP and CIDR in hand.
#[must_use]
pub fn cidr_contains(cidr: &Ipv4Net, ip: Ipv4Addr) -> bool {
    cidr.contains(&ip)
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod matcher_tests;
