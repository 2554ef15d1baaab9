use super::*;
use crate::model::{InstanceState, MultishareInstance, Network};
use crate::tags;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

fn target() -> TargetDescriptor {
    TargetDescriptor {
        sc_fingerprint: "fp-1".to_string(),
        cluster_location: "us-east1".to_string(),
        cluster_name: "cluster-a".to_string(),
        location: "us-east1".to_string(),
        tier: "tier-1".to_string(),
        network: Network {
            name: "default".to_string(),
            connect_mode: "direct-peering".to_string(),
            reserved_ip_range: None,
            ip: None,
        },
        kms_key_name: None,
        reserved_ipv4_cidr: None,
        requested_bytes: 1024,
    }
}

fn matching_instance(target: &TargetDescriptor) -> MultishareInstance {
    MultishareInstance {
        project: "p1".to_string(),
        location: target.location.clone(),
        name: "inst-a".to_string(),
        tier: target.tier.clone(),
        network: target.network.clone(),
        kms_key_name: target.kms_key_name.clone(),
        labels: tags::labels_for(target),
        capacity_bytes: 1024,
        max_share_count: 0,
        state: InstanceState::Ready,
    }
}

// Scenario: a fully compatible instance matches.
#[test]
fn compatible_instance_is_matched() {
    let target = target();
    let instance = matching_instance(&target);
    let matched = list_matched_instances(&[instance.clone()], &target).unwrap();
    assert_eq!(matched, vec![instance]);
}

// Scenario: mismatched tier excludes the instance.
#[test]
fn mismatched_tier_is_excluded() {
    let target = target();
    let mut instance = matching_instance(&target);
    instance.tier = "enterprise".to_string();
    let matched = list_matched_instances(&[instance], &target).unwrap();
    assert!(matched.is_empty());
}

#[test]
fn missing_ownership_labels_excludes_the_instance() {
    let target = target();
    let mut instance = matching_instance(&target);
    instance.labels = BTreeMap::new();
    let matched = list_matched_instances(&[instance], &target).unwrap();
    assert!(matched.is_empty());
}

#[test]
fn mismatched_network_or_connect_mode_excludes_the_instance() {
    let target = target();
    let mut instance = matching_instance(&target);
    instance.network.connect_mode = "private-service-access".to_string();
    let matched = list_matched_instances(&[instance], &target).unwrap();
    assert!(matched.is_empty());
}

#[test]
fn mismatched_kms_key_excludes_the_instance() {
    let mut target = target();
    target.kms_key_name = Some("projects/p1/key-a".to_string());
    let mut instance = matching_instance(&target);
    instance.kms_key_name = Some("projects/p1/key-b".to_string());
    let matched = list_matched_instances(&[instance], &target).unwrap();
    assert!(matched.is_empty());
}

// Scenario: reserved CIDR containment matches an instance whose IP falls
// inside the requested range.
#[test]
fn reserved_cidr_matches_ip_within_range() {
    let mut target = target();
    target.reserved_ipv4_cidr = Some("10.0.0.0/24".to_string());
    let mut instance = matching_instance(&target);
    instance.network.ip = Some(Ipv4Addr::new(10, 0, 0, 5));
    let matched = list_matched_instances(&[instance], &target).unwrap();
    assert_eq!(matched.len(), 1);
}

// Scenario: reserved CIDR excludes an instance whose IP falls outside it,
// and excludes an instance with no IP at all.
#[test]
fn reserved_cidr_excludes_ip_outside_range_or_missing_ip() {
    let mut target = target();
    target.reserved_ipv4_cidr = Some("10.0.0.0/24".to_string());

    let mut outside = matching_instance(&target);
    outside.network.ip = Some(Ipv4Addr::new(10, 0, 1, 5));

    let mut no_ip = matching_instance(&target);
    no_ip.network.ip = None;

    let matched = list_matched_instances(&[outside, no_ip], &target).unwrap();
    assert!(matched.is_empty());
}

#[test]
fn malformed_cidr_literal_fails_the_whole_call() {
    let mut target = target();
    target.reserved_ipv4_cidr = Some("not-a-cidr".to_string());
    let instance = matching_instance(&target);
    let err = list_matched_instances(&[instance], &target).unwrap_err();
    assert!(matches!(err, ControllerError::InvalidArgument { .. }));
}

#[test]
fn cidr_contains_reports_containment_directly() {
    let cidr: ipnet::Ipv4Net = "192.168.0.0/16".parse().unwrap();
    assert!(cidr_contains(&cidr, Ipv4Addr::new(192, 168, 1, 1)));
    assert!(!cidr_contains(&cidr, Ipv4Addr::new(10, 0, 0, 1)));
}
