use super::*;
use crate::config::FeatureFlags;
use crate::model::{InstanceState, Network};
use crate::ops;
use std::collections::BTreeMap;

fn instance(name: &str, state: InstanceState, max_share_count: u32) -> MultishareInstance {
    MultishareInstance {
        project: "p1".to_string(),
        location: "us-east1".to_string(),
        name: name.to_string(),
        tier: "tier-1".to_string(),
        network: Network {
            name: "default".to_string(),
            connect_mode: "direct-peering".to_string(),
            reserved_ip_range: None,
            ip: None,
        },
        kms_key_name: None,
        labels: BTreeMap::new(),
        capacity_bytes: 1024,
        max_share_count,
        state,
    }
}

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
        requested_bytes: 1,
    }
}

// Scenario: a ready instance under its share cap, with no in-flight op,
// is ready.
#[test]
fn ready_instance_under_cap_with_no_ops_is_ready() {
    let instance = instance("inst-a", InstanceState::Ready, 0);
    let flags = FeatureFlags::default();
    let counts = HashMap::from([(instance.resource_path(), 1)]);
    let (ready, non_ready) = classify_instances(&[instance], &[], &counts, &flags).unwrap();
    assert_eq!(ready.len(), 1);
    assert_eq!(non_ready, 0);
}

// Scenario: a ready instance at its share cap is ineligible, not non-ready.
#[test]
fn ready_instance_at_cap_is_ineligible() {
    let instance = instance("inst-a", InstanceState::Ready, 0);
    let flags = FeatureFlags::default();
    let counts = HashMap::from([(instance.resource_path(), crate::config::DEFAULT_SHARE_CAP)]);
    let (ready, non_ready) = classify_instances(&[instance], &[], &counts, &flags).unwrap();
    assert!(ready.is_empty());
    assert_eq!(non_ready, 0);
}

// Scenario: a ready instance with an in-flight share op on it is
// non-ready.
#[test]
fn ready_instance_with_running_op_is_non_ready() {
    let instance = instance("inst-a", InstanceState::Ready, 0);
    let flags = FeatureFlags::default();
    let counts = HashMap::from([(instance.resource_path(), 0)]);
    let raw = crate::model::RawOperation {
        name: "op-1".to_string(),
        done: false,
        target: format!("{}/shares/vol-1", instance.resource_path()),
        verb: "create".to_string(),
    };
    let running = ops::list_running(&[raw]);
    let (ready, non_ready) = classify_instances(&[instance], &running, &counts, &flags).unwrap();
    assert!(ready.is_empty());
    assert_eq!(non_ready, 1);
}

// Scenario: a ready instance with an in-flight delete op is ineligible,
// not non-ready, so it never blocks a placement decision.
#[test]
fn ready_instance_being_deleted_is_ineligible_not_non_ready() {
    let instance = instance("inst-a", InstanceState::Ready, 0);
    let flags = FeatureFlags::default();
    let counts = HashMap::from([(instance.resource_path(), 0)]);
    let raw = crate::model::RawOperation {
        name: "op-1".to_string(),
        done: false,
        target: instance.resource_path(),
        verb: "delete".to_string(),
    };
    let running = ops::list_running(&[raw]);
    let (ready, non_ready) = classify_instances(&[instance], &running, &counts, &flags).unwrap();
    assert!(ready.is_empty());
    assert_eq!(non_ready, 0);
}

#[test]
fn creating_and_repairing_instances_are_non_ready() {
    let flags = FeatureFlags::default();
    let counts = HashMap::new();
    let creating = instance("inst-a", InstanceState::Creating, 0);
    let repairing = instance("inst-b", InstanceState::Repairing, 0);
    let (ready, non_ready) =
        classify_instances(&[creating, repairing], &[], &counts, &flags).unwrap();
    assert!(ready.is_empty());
    assert_eq!(non_ready, 2);
}

#[test]
fn deleting_error_and_suspended_instances_are_ineligible() {
    let flags = FeatureFlags::default();
    let counts = HashMap::new();
    let deleting = instance("inst-a", InstanceState::Deleting, 0);
    let error = instance("inst-b", InstanceState::Error, 0);
    let suspended = instance("inst-c", InstanceState::Suspended, 0);
    let (ready, non_ready) =
        classify_instances(&[deleting, error, suspended], &[], &counts, &flags).unwrap();
    assert!(ready.is_empty());
    assert_eq!(non_ready, 0);
}

// Mirrors a three-non-ready, two-ready mixed batch: non_ready_count must
// equal 3 regardless of how many are ready or ineligible.
#[test]
fn mixed_batch_counts_non_ready_independently_of_ready_and_ineligible() {
    let flags = FeatureFlags::default();
    let ready_a = instance("ready-a", InstanceState::Ready, 0);
    let ready_b = instance("ready-b", InstanceState::Ready, 0);
    let creating = instance("creating-a", InstanceState::Creating, 0);
    let repairing = instance("repairing-a", InstanceState::Repairing, 0);
    let deleting = instance("deleting-a", InstanceState::Deleting, 0);
    let mut counts = HashMap::new();
    counts.insert(ready_a.resource_path(), 0);
    counts.insert(ready_b.resource_path(), 0);

    let raw = crate::model::RawOperation {
        name: "op-1".to_string(),
        done: false,
        target: repairing.resource_path(),
        verb: "update".to_string(),
    };
    let running = ops::list_running(&[raw]);

    let matched = vec![ready_a, ready_b, creating, repairing, deleting];
    let (ready, non_ready) = classify_instances(&matched, &running, &counts, &flags).unwrap();
    assert_eq!(ready.len(), 2);
    assert_eq!(non_ready, 3);
}

#[test]
fn run_eligible_instance_check_returns_ready_when_nothing_is_non_ready() {
    let instance = instance("inst-a", InstanceState::Ready, 0);
    let target = target();
    let mut instance = instance;
    instance.labels = crate::tags::labels_for(&target);
    let flags = FeatureFlags::default();
    let counts = HashMap::from([(instance.resource_path(), 0)]);
    let (ready, non_ready) =
        run_eligible_instance_check(&[instance], &[], &target, &counts, &flags).unwrap();
    assert_eq!(ready.len(), 1);
    assert_eq!(non_ready, 0);
}

#[test]
fn run_eligible_instance_check_errs_unavailable_when_a_match_is_non_ready() {
    let target = target();
    let mut instance = instance("inst-a", InstanceState::Creating, 0);
    instance.labels = crate::tags::labels_for(&target);
    let flags = FeatureFlags::default();
    let counts = HashMap::new();
    let err =
        run_eligible_instance_check(&[instance], &[], &target, &counts, &flags).unwrap_err();
    match err {
        ControllerError::Unavailable {
            ready,
            non_ready_count,
        } => {
            assert!(ready.is_empty());
            assert_eq!(non_ready_count, 1);
        }
        other => panic!("expected Unavailable, got {other:?}"),
    }
}
