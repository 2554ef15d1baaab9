use super::*;
use crate::config;
use crate::mock::InMemoryFiler;
use crate::model::{InstanceState, Network, TargetDescriptor};
use crate::tags;

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
        requested_bytes: 100,
    }
}

fn instance(target: &TargetDescriptor, name: &str, capacity_bytes: u64) -> MultishareInstance {
    MultishareInstance {
        project: "p1".to_string(),
        location: target.location.clone(),
        name: name.to_string(),
        tier: target.tier.clone(),
        network: target.network.clone(),
        kms_key_name: target.kms_key_name.clone(),
        labels: tags::labels_for(target),
        capacity_bytes,
        max_share_count: 0,
        state: InstanceState::Ready,
    }
}

/// Build a `CreateVolumeRequest` whose parameter map round-trips back to
/// `target` through `TargetDescriptor::from_request`.
fn request(target: &TargetDescriptor) -> CreateVolumeRequest {
    CreateVolumeRequest {
        parameters: [
            (config::PARAM_SC_FINGERPRINT, target.sc_fingerprint.as_str()),
            (config::PARAM_TIER, target.tier.as_str()),
            (config::PARAM_NETWORK, target.network.name.as_str()),
            (config::PARAM_CONNECT_MODE, target.network.connect_mode.as_str()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
        regions: vec![target.location.clone()],
        requested_bytes: target.requested_bytes,
        cluster_location: target.cluster_location.clone(),
        cluster_name: target.cluster_name.clone(),
    }
}

#[tokio::test]
async fn no_matched_instances_creates_a_new_one() {
    let target = target();
    let filer = InMemoryFiler::new();
    let decision = decide(
        &filer,
        &request(&target),
        &FeatureFlags::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(decision, PlacementDecision::CreateInstance);
}

#[tokio::test]
async fn single_ready_instance_with_room_is_placed_on() {
    let target = target();
    let instance = instance(&target, "inst-a", 10_000);
    let filer = InMemoryFiler::new().with_instances(vec![instance.clone()]);
    let decision = decide(
        &filer,
        &request(&target),
        &FeatureFlags::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(decision, PlacementDecision::PlaceOn(instance));
}

#[tokio::test]
async fn instance_without_enough_free_capacity_is_expanded() {
    let target = target();
    let instance = instance(&target, "inst-a", 50);
    let filer = InMemoryFiler::new().with_instances(vec![instance.clone()]);
    let decision = decide(
        &filer,
        &request(&target),
        &FeatureFlags::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(
        decision,
        PlacementDecision::ExpandThenPlace {
            instance,
            target_bytes: 150,
        }
    );
}

#[tokio::test]
async fn non_ready_matched_instance_waits_even_if_another_is_ready() {
    let target = target();
    let ready = instance(&target, "inst-ready", 10_000);
    let mut creating = instance(&target, "inst-creating", 10_000);
    creating.state = InstanceState::Creating;
    let filer = InMemoryFiler::new().with_instances(vec![ready, creating]);
    let decision = decide(
        &filer,
        &request(&target),
        &FeatureFlags::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(decision, PlacementDecision::Wait);
}

#[tokio::test]
async fn best_fit_picks_the_instance_with_least_used_capacity() {
    let target = target();
    let fuller = instance(&target, "inst-fuller", 10_000);
    let emptier = instance(&target, "inst-emptier", 10_000);
    let shares = vec![Share {
        name: "vol-1".to_string(),
        parent: fuller.resource_path(),
        capacity_bytes: 5_000,
    }];
    let filer = InMemoryFiler::new()
        .with_instances(vec![fuller, emptier.clone()])
        .with_shares(shares);
    let decision = decide(
        &filer,
        &request(&target),
        &FeatureFlags::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(decision, PlacementDecision::PlaceOn(emptier));
}

#[tokio::test]
async fn canceled_token_aborts_before_any_filer_call() {
    let target = target();
    let filer = InMemoryFiler::new();
    let token = CancellationToken::new();
    token.cancel();
    let err = decide(&filer, &request(&target), &FeatureFlags::default(), &token)
        .await
        .unwrap_err();
    assert!(matches!(err, ControllerError::Canceled));
}

#[tokio::test]
async fn missing_sc_fingerprint_parameter_is_an_invalid_argument() {
    let filer = InMemoryFiler::new();
    let request = CreateVolumeRequest {
        parameters: Default::default(),
        regions: vec!["us-east1".to_string()],
        requested_bytes: 100,
        cluster_location: "us-east1".to_string(),
        cluster_name: "cluster-a".to_string(),
    };
    let err = decide(
        &filer,
        &request,
        &FeatureFlags::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ControllerError::InvalidArgument { .. }));
}
