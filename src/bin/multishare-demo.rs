// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use axum::{routing::get, Router};
use clap::Parser;
use multishare_ctrl::config::{
    self, FeatureFlags, METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PATH, METRICS_SERVER_PORT,
    TOKIO_WORKER_THREADS,
};
use multishare_ctrl::metrics;
use multishare_ctrl::mock::InMemoryFiler;
use multishare_ctrl::model::{CreateVolumeRequest, InstanceState, MultishareInstance, TargetDescriptor};
use multishare_ctrl::placement::{self, PlacementDecision};
use multishare_ctrl::tags;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Run a single placement decision against an in-memory filer backend and
/// print the outcome.
#[derive(Parser, Debug)]
#[command(name = "multishare-demo", version, about)]
struct Cli {
    /// Region to place the new share in.
    #[arg(long, default_value = "us-east1")]
    region: String,

    /// Desired tier for the new share's instance.
    #[arg(long, default_value = "tier-1")]
    tier: String,

    /// Storage-class fingerprint the target instance must be labeled with.
    #[arg(long, default_value = "demo-fingerprint")]
    sc_fingerprint: String,

    /// Number of bytes the new share requests.
    #[arg(long, default_value_t = 100 * 1024 * 1024 * 1024)]
    requested_bytes: u64,

    /// Number of pre-existing ready instances to seed the backend with.
    #[arg(long, default_value_t = 1)]
    seed_instances: u32,

    /// Per-instance capacity of each seeded instance, in bytes.
    #[arg(long, default_value_t = 1024 * 1024 * 1024 * 1024)]
    seed_capacity_bytes: u64,

    /// Don't start the Prometheus metrics HTTP server.
    #[arg(long)]
    no_metrics_server: bool,
}

/// Respects `RUST_LOG` if set, otherwise defaults to INFO level.
/// Respects `RUST_LOG_FORMAT` for output format (`json` or `text`).
fn initialize_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting multishare placement demo");
}

/// Start the Prometheus metrics HTTP server.
///
/// Serves metrics on the configured port and path (default:
/// `0.0.0.0:8080/metrics`).
fn start_metrics_server() -> tokio::task::JoinHandle<()> {
    info!(
        bind_address = METRICS_SERVER_BIND_ADDRESS,
        port = METRICS_SERVER_PORT,
        path = METRICS_SERVER_PATH,
        "starting Prometheus metrics HTTP server"
    );

    tokio::spawn(async move {
        async fn metrics_handler() -> String {
            match metrics::gather_metrics() {
                Ok(text) => text,
                Err(e) => {
                    error!("failed to gather metrics: {e}");
                    String::from("# error gathering metrics\n")
                }
            }
        }

        let app = Router::new().route(METRICS_SERVER_PATH, get(metrics_handler));
        let bind_addr = format!("{METRICS_SERVER_BIND_ADDRESS}:{METRICS_SERVER_PORT}");
        let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("failed to bind metrics server to {bind_addr}: {e}");
                return;
            }
        };

        info!("metrics server listening on http://{bind_addr}{METRICS_SERVER_PATH}");
        if let Err(e) = axum::serve(listener, app).await {
            error!("metrics server error: {e}");
        }
    })
}

fn seed_backend(cli: &Cli, target: &TargetDescriptor) -> InMemoryFiler {
    let instances: Vec<MultishareInstance> = (0..cli.seed_instances)
        .map(|i| MultishareInstance {
            project: "demo-project".to_string(),
            location: cli.region.clone(),
            name: format!("multishare-{i}"),
            tier: cli.tier.clone(),
            network: target.network.clone(),
            kms_key_name: None,
            labels: tags::labels_for(target),
            capacity_bytes: cli.seed_capacity_bytes,
            max_share_count: 0,
            state: InstanceState::Ready,
        })
        .collect();
    InMemoryFiler::new().with_instances(instances)
}

/// Build the `CreateVolume` request this demo sends, with its parameter map
/// populated from the CLI flags the way a real CSI driver would populate it
/// from a `StorageClass`'s `parameters` block.
fn build_request(cli: &Cli) -> CreateVolumeRequest {
    CreateVolumeRequest {
        parameters: [
            (config::PARAM_SC_FINGERPRINT, cli.sc_fingerprint.as_str()),
            (config::PARAM_TIER, cli.tier.as_str()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
        regions: vec![cli.region.clone()],
        requested_bytes: cli.requested_bytes,
        cluster_location: cli.region.clone(),
        cluster_name: "demo-cluster".to_string(),
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    let request = build_request(&cli);
    let target = TargetDescriptor::from_request(&request)?;
    let filer = seed_backend(&cli, &target);
    let flags = FeatureFlags::from_env();

    let token = CancellationToken::new();
    let started = Instant::now();
    let decision = placement::decide(&filer, &request, &flags, &token).await?;
    let elapsed = started.elapsed();

    let outcome = match &decision {
        PlacementDecision::PlaceOn(instance) => {
            info!(instance = %instance.resource_path(), "decision: place on existing instance");
            "place_on"
        }
        PlacementDecision::ExpandThenPlace {
            instance,
            target_bytes,
        } => {
            info!(
                instance = %instance.resource_path(),
                target_bytes,
                "decision: expand instance then place"
            );
            "expand_then_place"
        }
        PlacementDecision::CreateInstance => {
            info!("decision: create a new instance");
            "create_instance"
        }
        PlacementDecision::Wait => {
            info!("decision: wait, a matched instance is non-ready");
            "wait"
        }
    };
    metrics::record_placement_decision_timed(outcome, elapsed);

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("multishare-demo")
        .enable_all()
        .build()?;

    runtime.block_on(async {
        if !cli.no_metrics_server {
            start_metrics_server();
        }
        async_main(cli).await
    })
}
