#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Tangle node entrypoint (systemd-friendly).
//! Loads configuration, opens the store, starts UDP gossip and metrics,
//! and shuts down cleanly on SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tangle_node::core::state::store::{SledStore, Store};
use tangle_node::core::types::NodeConfig;
use tangle_node::monitoring::metrics::{self, Metrics};
use tangle_node::networking::gossip::{spawn_gossip, GossipConfig};

fn init_tracing(cfg: &NodeConfig) {
    let default_level = if cfg.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);
    // try_init: a second subscriber (tests, embedding) is not fatal.
    let _ = if cfg.log_json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "ctrl_c handler failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let term = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let term = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = term => {},
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::var("TANGLE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("tangle.toml"));
    let mut cfg = NodeConfig::load(&path).with_context(|| format!("config {}", path.display()))?;
    cfg.apply_env(|k| std::env::var(k).ok())
        .context("environment overrides")?;

    init_tracing(&cfg);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        rustc = option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown"),
        built = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        config = %path.display(),
        "tangle node starting"
    );

    let metrics = Arc::new(Metrics::new().context("metrics init")?);

    let store = Arc::new(SledStore::open(&cfg.db_path).context("open store")?);
    info!(db = %cfg.db_path, "store opened");

    let gossip_cfg = GossipConfig::from_node_config(&cfg).context("gossip config")?;
    let gossip = spawn_gossip(gossip_cfg, store.clone(), metrics.clone())
        .await
        .context("start gossip")?;

    let http_addr: SocketAddr = cfg
        .http_addr
        .parse()
        .with_context(|| format!("http_addr {}", cfg.http_addr))?;
    let metrics_task = tokio::spawn(async move {
        if let Err(e) = metrics::serve(http_addr, metrics).await {
            error!(error = %e, "metrics server stopped");
        }
    });

    tokio::select! {
        _ = shutdown_signal() => info!("shutdown requested"),
        _ = gossip.receiver().closed() => warn!("gossip receiver closed"),
    }

    gossip.shutdown().await;
    metrics_task.abort();
    store.close().context("close store")?;
    info!("tangle node stopped");
    Ok(())
}
