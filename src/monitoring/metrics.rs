// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Prometheus metrics for the gossip pipeline, served on `GET /metrics`.

use axum::{extract::State, http::StatusCode, routing::get, Router};
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Metrics errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus")]
    Prom,
    #[error("metrics listener")]
    Listen,
}

/// Metrics container.
#[derive(Clone)]
pub struct Metrics {
    /// Registry.
    pub registry: Registry,

    /// Packets read from the UDP socket.
    pub packets_received_total: IntCounter,
    /// Packets dropped because they did not parse.
    pub packets_malformed_total: IntCounter,
    /// Transactions failing consensus checks.
    pub tx_invalid_total: IntCounter,
    /// Packets whose transaction was in the recency cache.
    pub tx_cache_hits_total: IntCounter,
    /// Transactions written to the store.
    pub tx_stored_total: IntCounter,
    /// Transactions already present in the store.
    pub tx_duplicate_total: IntCounter,
    /// Store failures other than duplicates.
    pub store_errors_total: IntCounter,
    /// Transactions sent back in response to a request.
    pub replies_sent_total: IntCounter,
    /// Random-tip requests seen (not served by the core).
    pub tip_requests_total: IntCounter,
    /// Packets relayed to neighbors.
    pub regossip_sent_total: IntCounter,
    /// Storage queue depth.
    pub store_queue_depth: IntGauge,
    /// Reply queue depth.
    pub reply_queue_depth: IntGauge,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, MetricsError> {
    let c = IntCounter::new(name, help).map_err(|_| MetricsError::Prom)?;
    registry
        .register(Box::new(c.clone()))
        .map_err(|_| MetricsError::Prom)?;
    Ok(c)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGauge, MetricsError> {
    let g = IntGauge::new(name, help).map_err(|_| MetricsError::Prom)?;
    registry
        .register(Box::new(g.clone()))
        .map_err(|_| MetricsError::Prom)?;
    Ok(g)
}

impl Metrics {
    /// Create and register metrics.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let packets_received_total =
            counter(&registry, "tangle_packets_received_total", "UDP packets received")?;
        let packets_malformed_total = counter(
            &registry,
            "tangle_packets_malformed_total",
            "Packets dropped as malformed",
        )?;
        let tx_invalid_total = counter(
            &registry,
            "tangle_tx_invalid_total",
            "Transactions failing validation",
        )?;
        let tx_cache_hits_total = counter(
            &registry,
            "tangle_tx_cache_hits_total",
            "Transactions found in the recency cache",
        )?;
        let tx_stored_total =
            counter(&registry, "tangle_tx_stored_total", "Transactions stored")?;
        let tx_duplicate_total = counter(
            &registry,
            "tangle_tx_duplicate_total",
            "Transactions already stored",
        )?;
        let store_errors_total =
            counter(&registry, "tangle_store_errors_total", "Store failures")?;
        let replies_sent_total =
            counter(&registry, "tangle_replies_sent_total", "Requested transactions sent")?;
        let tip_requests_total =
            counter(&registry, "tangle_tip_requests_total", "Random tip requests seen")?;
        let regossip_sent_total = counter(
            &registry,
            "tangle_regossip_sent_total",
            "Packets relayed to neighbors",
        )?;
        let store_queue_depth =
            gauge(&registry, "tangle_store_queue_depth", "Storage queue depth")?;
        let reply_queue_depth =
            gauge(&registry, "tangle_reply_queue_depth", "Reply queue depth")?;

        Ok(Self {
            registry,
            packets_received_total,
            packets_malformed_total,
            tx_invalid_total,
            tx_cache_hits_total,
            tx_stored_total,
            tx_duplicate_total,
            store_errors_total,
            replies_sent_total,
            tip_requests_total,
            regossip_sent_total,
            store_queue_depth,
            reply_queue_depth,
        })
    }

    /// Text exposition format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .map_err(|_| MetricsError::Prom)?;
        String::from_utf8(buf).map_err(|_| MetricsError::Prom)
    }
}

async fn metrics_handler(State(metrics): State<Arc<Metrics>>) -> Result<String, StatusCode> {
    metrics
        .encode()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Router exposing `GET /metrics`.
pub fn router(metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
}

/// Serve metrics on `addr` until the task is dropped.
pub async fn serve(addr: SocketAddr, metrics: Arc<Metrics>) -> Result<(), MetricsError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|_| MetricsError::Listen)?;
    info!(%addr, "metrics listening");
    axum::serve(listener, router(metrics))
        .await
        .map_err(|_| MetricsError::Listen)
}
