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

//! UDP gossip receiver.
//!
//! Three tasks share one socket:
//! - reader: parse, dedupe through the recency cache, validate, enqueue
//! - storage loop: pop heaviest transaction, insert into the store, relay to neighbors
//! - reply loop: pop heaviest request, send the requested transaction back
//!
//! The tasks communicate only through the two weight queues and the cache.
//! `close` flips the closed flag, which stops the reader and fails every
//! blocked queue call so the consumers exit.

use crate::core::hash::TxHash;
use crate::core::message::{Digest, Message, StoreTxError, ValidationError};
use crate::core::queue::{QueueError, WeightQueue};
use crate::core::state::store::{Bucket, Store, StoreError};
use crate::core::types::{ConfigError, NodeConfig};
use crate::monitoring::metrics::Metrics;
use crate::networking::cache::RecentCache;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Read buffer; larger than a packet so oversized datagrams are seen whole and dropped.
const READ_BUFFER_BYTES: usize = 10 * 1024;

/// Gossip errors.
#[derive(Debug, Error)]
pub enum GossipError {
    #[error("udp bind")]
    Bind,
    #[error("udp io")]
    Io,
}

/// Receiver settings.
#[derive(Clone, Debug)]
pub struct GossipConfig {
    /// UDP listen address.
    pub bind_addr: SocketAddr,
    /// Minimum weight magnitude for accepted transactions.
    pub min_weight_magnitude: usize,
    /// Neighbors that newly stored transactions are relayed to.
    pub neighbors: Vec<SocketAddr>,
    /// Capacity of each dispatch queue.
    pub queue_capacity: usize,
    /// Capacity of the recency cache.
    pub cache_capacity: usize,
}

impl GossipConfig {
    /// Derive from the node configuration, parsing addresses.
    pub fn from_node_config(cfg: &NodeConfig) -> Result<Self, ConfigError> {
        let bind_addr = parse_addr(&cfg.udp_addr)?;
        let neighbors = cfg
            .neighbors
            .iter()
            .map(|n| parse_addr(n))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            bind_addr,
            min_weight_magnitude: cfg.effective_min_weight_magnitude(),
            neighbors,
            queue_capacity: cfg.queue_capacity,
            cache_capacity: cfg.cache_capacity,
        })
    }
}

fn parse_addr(s: &str) -> Result<SocketAddr, ConfigError> {
    s.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidAddr(s.to_string()))
}

/// A validated transaction awaiting storage.
#[derive(Debug)]
pub struct StoreItem {
    /// Parsed transaction.
    pub message: Message,
    /// Neighbor it came from.
    pub sender: SocketAddr,
}

/// A transaction request awaiting a reply.
#[derive(Clone, Copy, Debug)]
pub struct ReplyItem {
    /// Requested hash; zero means "any tip".
    pub requested: TxHash,
    /// Neighbor to answer.
    pub sender: SocketAddr,
}

/// What the reader did with one packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketOutcome {
    /// Did not parse; dropped.
    Malformed,
    /// Failed a consensus rule; dropped.
    Invalid(ValidationError),
    /// Seen recently; only the reply was queued.
    Cached,
    /// Validated and queued for storage with this weight.
    Accepted {
        /// Weight magnitude of the transaction hash.
        weight: usize,
    },
}

/// Shared receiver state.
pub struct GossipReceiver {
    cfg: GossipConfig,
    store: Arc<dyn Store>,
    metrics: Arc<Metrics>,
    cache: Mutex<RecentCache<Digest, TxHash>>,
    store_queue: WeightQueue<StoreItem>,
    reply_queue: WeightQueue<ReplyItem>,
    closed: watch::Sender<bool>,
}

impl GossipReceiver {
    /// Create receiver state without binding a socket.
    pub fn new(cfg: GossipConfig, store: Arc<dyn Store>, metrics: Arc<Metrics>) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            cache: Mutex::new(RecentCache::new(cfg.cache_capacity)),
            store_queue: WeightQueue::new(cfg.queue_capacity),
            reply_queue: WeightQueue::new(cfg.queue_capacity),
            cfg,
            store,
            metrics,
            closed,
        }
    }

    /// Settings.
    pub fn config(&self) -> &GossipConfig {
        &self.cfg
    }

    /// Transactions awaiting storage.
    pub fn store_queue(&self) -> &WeightQueue<StoreItem> {
        &self.store_queue
    }

    /// Requests awaiting a reply.
    pub fn reply_queue(&self) -> &WeightQueue<ReplyItem> {
        &self.reply_queue
    }

    /// True once closed.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Set the closed flag and wake every blocked queue call.
    pub fn close(&self) {
        self.closed.send_replace(true);
        self.store_queue.close();
        self.reply_queue.close();
    }

    /// Resolves once closed.
    pub async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        let _ = rx.wait_for(|c| *c).await;
    }

    /// Process one inbound packet.
    ///
    /// Fails only when a queue was closed while waiting for room.
    pub async fn handle_packet(
        &self,
        packet: &[u8],
        sender: SocketAddr,
    ) -> Result<PacketOutcome, QueueError> {
        self.metrics.packets_received_total.inc();

        let message = match Message::from_packet(packet) {
            Ok(m) => m,
            Err(e) => {
                self.metrics.packets_malformed_total.inc();
                trace!(%sender, len = packet.len(), error = %e, "dropping malformed packet");
                return Ok(PacketOutcome::Malformed);
            }
        };

        let digest = *message.digest();
        let cached = self.cache.lock().get(&digest).copied();

        let (tx_hash, outcome) = match cached {
            Some(tx_hash) => {
                self.metrics.tx_cache_hits_total.inc();
                (tx_hash, PacketOutcome::Cached)
            }
            None => {
                if let Err(e) = message.validate(self.cfg.min_weight_magnitude) {
                    self.metrics.tx_invalid_total.inc();
                    debug!(%sender, error = %e, "dropping invalid transaction");
                    return Ok(PacketOutcome::Invalid(e));
                }
                let tx_hash = *message.hash();
                // Re-check under the lock: a concurrent reader may have won.
                let inserted = self.cache.lock().insert_if_absent(digest, tx_hash);
                let outcome = if inserted {
                    PacketOutcome::Accepted {
                        weight: tx_hash.weight_magnitude(),
                    }
                } else {
                    PacketOutcome::Cached
                };
                (tx_hash, outcome)
            }
        };

        let requested = match message.trailer_hash() {
            Some(h) if h != tx_hash => h,
            _ => TxHash::ZERO,
        };

        if let PacketOutcome::Accepted { weight } = outcome {
            self.store_queue
                .push(StoreItem { message, sender }, weight as i64)
                .await?;
            self.metrics
                .store_queue_depth
                .set(self.store_queue.len() as i64);
        }

        self.reply_queue
            .push(
                ReplyItem { requested, sender },
                requested.weight_magnitude() as i64,
            )
            .await?;
        self.metrics
            .reply_queue_depth
            .set(self.reply_queue.len() as i64);

        Ok(outcome)
    }

    /// Look up a stored transaction by hash.
    pub fn lookup(&self, tx_hash: &TxHash) -> Result<Option<Message>, StoreError> {
        let Some(bytes) = self.store.read(Bucket::Transaction, &tx_hash.to_key_bytes())? else {
            return Ok(None);
        };
        match Message::from_tx_bytes(&bytes) {
            Ok(m) => Ok(Some(m)),
            Err(e) => {
                warn!(hash = %tx_hash, error = %e, "stored transaction does not parse");
                Ok(None)
            }
        }
    }

    async fn relay(&self, socket: &UdpSocket, message: &Message, from: SocketAddr) {
        if self.cfg.neighbors.is_empty() {
            return;
        }
        let packet = message.to_packet(message.hash());
        for &neighbor in self.cfg.neighbors.iter().filter(|&&n| n != from) {
            match socket.send_to(&packet, neighbor).await {
                Ok(_) => self.metrics.regossip_sent_total.inc(),
                Err(e) => warn!(%neighbor, error = %e, "relay failed"),
            }
        }
    }

    async fn reply(&self, socket: &UdpSocket, item: ReplyItem) -> Result<(), StoreError> {
        if item.requested.is_zero() {
            // Tip selection needs ledger state, which the core does not track.
            self.metrics.tip_requests_total.inc();
            trace!(sender = %item.sender, "random tip request");
            return Ok(());
        }
        let Some(message) = self.lookup(&item.requested)? else {
            trace!(hash = %item.requested, "requested transaction unknown");
            return Ok(());
        };
        let packet = message.to_packet(message.hash());
        match socket.send_to(&packet, item.sender).await {
            Ok(_) => self.metrics.replies_sent_total.inc(),
            Err(e) => warn!(sender = %item.sender, error = %e, "reply failed"),
        }
        Ok(())
    }
}

/// Running receiver tasks.
pub struct GossipHandle {
    receiver: Arc<GossipReceiver>,
    local_addr: SocketAddr,
    tasks: Vec<JoinHandle<()>>,
}

impl GossipHandle {
    /// Bound UDP address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Shared receiver state.
    pub fn receiver(&self) -> &Arc<GossipReceiver> {
        &self.receiver
    }

    /// Close the receiver and wait for all three tasks to exit.
    pub async fn shutdown(self) {
        self.receiver.close();
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "gossip task failed");
            }
        }
        info!("gossip receiver stopped");
    }
}

/// Bind the UDP socket and start the reader, storage and reply tasks.
pub async fn spawn_gossip(
    cfg: GossipConfig,
    store: Arc<dyn Store>,
    metrics: Arc<Metrics>,
) -> Result<GossipHandle, GossipError> {
    let socket = UdpSocket::bind(cfg.bind_addr)
        .await
        .map_err(|_| GossipError::Bind)?;
    let local_addr = socket.local_addr().map_err(|_| GossipError::Io)?;
    info!(addr = %local_addr, mwm = cfg.min_weight_magnitude, "listening on udp");

    let socket = Arc::new(socket);
    let receiver = Arc::new(GossipReceiver::new(cfg, store, metrics));

    let tasks = vec![
        tokio::spawn(read_loop(receiver.clone(), socket.clone())),
        tokio::spawn(storage_loop(receiver.clone(), socket.clone())),
        tokio::spawn(reply_loop(receiver.clone(), socket)),
    ];

    Ok(GossipHandle {
        receiver,
        local_addr,
        tasks,
    })
}

async fn read_loop(receiver: Arc<GossipReceiver>, socket: Arc<UdpSocket>) {
    let mut buf = vec![0u8; READ_BUFFER_BYTES];
    loop {
        let (n, sender) = tokio::select! {
            _ = receiver.closed() => break,
            res = socket.recv_from(&mut buf) => match res {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = %e, "udp read failed");
                    receiver.close();
                    break;
                }
            },
        };
        if receiver.handle_packet(&buf[..n], sender).await.is_err() {
            break;
        }
    }
    info!("udp reader stopped");
}

async fn storage_loop(receiver: Arc<GossipReceiver>, socket: Arc<UdpSocket>) {
    while !receiver.is_closed() {
        let Ok(item) = receiver.store_queue.pop().await else {
            break;
        };
        receiver
            .metrics
            .store_queue_depth
            .set(receiver.store_queue.len() as i64);

        match item.message.store(receiver.store.as_ref()) {
            Ok(tx_hash) => {
                receiver.metrics.tx_stored_total.inc();
                debug!(hash = %tx_hash, sender = %item.sender, "transaction stored");
                receiver.relay(&socket, &item.message, item.sender).await;
            }
            Err(StoreTxError::AlreadyExists) => {
                receiver.metrics.tx_duplicate_total.inc();
                debug!(hash = %item.message.hash(), "transaction already stored");
            }
            Err(StoreTxError::Store(StoreError::Closed)) => {
                warn!("store closed");
                receiver.close();
                break;
            }
            Err(e) => {
                receiver.metrics.store_errors_total.inc();
                warn!(error = %e, "transaction not stored");
            }
        }
    }
    info!("storage loop stopped");
}

async fn reply_loop(receiver: Arc<GossipReceiver>, socket: Arc<UdpSocket>) {
    while !receiver.is_closed() {
        let Ok(item) = receiver.reply_queue.pop().await else {
            break;
        };
        receiver
            .metrics
            .reply_queue_depth
            .set(receiver.reply_queue.len() as i64);

        match receiver.reply(&socket, item).await {
            Ok(()) => {}
            Err(StoreError::Closed) => {
                warn!("store closed");
                receiver.close();
                break;
            }
            Err(e) => {
                receiver.metrics.store_errors_total.inc();
                warn!(error = %e, "reply lookup failed");
            }
        }
    }
    info!("reply loop stopped");
}
