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

//! Tangle node core - validating and relaying ternary transactions.
//!
//! This crate provides:
//! - A balanced-ternary codec (bytes <-> trits <-> trytes)
//! - The Curl sponge permutation and transaction hashing
//! - A fixed-layout transaction view with consensus validity checks
//! - A bounded, weight-ordered dispatch queue
//! - The UDP gossip receiver with deduplication, storage and reply scheduling
//! - Monitoring via Prometheus metrics and structured logging

/// Core protocol primitives (codec, hashing, messages, queue, store, config).
pub mod core;
/// Observability (metrics exposition).
pub mod monitoring;
/// Gossip networking (UDP receiver, recency cache).
pub mod networking;
