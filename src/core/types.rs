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

//! Node configuration (TOML file plus environment overrides).
//!
//! ```text
//! udp_addr = "0.0.0.0:15200"
//! http_addr = "0.0.0.0:15100"
//! db_path = "tangle.db"
//! min_weight_magnitude = 14
//! neighbors = ["10.0.0.2:15200"]
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Minimum weight magnitude on mainnet.
pub const MAINNET_MIN_WEIGHT_MAGNITUDE: usize = 14;
/// Minimum weight magnitude on testnet.
pub const TESTNET_MIN_WEIGHT_MAGNITUDE: usize = 9;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config")]
    Read,
    #[error("parse config")]
    Parse,
    #[error("invalid address: {0}")]
    InvalidAddr(String),
    #[error("invalid value for {0}")]
    InvalidEnv(&'static str),
}

/// Node configuration root.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// UDP gossip listen address.
    pub udp_addr: String,
    /// TCP gossip listen address (reserved; the core does not open it).
    pub tcp_addr: String,
    /// Metrics exposition listen address.
    pub http_addr: String,
    /// sled database directory.
    pub db_path: String,
    /// Debug-level logging.
    pub debug: bool,
    /// JSON log lines instead of compact text.
    pub log_json: bool,
    /// Testnet defaults.
    pub testnet: bool,
    /// Static gossip neighbors (`ip:port`).
    pub neighbors: Vec<String>,
    /// Minimum accepted weight magnitude; network default when unset.
    pub min_weight_magnitude: Option<usize>,
    /// Capacity of each dispatch queue.
    pub queue_capacity: usize,
    /// Capacity of the recency cache.
    pub cache_capacity: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            udp_addr: "0.0.0.0:15200".to_string(),
            tcp_addr: "0.0.0.0:15300".to_string(),
            http_addr: "0.0.0.0:15100".to_string(),
            db_path: "tangle.db".to_string(),
            debug: false,
            log_json: false,
            testnet: false,
            neighbors: Vec::new(),
            min_weight_magnitude: None,
            queue_capacity: 1024,
            cache_capacity: 1024,
        }
    }
}

impl NodeConfig {
    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|_| ConfigError::Parse)
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|_| ConfigError::Read)?;
        Self::from_toml(&text)
    }

    /// Apply `TANGLE_*` environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TANGLE_UDP_ADDR") {
            self.udp_addr = v;
        }
        if let Some(v) = lookup("TANGLE_HTTP_ADDR") {
            self.http_addr = v;
        }
        if let Some(v) = lookup("TANGLE_DB_PATH") {
            self.db_path = v;
        }
        if let Some(v) = lookup("TANGLE_MIN_WEIGHT_MAGNITUDE") {
            let mwm = v
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidEnv("TANGLE_MIN_WEIGHT_MAGNITUDE"))?;
            self.min_weight_magnitude = Some(mwm);
        }
        if let Some(v) = lookup("TANGLE_DEBUG") {
            self.debug = matches!(v.trim(), "1" | "true" | "yes");
        }
        if let Some(v) = lookup("TANGLE_NEIGHBORS") {
            self.neighbors = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(())
    }

    /// Configured threshold, or the network default.
    pub fn effective_min_weight_magnitude(&self) -> usize {
        self.min_weight_magnitude.unwrap_or(if self.testnet {
            TESTNET_MIN_WEIGHT_MAGNITUDE
        } else {
            MAINNET_MIN_WEIGHT_MAGNITUDE
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn toml_overrides_defaults() {
        let cfg = NodeConfig::from_toml(
            "udp_addr = \"127.0.0.1:1\"\ntestnet = true\nneighbors = [\"10.0.0.2:15200\"]\n",
        )
        .unwrap();
        assert_eq!(cfg.udp_addr, "127.0.0.1:1");
        assert_eq!(cfg.neighbors.len(), 1);
        assert_eq!(cfg.queue_capacity, 1024);
        assert_eq!(cfg.effective_min_weight_magnitude(), TESTNET_MIN_WEIGHT_MAGNITUDE);
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("TANGLE_MIN_WEIGHT_MAGNITUDE", "3"),
            ("TANGLE_NEIGHBORS", "1.2.3.4:5, ,6.7.8.9:10"),
            ("TANGLE_DEBUG", "true"),
        ]
        .into_iter()
        .collect();
        let mut cfg = NodeConfig::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.effective_min_weight_magnitude(), 3);
        assert_eq!(cfg.neighbors, vec!["1.2.3.4:5", "6.7.8.9:10"]);
        assert!(cfg.debug);
    }

    #[test]
    fn bad_env_value_is_rejected() {
        let mut cfg = NodeConfig::default();
        let err = cfg
            .apply_env(|k| (k == "TANGLE_MIN_WEIGHT_MAGNITUDE").then(|| "x".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv(_)));
        assert_eq!(cfg.effective_min_weight_magnitude(), MAINNET_MIN_WEIGHT_MAGNITUDE);
    }
}
