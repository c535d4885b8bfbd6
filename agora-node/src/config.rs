// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! The node's configuration tree (§6). Loaded from YAML via `serde_yaml`;
//! every leaf has a default so a minimal file only needs to override what
//! it cares about, matching the teacher's `Config`/`*Config` split in
//! `botho/src/config.rs`.

use agora_common::ResponderId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub flash: FlashConfig,
    #[serde(default)]
    pub banman: BanmanConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    /// Peer addresses to dial on startup, in `host:port` form.
    #[serde(default)]
    pub network: Vec<ResponderId>,
    #[serde(default)]
    pub dns: Vec<String>,
    #[serde(default)]
    pub logging: Vec<String>,
    #[serde(default)]
    pub event_handlers: EventHandlersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub min_listeners: u32,
    pub max_listeners: u32,
    pub retry_delay: u64,
    pub max_retries: u32,
    pub timeout: u64,
    pub data_dir: String,
    pub stats_listening_port: u16,
    pub block_time_offset_tolerance_secs: u64,
    pub network_discovery_interval_secs: u64,
    pub block_catchup_interval_secs: u64,
    pub relay_tx_max_num: u32,
    pub relay_tx_interval_secs: u64,
    pub relay_tx_min_fee: u64,
    pub relay_tx_cache_exp_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            min_listeners: 2,
            max_listeners: 10,
            retry_delay: 3,
            max_retries: 5,
            timeout: 5,
            data_dir: ".agora".to_string(),
            stats_listening_port: 9090,
            block_time_offset_tolerance_secs: 60,
            network_discovery_interval_secs: 5,
            block_catchup_interval_secs: 5,
            relay_tx_max_num: 7,
            relay_tx_interval_secs: 10,
            relay_tx_min_fee: 0,
            relay_tx_cache_exp_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub enabled: bool,
    pub seed: Option<String>,
    pub registry_address: Option<ResponderId>,
    pub addresses_to_register: Vec<ResponderId>,
    pub recurring_enrollment: bool,
    pub preimage_reveal_interval: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    pub enabled: bool,
    pub timeout: u64,
    pub seed: u64,
    pub listener_address: Option<String>,
    pub min_funding: u64,
    pub max_funding: u64,
    pub min_settle_time: u64,
    pub max_settle_time: u64,
    pub max_retry_time: u64,
}

impl Default for FlashConfig {
    fn default() -> Self {
        FlashConfig {
            enabled: false,
            timeout: 30,
            seed: 0,
            listener_address: None,
            min_funding: 0,
            max_funding: u64::MAX,
            min_settle_time: 6,
            max_settle_time: 144,
            max_retry_time: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BanmanConfig {
    pub max_failed_requests: u32,
    pub ban_duration: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub enabled: bool,
    pub address: Option<String>,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventHandlersConfig {
    pub block_externalized: Option<String>,
    pub preimage_received: Option<String>,
    pub transaction_received: Option<String>,
}

impl Config {
    pub fn from_yaml_str(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_fills_in_every_default() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.flash.min_settle_time, 6);
        assert_eq!(config.flash.max_settle_time, 144);
        assert_eq!(config.node.relay_tx_max_num, 7);
    }

    #[test]
    fn overridden_field_is_honored() {
        let config = Config::from_yaml_str("flash:\n  enabled: true\n  seed: 42\n").unwrap();
        assert!(config.flash.enabled);
        assert_eq!(config.flash.seed, 42);
        assert_eq!(config.flash.min_funding, 0);
    }
}
