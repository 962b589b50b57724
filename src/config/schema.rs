//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway
//! service. All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gateway::dispatch::{FunctionSpec, TransactionKind, UnknownFunctionPolicy};
use crate::gateway::types::{CommitScope, CommitStrategy, ConnectOptions};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Gateway connection options.
    pub network: NetworkConfig,

    /// Organizations this service can act for.
    pub organizations: Vec<OrganizationConfig>,

    /// Contract function registry settings.
    pub dispatch: DispatchConfig,

    /// In-process development network.
    pub devnet: DevnetConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
            tls: None,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 120 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Gateway connection options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Use service discovery to find endorsing peers.
    pub discovery_enabled: bool,

    /// Resolve discovered hosts on localhost.
    pub as_localhost: bool,

    /// Which peers must report a commit.
    pub commit_strategy: CommitScope,

    /// Commit wait limit in seconds.
    pub commit_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            discovery_enabled: true,
            as_localhost: true,
            commit_strategy: CommitScope::NetworkScopeAnyForTx,
            commit_timeout_secs: 100,
        }
    }
}

impl NetworkConfig {
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            discovery_enabled: self.discovery_enabled,
            as_localhost: self.as_localhost,
            commit: CommitStrategy {
                scope: self.commit_strategy,
                commit_timeout: Duration::from_secs(self.commit_timeout_secs),
            },
        }
    }
}

/// One organization's profile and wallet.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrganizationConfig {
    /// Organization name used by callers (e.g. "Org1").
    pub name: String,

    /// MSP id; taken from the connection profile when omitted.
    #[serde(default)]
    pub msp_id: Option<String>,

    /// Path to the connection profile JSON.
    pub connection_profile: PathBuf,

    /// Wallet directory.
    pub wallet_path: PathBuf,
}

/// Contract function registry settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// What to do with unregistered function names.
    pub unknown_function: UnknownFunctionPolicy,

    /// Extra functions on top of the car contract.
    pub functions: Vec<FunctionConfig>,
}

/// A function registered from config.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FunctionConfig {
    pub name: String,
    pub arity: usize,
    /// Submit (true) or evaluate (false).
    #[serde(default = "default_mutates")]
    pub mutates: bool,
}

fn default_mutates() -> bool {
    true
}

impl FunctionConfig {
    pub fn to_spec(&self) -> FunctionSpec {
        FunctionSpec {
            name: self.name.clone(),
            arity: self.arity,
            kind: if self.mutates {
                TransactionKind::Submit
            } else {
                TransactionKind::Evaluate
            },
        }
    }
}

/// In-process development network.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevnetConfig {
    /// Channels that exist on the devnet.
    pub channels: Vec<String>,

    /// Contracts installed on every channel.
    pub contracts: Vec<String>,

    /// Simulated ordering + commit delay in milliseconds.
    pub commit_latency_ms: u64,
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self {
            channels: vec!["mychannel".to_string()],
            contracts: vec!["carcc".to_string()],
            commit_latency_ms: 0,
        }
    }
}
