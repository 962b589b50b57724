//! Request types, connect options and error definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while dispatching a contract call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No connection profile is registered for the organization.
    #[error("connection profile not found for organization {0}")]
    ProfileNotFound(String),

    /// A connection profile exists but cannot be used.
    #[error("invalid connection profile for {org}: {reason}")]
    InvalidProfile { org: String, reason: String },

    /// The identity is absent from the organization's wallet.
    #[error("identity {identity} does not exist in the wallet for {org}")]
    UnknownIdentity { identity: String, org: String },

    /// Opening or closing the gateway connection failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// The ledger call itself failed (endorsement, commit, contract error).
    #[error("{0}")]
    Invocation(String),

    /// The commit did not complete within the commit strategy's timeout.
    #[error("transaction {function} timed out after {timeout_secs} seconds waiting for commit")]
    Timeout { function: String, timeout_secs: u64 },

    /// An evaluate result could not be decoded as JSON.
    #[error("malformed result from {function}: {reason}")]
    MalformedResult { function: String, reason: String },

    /// The function is not registered for this entry point.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of positional arguments.
    #[error("{function} expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// Wallet could not be read or written.
    #[error("wallet error: {0}")]
    Wallet(String),

    /// Identity registration fallback failed.
    #[error("failed to register identity {identity}: {reason}")]
    Registration { identity: String, reason: String },
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// A single contract call, built per request from upstream input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub channel: String,
    pub contract: String,
    pub function: String,
    pub args: Vec<String>,
    pub identity: String,
    pub org: String,
}

impl InvocationRequest {
    pub fn new(
        channel: impl Into<String>,
        contract: impl Into<String>,
        function: impl Into<String>,
        args: Vec<String>,
        identity: impl Into<String>,
        org: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            contract: contract.into(),
            function: function.into(),
            args,
            identity: identity.into(),
            org: org.into(),
        }
    }
}

/// Which peers must report the commit before a submit returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommitScope {
    /// Any peer in the calling organization.
    MspScopeAnyForTx,
    /// All peers in the calling organization.
    MspScopeAllForTx,
    /// Any peer in the network.
    #[default]
    NetworkScopeAnyForTx,
    /// All peers in the network.
    NetworkScopeAllForTx,
    /// Return as soon as the transaction is sent to the orderer.
    None,
}

/// Commit strategy handed to the connector with every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitStrategy {
    pub scope: CommitScope,
    pub commit_timeout: Duration,
}

impl Default for CommitStrategy {
    fn default() -> Self {
        Self {
            scope: CommitScope::NetworkScopeAnyForTx,
            commit_timeout: Duration::from_secs(100),
        }
    }
}

/// Options used when opening a gateway connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions {
    pub discovery_enabled: bool,
    /// Rewrite discovered peer hosts to localhost (docker-compose networks).
    pub as_localhost: bool,
    pub commit: CommitStrategy,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            discovery_enabled: true,
            as_localhost: true,
            commit: CommitStrategy::default(),
        }
    }
}
