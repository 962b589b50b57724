//! Gateway sessions and the network SDK seam.
//!
//! # Responsibilities
//! - Resolve the caller's identity before any connection is made
//! - Open a connection with the configured discovery and commit options
//! - Resolve the channel and contract handles
//! - Release the connection exactly once on every exit path
//!
//! # Design Decisions
//! - One session per request; sessions are never pooled or shared
//! - `Session::close` consumes the session; `Drop` schedules the close when a
//!   session is abandoned (e.g. the request future was cancelled)

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::gateway::profile::{ConnectionProfile, OrgDirectory};
use crate::gateway::types::{ConnectOptions, GatewayError, GatewayResult, InvocationRequest};
use crate::gateway::wallet::{FileSystemWallet, Identity, IdentityRegistrar};
use crate::observability::metrics;

/// A deployed contract on one channel.
#[async_trait]
pub trait ContractHandle: Send + Sync {
    /// Endorse, order and commit a transaction.
    async fn submit_transaction(&self, function: &str, args: &[String]) -> GatewayResult<Bytes>;

    /// Evaluate a transaction on a peer without ordering or commit.
    async fn evaluate_transaction(&self, function: &str, args: &[String]) -> GatewayResult<Bytes>;
}

/// An open gateway connection.
#[async_trait]
pub trait NetworkConnection: Send + Sync {
    /// Resolve `contract` deployed on `channel`.
    async fn contract(&self, channel: &str, contract: &str) -> GatewayResult<Arc<dyn ContractHandle>>;

    /// Disconnect from the network.
    async fn close(&self) -> GatewayResult<()>;
}

/// Entry point of the network SDK.
#[async_trait]
pub trait NetworkConnector: Send + Sync {
    async fn connect(
        &self,
        profile: &ConnectionProfile,
        label: &str,
        identity: &Identity,
        options: &ConnectOptions,
    ) -> GatewayResult<Arc<dyn NetworkConnection>>;
}

/// Owns an open connection from the moment `connect` returns. Dropping it
/// without `close` schedules the disconnect on the current runtime.
struct ConnectionGuard {
    connection: Option<Arc<dyn NetworkConnection>>,
    label: String,
    org: String,
}

impl ConnectionGuard {
    fn new(connection: Arc<dyn NetworkConnection>, label: &str, org: &str) -> Self {
        metrics::session_opened();
        Self {
            connection: Some(connection),
            label: label.to_string(),
            org: org.to_string(),
        }
    }

    async fn close(mut self) -> GatewayResult<()> {
        match self.connection.take() {
            Some(conn) => {
                metrics::session_closed();
                let result = conn.close().await;
                tracing::debug!(identity = %self.label, org = %self.org, ok = result.is_ok(), "Gateway disconnected");
                result
            }
            None => Ok(()),
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let Some(conn) = self.connection.take() else {
            return;
        };
        metrics::session_closed();
        tracing::warn!(identity = %self.label, org = %self.org, "Session abandoned, disconnecting in background");

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let label = std::mem::take(&mut self.label);
                handle.spawn(async move {
                    if let Err(e) = conn.close().await {
                        tracing::warn!(identity = %label, error = %e, "Background disconnect failed");
                    }
                });
            }
            Err(_) => tracing::error!(identity = %self.label, "No runtime available to disconnect abandoned session"),
        }
    }
}

/// An open connection bound to one identity and one contract.
pub struct Session {
    guard: ConnectionGuard,
    contract: Arc<dyn ContractHandle>,
}

impl Session {
    /// The resolved contract handle.
    pub fn contract(&self) -> Arc<dyn ContractHandle> {
        self.contract.clone()
    }

    /// Close the underlying connection.
    pub async fn close(self) -> GatewayResult<()> {
        self.guard.close().await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.guard.label)
            .field("org", &self.guard.org)
            .field("open", &self.guard.connection.is_some())
            .finish()
    }
}

/// Opens and releases sessions.
#[derive(Clone)]
pub struct SessionManager {
    directory: Arc<OrgDirectory>,
    connector: Arc<dyn NetworkConnector>,
    registrar: Arc<dyn IdentityRegistrar>,
    options: ConnectOptions,
}

impl SessionManager {
    pub fn new(
        directory: Arc<OrgDirectory>,
        connector: Arc<dyn NetworkConnector>,
        registrar: Arc<dyn IdentityRegistrar>,
        options: ConnectOptions,
    ) -> Self {
        Self {
            directory,
            connector,
            registrar,
            options,
        }
    }

    /// Load `label` from the org wallet, registering it once if missing.
    pub async fn resolve_identity(&self, label: &str, org: &str) -> GatewayResult<Identity> {
        let wallet_path = self.directory.wallet_location(org)?;
        let wallet = FileSystemWallet::open(wallet_path).await?;
        tracing::debug!(wallet = %wallet_path.display(), "Wallet path");

        if let Some(identity) = wallet.get(label).await? {
            return Ok(identity);
        }

        tracing::info!(
            identity = %label,
            org = %org,
            "Identity does not exist in the wallet, registering user"
        );
        self.registrar.register(label, org, true).await?;

        wallet
            .get(label)
            .await?
            .ok_or_else(|| GatewayError::UnknownIdentity {
                identity: label.to_string(),
                org: org.to_string(),
            })
    }

    /// Open a session for `request`'s identity, channel and contract.
    pub async fn open(&self, request: &InvocationRequest) -> GatewayResult<Session> {
        let profile = self.directory.connection_profile(&request.org)?;
        let identity = self.resolve_identity(&request.identity, &request.org).await?;

        let connection = self
            .connector
            .connect(profile, &request.identity, &identity, &self.options)
            .await?;
        let guard = ConnectionGuard::new(connection.clone(), &request.identity, &request.org);

        let contract = match connection.contract(&request.channel, &request.contract).await {
            Ok(c) => c,
            Err(e) => {
                if let Err(close_err) = guard.close().await {
                    tracing::warn!(error = %close_err, "Disconnect after failed contract lookup failed");
                }
                return Err(e);
            }
        };

        tracing::debug!(
            identity = %request.identity,
            org = %request.org,
            channel = %request.channel,
            contract = %request.contract,
            "Gateway connected"
        );

        Ok(Session { guard, contract })
    }

    /// Run `f` against an open session and close it afterwards, whatever `f`
    /// returns. A close failure is reported only when `f` succeeded.
    pub async fn with_session<T, F, Fut>(&self, request: &InvocationRequest, f: F) -> GatewayResult<T>
    where
        F: FnOnce(Arc<dyn ContractHandle>) -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        let session = self.open(request).await?;
        let outcome = f(session.contract()).await;
        let closed = session.close().await;

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Err(close_err)) => {
                tracing::warn!(error = %close_err, "Disconnect failed after transaction error");
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("organizations", &self.directory.len())
            .field("options", &self.options)
            .finish()
    }
}
