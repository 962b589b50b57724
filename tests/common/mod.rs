//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use fabric_dispatch::gateway::{
    ConnectOptions, ConnectionProfile, ContractHandle, ContractRegistry, FileSystemWallet, GatewayError,
    GatewayResult, Identity, IdentityRegistrar, NetworkConnection, NetworkConnector, OrgDirectory, OrgEntry,
    SessionManager, TransactionDispatcher, TransactionService,
};

/// What the fake contract answers with.
#[derive(Clone)]
pub enum Reply {
    Payload(&'static str),
    Fail(&'static str),
    Timeout,
    Hang,
}

/// Counts connections, releases and contract calls.
#[derive(Default)]
pub struct Counters {
    pub connects: AtomicUsize,
    pub closes: AtomicUsize,
    pub calls: AtomicUsize,
    pub registrations: AtomicUsize,
}

impl Counters {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }
}

struct FakeContract {
    reply: Reply,
    counters: Arc<Counters>,
}

impl FakeContract {
    async fn answer(&self, function: &str) -> GatewayResult<Bytes> {
        self.counters.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Payload(p) => Ok(Bytes::from_static(p.as_bytes())),
            Reply::Fail(msg) => Err(GatewayError::Invocation(msg.to_string())),
            Reply::Timeout => Err(GatewayError::Timeout {
                function: function.to_string(),
                timeout_secs: 100,
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(GatewayError::Invocation("unreachable".into()))
            }
        }
    }
}

#[async_trait]
impl ContractHandle for FakeContract {
    async fn submit_transaction(&self, function: &str, _args: &[String]) -> GatewayResult<Bytes> {
        self.answer(function).await
    }

    async fn evaluate_transaction(&self, function: &str, _args: &[String]) -> GatewayResult<Bytes> {
        self.answer(function).await
    }
}

struct FakeConnection {
    reply: Reply,
    slow_lookup: bool,
    counters: Arc<Counters>,
}

#[async_trait]
impl NetworkConnection for FakeConnection {
    async fn contract(&self, _channel: &str, _contract: &str) -> GatewayResult<Arc<dyn ContractHandle>> {
        if self.slow_lookup {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(Arc::new(FakeContract {
            reply: self.reply.clone(),
            counters: self.counters.clone(),
        }))
    }

    async fn close(&self) -> GatewayResult<()> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Connector whose connections answer every call with `reply`.
pub struct FakeConnector {
    pub reply: Reply,
    pub refuse: bool,
    pub slow_lookup: bool,
    pub counters: Arc<Counters>,
}

#[async_trait]
impl NetworkConnector for FakeConnector {
    async fn connect(
        &self,
        _profile: &ConnectionProfile,
        _label: &str,
        _identity: &Identity,
        _options: &ConnectOptions,
    ) -> GatewayResult<Arc<dyn NetworkConnection>> {
        if self.refuse {
            return Err(GatewayError::Connection("failed to connect to peer0.org1.example.com:7051".into()));
        }
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeConnection {
            reply: self.reply.clone(),
            slow_lookup: self.slow_lookup,
            counters: self.counters.clone(),
        }))
    }
}

/// Registrar that optionally stores the identity it was asked for.
pub struct FakeRegistrar {
    pub store: bool,
    pub wallet: std::path::PathBuf,
    pub counters: Arc<Counters>,
}

#[async_trait]
impl IdentityRegistrar for FakeRegistrar {
    async fn register(&self, identity: &str, _org: &str, _is_admin: bool) -> GatewayResult<()> {
        self.counters.registrations.fetch_add(1, Ordering::SeqCst);
        if self.store {
            let wallet = FileSystemWallet::open(&self.wallet).await?;
            wallet.put(identity, &Identity::x509("Org1MSP", "cert", "key")).await?;
        }
        Ok(())
    }
}

/// Builder for a service wired to the fakes.
pub struct Harness {
    pub counters: Arc<Counters>,
    pub registry: ContractRegistry,
    pub reply: Reply,
    pub refuse: bool,
    pub slow_lookup: bool,
    pub registrar_stores: bool,
}

impl Harness {
    pub fn new(reply: Reply) -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            registry: ContractRegistry::car_contract(),
            reply,
            refuse: false,
            slow_lookup: false,
            registrar_stores: true,
        }
    }

    /// Service for org "Org1" whose wallet lives in `wallet` and holds "user1".
    pub async fn service(&self, wallet: &Path) -> TransactionService {
        FileSystemWallet::open(wallet)
            .await
            .unwrap()
            .put("user1", &Identity::x509("Org1MSP", "cert", "key"))
            .await
            .unwrap();

        let mut directory = OrgDirectory::new();
        directory.insert(OrgEntry {
            name: "Org1".into(),
            msp_id: "Org1MSP".into(),
            profile: ConnectionProfile::default(),
            wallet_path: wallet.to_path_buf(),
        });

        let sessions = SessionManager::new(
            Arc::new(directory),
            Arc::new(FakeConnector {
                reply: self.reply.clone(),
                refuse: self.refuse,
                slow_lookup: self.slow_lookup,
                counters: self.counters.clone(),
            }),
            Arc::new(FakeRegistrar {
                store: self.registrar_stores,
                wallet: wallet.to_path_buf(),
                counters: self.counters.clone(),
            }),
            ConnectOptions::default(),
        );
        TransactionService::new(sessions, TransactionDispatcher::new(self.registry.clone()))
    }
}

/// Connection profile for `org` with a single peer.
pub fn profile_json(org: &str) -> String {
    let lower = org.to_lowercase();
    serde_json::json!({
        "name": format!("test-network-{}", lower),
        "version": "1.0.0",
        "client": { "organization": org },
        "organizations": {
            org: {
                "mspid": format!("{}MSP", org),
                "peers": [format!("peer0.{}.example.com", lower)],
                "certificateAuthorities": [format!("ca.{}.example.com", lower)]
            }
        },
        "peers": {
            format!("peer0.{}.example.com", lower): {
                "url": format!("grpcs://peer0.{}.example.com:7051", lower),
                "grpcOptions": { "ssl-target-name-override": format!("peer0.{}.example.com", lower) }
            }
        },
        "certificateAuthorities": {
            format!("ca.{}.example.com", lower): {
                "url": format!("https://ca.{}.example.com:7054", lower),
                "caName": format!("ca-{}", lower)
            }
        }
    })
    .to_string()
}

/// Devnet-backed config for Org1 and Org2 with profiles and wallets under `dir`.
pub fn devnet_config(dir: &Path) -> fabric_dispatch::GatewayConfig {
    let mut config = fabric_dispatch::GatewayConfig::default();
    for org in ["Org1", "Org2"] {
        let profile = dir.join(format!("connection-{}.json", org.to_lowercase()));
        std::fs::write(&profile, profile_json(org)).unwrap();
        config.organizations.push(fabric_dispatch::config::OrganizationConfig {
            name: org.to_string(),
            msp_id: None,
            connection_profile: profile,
            wallet_path: dir.join(format!("wallet-{}", org.to_lowercase())),
        });
    }
    config
}
