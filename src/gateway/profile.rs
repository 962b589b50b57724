//! Connection profiles and the per-organization directory.
//!
//! # Responsibilities
//! - Parse common connection profiles (peers, orderers, CAs, TLS material)
//! - Resolve an organization name to its profile, MSP id and wallet location
//! - Hold everything in a read-only cache built once at startup
//!
//! # Design Decisions
//! - Profiles are loaded and validated before the server binds
//! - The directory is shared via `Arc` and never mutated after startup

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::schema::OrganizationConfig;
use crate::gateway::types::{GatewayError, GatewayResult};

/// PEM material, inline or by path.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PemSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// A peer or orderer endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeEndpoint {
    pub url: String,
    #[serde(rename = "tlsCACerts", default)]
    pub tls_ca_certs: Option<PemSource>,
    #[serde(rename = "grpcOptions", default)]
    pub grpc_options: BTreeMap<String, serde_json::Value>,
}

/// A certificate authority endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaEndpoint {
    pub url: String,
    #[serde(rename = "caName", default)]
    pub ca_name: Option<String>,
    #[serde(rename = "tlsCACerts", default)]
    pub tls_ca_certs: Option<PemSource>,
}

/// Organization section of a connection profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OrganizationSection {
    pub mspid: String,
    #[serde(default)]
    pub peers: Vec<String>,
    #[serde(rename = "certificateAuthorities", default)]
    pub certificate_authorities: Vec<String>,
}

/// Client section of a connection profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClientSection {
    #[serde(default)]
    pub organization: String,
}

/// Common connection profile (JSON).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionProfile {
    pub name: String,
    pub version: String,
    pub client: ClientSection,
    pub organizations: BTreeMap<String, OrganizationSection>,
    pub peers: BTreeMap<String, NodeEndpoint>,
    pub orderers: BTreeMap<String, NodeEndpoint>,
    #[serde(rename = "certificateAuthorities")]
    pub certificate_authorities: BTreeMap<String, CaEndpoint>,
}

impl ConnectionProfile {
    /// Parse a profile from its JSON form.
    pub fn from_json(org: &str, json: &str) -> GatewayResult<Self> {
        serde_json::from_str(json).map_err(|e| GatewayError::InvalidProfile {
            org: org.to_string(),
            reason: e.to_string(),
        })
    }

    /// Load a profile from a JSON file.
    pub fn load(org: &str, path: &Path) -> GatewayResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| GatewayError::InvalidProfile {
            org: org.to_string(),
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json(org, &content)
    }

    /// Check that the profile has at least one peer and that every endpoint
    /// URL parses.
    pub fn validate(&self, org: &str) -> GatewayResult<()> {
        let invalid = |reason: String| GatewayError::InvalidProfile {
            org: org.to_string(),
            reason,
        };

        if self.peers.is_empty() {
            return Err(invalid("profile defines no peers".to_string()));
        }

        let endpoints = self
            .peers
            .iter()
            .chain(self.orderers.iter())
            .map(|(name, node)| (name, &node.url))
            .chain(self.certificate_authorities.iter().map(|(name, ca)| (name, &ca.url)));

        for (name, raw) in endpoints {
            Url::parse(raw).map_err(|e| invalid(format!("endpoint {} has invalid url '{}': {}", name, raw, e)))?;
        }
        Ok(())
    }

    /// Peer endpoints, optionally rewritten to resolve on localhost.
    pub fn peer_urls(&self, as_localhost: bool) -> Vec<Url> {
        self.peers
            .values()
            .filter_map(|node| Url::parse(&node.url).ok())
            .map(|mut url| {
                if as_localhost {
                    // set_host only fails for cannot-be-a-base urls, which grpc(s) urls are not
                    let _ = url.set_host(Some("localhost"));
                }
                url
            })
            .collect()
    }

    /// MSP id declared for `org` inside the profile, if any.
    pub fn msp_id(&self, org: &str) -> Option<&str> {
        self.organizations.get(org).map(|o| o.mspid.as_str())
    }
}

/// Everything resolved for one organization.
#[derive(Debug, Clone)]
pub struct OrgEntry {
    pub name: String,
    pub msp_id: String,
    pub profile: ConnectionProfile,
    pub wallet_path: PathBuf,
}

/// Read-only cache of organization profiles and wallet locations.
#[derive(Debug, Clone, Default)]
pub struct OrgDirectory {
    orgs: HashMap<String, OrgEntry>,
}

impl OrgDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every configured organization's profile from disk.
    pub fn from_config(orgs: &[OrganizationConfig]) -> GatewayResult<Self> {
        let mut directory = Self::new();
        for org in orgs {
            let profile = ConnectionProfile::load(&org.name, &org.connection_profile)?;
            profile.validate(&org.name)?;

            let msp_id = match &org.msp_id {
                Some(id) => id.clone(),
                None => profile
                    .msp_id(&org.name)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}MSP", org.name)),
            };

            tracing::info!(
                org = %org.name,
                msp_id = %msp_id,
                peers = profile.peers.len(),
                wallet = %org.wallet_path.display(),
                "Organization profile loaded"
            );

            directory.insert(OrgEntry {
                name: org.name.clone(),
                msp_id,
                profile,
                wallet_path: org.wallet_path.clone(),
            });
        }
        Ok(directory)
    }

    /// Register an organization.
    pub fn insert(&mut self, entry: OrgEntry) {
        self.orgs.insert(entry.name.clone(), entry);
    }

    pub fn get(&self, org: &str) -> GatewayResult<&OrgEntry> {
        self.orgs
            .get(org)
            .ok_or_else(|| GatewayError::ProfileNotFound(org.to_string()))
    }

    /// Connection profile for `org`.
    pub fn connection_profile(&self, org: &str) -> GatewayResult<&ConnectionProfile> {
        self.get(org).map(|e| &e.profile)
    }

    /// Wallet directory for `org`.
    pub fn wallet_location(&self, org: &str) -> GatewayResult<&Path> {
        self.get(org).map(|e| e.wallet_path.as_path())
    }

    pub fn len(&self) -> usize {
        self.orgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orgs.is_empty()
    }
}
