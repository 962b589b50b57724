//! Startup orchestration.
//!
//! # Responsibilities
//! - Load organization profiles into the read-only directory
//! - Build the registry, devnet connector and transaction service
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::devnet::{DevnetConnector, DevnetNetwork, DevnetRegistrar};
use crate::gateway::{
    ContractRegistry, GatewayResult, OrgDirectory, SessionManager, TransactionDispatcher, TransactionService,
};

/// Contract registry with configured extras and unknown-function policy.
pub fn build_registry(config: &GatewayConfig) -> ContractRegistry {
    let mut registry = ContractRegistry::car_contract();
    registry.set_unknown_policy(config.dispatch.unknown_function);
    for function in &config.dispatch.functions {
        registry.register(function.to_spec());
    }
    registry
}

/// Build the transaction service against the in-process devnet.
pub fn build_devnet_service(config: &GatewayConfig) -> GatewayResult<TransactionService> {
    let directory = Arc::new(OrgDirectory::from_config(&config.organizations)?);
    if directory.is_empty() {
        tracing::warn!("No organizations configured; every call will fail with a missing profile");
    }

    let network = Arc::new(DevnetNetwork::new(&config.devnet));
    let sessions = SessionManager::new(
        directory.clone(),
        Arc::new(DevnetConnector::new(network)),
        Arc::new(DevnetRegistrar::new(directory)),
        config.network.connect_options(),
    );

    let registry = build_registry(config);
    tracing::info!(
        functions = registry.len(),
        unknown_function = ?registry.unknown_policy(),
        channels = ?config.devnet.channels,
        "Transaction service initialized"
    );

    Ok(TransactionService::new(sessions, TransactionDispatcher::new(registry)))
}
