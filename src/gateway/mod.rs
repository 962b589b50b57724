//! Ledger gateway integration subsystem.
//!
//! # Data Flow
//! ```text
//! InvocationRequest (channel, contract, function, args, identity, org)
//!     → profile.rs (org → connection profile + wallet location)
//!     → wallet.rs (identity lookup, registration fallback)
//!     → session.rs (connect, resolve contract, close exactly once)
//!     → dispatch.rs (registry lookup, submit or evaluate, decode)
//!     → envelope.rs ({result, error, errorData})
//! ```
//!
//! # Security Constraints
//! - Private keys stay in the wallet files and are never logged
//! - Sessions are per request and never shared between callers

pub mod dispatch;
pub mod envelope;
pub mod profile;
pub mod service;
pub mod session;
pub mod types;
pub mod wallet;

pub use dispatch::{ContractRegistry, FunctionSpec, TransactionDispatcher, TransactionKind, UnknownFunctionPolicy};
pub use envelope::Envelope;
pub use profile::{ConnectionProfile, OrgDirectory, OrgEntry};
pub use service::TransactionService;
pub use session::{ContractHandle, NetworkConnection, NetworkConnector, Session, SessionManager};
pub use types::{CommitScope, CommitStrategy, ConnectOptions, GatewayError, GatewayResult, InvocationRequest};
pub use wallet::{FileSystemWallet, Identity, IdentityRegistrar};
