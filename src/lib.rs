//! Gateway service that dispatches contract calls to a permissioned ledger
//! network and answers with a uniform `{result, error, errorData}` envelope.

pub mod config;
pub mod devnet;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use gateway::{Envelope, TransactionService};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
