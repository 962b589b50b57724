//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware)
//!     → middleware.rs (error envelopes, request metrics)
//!     → request.rs (request ID, caller headers, args decoding)
//!     → handlers.rs (invoke / query / health)
//!     → TransactionService
//!     → Envelope as JSON
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;
pub mod tls;

pub use request::{Caller, X_FABRIC_ORG, X_FABRIC_USER, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
