//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, envelope mapping, timeout, body limit)
//! - Serve plain TCP or TLS with graceful shutdown

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::gateway::TransactionService;
use crate::http::handlers::{health_handler, invoke_handler, query_handler};
use crate::http::middleware::envelope_responses;
use crate::http::tls::load_tls_config;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TransactionService>,
    pub organizations: usize,
}

/// HTTP front end of the gateway service.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig, service: Arc<TransactionService>) -> Self {
        let state = AppState {
            service,
            organizations: config.organizations.len(),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// `envelope_responses` sits outside the timeout so a timed-out call is
    /// still answered with an envelope. The body limit is enforced by the
    /// `Json` extractor, which keeps the response body type plain.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route(
                "/channels/{channel}/chaincodes/{chaincode}",
                get(query_handler).post(invoke_handler),
            )
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(from_fn(envelope_responses))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(DefaultBodyLimit::max(config.listener.max_body_bytes)),
            )
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS until `shutdown` fires.
    pub async fn run_tls(self, addr: SocketAddr, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let tls = self.config.listener.tls.clone().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "TLS is not configured")
        })?;
        let rustls = load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path)).await?;

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        tracing::info!(address = %addr, "HTTPS server starting");
        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}
