//! Top-level invoke/query façade.
//!
//! Every path out of [`TransactionService::invoke`] and
//! [`TransactionService::query`] ends in an [`Envelope`]; no error escapes.

use std::time::Instant;

use serde_json::Value;

use crate::gateway::dispatch::{TransactionDispatcher, TransactionKind};
use crate::gateway::envelope::Envelope;
use crate::gateway::session::SessionManager;
use crate::gateway::types::{GatewayResult, InvocationRequest};
use crate::observability::metrics;

/// Opens a session, dispatches one call and normalizes the outcome.
#[derive(Debug, Clone)]
pub struct TransactionService {
    sessions: SessionManager,
    dispatcher: TransactionDispatcher,
}

impl TransactionService {
    pub fn new(sessions: SessionManager, dispatcher: TransactionDispatcher) -> Self {
        Self {
            sessions,
            dispatcher,
        }
    }

    /// Submit a state-mutating function.
    pub async fn invoke(
        &self,
        channel: &str,
        contract: &str,
        function: &str,
        args: Vec<String>,
        identity: &str,
        org: &str,
    ) -> Envelope {
        let request = InvocationRequest::new(channel, contract, function, args, identity, org);
        self.execute(TransactionKind::Submit, &request).await
    }

    /// Evaluate a read-only function.
    pub async fn query(
        &self,
        channel: &str,
        contract: &str,
        args: Vec<String>,
        function: &str,
        identity: &str,
        org: &str,
    ) -> Envelope {
        let request = InvocationRequest::new(channel, contract, function, args, identity, org);
        self.execute(TransactionKind::Evaluate, &request).await
    }

    /// Run `request` through the entry point for `kind`.
    pub async fn execute(&self, kind: TransactionKind, request: &InvocationRequest) -> Envelope {
        let start = Instant::now();
        let outcome = self.run(kind, request).await;

        let label = if outcome.is_ok() { "ok" } else { "error" };
        metrics::record_transaction(&request.function, kind.as_str(), label, start);

        let envelope = Envelope::from_outcome(outcome);
        if envelope.is_error() {
            tracing::warn!(
                function = %request.function,
                kind = %kind,
                identity = %request.identity,
                org = %request.org,
                error = envelope.error_data.as_deref().unwrap_or_default(),
                "Transaction failed"
            );
        } else {
            tracing::info!(
                function = %request.function,
                kind = %kind,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Transaction completed"
            );
        }
        envelope
    }

    async fn run(&self, kind: TransactionKind, request: &InvocationRequest) -> GatewayResult<Option<Value>> {
        let Some(spec) = self.dispatcher.prepare(kind, &request.function, &request.args)? else {
            return Ok(None);
        };

        let dispatcher = &self.dispatcher;
        let args = &request.args;
        self.sessions
            .with_session(request, |contract| async move {
                dispatcher.execute(contract.as_ref(), &spec, args).await.map(Some)
            })
            .await
    }
}
