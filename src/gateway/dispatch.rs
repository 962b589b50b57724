//! Contract function registry and transaction dispatch.
//!
//! # Data Flow
//! ```text
//! function name + args
//!     → ContractRegistry (arity, submit/evaluate)
//!     → ContractHandle::submit_transaction | evaluate_transaction
//!     → payload decoding (UTF-8 string | JSON)
//! ```
//!
//! # Design Decisions
//! - Functions are data: adding one is a registry entry, not a new branch
//! - Exactly one attempt per call, SDK errors propagate unchanged

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gateway::session::ContractHandle;
use crate::gateway::types::{GatewayError, GatewayResult};

/// How a function reaches the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// State-mutating: endorsed, ordered and committed.
    Submit,
    /// Read-only: evaluated on a peer.
    Evaluate,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Evaluate => "evaluate",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a function name that is not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFunctionPolicy {
    /// Fail with `unknown function: <name>`.
    #[default]
    Reject,
    /// Succeed with an empty result and make no call.
    Ignore,
}

/// A registered contract function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub arity: usize,
    pub kind: TransactionKind,
}

impl FunctionSpec {
    pub fn submit(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
            kind: TransactionKind::Submit,
        }
    }

    pub fn evaluate(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
            kind: TransactionKind::Evaluate,
        }
    }

    pub fn mutates(&self) -> bool {
        self.kind == TransactionKind::Submit
    }
}

/// Name → function table for one contract family.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    functions: HashMap<String, FunctionSpec>,
    unknown: UnknownFunctionPolicy,
}

impl ContractRegistry {
    /// Empty registry.
    pub fn new(unknown: UnknownFunctionPolicy) -> Self {
        Self {
            functions: HashMap::new(),
            unknown,
        }
    }

    /// The car lifecycle contract.
    pub fn car_contract() -> Self {
        let mut registry = Self::new(UnknownFunctionPolicy::default());
        registry.register(FunctionSpec::submit("ManufactureCar", 1));
        registry.register(FunctionSpec::submit("UpdateDealer", 2));
        registry.register(FunctionSpec::submit("SellCar", 2));
        registry.register(FunctionSpec::submit("ChangeCarOwner", 3));
        registry.register(FunctionSpec::evaluate("QueryCar", 1));
        registry.register(FunctionSpec::evaluate("GetHistoryForCar", 1));
        registry.register(FunctionSpec::evaluate("CarExists", 1));
        registry
    }

    /// Add or replace a function.
    pub fn register(&mut self, spec: FunctionSpec) {
        self.functions.insert(spec.name.clone(), spec);
    }

    pub fn set_unknown_policy(&mut self, policy: UnknownFunctionPolicy) {
        self.unknown = policy;
    }

    pub fn unknown_policy(&self) -> UnknownFunctionPolicy {
        self.unknown
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.get(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Look up `function` for an entry point of the given kind and check its
    /// arguments. `Ok(None)` means "ignore this call".
    pub fn resolve(
        &self,
        kind: TransactionKind,
        function: &str,
        args: &[String],
    ) -> GatewayResult<Option<&FunctionSpec>> {
        let spec = match self.functions.get(function) {
            Some(spec) if spec.kind == kind => spec,
            _ => {
                return match self.unknown {
                    UnknownFunctionPolicy::Reject => {
                        Err(GatewayError::UnknownFunction(function.to_string()))
                    }
                    UnknownFunctionPolicy::Ignore => Ok(None),
                }
            }
        };

        if args.len() != spec.arity {
            return Err(GatewayError::ArityMismatch {
                function: function.to_string(),
                expected: spec.arity,
                actual: args.len(),
            });
        }
        Ok(Some(spec))
    }
}

/// Performs registered calls through a contract handle.
///
/// A call runs in two steps so that nothing touches the network until the
/// function and its arguments are known to be valid: [`prepare`] checks the
/// registry, [`execute`] performs the single attempt and decodes the payload.
///
/// [`prepare`]: TransactionDispatcher::prepare
/// [`execute`]: TransactionDispatcher::execute
#[derive(Debug, Clone)]
pub struct TransactionDispatcher {
    registry: ContractRegistry,
}

impl TransactionDispatcher {
    pub fn new(registry: ContractRegistry) -> Self {
        Self { registry }
    }

    /// Resolve `function` for the `kind` entry point. `Ok(None)` means the
    /// call is ignored and no session is needed.
    pub fn prepare(
        &self,
        kind: TransactionKind,
        function: &str,
        args: &[String],
    ) -> GatewayResult<Option<FunctionSpec>> {
        let spec = self.registry.resolve(kind, function, args)?.cloned();
        if spec.is_none() {
            tracing::debug!(function = %function, kind = %kind, "Unregistered function ignored");
        }
        Ok(spec)
    }

    /// Call `spec` through `contract` and decode the payload.
    pub async fn execute(
        &self,
        contract: &dyn ContractHandle,
        spec: &FunctionSpec,
        args: &[String],
    ) -> GatewayResult<Value> {
        tracing::info!(function = %spec.name, kind = %spec.kind, "Executing {}", spec.name);

        match spec.kind {
            TransactionKind::Submit => {
                let payload = contract.submit_transaction(&spec.name, args).await?;
                let output = String::from_utf8_lossy(&payload).into_owned();
                tracing::info!(function = %spec.name, output = %output, "Transaction committed");
                Ok(Value::String(output))
            }
            TransactionKind::Evaluate => {
                let payload = contract.evaluate_transaction(&spec.name, args).await?;
                serde_json::from_slice(&payload).map_err(|e| GatewayError::MalformedResult {
                    function: spec.name.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingContract {
        calls: Mutex<Vec<(TransactionKind, String, Vec<String>)>>,
        payload: &'static str,
    }

    #[async_trait]
    impl ContractHandle for RecordingContract {
        async fn submit_transaction(&self, function: &str, args: &[String]) -> GatewayResult<Bytes> {
            self.calls
                .lock()
                .unwrap()
                .push((TransactionKind::Submit, function.to_string(), args.to_vec()));
            Ok(Bytes::from_static(self.payload.as_bytes()))
        }

        async fn evaluate_transaction(&self, function: &str, args: &[String]) -> GatewayResult<Bytes> {
            self.calls
                .lock()
                .unwrap()
                .push((TransactionKind::Evaluate, function.to_string(), args.to_vec()));
            Ok(Bytes::from_static(self.payload.as_bytes()))
        }
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_car_registry() {
        let registry = ContractRegistry::car_contract();
        assert_eq!(registry.len(), 7);
        assert_eq!(registry.get("ChangeCarOwner").unwrap().arity, 3);
        assert!(registry.get("SellCar").unwrap().mutates());
        assert!(!registry.get("CarExists").unwrap().mutates());
        assert_eq!(registry.unknown_policy(), UnknownFunctionPolicy::Reject);
    }

    #[test]
    fn test_resolve_checks_arity() {
        let registry = ContractRegistry::car_contract();
        let err = registry
            .resolve(TransactionKind::Submit, "UpdateDealer", &args(&["car1"]))
            .unwrap_err();
        assert!(matches!(err, GatewayError::ArityMismatch { expected: 2, actual: 1, .. }));

        let err = registry
            .resolve(TransactionKind::Evaluate, "QueryCar", &args(&["car1", "car2"]))
            .unwrap_err();
        assert!(matches!(err, GatewayError::ArityMismatch { expected: 1, actual: 2, .. }));
    }

    #[test]
    fn test_resolve_wrong_entry_point_is_unknown() {
        let registry = ContractRegistry::car_contract();
        let err = registry
            .resolve(TransactionKind::Evaluate, "ManufactureCar", &args(&["{}"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown function: ManufactureCar");
    }

    #[test]
    fn test_ignore_policy() {
        let mut registry = ContractRegistry::car_contract();
        registry.set_unknown_policy(UnknownFunctionPolicy::Ignore);
        let spec = registry
            .resolve(TransactionKind::Submit, "DeleteCar", &args(&["car1"]))
            .unwrap();
        assert!(spec.is_none());
    }

    async fn run(
        dispatcher: &TransactionDispatcher,
        contract: &RecordingContract,
        kind: TransactionKind,
        function: &str,
        values: &[&str],
    ) -> GatewayResult<Option<Value>> {
        let args = args(values);
        match dispatcher.prepare(kind, function, &args)? {
            Some(spec) => dispatcher.execute(contract, &spec, &args).await.map(Some),
            None => Ok(None),
        }
    }

    #[tokio::test]
    async fn test_submit_returns_string() {
        let contract = RecordingContract {
            payload: "SUCCESS",
            ..Default::default()
        };
        let dispatcher = TransactionDispatcher::new(ContractRegistry::car_contract());

        let result = run(&dispatcher, &contract, TransactionKind::Submit, "SellCar", &["car1", "Tom"])
            .await
            .unwrap();
        assert_eq!(result, Some(json!("SUCCESS")));

        let calls = contract.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (TransactionKind::Submit, "SellCar".to_string(), args(&["car1", "Tom"])));
    }

    #[tokio::test]
    async fn test_evaluate_decodes_json() {
        let contract = RecordingContract {
            payload: "true",
            ..Default::default()
        };
        let dispatcher = TransactionDispatcher::new(ContractRegistry::car_contract());

        let result = run(&dispatcher, &contract, TransactionKind::Evaluate, "CarExists", &["car1"])
            .await
            .unwrap();
        assert_eq!(result, Some(json!(true)));
    }

    #[tokio::test]
    async fn test_evaluate_malformed_payload() {
        let contract = RecordingContract {
            payload: "car1 does not",
            ..Default::default()
        };
        let dispatcher = TransactionDispatcher::new(ContractRegistry::car_contract());

        let err = run(&dispatcher, &contract, TransactionKind::Evaluate, "QueryCar", &["car1"])
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResult { ref function, .. } if function == "QueryCar"));
    }

    #[test]
    fn test_prepare_ignored_function() {
        let mut registry = ContractRegistry::car_contract();
        registry.set_unknown_policy(UnknownFunctionPolicy::Ignore);
        let dispatcher = TransactionDispatcher::new(registry);

        assert!(dispatcher
            .prepare(TransactionKind::Submit, "DeleteCar", &args(&["car1"]))
            .unwrap()
            .is_none());
        let spec = dispatcher
            .prepare(TransactionKind::Evaluate, "QueryCar", &args(&["car1"]))
            .unwrap()
            .unwrap();
        assert_eq!(spec, FunctionSpec::evaluate("QueryCar", 1));
    }

    #[tokio::test]
    async fn test_unknown_function_makes_no_call() {
        let contract = RecordingContract::default();
        let dispatcher = TransactionDispatcher::new(ContractRegistry::car_contract());

        let result = run(&dispatcher, &contract, TransactionKind::Submit, "DeleteCar", &["car1"])
            .await;
        assert!(result.is_err());
        assert!(contract.calls.lock().unwrap().is_empty());
    }
}
