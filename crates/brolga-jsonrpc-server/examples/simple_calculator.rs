//! Simple Calculator JSON-RPC Example
//!
//! Demonstrates a transport-agnostic JSON-RPC server mixing a registered
//! free callback with an attached service instance, then feeding it raw
//! payloads the way a transport would.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

use brolga_jsonrpc_server::prelude::*;

/// Calculator service exposing add/subtract by method name
struct Calculator;

#[async_trait]
impl RpcService for Calculator {
    fn type_name(&self) -> &str {
        "Calculator"
    }

    fn methods(&self) -> Vec<MethodSpec> {
        vec![
            MethodSpec::new(
                "add",
                ParameterSignature::new().required("a").required("b"),
            ),
            MethodSpec::new(
                "subtract",
                ParameterSignature::new().required("a").required("b"),
            ),
        ]
    }

    async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, ProcedureError> {
        let a = args[0].as_f64().ok_or_else(|| {
            ProcedureError::application(-1, "parameter 'a' must be a number", None)
        })?;
        let b = args[1].as_f64().ok_or_else(|| {
            ProcedureError::application(-1, "parameter 'b' must be a number", None)
        })?;

        match method {
            "add" => Ok(json!(a + b)),
            "subtract" => Ok(json!(a - b)),
            other => Err(ProcedureError::application(
                -1,
                format!("unknown method: {}", other),
                None,
            )),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut registry = ProcedureRegistry::new();
    registry.attach_instance(Arc::new(Calculator));
    registry.register_fn(
        "echo",
        ParameterSignature::new().required("message"),
        |args| Box::pin(async move { Ok(args.into_iter().next().unwrap_or(Value::Null)) }),
    );

    let server = JsonRpcServer::new(registry, ServerConfig::new());

    let test_requests = vec![
        r#"{"jsonrpc": "2.0", "method": "add", "params": {"a": 5, "b": 3}, "id": 1}"#,
        r#"{"jsonrpc": "2.0", "method": "subtract", "params": [10, 4], "id": 2}"#,
        r#"{"jsonrpc": "2.0", "method": "echo", "params": ["hello"], "id": 3}"#,
        r#"{"jsonrpc": "2.0", "method": "multiply", "params": {"a": 2, "b": 3}, "id": 4}"#, // Will fail
        r#"{"jsonrpc": "2.0", "method": "add", "params": {"a": 1, "b": 2}}"#, // Notification
        r#"[{"jsonrpc": "2.0", "method": "add", "params": [1, 2], "id": 5}, {"jsonrpc": "2.0", "method": "subtract", "params": [1, 2]}]"#,
    ];

    for (i, request_json) in test_requests.iter().enumerate() {
        println!("\n--- Test {} ---", i + 1);
        println!("Request: {}", request_json);

        match server.handle(request_json, None).await? {
            ServeOutcome::Reply(body) => {
                println!("Response:\n{}", serde_json::to_string_pretty(&body)?);
            }
            ServeOutcome::Empty => println!("Notification (no response produced)"),
            ServeOutcome::Denied(rejection) => println!("Rejected by transport: {:?}", rejection),
        }
    }

    Ok(())
}
