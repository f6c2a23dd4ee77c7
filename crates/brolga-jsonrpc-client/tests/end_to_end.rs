//! End-to-end tests wiring the client to a real dispatcher through an
//! in-process loopback transport, exercising the full request/response path
//! the way an HTTP frontend would.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use brolga_jsonrpc_client::prelude::*;
use brolga_jsonrpc_server::prelude::*;

/// Loopback transport: feeds request bodies straight into a dispatcher and
/// turns its outcome into a status/body pair like an HTTP layer would.
struct Loopback {
    server: Arc<JsonRpcServer>,
    credentials: Option<Credentials>,
}

#[async_trait]
impl Transport for Loopback {
    async fn send(
        &mut self,
        body: Vec<u8>,
        _headers: &HashMap<String, String>,
        _timeout: Duration,
    ) -> ClientResult<TransportReply> {
        let raw = String::from_utf8(body)
            .map_err(|err| ClientError::connection(format!("body is not UTF-8: {}", err)))?;

        match self.server.handle(&raw, self.credentials.as_ref()).await {
            Ok(ServeOutcome::Reply(value)) => Ok(TransportReply::ok(
                serde_json::to_vec(&value).map_err(ClientError::Json)?,
            )),
            Ok(ServeOutcome::Empty) => Ok(TransportReply::empty()),
            Ok(ServeOutcome::Denied(AuthRejection::AccessDenied)) => {
                Ok(TransportReply::new(403, Vec::new()))
            }
            Ok(ServeOutcome::Denied(AuthRejection::AuthenticationFailure)) => {
                Ok(TransportReply::new(401, Vec::new()))
            }
            Err(_) => Ok(TransportReply::new(500, Vec::new())),
        }
    }
}

fn subtract_signature() -> ParameterSignature {
    ParameterSignature::new()
        .required("minuend")
        .required("subtrahend")
}

fn build_server() -> Arc<JsonRpcServer> {
    let mut registry = ProcedureRegistry::new();
    registry.register_fn("subtract", subtract_signature(), |args| {
        Box::pin(async move {
            let minuend = args[0].as_i64().unwrap_or(0);
            let subtrahend = args[1].as_i64().unwrap_or(0);
            Ok(json!(minuend - subtrahend))
        })
    });
    registry.register_fn("boom", ParameterSignature::new(), |_args| {
        Box::pin(async move {
            Err(ProcedureError::application(
                -32000,
                "deliberate failure",
                Some(json!({"hint": "expected"})),
            ))
        })
    });
    Arc::new(JsonRpcServer::new(registry, ServerConfig::new()))
}

fn client_for(server: Arc<JsonRpcServer>) -> JsonRpcClient<Loopback> {
    JsonRpcClient::with_defaults(Loopback {
        server,
        credentials: None,
    })
}

fn named(entries: &[(&str, Value)]) -> RequestParams {
    let mut map = Map::new();
    for (key, value) in entries {
        map.insert(key.to_string(), value.clone());
    }
    RequestParams::Object(map)
}

#[tokio::test]
async fn round_trip_positional_call() {
    let mut client = client_for(build_server());

    let result = client
        .call(
            "subtract",
            Some(RequestParams::Array(vec![json!(42), json!(23)])),
        )
        .await
        .unwrap();
    assert_eq!(result, json!(19));

    let result = client
        .call(
            "subtract",
            Some(RequestParams::Array(vec![json!(23), json!(42)])),
        )
        .await
        .unwrap();
    assert_eq!(result, json!(-19));
}

#[tokio::test]
async fn round_trip_named_call() {
    let mut client = client_for(build_server());

    let result = client
        .call(
            "subtract",
            Some(named(&[
                ("subtrahend", json!(23)),
                ("minuend", json!(42)),
            ])),
        )
        .await
        .unwrap();
    assert_eq!(result, json!(19));
}

#[tokio::test]
async fn unknown_procedure_maps_to_typed_error() {
    let mut client = client_for(build_server());

    let err = client.call("foobar", None).await.unwrap_err();
    assert!(matches!(err, ClientError::UnknownProcedure { .. }));
}

#[tokio::test]
async fn bad_arguments_map_to_typed_error() {
    let mut client = client_for(build_server());

    let err = client
        .call("subtract", Some(RequestParams::Array(vec![json!(1)])))
        .await
        .unwrap_err();
    match err {
        ClientError::BadArguments { message } => {
            assert_eq!(message, "wrong number of arguments");
        }
        other => panic!("expected bad arguments, got {:?}", other),
    }
}

#[tokio::test]
async fn application_error_carries_code_and_data() {
    let mut client = client_for(build_server());

    let err = client.call("boom", None).await.unwrap_err();
    match err {
        ClientError::Application {
            code,
            message,
            data,
        } => {
            assert_eq!(code, -32000);
            assert_eq!(message, "deliberate failure");
            assert_eq!(data, Some(json!({"hint": "expected"})));
        }
        other => panic!("expected application error, got {:?}", other),
    }
}

#[tokio::test]
async fn notification_gets_no_reply() {
    let mut client = client_for(build_server());

    // Succeeding and failing notifications are equally silent.
    client
        .notify(
            "subtract",
            Some(RequestParams::Array(vec![json!(1), json!(2)])),
        )
        .await
        .unwrap();
    client.notify("foobar", None).await.unwrap();
}

#[tokio::test]
async fn batch_round_trip_preserves_order() {
    let mut client = client_for(build_server());

    let mut batch = BatchBuilder::new();
    batch.call(
        "subtract",
        Some(RequestParams::Array(vec![json!(42), json!(23)])),
    );
    batch.notify(
        "subtract",
        Some(RequestParams::Array(vec![json!(0), json!(0)])),
    );
    batch.call("foobar", None);
    batch.call(
        "subtract",
        Some(RequestParams::Array(vec![json!(5), json!(3)])),
    );

    let replies = client.send_batch(&mut batch).await.unwrap();
    assert_eq!(replies.len(), 3);
    assert_eq!(*replies[0].as_ref().unwrap(), json!(19));
    assert!(matches!(
        replies[1],
        Err(ClientError::UnknownProcedure { .. })
    ));
    assert_eq!(*replies[2].as_ref().unwrap(), json!(2));
}

#[tokio::test]
async fn denied_call_surfaces_as_access_denied() {
    let mut registry = ProcedureRegistry::new();

    struct Secrets;

    #[async_trait]
    impl RpcService for Secrets {
        fn type_name(&self) -> &str {
            "Secrets"
        }

        fn methods(&self) -> Vec<MethodSpec> {
            vec![MethodSpec::new("reveal", ParameterSignature::new())]
        }

        async fn call(&self, _method: &str, _args: Vec<Value>) -> Result<Value, ProcedureError> {
            Ok(json!("the secret"))
        }
    }

    registry.attach_instance(Arc::new(Secrets));
    let config = ServerConfig::new().with_before_hook(Arc::new(|audit| {
        match (audit.username, audit.password) {
            (Some("alice"), Some("wonderland")) => Ok(()),
            (Some(_), Some(_)) => Err(ProcedureError::AccessDenied),
            _ => Err(ProcedureError::AuthenticationFailure),
        }
    }));
    let server = Arc::new(JsonRpcServer::new(registry, config));

    let mut alice = JsonRpcClient::with_defaults(Loopback {
        server: server.clone(),
        credentials: Some(Credentials::new("alice", "wonderland")),
    });
    assert_eq!(
        alice.call("reveal", None).await.unwrap(),
        json!("the secret")
    );

    let mut mallory = JsonRpcClient::with_defaults(Loopback {
        server: server.clone(),
        credentials: Some(Credentials::new("mallory", "hunter2")),
    });
    let err = mallory.call("reveal", None).await.unwrap_err();
    assert!(matches!(err, ClientError::AccessDenied));

    // Missing credentials entirely fail authentication; the loopback maps
    // that to a 401, which classifies as access denied too.
    let mut anonymous = JsonRpcClient::with_defaults(Loopback {
        server,
        credentials: None,
    });
    let err = anonymous.call("reveal", None).await.unwrap_err();
    assert!(matches!(err, ClientError::AccessDenied));
}

#[tokio::test]
async fn internal_error_becomes_server_failure() {
    let mut registry = ProcedureRegistry::new();
    registry.register_fn("corrupt", ParameterSignature::new(), |_args| {
        Box::pin(async move {
            Err(ProcedureError::Internal(anyhow::anyhow!(
                "state file unreadable"
            )))
        })
    });
    let server = Arc::new(JsonRpcServer::new(registry, ServerConfig::new()));
    let mut client = client_for(server);

    let err = client.call("corrupt", None).await.unwrap_err();
    assert!(matches!(err, ClientError::ServerFailure { status: 500 }));
}
