//! Request dispatch: parse, validate, resolve, bind, invoke, encode.
//!
//! The entry point is [`JsonRpcServer::handle`], which takes the raw request
//! body as received from the transport and produces a [`ServeOutcome`]. Batch
//! payloads are processed item by item, each in a fresh [`RequestContext`],
//! strictly in array order; notification outputs are omitted from the batch
//! reply.

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::error::{JsonRpcError, ProcedureError};
use crate::registry::{CallAudit, ProcedureRegistry};
use crate::request::RequestParams;
use crate::response::JsonRpcMessage;
use crate::types::RequestId;

/// Caller credentials extracted by the transport and forwarded to the
/// before-hook. The core never parses authentication headers itself.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }
}

/// Terminal authorization outcome. Bypasses JSON-RPC error encoding; the
/// transport turns it into a transport-level rejection (401/403).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    AccessDenied,
    AuthenticationFailure,
}

/// Result of handling one raw payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ServeOutcome {
    /// Encoded response body (single object or batch array) to send back.
    Reply(Value),
    /// Notification-only payload; the transport sends nothing.
    Empty,
    /// Authorization short-circuit, no JSON-RPC body.
    Denied(AuthRejection),
}

/// Per-item processing context.
///
/// The registry and config are shared read-only; the payload slot is owned
/// by this item alone so batch items cannot observe each other's state.
struct RequestContext<'a> {
    registry: &'a ProcedureRegistry,
    config: &'a ServerConfig,
    credentials: Option<&'a Credentials>,
    payload: Value,
}

enum ItemOutcome {
    /// Response message to include in the output.
    Message(JsonRpcMessage),
    /// Notification; nothing to emit.
    Silent,
    /// Authorization short-circuit for the whole payload.
    Denied(AuthRejection),
}

/// Fields of a validated call or notification.
struct ValidRequest {
    /// `None` marks a notification.
    id: Option<RequestId>,
    method: String,
    params: Option<RequestParams>,
}

/// Transport-agnostic JSON-RPC server.
pub struct JsonRpcServer {
    registry: ProcedureRegistry,
    config: ServerConfig,
}

impl JsonRpcServer {
    pub fn new(registry: ProcedureRegistry, config: ServerConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ProcedureRegistry {
        &self.registry
    }

    /// Registration is a configuration phase; complete it before serving.
    pub fn registry_mut(&mut self) -> &mut ProcedureRegistry {
        &mut self.registry
    }

    /// Handle one raw request body.
    ///
    /// Protocol failures are encoded into the reply; only opaque internal
    /// errors (never allow-listed for relay) escape as `Err`.
    pub async fn handle(
        &self,
        raw: &str,
        credentials: Option<&Credentials>,
    ) -> Result<ServeOutcome, anyhow::Error> {
        let payload: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "request body is not valid JSON");
                return Ok(ServeOutcome::Reply(encode_message(JsonRpcMessage::error(
                    JsonRpcError::parse_error(),
                ))));
            }
        };

        match payload {
            Value::Array(items) => self.handle_batch(items, credentials).await,
            single => {
                let context = self.context(single, credentials);
                match self.process_item(context).await? {
                    ItemOutcome::Message(message) => {
                        Ok(ServeOutcome::Reply(encode_message(message)))
                    }
                    ItemOutcome::Silent => Ok(ServeOutcome::Empty),
                    ItemOutcome::Denied(rejection) => Ok(ServeOutcome::Denied(rejection)),
                }
            }
        }
    }

    async fn handle_batch(
        &self,
        items: Vec<Value>,
        credentials: Option<&Credentials>,
    ) -> Result<ServeOutcome, anyhow::Error> {
        // An empty array is an invalid payload, not a batch of zero items.
        if items.is_empty() {
            return Ok(ServeOutcome::Reply(encode_message(JsonRpcMessage::error(
                JsonRpcError::invalid_request(RequestId::Null),
            ))));
        }

        debug!(items = items.len(), "processing batch");
        let mut replies = Vec::new();
        for item in items {
            let context = self.context(item, credentials);
            match self.process_item(context).await? {
                ItemOutcome::Message(message) => replies.push(encode_message(message)),
                ItemOutcome::Silent => {}
                ItemOutcome::Denied(rejection) => return Ok(ServeOutcome::Denied(rejection)),
            }
        }

        if replies.is_empty() {
            Ok(ServeOutcome::Empty)
        } else {
            Ok(ServeOutcome::Reply(Value::Array(replies)))
        }
    }

    fn context<'a>(
        &'a self,
        payload: Value,
        credentials: Option<&'a Credentials>,
    ) -> RequestContext<'a> {
        RequestContext {
            registry: &self.registry,
            config: &self.config,
            credentials,
            payload,
        }
    }

    /// Validate and dispatch a single payload item.
    ///
    /// A malformed item produces an error message even without an id; only a
    /// well-formed notification is silent.
    async fn process_item(&self, context: RequestContext<'_>) -> Result<ItemOutcome, anyhow::Error> {
        let request = match validate(&context.payload) {
            Ok(request) => request,
            Err(id) => {
                debug!("item failed request validation");
                return Ok(ItemOutcome::Message(JsonRpcMessage::error(
                    JsonRpcError::invalid_request(id),
                )));
            }
        };

        let binding = match context.registry.resolve(&request.method) {
            Some(binding) => binding,
            None => {
                debug!(method = %request.method, "method not found");
                return Ok(match request.id {
                    Some(id) => {
                        ItemOutcome::Message(JsonRpcMessage::error(JsonRpcError::method_not_found(id)))
                    }
                    None => ItemOutcome::Silent,
                });
            }
        };

        if binding.is_service_method()
            && let Some(hook) = &context.config.before_hook
        {
            let audit = CallAudit {
                username: context.credentials.and_then(|c| c.username.as_deref()),
                password: context.credentials.and_then(|c| c.password.as_deref()),
                type_name: binding.type_name().unwrap_or(""),
                // The method resolved on the service, not the wire alias.
                method: binding.method_name().unwrap_or(&request.method),
            };
            // The hook's success value is discarded; only errors matter.
            if let Err(err) = hook(audit) {
                return error_outcome(err, &request);
            }
        }

        let args = match binding
            .signature()
            .bind(request.params.as_ref(), context.config.named_params_from_map)
        {
            Ok(args) => args,
            Err(err) => return error_outcome(err, &request),
        };

        match binding.invoke(args).await {
            Ok(result) => Ok(match request.id {
                Some(id) => ItemOutcome::Message(JsonRpcMessage::success(id, result)),
                None => ItemOutcome::Silent,
            }),
            Err(err) => error_outcome(err, &request),
        }
    }
}

/// Check top-level request shape: object, version literal `"2.0"`, string
/// method, params (if present) array or object, id (if present) a string,
/// number or null. On failure returns the id to blame, null when it cannot
/// be recovered.
fn validate(payload: &Value) -> Result<ValidRequest, RequestId> {
    let object = match payload.as_object() {
        Some(object) => object,
        None => return Err(RequestId::Null),
    };

    let id = match object.get("id") {
        None => None,
        Some(Value::String(s)) => Some(RequestId::String(s.clone())),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(n) => Some(RequestId::Number(n)),
            None => return Err(RequestId::Null),
        },
        Some(Value::Null) => Some(RequestId::Null),
        Some(_) => return Err(RequestId::Null),
    };
    let blame = || id.clone().unwrap_or(RequestId::Null);

    match object.get("jsonrpc") {
        Some(Value::String(version)) if version == crate::JSONRPC_VERSION => {}
        _ => return Err(blame()),
    }

    let method = match object.get("method") {
        Some(Value::String(method)) => method.clone(),
        _ => return Err(blame()),
    };

    let params = match object.get("params") {
        None => None,
        Some(Value::Array(items)) => Some(RequestParams::Array(items.clone())),
        Some(Value::Object(map)) => Some(RequestParams::Object(map.clone())),
        Some(_) => return Err(blame()),
    };

    Ok(ValidRequest { id, method, params })
}

/// Map a procedure error onto the item outcome per the propagation policy.
fn error_outcome(
    err: ProcedureError,
    request: &ValidRequest,
) -> Result<ItemOutcome, anyhow::Error> {
    match err {
        ProcedureError::AccessDenied => {
            warn!(method = %request.method, "access denied");
            Ok(ItemOutcome::Denied(AuthRejection::AccessDenied))
        }
        ProcedureError::AuthenticationFailure => {
            warn!(method = %request.method, "authentication failed");
            Ok(ItemOutcome::Denied(AuthRejection::AuthenticationFailure))
        }
        ProcedureError::Internal(err) => Err(err),
        relayed => Ok(match &request.id {
            Some(id) => {
                let error = match relayed {
                    ProcedureError::InvalidParams(message) => {
                        JsonRpcError::invalid_params(id.clone(), &message)
                    }
                    ProcedureError::Application {
                        code,
                        message,
                        data,
                    } => JsonRpcError::new(
                        id.clone(),
                        crate::error::JsonRpcErrorObject::application_error(code, &message, data),
                    ),
                    // AccessDenied/AuthenticationFailure/Internal handled above.
                    _ => JsonRpcError::internal_error(id.clone(), None),
                };
                ItemOutcome::Message(JsonRpcMessage::error(error))
            }
            None => ItemOutcome::Silent,
        }),
    }
}

/// Encode a message for the reply body. A value that cannot be encoded is
/// replaced by a -32603 error carrying the same id.
fn encode_message(message: JsonRpcMessage) -> Value {
    let id = message.id().clone();
    match serde_json::to_value(&message) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "failed to encode response");
            json!({
                "jsonrpc": crate::JSONRPC_VERSION,
                "id": id,
                "error": {
                    "code": -32603,
                    "message": "Internal error",
                }
            })
        }
    }
}
