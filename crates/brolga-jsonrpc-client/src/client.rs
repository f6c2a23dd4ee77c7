//! JSON-RPC client: sends built envelopes through a transport and parses
//! replies back into results or typed errors.

use serde_json::Value;
use tracing::{debug, warn};

use brolga_jsonrpc_server::{JsonRpcErrorObject, RequestId, RequestParams};

use crate::builder::{BatchBuilder, build_notification, build_request};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::{Transport, check_status};

/// One parsed response item: the id it claims, and its result or mapped error.
struct ParsedReply {
    id: Option<RequestId>,
    outcome: ClientResult<Value>,
}

/// Parse one response object into a result or a typed error.
///
/// An `error` member wins over `result`; an absent `result` is an empty
/// (null) result, not a failure.
pub fn parse_reply(item: &Value) -> ClientResult<Value> {
    split_reply(item).outcome
}

fn split_reply(item: &Value) -> ParsedReply {
    let object = match item.as_object() {
        Some(object) => object,
        None => {
            return ParsedReply {
                id: None,
                outcome: Err(ClientError::InvalidResponse(
                    "response item is not an object".to_string(),
                )),
            };
        }
    };

    let id = object
        .get("id")
        .and_then(|raw| serde_json::from_value::<RequestId>(raw.clone()).ok());

    if let Some(raw_error) = object.get("error") {
        let outcome = match serde_json::from_value::<JsonRpcErrorObject>(raw_error.clone()) {
            Ok(error) => Err(ClientError::from_error_object(error)),
            Err(err) => Err(ClientError::InvalidResponse(format!(
                "malformed error object: {}",
                err
            ))),
        };
        return ParsedReply { id, outcome };
    }

    ParsedReply {
        id,
        outcome: Ok(object.get("result").cloned().unwrap_or(Value::Null)),
    }
}

/// JSON-RPC client over a pluggable transport.
///
/// One request (or batch) at a time; no retries, no background tasks.
pub struct JsonRpcClient<T: Transport> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> JsonRpcClient<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Construct with default configuration.
    pub fn with_defaults(transport: T) -> Self {
        Self::new(transport, ClientConfig::default())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Call a remote procedure and return its result.
    pub async fn call(
        &mut self,
        method: impl Into<String>,
        params: Option<RequestParams>,
    ) -> ClientResult<Value> {
        let request = build_request(method, params);
        debug!(method = %request.method, id = %request.id, "sending call");

        let body = serde_json::to_vec(&request)?;
        let payload = self.send(body).await?.ok_or_else(|| {
            ClientError::InvalidResponse("empty response body for a call".to_string())
        })?;

        if payload.is_array() {
            return Err(ClientError::InvalidResponse(
                "batch response to a single call".to_string(),
            ));
        }

        let reply = split_reply(&payload);
        let result = reply.outcome?;
        // Errors may legitimately carry a null id (protocol-level failures);
        // a success must echo the id we sent.
        if reply.id.as_ref() != Some(&request.id) {
            warn!(expected = %request.id, "response id mismatch");
            return Err(ClientError::InvalidResponse(
                "response id does not match request id".to_string(),
            ));
        }
        Ok(result)
    }

    /// Send a notification. No response is expected or parsed.
    pub async fn notify(
        &mut self,
        method: impl Into<String>,
        params: Option<RequestParams>,
    ) -> ClientResult<()> {
        let notification = build_notification(method, params);
        debug!(method = %notification.method, "sending notification");

        let body = serde_json::to_vec(&notification)?;
        self.send(body).await?;
        Ok(())
    }

    /// Flush an accumulated batch and return one outcome per queued call, in
    /// the order the calls were queued. Notifications get no slot.
    ///
    /// Replies are correlated by id; error replies with a null id (which the
    /// server could not attribute) fill unclaimed slots in arrival order.
    pub async fn send_batch(
        &mut self,
        batch: &mut BatchBuilder,
    ) -> ClientResult<Vec<ClientResult<Value>>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let (payload, expected_ids) = batch.take();
        debug!(calls = expected_ids.len(), "sending batch");

        let body = serde_json::to_vec(&payload)?;
        let reply = self.send(body).await?;

        let items = match reply {
            None => Vec::new(),
            Some(Value::Array(items)) => items,
            // A single error object means the server refused the whole payload.
            Some(single) => {
                return Err(match parse_reply(&single) {
                    Err(err) => err,
                    Ok(_) => ClientError::InvalidResponse(
                        "single object response to a batch".to_string(),
                    ),
                });
            }
        };

        if expected_ids.is_empty() {
            // Notification-only batch: nothing should come back.
            return Ok(Vec::new());
        }

        let mut slots: Vec<Option<ClientResult<Value>>> = Vec::new();
        slots.resize_with(expected_ids.len(), || None);
        let mut unattributed = Vec::new();

        for item in &items {
            let parsed = split_reply(item);
            let claimed = match parsed.id.as_ref().filter(|id| !id.is_null()) {
                Some(id) => expected_ids
                    .iter()
                    .enumerate()
                    .find(|&(i, expected)| expected == id && slots[i].is_none())
                    .map(|(i, _)| i),
                None => None,
            };
            match claimed {
                Some(position) => slots[position] = Some(parsed.outcome),
                None => unattributed.push(parsed.outcome),
            }
        }

        // Positional fallback for replies the server could not attribute.
        let mut leftovers = unattributed.into_iter();
        for slot in slots.iter_mut() {
            if slot.is_none()
                && let Some(outcome) = leftovers.next()
            {
                *slot = Some(outcome);
            }
        }

        Ok(slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(ClientError::InvalidResponse(
                        "no reply received for call".to_string(),
                    ))
                })
            })
            .collect())
    }

    /// Send, classify status, decode. `None` means an empty body.
    async fn send(&mut self, body: Vec<u8>) -> ClientResult<Option<Value>> {
        let reply = self
            .transport
            .send(body, &self.config.headers, self.config.timeouts.request)
            .await?;
        check_status(reply.status)?;

        if reply.body.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&reply.body)?))
    }
}
