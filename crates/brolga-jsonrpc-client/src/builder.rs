//! Outgoing request construction.
//!
//! Single calls get a fresh random id each; collisions are possible and
//! accepted, correlation only needs to hold for in-flight requests. Batch
//! mode accumulates calls and notifications in order until flushed.

use rand::Rng;
use serde_json::Value;

use brolga_jsonrpc_server::{JsonRpcNotification, JsonRpcRequest, RequestId, RequestParams};

/// A fresh request id. Random, not guaranteed globally unique.
pub fn fresh_request_id() -> RequestId {
    RequestId::Number(rand::rng().random_range(0..=i64::from(u32::MAX)))
}

/// Build a call envelope with a fresh id.
pub fn build_request(method: impl Into<String>, params: Option<RequestParams>) -> JsonRpcRequest {
    JsonRpcRequest::new(fresh_request_id(), method.into(), params)
}

/// Build a notification envelope (no id, no response expected).
pub fn build_notification(
    method: impl Into<String>,
    params: Option<RequestParams>,
) -> JsonRpcNotification {
    JsonRpcNotification::new(method.into(), params)
}

/// Accumulates an ordered sequence of calls and notifications to be sent as
/// one batch array. Flushing resets the builder for reuse.
#[derive(Debug, Default)]
pub struct BatchBuilder {
    entries: Vec<Value>,
    expected_ids: Vec<RequestId>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a call; the returned id identifies its reply.
    pub fn call(&mut self, method: impl Into<String>, params: Option<RequestParams>) -> RequestId {
        let request = build_request(method, params);
        let id = request.id.clone();
        // Envelope serialization of our own types cannot fail.
        self.entries
            .push(serde_json::to_value(&request).unwrap_or(Value::Null));
        self.expected_ids.push(id.clone());
        id
    }

    /// Queue a notification; it will get no reply slot.
    pub fn notify(&mut self, method: impl Into<String>, params: Option<RequestParams>) {
        let notification = build_notification(method, params);
        self.entries
            .push(serde_json::to_value(&notification).unwrap_or(Value::Null));
    }

    /// Number of queued entries (calls and notifications).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flush the queued entries as the outer batch array, together with the
    /// ids expected back, resetting the builder.
    pub fn take(&mut self) -> (Value, Vec<RequestId>) {
        let entries = std::mem::take(&mut self.entries);
        let ids = std::mem::take(&mut self.expected_ids);
        (Value::Array(entries), ids)
    }
}
