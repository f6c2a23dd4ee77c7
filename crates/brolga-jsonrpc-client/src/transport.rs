//! Transport seam for the JSON-RPC client.
//!
//! The protocol core never opens connections itself; it hands a serialized
//! body to a [`Transport`] and gets back a status code and raw response
//! bytes. HTTP status codes are folded into the typed error taxonomy before
//! any response parsing happens.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Raw reply from a transport: status code plus un-parsed body bytes.
#[derive(Debug, Clone)]
pub struct TransportReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportReply {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// A 200 reply with the given body.
    pub fn ok(body: Vec<u8>) -> Self {
        Self::new(200, body)
    }

    /// A 204-style reply with no body (notification accepted).
    pub fn empty() -> Self {
        Self::new(204, Vec::new())
    }
}

/// Transport trait the client sends through.
///
/// Connection failures (refused, DNS) surface as
/// [`ClientError::Connection`]; status-code classification is handled by the
/// client, not the transport.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &mut self,
        body: Vec<u8>,
        headers: &HashMap<String, String>,
        timeout: Duration,
    ) -> ClientResult<TransportReply>;
}

/// Classified transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx: proceed to response parsing.
    Success,
    /// 401/403: rejected before dispatch.
    AccessDenied,
    /// 404: endpoint unreachable, equivalent to a connection failure.
    NotFound,
    /// 5xx: server-side failure.
    ServerError,
    /// Anything else.
    Unexpected,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => StatusClass::Success,
            401 | 403 => StatusClass::AccessDenied,
            404 => StatusClass::NotFound,
            500..=599 => StatusClass::ServerError,
            _ => StatusClass::Unexpected,
        }
    }
}

/// Fold a transport status into the error taxonomy.
pub fn check_status(status: u16) -> ClientResult<()> {
    match StatusClass::of(status) {
        StatusClass::Success => Ok(()),
        StatusClass::AccessDenied => Err(ClientError::AccessDenied),
        StatusClass::NotFound => Err(ClientError::connection(format!(
            "endpoint not found (status {})",
            status
        ))),
        StatusClass::ServerError => Err(ClientError::ServerFailure { status }),
        StatusClass::Unexpected => Err(ClientError::connection(format!(
            "unexpected status {}",
            status
        ))),
    }
}
