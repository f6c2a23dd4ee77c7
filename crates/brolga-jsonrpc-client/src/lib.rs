//! # JSON-RPC 2.0 Client
//!
//! Client face of the protocol core: builds outgoing request envelopes
//! (single or batched), hands them to a pluggable [`Transport`], and parses
//! replies back into results or typed errors.
//!
//! ## Features
//! - Fresh random id per call; batch accumulation with ordered flush
//! - Typed error taxonomy mapped from wire error codes
//! - HTTP status classification (access denied, connection failure, server
//!   error) folded into the same taxonomy
//! - No retries, pooling or streaming; one request at a time
//!
//! ```rust,ignore
//! let mut client = JsonRpcClient::with_defaults(transport);
//! let params = RequestParams::Array(vec![json!(42), json!(23)]);
//! let result = client.call("subtract", Some(params)).await?;
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
pub mod transport;

// Re-export main types
pub use builder::{BatchBuilder, build_notification, build_request, fresh_request_id};
pub use client::{JsonRpcClient, parse_reply};
pub use config::{ClientConfig, TimeoutConfig};
pub use error::{ClientError, ClientResult};
pub use transport::{StatusClass, Transport, TransportReply, check_status};

// Shared message model
pub use brolga_jsonrpc_server::{
    JsonRpcErrorObject, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId,
    RequestParams,
};
