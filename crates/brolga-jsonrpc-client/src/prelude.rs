//! # Client Prelude
//!
//! Convenient re-exports of the most commonly used types.
//!
//! ```rust
//! use brolga_jsonrpc_client::prelude::*;
//! ```

pub use crate::builder::{BatchBuilder, build_notification, build_request};
pub use crate::client::{JsonRpcClient, parse_reply};
pub use crate::config::{ClientConfig, TimeoutConfig};
pub use crate::error::{ClientError, ClientResult};
pub use crate::transport::{StatusClass, Transport, TransportReply};

pub use brolga_jsonrpc_server::{RequestId, RequestParams};
