//! # Protocol Core Prelude
//!
//! Convenient re-exports of the most commonly used types.
//!
//! ```rust
//! use brolga_jsonrpc_server::prelude::*;
//! ```

// Core JSON-RPC types
pub use crate::error::{JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject, ProcedureError};
pub use crate::notification::JsonRpcNotification;
pub use crate::request::{JsonRpcRequest, RequestParams};
pub use crate::response::{JsonRpcMessage, JsonRpcResponse};
pub use crate::types::{JsonRpcVersion, RequestId};

// Dispatch surface
pub use crate::config::ServerConfig;
pub use crate::dispatch::{AuthRejection, Credentials, JsonRpcServer, ServeOutcome};
pub use crate::registry::{MethodSpec, ProcedureRegistry, RpcService};
pub use crate::signature::ParameterSignature;

// Standard error codes
pub use crate::error_codes::*;
