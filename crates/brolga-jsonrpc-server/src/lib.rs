//! # JSON-RPC 2.0 Protocol Core
//!
//! A pure, transport-agnostic JSON-RPC 2.0 implementation covering the full
//! message protocol: the typed message model, strict request validation,
//! batch semantics with per-item isolation, argument binding against declared
//! parameter signatures, and the standard error-code taxonomy.
//!
//! ## Features
//! - Full JSON-RPC 2.0 specification compliance, including batch edge cases
//! - Transport agnostic (works with HTTP, WebSocket, TCP, etc.)
//! - Positional and named argument binding with declared defaults
//! - Three kinds of dispatch targets: free callbacks, class/method pairs
//!   constructed per call, and attached live instances
//! - Before-hook for auditing/authorization ahead of service method calls
//! - Notifications are never answered, not even on failure

pub mod config;
pub mod dispatch;
pub mod error;
pub mod notification;
pub mod prelude;
pub mod registry;
pub mod request;
pub mod response;
pub mod signature;
pub mod types;

// Re-export main types
pub use config::ServerConfig;
pub use dispatch::{AuthRejection, Credentials, JsonRpcServer, ServeOutcome};
pub use error::{JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject, ProcedureError};
pub use notification::JsonRpcNotification;
pub use registry::{
    BeforeCallHook, CallAudit, MethodSpec, ProcedureBinding, ProcedureRegistry, RpcService,
    ServiceFactory,
};
pub use request::{JsonRpcRequest, RequestParams};
pub use response::{JsonRpcMessage, JsonRpcResponse};
pub use signature::{ParamSpec, ParameterSignature};
pub use types::{JsonRpcVersion, RequestId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}
