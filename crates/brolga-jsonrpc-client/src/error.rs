//! Error types for JSON-RPC client operations

use serde_json::Value;
use thiserror::Error;

use brolga_jsonrpc_server::JsonRpcErrorObject;

/// Result type for JSON-RPC client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Typed client-side failures.
///
/// Wire error objects map onto this taxonomy through
/// [`ClientError::from_error_object`]: the protocol-fault codes (-32700,
/// -32600) collapse into one category, -32601 and -32602 get their own
/// variants, and every other code is an application error the caller can
/// branch on.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport could not reach the server (connection refused, DNS
    /// failure, or a 404 endpoint).
    #[error("connection failure: {0}")]
    Connection(String),

    /// Server rejected the call at the transport level (401/403).
    #[error("access denied")]
    AccessDenied,

    /// The server flagged the request as unparseable or malformed
    /// (-32700 / -32600).
    #[error("protocol fault (code {code}): {message}")]
    Protocol { code: i64, message: String },

    /// The requested procedure does not exist on the server (-32601).
    #[error("unknown procedure: {message}")]
    UnknownProcedure { message: String },

    /// Argument binding failed on the server (-32602).
    #[error("bad arguments: {message}")]
    BadArguments { message: String },

    /// Application-level error relayed by the server, carrying its own code.
    #[error("application error {code}: {message}")]
    Application {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    /// Server-side failure reported through the transport status (5xx).
    #[error("server error (status {status})")]
    ServerFailure { status: u16 },

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response decoded but does not fit the JSON-RPC response shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Operation exceeded the configured timeout.
    #[error("operation timed out")]
    Timeout,
}

impl ClientError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Map a wire error object onto the typed taxonomy.
    pub fn from_error_object(error: JsonRpcErrorObject) -> Self {
        match error.code {
            -32700 | -32600 => Self::Protocol {
                code: error.code,
                message: error.message,
            },
            -32601 => Self::UnknownProcedure {
                message: error.message,
            },
            -32602 => Self::BadArguments {
                message: error.message,
            },
            code => Self::Application {
                code,
                message: error.message,
                data: error.data,
            },
        }
    }

    /// Get the application error code, if any.
    pub fn application_code(&self) -> Option<i64> {
        match self {
            Self::Application { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether this failure originated below the JSON-RPC layer.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::AccessDenied | Self::ServerFailure { .. } | Self::Timeout
        )
    }
}
