//! Configuration types for the JSON-RPC client

use std::collections::HashMap;
use std::time::Duration;

/// Timeout configuration handed to the transport
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Connection timeout
    pub connect: Duration,

    /// Request timeout for individual operations
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(30),
        }
    }
}

/// Main client configuration
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Timeout configurations
    pub timeouts: TimeoutConfig,

    /// Custom headers to include in requests (e.g. pre-built authorization)
    pub headers: HashMap<String, String>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}
