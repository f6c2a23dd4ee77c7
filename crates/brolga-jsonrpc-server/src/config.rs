//! Server-side configuration.

use std::fmt;

use crate::registry::BeforeCallHook;

/// Configuration recognized by the dispatch core.
#[derive(Clone)]
pub struct ServerConfig {
    /// When set, object-shaped params are spread into named arguments
    /// (the default). When cleared, an object param is handed to the target
    /// untouched as a single positional argument.
    pub named_params_from_map: bool,

    /// Hook consulted before every class/instance method invocation with the
    /// caller's credentials and the resolved target. Its success value is
    /// discarded; an error aborts the call.
    pub before_hook: Option<BeforeCallHook>,
}

impl ServerConfig {
    pub fn new() -> Self {
        Self {
            named_params_from_map: true,
            before_hook: None,
        }
    }

    pub fn named_params_from_map(mut self, enabled: bool) -> Self {
        self.named_params_from_map = enabled;
        self
    }

    pub fn with_before_hook(mut self, hook: BeforeCallHook) -> Self {
        self.before_hook = Some(hook);
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("named_params_from_map", &self.named_params_from_map)
            .field("before_hook", &self.before_hook.as_ref().map(|_| "<hook>"))
            .finish()
    }
}
