//! Procedure registration and resolution.
//!
//! A method name resolves to a [`ProcedureBinding`] in a fixed search order:
//! explicitly registered free callbacks first, then explicit class/method
//! bindings, then attached instances in attachment order. The registry is
//! populated during a configuration phase and read-only while serving.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

use crate::error::ProcedureError;
use crate::signature::ParameterSignature;

/// A method exposed by a service: its wire name plus declared signature.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    pub name: String,
    pub signature: ParameterSignature,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>, signature: ParameterSignature) -> Self {
        Self {
            name: name.into(),
            signature,
        }
    }
}

/// A dispatch target exposing one or more named methods.
///
/// Implemented by application types whose methods are called by name. The
/// declared [`MethodSpec`] list drives both resolution (does this service
/// expose the method?) and argument binding.
#[async_trait]
pub trait RpcService: Send + Sync {
    /// Name of the concrete service type, forwarded to the before-hook.
    fn type_name(&self) -> &str;

    /// Methods this service exposes, with their signatures.
    fn methods(&self) -> Vec<MethodSpec>;

    /// Invoke a method with already-bound positional arguments.
    async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, ProcedureError>;
}

/// Boxed async free callback taking bound arguments.
pub type ProcedureFn =
    Arc<dyn Fn(Vec<Value>) -> BoxFuture<'static, Result<Value, ProcedureError>> + Send + Sync>;

/// Factory producing a fresh service instance per invocation.
pub type ServiceFactory = Arc<dyn Fn() -> Box<dyn RpcService> + Send + Sync>;

/// Audit context handed to the before-hook ahead of class/instance calls.
#[derive(Debug, Clone, Copy)]
pub struct CallAudit<'a> {
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    /// Concrete type name of the resolved service.
    pub type_name: &'a str,
    pub method: &'a str,
}

/// Hook consulted before class/instance method invocation.
///
/// The `Ok` value is discarded; the hook exists for auditing and
/// authorization side effects. An `Err` propagates and aborts the call.
pub type BeforeCallHook = Arc<dyn Fn(CallAudit<'_>) -> Result<(), ProcedureError> + Send + Sync>;

struct RegisteredCallback {
    signature: ParameterSignature,
    func: ProcedureFn,
}

struct ClassBinding {
    factory: ServiceFactory,
    method: String,
    type_name: String,
    /// Method list snapshotted at registration from a probe instance, so
    /// resolution can check existence without constructing the service.
    methods: Vec<MethodSpec>,
}

struct AttachedInstance {
    instance: Arc<dyn RpcService>,
    methods: Vec<MethodSpec>,
}

/// A resolved dispatch target.
pub enum ProcedureBinding {
    /// Explicitly registered free callback.
    Callback {
        signature: ParameterSignature,
        func: ProcedureFn,
    },
    /// Class/method pair; the service is constructed per invocation.
    Factory {
        factory: ServiceFactory,
        type_name: String,
        method: String,
        signature: ParameterSignature,
    },
    /// Live instance attached by the caller; referenced, never owned.
    Instance {
        instance: Arc<dyn RpcService>,
        method: String,
        signature: ParameterSignature,
    },
}

impl ProcedureBinding {
    /// Declared signature of the resolved target.
    pub fn signature(&self) -> &ParameterSignature {
        match self {
            ProcedureBinding::Callback { signature, .. } => signature,
            ProcedureBinding::Factory { signature, .. } => signature,
            ProcedureBinding::Instance { signature, .. } => signature,
        }
    }

    /// Whether this target is a class or instance method, i.e. subject to
    /// the before-hook.
    pub fn is_service_method(&self) -> bool {
        !matches!(self, ProcedureBinding::Callback { .. })
    }

    /// Resolved method name on the service; callbacks have none. For class
    /// bindings this is the class method, not the wire name it was
    /// registered under.
    pub fn method_name(&self) -> Option<&str> {
        match self {
            ProcedureBinding::Callback { .. } => None,
            ProcedureBinding::Factory { method, .. } => Some(method),
            ProcedureBinding::Instance { method, .. } => Some(method),
        }
    }

    /// Concrete type name for auditing; callbacks have none.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            ProcedureBinding::Callback { .. } => None,
            ProcedureBinding::Factory { type_name, .. } => Some(type_name),
            ProcedureBinding::Instance { instance, .. } => Some(instance.type_name()),
        }
    }

    /// Invoke the target with bound arguments.
    pub async fn invoke(&self, args: Vec<Value>) -> Result<Value, ProcedureError> {
        match self {
            ProcedureBinding::Callback { func, .. } => (func)(args).await,
            ProcedureBinding::Factory {
                factory, method, ..
            } => {
                let service = (factory)();
                service.call(method, args).await
            }
            ProcedureBinding::Instance {
                instance, method, ..
            } => instance.call(method, args).await,
        }
    }
}

/// Long-lived name-to-target mapping.
///
/// Mutated only by explicit registration calls before serving begins.
#[derive(Default)]
pub struct ProcedureRegistry {
    callbacks: HashMap<String, RegisteredCallback>,
    classes: HashMap<String, ClassBinding>,
    instances: Vec<AttachedInstance>,
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a free callback under a wire name.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, signature: ParameterSignature, func: F)
    where
        F: Fn(Vec<Value>) -> BoxFuture<'static, Result<Value, ProcedureError>>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        debug!(method = %name, "registering callback");
        self.callbacks.insert(
            name,
            RegisteredCallback {
                signature,
                func: Arc::new(func),
            },
        );
    }

    /// Register an explicit class/method pair under a wire name.
    ///
    /// The factory is probed once here to snapshot the exposed methods; the
    /// service itself is constructed anew on every invocation.
    pub fn register_class(
        &mut self,
        name: impl Into<String>,
        factory: ServiceFactory,
        method: impl Into<String>,
    ) {
        let name = name.into();
        let method = method.into();
        let probe = (factory)();
        let binding = ClassBinding {
            type_name: probe.type_name().to_string(),
            methods: probe.methods(),
            factory,
            method,
        };
        debug!(method = %name, class = %binding.type_name, "registering class binding");
        self.classes.insert(name, binding);
    }

    /// Attach a live instance. Its methods are matched by exact name, after
    /// callbacks and class bindings, in attachment order.
    pub fn attach_instance(&mut self, instance: Arc<dyn RpcService>) {
        let methods = instance.methods();
        debug!(class = %instance.type_name(), count = methods.len(), "attaching instance");
        self.instances.push(AttachedInstance { instance, methods });
    }

    /// Resolve a wire method name to a binding. First match wins.
    pub fn resolve(&self, method: &str) -> Option<ProcedureBinding> {
        if let Some(callback) = self.callbacks.get(method) {
            return Some(ProcedureBinding::Callback {
                signature: callback.signature.clone(),
                func: callback.func.clone(),
            });
        }

        if let Some(binding) = self.classes.get(method) {
            // The pair only resolves if the method actually exists on the class.
            if let Some(spec) = binding.methods.iter().find(|m| m.name == binding.method) {
                return Some(ProcedureBinding::Factory {
                    factory: binding.factory.clone(),
                    type_name: binding.type_name.clone(),
                    method: binding.method.clone(),
                    signature: spec.signature.clone(),
                });
            }
        }

        for attached in &self.instances {
            if let Some(spec) = attached.methods.iter().find(|m| m.name == method) {
                return Some(ProcedureBinding::Instance {
                    instance: attached.instance.clone(),
                    method: method.to_string(),
                    signature: spec.signature.clone(),
                });
            }
        }

        None
    }

    /// All names resolvable through explicit registration (callbacks and
    /// class bindings) plus attached instance methods.
    pub fn registered_methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.callbacks.keys().cloned().collect();
        names.extend(self.classes.keys().cloned());
        for attached in &self.instances {
            names.extend(attached.methods.iter().map(|m| m.name.clone()));
        }
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Adder;

    #[async_trait]
    impl RpcService for Adder {
        fn type_name(&self) -> &str {
            "Adder"
        }

        fn methods(&self) -> Vec<MethodSpec> {
            vec![MethodSpec::new(
                "add",
                ParameterSignature::new().required("a").required("b"),
            )]
        }

        async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, ProcedureError> {
            match method {
                "add" => {
                    let a = args[0].as_i64().unwrap_or(0);
                    let b = args[1].as_i64().unwrap_or(0);
                    Ok(json!(a + b))
                }
                other => Err(ProcedureError::application(
                    -1,
                    format!("no such method: {}", other),
                    None,
                )),
            }
        }
    }

    fn callback_registry() -> ProcedureRegistry {
        let mut registry = ProcedureRegistry::new();
        registry.register_fn(
            "add",
            ParameterSignature::new().required("a").required("b"),
            |args| {
                Box::pin(async move {
                    let a = args[0].as_i64().unwrap_or(0);
                    let b = args[1].as_i64().unwrap_or(0);
                    Ok(json!(a + b + 100))
                })
            },
        );
        registry
    }

    #[tokio::test]
    async fn test_callback_resolution_and_invoke() {
        let registry = callback_registry();
        let binding = registry.resolve("add").unwrap();
        assert!(!binding.is_service_method());

        let result = binding.invoke(vec![json!(1), json!(2)]).await.unwrap();
        assert_eq!(result, json!(103));
    }

    #[tokio::test]
    async fn test_callback_shadows_attached_instance() {
        let mut registry = callback_registry();
        registry.attach_instance(Arc::new(Adder));

        // The callback version adds 100; first match wins.
        let binding = registry.resolve("add").unwrap();
        let result = binding.invoke(vec![json!(1), json!(2)]).await.unwrap();
        assert_eq!(result, json!(103));
    }

    #[tokio::test]
    async fn test_class_binding_requires_existing_method() {
        let mut registry = ProcedureRegistry::new();
        registry.register_class("math.add", Arc::new(|| Box::new(Adder)), "add");
        registry.register_class("math.sub", Arc::new(|| Box::new(Adder)), "sub");

        let binding = registry.resolve("math.add").unwrap();
        assert!(binding.is_service_method());
        assert_eq!(binding.type_name(), Some("Adder"));
        let result = binding.invoke(vec![json!(40), json!(2)]).await.unwrap();
        assert_eq!(result, json!(42));

        // "sub" does not exist on Adder, so the pair never resolves.
        assert!(registry.resolve("math.sub").is_none());
    }

    #[tokio::test]
    async fn test_instance_attachment_order() {
        struct Other;

        #[async_trait]
        impl RpcService for Other {
            fn type_name(&self) -> &str {
                "Other"
            }

            fn methods(&self) -> Vec<MethodSpec> {
                vec![MethodSpec::new("add", ParameterSignature::new())]
            }

            async fn call(&self, _method: &str, _args: Vec<Value>) -> Result<Value, ProcedureError> {
                Ok(json!("other"))
            }
        }

        let mut registry = ProcedureRegistry::new();
        registry.attach_instance(Arc::new(Other));
        registry.attach_instance(Arc::new(Adder));

        let binding = registry.resolve("add").unwrap();
        assert_eq!(binding.type_name(), Some("Other"));
    }

    #[test]
    fn test_unknown_method() {
        let registry = callback_registry();
        assert!(registry.resolve("foobar").is_none());
    }

    #[test]
    fn test_registered_methods() {
        let mut registry = callback_registry();
        registry.attach_instance(Arc::new(Adder));
        assert_eq!(registry.registered_methods(), vec!["add".to_string()]);
    }
}
