//! Request dispatch
//!
//! The dispatcher is the single place where a failure of any kind turns into
//! a response: unknown names, rejected arguments, handler errors and handler
//! panics all come back as [`Response::Failure`]. Nothing raised while
//! serving one request reaches the caller as an `Err`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::binder::{ArgumentBinder, BoundArguments};
use crate::capability::{CapabilityDescriptor, CapabilityKind, Output};
use crate::error::FailureKind;
use crate::registry::Registry;

/// A transport-independent capability request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub kind: CapabilityKind,
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl Request {
    pub fn new(kind: CapabilityKind, name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            kind,
            name: name.into(),
            arguments,
        }
    }

    pub fn tool(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self::new(CapabilityKind::Tool, name, arguments)
    }

    pub fn prompt(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self::new(CapabilityKind::Prompt, name, arguments)
    }
}

/// Why a dispatch failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of one dispatch cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Success(Output),
    Failure(Failure),
}

impl Response {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Response::Failure(Failure {
            kind,
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    pub fn output(&self) -> Option<&Output> {
        match self {
            Response::Success(output) => Some(output),
            Response::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Response::Success(_) => None,
            Response::Failure(failure) => Some(failure),
        }
    }
}

/// Resolves requests against a registry and runs the matching handler
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Serve one request; never fails outward
    pub fn dispatch(&self, request: &Request) -> Response {
        // 1. Resolve
        let descriptor = match self.registry.lookup(request.kind, &request.name) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                debug!(kind = %request.kind, name = %request.name, "unknown capability");
                return Response::failure(FailureKind::UnknownCapability, e.to_string());
            }
        };

        // 2. Bind
        let bound = match ArgumentBinder::bind(descriptor, &request.arguments) {
            Ok(bound) => bound,
            Err(e) => {
                debug!(name = %request.name, code = e.code(), "argument binding failed");
                return Response::failure(FailureKind::InvalidArguments, e.to_string());
            }
        };

        // 3. Invoke
        let traced = descriptor.kind() == CapabilityKind::Tool;
        if traced {
            info!(tool = descriptor.name(), phase = "start", "tool invocation");
        }

        let result = invoke(descriptor, &bound);

        if traced {
            info!(tool = descriptor.name(), phase = "end", ok = result.is_ok(), "tool invocation");
        }

        // 4. Package
        match result {
            Ok(output) => Response::Success(output),
            Err(message) => {
                warn!(kind = %request.kind, name = %request.name, error = %message, "handler failed");
                Response::failure(FailureKind::HandlerError, message)
            }
        }
    }
}

/// Run the handler, turning returned errors and panics into a message
fn invoke(descriptor: &CapabilityDescriptor, bound: &BoundArguments) -> Result<Output, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| descriptor.invoke(bound))) {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("handler panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("handler panicked: {s}")
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::capability::{HandlerResult, Message, ParamSpec, ParamType};
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn greet(args: &BoundArguments) -> HandlerResult {
        Ok(format!("hello {}", args.get_str("name").unwrap_or_default()).into())
    }

    fn dispatcher_with(descriptors: Vec<CapabilityDescriptor>) -> Dispatcher {
        Dispatcher::new(Arc::new(Registry::from_descriptors(descriptors).unwrap()))
    }

    #[test]
    fn test_dispatch_success() {
        let dispatcher = dispatcher_with(vec![CapabilityDescriptor::tool("greet")
            .param(ParamSpec::required("name", ParamType::String))
            .handler(greet)
            .build()
            .unwrap()]);

        let response = dispatcher.dispatch(&Request::tool("greet", args(json!({"name": "Ada"}))));
        assert_eq!(response, Response::Success(Output::Text("hello Ada".to_string())));
    }

    #[test]
    fn test_unknown_capability_skips_handlers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let dispatcher = dispatcher_with(vec![CapabilityDescriptor::tool("counted")
            .handler(move |_: &BoundArguments| -> HandlerResult {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("done".into())
            })
            .build()
            .unwrap()]);

        let response = dispatcher.dispatch(&Request::tool("missing", Map::new()));
        let failure = response.as_failure().unwrap();
        assert_eq!(failure.kind, FailureKind::UnknownCapability);
        assert_eq!(failure.message, "tool 'missing' is not registered");

        // A prompt lookup does not fall through to tools
        let response = dispatcher.dispatch(&Request::prompt("counted", Map::new()));
        assert_eq!(response.as_failure().unwrap().kind, FailureKind::UnknownCapability);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_binding_failure_is_invalid_arguments() {
        let dispatcher = dispatcher_with(vec![CapabilityDescriptor::tool("greet")
            .param(ParamSpec::required("name", ParamType::String))
            .handler(greet)
            .build()
            .unwrap()]);

        let response = dispatcher.dispatch(&Request::tool("greet", Map::new()));
        let failure = response.as_failure().unwrap();
        assert_eq!(failure.kind, FailureKind::InvalidArguments);
        assert_eq!(failure.message, "missing required argument 'name'");
    }

    #[test]
    fn test_handler_error_is_captured() {
        let dispatcher = dispatcher_with(vec![CapabilityDescriptor::tool("broken")
            .handler(|_: &BoundArguments| -> HandlerResult { Err("upstream unavailable".into()) })
            .build()
            .unwrap()]);

        let response = dispatcher.dispatch(&Request::tool("broken", Map::new()));
        assert_eq!(
            response,
            Response::failure(FailureKind::HandlerError, "upstream unavailable")
        );
    }

    #[test]
    fn test_handler_panic_is_captured() {
        let dispatcher = dispatcher_with(vec![CapabilityDescriptor::tool("panics")
            .handler(|_: &BoundArguments| -> HandlerResult { panic!("boom") })
            .build()
            .unwrap()]);

        let response = dispatcher.dispatch(&Request::tool("panics", Map::new()));
        let failure = response.as_failure().unwrap();
        assert_eq!(failure.kind, FailureKind::HandlerError);
        assert!(failure.message.contains("boom"));

        // Dispatcher is still usable afterwards
        let again = dispatcher.dispatch(&Request::tool("panics", Map::new()));
        assert!(!again.is_success());
    }

    #[test]
    fn test_prompt_return_shape_not_enforced() {
        let dispatcher = dispatcher_with(vec![CapabilityDescriptor::prompt("declared_text")
            .handler(|_: &BoundArguments| -> HandlerResult { Ok(vec![Message::system("be brief")].into()) })
            .build()
            .unwrap()]);

        let response = dispatcher.dispatch(&Request::prompt("declared_text", Map::new()));
        let messages = response.output().and_then(Output::as_messages).unwrap();
        assert_eq!(messages, &[Message::system("be brief")]);
    }
}
