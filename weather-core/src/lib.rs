//! # Weather Core - capability registry and dispatch
//!
//! The transport-independent heart of the weather MCP server:
//!
//! - **Capabilities**: named tools and prompts described by a
//!   [`CapabilityDescriptor`] (ordered parameter schema, return kind, handler)
//! - **Registry**: built once at startup, read-only afterwards, one name space
//!   per [`CapabilityKind`]
//! - **Binding**: raw JSON arguments validated and coerced against the schema
//! - **Dispatch**: lookup, bind, invoke, and package the outcome as a
//!   [`Response`] that is either `Success` or `Failure`
//!
//! ```text
//! Request ──► Registry::lookup ──► ArgumentBinder::bind ──► Handler::call
//!                  │                        │                     │
//!                  ▼                        ▼                     ▼
//!          UnknownCapability        InvalidArguments       HandlerError
//!                  └───────────────┬────────┴─────────────────────┘
//!                                  ▼
//!                           Response::Failure        (or Response::Success)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use weather_core::{
//!     BoundArguments, CapabilityDescriptor, Dispatcher, HandlerResult, ParamSpec, ParamType,
//!     Registry, Request, Response,
//! };
//!
//! fn forecast(args: &BoundArguments) -> HandlerResult {
//!     let city = args.get_str("city").unwrap_or_default();
//!     Ok(format!("Clear skies over {city}").into())
//! }
//!
//! let tool = CapabilityDescriptor::tool("forecast")
//!     .param(ParamSpec::required("city", ParamType::String))
//!     .handler(forecast)
//!     .build()
//!     .unwrap();
//!
//! let registry = Registry::from_descriptors(vec![tool]).unwrap();
//! let dispatcher = Dispatcher::new(Arc::new(registry));
//!
//! let arguments = json!({"city": "Oslo"}).as_object().cloned().unwrap();
//! let response = dispatcher.dispatch(&Request::tool("forecast", arguments));
//!
//! match response {
//!     Response::Success(output) => assert_eq!(output.as_text(), Some("Clear skies over Oslo")),
//!     Response::Failure(failure) => panic!("unexpected failure: {}", failure.message),
//! }
//! ```

pub mod binder;
pub mod capability;
pub mod dispatcher;
pub mod error;
pub mod registry;

pub use binder::{ArgumentBinder, BoundArguments};
pub use capability::{
    CapabilityDescriptor, CapabilityKind, DescriptorBuilder, Handler, HandlerResult, Message,
    Output, ParamSpec, ParamType, ParamValue, ReturnKind, Role,
};
pub use dispatcher::{Dispatcher, Failure, Request, Response};
pub use error::{BindingError, FailureKind, HandlerError, RegistryError};
pub use registry::Registry;
