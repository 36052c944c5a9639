//! # Middleware
//!
//! - [`request_context`]: request id, trace context and request/response
//!   logging for every route.
//! - [`tracing_layer`]: tower-http trace spans.
//!
//! Authentication lives in [`crate::auth`].

pub mod request_context;
pub mod tracing_layer;
