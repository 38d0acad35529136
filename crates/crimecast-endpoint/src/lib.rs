//! Function adapter: take a CSV payload from an HTTP-triggered invocation,
//! forward it to a managed inference endpoint, relay the JSON result.

pub mod client;
pub mod config;
pub mod event;
pub mod handler;
pub mod runtime;

#[cfg(test)]
mod testing;

pub use client::{EndpointInvoker, InvokeError, RuntimeClient};
pub use config::{ConfigError, FunctionConfig};
pub use event::{ApiGatewayEvent, FunctionResponse};
pub use handler::{FunctionError, Handler};
pub use runtime::RuntimeApi;
