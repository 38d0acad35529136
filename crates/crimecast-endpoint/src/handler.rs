//! The function body: query-string payload in, endpoint JSON out.

use serde_json::value::RawValue;
use thiserror::Error;
use tracing::info;

use crate::client::{EndpointInvoker, InvokeError};
use crate::event::{ApiGatewayEvent, FunctionResponse};

/// Query parameter carrying the CSV feature row.
pub const PAYLOAD_PARAM: &str = "data";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Error, Debug)]
pub enum FunctionError {
    #[error("event has no queryStringParameters.data")]
    MissingPayload,
    #[error("endpoint invocation failed: {0}")]
    Invoke(#[from] InvokeError),
    #[error("endpoint returned invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl FunctionError {
    /// Short type name reported to the function platform.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingPayload => "MissingPayload",
            Self::Invoke(_) => "InvokeError",
            Self::Json(_) => "InvalidResponse",
        }
    }
}

/// Relays payloads to one named endpoint.
pub struct Handler<I> {
    endpoint_name: String,
    invoker: I,
}

impl<I: EndpointInvoker> Handler<I> {
    pub fn new(endpoint_name: String, invoker: I) -> Self {
        Self {
            endpoint_name,
            invoker,
        }
    }

    pub fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }

    /// Forward the event's CSV payload and wrap the endpoint's JSON result.
    ///
    /// The result is checked to be one JSON document and relayed as written:
    /// key order and number spelling are kept.
    pub async fn handle(&self, event: &ApiGatewayEvent) -> Result<FunctionResponse, FunctionError> {
        let payload = event
            .query_param(PAYLOAD_PARAM)
            .ok_or(FunctionError::MissingPayload)?;
        info!(payload, endpoint = %self.endpoint_name, "received payload");

        let raw = self
            .invoker
            .invoke(&self.endpoint_name, CSV_CONTENT_TYPE, payload)
            .await?;
        let result: Box<RawValue> = serde_json::from_slice(&raw)?;

        Ok(FunctionResponse::json(result.get().to_string()))
    }
}
