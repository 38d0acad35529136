//! Client for the function platform's runtime API and the invocation loop.
//!
//! The platform hands out one invocation at a time from
//! `GET /2018-06-01/runtime/invocation/next`; the result goes back to
//! `.../invocation/<id>/response`, a fault to `.../invocation/<id>/error`.
//! A fault before the loop starts goes to `.../runtime/init/error`.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::client::EndpointInvoker;
use crate::event::ApiGatewayEvent;
use crate::handler::Handler;

pub const RUNTIME_API_ENV: &str = "AWS_LAMBDA_RUNTIME_API";
const API_VERSION: &str = "2018-06-01";
const REQUEST_ID_HEADER: &str = "Lambda-Runtime-Aws-Request-Id";
const DEADLINE_HEADER: &str = "Lambda-Runtime-Deadline-Ms";
const ERROR_TYPE_HEADER: &str = "Lambda-Runtime-Function-Error-Type";

/// Error body understood by the runtime API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error_message: String,
    pub error_type: String,
}

impl ErrorReport {
    pub fn new(error_type: &str, error: &dyn std::fmt::Display) -> Self {
        Self {
            error_message: error.to_string(),
            error_type: error_type.to_string(),
        }
    }
}

/// One pending invocation.
#[derive(Debug)]
pub struct Invocation {
    pub request_id: String,
    pub deadline: Option<DateTime<Utc>>,
    pub event: serde_json::Value,
}

pub struct RuntimeApi {
    client: reqwest::Client,
    base_url: String,
}

impl RuntimeApi {
    /// `address` is the `host:port` the platform exposes.
    pub fn new(address: &str) -> Self {
        Self::with_client(reqwest::Client::new(), address)
    }

    pub fn with_client(client: reqwest::Client, address: &str) -> Self {
        let address = address.trim_end_matches('/');
        let base_url = if address.starts_with("http://") || address.starts_with("https://") {
            format!("{address}/{API_VERSION}/runtime")
        } else {
            format!("http://{address}/{API_VERSION}/runtime")
        };
        Self { client, base_url }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let address = std::env::var(RUNTIME_API_ENV)
            .with_context(|| format!("{RUNTIME_API_ENV} is not set; not running inside a function runtime"))?;
        Ok(Self::new(&address))
    }

    /// Block until the platform delivers the next invocation.
    pub async fn next_invocation(&self) -> anyhow::Result<Invocation> {
        let url = format!("{}/invocation/next", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("polling for next invocation")?
            .error_for_status()?;

        let request_id = resp
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .with_context(|| format!("next invocation is missing {REQUEST_ID_HEADER}"))?;
        let deadline = resp
            .headers()
            .get(DEADLINE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_deadline);
        let event = resp.json().await.context("decoding invocation event")?;

        Ok(Invocation {
            request_id,
            deadline,
            event,
        })
    }

    pub async fn post_response<T: Serialize + ?Sized>(
        &self,
        request_id: &str,
        response: &T,
    ) -> anyhow::Result<()> {
        let url = format!("{}/invocation/{request_id}/response", self.base_url);
        self.client
            .post(&url)
            .json(response)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn post_error(&self, request_id: &str, report: &ErrorReport) -> anyhow::Result<()> {
        let url = format!("{}/invocation/{request_id}/error", self.base_url);
        self.post_report(&url, report).await
    }

    /// Report a fault that prevented the function from starting.
    pub async fn post_init_error(&self, report: &ErrorReport) -> anyhow::Result<()> {
        let url = format!("{}/init/error", self.base_url);
        self.post_report(&url, report).await
    }

    async fn post_report(&self, url: &str, report: &ErrorReport) -> anyhow::Result<()> {
        self.client
            .post(url)
            .header(ERROR_TYPE_HEADER, &report.error_type)
            .json(report)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Serve a single invocation: fetch, handle, report.
    pub async fn serve_one<I: EndpointInvoker>(&self, handler: &Handler<I>) -> anyhow::Result<()> {
        let invocation = self.next_invocation().await?;
        let request_id = invocation.request_id.as_str();
        if let Some(deadline) = invocation.deadline {
            let remaining_ms = (deadline - Utc::now()).num_milliseconds();
            info!(request_id, remaining_ms, "invocation received");
        } else {
            info!(request_id, "invocation received");
        }

        let outcome = match serde_json::from_value::<ApiGatewayEvent>(invocation.event) {
            Ok(event) => handler
                .handle(&event)
                .await
                .map_err(|e| ErrorReport::new(e.kind(), &e)),
            Err(e) => Err(ErrorReport::new("InvalidEvent", &e)),
        };

        match outcome {
            Ok(response) => self.post_response(request_id, &response).await,
            Err(report) => {
                warn!(
                    request_id,
                    error_type = %report.error_type,
                    error = %report.error_message,
                    "invocation failed"
                );
                self.post_error(request_id, &report).await
            }
        }
    }

    /// Serve invocations until the runtime API itself fails.
    pub async fn run<I: EndpointInvoker>(&self, handler: &Handler<I>) -> anyhow::Result<()> {
        info!(endpoint = handler.endpoint_name(), "function runtime started");
        loop {
            if let Err(e) = self.serve_one(handler).await {
                error!(error = %e, "runtime API failure");
                return Err(e);
            }
        }
    }
}

/// Deadline header: milliseconds since the Unix epoch.
fn parse_deadline(value: &str) -> Option<DateTime<Utc>> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}
