//! HTTP client for invoking a named inference endpoint.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned {status}: {body}")]
    Server { status: u16, body: String },
}

/// Sends a payload to a named endpoint and returns the raw response body.
#[async_trait]
pub trait EndpointInvoker: Send + Sync {
    async fn invoke(
        &self,
        endpoint_name: &str,
        content_type: &str,
        payload: &str,
    ) -> Result<Vec<u8>, InvokeError>;
}

/// reqwest-backed client for the inference runtime's
/// `POST /endpoints/<name>/invocations` API.
pub struct RuntimeClient {
    client: reqwest::Client,
    base_url: String,
}

impl RuntimeClient {
    /// `base_url` is the runtime service root, typically a signing proxy such
    /// as `http://localhost:8080`.
    pub fn new(base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn invocation_url(&self, endpoint_name: &str) -> String {
        format!("{}/endpoints/{endpoint_name}/invocations", self.base_url)
    }
}

#[async_trait]
impl EndpointInvoker for RuntimeClient {
    async fn invoke(
        &self,
        endpoint_name: &str,
        content_type: &str,
        payload: &str,
    ) -> Result<Vec<u8>, InvokeError> {
        let url = self.invocation_url(endpoint_name);

        info!(url = %url, bytes = payload.len(), "invoking inference endpoint");
        let resp = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT, "application/json")
            .body(payload.to_string())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InvokeError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        info!(bytes = body.len(), "endpoint responded");
        Ok(body.to_vec())
    }
}
