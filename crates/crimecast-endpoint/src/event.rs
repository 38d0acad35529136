//! Invocation event and response envelope for HTTP-triggered functions.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// The subset of an API gateway proxy event the shim reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayEvent {
    /// Null when the request carried no query string.
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl ApiGatewayEvent {
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }
}

/// Proxy-integration response: status, headers, and a string body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl FunctionResponse {
    /// A 200 response carrying an already-encoded JSON body.
    pub fn json(body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code: 200,
            headers,
            body,
        }
    }
}
