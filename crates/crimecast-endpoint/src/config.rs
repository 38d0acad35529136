//! Environment configuration, read once at cold start.

use thiserror::Error;

pub const ENDPOINT_NAME: &str = "ENDPOINT_NAME";
pub const RUNTIME_URL: &str = "SAGEMAKER_RUNTIME_URL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {0} is empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionConfig {
    /// Name of the deployed inference endpoint.
    pub endpoint_name: String,
    /// Base URL of the inference runtime service. Requests go out unsigned,
    /// so this must be a signing proxy or an endpoint that needs no auth.
    pub runtime_url: String,
}

impl FunctionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source.
    ///
    /// There is no regional default for `SAGEMAKER_RUNTIME_URL`: the public
    /// runtime service rejects unsigned requests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let endpoint_name = required(&lookup, ENDPOINT_NAME)?;
        let runtime_url = required(&lookup, RUNTIME_URL)?
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            endpoint_name,
            runtime_url,
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    let value = lookup(key).ok_or(ConfigError::Missing(key))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Empty(key));
    }
    Ok(value.to_string())
}
