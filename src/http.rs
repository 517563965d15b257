//! Shared HTTP plumbing: one `reqwest::Client` per process, a fixed timeout, the
//! identifying user agent, and uniform mapping of transport and status failures.

use log::warn;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Timeout applied to every upstream call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Media type requested from the weather service.
pub const GEO_JSON: &str = "application/geo+json";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse JSON response from {0}")]
    JsonParse(String, #[source] reqwest::Error),
}

impl UpstreamError {
    /// Status code of a non-2xx response, if that is what this error is.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Builds the client shared by every upstream caller.
///
/// Redirects are followed (reqwest's default policy), which the weather service
/// relies on when coordinates carry more precision than it accepts.
pub fn build_client(user_agent: &str) -> Result<Client, UpstreamError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(user_agent)
        .build()
        .map_err(UpstreamError::ClientBuild)
}

/// Sends `request` and decodes a JSON body, mapping non-2xx responses to
/// [`UpstreamError::HttpStatus`]. Exactly one attempt is made.
pub async fn send_json<T: DeserializeOwned>(
    url: &str,
    request: RequestBuilder,
) -> Result<T, UpstreamError> {
    let response = request
        .send()
        .await
        .map_err(|e| UpstreamError::NetworkRequest(url.to_string(), e))?;

    let response = match response.error_for_status() {
        Ok(resp) => resp,
        Err(e) => {
            warn!("HTTP error for {}: {}", url, e);
            return Err(if let Some(status) = e.status() {
                UpstreamError::HttpStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                }
            } else {
                UpstreamError::NetworkRequest(url.to_string(), e)
            });
        }
    };

    response
        .json::<T>()
        .await
        .map_err(|e| UpstreamError::JsonParse(url.to_string(), e))
}
