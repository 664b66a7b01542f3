// src/uplink.rs
//! Feature store upload client

use crate::config::Credentials;
use crate::error::{Result, UplinkError};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://xyz.api.here.com";

/// Destination for encoded payloads.
///
/// The pipeline is generic over this so it can run against an in-memory
/// sink in tests.
#[allow(async_fn_in_trait)]
pub trait FeatureSink {
    /// Deliver one payload; returns the response body for diagnostics.
    async fn push(&mut self, payload: Vec<u8>) -> Result<String>;
}

/// HTTP client for a HERE XYZ-style feature store.
pub struct XyzClient {
    credentials: Credentials,
    base_url: String,
    client: reqwest::Client,
}

impl XyzClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    /// Point the client at a different hub, e.g. a local test server.
    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("GpsUplink/1.0 (Rust GPS tracking application)")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| UplinkError::Connection(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            credentials,
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/hub/spaces/{}/features",
            self.base_url, self.credentials.space_id
        )
    }
}

impl FeatureSink for XyzClient {
    /// PUT one feature collection to the store.
    ///
    /// A transport failure is an error; so is a non-success status, surfaced
    /// as `Rejected` with the response body, since a quietly dropped fix is
    /// worse than a loud one.
    async fn push(&mut self, payload: Vec<u8>) -> Result<String> {
        let response = self
            .client
            .put(self.endpoint())
            .header(CONTENT_TYPE, "application/geo+json")
            .bearer_auth(&self.credentials.token)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(UplinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let client = XyzClient::new(Credentials::new("t0ken", "my-space")).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://xyz.api.here.com/hub/spaces/my-space/features"
        );
    }

    #[test]
    fn test_custom_base_url() {
        let client =
            XyzClient::with_base_url(Credentials::new("t", "s"), "http://localhost:8080").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/hub/spaces/s/features");
    }
}
