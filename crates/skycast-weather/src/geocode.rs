//! Forward geocoding: free-text place names to OpenStreetMap places.
//! Uses Nominatim - free, no API key required, but a User-Agent is mandatory.

use reqwest::Client;
use serde::de::IgnoredAny;
use skycast_core::GeocodeConfig;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{status_text, GeocodeError};

#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Arc<Client>,
    base_url: String,
    result_limit: u32,
}

impl GeocodeClient {
    pub fn new(config: &GeocodeConfig) -> Result<Self, GeocodeError> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: Arc::new(builder.build()?),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            result_limit: config.result_limit,
        })
    }

    /// Search for places matching `query`.
    ///
    /// Returns the upstream body byte for byte once it is known to be JSON;
    /// its shape is Nominatim's, not ours.
    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, query: &str) -> Result<Vec<u8>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let limit = self.result_limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", limit.as_str()),
                ("addressdetails", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Nominatim returned status {}", status);
            return Err(GeocodeError::Upstream {
                status: status.as_u16(),
                status_text: status_text(status),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<IgnoredAny>(&body)
            .map_err(|e| GeocodeError::Parse(format!("JSON parse error: {}", e)))?;

        tracing::debug!("Nominatim returned {} bytes", body.len());
        Ok(body.to_vec())
    }
}
