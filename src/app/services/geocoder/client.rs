//! HTTP client for the MapQuest batch geocoding endpoint
//!
//! One GET per batch: the API key plus one repeated `location=` parameter per
//! address. Each call is bounded by the configured timeout and retried on
//! transient failures (timeouts, connection errors, 5xx responses). A non-zero
//! service status code in the body fails the batch without a retry.

use super::{GeocodeResponse, GeocodeResult, GeocodeService};
use crate::config::GeocodingConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct MapQuestClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl MapQuestClient {
    /// Build a client from the geocoding configuration
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::configuration("Geocoding is enabled but no API key is set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::http("Failed to create HTTP client", e))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    fn query_pairs<'a>(&'a self, addresses: &'a [String]) -> Vec<(&'static str, &'a str)> {
        let mut pairs = Vec::with_capacity(addresses.len() + 1);
        pairs.push(("key", self.api_key.as_str()));
        pairs.extend(addresses.iter().map(|a| ("location", a.as_str())));
        pairs
    }

    async fn request_once(&self, addresses: &[String]) -> Result<Vec<GeocodeResult>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query_pairs(addresses))
            .send()
            .await
            .map_err(|e| Error::http("Geocoding request failed", e))?
            .error_for_status()
            .map_err(|e| Error::http("Geocoding service returned an error status", e))?;

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| Error::http("Failed to decode geocoding response", e))?;

        if body.info.statuscode != 0 {
            return Err(Error::geocoding(format!(
                "Service reported status {}: {}",
                body.info.statuscode,
                body.info.messages.join("; ")
            )));
        }

        Ok(body.results)
    }
}

#[async_trait]
impl GeocodeService for MapQuestClient {
    async fn geocode_batch(&self, addresses: &[String]) -> Result<Vec<GeocodeResult>> {
        info!("Requesting coordinates for {} addresses", addresses.len());

        let mut attempt = 0;
        loop {
            match self.request_once(addresses).await {
                Ok(results) => {
                    debug!("Geocoder returned {} results", results.len());
                    return Ok(results);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "Geocoding attempt {} failed, retrying: {}",
                        attempt, e
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
