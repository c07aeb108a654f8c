//! Geocoding reconciliation for the provider registry
//!
//! Provider addresses are sent to a batch geocoding service and the returned
//! coordinates are merged back into the registry by address. Results may come
//! back in any order, so each one is matched by re-deriving the normalized
//! address of every provider and comparing case-insensitively.
//!
//! ## Architecture
//!
//! - [`address`] - Street and city normalization and single-line address composition
//! - [`client`] - HTTP batch client with a bounded timeout and retries
//! - [`overrides`] - Manual coordinate corrections for addresses the service cannot place
//! - [`reconciler`] - Batching, matching and registry updates
//!
//! The service sits behind the [`GeocodeService`] trait so reconciliation can be
//! driven by a fake in tests.

pub mod address;
pub mod client;
pub mod overrides;
pub mod reconciler;

#[cfg(test)]
pub mod tests;

pub use address::{compose_address, normalize_city, normalize_street, provider_address};
pub use client::MapQuestClient;
pub use overrides::ManualOverride;
pub use reconciler::{GeocodingReconciler, ReconcileSummary};

use crate::Result;
use crate::constants::ACCEPTED_GEOCODE_QUALITIES;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A batch geocoding backend
#[async_trait]
pub trait GeocodeService: Send + Sync {
    /// Geocode a batch of single-line addresses
    ///
    /// Results are not required to follow the order of `addresses`.
    async fn geocode_batch(&self, addresses: &[String]) -> Result<Vec<GeocodeResult>>;
}

/// Top-level batch response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub info: ResponseInfo,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

/// Service-level status; a non-zero code means the batch was rejected
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseInfo {
    #[serde(default)]
    pub statuscode: i64,
    #[serde(default)]
    pub messages: Vec<String>,
}

/// Result for one requested address
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    #[serde(default)]
    pub provided_location: ProvidedLocation,
    #[serde(default)]
    pub locations: Vec<GeocodeLocation>,
}

impl GeocodeResult {
    /// The echoed input address
    pub fn address(&self) -> &str {
        &self.provided_location.location
    }

    /// First candidate precise enough to place a provider
    ///
    /// Candidates are scanned in order and the first `ADDRESS` or `POINT` one
    /// wins, so a leading `ZIP` or `CITY` match does not shadow a precise one.
    pub fn best_location(&self) -> Option<&GeocodeLocation> {
        self.locations.iter().find(|l| l.is_accepted())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidedLocation {
    #[serde(default)]
    pub location: String,
}

/// One candidate location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeLocation {
    #[serde(default)]
    pub geocode_quality: String,
    pub lat_lng: LatLng,
}

impl GeocodeLocation {
    pub fn is_accepted(&self) -> bool {
        ACCEPTED_GEOCODE_QUALITIES.contains(&self.geocode_quality.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}
