//! Tests for geocoding reconciliation
//!
//! Provides an in-memory [`GeocodeService`] so no test touches the network.

use super::{GeocodeLocation, GeocodeResult, GeocodeService, LatLng, ProvidedLocation};
use crate::app::models::ChargeRow;
use crate::app::services::diagnostics::DiagnosticLog;
use crate::app::services::provider_registry::ProviderRegistry;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

mod address_tests;
mod client_tests;

/// Fake geocoder answering from a fixed table of address -> result
#[derive(Default)]
pub struct FakeGeocoder {
    answers: HashMap<String, GeocodeResult>,
    /// Addresses echoed back upper-cased, to exercise case-insensitive matching
    shout: bool,
    /// Every result sent twice
    repeat: bool,
    fail: bool,
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn shouting(mut self) -> Self {
        self.shout = true;
        self
    }

    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn answer(mut self, address: &str, quality: &str, lat: f64, lng: f64) -> Self {
        self.answers.insert(
            address.to_lowercase(),
            GeocodeResult {
                provided_location: ProvidedLocation {
                    location: address.to_string(),
                },
                locations: vec![GeocodeLocation {
                    geocode_quality: quality.to_string(),
                    lat_lng: LatLng { lat, lng },
                }],
            },
        );
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GeocodeService for FakeGeocoder {
    async fn geocode_batch(&self, addresses: &[String]) -> Result<Vec<GeocodeResult>> {
        self.calls.lock().unwrap().push(addresses.to_vec());
        if self.fail {
            return Err(Error::geocoding("service unavailable"));
        }

        // Answer in reverse order; matching must not depend on position
        let mut results: Vec<GeocodeResult> = addresses
            .iter()
            .filter_map(|a| self.answers.get(&a.to_lowercase()).cloned())
            .map(|mut r| {
                if self.shout {
                    r.provided_location.location = r.provided_location.location.to_uppercase();
                }
                r
            })
            .collect();
        results.reverse();
        if self.repeat {
            let copy = results.clone();
            results.extend(copy);
        }
        Ok(results)
    }
}

/// Build a registry from `(id, street, city)` triples in Minnesota
pub fn registry_with(providers: &[(&str, &str, &str)]) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    let mut log = DiagnosticLog::new();
    for (index, (id, street, city)) in providers.iter().enumerate() {
        let row = ChargeRow {
            provider_id: id.to_string(),
            provider_name: format!("HOSPITAL {}", id),
            street: street.to_string(),
            city: city.to_string(),
            state: "MN".to_string(),
            zip: "55000".to_string(),
            referral_region: "MN - Minneapolis".to_string(),
            ..Default::default()
        };
        registry.ingest(&row, index + 1, &mut log);
    }
    registry
}
