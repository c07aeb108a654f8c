//! Merge batch geocoding results into the provider registry

use super::address::{match_key, provider_address};
use super::overrides::ManualOverride;
use super::{GeocodeResult, GeocodeService};
use crate::app::services::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::app::services::provider_registry::ProviderRegistry;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info};

/// Outcome counts of one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Distinct addresses sent to the service
    pub addresses_requested: usize,
    pub batches_sent: usize,
    pub batches_failed: usize,
    pub providers_geocoded: usize,
    pub providers_overridden: usize,
    pub quality_failures: usize,
    pub providers_missing: usize,
}

/// Drives batch geocoding for a provider registry
pub struct GeocodingReconciler<S: GeocodeService> {
    service: S,
    batch_size: usize,
    overrides: Vec<ManualOverride>,
}

impl<S: GeocodeService> GeocodingReconciler<S> {
    pub fn new(service: S, batch_size: usize, overrides: Vec<ManualOverride>) -> Self {
        Self {
            service,
            batch_size: batch_size.max(1),
            overrides,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Geocode every provider and assign coordinates by address match
    ///
    /// Resolves once every batch has completed or failed. Providers that end up
    /// without coordinates are reported, never dropped.
    pub async fn reconcile(
        &self,
        registry: &mut ProviderRegistry,
        log: &mut DiagnosticLog,
    ) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        // Normalized address -> providers at that address, in registry order
        let mut providers_by_address: HashMap<String, Vec<String>> = HashMap::new();
        let mut addresses = Vec::new();
        for provider in registry.iter() {
            let address = provider_address(provider);
            let ids = providers_by_address.entry(match_key(&address)).or_default();
            if ids.is_empty() {
                addresses.push(address);
            }
            ids.push(provider.id.clone());
        }
        summary.addresses_requested = addresses.len();

        info!(
            "Geocoding {} providers at {} distinct addresses",
            registry.len(),
            addresses.len()
        );

        let mut results = Vec::new();
        for batch in addresses.chunks(self.batch_size) {
            summary.batches_sent += 1;
            match self.service.geocode_batch(batch).await {
                Ok(batch_results) => results.extend(batch_results),
                Err(e) => {
                    summary.batches_failed += 1;
                    error!("Geocoding batch of {} addresses failed: {}", batch.len(), e);
                }
            }
        }

        let mut answered: HashSet<String> = HashSet::new();
        let mut seen_addresses: HashSet<String> = HashSet::new();
        for result in &results {
            let key = match_key(result.address());
            let Some(ids) = providers_by_address.get(&key) else {
                debug!("Geocoding result matches no provider: {}", result.address());
                continue;
            };
            if !seen_addresses.insert(key) {
                debug!("Ignoring repeated result for {}", result.address());
                continue;
            }
            answered.extend(ids.iter().cloned());

            self.apply_result(result, ids, registry, log, &mut summary);
        }

        for provider in registry.iter() {
            if !answered.contains(&provider.id) {
                summary.providers_missing += 1;
                log.report(
                    DiagnosticKind::GeocodeMissing,
                    format!(
                        "No geocoding result for provider {} ({})",
                        provider.id,
                        provider_address(provider)
                    ),
                );
            }
        }

        info!(
            "Geocoding complete: {} geocoded, {} overridden, {} quality failures, {} missing",
            summary.providers_geocoded,
            summary.providers_overridden,
            summary.quality_failures,
            summary.providers_missing
        );

        summary
    }

    fn apply_result(
        &self,
        result: &GeocodeResult,
        ids: &[String],
        registry: &mut ProviderRegistry,
        log: &mut DiagnosticLog,
        summary: &mut ReconcileSummary,
    ) {
        if let Some(location) = result.best_location() {
            for id in ids {
                if let Some(provider) = registry.get_mut(id) {
                    provider.set_coordinates(location.lat_lng.lat, location.lat_lng.lng);
                    summary.providers_geocoded += 1;
                }
            }
            return;
        }

        let mut corrected = None;
        if let Some(correction) = self
            .overrides
            .iter()
            .find(|o| o.matches_address(result.address()))
        {
            if let Some(provider) = registry.get_mut(&correction.provider_id) {
                info!(
                    "Applying manual coordinates to provider {}",
                    correction.provider_id
                );
                provider.set_coordinates(correction.lat, correction.lng);
                summary.providers_overridden += 1;
                corrected = Some(correction.provider_id.as_str());
            }
        }

        for id in ids.iter().filter(|id| Some(id.as_str()) != corrected) {
            summary.quality_failures += 1;
            log.report(
                DiagnosticKind::GeocodeQualityFailure,
                format!(
                    "Geocoding quality failure for provider {}: {}",
                    id,
                    result.address()
                ),
            );
        }
    }
}
