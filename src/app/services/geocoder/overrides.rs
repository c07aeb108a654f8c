//! Manual coordinate corrections
//!
//! Some addresses never geocode at an accepted quality. When the result for one
//! of these addresses cannot be used, the provider named by the override
//! receives the stored coordinates instead. Accepted results are never replaced.

use crate::constants::MANUAL_COORDINATE_OVERRIDES;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualOverride {
    pub provider_id: String,
    /// Normalized address whose geocoding result is replaced
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

impl ManualOverride {
    pub fn matches_address(&self, address: &str) -> bool {
        self.address.trim().eq_ignore_ascii_case(address.trim())
    }
}

/// The corrections shipped with the tool
pub fn builtin_overrides() -> Vec<ManualOverride> {
    MANUAL_COORDINATE_OVERRIDES
        .iter()
        .map(|(provider_id, address, lat, lng)| ManualOverride {
            provider_id: provider_id.to_string(),
            address: address.to_string(),
            lat: *lat,
            lng: *lng,
        })
        .collect()
}
