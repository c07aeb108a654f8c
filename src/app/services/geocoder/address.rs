//! Address normalization for geocoding requests

use crate::app::models::Provider;
use crate::constants::{CITY_CORRECTIONS, STREET_CORRECTIONS};

fn lookup<'a>(table: &'a [(&'a str, &'a str)], value: &'a str) -> &'a str {
    table
        .iter()
        .find(|(from, _)| from.eq_ignore_ascii_case(value))
        .map_or(value, |(_, to)| *to)
}

/// Replace a street the geocoder cannot resolve with its corrected form
pub fn normalize_street(street: &str) -> &str {
    lookup(STREET_CORRECTIONS, street)
}

/// Replace an abbreviated city name with the spelling the geocoder expects
pub fn normalize_city(city: &str) -> &str {
    lookup(CITY_CORRECTIONS, city)
}

/// Single-line address: `"<street>, <city>, <state> <zip>"`
pub fn compose_address(street: &str, city: &str, state: &str, zip: &str) -> String {
    format!(
        "{}, {}, {} {}",
        normalize_street(street),
        normalize_city(city),
        state,
        zip
    )
}

/// Geocoding address of a registered provider
pub fn provider_address(provider: &Provider) -> String {
    compose_address(&provider.street, &provider.city, &provider.state, &provider.zip)
}

/// Key used to match a returned address against provider addresses
pub fn match_key(address: &str) -> String {
    address.trim().to_lowercase()
}
