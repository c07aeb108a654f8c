//! Tests for address normalization

use crate::app::services::geocoder::address::match_key;
use crate::app::services::geocoder::{compose_address, normalize_city, normalize_street};

#[test]
fn test_compose_address() {
    assert_eq!(
        compose_address("100 MAIN ST", "ROCHESTER", "MN", "55902"),
        "100 MAIN ST, ROCHESTER, MN 55902"
    );
}

#[test]
fn test_city_lookup_is_case_insensitive() {
    assert_eq!(normalize_city("ST PAUL"), "SAINT PAUL");
    assert_eq!(normalize_city("St Paul"), "SAINT PAUL");
    assert_eq!(normalize_city("MINNEAPOLIS"), "MINNEAPOLIS");
}

#[test]
fn test_street_lookup_replaces_whole_value_only() {
    assert_eq!(normalize_street("1 ST MARYS PLACE"), "1216 2ND ST SW");
    assert_eq!(normalize_street("1 ST MARYS PLACE NORTH"), "1 ST MARYS PLACE NORTH");
}

#[test]
fn test_composed_address_uses_both_lookups() {
    assert_eq!(
        compose_address("640 JACKSON STREET", "ST PAUL", "MN", "55101"),
        "640 JACKSON ST, SAINT PAUL, MN 55101"
    );
}

#[test]
fn test_match_key() {
    assert_eq!(match_key("  100 Main St, Rochester "), "100 main st, rochester");
}
