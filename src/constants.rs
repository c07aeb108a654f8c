//! Application constants for the charge processor
//!
//! This module contains column positions of the CMS source file, default values,
//! artifact names and the static lookup tables used during geocoding.

// =============================================================================
// Source Columns
// =============================================================================

/// Fixed column positions of the Medicare inpatient charge file
///
/// ```text
/// 0  DRG Definition
/// 1  Provider Id
/// 2  Provider Name
/// 3  Provider Street Address
/// 4  Provider City
/// 5  Provider State
/// 6  Provider Zip Code
/// 7  Hospital Referral Region Description
/// 8  Total Discharges
/// 9  Average Covered Charges
/// 10 Average Total Payments
/// ```
pub mod columns {
    pub const DRG_DEFINITION: usize = 0;
    pub const PROVIDER_ID: usize = 1;
    pub const PROVIDER_NAME: usize = 2;
    pub const STREET: usize = 3;
    pub const CITY: usize = 4;
    pub const STATE: usize = 5;
    pub const ZIP: usize = 6;
    pub const REFERRAL_REGION: usize = 7;
    pub const TOTAL_DISCHARGES: usize = 8;
    pub const AVG_COVERED_CHARGES: usize = 9;
    pub const AVG_TOTAL_PAYMENTS: usize = 10;
}

// =============================================================================
// Defaults
// =============================================================================

/// Default source file, relative to the working directory
pub const DEFAULT_INPUT_PATH: &str =
    "data/original/Medicare_Provider_Charge_Inpatient_DRG100_FY2011.csv";

/// Default directory for the converted JSON artifacts
pub const DEFAULT_OUTPUT_PATH: &str = "data/converted";

/// Default state used for provider, charge and state level statistics
pub const DEFAULT_STATE_FILTER: &str = "MN";

/// Separator between state and DRG code in composite statistic keys
pub const STAT_KEY_SEPARATOR: &str = "-";

/// Environment variables consulted while loading configuration
pub mod env_vars {
    pub const INPUT_PATH: &str = "CHARGE_PROCESSOR_INPUT";
    pub const OUTPUT_PATH: &str = "CHARGE_PROCESSOR_OUTPUT";
    pub const STATE_FILTER: &str = "CHARGE_PROCESSOR_STATE";
    pub const GEOCODER_KEY: &str = "CHARGE_PROCESSOR_GEOCODER_KEY";
}

/// Application directory name below the user config dir
pub const CONFIG_DIR_NAME: &str = "charge-processor";
pub const CONFIG_FILE_NAME: &str = "config.toml";

// =============================================================================
// Artifacts
// =============================================================================

pub mod artifacts {
    pub const DRGS: &str = "drgs.json";
    pub const CHARGES: &str = "charges.json";
    pub const PROVIDERS: &str = "providers.json";
    pub const STATS: &str = "stats.json";
}

// =============================================================================
// Geocoding
// =============================================================================

/// MapQuest batch geocoding endpoint
pub const GEOCODER_ENDPOINT: &str = "http://www.mapquestapi.com/geocoding/v1/batch";

/// Maximum locations the batch endpoint accepts per call
pub const GEOCODER_MAX_BATCH: usize = 100;

pub const GEOCODER_TIMEOUT_SECS: u64 = 30;
pub const GEOCODER_MAX_RETRIES: u32 = 1;
pub const GEOCODER_RETRY_BACKOFF_MS: u64 = 2000;

/// Quality tags precise enough to place a provider on the map
pub const ACCEPTED_GEOCODE_QUALITIES: &[&str] = &["ADDRESS", "POINT"];

/// Street values the geocoder cannot resolve as printed in the source data
///
/// Matched case-insensitively against the whole street field.
pub const STREET_CORRECTIONS: &[(&str, &str)] = &[
    ("1 ST MARYS PLACE", "1216 2ND ST SW"),
    ("800 E 28TH STREET AT CHICAGO AVENUE", "800 E 28TH ST"),
    ("640 JACKSON STREET", "640 JACKSON ST"),
    ("200 FIRST STREET SW", "200 1ST ST SW"),
    ("1700 HWY 169 SOUTH", "1700 HIGHWAY 169 S"),
];

/// City names the geocoder expects spelled out
pub const CITY_CORRECTIONS: &[(&str, &str)] = &[
    ("ST PAUL", "SAINT PAUL"),
    ("ST CLOUD", "SAINT CLOUD"),
    ("ST LOUIS PARK", "SAINT LOUIS PARK"),
    ("ST PETER", "SAINT PETER"),
    ("ST JOSEPH", "SAINT JOSEPH"),
];

/// Built-in manual coordinate corrections keyed by provider identifier
///
/// Each entry is `(provider_id, geocoded address the service gets wrong, lat, lng)`.
pub const MANUAL_COORDINATE_OVERRIDES: &[(&str, &str, f64, f64)] = &[(
    "240010",
    "1216 2ND ST SW, ROCHESTER, MN 55902",
    44.0225,
    -92.4816,
)];
