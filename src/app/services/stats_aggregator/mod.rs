//! Statistics aggregation for charge rows
//!
//! Every data row contributes to the nationwide bucket of its DRG code. Rows of
//! the filter state additionally contribute to the composite `"<STATE>-<DRG>"`
//! bucket. Each bucket collects raw values for five fields during the stream;
//! [`StatsAggregator::finalize`] reduces them to [`FieldSummary`] values and
//! drops the raw lists.
//!
//! # Fields
//!
//! | key         | value                                   |
//! |-------------|-----------------------------------------|
//! | `totDischg` | total discharges                        |
//! | `avgCovChg` | average covered charges                 |
//! | `avgTotPay` | average total payments                  |
//! | `diff`      | covered charges minus total payments    |
//! | `perPay`    | total payments divided by covered charges |
//!
//! # Serialized form
//!
//! ```json
//! { "039": { "count": 2, "avgCovChg": { "mean": 1.0, "median": 1.0, ... }, ... } }
//! ```

pub mod summary;

#[cfg(test)]
pub mod tests;

pub use summary::FieldSummary;

use crate::app::models::ChargeRow;
use crate::constants::STAT_KEY_SEPARATOR;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::collections::BTreeMap;
use tracing::info;

/// Numeric fields tracked per group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatField {
    TotalDischarges,
    AvgCoveredCharge,
    AvgTotalPayment,
    ChargePaymentDiff,
    PaymentRatio,
}

impl StatField {
    /// All fields in reduction order
    pub const ALL: [StatField; 5] = [
        StatField::TotalDischarges,
        StatField::AvgCoveredCharge,
        StatField::AvgTotalPayment,
        StatField::ChargePaymentDiff,
        StatField::PaymentRatio,
    ];

    /// Name used in `stats.json`
    pub fn key(&self) -> &'static str {
        match self {
            StatField::TotalDischarges => "totDischg",
            StatField::AvgCoveredCharge => "avgCovChg",
            StatField::AvgTotalPayment => "avgTotPay",
            StatField::ChargePaymentDiff => "diff",
            StatField::PaymentRatio => "perPay",
        }
    }
}

/// Raw values of one field, replaced by a summary on finalize
#[derive(Debug, Clone, Default)]
pub struct FieldStats {
    values: Vec<f64>,
    summary: Option<FieldSummary>,
}

impl FieldStats {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn summary(&self) -> Option<&FieldSummary> {
        self.summary.as_ref()
    }
}

/// Accumulated fields of one grouping key
#[derive(Debug, Clone, Default)]
pub struct StatGroup {
    fields: BTreeMap<StatField, FieldStats>,
    count: Option<usize>,
}

impl StatGroup {
    fn push(&mut self, field: StatField, value: f64) {
        self.fields.entry(field).or_default().values.push(value);
    }

    pub fn field(&self, field: StatField) -> Option<&FieldStats> {
        self.fields.get(&field)
    }

    pub fn summary(&self, field: StatField) -> Option<&FieldSummary> {
        self.fields.get(&field).and_then(FieldStats::summary)
    }

    /// Number of rows in the group; set by finalize
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    fn finalize(&mut self) {
        for field in StatField::ALL {
            let Some(stats) = self.fields.get_mut(&field) else {
                continue;
            };
            if stats.values.is_empty() {
                continue;
            }

            stats.summary = FieldSummary::from_values(&stats.values);
            // The group count is taken from whichever field is reduced last
            self.count = Some(stats.values.len());
            stats.values = Vec::new();
        }
    }
}

impl Serialize for StatGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(count) = self.count {
            map.serialize_entry("count", &count)?;
        }
        for (field, stats) in &self.fields {
            if let Some(summary) = &stats.summary {
                map.serialize_entry(field.key(), summary)?;
            }
        }
        map.end()
    }
}

/// Buckets row values by grouping key and reduces them to summaries
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct StatsAggregator {
    #[serde(skip)]
    state_filter: String,
    groups: BTreeMap<String, StatGroup>,
    #[serde(skip)]
    finalized: bool,
}

impl StatsAggregator {
    /// Create an aggregator; `state_filter` is expected upper-case
    pub fn new(state_filter: impl Into<String>) -> Self {
        Self {
            state_filter: state_filter.into(),
            groups: BTreeMap::new(),
            finalized: false,
        }
    }

    /// Grouping keys a row contributes to
    pub fn group_keys(&self, drg_code: &str, row: &ChargeRow) -> Vec<String> {
        let mut keys = vec![drg_code.to_string()];
        if row.is_in_state(&self.state_filter) {
            keys.push(format!(
                "{}{}{}",
                self.state_filter, STAT_KEY_SEPARATOR, drg_code
            ));
        }
        keys
    }

    /// Add one row's values to every group it belongs to
    pub fn ingest(&mut self, drg_code: &str, row: &ChargeRow) {
        let discharges = row.total_discharges_value();
        let covered = row.avg_covered_charges_value();
        let paid = row.avg_total_payments_value();

        let values = [
            (StatField::TotalDischarges, discharges),
            (StatField::AvgCoveredCharge, covered),
            (StatField::AvgTotalPayment, paid),
            (StatField::ChargePaymentDiff, covered - paid),
            (StatField::PaymentRatio, paid / covered),
        ];

        for key in self.group_keys(drg_code, row) {
            let group = self.groups.entry(key).or_default();
            for (field, value) in values {
                group.push(field, value);
            }
        }
    }

    /// Reduce every group to summaries and discard the raw values
    ///
    /// Calling this again without new rows leaves the summaries untouched.
    pub fn finalize(&mut self) {
        for group in self.groups.values_mut() {
            group.finalize();
        }
        self.finalized = true;

        info!("Finalized statistics for {} groups", self.groups.len());
    }

    pub fn group(&self, key: &str) -> Option<&StatGroup> {
        self.groups.get(key)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}
