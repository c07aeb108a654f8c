//! Descriptive statistics for one field of one group
//!
//! Values are reduced once, at the end of the stream. `NaN` and infinities are
//! not filtered: they flow into the results the same way they entered.

use serde::{Deserialize, Serialize};

/// Summary of the values collected for one field
///
/// `mean` and `median` are the primary figures; the quartiles and Tukey steps
/// feed the box plots drawn next to each charge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
    /// Lower fence, `q25 - 1.5 * IQR`
    pub step_l: f64,
    /// Upper fence, `q75 + 1.5 * IQR`
    pub step_u: f64,
}

impl FieldSummary {
    /// Summarise a non-empty set of values; `None` for an empty set
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let (q25, q75) = quartiles(&sorted);
        let iqr = q75 - q25;

        Some(Self {
            mean: mean(values),
            median: median_of_sorted(&sorted),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            q25,
            q75,
            step_l: q25 - 1.5 * iqr,
            step_u: q75 + 1.5 * iqr,
        })
    }
}

/// Arithmetic mean; `NaN` for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of an already sorted slice
///
/// Even lengths average the two central elements. `NaN` for an empty slice.
pub fn median_of_sorted(sorted: &[f64]) -> f64 {
    let len = sorted.len();
    if len == 0 {
        return f64::NAN;
    }

    let mid = len / 2;
    if len % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// First and third quartile as medians of the lower and upper halves
///
/// For odd lengths the central element belongs to neither half; a single value
/// is its own quartiles.
pub fn quartiles(sorted: &[f64]) -> (f64, f64) {
    let len = sorted.len();
    match len {
        0 => (f64::NAN, f64::NAN),
        1 => (sorted[0], sorted[0]),
        _ => {
            let lower = &sorted[..len / 2];
            let upper = &sorted[(len + 1) / 2..];
            (median_of_sorted(lower), median_of_sorted(upper))
        }
    }
}
