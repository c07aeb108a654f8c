//! Tests for descriptive statistics

use crate::app::services::stats_aggregator::summary::{
    FieldSummary, mean, median_of_sorted, quartiles,
};

#[test]
fn test_mean_and_median_even_length() {
    let values = [10.0, 20.0, 30.0, 40.0];

    assert_eq!(mean(&values), 25.0);
    assert_eq!(median_of_sorted(&values), 25.0);
}

#[test]
fn test_median_odd_length() {
    assert_eq!(median_of_sorted(&[10.0, 20.0, 30.0]), 20.0);
}

#[test]
fn test_summary_sorts_input() {
    let summary = FieldSummary::from_values(&[40.0, 10.0, 30.0, 20.0]).unwrap();
    assert_eq!(summary.median, 25.0);
    assert_eq!(summary.min, 10.0);
    assert_eq!(FieldSummary::from_values(&[5.0]).unwrap().median, 5.0);
}

#[test]
fn test_empty_inputs_are_nan() {
    assert!(mean(&[]).is_nan());
    assert!(median_of_sorted(&[]).is_nan());
    assert!(FieldSummary::from_values(&[]).is_none());
}

#[test]
fn test_quartiles_exclude_median_for_odd_lengths() {
    assert_eq!(quartiles(&[10.0, 20.0, 30.0, 40.0]), (15.0, 35.0));
    assert_eq!(quartiles(&[10.0, 20.0, 30.0]), (10.0, 30.0));
    assert_eq!(quartiles(&[1.0, 2.0, 3.0, 4.0, 5.0]), (1.5, 4.5));
    assert_eq!(quartiles(&[7.0]), (7.0, 7.0));
}

#[test]
fn test_summary_box_plot_fields() {
    let summary = FieldSummary::from_values(&[40.0, 10.0, 30.0, 20.0]).unwrap();

    assert_eq!(summary.mean, 25.0);
    assert_eq!(summary.median, 25.0);
    assert_eq!(summary.min, 10.0);
    assert_eq!(summary.max, 40.0);
    assert_eq!(summary.q25, 15.0);
    assert_eq!(summary.q75, 35.0);
    assert_eq!(summary.step_l, -15.0);
    assert_eq!(summary.step_u, 65.0);
}

#[test]
fn test_summary_serialized_names() {
    let summary = FieldSummary::from_values(&[1.0, 3.0]).unwrap();
    let json = serde_json::to_value(summary).unwrap();

    assert_eq!(json["mean"], 2.0);
    assert_eq!(json["median"], 2.0);
    assert!(json.get("stepL").is_some());
    assert!(json.get("stepU").is_some());
}

#[test]
fn test_nan_propagates_into_mean() {
    let summary = FieldSummary::from_values(&[1.0, f64::NAN, 3.0]).unwrap();

    assert!(summary.mean.is_nan());
    // NaN sorts last, so the lower values still order normally
    assert_eq!(summary.min, 1.0);

    let json = serde_json::to_value(summary).unwrap();
    assert!(json["mean"].is_null());
}
