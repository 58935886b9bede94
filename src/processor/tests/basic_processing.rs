//! Basic processing integration tests

use super::write_dataset;
use crate::config::{AggregationOptions, ForecastConfig};
use crate::constants::WEEKS_PER_YEAR;
use crate::loader::RawTables;
use crate::models::TableKind;
use crate::processor::{ForecastProcessor, transform};
use std::fs;
use tempfile::TempDir;

fn load_fixture(temp_dir: &TempDir) -> RawTables {
    write_dataset(temp_dir.path(), &[]);
    let config = ForecastConfig::new(temp_dir.path(), temp_dir.path()).without_progress();
    RawTables::load(&config).unwrap()
}

#[test]
fn test_transform_aggregates_by_size_and_week() {
    let temp_dir = TempDir::new().unwrap();
    let tables = load_fixture(&temp_dir);

    let output = transform(&tables, &AggregationOptions::default()).unwrap();

    assert_eq!(output.records.len(), 4);
    assert_eq!(output.unmatched_line_items, 1);
    assert_eq!(output.skipped_records, 0);
    assert_eq!(output.usage.len(), 4);

    // Week 1: hawaiian s + l, one medium pepperoni
    assert_eq!(output.usage.get("Sliced Ham", 1), Some(4));
    assert_eq!(output.usage.get("Pineapple", 1), Some(4));
    assert_eq!(output.usage.get("Mozzarella Cheese", 1), Some(6));
    assert_eq!(output.usage.get("Pepperoni", 1), Some(2));

    // Week 2: the forward-filled medium pepperoni
    assert_eq!(output.usage.get("Pepperoni", 2), Some(2));
    assert_eq!(output.usage.get("Sliced Ham", 2), Some(0));
}

#[test]
fn test_transform_repairs_records() {
    let temp_dir = TempDir::new().unwrap();
    let tables = load_fixture(&temp_dir);

    let output = transform(&tables, &AggregationOptions::default()).unwrap();
    let records = &output.records;

    assert_eq!(records[1].quantity, 1);
    assert_eq!(records[2].pizza_id, "pepperoni_m");
    assert_eq!(records[2].quantity, 2);
    assert_eq!(records[3].order_id, 3);
    assert_eq!(records[3].pizza_id, "pepperoni_m");
    assert_eq!(records[3].week, 2);
}

#[test]
fn test_forecast_uses_neighbouring_weeks() {
    let temp_dir = TempDir::new().unwrap();
    let tables = load_fixture(&temp_dir);

    let output = transform(&tables, &AggregationOptions::default()).unwrap();
    let mean = 4.0 / WEEKS_PER_YEAR as f64;

    let week_1 = output.forecast.get("Pepperoni", 1).unwrap();
    assert!((week_1 - (mean + 0.0 + 2.0) / 3.0).abs() < 1e-9);

    let week_2 = output.forecast.get("Pepperoni", 2).unwrap();
    assert!((week_2 - (mean + 2.0 + 0.0) / 3.0).abs() < 1e-9);

    let week_3 = output.forecast.get("Pepperoni", 3).unwrap();
    assert!((week_3 - (mean + 2.0 + 0.0) / 3.0).abs() < 1e-9);
}

#[test]
fn test_quantity_weighting() {
    let temp_dir = TempDir::new().unwrap();
    let tables = load_fixture(&temp_dir);
    let options = AggregationOptions {
        weight_by_quantity: true,
        ..Default::default()
    };

    let output = transform(&tables, &options).unwrap();

    assert_eq!(output.usage.get("Pepperoni", 1), Some(4));
    assert_eq!(output.usage.get("Pepperoni", 2), Some(4));
    assert_eq!(output.usage.get("Sliced Ham", 1), Some(4));
}

#[test]
fn test_run_writes_all_outputs() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[]);
    let output_dir = temp_dir.path().join("out");

    let config = ForecastConfig::new(temp_dir.path(), &output_dir)
        .with_merged_export("merged.csv")
        .without_progress();
    let stats = ForecastProcessor::new(config).unwrap().run().unwrap();

    assert_eq!(stats.merged_records, 4);
    assert_eq!(stats.unmatched_line_items, 1);
    assert_eq!(stats.ingredients, 4);
    assert_eq!(
        stats.table_rows,
        vec![
            (TableKind::OrderDetails, 5),
            (TableKind::Orders, 3),
            (TableKind::Pizzas, 4),
            (TableKind::PizzaTypes, 2),
        ]
    );

    let forecast = fs::read_to_string(&stats.forecast_path).unwrap();
    assert_eq!(forecast.lines().count(), WEEKS_PER_YEAR + 1);
    assert!(forecast.starts_with("week,Mozzarella Cheese,Pepperoni,Pineapple,Sliced Ham"));

    let report = fs::read_to_string(&stats.report_path).unwrap();
    assert!(report.contains("<file name=\"order_details\">"));
    assert!(report.contains("<file name=\"pizzas_types\">"));
    assert!(report.contains("<info attribute=\"shape\">(5, 4)</info>"));
    assert!(report.contains("<info attribute=\"shape\">(3, 3)</info>"));

    let merged_path = stats.merged_path.unwrap();
    let merged = fs::read_to_string(merged_path).unwrap();
    assert_eq!(merged.lines().count(), 5);
}

#[test]
fn test_profile_counts_raw_nulls() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[]);

    let config = ForecastConfig::new(temp_dir.path(), temp_dir.path()).without_progress();
    let stats = ForecastProcessor::new(config).unwrap().run().unwrap();

    let report = fs::read_to_string(&stats.report_path).unwrap();
    let order_details = report
        .split("<file name=\"order_details\">")
        .nth(1)
        .and_then(|rest| rest.split("</file>").next())
        .unwrap();
    let null_section = order_details
        .split("<info attribute=\"null\">")
        .nth(1)
        .and_then(|rest| rest.split("</info>").next())
        .unwrap();

    // The empty pizza id is reported even though the merge fills it
    assert!(null_section.contains("<column name=\"pizza_id\">1</column>"));
    assert!(null_section.contains("<column name=\"order_id\">0</column>"));
}
