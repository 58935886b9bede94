//! Error handling integration tests

use super::write_dataset;
use crate::config::{ForecastConfig, UnknownPizzaPolicy};
use crate::error::{ForecastError, Result};
use crate::models::ProcessingStats;
use crate::processor::ForecastProcessor;
use std::fs;
use tempfile::TempDir;

fn run(config: ForecastConfig) -> Result<ProcessingStats> {
    ForecastProcessor::new(config.without_progress())?.run()
}

#[test]
fn test_missing_input_table() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[]);
    fs::remove_file(temp_dir.path().join("orders.csv")).unwrap();

    let config = ForecastConfig::new(temp_dir.path(), temp_dir.path());
    match run(config).unwrap_err() {
        ForecastError::InputNotFound { path } => {
            assert_eq!(path, temp_dir.path().join("orders.csv"));
        }
        other => panic!("Expected InputNotFound error, got {:?}", other),
    }
}

#[test]
fn test_unknown_pizza_aborts_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let details = "order_details_id;order_id;pizza_id;quantity\n1;1;calabrese_m;1\n2;1;hawaiian_s;1\n";
    write_dataset(temp_dir.path(), &[("order_details.csv", details)]);

    let config = ForecastConfig::new(temp_dir.path(), temp_dir.path());
    match run(config).unwrap_err() {
        ForecastError::UnknownPizza { pizza_id } => assert_eq!(pizza_id, "calabrese_m"),
        other => panic!("Expected UnknownPizza error, got {:?}", other),
    }
    assert!(!temp_dir.path().join("prediction.csv").exists());
}

#[test]
fn test_unknown_pizza_can_be_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let details = "order_details_id;order_id;pizza_id;quantity\n1;1;calabrese_m;1\n2;1;hawaiian_s;1\n";
    write_dataset(temp_dir.path(), &[("order_details.csv", details)]);

    let config = ForecastConfig::new(temp_dir.path(), temp_dir.path())
        .with_unknown_pizza_policy(UnknownPizzaPolicy::Skip);
    let stats = run(config).unwrap();

    assert_eq!(stats.merged_records, 2);
    assert_eq!(stats.skipped_records, 1);
    assert!(stats.forecast_path.exists());
}

#[test]
fn test_unknown_size_code() {
    let temp_dir = TempDir::new().unwrap();
    let details = "order_details_id;order_id;pizza_id;quantity\n1;1;hawaiian_q;1\n";
    write_dataset(temp_dir.path(), &[("order_details.csv", details)]);

    let config = ForecastConfig::new(temp_dir.path(), temp_dir.path());
    let err = run(config).unwrap_err();
    assert!(matches!(err, ForecastError::UnknownSize { ref code, .. } if code == "q"));
    assert!(err.is_record_level());
}

#[test]
fn test_unparsable_date() {
    let temp_dir = TempDir::new().unwrap();
    let orders = "order_id;date;time\n1;sometime in spring;11:38:36\n2;2015-01-02;11:57:40\n3;2015-01-08;12:12:28\n";
    write_dataset(temp_dir.path(), &[("orders.csv", orders)]);

    let config = ForecastConfig::new(temp_dir.path(), temp_dir.path());
    match run(config).unwrap_err() {
        ForecastError::DateParse { order_id, value } => {
            assert_eq!(order_id, 1);
            assert_eq!(value, "sometime in spring");
        }
        other => panic!("Expected DateParse error, got {:?}", other),
    }
}

#[test]
fn test_malformed_quantity() {
    let temp_dir = TempDir::new().unwrap();
    let details = "order_details_id;order_id;pizza_id;quantity\n1;1;hawaiian_s;three\n";
    write_dataset(temp_dir.path(), &[("order_details.csv", details)]);

    let config = ForecastConfig::new(temp_dir.path(), temp_dir.path());
    let err = run(config).unwrap_err();
    assert!(matches!(err, ForecastError::MalformedQuantity { order_id: 1, .. }));
}

#[test]
fn test_missing_required_column() {
    let temp_dir = TempDir::new().unwrap();
    let pizza_types = "pizza_type_id,name,category\nhawaiian,The Hawaiian Pizza,Classic\n";
    write_dataset(temp_dir.path(), &[("pizza_types.csv", pizza_types)]);

    let config = ForecastConfig::new(temp_dir.path(), temp_dir.path());
    match run(config).unwrap_err() {
        ForecastError::MissingColumn { table, column } => {
            assert_eq!(table, "pizzas_types");
            assert_eq!(column, "ingredients");
        }
        other => panic!("Expected MissingColumn error, got {:?}", other),
    }
}

#[test]
fn test_colliding_output_names_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = ForecastConfig::new(temp_dir.path(), temp_dir.path())
        .with_forecast_file("out.csv")
        .with_merged_export("out.csv");

    let result = ForecastProcessor::new(config);
    assert!(matches!(result, Err(ForecastError::Configuration { .. })));
}
