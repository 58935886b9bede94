//! Configuration management and validation.
//!
//! Provides the configuration for a forecast run: where the four input
//! tables live and how they are delimited, where the outputs go, and the
//! policies applied while aggregating ingredient usage.

use crate::constants::{FORECAST_FILENAME, REPORT_FILENAME};
use crate::error::{ForecastError, Result};
use crate::models::TableKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// What to do with an order whose pizza cannot be found in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnknownPizzaPolicy {
    /// Fail the run with `ForecastError::UnknownPizza`
    #[default]
    Abort,
    /// Log a warning, count the record as skipped and continue
    Skip,
}

/// Location and delimiter of one input table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSource {
    /// File name relative to the input directory
    pub file_name: String,

    /// Field delimiter byte
    pub separator: u8,
}

impl TableSource {
    pub fn default_for(kind: TableKind) -> Self {
        Self {
            file_name: kind.default_file_name().to_string(),
            separator: kind.default_separator(),
        }
    }
}

/// Options consumed by the usage aggregator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationOptions {
    pub unknown_pizza: UnknownPizzaPolicy,

    /// Multiply the size weight by the record's quantity
    pub weight_by_quantity: bool,
}

/// Global configuration for a forecast run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Directory containing the four input tables
    pub input_dir: PathBuf,

    /// Directory receiving the forecast, report and optional export
    pub output_dir: PathBuf,

    /// Per-table file names and delimiters
    pub tables: HashMap<TableKind, TableSource>,

    /// Forecast CSV file name
    pub forecast_file: String,

    /// Data-quality XML report file name
    pub report_file: String,

    /// Write the cleaned, merged records to this file when set
    pub merged_file: Option<String>,

    /// Rows sampled for column type inference (None = whole file)
    pub infer_schema_rows: Option<usize>,

    /// Policy for pizzas missing from the catalog
    pub unknown_pizza: UnknownPizzaPolicy,

    /// Weight ingredient usage by quantity as well as by size
    pub weight_by_quantity: bool,

    /// Show progress spinners while the stages run
    pub show_progress: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        let tables = TableKind::ALL
            .into_iter()
            .map(|kind| (kind, TableSource::default_for(kind)))
            .collect();

        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            tables,
            forecast_file: FORECAST_FILENAME.to_string(),
            report_file: REPORT_FILENAME.to_string(),
            merged_file: None,
            infer_schema_rows: None,
            unknown_pizza: UnknownPizzaPolicy::default(),
            weight_by_quantity: false,
            show_progress: true,
        }
    }
}

impl ForecastConfig {
    /// Create configuration reading from and writing to the given directories
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Override the file name of one input table
    pub fn with_table_file(mut self, kind: TableKind, file_name: impl Into<String>) -> Self {
        self.tables
            .entry(kind)
            .or_insert_with(|| TableSource::default_for(kind))
            .file_name = file_name.into();
        self
    }

    /// Override the delimiter of one input table
    pub fn with_table_separator(mut self, kind: TableKind, separator: u8) -> Self {
        self.tables
            .entry(kind)
            .or_insert_with(|| TableSource::default_for(kind))
            .separator = separator;
        self
    }

    pub fn with_forecast_file(mut self, file_name: impl Into<String>) -> Self {
        self.forecast_file = file_name.into();
        self
    }

    pub fn with_report_file(mut self, file_name: impl Into<String>) -> Self {
        self.report_file = file_name.into();
        self
    }

    /// Also export the cleaned, merged records
    pub fn with_merged_export(mut self, file_name: impl Into<String>) -> Self {
        self.merged_file = Some(file_name.into());
        self
    }

    pub fn with_unknown_pizza_policy(mut self, policy: UnknownPizzaPolicy) -> Self {
        self.unknown_pizza = policy;
        self
    }

    pub fn with_quantity_weighting(mut self) -> Self {
        self.weight_by_quantity = true;
        self
    }

    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Source settings for a table, falling back to the defaults
    pub fn source(&self, kind: TableKind) -> TableSource {
        self.tables
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| TableSource::default_for(kind))
    }

    pub fn input_path(&self, kind: TableKind) -> PathBuf {
        self.input_dir.join(self.source(kind).file_name)
    }

    pub fn forecast_path(&self) -> PathBuf {
        self.output_dir.join(&self.forecast_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }

    pub fn merged_path(&self) -> Option<PathBuf> {
        self.merged_file
            .as_ref()
            .map(|file_name| self.output_dir.join(file_name))
    }

    pub fn aggregation_options(&self) -> AggregationOptions {
        AggregationOptions {
            unknown_pizza: self.unknown_pizza,
            weight_by_quantity: self.weight_by_quantity,
        }
    }

    /// Reject empty or colliding output names
    pub fn validate(&self) -> Result<()> {
        let mut outputs = vec![("forecast", &self.forecast_file), ("report", &self.report_file)];
        if let Some(merged) = &self.merged_file {
            outputs.push(("merged export", merged));
        }

        for (label, file_name) in &outputs {
            if file_name.trim().is_empty() {
                return Err(ForecastError::Configuration {
                    message: format!("{} file name must not be empty", label),
                });
            }
        }

        for (i, (label, file_name)) in outputs.iter().enumerate() {
            if let Some((other, _)) = outputs[i + 1..].iter().find(|(_, f)| f == file_name) {
                return Err(ForecastError::Configuration {
                    message: format!(
                        "{} and {} would both be written to '{}'",
                        label, other, file_name
                    ),
                });
            }
        }

        for kind in TableKind::ALL {
            let source = self.source(kind);
            if source.file_name.trim().is_empty() {
                return Err(ForecastError::Configuration {
                    message: format!("no input file configured for table {}", kind),
                });
            }
        }

        debug!("Configuration validated: {:?}", self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources_match_export_layout() {
        let config = ForecastConfig::default();
        assert_eq!(config.source(TableKind::OrderDetails).separator, b';');
        assert_eq!(config.source(TableKind::PizzaTypes).separator, b',');
        assert_eq!(
            config.input_path(TableKind::Pizzas),
            PathBuf::from("./pizzas.csv")
        );
        assert_eq!(config.unknown_pizza, UnknownPizzaPolicy::Abort);
        assert!(!config.weight_by_quantity);
    }

    #[test]
    fn test_builders_override_defaults() {
        let config = ForecastConfig::new("in", "out")
            .with_table_file(TableKind::Orders, "orders_2015.csv")
            .with_table_separator(TableKind::Orders, b',')
            .with_merged_export("merged.csv")
            .with_unknown_pizza_policy(UnknownPizzaPolicy::Skip)
            .with_quantity_weighting();

        assert_eq!(config.input_path(TableKind::Orders), PathBuf::from("in/orders_2015.csv"));
        assert_eq!(config.source(TableKind::Orders).separator, b',');
        assert_eq!(config.merged_path(), Some(PathBuf::from("out/merged.csv")));

        let options = config.aggregation_options();
        assert_eq!(options.unknown_pizza, UnknownPizzaPolicy::Skip);
        assert!(options.weight_by_quantity);
    }

    #[test]
    fn test_validate_rejects_colliding_outputs() {
        let config = ForecastConfig::default().with_report_file(FORECAST_FILENAME);
        assert!(matches!(
            config.validate(),
            Err(ForecastError::Configuration { .. })
        ));

        let config = ForecastConfig::default().with_forecast_file("  ");
        assert!(config.validate().is_err());

        assert!(ForecastConfig::default().validate().is_ok());
    }
}
