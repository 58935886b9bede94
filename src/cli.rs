//! Command-line interface components.

use crate::config::{ForecastConfig, UnknownPizzaPolicy};
use crate::models::ProcessingStats;
use crate::processor::{ForecastProcessor, print_summary};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "pizza-forecast")]
#[command(about = "Forecast weekly ingredient usage from pizza order exports")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directory containing order_details.csv, orders.csv, pizzas.csv and pizza_types.csv
    #[arg(value_name = "INPUT_DIR", default_value = ".")]
    pub input_dir: PathBuf,

    /// Output directory (defaults to the input directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// File name of the forecast CSV
    #[arg(long)]
    pub forecast_file: Option<String>,

    /// File name of the data-quality XML report
    #[arg(long)]
    pub report_file: Option<String>,

    /// Also write the cleaned, merged order records to this file
    #[arg(long, value_name = "FILE")]
    pub export_merged: Option<String>,

    /// Skip orders whose pizza is missing from the catalog instead of failing
    #[arg(long)]
    pub skip_unknown_pizzas: bool,

    /// Multiply ingredient usage by the ordered quantity
    #[arg(long)]
    pub weight_by_quantity: bool,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and hide progress spinners
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Build the run configuration from the arguments
    pub fn to_config(&self) -> ForecastConfig {
        let output_dir = self
            .output_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.clone());
        let mut config = ForecastConfig::new(&self.input_dir, output_dir);

        if let Some(file_name) = &self.forecast_file {
            config = config.with_forecast_file(file_name);
        }
        if let Some(file_name) = &self.report_file {
            config = config.with_report_file(file_name);
        }
        if let Some(file_name) = &self.export_merged {
            config = config.with_merged_export(file_name);
        }
        if self.skip_unknown_pizzas {
            config = config.with_unknown_pizza_policy(UnknownPizzaPolicy::Skip);
        }
        if self.weight_by_quantity {
            config = config.with_quantity_weighting();
        }
        if self.quiet {
            config = config.without_progress();
        }
        config
    }
}

/// Install the tracing subscriber; `RUST_LOG` overrides the flags
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pizza_forecast={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Run a forecast for the parsed arguments
pub fn run(args: &Args) -> Result<ProcessingStats> {
    debug!("Command line arguments: {:?}", args);

    let config = args.to_config();
    let processor = ForecastProcessor::new(config).context("Invalid configuration")?;
    let stats = processor.run().with_context(|| {
        format!(
            "Forecast failed for input directory {}",
            args.input_dir.display()
        )
    })?;

    if !args.quiet {
        print_summary(&stats);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_read_and_write_current_directory() {
        let args = Args::try_parse_from(["pizza-forecast"]).unwrap();
        let config = args.to_config();

        assert_eq!(config.input_dir, PathBuf::from("."));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.unknown_pizza, UnknownPizzaPolicy::Abort);
        assert!(!config.weight_by_quantity);
        assert!(config.show_progress);
        assert_eq!(config.merged_path(), None);
        assert_eq!(args.log_level(), "info");
    }

    #[test]
    fn test_flags_map_onto_config() {
        let args = Args::try_parse_from([
            "pizza-forecast",
            "data",
            "-o",
            "out",
            "--forecast-file",
            "2017_prediction.csv",
            "--export-merged",
            "merged.csv",
            "--skip-unknown-pizzas",
            "--weight-by-quantity",
            "-q",
        ])
        .unwrap();
        let config = args.to_config();

        assert_eq!(config.input_dir, PathBuf::from("data"));
        assert_eq!(config.forecast_path(), PathBuf::from("out/2017_prediction.csv"));
        assert_eq!(config.merged_path(), Some(PathBuf::from("out/merged.csv")));
        assert_eq!(config.unknown_pizza, UnknownPizzaPolicy::Skip);
        assert!(config.weight_by_quantity);
        assert!(!config.show_progress);
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Args::try_parse_from(["pizza-forecast", "-v", "-q"]).is_err());
    }
}
