//! Main processing engine.
//!
//! Orchestrates a complete forecast run: load the four tables, profile
//! them, merge and clean the orders, aggregate ingredient usage, build the
//! forecast and write every output file.

use crate::aggregator::{IngredientWeeklyUsage, aggregate_usage};
use crate::catalog::{PizzaCatalog, build_ingredient_catalog};
use crate::cleaner::merge_and_clean;
use crate::config::{AggregationOptions, ForecastConfig};
use crate::error::Result;
use crate::forecast::{ForecastTable, generate_forecast};
use crate::loader::{
    RawTables, line_items_from_frame, orders_from_frame, pizza_types_from_frame,
    pizza_variants_from_frame,
};
use crate::models::{MergedRecord, ProcessingStats, TableKind};
use crate::profiler::{ProfileReport, profile_tables};
use crate::report::{write_forecast_csv, write_merged_records_csv, write_profile_xml};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[cfg(test)]
pub mod tests;

/// Everything the transform stages derive from the raw tables
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub records: Vec<MergedRecord>,
    pub usage: IngredientWeeklyUsage,
    pub forecast: ForecastTable,
    pub unmatched_line_items: usize,
    pub skipped_records: usize,
}

/// Run the merge, aggregation and forecast stages over loaded tables
pub fn transform(tables: &RawTables, options: &AggregationOptions) -> Result<TransformOutput> {
    let items = line_items_from_frame(&tables.order_details)?;
    let orders = orders_from_frame(&tables.orders)?;
    let variants = pizza_variants_from_frame(&tables.pizzas)?;
    let pizza_types = pizza_types_from_frame(&tables.pizza_types)?;

    let merged = merge_and_clean(&items, &orders)?;

    let ingredients = build_ingredient_catalog(&pizza_types);
    debug!("Ingredient catalog holds {} entries", ingredients.len());
    let catalog = PizzaCatalog::new(pizza_types, variants);
    debug!(
        "Catalog lists {} pizza types and {} variants",
        catalog.type_count(),
        catalog.variant_count()
    );

    let aggregation = aggregate_usage(&merged.records, &catalog, ingredients, options)?;
    let forecast = generate_forecast(&aggregation.usage);

    Ok(TransformOutput {
        records: merged.records,
        usage: aggregation.usage,
        forecast,
        unmatched_line_items: merged.unmatched_line_items,
        skipped_records: aggregation.skipped_records,
    })
}

/// Main processor for a forecast run
pub struct ForecastProcessor {
    config: ForecastConfig,
}

impl ForecastProcessor {
    /// Create a processor, rejecting an invalid configuration up front
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Main processing entry point
    pub fn run(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        info!(
            "Starting forecast run: input {}, output {}",
            self.config.input_dir.display(),
            self.config.output_dir.display()
        );

        let spinner = self.spinner("Loading input tables...");
        let tables = RawTables::load(&self.config)?;
        let table_rows: Vec<(TableKind, usize)> = tables
            .iter()
            .map(|(kind, frame)| (kind, frame.height()))
            .collect();
        spinner.finish_and_clear();

        let spinner = self.spinner("Profiling input tables...");
        let profile = profile_tables(&tables)?;
        spinner.finish_and_clear();

        let spinner = self.spinner("Merging orders and forecasting usage...");
        let output = transform(&tables, &self.config.aggregation_options())?;
        spinner.finish_and_clear();

        let spinner = self.spinner("Writing outputs...");
        let stats = self.write_outputs(&output, &profile)?;
        spinner.finish_and_clear();

        let stats = ProcessingStats {
            table_rows,
            processing_time_ms: start_time.elapsed().as_millis(),
            ..stats
        };
        info!(
            "Forecast run finished in {}ms: {} records, {} ingredients",
            stats.processing_time_ms, stats.merged_records, stats.ingredients
        );
        Ok(stats)
    }

    fn write_outputs(&self, output: &TransformOutput, profile: &ProfileReport) -> Result<ProcessingStats> {
        fs::create_dir_all(&self.config.output_dir)?;

        let forecast_path = self.config.forecast_path();
        write_forecast_csv(&output.forecast, &forecast_path)?;

        let report_path = self.config.report_path();
        write_profile_xml(profile, &report_path)?;

        let merged_path = self.config.merged_path();
        if let Some(path) = &merged_path {
            write_merged_records_csv(&output.records, path)?;
        }

        Ok(ProcessingStats {
            merged_records: output.records.len(),
            unmatched_line_items: output.unmatched_line_items,
            skipped_records: output.skipped_records,
            ingredients: output.forecast.len(),
            forecast_path,
            report_path,
            merged_path,
            ..Default::default()
        })
    }

    fn spinner(&self, message: &'static str) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Print a colored summary of a finished run
pub fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Forecast Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    for (kind, rows) in &stats.table_rows {
        println!(
            "  {} {}",
            format!("{} rows:", kind).bright_cyan(),
            rows.to_string().bright_white()
        );
    }
    println!(
        "  {} {}",
        "Merged records:".bright_cyan(),
        stats.merged_records.to_string().bright_white().bold()
    );
    if stats.unmatched_line_items > 0 {
        println!(
            "  {} {}",
            "Unmatched line items:".bright_yellow(),
            stats.unmatched_line_items.to_string().bright_yellow()
        );
    }
    if stats.skipped_records > 0 {
        println!(
            "  {} {}",
            "Skipped records:".bright_red(),
            stats.skipped_records.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Ingredients:".bright_cyan(),
        stats.ingredients.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Forecast:".bright_cyan(),
        stats.forecast_path.display()
    );
    println!(
        "  {} {}",
        "Data report:".bright_cyan(),
        stats.report_path.display()
    );
    if let Some(path) = &stats.merged_path {
        println!("  {} {}", "Merged records file:".bright_cyan(), path.display());
    }
}
