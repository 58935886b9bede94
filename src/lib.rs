//! Pizza Forecast Library
//!
//! Turns a year of pizza order exports into a weekly ingredient usage
//! forecast and a data-quality report on the raw input tables.
//!
//! The pipeline stages are:
//! - Loading the four delimited tables (`loader`)
//! - Joining and repairing order records (`cleaner`, `dates`)
//! - Resolving pizzas to ingredients and sizes (`catalog`)
//! - Accumulating per-week ingredient usage (`aggregator`)
//! - Smoothing usage into a forecast (`forecast`)
//! - Profiling the raw tables (`profiler`)
//! - Writing the CSV and XML outputs (`report`)

pub mod aggregator;
pub mod catalog;
pub mod cleaner;
pub mod cli;
pub mod config;
pub mod constants;
pub mod dates;
pub mod error;
pub mod forecast;
pub mod loader;
pub mod models;
pub mod processor;
pub mod profiler;
pub mod report;

pub use config::{ForecastConfig, UnknownPizzaPolicy};
pub use error::{ForecastError, Result};
pub use models::{MergedRecord, ProcessingStats, TableKind};
pub use processor::ForecastProcessor;
