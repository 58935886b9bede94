//! Error handling for the forecast pipeline.
//!
//! Provides error types with enough context to point at the offending
//! table, column, order or identifier when loading, cleaning or
//! aggregating the input data fails.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("Unparsable date '{value}' for order {order_id}")]
    DateParse { order_id: i64, value: String },

    #[error("Malformed quantity '{value}' for order {order_id}")]
    MalformedQuantity { order_id: i64, value: String },

    #[error("Field '{field}' is missing for order {order_id} and no earlier row can fill it")]
    MissingField { order_id: i64, field: &'static str },

    #[error("Pizza '{pizza_id}' does not match any pizza type in the catalog")]
    UnknownPizza { pizza_id: String },

    #[error("Pizza '{pizza_id}' carries unknown size code '{code}'")]
    UnknownSize { pizza_id: String, code: String },

    #[error("Failed to write report {path}: {reason}")]
    ReportWriting { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ForecastError {
    /// Whether the error comes from a single malformed record rather than
    /// from the environment or the shape of an input table
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            ForecastError::DateParse { .. }
                | ForecastError::MalformedQuantity { .. }
                | ForecastError::MissingField { .. }
                | ForecastError::UnknownPizza { .. }
                | ForecastError::UnknownSize { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
