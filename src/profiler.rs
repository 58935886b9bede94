//! Data-quality profiling of the raw input tables.
//!
//! Purely descriptive: works on the frames exactly as loaded and never
//! looks at the cleaned records.

use crate::error::Result;
use crate::loader::RawTables;
use crate::models::TableKind;
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Statistics for one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnProfile {
    pub name: String,
    /// Missing cells plus floating point NaN values
    pub na: usize,
    /// Missing cells
    pub null: usize,
    /// Distinct non-missing values
    pub unique: usize,
    /// Declared column type as inferred by the reader
    pub dtype: String,
}

/// Statistics for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableProfile {
    pub rows: usize,
    pub columns: usize,
    /// One entry per column, in table order
    pub column_profiles: Vec<ColumnProfile>,
}

impl TableProfile {
    /// Shape rendered as a tuple, e.g. "(48620, 4)"
    pub fn shape(&self) -> String {
        format!("({}, {})", self.rows, self.columns)
    }
}

/// Profiles of every input table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileReport {
    pub tables: BTreeMap<TableKind, TableProfile>,
}

/// Profile a single frame
pub fn profile_table(frame: &DataFrame) -> Result<TableProfile> {
    let column_profiles = frame
        .get_columns()
        .iter()
        .map(profile_column)
        .collect::<Result<Vec<_>>>()?;

    Ok(TableProfile {
        rows: frame.height(),
        columns: frame.width(),
        column_profiles,
    })
}

/// Profile all four raw tables
pub fn profile_tables(tables: &RawTables) -> Result<ProfileReport> {
    let mut report = ProfileReport::default();
    for (kind, frame) in tables.iter() {
        let profile = profile_table(frame)?;
        debug!("Profiled {}: shape {}", kind, profile.shape());
        report.tables.insert(kind, profile);
    }
    Ok(report)
}

fn profile_column(column: &Column) -> Result<ColumnProfile> {
    let series = column.as_materialized_series();
    let null = series.null_count();
    let unique = if series.len() == null {
        0
    } else {
        series.drop_nulls().n_unique()?
    };

    Ok(ColumnProfile {
        name: series.name().to_string(),
        na: null + nan_count(series)?,
        null,
        unique,
        dtype: series.dtype().to_string(),
    })
}

fn nan_count(series: &Series) -> Result<usize> {
    if !series.dtype().is_float() {
        return Ok(0);
    }
    let values = series.cast(&DataType::Float64)?;
    let count = values
        .f64()?
        .into_iter()
        .filter(|value| value.is_some_and(f64::is_nan))
        .count();
    Ok(count)
}
