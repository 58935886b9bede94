//! Weekly usage forecast.
//!
//! The prediction for a week averages three values: the ingredient's
//! annual mean, the previous week's usage and the following week's usage.
//! Weeks wrap around, so week 1 looks back at week 53 and week 53 looks
//! ahead to week 1.

use crate::aggregator::IngredientWeeklyUsage;
use crate::constants::{WEEK_COLUMN, WEEKS_PER_YEAR, week_label};
use crate::error::Result;
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::info;

/// Predicted usage per ingredient for weeks 1..=53
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastTable {
    predictions: BTreeMap<String, [f64; WEEKS_PER_YEAR]>,
}

impl ForecastTable {
    /// Prediction for a 1-based week
    pub fn get(&self, ingredient: &str, week: usize) -> Option<f64> {
        let index = week.checked_sub(1)?;
        self.predictions.get(ingredient)?.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64; WEEKS_PER_YEAR])> {
        self.predictions
            .iter()
            .map(|(name, series)| (name.as_str(), series))
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Row labels "week 1" through "week 53"
    pub fn week_labels() -> Vec<String> {
        (1..=WEEKS_PER_YEAR).map(week_label).collect()
    }

    /// One row per week, a label column followed by one column per ingredient
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.predictions.len() + 1);
        columns.push(Column::new(WEEK_COLUMN.into(), Self::week_labels()));
        for (ingredient, series) in self.iter() {
            columns.push(Column::new(ingredient.into(), series.to_vec()));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Mean of the 53 weekly counts
pub fn annual_mean(weeks: &[u64; WEEKS_PER_YEAR]) -> f64 {
    weeks.iter().map(|&count| count as f64).sum::<f64>() / WEEKS_PER_YEAR as f64
}

/// Smoothed series for one ingredient
pub fn smooth_weeks(weeks: &[u64; WEEKS_PER_YEAR]) -> [f64; WEEKS_PER_YEAR] {
    let mean = annual_mean(weeks);
    std::array::from_fn(|w| {
        let previous = weeks[(w + WEEKS_PER_YEAR - 1) % WEEKS_PER_YEAR] as f64;
        let next = weeks[(w + 1) % WEEKS_PER_YEAR] as f64;
        (mean + previous + next) / 3.0
    })
}

/// Build the forecast for every aggregated ingredient
pub fn generate_forecast(usage: &IngredientWeeklyUsage) -> ForecastTable {
    let predictions: BTreeMap<_, _> = usage
        .iter()
        .map(|(ingredient, weeks)| (ingredient.to_string(), smooth_weeks(weeks)))
        .collect();

    info!("Forecast generated for {} ingredients", predictions.len());
    ForecastTable { predictions }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn synthetic_usage() -> IngredientWeeklyUsage {
        let mut flat = [0; WEEKS_PER_YEAR];
        flat.fill(6);

        let ramp: [u64; WEEKS_PER_YEAR] = std::array::from_fn(|w| w as u64 + 1);

        let mut spike = [0; WEEKS_PER_YEAR];
        spike[0] = 53;

        [
            ("Basil".to_string(), flat),
            ("Garlic".to_string(), ramp),
            ("Tomatoes".to_string(), spike),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_annual_mean() {
        let usage = synthetic_usage();
        assert!((annual_mean(usage.weeks("Basil").unwrap()) - 6.0).abs() < EPSILON);
        assert!((annual_mean(usage.weeks("Garlic").unwrap()) - 27.0).abs() < EPSILON);
        assert!((annual_mean(usage.weeks("Tomatoes").unwrap()) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_annual_mean_of_saturated_weeks_does_not_overflow() {
        let weeks = [u64::MAX; WEEKS_PER_YEAR];
        let mean = annual_mean(&weeks);
        assert!(mean.is_finite());
        assert!((mean / u64::MAX as f64 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_smoothing_matches_hand_computed_values() {
        let forecast = generate_forecast(&synthetic_usage());
        assert_eq!(forecast.len(), 3);

        // Flat usage stays flat
        for week in 1..=WEEKS_PER_YEAR {
            assert!((forecast.get("Basil", week).unwrap() - 6.0).abs() < EPSILON);
        }

        // Week 1 wraps back to week 53: (27 + 53 + 2) / 3
        assert!((forecast.get("Garlic", 1).unwrap() - 82.0 / 3.0).abs() < EPSILON);
        // Week 10 uses weeks 9 and 11: (27 + 9 + 11) / 3
        assert!((forecast.get("Garlic", 10).unwrap() - 47.0 / 3.0).abs() < EPSILON);
        // Week 53 wraps forward to week 1: (27 + 52 + 1) / 3
        assert!((forecast.get("Garlic", 53).unwrap() - 80.0 / 3.0).abs() < EPSILON);

        // The spike in week 1 only shows up in its neighbours
        assert!((forecast.get("Tomatoes", 1).unwrap() - 1.0 / 3.0).abs() < EPSILON);
        assert!((forecast.get("Tomatoes", 2).unwrap() - 54.0 / 3.0).abs() < EPSILON);
        assert!((forecast.get("Tomatoes", 53).unwrap() - 54.0 / 3.0).abs() < EPSILON);
        assert!((forecast.get("Tomatoes", 30).unwrap() - 1.0 / 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_out_of_range_weeks() {
        let forecast = generate_forecast(&synthetic_usage());
        assert_eq!(forecast.get("Basil", 0), None);
        assert_eq!(forecast.get("Basil", 54), None);
        assert_eq!(forecast.get("Oregano", 1), None);
    }

    #[test]
    fn test_forecast_frame_layout() {
        let forecast = generate_forecast(&synthetic_usage());
        let df = forecast.to_dataframe().unwrap();

        assert_eq!(df.shape(), (WEEKS_PER_YEAR, 4));
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["week", "Basil", "Garlic", "Tomatoes"]);

        let labels = df.column("week").unwrap().as_materialized_series().str().unwrap();
        assert_eq!(labels.get(0), Some("week 1"));
        assert_eq!(labels.get(52), Some("week 53"));

        let garlic = df.column("Garlic").unwrap().as_materialized_series().f64().unwrap();
        assert!((garlic.get(9).unwrap() - 47.0 / 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_empty_usage_gives_label_only_frame() {
        let forecast = generate_forecast(&IngredientWeeklyUsage::default());
        assert!(forecast.is_empty());
        let df = forecast.to_dataframe().unwrap();
        assert_eq!(df.shape(), (WEEKS_PER_YEAR, 1));
    }
}
