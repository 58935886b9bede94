//! Weekly ingredient usage aggregation.
//!
//! Every cleaned record adds its pizza's size weight to each of the
//! pizza's ingredients, in the bucket of the record's ISO week. The
//! record's own quantity is ignored unless quantity weighting is enabled.

use crate::catalog::PizzaCatalog;
use crate::config::{AggregationOptions, UnknownPizzaPolicy};
use crate::constants::WEEKS_PER_YEAR;
use crate::error::{ForecastError, Result};
use crate::models::MergedRecord;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Usage counts per ingredient, one bucket per ISO week (index 0 = week 1)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientWeeklyUsage {
    usage: BTreeMap<String, [u64; WEEKS_PER_YEAR]>,
}

impl IngredientWeeklyUsage {
    /// Start every ingredient at zero for all weeks
    pub fn new<I, S>(ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let usage = ingredients
            .into_iter()
            .map(|name| (name.into(), [0; WEEKS_PER_YEAR]))
            .collect();
        Self { usage }
    }

    /// Add usage to a 1-based ISO week
    ///
    /// Ingredients that were not part of the initial set get their own series.
    pub fn add(&mut self, ingredient: &str, week: u32, amount: u64) {
        let index = week.clamp(1, WEEKS_PER_YEAR as u32) as usize - 1;
        match self.usage.get_mut(ingredient) {
            Some(series) => series[index] = series[index].saturating_add(amount),
            None => {
                debug!("Ingredient '{}' is not in the catalog, adding it", ingredient);
                let mut series = [0; WEEKS_PER_YEAR];
                series[index] = amount;
                self.usage.insert(ingredient.to_string(), series);
            }
        }
    }

    pub fn weeks(&self, ingredient: &str) -> Option<&[u64; WEEKS_PER_YEAR]> {
        self.usage.get(ingredient)
    }

    /// Usage of an ingredient in a 1-based ISO week
    pub fn get(&self, ingredient: &str, week: usize) -> Option<u64> {
        let index = week.checked_sub(1)?;
        self.usage.get(ingredient)?.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u64; WEEKS_PER_YEAR])> {
        self.usage.iter().map(|(name, series)| (name.as_str(), series))
    }

    pub fn len(&self) -> usize {
        self.usage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usage.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.usage
            .values()
            .flat_map(|series| series.iter())
            .fold(0, |total, &count| total.saturating_add(count))
    }
}

impl FromIterator<(String, [u64; WEEKS_PER_YEAR])> for IngredientWeeklyUsage {
    fn from_iter<T: IntoIterator<Item = (String, [u64; WEEKS_PER_YEAR])>>(iter: T) -> Self {
        Self {
            usage: iter.into_iter().collect(),
        }
    }
}

/// Aggregated usage plus the number of records left out
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub usage: IngredientWeeklyUsage,
    pub skipped_records: usize,
}

/// Accumulate ingredient usage over the cleaned records
pub fn aggregate_usage<I, S>(
    records: &[MergedRecord],
    catalog: &PizzaCatalog,
    ingredients: I,
    options: &AggregationOptions,
) -> Result<Aggregation>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut usage = IngredientWeeklyUsage::new(ingredients);
    let mut skipped_records = 0;

    for record in records {
        let resolved = match catalog.resolve(&record.pizza_id) {
            Ok(resolved) => resolved,
            Err(err @ (ForecastError::UnknownPizza { .. } | ForecastError::UnknownSize { .. })) => {
                match options.unknown_pizza {
                    UnknownPizzaPolicy::Abort => return Err(err),
                    UnknownPizzaPolicy::Skip => {
                        warn!("Skipping order {}: {}", record.order_id, err);
                        skipped_records += 1;
                        continue;
                    }
                }
            }
            Err(err) => return Err(err),
        };

        let increment = if options.weight_by_quantity {
            resolved.size.weight().saturating_mul(record.quantity)
        } else {
            resolved.size.weight()
        };

        for ingredient in resolved.ingredients {
            usage.add(ingredient, record.week, increment);
        }
    }

    info!(
        "Aggregated usage of {} ingredients from {} records ({} skipped)",
        usage.len(),
        records.len() - skipped_records,
        skipped_records
    );

    Ok(Aggregation {
        usage,
        skipped_records,
    })
}
