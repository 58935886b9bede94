//! Order record merging and repair.
//!
//! Joins order line items with their orders, fills gaps from the previous
//! row, and repairs the quantity, identifier and date fields before each
//! record is assigned to its ISO week.
//!
//! # Stale data
//!
//! Forward filling copies the prior row's value into any field left empty.
//! A record repaired this way may carry another order's pizza, quantity or
//! date; the fill is a heuristic for sparse exports, not a join guarantee.

use crate::constants::{PIZZA_ID_SUBSTITUTIONS, WORD_QUANTITIES};
use crate::dates::{iso_week, normalize_date};
use crate::error::{ForecastError, Result};
use crate::models::{MergedRecord, Order, OrderLineItem};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, info};

static WORD_QUANTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<&str> = WORD_QUANTITIES.iter().map(|(word, _)| *word).collect();
    Regex::new(&alternatives.join("|")).expect("word quantity pattern is valid")
});

/// Line item joined with its order, before any repair
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedRow {
    pub order_details_id: Option<i64>,
    pub order_id: i64,
    pub pizza_id: Option<String>,
    pub quantity: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

/// Result of merging and cleaning the order tables
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Cleaned records sorted by order id
    pub records: Vec<MergedRecord>,
    /// Line items dropped because no order carries their id
    pub unmatched_line_items: usize,
}

/// Inner join on order id, sorted by order id
///
/// Line items without a matching order are dropped. The sort is stable,
/// so line items of the same order keep their export order.
pub fn join_orders(items: &[OrderLineItem], orders: &[Order]) -> (Vec<JoinedRow>, usize) {
    let mut orders_by_id: HashMap<i64, Vec<&Order>> = HashMap::with_capacity(orders.len());
    for order in orders {
        if let Some(order_id) = order.order_id {
            orders_by_id.entry(order_id).or_default().push(order);
        }
    }

    let mut rows = Vec::with_capacity(items.len());
    let mut unmatched = 0;
    for item in items {
        let matches = item.order_id.and_then(|id| orders_by_id.get(&id).map(|found| (id, found)));
        let Some((order_id, matching_orders)) = matches else {
            unmatched += 1;
            continue;
        };

        for order in matching_orders {
            rows.push(JoinedRow {
                order_details_id: item.order_details_id,
                order_id,
                pizza_id: item.pizza_id.clone(),
                quantity: item.quantity.clone(),
                date: order.date.clone(),
                time: order.time.clone(),
            });
        }
    }

    rows.sort_by_key(|row| row.order_id);
    (rows, unmatched)
}

/// Fill every missing field with the same field of the previous row
pub fn forward_fill(rows: Vec<JoinedRow>) -> Vec<JoinedRow> {
    fn fill<T: Clone>(slot: &mut Option<T>, previous: &Option<T>) {
        if slot.is_none() {
            slot.clone_from(previous);
        }
    }

    let mut filled: Vec<JoinedRow> = Vec::with_capacity(rows.len());
    for mut row in rows {
        if let Some(previous) = filled.last() {
            fill(&mut row.order_details_id, &previous.order_details_id);
            fill(&mut row.pizza_id, &previous.pizza_id);
            fill(&mut row.quantity, &previous.quantity);
            fill(&mut row.date, &previous.date);
            fill(&mut row.time, &previous.time);
        }
        filled.push(row);
    }
    filled
}

/// Repair a raw quantity: spelled-out numbers become digits, signs are dropped
///
/// Negative values are data-entry sign errors, not cancellations. Values too
/// large for a `u64` are rejected.
pub fn repair_quantity(raw: &str) -> Option<u64> {
    let replaced = WORD_QUANTITY_PATTERN.replace_all(raw, |caps: &regex::Captures| {
        WORD_QUANTITIES
            .iter()
            .find(|(word, _)| *word == &caps[0])
            .map(|(_, digit)| *digit)
            .unwrap_or_default()
            .to_string()
    });
    let value = replaced.trim();

    let magnitude = value.strip_prefix('-').unwrap_or(value);
    if let Ok(number) = magnitude.parse::<u64>() {
        return Some(number);
    }

    // Integral floats appear when the export went through a float column
    let number: f64 = magnitude.parse().ok()?;
    let number = number.abs();
    if number.is_finite() && number.fract() == 0.0 && number < u64::MAX as f64 {
        Some(number as u64)
    } else {
        None
    }
}

/// Undo typo corruption of a pizza identifier, character by character
pub fn repair_pizza_id(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            PIZZA_ID_SUBSTITUTIONS
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect()
}

/// Repair, date and week-assign one forward-filled row
pub fn clean_row(row: JoinedRow) -> Result<MergedRecord> {
    let order_id = row.order_id;

    let raw_quantity = row.quantity.ok_or(ForecastError::MissingField {
        order_id,
        field: "quantity",
    })?;
    let quantity =
        repair_quantity(&raw_quantity).ok_or_else(|| ForecastError::MalformedQuantity {
            order_id,
            value: raw_quantity.clone(),
        })?;

    let raw_pizza_id = row.pizza_id.ok_or(ForecastError::MissingField {
        order_id,
        field: "pizza_id",
    })?;

    let raw_date = row.date.ok_or(ForecastError::MissingField {
        order_id,
        field: "date",
    })?;
    let date = normalize_date(&raw_date).ok_or_else(|| ForecastError::DateParse {
        order_id,
        value: raw_date.clone(),
    })?;

    Ok(MergedRecord {
        order_details_id: row.order_details_id,
        order_id,
        pizza_id: repair_pizza_id(&raw_pizza_id),
        quantity,
        week: iso_week(&date),
        date,
        time: row.time,
    })
}

/// Join, forward fill and clean the order tables
pub fn merge_and_clean(items: &[OrderLineItem], orders: &[Order]) -> Result<MergeOutcome> {
    let (joined, unmatched_line_items) = join_orders(items, orders);
    debug!(
        "Joined {} line items with {} orders into {} rows ({} unmatched)",
        items.len(),
        orders.len(),
        joined.len(),
        unmatched_line_items
    );

    let records = forward_fill(joined)
        .into_iter()
        .map(clean_row)
        .collect::<Result<Vec<_>>>()?;

    info!("Cleaned {} merged order records", records.len());
    Ok(MergeOutcome {
        records,
        unmatched_line_items,
    })
}
