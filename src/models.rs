//! Core data structures and types for the forecast pipeline.
//!
//! Defines the input table identifiers, the typed rows extracted from
//! each table, the cleaned order record and processing statistics.

use crate::constants::{
    CATALOG_TABLE_SEPARATOR, ORDER_DETAILS_FILENAME, ORDER_TABLE_SEPARATOR, ORDERS_FILENAME,
    PIZZA_TYPES_FILENAME, PIZZAS_FILENAME,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The four input tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TableKind {
    OrderDetails,
    Orders,
    Pizzas,
    PizzaTypes,
}

impl TableKind {
    pub const ALL: [TableKind; 4] = [
        TableKind::OrderDetails,
        TableKind::Orders,
        TableKind::Pizzas,
        TableKind::PizzaTypes,
    ];

    /// Name used for this table in logs and in the data-quality report
    pub fn name(&self) -> &'static str {
        match self {
            TableKind::OrderDetails => "order_details",
            TableKind::Orders => "orders",
            TableKind::Pizzas => "pizzas",
            TableKind::PizzaTypes => "pizzas_types",
        }
    }

    pub fn default_file_name(&self) -> &'static str {
        match self {
            TableKind::OrderDetails => ORDER_DETAILS_FILENAME,
            TableKind::Orders => ORDERS_FILENAME,
            TableKind::Pizzas => PIZZAS_FILENAME,
            TableKind::PizzaTypes => PIZZA_TYPES_FILENAME,
        }
    }

    pub fn default_separator(&self) -> u8 {
        match self {
            TableKind::OrderDetails | TableKind::Orders => ORDER_TABLE_SEPARATOR,
            TableKind::Pizzas | TableKind::PizzaTypes => CATALOG_TABLE_SEPARATOR,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pizza size encoded in the suffix of a pizza identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PizzaSize {
    S,
    M,
    L,
    Xl,
    Xxl,
}

impl PizzaSize {
    /// Size from the suffix of a pizza identifier; only lowercase codes are valid
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "s" => Some(PizzaSize::S),
            "m" => Some(PizzaSize::M),
            "l" => Some(PizzaSize::L),
            "xl" => Some(PizzaSize::Xl),
            "xxl" => Some(PizzaSize::Xxl),
            _ => None,
        }
    }

    /// Size from the free-text `size` column of the pizzas table
    pub fn from_label(label: &str) -> Option<Self> {
        Self::from_code(&label.trim().to_ascii_lowercase())
    }

    /// Units of every ingredient consumed by one pizza of this size
    pub fn weight(&self) -> u64 {
        match self {
            PizzaSize::S => 1,
            PizzaSize::M => 2,
            PizzaSize::L => 3,
            PizzaSize::Xl => 4,
            PizzaSize::Xxl => 5,
        }
    }
}

/// Row of `order_details`, exactly as exported
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderLineItem {
    pub order_details_id: Option<i64>,
    pub order_id: Option<i64>,
    pub pizza_id: Option<String>,
    /// Kept textual: the export mixes digits, words and signs
    pub quantity: Option<String>,
}

/// Row of `orders`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Order {
    pub order_id: Option<i64>,
    /// Unix timestamp or free-form date string
    pub date: Option<String>,
    pub time: Option<String>,
}

/// Row of `pizzas`
#[derive(Debug, Clone, PartialEq)]
pub struct PizzaVariant {
    pub pizza_id: String,
    pub pizza_type_id: String,
    pub size: Option<PizzaSize>,
    pub price: Option<f64>,
}

/// Row of `pizza_types`
#[derive(Debug, Clone, PartialEq)]
pub struct PizzaType {
    pub pizza_type_id: String,
    pub name: String,
    pub category: String,
    /// Raw comma-separated ingredient list
    pub ingredients: String,
}

impl PizzaType {
    /// Ingredients split on bare commas and trimmed
    pub fn ingredient_list(&self) -> Vec<String> {
        self.ingredients
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Order line item joined with its order, repaired and dated
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub order_details_id: Option<i64>,
    pub order_id: i64,
    pub pizza_id: String,
    pub quantity: u64,
    pub date: NaiveDateTime,
    pub time: Option<String>,
    /// ISO week number, 1..=53
    pub week: u32,
}

/// Processing statistics
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    /// Row counts of the raw input tables, in `TableKind::ALL` order
    pub table_rows: Vec<(TableKind, usize)>,
    pub merged_records: usize,
    /// Line items whose order id matched no order
    pub unmatched_line_items: usize,
    /// Records dropped because their pizza is not in the catalog
    pub skipped_records: usize,
    pub ingredients: usize,
    pub forecast_path: PathBuf,
    pub report_path: PathBuf,
    pub merged_path: Option<PathBuf>,
    pub processing_time_ms: u128,
}
