//! Application constants for the pizza forecast pipeline
//!
//! This module contains default file names, delimiters, repair tables
//! and column names used throughout the pipeline.

// =============================================================================
// Calendar Constants
// =============================================================================

/// Number of ISO weeks tracked per ingredient (ISO years have 52 or 53 weeks)
pub const WEEKS_PER_YEAR: usize = 53;

/// Prefix for the row labels of the forecast file ("week 1" .. "week 53")
pub const WEEK_LABEL_PREFIX: &str = "week ";

/// Name of the label column in the forecast file
pub const WEEK_COLUMN: &str = "week";

// =============================================================================
// Input Files
// =============================================================================

pub const ORDER_DETAILS_FILENAME: &str = "order_details.csv";
pub const ORDERS_FILENAME: &str = "orders.csv";
pub const PIZZAS_FILENAME: &str = "pizzas.csv";
pub const PIZZA_TYPES_FILENAME: &str = "pizza_types.csv";

/// The order tables are exported with semicolons, the catalog tables with commas
pub const ORDER_TABLE_SEPARATOR: u8 = b';';
pub const CATALOG_TABLE_SEPARATOR: u8 = b',';

// =============================================================================
// Output Files
// =============================================================================

/// Default forecast output filename
pub const FORECAST_FILENAME: &str = "prediction.csv";

/// Default data-quality report filename
pub const REPORT_FILENAME: &str = "data_info.xml";

/// Datetime format used when exporting cleaned records
pub const EXPORT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// XML element names of the data-quality report
pub mod report_xml {
    pub const ROOT: &str = "data_info";
    pub const FILE: &str = "file";
    pub const INFO: &str = "info";
    pub const COLUMN: &str = "column";
}

// =============================================================================
// Record Repair Tables
// =============================================================================

/// Spelled-out quantities found in the order details export
pub const WORD_QUANTITIES: &[(&str, &str)] = &[("one", "1"), ("One", "1"), ("two", "2"), ("Two", "2")];

/// Character substitutions undoing typo/OCR corruption of pizza identifiers
pub const PIZZA_ID_SUBSTITUTIONS: &[(char, char)] = &[
    ('-', '_'),
    (' ', '_'),
    ('@', 'a'),
    ('0', 'o'),
    ('3', 'e'),
];

/// Separator between ingredient names in the pizza type catalog
pub const INGREDIENT_SEPARATOR: &str = ", ";

// =============================================================================
// Column Name Constants
// =============================================================================

/// Column names of the four input tables
pub mod columns {
    // order_details
    pub const ORDER_DETAILS_ID: &str = "order_details_id";
    pub const ORDER_ID: &str = "order_id";
    pub const PIZZA_ID: &str = "pizza_id";
    pub const QUANTITY: &str = "quantity";

    // orders
    pub const DATE: &str = "date";
    pub const TIME: &str = "time";

    // pizzas
    pub const PIZZA_TYPE_ID: &str = "pizza_type_id";
    pub const SIZE: &str = "size";
    pub const PRICE: &str = "price";

    // pizza_types
    pub const NAME: &str = "name";
    pub const CATEGORY: &str = "category";
    pub const INGREDIENTS: &str = "ingredients";

    // derived
    pub const WEEK: &str = "week";
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Row label for a 1-based ISO week number
pub fn week_label(week: usize) -> String {
    format!("{}{}", WEEK_LABEL_PREFIX, week)
}
