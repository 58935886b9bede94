//! Input table loading and typed row extraction.
//!
//! Reads the four delimited exports into polars frames and converts
//! frames into the typed rows the cleaning stages work on. Files are
//! decoded as UTF-8 when valid and byte-per-character (Latin-1) otherwise,
//! so a catalog saved by a legacy editor never aborts the run.

use crate::config::ForecastConfig;
use crate::constants::columns;
use crate::error::{ForecastError, Result};
use crate::models::{Order, OrderLineItem, PizzaSize, PizzaType, PizzaVariant, TableKind};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// The four raw input tables, as read from disk
#[derive(Debug, Clone)]
pub struct RawTables {
    pub order_details: DataFrame,
    pub orders: DataFrame,
    pub pizzas: DataFrame,
    pub pizza_types: DataFrame,
}

impl RawTables {
    /// Load every table named by the configuration
    pub fn load(config: &ForecastConfig) -> Result<Self> {
        let read = |kind: TableKind| {
            let source = config.source(kind);
            let path = config.input_path(kind);
            let frame = read_table(&path, source.separator, config.infer_schema_rows)?;
            info!(
                "Loaded {} from {}: {} rows x {} columns",
                kind,
                path.display(),
                frame.height(),
                frame.width()
            );
            Ok::<_, ForecastError>(frame)
        };

        Ok(Self {
            order_details: read(TableKind::OrderDetails)?,
            orders: read(TableKind::Orders)?,
            pizzas: read(TableKind::Pizzas)?,
            pizza_types: read(TableKind::PizzaTypes)?,
        })
    }

    pub fn get(&self, kind: TableKind) -> &DataFrame {
        match kind {
            TableKind::OrderDetails => &self.order_details,
            TableKind::Orders => &self.orders,
            TableKind::Pizzas => &self.pizzas,
            TableKind::PizzaTypes => &self.pizza_types,
        }
    }

    /// Tables in `TableKind::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (TableKind, &DataFrame)> {
        TableKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

/// Read one delimited file into a frame
pub fn read_table(
    path: &Path,
    separator: u8,
    infer_schema_rows: Option<usize>,
) -> Result<DataFrame> {
    if !path.exists() {
        return Err(ForecastError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path)?;
    let text = decode_lossless(bytes);
    parse_table(text.into_bytes(), separator, infer_schema_rows)
}

/// Parse delimited text that is already valid UTF-8
pub fn parse_table(
    bytes: Vec<u8>,
    separator: u8,
    infer_schema_rows: Option<usize>,
) -> Result<DataFrame> {
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_schema_rows)
        .with_parse_options(CsvParseOptions::default().with_separator(separator))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;
    Ok(frame)
}

/// UTF-8 when valid, otherwise every byte maps to the code point of the same value
pub fn decode_lossless(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            let bytes = err.into_bytes();
            warn!("Input is not valid UTF-8, decoding {} bytes as Latin-1", bytes.len());
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Extract `order_details` rows
pub fn line_items_from_frame(frame: &DataFrame) -> Result<Vec<OrderLineItem>> {
    let kind = TableKind::OrderDetails;
    let ids = int_column(frame, kind, columns::ORDER_DETAILS_ID)?;
    let order_ids = int_column(frame, kind, columns::ORDER_ID)?;
    let pizza_ids = string_column(frame, kind, columns::PIZZA_ID)?;
    let quantities = string_column(frame, kind, columns::QUANTITY)?;

    let items = ids
        .into_iter()
        .zip(order_ids)
        .zip(pizza_ids)
        .zip(quantities)
        .map(|(((order_details_id, order_id), pizza_id), quantity)| OrderLineItem {
            order_details_id,
            order_id,
            pizza_id,
            quantity,
        })
        .collect::<Vec<_>>();

    debug!("Extracted {} order line items", items.len());
    Ok(items)
}

/// Extract `orders` rows
pub fn orders_from_frame(frame: &DataFrame) -> Result<Vec<Order>> {
    let kind = TableKind::Orders;
    let order_ids = int_column(frame, kind, columns::ORDER_ID)?;
    let dates = string_column(frame, kind, columns::DATE)?;
    let times = optional_string_column(frame, columns::TIME)?;

    let orders = order_ids
        .into_iter()
        .zip(dates)
        .zip(times)
        .map(|((order_id, date), time)| Order {
            order_id,
            date,
            time,
        })
        .collect::<Vec<_>>();

    debug!("Extracted {} orders", orders.len());
    Ok(orders)
}

/// Extract `pizzas` rows, skipping rows without an identifier
pub fn pizza_variants_from_frame(frame: &DataFrame) -> Result<Vec<PizzaVariant>> {
    let kind = TableKind::Pizzas;
    let pizza_ids = string_column(frame, kind, columns::PIZZA_ID)?;
    let type_ids = string_column(frame, kind, columns::PIZZA_TYPE_ID)?;
    let sizes = string_column(frame, kind, columns::SIZE)?;
    let prices = float_column(frame, kind, columns::PRICE)?;

    let mut variants = Vec::with_capacity(pizza_ids.len());
    let rows = pizza_ids.into_iter().zip(type_ids).zip(sizes).zip(prices);
    for (((pizza_id, type_id), size), price) in rows {
        let (Some(pizza_id), Some(pizza_type_id)) = (pizza_id, type_id) else {
            continue;
        };
        let size = size.as_deref().and_then(PizzaSize::from_label);
        if size.is_none() {
            debug!("Pizza variant {} has no recognised size", pizza_id);
        }
        variants.push(PizzaVariant {
            pizza_id,
            pizza_type_id,
            size,
            price,
        });
    }

    debug!("Extracted {} pizza variants", variants.len());
    Ok(variants)
}

/// Extract `pizza_types` rows, skipping rows without an identifier
pub fn pizza_types_from_frame(frame: &DataFrame) -> Result<Vec<PizzaType>> {
    let kind = TableKind::PizzaTypes;
    let type_ids = string_column(frame, kind, columns::PIZZA_TYPE_ID)?;
    let names = optional_string_column(frame, columns::NAME)?;
    let categories = optional_string_column(frame, columns::CATEGORY)?;
    let ingredients = string_column(frame, kind, columns::INGREDIENTS)?;

    let types = type_ids
        .into_iter()
        .zip(names)
        .zip(categories)
        .zip(ingredients)
        .filter_map(|(((type_id, name), category), ingredients)| {
            Some(PizzaType {
                pizza_type_id: type_id?.trim().to_string(),
                name: name.unwrap_or_default(),
                category: category.unwrap_or_default(),
                ingredients: ingredients.unwrap_or_default(),
            })
        })
        .collect::<Vec<_>>();

    debug!("Extracted {} pizza types", types.len());
    Ok(types)
}

fn require_column<'a>(frame: &'a DataFrame, kind: TableKind, name: &str) -> Result<&'a Column> {
    frame
        .column(name)
        .map_err(|_| ForecastError::MissingColumn {
            table: kind.name().to_string(),
            column: name.to_string(),
        })
}

fn string_values(column: &Column) -> Result<Vec<Option<String>>> {
    let cast = column.cast(&DataType::String)?;
    let values = cast
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();
    Ok(values)
}

fn string_column(frame: &DataFrame, kind: TableKind, name: &str) -> Result<Vec<Option<String>>> {
    string_values(require_column(frame, kind, name)?)
}

/// All-null when the column is absent
fn optional_string_column(frame: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    match frame.column(name) {
        Ok(column) => string_values(column),
        Err(_) => Ok(vec![None; frame.height()]),
    }
}

fn int_column(frame: &DataFrame, kind: TableKind, name: &str) -> Result<Vec<Option<i64>>> {
    let cast = require_column(frame, kind, name)?.cast(&DataType::Int64)?;
    let values = cast.as_materialized_series().i64()?.into_iter().collect();
    Ok(values)
}

fn float_column(frame: &DataFrame, kind: TableKind, name: &str) -> Result<Vec<Option<f64>>> {
    let cast = require_column(frame, kind, name)?.cast(&DataType::Float64)?;
    let values = cast.as_materialized_series().f64()?.into_iter().collect();
    Ok(values)
}
