//! Integration tests for the processor module
//!
//! Tests the complete forecast pipeline over small order exports written
//! to a temporary directory.

pub mod basic_processing;
pub mod error_handling;

use std::fs;
use std::path::Path;

pub const ORDER_DETAILS: &str = "order_details_id;order_id;pizza_id;quantity
1;1;hawaiian_s;1
2;2;hawaiian_l;One
3;2;pepperoni-m;-2
4;3;;2
5;99;hawaiian_m;1
";

pub const ORDERS: &str = "order_id;date;time
1;1420070400;11:38:36
2;Friday 02 Jan 2015;11:57:40
3;2015-01-08;12:12:28
";

pub const PIZZAS: &str = "pizza_id,pizza_type_id,size,price
hawaiian_s,hawaiian,S,10.5
hawaiian_m,hawaiian,M,13.25
hawaiian_l,hawaiian,L,16.5
pepperoni_m,pepperoni,M,12.5
";

pub const PIZZA_TYPES: &str = "pizza_type_id,name,category,ingredients
hawaiian,The Hawaiian Pizza,Classic,\"Sliced Ham, Pineapple, Mozzarella Cheese\"
pepperoni,The Pepperoni Pizza,Classic,\"Mozzarella Cheese, Pepperoni\"
";

/// Write the four input tables, substituting any table given in `overrides`
pub fn write_dataset(dir: &Path, overrides: &[(&str, &str)]) {
    let tables = [
        ("order_details.csv", ORDER_DETAILS),
        ("orders.csv", ORDERS),
        ("pizzas.csv", PIZZAS),
        ("pizza_types.csv", PIZZA_TYPES),
    ];

    for (file_name, default) in tables {
        let content = overrides
            .iter()
            .find(|(name, _)| *name == file_name)
            .map(|(_, content)| *content)
            .unwrap_or(default);
        fs::write(dir.join(file_name), content).unwrap();
    }
}
