//! Pizza catalog and ingredient set.
//!
//! A pizza identifier encodes both its type and its size: the type id
//! followed by `_s`, `_m`, `_l`, `_xl` or `_xxl`. This module owns that
//! grammar and the lookups from identifier to ingredient list.

use crate::constants::INGREDIENT_SEPARATOR;
use crate::error::{ForecastError, Result};
use crate::models::{PizzaSize, PizzaType, PizzaVariant};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Distinct ingredient names across all pizza types
///
/// Lists are split on ", " and every name is trimmed, so the same
/// ingredient listed by several pizza types collapses to one entry.
pub fn build_ingredient_catalog(pizza_types: &[PizzaType]) -> BTreeSet<String> {
    pizza_types
        .iter()
        .flat_map(|pizza| pizza.ingredients.split(INGREDIENT_SEPARATOR))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a cleaned pizza identifier into its type id and size code
///
/// `_xxl` and `_xl` suffixes are matched first; any other identifier
/// is taken to end in `_<c>` with a single-letter size code.
pub fn split_size_suffix(pizza_id: &str) -> Option<(&str, &str)> {
    if pizza_id.ends_with("_xxl") {
        let cut = pizza_id.len() - 4;
        Some((&pizza_id[..cut], &pizza_id[cut + 1..]))
    } else if pizza_id.ends_with("_xl") {
        let cut = pizza_id.len() - 3;
        Some((&pizza_id[..cut], &pizza_id[cut + 1..]))
    } else {
        let (code_start, _) = pizza_id.char_indices().next_back()?;
        let cut = pizza_id[..code_start].char_indices().next_back()?.0;
        Some((&pizza_id[..cut], &pizza_id[code_start..]))
    }
}

/// Parse a pizza identifier into its type id and size
pub fn parse_pizza_id(pizza_id: &str) -> Result<(&str, PizzaSize)> {
    let (base, code) = split_size_suffix(pizza_id).ok_or_else(|| ForecastError::UnknownPizza {
        pizza_id: pizza_id.to_string(),
    })?;
    let size = PizzaSize::from_code(code).ok_or_else(|| ForecastError::UnknownSize {
        pizza_id: pizza_id.to_string(),
        code: code.to_string(),
    })?;
    Ok((base, size))
}

/// Pizza type resolved from an identifier
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPizza<'a> {
    pub pizza_type: &'a PizzaType,
    pub size: PizzaSize,
    pub ingredients: &'a [String],
}

/// Pizza types and variants indexed by identifier
#[derive(Debug, Clone, Default)]
pub struct PizzaCatalog {
    types: HashMap<String, PizzaType>,
    ingredients: HashMap<String, Vec<String>>,
    variants: HashMap<String, PizzaVariant>,
}

impl PizzaCatalog {
    /// Index the catalog; the first row wins when an identifier is listed twice
    pub fn new(pizza_types: Vec<PizzaType>, variants: Vec<PizzaVariant>) -> Self {
        let mut types = HashMap::with_capacity(pizza_types.len());
        let mut ingredients = HashMap::with_capacity(pizza_types.len());
        for pizza in pizza_types {
            if types.contains_key(&pizza.pizza_type_id) {
                debug!("Ignoring repeated pizza type {}", pizza.pizza_type_id);
                continue;
            }
            ingredients.insert(pizza.pizza_type_id.clone(), pizza.ingredient_list());
            types.insert(pizza.pizza_type_id.clone(), pizza);
        }

        let mut by_id = HashMap::with_capacity(variants.len());
        for variant in variants {
            by_id.entry(variant.pizza_id.clone()).or_insert(variant);
        }
        let variants = by_id;

        Self {
            types,
            ingredients,
            variants,
        }
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Resolve a cleaned identifier to its pizza type, size and ingredients
    pub fn resolve(&self, pizza_id: &str) -> Result<ResolvedPizza<'_>> {
        let (base, size) = parse_pizza_id(pizza_id)?;
        let pizza_type = self
            .types
            .get(base)
            .ok_or_else(|| ForecastError::UnknownPizza {
                pizza_id: pizza_id.to_string(),
            })?;

        if let Some(variant) = self.variants.get(pizza_id) {
            if variant.size.is_some_and(|listed| listed != size) {
                debug!(
                    "Pizza {} is listed as size {:?} but its identifier says {:?}",
                    pizza_id, variant.size, size
                );
            }
        } else if !self.variants.is_empty() {
            debug!("Pizza {} is not listed among the variants", pizza_id);
        }

        let ingredients = self
            .ingredients
            .get(base)
            .map(Vec::as_slice)
            .unwrap_or_default();

        Ok(ResolvedPizza {
            pizza_type,
            size,
            ingredients,
        })
    }
}
