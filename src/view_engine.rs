//! Filtered view of the collection.
//!
//! The view is recomputed from scratch after every mutation and every
//! filter change; it never reorders, it only hides records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::product_model::Product;

/// Filter value meaning "no restriction".
pub const ALL_OPTION: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewFilters {
    pub search: String,
    pub brand: String,
    pub category: String,
}

impl Default for ViewFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            brand: ALL_OPTION.to_string(),
            category: ALL_OPTION.to_string(),
        }
    }
}

impl ViewFilters {
    pub fn new(search: impl Into<String>, brand: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            brand: brand.into(),
            category: category.into(),
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        if self.brand != ALL_OPTION && product.brand != self.brand {
            return false;
        }
        if self.category != ALL_OPTION && product.category != self.category {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        searchable_text(product).contains(&self.search.to_lowercase())
    }

    /// Falls back to "All" for a brand or category that no longer exists.
    pub fn reconcile(&mut self, options: &FilterOptions) {
        if !options.brands.contains(&self.brand) {
            self.brand = ALL_OPTION.to_string();
        }
        if !options.categories.contains(&self.category) {
            self.category = ALL_OPTION.to_string();
        }
    }
}

/// Lowercased text the search box matches against.
fn searchable_text(product: &Product) -> String {
    let mut parts = vec![
        product.name.as_str(),
        product.brand.as_str(),
        product.category.as_str(),
        product.description.as_str(),
    ];
    parts.extend(product.features.iter().map(String::as_str));
    parts.extend(product.specs.values().map(String::as_str));
    parts.join(" ").to_lowercase()
}

/// Positions (into the collection) of the records passing `filters`.
pub fn compute_view_indices(products: &[Product], filters: &ViewFilters) -> Vec<usize> {
    products
        .iter()
        .enumerate()
        .filter(|(_, p)| filters.matches(p))
        .map(|(i, _)| i)
        .collect()
}

pub fn compute_view<'a>(products: &'a [Product], filters: &ViewFilters) -> Vec<&'a Product> {
    products.iter().filter(|p| filters.matches(p)).collect()
}

/// Choices offered by the brand and category drop-downs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub brands: Vec<String>,
    pub categories: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            brands: vec![ALL_OPTION.to_string()],
            categories: vec![ALL_OPTION.to_string()],
        }
    }
}

impl FilterOptions {
    /// Distinct non-empty values, sorted, with "All" first.
    pub fn from_products(products: &[Product]) -> Self {
        Self {
            brands: distinct_with_all(products.iter().map(|p| p.brand.as_str())),
            categories: distinct_with_all(products.iter().map(|p| p.category.as_str())),
        }
    }
}

fn distinct_with_all<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let distinct: BTreeSet<&str> = values.filter(|v| !v.is_empty()).collect();
    std::iter::once(ALL_OPTION)
        .chain(distinct.into_iter().filter(|v| *v != ALL_OPTION))
        .map(str::to_string)
        .collect()
}
