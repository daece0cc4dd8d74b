//! Selected product ids.
//!
//! Membership is by id and survives filtering and sorting: a record can be
//! selected while hidden by the current filters. Ids only leave the set when
//! the user deselects them or their record disappears from the collection.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::product_model::Product;

/// State of the "select all" checkbox relative to the visible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectAllState {
    None,
    /// Some, but not all, visible rows are selected.
    Partial,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn select(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Flips membership of `id`; returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// Selects or deselects every visible record, leaving hidden ones alone.
    pub fn set_all_visible<'a>(&mut self, visible: impl IntoIterator<Item = &'a Product>, selected: bool) {
        for product in visible {
            if selected {
                self.ids.insert(product.id.clone());
            } else {
                self.ids.remove(&product.id);
            }
        }
    }

    /// Moves membership from `old_id` to `new_id` after an id edit.
    pub fn rename(&mut self, old_id: &str, new_id: &str) {
        if self.ids.remove(old_id) {
            self.ids.insert(new_id.to_string());
        }
    }

    /// Drops `id` because its record was deleted.
    pub fn revoke(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    /// Drops ids that no longer name a record in `products`.
    pub fn retain_existing(&mut self, products: &[Product]) -> usize {
        let before = self.ids.len();
        if !self.ids.is_empty() {
            let live: BTreeSet<&str> = products.iter().map(|p| p.id.as_str()).collect();
            self.ids.retain(|id| live.contains(id.as_str()));
        }
        before - self.ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn select_all_state<'a>(&self, visible: impl IntoIterator<Item = &'a Product>) -> SelectAllState {
        let (mut shown, mut picked) = (0usize, 0usize);
        for product in visible {
            shown += 1;
            if self.ids.contains(&product.id) {
                picked += 1;
            }
        }
        match picked {
            0 => SelectAllState::None,
            n if n == shown => SelectAllState::All,
            _ => SelectAllState::Partial,
        }
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
