//! The editing session: owned state plus the mutation gateway.
//!
//! Every change to the collection goes through [`EditorSession::apply`] (or
//! the replay path used by undo/redo), which always runs the same steps in
//! the same order:
//!
//! 1. compute the next collection from the current one and check that its
//!    ids are non-empty and unique and its prices finite,
//! 2. record it in the history (skipped for undo/redo replays),
//! 3. install it,
//! 4. drop selected ids whose record no longer exists,
//! 5. rebuild the brand/category options and the filtered view.
//!
//! A step that fails before the install leaves the session untouched.

use std::collections::BTreeSet;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::catalog_io;
use crate::editable_field::{FieldEdit, ProductField};
use crate::editor_config::EditorConfig;
use crate::editor_error::EditorError;
use crate::history_manager::HistoryManager;
use crate::image_attachment::encode_data_uri;
use crate::product_collection::{self, SortSpec};
use crate::product_model::Product;
use crate::selection_set::{SelectAllState, SelectionSet};
use crate::view_engine::{compute_view_indices, FilterOptions, ViewFilters};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Edit,
    Replay,
}

/// Everything a presentation layer needs to redraw after an intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    pub view: Vec<Product>,
    pub total: usize,
    pub filters: ViewFilters,
    pub filter_options: FilterOptions,
    pub selection: Vec<String>,
    pub select_all: SelectAllState,
    pub can_undo: bool,
    pub can_redo: bool,
    pub file_name: String,
}

#[derive(Debug)]
pub struct EditorSession {
    products: Vec<Product>,
    selection: SelectionSet,
    history: HistoryManager,
    filters: ViewFilters,
    filter_options: FilterOptions,
    view: Vec<usize>,
    file_name: String,
    config: EditorConfig,
    rng: fastrand::Rng,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            products: Vec::new(),
            selection: SelectionSet::new(),
            history: HistoryManager::new(config.max_history),
            filters: ViewFilters::default(),
            filter_options: FilterOptions::default(),
            view: Vec::new(),
            file_name: config.default_file_name.clone(),
            config,
            rng: fastrand::Rng::new(),
        }
    }

    /// Makes [`shuffle`](Self::shuffle) deterministic.
    pub fn seed_shuffle(&mut self, seed: u64) {
        self.rng = fastrand::Rng::with_seed(seed);
    }

    // ------------------------------------------------------------------
    // Gateway
    // ------------------------------------------------------------------

    /// Computes the next collection with `mutation` and commits it.
    pub fn apply<F>(&mut self, mutation: F) -> Result<(), EditorError>
    where
        F: FnOnce(&[Product]) -> Result<Vec<Product>, EditorError>,
    {
        let next = mutation(&self.products)?;
        self.install(next, Origin::Edit, None)
    }

    fn install(&mut self, next: Vec<Product>, origin: Origin, selection: Option<SelectionSet>) -> Result<(), EditorError> {
        logged("install", product_collection::check_invariants(&next))?;
        if origin == Origin::Edit {
            self.history.commit(&next)?;
        }
        self.products = next;
        if let Some(selection) = selection {
            self.selection = selection;
        }
        let dropped = self.selection.retain_existing(&self.products);
        if dropped > 0 {
            debug!("Deselected {} ids that no longer exist", dropped);
        }
        self.refresh_view();
        Ok(())
    }

    fn refresh_view(&mut self) {
        self.filter_options = FilterOptions::from_products(&self.products);
        self.filters.reconcile(&self.filter_options);
        self.view = compute_view_indices(&self.products, &self.filters);
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Replaces the collection with the contents of a loaded file and
    /// restarts the history from it. Returns the number of records.
    pub fn load_file(&mut self, buffer: &str, file_name: &str) -> Result<usize, EditorError> {
        let products = logged("load", catalog_io::parse_import(buffer, now_ms()))?;
        self.history.reset(&products)?;
        self.selection.clear();
        let count = products.len();
        self.file_name = file_name.to_string();
        self.install(products, Origin::Replay, None)?;
        info!("Successfully loaded {} ({} products)", file_name, count);
        Ok(count)
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Edits one field from raw cell text.
    pub fn edit_field(&mut self, id: &str, field: ProductField, raw: &str) -> Result<(), EditorError> {
        let edit = logged("edit", FieldEdit::from_input(field, raw))?;
        self.set_field(id, edit)
    }

    pub fn set_field(&mut self, id: &str, edit: FieldEdit) -> Result<(), EditorError> {
        let next = logged("edit", product_collection::set_field(&self.products, id, &edit))?;
        let selection = match &edit {
            FieldEdit::Id(new_id) if self.selection.contains(id) => {
                let mut renamed = self.selection.clone();
                renamed.rename(id, new_id);
                Some(renamed)
            }
            _ => None,
        };
        self.install(next, Origin::Edit, selection)?;
        debug!("Set {} on {}", edit.field(), id);
        Ok(())
    }

    /// Stores uploaded image bytes on a record as a `data:` URI.
    pub fn attach_image(&mut self, id: &str, bytes: &[u8], mime: Option<&str>) -> Result<(), EditorError> {
        let uri = encode_data_uri(bytes, mime);
        self.set_field(id, FieldEdit::Img(uri))
    }

    /// Prepends a blank record and returns its id.
    pub fn add_product(&mut self) -> Result<String, EditorError> {
        let id = product_collection::generate_id(&self.products, now_ms());
        let product = Product::blank(id.clone(), self.config.new_product_name.clone());
        self.apply(|products| Ok(product_collection::add_record(products, product)))?;
        info!("New product {} added at the top", id);
        Ok(id)
    }

    pub fn delete_product(&mut self, id: &str) -> Result<Product, EditorError> {
        let index = product_collection::find_index(&self.products, id)
            .ok_or_else(|| EditorError::ProductNotFound(id.to_string()));
        let index = logged("delete", index)?;
        let removed = self.products[index].clone();
        let next = product_collection::delete_record(&self.products, id)?;
        let mut selection = self.selection.clone();
        selection.revoke(id);
        self.install(next, Origin::Edit, Some(selection))?;
        info!("Product \"{}\" deleted", removed.name);
        Ok(removed)
    }

    /// Deletes every record whose id is in `ids`; returns how many went.
    pub fn delete_products(&mut self, ids: &BTreeSet<String>) -> Result<usize, EditorError> {
        let before = self.products.len();
        let next = product_collection::delete_many(&self.products, ids);
        let mut selection = self.selection.clone();
        for id in ids {
            selection.revoke(id);
        }
        self.install(next, Origin::Edit, Some(selection))?;
        Ok(before - self.products.len())
    }

    /// Deletes the selected records and empties the selection.
    pub fn delete_selected(&mut self) -> Result<usize, EditorError> {
        if self.selection.is_empty() {
            return logged("delete", Err(EditorError::EmptySelection("No products selected.".to_string())));
        }
        let ids = self.selection.ids().clone();
        let before = self.products.len();
        let next = product_collection::delete_many(&self.products, &ids);
        self.install(next, Origin::Edit, Some(SelectionSet::new()))?;
        let deleted = before - self.products.len();
        info!("{} products deleted", deleted);
        Ok(deleted)
    }

    pub fn sort(&mut self, spec: SortSpec) -> Result<(), EditorError> {
        self.apply(|products| Ok(product_collection::sort_by(products, spec)))?;
        debug!("Sorted by {}", spec);
        Ok(())
    }

    /// Sorts from the `<field>_<asc|desc>` form used by the sort menu.
    pub fn sort_by_key(&mut self, key: &str) -> Result<(), EditorError> {
        let spec = logged("sort", key.parse::<SortSpec>())?;
        self.sort(spec)
    }

    pub fn shuffle(&mut self) -> Result<(), EditorError> {
        let next = product_collection::shuffle(&self.products, &mut self.rng);
        self.install(next, Origin::Edit, None)?;
        info!("Products have been shuffled");
        Ok(())
    }

    /// Sets one field on every selected record from raw form text.
    /// Returns the number of records updated.
    pub fn bulk_edit(&mut self, field: ProductField, raw: &str) -> Result<usize, EditorError> {
        if self.selection.is_empty() {
            return logged(
                "bulk edit",
                Err(EditorError::EmptySelection("No products selected for bulk edit.".to_string())),
            );
        }
        let edit = logged("bulk edit", FieldEdit::from_input(field, raw))?;
        self.bulk_set(edit)
    }

    pub fn bulk_set(&mut self, edit: FieldEdit) -> Result<usize, EditorError> {
        let ids = self.selection.ids().clone();
        let next = logged("bulk edit", product_collection::bulk_set(&self.products, &ids, &edit))?;
        let count = self.products.iter().filter(|p| ids.contains(&p.id)).count();
        self.install(next, Origin::Edit, None)?;
        info!("Updated {} for {} products", edit.field(), count);
        Ok(count)
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Returns `false` when there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        match self.history.undo()? {
            Some(previous) => {
                self.install(previous, Origin::Replay, None)?;
                info!("Undo successful");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns `false` when there was nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        match self.history.redo()? {
            Some(next) => {
                self.install(next, Origin::Replay, None)?;
                info!("Redo successful");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    // ------------------------------------------------------------------
    // Filters and selection
    // ------------------------------------------------------------------

    pub fn set_filters(&mut self, filters: ViewFilters) {
        self.filters = filters;
        self.refresh_view();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filters.search = search.into();
        self.refresh_view();
    }

    /// Returns whether `id` is selected afterwards.
    pub fn toggle_select(&mut self, id: &str) -> Result<bool, EditorError> {
        if product_collection::find_index(&self.products, id).is_none() {
            return Err(EditorError::ProductNotFound(id.to_string()));
        }
        Ok(self.selection.toggle(id))
    }

    /// Selects or deselects every record in the current view.
    pub fn select_all(&mut self, selected: bool) {
        let visible = self.view.iter().map(|&i| &self.products[i]);
        self.selection.set_all_visible(visible, selected);
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn select_all_state(&self) -> SelectAllState {
        self.selection.select_all_state(self.view.iter().map(|&i| &self.products[i]))
    }

    // ------------------------------------------------------------------
    // Reads and exports
    // ------------------------------------------------------------------

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn view(&self) -> Vec<&Product> {
        self.view.iter().map(|&i| &self.products[i]).collect()
    }

    pub fn filters(&self) -> &ViewFilters {
        &self.filters
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.filter_options
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn export_json(&self) -> Result<String, EditorError> {
        let json = catalog_io::export_json(&self.products, self.config.json_indent)?;
        info!("Exported {} products as {}", self.products.len(), self.file_name);
        Ok(json)
    }

    pub fn export_csv(&self) -> Result<String, EditorError> {
        let csv = catalog_io::export_csv(&self.products)?;
        info!("Exported {} products as {}", self.products.len(), self.csv_file_name());
        Ok(csv)
    }

    pub fn csv_file_name(&self) -> String {
        catalog_io::csv_file_name(&self.file_name)
    }

    pub fn render_state(&self) -> RenderState {
        RenderState {
            view: self.view().into_iter().cloned().collect(),
            total: self.products.len(),
            filters: self.filters.clone(),
            filter_options: self.filter_options.clone(),
            selection: self.selection.ids().iter().cloned().collect(),
            select_all: self.select_all_state(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            file_name: self.file_name.clone(),
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn logged<T>(intent: &str, result: Result<T, EditorError>) -> Result<T, EditorError> {
    if let Err(e) = &result {
        warn!("Rejected {}: {}", intent, e);
    }
    result
}
