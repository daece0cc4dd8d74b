//! Linear undo/redo history over whole-collection snapshots.
//!
//! ```text
//! commit A, B, C      [A B C]   cursor -> C
//! undo x2             [A B C]   cursor -> A     (B, C redoable)
//! commit D            [A D]     cursor -> D     (redo branch pruned)
//! ```
//!
//! The history grows without bound unless a depth cap is configured, in
//! which case the oldest snapshots are evicted first.

use log::debug;

use crate::editor_error::EditorError;
use crate::product_model::Product;
use crate::snapshot_store::{self, SnapshotStore, SnapshotToken};

#[derive(Debug)]
pub struct HistoryManager {
    store: SnapshotStore,
    cursor: Option<SnapshotToken>,
    max_depth: Option<usize>,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HistoryManager {
    /// `max_depth` of `None` keeps every snapshot.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            store: SnapshotStore::new(),
            cursor: None,
            max_depth: max_depth.map(|depth| depth.max(1)),
        }
    }

    /// Records `products` as the newest state, discarding anything that was
    /// redoable.
    pub fn commit(&mut self, products: &[Product]) -> Result<(), EditorError> {
        let snapshot = snapshot_store::capture(products)?;
        self.store.truncate_after(self.cursor);
        let token = self.store.append(snapshot);
        self.cursor = Some(token);
        self.enforce_depth();
        debug!(
            "History commit #{} ({} entries, {} bytes retained)",
            token.sequence(),
            self.store.len(),
            self.store.total_bytes()
        );
        Ok(())
    }

    /// Drops all history and records `products` as the only entry.
    pub fn reset(&mut self, products: &[Product]) -> Result<(), EditorError> {
        let snapshot = snapshot_store::capture(products)?;
        self.store.clear();
        self.cursor = Some(self.store.append(snapshot));
        Ok(())
    }

    /// Steps back one entry. `Ok(None)` means there is nothing to undo.
    pub fn undo(&mut self) -> Result<Option<Vec<Product>>, EditorError> {
        let Some(index) = self.index().filter(|&i| i > 0) else {
            return Ok(None);
        };
        self.move_to(index - 1).map(Some)
    }

    /// Steps forward one entry. `Ok(None)` means there is nothing to redo.
    pub fn redo(&mut self) -> Result<Option<Vec<Product>>, EditorError> {
        if !self.can_redo() {
            return Ok(None);
        }
        let next = self.index().map_or(0, |i| i + 1);
        self.move_to(next).map(Some)
    }

    pub fn can_undo(&self) -> bool {
        self.index().is_some_and(|i| i > 0)
    }

    pub fn can_redo(&self) -> bool {
        match self.index() {
            Some(i) => i + 1 < self.store.len(),
            None => false,
        }
    }

    /// Cursor position among the retained entries; `None` before the first commit.
    pub fn index(&self) -> Option<usize> {
        self.cursor.and_then(|token| self.store.position(token))
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The collection stored at the cursor.
    pub fn current(&self) -> Result<Option<Vec<Product>>, EditorError> {
        self.cursor.map(|token| self.store.restore(token)).transpose()
    }

    /// Every retained entry, oldest first.
    pub fn entries(&self) -> Result<Vec<Vec<Product>>, EditorError> {
        (0..self.store.len())
            .filter_map(|position| self.store.token_at(position))
            .map(|token| self.store.restore(token))
            .collect()
    }

    fn move_to(&mut self, position: usize) -> Result<Vec<Product>, EditorError> {
        let token = self
            .store
            .token_at(position)
            .ok_or_else(|| EditorError::Serialization(format!("history position {} out of range", position)))?;
        let products = self.store.restore(token)?;
        self.cursor = Some(token);
        Ok(products)
    }

    fn enforce_depth(&mut self) {
        let Some(max) = self.max_depth else {
            return;
        };
        while self.store.len() > max {
            if let Some(evicted) = self.store.evict_oldest() {
                debug!("History evicted snapshot #{}", evicted.sequence());
            }
        }
    }
}
