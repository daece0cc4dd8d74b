//! Serialized snapshots of the product collection.
//!
//! A snapshot is the JSON text of the whole collection. Capturing
//! serializes, restoring deserializes into a brand new `Vec<Product>`, so a
//! restored collection never shares anything with the live one.
//!
//! [`SnapshotStore`] keeps snapshots in an append-only log addressed by
//! [`SnapshotToken`]s. Tokens are absolute sequence numbers: evicting from
//! the front moves `base`, truncating the tail drops the newest entries, and
//! every token in `base..base + len` stays valid.
//!
//! ```text
//! append x4            log: [s0 s1 s2 s3]   base = 0
//! truncate_after(t1)   log: [s0 s1]         base = 0
//! append               log: [s0 s1 s4]      base = 0   (s4 gets token 2)
//! evict_oldest         log: [s1 s4]         base = 1
//! ```

use std::collections::VecDeque;
use std::fmt;

use crate::editor_error::EditorError;
use crate::product_model::Product;

/// Handle to one entry of a [`SnapshotStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotToken(u64);

impl SnapshotToken {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Serializes a collection into immutable snapshot text.
pub fn capture(products: &[Product]) -> Result<Box<str>, EditorError> {
    Ok(serde_json::to_string(products)?.into_boxed_str())
}

/// Rebuilds an independent collection from snapshot text.
pub fn restore(snapshot: &str) -> Result<Vec<Product>, EditorError> {
    Ok(serde_json::from_str(snapshot)?)
}

/// Append-only log of serialized collections.
#[derive(Default)]
pub struct SnapshotStore {
    log: VecDeque<Box<str>>,
    base: u64,
}

impl fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("len", &self.log.len())
            .field("base", &self.base)
            .field("bytes", &self.total_bytes())
            .finish()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends already-serialized snapshot text.
    pub fn append(&mut self, snapshot: Box<str>) -> SnapshotToken {
        let token = SnapshotToken(self.base + self.log.len() as u64);
        self.log.push_back(snapshot);
        token
    }

    pub fn restore(&self, token: SnapshotToken) -> Result<Vec<Product>, EditorError> {
        restore(self.get(token)?)
    }

    pub fn get(&self, token: SnapshotToken) -> Result<&str, EditorError> {
        token
            .0
            .checked_sub(self.base)
            .and_then(|offset| self.log.get(offset as usize))
            .map(|snapshot| &**snapshot)
            .ok_or_else(|| EditorError::Serialization(format!("snapshot {} is no longer retained", token.0)))
    }

    /// Drops every entry newer than `token`. `None` drops everything.
    pub fn truncate_after(&mut self, token: Option<SnapshotToken>) {
        let keep = match token {
            Some(t) => (t.0 + 1).saturating_sub(self.base) as usize,
            None => 0,
        };
        self.log.truncate(keep);
    }

    /// Removes the oldest entry and returns its token.
    pub fn evict_oldest(&mut self) -> Option<SnapshotToken> {
        self.log.pop_front()?;
        let evicted = SnapshotToken(self.base);
        self.base += 1;
        Some(evicted)
    }

    pub fn clear(&mut self) {
        self.base += self.log.len() as u64;
        self.log.clear();
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn oldest(&self) -> Option<SnapshotToken> {
        (!self.log.is_empty()).then_some(SnapshotToken(self.base))
    }

    pub fn newest(&self) -> Option<SnapshotToken> {
        (!self.log.is_empty()).then(|| SnapshotToken(self.base + self.log.len() as u64 - 1))
    }

    /// Position of `token` counted from the oldest retained entry.
    pub fn position(&self, token: SnapshotToken) -> Option<usize> {
        let offset = token.0.checked_sub(self.base)? as usize;
        (offset < self.log.len()).then_some(offset)
    }

    pub fn token_at(&self, position: usize) -> Option<SnapshotToken> {
        (position < self.log.len()).then(|| SnapshotToken(self.base + position as u64))
    }

    pub fn total_bytes(&self) -> usize {
        self.log.iter().map(|s| s.len()).sum()
    }
}
