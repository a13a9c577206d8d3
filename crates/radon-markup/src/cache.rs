//! Append-only arena of markup nodes addressed by `CacheRef` handles.
//!
//! Invariants:
//! - Ids are minted in insertion order starting at `origin` and never reused.
//! - Nodes are immutable once inserted. Edits insert new nodes and repoint
//!   the parent; nothing is updated or removed in place.

use radon_core::error::{Error, Result};
use radon_core::id::CacheRef;

#[derive(Debug, Clone)]
pub struct Cache<T> {
    origin: u32,
    nodes: Vec<T>,
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Cache<T> {
    pub fn new() -> Self {
        Self::with_origin(1)
    }

    pub fn with_origin(origin: u32) -> Self {
        Self {
            origin,
            nodes: Vec::new(),
        }
    }

    /// Store `value` under a fresh id. Fails once the id space above
    /// `origin` is used up.
    pub fn insert(&mut self, value: T) -> Result<CacheRef> {
        let handle = self.next_handle().ok_or_else(|| self.exhausted(1))?;
        self.nodes.push(value);
        #[cfg(feature = "tracing")]
        tracing::trace!(id = handle.id, "cache insert");
        Ok(handle)
    }

    /// Check that `count` more inserts fit in the id space.
    pub fn ensure_room(&self, count: usize) -> Result<()> {
        if count <= self.remaining() {
            Ok(())
        } else {
            Err(self.exhausted(count))
        }
    }

    /// Ids still available before `u32::MAX` is passed.
    pub fn remaining(&self) -> usize {
        let span = u64::from(u32::MAX) - u64::from(self.origin) + 1;
        usize::try_from(span)
            .unwrap_or(usize::MAX)
            .saturating_sub(self.nodes.len())
    }

    fn exhausted(&self, count: usize) -> Error {
        Error::OutOfRange(format!(
            "arena starting at id {} has room for {} more node(s), {count} needed",
            self.origin,
            self.remaining()
        ))
    }

    pub fn resolve(&self, handle: CacheRef) -> Result<&T> {
        handle
            .id
            .checked_sub(self.origin)
            .and_then(|idx| self.nodes.get(idx as usize))
            .ok_or(Error::DanglingHandle(handle))
    }

    pub fn contains(&self, handle: CacheRef) -> bool {
        self.resolve(handle).is_ok()
    }

    pub fn origin(&self) -> u32 {
        self.origin
    }

    /// Handle the next insert will return, if the id space is not exhausted.
    pub fn next_handle(&self) -> Option<CacheRef> {
        u32::try_from(self.nodes.len())
            .ok()
            .and_then(|len| self.origin.checked_add(len))
            .map(CacheRef::new)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every (handle, node) pair in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (CacheRef, &T)> + '_ {
        // every stored index fits: insert refuses ids past u32::MAX
        let origin = self.origin;
        self.nodes
            .iter()
            .enumerate()
            .map(move |(i, n)| (CacheRef::new(origin.wrapping_add(i as u32)), n))
    }
}
