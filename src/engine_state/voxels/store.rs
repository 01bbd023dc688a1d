//! # Chunk Store Module
//!
//! The `ChunkStore` is the single source of truth for which columns exist.
//! It is shared by the background streaming thread (insert, mark) and the
//! frame thread (lookup, edit, reap).
//!
//! ## Concurrency
//!
//! - The key-to-column map sits behind one `RwLock`, held only for the
//!   duration of a point lookup, an insert, a snapshot or a reap
//! - Each column sits behind its own `RwLock`, so generating one column never
//!   blocks reading another
//! - A column is fully constructed before it is inserted, so no other thread
//!   can ever see a partially built entry
//! - Raw map iterators never leave the store: callers get a `Vec` snapshot of
//!   cloned handles
//!
//! ## Two-phase deletion
//!
//! The scheduler only *marks* columns. The marker is an atomic flag shared by
//! every clone of a column's handle, so holders see it immediately. Columns
//! are removed only when the frame driver calls [`ChunkStore::reap_deleted`],
//! at a point in the frame where it holds no column handles of its own.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cgmath::Point3;
use log::debug;

use super::block::Block;
use super::column::Column;
use super::location::{block_to_section, ColumnKey};
use crate::core::MtResource;

/// A shared handle to one resident column and its deletion marker.
#[derive(Clone)]
pub struct ColumnHandle {
    key: ColumnKey,
    column: MtResource<Column>,
    marked_for_deletion: Arc<AtomicBool>,
}

impl ColumnHandle {
    fn new(column: Column) -> Self {
        ColumnHandle {
            key: column.key(),
            column: MtResource::new(column),
            marked_for_deletion: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn key(&self) -> ColumnKey {
        self.key
    }

    pub fn get(&self) -> std::sync::RwLockReadGuard<'_, Column> {
        self.column.get()
    }

    pub fn get_mut(&self) -> std::sync::RwLockWriteGuard<'_, Column> {
        self.column.get_mut()
    }

    pub fn is_marked_for_deletion(&self) -> bool {
        self.marked_for_deletion.load(Ordering::Acquire)
    }

    /// Sets the deletion marker. Returns `true` if it was not already set.
    pub fn mark_for_deletion(&self) -> bool {
        !self.marked_for_deletion.swap(true, Ordering::AcqRel)
    }

    /// Whether two handles refer to the same resident column.
    pub fn same_column(&self, other: &ColumnHandle) -> bool {
        self.column.ptr_eq(&other.column)
    }
}

/// Concurrent registry of resident columns, keyed by column key.
pub struct ChunkStore {
    columns: MtResource<HashMap<ColumnKey, ColumnHandle>>,
    section_size: usize,
    max_sections: usize,
}

impl ChunkStore {
    /// Creates an empty store whose columns use the given dimensions.
    pub fn new(section_size: usize, max_sections: usize) -> Self {
        ChunkStore {
            columns: MtResource::new(HashMap::new()),
            section_size,
            max_sections,
        }
    }

    pub fn section_size(&self) -> usize {
        self.section_size
    }

    pub fn max_sections(&self) -> usize {
        self.max_sections
    }

    /// Looks up a resident column, including one marked for deletion.
    pub fn lookup(&self, key: ColumnKey) -> Option<ColumnHandle> {
        self.columns.get().get(&key).cloned()
    }

    /// Looks up a resident column that is not marked for deletion.
    pub fn lookup_live(&self, key: ColumnKey) -> Option<ColumnHandle> {
        self.lookup(key)
            .filter(|handle| !handle.is_marked_for_deletion())
    }

    /// Registers an empty column under `key` unless one is already resident.
    ///
    /// Idempotent: re-inserting an existing key returns the existing handle
    /// untouched. The second element is `true` when a new column was created.
    pub fn insert_if_absent(&self, key: ColumnKey) -> (ColumnHandle, bool) {
        if let Some(existing) = self.lookup(key) {
            return (existing, false);
        }

        let candidate = ColumnHandle::new(Column::new(key, self.section_size, self.max_sections));
        let mut columns = self.columns.get_mut();
        // Another thread may have won the race between the lookup and the write lock.
        if let Some(existing) = columns.get(&key) {
            return (existing.clone(), false);
        }
        columns.insert(key, candidate.clone());
        (candidate, true)
    }

    /// Marks a resident column for deletion. Returns `false` if the key is not
    /// resident or was already marked.
    pub fn mark_for_deletion(&self, key: ColumnKey) -> bool {
        self.lookup(key)
            .map(|handle| handle.mark_for_deletion())
            .unwrap_or(false)
    }

    /// Removes every marked column and returns how many were removed.
    ///
    /// The removed handles are dropped here; a column's memory is released once
    /// the last outstanding handle to it goes away.
    pub fn reap_deleted(&self) -> usize {
        let reaped: Vec<ColumnHandle> = {
            let mut columns = self.columns.get_mut();
            let marked: Vec<ColumnKey> = columns
                .values()
                .filter(|handle| handle.is_marked_for_deletion())
                .map(ColumnHandle::key)
                .collect();
            marked
                .into_iter()
                .filter_map(|key| columns.remove(&key))
                .collect()
        };

        if !reaped.is_empty() {
            debug!("reaped {} columns", reaped.len());
        }
        reaped.len()
    }

    /// Cloned handles to every resident column, in no particular order.
    pub fn snapshot(&self) -> Vec<ColumnHandle> {
        self.columns.get().values().cloned().collect()
    }

    pub fn keys(&self) -> Vec<ColumnKey> {
        self.columns.get().keys().copied().collect()
    }

    pub fn contains(&self, key: ColumnKey) -> bool {
        self.columns.get().contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.columns.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.get().is_empty()
    }

    /// Block at a world block coordinate. Anything not resident reads as air.
    pub fn get_block(&self, position: Point3<i32>) -> Block {
        let (section, local) = block_to_section(position, self.section_size);
        let Some(slot) = section.slot() else {
            return Block::AIR;
        };
        let Some(handle) = self.lookup(section.column()) else {
            return Block::AIR;
        };
        let column = handle.get();
        column
            .get_section(slot)
            .map(|s| s.get_block(local))
            .unwrap_or(Block::AIR)
    }

    pub fn is_solid_block_at(&self, position: Point3<i32>) -> bool {
        self.get_block(position).is_solid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::location::LocalBlockPos;
    use std::thread;

    #[test]
    fn insert_if_absent_is_idempotent() {
        let store = ChunkStore::new(16, 4);
        let key = ColumnKey::new(1, 2);

        let (first, created) = store.insert_if_absent(key);
        assert!(created);
        first.get_mut().ensure_section(0);

        let (second, created_again) = store.insert_if_absent(key);
        assert!(!created_again);
        assert!(first.same_column(&second));
        assert_eq!(second.get().section_count(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn deletion_is_two_phase() {
        let store = ChunkStore::new(16, 4);
        let (handle, _) = store.insert_if_absent(ColumnKey::new(0, 0));
        store.insert_if_absent(ColumnKey::new(5, 5));

        assert!(store.mark_for_deletion(ColumnKey::new(0, 0)));
        assert!(!store.mark_for_deletion(ColumnKey::new(0, 0)));
        assert!(!store.mark_for_deletion(ColumnKey::new(9, 9)));

        // Still resident until reaped, and visible through existing handles.
        assert!(store.contains(ColumnKey::new(0, 0)));
        assert!(handle.is_marked_for_deletion());
        assert!(store.lookup_live(ColumnKey::new(0, 0)).is_none());

        assert_eq!(store.reap_deleted(), 1);
        assert!(!store.contains(ColumnKey::new(0, 0)));
        assert!(store.contains(ColumnKey::new(5, 5)));
        assert_eq!(store.reap_deleted(), 0);

        // The handle outlives the reap without dangling.
        assert_eq!(handle.get().key(), ColumnKey::new(0, 0));
    }

    #[test]
    fn lookups_miss_as_air() {
        let store = ChunkStore::new(16, 4);
        assert_eq!(store.get_block(Point3::new(3, 3, 3)), Block::AIR);

        let (handle, _) = store.insert_if_absent(ColumnKey::new(-1, 0));
        handle
            .get_mut()
            .set_block(0, LocalBlockPos::new(15, 2, 4), Block::new(BlockType::STONE));

        assert!(store.is_solid_block_at(Point3::new(-1, 2, 4)));
        assert_eq!(store.get_block(Point3::new(-1, 20, 4)), Block::AIR);
        assert_eq!(store.get_block(Point3::new(-1, -2, 4)), Block::AIR);
    }

    #[test]
    fn concurrent_inserts_never_duplicate_a_key() {
        let store = Arc::new(ChunkStore::new(8, 2));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    (0..50)
                        .filter(|i| store.insert_if_absent(ColumnKey::new(i % 10, 0)).1)
                        .count()
                })
            })
            .collect();

        let created: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();

        assert_eq!(created, 10);
        assert_eq!(store.len(), 10);
    }
}
