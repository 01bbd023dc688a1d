use std::collections::HashSet;
use std::mem;

use crate::core::MtResource;
use crate::engine_state::voxels::location::ColumnKey;

/// Columns the streaming scheduler wants meshed on the frame thread.
///
/// Deduplicated, so a column that stays unmeshed for several scheduler passes
/// is still meshed once.
#[derive(Clone, Default)]
pub struct MeshQueue {
    pending: MtResource<HashSet<ColumnKey>>,
}

impl MeshQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the column was not already queued.
    pub fn request(&self, key: ColumnKey) -> bool {
        self.pending.get_mut().insert(key)
    }

    /// Takes every queued column, sorted by key.
    pub fn drain(&self) -> Vec<ColumnKey> {
        let mut keys: Vec<ColumnKey> = mem::take(&mut *self.pending.get_mut()).into_iter().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.pending.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.get().is_empty()
    }
}
