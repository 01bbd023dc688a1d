//! # Frame Driver
//!
//! The per-frame work of the engine, run on the frame thread:
//!
//! 1. Apply every pending edit, then remesh each affected section once
//! 2. Reap columns the scheduler marked for deletion
//! 3. Mesh columns that have block data but no mesh
//! 4. Hand every finished section mesh to the renderer and draw
//!
//! Meshing and reaping only ever happen here, so the frame thread is the only
//! writer of meshes and the only thread that removes columns from the store.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, trace, warn};

use crate::engine_state::{
    rendering::{
        meshing::{mesh_column, remesh_sections},
        MeshQueue, Renderer, Viewpoint,
    },
    voxels::{
        edits::EditQueue,
        location::{block_to_section, ColumnKey, SectionKey},
        store::ChunkStore,
    },
};

/// Result of one batch of edits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditBatchReport {
    pub edits_applied: usize,
    pub edits_dropped: usize,
    /// Every section remeshed by the batch, each listed once, sorted.
    pub remeshed: Vec<SectionKey>,
}

/// Counters for one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub edits_applied: usize,
    pub edits_dropped: usize,
    pub sections_remeshed: usize,
    pub columns_reaped: usize,
    pub columns_meshed: usize,
    pub sections_submitted: usize,
    pub faces_submitted: usize,
}

pub struct FrameDriver {
    store: Arc<ChunkStore>,
    edits: EditQueue,
    mesh_queue: MeshQueue,
}

impl FrameDriver {
    pub fn new(store: Arc<ChunkStore>, edits: EditQueue, mesh_queue: MeshQueue) -> Self {
        FrameDriver {
            store,
            edits,
            mesh_queue,
        }
    }

    /// Applies the whole edit queue as one batch.
    ///
    /// Each edit marks its own section for remeshing, plus the neighbouring
    /// section across every face the edited block touches. Once all edits
    /// are written, every marked section that is resident and has block data
    /// is remeshed exactly once.
    pub fn apply_pending_edits(&self) -> EditBatchReport {
        let edits = self.edits.drain();
        let mut report = EditBatchReport::default();
        if edits.is_empty() {
            return report;
        }

        let size = self.store.section_size();
        let max_sections = self.store.max_sections();
        let mut dirty: HashSet<SectionKey> = HashSet::new();

        for edit in edits {
            let (section_key, local) = block_to_section(edit.position, size);
            let Some(slot) = section_key.slot().filter(|&slot| slot < max_sections) else {
                warn!(
                    "dropping edit at {:?}: height outside the column",
                    edit.position
                );
                report.edits_dropped += 1;
                continue;
            };
            let Some(handle) = self.store.lookup_live(section_key.column()) else {
                warn!(
                    "dropping edit at {:?}: column {} is not resident",
                    edit.position,
                    section_key.column()
                );
                report.edits_dropped += 1;
                continue;
            };

            handle.get_mut().set_block(slot, local, edit.block);
            report.edits_applied += 1;

            dirty.insert(section_key);
            for side in local.boundary_sides(size) {
                dirty.insert(section_key.neighbor(side));
            }
        }

        let mut by_column: BTreeMap<ColumnKey, BTreeSet<usize>> = BTreeMap::new();
        for key in dirty {
            if let Some(slot) = key.slot() {
                by_column.entry(key.column()).or_default().insert(slot);
            }
        }

        for (column_key, slots) in by_column {
            let Some(handle) = self.store.lookup_live(column_key) else {
                continue;
            };
            let slots: Vec<usize> = {
                let column = handle.get();
                if !column.has_block_data() {
                    continue;
                }
                slots
                    .into_iter()
                    .filter(|&slot| slot < column.section_count())
                    .collect()
            };
            if slots.is_empty() {
                continue;
            }
            remesh_sections(&self.store, &handle, &slots);
            report
                .remeshed
                .extend(slots.into_iter().map(|slot| column_key.section(slot)));
        }

        report.remeshed.sort();
        debug!(
            "applied {} edits ({} dropped), remeshed {} sections",
            report.edits_applied,
            report.edits_dropped,
            report.remeshed.len()
        );
        report
    }

    /// Removes every column marked for deletion.
    pub fn reap_deleted(&self) -> usize {
        self.store.reap_deleted()
    }

    /// Meshes every live column that has block data but no mesh, including
    /// the ones the scheduler queued. Returns how many columns were meshed.
    pub fn mesh_pending(&self) -> usize {
        let mut pending: BTreeSet<ColumnKey> = self.mesh_queue.drain().into_iter().collect();
        pending.extend(
            self.store
                .snapshot()
                .into_iter()
                .filter(|handle| !handle.is_marked_for_deletion())
                .map(|handle| handle.key()),
        );

        let mut meshed = 0;
        for key in pending {
            let Some(handle) = self.store.lookup_live(key) else {
                continue;
            };
            let needs_mesh = {
                let column = handle.get();
                column.has_block_data() && !column.has_mesh()
            };
            if needs_mesh {
                mesh_column(&self.store, &handle);
                meshed += 1;
            }
        }

        if meshed > 0 {
            trace!("meshed {} columns", meshed);
        }
        meshed
    }

    /// Submits every non-empty section mesh of every live column, then asks
    /// the renderer to draw. Returns (sections submitted, faces submitted).
    pub fn draw(&self, renderer: &mut dyn Renderer, viewpoint: &Viewpoint) -> (usize, usize) {
        let mut handles = self.store.snapshot();
        handles.sort_by_key(|handle| handle.key());

        let mut sections = 0;
        let mut faces = 0;
        for handle in handles {
            if handle.is_marked_for_deletion() {
                continue;
            }
            let column = handle.get();
            for (slot, section) in column.sections() {
                let Some(mesh) = section.mesh().filter(|mesh| !mesh.is_empty()) else {
                    continue;
                };
                renderer.process_section(handle.key().section(slot), mesh);
                sections += 1;
                faces += mesh.face_count();
            }
        }

        renderer.render(viewpoint);
        (sections, faces)
    }

    /// Runs one full frame: edits, reap, mesh, draw.
    pub fn frame(&self, renderer: &mut dyn Renderer, observer_position: Point3<f32>) -> FrameStats {
        let edits = self.apply_pending_edits();
        let columns_reaped = self.reap_deleted();
        let columns_meshed = self.mesh_pending();

        let viewpoint = Viewpoint {
            position: observer_position,
            observer_column: ColumnKey::from_world_position(observer_position, self.store.section_size()),
        };
        let (sections_submitted, faces_submitted) = self.draw(renderer, &viewpoint);

        FrameStats {
            edits_applied: edits.edits_applied,
            edits_dropped: edits.edits_dropped,
            sections_remeshed: edits.remeshed.len(),
            columns_reaped,
            columns_meshed,
            sections_submitted,
            faces_submitted,
        }
    }
}
