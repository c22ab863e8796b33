//! Places a source model into a parent model under a rigid transform.
//!
//! Per voxel, in order: mirror along flipped axes, recenter on the source's
//! half extent, rotate, translate by the anchor and position, then truncate
//! toward zero. Placement keeps coordinates in `0..=max_coord` (inclusive),
//! one wider than [`VoxelModel::add_voxel`] accepts, so a voxel landing
//! exactly on `max_coord` passes this check and is then dropped on insert.

use glam::{BVec3, IVec3, Vec3};
use tracing::debug;
use voxmerge_config::ModelEntry;
use voxmerge_model::{MergeReport, VoxelModel};

use crate::rotation::rotation_matrix;

/// Where and how a source model is placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Translation added after rotation.
    pub position: Vec3,
    /// Per axis: anchor at 1 instead of the source's half extent.
    pub center: BVec3,
    /// Per axis: mirror the source before rotating.
    pub flip: BVec3,
    /// Per-axis rotation in degrees (0, 90, 180, 270).
    pub rotation: IVec3,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            center: BVec3::FALSE,
            flip: BVec3::FALSE,
            rotation: IVec3::ZERO,
        }
    }
}

impl Placement {
    /// A plain translation.
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, x: i32, y: i32, z: i32) -> Self {
        self.rotation = IVec3::new(x, y, z);
        self
    }

    pub fn with_flip(mut self, x: bool, y: bool, z: bool) -> Self {
        self.flip = BVec3::new(x, y, z);
        self
    }

    pub fn with_center(mut self, x: bool, y: bool, z: bool) -> Self {
        self.center = BVec3::new(x, y, z);
        self
    }
}

impl From<&ModelEntry> for Placement {
    fn from(entry: &ModelEntry) -> Self {
        Self {
            position: Vec3::new(entry.pos_x, entry.pos_y, entry.pos_z),
            center: BVec3::new(entry.center_x, entry.center_y, entry.center_z),
            flip: BVec3::new(entry.flip_x, entry.flip_y, entry.flip_z),
            rotation: IVec3::new(entry.rotate_x, entry.rotate_y, entry.rotate_z),
        }
    }
}

/// Result of one [`compose`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComposeReport {
    /// Palette merge outcome.
    pub merge: MergeReport,
    /// Voxels that passed the placement bounds check.
    pub placed: usize,
    /// Voxels that landed outside `0..=max_coord`.
    pub dropped: usize,
}

/// Merges `source`'s palette into `parent` and appends its transformed voxels.
///
/// Palette indices are carried over unchanged. The merge uses the parent's
/// material mode and the bounds check uses the parent's coordinate ceiling.
pub fn compose(parent: &mut VoxelModel, source: &VoxelModel, placement: &Placement) -> ComposeReport {
    let merge = if parent.shares_palette_with(source) {
        MergeReport::default()
    } else {
        let mode = parent.context().material_mode;
        parent.palette_mut().merge(&source.palette_ref(), mode)
    };

    let rotation = rotation_matrix(placement.rotation);
    let [sx, sy, sz] = source.extent();
    let half = Vec3::new(sx as f32, sy as f32, sz as f32) / 2.0;
    let anchor = Vec3::select(placement.center, Vec3::ONE, half);
    let max = parent.max_coord();

    let mut report = ComposeReport {
        merge,
        ..ComposeReport::default()
    };
    let mirror = |flip: bool, size: i32, c: i32| {
        if flip {
            size.saturating_sub(c).saturating_sub(1)
        } else {
            c
        }
    };
    for voxel in source.voxels() {
        let flipped = IVec3::new(
            mirror(placement.flip.x, sx, voxel.x),
            mirror(placement.flip.y, sy, voxel.y),
            mirror(placement.flip.z, sz, voxel.z),
        );
        let local = flipped.as_vec3() - half;
        let target = (rotation * local + anchor + placement.position).as_ivec3();

        let in_bounds = |c: i32| (0..=max).contains(&c);
        if in_bounds(target.x) && in_bounds(target.y) && in_bounds(target.z) {
            parent.add_voxel(target.x, target.y, target.z, voxel.index);
            report.placed += 1;
        } else {
            report.dropped += 1;
        }
    }

    debug!(
        placed = report.placed,
        dropped = report.dropped,
        palette_conflicts = report.merge.conflicts.len(),
        "composed model"
    );
    report
}
