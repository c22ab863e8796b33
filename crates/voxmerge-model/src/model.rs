//! In-memory voxel model: a declared extent, an ordered voxel list and a
//! shared palette.

use std::cell::{Ref, RefMut};
use std::rc::Rc;

use crate::context::CompositionContext;
use crate::material::Material;
use crate::palette::{Palette, SharedPalette};

/// A single voxel: integer position plus palette index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Voxel {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// Palette slot.
    pub index: u8,
}

impl Voxel {
    pub const fn new(x: i32, y: i32, z: i32, index: u8) -> Self {
        Self { x, y, z, index }
    }
}

/// A voxel model as read from or written to a `.vox` file.
///
/// The extent is declared, not derived: it may be larger than the voxels
/// need. Voxels keep insertion order and duplicates are kept.
#[derive(Debug)]
pub struct VoxelModel {
    size_x: i32,
    size_y: i32,
    size_z: i32,
    context: CompositionContext,
    palette: SharedPalette,
    voxels: Vec<Voxel>,
}

impl VoxelModel {
    /// Creates an empty model with its own default palette.
    pub fn new(size_x: i32, size_y: i32, size_z: i32, context: CompositionContext) -> Self {
        Self::with_palette(size_x, size_y, size_z, context, Palette::new().into_shared())
    }

    /// Creates an empty model that shares an existing palette.
    pub fn with_palette(
        size_x: i32,
        size_y: i32,
        size_z: i32,
        context: CompositionContext,
        palette: SharedPalette,
    ) -> Self {
        Self {
            size_x,
            size_y,
            size_z,
            context,
            palette,
            voxels: Vec::new(),
        }
    }

    pub fn size_x(&self) -> i32 {
        self.size_x
    }

    pub fn size_y(&self) -> i32 {
        self.size_y
    }

    pub fn size_z(&self) -> i32 {
        self.size_z
    }

    /// Returns `[size_x, size_y, size_z]`.
    pub fn extent(&self) -> [i32; 3] {
        [self.size_x, self.size_y, self.size_z]
    }

    /// Context the model was created under.
    pub fn context(&self) -> CompositionContext {
        self.context
    }

    /// Exclusive coordinate ceiling applied by [`add_voxel`](Self::add_voxel).
    pub fn max_coord(&self) -> i32 {
        self.context.max_coord
    }

    /// Voxels in insertion order.
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    pub fn voxel_count(&self) -> usize {
        self.voxels.len()
    }

    /// The shared palette handle.
    pub fn palette(&self) -> &SharedPalette {
        &self.palette
    }

    /// Borrows the palette for reading.
    pub fn palette_ref(&self) -> Ref<'_, Palette> {
        self.palette.borrow()
    }

    /// Borrows the palette for writing.
    pub fn palette_mut(&self) -> RefMut<'_, Palette> {
        self.palette.borrow_mut()
    }

    /// Returns `true` if both models hold the same palette handle.
    pub fn shares_palette_with(&self, other: &VoxelModel) -> bool {
        Rc::ptr_eq(&self.palette, &other.palette)
    }

    /// Sets the color of a palette slot.
    pub fn set_color(&self, index: u8, color: u32) {
        self.palette.borrow_mut().set_color(index, color);
    }

    /// Returns a copy of a palette slot.
    pub fn material(&self, index: u8) -> Material {
        self.palette.borrow().material(index).clone()
    }

    /// Appends a voxel if every coordinate lies in `[0, max_coord)`.
    ///
    /// The palette slot is marked used whether or not the voxel is kept.
    pub fn add_voxel(&mut self, x: i32, y: i32, z: i32, index: u8) {
        let max = self.context.max_coord;
        if (0..max).contains(&x) && (0..max).contains(&y) && (0..max).contains(&z) {
            self.voxels.push(Voxel::new(x, y, z, index));
        }
        self.palette.borrow_mut().set_used(index);
    }

    /// Upscales the model by an integer factor: each voxel becomes an
    /// `f×f×f` block and each extent becomes `min(size * f, max_coord)`.
    ///
    /// A factor of 0 or 1 leaves the model untouched.
    pub fn scale(&mut self, factor: u32) {
        if factor <= 1 {
            return;
        }
        let f = i32::try_from(factor).unwrap_or(i32::MAX);
        let old = std::mem::take(&mut self.voxels);
        for voxel in old {
            let (bx, by, bz) = (
                voxel.x.saturating_mul(f),
                voxel.y.saturating_mul(f),
                voxel.z.saturating_mul(f),
            );
            for dx in 0..f {
                for dy in 0..f {
                    for dz in 0..f {
                        self.add_voxel(
                            bx.saturating_add(dx),
                            by.saturating_add(dy),
                            bz.saturating_add(dz),
                            voxel.index,
                        );
                    }
                }
            }
        }
        let max = self.context.max_coord;
        self.size_x = self.size_x.saturating_mul(f).min(max);
        self.size_y = self.size_y.saturating_mul(f).min(max);
        self.size_z = self.size_z.saturating_mul(f).min(max);
    }

    /// Grows the extent so that every voxel lies inside it. Never shrinks.
    pub fn clip_to_voxels(&mut self) {
        for voxel in &self.voxels {
            self.size_x = self.size_x.max(voxel.x + 1);
            self.size_y = self.size_y.max(voxel.y + 1);
            self.size_z = self.size_z.max(voxel.z + 1);
        }
    }
}
