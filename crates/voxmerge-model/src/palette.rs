//! Fixed 256-slot color and material palette.
//!
//! Slots are addressed directly by the palette index stored in each voxel.
//! All 256 slots always exist; slot 0 is unused by convention but has no
//! special meaning in storage.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::warn;

use crate::context::MaterialMode;
use crate::material::Material;

/// Number of palette slots.
pub const PALETTE_SIZE: usize = 256;

/// Palette handle shared by a model and, after tiling, by all of its tiles.
pub type SharedPalette = Rc<RefCell<Palette>>;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Dense table of 256 [`Material`] slots, where `index == slot`.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    slots: Box<[Material; PALETTE_SIZE]>,
}

/// Outcome of [`Palette::merge`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Source slots copied into the destination.
    pub merged: usize,
    /// Slots used on both sides with unequal materials. The destination
    /// keeps its material for these.
    pub conflicts: Vec<u8>,
}

impl MergeReport {
    /// Returns `true` if no slot collided.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

impl Palette {
    /// Creates a palette with every slot at its default.
    pub fn new() -> Self {
        Self {
            slots: Box::new(std::array::from_fn(|_| Material::default())),
        }
    }

    /// Wraps the palette in a shared handle.
    pub fn into_shared(self) -> SharedPalette {
        Rc::new(RefCell::new(self))
    }

    /// Returns the color of a slot.
    pub fn color(&self, index: u8) -> u32 {
        self.slots[index as usize].color
    }

    /// Sets the color of a slot.
    pub fn set_color(&mut self, index: u8, color: u32) {
        self.slots[index as usize].color = color;
    }

    /// Returns a slot.
    pub fn material(&self, index: u8) -> &Material {
        &self.slots[index as usize]
    }

    /// Returns a mutable handle to a slot.
    pub fn material_mut(&mut self, index: u8) -> &mut Material {
        &mut self.slots[index as usize]
    }

    /// Marks a slot as referenced by at least one voxel.
    pub fn set_used(&mut self, index: u8) {
        self.slots[index as usize].used = true;
    }

    /// Returns `true` if a voxel has referenced the slot.
    pub fn is_used(&self, index: u8) -> bool {
        self.slots[index as usize].used
    }

    /// Iterates over the indices of used slots in ascending order.
    pub fn used_indices(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(|&i| self.is_used(i))
    }

    /// Iterates over `(index, material)` for every slot.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Material)> {
        (0..=u8::MAX).zip(self.slots.iter())
    }

    /// Merges every used slot of `source` into this palette.
    ///
    /// A destination slot that is unused, or equal under `mode`, receives a
    /// copy of the source material and is marked used. A destination slot
    /// that is already used with a different material keeps its contents
    /// (first write wins); the index is reported in
    /// [`MergeReport::conflicts`].
    pub fn merge(&mut self, source: &Palette, mode: MaterialMode) -> MergeReport {
        let mut report = MergeReport::default();
        for index in source.used_indices() {
            let incoming = source.material(index);
            let slot = self.material_mut(index);
            if !slot.used || slot.matches(incoming, mode) {
                slot.copy_from(incoming, mode);
                slot.used = true;
                report.merged += 1;
            } else {
                warn!(
                    index,
                    existing = slot.color,
                    incoming = incoming.color,
                    "palette slot collision, keeping existing material"
                );
                report.conflicts.push(index);
            }
        }
        report
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
