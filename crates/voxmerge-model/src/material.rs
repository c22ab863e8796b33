//! Palette slot contents: a color plus optional rendering material.

use crate::context::MaterialMode;

/// Default slot color: opaque black.
pub const DEFAULT_COLOR: u32 = 0xFF00_0000;

/// One palette slot.
///
/// `kind` is the material type stored in a `MATT` chunk; zero means the slot
/// is a plain color and no `MATT` chunk is written for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Packed 32-bit color.
    pub color: u32,
    /// Set whenever a voxel references this slot.
    pub used: bool,
    /// Material type (0 = none).
    pub kind: i32,
    /// Material weight.
    pub weight: f32,
    /// Property bitmask; together with `kind` it determines `values`.
    pub properties: i32,
    /// Auxiliary material values, in file order.
    pub values: Vec<f32>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            used: false,
            kind: 0,
            weight: 1.0,
            properties: 0,
            values: Vec::new(),
        }
    }
}

impl Material {
    /// Returns `true` if the slot carries a `MATT` material.
    pub fn has_material(&self) -> bool {
        self.kind != 0
    }

    /// Compares two materials under the given mode. The `used` flag never
    /// takes part in the comparison.
    ///
    /// Floats compare by bit pattern, so `NaN == NaN` and `0.0 != -0.0`.
    pub fn matches(&self, other: &Material, mode: MaterialMode) -> bool {
        if self.color != other.color {
            return false;
        }
        if mode == MaterialMode::ColorOnly {
            return true;
        }
        self.kind == other.kind
            && self.weight.to_bits() == other.weight.to_bits()
            && self.properties == other.properties
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }

    /// Copies `other` into `self` under the given mode. The `used` flag is
    /// left untouched.
    pub fn copy_from(&mut self, other: &Material, mode: MaterialMode) {
        self.color = other.color;
        if mode == MaterialMode::Full {
            self.kind = other.kind;
            self.weight = other.weight;
            self.properties = other.properties;
            self.values.clone_from(&other.values);
        }
    }
}
