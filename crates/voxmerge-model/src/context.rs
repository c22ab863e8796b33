//! Composition context: the run-mode settings threaded through decode,
//! composition and tiling.

/// Coordinate ceiling for a scene written as a single `.vox` file.
pub const STANDALONE_MAX_COORD: i32 = 126;

/// Coordinate ceiling for a scene exported as viewer tiles.
pub const VIEWER_MAX_COORD: i32 = 2048;

/// How two palette materials are compared and copied during a merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MaterialMode {
    /// Color, type, weight, properties and values must all match, and all
    /// of them are copied.
    #[default]
    Full,
    /// Only the color is compared and copied.
    ColorOnly,
}

impl MaterialMode {
    /// Maps the scene-level `ignore_materials` switch to a mode.
    pub fn from_ignore_materials(ignore_materials: bool) -> Self {
        if ignore_materials {
            Self::ColorOnly
        } else {
            Self::Full
        }
    }
}

/// Settings shared by every model taking part in one composition run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositionContext {
    /// Exclusive upper bound for voxel coordinates on insertion.
    pub max_coord: i32,
    /// Palette comparison mode used when models are merged.
    pub material_mode: MaterialMode,
}

impl CompositionContext {
    /// Context for single-file export (`max_coord` = 126, full materials).
    pub const fn standalone() -> Self {
        Self {
            max_coord: STANDALONE_MAX_COORD,
            material_mode: MaterialMode::Full,
        }
    }

    /// Context for viewer-tile export (`max_coord` = 2048, full materials).
    pub const fn viewer() -> Self {
        Self {
            max_coord: VIEWER_MAX_COORD,
            material_mode: MaterialMode::Full,
        }
    }

    /// Picks the run mode from the scene's `viewer` switch.
    pub fn for_mode(viewer: bool, ignore_materials: bool) -> Self {
        let base = if viewer {
            Self::viewer()
        } else {
            Self::standalone()
        };
        base.with_material_mode(MaterialMode::from_ignore_materials(ignore_materials))
    }

    /// Returns a copy with a different material mode.
    pub fn with_material_mode(mut self, material_mode: MaterialMode) -> Self {
        self.material_mode = material_mode;
        self
    }
}

impl Default for CompositionContext {
    fn default() -> Self {
        Self::standalone()
    }
}
