//! Voxel models, palettes and materials for scene composition.

pub mod context;
pub mod material;
pub mod model;
pub mod palette;

pub use context::{CompositionContext, MaterialMode, STANDALONE_MAX_COORD, VIEWER_MAX_COORD};
pub use material::{DEFAULT_COLOR, Material};
pub use model::{Voxel, VoxelModel};
pub use palette::{MergeReport, PALETTE_SIZE, Palette, SharedPalette};
