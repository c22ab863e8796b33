//! Scene composition for voxmerge.
//!
//! [`compose`] places source models into a parent under flips, quarter-turn
//! rotations and translations. [`split_into_tiles`] partitions a scene that
//! exceeds the single-file coordinate range, and [`run_scene`] drives a full
//! scene document from input files to output files.

pub mod compose;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod rotation;
pub mod tiler;

pub use compose::{ComposeReport, Placement, compose};
pub use error::SceneError;
pub use manifest::{IMPORT_DIRECTIVE, MANIFEST_HEADER, Manifest, ManifestEntry, manifest_path};
pub use pipeline::{SceneSummary, compose_scene, load_model, run_scene, save_model};
pub use rotation::{exact_cos, exact_sin, rotation_matrix};
pub use tiler::{Tile, TileGrid, split_into_tiles, write_tiles};
