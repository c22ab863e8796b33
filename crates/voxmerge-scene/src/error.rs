//! Composition and export error types.

use std::path::PathBuf;

use voxmerge_format::{EncodeError, FormatError};

/// Errors that abort a composition run.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// A model referenced by the scene could not be opened.
    #[error("cannot open model {path}: {source}")]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A model file is not a valid `.vox` stream.
    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    /// The composed model (or a tile) cannot be encoded.
    #[error("cannot encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: EncodeError,
    },

    /// Writing an output file or directory failed.
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tiles must be between 1 and 256 voxels wide.
    #[error("invalid tile size {0}")]
    InvalidTileSize(u32),

    /// A voxel lies beyond the model's declared extent, so no tile holds it.
    #[error("voxel ({x}, {y}, {z}) lies outside the tile grid")]
    VoxelOutsideGrid { x: i32, y: i32, z: i32 },
}
