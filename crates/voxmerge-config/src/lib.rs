//! Scene configuration for voxmerge.
//!
//! Scene documents are RON files listing the models to compose and the
//! output options. CLI flags parsed with clap override document values.

mod cli;
mod error;
mod scene;

pub use cli::{CliArgs, USAGE};
pub use error::ConfigError;
pub use scene::{
    DEFAULT_OUTPUT, DEFAULT_TILE_SIZE, DEFAULT_VIEWER_OUTPUT, MAX_TILE_SIZE, ModelEntry, SceneConfig,
};
