//! Scene document: which models to compose, where, and how to write the result.
//!
//! Documents are RON. Every field has a default, so a minimal scene is just
//! a list of model files:
//!
//! ```ron
//! (
//!     output: Some("castle.vox"),
//!     models: [
//!         (filename: "tower.vox", pos_x: 10.0, rotate_z: 90),
//!         (filename: "wall.vox", scale: 2, flip_x: true),
//!     ],
//! )
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default output file in standalone mode.
pub const DEFAULT_OUTPUT: &str = "scene.vox";

/// Default output base name in viewer mode.
pub const DEFAULT_VIEWER_OUTPUT: &str = "scene";

/// Default tile edge length for viewer export.
pub const DEFAULT_TILE_SIZE: u32 = 126;

/// Largest tile edge whose local coordinates still fit the format's one-byte
/// coordinates.
pub const MAX_TILE_SIZE: u32 = 256;

/// Top-level scene document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Output path. In viewer mode this names the tile directory and,
    /// with `.txt` appended, the manifest.
    pub output: Option<PathBuf>,
    /// Compare and merge palette slots by color only.
    pub ignore_materials: bool,
    /// Export as a grid of tiles plus manifest instead of a single file.
    pub viewer: bool,
    /// Tile edge length in viewer mode.
    pub tile_size: u32,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
    /// Models in composition order.
    pub models: Vec<ModelEntry>,
}

/// One model placement in the scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelEntry {
    /// Path to the `.vox` file, relative to the scene document.
    #[serde(alias = "name")]
    pub filename: PathBuf,
    /// Integer upscale factor applied before placement.
    pub scale: u32,
    pub pos_x: f32,
    pub pos_y: f32,
    pub pos_z: f32,
    /// Center the model on the position along X instead of offsetting by half its extent.
    pub center_x: bool,
    pub center_y: bool,
    pub center_z: bool,
    /// Mirror the model along X.
    pub flip_x: bool,
    pub flip_y: bool,
    pub flip_z: bool,
    /// Rotation about X in degrees; only 0, 90, 180 and 270 rotate.
    pub rotate_x: i32,
    pub rotate_y: i32,
    pub rotate_z: i32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            output: None,
            ignore_materials: false,
            viewer: false,
            tile_size: DEFAULT_TILE_SIZE,
            log_level: "info".to_string(),
            models: Vec::new(),
        }
    }
}

impl Default for ModelEntry {
    fn default() -> Self {
        Self {
            filename: PathBuf::new(),
            scale: 1,
            pos_x: 0.0,
            pos_y: 0.0,
            pos_z: 0.0,
            center_x: false,
            center_y: false,
            center_z: false,
            flip_x: false,
            flip_y: false,
            flip_z: false,
            rotate_x: 0,
            rotate_y: 0,
            rotate_z: 0,
        }
    }
}

impl ModelEntry {
    /// Creates an entry for a file with every transform at its default.
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }
}

// --- Load / Parse ---

impl SceneConfig {
    /// Parses and validates a scene document.
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        let scene: SceneConfig = ron::from_str(contents).map_err(ConfigError::ParseError)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Reads, parses and validates a scene document from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    /// Serializes the scene to pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)
    }

    /// Rejects values the composer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 {
            return Err(ConfigError::Invalid("tile_size must be at least 1".into()));
        }
        if self.tile_size > MAX_TILE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "tile_size {} exceeds {MAX_TILE_SIZE}",
                self.tile_size
            )));
        }
        for (i, entry) in self.models.iter().enumerate() {
            if entry.filename.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("model {i} has no filename")));
            }
            if entry.scale == 0 {
                return Err(ConfigError::Invalid(format!(
                    "model {} has scale 0",
                    entry.filename.display()
                )));
            }
        }
        Ok(())
    }

    /// The configured output path, or the mode's default.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None if self.viewer => PathBuf::from(DEFAULT_VIEWER_OUTPUT),
            None => PathBuf::from(DEFAULT_OUTPUT),
        }
    }

    /// Resolves a model path against the directory holding the scene document.
    pub fn resolve_model_path(entry: &ModelEntry, base_dir: &Path) -> PathBuf {
        if entry.filename.is_absolute() {
            entry.filename.clone()
        } else {
            base_dir.join(&entry.filename)
        }
    }
}
