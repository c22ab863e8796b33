//! Tile manifest consumed by the viewer import script.
//!
//! ```text
//! // Generated by voxmerge
//! mv_import 2048
//! 0	0	0	/abs/path/scene/scene_0_0_0.vox
//! 0	0	126	/abs/path/scene/scene_0_0_1.vox
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use glam::IVec3;

use crate::error::SceneError;

/// First manifest line.
pub const MANIFEST_HEADER: &str = "// Generated by voxmerge";

/// Second manifest line: the viewer's import directive.
pub const IMPORT_DIRECTIVE: &str = "mv_import 2048";

/// One tile: its voxel-space origin and absolute file path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    pub origin: IVec3,
    pub path: PathBuf,
}

/// Ordered list of tiles, in grid-scan order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn push(&mut self, origin: IVec3, path: PathBuf) {
        self.entries.push(ManifestEntry { origin, path });
    }

    /// Writes the manifest text to `path`.
    pub fn write(&self, path: &Path) -> Result<(), SceneError> {
        std::fs::write(path, self.to_string()).map_err(|source| SceneError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{MANIFEST_HEADER}")?;
        writeln!(f, "{IMPORT_DIRECTIVE}")?;
        for entry in &self.entries {
            writeln!(
                f,
                "{}\t{}\t{}\t{}",
                entry.origin.x,
                entry.origin.y,
                entry.origin.z,
                entry.path.display()
            )?;
        }
        Ok(())
    }
}

/// Manifest location for a tile directory: the directory path plus `.txt`.
pub fn manifest_path(tile_dir: &Path) -> PathBuf {
    let mut name = tile_dir.as_os_str().to_owned();
    name.push(".txt");
    PathBuf::from(name)
}
