//! End-to-end scene run: load every model, compose, then write a single
//! `.vox` or a tile directory with manifest.

use std::path::{Path, PathBuf};

use tracing::info;
use voxmerge_config::SceneConfig;
use voxmerge_model::{CompositionContext, VoxelModel};

use crate::compose::{Placement, compose};
use crate::error::SceneError;
use crate::manifest::manifest_path;
use crate::tiler::{split_into_tiles, write_tiles};

/// What a scene run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSummary {
    /// Voxels in the composed scene.
    pub voxel_count: usize,
    /// Extent of the composed scene after clipping.
    pub extent: [i32; 3],
    /// Files written: the single model, or every tile.
    pub outputs: Vec<PathBuf>,
    /// Manifest path in viewer mode.
    pub manifest: Option<PathBuf>,
    /// Palette slot collisions across all merges.
    pub palette_conflicts: usize,
}

/// Reads and decodes a `.vox` file.
pub fn load_model(path: &Path, context: CompositionContext) -> Result<VoxelModel, SceneError> {
    let bytes = std::fs::read(path).map_err(|source| SceneError::MissingInput {
        path: path.to_path_buf(),
        source,
    })?;
    voxmerge_format::decode(&bytes, context).map_err(|source| SceneError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Encodes a model and writes it to `path`.
pub fn save_model(model: &VoxelModel, path: &Path) -> Result<(), SceneError> {
    let bytes = voxmerge_format::encode(model).map_err(|source| SceneError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, bytes).map_err(|source| SceneError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Composes every model of the scene, in order, into one clipped model.
///
/// Relative model paths resolve against `base_dir`. Returns the model and
/// the number of palette collisions.
pub fn compose_scene(scene: &SceneConfig, base_dir: &Path) -> Result<(VoxelModel, usize), SceneError> {
    let context = CompositionContext::for_mode(scene.viewer, scene.ignore_materials);
    let mut parent = VoxelModel::new(1, 1, 1, context);
    let mut conflicts = 0;

    for entry in &scene.models {
        let path = SceneConfig::resolve_model_path(entry, base_dir);
        info!("Adding '{}'", path.display());
        let mut model = load_model(&path, context)?;
        model.scale(entry.scale);
        let report = compose(&mut parent, &model, &Placement::from(entry));
        conflicts += report.merge.conflicts.len();
    }

    parent.clip_to_voxels();
    Ok((parent, conflicts))
}

/// Runs a full scene: compose, then write the output the scene asks for.
pub fn run_scene(scene: &SceneConfig, base_dir: &Path) -> Result<SceneSummary, SceneError> {
    let (model, palette_conflicts) = compose_scene(scene, base_dir)?;
    let output = scene.output_path();

    let (outputs, manifest) = if scene.viewer {
        let grid = split_into_tiles(&model, scene.tile_size)?;
        let base_name = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| voxmerge_config::DEFAULT_VIEWER_OUTPUT.to_string());
        let manifest = write_tiles(&grid, &output, &base_name)?;
        let manifest_file = manifest_path(&output);
        manifest.write(&manifest_file)?;
        info!("Wrote manifest to '{}'", manifest_file.display());
        let outputs = manifest.entries.into_iter().map(|e| e.path).collect();
        (outputs, Some(manifest_file))
    } else {
        info!("Writing result to '{}'", output.display());
        save_model(&model, &output)?;
        (vec![output], None)
    };

    Ok(SceneSummary {
        voxel_count: model.voxel_count(),
        extent: model.extent(),
        outputs,
        manifest,
        palette_conflicts,
    })
}
