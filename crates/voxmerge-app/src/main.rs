//! The voxmerge binary: composites the models listed in a scene document
//! into one `.vox` file, or into viewer tiles plus a manifest.
//!
//! Run with: `cargo run -p voxmerge-app -- scene.ron --viewer`

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use voxmerge_config::{CliArgs, SceneConfig, USAGE};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    println!("voxmerge {}", env!("CARGO_PKG_VERSION"));

    let Some(scene_path) = args.scene.as_deref() else {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    };

    let mut scene = match SceneConfig::load(scene_path) {
        Ok(scene) => scene,
        Err(e) => {
            voxmerge_log::init_logging(args.log_level.as_deref());
            error!("Failed to load scene '{}': {e}", scene_path.display());
            return ExitCode::FAILURE;
        }
    };

    voxmerge_log::init_logging(Some(args.effective_log_level(&scene)));
    info!(
        "Loaded scene from {} ({} models)",
        scene_path.display(),
        scene.models.len()
    );
    if let Err(e) = scene.apply_cli_overrides(&args) {
        error!("Invalid command line for scene '{}': {e}", scene_path.display());
        return ExitCode::FAILURE;
    }
    info!(
        "viewer={}, ignore_materials={}, tile_size={}",
        scene.viewer, scene.ignore_materials, scene.tile_size
    );

    let base_dir = scene_path.parent().unwrap_or(Path::new("."));
    match voxmerge_scene::run_scene(&scene, base_dir) {
        Ok(summary) => {
            let [x, y, z] = summary.extent;
            info!(
                "Composed {} voxels into {x}x{y}x{z}, {} file(s) written",
                summary.voxel_count,
                summary.outputs.len()
            );
            if summary.palette_conflicts > 0 {
                info!("{} palette slot collisions kept the first material", summary.palette_conflicts);
            }
            if let Some(manifest) = summary.manifest {
                info!("Manifest: {}", manifest.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
