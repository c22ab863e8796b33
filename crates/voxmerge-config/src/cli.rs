//! Command-line argument parsing for the voxmerge binary.

use std::path::PathBuf;

use clap::Parser;

use crate::{ConfigError, SceneConfig};

/// voxmerge command-line arguments.
///
/// Flags override settings loaded from the scene document.
#[derive(Parser, Debug)]
#[command(name = "voxmerge", about = "Composite .vox models into a single scene")]
pub struct CliArgs {
    /// Path to the scene document (RON).
    pub scene: Option<PathBuf>,

    /// Output path (file, or tile directory in viewer mode).
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Export viewer tiles plus manifest instead of a single file.
    #[arg(long)]
    pub viewer: bool,

    /// Merge palettes by color only.
    #[arg(long)]
    pub ignore_materials: bool,

    /// Tile edge length in viewer mode.
    #[arg(long)]
    pub tile_size: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,
}

/// One-line usage text printed when no scene is given.
pub const USAGE: &str = "Usage: voxmerge <scene.ron> [--output PATH] [--viewer] [--ignore-materials]";

impl CliArgs {
    /// Log level to start with: the `--log-level` flag, else the scene's.
    ///
    /// Logging has to be up before overrides are applied so that their
    /// messages are not lost.
    pub fn effective_log_level<'a>(&'a self, scene: &'a SceneConfig) -> &'a str {
        self.log_level.as_deref().unwrap_or(scene.log_level.as_str())
    }
}

impl SceneConfig {
    /// Apply CLI overrides to a loaded scene, then re-validate it.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) -> Result<(), ConfigError> {
        if let Some(ref output) = args.output {
            log::debug!("Output overridden to {}", output.display());
            self.output = Some(output.clone());
        }
        if args.viewer {
            log::debug!("Viewer export enabled from command line");
            self.viewer = true;
        }
        if args.ignore_materials {
            log::debug!("Ignoring materials from command line");
            self.ignore_materials = true;
        }
        if let Some(tile_size) = args.tile_size {
            log::debug!("Tile size overridden to {tile_size}");
            self.tile_size = tile_size;
        }
        if let Some(ref level) = args.log_level {
            self.log_level = level.clone();
        }
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_flags() -> CliArgs {
        CliArgs {
            scene: None,
            output: None,
            viewer: false,
            ignore_materials: false,
            tile_size: None,
            log_level: None,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut scene = SceneConfig::default();
        let args = CliArgs {
            output: Some(PathBuf::from("big")),
            viewer: true,
            tile_size: Some(64),
            ..no_flags()
        };
        scene.apply_cli_overrides(&args).unwrap();
        assert_eq!(scene.output_path(), PathBuf::from("big"));
        assert!(scene.viewer);
        assert_eq!(scene.tile_size, 64);
        // Non-overridden fields retain defaults
        assert!(!scene.ignore_materials);
        assert_eq!(scene.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let mut scene = SceneConfig {
            viewer: true,
            ..SceneConfig::default()
        };
        let original = scene.clone();
        scene.apply_cli_overrides(&no_flags()).unwrap();
        assert_eq!(scene, original);
    }

    #[test]
    fn test_cli_override_is_validated() {
        let mut scene = SceneConfig::default();
        let args = CliArgs {
            viewer: true,
            tile_size: Some(300),
            ..no_flags()
        };
        assert!(matches!(
            scene.apply_cli_overrides(&args),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_effective_log_level() {
        let scene = SceneConfig {
            log_level: "warn".to_string(),
            ..SceneConfig::default()
        };
        assert_eq!(no_flags().effective_log_level(&scene), "warn");

        let args = CliArgs {
            log_level: Some("trace".to_string()),
            ..no_flags()
        };
        assert_eq!(args.effective_log_level(&scene), "trace");
    }

    #[test]
    fn test_parse_arguments() {
        let args = CliArgs::try_parse_from([
            "voxmerge",
            "scene.ron",
            "--ignore-materials",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.scene, Some(PathBuf::from("scene.ron")));
        assert!(args.ignore_materials);
        assert!(!args.viewer);
        assert_eq!(args.log_level.as_deref(), Some("debug"));

        let args = CliArgs::try_parse_from(["voxmerge"]).unwrap();
        assert!(args.scene.is_none());
    }
}
