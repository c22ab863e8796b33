//! Splits a model that exceeds the per-file coordinate range into a grid of
//! tiles, all sharing the parent's palette.

use std::path::Path;
use std::rc::Rc;

use glam::IVec3;
use tracing::{debug, info};
use voxmerge_config::MAX_TILE_SIZE;
use voxmerge_model::{Voxel, VoxelModel};

use crate::error::SceneError;
use crate::manifest::Manifest;

/// One grid cell: its coordinates, voxel-space origin and local model.
#[derive(Debug)]
pub struct Tile {
    /// Cell coordinates `(ix, iy, iz)`.
    pub cell: [usize; 3],
    /// Voxel-space position of the cell's `(0, 0, 0)`.
    pub origin: IVec3,
    /// Voxels in cell-local coordinates.
    pub model: VoxelModel,
}

impl Tile {
    /// File name for this tile, e.g. `scene_1_0_2.vox`.
    pub fn file_name(&self, base_name: &str) -> String {
        let [ix, iy, iz] = self.cell;
        format!("{base_name}_{ix}_{iy}_{iz}.vox")
    }
}

/// All tiles of one partition, in grid-scan order (`x` outer, `z` inner).
#[derive(Debug)]
pub struct TileGrid {
    /// Cell counts per axis.
    pub dims: [usize; 3],
    pub tile_size: i32,
    pub tiles: Vec<Tile>,
}

impl TileGrid {
    fn linear_index(dims: [usize; 3], ix: usize, iy: usize, iz: usize) -> usize {
        (ix * dims[1] + iy) * dims[2] + iz
    }

    /// Returns the tile at cell `(ix, iy, iz)`.
    pub fn tile(&self, ix: usize, iy: usize, iz: usize) -> Option<&Tile> {
        if ix >= self.dims[0] || iy >= self.dims[1] || iz >= self.dims[2] {
            return None;
        }
        self.tiles.get(Self::linear_index(self.dims, ix, iy, iz))
    }

    /// Every voxel translated back to parent coordinates, tile by tile.
    pub fn reassemble(&self) -> Vec<Voxel> {
        self.tiles
            .iter()
            .flat_map(|tile| {
                tile.model.voxels().iter().map(move |v| {
                    Voxel::new(
                        v.x + tile.origin.x,
                        v.y + tile.origin.y,
                        v.z + tile.origin.z,
                        v.index,
                    )
                })
            })
            .collect()
    }
}

/// Partitions `model` into cells of `tile_size` voxels per axis.
///
/// `tile_size` must lie in `1..=MAX_TILE_SIZE` so every local coordinate can
/// be encoded.
///
/// Every cell exists even when empty. A cell's declared extent is
/// `min(origin + tile_size, parent_size)` per axis, so cells further along an
/// axis declare the running size rather than their own width. Each voxel is
/// re-added to its cell at local coordinates.
pub fn split_into_tiles(model: &VoxelModel, tile_size: u32) -> Result<TileGrid, SceneError> {
    if tile_size == 0 || tile_size > MAX_TILE_SIZE {
        return Err(SceneError::InvalidTileSize(tile_size));
    }
    let t = tile_size as i32;

    let extent = model.extent().map(|s| s.max(0));
    let dims = extent.map(|s| (s as u32).div_ceil(tile_size) as usize);

    let mut tiles = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
    for ix in 0..dims[0] {
        for iy in 0..dims[1] {
            for iz in 0..dims[2] {
                let origin = IVec3::new(ix as i32, iy as i32, iz as i32) * t;
                let size = |axis: usize| (origin[axis] + t).min(extent[axis]);
                let tile_model = VoxelModel::with_palette(
                    size(0),
                    size(1),
                    size(2),
                    model.context(),
                    Rc::clone(model.palette()),
                );
                tiles.push(Tile {
                    cell: [ix, iy, iz],
                    origin,
                    model: tile_model,
                });
            }
        }
    }

    for voxel in model.voxels() {
        let outside = || SceneError::VoxelOutsideGrid {
            x: voxel.x,
            y: voxel.y,
            z: voxel.z,
        };
        let cell = [voxel.x, voxel.y, voxel.z].map(|c| (c / t) as usize);
        if (0..3).any(|axis| cell[axis] >= dims[axis]) {
            return Err(outside());
        }
        let tile = &mut tiles[TileGrid::linear_index(dims, cell[0], cell[1], cell[2])];
        tile.model.add_voxel(
            voxel.x - tile.origin.x,
            voxel.y - tile.origin.y,
            voxel.z - tile.origin.z,
            voxel.index,
        );
    }

    debug!(
        nx = dims[0],
        ny = dims[1],
        nz = dims[2],
        tile_size,
        "split model into tiles"
    );
    Ok(TileGrid {
        dims,
        tile_size: t,
        tiles,
    })
}

/// Encodes every tile to `<dir>/<base_name>_<ix>_<iy>_<iz>.vox` and returns
/// the manifest listing them with absolute paths.
pub fn write_tiles(grid: &TileGrid, dir: &Path, base_name: &str) -> Result<Manifest, SceneError> {
    std::fs::create_dir_all(dir).map_err(|source| SceneError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut manifest = Manifest::default();
    for tile in &grid.tiles {
        let path = dir.join(tile.file_name(base_name));
        let bytes = voxmerge_format::encode(&tile.model).map_err(|source| SceneError::Encode {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, bytes).map_err(|source| SceneError::Write {
            path: path.clone(),
            source,
        })?;
        let absolute = std::path::absolute(&path).map_err(|source| SceneError::Write {
            path: path.clone(),
            source,
        })?;
        manifest.push(tile.origin, absolute);
    }

    info!(tiles = grid.tiles.len(), dir = %dir.display(), "wrote tiles");
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxmerge_model::CompositionContext;

    fn viewer_model(x: i32, y: i32, z: i32) -> VoxelModel {
        VoxelModel::new(x, y, z, CompositionContext::viewer())
    }

    #[test]
    fn test_grid_dimensions_and_cell_extents() {
        let model = viewer_model(300, 126, 1);
        let grid = split_into_tiles(&model, 126).unwrap();
        assert_eq!(grid.dims, [3, 1, 1]);
        assert_eq!(grid.tiles.len(), 3);
        assert_eq!(grid.tiles[0].model.extent(), [126, 126, 1]);
        assert_eq!(grid.tiles[1].model.extent(), [252, 126, 1]);
        assert_eq!(grid.tiles[2].model.extent(), [300, 126, 1]);
        assert_eq!(grid.tiles[2].origin, IVec3::new(252, 0, 0));
    }

    #[test]
    fn test_cell_extent_is_running_size_on_every_axis() {
        let model = viewer_model(300, 10, 10);
        let grid = split_into_tiles(&model, 126).unwrap();
        let extents: Vec<_> = grid.tiles.iter().map(|t| t.model.extent()).collect();
        assert_eq!(extents, vec![[126, 10, 10], [252, 10, 10], [300, 10, 10]]);

        let model = viewer_model(5, 9, 3);
        let grid = split_into_tiles(&model, 4).unwrap();
        assert_eq!(grid.dims, [2, 3, 1]);
        assert_eq!(grid.tile(0, 0, 0).unwrap().model.extent(), [4, 4, 3]);
        assert_eq!(grid.tile(0, 1, 0).unwrap().model.extent(), [4, 8, 3]);
        assert_eq!(grid.tile(1, 2, 0).unwrap().model.extent(), [5, 9, 3]);
    }

    #[test]
    fn test_grid_scan_order() {
        let model = viewer_model(4, 4, 4);
        let grid = split_into_tiles(&model, 2).unwrap();
        let cells: Vec<_> = grid.tiles.iter().map(|t| t.cell).collect();
        assert_eq!(cells[0], [0, 0, 0]);
        assert_eq!(cells[1], [0, 0, 1]);
        assert_eq!(cells[2], [0, 1, 0]);
        assert_eq!(cells[4], [1, 0, 0]);
        assert_eq!(grid.tile(1, 1, 0).unwrap().origin, IVec3::new(2, 2, 0));
        assert!(grid.tile(2, 0, 0).is_none());
    }

    #[test]
    fn test_voxels_land_in_local_coordinates() {
        let mut model = viewer_model(10, 10, 10);
        model.add_voxel(7, 2, 9, 3);
        let grid = split_into_tiles(&model, 4).unwrap();
        let tile = grid.tile(1, 0, 2).unwrap();
        assert_eq!(tile.model.voxels(), &[Voxel::new(3, 2, 1, 3)]);
        assert_eq!(grid.tile(0, 0, 0).unwrap().model.voxel_count(), 0);
    }

    #[test]
    fn test_reassembly_reproduces_voxels() {
        let mut model = viewer_model(300, 20, 130);
        let mut expected = Vec::new();
        for i in 0..200 {
            let v = Voxel::new((i * 7) % 300, (i * 3) % 20, (i * 11) % 130, (i % 255) as u8 + 1);
            model.add_voxel(v.x, v.y, v.z, v.index);
            expected.push(v);
        }
        let grid = split_into_tiles(&model, 126).unwrap();
        let mut restored = grid.reassemble();
        let total: usize = grid.tiles.iter().map(|t| t.model.voxel_count()).sum();
        assert_eq!(total, expected.len());

        let key = |v: &Voxel| (v.x, v.y, v.z, v.index);
        restored.sort_by_key(key);
        expected.sort_by_key(key);
        assert_eq!(restored, expected);
    }

    #[test]
    fn test_tiles_share_palette() {
        let model = viewer_model(8, 8, 8);
        let grid = split_into_tiles(&model, 4).unwrap();
        model.set_color(9, 0xFF12_3456);
        for tile in &grid.tiles {
            assert!(tile.model.shares_palette_with(&model));
            assert_eq!(tile.model.palette_ref().color(9), 0xFF12_3456);
        }
    }

    #[test]
    fn test_invalid_tile_size() {
        let model = viewer_model(4, 4, 4);
        assert!(matches!(
            split_into_tiles(&model, 0),
            Err(SceneError::InvalidTileSize(0))
        ));
        assert!(matches!(
            split_into_tiles(&model, 257),
            Err(SceneError::InvalidTileSize(257))
        ));
        assert!(split_into_tiles(&model, 256).is_ok());
    }

    #[test]
    fn test_voxel_beyond_extent_is_an_error() {
        let mut model = viewer_model(4, 4, 4);
        model.add_voxel(9, 0, 0, 1);
        assert!(matches!(
            split_into_tiles(&model, 4),
            Err(SceneError::VoxelOutsideGrid { x: 9, .. })
        ));
    }

    #[test]
    fn test_write_tiles_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("scene");
        let mut model = viewer_model(6, 2, 2);
        model.add_voxel(5, 1, 1, 2);
        let grid = split_into_tiles(&model, 4).unwrap();

        let manifest = write_tiles(&grid, &out, "scene").unwrap();
        assert_eq!(manifest.entries.len(), 2);
        assert_eq!(manifest.entries[1].origin, IVec3::new(4, 0, 0));
        assert!(manifest.entries[1].path.is_absolute());
        assert!(manifest.entries[1].path.ends_with("scene/scene_1_0_0.vox"));

        let empty = std::fs::read(out.join("scene_0_0_0.vox")).unwrap();
        let decoded = voxmerge_format::decode(&empty, CompositionContext::viewer()).unwrap();
        assert_eq!(decoded.voxel_count(), 0);
        assert_eq!(decoded.extent(), [4, 2, 2]);

        let full = std::fs::read(out.join("scene_1_0_0.vox")).unwrap();
        let decoded = voxmerge_format::decode(&full, CompositionContext::viewer()).unwrap();
        assert_eq!(decoded.voxels(), &[Voxel::new(1, 1, 1, 2)]);
        assert_eq!(decoded.extent(), [6, 2, 2]);
    }
}
