//! Exact rotations by multiples of 90 degrees.
//!
//! Sine and cosine come from a lookup table so the matrix entries are exact
//! integers. Angles other than 0, 90, 180 and 270 map to `sin = 0, cos = 1`,
//! so an unsupported angle leaves that axis unrotated.

use glam::{IVec3, Mat3};

/// Sine of a right-angle multiple given in degrees.
pub fn exact_sin(degrees: i32) -> i32 {
    match degrees {
        90 => 1,
        270 => -1,
        _ => 0,
    }
}

/// Cosine of a right-angle multiple given in degrees.
pub fn exact_cos(degrees: i32) -> i32 {
    match degrees {
        90 | 270 => 0,
        180 => -1,
        _ => 1,
    }
}

/// Builds `Rz · Ry · Rx` for the given per-axis angles in degrees, so the
/// X rotation applies first.
pub fn rotation_matrix(degrees: IVec3) -> Mat3 {
    let (sx, cx) = (exact_sin(degrees.x), exact_cos(degrees.x));
    let (sy, cy) = (exact_sin(degrees.y), exact_cos(degrees.y));
    let (sz, cz) = (exact_sin(degrees.z), exact_cos(degrees.z));

    let rows = [
        [cy * cz, cz * sx * sy - cx * sz, cx * cz * sy + sx * sz],
        [cy * sz, cx * cz + sx * sy * sz, cx * sy * sz - cz * sx],
        [-sy, cy * sx, cx * cy],
    ];
    Mat3::from_cols_array_2d(&rows.map(|row| row.map(|v| v as f32))).transpose()
}
