//! MagicaVoxel `.vox` chunk codec.
//!
//! Pure serialization: [`encode`] turns a [`voxmerge_model::VoxelModel`] into
//! bytes and [`decode`] reads one back. File handling lives with the callers.

pub mod codec;
pub mod error;

pub use codec::{VERSION, decode, encode};
pub use error::{EncodeError, FormatError};
