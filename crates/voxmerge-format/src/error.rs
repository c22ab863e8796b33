//! Codec error types.

/// Errors that abort decoding a `.vox` stream.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The stream does not start with `VOX `.
    #[error("not a VOX file (found tag {found:?})")]
    BadMagic {
        /// The four bytes found instead.
        found: String,
    },
    /// A mandatory chunk is missing or out of order.
    #[error("expected {expected} chunk, found {found:?}")]
    UnexpectedChunk {
        /// Tag required at this position.
        expected: &'static str,
        /// Tag actually read.
        found: String,
    },
    /// The stream ended inside a header or chunk.
    #[error("data truncated at offset {offset}: needed {needed} more bytes")]
    Truncated {
        /// Byte offset where the read started.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
    },
    /// A chunk declares a size that cannot hold its fixed fields.
    #[error("{tag} chunk has invalid size {size}")]
    InvalidChunkSize {
        /// Chunk tag.
        tag: &'static str,
        /// Declared self-size.
        size: u32,
    },
    /// The `SIZE` chunk declares a negative extent.
    #[error("negative model size ({x}, {y}, {z})")]
    NegativeSize { x: i32, y: i32, z: i32 },
    /// A `MATT` chunk refers to a slot outside the palette.
    #[error("material index {0} out of palette range")]
    InvalidPaletteIndex(i32),
}

/// Errors that prevent a model from being encoded.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// A voxel coordinate does not fit in the single byte the format allows.
    #[error("voxel coordinate ({x}, {y}, {z}) does not fit in a byte")]
    CoordinateOverflow {
        x: i32,
        y: i32,
        z: i32,
    },
    /// The voxel list is longer than the count field can express.
    #[error("too many voxels to encode: {0}")]
    TooManyVoxels(usize),
}
