//! Encoding and decoding of MagicaVoxel `.vox` files.
//!
//! ## Binary Layout
//!
//! Every integer and float is a 32-bit little-endian value. Colors are the
//! exception: each `RGBA` word is stored big-endian, so `0xFF000000` is
//! written as `FF 00 00 00`. Each chunk
//! is a 4-byte ASCII tag, its content size, its children size, the content
//! and then the children.
//!
//! | Chunk | Content |
//! |-------|---------|
//! | header | `"VOX "`, version (`150`) |
//! | `MAIN` | no content; children hold every chunk below |
//! | `PACK` | model count (read only; the first model is decoded) |
//! | `SIZE` | `size_x`, `size_y`, `size_z` |
//! | `XYZI` | voxel count, then `x, y, z, i` as four `u8` per voxel |
//! | `RGBA` | 256 colors; disk slot `k` is palette index `k + 1`, the last is 0 |
//! | `MATT` | `index`, `type`, `weight` (f32), `properties`, `values` (f32...) |
//!
//! `MATT` chunks are written only for slots whose material type is non-zero.

use tracing::{debug, warn};
use voxmerge_model::{CompositionContext, Material, VoxelModel};

use crate::error::{EncodeError, FormatError};

/// Format version written by the encoder.
pub const VERSION: i32 = 150;

const TAG_FORMAT: &[u8; 4] = b"VOX ";
const TAG_MAIN: &[u8; 4] = b"MAIN";
const TAG_PACK: &[u8; 4] = b"PACK";
const TAG_SIZE: &[u8; 4] = b"SIZE";
const TAG_XYZI: &[u8; 4] = b"XYZI";
const TAG_RGBA: &[u8; 4] = b"RGBA";
const TAG_MATT: &[u8; 4] = b"MATT";

/// Content size of an `RGBA` chunk.
const RGBA_SIZE: u32 = 256 * 4;

/// Bytes of `RGBA` content that carry palette colors (disk slots 0..=254).
const RGBA_READ_SIZE: u32 = 255 * 4;

/// Fixed `MATT` fields ahead of the value list: index, type, weight, properties.
const MATT_FIXED_FIELDS: u32 = 4;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes a model into `.vox` bytes.
///
/// Fails if a voxel coordinate is outside `0..=255`; the format stores each
/// coordinate in one byte.
pub fn encode(model: &VoxelModel) -> Result<Vec<u8>, EncodeError> {
    let voxels = model.voxels();
    let too_many = || EncodeError::TooManyVoxels(voxels.len());
    let count = u32::try_from(voxels.len()).map_err(|_| too_many())?;
    let xyzi_len = count
        .checked_mul(4)
        .and_then(|n| n.checked_add(4))
        .ok_or_else(too_many)?;

    let mut main = Vec::with_capacity(xyzi_len as usize + RGBA_SIZE as usize + 64);

    // SIZE
    let mut size = Vec::with_capacity(12);
    put_i32(&mut size, model.size_x());
    put_i32(&mut size, model.size_y());
    put_i32(&mut size, model.size_z());
    write_chunk(&mut main, TAG_SIZE, &size);

    // XYZI
    let mut xyzi = Vec::with_capacity(xyzi_len as usize);
    put_u32(&mut xyzi, count);
    for voxel in voxels {
        let overflow = || EncodeError::CoordinateOverflow {
            x: voxel.x,
            y: voxel.y,
            z: voxel.z,
        };
        let x = u8::try_from(voxel.x).map_err(|_| overflow())?;
        let y = u8::try_from(voxel.y).map_err(|_| overflow())?;
        let z = u8::try_from(voxel.z).map_err(|_| overflow())?;
        xyzi.extend_from_slice(&[x, y, z, voxel.index]);
    }
    write_chunk(&mut main, TAG_XYZI, &xyzi);

    let palette = model.palette_ref();

    // RGBA: palette index 0 is not stored; the last disk slot stays zero.
    let mut rgba = Vec::with_capacity(RGBA_SIZE as usize);
    for index in 1..=u8::MAX {
        put_color(&mut rgba, palette.color(index));
    }
    put_color(&mut rgba, 0);
    write_chunk(&mut main, TAG_RGBA, &rgba);

    // MATT
    for (index, material) in palette.iter().skip(1) {
        if !material.has_material() {
            continue;
        }
        let mut matt = Vec::with_capacity(4 * (4 + material.values.len()));
        put_i32(&mut matt, i32::from(index));
        put_i32(&mut matt, material.kind);
        put_f32(&mut matt, material.weight);
        put_i32(&mut matt, material.properties);
        for &value in &material.values {
            put_f32(&mut matt, value);
        }
        write_chunk(&mut main, TAG_MATT, &matt);
    }

    let children = u32::try_from(main.len()).map_err(|_| too_many())?;
    let mut out = Vec::with_capacity(8 + 12 + main.len());
    out.extend_from_slice(TAG_FORMAT);
    put_i32(&mut out, VERSION);
    out.extend_from_slice(TAG_MAIN);
    put_u32(&mut out, 0);
    put_u32(&mut out, children);
    out.extend_from_slice(&main);
    Ok(out)
}

/// Appends a leaf chunk: tag, content size, zero children size, content.
fn write_chunk(buf: &mut Vec<u8>, tag: &[u8; 4], content: &[u8]) {
    buf.extend_from_slice(tag);
    // Callers bound every content length well below u32::MAX.
    put_u32(buf, content.len() as u32);
    put_u32(buf, 0);
    buf.extend_from_slice(content);
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_color(buf: &mut Vec<u8>, color: u32) {
    buf.extend_from_slice(&color.to_be_bytes());
}

fn put_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_f32(buf: &mut Vec<u8>, value: f32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes `.vox` bytes into a model created under `context`.
///
/// Only the first model of a `PACK` file is read. Voxels outside the
/// context's coordinate ceiling are dropped by [`VoxelModel::add_voxel`].
/// Palette and material chunks are optional; unknown chunks after `XYZI` are
/// skipped.
pub fn decode(data: &[u8], context: CompositionContext) -> Result<VoxelModel, FormatError> {
    if data.len() < 4 || &data[0..4] != TAG_FORMAT {
        return Err(FormatError::BadMagic {
            found: tag_name(&data[..data.len().min(4)]),
        });
    }
    let mut reader = Reader::new(data);
    reader.skip(4)?;

    let version = reader.i32()?;
    if version != VERSION {
        warn!(expected = VERSION, found = version, "unexpected VOX version");
    }

    expect_tag(reader.tag()?, TAG_MAIN, "MAIN")?;
    reader.skip(8)?;

    let mut tag = reader.tag()?;
    if &tag == TAG_PACK {
        reader.skip(8)?;
        let models = reader.u32()?;
        debug!(models, "PACK chunk found, decoding the first model only");
        tag = reader.tag()?;
    }

    expect_tag(tag, TAG_SIZE, "SIZE")?;
    reader.skip(8)?;
    let size_x = reader.i32()?;
    let size_y = reader.i32()?;
    let size_z = reader.i32()?;
    if size_x < 0 || size_y < 0 || size_z < 0 {
        return Err(FormatError::NegativeSize {
            x: size_x,
            y: size_y,
            z: size_z,
        });
    }

    expect_tag(reader.tag()?, TAG_XYZI, "XYZI")?;
    reader.skip(8)?;
    let count = reader.u32()? as usize;
    let voxel_bytes = reader.take(count.checked_mul(4).unwrap_or(usize::MAX))?;
    let mut model = VoxelModel::new(size_x, size_y, size_z, context);
    for v in voxel_bytes.chunks_exact(4) {
        model.add_voxel(i32::from(v[0]), i32::from(v[1]), i32::from(v[2]), v[3]);
    }
    debug!(
        size_x,
        size_y,
        size_z,
        declared = count,
        kept = model.voxel_count(),
        "decoded voxels"
    );

    while let Some(tag) = reader.try_tag() {
        match &tag {
            TAG_RGBA => read_rgba(&mut reader, &model)?,
            TAG_MATT => read_matt(&mut reader, &model)?,
            _ => skip_chunk(&mut reader, &tag)?,
        }
    }

    Ok(model)
}

/// Reads 255 colors into palette indices 1..=255 and skips the rest of the chunk.
fn read_rgba(reader: &mut Reader<'_>, model: &VoxelModel) -> Result<(), FormatError> {
    let size = reader.u32()?;
    let children = reader.u32()?;
    if size < RGBA_READ_SIZE {
        return Err(FormatError::InvalidChunkSize { tag: "RGBA", size });
    }
    let mut palette = model.palette_mut();
    for index in 1..=u8::MAX {
        palette.set_color(index, reader.color()?);
    }
    reader.skip((size - RGBA_READ_SIZE) as usize + children as usize)
}

/// Reads one `MATT` chunk into its palette slot.
fn read_matt(reader: &mut Reader<'_>, model: &VoxelModel) -> Result<(), FormatError> {
    let size = reader.u32()?;
    if size < MATT_FIXED_FIELDS * 4 {
        return Err(FormatError::InvalidChunkSize { tag: "MATT", size });
    }
    let num_values = (size / 4 - MATT_FIXED_FIELDS) as usize;
    let children = reader.u32()?;

    let raw_index = reader.i32()?;
    let index = u8::try_from(raw_index).map_err(|_| FormatError::InvalidPaletteIndex(raw_index))?;
    let kind = reader.i32()?;
    let weight = reader.f32()?;
    let properties = reader.i32()?;
    let values = reader
        .take(num_values * 4)?
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    reader.skip((size % 4) as usize + children as usize)?;

    let mut palette = model.palette_mut();
    let slot: &mut Material = palette.material_mut(index);
    slot.kind = kind;
    slot.weight = weight;
    slot.properties = properties;
    slot.values = values;
    Ok(())
}

fn skip_chunk(reader: &mut Reader<'_>, tag: &[u8; 4]) -> Result<(), FormatError> {
    let size = reader.u32()?;
    let children = reader.u32()?;
    debug!(tag = %tag_name(tag), size, children, "skipping chunk");
    reader.skip(size as usize + children as usize)
}

fn expect_tag(found: [u8; 4], expected: &[u8; 4], name: &'static str) -> Result<(), FormatError> {
    if &found == expected {
        Ok(())
    } else {
        Err(FormatError::UnexpectedChunk {
            expected: name,
            found: tag_name(&found),
        })
    }
}

fn tag_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Forward-only cursor over the input bytes.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        if self.remaining() < n {
            return Err(FormatError::Truncated {
                offset: self.pos,
                needed: n,
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn skip(&mut self, n: usize) -> Result<(), FormatError> {
        self.take(n).map(|_| ())
    }

    fn word(&mut self) -> Result<[u8; 4], FormatError> {
        let b = self.take(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    fn tag(&mut self) -> Result<[u8; 4], FormatError> {
        self.word()
    }

    /// Reads a tag, or returns `None` once the stream is exhausted.
    fn try_tag(&mut self) -> Option<[u8; 4]> {
        if self.remaining() < 4 {
            self.pos = self.data.len();
            return None;
        }
        self.word().ok()
    }

    fn u32(&mut self) -> Result<u32, FormatError> {
        self.word().map(u32::from_le_bytes)
    }

    fn color(&mut self) -> Result<u32, FormatError> {
        self.word().map(u32::from_be_bytes)
    }

    fn i32(&mut self) -> Result<i32, FormatError> {
        self.word().map(i32::from_le_bytes)
    }

    fn f32(&mut self) -> Result<f32, FormatError> {
        self.word().map(f32::from_le_bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use voxmerge_model::{DEFAULT_COLOR, MaterialMode, Voxel};

    fn ctx() -> CompositionContext {
        CompositionContext::standalone()
    }

    fn sample_model() -> VoxelModel {
        let mut model = VoxelModel::new(3, 4, 5, ctx());
        model.add_voxel(0, 0, 0, 1);
        model.add_voxel(2, 3, 4, 200);
        model.add_voxel(1, 1, 1, 1);
        model.set_color(1, 0xFF11_2233);
        model.set_color(200, 0x80AA_BBCC);
        model.set_color(255, 0xFFFF_FFFF);
        {
            let mut palette = model.palette_mut();
            let glass = palette.material_mut(200);
            glass.kind = 2;
            glass.weight = 0.75;
            glass.properties = 0b101;
            glass.values = vec![0.5, 1.25, -3.0];
        }
        model
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode(&sample_model()).unwrap();
        assert_eq!(&bytes[0..4], b"VOX ");
        assert_eq!(u32_at(&bytes, 4), 150);
        assert_eq!(&bytes[8..12], b"MAIN");
        assert_eq!(u32_at(&bytes, 12), 0);
        assert_eq!(u32_at(&bytes, 16) as usize, bytes.len() - 20);

        // SIZE
        assert_eq!(&bytes[20..24], b"SIZE");
        assert_eq!(u32_at(&bytes, 24), 12);
        assert_eq!(u32_at(&bytes, 28), 0);
        assert_eq!(
            [u32_at(&bytes, 32), u32_at(&bytes, 36), u32_at(&bytes, 40)],
            [3, 4, 5]
        );

        // XYZI
        assert_eq!(&bytes[44..48], b"XYZI");
        assert_eq!(u32_at(&bytes, 48), 4 + 3 * 4);
        assert_eq!(u32_at(&bytes, 56), 3);
        assert_eq!(&bytes[60..64], &[0, 0, 0, 1]);
        assert_eq!(&bytes[64..68], &[2, 3, 4, 200]);
    }

    #[test]
    fn test_rgba_is_shifted_by_one_and_ends_with_zero() {
        let bytes = encode(&sample_model()).unwrap();
        let rgba = 72;
        assert_eq!(&bytes[rgba..rgba + 4], b"RGBA");
        assert_eq!(u32_at(&bytes, rgba + 4), 1024);
        let colors = rgba + 12;
        let color_at = |offset: usize| u32::from_be_bytes(bytes[offset..offset + 4].try_into().unwrap());
        // Disk slot 0 holds palette index 1.
        assert_eq!(color_at(colors), 0xFF11_2233);
        assert_eq!(&bytes[colors..colors + 4], &[0xFF, 0x11, 0x22, 0x33]);
        assert_eq!(color_at(colors + 199 * 4), 0x80AA_BBCC);
        assert_eq!(color_at(colors + 254 * 4), 0xFFFF_FFFF);
        assert_eq!(color_at(colors + 255 * 4), 0);
        // Untouched slots keep the default color.
        assert_eq!(color_at(colors + 4), 0xFF00_0000);
    }

    #[test]
    fn test_default_color_is_written_big_endian() {
        let model = VoxelModel::new(1, 1, 1, ctx());
        let bytes = encode(&model).unwrap();
        // SIZE (24 bytes) and an empty XYZI (16 bytes) precede RGBA.
        let colors = 20 + 24 + 16 + 12;
        assert_eq!(&bytes[colors - 12..colors - 8], b"RGBA");
        assert_eq!(&bytes[colors..colors + 4], &[0xFF, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[colors + 255 * 4..colors + 256 * 4], &[0, 0, 0, 0]);

        let restored = decode(&bytes, ctx()).unwrap();
        assert_eq!(restored.palette_ref().color(1), DEFAULT_COLOR);
    }

    #[test]
    fn test_matt_chunk_layout() {
        let bytes = encode(&sample_model()).unwrap();
        let matt = 72 + 12 + 1024;
        assert_eq!(&bytes[matt..matt + 4], b"MATT");
        assert_eq!(u32_at(&bytes, matt + 4), 4 * (4 + 3));
        assert_eq!(u32_at(&bytes, matt + 8), 0);
        assert_eq!(u32_at(&bytes, matt + 12), 200);
        assert_eq!(u32_at(&bytes, matt + 16), 2);
        assert_eq!(f32::from_bits(u32_at(&bytes, matt + 20)), 0.75);
        assert_eq!(u32_at(&bytes, matt + 24), 0b101);
        assert_eq!(f32::from_bits(u32_at(&bytes, matt + 36)), -3.0);
        assert_eq!(bytes.len(), matt + 12 + 28);
    }

    #[test]
    fn test_roundtrip_preserves_voxels_and_palette() {
        let original = sample_model();
        let bytes = encode(&original).unwrap();
        let restored = decode(&bytes, ctx()).unwrap();

        assert_eq!(restored.extent(), original.extent());
        assert_eq!(restored.voxels(), original.voxels());
        let (a, b) = (original.palette_ref(), restored.palette_ref());
        for index in 1..=u8::MAX {
            assert!(
                a.material(index).matches(b.material(index), MaterialMode::Full),
                "slot {index} differs"
            );
        }
        assert_eq!(b.material(200).values, vec![0.5, 1.25, -3.0]);
    }

    #[test]
    fn test_reencode_is_byte_identical() {
        let bytes = encode(&sample_model()).unwrap();
        let again = encode(&decode(&bytes, ctx()).unwrap()).unwrap();
        assert_eq!(bytes, again);
    }

    #[test]
    fn test_decode_without_palette() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"VOX ");
        bytes.extend_from_slice(&150i32.to_le_bytes());
        bytes.extend_from_slice(b"MAIN");
        bytes.extend_from_slice(&[0; 8]);
        bytes.extend_from_slice(b"SIZE");
        bytes.extend_from_slice(&12u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        for s in [2i32, 2, 2] {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        bytes.extend_from_slice(b"XYZI");
        bytes.extend_from_slice(&8u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 0, 1, 5]);

        let model = decode(&bytes, ctx()).unwrap();
        assert_eq!(model.voxels(), &[Voxel::new(1, 0, 1, 5)]);
        assert_eq!(model.palette_ref().color(5), 0xFF00_0000);
        assert!(model.palette_ref().is_used(5));
    }

    #[test]
    fn test_decode_pack_and_unknown_chunks() {
        let model = sample_model();
        let encoded = encode(&model).unwrap();
        // Splice a PACK chunk in front of SIZE and an unknown chunk at the end.
        let mut bytes = encoded[..20].to_vec();
        bytes.extend_from_slice(b"PACK");
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&encoded[20..]);
        bytes.extend_from_slice(b"nTRN");
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&[9, 9, 9]);

        let restored = decode(&bytes, ctx()).unwrap();
        assert_eq!(restored.voxels(), model.voxels());
        assert_eq!(restored.palette_ref().color(200), 0x80AA_BBCC);
    }

    #[test]
    fn test_version_mismatch_is_not_fatal() {
        let mut bytes = encode(&sample_model()).unwrap();
        bytes[4..8].copy_from_slice(&200i32.to_le_bytes());
        assert!(decode(&bytes, ctx()).is_ok());
    }

    #[test]
    fn test_decode_errors() {
        let result = decode(b"RIFF\x96\0\0\0", ctx());
        assert!(
            matches!(result, Err(FormatError::BadMagic { .. })),
            "expected BadMagic, got {result:?}"
        );

        let result = decode(b"VO", ctx());
        assert!(matches!(result, Err(FormatError::BadMagic { .. })));

        let mut bytes = encode(&sample_model()).unwrap();
        bytes[8..12].copy_from_slice(b"MAIX");
        let result = decode(&bytes, ctx());
        assert!(
            matches!(
                result,
                Err(FormatError::UnexpectedChunk {
                    expected: "MAIN",
                    ..
                })
            ),
            "expected UnexpectedChunk(MAIN), got {result:?}"
        );

        let mut bytes = encode(&sample_model()).unwrap();
        bytes[44..48].copy_from_slice(b"RGBA");
        let result = decode(&bytes, ctx());
        assert!(matches!(
            result,
            Err(FormatError::UnexpectedChunk {
                expected: "XYZI",
                ..
            })
        ));

        let bytes = encode(&sample_model()).unwrap();
        let result = decode(&bytes[..62], ctx());
        assert!(
            matches!(result, Err(FormatError::Truncated { .. })),
            "expected Truncated, got {result:?}"
        );
    }

    #[test]
    fn test_decode_rejects_negative_size() {
        let mut bytes = encode(&sample_model()).unwrap();
        // size_y of the SIZE chunk.
        bytes[36..40].copy_from_slice(&i32::MIN.to_le_bytes());
        let result = decode(&bytes, ctx());
        assert!(
            matches!(result, Err(FormatError::NegativeSize { y: i32::MIN, .. })),
            "expected NegativeSize, got {result:?}"
        );
    }

    #[test]
    fn test_decode_drops_voxels_beyond_ceiling() {
        let mut model = VoxelModel::new(200, 1, 1, CompositionContext::viewer());
        model.add_voxel(150, 0, 0, 3);
        model.add_voxel(10, 0, 0, 4);
        let bytes = encode(&model).unwrap();

        let restored = decode(&bytes, ctx()).unwrap();
        assert_eq!(restored.voxels(), &[Voxel::new(10, 0, 0, 4)]);
        assert!(restored.palette_ref().is_used(3));

        let viewer = decode(&bytes, CompositionContext::viewer()).unwrap();
        assert_eq!(viewer.voxel_count(), 2);
    }

    #[test]
    fn test_encode_rejects_wide_coordinates() {
        let mut model = VoxelModel::new(300, 1, 1, CompositionContext::viewer());
        model.add_voxel(256, 0, 0, 1);
        let result = encode(&model);
        assert!(matches!(
            result,
            Err(EncodeError::CoordinateOverflow { x: 256, .. })
        ));
    }
}
