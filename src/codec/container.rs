//! BM and BMX containers.
//!
//! ```text
//! BM:   tag (u8) | payload
//!       tag 0: raw packed bitmap bytes
//!       tag 1: u16 LE length | heatshrink data
//! BMX:  width (u32 LE) | height (u32 LE) | BM
//! meta: width | height | frame rate | frame count (u32 LE each)
//! ```

use crate::codec::bitmap::{encode_bitmap, Bitmap, EncodeError, ImageSource};
use crate::codec::heatshrink::{self, BLOCK_HEADER_LEN};
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension of animation frame containers.
pub const BM_EXTENSION: &str = "bm";
/// Extension of static icon containers.
pub const BMX_EXTENSION: &str = "bmx";
/// Animation metadata, copied verbatim.
pub const ANIM_META_FILE: &str = "meta.txt";
/// Frame rate marker of an animated icon directory.
pub const FRAME_RATE_FILE: &str = "frame_rate";
/// Binary metadata record written for animated icons.
pub const ICON_META_FILE: &str = "meta";
/// Prefix of frame image file names.
pub const FRAME_PREFIX: &str = "frame_";

/// Payload discriminator stored in the first byte of a BM container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PayloadTag {
    Raw = 0,
    Compressed = 1,
}

/// A tagged bitmap payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub tag: PayloadTag,
    pub bytes: Vec<u8>,
}

impl Payload {
    pub fn raw(bytes: Vec<u8>) -> Self {
        Self { tag: PayloadTag::Raw, bytes }
    }

    pub fn compressed(bytes: Vec<u8>) -> Self {
        Self { tag: PayloadTag::Compressed, bytes }
    }

    /// Serialized size including the tag byte.
    pub fn encoded_len(&self) -> usize {
        1 + self.bytes.len()
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.tag as u8);
        out.extend_from_slice(&self.bytes);
    }

    /// Serialize as a BM container.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out);
        out
    }
}

/// Pick the representation to persist.
///
/// `compressed` is a length-prefixed block. The compressed form is only chosen
/// when `len(compressed) + 2 < len(raw) + 1`; ties keep the raw bytes.
pub fn select_payload(raw: &[u8], compressed: &[u8]) -> Payload {
    let compressed_size = compressed.len() + BLOCK_HEADER_LEN;
    let raw_size = raw.len() + 1;

    if compressed_size < raw_size {
        Payload::compressed(compressed.to_vec())
    } else {
        Payload::raw(raw.to_vec())
    }
}

/// Compress a packed bitmap and choose its payload.
pub fn payload_for(bitmap: &Bitmap) -> Payload {
    let raw = bitmap.data();
    let payload = match heatshrink::compress_block(raw) {
        Some(block) => select_payload(raw, &block),
        None => Payload::raw(raw.to_vec()),
    };
    debug!(
        "{}x{} bitmap: raw {} bytes, stored as {:?} ({} bytes)",
        bitmap.width(),
        bitmap.height(),
        raw.len(),
        payload.tag,
        payload.encoded_len()
    );
    payload
}

/// BM container for a packed bitmap.
pub fn bm_from_bitmap(bitmap: &Bitmap) -> Vec<u8> {
    payload_for(bitmap).to_bytes()
}

/// BMX container for a packed bitmap.
pub fn bmx_from_bitmap(bitmap: &Bitmap) -> Vec<u8> {
    let payload = payload_for(bitmap);
    let mut out = Vec::with_capacity(8 + payload.encoded_len());
    out.extend_from_slice(&bitmap.width().to_le_bytes());
    out.extend_from_slice(&bitmap.height().to_le_bytes());
    payload.write_to(&mut out);
    out
}

/// Encode an image as a BM container.
pub fn encode_bm(source: impl Into<ImageSource>) -> Result<Vec<u8>, EncodeError> {
    Ok(bm_from_bitmap(&encode_bitmap(source)?))
}

/// Encode an image as a BMX container.
pub fn encode_bmx(source: impl Into<ImageSource>) -> Result<Vec<u8>, EncodeError> {
    Ok(bmx_from_bitmap(&encode_bitmap(source)?))
}

/// Aggregate metadata of an animated icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimatedIconMeta {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub frame_count: u32,
}

impl AnimatedIconMeta {
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        for (chunk, value) in
            out.chunks_exact_mut(4).zip([self.width, self.height, self.frame_rate, self.frame_count])
        {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        out
    }
}

/// File name of the BM container for a frame image.
pub fn bm_file_name(frame: &Path) -> Option<PathBuf> {
    frame.file_name().map(|name| Path::new(name).with_extension(BM_EXTENSION))
}

/// Destination of a static icon with its extension replaced.
pub fn bmx_path(dest: &Path) -> PathBuf {
    dest.with_extension(BMX_EXTENSION)
}

/// Error writing a container to disk.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Source could not be encoded
    #[error("{}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: EncodeError,
    },
    /// Destination could not be written
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Source path has no file name
    #[error("invalid frame path: {}", .0.display())]
    InvalidPath(PathBuf),
}

fn write_file(path: PathBuf, bytes: &[u8]) -> Result<PathBuf, WriteError> {
    match fs::write(&path, bytes) {
        Ok(()) => Ok(path),
        Err(source) => Err(WriteError::Io { path, source }),
    }
}

/// Encode a frame image into `dest_dir/<stem>.bm`.
pub fn write_bm(frame: &Path, dest_dir: &Path) -> Result<PathBuf, WriteError> {
    let name = bm_file_name(frame).ok_or_else(|| WriteError::InvalidPath(frame.to_path_buf()))?;
    let bytes = encode_bm(frame)
        .map_err(|source| WriteError::Encode { path: frame.to_path_buf(), source })?;
    write_file(dest_dir.join(name), &bytes)
}

/// Encode a static icon into `dest` with the BMX extension.
pub fn write_bmx(source: &Path, dest: &Path) -> Result<PathBuf, WriteError> {
    let bytes = encode_bmx(source)
        .map_err(|e| WriteError::Encode { path: source.to_path_buf(), source: e })?;
    write_file(bmx_path(dest), &bytes)
}
