//! Image to packed 1-bit bitmap conversion.
//!
//! Sources are dithered to black and white, inverted, exported as XBM and the
//! XBM data array is parsed back into the packed byte buffer. After the
//! inversion a white source pixel packs to a 0 bit and a black one to a 1 bit,
//! which is the polarity the device expects.

use crate::codec::xbm::{self, FormatError};
use image::imageops::{self, colorops::BiLevel};
use image::{DynamicImage, GrayImage, Luma};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Identifier prefix used in the intermediate XBM text.
const XBM_NAME: &str = "bitmap";

/// Error produced while turning an image into a packed bitmap.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Source could not be opened or decoded
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    /// Intermediate bilevel export was malformed
    #[error("malformed bilevel export: {0}")]
    Format(#[from] FormatError),
    /// Source has no pixels
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// An image to encode, either still on disk or already decoded.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Decoded lazily on first use
    Path(PathBuf),
    /// Already in memory
    Image(DynamicImage),
}

impl ImageSource {
    /// Decode the source if needed.
    pub fn load(self) -> Result<DynamicImage, image::ImageError> {
        match self {
            ImageSource::Path(path) => image::open(path),
            ImageSource::Image(image) => Ok(image),
        }
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(image: DynamicImage) -> Self {
        ImageSource::Image(image)
    }
}

/// A packed monochrome raster.
///
/// Rows are `ceil(width / 8)` bytes long, bit 0 of each byte is the leftmost
/// pixel, and a set bit is a black pixel of the source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Wrap already packed rows, checking the buffer length against the size.
    pub fn from_packed(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FormatError> {
        let expected = xbm::row_stride(width) * height as usize;
        if data.len() != expected {
            return Err(FormatError::LengthMismatch { expected, actual: data.len() });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes per packed row.
    pub fn row_stride(&self) -> usize {
        xbm::row_stride(self.width)
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Load and pack an image source.
pub fn encode_bitmap(source: impl Into<ImageSource>) -> Result<Bitmap, EncodeError> {
    let image = source.into().load()?;
    bitmap_from_image(&image)
}

/// Grayscale with ITU-R 601 weights (299/587/114), alpha ignored.
fn luma_601(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = (u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000)
            >> 16;
        Luma([luma as u8])
    })
}

/// Pack a decoded image.
pub fn bitmap_from_image(image: &DynamicImage) -> Result<Bitmap, EncodeError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(EncodeError::EmptyImage { width, height });
    }

    let mut mono = luma_601(image);
    imageops::dither(&mut mono, &BiLevel);
    imageops::invert(&mut mono);

    let text = xbm::to_xbm(XBM_NAME, &mono);
    let data = xbm::parse_bits(&text)?;
    Ok(Bitmap::from_packed(width, height, data)?)
}
