//! Monochrome bitmap codec
//!
//! Converts images into the packed 1-bit format used on the device and wraps
//! them in BM / BMX containers, compressing the pixel data when that makes the
//! file smaller.
//!
//! # Example
//!
//! ```ignore
//! use bmpack::codec::{encode_bmx, encode_bm};
//!
//! let icon = encode_bmx(std::path::Path::new("Icons/Common/Battery.png"))?;
//! let frame = encode_bm(std::path::Path::new("Anims/Boot/frame_0.png"))?;
//! ```

pub mod bitmap;
pub mod container;
pub mod heatshrink;
pub mod xbm;

pub use bitmap::*;
pub use container::*;
pub use xbm::FormatError;
