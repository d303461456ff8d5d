//! bmpack - Monochrome bitmap encoder and asset pack compiler
//!
//! This library provides functionality to:
//! - Convert images into 1-bit packed bitmaps
//! - Compress them with a heatshrink-compatible LZSS encoder
//! - Write BM/BMX containers and regenerate whole asset packs

pub mod build;
pub mod cli;
pub mod codec;
pub mod config;
