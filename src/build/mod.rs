//! Pack regeneration for bmpack
//!
//! Turns a tree of asset packs into device-ready BM/BMX containers.
//!
//! # Overview
//!
//! The build pipeline consists of:
//! - **Discovery**: Find packs and their animations and icons
//! - **Planning**: Create a build plan with one target per asset
//! - **Execution**: Clean each pack output, then encode its assets
//!
//! # Example
//!
//! ```ignore
//! use bmpack::build::{BuildContext, BuildPipeline};
//! use bmpack::config::load_config;
//!
//! let config = load_config(None)?;
//! let context = BuildContext::new(config, project_root);
//! let mut pipeline = BuildPipeline::new(context);
//!
//! let result = pipeline.build()?;
//! println!("{}", result.summary());
//! ```

pub mod cleanup;
pub mod context;
pub mod discovery;
pub mod pipeline;
pub mod progress;
pub mod result;
pub mod target;

pub use cleanup::*;
pub use context::*;
pub use discovery::*;
pub use pipeline::*;
pub use result::*;
pub use target::*;
