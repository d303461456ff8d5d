//! Build context containing configuration and state for a packing run.

use crate::config::loader::resolve_path;
use crate::config::PackerConfig;
use std::path::PathBuf;

/// Build context containing configuration and paths for a packing run.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// The loaded configuration
    config: PackerConfig,
    /// Directory relative input paths are resolved against
    root: PathBuf,
    /// Whether to run in verbose mode
    verbose: bool,
    /// Optional filter to build specific targets only
    target_filter: Option<Vec<String>>,
}

impl BuildContext {
    /// Create a new build context.
    ///
    /// # Arguments
    /// - `config` - The loaded configuration
    /// - `root` - Base directory for a relative `pack.input`
    pub fn new(config: PackerConfig, root: PathBuf) -> Self {
        Self { config, root, verbose: false, target_filter: None }
    }

    /// Directory whose subdirectories are packs.
    pub fn input_dir(&self) -> PathBuf {
        resolve_path(&self.root, &self.config.pack.input)
    }

    /// Output directory, resolved against the input directory.
    pub fn output_dir(&self) -> PathBuf {
        resolve_path(&self.input_dir(), &self.config.pack.output)
    }

    /// Worker threads per asset.
    pub fn jobs(&self) -> usize {
        self.config.build.jobs.max(1)
    }

    /// Whether the first failed asset aborts the run.
    pub fn is_fail_fast(&self) -> bool {
        self.config.build.fail_fast
    }

    /// Whether verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set target filter to build only specific targets.
    ///
    /// An empty list means no filter.
    pub fn with_filter(mut self, targets: Vec<String>) -> Self {
        self.target_filter = if targets.is_empty() { None } else { Some(targets) };
        self
    }

    /// Get the target filter.
    pub fn target_filter(&self) -> Option<&[String]> {
        self.target_filter.as_deref()
    }
}
