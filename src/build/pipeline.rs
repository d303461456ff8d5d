//! Build pipeline orchestration.
//!
//! The pipeline regenerates packs one at a time: the stale pack output is
//! removed, the animation manifest copied, then every asset is built.

use crate::build::cleanup::{clean_destination, CleanupStatus};
use crate::build::discovery::{sorted_frames, DiscoveryError, ANIMS_DIR, MANIFEST_FILE};
use crate::build::progress::{NullProgress, ProgressEvent, ProgressReporter};
use crate::build::{BuildContext, BuildPlan, BuildResult, BuildTarget, PackPlan, TargetKind};
use crate::build::TargetResult;
use crate::codec::{
    write_bm, write_bmx, AnimatedIconMeta, WriteError, ANIM_META_FILE, FRAME_RATE_FILE,
    ICON_META_FILE,
};
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Error that aborts a whole run.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Discovery error
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Generic build error
    #[error("Build error: {0}")]
    Build(String),
}

/// Outcome of a single asset before it is turned into a [`TargetResult`].
enum Outcome {
    Built(Vec<PathBuf>),
    Skipped(String),
}

/// Build pipeline for regenerating packs.
pub struct BuildPipeline {
    /// Build context
    context: BuildContext,
    /// Whether to plan only
    dry_run: bool,
    /// Receives progress events
    reporter: Box<dyn ProgressReporter>,
    /// Frame encoding pool, only when more than one job is configured
    pool: Option<ThreadPool>,
}

impl BuildPipeline {
    /// Create a new build pipeline.
    pub fn new(context: BuildContext) -> Self {
        Self { context, dry_run: false, reporter: Box::new(NullProgress::new()), pool: None }
    }

    /// Set dry-run mode (plan and report, write nothing).
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Attach a progress reporter.
    pub fn with_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Run the pipeline.
    ///
    /// Discovers packs, creates a build plan, and executes it.
    pub fn build(&mut self) -> Result<BuildResult, BuildError> {
        let plan = crate::build::create_build_plan(&self.context)?;

        let plan = match self.context.target_filter() {
            Some(filter) => plan.filter(filter),
            None => plan,
        };

        self.build_plan(&plan)
    }

    /// Run the pipeline with a pre-created plan.
    pub fn build_plan(&mut self, plan: &BuildPlan) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        if self.pool.is_none() && self.context.jobs() > 1 && !self.dry_run {
            let pool = ThreadPoolBuilder::new()
                .num_threads(self.context.jobs())
                .build()
                .map_err(|e| BuildError::Build(format!("Failed to start worker pool: {}", e)))?;
            self.pool = Some(pool);
        }

        let mut result = self.execute_plan(plan);
        result.total_duration = start.elapsed();

        self.reporter.report(ProgressEvent::BuildCompleted {
            success: result.is_success(),
            duration_ms: result.total_duration.as_millis() as u64,
            succeeded: result.success_count(),
            skipped: result.skipped_count(),
            failed: result.failed_count(),
        });

        Ok(result)
    }

    fn execute_plan(&self, plan: &BuildPlan) -> BuildResult {
        let mut result = BuildResult::new();

        self.reporter.report(ProgressEvent::BuildStarted {
            packs: plan.packs().len(),
            total_targets: plan.len(),
        });

        if self.context.is_verbose() {
            debug!("Build plan: {} targets", plan.len());
            for target in plan.targets() {
                debug!("  - {} ({})", target.id, target.kind);
            }
        }

        for pack in plan.packs() {
            if !self.execute_pack(pack, &mut result) {
                warn!("Stopping after first failure");
                break;
            }
        }

        result
    }

    /// Regenerate one pack. Returns false when the run must stop.
    fn execute_pack(&self, pack: &PackPlan, result: &mut BuildResult) -> bool {
        // A filtered run only touches the selected assets.
        let filtered = self.context.target_filter().is_some();
        if filtered && pack.targets.is_empty() {
            return true;
        }

        info!("Pack: '{}'", pack.name);
        self.reporter.report(ProgressEvent::PackStarted { pack: pack.name.clone() });

        if !self.dry_run {
            if !filtered {
                if let CleanupStatus::Failed(e) = clean_destination(&pack.output) {
                    self.warn(result, &pack.name, format!("stale output kept: {}", e));
                }
            }

            if let Some(manifest) = &pack.manifest {
                if let Err(e) = copy_manifest(manifest, &pack.output) {
                    self.warn(result, &pack.name, e);
                }
            }
        }

        for target in &pack.targets {
            let target_result = self.execute_target(target);
            let failed = target_result.status.is_failure();

            self.reporter.report(ProgressEvent::TargetCompleted {
                target_id: target_result.target_id.clone(),
                status: target_result.status.clone(),
                duration_ms: target_result.duration.as_millis() as u64,
            });
            result.add_result(target_result);

            if failed && self.context.is_fail_fast() {
                return false;
            }
        }

        true
    }

    fn warn(&self, result: &mut BuildResult, pack: &str, message: String) {
        warn!("{}: {}", pack, message);
        self.reporter.report(ProgressEvent::Warning {
            target_id: Some(pack.to_string()),
            message: message.clone(),
        });
        result.add_warning(format!("{}: {}", pack, message));
    }

    /// Execute a single build target.
    fn execute_target(&self, target: &BuildTarget) -> TargetResult {
        let start = Instant::now();

        if self.dry_run {
            return TargetResult::skipped(target.id.clone(), "dry run");
        }

        info!("Compile: {}", target.id);

        let outcome = match target.kind {
            TargetKind::Animation => self.build_animation(target),
            TargetKind::AnimatedIcon => self.build_animated_icon(target),
            TargetKind::StaticIcon => self.build_static_icon(target),
        };

        let duration = start.elapsed();

        match outcome {
            Ok(Outcome::Built(outputs)) => {
                debug!("  {} done in {:?}", target.id, duration);
                TargetResult::success(target.id.clone(), outputs, duration)
            }
            Ok(Outcome::Skipped(reason)) => {
                debug!("  {} skipped: {}", target.id, reason);
                TargetResult::skipped(target.id.clone(), reason)
            }
            Err(e) => {
                warn!("{} failed: {}", target.id, e);
                TargetResult::failed(target.id.clone(), e, duration)
            }
        }
    }

    /// `Anims/<name>`: copy `meta.txt` and encode every frame.
    fn build_animation(&self, target: &BuildTarget) -> Result<Outcome, String> {
        let meta = target.source.join(ANIM_META_FILE);
        if !meta.is_file() {
            return Ok(Outcome::Skipped(format!(
                "no {} in {}",
                ANIM_META_FILE,
                target.source.display()
            )));
        }

        create_dir(&target.output)?;
        let meta_out = target.output.join(ANIM_META_FILE);
        fs::copy(&meta, &meta_out)
            .map_err(|e| format!("Failed to copy {}: {}", meta.display(), e))?;

        let frames = sorted_frames(&target.source).map_err(|e| e.to_string())?;
        let mut outputs = vec![meta_out];
        outputs.extend(self.write_frames(&frames, &target.output).map_err(|e| e.to_string())?);
        Ok(Outcome::Built(outputs))
    }

    /// `Icons/<group>/<dir>`: encode every frame, then write the `meta` record.
    fn build_animated_icon(&self, target: &BuildTarget) -> Result<Outcome, String> {
        let rate_file = target.source.join(FRAME_RATE_FILE);
        if !rate_file.is_file() {
            return Ok(Outcome::Skipped(format!(
                "no {} in {}",
                FRAME_RATE_FILE,
                target.source.display()
            )));
        }

        let text = fs::read_to_string(&rate_file)
            .map_err(|e| format!("Failed to read {}: {}", rate_file.display(), e))?;
        let frame_rate: u32 = text.trim().parse().map_err(|e| {
            format!("Invalid frame rate '{}' in {}: {}", text.trim(), rate_file.display(), e)
        })?;

        let frames = sorted_frames(&target.source).map_err(|e| e.to_string())?;
        let first = frames
            .first()
            .ok_or_else(|| format!("No frames in {}", target.source.display()))?;
        let (width, height) = image::image_dimensions(first)
            .map_err(|e| format!("Failed to read {}: {}", first.display(), e))?;
        let frame_count = u32::try_from(frames.len())
            .map_err(|_| format!("Too many frames in {}", target.source.display()))?;

        create_dir(&target.output)?;
        let mut outputs = self.write_frames(&frames, &target.output).map_err(|e| e.to_string())?;

        let meta = AnimatedIconMeta { width, height, frame_rate, frame_count };
        let meta_out = target.output.join(ICON_META_FILE);
        fs::write(&meta_out, meta.to_bytes())
            .map_err(|e| format!("Failed to write {}: {}", meta_out.display(), e))?;
        outputs.push(meta_out);

        Ok(Outcome::Built(outputs))
    }

    /// `Icons/<group>/<file>`: a single BMX container.
    fn build_static_icon(&self, target: &BuildTarget) -> Result<Outcome, String> {
        if let Some(parent) = target.output.parent() {
            create_dir(parent)?;
        }
        let output = write_bmx(&target.source, &target.output).map_err(|e| e.to_string())?;
        Ok(Outcome::Built(vec![output]))
    }

    /// Encode frames into `dest`, on the worker pool when there is one.
    ///
    /// Output paths are returned in frame order either way.
    fn write_frames(&self, frames: &[PathBuf], dest: &Path) -> Result<Vec<PathBuf>, WriteError> {
        match &self.pool {
            Some(pool) if frames.len() > 1 => {
                pool.install(|| frames.par_iter().map(|frame| write_bm(frame, dest)).collect())
            }
            _ => frames.iter().map(|frame| write_bm(frame, dest)).collect(),
        }
    }
}

fn create_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create output directory {}: {}", path.display(), e))
}

fn copy_manifest(manifest: &Path, pack_output: &Path) -> Result<(), String> {
    let anims = pack_output.join(ANIMS_DIR);
    create_dir(&anims)?;
    fs::copy(manifest, anims.join(MANIFEST_FILE))
        .map(|_| ())
        .map_err(|e| format!("Failed to copy {}: {}", manifest.display(), e))
}
