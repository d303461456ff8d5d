//! Build result types.
//!
//! Contains types for representing the outcome of a packing run.

use std::path::PathBuf;
use std::time::Duration;

/// Status of a single build target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// Build succeeded
    Success,
    /// Not a packable asset (missing marker file) or a dry run
    Skipped(String),
    /// Build failed with error
    Failed(String),
}

impl BuildStatus {
    /// Check if the status indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success | BuildStatus::Skipped(_))
    }

    /// Check if the asset was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, BuildStatus::Skipped(_))
    }

    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, BuildStatus::Failed(_))
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStatus::Success => write!(f, "success"),
            BuildStatus::Skipped(reason) => write!(f, "skipped: {}", reason),
            BuildStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Result of building a single target.
#[derive(Debug, Clone)]
pub struct TargetResult {
    /// Target ID that was built
    pub target_id: String,
    /// Build status
    pub status: BuildStatus,
    /// Output files produced
    pub outputs: Vec<PathBuf>,
    /// Build duration
    pub duration: Duration,
}

impl TargetResult {
    /// Create a successful result.
    pub fn success(target_id: String, outputs: Vec<PathBuf>, duration: Duration) -> Self {
        Self { target_id, status: BuildStatus::Success, outputs, duration }
    }

    /// Create a skipped result.
    pub fn skipped(target_id: String, reason: impl Into<String>) -> Self {
        Self {
            target_id,
            status: BuildStatus::Skipped(reason.into()),
            outputs: vec![],
            duration: Duration::ZERO,
        }
    }

    /// Create a failed result.
    pub fn failed(target_id: String, error: String, duration: Duration) -> Self {
        Self { target_id, status: BuildStatus::Failed(error), outputs: vec![], duration }
    }

    /// Check if this result is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Result of a complete packing run.
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Results for each target
    pub targets: Vec<TargetResult>,
    /// Pack-level warnings (e.g. stale output that could not be removed)
    pub warnings: Vec<String>,
    /// Total build duration
    pub total_duration: Duration,
}

impl BuildResult {
    /// Create a new empty build result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target result.
    pub fn add_result(&mut self, result: TargetResult) {
        self.targets.push(result);
    }

    /// Record a warning.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Get the number of successful targets.
    pub fn success_count(&self) -> usize {
        self.targets.iter().filter(|r| matches!(r.status, BuildStatus::Success)).count()
    }

    /// Get the number of skipped targets.
    pub fn skipped_count(&self) -> usize {
        self.targets.iter().filter(|r| matches!(r.status, BuildStatus::Skipped(_))).count()
    }

    /// Get the number of failed targets.
    pub fn failed_count(&self) -> usize {
        self.targets.iter().filter(|r| r.status.is_failure()).count()
    }

    /// Check if the overall build succeeded (no failures).
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Get failed target results.
    pub fn failures(&self) -> Vec<&TargetResult> {
        self.targets.iter().filter(|r| r.status.is_failure()).collect()
    }

    /// Format a summary of the build result.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        let success = self.success_count();
        let skipped = self.skipped_count();
        let failed = self.failed_count();
        let total = self.targets.len();

        if failed > 0 {
            lines.push(format!(
                "Packing failed: {} succeeded, {} skipped, {} failed ({} total)",
                success, skipped, failed, total
            ));
            for target in self.failures() {
                lines.push(format!("  - {}: {}", target.target_id, target.status));
            }
        } else {
            lines.push(format!(
                "Packing succeeded: {} built, {} skipped ({} total) in {:.2}s",
                success,
                skipped,
                total,
                self.total_duration.as_secs_f64()
            ));
        }

        if !self.warnings.is_empty() {
            lines.push(format!("Warnings ({}): ", self.warnings.len()));
            for warning in self.warnings.iter().take(5) {
                lines.push(format!("  - {}", warning));
            }
            if self.warnings.len() > 5 {
                lines.push(format!("  ... and {} more", self.warnings.len() - 5));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_status_display() {
        assert_eq!(BuildStatus::Success.to_string(), "success");
        assert_eq!(BuildStatus::Skipped("no meta.txt".to_string()).to_string(), "skipped: no meta.txt");
        assert_eq!(BuildStatus::Failed("error".to_string()).to_string(), "failed: error");
    }

    #[test]
    fn test_build_status_is_success() {
        assert!(BuildStatus::Success.is_success());
        assert!(BuildStatus::Skipped(String::new()).is_success());
        assert!(!BuildStatus::Failed("error".to_string()).is_success());
    }

    #[test]
    fn test_target_result_constructors() {
        let ok = TargetResult::success(
            "anim:Dolphin/Boot".to_string(),
            vec![PathBuf::from("frame_0.bm")],
            Duration::from_millis(10),
        );
        assert!(ok.is_success());
        assert_eq!(ok.outputs.len(), 1);

        let failed = TargetResult::failed(
            "icon:Dolphin/Common/Battery.png".to_string(),
            "bad image".to_string(),
            Duration::from_millis(1),
        );
        assert!(!failed.is_success());
        assert!(failed.outputs.is_empty());
    }

    #[test]
    fn test_build_result_counts() {
        let mut result = BuildResult::new();
        result.add_result(TargetResult::success("a".to_string(), vec![], Duration::ZERO));
        result.add_result(TargetResult::skipped("b".to_string(), "no meta.txt"));
        result.add_result(TargetResult::failed("c".to_string(), "boom".to_string(), Duration::ZERO));

        assert_eq!(result.success_count(), 1);
        assert_eq!(result.skipped_count(), 1);
        assert_eq!(result.failed_count(), 1);
        assert!(!result.is_success());
        assert_eq!(result.failures()[0].target_id, "c");
    }

    #[test]
    fn test_summary_lists_failures_and_warnings() {
        let mut result = BuildResult::new();
        result.add_result(TargetResult::failed("c".to_string(), "boom".to_string(), Duration::ZERO));
        result.add_warning("could not remove out/Dolphin".to_string());

        let summary = result.summary();
        assert!(summary.starts_with("Packing failed: 0 succeeded, 0 skipped, 1 failed (1 total)"));
        assert!(summary.contains("  - c: failed: boom"));
        assert!(summary.contains("Warnings (1)"));
    }

    #[test]
    fn test_summary_success() {
        let mut result = BuildResult::new();
        result.add_result(TargetResult::success("a".to_string(), vec![], Duration::ZERO));
        assert!(result.summary().starts_with("Packing succeeded: 1 built, 0 skipped (1 total)"));
    }
}
