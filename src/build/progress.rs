//! Packing progress reporting.
//!
//! Reporters receive events as packs and assets are processed. The console
//! reporter prints one line per pack and per asset; the null reporter is used
//! by the library when nothing is attached.
//!
//! # Example
//!
//! ```ignore
//! use bmpack::build::progress::{ConsoleProgress, ProgressEvent, ProgressReporter};
//!
//! let reporter = ConsoleProgress::new();
//! reporter.report(ProgressEvent::BuildStarted { packs: 2, total_targets: 10 });
//! reporter.report(ProgressEvent::PackStarted { pack: "Dolphin".to_string() });
//! ```

use crate::build::BuildStatus;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Events that can be reported during a run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run started
    BuildStarted {
        /// Number of packs found
        packs: usize,
        /// Total number of assets to build
        total_targets: usize,
    },
    /// A pack is about to be regenerated
    PackStarted {
        /// Pack directory name
        pack: String,
    },
    /// An asset finished
    TargetCompleted {
        /// Target identifier
        target_id: String,
        /// Build status
        status: BuildStatus,
        /// Duration in milliseconds
        duration_ms: u64,
    },
    /// Run completed
    BuildCompleted {
        /// Whether the overall run succeeded
        success: bool,
        /// Total duration in milliseconds
        duration_ms: u64,
        /// Number of successful targets
        succeeded: usize,
        /// Number of skipped targets
        skipped: usize,
        /// Number of failed targets
        failed: usize,
    },
    /// A non-fatal problem
    Warning {
        /// Target or pack that generated the warning (if applicable)
        target_id: Option<String>,
        /// Warning message
        message: String,
    },
}

/// Trait for progress reporters.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event.
    fn report(&self, event: ProgressEvent);
}

/// A progress reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullProgress;

impl NullProgress {
    /// Create a new null progress reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NullProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Console progress reporter with optional colors.
pub struct ConsoleProgress {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to print skipped assets
    verbose: bool,
    /// Completed target count
    current: AtomicUsize,
    /// Total target count
    total: AtomicUsize,
    /// Output writer (for testing)
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ConsoleProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleProgress")
            .field("use_colors", &self.use_colors)
            .field("verbose", &self.verbose)
            .field("current", &self.current)
            .field("total", &self.total)
            .finish()
    }
}

impl ConsoleProgress {
    /// Create a new console progress reporter writing to stderr.
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
            current: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            output: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /// Create a console progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self {
            use_colors: false,
            verbose: false,
            current: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Set whether to use colors.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.color(text, "\x1b[32m")
    }

    fn yellow(&self, text: &str) -> String {
        self.color(text, "\x1b[33m")
    }

    fn red(&self, text: &str) -> String {
        self.color(text, "\x1b[31m")
    }

    fn cyan(&self, text: &str) -> String {
        self.color(text, "\x1b[36m")
    }

    fn writeln(&self, line: &str) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", line);
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::BuildStarted { packs, total_targets } => {
                self.total.store(total_targets, Ordering::SeqCst);
                self.current.store(0, Ordering::SeqCst);
                self.writeln(&format!(
                    "{} {} pack{}, {} asset{}",
                    self.cyan("[pack]"),
                    packs,
                    if packs == 1 { "" } else { "s" },
                    total_targets,
                    if total_targets == 1 { "" } else { "s" }
                ));
            }
            ProgressEvent::PackStarted { pack } => {
                self.writeln(&format!("{} Pack: '{}'", self.cyan("[pack]"), pack));
            }
            ProgressEvent::TargetCompleted { target_id, status, duration_ms } => {
                let current = self.current.fetch_add(1, Ordering::SeqCst) + 1;
                let total = self.total.load(Ordering::SeqCst);

                let status_str = match &status {
                    BuildStatus::Success => self.green("ok"),
                    BuildStatus::Skipped(_) if !self.verbose => return,
                    BuildStatus::Skipped(_) => self.yellow("skipped"),
                    BuildStatus::Failed(_) => self.red("FAILED"),
                };

                self.writeln(&format!(
                    "{} [{}/{}] {} {} ({})",
                    self.cyan("[pack]"),
                    current,
                    total,
                    status_str,
                    target_id,
                    format_duration(duration_ms)
                ));

                match status {
                    BuildStatus::Failed(err) => self.writeln(&format!("        {}", self.red(&err))),
                    BuildStatus::Skipped(reason) => {
                        self.writeln(&format!("        {}", self.yellow(&reason)))
                    }
                    BuildStatus::Success => {}
                }
            }
            ProgressEvent::BuildCompleted { success, duration_ms, succeeded, skipped, failed } => {
                let duration_str = format_duration(duration_ms);
                if success {
                    self.writeln(&format!(
                        "\n{} {} built, {} skipped in {}",
                        self.green("[done]"),
                        succeeded,
                        skipped,
                        duration_str
                    ));
                } else {
                    self.writeln(&format!(
                        "\n{} {} succeeded, {} skipped, {} {} in {}",
                        self.red("[error]"),
                        succeeded,
                        skipped,
                        failed,
                        if failed == 1 { "failure" } else { "failures" },
                        duration_str
                    ));
                }
            }
            ProgressEvent::Warning { target_id, message } => {
                let prefix = match target_id {
                    Some(id) => format!("{}: ", id),
                    None => String::new(),
                };
                self.writeln(&format!("{} {}{}", self.yellow("[warn]"), prefix, message));
            }
        }
    }
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) / 1000;
        format!("{}m {}s", minutes, seconds)
    }
}
