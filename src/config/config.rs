//! # Benchmark Configuration
//!
//! Configuration structure and validation for a benchmark session. It is the
//! common interface between the command line front end and the orchestrator.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Range | Description |
//! |-----------|------|-------|-------------|
//! | `input` | `PathBuf` | Any decodable image | Source image |
//! | `output_dir` | `PathBuf` | Writable directory | Where per-backend artifacts land |
//! | `widths` | `Vec<u32>` | 1-5 entries, each > 0 | Target widths, height follows aspect ratio |
//! | `trials` | `usize` | >= 1 | Repetitions per width (default 5) |
//! | `use_gpu` | `bool` | | Include the GPU-parallel backend |
//! | `include_naive` | `bool` | | Also time the nearest-neighbour baseline |
//! | `write_artifacts` | `bool` | | Encode every backend result to disk |
//! | `threads` | `Option<usize>` | >= 1 | CPU-parallel worker count |
//! | `report` | `Option<PathBuf>` | | JSON report destination |
//!
//! ## Examples
//!
//! ```rust
//! use bicubic_bench::config::{BenchConfig, parse_widths};
//!
//! let mut config = BenchConfig::default();
//! config.widths = parse_widths("640, 1280, 0, 2560");
//! assert_eq!(config.widths, vec![640, 1280]);
//! assert!(config.validate().is_ok());
//! ```

use std::path::PathBuf;

/// Upper bound on target widths per session.
pub const MAX_WIDTHS: usize = 5;

/// Repetitions per width unless overridden.
pub const DEFAULT_TRIALS: usize = 5;

/// Configuration for one benchmark session.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Source image path.
    pub input: PathBuf,

    /// Directory receiving `<stem>_<method>_<width>.png` artifacts.
    pub output_dir: PathBuf,

    /// Target widths in run order.
    ///
    /// At most [`MAX_WIDTHS`] entries, all positive. Use [`parse_widths`]
    /// to build this from user input.
    pub widths: Vec<u32>,

    /// Trials per width.
    pub trials: usize,

    /// Include the GPU-parallel backend when a device is available.
    pub use_gpu: bool,

    /// Include the nearest-neighbour baseline.
    pub include_naive: bool,

    /// Encode every backend's output each trial.
    pub write_artifacts: bool,

    /// Worker count for the CPU-parallel backend; `None` uses all cores.
    pub threads: Option<usize>,

    /// Optional JSON report destination.
    pub report: Option<PathBuf>,
}

impl Default for BenchConfig {
    /// Defaults mirror the classic run: five trials, every backend, artifacts
    /// in `output/`.
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/input.png"),
            output_dir: PathBuf::from("output"),
            widths: vec![1000],
            trials: DEFAULT_TRIALS,
            use_gpu: true,
            include_naive: true,
            write_artifacts: true,
            threads: None,
            report: None,
        }
    }
}

impl BenchConfig {
    /// Creates a configuration with default flags for the given input and widths.
    pub fn new(input: impl Into<PathBuf>, widths: Vec<u32>) -> Self {
        Self {
            input: input.into(),
            widths,
            ..Self::default()
        }
    }

    /// Widths that will actually run: everything before the first zero.
    pub fn active_widths(&self) -> &[u32] {
        leading_widths(&self.widths)
    }

    /// Validates the configuration parameters.
    ///
    /// Entries after a zero width are ignored, so only the leading run of
    /// positive widths is checked.
    pub fn validate(&self) -> Result<(), String> {
        let widths = self.active_widths();
        if widths.is_empty() {
            return Err("At least one positive target width is required".to_string());
        }
        if widths.len() > MAX_WIDTHS {
            return Err(format!("At most {} target widths are supported", MAX_WIDTHS));
        }
        if self.trials == 0 {
            return Err("Trials must be greater than 0".to_string());
        }
        if self.threads == Some(0) {
            return Err("Thread count must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Widths up to, not including, the first zero entry.
pub fn leading_widths(widths: &[u32]) -> &[u32] {
    let end = widths.iter().position(|&w| w == 0).unwrap_or(widths.len());
    &widths[..end]
}

/// Parse a comma separated width list such as `"800, 1600,3200"`.
///
/// Keeps at most [`MAX_WIDTHS`] values and stops at the first entry that is
/// non-positive or not a valid `u32`; everything after it is ignored.
pub fn parse_widths(input: &str) -> Vec<u32> {
    input
        .split(',')
        .map_while(|s| s.trim().parse::<u32>().ok().filter(|&w| w > 0))
        .take(MAX_WIDTHS)
        .collect()
}
