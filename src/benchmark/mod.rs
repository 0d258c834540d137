//! # Benchmark Orchestration
//!
//! Drives every target width through a fixed number of trials. Each trial
//! calls the sequential reference and then each candidate backend, one at a
//! time, so backends never compete for cores. Outputs of equivalence-checked
//! candidates must match the reference exactly (MSE of zero) or the width
//! is invalidated and its remaining trials are skipped.
//!
//! Per width the orchestrator walks an explicit state machine:
//!
//! ```text
//! Idle -> RunTrial(0) -> Validate(0) -> RunTrial(1) -> ... -> Aggregate
//!              |              |
//!              +--> Abort <---+
//! ```
//!
//! An abort only ends the current width. The session always moves on to the
//! next one.

pub mod metrics;
pub mod session;

use bicubic_scale::cpu::CpuParallelBackend;
use bicubic_scale::engine::timed_resize;
use bicubic_scale::naive::NearestBackend;
use bicubic_scale::plan::target_size;
use bicubic_scale::sequential::SequentialBackend;
use bicubic_scale::{BackendKind, Image, ResampleBackend, ResizeResult, Size};

use crate::codec::{self, ArtifactWriter};
use crate::config::{BenchConfig, leading_widths};
use crate::error::{BenchError, BenchResult, classify};

pub use metrics::{average, mean_squared_error, performance_gain};
pub use session::{
    BackendStats, GainRow, SessionSummary, TimingRow, TrialRecord, WidthStatus, WidthSummary,
    aggregate,
};

/// Outputs of one trial, reference first.
struct TrialOutputs {
    reference: ResizeResult,
    candidates: Vec<(BackendKind, ResizeResult)>,
}

enum WidthPhase {
    Idle,
    RunTrial(usize),
    Validate(usize, TrialOutputs),
    Aggregate,
    Abort(WidthStatus),
}

/// Reference backend, candidate backends and trial policy for a session.
pub struct Benchmark {
    reference: SequentialBackend,
    candidates: Vec<Box<dyn ResampleBackend>>,
    trials: usize,
    artifacts: Option<ArtifactWriter>,
}

impl Benchmark {
    /// A benchmark with only the reference backend and no artifact output.
    pub fn new(trials: usize) -> Self {
        Self {
            reference: SequentialBackend,
            candidates: Vec::new(),
            trials: trials.max(1),
            artifacts: None,
        }
    }

    pub fn with_backend(self, backend: impl ResampleBackend + 'static) -> Self {
        self.with_boxed_backend(Box::new(backend))
    }

    pub fn with_boxed_backend(mut self, backend: Box<dyn ResampleBackend>) -> Self {
        self.candidates.push(backend);
        self
    }

    pub fn with_artifacts(mut self, writer: ArtifactWriter) -> Self {
        self.artifacts = Some(writer);
        self
    }

    /// Assemble the backend roster described by `config`.
    ///
    /// A missing GPU is not an error: the session continues without the
    /// GPU-Parallel backend. An unusable output directory disables artifacts.
    pub fn from_config(config: &BenchConfig) -> BenchResult<Self> {
        config
            .validate()
            .map_err(|reason| {
                BenchError::config(
                    "bench",
                    format!("widths {:?}, trials {}", config.widths, config.trials),
                    reason,
                )
            })?;

        let cpu = match config.threads {
            Some(n) => CpuParallelBackend::with_threads(n),
            None => CpuParallelBackend::new(),
        };
        let mut bench = Self::new(config.trials).with_backend(cpu);

        if config.use_gpu {
            bench = bench.with_gpu_if_available();
        }
        if config.include_naive {
            bench = bench.with_backend(NearestBackend);
        }
        if config.write_artifacts {
            match ArtifactWriter::new(&config.output_dir, &config.input) {
                Ok(writer) => bench = bench.with_artifacts(writer),
                Err(e) => log::warn!("{}; continuing without artifacts", e),
            }
        }
        Ok(bench)
    }

    #[cfg(feature = "gpu")]
    fn with_gpu_if_available(self) -> Self {
        match bicubic_scale::gpu::GpuParallelBackend::new() {
            Ok(gpu) => {
                log::info!("GPU-Parallel backend on {}", gpu.adapter_name());
                self.with_backend(gpu)
            }
            Err(e) => {
                log::warn!("{}; continuing without GPU-Parallel backend", e);
                self
            }
        }
    }

    #[cfg(not(feature = "gpu"))]
    fn with_gpu_if_available(self) -> Self {
        log::warn!("built without the `gpu` feature; skipping GPU-Parallel backend");
        self
    }

    /// Reference kind followed by each candidate's kind, in call order.
    pub fn backend_kinds(&self) -> Vec<BackendKind> {
        std::iter::once(self.reference.kind())
            .chain(self.candidates.iter().map(|b| b.kind()))
            .collect()
    }

    /// Benchmark every width in order, stopping at the first zero entry.
    /// Failures are confined to their width.
    pub fn run(&self, source_name: impl Into<String>, src: &Image, widths: &[u32]) -> SessionSummary {
        let source = source_name.into();
        let active = leading_widths(widths);
        if active.len() < widths.len() {
            log::info!(
                "no more widths after {:?}; ignoring {:?}",
                active,
                &widths[active.len()..]
            );
        }
        let widths = active;
        log::info!(
            "benchmarking {} ({}x{}, {} channels) at widths {:?}, {} trial(s) each",
            source,
            src.width(),
            src.height(),
            src.channels(),
            widths,
            self.trials
        );

        let widths = widths.iter().map(|&w| self.run_width(src, w)).collect();
        SessionSummary {
            source,
            source_size: src.size(),
            channels: src.channels(),
            reference: self.reference.kind(),
            trials: self.trials,
            widths,
        }
    }

    /// Run all trials for one width.
    pub fn run_width(&self, src: &Image, width: u32) -> WidthSummary {
        let target = match target_size(src.size(), width) {
            Ok(t) => t,
            Err(e) => {
                let error = BenchError::backend(self.reference.kind(), e);
                log::warn!("width {} skipped: {}", width, error);
                return WidthSummary {
                    width,
                    height: 0,
                    status: WidthStatus::Failed {
                        reason: error.to_string(),
                    },
                    records: Vec::new(),
                    stats: Vec::new(),
                };
            }
        };

        let mut records = Vec::new();
        let mut phase = WidthPhase::Idle;
        loop {
            phase = match phase {
                WidthPhase::Idle => {
                    log::info!("width {} (height {})", target.w, target.h);
                    WidthPhase::RunTrial(0)
                }
                WidthPhase::RunTrial(trial) => match self.run_trial(src, target, width) {
                    Ok(outputs) => WidthPhase::Validate(trial, outputs),
                    Err(e) => WidthPhase::Abort(WidthStatus::Failed {
                        reason: e.to_string(),
                    }),
                },
                WidthPhase::Validate(trial, outputs) => {
                    let (trial_records, violation) = validate(&outputs, width, trial);
                    records.extend(trial_records);
                    match violation {
                        Some(status) => WidthPhase::Abort(status),
                        None if trial + 1 < self.trials => WidthPhase::RunTrial(trial + 1),
                        None => WidthPhase::Aggregate,
                    }
                }
                WidthPhase::Aggregate => {
                    let stats = aggregate(&records, self.reference.kind());
                    return WidthSummary {
                        width,
                        height: target.h,
                        status: WidthStatus::Valid,
                        records,
                        stats,
                    };
                }
                WidthPhase::Abort(status) => {
                    match status.violation(width) {
                        Some(error) => log::warn!("{}", error),
                        None => log::warn!("width {} aborted: {:?}", width, status),
                    }
                    return WidthSummary {
                        width,
                        height: target.h,
                        status,
                        records,
                        stats: Vec::new(),
                    };
                }
            };
        }
    }

    /// Call the reference then every candidate once. Only a reference
    /// failure is an error; a failing candidate just yields no output.
    fn run_trial(&self, src: &Image, target: Size, width: u32) -> BenchResult<TrialOutputs> {
        let reference = timed_resize(&self.reference, src, target)
            .map_err(|e| BenchError::backend(self.reference.kind(), e))?;
        self.write_artifact(&reference.image, self.reference.kind(), width);

        let mut candidates = Vec::with_capacity(self.candidates.len());
        for backend in &self.candidates {
            let kind = backend.kind();
            match timed_resize(backend.as_ref(), src, target) {
                Ok(result) => {
                    self.write_artifact(&result.image, kind, width);
                    candidates.push((kind, result));
                }
                Err(e) => log::warn!("{}", BenchError::backend(kind, e)),
            }
        }
        Ok(TrialOutputs {
            reference,
            candidates,
        })
    }

    fn write_artifact(&self, img: &Image, kind: BackendKind, width: u32) {
        let Some(writer) = &self.artifacts else {
            return;
        };
        match writer.write(img, kind, width) {
            Ok(_) => {}
            Err(e) if classify::artifact_only(&e) => log::warn!("[{}] {}", e.category(), e),
            Err(e) => log::error!("[{}] {}", e.category(), e),
        }
    }
}

/// Compare each candidate against the reference and record the trial.
///
/// Returns the first violation by an equivalence-checked backend, if any.
/// Records for the whole trial are kept either way.
fn validate(
    outputs: &TrialOutputs,
    width: u32,
    trial: usize,
) -> (Vec<TrialRecord>, Option<WidthStatus>) {
    let reference_kind = BackendKind::Sequential;
    let mut records = vec![TrialRecord {
        backend: reference_kind,
        width,
        trial,
        elapsed_seconds: outputs.reference.elapsed.as_secs_f64(),
        pixel_error: None,
    }];
    let mut violation = None;

    for (kind, result) in &outputs.candidates {
        let mse = mean_squared_error(&outputs.reference.image, &result.image);
        log::debug!("trial {} {}: mse {}", trial + 1, kind, mse);
        records.push(TrialRecord {
            backend: *kind,
            width,
            trial,
            elapsed_seconds: result.elapsed.as_secs_f64(),
            pixel_error: Some(mse),
        });
        if kind.is_equivalence_checked() && mse != 0.0 && violation.is_none() {
            violation = Some(WidthStatus::Invalid {
                backend: *kind,
                trial,
                mse,
            });
        }
    }
    (records, violation)
}

/// Construct a single backend by kind, for one-off resizes.
pub fn backend_for(kind: BackendKind, threads: Option<usize>) -> BenchResult<Box<dyn ResampleBackend>> {
    Ok(match kind {
        BackendKind::Sequential => Box::new(SequentialBackend),
        BackendKind::CpuParallel => Box::new(match threads {
            Some(n) => CpuParallelBackend::with_threads(n),
            None => CpuParallelBackend::new(),
        }),
        BackendKind::Nearest => Box::new(NearestBackend),
        #[cfg(feature = "gpu")]
        BackendKind::GpuParallel => Box::new(
            bicubic_scale::gpu::GpuParallelBackend::new().map_err(|e| BenchError::backend(kind, e))?,
        ),
        #[cfg(not(feature = "gpu"))]
        BackendKind::GpuParallel => {
            return Err(BenchError::backend(
                kind,
                bicubic_scale::ScaleError::DeviceUnavailable(
                    "built without the `gpu` feature".into(),
                ),
            ));
        }
    })
}

/// Load the configured image and benchmark it at every configured width.
///
/// Only an unreadable source image or an invalid configuration is fatal.
pub fn run_session(config: &BenchConfig) -> BenchResult<SessionSummary> {
    let source = codec::load_image(&config.input)
        .map_err(|e| e.with_context("loading benchmark source"))?;
    let bench = Benchmark::from_config(config)?;
    Ok(bench.run(config.input.display().to_string(), &source, &config.widths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bicubic_scale::ScaleError;

    /// Bicubic look-alike that nudges one byte so its MSE is never zero.
    /// With `only_width` set it diverges at that target width alone.
    struct Skewed {
        only_width: Option<u32>,
    }

    const SKEWED: Skewed = Skewed { only_width: None };

    impl ResampleBackend for Skewed {
        fn kind(&self) -> BackendKind {
            BackendKind::CpuParallel
        }

        fn resize(&self, src: &Image, target: Size) -> Result<Image, ScaleError> {
            let out = SequentialBackend.resize(src, target)?;
            if self.only_width.is_some_and(|w| w != target.w) {
                return Ok(out);
            }
            let (w, h, c) = (out.width(), out.height(), out.channels());
            let mut data = out.into_data();
            data[0] = data[0].wrapping_add(1);
            Image::new(w, h, c, data)
        }
    }

    struct Broken;

    impl ResampleBackend for Broken {
        fn kind(&self) -> BackendKind {
            BackendKind::GpuParallel
        }

        fn resize(&self, _src: &Image, _target: Size) -> Result<Image, ScaleError> {
            Err(ScaleError::Device("lost".into()))
        }
    }

    fn gradient(w: u32, h: u32) -> Image {
        let data = (0..w * h * 3).map(|i| (i * 7 % 251) as u8).collect();
        Image::new(w, h, 3, data).unwrap()
    }

    #[test]
    fn test_equivalent_backends_are_aggregated() {
        let bench = Benchmark::new(3)
            .with_backend(CpuParallelBackend::with_threads(2))
            .with_backend(NearestBackend);
        let summary = bench.run_width(&gradient(12, 8), 6);

        assert!(summary.is_valid());
        assert_eq!(summary.height, 4);
        assert_eq!(summary.records.len(), 9);
        let cpu = summary.stats_for(BackendKind::CpuParallel).unwrap();
        assert_eq!(cpu.samples, 3);
        assert_eq!(cpu.avg_mse, Some(0.0));
        assert!(cpu.performance_gain.is_some());
        assert!(summary.stats_for(BackendKind::Nearest).is_some());
    }

    #[test]
    fn test_violation_skips_remaining_trials() {
        let bench = Benchmark::new(5).with_backend(SKEWED);
        let summary = bench.run_width(&gradient(8, 8), 16);

        match summary.status {
            WidthStatus::Invalid { backend, trial, mse } => {
                assert_eq!(backend, BackendKind::CpuParallel);
                assert_eq!(trial, 0);
                assert!(mse > 0.0);
            }
            other => panic!("expected violation, got {:?}", other),
        }
        assert_eq!(summary.records.len(), 2);
        assert!(summary.stats.is_empty());
    }

    #[test]
    fn test_failing_candidate_is_skipped() {
        let bench = Benchmark::new(2).with_backend(Broken);
        let summary = bench.run_width(&gradient(8, 8), 4);

        assert!(summary.is_valid());
        assert_eq!(summary.stats.len(), 1);
        assert!(summary.stats_for(BackendKind::GpuParallel).is_none());
    }

    #[test]
    fn test_zero_height_width_fails_without_panicking() {
        let wide = gradient(100, 1);
        let summary = Benchmark::new(1).run_width(&wide, 10);
        assert!(matches!(summary.status, WidthStatus::Failed { .. }));
        assert!(summary.records.is_empty());
    }

    #[test]
    fn test_backend_for_cpu_kinds() {
        for kind in [BackendKind::Sequential, BackendKind::CpuParallel, BackendKind::Nearest] {
            assert_eq!(backend_for(kind, Some(2)).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_session_continues_after_invalid_width() {
        let bench = Benchmark::new(3).with_backend(Skewed {
            only_width: Some(5),
        });
        let summary = bench.run("gradient", &gradient(10, 10), &[5, 20]);

        assert_eq!(summary.widths.len(), 2);
        assert!(matches!(
            summary.widths[0].status,
            WidthStatus::Invalid { trial: 0, .. }
        ));
        assert!(summary.widths[0].stats.is_empty());

        let next = &summary.widths[1];
        assert!(next.is_valid());
        let cpu = next.stats_for(BackendKind::CpuParallel).unwrap();
        assert_eq!(cpu.samples, 3);
        assert_eq!(cpu.avg_mse, Some(0.0));
        assert_eq!(summary.gain_table().len(), 1);
        assert_eq!(summary.gain_table()[0].width, 20);
        assert_eq!(
            bench.backend_kinds(),
            vec![BackendKind::Sequential, BackendKind::CpuParallel]
        );
    }

    #[test]
    fn test_widths_after_zero_are_not_run() {
        let bench = Benchmark::new(1).with_backend(NearestBackend);
        let summary = bench.run("gradient", &gradient(16, 16), &[8, 0, 32]);

        let widths: Vec<u32> = summary.widths.iter().map(|w| w.width).collect();
        assert_eq!(widths, vec![8]);
        assert!(summary.widths[0].is_valid());
    }

    #[test]
    fn test_from_config_runs_widths_before_zero() {
        let mut config = BenchConfig::new("unused.png", vec![8, 0, 32]);
        config.use_gpu = false;
        config.write_artifacts = false;
        let bench = Benchmark::from_config(&config).unwrap();
        let summary = bench.run("gradient", &gradient(16, 16), &config.widths);
        assert_eq!(summary.widths.len(), 1);
        assert_eq!(summary.widths[0].width, 8);
    }
}
