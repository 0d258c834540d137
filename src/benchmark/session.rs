//! Trial records and the per-width, per-backend aggregates built from them.

use std::collections::BTreeMap;

use bicubic_scale::{BackendKind, Size};

use super::metrics::{average, performance_gain};
use crate::error::BenchError;

/// One backend call within one trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    pub backend: BackendKind,
    pub width: u32,
    /// Zero-based trial index
    pub trial: usize,
    pub elapsed_seconds: f64,
    /// MSE against the reference output; `None` for the reference itself.
    pub pixel_error: Option<f64>,
}

/// Outcome of all trials for one target width.
#[derive(Debug, Clone, PartialEq)]
pub enum WidthStatus {
    /// Every trial ran and every checked backend matched the reference.
    Valid,
    /// A checked backend diverged; remaining trials were skipped and the
    /// width's timings are not aggregated.
    Invalid {
        backend: BackendKind,
        trial: usize,
        mse: f64,
    },
    /// The width could not be benchmarked at all (rejected dimensions or a
    /// reference failure).
    Failed { reason: String },
}

impl WidthStatus {
    /// The equivalence violation behind an `Invalid` status.
    pub fn violation(&self, width: u32) -> Option<BenchError> {
        match self {
            WidthStatus::Invalid {
                backend,
                trial,
                mse,
            } => Some(BenchError::equivalence_violation(*backend, width, *trial, *mse)),
            _ => None,
        }
    }
}

/// Averages for one backend at one width.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendStats {
    pub backend: BackendKind,
    pub avg_time: f64,
    /// `avg_reference_time / avg_time`; `None` for the reference.
    pub performance_gain: Option<f64>,
    pub avg_mse: Option<f64>,
    /// Number of trials that produced a result for this backend
    pub samples: usize,
}

/// Everything recorded for one target width.
#[derive(Debug, Clone)]
pub struct WidthSummary {
    pub width: u32,
    pub height: u32,
    pub status: WidthStatus,
    pub records: Vec<TrialRecord>,
    /// Empty unless `status` is `Valid`
    pub stats: Vec<BackendStats>,
}

impl WidthSummary {
    pub fn is_valid(&self) -> bool {
        self.status == WidthStatus::Valid
    }

    pub fn stats_for(&self, backend: BackendKind) -> Option<&BackendStats> {
        self.stats.iter().find(|s| s.backend == backend)
    }
}

/// A `{width, backend, avg_time, performance_gain}` row.
#[derive(Debug, Clone, PartialEq)]
pub struct GainRow {
    pub width: u32,
    pub backend: BackendKind,
    pub avg_time: f64,
    pub performance_gain: f64,
}

/// A `{width, backend, avg_time}` row.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingRow {
    pub width: u32,
    pub backend: BackendKind,
    pub avg_time: f64,
}

/// Result of a whole benchmark session, handed to report sinks.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    /// Human-readable name of the source image
    pub source: String,
    pub source_size: Size,
    pub channels: u8,
    /// The canonical backend every other output was compared against
    pub reference: BackendKind,
    pub trials: usize,
    pub widths: Vec<WidthSummary>,
}

impl SessionSummary {
    pub fn valid_widths(&self) -> impl Iterator<Item = &WidthSummary> {
        self.widths.iter().filter(|w| w.is_valid())
    }

    /// Performance gain of every non-reference backend at every valid width.
    pub fn gain_table(&self) -> Vec<GainRow> {
        self.valid_widths()
            .flat_map(|w| {
                w.stats.iter().filter_map(move |s| {
                    s.performance_gain.map(|gain| GainRow {
                        width: w.width,
                        backend: s.backend,
                        avg_time: s.avg_time,
                        performance_gain: gain,
                    })
                })
            })
            .collect()
    }

    /// Average time of every backend, reference included, at every valid width.
    pub fn timing_series(&self) -> Vec<TimingRow> {
        self.valid_widths()
            .flat_map(|w| {
                w.stats.iter().map(move |s| TimingRow {
                    width: w.width,
                    backend: s.backend,
                    avg_time: s.avg_time,
                })
            })
            .collect()
    }
}

/// Reduce trial records to per-backend averages and gains against `reference`.
///
/// Backends come out in [`BackendKind`] order. A backend whose calls failed
/// in some trials is averaged over the trials it completed.
pub fn aggregate(records: &[TrialRecord], reference: BackendKind) -> Vec<BackendStats> {
    let mut grouped: BTreeMap<BackendKind, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for record in records {
        let (times, errors) = grouped.entry(record.backend).or_default();
        times.push(record.elapsed_seconds);
        if let Some(mse) = record.pixel_error {
            errors.push(mse);
        }
    }

    let reference_avg = grouped
        .get(&reference)
        .and_then(|(times, _)| average(times));

    grouped
        .into_iter()
        .filter_map(|(backend, (times, errors))| {
            let avg_time = average(&times)?;
            let gain = if backend == reference {
                None
            } else {
                reference_avg.and_then(|r| performance_gain(r, avg_time))
            };
            Some(BackendStats {
                backend,
                avg_time,
                performance_gain: gain,
                avg_mse: average(&errors),
                samples: times.len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(backend: BackendKind, trial: usize, secs: f64, mse: Option<f64>) -> TrialRecord {
        TrialRecord {
            backend,
            width: 800,
            trial,
            elapsed_seconds: secs,
            pixel_error: mse,
        }
    }

    #[test]
    fn test_aggregate_five_trials() {
        let sequential = [1.0, 1.1, 0.9, 1.0, 1.0];
        let parallel = [0.25, 0.27, 0.23, 0.25, 0.25];
        let mut records = Vec::new();
        for trial in 0..5 {
            records.push(record(BackendKind::Sequential, trial, sequential[trial], None));
            records.push(record(BackendKind::CpuParallel, trial, parallel[trial], Some(0.0)));
        }

        let stats = aggregate(&records, BackendKind::Sequential);
        assert_eq!(stats.len(), 2);

        let seq = &stats[0];
        assert_eq!(seq.backend, BackendKind::Sequential);
        assert!((seq.avg_time - 1.0).abs() < 1e-12);
        assert_eq!(seq.performance_gain, None);
        assert_eq!(seq.samples, 5);

        let cpu = &stats[1];
        assert_eq!(cpu.backend, BackendKind::CpuParallel);
        assert!((cpu.avg_time - 0.25).abs() < 1e-12);
        assert!((cpu.performance_gain.unwrap() - 4.0).abs() < 1e-9);
        assert_eq!(cpu.avg_mse, Some(0.0));
    }

    #[test]
    fn test_missing_results_average_over_completed_trials() {
        let records = vec![
            record(BackendKind::Sequential, 0, 2.0, None),
            record(BackendKind::Sequential, 1, 2.0, None),
            record(BackendKind::GpuParallel, 1, 0.5, Some(0.0)),
        ];
        let stats = aggregate(&records, BackendKind::Sequential);
        let gpu = stats.iter().find(|s| s.backend == BackendKind::GpuParallel).unwrap();
        assert_eq!(gpu.samples, 1);
        assert_eq!(gpu.performance_gain, Some(4.0));
    }

    #[test]
    fn test_tables_skip_invalid_widths() {
        let valid = WidthSummary {
            width: 100,
            height: 50,
            status: WidthStatus::Valid,
            records: Vec::new(),
            stats: aggregate(
                &[
                    record(BackendKind::Sequential, 0, 1.0, None),
                    record(BackendKind::CpuParallel, 0, 0.5, Some(0.0)),
                ],
                BackendKind::Sequential,
            ),
        };
        let invalid = WidthSummary {
            width: 200,
            height: 100,
            status: WidthStatus::Invalid {
                backend: BackendKind::CpuParallel,
                trial: 0,
                mse: 3.0,
            },
            records: Vec::new(),
            stats: Vec::new(),
        };
        let summary = SessionSummary {
            source: "test".into(),
            source_size: Size { w: 10, h: 5 },
            channels: 3,
            reference: BackendKind::Sequential,
            trials: 1,
            widths: vec![valid, invalid],
        };

        assert_eq!(
            summary.gain_table(),
            vec![GainRow {
                width: 100,
                backend: BackendKind::CpuParallel,
                avg_time: 0.5,
                performance_gain: 2.0,
            }]
        );
        assert_eq!(summary.timing_series().len(), 2);
        assert!(summary.widths[1].status.violation(200).is_some());
    }
}
