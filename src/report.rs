//! Report sinks for a finished [`SessionSummary`].
//!
//! The orchestrator hands the whole summary to each sink once the session
//! ends. [`ConsoleReport`] prints the per-width averages and gains.
//! [`JsonReport`] writes the gain table and timing series for plotting.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};

use crate::benchmark::{SessionSummary, WidthStatus, WidthSummary};
use crate::error::{BenchError, BenchResult};

/// Consumer of a completed session.
pub trait ReportSink {
    fn publish(&mut self, summary: &SessionSummary) -> BenchResult<()>;
}

/// Prints a human-readable table to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReport;

impl ReportSink for ConsoleReport {
    fn publish(&mut self, summary: &SessionSummary) -> BenchResult<()> {
        print!("{}", render_text(summary));
        Ok(())
    }
}

const RULE: &str = "────────────────────────────────────────────────────────────";

/// Render `summary` the way [`ConsoleReport`] prints it.
pub fn render_text(summary: &SessionSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Source: {} ({}x{}, {} channel(s)), {} trial(s) per width",
        summary.source,
        summary.source_size.w,
        summary.source_size.h,
        summary.channels,
        summary.trials
    );
    for width in &summary.widths {
        let _ = writeln!(out, "{}", RULE);
        render_width(&mut out, width, summary);
    }
    let _ = writeln!(out, "{}", RULE);
    out
}

fn render_width(out: &mut String, width: &WidthSummary, summary: &SessionSummary) {
    match &width.status {
        WidthStatus::Valid => {
            let _ = writeln!(out, "Width: {} (height {})", width.width, width.height);
            for stats in &width.stats {
                let _ = write!(
                    out,
                    "{} average time: {:.6} seconds.",
                    stats.backend, stats.avg_time
                );
                if let Some(gain) = stats.performance_gain {
                    let _ = write!(out, " Performance gain vs {}: {:.4}x", summary.reference, gain);
                }
                if let Some(mse) = stats.avg_mse {
                    let _ = write!(out, " (MSE {:.4})", mse);
                }
                if stats.samples < summary.trials {
                    let _ = write!(out, " [{} sample(s)]", stats.samples);
                }
                out.push('\n');
            }
        }
        WidthStatus::Invalid { .. } => {
            let reason = width
                .status
                .violation(width.width)
                .map(|e| e.to_string())
                .unwrap_or_default();
            let _ = writeln!(out, "Width: {} invalid: {}", width.width, reason);
        }
        WidthStatus::Failed { reason } => {
            let _ = writeln!(out, "Width: {} skipped: {}", width.width, reason);
        }
    }
}

/// Writes the session as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonReport {
    path: PathBuf,
}

impl JsonReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for JsonReport {
    fn publish(&mut self, summary: &SessionSummary) -> BenchResult<()> {
        let path = self.path.display().to_string();
        let body = serde_json::to_string_pretty(&to_json(summary))
            .map_err(|e| BenchError::output_unwritable(&path, e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| BenchError::output_unwritable(&path, e.to_string()))?;
        }
        fs::write(&self.path, body).map_err(|e| BenchError::output_unwritable(&path, e.to_string()))?;
        log::info!("report written to {}", path);
        Ok(())
    }
}

/// JSON document for `summary`.
pub fn to_json(summary: &SessionSummary) -> Value {
    let gains: Vec<Value> = summary
        .gain_table()
        .iter()
        .map(|row| {
            json!({
                "width": row.width,
                "backend": row.backend.to_string(),
                "avg_time": row.avg_time,
                "performance_gain": row.performance_gain,
            })
        })
        .collect();

    let timings: Vec<Value> = summary
        .timing_series()
        .iter()
        .map(|row| {
            json!({
                "width": row.width,
                "backend": row.backend.to_string(),
                "avg_time": row.avg_time,
            })
        })
        .collect();

    let widths: Vec<Value> = summary
        .widths
        .iter()
        .map(|w| {
            let (status, detail) = match &w.status {
                WidthStatus::Valid => ("valid", Value::Null),
                WidthStatus::Invalid { backend, trial, mse } => (
                    "invalid",
                    json!({ "backend": backend.to_string(), "trial": trial + 1, "mse": mse }),
                ),
                WidthStatus::Failed { reason } => ("failed", json!({ "reason": reason })),
            };
            json!({
                "width": w.width,
                "height": w.height,
                "status": status,
                "detail": detail,
            })
        })
        .collect();

    json!({
        "source": summary.source,
        "source_size": { "width": summary.source_size.w, "height": summary.source_size.h },
        "reference": summary.reference.to_string(),
        "trials": summary.trials,
        "performance_gain": gains,
        "timings": timings,
        "widths": widths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::{TrialRecord, aggregate};
    use bicubic_scale::{BackendKind, Size};

    fn summary() -> SessionSummary {
        let records = vec![
            TrialRecord {
                backend: BackendKind::Sequential,
                width: 640,
                trial: 0,
                elapsed_seconds: 0.8,
                pixel_error: None,
            },
            TrialRecord {
                backend: BackendKind::CpuParallel,
                width: 640,
                trial: 0,
                elapsed_seconds: 0.2,
                pixel_error: Some(0.0),
            },
        ];
        SessionSummary {
            source: "input.png".into(),
            source_size: Size { w: 1280, h: 720 },
            channels: 3,
            reference: BackendKind::Sequential,
            trials: 1,
            widths: vec![
                WidthSummary {
                    width: 640,
                    height: 360,
                    status: WidthStatus::Valid,
                    stats: aggregate(&records, BackendKind::Sequential),
                    records,
                },
                WidthSummary {
                    width: 320,
                    height: 180,
                    status: WidthStatus::Invalid {
                        backend: BackendKind::GpuParallel,
                        trial: 2,
                        mse: 0.5,
                    },
                    records: Vec::new(),
                    stats: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn test_render_text_lists_each_width() {
        let text = render_text(&summary());
        assert!(text.contains("Width: 640 (height 360)"));
        assert!(text.contains("CPU-Parallel average time: 0.200000 seconds."));
        assert!(text.contains("Performance gain vs Sequential: 4.0000x"));
        assert!(text.contains("Width: 320 invalid:"));
    }

    #[test]
    fn test_json_contains_gain_table() {
        let value = to_json(&summary());
        let gains = value["performance_gain"].as_array().unwrap();
        assert_eq!(gains.len(), 1);
        assert_eq!(gains[0]["backend"], "CPU-Parallel");
        assert_eq!(gains[0]["width"], 640);
        assert_eq!(value["timings"].as_array().unwrap().len(), 2);
        assert_eq!(value["widths"][1]["status"], "invalid");
        assert_eq!(value["widths"][1]["detail"]["trial"], 3);
    }

    #[test]
    fn test_json_report_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        let mut sink = JsonReport::new(&path);
        sink.publish(&summary()).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["source_size"]["width"], 1280);
    }
}
