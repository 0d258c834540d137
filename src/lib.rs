//! # Bicubic Resampling Benchmark
//!
//! Times three cubic convolution backends from [`bicubic_scale`] against each
//! other on real images and checks that they agree byte for byte.
//!
//! ## Architecture
//!
//! - `config`: session parameters and width parsing
//! - `codec`: image decode/encode and per-backend artifact naming
//! - `benchmark`: trial orchestration, the equivalence gate and aggregation
//! - `report`: console and JSON sinks for a finished session
//! - `error`: structured error taxonomy with severity and recovery hints
//! - `logger`: stderr backend for the `log` facade
//!
//! ## Example
//!
//! ```rust
//! use bicubic_bench::benchmark::Benchmark;
//! use bicubic_bench::{BackendKind, Image};
//! use bicubic_scale::cpu::CpuParallelBackend;
//!
//! let src = Image::new(16, 8, 3, vec![90; 16 * 8 * 3]).unwrap();
//! let bench = Benchmark::new(2).with_backend(CpuParallelBackend::new());
//! let summary = bench.run("flat", &src, &[32]);
//!
//! assert!(summary.widths[0].is_valid());
//! assert_eq!(summary.gain_table()[0].backend, BackendKind::CpuParallel);
//! ```

pub mod benchmark;
pub mod codec;
pub mod config;
pub mod error;
pub mod logger;
pub mod report;

pub use benchmark::{Benchmark, SessionSummary, run_session};
pub use bicubic_scale::{BackendKind, Image, ResampleBackend, Size};
pub use config::BenchConfig;
pub use error::{BenchError, BenchResult, HasRecoverySuggestion, HasSeverity};
pub use report::{ConsoleReport, JsonReport, ReportSink};
