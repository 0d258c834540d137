//! # Benchmark Error Handling
//!
//! Structured error type for the benchmark harness. Every variant carries an
//! [`ErrorContext`] with a timestamp, the operation in progress, a severity and
//! an optional recovery suggestion.
//!
//! ## Taxonomy
//!
//! - `InputUnavailable`: the source image could not be decoded. Fatal for
//!   that image; no partial results are produced.
//! - `OutputUnwritable`: a resized artifact could not be encoded. The trial's
//!   in-memory comparison still proceeds.
//! - `EquivalenceViolation`: a backend disagreed with the sequential
//!   reference. The width is invalidated and the session moves on.
//! - `InvalidDimensions`: a non-positive target size, rejected before any
//!   buffer is allocated.
//!
//! Nothing here is retried automatically. Re-running a trial is the
//! caller's decision.
//!
//! ## Usage
//!
//! ```rust
//! use bicubic_bench::error::{BenchError, ErrorSeverity, HasSeverity};
//!
//! let error = BenchError::input_unavailable("data/missing.png", "file not found")
//!     .with_operation("decode source image");
//!
//! assert_eq!(error.severity(), ErrorSeverity::Fatal);
//! assert!(error.to_string().contains("could not load"));
//! ```

use std::{error::Error as StdError, fmt, time::SystemTime};

use bicubic_scale::{BackendKind, ScaleError};

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// A side artifact was lost but results are intact
    Warning,
    /// Results for the current unit of work are unusable
    Error,
    /// The session cannot continue
    Fatal,
}

/// Metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Additional context about the error
    pub context: Option<String>,
    /// Suggested recovery action
    pub recovery_suggestion: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            context: None,
            recovery_suggestion: None,
            severity: ErrorSeverity::Error,
        }
    }
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }
}

/// Base error type for the benchmark harness
#[derive(Debug)]
pub enum BenchError {
    /// Source image failed to decode
    InputUnavailable {
        path: String,
        reason: String,
        context: ErrorContext,
    },
    /// Resized result could not be encoded to disk
    OutputUnwritable {
        path: String,
        reason: String,
        context: ErrorContext,
    },
    /// Nonzero pixel error between a backend and the sequential reference
    EquivalenceViolation {
        backend: BackendKind,
        width: u32,
        trial: usize,
        mse: f64,
        context: ErrorContext,
    },
    /// Non-positive target dimensions
    InvalidDimensions {
        width: u32,
        height: u32,
        context: ErrorContext,
    },
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
    /// A backend call failed outright
    Backend {
        backend: BackendKind,
        source: ScaleError,
        context: ErrorContext,
    },
}

impl BenchError {
    /// Create an input-unavailable error
    pub fn input_unavailable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InputUnavailable {
            path: path.into(),
            reason: reason.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Fatal),
        }
        .with_recovery_suggestion("Check that the path exists and names a decodable image")
    }

    /// Create an output-unwritable error
    pub fn output_unwritable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OutputUnwritable {
            path: path.into(),
            reason: reason.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Warning),
        }
        .with_recovery_suggestion("Check that the output directory exists and is writable")
    }

    /// Create an equivalence violation
    pub fn equivalence_violation(backend: BackendKind, width: u32, trial: usize, mse: f64) -> Self {
        Self::EquivalenceViolation {
            backend,
            width,
            trial,
            mse,
            context: ErrorContext::new(),
        }
        .with_recovery_suggestion("The backend diverges from the reference mapping; fix it before trusting its timings")
    }

    /// Create an invalid-dimensions error
    pub fn invalid_dimensions(width: u32, height: u32) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            context: ErrorContext::new(),
        }
    }

    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Fatal),
        }
    }

    /// Wrap a backend failure
    pub fn backend(backend: BackendKind, source: ScaleError) -> Self {
        match source {
            ScaleError::InvalidDimensions { width, height } => {
                Self::invalid_dimensions(width, height).with_operation(format!("{} resize", backend))
            }
            source => Self::Backend {
                backend,
                source,
                context: ErrorContext::new(),
            },
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Set the operation being performed
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Set recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::InputUnavailable { context, .. }
            | Self::OutputUnwritable { context, .. }
            | Self::EquivalenceViolation { context, .. }
            | Self::InvalidDimensions { context, .. }
            | Self::Config { context, .. }
            | Self::Backend { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::InputUnavailable { context, .. }
            | Self::OutputUnwritable { context, .. }
            | Self::EquivalenceViolation { context, .. }
            | Self::InvalidDimensions { context, .. }
            | Self::Config { context, .. }
            | Self::Backend { context, .. } => context,
        }
    }

    /// Short category name, used as a log prefix
    pub fn category(&self) -> &'static str {
        match self {
            Self::InputUnavailable { .. } => "input",
            Self::OutputUnwritable { .. } => "output",
            Self::EquivalenceViolation { .. } => "equivalence",
            Self::InvalidDimensions { .. } => "dimensions",
            Self::Config { .. } => "config",
            Self::Backend { .. } => "backend",
        }
    }
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchError::InputUnavailable { path, reason, .. } => {
                write!(f, "could not load '{}': {}", path, reason)
            }
            BenchError::OutputUnwritable { path, reason, .. } => {
                write!(f, "could not save '{}': {}", path, reason)
            }
            BenchError::EquivalenceViolation {
                backend,
                width,
                trial,
                mse,
                ..
            } => {
                write!(
                    f,
                    "{} output diverges from the sequential reference at width {} (trial {}, MSE {:.6})",
                    backend,
                    width,
                    trial + 1,
                    mse
                )
            }
            BenchError::InvalidDimensions { width, height, .. } => {
                write!(f, "Invalid target dimensions {}x{}", width, height)
            }
            BenchError::Config {
                field,
                value,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Configuration error in '{}': {} (value: {})",
                    field, reason, value
                )
            }
            BenchError::Backend { backend, source, .. } => {
                write!(f, "{} backend failed: {}", backend, source)
            }
        }
    }
}

impl StdError for BenchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Backend { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type BenchResult<T> = Result<T, BenchError>;

/// Trait for errors that carry a severity level
pub trait HasSeverity {
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for BenchError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

/// Trait for errors that carry a recovery suggestion
pub trait HasRecoverySuggestion {
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for BenchError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}

/// How the orchestrator reacts to each kind of failure
pub mod classify {
    use super::*;

    /// The whole session must stop.
    pub fn is_fatal(error: &BenchError) -> bool {
        error.severity() == ErrorSeverity::Fatal
    }

    /// Only the on-disk artifact is lost; timings and comparison stand.
    pub fn artifact_only(error: &BenchError) -> bool {
        matches!(error, BenchError::OutputUnwritable { .. })
    }
}
