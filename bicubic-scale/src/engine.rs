// SPDX-License-Identifier: MIT
//! # Resampling Engine
//!
//! One mathematical mapping, several schedules. Every backend maps output
//! pixel `(x, y)` channel `c` through [`resample_channel`]; backends differ
//! only in how they walk the output index space.
//!
//! ## The mapping
//!
//! 1. `src_x = x * scale_x`, `src_y = y * scale_y` with `scale = src / dst`
//! 2. `x1 = floor(src_x)`, `y1 = floor(src_y)`
//! 3. sum over `m, n` in `-1..=2` of
//!    `K(src_x - (x1 + n)) * K(src_y - (y1 + m)) * S(x1 + n, y1 + m, c)`
//! 4. truncate toward zero and clamp to `0..=255`
//!
//! Downscaling applies no pre-filter, so large reductions alias. All
//! arithmetic is `f32` and evaluated in the same order everywhere, which is
//! what lets the benchmark demand a zero pixel error between backends.

use std::fmt;
use std::time::{Duration, Instant};

use crate::image::{Image, Size};
use crate::kernel::cubic_weight;
use crate::sampler::sample_clamped;

#[derive(Debug)]
pub enum ScaleError {
    /// Source buffer absent, typically because decoding failed upstream.
    MissingSource,
    InvalidDimensions { width: u32, height: u32 },
    InvalidChannels(u8),
    BufferLength { expected: usize, actual: usize },
    /// No usable compute device for the GPU backend.
    DeviceUnavailable(String),
    /// Device-side failure during dispatch or readback.
    Device(String),
    ThreadPool(String),
}

impl fmt::Display for ScaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleError::MissingSource => write!(f, "Source image is not available"),
            ScaleError::InvalidDimensions { width, height } => {
                write!(f, "Invalid dimensions {}x{}: both sides must be positive", width, height)
            }
            ScaleError::InvalidChannels(c) => {
                write!(f, "Unsupported channel count {} (expected 1-4)", c)
            }
            ScaleError::BufferLength { expected, actual } => write!(
                f,
                "Pixel buffer holds {} bytes but the image shape needs {}",
                actual, expected
            ),
            ScaleError::DeviceUnavailable(reason) => write!(f, "GPU device unavailable: {}", reason),
            ScaleError::Device(reason) => write!(f, "GPU device error: {}", reason),
            ScaleError::ThreadPool(reason) => write!(f, "Worker pool error: {}", reason),
        }
    }
}

impl std::error::Error for ScaleError {}

/// The execution strategies known to the benchmark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum BackendKind {
    /// Single thread, row-major. The canonical reference output.
    #[value(name = "sequential")]
    Sequential,
    /// Fork-join over the output pixel indices.
    #[value(name = "cpu-parallel")]
    CpuParallel,
    /// One device invocation per packed group of output channels.
    #[value(name = "gpu-parallel")]
    GpuParallel,
    /// Nearest-neighbour baseline; exempt from the equivalence gate.
    #[value(name = "nearest")]
    Nearest,
}

impl BackendKind {
    /// Short lowercase label used in artifact names and reports.
    pub fn label(self) -> &'static str {
        match self {
            BackendKind::Sequential => "serial",
            BackendKind::CpuParallel => "cpu",
            BackendKind::GpuParallel => "gpu",
            BackendKind::Nearest => "simple",
        }
    }

    /// Whether the output must match the reference byte for byte.
    pub fn is_equivalence_checked(self) -> bool {
        !matches!(self, BackendKind::Nearest)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Sequential => "Sequential",
            BackendKind::CpuParallel => "CPU-Parallel",
            BackendKind::GpuParallel => "GPU-Parallel",
            BackendKind::Nearest => "Nearest",
        };
        f.write_str(name)
    }
}

/// A scheduling strategy for the resampling mapping.
///
/// Implementations read `src` without mutating it and return a freshly
/// allocated image owned by the caller. Calls block until the output is
/// complete and resident in host memory.
pub trait ResampleBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn resize(&self, src: &Image, target: Size) -> Result<Image, ScaleError>;
}

/// Output image plus the wall-clock time spent inside the backend call.
#[derive(Debug)]
pub struct ResizeResult {
    pub image: Image,
    pub elapsed: Duration,
}

/// Run `backend` once and time only the resize call itself.
pub fn timed_resize(
    backend: &dyn ResampleBackend,
    src: &Image,
    target: Size,
) -> Result<ResizeResult, ScaleError> {
    let start = Instant::now();
    let image = backend.resize(src, target)?;
    let elapsed = start.elapsed();
    log::debug!(
        "{} resized {}x{} -> {}x{} in {:.4}s",
        backend.kind(),
        src.width(),
        src.height(),
        target.w,
        target.h,
        elapsed.as_secs_f64()
    );
    Ok(ResizeResult { image, elapsed })
}

/// Source-to-destination coordinate mapping for one resize call.
#[derive(Clone, Copy, Debug)]
pub struct Geometry {
    pub src: Size,
    pub dst: Size,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Geometry {
    pub fn new(src: Size, dst: Size) -> Self {
        Self {
            src,
            dst,
            scale_x: src.w as f32 / dst.w as f32,
            scale_y: src.h as f32 / dst.h as f32,
        }
    }
}

/// Check a request before any output buffer is allocated.
pub fn validate_request(src: &Image, target: Size) -> Result<Geometry, ScaleError> {
    if src.data().is_empty() {
        return Err(ScaleError::MissingSource);
    }
    target.ensure_positive()?;
    Ok(Geometry::new(src.size(), target))
}

/// Accumulated (unclamped) cubic convolution sum for one output channel.
#[inline]
pub fn accumulate(src: &Image, geo: &Geometry, x: u32, y: u32, c: usize) -> f32 {
    let src_x = x as f32 * geo.scale_x;
    let src_y = y as f32 * geo.scale_y;
    // Coordinates are non-negative, so truncation is floor.
    let x1 = src_x as i32;
    let y1 = src_y as i32;

    let mut value = 0.0f32;
    for m in -1..=2 {
        for n in -1..=2 {
            let weight = cubic_weight(src_x - (x1 + n) as f32) * cubic_weight(src_y - (y1 + m) as f32);
            value += sample_clamped(src, x1 + n, y1 + m, c) * weight;
        }
    }
    value
}

/// Truncate toward zero, then clamp into the 8-bit range.
#[inline]
pub fn to_channel(value: f32) -> u8 {
    (value as i32).clamp(0, 255) as u8
}

/// The full per-channel mapping shared by every bicubic backend.
#[inline]
pub fn resample_channel(src: &Image, geo: &Geometry, x: u32, y: u32, c: usize) -> u8 {
    to_channel(accumulate(src, geo, x, y, c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_channel_truncates_and_clamps() {
        assert_eq!(to_channel(199.99), 199);
        assert_eq!(to_channel(-0.7), 0);
        assert_eq!(to_channel(-30.0), 0);
        assert_eq!(to_channel(255.9), 255);
        assert_eq!(to_channel(400.0), 255);
    }

    #[test]
    fn test_geometry_scales() {
        let geo = Geometry::new(Size { w: 10, h: 20 }, Size { w: 5, h: 40 });
        assert_eq!(geo.scale_x, 2.0);
        assert_eq!(geo.scale_y, 0.5);
    }

    #[test]
    fn test_validate_rejects_zero_target() {
        let src = Image::new(2, 2, 1, vec![0; 4]).unwrap();
        assert!(matches!(
            validate_request(&src, Size { w: 0, h: 3 }),
            Err(ScaleError::InvalidDimensions { width: 0, height: 3 })
        ));
    }

    #[test]
    fn test_identity_grid_point_reproduces_source() {
        let src = Image::new(3, 3, 1, vec![10, 20, 30, 40, 50, 60, 70, 80, 90]).unwrap();
        let geo = Geometry::new(src.size(), src.size());
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(resample_channel(&src, &geo, x, y, 0), src.get(x, y, 0));
            }
        }
    }

    #[test]
    fn test_equivalence_flag() {
        assert!(BackendKind::CpuParallel.is_equivalence_checked());
        assert!(BackendKind::GpuParallel.is_equivalence_checked());
        assert!(!BackendKind::Nearest.is_equivalence_checked());
    }
}
