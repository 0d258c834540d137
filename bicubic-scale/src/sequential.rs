// SPDX-License-Identifier: MIT
//! Single-threaded reference backend.

use crate::engine::{resample_channel, validate_request, BackendKind, ResampleBackend, ScaleError};
use crate::image::{Image, Size};

/// Row-major loop on the calling thread.
///
/// This is the canonical implementation: the benchmark compares every other
/// bicubic backend against its output and treats any difference as a defect
/// in the other backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialBackend;

impl ResampleBackend for SequentialBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sequential
    }

    fn resize(&self, src: &Image, target: Size) -> Result<Image, ScaleError> {
        let geo = validate_request(src, target)?;
        let channels = src.channels() as usize;
        let mut out = vec![0u8; target.pixel_count() * channels];

        for y in 0..target.h {
            for x in 0..target.w {
                let base = (y as usize * target.w as usize + x as usize) * channels;
                for c in 0..channels {
                    out[base + c] = resample_channel(src, &geo, x, y, c);
                }
            }
        }

        Image::new(target.w, target.h, src.channels(), out)
    }
}
