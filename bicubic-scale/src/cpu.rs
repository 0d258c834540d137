// SPDX-License-Identifier: MIT
// CPU-parallel backend: fork-join over output pixel indices.
// A fresh bounded rayon pool is built per call and torn down before returning.

use rayon::prelude::*;

use crate::engine::{accumulate, to_channel, validate_request, BackendKind, ResampleBackend, ScaleError};
use crate::image::{Image, Size};

/// Channels per pixel never exceed this, so a fixed scratch array suffices.
const MAX_CHANNELS: usize = 4;

/// Partitions `0..dst_w * dst_h` across worker threads.
///
/// Each pixel's channels form one disjoint `&mut` chunk of the output, so a
/// pixel is written by exactly one worker and the buffer needs no locking.
/// Per-channel accumulators are private to each worker.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuParallelBackend {
    threads: Option<usize>,
}

impl CpuParallelBackend {
    /// Use one worker per available hardware thread.
    pub fn new() -> Self {
        Self { threads: None }
    }

    /// Bound the pool to `threads` workers. Zero falls back to the default.
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: (threads > 0).then_some(threads),
        }
    }

    pub fn threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

impl ResampleBackend for CpuParallelBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::CpuParallel
    }

    fn resize(&self, src: &Image, target: Size) -> Result<Image, ScaleError> {
        let geo = validate_request(src, target)?;
        let channels = src.channels() as usize;
        let dst_w = target.w as usize;
        let mut out = vec![0u8; target.pixel_count() * channels];

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads())
            .thread_name(|i| format!("bicubic-worker-{}", i))
            .build()
            .map_err(|e| ScaleError::ThreadPool(e.to_string()))?;

        pool.install(|| {
            out.par_chunks_mut(channels).enumerate().for_each_init(
                || [0.0f32; MAX_CHANNELS],
                |acc, (idx, pixel)| {
                    let x = (idx % dst_w) as u32;
                    let y = (idx / dst_w) as u32;
                    for c in 0..channels {
                        acc[c] = accumulate(src, &geo, x, y, c);
                        pixel[c] = to_channel(acc[c]);
                    }
                },
            );
        });

        Image::new(target.w, target.h, src.channels(), out)
    }
}
