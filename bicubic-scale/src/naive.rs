// SPDX-License-Identifier: MIT
//! Nearest-neighbour baseline.
//!
//! Cheap reference point for timing and visual comparison. It does not use
//! the cubic kernel and is never compared against the bicubic backends.

use rayon::prelude::*;

use crate::engine::{validate_request, BackendKind, ResampleBackend, ScaleError};
use crate::image::{Image, Size};

#[derive(Clone, Copy, Debug, Default)]
pub struct NearestBackend;

impl ResampleBackend for NearestBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Nearest
    }

    fn resize(&self, src: &Image, target: Size) -> Result<Image, ScaleError> {
        let geo = validate_request(src, target)?;
        let channels = src.channels() as usize;
        let row_bytes = target.w as usize * channels;
        let max_x = src.width() - 1;
        let max_y = src.height() - 1;
        let mut out = vec![0u8; target.pixel_count() * channels];

        out.par_chunks_mut(row_bytes).enumerate().for_each(|(y, row)| {
            let src_y = ((y as f32 * geo.scale_y) as u32).min(max_y);
            for (x, pixel) in row.chunks_exact_mut(channels).enumerate() {
                let src_x = ((x as f32 * geo.scale_x) as u32).min(max_x);
                for (c, value) in pixel.iter_mut().enumerate() {
                    *value = src.get(src_x, src_y, c);
                }
            }
        });

        Image::new(target.w, target.h, src.channels(), out)
    }
}
