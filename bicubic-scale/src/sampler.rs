// SPDX-License-Identifier: MIT
//! Edge-replicating channel sampler.

use crate::image::Image;

/// Channel `c` at `(x, y)`, with each coordinate clamped independently into
/// the image. Out-of-range coordinates replicate the nearest edge pixel.
#[inline]
pub fn sample_clamped(img: &Image, x: i32, y: i32, c: usize) -> f32 {
    let max_x = img.width() as i32 - 1;
    let max_y = img.height() as i32 - 1;
    let x = x.clamp(0, max_x) as u32;
    let y = y.clamp(0, max_y) as u32;
    img.get(x, y, c) as f32
}
