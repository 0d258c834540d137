//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use bicubic_bench::Image;
use bicubic_bench::codec::save_image;

/// Deterministic high-frequency content, so any resampling difference shows.
pub fn noise_image(w: u32, h: u32, channels: u8, seed: u32) -> Image {
    let mut state = seed.max(1);
    let data = (0..w * h * channels as u32)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    Image::new(w, h, channels, data).unwrap()
}

pub fn constant_image(w: u32, h: u32, channels: u8, value: u8) -> Image {
    Image::new(w, h, channels, vec![value; (w * h * channels as u32) as usize]).unwrap()
}

/// Write `img` as PNG under `dir` and return its path.
pub fn write_png(dir: &Path, name: &str, img: &Image) -> PathBuf {
    let path = dir.join(name);
    save_image(img, &path).unwrap();
    path
}
