//! # Image Codec Boundary
//!
//! Thin wrapper over the `image` crate: turns a path into an 8-bit
//! interleaved [`Image`] and back, and names the per-backend artifacts a
//! benchmark session writes.

use std::fs;
use std::path::{Path, PathBuf};

use bicubic_scale::{BackendKind, Image};
use image::{ColorType, ImageFormat};

use crate::error::{BenchError, BenchResult};

/// Decode `path` keeping its native channel count (gray, gray+alpha, RGB or
/// RGBA). Deeper formats are reduced to 8 bits per channel.
///
/// # Errors
///
/// `InputUnavailable` when the file is missing or cannot be decoded.
pub fn load_image(path: impl AsRef<Path>) -> BenchResult<Image> {
    let path = path.as_ref();
    let decoded = image::open(path)
        .map_err(|e| BenchError::input_unavailable(path.display().to_string(), e.to_string()))?;

    let (width, height, channels, data) = match decoded.color().channel_count() {
        1 => {
            let buf = decoded.into_luma8();
            (buf.width(), buf.height(), 1, buf.into_raw())
        }
        2 => {
            let buf = decoded.into_luma_alpha8();
            (buf.width(), buf.height(), 2, buf.into_raw())
        }
        3 => {
            let buf = decoded.into_rgb8();
            (buf.width(), buf.height(), 3, buf.into_raw())
        }
        _ => {
            let buf = decoded.into_rgba8();
            (buf.width(), buf.height(), 4, buf.into_raw())
        }
    };

    let image = Image::new(width, height, channels, data)
        .map_err(|e| BenchError::input_unavailable(path.display().to_string(), e.to_string()))?;
    log::debug!(
        "Loaded {} ({}x{}, {} channels)",
        path.display(),
        width,
        height,
        channels
    );
    Ok(image)
}

/// Encode `img` to `path`. The format follows the extension and falls back
/// to PNG when the extension is unknown.
///
/// # Errors
///
/// `OutputUnwritable` when encoding or writing fails.
pub fn save_image(img: &Image, path: impl AsRef<Path>) -> BenchResult<()> {
    let path = path.as_ref();
    let color = match img.channels() {
        1 => ColorType::L8,
        2 => ColorType::La8,
        3 => ColorType::Rgb8,
        _ => ColorType::Rgba8,
    };
    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
    image::save_buffer_with_format(path, img.data(), img.width(), img.height(), color, format)
        .map_err(|e| BenchError::output_unwritable(path.display().to_string(), e.to_string()))
}

/// Names and writes the per-backend artifacts of a session.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
    stem: String,
}

impl ArtifactWriter {
    /// Prepare `output_dir` (created if missing) for artifacts derived from
    /// the input file name.
    pub fn new(output_dir: impl Into<PathBuf>, input: &Path) -> BenchResult<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|e| {
            BenchError::output_unwritable(output_dir.display().to_string(), e.to_string())
                .with_operation("create output directory")
        })?;
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self { output_dir, stem })
    }

    /// `<output_dir>/<stem>_<method>_<width>.png`
    pub fn path_for(&self, backend: BackendKind, width: u32) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}_{}.png", self.stem, backend.label(), width))
    }

    /// Encode one backend result. Every trial overwrites the previous file.
    pub fn write(&self, img: &Image, backend: BackendKind, width: u32) -> BenchResult<PathBuf> {
        let path = self.path_for(backend, width);
        save_image(img, &path)?;
        Ok(path)
    }
}
