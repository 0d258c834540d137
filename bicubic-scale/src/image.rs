// SPDX-License-Identifier: MIT
//! Owned 8-bit interleaved image buffers.

use crate::engine::ScaleError;

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    /// Number of pixels covered by this size.
    pub fn pixel_count(self) -> usize {
        self.w as usize * self.h as usize
    }

    pub(crate) fn ensure_positive(self) -> Result<(), ScaleError> {
        if self.w == 0 || self.h == 0 {
            return Err(ScaleError::InvalidDimensions {
                width: self.w,
                height: self.h,
            });
        }
        Ok(())
    }
}

/// Owned pixel buffer with 1 to 4 interleaved 8-bit channels per pixel.
///
/// The buffer length always equals `width * height * channels`; every
/// constructor checks it, so backends can index without bounds bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl Image {
    /// Wrap an existing buffer.
    ///
    /// # Errors
    ///
    /// - `MissingSource` for an empty buffer (nothing was decoded upstream)
    /// - `InvalidDimensions` for a zero width or height
    /// - `InvalidChannels` for a channel count outside 1..=4
    /// - `BufferLength` when the buffer does not match the declared shape
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self, ScaleError> {
        if data.is_empty() {
            return Err(ScaleError::MissingSource);
        }
        Size { w: width, h: height }.ensure_positive()?;
        if !(1..=4).contains(&channels) {
            return Err(ScaleError::InvalidChannels(channels));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(ScaleError::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn size(&self) -> Size {
        Size {
            w: self.width,
            h: self.height,
        }
    }

    /// Raw interleaved channel values, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Channel value at an in-range coordinate.
    #[inline]
    pub fn get(&self, x: u32, y: u32, c: usize) -> u8 {
        self.data[(y as usize * self.width as usize + x as usize) * self.channels as usize + c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        let err = Image::new(2, 2, 3, vec![0; 11]).unwrap_err();
        assert!(matches!(
            err,
            ScaleError::BufferLength {
                expected: 12,
                actual: 11
            }
        ));
        assert!(Image::new(2, 2, 3, vec![0; 12]).is_ok());
    }

    #[test]
    fn test_empty_buffer_is_missing_source() {
        assert!(matches!(
            Image::new(2, 2, 1, Vec::new()),
            Err(ScaleError::MissingSource)
        ));
    }

    #[test]
    fn test_rejects_bad_shape() {
        assert!(matches!(
            Image::new(0, 2, 1, vec![1]),
            Err(ScaleError::InvalidDimensions { width: 0, height: 2 })
        ));
        assert!(matches!(
            Image::new(1, 1, 5, vec![0; 5]),
            Err(ScaleError::InvalidChannels(5))
        ));
    }

    #[test]
    fn test_get_indexes_interleaved_channels() {
        let img = Image::new(2, 1, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(img.get(1, 0, 0), 3);
        assert_eq!(img.get(1, 0, 1), 4);
    }
}
