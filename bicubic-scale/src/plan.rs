// SPDX-License-Identifier: MIT
//! # Target Size Planning
//!
//! Callers pick a target width; the height follows from the source aspect
//! ratio. Backends never recompute it, they only receive the final [`Size`].

use crate::engine::ScaleError;
use crate::image::Size;

/// Height-to-width ratio of `src`.
pub fn aspect_ratio(src: Size) -> f64 {
    src.h as f64 / src.w as f64
}

/// Aspect-preserving target for `width`: `round(width * src.h / src.w)`.
///
/// # Errors
///
/// `InvalidDimensions` when the width is zero or the rounded height
/// collapses to zero (extremely wide sources at tiny widths).
pub fn target_size(src: Size, width: u32) -> Result<Size, ScaleError> {
    src.ensure_positive()?;
    let h = (width as f64 * aspect_ratio(src)).round() as u32;
    let out = Size { w: width, h };
    out.ensure_positive()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_aspect_ratio() {
        let src = Size { w: 1920, h: 1080 };
        assert_eq!(target_size(src, 640).unwrap(), Size { w: 640, h: 360 });
        assert_eq!(target_size(src, 3840).unwrap(), Size { w: 3840, h: 2160 });
    }

    #[test]
    fn test_rounds_to_nearest() {
        // 100 * 2 / 3 = 66.67
        let src = Size { w: 3, h: 2 };
        assert_eq!(target_size(src, 100).unwrap().h, 67);
        // 10 * 1 / 4 = 2.5 rounds away from zero
        let src = Size { w: 4, h: 1 };
        assert_eq!(target_size(src, 10).unwrap().h, 3);
    }

    #[test]
    fn test_every_target_matches_formula() {
        let src = Size { w: 777, h: 333 };
        let widths = [3, 50, 400, 1001, 5000];
        for width in widths {
            let size = target_size(src, width).unwrap();
            let expected = (width as f64 * 333.0 / 777.0).round() as u32;
            assert_eq!(size.h, expected);
        }
    }

    #[test]
    fn test_collapsed_height_rejected() {
        let src = Size { w: 1000, h: 1 };
        assert!(matches!(
            target_size(src, 10),
            Err(ScaleError::InvalidDimensions { width: 10, height: 0 })
        ));
        assert!(target_size(src, 0).is_err());
    }
}
