//! Pixel error and timing statistics.

use bicubic_scale::Image;

/// Mean squared channel difference between two images.
///
/// Images with different shapes are infinitely far apart: a backend that
/// returns the wrong size has diverged just as surely as one with wrong
/// pixel values.
pub fn mean_squared_error(reference: &Image, candidate: &Image) -> f64 {
    if reference.size() != candidate.size() || reference.channels() != candidate.channels() {
        return f64::INFINITY;
    }
    let total = reference.data().len();
    let sum: f64 = reference
        .data()
        .iter()
        .zip(candidate.data())
        .map(|(&a, &b)| {
            let diff = a as f64 - b as f64;
            diff * diff
        })
        .sum();
    sum / total as f64
}

/// Arithmetic mean, `None` for an empty slice.
pub fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `reference_avg / backend_avg`; above 1.0 means the backend is faster.
pub fn performance_gain(reference_avg: f64, backend_avg: f64) -> Option<f64> {
    (backend_avg > 0.0).then(|| reference_avg / backend_avg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mse_identical_is_zero() {
        let a = Image::new(2, 2, 3, vec![9; 12]).unwrap();
        assert_eq!(mean_squared_error(&a, &a.clone()), 0.0);
    }

    #[test]
    fn test_mse_value() {
        let a = Image::new(2, 1, 1, vec![10, 20]).unwrap();
        let b = Image::new(2, 1, 1, vec![13, 16]).unwrap();
        // (9 + 16) / 2
        assert_eq!(mean_squared_error(&a, &b), 12.5);
    }

    #[test]
    fn test_mse_shape_mismatch() {
        let a = Image::new(2, 1, 1, vec![0, 0]).unwrap();
        let b = Image::new(1, 2, 1, vec![0, 0]).unwrap();
        assert!(mean_squared_error(&a, &b).is_infinite());
    }

    #[test]
    fn test_average_and_gain() {
        let sequential = [1.0, 1.1, 0.9, 1.0, 1.0];
        let parallel = [0.25, 0.27, 0.23, 0.25, 0.25];
        let seq_avg = average(&sequential).unwrap();
        let par_avg = average(&parallel).unwrap();
        assert!((seq_avg - 1.0).abs() < 1e-12);
        assert!((par_avg - 0.25).abs() < 1e-12);
        assert!((performance_gain(seq_avg, par_avg).unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(average(&[]), None);
        assert_eq!(performance_gain(1.0, 0.0), None);
    }
}
