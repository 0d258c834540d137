// SPDX-License-Identifier: MIT
//! Cubic convolution kernel (Catmull-Rom coefficients, a = -0.5).

/// Support radius of [`cubic_weight`]; samples further away contribute nothing.
pub const SUPPORT: f32 = 2.0;

/// Cubic convolution weight for a sample at signed distance `d`.
///
/// Two polynomial pieces on `|d| <= 1` and `1 < |d| <= 2`, zero beyond the
/// support. The GPU shader carries the same constants and branch thresholds;
/// change both together or the backends stop agreeing.
#[inline]
pub fn cubic_weight(d: f32) -> f32 {
    let d = d.abs();
    if d <= 1.0 {
        1.5 * d * d * d - 2.5 * d * d + 1.0
    } else if d <= SUPPORT {
        -0.5 * d * d * d + 2.5 * d * d - 4.0 * d + 2.0
    } else {
        0.0
    }
}
