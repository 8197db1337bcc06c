//! Bilinear interpolation.
//!
//! Weights the four surrounding pixel centers. A sample that gives any weight
//! to a missing pixel is itself missing.

use ndarray::ArrayView2;

use super::Interpolator;
use crate::interpolation::common;

/// Bilinear interpolator
pub struct BilinearInterpolator;

impl Interpolator for BilinearInterpolator {
    fn interpolate(&self, data: &ArrayView2<f32>, row: f64, col: f64) -> f32 {
        let (rows, cols) = data.dim();
        if !common::within_grid(row, col, rows, cols) {
            return f32::NAN;
        }

        // Edge half-pixels sample the edge value
        let row = common::clamp_index(row, rows);
        let col = common::clamp_index(col, cols);

        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        let r1 = (r0 + 1).min(rows - 1);
        let c1 = (c0 + 1).min(cols - 1);

        let (wy0, wy1) = common::linear_weight(row - r0 as f64);
        let (wx0, wx1) = common::linear_weight(col - c0 as f64);

        let corners = [
            (data[[r0, c0]], wy0 * wx0),
            (data[[r0, c1]], wy0 * wx1),
            (data[[r1, c0]], wy1 * wx0),
            (data[[r1, c1]], wy1 * wx1),
        ];

        if corners
            .iter()
            .any(|(value, weight)| *weight > 0.0 && value.is_nan())
        {
            return f32::NAN;
        }

        corners
            .iter()
            .filter(|(_, weight)| *weight > 0.0)
            .map(|(value, weight)| *value as f64 * weight)
            .sum::<f64>() as f32
    }

    fn name(&self) -> &str {
        "bilinear"
    }
}
