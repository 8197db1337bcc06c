//! Nearest neighbor interpolation.
//!
//! Selects the value of the pixel containing the sample position. This is
//! the default kernel for reprojection since it never blends values.

use ndarray::ArrayView2;

use super::Interpolator;
use crate::interpolation::common;

/// Nearest neighbor interpolator
pub struct NearestInterpolator;

impl Interpolator for NearestInterpolator {
    fn interpolate(&self, data: &ArrayView2<f32>, row: f64, col: f64) -> f32 {
        let (rows, cols) = data.dim();
        if !common::within_grid(row, col, rows, cols) {
            return f32::NAN;
        }

        // Half-pixel boundaries belong to the pixel below/right, like floor(x + 0.5)
        let r = common::clamp_index((row + 0.5).floor(), rows) as usize;
        let c = common::clamp_index((col + 0.5).floor(), cols) as usize;
        data[[r, c]]
    }

    fn name(&self) -> &str {
        "nearest"
    }
}
