//! Resampling kernels used by the reprojector.
//!
//! Indices are fractional positions in pixel-center space: `(0.0, 0.0)` is
//! the center of the upper-left pixel. Every kernel returns NaN when the
//! position falls outside the grid or when a contributing pixel is missing,
//! so masked pixels never turn into valid-looking numbers.

pub mod bilinear;
pub mod common;
pub mod nearest;

use ndarray::ArrayView2;

use crate::error::{Result, SwradError};

/// Trait for resampling methods
pub trait Interpolator: Send + Sync {
    /// Sample `data` at the fractional (row, column) position
    fn interpolate(&self, data: &ArrayView2<f32>, row: f64, col: f64) -> f32;

    /// Get the name of this interpolation method
    fn name(&self) -> &str;
}

/// Names accepted by [`get_interpolator`]
pub const INTERPOLATION_METHODS: [&str; 2] = ["nearest", "bilinear"];

/// Get an interpolator by name
pub fn get_interpolator(name: &str) -> Result<Box<dyn Interpolator>> {
    match name.to_lowercase().as_str() {
        "nearest" => Ok(Box::new(nearest::NearestInterpolator)),
        "bilinear" => Ok(Box::new(bilinear::BilinearInterpolator)),
        _ => Err(SwradError::InvalidParameter {
            param: "resampling".to_string(),
            message: format!(
                "Unknown interpolation method: {}. Must be one of: {}",
                name,
                INTERPOLATION_METHODS.join(", ")
            ),
        }),
    }
}
