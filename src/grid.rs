//! Source grid reconstruction.
//!
//! The granule carries no coordinate variables; pixel-center axes are rebuilt
//! from the scalar attributes of its projection-description record.

use ndarray::Array1;

use crate::error::{Result, SwradError};
use crate::projection::{GeoTransform, LccParameters};

/// Scalar attributes of the granule's projection-description record
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRecord {
    pub pixel_size: f64,
    pub image_width: f64,
    pub image_height: f64,
    pub upper_left_easting: f64,
    pub upper_left_northing: f64,
    /// LCC parameters the file declares about itself, if it declares all of them
    pub declared_lcc: Option<LccParameters>,
}

/// Regular pixel-center grid in projected meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterGrid {
    pub width: usize,
    pub height: usize,
    /// Pixel size in meters
    pub pixel_size: f64,
    /// Easting of the upper-left pixel center
    pub origin_x: f64,
    /// Northing of the upper-left pixel center
    pub origin_y: f64,
}

impl RasterGrid {
    pub fn new(
        width: usize,
        height: usize,
        pixel_size: f64,
        origin_x: f64,
        origin_y: f64,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SwradError::MalformedInput {
                message: format!("grid size must be positive, got {}x{}", width, height),
            });
        }
        if !(pixel_size.is_finite() && pixel_size > 0.0) {
            return Err(SwradError::MalformedInput {
                message: format!("pixel size must be positive, got {}", pixel_size),
            });
        }
        if !origin_x.is_finite() || !origin_y.is_finite() {
            return Err(SwradError::MalformedInput {
                message: format!("grid origin ({}, {}) is not finite", origin_x, origin_y),
            });
        }

        Ok(Self {
            width,
            height,
            pixel_size,
            origin_x,
            origin_y,
        })
    }

    /// Build the grid described by a projection record
    pub fn from_record(record: &ProjectionRecord) -> Result<Self> {
        let width = positive_count("image_width", record.image_width)?;
        let height = positive_count("image_height", record.image_height)?;
        Self::new(
            width,
            height,
            record.pixel_size,
            record.upper_left_easting,
            record.upper_left_northing,
        )
    }

    /// Pixel-center eastings, west to east
    pub fn x_axis(&self) -> Array1<f64> {
        let last = self.origin_x + self.pixel_size * (self.width - 1) as f64;
        Array1::linspace(self.origin_x, last, self.width)
    }

    /// Pixel-center northings, north to south
    pub fn y_axis(&self) -> Array1<f64> {
        let last = self.origin_y - self.pixel_size * (self.height - 1) as f64;
        Array1::linspace(self.origin_y, last, self.height)
    }

    /// Affine transform of the grid; the origin is the upper-left pixel corner
    pub fn transform(&self) -> GeoTransform {
        let half = self.pixel_size / 2.0;
        [
            self.origin_x - half,
            self.pixel_size,
            0.0,
            self.origin_y + half,
            0.0,
            -self.pixel_size,
        ]
    }

    /// Array shape as (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

fn positive_count(name: &str, value: f64) -> Result<usize> {
    if value.is_finite() && value >= 1.0 && value.fract() == 0.0 {
        Ok(value as usize)
    } else {
        Err(SwradError::MalformedInput {
            message: format!("{} must be a positive integer, got {}", name, value),
        })
    }
}
