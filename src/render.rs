//! Display range computation and colorization of the reprojected field.

use image::{ImageBuffer, Rgba, RgbaImage};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::colormaps::Colormap;

/// Gray used for missing pixels under the fixed-color policy unless configured
pub const DEFAULT_MISSING_RGB: [u8; 3] = [128, 128, 128];

/// Value range used to normalize the field before color mapping.
///
/// Always finite with `max > min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRange {
    pub min: f32,
    pub max: f32,
}

impl DisplayRange {
    /// Compute the range of a field, ignoring NaN pixels.
    ///
    /// A minimum that is NaN or infinite falls back to 0, a maximum to 1, and
    /// an empty (or, after fallback, inverted) range becomes `[min, min + 1]`.
    pub fn from_field(data: &ArrayView2<f32>) -> Self {
        let (min, max) = data
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f32::NAN, f32::NAN), |(lo, hi), &v| {
                (
                    if lo.is_nan() || v < lo { v } else { lo },
                    if hi.is_nan() || v > hi { v } else { hi },
                )
            });

        let min = if min.is_finite() { min } else { 0.0 };
        let max = if max.is_finite() { max } else { 1.0 };
        let max = if max <= min { min + 1.0 } else { max };

        Self { min, max }
    }
}

/// How pixels without a value are painted in the colorized product
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MissingPixelPolicy {
    /// Alpha 0; color channels are zero and carry no meaning
    #[default]
    Transparent,
    /// Opaque fixed color
    FixedColor { rgb: [u8; 3] },
}

impl MissingPixelPolicy {
    fn color(&self) -> [u8; 4] {
        match self {
            MissingPixelPolicy::Transparent => [0, 0, 0, 0],
            MissingPixelPolicy::FixedColor { rgb } => [rgb[0], rgb[1], rgb[2], 255],
        }
    }
}

/// Render a field into an RGBA buffer, one image pixel per field pixel.
///
/// Row 0 of the field becomes the top image row.
pub fn colorize(
    data: &ArrayView2<f32>,
    range: DisplayRange,
    colormap: &dyn Colormap,
    missing: MissingPixelPolicy,
) -> RgbaImage {
    let (rows, cols) = data.dim();
    let missing_color = missing.color();

    ImageBuffer::from_fn(cols as u32, rows as u32, |x, y| {
        let value = data[[y as usize, x as usize]];
        if value.is_nan() {
            Rgba(missing_color)
        } else {
            Rgba(colormap.map(value, range.min, range.max))
        }
    })
}
