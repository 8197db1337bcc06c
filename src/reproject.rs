//! Warping a field from its native grid onto a north-up grid in another
//! reference system.
//!
//! The output grid follows the usual warp-output suggestion: the extent is
//! the bounding box of the transformed source edges and the pixel size keeps
//! the source's diagonal pixel count. Each output pixel center is mapped back
//! into the source grid and sampled with the chosen interpolator.

use ndarray::Array2;
use tracing::debug;

use crate::error::{Result, SwradError};
use crate::field::ProjectedField;
use crate::interpolation::Interpolator;
use crate::projection::{pixel_to_world, world_to_pixel, Crs, GeoTransform, Transformer};

/// Sample points per source edge when estimating the output extent
const EDGE_SAMPLES: usize = 21;

/// Size and placement of a warp destination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpGrid {
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
}

/// Suggest a destination grid in `target` for `field`
pub fn suggest_output_grid(field: &ProjectedField, target: &Crs) -> Result<WarpGrid> {
    let forward = Transformer::new(&field.crs, target)?;
    let (src_width, src_height) = field.size();
    let (w, h) = (src_width as f64, src_height as f64);

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut transformed = 0usize;

    for i in 0..EDGE_SAMPLES {
        let t = i as f64 / (EDGE_SAMPLES - 1) as f64;
        let edge_points = [(t * w, 0.0), (t * w, h), (0.0, t * h), (w, t * h)];

        for (col, row) in edge_points {
            let (x, y) = pixel_to_world(&field.transform, col, row);
            if let Ok((tx, ty)) = forward.transform(x, y) {
                min_x = min_x.min(tx);
                min_y = min_y.min(ty);
                max_x = max_x.max(tx);
                max_y = max_y.max(ty);
                transformed += 1;
            }
        }
    }

    if transformed == 0 || !(max_x > min_x && max_y > min_y) {
        return Err(SwradError::Projection {
            message: "no part of the source grid maps into the target reference".to_string(),
        });
    }

    let diagonal = (max_x - min_x).hypot(max_y - min_y);
    let pixel_size = diagonal / w.hypot(h);

    let width = (((max_x - min_x) / pixel_size + 0.5) as usize).max(1);
    let height = (((max_y - min_y) / pixel_size + 0.5) as usize).max(1);

    Ok(WarpGrid {
        width,
        height,
        transform: [min_x, pixel_size, 0.0, max_y, 0.0, -pixel_size],
    })
}

/// Reproject `field` into `target`.
///
/// Missing pixels stay missing, and output pixels falling outside the source
/// grid are missing too. An all-missing input yields an all-missing output.
pub fn reproject(
    field: &ProjectedField,
    target: &Crs,
    interpolator: &dyn Interpolator,
) -> Result<ProjectedField> {
    let grid = suggest_output_grid(field, target)?;
    let inverse = Transformer::new(target, &field.crs)?;
    let source = field.view();

    debug!(
        width = grid.width,
        height = grid.height,
        pixel_size = grid.transform[1],
        interpolator = interpolator.name(),
        "Warping field"
    );

    let data = Array2::from_shape_fn((grid.height, grid.width), |(row, col)| {
        let (x, y) = pixel_to_world(&grid.transform, col as f64 + 0.5, row as f64 + 0.5);
        match inverse.transform(x, y) {
            Ok((sx, sy)) => {
                let (src_col, src_row) = world_to_pixel(&field.transform, sx, sy);
                // Interpolators index pixel centers
                interpolator.interpolate(&source, src_row - 0.5, src_col - 0.5)
            }
            Err(_) => f32::NAN,
        }
    });

    Ok(ProjectedField::new(data, *target, grid.transform))
}
