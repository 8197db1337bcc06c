//! In-memory fields flowing through the conversion pipeline.
//!
//! A [`ProjectedField`] always owns its coordinate reference and transform;
//! every operation that rewrites values hands both back on the result, so the
//! reference can never be lost between stages.

use ndarray::{Array2, ArrayView2, Zip};

use crate::error::{Result, SwradError};
use crate::projection::{Crs, GeoTransform};

/// The target variable exactly as stored in the granule
#[derive(Debug, Clone)]
pub struct SourceField {
    pub name: String,
    /// Stored values, `height x width`
    pub values: Array2<f64>,
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
    pub fill_value: Option<f64>,
}

impl SourceField {
    /// Unpack stored values into physical units.
    ///
    /// Fill values become NaN; everything else is `raw * scale_factor + add_offset`.
    pub fn to_physical(&self) -> Array2<f32> {
        let scale = self.scale_factor.unwrap_or(1.0);
        let offset = self.add_offset.unwrap_or(0.0);
        let fill = self.fill_value;

        self.values.mapv(|raw| {
            if raw.is_nan() || fill == Some(raw) {
                f32::NAN
            } else {
                (raw * scale + offset) as f32
            }
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }
}

/// A 2-D field with its coordinate reference and affine transform
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedField {
    pub data: Array2<f32>,
    pub crs: Crs,
    pub transform: GeoTransform,
}

impl ProjectedField {
    pub fn new(data: Array2<f32>, crs: Crs, transform: GeoTransform) -> Self {
        Self {
            data,
            crs,
            transform,
        }
    }

    /// Replace the values, keeping the reference and transform attached
    pub fn with_data(self, data: Array2<f32>) -> Result<Self> {
        if data.dim() != self.data.dim() {
            return Err(SwradError::MalformedInput {
                message: format!(
                    "replacement data shape {:?} differs from field shape {:?}",
                    data.dim(),
                    self.data.dim()
                ),
            });
        }
        Ok(Self { data, ..self })
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// (width, height) in pixels
    pub fn size(&self) -> (usize, usize) {
        let (rows, cols) = self.data.dim();
        (cols, rows)
    }

    /// Number of pixels holding a number
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }
}

/// Per-pixel validity: true where every supplied quality flag is good
#[derive(Debug, Clone, PartialEq)]
pub struct ValidityMask {
    mask: Array2<bool>,
}

impl ValidityMask {
    /// A mask that keeps every pixel
    pub fn all_valid(shape: (usize, usize)) -> Self {
        Self {
            mask: Array2::from_elem(shape, true),
        }
    }

    /// Logical AND of all flags. Each flag is (name, good-pixel array).
    pub fn from_flags(shape: (usize, usize), flags: &[(String, Array2<bool>)]) -> Result<Self> {
        let mut mask = Array2::from_elem(shape, true);
        for (name, flag) in flags {
            if flag.dim() != shape {
                return Err(SwradError::MalformedInput {
                    message: format!(
                        "quality flag '{}' has shape {:?}, expected {:?}",
                        name,
                        flag.dim(),
                        shape
                    ),
                });
            }
            Zip::from(&mut mask).and(flag).for_each(|m, &good| *m &= good);
        }
        Ok(Self { mask })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.mask.dim()
    }

    /// Number of pixels passing every flag
    pub fn valid_count(&self) -> usize {
        self.mask.iter().filter(|&&good| good).count()
    }

    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        self.mask[[row, col]]
    }

    /// Set every failing pixel to NaN; passing pixels are left untouched.
    pub fn apply(&self, field: ProjectedField) -> Result<ProjectedField> {
        if field.data.dim() != self.shape() {
            return Err(SwradError::MalformedInput {
                message: format!(
                    "mask shape {:?} differs from field shape {:?}",
                    self.shape(),
                    field.data.dim()
                ),
            });
        }

        let mut data = field.data.clone();
        Zip::from(&mut data).and(&self.mask).for_each(|value, &good| {
            if !good {
                *value = f32::NAN;
            }
        });
        field.with_data(data)
    }
}
