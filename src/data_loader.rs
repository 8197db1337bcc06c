//! NetCDF granule reading.
//!
//! Opens a GK-2A level-2 granule and pulls out the three things the pipeline
//! needs: the projection-description record, the target physical variable and
//! its quality flags. The underlying file handle is closed when the
//! [`Granule`] is dropped.

use ndarray::Array2;
use netcdf::{Attribute, Variable as NetCDFVariable};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Result, SwradError};
use crate::field::SourceField;
use crate::grid::ProjectionRecord;
use crate::projection::LccParameters;

/// An opened input granule
pub struct Granule {
    path: PathBuf,
    file: netcdf::File,
}

impl std::fmt::Debug for Granule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Granule").field("path", &self.path).finish()
    }
}

impl Granule {
    /// Open a granule for reading
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(SwradError::MalformedInput {
                message: format!("File not found: {}", path.display()),
            });
        }

        let file = netcdf::open(path).map_err(|e| SwradError::MalformedInput {
            message: format!("Failed to open NetCDF file {}: {}", path.display(), e),
        })?;

        info!("Opened NetCDF file: {}", path.display());
        debug!("File has {} variables", file.variables().count());

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Underlying netCDF handle, for inspection tools
    pub fn file(&self) -> &netcdf::File {
        &self.file
    }

    /// Read the scalar attributes of the projection-description variable
    pub fn projection_record(&self, variable: &str) -> Result<ProjectionRecord> {
        let var = self
            .file
            .variable(variable)
            .ok_or_else(|| SwradError::MissingMetadata {
                message: format!(
                    "projection variable '{}' not found in {}",
                    variable,
                    self.path.display()
                ),
            })?;

        let required = |name: &str| -> Result<f64> {
            numeric_attribute(&var, name)?.ok_or_else(|| SwradError::MissingMetadata {
                message: format!("attribute '{}' missing on '{}'", name, variable),
            })
        };

        let record = ProjectionRecord {
            pixel_size: required("pixel_size")?,
            image_width: required("image_width")?,
            image_height: required("image_height")?,
            upper_left_easting: required("upper_left_easting")?,
            upper_left_northing: required("upper_left_northing")?,
            declared_lcc: declared_lcc(&var)?,
        };

        debug!(?record, "Read projection record");
        Ok(record)
    }

    /// Read the target variable with its packing attributes
    pub fn read_field(&self, name: &str) -> Result<SourceField> {
        let var = self.required_variable(name)?;
        let values = read_2d(&var)?;

        let field = SourceField {
            name: name.to_string(),
            values,
            scale_factor: numeric_attribute(&var, "scale_factor")?,
            add_offset: numeric_attribute(&var, "add_offset")?,
            fill_value: numeric_attribute(&var, "_FillValue")?,
        };

        debug!(
            variable = name,
            shape = ?field.shape(),
            scale_factor = ?field.scale_factor,
            fill_value = ?field.fill_value,
            "Read source field"
        );
        Ok(field)
    }

    /// Read a quality flag variable; a pixel is good iff its stored value is 1
    pub fn read_flag(&self, name: &str) -> Result<Array2<bool>> {
        let var = self.required_variable(name)?;
        let values = read_2d(&var)?;
        Ok(values.mapv(|v| v == 1.0))
    }

    /// Read several quality flags, keeping their names for error reporting
    pub fn read_flags(&self, names: &[String]) -> Result<Vec<(String, Array2<bool>)>> {
        names
            .iter()
            .map(|name| Ok((name.clone(), self.read_flag(name)?)))
            .collect()
    }

    fn required_variable(&self, name: &str) -> Result<NetCDFVariable<'_>> {
        self.file
            .variable(name)
            .ok_or_else(|| SwradError::MalformedInput {
                message: format!(
                    "variable '{}' not found in {}",
                    name,
                    self.path.display()
                ),
            })
    }
}

/// Read a two-dimensional variable as f64, converting from its stored type
fn read_2d(var: &NetCDFVariable) -> Result<Array2<f64>> {
    let dims = var.dimensions();
    if dims.len() != 2 {
        return Err(SwradError::MalformedInput {
            message: format!(
                "variable '{}' has {} dimensions, expected 2",
                var.name(),
                dims.len()
            ),
        });
    }

    let shape = (dims[0].len(), dims[1].len());
    let values: Vec<f64> = var.get_values::<f64, _>(..)?;
    Ok(Array2::from_shape_vec(shape, values)?)
}

/// Read the LCC parameters a projection record declares, if it declares all of them
fn declared_lcc(var: &NetCDFVariable) -> Result<Option<LccParameters>> {
    let names = [
        "standard_parallel1",
        "standard_parallel2",
        "origin_latitude",
        "central_meridian",
        "false_easting",
        "false_northing",
    ];

    let mut values = [0.0; 6];
    for (slot, name) in values.iter_mut().zip(names) {
        match numeric_attribute(var, name)? {
            Some(v) => *slot = v,
            None => return Ok(None),
        }
    }

    Ok(Some(LccParameters {
        standard_parallel1: values[0],
        standard_parallel2: values[1],
        origin_latitude: values[2],
        central_meridian: values[3],
        false_easting: values[4],
        false_northing: values[5],
    }))
}

/// Read a numeric attribute as f64; `None` when the attribute is absent
pub fn numeric_attribute(var: &NetCDFVariable, name: &str) -> Result<Option<f64>> {
    match var.attribute(name) {
        Some(attr) => {
            let value = attribute_as_f64(&attr)?;
            if value.is_none() {
                warn!(
                    variable = %var.name(),
                    attribute = name,
                    "Attribute is not numeric, ignoring it"
                );
            }
            Ok(value)
        }
        None => Ok(None),
    }
}

/// Convert a scalar (or single-element) numeric attribute to f64
fn attribute_as_f64(attr: &Attribute) -> Result<Option<f64>> {
    use netcdf::AttributeValue as NcAttributeValue;

    let value = match attr.value()? {
        NcAttributeValue::Uchar(v) => Some(v as f64),
        NcAttributeValue::Schar(v) => Some(v as f64),
        NcAttributeValue::Ushort(v) => Some(v as f64),
        NcAttributeValue::Short(v) => Some(v as f64),
        NcAttributeValue::Uint(v) => Some(v as f64),
        NcAttributeValue::Int(v) => Some(v as f64),
        NcAttributeValue::Ulonglong(v) => Some(v as f64),
        NcAttributeValue::Longlong(v) => Some(v as f64),
        NcAttributeValue::Float(v) => Some(v as f64),
        NcAttributeValue::Double(v) => Some(v),
        NcAttributeValue::Uchars(v) => single(&v).map(|x| x as f64),
        NcAttributeValue::Schars(v) => single(&v).map(|x| x as f64),
        NcAttributeValue::Ushorts(v) => single(&v).map(|x| x as f64),
        NcAttributeValue::Shorts(v) => single(&v).map(|x| x as f64),
        NcAttributeValue::Uints(v) => single(&v).map(|x| x as f64),
        NcAttributeValue::Ints(v) => single(&v).map(|x| x as f64),
        NcAttributeValue::Ulonglongs(v) => single(&v).map(|x| x as f64),
        NcAttributeValue::Longlongs(v) => single(&v).map(|x| x as f64),
        NcAttributeValue::Floats(v) => single(&v).map(|x| x as f64),
        NcAttributeValue::Doubles(v) => single(&v),
        _ => None,
    };
    Ok(value)
}

fn single<T: Copy>(values: &[T]) -> Option<T> {
    match values {
        [v] => Some(*v),
        _ => None,
    }
}
