//! GeoTIFF output.
//!
//! Both products of a conversion are written to staging files next to their
//! targets and only renamed into place once every product has been written,
//! so a failed conversion never leaves a half-written product at a target
//! path.

use std::path::{Path, PathBuf};

use gdal::raster::{Buffer, ColorInterpretation, GdalType, RasterCreationOption};
use gdal::{Dataset, DriverManager};
use image::RgbaImage;
use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::error::{Result, SwradError};
use crate::field::ProjectedField;
use crate::projection::{Crs, GeoTransform};

const RAW_OPTIONS: [RasterCreationOption<'static>; 1] = [RasterCreationOption {
    key: "COMPRESS",
    value: "DEFLATE",
}];

// ALPHA=YES tags band 4 as an alpha sample (TIFF ExtraSamples = 2), not unspecified data;
// color bands are not premultiplied
const COLOR_OPTIONS: [RasterCreationOption<'static>; 3] = [
    RasterCreationOption {
        key: "PHOTOMETRIC",
        value: "RGB",
    },
    RasterCreationOption {
        key: "ALPHA",
        value: "YES",
    },
    RasterCreationOption {
        key: "COMPRESS",
        value: "DEFLATE",
    },
];

const COLOR_BANDS: [ColorInterpretation; 4] = [
    ColorInterpretation::RedBand,
    ColorInterpretation::GreenBand,
    ColorInterpretation::BlueBand,
    ColorInterpretation::AlphaBand,
];

/// Write a single-band float32 raster; NaN is declared as nodata.
pub fn write_raw_raster(field: &ProjectedField, path: &Path) -> Result<()> {
    let (width, height) = field.size();
    let mut dataset = create_dataset::<f32>(path, width, height, 1, &RAW_OPTIONS)?;
    georeference(&mut dataset, &field.crs, &field.transform, path)?;

    let values: Vec<f32> = field.data.iter().copied().collect();
    let mut band = dataset.rasterband(1).map_err(|e| write_failure(path, e))?;
    band.write((0, 0), (width, height), &Buffer::new((width, height), values))
        .map_err(|e| write_failure(path, e))?;
    band.set_no_data_value(Some(f64::NAN))
        .map_err(|e| write_failure(path, e))?;

    debug!(path = %path.display(), width, height, "Wrote raw raster");
    Ok(())
}

/// Write a 4-band byte raster (red, green, blue, associated alpha).
pub fn write_color_raster(
    image: &RgbaImage,
    crs: &Crs,
    transform: &GeoTransform,
    path: &Path,
) -> Result<()> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let mut dataset = create_dataset::<u8>(path, width, height, 4, &COLOR_OPTIONS)?;
    georeference(&mut dataset, crs, transform, path)?;

    let raw = image.as_raw();
    for (index, interpretation) in COLOR_BANDS.into_iter().enumerate() {
        let channel: Vec<u8> = raw.iter().skip(index).step_by(4).copied().collect();
        let mut band = dataset
            .rasterband(index as isize + 1)
            .map_err(|e| write_failure(path, e))?;
        band.write((0, 0), (width, height), &Buffer::new((width, height), channel))
            .map_err(|e| write_failure(path, e))?;
        band.set_color_interpretation(interpretation)
            .map_err(|e| write_failure(path, e))?;
    }

    debug!(path = %path.display(), width, height, "Wrote colored raster");
    Ok(())
}

fn create_dataset<T: GdalType>(
    path: &Path,
    width: usize,
    height: usize,
    bands: isize,
    options: &[RasterCreationOption],
) -> Result<Dataset> {
    let driver = DriverManager::get_driver_by_name("GTiff").map_err(|e| write_failure(path, e))?;
    driver
        .create_with_band_type_with_options::<T, _>(
            path,
            width as isize,
            height as isize,
            bands,
            options,
        )
        .map_err(|e| write_failure(path, e))
}

fn georeference(
    dataset: &mut Dataset,
    crs: &Crs,
    transform: &GeoTransform,
    path: &Path,
) -> Result<()> {
    dataset
        .set_geo_transform(transform)
        .map_err(|e| write_failure(path, e))?;
    let srs = crs.to_spatial_ref().map_err(|e| write_failure(path, e))?;
    dataset
        .set_spatial_ref(&srs)
        .map_err(|e| write_failure(path, e))
}

fn write_failure(path: &Path, error: impl std::fmt::Display) -> SwradError {
    SwradError::WriteFailure {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

/// Staging files for a set of outputs that must appear together.
///
/// Files staged but never committed are removed on drop.
#[derive(Debug, Default)]
pub struct StagedOutputs {
    entries: Vec<(PathBuf, PathBuf)>,
    committed: bool,
}

impl StagedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a hidden staging path next to `target` and return it
    pub fn stage(&mut self, target: &Path) -> Result<PathBuf> {
        let file_name = target
            .file_name()
            .ok_or_else(|| SwradError::WriteFailure {
                path: target.to_path_buf(),
                message: "output path has no file name".to_string(),
            })?;

        let staging = hidden_sibling(target, &file_name.to_string_lossy(), "partial");
        self.entries.push((staging.clone(), target.to_path_buf()));
        Ok(staging)
    }

    /// Move every staged file onto its target.
    ///
    /// Existing targets are set aside first. If any step fails, targets
    /// committed in this call are removed and the previous files put back, so
    /// either every output is replaced or none is.
    pub fn commit(mut self) -> Result<()> {
        let entries = std::mem::take(&mut self.entries);
        let mut committed: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(entries.len());

        for (staging, target) in &entries {
            let backup = match set_aside(target) {
                Ok(backup) => backup,
                Err(e) => {
                    roll_back(&committed, &entries);
                    return Err(write_failure(target, e));
                }
            };
            committed.push((target.as_path(), backup));
            if let Err(e) = std::fs::rename(staging, target) {
                roll_back(&committed, &entries);
                return Err(write_failure(target, e));
            }
        }

        self.committed = true;
        for (target, backup) in &committed {
            if let Some(backup) = backup {
                remove_quietly(backup);
            }
            info!(path = %target.display(), "Committed output");
        }
        Ok(())
    }
}

impl Drop for StagedOutputs {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for (staging, _) in &self.entries {
            remove_quietly(staging);
        }
    }
}

fn hidden_sibling(target: &Path, file_name: &str, suffix: &str) -> PathBuf {
    target.with_file_name(format!(".{file_name}.{suffix}"))
}

/// Move an existing `target` to a hidden backup and return where it went
fn set_aside(target: &Path) -> std::io::Result<Option<PathBuf>> {
    let Some(file_name) = target.file_name() else {
        return Ok(None);
    };
    if !target.exists() {
        return Ok(None);
    }
    let backup = hidden_sibling(target, &file_name.to_string_lossy(), "previous");
    std::fs::rename(target, &backup)?;
    Ok(Some(backup))
}

/// Undo a partial commit: drop new targets, restore backups, clear staging
fn roll_back(committed: &[(&Path, Option<PathBuf>)], entries: &[(PathBuf, PathBuf)]) {
    for (target, backup) in committed.iter().rev() {
        remove_quietly(target);
        if let Some(backup) = backup {
            if let Err(e) = std::fs::rename(backup, target) {
                warn!(
                    path = %target.display(),
                    backup = %backup.display(),
                    error = %e,
                    "Failed to restore previous output"
                );
            }
        }
    }
    for (staging, _) in entries {
        remove_quietly(staging);
    }
}

fn remove_quietly(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "Failed to remove leftover file");
        }
    }
}

/// Read one band of a raster into a `height x width` array
pub fn read_band<T: GdalType + Copy>(path: &Path, band_index: isize) -> Result<Array2<T>> {
    let dataset = Dataset::open(path)?;
    let (width, height) = dataset.raster_size();
    let band = dataset.rasterband(band_index)?;
    let buffer = band.read_as::<T>((0, 0), (width, height), (width, height), None)?;
    Ok(Array2::from_shape_vec((height, width), buffer.data)?)
}

/// Georeferencing and layout of a written raster
#[derive(Debug, PartialEq)]
pub struct RasterSummary {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub epsg: Option<i32>,
    pub transform: GeoTransform,
    pub color_interpretations: Vec<ColorInterpretation>,
    pub no_data: Option<f64>,
}

/// Describe a raster on disk
pub fn summarize_raster(path: &Path) -> Result<RasterSummary> {
    let dataset = Dataset::open(path)?;
    let (width, height) = dataset.raster_size();
    let band_count = dataset.raster_count().max(0) as usize;

    let mut color_interpretations = Vec::with_capacity(band_count);
    let mut no_data = None;
    for index in 1..=band_count {
        let band = dataset.rasterband(index as isize)?;
        color_interpretations.push(band.color_interpretation());
        if index == 1 {
            no_data = band.no_data_value();
        }
    }

    let epsg = dataset
        .spatial_ref()
        .ok()
        .and_then(|srs| srs.auth_code().ok());

    Ok(RasterSummary {
        width,
        height,
        band_count,
        epsg,
        transform: dataset.geo_transform()?,
        color_interpretations,
        no_data,
    })
}
