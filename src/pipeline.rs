//! Single-granule conversion: granule in, raw and colored GeoTIFFs out.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::colormaps::{Colormap, Jet};
use crate::config::Config;
use crate::data_loader::Granule;
use crate::error::{Result, SwradError};
use crate::field::{ProjectedField, ValidityMask};
use crate::grid::RasterGrid;
use crate::interpolation::get_interpolator;
use crate::logging::{log_conversion_stats, log_operation_end, log_operation_start, log_timed_operation};
use crate::projection::{Crs, LccParameters};
use crate::render::{colorize, DisplayRange, MissingPixelPolicy};
use crate::reproject::reproject;
use crate::writer::{write_color_raster, write_raw_raster, StagedOutputs};

/// Tolerance when comparing declared projection parameters to the fixed grid
const LCC_TOLERANCE: f64 = 1e-6;

/// Destination paths of the two products
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTargets {
    pub raw: PathBuf,
    pub colored: PathBuf,
}

impl OutputTargets {
    pub fn new(raw: impl Into<PathBuf>, colored: impl Into<PathBuf>) -> Self {
        Self {
            raw: raw.into(),
            colored: colored.into(),
        }
    }

    /// `<dir>/<basename>_raw.<ext>` and `<dir>/<basename>_jet.<ext>`
    pub fn for_basename(dir: &Path, basename: &str, extension: &str) -> Self {
        Self {
            raw: dir.join(format!("{}_raw.{}", basename, extension)),
            colored: dir.join(format!("{}_jet.{}", basename, extension)),
        }
    }
}

/// What to read from a granule and how to render it
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    pub variable: String,
    pub projection_variable: String,
    /// Quality flags combined into the validity mask; empty keeps every pixel
    pub mask_flags: Vec<String>,
    pub missing_pixels: MissingPixelPolicy,
    pub resampling: String,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ConversionOptions {
    fn from(config: &Config) -> Self {
        Self {
            variable: config.input.variable.clone(),
            projection_variable: config.input.projection_variable.clone(),
            mask_flags: config.input.mask_flags.clone(),
            missing_pixels: config.render.missing_pixels,
            resampling: config.render.resampling.clone(),
        }
    }
}

/// Outcome of a successful conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub targets: OutputTargets,
    /// Source pixels that survived unpacking and masking
    pub valid_pixels: usize,
    pub total_pixels: usize,
    pub range: DisplayRange,
    pub output_width: usize,
    pub output_height: usize,
}

/// Convert one granule into its two products.
///
/// On error neither target is created or replaced.
pub fn convert_file(
    input: &Path,
    targets: &OutputTargets,
    options: &ConversionOptions,
) -> Result<ConversionReport> {
    let start = Instant::now();
    log_operation_start("convert", Some(&input.display().to_string()));

    let result = run_conversion(input, targets, options);
    log_operation_end("convert", start, result.is_ok());

    let report = result?;
    log_conversion_stats(&report);
    Ok(report)
}

fn run_conversion(
    input: &Path,
    targets: &OutputTargets,
    options: &ConversionOptions,
) -> Result<ConversionReport> {
    let interpolator = get_interpolator(&options.resampling)?;
    let source = load_masked_field(input, options)?;
    let valid_pixels = source.valid_count();
    let total_pixels = source.data.len();

    if valid_pixels == 0 {
        warn!(input = %input.display(), "No valid pixels after masking");
    }

    let projected = log_timed_operation("reproject", || {
        reproject(&source, &Crs::Geographic, interpolator.as_ref())
    })?;
    let (output_width, output_height) = projected.size();

    let range = emit_products(&projected, targets, options.missing_pixels)?;

    Ok(ConversionReport {
        input: input.to_path_buf(),
        targets: targets.clone(),
        valid_pixels,
        total_pixels,
        range,
        output_width,
        output_height,
    })
}

/// Read, unpack and mask the target variable on its native grid.
///
/// The granule is closed before this returns.
pub fn load_masked_field(input: &Path, options: &ConversionOptions) -> Result<ProjectedField> {
    let granule = Granule::open(input)?;
    let record = granule.projection_record(&options.projection_variable)?;
    let grid = RasterGrid::from_record(&record)?;

    if let Some(declared) = record.declared_lcc {
        if !declared.approx_eq(&LccParameters::GK2A, LCC_TOLERANCE) {
            warn!(
                ?declared,
                "Granule declares projection parameters that differ from the fixed GK-2A grid; using the fixed grid"
            );
        }
    }

    let source = granule.read_field(&options.variable)?;
    if source.shape() != grid.shape() {
        return Err(SwradError::MalformedInput {
            message: format!(
                "variable '{}' has shape {:?} but the projection record describes {:?}",
                source.name,
                source.shape(),
                grid.shape()
            ),
        });
    }

    let mask = if options.mask_flags.is_empty() {
        ValidityMask::all_valid(grid.shape())
    } else {
        let flags = granule.read_flags(&options.mask_flags)?;
        ValidityMask::from_flags(grid.shape(), &flags)?
    };

    let field = ProjectedField::new(source.to_physical(), Crs::gk2a_lcc(), grid.transform());
    mask.apply(field)
}

/// Compute the display range, write both products and commit them together.
pub fn emit_products(
    field: &ProjectedField,
    targets: &OutputTargets,
    missing: MissingPixelPolicy,
) -> Result<DisplayRange> {
    let range = DisplayRange::from_field(&field.view());
    info!(
        min = range.min,
        max = range.max,
        colormap = Jet.name(),
        "Display range"
    );

    let mut staged = StagedOutputs::new();
    let raw_staging = staged.stage(&targets.raw)?;
    let colored_staging = staged.stage(&targets.colored)?;

    log_timed_operation("write_raw", || write_raw_raster(field, &raw_staging))?;

    let image = colorize(&field.view(), range, &Jet, missing);
    log_timed_operation("write_colored", || {
        write_color_raster(&image, &field.crs, &field.transform, &colored_staging)
    })?;

    staged.commit()?;
    Ok(range)
}
