//! Test data generation utilities.
//!
//! Builds small synthetic granules laid out like GK-2A level-2 shortwave
//! radiation files: a scalar projection variable carrying the grid
//! attributes, a packed `ASR` variable and two quality flag variables.

use netcdf::Error;
use std::path::Path;

type Result<T> = std::result::Result<T, Error>;

/// Stored value marking a missing `ASR` pixel
pub const FILL_VALUE: i16 = -999;

/// Packing factor of the stored `ASR` values
pub const SCALE_FACTOR: f32 = 0.1;

/// Grid pixel size in meters
pub const PIXEL_SIZE: f64 = 2000.0;

/// Contents of a synthetic granule
#[derive(Debug, Clone)]
pub struct GranuleContents {
    pub width: usize,
    pub height: usize,
    /// Physical values, row-major from the north-west corner; NaN is stored as fill
    pub values: Vec<f32>,
    pub asr_dqf: Vec<i8>,
    pub sw_dqf: Vec<i8>,
    /// Write the projection variable at all
    pub with_projection: bool,
    /// Declared image size, when it should disagree with the data
    pub declared_size: Option<(usize, usize)>,
}

impl GranuleContents {
    /// A `width x height` granule with a west-east gradient and all-good flags
    pub fn gradient(width: usize, height: usize) -> Self {
        let values = (0..height)
            .flat_map(|_| (0..width).map(move |x| 100.0 + 10.0 * x as f32))
            .collect();
        Self {
            width,
            height,
            values,
            asr_dqf: vec![1; width * height],
            sw_dqf: vec![1; width * height],
            with_projection: true,
            declared_size: None,
        }
    }

    /// Upper-left pixel center that centers the grid on the projection origin
    pub fn upper_left(&self) -> (f64, f64) {
        (
            -(self.width as f64 - 1.0) / 2.0 * PIXEL_SIZE,
            (self.height as f64 - 1.0) / 2.0 * PIXEL_SIZE,
        )
    }
}

/// Write `contents` as a netCDF granule at `path`
pub fn create_gk2a_granule(path: &Path, contents: &GranuleContents) -> Result<()> {
    let mut file = netcdf::create(path)?;

    file.add_dimension("dim_y", contents.height)?;
    file.add_dimension("dim_x", contents.width)?;
    file.add_attribute("title", "GK-2A AMI L2 SWRAD synthetic granule")?;
    file.add_attribute("institution", "swrad test suite")?;

    if contents.with_projection {
        let (width, height) = contents.declared_size.unwrap_or((contents.width, contents.height));
        let (ul_x, ul_y) = contents.upper_left();

        let mut proj = file.add_variable::<i32>("gk2a_imager_projection", &[])?;
        proj.put_attribute("grid_mapping_name", "lambert_conformal_conic")?;
        proj.put_attribute("pixel_size", PIXEL_SIZE)?;
        proj.put_attribute("image_width", width as i32)?;
        proj.put_attribute("image_height", height as i32)?;
        proj.put_attribute("upper_left_easting", ul_x)?;
        proj.put_attribute("upper_left_northing", ul_y)?;
        proj.put_attribute("standard_parallel1", 30.0f64)?;
        proj.put_attribute("standard_parallel2", 60.0f64)?;
        proj.put_attribute("origin_latitude", 38.0f64)?;
        proj.put_attribute("central_meridian", 126.0f64)?;
        proj.put_attribute("false_easting", 0.0f64)?;
        proj.put_attribute("false_northing", 0.0f64)?;
    }

    {
        let stored: Vec<i16> = contents
            .values
            .iter()
            .map(|v| {
                if v.is_nan() {
                    FILL_VALUE
                } else {
                    (v / SCALE_FACTOR).round() as i16
                }
            })
            .collect();

        let mut asr = file.add_variable::<i16>("ASR", &["dim_y", "dim_x"])?;
        asr.put_attribute("long_name", "absorbed shortwave radiation")?;
        asr.put_attribute("units", "W m-2")?;
        asr.put_attribute("scale_factor", SCALE_FACTOR)?;
        asr.put_attribute("_FillValue", FILL_VALUE)?;
        asr.put_values(&stored, &[.., ..])?;
    }

    {
        let mut dqf = file.add_variable::<i8>("ASR_DQF1", &["dim_y", "dim_x"])?;
        dqf.put_values(&contents.asr_dqf, &[.., ..])?;
    }

    {
        let mut dqf = file.add_variable::<i8>("SW_DQF", &["dim_y", "dim_x"])?;
        dqf.put_values(&contents.sw_dqf, &[.., ..])?;
    }

    Ok(())
}
