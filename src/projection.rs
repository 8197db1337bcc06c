//! Coordinate reference systems and coordinate transforms.
//!
//! The satellite grid is always the fixed GK-2A Lambert Conformal Conic
//! definition; products are always written in geographic longitude/latitude.
//! All coordinate pairs in this module are ordered (x, y): easting/northing in
//! the projected system, longitude/latitude in the geographic one.

use gdal::spatial_ref::SpatialRef;
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::error::{Result, SwradError};

/// GDAL-ordered affine transform:
/// `[origin_x, pixel_width, row_rotation, origin_y, column_rotation, pixel_height]`.
pub type GeoTransform = [f64; 6];

/// EPSG code of the geographic output system
pub const EPSG_WGS84: u32 = 4326;

const GEOGRAPHIC_PROJ4: &str = "+proj=longlat +ellps=WGS84 +no_defs";

/// Parameters of a two-standard-parallel Lambert Conformal Conic projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LccParameters {
    pub standard_parallel1: f64,
    pub standard_parallel2: f64,
    pub origin_latitude: f64,
    pub central_meridian: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl LccParameters {
    /// The instrument's fixed grid definition.
    pub const GK2A: LccParameters = LccParameters {
        standard_parallel1: 30.0,
        standard_parallel2: 60.0,
        origin_latitude: 38.0,
        central_meridian: 126.0,
        false_easting: 0.0,
        false_northing: 0.0,
    };

    /// PROJ.4 definition on the WGS84 ellipsoid in meters
    pub fn proj4(&self) -> String {
        format!(
            "+proj=lcc +lat_1={} +lat_2={} +lat_0={} +lon_0={} +x_0={} +y_0={} +ellps=WGS84 +units=m +no_defs",
            self.standard_parallel1,
            self.standard_parallel2,
            self.origin_latitude,
            self.central_meridian,
            self.false_easting,
            self.false_northing
        )
    }

    /// True when every parameter matches `other` within `tolerance` degrees/meters
    pub fn approx_eq(&self, other: &LccParameters, tolerance: f64) -> bool {
        [
            (self.standard_parallel1, other.standard_parallel1),
            (self.standard_parallel2, other.standard_parallel2),
            (self.origin_latitude, other.origin_latitude),
            (self.central_meridian, other.central_meridian),
            (self.false_easting, other.false_easting),
            (self.false_northing, other.false_northing),
        ]
        .iter()
        .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

/// Coordinate reference system attached to a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crs {
    /// Lambert Conformal Conic, meters
    Lcc(LccParameters),
    /// WGS84 longitude/latitude, degrees
    Geographic,
}

impl Crs {
    /// The satellite's native grid reference.
    pub fn gk2a_lcc() -> Self {
        Crs::Lcc(LccParameters::GK2A)
    }

    pub fn proj4(&self) -> String {
        match self {
            Crs::Lcc(params) => params.proj4(),
            Crs::Geographic => GEOGRAPHIC_PROJ4.to_string(),
        }
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Geographic)
    }

    /// GDAL spatial reference used when writing rasters
    pub fn to_spatial_ref(&self) -> gdal::errors::Result<SpatialRef> {
        match self {
            Crs::Lcc(params) => SpatialRef::from_proj4(&params.proj4()),
            Crs::Geographic => SpatialRef::from_epsg(EPSG_WGS84),
        }
    }
}

/// Reusable point transformer between two reference systems.
///
/// Degrees in, degrees out for geographic systems; the radian conversion
/// proj4rs needs is handled here.
pub struct Transformer {
    source: Proj,
    target: Proj,
    source_is_geographic: bool,
    target_is_geographic: bool,
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("source_is_geographic", &self.source_is_geographic)
            .field("target_is_geographic", &self.target_is_geographic)
            .finish_non_exhaustive()
    }
}

impl Transformer {
    pub fn new(source: &Crs, target: &Crs) -> Result<Self> {
        Ok(Self {
            source: build_proj(source)?,
            target: build_proj(target)?,
            source_is_geographic: source.is_geographic(),
            target_is_geographic: target.is_geographic(),
        })
    }

    /// Transform one (x, y) pair.
    pub fn transform(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let (in_x, in_y) = if self.source_is_geographic {
            (x.to_radians(), y.to_radians())
        } else {
            (x, y)
        };

        let mut point = (in_x, in_y, 0.0);
        transform(&self.source, &self.target, &mut point).map_err(|e| {
            SwradError::Projection {
                message: format!("transform of ({}, {}) failed: {:?}", x, y, e),
            }
        })?;

        let (out_x, out_y) = if self.target_is_geographic {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };

        if !out_x.is_finite() || !out_y.is_finite() {
            return Err(SwradError::Projection {
                message: format!("transform of ({}, {}) left the projection domain", x, y),
            });
        }

        Ok((out_x, out_y))
    }
}

fn build_proj(crs: &Crs) -> Result<Proj> {
    let definition = crs.proj4();
    Proj::from_proj_string(&definition).map_err(|e| SwradError::Projection {
        message: format!("invalid projection '{}': {:?}", definition, e),
    })
}

/// Map a fractional pixel position (column, row) to world coordinates
pub fn pixel_to_world(gt: &GeoTransform, col: f64, row: f64) -> (f64, f64) {
    (
        gt[0] + col * gt[1] + row * gt[2],
        gt[3] + col * gt[4] + row * gt[5],
    )
}

/// Map world coordinates back to a fractional pixel position (column, row).
///
/// Only north-up transforms (no rotation terms) are produced by this crate.
pub fn world_to_pixel(gt: &GeoTransform, x: f64, y: f64) -> (f64, f64) {
    ((x - gt[0]) / gt[1], (y - gt[3]) / gt[5])
}
