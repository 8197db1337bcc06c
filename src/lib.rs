//! # swrad
//!
//! Converts GK-2A shortwave radiation granules on the satellite's Lambert
//! Conformal Conic grid into two georeferenced GeoTIFF products: a raw
//! float raster for analysis and a jet-colored RGBA raster for web maps.
//!
//! ## Pipeline
//!
//! - **Read**: projection record, target variable and quality flags from the
//!   netCDF granule
//! - **Mask**: pixels failing any configured quality flag become NaN
//! - **Reproject**: LCC meters to WGS84 longitude/latitude
//! - **Render**: display range, jet ramp, transparent (or fixed-color) NaNs
//! - **Write**: both rasters staged and committed together
//!
//! A batch driver runs the pipeline over a directory and a small file server
//! publishes the products with permissive CORS headers.

pub mod batch;
pub mod colormaps;
pub mod config;
pub mod data_loader;
pub mod error;
pub mod field;
pub mod grid;
pub mod interpolation;
pub mod logging;
pub mod pipeline;
pub mod projection;
pub mod render;
pub mod reproject;
pub mod server;
pub mod writer;

pub use batch::{derive_output_basename, run_batch, BatchSummary};
pub use config::{Command, Config};
pub use error::{Result, SwradError};
pub use logging::{
    create_http_trace_layer, generate_run_id, init_tracing, log_conversion_stats, log_error,
    log_operation_end, log_operation_start, log_timed_operation,
};
pub use pipeline::{convert_file, emit_products, ConversionOptions, ConversionReport, OutputTargets};
pub use projection::Crs;
pub use render::{DisplayRange, MissingPixelPolicy};
