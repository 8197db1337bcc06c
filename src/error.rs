//! Error types for the swrad converter.
//!
//! Every fatal condition of a single granule conversion surfaces as one
//! labeled variant so the batch driver can log it and move on.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for swrad operations.
#[derive(Error, Debug)]
pub enum SwradError {
    /// Required projection or variable attributes are absent
    #[error("Missing metadata: {message}")]
    MissingMetadata { message: String },

    /// The granule cannot be opened or lacks a required variable
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    /// An output raster could not be created or committed
    #[error("Write failure for {}: {message}", path.display())]
    WriteFailure { path: PathBuf, message: String },

    /// Coordinate transformation errors
    #[error("Projection error: {message}")]
    Projection { message: String },

    /// The granule name carries no usable timestamp
    #[error("Invalid file name {name}: {message}")]
    InvalidFileName { name: String, message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Server errors
    #[error("Server error: {message}")]
    Server { message: String },

    /// NetCDF library errors
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// GDAL library errors
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Array shape errors
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl SwradError {
    /// Stable label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SwradError::MissingMetadata { .. } => "missing-metadata",
            SwradError::MalformedInput { .. } => "malformed-input",
            SwradError::WriteFailure { .. } => "write-failure",
            SwradError::Projection { .. } => "projection",
            SwradError::InvalidFileName { .. } => "invalid-file-name",
            SwradError::Config { .. } => "config",
            SwradError::InvalidParameter { .. } => "invalid-parameter",
            SwradError::Server { .. } => "server",
            SwradError::NetCdf(_) => "netcdf",
            SwradError::Gdal(_) => "gdal",
            SwradError::Io(_) => "io",
            SwradError::Json(_) => "json",
            SwradError::Shape(_) => "shape",
        }
    }
}

/// Convenience type alias for Results with SwradError
pub type Result<T> = std::result::Result<T, SwradError>;
