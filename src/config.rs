//! Configuration management for swrad.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SwradError};
use crate::interpolation::INTERPOLATION_METHODS;
use crate::render::MissingPixelPolicy;

/// Command-line arguments for swrad
#[derive(Parser, Debug)]
#[command(name = "swrad")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to JSON configuration file
    #[arg(short, long, env = "SWRAD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SWRAD_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Name of the variable to convert
    #[arg(long, env = "SWRAD_VARIABLE", global = true)]
    pub variable: Option<String>,

    /// Quality flag variables ANDed into the validity mask
    #[arg(
        long = "mask-flag",
        env = "SWRAD_MASK_FLAGS",
        value_delimiter = ',',
        global = true
    )]
    pub mask_flags: Option<Vec<String>>,

    /// Keep every pixel regardless of quality flags
    #[arg(long, global = true, conflicts_with = "mask_flags")]
    pub no_mask: bool,

    /// Paint missing pixels with an opaque "R,G,B" color instead of leaving them transparent
    #[arg(long, env = "SWRAD_NAN_COLOR", global = true)]
    pub nan_color: Option<String>,

    /// Resampling method used when reprojecting (nearest, bilinear)
    #[arg(long, env = "SWRAD_RESAMPLING", global = true)]
    pub resampling: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Convert a single granule
    Convert {
        /// Input netCDF granule
        input: PathBuf,

        /// Destination of the raw float raster
        #[arg(long)]
        raw: PathBuf,

        /// Destination of the colorized raster
        #[arg(long)]
        colored: PathBuf,
    },

    /// Convert every granule in a directory
    Batch {
        /// Directory searched for granules
        input_dir: PathBuf,

        /// Where products are written (defaults to the input directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Serve a directory of products over HTTP with permissive CORS headers
    Serve {
        /// Directory to serve
        directory: PathBuf,

        /// Host address to bind to
        #[arg(short = 'H', long, env = "SWRAD_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "SWRAD_PORT")]
        port: Option<u16>,

        /// Number of worker threads
        #[arg(short, long, env = "SWRAD_WORKERS")]
        workers: Option<usize>,
    },
}

/// Input granule configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Physical variable to convert
    #[serde(default = "default_variable")]
    pub variable: String,

    /// Scalar variable carrying the projection-description attributes
    #[serde(default = "default_projection_variable")]
    pub projection_variable: String,

    /// Quality flags ANDed into the validity mask; empty disables masking
    #[serde(default = "default_mask_flags")]
    pub mask_flags: Vec<String>,

    /// Glob pattern used by the batch driver
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
}

/// Rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub missing_pixels: MissingPixelPolicy,

    #[serde(default = "default_resampling")]
    pub resampling: String,
}

/// Output naming configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_extension")]
    pub extension: String,

    /// Shift applied to the UTC timestamp embedded in granule names
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i64,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads (None = number of CPU cores)
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, Command)> {
        Self::from_args(Args::parse())
    }

    /// Build a configuration from parsed arguments, reading the JSON file they name
    pub fn from_args(args: Args) -> Result<(Self, Command)> {
        let mut config = match &args.config {
            Some(path) => Self::load_from_file(path)?,
            None => Config::default(),
        };
        config.apply_args(&args)?;
        Ok((config, args.command))
    }

    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SwradError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Override with values given on the command line or in the environment
    pub fn apply_args(&mut self, args: &Args) -> Result<()> {
        if let Some(level) = &args.log_level {
            self.log_level = level.clone();
        }
        if let Some(variable) = &args.variable {
            self.input.variable = variable.clone();
        }
        if args.no_mask {
            self.input.mask_flags.clear();
        } else if let Some(flags) = &args.mask_flags {
            self.input.mask_flags = flags.clone();
        }
        if let Some(color) = &args.nan_color {
            self.render.missing_pixels = parse_missing_color(color)?;
        }
        if let Some(resampling) = &args.resampling {
            self.render.resampling = resampling.clone();
        }

        if let Command::Serve {
            host,
            port,
            workers,
            ..
        } = &args.command
        {
            if let Some(host) = host {
                self.server.host = host.clone();
            }
            if let Some(port) = port {
                self.server.port = *port;
            }
            if workers.is_some() {
                self.server.workers = *workers;
            }
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("input.variable", &self.input.variable),
            ("input.projection_variable", &self.input.projection_variable),
            ("input.file_pattern", &self.input.file_pattern),
            ("output.prefix", &self.output.prefix),
            ("output.extension", &self.output.extension),
            ("server.host", &self.server.host),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SwradError::Config {
                    message: format!("{} cannot be empty", name),
                });
            }
        }

        if self.input.mask_flags.iter().any(|flag| flag.trim().is_empty()) {
            return Err(SwradError::Config {
                message: "Mask flag names cannot be empty".to_string(),
            });
        }

        // Validate port (0 is not a valid port for users)
        if self.server.port == 0 {
            return Err(SwradError::Config {
                message: "Server port cannot be 0".to_string(),
            });
        }

        if self.server.workers == Some(0) {
            return Err(SwradError::Config {
                message: "Worker count must be at least 1".to_string(),
            });
        }

        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(SwradError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        let resampling = self.render.resampling.to_lowercase();
        if !INTERPOLATION_METHODS.contains(&resampling.as_str()) {
            return Err(SwradError::Config {
                message: format!(
                    "Invalid resampling method: {}. Must be one of: {}",
                    self.render.resampling,
                    INTERPOLATION_METHODS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

/// Parse a `--nan-color` value: `R,G,B`, or `transparent`
pub fn parse_missing_color(value: &str) -> Result<MissingPixelPolicy> {
    if value.trim().eq_ignore_ascii_case("transparent") {
        return Ok(MissingPixelPolicy::Transparent);
    }
    Ok(MissingPixelPolicy::FixedColor {
        rgb: parse_rgb(value)?,
    })
}

/// Parse an `R,G,B` triple of 0..=255 components
pub fn parse_rgb(value: &str) -> Result<[u8; 3]> {
    let invalid = |message: String| SwradError::InvalidParameter {
        param: "nan_color".to_string(),
        message,
    };

    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(invalid(format!(
            "expected three comma-separated components, got '{}'",
            value
        )));
    }

    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(parts) {
        *slot = part
            .parse::<u8>()
            .map_err(|e| invalid(format!("component '{}' is not 0-255: {}", part, e)))?;
    }
    Ok(rgb)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            render: RenderConfig::default(),
            output: OutputConfig::default(),
            server: ServerConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            variable: default_variable(),
            projection_variable: default_projection_variable(),
            mask_flags: default_mask_flags(),
            file_pattern: default_file_pattern(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            missing_pixels: MissingPixelPolicy::default(),
            resampling: default_resampling(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            extension: default_extension(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

// Default value functions for serde
fn default_variable() -> String {
    "ASR".to_string()
}

fn default_projection_variable() -> String {
    "gk2a_imager_projection".to_string()
}

fn default_mask_flags() -> Vec<String> {
    vec!["ASR_DQF1".to_string(), "SW_DQF".to_string()]
}

fn default_file_pattern() -> String {
    "*.nc".to_string()
}

fn default_resampling() -> String {
    "nearest".to_string()
}

fn default_prefix() -> String {
    "swrad".to_string()
}

fn default_extension() -> String {
    "tif".to_string()
}

fn default_utc_offset_hours() -> i64 {
    9
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.variable, "ASR");
        assert_eq!(config.input.mask_flags, vec!["ASR_DQF1", "SW_DQF"]);
        assert_eq!(config.render.missing_pixels, MissingPixelPolicy::Transparent);
        assert_eq!(config.output.utc_offset_hours, 9);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"input": {"mask_flags": ["ASR_DQF1"]}, "render": {"missing_pixels": {"mode": "fixed_color", "rgb": [1, 2, 3]}}}"#,
        )
        .unwrap();

        assert_eq!(config.input.mask_flags, vec!["ASR_DQF1"]);
        assert_eq!(config.input.variable, "ASR");
        assert_eq!(
            config.render.missing_pixels,
            MissingPixelPolicy::FixedColor { rgb: [1, 2, 3] }
        );
        assert_eq!(config.render.resampling, "nearest");
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_command_line_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("swrad.json");
        std::fs::write(
            &path,
            r#"{"input": {"variable": "DSR"}, "render": {"resampling": "bilinear"}}"#,
        )
        .unwrap();

        let args = parse(&[
            "swrad",
            "--config",
            path.to_str().unwrap(),
            "--resampling",
            "nearest",
            "convert",
            "in.nc",
            "--raw",
            "a.tif",
            "--colored",
            "b.tif",
        ]);
        let (config, command) = Config::from_args(args).unwrap();

        assert_eq!(config.input.variable, "DSR");
        assert_eq!(config.render.resampling, "nearest");
        assert_eq!(
            command,
            Command::Convert {
                input: PathBuf::from("in.nc"),
                raw: PathBuf::from("a.tif"),
                colored: PathBuf::from("b.tif"),
            }
        );
    }

    #[test]
    fn test_mask_options() {
        let args = parse(&["swrad", "--mask-flag", "ASR_DQF1", "batch", "data"]);
        let (config, _) = Config::from_args(args).unwrap();
        assert_eq!(config.input.mask_flags, vec!["ASR_DQF1"]);

        let args = parse(&["swrad", "batch", "data", "--mask-flag", "A,B"]);
        let (config, _) = Config::from_args(args).unwrap();
        assert_eq!(config.input.mask_flags, vec!["A", "B"]);

        let args = parse(&["swrad", "--no-mask", "batch", "data"]);
        let (config, _) = Config::from_args(args).unwrap();
        assert!(config.input.mask_flags.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nan_color_option() {
        let args = parse(&["swrad", "--nan-color", "255, 0,10", "batch", "data"]);
        let (config, _) = Config::from_args(args).unwrap();
        assert_eq!(
            config.render.missing_pixels,
            MissingPixelPolicy::FixedColor { rgb: [255, 0, 10] }
        );

        let args = parse(&["swrad", "--nan-color", "300,0,0", "batch", "data"]);
        assert!(matches!(
            Config::from_args(args),
            Err(SwradError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_serve_overrides() {
        let args = parse(&["swrad", "serve", "out", "-H", "0.0.0.0", "-p", "9000", "-w", "2"]);
        let (config, command) = Config::from_args(args).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.workers, Some(2));
        assert!(matches!(command, Command::Serve { .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let args = parse(&["swrad", "--config", "/nonexistent/swrad.json", "batch", "data"]);
        assert!(matches!(
            Config::from_args(args),
            Err(SwradError::Config { .. })
        ));
    }

    #[test]
    fn test_parse_rgb() {
        assert_eq!(parse_rgb("1,2,3").unwrap(), [1, 2, 3]);
        assert!(parse_rgb("1,2").is_err());
        assert!(parse_rgb("a,b,c").is_err());
        assert_eq!(
            parse_missing_color("Transparent").unwrap(),
            MissingPixelPolicy::Transparent
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.server.host = "".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.render.resampling = "bicubic".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.extension = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.input.mask_flags = vec!["".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.workers = Some(0);
        assert!(config.validate().is_err());
    }
}
