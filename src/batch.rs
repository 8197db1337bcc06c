//! Directory driver: converts every matching granule, one at a time.

use chrono::{Duration, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, SwradError};
use crate::logging::{generate_run_id, log_error, log_operation_end, log_operation_start};
use crate::pipeline::{convert_file, ConversionOptions, OutputTargets};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub converted: Vec<PathBuf>,
    /// Input path and the error that stopped it
    pub failed: Vec<(PathBuf, SwradError)>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

/// Derive `<prefix>_<YYYYMMDDHHMM>` from a granule name ending in
/// `_YYYYMMDDHHMM.<ext>`, shifting the UTC timestamp by `utc_offset_hours`.
pub fn derive_output_basename(file_name: &str, prefix: &str, utc_offset_hours: i64) -> Result<String> {
    let invalid = |message: &str| SwradError::InvalidFileName {
        name: file_name.to_string(),
        message: message.to_string(),
    };

    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| invalid("no file stem"))?;
    let (_, stamp) = stem
        .rsplit_once('_')
        .ok_or_else(|| invalid("no trailing _YYYYMMDDHHMM timestamp"))?;

    if stamp.len() != 12 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("trailing segment is not YYYYMMDDHHMM"));
    }

    let utc = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
        .map_err(|e| invalid(&format!("invalid timestamp '{}': {}", stamp, e)))?;
    let local = utc + Duration::hours(utc_offset_hours);

    Ok(format!("{}_{}", prefix, local.format(TIMESTAMP_FORMAT)))
}

/// Granules in `input_dir` matching `pattern`, sorted by path
pub fn discover_inputs(input_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&input_dir.to_string_lossy());
    let full_pattern = format!("{}/{}", escaped, pattern);

    let mut files: Vec<PathBuf> = glob::glob(&full_pattern)
        .map_err(|e| SwradError::Config {
            message: format!("Invalid file pattern '{}': {}", pattern, e),
        })?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Convert every granule in `input_dir`.
///
/// Per-file failures are logged and collected; only setup problems (an
/// unreadable pattern, an output directory that cannot be created) abort.
pub fn run_batch(input_dir: &Path, output_dir: Option<&Path>, config: &Config) -> Result<BatchSummary> {
    let run_id = generate_run_id();
    let start = Instant::now();
    log_operation_start("batch", Some(&input_dir.display().to_string()));

    let output_dir = output_dir.unwrap_or(input_dir);
    std::fs::create_dir_all(output_dir)?;

    let files = discover_inputs(input_dir, &config.input.file_pattern)?;
    if files.is_empty() {
        warn!(
            run_id = %run_id,
            input_dir = %input_dir.display(),
            pattern = %config.input.file_pattern,
            "No input files found"
        );
    } else {
        info!(run_id = %run_id, files = files.len(), "Starting batch");
    }

    let options = ConversionOptions::from(config);
    let mut summary = BatchSummary::default();

    for input in files {
        match convert_one(&input, output_dir, config, &options) {
            Ok(()) => summary.converted.push(input),
            Err(e) => {
                log_error(&e, &format!("converting {}", input.display()));
                summary.failed.push((input, e));
            }
        }
    }

    info!(
        run_id = %run_id,
        converted = summary.converted.len(),
        failed = summary.failed.len(),
        "Batch complete"
    );
    log_operation_end("batch", start, summary.failed.is_empty());
    Ok(summary)
}

fn convert_one(
    input: &Path,
    output_dir: &Path,
    config: &Config,
    options: &ConversionOptions,
) -> Result<()> {
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let basename = derive_output_basename(
        &file_name,
        &config.output.prefix,
        config.output.utc_offset_hours,
    )?;
    let targets = OutputTargets::for_basename(output_dir, &basename, &config.output.extension);

    convert_file(input, &targets, options)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_derive_basename_applies_offset() {
        let name = derive_output_basename("gk2a_ami_le2_swrad_ko020lc_202407070300.nc", "swrad", 9)
            .unwrap();
        assert_eq!(name, "swrad_202407071200");
    }

    #[test]
    fn test_derive_basename_crosses_day_boundary() {
        let name = derive_output_basename("x_202412311800.nc", "swrad", 9).unwrap();
        assert_eq!(name, "swrad_202501010300");

        let name = derive_output_basename("x_202401010300.nc", "asr", -5).unwrap();
        assert_eq!(name, "asr_202312312200");
    }

    #[test]
    fn test_derive_basename_rejects_bad_names() {
        for name in [
            "granule.nc",
            "gk2a_swrad_2024070703.nc",
            "gk2a_swrad_202413070300.nc",
            "gk2a_swrad_20240707030a.nc",
        ] {
            assert!(
                matches!(
                    derive_output_basename(name, "swrad", 9),
                    Err(SwradError::InvalidFileName { .. })
                ),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_discover_inputs_sorted() {
        let dir = tempdir().unwrap();
        for name in ["b_202401010000.nc", "a_202401010000.nc", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.nc")).unwrap();

        let files = discover_inputs(dir.path(), "*.nc").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_202401010000.nc", "b_202401010000.nc"]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        let summary = run_batch(dir.path(), None, &Config::default()).unwrap();
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_failures_do_not_abort() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::write(dir.path().join("bad_202401010000.nc"), b"not netcdf").unwrap();
        std::fs::write(dir.path().join("nostamp.nc"), b"not netcdf").unwrap();

        let summary = run_batch(dir.path(), Some(&out), &Config::default()).unwrap();

        assert!(out.is_dir());
        assert!(summary.converted.is_empty());
        assert_eq!(summary.failed.len(), 2);
        assert!(matches!(summary.failed[0].1, SwradError::MalformedInput { .. }));
        assert!(matches!(summary.failed[1].1, SwradError::InvalidFileName { .. }));
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
    }
}
