//! swrad - GK-2A shortwave radiation to GeoTIFF converter
//!
//! This is the main entry point for the swrad application.

use std::process::ExitCode;
use tracing::{error, info};

use swrad::{init_tracing, log_error, Command, Config, Result, SwradError};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            log_error(&e, "swrad");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    // Load configuration
    let (config, command) = Config::load()?;

    init_tracing(&config.log_level);
    info!("Starting swrad v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    match command {
        Command::Convert {
            input,
            raw,
            colored,
        } => {
            let targets = swrad::OutputTargets::new(raw, colored);
            swrad::convert_file(&input, &targets, &swrad::ConversionOptions::from(&config))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Batch {
            input_dir,
            output_dir,
        } => {
            let summary = swrad::run_batch(&input_dir, output_dir.as_deref(), &config)?;
            for (path, e) in &summary.failed {
                eprintln!("Failed: {} ({})", path.display(), e);
            }
            println!(
                "Converted {} of {} files",
                summary.converted.len(),
                summary.total()
            );
            if summary.failed.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Serve { directory, .. } => {
            let mut builder = tokio::runtime::Builder::new_multi_thread();
            builder.enable_all();
            if let Some(workers) = config.server.workers {
                builder.worker_threads(workers);
            }
            let runtime = builder.build().map_err(|e| SwradError::Server {
                message: format!("Failed to start runtime: {}", e),
            })?;

            runtime.block_on(swrad::server::serve(
                &directory,
                &config.server.host,
                config.server.port,
            ))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
