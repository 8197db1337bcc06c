//! swrad-inspect: print what swrad sees in a granule or a written product.

use clap::Parser;
use std::path::PathBuf;

use swrad::data_loader::Granule;
use swrad::grid::RasterGrid;
use swrad::writer::summarize_raster;
use swrad::Result;

#[derive(Parser, Debug)]
#[command(name = "swrad-inspect")]
#[command(author, version, about = "Inspect a GK-2A granule or a swrad GeoTIFF", long_about = None)]
struct Args {
    /// A netCDF granule (.nc) or a GeoTIFF product (.tif/.tiff)
    path: PathBuf,

    /// Projection-description variable of the granule
    #[arg(long, default_value = "gk2a_imager_projection")]
    projection_variable: String,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let extension = args
        .path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "tif" | "tiff" => inspect_raster(args),
        _ => inspect_granule(args),
    }
}

fn inspect_granule(args: &Args) -> Result<()> {
    let granule = Granule::open(&args.path)?;
    let file = granule.file();

    println!("Inspecting NetCDF file: {}", args.path.display());

    println!("\nDimensions:");
    for dim in file.dimensions() {
        println!(
            "  {} = {} {}",
            dim.name(),
            dim.len(),
            if dim.is_unlimited() { "(unlimited)" } else { "" }
        );
    }

    println!("\nVariables:");
    for var in file.variables() {
        let dims: Vec<String> = var
            .dimensions()
            .iter()
            .map(|dim| format!("{} = {}", dim.name(), dim.len()))
            .collect();
        println!("  {} ({:?}) [{}]", var.name(), var.vartype(), dims.join(", "));

        for attr in var.attributes() {
            match attr.value() {
                Ok(val) => println!("    {}: {:?}", attr.name(), val),
                Err(e) => println!("    {}: error reading value: {}", attr.name(), e),
            }
        }
    }

    println!("\nGlobal Attributes:");
    for attr in file.attributes() {
        match attr.value() {
            Ok(val) => println!("  {}: {:?}", attr.name(), val),
            Err(e) => println!("  {}: error reading value: {}", attr.name(), e),
        }
    }

    println!("\nProjection record ({}):", args.projection_variable);
    match granule.projection_record(&args.projection_variable) {
        Ok(record) => {
            println!("  pixel_size: {}", record.pixel_size);
            println!("  image size: {} x {}", record.image_width, record.image_height);
            println!(
                "  upper-left pixel center: ({}, {})",
                record.upper_left_easting, record.upper_left_northing
            );
            match record.declared_lcc {
                Some(lcc) => println!("  declared LCC: {:?}", lcc),
                None => println!("  declared LCC: none"),
            }
            match RasterGrid::from_record(&record) {
                Ok(grid) => println!("  transform: {:?}", grid.transform()),
                Err(e) => println!("  transform: unavailable ({})", e),
            }
        }
        Err(e) => println!("  unavailable: {}", e),
    }

    Ok(())
}

fn inspect_raster(args: &Args) -> Result<()> {
    let summary = summarize_raster(&args.path)?;

    println!("Inspecting GeoTIFF: {}", args.path.display());
    println!("  size: {} x {}", summary.width, summary.height);
    println!("  bands: {}", summary.band_count);
    println!("  transform: {:?}", summary.transform);
    match summary.epsg {
        Some(code) => println!("  EPSG: {}", code),
        None => println!("  EPSG: unknown"),
    }
    if let Some(no_data) = summary.no_data {
        println!("  nodata: {}", no_data);
    }
    for (index, role) in summary.color_interpretations.iter().enumerate() {
        println!("  band {}: {:?}", index + 1, role);
    }

    Ok(())
}
