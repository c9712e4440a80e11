//! Gridslice CLI - command-line front end for the gridslice library
//!
//! Usage:
//!   gridslice-cli slice <mesh.json> -o <layers.json> [--settings settings.json]
//!   gridslice-cli info <mesh.json>
//!
//! A mesh file is a JSON array of objects, each a list of material-tagged
//! parts holding triangles or an analytic solid.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gridslice::slice::scene_height;
use gridslice::{LayerOutput, LayerProducer, MeshObject, PrintSettings};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Slice meshes into per-layer perimeter and infill polygons
#[derive(Parser, Debug)]
#[command(name = "gridslice-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Slice a mesh file and write the layer polygons as JSON
    Slice {
        /// Input mesh file (JSON)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (defaults to the input with a .layers.json extension)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Print settings file (JSON); defaults are used for missing fields
        #[arg(short, long, value_name = "SETTINGS")]
        settings: Option<PathBuf>,

        /// Override the layer height in mm
        #[arg(long)]
        layer_height: Option<f64>,

        /// Override the raster pixel size in mm
        #[arg(long)]
        pixel_size: Option<f64>,

        /// Enable support material
        #[arg(long)]
        support: bool,
    },

    /// Display information about a mesh file
    Info {
        /// Input mesh file (JSON)
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

/// Written by `slice`.
#[derive(Serialize)]
struct SliceOutput<'a> {
    version: &'static str,
    settings: &'a PrintSettings,
    layers: Vec<LayerOutput>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.debug {
        LevelFilter::Debug
    } else if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Slice {
            input,
            output,
            settings,
            layer_height,
            pixel_size,
            support,
        } => cmd_slice(input, output, settings, layer_height, pixel_size, support),
        Commands::Info { input } => cmd_info(input),
    }
}

fn load_objects(path: &Path) -> Result<Vec<MeshObject>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read mesh file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse mesh file {}", path.display()))
}

fn load_settings(path: Option<&Path>) -> Result<PrintSettings> {
    let Some(path) = path else {
        return Ok(PrintSettings::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse settings file {}", path.display()))
}

fn cmd_slice(
    input: PathBuf,
    output: Option<PathBuf>,
    settings_file: Option<PathBuf>,
    layer_height: Option<f64>,
    pixel_size: Option<f64>,
    support: bool,
) -> Result<()> {
    info!("Loading mesh file: {}", input.display());
    let output_path = output.unwrap_or_else(|| input.with_extension("layers.json"));

    let mut settings = load_settings(settings_file.as_deref())?;
    if let Some(h) = layer_height {
        settings = settings.layer_height(h);
    }
    if let Some(p) = pixel_size {
        settings = settings.pixel_size(p);
    }
    if support {
        settings = settings.support(true);
    }
    info!("Settings: {}", settings);

    let objects = load_objects(&input)?;
    let mut producer =
        LayerProducer::from_objects(objects, &settings).context("Failed to set up slicing")?;

    let count = producer.layer_count().max(0) as u64;
    let progress = ProgressBar::new(count);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    progress.set_message("Preparing support...");
    producer.prepare().context("Failed to prepare support")?;

    progress.set_message("Slicing...");
    let mut layers = Vec::with_capacity(count as usize);
    for layer in 0..producer.layer_count() {
        let out = producer
            .produce_layer(layer)
            .with_context(|| format!("Failed to produce layer {}", layer))?;
        layers.push(out);
        progress.inc(1);
    }
    progress.finish_with_message("Done");

    let polygons: usize = layers.iter().map(|l| l.polygon_count()).sum();
    let result = SliceOutput {
        version: gridslice::VERSION,
        settings: &settings,
        layers,
    };
    let json = serde_json::to_string_pretty(&result).context("Failed to serialise layers")?;
    fs::write(&output_path, json)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!(
        "Wrote {} layers ({} polygons) to {}",
        count,
        polygons,
        output_path.display()
    );
    Ok(())
}

fn cmd_info(input: PathBuf) -> Result<()> {
    let objects = load_objects(&input)?;
    let settings = PrintSettings::default();

    println!("Mesh: {}", input.display());
    println!("  Objects: {}", objects.len());
    for object in &objects {
        let materials: Vec<&str> = object.parts.iter().map(|p| p.material.as_str()).collect();
        println!(
            "  - {} : {} parts, {} triangles, materials [{}]",
            object.name,
            object.parts.len(),
            object.triangle_count(),
            materials.join(", ")
        );
        if let Err(e) = object.validate() {
            println!("    invalid: {}", e);
        }
    }
    if let Some(b) = gridslice::scene_bounds(&objects) {
        println!(
            "  Bounding box: ({:.2}, {:.2}, {:.2}) - ({:.2}, {:.2}, {:.2})",
            b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
        );
        let height = scene_height(&objects);
        println!(
            "  Layers at {:.2}mm: {}",
            settings.layer_height,
            (height / settings.layer_height).ceil() as i64
        );
    }
    Ok(())
}
