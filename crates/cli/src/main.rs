//! Proxfield CLI - proximity-field computation over classified rasters

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use proxfield_algorithms::kernel::{build_kernel, DecayExpr, KernelParams, DEFAULT_DECAY_EXPR};
use proxfield_algorithms::mosaic::{extract, InMemorySource, RasterSource};
use proxfield_algorithms::proximity::{compute_proximity, field_to_u8, ValueMap};
use proxfield_colormap::{field_to_rgba, ColorScheme, ColormapParams};
use proxfield_core::io::{read_geotiff, write_geotiff, write_geotiff_from_u8, write_rgba_geotiff};
use proxfield_core::{BoundingPolygon, GeoTransform, Raster, Resolution};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "proxfield")]
#[command(author, version, about = "Proximity-field computation over classified rasters", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Access object storage without request signing (anonymous reads)
    #[arg(long, global = true)]
    unsigned: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Build a distance kernel and report its shape and weights
    Kernel {
        /// Physical radius in the raster's linear unit
        #[arg(short, long, default_value = "50.0")]
        radius: f64,
        /// Shape exponent passed to the decay expression as `o`
        #[arg(short, long, default_value = "1.0")]
        omega: f64,
        /// Decay expression over x (distance), r (radius), o (exponent)
        #[arg(short, long, default_value = DEFAULT_DECAY_EXPR)]
        expression: String,
        /// Pixel scale: "res" or "res_x,res_y"
        #[arg(long, default_value = "10.0")]
        resolution: String,
        /// Optional output file for the kernel weights
        output: Option<PathBuf>,
    },
    /// Stitch a bounding-box mosaic out of one or more rasters
    Extract {
        /// Input raster files, in overwrite order (later wins)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Region as "min_x,min_y,max_x,max_y"; defaults to the first input's extent
        #[arg(short, long)]
        bounds: Option<String>,
        /// Band to write out
        #[arg(long, default_value = "0")]
        band: usize,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Compute the proximity percentage field
    Proximity {
        /// Input classified raster files, in overwrite order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Region as "min_x,min_y,max_x,max_y"; defaults to the first input's extent
        #[arg(short, long)]
        bounds: Option<String>,
        /// Target class value (weight 1.0)
        #[arg(short, long, conflicts_with = "value_map")]
        target: Option<f64>,
        /// Weighted classes as "value:weight;value:weight;..."
        #[arg(long)]
        value_map: Option<String>,
        /// Physical radius in the raster's linear unit
        #[arg(short, long, default_value = "50.0")]
        radius: f64,
        /// Shape exponent passed to the decay expression as `o`
        #[arg(long, default_value = "1.0")]
        omega: f64,
        /// Decay expression over x, r, o
        #[arg(short, long, default_value = DEFAULT_DECAY_EXPR)]
        expression: String,
        /// Output encoding: float, byte, rgba
        #[arg(short, long, default_value = "float")]
        format: String,
        /// Color scheme for rgba output: green, gray, heat
        #[arg(long, default_value = "green")]
        scheme: String,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

/// Storage-access settings a remote-source collaborator would consume.
/// Local file reads ignore it beyond logging.
#[derive(Debug, Clone, Copy)]
struct AcquisitionConfig {
    unsigned_requests: bool,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_classified(path: &PathBuf, acquisition: AcquisitionConfig) -> Result<Raster<f64>> {
    debug!(
        "Reading {} (unsigned_requests: {})",
        path.display(),
        acquisition.unsigned_requests
    );
    let raster: Raster<f64> =
        read_geotiff(path).with_context(|| format!("Failed to read {}", path.display()))?;
    info!(
        "Input {}: {} x {}",
        path.display(),
        raster.cols(),
        raster.rows()
    );
    Ok(raster)
}

fn done(name: &str, path: &PathBuf, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_resolution(s: &str) -> Result<Resolution> {
    let scales: Vec<f64> = s
        .split(',')
        .map(|part| part.trim().parse::<f64>().context("Invalid resolution"))
        .collect::<Result<_>>()?;
    Resolution::from_slice(&scales).map_err(|e| anyhow::anyhow!("{}", e))
}

fn parse_bounds(s: &str) -> Result<BoundingPolygon> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|part| part.trim().parse::<f64>().context("Invalid bound"))
        .collect::<Result<_>>()?;
    if parts.len() != 4 {
        anyhow::bail!("Bounds must be 'min_x,min_y,max_x,max_y', got: {}", s);
    }
    Ok(BoundingPolygon::from_corners(
        (parts[0], parts[1]),
        (parts[2], parts[3]),
    ))
}

fn parse_value_map(s: &str) -> Result<ValueMap<f64>> {
    let entries = s
        .split(';')
        .map(|pair| {
            let parts: Vec<&str> = pair.trim().split(':').collect();
            if parts.len() != 2 {
                anyhow::bail!("Value map entry must be 'value:weight', got: {}", pair);
            }
            let value: f64 = parts[0].trim().parse().context("Invalid class value")?;
            let weight: f64 = parts[1].trim().parse().context("Invalid weight")?;
            Ok((value, weight))
        })
        .collect::<Result<Vec<_>>>()?;
    if entries.is_empty() {
        anyhow::bail!("Value map must have at least one entry");
    }
    Ok(ValueMap::Weighted(entries))
}

fn parse_scheme(s: &str) -> Result<ColorScheme> {
    match s.to_lowercase().as_str() {
        "green" | "g" => Ok(ColorScheme::Green),
        "gray" | "grey" | "grayscale" => Ok(ColorScheme::Grayscale),
        "heat" | "h" => Ok(ColorScheme::Heat),
        _ => anyhow::bail!("Unknown scheme: {}. Use green, gray, or heat.", s),
    }
}

fn region_or_extent(bounds: Option<&str>, first: &Raster<f64>) -> Result<BoundingPolygon> {
    match bounds {
        Some(s) => parse_bounds(s),
        None => {
            let (min_x, min_y, max_x, max_y) = first.bounds();
            Ok(BoundingPolygon::from_corners((min_x, min_y), (max_x, max_y)))
        }
    }
}

/// Read all inputs and stitch the classified mosaic band over the region.
fn stitch(
    inputs: &[PathBuf],
    bounds: Option<&str>,
    band: usize,
    acquisition: AcquisitionConfig,
) -> Result<Raster<f64>> {
    let rasters: Vec<Raster<f64>> = inputs
        .iter()
        .map(|path| read_classified(path, acquisition))
        .collect::<Result<_>>()?;
    let region = region_or_extent(bounds, &rasters[0])?;

    let owned: Vec<InMemorySource> = rasters.iter().map(InMemorySource::from_raster).collect();
    let sources: Vec<&dyn RasterSource> = owned.iter().map(|s| s as &dyn RasterSource).collect();

    let pb = spinner("Extracting mosaic...");
    let mosaic = extract(&sources, &region).context("Failed to extract mosaic")?;
    pb.finish_and_clear();

    let (bands, rows, cols) = mosaic.shape();
    info!("Mosaic: {} x {} ({} band(s))", cols, rows, bands);
    mosaic.band(band).context("Failed to read mosaic band")
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let acquisition = AcquisitionConfig {
        unsigned_requests: cli.unsigned,
    };

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let raster = read_classified(&input, acquisition)?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!(
                "Pixel size: {} x {}",
                raster.transform().pixel_width,
                raster.transform().pixel_height
            );
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len() as f64
            );
        }

        // ── Kernel ───────────────────────────────────────────────────
        Commands::Kernel {
            radius,
            omega,
            expression,
            resolution,
            output,
        } => {
            let resolution = parse_resolution(&resolution)?;
            let expr = DecayExpr::parse(&expression)
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            let start = Instant::now();
            let kernel = build_kernel(radius, resolution, &expr, omega)
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            let elapsed = start.elapsed();

            let (rows, cols) = kernel.dim();
            println!("Expression: {}", expr.source());
            println!("Kernel: {} x {} (radius {}, omega {})", cols, rows, radius, omega);
            println!("  Center weight: {:.4}", kernel[(rows / 2, cols / 2)]);
            println!("  Weight sum: {:.4}", kernel.sum());
            println!("  Build time: {:.2?}", elapsed);

            if let Some(path) = output {
                let mut raster = Raster::from_array(kernel);
                raster.set_transform(GeoTransform::new(
                    0.0,
                    0.0,
                    resolution.x(),
                    -resolution.y(),
                ));
                write_geotiff(&raster, &path).context("Failed to write kernel")?;
                println!("Kernel saved to: {}", path.display());
            }
        }

        // ── Extract ──────────────────────────────────────────────────
        Commands::Extract {
            inputs,
            bounds,
            band,
            output,
        } => {
            let start = Instant::now();
            let stitched = stitch(&inputs, bounds.as_deref(), band, acquisition)?;
            let elapsed = start.elapsed();
            write_geotiff(&stitched, &output).context("Failed to write mosaic")?;
            done("Mosaic", &output, elapsed);
        }

        // ── Proximity ────────────────────────────────────────────────
        Commands::Proximity {
            inputs,
            bounds,
            target,
            value_map,
            radius,
            omega,
            expression,
            format,
            scheme,
            output,
        } => {
            let value_map = match (target, value_map.as_deref()) {
                (Some(value), _) => ValueMap::Single(value),
                (None, Some(s)) => parse_value_map(s)?,
                (None, None) => anyhow::bail!("Provide --target or --value-map"),
            };

            let classified = stitch(&inputs, bounds.as_deref(), 0, acquisition)?;
            let transform = *classified.transform();
            let resolution = Resolution::anisotropic(
                transform.pixel_width.abs(),
                transform.pixel_height.abs(),
            )
            .map_err(|e| anyhow::anyhow!("{}", e))?;

            let params = KernelParams {
                radius,
                omega,
                expression,
            };
            let kernel = params
                .build(resolution)
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            let (krows, kcols) = kernel.dim();
            info!("Kernel: {} x {}", kcols, krows);

            let pb = spinner("Computing proximity field...");
            let start = Instant::now();
            let field = compute_proximity(&classified, &kernel, &value_map)
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            match format.to_lowercase().as_str() {
                "float" | "f32" => {
                    write_geotiff(&field, &output).context("Failed to write field")?;
                }
                "byte" | "u8" => {
                    let quantized = field_to_u8(&field);
                    write_geotiff_from_u8(&quantized, &output)
                        .context("Failed to write field")?;
                }
                "rgba" => {
                    let scheme = parse_scheme(&scheme)?;
                    let rendered = field_to_rgba(
                        &field,
                        &ColormapParams {
                            scheme,
                            ..Default::default()
                        },
                    )
                    .map_err(|e| anyhow::anyhow!("{}", e))?;
                    let (rows, cols) = field.shape();
                    write_rgba_geotiff(&rendered, rows, cols, field.transform(), &output)
                        .context("Failed to write rendering")?;
                }
                other => anyhow::bail!("Unknown format: {}. Use float, byte, or rgba.", other),
            }
            done("Proximity field", &output, elapsed);
        }
    }

    Ok(())
}
