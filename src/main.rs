//! terrainforge CLI - procedural terrain heightmaps.
//!
//! Displaces a subdivided plane with fractal noise, erodes it, colors it by
//! elevation and writes the resulting heightmap as a PNG.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use terrainforge::export::{export_heightmap_png, tile_resolution, RasterSurface, Viewport};
use terrainforge::noise::NoiseKind;
use terrainforge::pipeline::{RecalcOutcome, TerrainConfig, TerrainSession};
use terrainforge::terrain::Grid;

/// Plane extent in world units on each axis.
const PLANE_SIZE: f32 = 20.0;

/// Procedural terrain heightmap generator.
#[derive(Parser)]
#[command(name = "terrainforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a terrain and export its heightmap.
    Generate {
        /// Subdivisions per axis.
        #[arg(short = 'n', long, default_value = "128")]
        segments: u32,

        /// Seed text (number or any string). Random when omitted.
        #[arg(short, long)]
        seed: Option<String>,

        /// Shading mode [default: real, unless set in the config file].
        #[arg(long)]
        shading: Option<ShadingArg>,

        /// Color mode [default: heatmap, unless set in the config file].
        #[arg(long)]
        color: Option<ColorArg>,

        /// Noise source.
        #[arg(long)]
        noise: Option<NoiseArg>,

        /// JSON configuration file; flags given on the command line win.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of noise octaves.
        #[arg(long)]
        octaves: Option<u8>,

        /// Base noise scale.
        #[arg(long)]
        scale: Option<f64>,

        /// Amplitude multiplier per octave.
        #[arg(long)]
        persistence: Option<f64>,

        /// Frequency multiplier per octave.
        #[arg(long)]
        lacunarity: Option<f64>,

        /// Hydraulic erosion timesteps.
        #[arg(long)]
        erosion_steps: Option<u32>,

        /// Thermal erosion iterations.
        #[arg(long)]
        thermal_iters: Option<u32>,

        /// Output PNG of the composed canvas.
        #[arg(short, long, default_value = "heightmap.png")]
        output: PathBuf,

        /// Also write the raw unscaled tile to this path.
        #[arg(long)]
        tile_output: Option<PathBuf>,

        /// Canvas height in pixels [default: 256].
        #[arg(long)]
        viewport_height: Option<u32>,

        /// Canvas aspect ratio as WIDTH:HEIGHT [default: 1:1].
        #[arg(long)]
        aspect: Option<String>,
    },

    /// Display information about a grid configuration.
    Info {
        /// Subdivisions per axis.
        #[arg(short = 'n', long, default_value = "128")]
        segments: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ShadingArg {
    /// Leave the plane untouched.
    None,
    /// Flat plane.
    Stylized,
    /// Fractal displacement plus erosion.
    Real,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorArg {
    /// Neutral gray.
    None,
    /// Grayscale by elevation.
    Clay,
    /// Hue band by elevation.
    Heatmap,
}

#[derive(Clone, Copy, ValueEnum)]
enum NoiseArg {
    Perlin,
    Simplex,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            segments,
            seed,
            shading,
            color,
            noise,
            config,
            octaves,
            scale,
            persistence,
            lacunarity,
            erosion_steps,
            thermal_iters,
            output,
            tile_output,
            viewport_height,
            aspect,
        } => {
            let mut cfg = match config {
                Some(path) => TerrainConfig::load(&path).unwrap_or_else(|e| {
                    eprintln!("Error loading config {}: {}", path.display(), e);
                    std::process::exit(1);
                }),
                None => TerrainConfig::default(),
            };

            if let Some(seed) = seed {
                cfg.session.seed = Some(seed);
            }
            match shading {
                Some(ShadingArg::None) => cfg.session.shading = None,
                Some(ShadingArg::Stylized) => cfg.session.shading = Some("stylized".to_string()),
                Some(ShadingArg::Real) => cfg.session.shading = Some("real".to_string()),
                None if cfg.session.shading.is_none() => cfg.session.shading = Some("real".to_string()),
                None => {}
            }
            match color {
                Some(ColorArg::None) => cfg.session.color = None,
                Some(ColorArg::Clay) => cfg.session.color = Some("clay".to_string()),
                Some(ColorArg::Heatmap) => cfg.session.color = Some("heatmap".to_string()),
                None if cfg.session.color.is_none() => cfg.session.color = Some("heatmap".to_string()),
                None => {}
            }
            if let Some(noise) = noise {
                cfg.noise = match noise {
                    NoiseArg::Perlin => NoiseKind::Perlin,
                    NoiseArg::Simplex => NoiseKind::Simplex,
                };
            }
            if let Some(v) = octaves {
                cfg.fractal.octaves = v;
            }
            if let Some(v) = scale {
                cfg.fractal.scale = v;
            }
            if let Some(v) = persistence {
                cfg.fractal.persistence = v;
            }
            if let Some(v) = lacunarity {
                cfg.fractal.lacunarity = v;
            }
            if let Some(v) = erosion_steps {
                cfg.erosion.hydraulic_steps = v;
            }
            if let Some(v) = thermal_iters {
                cfg.erosion.thermal_iterations = v;
            }

            if let Some(height) = viewport_height {
                cfg.viewport.height = height;
            }
            if let Some(aspect) = aspect {
                let (client_width, client_height) = parse_aspect(&aspect).unwrap_or_else(|| {
                    eprintln!("Error: aspect must look like WIDTH:HEIGHT with non-zero parts, got '{}'", aspect);
                    std::process::exit(1);
                });
                cfg.viewport = Viewport::new(cfg.viewport.height, client_width, client_height);
            }

            run_generate(segments, cfg, output, tile_output);
        }
        Commands::Info { segments } => {
            run_info(segments);
        }
    }
}

fn parse_aspect(text: &str) -> Option<(u32, u32)> {
    let (w, h) = text.split_once(':')?;
    let w: u32 = w.trim().parse().ok()?;
    let h: u32 = h.trim().parse().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}

fn run_generate(segments: u32, config: TerrainConfig, output: PathBuf, tile_output: Option<PathBuf>) {
    if segments == 0 || segments > 4096 {
        eprintln!("Error: Segments must be between 1 and 4096");
        std::process::exit(1);
    }

    let mut grid = Grid::plane(PLANE_SIZE, PLANE_SIZE, segments, segments).unwrap_or_else(|e| {
        eprintln!("Error creating grid: {}", e);
        std::process::exit(1);
    });

    println!("terrainforge - Procedural Terrain Heightmaps");
    println!("============================================");
    println!("Grid: {}x{} segments ({} vertices)", segments, segments, grid.vertex_count());
    println!("Seed: {}", config.session.seed.as_deref().unwrap_or("<random>"));
    println!("Shading: {}", config.session.shading_mode().name());
    println!("Color: {}", config.session.color_mode().name());
    println!("Output: {}", output.display());

    let viewport = config.viewport;
    let mut session = TerrainSession::from_config(config);
    let start = Instant::now();

    let outcome = session.recalc(&mut grid).unwrap_or_else(|e| {
        eprintln!("Error during generation: {}", e);
        std::process::exit(1);
    });
    match &outcome {
        RecalcOutcome::Displaced(report) => {
            println!(
                "Displaced with seed {} in {:.2?} (raw max {:.3})",
                report.seed, report.elapsed, report.running_max
            );
        }
        RecalcOutcome::Flattened => println!("Terrain flattened"),
        RecalcOutcome::Unchanged => println!("No shading mode selected, terrain unchanged"),
    }

    let range = grid.elevation_range();
    println!("Elevation range: [{:.4}, {:.4}]", range.min, range.max);

    let shading = session.color(&grid).unwrap_or_else(|e| {
        eprintln!("Error coloring terrain: {}", e);
        std::process::exit(1);
    });

    let mut surface = RasterSurface::from_viewport(viewport);
    let tile = session
        .generate_map(
            &shading.colors,
            &grid,
            surface.as_mut().map(|s| s as &mut dyn terrainforge::DrawSurface),
        )
        .unwrap_or_else(|e| {
            eprintln!("Error rasterizing heightmap: {}", e);
            std::process::exit(1);
        });

    if let Some(surface) = &surface {
        surface.save_png(&output).unwrap_or_else(|e| {
            eprintln!("Error exporting PNG: {}", e);
            std::process::exit(1);
        });
        println!("  Exported canvas: {}", output.display());
    }

    if let Some(path) = tile_output {
        export_heightmap_png(&tile, &path).unwrap_or_else(|e| {
            eprintln!("Error exporting tile PNG: {}", e);
            std::process::exit(1);
        });
        println!("  Exported tile ({}x{} px): {}", tile.side(), tile.side(), path.display());
    }

    println!("Completed in {:.2?}", start.elapsed());
}

fn run_info(segments: u32) {
    let grid = match Grid::plane(PLANE_SIZE, PLANE_SIZE, segments, segments) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let tile = tile_resolution(segments);
    println!("Grid Configuration");
    println!("==================");
    println!("Segments: {}x{}", segments, segments);
    println!("Vertices: {}", grid.vertex_count());
    println!("Triangles: {}", grid.triangle_count());
    println!("Heightmap tile: {}x{} px (scale x{:.3})", tile + 1, tile + 1, 256.0 / tile as f32);
    if segments > tile {
        println!("  Note: only the first {} colors are sampled into the tile", (tile + 1) * (tile + 1));
    }
}
