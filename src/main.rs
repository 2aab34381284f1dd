//! tri-raster: render an ASCII triangle mesh into a TGA image
//!
//! Loader -> normalizer -> shader -> projector -> rasterizer -> image writer,
//! all on one framebuffer owned by this run.

use std::fs::File;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::{Parser, ValueEnum};

use tri_raster::config::{
    load_config, save_config, ConfigError, ConfigOverrides, RenderConfig, AUTO_FIT_FILL,
};
use tri_raster::mesh::{load_mesh, Framing, MeshError};
use tri_raster::output::{save_image, write_coverage, OutputError};
use tri_raster::rasterizer::{create_test_triangle, render_scene, Framebuffer, RenderError, ShadingMode};

#[derive(Parser)]
#[command(name = "tri-raster")]
#[command(about = "Rasterize an ASCII triangle mesh into a TGA or PNG image", long_about = None)]
#[command(version = tri_raster::VERSION)]
struct Cli {
    /// Mesh file with `Vertex` and `Face` records
    #[arg(required_unless_present = "demo")]
    mesh: Option<PathBuf>,

    /// Output image (.tga or .png)
    #[arg(short, long, default_value = "output.tga")]
    output: PathBuf,

    /// RON render config; command line flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long)]
    width: Option<usize>,

    /// Canvas height in pixels
    #[arg(long)]
    height: Option<usize>,

    /// Model scale applied to X and Y after centering
    #[arg(long)]
    scale: Option<f32>,

    /// World-space X offset applied after scaling
    #[arg(long, allow_hyphen_values = true)]
    x_offset: Option<f32>,

    /// World-space Y offset applied after scaling
    #[arg(long, allow_hyphen_values = true)]
    y_offset: Option<f32>,

    /// Scale and center the model to fill the world window
    #[arg(long)]
    fit: bool,

    #[arg(long, value_enum)]
    shading: Option<ShadingArg>,

    /// Render bands of rows on all cores
    #[arg(long)]
    parallel: bool,

    /// Also write an ASCII coverage mask to this file
    #[arg(long)]
    coverage: Option<PathBuf>,

    /// Write the effective config to this RON file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Render the built-in red/green/blue test triangle
    #[arg(long, conflicts_with = "mesh")]
    demo: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShadingArg {
    None,
    Flat,
    Smooth,
}

impl From<ShadingArg> for ShadingMode {
    fn from(arg: ShadingArg) -> Self {
        match arg {
            ShadingArg::None => ShadingMode::None,
            ShadingArg::Flat => ShadingMode::Flat,
            ShadingArg::Smooth => ShadingMode::Smooth,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("no mesh given (pass a mesh file or --demo)")]
    NoInput,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            width: self.width,
            height: self.height,
            scale: self.scale,
            x_offset: self.x_offset,
            y_offset: self.y_offset,
            shading: self.shading.map(ShadingMode::from),
            auto_fit: self.fit,
            parallel: self.parallel,
        }
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RenderConfig::default(),
    };
    config.apply_overrides(&cli.overrides());
    config.validate()?;

    if let Some(path) = &cli.save_config {
        save_config(&config, path)?;
        log::info!("Saved config to {}", path.display());
    }

    let triangles = if cli.demo {
        vec![create_test_triangle()]
    } else {
        let path = cli.mesh.as_ref().ok_or(AppError::NoInput)?;
        let mesh = load_mesh(path, config.default_color)?;

        let framing = if config.auto_fit {
            Framing::fit(&mesh, &config.world, AUTO_FIT_FILL)
        } else {
            config.framing
        };
        log::info!(
            "Framing: centroid ({:.3}, {:.3}), extent {:.3}, scale {:.3}, offset ({:.3}, {:.3})",
            mesh.centroid.x,
            mesh.centroid.y,
            mesh.max_extent,
            framing.scale,
            framing.x_offset,
            framing.y_offset
        );
        mesh.render_triangles(mesh.centroid, &framing, config.shading)
    };

    let mut fb = Framebuffer::try_new(config.width, config.height)?;
    fb.clear(config.background);

    let start = Instant::now();
    let stats = render_scene(&mut fb, &triangles, &config.world, &config.raster_settings());
    log::info!(
        "Rasterized {}/{} triangles ({} degenerate), {} pixels written in {:.1} ms",
        stats.rasterized,
        stats.triangles,
        stats.degenerate,
        stats.pixels_written,
        start.elapsed().as_secs_f64() * 1000.0
    );

    save_image(&fb, &cli.output)?;

    if let Some(path) = &cli.coverage {
        let file = File::create(path).map_err(OutputError::from)?;
        write_coverage(&fb, file)?;
        log::info!("Wrote coverage mask to {}", path.display());
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging (suppressed if --quiet)
    if !cli.quiet {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
