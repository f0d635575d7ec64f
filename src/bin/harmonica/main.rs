//! Harmonica CLI - harmonic weight functions on procedural meshes.
//!
//! Usage: harmonica <COMMAND> [OPTIONS]
//!
//! Run `harmonica --help` for available commands.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use harmonica::algo::colorize::{colorize, ColorRamp};
use harmonica::algo::deform::weighted_translate;
use harmonica::algo::smooth::{laplacian_smoothing_with_options, SmoothOptions};
use harmonica::algo::weight::{WeightFunction, WeightMethod, Weights};
use harmonica::algo::Progress;
use harmonica::mesh::{primitives, PolyMesh, VertexId};

#[derive(Parser)]
#[command(name = "harmonica")]
#[command(author, version, about = "Harmonic weight functions on triangle meshes", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a weight function and print statistics
    Weights {
        #[command(flatten)]
        mesh: MeshArgs,

        #[command(flatten)]
        weights: WeightArgs,

        /// Print every non-zero weight
        #[arg(long)]
        dump: bool,
    },

    /// Move points along their normals, scaled by a weight function
    Deform {
        #[command(flatten)]
        mesh: MeshArgs,

        #[command(flatten)]
        weights: WeightArgs,

        /// Displacement of the seed point
        #[arg(short, long, default_value = "0.1", allow_negative_numbers = true)]
        distance: f64,
    },

    /// Paint a weight function onto vertex colors
    Colorize {
        #[command(flatten)]
        mesh: MeshArgs,

        #[command(flatten)]
        weights: WeightArgs,
    },

    /// Apply uniform Laplacian smoothing
    Smooth {
        #[command(flatten)]
        mesh: MeshArgs,

        /// Number of iterations
        #[arg(short, long, default_value = "1")]
        iterations: usize,

        /// Evaluate points in parallel
        #[arg(long)]
        parallel: bool,

        /// Give up after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

#[derive(Args)]
struct MeshArgs {
    /// Procedural mesh to work on
    #[arg(long, value_enum, default_value = "icosphere")]
    mesh: MeshKind,

    /// Grid cells per side, icosphere subdivisions or fan radius
    #[arg(long, default_value = "3")]
    size: usize,

    /// Show a progress bar on stderr
    #[arg(long)]
    progress: bool,
}

#[derive(Args)]
struct WeightArgs {
    /// Seed vertex
    #[arg(long, default_value = "0")]
    seed: usize,

    /// Weighting method
    #[arg(short, long, value_enum, default_value = "simple")]
    method: Method,

    /// Number of rings (simple and laplace)
    #[arg(short, long, default_value = "1")]
    rings: usize,

    /// Diffusion blend factor, in [0, 0.5)
    #[arg(short, long, default_value = "0.25")]
    alpha: f64,

    /// Diffusion rounds
    #[arg(short, long, default_value = "1")]
    iterations: usize,

    /// Clamp parameters into range instead of rejecting them
    #[arg(long)]
    clamp: bool,

    /// Give up after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum MeshKind {
    /// Flat triangulated square grid
    Grid,
    /// Subdivided unit icosahedron
    Icosphere,
    /// Flat hexagonal disk of equilateral triangles
    Fan,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Method {
    /// Linear falloff over rings
    Simple,
    /// Iterative neighbor averaging
    Diffusion,
    /// Cotangent-Laplace solve with a pinned outer ring
    Laplace,
}

impl WeightArgs {
    fn method(&self) -> WeightMethod {
        let method = match self.method {
            Method::Simple => WeightMethod::SimpleHarmonic {
                ring_count: self.rings,
            },
            Method::Diffusion => WeightMethod::Diffusion {
                alpha: self.alpha,
                iterations: self.iterations,
            },
            Method::Laplace => WeightMethod::LaplaceSolve {
                ring_count: self.rings,
            },
        };
        if self.clamp {
            method.sanitized()
        } else {
            method
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Weights {
            mesh,
            weights,
            dump,
        } => cmd_weights(&mesh, &weights, dump)?,

        Commands::Deform {
            mesh,
            weights,
            distance,
        } => cmd_deform(&mesh, &weights, distance)?,

        Commands::Colorize { mesh, weights } => cmd_colorize(&mesh, &weights)?,

        Commands::Smooth {
            mesh,
            iterations,
            parallel,
            timeout_ms,
        } => cmd_smooth(&mesh, iterations, parallel, timeout_ms)?,
    }

    Ok(())
}

fn build_mesh(args: &MeshArgs) -> Result<PolyMesh, Box<dyn std::error::Error>> {
    let mesh = match args.mesh {
        MeshKind::Grid => primitives::grid(args.size)?,
        MeshKind::Icosphere => primitives::icosphere(args.size)?,
        MeshKind::Fan => primitives::hex_disk(args.size)?,
    };
    println!(
        "Mesh: {} vertices, {} cells",
        mesh.num_vertices(),
        mesh.num_cells()
    );
    Ok(mesh)
}

/// Create a progress reporter, optionally drawing a bar on stderr.
fn create_progress(show: bool, timeout_ms: Option<u64>) -> Progress {
    let progress = if show {
        let last_percent = Arc::new(AtomicUsize::new(usize::MAX));
        Progress::new(move |current, total, message| {
            if total == 0 {
                return;
            }
            let percent = (current.min(total) * 100) / total;
            if last_percent.swap(percent, Ordering::Relaxed) == percent {
                return;
            }

            let bar_width = 30;
            let filled = (percent * bar_width) / 100;
            eprint!(
                "\r[{}{}] {:3}% {:<24}",
                "=".repeat(filled),
                " ".repeat(bar_width - filled),
                percent,
                message
            );
            let _ = std::io::stderr().flush();
        })
    } else {
        Progress::none()
    };

    match timeout_ms {
        Some(ms) => progress.with_timeout(Duration::from_millis(ms)),
        None => progress,
    }
}

fn compute_weights(
    mesh: &PolyMesh,
    mesh_args: &MeshArgs,
    args: &WeightArgs,
) -> Result<Weights, Box<dyn std::error::Error>> {
    let method = args.method();
    let progress = create_progress(mesh_args.progress, args.timeout_ms);
    let seed = VertexId::new(args.seed);

    let start = Instant::now();
    let result = method.compute(mesh, seed, &progress);
    if mesh_args.progress {
        eprintln!();
    }
    let weights = result?;
    println!(
        "Computed {} weights from seed {} ({:?}, {:.2?})",
        method.name(),
        args.seed,
        method,
        start.elapsed()
    );
    Ok(weights)
}

fn cmd_weights(
    mesh_args: &MeshArgs,
    args: &WeightArgs,
    dump: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = build_mesh(mesh_args)?;
    let weights = compute_weights(&mesh, mesh_args, args)?;
    let values = weights.evaluate_all(mesh.num_vertices());

    let nonzero: Vec<(usize, f64)> = values
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, w)| w != 0.0)
        .collect();

    println!("Seed weight: {:.6}", weights.evaluate(weights.seed()));
    println!("Stored weights: {}", weights.support_len());
    println!("Non-zero weights: {} of {}", nonzero.len(), values.len());
    if !nonzero.is_empty() {
        let min = nonzero.iter().map(|&(_, w)| w).fold(f64::INFINITY, f64::min);
        let max = nonzero.iter().map(|&(_, w)| w).fold(f64::NEG_INFINITY, f64::max);
        let mean = nonzero.iter().map(|&(_, w)| w).sum::<f64>() / nonzero.len() as f64;
        println!("Range: [{:.6}, {:.6}], mean {:.6}", min, max, mean);
    }
    if let Weights::Laplace(laplace) = &weights {
        println!(
            "Laplace patch: {} points, {} interior, {} degenerate triangles skipped",
            laplace.ordering().len(),
            laplace.ordering().last_ring_start(),
            laplace.skipped_degenerate()
        );
    }

    if dump {
        for (i, w) in nonzero {
            println!("{:8} {:.9}", i, w);
        }
    }

    Ok(())
}

fn cmd_deform(
    mesh_args: &MeshArgs,
    args: &WeightArgs,
    distance: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = build_mesh(mesh_args)?;
    let weights = compute_weights(&mesh, mesh_args, args)?;
    let before = mesh.positions().to_vec();

    weighted_translate(&mut mesh, weights.seed(), distance, &weights)?;

    let displacements: Vec<f64> = before
        .iter()
        .zip(mesh.positions())
        .map(|(a, b)| (b - a).norm())
        .collect();
    let moved = displacements.iter().filter(|&&d| d > 0.0).count();
    let max = displacements.iter().copied().fold(0.0_f64, f64::max);

    println!("Moved {} points, max displacement {:.6}", moved, max);
    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    Ok(())
}

fn cmd_colorize(mesh_args: &MeshArgs, args: &WeightArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = build_mesh(mesh_args)?;
    let weights = compute_weights(&mesh, mesh_args, args)?;
    let ramp = ColorRamp::default();

    colorize(&mut mesh, weights.seed(), &weights, &ramp)?;

    let colors = mesh.colors().unwrap_or_default();
    let neutral = colors.iter().filter(|&&c| c == ramp.neutral).count();
    println!(
        "Painted {} points, {} left neutral",
        colors.len() - neutral,
        neutral
    );
    let [r, g, b] = ramp.color_at(1.0).to_u8();
    println!("Seed color: #{:02x}{:02x}{:02x}", r, g, b);

    Ok(())
}

fn cmd_smooth(
    mesh_args: &MeshArgs,
    iterations: usize,
    parallel: bool,
    timeout_ms: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = build_mesh(mesh_args)?;
    let options = SmoothOptions::default()
        .with_iterations(iterations)
        .with_parallel(parallel);
    let progress = create_progress(mesh_args.progress, timeout_ms);

    let mode = if parallel { "parallel" } else { "sequential" };
    println!("Applying Laplacian smoothing ({} iterations, {})...", iterations, mode);

    let start = Instant::now();
    let result = laplacian_smoothing_with_options(&mut mesh, &options, &progress);
    if mesh_args.progress {
        eprintln!();
    }
    result?;
    let elapsed = start.elapsed();

    if let Some((min, max)) = mesh.bounding_box() {
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }
    println!("Done ({:.2?})", elapsed);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_seed_belongs_to_weight_commands() {
        let cli = Cli::try_parse_from(["harmonica", "weights", "--seed", "4", "-m", "laplace"]).unwrap();
        match cli.command {
            Commands::Weights { weights, .. } => {
                assert_eq!(weights.seed, 4);
                assert!(weights.method == Method::Laplace);
            }
            _ => panic!("expected the weights command"),
        }

        assert!(Cli::try_parse_from(["harmonica", "smooth", "-i", "3"]).is_ok());
        assert!(Cli::try_parse_from(["harmonica", "smooth", "--seed", "4"]).is_err());
    }
}
