use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{self, WrapErr};
use ndarray::Ix2;
use tracing::{info, Level};

use tile_stack_core::{
    common::arr_meta::ArrayStats, stack::max_over, ImageStack, ProjectionAxis, TileCollection,
};

mod render;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory descriptor paths are resolved against
    #[arg(short, long, value_name = "DIR", global = true)]
    base: Option<PathBuf>,

    /// Log more, repeat for even more
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the geometry of a stack and statistics for each tile
    Info {
        /// Path to the stack descriptor (.json)
        descriptor: String,
    },
    /// Max-project a stack along one axis
    Project {
        descriptor: String,

        /// One of round, channel, z
        #[arg(short, long)]
        axis: ProjectionAxis,

        /// Render the projection, reduced to 2D, as a heatmap
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,

        /// Pixels per projected pixel in the rendered image
        #[arg(long, default_value_t = 4)]
        scale: u32,
    },
    /// Write a stack back out, naming tiles after their grid position
    Rewrite {
        descriptor: String,

        /// Path of the new descriptor, tiles are written next to it
        destination: PathBuf,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let base = cli.base.as_deref();
    match cli.command {
        Command::Info { descriptor } => info_cmd(&load(&descriptor, base)?),
        Command::Project {
            descriptor,
            axis,
            png,
            scale,
        } => project_cmd(&load(&descriptor, base)?, axis, png.as_deref(), scale),
        Command::Rewrite {
            descriptor,
            destination,
        } => {
            let stack = load(&descriptor, base)?;
            stack
                .write(&destination, None)
                .wrap_err_with(|| format!("Failed to write {}", destination.display()))?;
            info!(destination = %destination.display(), "Rewrote stack");
            Ok(())
        }
    }
}

fn load(descriptor: &str, base: Option<&Path>) -> eyre::Result<ImageStack> {
    ImageStack::from_descriptor(descriptor, base)
        .wrap_err_with(|| format!("Failed to load stack {descriptor}"))
}

fn info_cmd(stack: &ImageStack) -> eyre::Result<()> {
    println!("shape:       {:?}", stack.shape());
    println!("rounds:      {}", stack.num_rounds());
    println!("channels:    {}", stack.num_channels());
    println!("tile shape:  {:?}", stack.tile_shape());
    println!("volumetric:  {}", stack.is_volumetric());
    println!(
        "tiles:       {} of {} slots",
        stack.tile_index().num_populated(),
        stack.num_rounds() * stack.num_channels()
    );

    for tile in stack.collection().tiles() {
        match ArrayStats::from_array(&tile.data) {
            Some(stats) => println!(
                "  {} x={} y={}: min {} max {} mean {:.3} std {:.3}",
                tile.indices,
                tile.coordinates.x,
                tile.coordinates.y,
                stats.range.min,
                stats.range.max,
                stats.mean,
                stats.std_dev
            ),
            None => println!(
                "  {} x={} y={}: empty",
                tile.indices, tile.coordinates.x, tile.coordinates.y
            ),
        }
    }

    Ok(())
}

fn project_cmd(
    stack: &ImageStack,
    axis: ProjectionAxis,
    png: Option<&Path>,
    scale: u32,
) -> eyre::Result<()> {
    let projection = stack.max_projection_along(axis)?;

    println!("projection along {axis}: {:?}", projection.shape());
    if let Some(stats) = ArrayStats::from_array(&projection) {
        println!(
            "  min {} max {} mean {:.3} std {:.3}",
            stats.range.min, stats.range.max, stats.mean, stats.std_dev
        );
    }

    if let Some(png) = png {
        let mut image = projection;
        while image.ndim() > 2 {
            image = max_over(image.view(), 0);
        }
        let image = image.into_dimensionality::<Ix2>()?;

        render::heatmap(image.view(), png, scale)
            .wrap_err_with(|| format!("Failed to render {}", png.display()))?;
        info!(path = %png.display(), "Rendered projection");
    }

    Ok(())
}
