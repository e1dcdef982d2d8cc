//! Motion-graph CLI.
//!
//! `mograph build` runs the offline pipeline (distance matrices,
//! transition candidates, graph construction) over a clip dataset and
//! dumps the resulting graph. `mograph walk` additionally searches the
//! graph along a target ground path and emits the synthesized frames;
//! `mograph random` wanders the graph with a seeded generator.
//!
//! The CLI exits with code `0` on success and non-zero on error.

#![deny(rust_2018_idioms)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]
// The CLI is expected to print to stdout/stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod model;
mod pipeline;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use model::Dataset;
use pipeline::{build_graph, load_path, random_walk, walk, FrameOut, GraphSettings};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(clap::Args, Debug)]
struct GraphArgs {
    /// Dataset file (skeleton + clips, JSON)
    dataset: PathBuf,
    /// Transition window length, in frames
    #[clap(long, default_value_t = 20)]
    window: usize,
    /// Stride between compared window starts
    #[clap(long, default_value_t = 1)]
    step: usize,
    /// Distance threshold for transition candidates (unset keeps all minima)
    #[clap(long)]
    threshold: Option<f32>,
    /// Directory for cached distance matrices
    #[clap(long)]
    cache_dir: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Build the motion graph and dump its structure
    Build {
        #[clap(flatten)]
        graph: GraphArgs,
        /// Write the graph dump here instead of stdout
        #[clap(long)]
        out: Option<PathBuf>,
    },
    /// Build the graph and walk it along a target path
    Walk {
        #[clap(flatten)]
        graph: GraphArgs,
        /// Path file: a JSON array of [x, y, z] ground points
        #[clap(long)]
        path: PathBuf,
        /// Resampling spacing for the path, in world units
        #[clap(long, default_value_t = 0.5)]
        spacing: f32,
        /// Frame rate the search parameters are scaled to
        #[clap(long, default_value_t = 120)]
        fps: usize,
        /// Write the frames here instead of stdout
        #[clap(long)]
        out: Option<PathBuf>,
    },
    /// Build the graph and wander it randomly
    Random {
        #[clap(flatten)]
        graph: GraphArgs,
        /// Seed for the walk
        #[clap(long, default_value_t = 0)]
        seed: u64,
        /// Number of frames to produce
        #[clap(long, default_value_t = 240)]
        count: usize,
        /// Write the frames here instead of stdout
        #[clap(long)]
        out: Option<PathBuf>,
    },
}

impl GraphArgs {
    fn settings(&self) -> GraphSettings {
        GraphSettings {
            window: self.window,
            step: self.step,
            threshold: self.threshold,
            cache_dir: self.cache_dir.clone(),
        }
    }
}

fn emit(out: Option<&PathBuf>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn emit_frames(out: Option<&PathBuf>, frames: &[FrameOut]) -> Result<()> {
    let json = serde_json::to_string_pretty(frames).context("serializing frames")?;
    emit(out, &json)
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable (frames are JSON).
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let args = Args::parse();

    match args.cmd {
        Command::Build { graph, out } => {
            let dataset = Dataset::load(&graph.dataset)?;
            let built = build_graph(&dataset, &graph.settings())?;
            println!("graph: {} nodes", built.node_count());
            emit(out.as_ref(), &built.describe())?;
        }
        Command::Walk {
            graph,
            path,
            spacing,
            fps,
            out,
        } => {
            let dataset = Dataset::load(&graph.dataset)?;
            let built = build_graph(&dataset, &graph.settings())?;
            let pathline = load_path(&path, spacing)?;
            let frames = walk(&built, &pathline, fps)?;
            emit_frames(out.as_ref(), &frames)?;
        }
        Command::Random {
            graph,
            seed,
            count,
            out,
        } => {
            let dataset = Dataset::load(&graph.dataset)?;
            let built = build_graph(&dataset, &graph.settings())?;
            let frames = random_walk(&built, seed, count)?;
            emit_frames(out.as_ref(), &frames)?;
        }
    }

    Ok(())
}
