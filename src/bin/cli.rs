// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polycut CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;
use nalgebra::Vector3;
use polycut::geometry::{BoundingBox, HalfEdgeMesh, Primitive};
use polycut::{io, CutKernel, KernelConfig, KernelError};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "polycut")]
#[command(about = "Polycut - half-edge meshes and implicit BVH preprocessing for mesh cutting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./polycut.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print statistics of an OFF mesh
    Info {
        /// Input OFF file
        input: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List candidate face pairs between a source and a cut mesh
    Pairs {
        /// Source mesh (OFF)
        source: PathBuf,

        /// Cut mesh (OFF)
        cut: PathBuf,

        /// Maximum number of pairs to print
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Re-write an OFF file with dense vertex numbering
    Convert {
        /// Input OFF file
        input: PathBuf,

        /// Output OFF file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write a primitive mesh as OFF
    Generate {
        #[arg(value_enum)]
        shape: Shape,

        /// Output OFF file
        #[arg(short, long)]
        output: PathBuf,

        /// Edge length of the cube, size of the grid or height of the prism
        #[arg(short, long, default_value = "10.0")]
        size: f64,

        /// Subdivisions of a grid or segments of a prism
        #[arg(short = 'n', long, default_value = "8")]
        resolution: u32,
    },

    /// Show version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum Shape {
    Cube,
    Prism,
    Grid,
}

#[derive(Serialize)]
struct MeshInfo {
    vertices: usize,
    edges: usize,
    halfedges: usize,
    faces: usize,
    border_edges: usize,
    max_face_degree: usize,
    bounding_box: BoundingBox,
    valid: bool,
}

impl MeshInfo {
    fn of(mesh: &HalfEdgeMesh) -> Self {
        Self {
            vertices: mesh.number_of_vertices(),
            edges: mesh.number_of_edges(),
            halfedges: mesh.number_of_halfedges(),
            faces: mesh.number_of_faces(),
            border_edges: mesh.edges().filter(|&e| mesh.is_border_edge(e)).count(),
            max_face_degree: mesh.faces().map(|f| mesh.degree(f)).max().unwrap_or(0),
            bounding_box: mesh.bounding_box(),
            valid: mesh.validate().is_ok(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = KernelConfig::resolve(cli.config.as_deref(), cli.verbose, |key| {
        std::env::var(key).ok()
    })?;
    init_logger(config.level_filter());

    match cli.command {
        Commands::Info { input, json } => info_command(&input, json)?,
        Commands::Pairs { source, cut, limit } => pairs_command(&source, &cut, limit, config)?,
        Commands::Convert { input, output } => convert_command(&input, &output, &config)?,
        Commands::Generate {
            shape,
            output,
            size,
            resolution,
        } => generate_command(shape, &output, size, resolution)?,
        Commands::Version => {
            println!("Polycut v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn init_logger(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.target(env_logger::Target::Stderr);
    builder.filter_level(level);

    if let Err(err) = builder.try_init() {
        eprintln!("Failed to initialize logger: {}", err);
    }
}

fn load(path: &Path) -> Result<HalfEdgeMesh> {
    if !path.exists() {
        bail!("Input file not found: {}", path.display());
    }
    io::read_off(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn info_command(input: &Path, json: bool) -> Result<()> {
    let mesh = load(input)?;
    let info = MeshInfo::of(&mesh);

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", input.display().to_string().bold());
    println!("  Vertices:     {}", info.vertices);
    println!("  Edges:        {}", info.edges);
    println!("  Halfedges:    {}", info.halfedges);
    println!("  Faces:        {}", info.faces);
    println!("  Border edges: {}", info.border_edges);
    println!("  Max degree:   {}", info.max_face_degree);
    if !info.bounding_box.is_empty() {
        let (min, max) = (info.bounding_box.min, info.bounding_box.max);
        println!(
            "  Bounds:       [{}, {}, {}] - [{}, {}, {}]",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
    match mesh.validate() {
        Ok(()) => println!("  {}", "✓ connectivity valid".green()),
        Err(err) => println!("  {} {}", "✗".red(), err),
    }

    Ok(())
}

fn pairs_command(source: &Path, cut: &Path, limit: usize, config: KernelConfig) -> Result<()> {
    let kernel = CutKernel::with_config(load(source)?, load(cut)?, config);

    let start = std::time::Instant::now();
    let pairs = match kernel.shortlist() {
        Ok(pairs) => pairs,
        Err(KernelError::NoMeshIntersection) => {
            println!("{}", "No overlapping face pairs".yellow());
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    let elapsed = start.elapsed();

    let total = kernel.source().number_of_faces() * kernel.cut().number_of_faces();
    println!(
        "{} {} candidate pairs of {} ({:.2?})",
        "✓".green(),
        pairs.len().to_string().bold(),
        total,
        elapsed
    );
    for (source_face, cut_face) in pairs.iter().take(limit) {
        println!("  {} x {}", source_face, cut_face);
    }
    if pairs.len() > limit {
        println!("  ... {} more", pairs.len() - limit);
    }

    Ok(())
}

fn convert_command(input: &Path, output: &Path, config: &KernelConfig) -> Result<()> {
    let mesh = load(input)?;
    if config.verbose {
        println!(
            "Read {} vertices, {} faces",
            mesh.number_of_vertices(),
            mesh.number_of_faces()
        );
    }

    io::write_off(output, &mesh).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Successfully converted {} -> {}", input.display(), output.display());
    Ok(())
}

fn generate_command(shape: Shape, output: &Path, size: f64, resolution: u32) -> Result<()> {
    let primitive = match shape {
        Shape::Cube => Primitive::cube(Vector3::new(size, size, size), true),
        Shape::Prism => Primitive::prism(size, size / 2.0, resolution),
        Shape::Grid => Primitive::grid(resolution, resolution, size, 0.0),
    };
    let mesh = primitive.to_mesh()?;

    io::write_off(output, &mesh).with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Wrote {} ({} vertices, {} faces)",
        output.display(),
        mesh.number_of_vertices(),
        mesh.number_of_faces()
    );
    Ok(())
}
