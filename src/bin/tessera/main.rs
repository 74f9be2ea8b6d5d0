//! Tessera CLI - inspect and convert multi-indexed meshes.
//!
//! Usage: tessera <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `tessera --help` for available commands.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use log::info;

use tessera::io::collada::ColladaImporter;
use tessera::io::{self, Format, ImportOptions};
use tessera::mesh::Mesh;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(author, version, about = "Multi-index mesh import CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display information about every mesh in a file
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Convert one mesh to PLY or STL
    Convert {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Index of the mesh to convert
        #[arg(short, long, default_value = "0")]
        mesh: usize,

        /// Reject polygons instead of fan triangulating them
        #[arg(long)]
        no_triangulate: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Convert {
            input,
            output,
            mesh,
            no_triangulate,
            sequential,
        } => {
            let options = ImportOptions::default()
                .with_triangulate(!no_triangulate)
                .with_parallel(!sequential);
            cmd_convert(&input, &output, mesh, options)?;
        }
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("File: {}", input.display());

    let start = Instant::now();
    if Format::from_path(input) == Some(Format::Collada) {
        let importer = ColladaImporter::open(input, ImportOptions::default())?;
        println!("Meshes: {}", importer.mesh_count());

        for id in 0..importer.mesh_count() {
            println!();
            println!("Mesh {}: {}", id, importer.mesh_name(id).unwrap_or("(unnamed)"));
            match importer.try_mesh(id) {
                Ok(mesh) => print_mesh(&mesh),
                Err(e) => println!("  Unavailable: {}", e),
            }
        }
    } else {
        for mesh in io::load_meshes(input, &ImportOptions::default())? {
            print_mesh(&mesh);
        }
    }
    info!("inspected {} in {:.2?}", input.display(), start.elapsed());

    Ok(())
}

fn print_mesh(mesh: &Mesh) {
    println!("  Topology: {:?}", mesh.topology());
    println!("  Vertices: {}", mesh.vertex_count());
    println!("  Indices: {}", mesh.indices().len());
    println!("  Primitives: {}", mesh.num_primitives());

    let attributes: Vec<String> = mesh.attributes().map(|(s, _)| s.to_string()).collect();
    println!("  Attributes: {}", attributes.join(", "));

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "  Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
}

fn cmd_convert(
    input: &Path,
    output: &Path,
    id: usize,
    options: ImportOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mesh = if Format::from_path(input) == Some(Format::Collada) {
        ColladaImporter::open(input, options)?.try_mesh(id)?
    } else {
        let mut meshes = io::load_meshes(input, &options)?;
        if id >= meshes.len() {
            return Err(format!("mesh {} out of range, file has {}", id, meshes.len()).into());
        }
        meshes.swap_remove(id)
    };
    let elapsed = start.elapsed();

    println!(
        "Loaded: {} vertices, {} primitives ({:.2?})",
        mesh.vertex_count(),
        mesh.num_primitives(),
        elapsed
    );

    io::save(&mesh, output)?;
    println!("Saved: {}", output.display());

    Ok(())
}
