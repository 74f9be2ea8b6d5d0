//! Mesh file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | COLLADA | `.dae` | ✓ | ✗ | Multi-indexed, any number of meshes |
//! | PLY | `.ply` | ✓ | ✓ | Stanford polygon format, ASCII output |
//! | STL | `.stl` | ✓ | ✓ | Binary and ASCII input, binary output |
//!
//! # Usage
//!
//! ```no_run
//! use tessera::io::{load_meshes, save, ImportOptions};
//!
//! let meshes = load_meshes("scene.dae", &ImportOptions::default()).unwrap();
//! save(&meshes[0], "first.ply").unwrap();
//! ```

pub mod collada;
pub mod ply;
pub mod stl;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::{Mesh, Semantic};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// COLLADA digital asset format.
    Collada,
    /// PLY (Stanford polygon) format.
    Ply,
    /// STL (stereolithography) format.
    Stl,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "dae" => Some(Format::Collada),
            "ply" => Some(Format::Ply),
            "stl" => Some(Format::Stl),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    fn detect(path: &Path) -> Result<Format> {
        Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
                .to_string(),
        })
    }
}

/// Options controlling how meshes are imported.
///
/// # Example
///
/// ```
/// use tessera::io::ImportOptions;
/// use tessera::mesh::Semantic;
///
/// let options = ImportOptions::default()
///     .with_semantics(vec![Semantic::Position, Semantic::Normal])
///     .sequential();
/// assert!(options.triangulate);
/// assert!(!options.parallel);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Fan triangulate polygons with more than three corners (default: true).
    ///
    /// When disabled such polygons fail the mesh.
    pub triangulate: bool,
    /// Build meshes of a document in parallel (default: true).
    pub parallel: bool,
    /// Attributes to gather; `None` gathers every bound input.
    pub semantics: Option<Vec<Semantic>>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            triangulate: true,
            parallel: true,
            semantics: None,
        }
    }
}

impl ImportOptions {
    /// Enable or disable polygon triangulation.
    pub fn with_triangulate(mut self, triangulate: bool) -> Self {
        self.triangulate = triangulate;
        self
    }

    /// Enable or disable parallel mesh building.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build meshes one after another.
    pub fn sequential(self) -> Self {
        self.with_parallel(false)
    }

    /// Restrict the gathered attributes.
    pub fn with_semantics(mut self, semantics: Vec<Semantic>) -> Self {
        self.semantics = Some(semantics);
        self
    }
}

/// Load every usable mesh of a file with automatic format detection.
///
/// PLY and STL files hold exactly one mesh. COLLADA meshes that cannot be
/// built are logged and skipped.
pub fn load_meshes<P: AsRef<Path>>(path: P, options: &ImportOptions) -> Result<Vec<Mesh>> {
    let path = path.as_ref();

    match Format::detect(path)? {
        Format::Collada => {
            let importer = collada::ColladaImporter::open(path, options.clone())?;
            Ok(importer.meshes()?.into_iter().flatten().collect())
        }
        Format::Ply => Ok(vec![ply::load(path)?]),
        Format::Stl => Ok(vec![stl::load(path)?]),
    }
}

/// Save a triangle mesh with automatic format detection.
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();

    match Format::detect(path)? {
        Format::Ply => ply::save(mesh, path),
        Format::Stl => stl::save(mesh, path),
        Format::Collada => Err(MeshError::SaveError {
            path: path.to_path_buf(),
            message: "COLLADA saving is not supported".to_string(),
        }),
    }
}
