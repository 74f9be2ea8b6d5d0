//! # Tessera
//!
//! Rebuilds GPU-ready, single-indexed meshes from multi-indexed interchange
//! formats such as COLLADA.
//!
//! Interchange formats index every vertex attribute separately, so one face
//! corner may use position 7, normal 2 and texture coordinate 40. Tessera
//! turns each distinct combination into one output vertex and rewrites the
//! faces to a single index buffer.
//!
//! ## Features
//!
//! - **Exact deduplication**: equal index combinations always share a vertex,
//!   compact indices are assigned in first-seen order
//! - **COLLADA import**: `<triangles>`, `<polylist>` and `<lines>`, with
//!   `VERTEX` indirection and any number of texture coordinate and color sets
//! - **Parallel import**: meshes of one document are built with rayon
//! - **Other formats**: PLY and STL load and save
//!
//! ## Quick Start
//!
//! ```no_run
//! use tessera::prelude::*;
//!
//! let importer = ColladaImporter::open("scene.dae", ImportOptions::default()).unwrap();
//! for mesh in importer.meshes().unwrap().into_iter().flatten() {
//!     println!("{} vertices, {} triangles", mesh.vertex_count(), mesh.num_primitives());
//! }
//! ```
//!
//! ## Building From Records
//!
//! The reconstruction works on any interleaved record array, not only on
//! documents:
//!
//! ```
//! use tessera::build::CombinationMap;
//!
//! // (position, texcoord) pairs of four corners
//! let records = [0, 0, 1, 0, 0, 0, 1, 1];
//! let map = CombinationMap::build(&records, 2).unwrap();
//!
//! assert_eq!(map.indices(), &[0, 1, 0, 2]);
//! assert_eq!(map.len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod build;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    pub use crate::build::{CombinationMap, InputLayout, MeshSource};
    pub use crate::error::{BuildError, MeshError, Result};
    pub use crate::io::collada::{ColladaImporter, DocumentQuery};
    pub use crate::io::ImportOptions;
    pub use crate::mesh::{AttributeArray, Mesh, Semantic, Topology};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
