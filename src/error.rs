//! Error types for tessera.
//!
//! [`BuildError`] covers everything that can go wrong while reconstructing a
//! single mesh. It aborts only that mesh and is cheap to clone, so importers can
//! keep it around per geometry. [`MeshError`] is the crate-level error returned
//! by file I/O and importer entry points.

use std::path::PathBuf;
use thiserror::Error;

use crate::mesh::Semantic;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that abort the construction of one mesh.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A declared element count disagrees with the data actually present.
    #[error("count mismatch in {context}: expected {expected}, found {actual}")]
    CountMismatch {
        /// What was being counted (source id, index stream, ...).
        context: String,
        /// The count implied by the declaration.
        expected: usize,
        /// The count actually found.
        actual: usize,
    },

    /// A token in a numeric stream could not be parsed.
    #[error("malformed number {token:?} at token {position}")]
    NumericFormat {
        /// The offending token.
        token: String,
        /// Zero-based token position within the stream.
        position: usize,
    },

    /// The requested semantic is not bound to this mesh.
    #[error("semantic {0} is not bound to this mesh")]
    UnknownSemantic(Semantic),

    /// A record references an element past the end of its attribute array.
    #[error("{semantic} index {index} out of range (array has {len} elements)")]
    DanglingIndex {
        /// The attribute being gathered.
        semantic: Semantic,
        /// The out-of-range original index.
        index: usize,
        /// Length of the raw attribute array.
        len: usize,
    },

    /// A post-condition of mesh assembly does not hold.
    #[error("internal consistency violated: {0}")]
    InternalConsistency(String),

    /// A value the document must provide could not be found.
    #[error("document has no value for {query}")]
    MissingValue {
        /// The query that produced no result.
        query: String,
    },

    /// The geometry has no supported primitive element.
    #[error("geometry has no triangles, polylist or lines element")]
    MissingPrimitive,

    /// A polygon has fewer than three corners.
    #[error("polygon {polygon} has only {corners} corners")]
    DegeneratePolygon {
        /// The polygon index.
        polygon: usize,
        /// Its corner count.
        corners: usize,
    },

    /// A polygon is not a triangle and triangulation is disabled.
    #[error("polygon {polygon} has {corners} corners and triangulation is disabled")]
    NonTriangularPolygon {
        /// The polygon index.
        polygon: usize,
        /// Its corner count.
        corners: usize,
    },

    /// More distinct vertices than a 32-bit index buffer can address.
    #[error("{count} vertices exceed the 32-bit index range")]
    IndexOverflow {
        /// The number of distinct vertices.
        count: usize,
    },
}

impl BuildError {
    /// Create a count mismatch error.
    pub fn count_mismatch(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        BuildError::CountMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Create a missing value error for `query`.
    pub fn missing(query: impl Into<String>) -> Self {
        BuildError::MissingValue {
            query: query.into(),
        }
    }
}

/// Errors returned by importers and file I/O.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Mesh reconstruction failed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not well-formed XML.
    #[error("XML error at byte {position}: {message}")]
    Xml {
        /// Byte offset where parsing stopped.
        position: u64,
        /// Parser message.
        message: String,
    },

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// A mesh id past the end of the document.
    #[error("mesh {id} out of range (document has {count} meshes)")]
    MeshOutOfRange {
        /// The requested id.
        id: usize,
        /// Number of meshes in the document.
        count: usize,
    },

    /// Every mesh in the document failed to build.
    #[error("none of the {count} meshes in the document could be built")]
    NoMeshes {
        /// Number of meshes in the document.
        count: usize,
    },
}
