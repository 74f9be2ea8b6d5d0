//! Reconstruction of single-indexed meshes from multi-indexed data.
//!
//! Interchange formats such as COLLADA index every vertex attribute
//! separately: each face corner is a *record* holding one index per input.
//! GPUs want a single index per corner, so distinct records have to become
//! distinct vertices and equal records have to share one.
//!
//! The pipeline, leaf first:
//!
//! 1. [`parse_array`] reads each strided source array.
//! 2. [`InputLayout`] resolves the offset of a semantic within a record.
//! 3. [`CombinationMap`] deduplicates records into compact vertex indices.
//! 4. [`gather`] collects one value per compact vertex for a semantic.
//! 5. [`Mesh::assemble`] combines the index buffer and attribute arrays.
//!
//! [`MeshSource`] runs all of them for one mesh:
//!
//! ```
//! use std::collections::BTreeMap;
//! use tessera::build::{InputLayout, MeshSource};
//! use tessera::mesh::{AttributeArray, Semantic, Topology};
//! use nalgebra::{Point3, Vector3};
//!
//! let layout = InputLayout::positional(&[
//!     (Semantic::Position, "pos"),
//!     (Semantic::Normal, "nrm"),
//! ]);
//! let mut arrays = BTreeMap::new();
//! arrays.insert(
//!     Semantic::Position,
//!     AttributeArray::Point3(vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ]),
//! );
//! arrays.insert(Semantic::Normal, AttributeArray::Vector3(vec![Vector3::z()]));
//!
//! let source = MeshSource::new(Topology::Triangles, layout, vec![0, 0, 1, 0, 2, 0], arrays);
//! let mesh = source.build(None).unwrap();
//!
//! assert_eq!(mesh.indices(), &[0, 1, 2]);
//! assert_eq!(mesh.normals().unwrap().len(), 3);
//! ```
//!
//! [`Mesh::assemble`]: crate::mesh::Mesh::assemble

mod gather;
mod layout;
mod polygon;
mod source;
mod weld;

use std::collections::BTreeMap;

use log::debug;

pub use gather::{gather, gather_attribute};
pub use layout::{Input, InputLayout};
pub use polygon::triangulate;
pub use source::{parse_array, parse_attribute, parse_indices, parse_tokens, Accessor};
pub use weld::{CombinationKey, CombinationMap};

use crate::error::BuildError;
use crate::mesh::{AttributeArray, Mesh, Semantic, Topology};

/// Everything needed to build one mesh, as read from a document.
///
/// Holds the raw attribute arrays and the interleaved record array read-only;
/// every [`build`](MeshSource::build) call works on private scratch state, so
/// one source may be built from several threads at once.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSource {
    topology: Topology,
    layout: InputLayout,
    records: Vec<u32>,
    arrays: BTreeMap<Semantic, AttributeArray>,
}

impl MeshSource {
    /// Bundle document data for one mesh.
    pub fn new(
        topology: Topology,
        layout: InputLayout,
        records: Vec<u32>,
        arrays: BTreeMap<Semantic, AttributeArray>,
    ) -> Self {
        Self {
            topology,
            layout,
            records,
            arrays,
        }
    }

    /// Primitive topology of the mesh.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// The bound inputs.
    pub fn layout(&self) -> &InputLayout {
        &self.layout
    }

    /// The interleaved record array.
    pub fn records(&self) -> &[u32] {
        &self.records
    }

    /// The raw array of `semantic`.
    pub fn array(&self, semantic: Semantic) -> Option<&AttributeArray> {
        self.arrays.get(&semantic)
    }

    /// Build the mesh.
    ///
    /// `semantics` selects the attributes to gather; `None` gathers every
    /// bound input. A requested semantic that is not bound is skipped. Any
    /// other failure aborts the build.
    pub fn build(&self, semantics: Option<&[Semantic]>) -> Result<Mesh, BuildError> {
        let stride = self.layout.stride();
        let map = CombinationMap::build(&self.records, stride)?;

        let corners = self.topology.corners();
        if map.corner_count() % corners != 0 {
            return Err(BuildError::count_mismatch(
                "primitive corners",
                map.corner_count().div_ceil(corners) * corners,
                map.corner_count(),
            ));
        }

        let mut requested: Vec<Semantic> = match semantics {
            Some(list) => list.to_vec(),
            None => self.layout.inputs().iter().map(|i| i.semantic).collect(),
        };
        requested.sort();
        requested.dedup();

        let mut attributes = Vec::with_capacity(requested.len());
        for semantic in requested {
            let offset = match self.layout.offset_of(semantic) {
                Ok(offset) => offset,
                Err(BuildError::UnknownSemantic(s)) => {
                    debug!("{} is not bound to this mesh, skipping", s);
                    continue;
                }
                Err(e) => return Err(e),
            };
            let raw = self
                .arrays
                .get(&semantic)
                .ok_or_else(|| BuildError::missing(format!("source array of {}", semantic)))?;
            attributes.push((semantic, gather_attribute(semantic, raw, offset, &map)?));
        }

        let vertex_count = map.len();
        Mesh::assemble(self.topology, map.into_indices(), vertex_count, attributes)
    }
}
