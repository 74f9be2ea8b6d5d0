//! The indexed mesh entity.

use std::collections::BTreeMap;

use nalgebra::{Point3, Vector2, Vector3, Vector4};

use super::attribute::{AttributeArray, Semantic};
use crate::error::BuildError;

/// How the index buffer is interpreted as primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Independent line segments, two indices each.
    Lines,
    /// Independent triangles, three indices each.
    Triangles,
}

impl Topology {
    /// Number of indices per primitive.
    pub const fn corners(self) -> usize {
        match self {
            Topology::Lines => 2,
            Topology::Triangles => 3,
        }
    }
}

/// A single-indexed mesh ready for upload to a GPU.
///
/// Every attribute array has exactly [`vertex_count`](Mesh::vertex_count)
/// elements and is addressed by the values in [`indices`](Mesh::indices).
/// A mesh owns all of its data and does not borrow from the document it was
/// imported from.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    topology: Topology,
    indices: Vec<u32>,
    vertex_count: usize,
    attributes: BTreeMap<Semantic, AttributeArray>,
}

impl Mesh {
    /// Assemble a mesh from an index buffer and per-semantic attribute arrays.
    ///
    /// Fails with [`BuildError::InternalConsistency`] if an attribute array's
    /// length differs from `vertex_count`, if an index is out of range, or if
    /// a semantic appears twice.
    ///
    /// # Example
    ///
    /// ```
    /// use tessera::mesh::{AttributeArray, Mesh, Semantic, Topology};
    /// use nalgebra::Point3;
    ///
    /// let positions = AttributeArray::Point3(vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// ]);
    /// let mesh = Mesh::assemble(
    ///     Topology::Triangles,
    ///     vec![0, 1, 2],
    ///     3,
    ///     vec![(Semantic::Position, positions)],
    /// )
    /// .unwrap();
    /// assert_eq!(mesh.num_primitives(), 1);
    /// ```
    pub fn assemble(
        topology: Topology,
        indices: Vec<u32>,
        vertex_count: usize,
        attributes: Vec<(Semantic, AttributeArray)>,
    ) -> Result<Self, BuildError> {
        let mut map = BTreeMap::new();
        for (semantic, array) in attributes {
            if array.len() != vertex_count {
                return Err(BuildError::InternalConsistency(format!(
                    "{} has {} elements, mesh has {} vertices",
                    semantic,
                    array.len(),
                    vertex_count
                )));
            }
            if map.insert(semantic, array).is_some() {
                return Err(BuildError::InternalConsistency(format!(
                    "{} assembled twice",
                    semantic
                )));
            }
        }

        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(BuildError::InternalConsistency(format!(
                "index {} out of range for {} vertices",
                index, vertex_count
            )));
        }

        Ok(Self {
            topology,
            indices,
            vertex_count,
            attributes: map,
        })
    }

    /// Primitive topology.
    #[inline]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// The index buffer, one entry per primitive corner.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of distinct vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of complete primitives in the index buffer.
    pub fn num_primitives(&self) -> usize {
        self.indices.len() / self.topology.corners()
    }

    /// Check if the mesh has no primitives.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The attribute array bound to `semantic`, if any.
    pub fn attribute(&self, semantic: Semantic) -> Option<&AttributeArray> {
        self.attributes.get(&semantic)
    }

    /// Check if `semantic` is present.
    pub fn has_attribute(&self, semantic: Semantic) -> bool {
        self.attributes.contains_key(&semantic)
    }

    /// Iterate over all attributes in semantic order.
    pub fn attributes(&self) -> impl Iterator<Item = (Semantic, &AttributeArray)> + '_ {
        self.attributes.iter().map(|(&s, a)| (s, a))
    }

    /// Vertex positions.
    pub fn positions(&self) -> Option<&[Point3<f32>]> {
        self.attribute(Semantic::Position)?.as_point3()
    }

    /// Vertex normals.
    pub fn normals(&self) -> Option<&[Vector3<f32>]> {
        self.attribute(Semantic::Normal)?.as_vector3()
    }

    /// Texture coordinates of the given set.
    pub fn texcoords(&self, set: u32) -> Option<&[Vector2<f32>]> {
        self.attribute(Semantic::TexCoord(set))?.as_vector2()
    }

    /// Vertex colors of the given set.
    pub fn colors(&self, set: u32) -> Option<&[Vector4<f32>]> {
        self.attribute(Semantic::Color(set))?.as_vector4()
    }

    /// Iterate over triangles as index triples.
    ///
    /// Yields nothing for non-triangle topologies.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        let indices: &[u32] = match self.topology {
            Topology::Triangles => &self.indices,
            Topology::Lines => &[],
        };
        indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Axis-aligned bounding box of the positions.
    ///
    /// Returns `None` if the mesh has no positions.
    pub fn bounding_box(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let positions = self.positions()?;
        let first = positions.first()?;

        let mut min = *first;
        let mut max = *first;
        for p in &positions[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some((min, max))
    }
}
