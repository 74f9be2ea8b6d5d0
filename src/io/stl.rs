//! STL (stereolithography) format support.
//!
//! STL stores independent triangles with facet normals. Loading yields an
//! indexed position-only mesh; facet normals are recomputed on save.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{AttributeArray, Mesh, Semantic, Topology};

/// Load a mesh from an STL file.
///
/// Automatically detects binary vs ASCII format.
///
/// # Example
///
/// ```no_run
/// use tessera::io::stl;
///
/// let mesh = stl::load("part.stl").unwrap();
/// assert!(mesh.normals().is_none());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let positions: Vec<Point3<f32>> = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0], v[1], v[2]))
        .collect();

    let mut indices = Vec::with_capacity(stl.faces.len() * 3);
    for face in &stl.faces {
        for &corner in &face.vertices {
            let index = u32::try_from(corner).map_err(|_| MeshError::LoadError {
                path: path.to_path_buf(),
                message: format!("vertex index {} does not fit 32 bits", corner),
            })?;
            indices.push(index);
        }
    }

    let vertex_count = positions.len();
    Mesh::assemble(
        Topology::Triangles,
        indices,
        vertex_count,
        vec![(Semantic::Position, AttributeArray::Point3(positions))],
    )
    .map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Save a triangle mesh to a binary STL file.
///
/// Facet normals are computed from the winding; degenerate triangles get a
/// zero normal.
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let positions = mesh.positions().ok_or_else(|| MeshError::SaveError {
        path: path.to_path_buf(),
        message: "mesh has no positions".to_string(),
    })?;
    if mesh.topology() != Topology::Triangles {
        return Err(MeshError::SaveError {
            path: path.to_path_buf(),
            message: "only triangle meshes can be saved as STL".to_string(),
        });
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let triangles: Vec<stl_io::Triangle> = mesh
        .triangles()
        .map(|[a, b, c]| {
            let p0 = &positions[a as usize];
            let p1 = &positions[b as usize];
            let p2 = &positions[c as usize];

            let n = (p1 - p0)
                .cross(&(p2 - p0))
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::zeros);

            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x, n.y, n.z]),
                vertices: [
                    stl_io::Vertex::new([p0.x, p0.y, p0.z]),
                    stl_io::Vertex::new([p1.x, p1.y, p1.z]),
                    stl_io::Vertex::new([p2.x, p2.y, p2.z]),
                ],
            }
        })
        .collect();

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn tetrahedron() -> Mesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        Mesh::assemble(
            Topology::Triangles,
            vec![0, 2, 1, 0, 1, 3, 1, 2, 3, 0, 3, 2],
            4,
            vec![(Semantic::Position, AttributeArray::Point3(positions))],
        )
        .unwrap()
    }

    #[test]
    fn test_save_and_reload() {
        let mesh = tetrahedron();
        let file = NamedTempFile::new().unwrap();
        save(&mesh, file.path()).unwrap();

        let reloaded = load(file.path()).unwrap();
        assert_eq!(reloaded.num_primitives(), 4);
        assert_eq!(reloaded.bounding_box(), mesh.bounding_box());

        let corners = |m: &Mesh| -> Vec<Point3<f32>> {
            let positions = m.positions().unwrap();
            m.indices().iter().map(|&i| positions[i as usize]).collect()
        };
        assert_eq!(corners(&reloaded), corners(&mesh));
    }

    #[test]
    fn test_save_lines_rejected() {
        let positions = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let mesh = Mesh::assemble(
            Topology::Lines,
            vec![0, 1],
            2,
            vec![(Semantic::Position, AttributeArray::Point3(positions))],
        )
        .unwrap();
        let file = NamedTempFile::new().unwrap();

        assert!(matches!(
            save(&mesh, file.path()),
            Err(MeshError::SaveError { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load("/nonexistent/part.stl"),
            Err(MeshError::Io(_))
        ));
    }
}
