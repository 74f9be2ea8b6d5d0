//! PLY (Stanford polygon) format support.
//!
//! PLY files are already single-indexed: one `vertex` element per vertex and
//! one `face` element per polygon. Positions and, when present, normals are
//! read; polygons are fan triangulated.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::{Point3, Vector3};
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{MeshError, Result};
use crate::mesh::{AttributeArray, Mesh, Semantic, Topology};

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use tessera::io::ply;
///
/// let mesh = ply::load("bunny.ply").unwrap();
/// println!("{} triangles", mesh.num_primitives());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let load_error = |message: String| MeshError::LoadError {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| load_error(e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY file has no vertex element".to_string()))?;

    let mut positions = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let coordinate = |name: &str| {
            get_float_property(vertex, name)
                .ok_or_else(|| load_error(format!("vertex missing {} coordinate", name)))
        };
        positions.push(Point3::new(coordinate("x")?, coordinate("y")?, coordinate("z")?));
    }

    // Normals are kept only if every vertex carries all three components
    let normals: Option<Vec<Vector3<f32>>> = vertex_element
        .iter()
        .map(|vertex| {
            Some(Vector3::new(
                get_float_property(vertex, "nx")?,
                get_float_property(vertex, "ny")?,
                get_float_property(vertex, "nz")?,
            ))
        })
        .collect();

    // A point cloud has no face element
    let mut indices = Vec::new();
    if let Some(face_element) = ply.payload.get("face") {
        for face in face_element {
            let corners = get_list_property(face, "vertex_indices")
                .or_else(|| get_list_property(face, "vertex_index"))
                .ok_or_else(|| load_error("face missing vertex_indices property".to_string()))?;

            for i in 1..corners.len().saturating_sub(1) {
                indices.extend_from_slice(&[corners[0], corners[i], corners[i + 1]]);
            }
        }
    }

    let vertex_count = positions.len();
    let mut attributes = vec![(Semantic::Position, AttributeArray::Point3(positions))];
    if let Some(normals) = normals.filter(|n| !n.is_empty()) {
        attributes.push((Semantic::Normal, AttributeArray::Vector3(normals)));
    }

    Mesh::assemble(Topology::Triangles, indices, vertex_count, attributes)
        .map_err(|e| load_error(e.to_string()))
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f32> {
    match element.get(name)? {
        Property::Float(v) => Some(*v),
        Property::Double(v) => Some(*v as f32),
        Property::Int(v) => Some(*v as f32),
        Property::UInt(v) => Some(*v as f32),
        Property::Short(v) => Some(*v as f32),
        Property::UShort(v) => Some(*v as f32),
        Property::Char(v) => Some(*v as f32),
        Property::UChar(v) => Some(*v as f32),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<u32>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as u32).collect()),
        Property::ListUInt(v) => Some(v.clone()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as u32).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as u32).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as u32).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as u32).collect()),
        _ => None,
    }
}

/// Save a triangle mesh to a PLY file (ASCII format).
///
/// Positions are required; normals are written when the mesh has them.
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let positions = mesh.positions().ok_or_else(|| MeshError::SaveError {
        path: path.to_path_buf(),
        message: "mesh has no positions".to_string(),
    })?;
    if mesh.topology() != Topology::Triangles {
        return Err(MeshError::SaveError {
            path: path.to_path_buf(),
            message: "only triangle meshes can be saved as PLY".to_string(),
        });
    }
    let normals = mesh.normals();

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by tessera")?;
    writeln!(writer, "element vertex {}", positions.len())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    if normals.is_some() {
        writeln!(writer, "property float nx")?;
        writeln!(writer, "property float ny")?;
        writeln!(writer, "property float nz")?;
    }
    writeln!(writer, "element face {}", mesh.num_primitives())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    for (i, p) in positions.iter().enumerate() {
        match normals {
            Some(n) => writeln!(
                writer,
                "{} {} {} {} {} {}",
                p.x, p.y, p.z, n[i].x, n[i].y, n[i].z
            )?,
            None => writeln!(writer, "{} {} {}", p.x, p.y, p.z)?,
        }
    }

    for [a, b, c] in mesh.triangles() {
        writeln!(writer, "3 {} {} {}", a, b, c)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const QUAD: &str = "ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
property float nx
property float ny
property float nz
element face 1
property list uchar int vertex_indices
end_header
0 0 0 0 0 1
1 0 0 0 0 1
1 1 0 0 0 1
0 1 0 0 0 1
4 0 1 2 3
";

    fn ply_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_quad_triangulated() {
        let file = ply_file(QUAD);
        let mesh = load(file.path()).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.normals().unwrap()[3], Vector3::z());
    }

    #[test]
    fn test_load_dangling_face() {
        let file = ply_file(&QUAD.replace("4 0 1 2 3", "3 0 1 9"));
        assert!(matches!(load(file.path()), Err(MeshError::LoadError { .. })));
    }

    #[test]
    fn test_save_and_reload() {
        let source = ply_file(QUAD);
        let mesh = load(source.path()).unwrap();

        let output = NamedTempFile::new().unwrap();
        save(&mesh, output.path()).unwrap();
        let reloaded = load(output.path()).unwrap();

        assert_eq!(reloaded.indices(), mesh.indices());
        assert_eq!(reloaded.positions(), mesh.positions());
        assert_eq!(reloaded.normals(), mesh.normals());
    }

    #[test]
    fn test_save_requires_positions() {
        let mesh = Mesh::assemble(Topology::Triangles, Vec::new(), 0, Vec::new()).unwrap();
        let output = NamedTempFile::new().unwrap();
        assert!(matches!(
            save(&mesh, output.path()),
            Err(MeshError::SaveError { .. })
        ));
    }
}
