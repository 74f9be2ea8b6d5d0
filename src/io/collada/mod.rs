//! COLLADA (`.dae`) mesh import.
//!
//! COLLADA stores every vertex attribute in its own `<source>` array and
//! indexes each one separately from the `<p>` element of a primitive. The
//! importer reads those arrays once when the document is opened and builds
//! single-indexed [`Mesh`]es on request.
//!
//! # Example
//!
//! ```no_run
//! use tessera::io::collada::ColladaImporter;
//! use tessera::io::ImportOptions;
//!
//! let importer = ColladaImporter::open("scene.dae", ImportOptions::default()).unwrap();
//! for id in 0..importer.mesh_count() {
//!     if let Some(mesh) = importer.mesh(id) {
//!         println!("{:?}: {} vertices", importer.mesh_name(id), mesh.vertex_count());
//!     }
//! }
//! ```
//!
//! Supported primitives are `<triangles>`, `<polylist>` (fan triangulated)
//! and `<lines>`; the first one found in each `<mesh>` is used.

mod query;
mod xml;

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, error, warn};
use rayon::prelude::*;

pub use query::{ArrayKind, DocumentQuery, PrimitiveKind};
pub use xml::XmlDocument;

use self::query::{strip_reference, Lookup};
use super::ImportOptions;
use crate::build::{
    parse_attribute, parse_indices, triangulate, Accessor, Input, InputLayout, MeshSource,
};
use crate::error::{BuildError, MeshError, Result};
use crate::mesh::{AttributeArray, ElementKind, Mesh, Semantic};

#[derive(Debug, Clone)]
struct Geometry {
    name: Option<String>,
    source: std::result::Result<MeshSource, BuildError>,
}

/// Importer for the meshes of one COLLADA document.
#[derive(Debug, Clone)]
pub struct ColladaImporter {
    options: ImportOptions,
    geometries: Vec<Geometry>,
}

impl ColladaImporter {
    /// Open and read a COLLADA file.
    pub fn open<P: AsRef<Path>>(path: P, options: ImportOptions) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)?;
        let document = XmlDocument::parse(&xml).map_err(|e| MeshError::LoadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::with_query(&document, options))
    }

    /// Read a COLLADA document from a string.
    pub fn parse(xml: &str, options: ImportOptions) -> Result<Self> {
        let document = XmlDocument::parse(xml)?;
        Ok(Self::with_query(&document, options))
    }

    /// Read all geometries through an arbitrary query collaborator.
    ///
    /// Geometries that fail to read are kept as absent meshes; the failure
    /// is logged and reported again by [`try_mesh`](Self::try_mesh).
    pub fn with_query<Q: DocumentQuery + ?Sized>(query: &Q, options: ImportOptions) -> Self {
        let lookup = Lookup(query);
        let count = lookup.count(&query::geometry_count());

        let geometries = (0..count)
            .map(|id| {
                let name = lookup
                    .optional(&query::geometry_attribute(id, "name"))
                    .or_else(|| lookup.optional(&query::geometry_attribute(id, "id")));
                let source = read_geometry(&lookup, id, &options);
                if let Err(e) = &source {
                    let label = name.as_deref().unwrap_or("unnamed");
                    warn!("geometry {} ({}) is unusable: {}", id, label, e);
                }
                Geometry { name, source }
            })
            .collect();

        Self {
            options,
            geometries,
        }
    }

    /// The options this importer was created with.
    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Number of meshes in the document, including unusable ones.
    pub fn mesh_count(&self) -> usize {
        self.geometries.len()
    }

    /// Name (or id) of mesh `id`.
    pub fn mesh_name(&self, id: usize) -> Option<&str> {
        self.geometries.get(id)?.name.as_deref()
    }

    /// Id of the first mesh named `name`.
    pub fn mesh_for_name(&self, name: &str) -> Option<usize> {
        self.geometries
            .iter()
            .position(|g| g.name.as_deref() == Some(name))
    }

    /// The document data of mesh `id`, if it could be read.
    pub fn source(&self, id: usize) -> Option<&MeshSource> {
        self.geometries.get(id)?.source.as_ref().ok()
    }

    /// Build mesh `id`, reporting why it is unavailable.
    pub fn try_mesh(&self, id: usize) -> Result<Mesh> {
        let geometry = self.geometries.get(id).ok_or(MeshError::MeshOutOfRange {
            id,
            count: self.geometries.len(),
        })?;
        let source = geometry.source.as_ref().map_err(|e| e.clone())?;
        Ok(source.build(self.options.semantics.as_deref())?)
    }

    /// Build mesh `id`, or `None` if it is unavailable.
    pub fn mesh(&self, id: usize) -> Option<Mesh> {
        match self.try_mesh(id) {
            Ok(mesh) => Some(mesh),
            Err(e) => {
                error!("cannot build mesh {}: {}", id, e);
                None
            }
        }
    }

    /// Build every mesh, in parallel unless disabled in the options.
    ///
    /// Fails with [`MeshError::NoMeshes`] only if the document has meshes and
    /// none of them can be built.
    pub fn meshes(&self) -> Result<Vec<Option<Mesh>>> {
        let count = self.mesh_count();
        let meshes: Vec<Option<Mesh>> = if self.options.parallel {
            (0..count).into_par_iter().map(|id| self.mesh(id)).collect()
        } else {
            (0..count).map(|id| self.mesh(id)).collect()
        };

        if count > 0 && meshes.iter().all(Option::is_none) {
            return Err(MeshError::NoMeshes { count });
        }
        Ok(meshes)
    }
}

fn read_geometry<Q: DocumentQuery + ?Sized>(
    lookup: &Lookup<'_, Q>,
    mesh: usize,
    options: &ImportOptions,
) -> std::result::Result<MeshSource, BuildError> {
    let kind = PrimitiveKind::ALL
        .into_iter()
        .find(|&k| lookup.count(&query::primitive_count(mesh, k)) > 0)
        .ok_or(BuildError::MissingPrimitive)?;

    let layout = read_layout(lookup, mesh, kind)?;
    let stride = layout.stride();
    let declared = lookup.number(&query::primitive(mesh, kind, "@count"))?;

    // An empty primitive may omit <p> altogether
    let p = lookup
        .optional(&query::primitive(mesh, kind, "p/string()"))
        .unwrap_or_default();
    let records = parse_indices(&p)?;

    let records = match kind {
        PrimitiveKind::Polylist => {
            let vcount = lookup
                .optional(&query::primitive(mesh, kind, "vcount/string()"))
                .unwrap_or_default();
            let vcount = parse_indices(&vcount)?;
            if vcount.len() != declared {
                return Err(BuildError::count_mismatch("polylist vcount", declared, vcount.len()));
            }
            triangulate(&records, stride, &vcount, options.triangulate)?
        }
        PrimitiveKind::Triangles | PrimitiveKind::Lines => {
            let expected = declared
                .checked_mul(kind.topology().corners())
                .and_then(|n| n.checked_mul(stride));
            if expected != Some(records.len()) {
                return Err(BuildError::count_mismatch(
                    format!("{} indices", kind.element()),
                    expected.unwrap_or(usize::MAX),
                    records.len(),
                ));
            }
            records
        }
    };

    let mut arrays = BTreeMap::new();
    for input in layout.inputs() {
        if let Some(requested) = &options.semantics {
            if !requested.contains(&input.semantic) {
                continue;
            }
        }
        let array = read_source(lookup, &input.source, input.semantic.element_kind())?;
        arrays.insert(input.semantic, array);
    }

    debug!(
        "geometry {}: {} {} records of stride {}, {} inputs",
        mesh,
        records.len() / stride.max(1),
        kind.element(),
        stride,
        layout.inputs().len()
    );

    Ok(MeshSource::new(kind.topology(), layout, records, arrays))
}

fn read_layout<Q: DocumentQuery + ?Sized>(
    lookup: &Lookup<'_, Q>,
    mesh: usize,
    kind: PrimitiveKind,
) -> std::result::Result<InputLayout, BuildError> {
    let mut layout = InputLayout::default();
    let count = lookup.count(&query::input_count(mesh, kind));

    for i in 0..count {
        let semantic = lookup.value(&query::input_attribute(mesh, kind, i, "semantic"))?;
        let source = lookup.value(&query::input_attribute(mesh, kind, i, "source"))?;
        let source = strip_reference(&source);
        let offset = lookup
            .optional_number(&query::input_attribute(mesh, kind, i, "offset"))?
            .unwrap_or(i);
        let set = lookup
            .optional_number(&query::input_attribute(mesh, kind, i, "set"))?
            .unwrap_or(0);

        if semantic == "VERTEX" {
            // Every input of <vertices> shares the VERTEX offset
            let vertex_inputs = lookup.count(&query::vertices_input_count(source));
            if vertex_inputs == 0 {
                return Err(BuildError::missing(query::vertices_input_count(source)));
            }
            for j in 0..vertex_inputs {
                let name = lookup.value(&query::vertices_input_attribute(source, j, "semantic"))?;
                let array = lookup.value(&query::vertices_input_attribute(source, j, "source"))?;
                bind(&mut layout, &name, set, offset, strip_reference(&array));
            }
        } else {
            bind(&mut layout, &semantic, set, offset, source);
        }
    }

    Ok(layout)
}

fn bind(layout: &mut InputLayout, name: &str, set: usize, offset: usize, source: &str) {
    let semantic = u32::try_from(set)
        .ok()
        .and_then(|set| Semantic::from_collada(name, set));
    let Some(semantic) = semantic else {
        debug!("ignoring unsupported input {} set {} at offset {}", name, set, offset);
        layout.reserve(offset);
        return;
    };
    if !layout.push(Input::new(semantic, offset, source)) {
        warn!("{} bound more than once, keeping the first binding", semantic);
    }
}

fn read_source<Q: DocumentQuery + ?Sized>(
    lookup: &Lookup<'_, Q>,
    id: &str,
    kind: ElementKind,
) -> std::result::Result<AttributeArray, BuildError> {
    let count = lookup.number(&query::accessor_attribute(id, "count"))?;
    let stride = lookup
        .optional_number(&query::accessor_attribute(id, "stride"))?
        .unwrap_or(1);
    let array = lookup.value(&query::accessor_attribute(id, "source"))?;
    let array = strip_reference(&array);

    let array_kind = ArrayKind::ALL
        .into_iter()
        .find(|&k| lookup.count(&query::array_count(k, array)) > 0)
        .ok_or_else(|| BuildError::missing(query::array_count(ArrayKind::Float, array)))?;
    let array_count = lookup.number(&query::array_attribute(array_kind, array, "count"))?;
    let values = lookup
        .optional(&query::array_values(array_kind, array))
        .unwrap_or_default();

    if stride != kind.width() {
        debug!(
            "source {} has {} components per element, expected {}",
            id,
            stride,
            kind.width()
        );
    }

    let accessor = Accessor {
        count,
        stride,
        array_count,
    };
    parse_attribute(kind, id, &accessor, &values)
}
