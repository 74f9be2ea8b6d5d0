//! The document query collaborator and the queries the importer asks.
//!
//! The importer never walks the document itself. It formats path queries
//! from fixed patterns and reads back strings through [`DocumentQuery`].

use crate::build::parse_tokens;
use crate::error::BuildError;
use crate::mesh::Topology;

/// String-valued lookups into a structured document.
///
/// Implementations are stateless from the caller's point of view: every call
/// stands alone. `None` means the query matched nothing.
pub trait DocumentQuery {
    /// Evaluate `query` and return its string value.
    fn evaluate(&self, query: &str) -> Option<String>;
}

impl<F> DocumentQuery for F
where
    F: Fn(&str) -> Option<String>,
{
    fn evaluate(&self, query: &str) -> Option<String> {
        self(query)
    }
}

/// Primitive elements the importer understands, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// `<triangles>`
    Triangles,
    /// `<polylist>` with a `<vcount>` per polygon.
    Polylist,
    /// `<lines>`
    Lines,
}

impl PrimitiveKind {
    /// All kinds in the order they are looked for.
    pub const ALL: [PrimitiveKind; 3] = [
        PrimitiveKind::Triangles,
        PrimitiveKind::Polylist,
        PrimitiveKind::Lines,
    ];

    /// Element name in the document.
    pub fn element(self) -> &'static str {
        match self {
            PrimitiveKind::Triangles => "triangles",
            PrimitiveKind::Polylist => "polylist",
            PrimitiveKind::Lines => "lines",
        }
    }

    /// Topology of the built mesh.
    pub fn topology(self) -> Topology {
        match self {
            PrimitiveKind::Triangles | PrimitiveKind::Polylist => Topology::Triangles,
            PrimitiveKind::Lines => Topology::Lines,
        }
    }
}

/// Numeric array elements a source may point at, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    /// `<float_array>`
    Float,
    /// `<int_array>`
    Int,
}

impl ArrayKind {
    /// All kinds in the order they are looked for.
    pub const ALL: [ArrayKind; 2] = [ArrayKind::Float, ArrayKind::Int];

    /// Element name in the document.
    pub fn element(self) -> &'static str {
        match self {
            ArrayKind::Float => "float_array",
            ArrayKind::Int => "int_array",
        }
    }
}

// Query patterns. Mesh ids are zero-based here and one-based in the paths.

pub(crate) fn geometry_count() -> String {
    "count(//library_geometries/geometry)".to_string()
}

pub(crate) fn geometry_attribute(mesh: usize, attribute: &str) -> String {
    format!("//library_geometries/geometry[{}]/@{}", mesh + 1, attribute)
}

fn primitive_path(mesh: usize, kind: PrimitiveKind) -> String {
    format!(
        "//library_geometries/geometry[{}]/mesh/{}[1]",
        mesh + 1,
        kind.element()
    )
}

pub(crate) fn primitive_count(mesh: usize, kind: PrimitiveKind) -> String {
    format!("count({})", primitive_path(mesh, kind))
}

pub(crate) fn primitive(mesh: usize, kind: PrimitiveKind, tail: &str) -> String {
    format!("{}/{}", primitive_path(mesh, kind), tail)
}

pub(crate) fn input_count(mesh: usize, kind: PrimitiveKind) -> String {
    format!("count({}/input)", primitive_path(mesh, kind))
}

pub(crate) fn input_attribute(
    mesh: usize,
    kind: PrimitiveKind,
    input: usize,
    attribute: &str,
) -> String {
    format!(
        "{}/input[{}]/@{}",
        primitive_path(mesh, kind),
        input + 1,
        attribute
    )
}

pub(crate) fn vertices_input_count(id: &str) -> String {
    format!("count(//vertices[@id='{}']/input)", id)
}

pub(crate) fn vertices_input_attribute(id: &str, input: usize, attribute: &str) -> String {
    format!("//vertices[@id='{}']/input[{}]/@{}", id, input + 1, attribute)
}

pub(crate) fn accessor_attribute(source: &str, attribute: &str) -> String {
    format!(
        "//source[@id='{}']/technique_common/accessor/@{}",
        source, attribute
    )
}

pub(crate) fn array_count(kind: ArrayKind, id: &str) -> String {
    format!("count(//{}[@id='{}'])", kind.element(), id)
}

pub(crate) fn array_attribute(kind: ArrayKind, id: &str, attribute: &str) -> String {
    format!("//{}[@id='{}']/@{}", kind.element(), id, attribute)
}

pub(crate) fn array_values(kind: ArrayKind, id: &str) -> String {
    format!("//{}[@id='{}']/string()", kind.element(), id)
}

/// Typed helpers over a [`DocumentQuery`].
pub(crate) struct Lookup<'q, Q: ?Sized>(pub &'q Q);

impl<Q: DocumentQuery + ?Sized> Lookup<'_, Q> {
    /// The value of `query`, or `None`.
    pub fn optional(&self, query: &str) -> Option<String> {
        self.0.evaluate(query)
    }

    /// The value of `query`; absence is an error.
    pub fn value(&self, query: &str) -> Result<String, BuildError> {
        self.0
            .evaluate(query)
            .ok_or_else(|| BuildError::missing(query))
    }

    /// The value of `query` parsed as a non-negative integer.
    pub fn number(&self, query: &str) -> Result<usize, BuildError> {
        parse_number(&self.value(query)?, query)
    }

    /// The value of an optional integer query.
    pub fn optional_number(&self, query: &str) -> Result<Option<usize>, BuildError> {
        self.optional(query)
            .map(|value| parse_number(&value, query))
            .transpose()
    }

    /// The result of a `count(...)` query; unanswered counts are zero.
    pub fn count(&self, query: &str) -> usize {
        self.optional(query)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }
}

fn parse_number(value: &str, query: &str) -> Result<usize, BuildError> {
    let tokens: Vec<usize> = parse_tokens(value)?;
    match tokens.as_slice() {
        [n] => Ok(*n),
        _ => Err(BuildError::count_mismatch(query, 1, tokens.len())),
    }
}

/// Strip the `#` of a URI fragment reference.
pub(crate) fn strip_reference(reference: &str) -> &str {
    let reference = reference.trim();
    reference.strip_prefix('#').unwrap_or(reference).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_closure_query() {
        let values: HashMap<&str, &str> = [("a", "3"), ("b", "x"), ("c", " 4 5 ")].into();
        let query = |q: &str| values.get(q).map(|v| v.to_string());
        let lookup = Lookup(&query);

        assert_eq!(lookup.number("a"), Ok(3));
        assert!(matches!(
            lookup.number("b"),
            Err(BuildError::NumericFormat { .. })
        ));
        assert!(matches!(
            lookup.number("c"),
            Err(BuildError::CountMismatch { expected: 1, actual: 2, .. })
        ));
        assert_eq!(lookup.value("missing"), Err(BuildError::missing("missing")));
        assert_eq!(lookup.optional_number("missing"), Ok(None));
        assert_eq!(lookup.count("a"), 3);
        assert_eq!(lookup.count("b"), 0);
    }

    #[test]
    fn test_query_patterns() {
        assert_eq!(
            input_attribute(0, PrimitiveKind::Polylist, 1, "offset"),
            "//library_geometries/geometry[1]/mesh/polylist[1]/input[2]/@offset"
        );
        assert_eq!(
            accessor_attribute("pos", "stride"),
            "//source[@id='pos']/technique_common/accessor/@stride"
        );
        assert_eq!(
            array_values(ArrayKind::Int, "ids"),
            "//int_array[@id='ids']/string()"
        );
    }

    #[test]
    fn test_strip_reference() {
        assert_eq!(strip_reference("#mesh-positions"), "mesh-positions");
        assert_eq!(strip_reference("  #a "), "a");
        assert_eq!(strip_reference("plain"), "plain");
    }
}
