//! Vertex attribute semantics and typed attribute storage.

use std::fmt;

use nalgebra::{Point3, Vector2, Vector3, Vector4};

/// The role a vertex attribute plays.
///
/// Semantics with a set index (`TexCoord`, `Color`) may be bound several times
/// to the same mesh, once per set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Semantic {
    /// Vertex position.
    Position,
    /// Vertex normal.
    Normal,
    /// Tangent vector.
    Tangent,
    /// Binormal (bitangent) vector.
    Binormal,
    /// Texture coordinate of the given set.
    TexCoord(u32),
    /// Vertex color of the given set.
    Color(u32),
}

impl Semantic {
    /// Map a COLLADA `semantic` attribute (and optional `set`) to a semantic.
    ///
    /// `VERTEX` is not a semantic of its own; it is resolved through the
    /// `<vertices>` element by the importer.
    pub fn from_collada(name: &str, set: u32) -> Option<Semantic> {
        match name {
            "POSITION" => Some(Semantic::Position),
            "NORMAL" => Some(Semantic::Normal),
            "TANGENT" | "TEXTANGENT" => Some(Semantic::Tangent),
            "BINORMAL" | "TEXBINORMAL" => Some(Semantic::Binormal),
            "TEXCOORD" | "UV" => Some(Semantic::TexCoord(set)),
            "COLOR" => Some(Semantic::Color(set)),
            _ => None,
        }
    }

    /// The element type stored for this semantic.
    pub fn element_kind(self) -> ElementKind {
        match self {
            Semantic::Position => ElementKind::Point3,
            Semantic::Normal | Semantic::Tangent | Semantic::Binormal => ElementKind::Vector3,
            Semantic::TexCoord(_) => ElementKind::Vector2,
            Semantic::Color(_) => ElementKind::Vector4,
        }
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Semantic::Position => write!(f, "POSITION"),
            Semantic::Normal => write!(f, "NORMAL"),
            Semantic::Tangent => write!(f, "TANGENT"),
            Semantic::Binormal => write!(f, "BINORMAL"),
            Semantic::TexCoord(set) => write!(f, "TEXCOORD{}", set),
            Semantic::Color(set) => write!(f, "COLOR{}", set),
        }
    }
}

/// The shape of one attribute element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A 3D point.
    Point3,
    /// A 2-component vector.
    Vector2,
    /// A 3-component vector.
    Vector3,
    /// A 4-component vector.
    Vector4,
}

impl ElementKind {
    /// Number of scalar components in one element.
    pub const fn width(self) -> usize {
        match self {
            ElementKind::Vector2 => 2,
            ElementKind::Point3 | ElementKind::Vector3 => 3,
            ElementKind::Vector4 => 4,
        }
    }
}

/// Types that can be built from a fixed-width tuple of scalars.
///
/// `from_components` receives however many scalars the source declared per
/// element. Extra scalars are ignored; missing ones take a per-type default.
pub trait ArrayElement: Copy + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Number of components this element holds.
    const WIDTH: usize;

    /// Build an element from the scalars of one source tuple.
    fn from_components(components: &[f32]) -> Self;
}

#[inline]
fn component(components: &[f32], i: usize, default: f32) -> f32 {
    components.get(i).copied().unwrap_or(default)
}

impl ArrayElement for Point3<f32> {
    const WIDTH: usize = 3;

    fn from_components(c: &[f32]) -> Self {
        Point3::new(component(c, 0, 0.0), component(c, 1, 0.0), component(c, 2, 0.0))
    }
}

impl ArrayElement for Vector2<f32> {
    const WIDTH: usize = 2;

    fn from_components(c: &[f32]) -> Self {
        Vector2::new(component(c, 0, 0.0), component(c, 1, 0.0))
    }
}

impl ArrayElement for Vector3<f32> {
    const WIDTH: usize = 3;

    fn from_components(c: &[f32]) -> Self {
        Vector3::new(component(c, 0, 0.0), component(c, 1, 0.0), component(c, 2, 0.0))
    }
}

/// The fourth component defaults to 1, so RGB colors come out opaque.
impl ArrayElement for Vector4<f32> {
    const WIDTH: usize = 4;

    fn from_components(c: &[f32]) -> Self {
        Vector4::new(
            component(c, 0, 0.0),
            component(c, 1, 0.0),
            component(c, 2, 0.0),
            component(c, 3, 1.0),
        )
    }
}

/// A typed array of attribute values.
///
/// Used both for raw per-semantic source arrays as read from a document and
/// for the gathered output arrays owned by a [`Mesh`](super::Mesh).
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeArray {
    /// Array of points.
    Point3(Vec<Point3<f32>>),
    /// Array of 2D vectors.
    Vector2(Vec<Vector2<f32>>),
    /// Array of 3D vectors.
    Vector3(Vec<Vector3<f32>>),
    /// Array of 4D vectors.
    Vector4(Vec<Vector4<f32>>),
}

impl AttributeArray {
    /// An empty array of the given kind.
    pub fn empty(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Point3 => AttributeArray::Point3(Vec::new()),
            ElementKind::Vector2 => AttributeArray::Vector2(Vec::new()),
            ElementKind::Vector3 => AttributeArray::Vector3(Vec::new()),
            ElementKind::Vector4 => AttributeArray::Vector4(Vec::new()),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            AttributeArray::Point3(v) => v.len(),
            AttributeArray::Vector2(v) => v.len(),
            AttributeArray::Vector3(v) => v.len(),
            AttributeArray::Vector4(v) => v.len(),
        }
    }

    /// Check if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element kind of this array.
    pub fn kind(&self) -> ElementKind {
        match self {
            AttributeArray::Point3(_) => ElementKind::Point3,
            AttributeArray::Vector2(_) => ElementKind::Vector2,
            AttributeArray::Vector3(_) => ElementKind::Vector3,
            AttributeArray::Vector4(_) => ElementKind::Vector4,
        }
    }

    /// Borrow as points, if this is a point array.
    pub fn as_point3(&self) -> Option<&[Point3<f32>]> {
        match self {
            AttributeArray::Point3(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow as 2D vectors, if this is a 2D vector array.
    pub fn as_vector2(&self) -> Option<&[Vector2<f32>]> {
        match self {
            AttributeArray::Vector2(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow as 3D vectors, if this is a 3D vector array.
    pub fn as_vector3(&self) -> Option<&[Vector3<f32>]> {
        match self {
            AttributeArray::Vector3(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow as 4D vectors, if this is a 4D vector array.
    pub fn as_vector4(&self) -> Option<&[Vector4<f32>]> {
        match self {
            AttributeArray::Vector4(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_from_collada() {
        assert_eq!(Semantic::from_collada("POSITION", 0), Some(Semantic::Position));
        assert_eq!(Semantic::from_collada("TEXCOORD", 1), Some(Semantic::TexCoord(1)));
        assert_eq!(Semantic::from_collada("TEXTANGENT", 0), Some(Semantic::Tangent));
        assert_eq!(Semantic::from_collada("VERTEX", 0), None);
        assert_eq!(Semantic::from_collada("WEIGHT", 0), None);
    }

    #[test]
    fn test_semantic_display() {
        assert_eq!(Semantic::Normal.to_string(), "NORMAL");
        assert_eq!(Semantic::Color(2).to_string(), "COLOR2");
    }

    #[test]
    fn test_element_padding() {
        // RGB color gets an opaque alpha
        let c = Vector4::<f32>::from_components(&[0.5, 0.25, 1.0]);
        assert_eq!(c, Vector4::new(0.5, 0.25, 1.0, 1.0));

        // STW texcoords keep only S and T
        let t = Vector2::<f32>::from_components(&[0.1, 0.2, 0.3]);
        assert_eq!(t, Vector2::new(0.1, 0.2));

        let p = Point3::<f32>::from_components(&[1.0, 2.0]);
        assert_eq!(p, Point3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_kind_matches_semantic() {
        for semantic in [
            Semantic::Position,
            Semantic::Normal,
            Semantic::TexCoord(0),
            Semantic::Color(0),
        ] {
            let array = AttributeArray::empty(semantic.element_kind());
            assert_eq!(array.kind(), semantic.element_kind());
            assert!(array.is_empty());
        }
    }

    #[test]
    fn test_kind_width_matches_element() {
        assert_eq!(ElementKind::Point3.width(), <Point3<f32> as ArrayElement>::WIDTH);
        assert_eq!(ElementKind::Vector2.width(), <Vector2<f32> as ArrayElement>::WIDTH);
        assert_eq!(ElementKind::Vector3.width(), <Vector3<f32> as ArrayElement>::WIDTH);
        assert_eq!(ElementKind::Vector4.width(), <Vector4<f32> as ArrayElement>::WIDTH);
    }
}
