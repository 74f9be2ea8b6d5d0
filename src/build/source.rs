//! Parsing of strided numeric source arrays.
//!
//! Interchange formats store attribute data as one long run of whitespace
//! separated numbers, described by an accessor giving the number of elements
//! and the number of scalars per element. This module turns such a run into a
//! typed array, after cross-checking every count the document declares.

use std::str::FromStr;

use crate::error::BuildError;
use crate::mesh::{ArrayElement, AttributeArray, ElementKind};

/// Layout of a source array as declared by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accessor {
    /// Number of elements.
    pub count: usize,
    /// Scalars per element.
    pub stride: usize,
    /// Total scalar count declared by the referenced array itself.
    pub array_count: usize,
}

impl Accessor {
    /// Number of scalars the accessor expects to read.
    pub fn scalar_count(&self) -> Option<usize> {
        self.count.checked_mul(self.stride)
    }
}

/// Parse a whitespace separated stream of numbers.
///
/// Parsing is locale-independent. The first malformed token fails the whole
/// stream with [`BuildError::NumericFormat`].
pub fn parse_tokens<N: FromStr>(text: &str) -> Result<Vec<N>, BuildError> {
    text.split_ascii_whitespace()
        .enumerate()
        .map(|(position, token)| {
            token.parse::<N>().map_err(|_| BuildError::NumericFormat {
                token: token.to_string(),
                position,
            })
        })
        .collect()
}

/// Parse an index stream such as `<p>` or `<vcount>`.
pub fn parse_indices(text: &str) -> Result<Vec<u32>, BuildError> {
    parse_tokens(text)
}

/// Parse `accessor.count` elements of `accessor.stride` scalars each.
///
/// `context` names the source in error messages. Fails with
/// [`BuildError::CountMismatch`] if the array's declared count disagrees with
/// `count * stride`, or if the stream holds a different number of tokens than
/// declared. Nothing is returned on failure.
///
/// # Example
///
/// ```
/// use tessera::build::{parse_array, Accessor};
/// use nalgebra::Vector2;
///
/// let accessor = Accessor { count: 2, stride: 2, array_count: 4 };
/// let uvs: Vec<Vector2<f32>> = parse_array("uv", &accessor, "0 0.5 1 1").unwrap();
/// assert_eq!(uvs[0], Vector2::new(0.0, 0.5));
/// ```
pub fn parse_array<T: ArrayElement>(
    context: &str,
    accessor: &Accessor,
    text: &str,
) -> Result<Vec<T>, BuildError> {
    let expected = accessor
        .scalar_count()
        .ok_or_else(|| BuildError::count_mismatch(context, usize::MAX, accessor.array_count))?;

    if accessor.array_count != expected {
        return Err(BuildError::count_mismatch(
            context,
            expected,
            accessor.array_count,
        ));
    }
    if accessor.stride == 0 {
        // Zero-width elements only make sense for an empty source
        if accessor.count > 0 {
            return Err(BuildError::count_mismatch(context, accessor.count, 0));
        }
        return Ok(Vec::new());
    }

    let scalars: Vec<f32> = parse_tokens(text)?;
    if scalars.len() != expected {
        return Err(BuildError::count_mismatch(context, expected, scalars.len()));
    }

    Ok(scalars
        .chunks_exact(accessor.stride)
        .map(|tuple| T::from_components(&tuple[..tuple.len().min(T::WIDTH)]))
        .collect())
}

/// Parse a source into the attribute array variant for `kind`.
pub fn parse_attribute(
    kind: ElementKind,
    context: &str,
    accessor: &Accessor,
    text: &str,
) -> Result<AttributeArray, BuildError> {
    Ok(match kind {
        ElementKind::Point3 => AttributeArray::Point3(parse_array(context, accessor, text)?),
        ElementKind::Vector2 => AttributeArray::Vector2(parse_array(context, accessor, text)?),
        ElementKind::Vector3 => AttributeArray::Vector3(parse_array(context, accessor, text)?),
        ElementKind::Vector4 => AttributeArray::Vector4(parse_array(context, accessor, text)?),
    })
}
