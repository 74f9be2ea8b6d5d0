//! Gathering of per-vertex attribute arrays.

use super::weld::CombinationMap;
use crate::error::BuildError;
use crate::mesh::{ArrayElement, AttributeArray, Semantic};

/// Build the output array of one semantic.
///
/// For every combination in `map`, reads the field at `offset`, looks it up
/// in `raw` and stores the element at the combination's compact index. The
/// result has exactly `map.len()` elements.
///
/// Fails with [`BuildError::DanglingIndex`] if a field points past the end of
/// `raw`.
pub fn gather<T: ArrayElement>(
    semantic: Semantic,
    raw: &[T],
    offset: usize,
    map: &CombinationMap<'_>,
) -> Result<Vec<T>, BuildError> {
    if !map.is_empty() && offset >= map.stride() {
        return Err(BuildError::InternalConsistency(format!(
            "{} offset {} outside record stride {}",
            semantic,
            offset,
            map.stride()
        )));
    }

    let mut output = Vec::with_capacity(map.len());
    for (key, vertex) in map.iter() {
        debug_assert_eq!(vertex as usize, output.len());

        // Offset was checked against the stride above
        let index = key.field(offset).unwrap_or_default() as usize;
        let value = raw.get(index).ok_or(BuildError::DanglingIndex {
            semantic,
            index,
            len: raw.len(),
        })?;
        output.push(*value);
    }
    Ok(output)
}

/// Gather `raw` into a new array of the same kind.
pub fn gather_attribute(
    semantic: Semantic,
    raw: &AttributeArray,
    offset: usize,
    map: &CombinationMap<'_>,
) -> Result<AttributeArray, BuildError> {
    Ok(match raw {
        AttributeArray::Point3(v) => AttributeArray::Point3(gather(semantic, v, offset, map)?),
        AttributeArray::Vector2(v) => AttributeArray::Vector2(gather(semantic, v, offset, map)?),
        AttributeArray::Vector3(v) => AttributeArray::Vector3(gather(semantic, v, offset, map)?),
        AttributeArray::Vector4(v) => AttributeArray::Vector4(gather(semantic, v, offset, map)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector2};

    fn triangle_positions() -> Vec<Point3<f32>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_attribute_fidelity() {
        let positions = triangle_positions();
        let uvs = vec![Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0)];

        // (position, uv) per corner; corner 3 repeats corner 0
        let records = [0, 0, 1, 1, 2, 0, 0, 0, 2, 1, 1, 0];
        let map = CombinationMap::build(&records, 2).unwrap();

        let out_pos = gather(Semantic::Position, &positions, 0, &map).unwrap();
        let out_uv = gather(Semantic::TexCoord(0), &uvs, 1, &map).unwrap();

        assert_eq!(out_pos.len(), map.len());
        assert_eq!(out_uv.len(), map.len());
        for (corner, record) in records.chunks_exact(2).enumerate() {
            let vertex = map.indices()[corner] as usize;
            assert_eq!(out_pos[vertex], positions[record[0] as usize]);
            assert_eq!(out_uv[vertex], uvs[record[1] as usize]);
        }
    }

    #[test]
    fn test_dangling_index() {
        let records = [0, 1, 5];
        let map = CombinationMap::build(&records, 1).unwrap();

        let result = gather(Semantic::Position, &triangle_positions(), 0, &map);
        assert_eq!(
            result,
            Err(BuildError::DanglingIndex {
                semantic: Semantic::Position,
                index: 5,
                len: 3,
            })
        );
    }

    #[test]
    fn test_offset_outside_stride() {
        let map = CombinationMap::build(&[0, 1], 1).unwrap();
        let result = gather(Semantic::Position, &triangle_positions(), 1, &map);
        assert!(matches!(result, Err(BuildError::InternalConsistency(_))));
    }

    #[test]
    fn test_gather_empty() {
        let map = CombinationMap::build(&[], 2).unwrap();
        let raw = AttributeArray::Point3(triangle_positions());
        let out = gather_attribute(Semantic::Position, &raw, 0, &map).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.kind(), raw.kind());
    }
}
