//! Fan triangulation of polygon records.

use crate::error::BuildError;

/// Expand polygon corner records into triangle corner records.
///
/// `vcount` gives the number of corners of each polygon; corners are
/// consecutive records of `stride` fields. A polygon `c0 c1 ... ck` becomes
/// the triangles `(c0, ci, ci+1)`, preserving winding. With `triangulate`
/// disabled every polygon must already be a triangle.
///
/// # Example
///
/// ```
/// use tessera::build::triangulate;
///
/// // One quad, single-field records
/// let tris = triangulate(&[10, 11, 12, 13], 1, &[4], true).unwrap();
/// assert_eq!(tris, vec![10, 11, 12, 10, 12, 13]);
/// ```
pub fn triangulate(
    records: &[u32],
    stride: usize,
    vcount: &[u32],
    triangulate: bool,
) -> Result<Vec<u32>, BuildError> {
    let corners = vcount
        .iter()
        .try_fold(0usize, |sum, &c| sum.checked_add(c as usize));
    let expected = corners.and_then(|c| c.checked_mul(stride));
    if expected != Some(records.len()) {
        return Err(BuildError::count_mismatch(
            "polygon corners",
            expected.unwrap_or(usize::MAX),
            records.len(),
        ));
    }

    for (polygon, &count) in vcount.iter().enumerate() {
        let count = count as usize;
        if count < 3 {
            return Err(BuildError::DegeneratePolygon {
                polygon,
                corners: count,
            });
        }
        if count != 3 && !triangulate {
            return Err(BuildError::NonTriangularPolygon {
                polygon,
                corners: count,
            });
        }
    }

    // Records without fields expand to nothing
    if stride == 0 {
        return Ok(Vec::new());
    }

    let record = |corner: usize| &records[corner * stride..(corner + 1) * stride];

    let triangles: usize = vcount.iter().map(|&c| c as usize - 2).sum();
    let mut output = Vec::with_capacity(triangles * 3 * stride);
    let mut base = 0;

    for &count in vcount {
        let count = count as usize;
        for i in 1..count - 1 {
            output.extend_from_slice(record(base));
            output.extend_from_slice(record(base + i));
            output.extend_from_slice(record(base + i + 1));
        }
        base += count;
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangles_unchanged() {
        let records = [0, 0, 1, 1, 2, 2, 2, 2, 1, 1, 3, 3];
        let out = triangulate(&records, 2, &[3, 3], false).unwrap();
        assert_eq!(out, records.to_vec());
    }

    #[test]
    fn test_mixed_polygons() {
        // A triangle followed by a pentagon
        let records = [0, 1, 2, 10, 11, 12, 13, 14];
        let out = triangulate(&records, 1, &[3, 5], true).unwrap();
        assert_eq!(out, vec![0, 1, 2, 10, 11, 12, 10, 12, 13, 10, 13, 14]);
    }

    #[test]
    fn test_quad_rejected_without_triangulation() {
        let result = triangulate(&[0, 1, 2, 3], 1, &[4], false);
        assert_eq!(
            result,
            Err(BuildError::NonTriangularPolygon {
                polygon: 0,
                corners: 4,
            })
        );
    }

    #[test]
    fn test_degenerate_polygon() {
        let result = triangulate(&[0, 1, 2, 3, 4], 1, &[3, 2], true);
        assert_eq!(
            result,
            Err(BuildError::DegeneratePolygon {
                polygon: 1,
                corners: 2,
            })
        );
    }

    #[test]
    fn test_corner_count_mismatch() {
        let result = triangulate(&[0, 1, 2, 3], 2, &[3], true);
        assert!(matches!(
            result,
            Err(BuildError::CountMismatch { expected: 6, actual: 4, .. })
        ));
    }

    #[test]
    fn test_fieldless_records_expand_to_nothing() {
        // Huge corner counts with no fields must not be walked
        let out = triangulate(&[], 0, &[u32::MAX, u32::MAX], true).unwrap();
        assert!(out.is_empty());

        let result = triangulate(&[], 0, &[4], false);
        assert!(matches!(
            result,
            Err(BuildError::NonTriangularPolygon { corners: 4, .. })
        ));
    }
}
