//! Deduplication of attribute index combinations.
//!
//! Each face corner of a multi-indexed mesh is a record holding one original
//! index per input. Two corners become the same output vertex exactly when
//! their records are equal field by field. [`CombinationMap`] scans the
//! records once and assigns compact vertex indices in order of first
//! occurrence, so the result depends only on the record array.

use std::collections::hash_map::{Entry, RandomState};
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, Hasher};

use crate::error::BuildError;

/// One record viewed as a value.
///
/// Hashing and equality look at the field contents, never at where the
/// record lives in the array.
#[derive(Debug, Clone, Copy)]
pub struct CombinationKey<'a>(&'a [u32]);

impl<'a> CombinationKey<'a> {
    /// Wrap a record slice.
    #[inline]
    pub fn new(fields: &'a [u32]) -> Self {
        Self(fields)
    }

    /// The record's fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &'a [u32] {
        self.0
    }

    /// The field at `offset`.
    #[inline]
    pub fn field(&self, offset: usize) -> Option<u32> {
        self.0.get(offset).copied()
    }
}

impl Hash for CombinationKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.0.len());
        for &field in self.0 {
            state.write_u32(field);
        }
    }
}

impl PartialEq for CombinationKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().zip(other.0).all(|(a, b)| a == b)
    }
}

impl Eq for CombinationKey<'_> {}

/// Mapping from distinct index combinations to compact vertex indices.
///
/// Borrows the record array it was built from for its whole lifetime.
///
/// # Example
///
/// ```
/// use tessera::build::CombinationMap;
///
/// let records = [0, 0, 1, 0, 0, 0, 1, 1];
/// let map = CombinationMap::build(&records, 2).unwrap();
///
/// assert_eq!(map.len(), 3);
/// assert_eq!(map.indices(), &[0, 1, 0, 2]);
/// assert_eq!(map.get(&[1, 1]), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct CombinationMap<'a, S = RandomState> {
    records: &'a [u32],
    stride: usize,
    lookup: HashMap<CombinationKey<'a>, u32, S>,
    /// Record number of each vertex's first occurrence, by compact index.
    first_seen: Vec<usize>,
    indices: Vec<u32>,
}

impl<'a> CombinationMap<'a> {
    /// Deduplicate `records`, read as consecutive groups of `stride` fields.
    ///
    /// A zero stride or an empty array yields an empty map. Fails with
    /// [`BuildError::CountMismatch`] if the array does not split into whole
    /// records. Field values are not bounds-checked here.
    pub fn build(records: &'a [u32], stride: usize) -> Result<Self, BuildError> {
        Self::build_with_hasher(records, stride, RandomState::new())
    }
}

impl<'a, S: BuildHasher> CombinationMap<'a, S> {
    /// Like [`build`](CombinationMap::build), hashing keys with `hasher`.
    ///
    /// The hash only picks a bucket; keys are always compared field by field.
    pub fn build_with_hasher(
        records: &'a [u32],
        stride: usize,
        hasher: S,
    ) -> Result<Self, BuildError> {
        if stride == 0 || records.is_empty() {
            return Ok(Self {
                records,
                stride,
                lookup: HashMap::with_hasher(hasher),
                first_seen: Vec::new(),
                indices: Vec::new(),
            });
        }

        if records.len() % stride != 0 {
            return Err(BuildError::count_mismatch(
                "index records",
                records.len().div_ceil(stride) * stride,
                records.len(),
            ));
        }

        let corners = records.len() / stride;
        let mut lookup = HashMap::with_capacity_and_hasher(corners, hasher);
        let mut first_seen = Vec::new();
        let mut indices = Vec::with_capacity(corners);

        for (corner, record) in records.chunks_exact(stride).enumerate() {
            let index = match lookup.entry(CombinationKey(record)) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    let next = first_seen.len();
                    let index = u32::try_from(next)
                        .map_err(|_| BuildError::IndexOverflow { count: next + 1 })?;
                    first_seen.push(corner);
                    *entry.insert(index)
                }
            };
            indices.push(index);
        }

        Ok(Self {
            records,
            stride,
            lookup,
            first_seen,
            indices,
        })
    }

    /// Number of distinct combinations (output vertices).
    #[inline]
    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    /// Check if no combination was seen.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }

    /// Fields per record.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of records scanned.
    #[inline]
    pub fn corner_count(&self) -> usize {
        self.indices.len()
    }

    /// The output index buffer, one compact index per record.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Consume the map, keeping only the output index buffer.
    pub fn into_indices(self) -> Vec<u32> {
        self.indices
    }

    /// Compact index assigned to `record`, if it occurs.
    pub fn get(&self, record: &[u32]) -> Option<u32> {
        self.lookup.get(&CombinationKey(record)).copied()
    }

    /// The combination assigned to compact index `vertex`.
    pub fn key(&self, vertex: usize) -> Option<CombinationKey<'a>> {
        let corner = *self.first_seen.get(vertex)?;
        let start = corner * self.stride;
        Some(CombinationKey(&self.records[start..start + self.stride]))
    }

    /// Iterate over `(combination, compact index)` pairs in compact order.
    pub fn iter(&self) -> impl Iterator<Item = (CombinationKey<'a>, u32)> + '_ {
        let records = self.records;
        let stride = self.stride;
        self.first_seen.iter().enumerate().map(move |(vertex, &corner)| {
            let start = corner * stride;
            // len() fits u32, checked in build()
            (
                CombinationKey(&records[start..start + stride]),
                vertex as u32,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::hash::BuildHasherDefault;

    /// Deterministic pseudo-random records with plenty of repeats.
    fn random_records(corners: usize, stride: usize, range: u32, seed: u64) -> Vec<u32> {
        let mut state = seed;
        (0..corners * stride)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                ((state >> 33) as u32) % range
            })
            .collect()
    }

    #[test]
    fn test_first_seen_scenario() {
        let records = [0, 0, 1, 0, 0, 0, 1, 1];
        let map = CombinationMap::build(&records, 2).unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map.indices(), &[0, 1, 0, 2]);
        assert_eq!(map.get(&[0, 0]), Some(0));
        assert_eq!(map.get(&[1, 0]), Some(1));
        assert_eq!(map.get(&[1, 1]), Some(2));
        assert_eq!(map.get(&[0, 1]), None);
    }

    #[test]
    fn test_empty_inputs() {
        let map = CombinationMap::build(&[], 3).unwrap();
        assert!(map.is_empty());
        assert!(map.indices().is_empty());

        let map = CombinationMap::build(&[1, 2, 3], 0).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.corner_count(), 0);
    }

    #[test]
    fn test_partial_record() {
        let result = CombinationMap::build(&[0, 1, 2, 3, 4], 2);
        assert_eq!(result.unwrap_err(), BuildError::count_mismatch("index records", 6, 5));
    }

    #[test]
    fn test_equal_content_different_position() {
        // Same fields far apart in the array must map to one vertex
        let records = [7, 3, 9, 1, 2, 3, 7, 3, 9];
        let map = CombinationMap::build(&records, 3).unwrap();
        assert_eq!(map.indices(), &[0, 1, 0]);
    }

    #[test]
    fn test_order_sensitive_fields() {
        // (1, 2) and (2, 1) are different combinations
        let map = CombinationMap::build(&[1, 2, 2, 1], 2).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_deterministic() {
        let records = random_records(2000, 3, 12, 42);
        let a = CombinationMap::build(&records, 3).unwrap();
        let b = CombinationMap::build(&records, 3).unwrap();

        assert_eq!(a.indices(), b.indices());
        let keys_a: Vec<_> = a.iter().map(|(k, i)| (k.fields().to_vec(), i)).collect();
        let keys_b: Vec<_> = b.iter().map(|(k, i)| (k.fields().to_vec(), i)).collect();
        assert_eq!(keys_a, keys_b);
    }

    #[test]
    fn test_bijection() {
        let records = random_records(1500, 2, 20, 7);
        let map = CombinationMap::build(&records, 2).unwrap();

        let distinct: HashSet<&[u32]> = records.chunks_exact(2).collect();
        assert_eq!(map.len(), distinct.len());
        assert_eq!(map.corner_count(), 1500);

        // Every compact index in [0, len) is used, and only those
        let used: HashSet<u32> = map.indices().iter().copied().collect();
        assert_eq!(used.len(), map.len());
        assert!(used.iter().all(|&i| (i as usize) < map.len()));

        // Each corner's compact index maps back to its own record
        for (corner, record) in records.chunks_exact(2).enumerate() {
            let vertex = map.indices()[corner] as usize;
            assert_eq!(map.key(vertex).unwrap().fields(), record);
        }
    }

    #[test]
    fn test_first_seen_ordering() {
        let records = random_records(1000, 3, 6, 99);
        let map = CombinationMap::build(&records, 3).unwrap();

        // Scanning in order, each new combination gets exactly the next index
        let mut highest: Option<u32> = None;
        for &index in map.indices() {
            match highest {
                Some(h) if index <= h => {}
                _ => {
                    assert_eq!(index, highest.map_or(0, |h| h + 1));
                    highest = Some(index);
                }
            }
        }

        for (expected, (_, index)) in map.iter().enumerate() {
            assert_eq!(index as usize, expected);
        }
    }

    /// Sends every key to the same bucket.
    #[derive(Default)]
    struct CollidingHasher;

    impl Hasher for CollidingHasher {
        fn finish(&self) -> u64 {
            0
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    #[test]
    fn test_colliding_hashes_stay_distinct() {
        let hasher = BuildHasherDefault::<CollidingHasher>::default();
        let records = random_records(400, 2, 9, 3);
        let colliding = CombinationMap::build_with_hasher(&records, 2, hasher).unwrap();
        let regular = CombinationMap::build(&records, 2).unwrap();

        assert_eq!(colliding.indices(), regular.indices());
        assert_eq!(colliding.len(), regular.len());
        assert_eq!(colliding.get(&[1, 2]), regular.get(&[1, 2]));
        assert_eq!(colliding.get(&[9, 9]), None);
    }

    #[test]
    fn test_key_access() {
        let records = [4, 5, 6, 7];
        let map = CombinationMap::build(&records, 2).unwrap();

        let key = map.key(1).unwrap();
        assert_eq!(key.fields(), &[6, 7]);
        assert_eq!(key.field(1), Some(7));
        assert_eq!(key.field(2), None);
        assert!(map.key(2).is_none());
    }
}
