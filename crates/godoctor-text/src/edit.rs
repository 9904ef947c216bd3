use crate::file::Extent;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("edit at offset {offset} length {length} overlaps an existing edit")]
    OverlappingEdit { offset: usize, length: usize },
    #[error("edit extent {offset}..{end} exceeds input length {input_len}")]
    OutOfRange {
        offset: usize,
        end: usize,
        input_len: usize,
    },
}

#[derive(Debug, Clone)]
struct Edit {
    extent: Extent,
    replacement: Vec<u8>,
}

/// A per-file sorted collection of disjoint extents with their replacement byte strings.
///
/// Grounded on the non-overlapping edit-set invariant and apply/translate operations
/// common to source-rewriting tools (see `other_examples/.../edit.rs` for the pattern
/// this generalizes from line-oriented to arbitrary-byte edits).
#[derive(Debug, Clone, Default)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    pub fn new() -> Self {
        EditSet { edits: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Adds an edit in sorted order. Fails with `OverlappingEdit` if it conflicts with an
    /// existing edit on this file, per spec.md §4.1's extent-disjointness rule.
    pub fn add(&mut self, extent: Extent, replacement: impl Into<Vec<u8>>) -> Result<(), EditError> {
        for e in &self.edits {
            if !extent.is_disjoint_from(&e.extent) {
                return Err(EditError::OverlappingEdit {
                    offset: extent.offset,
                    length: extent.length,
                });
            }
        }
        let replacement = replacement.into();
        let idx = self
            .edits
            .partition_point(|e| e.extent.offset < extent.offset || (e.extent.offset == extent.offset && e.extent.length == 0 && extent.length > 0));
        self.edits.insert(idx, Edit { extent, replacement });
        self.edits.sort_by_key(|e| (e.extent.offset, e.extent.length));
        Ok(())
    }

    /// Walks edits in ascending offset order, copying unmodified regions and substituting
    /// replacements. Fails with `OutOfRange` if an extent exceeds the input length.
    pub fn apply_to(&self, input: &[u8]) -> Result<Vec<u8>, EditError> {
        let mut out = Vec::with_capacity(input.len());
        let mut cursor = 0usize;
        for e in &self.edits {
            if e.extent.end() > input.len() {
                return Err(EditError::OutOfRange {
                    offset: e.extent.offset,
                    end: e.extent.end(),
                    input_len: input.len(),
                });
            }
            if e.extent.offset < cursor {
                return Err(EditError::OverlappingEdit {
                    offset: e.extent.offset,
                    length: e.extent.length,
                });
            }
            out.extend_from_slice(&input[cursor..e.extent.offset]);
            out.extend_from_slice(&e.replacement);
            cursor = e.extent.end();
        }
        out.extend_from_slice(&input[cursor..]);
        Ok(out)
    }

    /// Translates an offset in the original file through the edits to its offset in the
    /// post-transformation file, for reporting diagnostics against the new source.
    pub fn new_offset(&self, old: usize) -> usize {
        let mut delta: i64 = 0;
        for e in &self.edits {
            if e.extent.offset >= old {
                break;
            }
            if e.extent.end() <= old {
                delta += e.replacement.len() as i64 - e.extent.length as i64;
            } else {
                // old falls inside this edit's extent; snap to the start of the replacement.
                return (e.extent.offset as i64 + delta) as usize;
            }
        }
        (old as i64 + delta) as usize
    }

    /// The inverse of `new_offset`, used to keep pre-existing diagnostics attached to
    /// their original source positions.
    pub fn old_offset(&self, new: usize) -> usize {
        let mut delta: i64 = 0;
        for e in &self.edits {
            let new_start = (e.extent.offset as i64 + delta) as usize;
            if new_start >= new {
                break;
            }
            let new_end = new_start + e.replacement.len();
            if new_end <= new {
                delta += e.replacement.len() as i64 - e.extent.length as i64;
            } else {
                return (e.extent.offset as i64).max(0) as usize;
            }
        }
        (new as i64 - delta) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::Extent;

    #[test]
    fn apply_to_literal_example() {
        let mut edits = EditSet::new();
        edits.add(Extent::new(2, 0), "A").unwrap();
        edits.add(Extent::new(4, 0), "C").unwrap();
        edits.add(Extent::new(6, 2), "D").unwrap();
        edits.add(Extent::new(8, 1), "B").unwrap();
        let out = edits.apply_to(b"0123456789").unwrap();
        assert_eq!(out, b"01A23C45DB9");
    }

    #[test]
    fn overlapping_edits_rejected() {
        let mut edits = EditSet::new();
        edits.add(Extent::new(2, 3), "x").unwrap();
        let err = edits.add(Extent::new(3, 1), "y").unwrap_err();
        assert!(matches!(err, EditError::OverlappingEdit { .. }));
    }

    #[test]
    fn two_insertions_same_point_conflict() {
        let mut edits = EditSet::new();
        edits.add(Extent::point(5), "x").unwrap();
        let err = edits.add(Extent::point(5), "y").unwrap_err();
        assert!(matches!(err, EditError::OverlappingEdit { .. }));
    }

    #[test]
    fn out_of_range_detected() {
        let mut edits = EditSet::new();
        edits.add(Extent::new(5, 10), "x").unwrap();
        let err = edits.apply_to(b"short").unwrap_err();
        assert!(matches!(err, EditError::OutOfRange { .. }));
    }

    #[test]
    fn apply_to_matches_input_outside_edits() {
        let mut edits = EditSet::new();
        edits.add(Extent::new(2, 2), "XY").unwrap();
        let input = b"abcdefgh";
        let out = edits.apply_to(input).unwrap();
        assert_eq!(&out[0..2], &input[0..2]);
        assert_eq!(&out[4..], &input[4..]);
    }

    #[test]
    fn new_offset_and_old_offset_roundtrip_outside_edits() {
        let mut edits = EditSet::new();
        edits.add(Extent::new(4, 2), "XYZ").unwrap();
        let new = edits.new_offset(10);
        assert_eq!(edits.old_offset(new), 10);
    }
}
