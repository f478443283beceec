//! Qube shape detection
//!
//! A dataset is a *qube* when its length along every axis is the same for
//! every combination of outer indices, which lets the geometry collapse
//! into a flat shape vector. [`shape_of`] performs that collapse and
//! returns `None` for jagged datasets; everything downstream of shape
//! detection requires qube inputs.

use crate::dataset::Dataset;

/// Shape vector of a dataset, or `None` if it is jagged.
///
/// Walks axis 0 recursively and requires every slice to report identical
/// geometry. Cost is proportional to the number of length queries the
/// structure forces, exponential only for pathological jagged inputs.
pub fn shape_of(ds: &dyn Dataset) -> Option<Vec<usize>> {
    slice_shape(ds, &mut Vec::new(), ds.rank())
}

fn slice_shape(ds: &dyn Dataset, prefix: &mut Vec<usize>, rank: usize) -> Option<Vec<usize>> {
    let depth = prefix.len();
    if depth == rank {
        return Some(Vec::new());
    }
    let len = ds.length(prefix);
    if depth + 1 == rank {
        return Some(vec![len]);
    }
    if len == 0 {
        // No slices exist to disagree; inner lengths are taken as zero.
        return Some(vec![0; rank - depth]);
    }

    prefix.push(0);
    let first = slice_shape(ds, prefix, rank)?;
    for i in 1..len {
        *prefix.last_mut().expect("non-empty prefix") = i;
        let inner = slice_shape(ds, prefix, rank)?;
        if inner != first {
            prefix.pop();
            return None;
        }
    }
    prefix.pop();

    let mut shape = Vec::with_capacity(rank - depth);
    shape.push(len);
    shape.extend(first);
    Some(shape)
}

/// Check that two datasets have identical geometry.
///
/// For qubes this is shape equality; for jagged datasets every axis-0
/// slice is compared recursively.
pub fn same_geometry(a: &dyn Dataset, b: &dyn Dataset) -> bool {
    if a.rank() != b.rank() {
        return false;
    }
    match (shape_of(a), shape_of(b)) {
        (Some(sa), Some(sb)) => sa == sb,
        _ => ragged_match(a, b, &mut Vec::new()),
    }
}

fn ragged_match(a: &dyn Dataset, b: &dyn Dataset, prefix: &mut Vec<usize>) -> bool {
    if prefix.len() == a.rank() {
        return true;
    }
    let len = a.length(prefix);
    if len != b.length(prefix) {
        return false;
    }
    for i in 0..len {
        prefix.push(i);
        let ok = ragged_match(a, b, prefix);
        prefix.pop();
        if !ok {
            return false;
        }
    }
    true
}

/// Shape with one axis removed, for reduction results
pub fn remove_axis(shape: &[usize], axis: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(shape.len().saturating_sub(1));
    for (i, &len) in shape.iter().enumerate() {
        if i != axis {
            out.push(len);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ArrayDataset, RaggedDataset};

    #[test]
    fn test_shape_of_scalar() {
        let ds = ArrayDataset::scalar(1.0);
        assert_eq!(shape_of(&ds), Some(vec![]));
    }

    #[test]
    fn test_shape_of_grid() {
        let ds = ArrayDataset::grid(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(shape_of(&ds), Some(vec![2, 3]));
    }

    #[test]
    fn test_shape_of_ragged_is_none() {
        let ds = RaggedDataset::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(shape_of(&ds), None);
    }

    #[test]
    fn test_uniform_ragged_is_a_qube() {
        // Jagged storage with equal row lengths still collapses to a shape.
        let ds = RaggedDataset::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(shape_of(&ds), Some(vec![2, 2]));
    }

    #[test]
    fn test_same_geometry_qubes() {
        let a = ArrayDataset::grid(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = ArrayDataset::grid(&[vec![0.0, 0.0], vec![0.0, 0.0]]).unwrap();
        let c = ArrayDataset::vector(&[1.0, 2.0]);
        assert!(same_geometry(&a, &b));
        assert!(!same_geometry(&a, &c));
    }

    #[test]
    fn test_same_geometry_ragged() {
        let a = RaggedDataset::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        let b = RaggedDataset::from_rows(vec![vec![0.0, 0.0], vec![0.0]]);
        let c = RaggedDataset::from_rows(vec![vec![0.0], vec![0.0, 0.0]]);
        assert!(same_geometry(&a, &b));
        assert!(!same_geometry(&a, &c));
    }

    #[test]
    fn test_remove_axis() {
        assert_eq!(remove_axis(&[2, 3, 4], 1), vec![2, 4]);
        assert_eq!(remove_axis(&[5], 0), Vec::<usize>::new());
    }
}
