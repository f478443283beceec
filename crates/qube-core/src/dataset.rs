//! Dataset contract and concrete storage types
//!
//! The [`Dataset`] trait is the single boundary through which every
//! consumer reads array-like values: a rank, per-axis lengths, scalar
//! reads by index tuple, and typed metadata. Instead of per-rank
//! overloaded accessors, one indexed accessor takes a slice whose length
//! equals the rank, and one length accessor takes the outer indices
//! leading up to the queried axis.
//!
//! Concrete types:
//! - [`ArrayDataset`]: immutable row-major rectangular storage
//! - [`QubeBuilder`]: the writable variant used only during construction
//! - [`RaggedDataset`]: rank-2 jagged rows, for the non-qube paths

use serde::{Deserialize, Serialize};

use crate::error::{QubeError, QubeResult};
use crate::metadata::Metadata;

/// Maximum rank supported by the engine
pub const MAX_RANK: usize = 3;

/// Read contract every array-like value implements.
///
/// Datasets are immutable value types; all operations allocate fresh
/// outputs and never mutate an input.
pub trait Dataset {
    /// Number of index dimensions (0 = scalar, up to [`MAX_RANK`])
    fn rank(&self) -> usize;

    /// Length of axis `prefix.len()` given the outer indices `prefix`.
    ///
    /// `length(&[])` is the axis-0 length, `length(&[i])` the axis-1
    /// length within slice `i`, and so on. For a qube the result is
    /// independent of the prefix values.
    fn length(&self, prefix: &[usize]) -> usize;

    /// Value at a full index tuple (`index.len() == rank`)
    fn value(&self, index: &[usize]) -> f64;

    /// Metadata attached to this dataset
    fn metadata(&self) -> &Metadata;

    /// Check a value against this dataset's fill sentinel
    fn is_fill(&self, value: f64) -> bool {
        self.metadata().is_fill(value)
    }
}

impl<D: Dataset + ?Sized> Dataset for &D {
    fn rank(&self) -> usize {
        (**self).rank()
    }

    fn length(&self, prefix: &[usize]) -> usize {
        (**self).length(prefix)
    }

    fn value(&self, index: &[usize]) -> f64 {
        (**self).value(index)
    }

    fn metadata(&self) -> &Metadata {
        (**self).metadata()
    }
}

/// Row-major offset of an index tuple within a shape
fn flat_offset(shape: &[usize], index: &[usize]) -> usize {
    debug_assert_eq!(shape.len(), index.len());
    let mut offset = 0;
    for (axis, (&len, &i)) in shape.iter().zip(index.iter()).enumerate() {
        debug_assert!(i < len, "index {i} out of range on axis {axis}");
        offset = offset * len + i;
    }
    offset
}

/// Number of elements a shape holds
pub fn element_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Immutable rectangular dataset with row-major storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayDataset {
    shape: Vec<usize>,
    data: Vec<f64>,
    metadata: Metadata,
}

impl ArrayDataset {
    /// Create a dataset from a shape and a row-major element buffer
    pub fn from_elements(shape: Vec<usize>, data: Vec<f64>) -> QubeResult<Self> {
        validate_shape(&shape)?;
        let expected = element_count(&shape);
        if data.len() != expected {
            return Err(QubeError::LengthMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            shape,
            data,
            metadata: Metadata::new(),
        })
    }

    /// Create a rank-0 scalar dataset
    pub fn scalar(value: f64) -> Self {
        Self {
            shape: Vec::new(),
            data: vec![value],
            metadata: Metadata::new(),
        }
    }

    /// Create a rank-1 dataset from a slice
    pub fn vector(values: &[f64]) -> Self {
        Self {
            shape: vec![values.len()],
            data: values.to_vec(),
            metadata: Metadata::new(),
        }
    }

    /// Create a rank-2 dataset from rows of equal length
    pub fn grid(rows: &[Vec<f64>]) -> QubeResult<Self> {
        let ncols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(QubeError::NonQube { axis: 1 });
            }
            data.extend_from_slice(row);
        }
        Self::from_elements(vec![rows.len(), ncols], data)
    }

    /// Replace the metadata, consuming the dataset
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// The dataset's shape vector
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The raw row-major element buffer
    pub fn elements(&self) -> &[f64] {
        &self.data
    }
}

impl Dataset for ArrayDataset {
    fn rank(&self) -> usize {
        self.shape.len()
    }

    fn length(&self, prefix: &[usize]) -> usize {
        self.shape[prefix.len()]
    }

    fn value(&self, index: &[usize]) -> f64 {
        self.data[flat_offset(&self.shape, index)]
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

fn validate_shape(shape: &[usize]) -> QubeResult<()> {
    crate::error::validation::validate_rank(shape.len(), MAX_RANK)
}

/// Writable dataset used only during construction.
///
/// Allocated per operation with the result shape, written through a
/// cursor or [`QubeBuilder::set`], then frozen with
/// [`QubeBuilder::build`]. Never shared between operations.
#[derive(Debug, Clone)]
pub struct QubeBuilder {
    shape: Vec<usize>,
    data: Vec<f64>,
    metadata: Metadata,
}

impl QubeBuilder {
    /// Allocate a zero-filled buffer for a shape
    pub fn new(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            data: vec![0.0; element_count(shape)],
            metadata: Metadata::new(),
        }
    }

    /// Store a value at an index tuple
    pub fn set(&mut self, index: &[usize], value: f64) {
        let offset = flat_offset(&self.shape, index);
        self.data[offset] = value;
    }

    /// Replace the metadata that will be attached to the built dataset
    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }

    /// Mutable access to the pending metadata
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// The builder's shape vector
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Freeze into an immutable dataset
    pub fn build(self) -> ArrayDataset {
        ArrayDataset {
            shape: self.shape,
            data: self.data,
            metadata: self.metadata,
        }
    }
}

/// Rank-2 dataset whose rows may have different lengths.
///
/// Exists to exercise the non-qube paths: shape detection returns absent
/// for it, and reduction/coercion reject it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaggedDataset {
    rows: Vec<Vec<f64>>,
    metadata: Metadata,
}

impl RaggedDataset {
    /// Create from rows, preserving each row's own length
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        Self {
            rows,
            metadata: Metadata::new(),
        }
    }

    /// Replace the metadata, consuming the dataset
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Dataset for RaggedDataset {
    fn rank(&self) -> usize {
        2
    }

    fn length(&self, prefix: &[usize]) -> usize {
        match prefix {
            [] => self.rows.len(),
            [i] => self.rows[*i].len(),
            _ => panic!("length prefix longer than rank 2"),
        }
    }

    fn value(&self, index: &[usize]) -> f64 {
        self.rows[index[0]][index[1]]
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_dataset() {
        let ds = ArrayDataset::scalar(4.5);
        assert_eq!(ds.rank(), 0);
        assert_eq!(ds.value(&[]), 4.5);
    }

    #[test]
    fn test_vector_dataset() {
        let ds = ArrayDataset::vector(&[1.0, 2.0, 3.0]);
        assert_eq!(ds.rank(), 1);
        assert_eq!(ds.length(&[]), 3);
        assert_eq!(ds.value(&[2]), 3.0);
    }

    #[test]
    fn test_grid_row_major_layout() {
        let ds = ArrayDataset::grid(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(ds.rank(), 2);
        assert_eq!(ds.length(&[]), 2);
        assert_eq!(ds.length(&[0]), 3);
        assert_eq!(ds.value(&[1, 0]), 4.0);
        assert_eq!(ds.value(&[0, 2]), 3.0);
    }

    #[test]
    fn test_from_elements_length_check() {
        let err = ArrayDataset::from_elements(vec![2, 2], vec![1.0, 2.0, 3.0]);
        assert_eq!(
            err.unwrap_err(),
            QubeError::LengthMismatch {
                expected: 4,
                got: 3
            }
        );
    }

    #[test]
    fn test_from_elements_rank_limit() {
        let err = ArrayDataset::from_elements(vec![1, 1, 1, 1], vec![1.0]);
        assert!(matches!(err, Err(QubeError::UnsupportedRank { .. })));
    }

    #[test]
    fn test_builder_round_trip() {
        let mut b = QubeBuilder::new(&[2, 2]);
        b.set(&[0, 1], 7.0);
        b.set(&[1, 0], 9.0);
        let ds = b.build();
        assert_eq!(ds.value(&[0, 1]), 7.0);
        assert_eq!(ds.value(&[1, 0]), 9.0);
        assert_eq!(ds.value(&[0, 0]), 0.0);
    }

    #[test]
    fn test_ragged_lengths() {
        let ds = RaggedDataset::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(ds.rank(), 2);
        assert_eq!(ds.length(&[]), 2);
        assert_eq!(ds.length(&[0]), 2);
        assert_eq!(ds.length(&[1]), 1);
        assert_eq!(ds.value(&[1, 0]), 3.0);
    }
}
