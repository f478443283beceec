//! Rank coercion: aligning a lower-rank dataset with a higher-rank one
//!
//! [`coerce`] wraps the lower-rank operand in a [`BroadcastView`] that
//! reports the higher rank and replays the wrapped values by discarding
//! the trailing index components. No data is copied. When both operands
//! already share rank and geometry the low operand is passed through
//! unchanged, with no wrapper.
//!
//! The prefix precondition is enforced, not assumed: the low shape must
//! be a geometric prefix of the high shape, otherwise the call fails with
//! a geometry mismatch instead of silently misaligning data.

use crate::dataset::{Dataset, MAX_RANK};
use crate::error::{QubeError, QubeResult};
use crate::metadata::Metadata;
use crate::shape::shape_of;

/// View presenting a lower-rank dataset at a higher rank.
///
/// One generic view covers every source rank: `value` truncates the index
/// tuple to the wrapped rank, lengths come from the target shape, and
/// metadata delegates to the wrapped dataset.
pub struct BroadcastView<'a> {
    inner: &'a dyn Dataset,
    inner_rank: usize,
    shape: Vec<usize>,
}

impl Dataset for BroadcastView<'_> {
    fn rank(&self) -> usize {
        self.shape.len()
    }

    fn length(&self, prefix: &[usize]) -> usize {
        self.shape[prefix.len()]
    }

    fn value(&self, index: &[usize]) -> f64 {
        self.inner.value(&index[..self.inner_rank])
    }

    fn metadata(&self) -> &Metadata {
        self.inner.metadata()
    }
}

/// Result of rank coercion: either the untouched operand or a view
pub enum Coerced<'a> {
    /// Operands already agreed; no adapter was introduced
    Passthrough(&'a dyn Dataset),
    /// Lower-rank operand promoted to the higher rank
    Promoted(BroadcastView<'a>),
}

impl std::fmt::Debug for Coerced<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Coerced::Passthrough(_) => f.write_str("Passthrough"),
            Coerced::Promoted(_) => f.write_str("Promoted"),
        }
    }
}

impl Dataset for Coerced<'_> {
    fn rank(&self) -> usize {
        match self {
            Coerced::Passthrough(ds) => ds.rank(),
            Coerced::Promoted(view) => view.rank(),
        }
    }

    fn length(&self, prefix: &[usize]) -> usize {
        match self {
            Coerced::Passthrough(ds) => ds.length(prefix),
            Coerced::Promoted(view) => view.length(prefix),
        }
    }

    fn value(&self, index: &[usize]) -> f64 {
        match self {
            Coerced::Passthrough(ds) => ds.value(index),
            Coerced::Promoted(view) => view.value(index),
        }
    }

    fn metadata(&self) -> &Metadata {
        match self {
            Coerced::Passthrough(ds) => ds.metadata(),
            Coerced::Promoted(view) => view.metadata(),
        }
    }
}

/// Align `low` with `high`, promoting its rank if necessary.
///
/// Errors:
/// - `NonQube` when either operand is jagged
/// - `GeometryMismatch` when the ranks agree but shapes differ, when
///   `low` outranks `high`, or when the prefix precondition fails
/// - `UnsupportedRank` when `low` already sits at the rank limit
pub fn coerce<'a>(low: &'a dyn Dataset, high: &dyn Dataset) -> QubeResult<Coerced<'a>> {
    let low_shape = shape_of(low).ok_or(QubeError::NonQube { axis: 0 })?;
    let high_shape = shape_of(high).ok_or(QubeError::NonQube { axis: 0 })?;

    if low_shape == high_shape {
        return Ok(Coerced::Passthrough(low));
    }
    if low.rank() >= high.rank() {
        return Err(QubeError::GeometryMismatch {
            low: low_shape,
            high: high_shape,
        });
    }
    if low.rank() >= MAX_RANK {
        return Err(QubeError::UnsupportedRank {
            rank: low.rank(),
            max: MAX_RANK,
        });
    }
    if !high_shape.starts_with(&low_shape) {
        return Err(QubeError::GeometryMismatch {
            low: low_shape,
            high: high_shape,
        });
    }

    Ok(Coerced::Promoted(BroadcastView {
        inner: low,
        inner_rank: low_shape.len(),
        shape: high_shape,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ArrayDataset, RaggedDataset};
    use crate::units::Units;
    use crate::Metadata;

    #[test]
    fn test_identity_passthrough() {
        let a = ArrayDataset::vector(&[1.0, 2.0]);
        let b = ArrayDataset::vector(&[3.0, 4.0]);
        let c = coerce(&a, &b).unwrap();
        assert!(matches!(c, Coerced::Passthrough(_)));
        assert_eq!(c.value(&[1]), 2.0);
    }

    #[test]
    fn test_scalar_against_vector() {
        let s = ArrayDataset::scalar(7.0);
        let v = ArrayDataset::vector(&[1.0, 2.0, 3.0]);
        let c = coerce(&s, &v).unwrap();
        assert_eq!(c.rank(), 1);
        assert_eq!(c.length(&[]), 3);
        for i in 0..3 {
            assert_eq!(c.value(&[i]), 7.0);
        }
    }

    #[test]
    fn test_vector_against_grid_replays_rows() {
        let v = ArrayDataset::vector(&[10.0, 20.0]);
        let g = ArrayDataset::grid(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let c = coerce(&v, &g).unwrap();
        assert_eq!(c.rank(), 2);
        assert_eq!(c.length(&[0]), 3);
        assert_eq!(c.value(&[0, 2]), 10.0);
        assert_eq!(c.value(&[1, 0]), 20.0);
    }

    #[test]
    fn test_metadata_delegates_to_low() {
        let s = ArrayDataset::scalar(1.0).with_metadata(Metadata::new().with_units(Units::new("nT")));
        let v = ArrayDataset::vector(&[0.0; 4]);
        let c = coerce(&s, &v).unwrap();
        assert_eq!(c.metadata().units, Some(Units::new("nT")));
    }

    #[test]
    fn test_prefix_mismatch_is_an_error() {
        let v = ArrayDataset::vector(&[1.0, 2.0, 3.0]);
        let g = ArrayDataset::grid(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert!(matches!(
            coerce(&v, &g),
            Err(QubeError::GeometryMismatch { .. })
        ));
    }

    #[test]
    fn test_equal_rank_shape_mismatch() {
        let a = ArrayDataset::vector(&[1.0, 2.0]);
        let b = ArrayDataset::vector(&[1.0, 2.0, 3.0]);
        assert!(matches!(
            coerce(&a, &b),
            Err(QubeError::GeometryMismatch { .. })
        ));
    }

    /// Minimal rank-4 dataset; only a custom impl can exceed the rank
    /// limit, since `ArrayDataset` refuses to construct one.
    struct HyperOnes {
        metadata: Metadata,
    }

    impl Dataset for HyperOnes {
        fn rank(&self) -> usize {
            4
        }

        fn length(&self, _prefix: &[usize]) -> usize {
            2
        }

        fn value(&self, _index: &[usize]) -> f64 {
            1.0
        }

        fn metadata(&self) -> &Metadata {
            &self.metadata
        }
    }

    #[test]
    fn test_rank_limit_rejected() {
        let low = ArrayDataset::from_elements(vec![2, 2, 2], vec![0.0; 8]).unwrap();
        let high = HyperOnes {
            metadata: Metadata::new(),
        };
        assert_eq!(
            coerce(&low, &high).unwrap_err(),
            QubeError::UnsupportedRank { rank: 3, max: 3 }
        );
    }

    #[test]
    fn test_jagged_rejected() {
        let r = RaggedDataset::from_rows(vec![vec![1.0], vec![2.0, 3.0]]);
        let g = ArrayDataset::grid(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert!(matches!(coerce(&r, &g), Err(QubeError::NonQube { .. })));
    }
}
