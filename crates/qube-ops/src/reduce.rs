//! Axis reduction engine
//!
//! Collapses one axis of a qube under a [`ReducePolicy`]. The walk is a
//! pair of synchronised cursors: an outer cursor enumerates the retained
//! axes, and for each outer tuple an inner cursor runs over the full
//! shape with every retained axis pinned to the outer position, so only
//! the collapsed axis actually varies.
//!
//! Fill handling goes through a derived weights mask (1.0 valid, 0.0
//! fill). A position whose entire collapsed run is fill accumulates zero
//! total weight and is written as the weights' declared fill value.

use tracing::debug;

use qube_core::{
    error::validation::validate_axis, remove_axis, shape_of, ArrayDataset, Cursor, Dataset,
    Metadata, QubeBuilder, QubeError, QubeResult, MAX_RANK,
};

/// Running state of one collapsed run
#[derive(Debug, Clone, Copy)]
pub struct Accumulator {
    /// Accumulated value (sum, best-so-far, ...)
    pub value: f64,
    /// Total weight seen; zero means no valid input
    pub total_weight: f64,
}

/// Strategy driving a reduction
pub trait ReducePolicy {
    /// Fresh accumulator for one collapsed run
    fn init(&self) -> Accumulator;

    /// Fold one (value, weight) pair into the accumulator
    fn accumulate(&self, value: f64, weight: f64, acc: &mut Accumulator);

    /// Final adjustment after the run completes
    fn finalize(&self, acc: &mut Accumulator) {
        let _ = acc;
    }
}

/// Weighted sum
pub struct Total;

impl ReducePolicy for Total {
    fn init(&self) -> Accumulator {
        Accumulator {
            value: 0.0,
            total_weight: 0.0,
        }
    }

    fn accumulate(&self, value: f64, weight: f64, acc: &mut Accumulator) {
        acc.value += weight * value;
        acc.total_weight += weight;
    }
}

/// Weighted mean
pub struct Mean;

impl ReducePolicy for Mean {
    fn init(&self) -> Accumulator {
        Accumulator {
            value: 0.0,
            total_weight: 0.0,
        }
    }

    fn accumulate(&self, value: f64, weight: f64, acc: &mut Accumulator) {
        acc.value += weight * value;
        acc.total_weight += weight;
    }

    fn finalize(&self, acc: &mut Accumulator) {
        if acc.total_weight > 0.0 {
            acc.value /= acc.total_weight;
        }
    }
}

/// Largest valid value
pub struct Max;

impl ReducePolicy for Max {
    fn init(&self) -> Accumulator {
        Accumulator {
            value: f64::NEG_INFINITY,
            total_weight: 0.0,
        }
    }

    fn accumulate(&self, value: f64, weight: f64, acc: &mut Accumulator) {
        if weight > 0.0 {
            acc.value = acc.value.max(value);
            acc.total_weight = weight;
        }
    }
}

/// Smallest valid value
pub struct Min;

impl ReducePolicy for Min {
    fn init(&self) -> Accumulator {
        Accumulator {
            value: f64::INFINITY,
            total_weight: 0.0,
        }
    }

    fn accumulate(&self, value: f64, weight: f64, acc: &mut Accumulator) {
        if weight > 0.0 {
            acc.value = acc.value.min(value);
            acc.total_weight = weight;
        }
    }
}

/// Derive the 0/1 validity mask for a dataset.
///
/// Same shape as the source, 1.0 at valid positions and 0.0 at fill
/// positions. The source's fill sentinel is carried as the mask's own
/// fill value so reductions can restore it.
pub fn weights_of(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    let shape = shape_of(ds).ok_or(QubeError::NonQube { axis: 0 })?;
    let mut out = QubeBuilder::new(&shape);
    let mut cursor = Cursor::new(&shape);
    while cursor.has_next() {
        cursor.advance()?;
        let v = cursor.read(ds);
        cursor.write(&mut out, if ds.is_fill(v) { 0.0 } else { 1.0 });
    }
    out.metadata_mut().fill_value = ds.metadata().fill_value;
    Ok(out.build())
}

/// Collapse `axis` of a qube under `policy`; the result rank drops by one.
pub fn reduce(ds: &dyn Dataset, axis: usize, policy: &dyn ReducePolicy) -> QubeResult<ArrayDataset> {
    let shape = shape_of(ds).ok_or(QubeError::NonQube { axis: 0 })?;
    validate_axis(axis, shape.len())?;
    debug!(?shape, axis, "reducing axis");

    let weights = weights_of(ds)?;
    let fill = weights.metadata().fill_or_nan();
    let new_shape = remove_axis(&shape, axis);

    let mut out = QubeBuilder::new(&new_shape);
    let mut outer = Cursor::new(&new_shape);
    while outer.has_next() {
        outer.advance()?;
        let mut inner = Cursor::new(&shape);
        let mut retained = 0;
        for ax in 0..shape.len() {
            if ax == axis {
                continue;
            }
            inner.pin(ax, outer.index(retained))?;
            retained += 1;
        }

        let mut acc = policy.init();
        while inner.has_next() {
            inner.advance()?;
            policy.accumulate(inner.read(ds), inner.read(&weights), &mut acc);
        }
        policy.finalize(&mut acc);

        let y = if acc.total_weight > 0.0 { acc.value } else { fill };
        outer.write(&mut out, y);
    }
    out.set_metadata(reduced_metadata(ds.metadata(), axis));
    Ok(out.build())
}

/// Weighted sum along an axis
pub fn total(ds: &dyn Dataset, axis: usize) -> QubeResult<ArrayDataset> {
    reduce(ds, axis, &Total)
}

/// Weighted mean along an axis
pub fn mean(ds: &dyn Dataset, axis: usize) -> QubeResult<ArrayDataset> {
    reduce(ds, axis, &Mean)
}

/// Largest valid value along an axis
pub fn reduce_max(ds: &dyn Dataset, axis: usize) -> QubeResult<ArrayDataset> {
    reduce(ds, axis, &Max)
}

/// Smallest valid value along an axis
pub fn reduce_min(ds: &dyn Dataset, axis: usize) -> QubeResult<ArrayDataset> {
    reduce(ds, axis, &Min)
}

/// Metadata for a reduction result: the collapsed axis's tags drop out
/// and the higher-axis tags shift down; the hints describing the
/// collapsed axis go with it.
fn reduced_metadata(md: &Metadata, axis: usize) -> Metadata {
    let mut out = Metadata::new();
    out.name = md.name.clone();
    out.units = md.units.clone();
    out.fill_value = md.fill_value;
    let mut k = 0;
    for ax in 0..MAX_RANK {
        if ax == axis {
            continue;
        }
        out.depend[k] = md.depend[ax].clone();
        k += 1;
    }
    if axis != 0 {
        out.monotonic = md.monotonic;
        out.cadence = md.cadence;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use qube_core::RaggedDataset;

    fn grid_2x3() -> ArrayDataset {
        ArrayDataset::grid(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_total_axis0() {
        let r = total(&grid_2x3(), 0).unwrap();
        assert_eq!(r.shape(), &[3]);
        assert_eq!(r.elements(), &[5.0, 7.0, 9.0]);
    }

    #[test]
    fn test_total_axis1() {
        let r = total(&grid_2x3(), 1).unwrap();
        assert_eq!(r.shape(), &[2]);
        assert_eq!(r.elements(), &[6.0, 15.0]);
    }

    #[test]
    fn test_mean_axis1() {
        let r = mean(&grid_2x3(), 1).unwrap();
        assert_eq!(r.elements(), &[2.0, 5.0]);
    }

    #[test]
    fn test_min_max() {
        let r = reduce_max(&grid_2x3(), 0).unwrap();
        assert_eq!(r.elements(), &[4.0, 5.0, 6.0]);
        let r = reduce_min(&grid_2x3(), 1).unwrap();
        assert_eq!(r.elements(), &[1.0, 4.0]);
    }

    #[test]
    fn test_mean_skips_fill() {
        let ds = ArrayDataset::grid(&[vec![1.0, -1.0], vec![3.0, 5.0]])
            .unwrap()
            .with_metadata(Metadata::new().with_fill(-1.0));
        let r = mean(&ds, 1).unwrap();
        // First row averages only the single valid value.
        assert_eq!(r.elements(), &[1.0, 4.0]);
    }

    #[test]
    fn test_all_fill_run_writes_sentinel() {
        let ds = ArrayDataset::grid(&[vec![-1.0, -1.0], vec![3.0, 5.0]])
            .unwrap()
            .with_metadata(Metadata::new().with_fill(-1.0));
        let r = total(&ds, 1).unwrap();
        assert_eq!(r.elements(), &[-1.0, 8.0]);
        assert_eq!(r.metadata().fill_value, Some(-1.0));
    }

    #[test]
    fn test_rank1_total_gives_scalar() {
        let ds = ArrayDataset::vector(&[1.0, 2.0, 3.0]);
        let r = total(&ds, 0).unwrap();
        assert_eq!(r.rank(), 0);
        assert_eq!(r.value(&[]), 6.0);
    }

    #[test]
    fn test_rank3_reduction() {
        // 2x2x2 cube of ones; collapsing the middle axis doubles.
        let ds = ArrayDataset::from_elements(vec![2, 2, 2], vec![1.0; 8]).unwrap();
        let r = total(&ds, 1).unwrap();
        assert_eq!(r.shape(), &[2, 2]);
        assert_eq!(r.elements(), &[2.0; 4]);
    }

    #[test]
    fn test_invalid_axis() {
        let err = total(&grid_2x3(), 2);
        assert_eq!(
            err.unwrap_err(),
            QubeError::InvalidAxis { axis: 2, rank: 2 }
        );
    }

    #[test]
    fn test_jagged_rejected() {
        let ds = RaggedDataset::from_rows(vec![vec![1.0], vec![2.0, 3.0]]);
        assert!(matches!(total(&ds, 0), Err(QubeError::NonQube { .. })));
    }

    #[test]
    fn test_weights_mask() {
        let ds = ArrayDataset::vector(&[1.0, -1.0, f64::NAN, 4.0])
            .with_metadata(Metadata::new().with_fill(-1.0));
        let w = weights_of(&ds).unwrap();
        assert_eq!(w.elements(), &[1.0, 0.0, 0.0, 1.0]);
        assert_eq!(w.metadata().fill_value, Some(-1.0));
    }

    #[test]
    fn test_depend_shift() {
        let tags0 = ArrayDataset::vector(&[0.0, 1.0]);
        let tags1 = ArrayDataset::vector(&[10.0, 20.0, 30.0]);
        let ds = grid_2x3().with_metadata(
            Metadata::new()
                .with_depend(0, tags0)
                .with_depend(1, tags1.clone()),
        );
        let r = total(&ds, 0).unwrap();
        assert_eq!(r.metadata().depend(0), Some(&tags1));
        assert!(r.metadata().depend(1).is_none());
    }
}
