//! Rank-agnostic index cursor
//!
//! A [`Cursor`] enumerates every index tuple of a qube shape in a fixed
//! deterministic order: axis 0 varies slowest, the last axis fastest.
//! Individual axes can be pinned to a constant before iteration starts,
//! which is how the reduction engine synchronises an inner cursor over
//! the full shape with an outer cursor over the retained axes.
//!
//! Cursors are single-use and single-threaded. Restarting means
//! constructing a new cursor.

use crate::dataset::{Dataset, QubeBuilder};
use crate::error::{QubeError, QubeResult};

/// Cursor over the index space of a qube shape
#[derive(Debug, Clone)]
pub struct Cursor {
    shape: Vec<usize>,
    index: Vec<usize>,
    pinned: Vec<bool>,
    started: bool,
    remaining: usize,
}

impl Cursor {
    /// Create a cursor positioned before the first tuple of `shape`.
    ///
    /// A rank-0 shape yields exactly one (empty) tuple; a shape with a
    /// zero-length axis yields none.
    pub fn new(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            index: vec![0; shape.len()],
            pinned: vec![false; shape.len()],
            started: false,
            remaining: shape.iter().product(),
        }
    }

    /// Clamp an axis to a fixed index for the cursor's lifetime.
    ///
    /// Must be called before the first [`advance`](Cursor::advance).
    pub fn pin(&mut self, axis: usize, at: usize) -> QubeResult<()> {
        debug_assert!(!self.started, "pin after iteration started");
        if axis >= self.shape.len() {
            return Err(QubeError::InvalidAxis {
                axis,
                rank: self.shape.len(),
            });
        }
        if at >= self.shape[axis] {
            return Err(QubeError::IndexOutOfBounds {
                index: at,
                axis,
                len: self.shape[axis],
            });
        }
        self.pinned[axis] = true;
        self.index[axis] = at;
        self.remaining = self.free_count();
        Ok(())
    }

    fn free_count(&self) -> usize {
        self.shape
            .iter()
            .zip(&self.pinned)
            .filter(|(_, &p)| !p)
            .map(|(&len, _)| len)
            .product()
    }

    /// Whether another tuple remains
    pub fn has_next(&self) -> bool {
        self.remaining > 0
    }

    /// Advance to the next tuple, or error when exhausted
    pub fn advance(&mut self) -> QubeResult<()> {
        if self.remaining == 0 {
            return Err(QubeError::CursorExhausted);
        }
        if self.started {
            for axis in (0..self.shape.len()).rev() {
                if self.pinned[axis] {
                    continue;
                }
                self.index[axis] += 1;
                if self.index[axis] < self.shape[axis] {
                    break;
                }
                self.index[axis] = 0;
            }
        } else {
            self.started = true;
        }
        self.remaining -= 1;
        Ok(())
    }

    /// Current position on an axis
    pub fn index(&self, axis: usize) -> usize {
        self.index[axis]
    }

    /// Current full index tuple
    pub fn position(&self) -> &[usize] {
        debug_assert!(self.started, "cursor read before first advance");
        &self.index
    }

    /// Value of `ds` at the current tuple
    pub fn read(&self, ds: &dyn Dataset) -> f64 {
        ds.value(self.position())
    }

    /// Store a value into a builder at the current tuple
    pub fn write(&self, out: &mut QubeBuilder, value: f64) {
        out.set(self.position(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ArrayDataset;

    fn collect_tuples(mut c: Cursor) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        while c.has_next() {
            c.advance().unwrap();
            out.push(c.position().to_vec());
        }
        out
    }

    #[test]
    fn test_enumeration_order_axis0_outermost() {
        let tuples = collect_tuples(Cursor::new(&[2, 3]));
        assert_eq!(
            tuples,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2],
            ]
        );
    }

    #[test]
    fn test_tuple_count_is_shape_product() {
        assert_eq!(collect_tuples(Cursor::new(&[2, 3, 4])).len(), 24);
        assert_eq!(collect_tuples(Cursor::new(&[2, 0, 4])).len(), 0);
    }

    #[test]
    fn test_rank0_yields_one_empty_tuple() {
        let tuples = collect_tuples(Cursor::new(&[]));
        assert_eq!(tuples, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_advance_past_end_errors() {
        let mut c = Cursor::new(&[2]);
        c.advance().unwrap();
        c.advance().unwrap();
        assert_eq!(c.advance(), Err(QubeError::CursorExhausted));
    }

    #[test]
    fn test_pinned_axis_stays_fixed() {
        let mut c = Cursor::new(&[2, 3]);
        c.pin(0, 1).unwrap();
        let tuples = collect_tuples(c);
        assert_eq!(tuples, vec![vec![1, 0], vec![1, 1], vec![1, 2]]);
    }

    #[test]
    fn test_pin_validation() {
        let mut c = Cursor::new(&[2, 3]);
        assert_eq!(
            c.pin(2, 0),
            Err(QubeError::InvalidAxis { axis: 2, rank: 2 })
        );
        assert_eq!(
            c.pin(1, 3),
            Err(QubeError::IndexOutOfBounds {
                index: 3,
                axis: 1,
                len: 3
            })
        );
    }

    #[test]
    fn test_read_through_cursor() {
        let ds = ArrayDataset::grid(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let mut c = Cursor::new(&[2, 2]);
        let mut seen = Vec::new();
        while c.has_next() {
            c.advance().unwrap();
            seen.push(c.read(&ds));
        }
        assert_eq!(seen, vec![1.0, 2.0, 3.0, 4.0]);
    }
}
