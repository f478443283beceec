//! Elementwise operator engine
//!
//! Drives cursors over one or two datasets and applies a numeric closure
//! per position, with two fixed policies:
//!
//! - **Fill propagation**: a fill input (judged by that operand's own
//!   metadata) always yields a fill output, never a computed value.
//! - **Metadata**: unary and scalar variants copy the input's metadata
//!   unchanged; the binary variant keeps only the fields present and
//!   equal on both operands.
//!
//! Rank coercion is an unconditional first step of every binary
//! operation, not a caller-trusted precondition: a lower-rank operand is
//! broadcast against the higher-rank one before the lockstep walk.

use qube_core::{
    coerce, shape_of, ArrayDataset, Cursor, Dataset, QubeBuilder, QubeError, QubeResult,
};

/// Apply `f` to every value of `ds`, propagating fill.
///
/// The result has `ds`'s shape and a copy of its metadata.
pub fn map_unary<F>(ds: &dyn Dataset, f: F) -> QubeResult<ArrayDataset>
where
    F: Fn(f64) -> f64,
{
    let shape = shape_of(ds).ok_or(QubeError::NonQube { axis: 0 })?;
    let metadata = ds.metadata().clone();
    let fill = metadata.fill_or_nan();

    let mut out = QubeBuilder::new(&shape);
    let mut cursor = Cursor::new(&shape);
    while cursor.has_next() {
        cursor.advance()?;
        let v = cursor.read(ds);
        let y = if ds.is_fill(v) { fill } else { f(v) };
        cursor.write(&mut out, y);
    }
    out.set_metadata(metadata);
    Ok(out.build())
}

/// Apply `f` positionwise to two datasets, propagating fill from either.
///
/// Mixed ranks are reconciled by broadcasting the lower-rank operand
/// first; after coercion the shapes must agree exactly. The result
/// carries the intersection of both operands' metadata.
pub fn map_binary<F>(a: &dyn Dataset, b: &dyn Dataset, f: F) -> QubeResult<ArrayDataset>
where
    F: Fn(f64, f64) -> f64,
{
    let ca;
    let cb;
    let (lhs, rhs): (&dyn Dataset, &dyn Dataset) = if a.rank() < b.rank() {
        ca = coerce(a, b)?;
        (&ca, b)
    } else if b.rank() < a.rank() {
        cb = coerce(b, a)?;
        (a, &cb)
    } else {
        (a, b)
    };

    let shape = shape_of(lhs).ok_or(QubeError::NonQube { axis: 0 })?;
    let shape_rhs = shape_of(rhs).ok_or(QubeError::NonQube { axis: 0 })?;
    if shape != shape_rhs {
        return Err(QubeError::GeometryMismatch {
            low: shape_rhs,
            high: shape,
        });
    }

    let metadata = lhs.metadata().intersect(rhs.metadata());
    let fill = metadata.fill_or_nan();

    let mut out = QubeBuilder::new(&shape);
    let mut cursor = Cursor::new(&shape);
    while cursor.has_next() {
        cursor.advance()?;
        let va = cursor.read(lhs);
        let vb = cursor.read(rhs);
        let y = if lhs.is_fill(va) || rhs.is_fill(vb) {
            fill
        } else {
            f(va, vb)
        };
        cursor.write(&mut out, y);
    }
    out.set_metadata(metadata);
    Ok(out.build())
}

/// Apply `f(value, k)` to every value of `ds` with a constant `k`.
///
/// Fill is judged on `ds` only; metadata is copied unchanged.
pub fn map_binary_scalar<F>(ds: &dyn Dataset, k: f64, f: F) -> QubeResult<ArrayDataset>
where
    F: Fn(f64, f64) -> f64,
{
    map_unary(ds, |v| f(v, k))
}
