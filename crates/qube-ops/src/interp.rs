//! Index-space search and interpolation
//!
//! [`findex`] converts data values into fractional indices against a
//! strictly increasing reference axis; [`interpolate_1d`] and
//! [`interpolate_2d`] blend neighbouring samples at those fractional
//! positions. Out-of-range queries extrapolate from the nearest edge
//! segment, so a fractional index below zero or at/past `n-1` is a
//! legitimate result that callers use to detect extrapolation.

use tracing::debug;

use qube_core::{
    same_geometry, shape_of, ArrayDataset, Cursor, Dataset, Metadata, QubeBuilder, QubeError,
    QubeResult,
};

/// Fractional indices of `query`'s values within `ref_axis`.
///
/// `ref_axis` must be rank 1, at least two points, and strictly
/// monotonic increasing. The result has `query`'s shape; a value between
/// `ref_axis[lo]` and `ref_axis[lo+1]` maps to
/// `lo + (v - ref[lo]) / (ref[lo+1] - ref[lo])`. Values outside the axis
/// extrapolate from the first or last segment. A consecutive-query fast
/// path reuses the previous bracket when it still contains the value.
pub fn findex(ref_axis: &dyn Dataset, query: &dyn Dataset) -> QubeResult<ArrayDataset> {
    if ref_axis.rank() != 1 {
        return Err(QubeError::UnsupportedRank {
            rank: ref_axis.rank(),
            max: 1,
        });
    }
    let n = ref_axis.length(&[]);
    if n < 2 {
        return Err(QubeError::TooShort { needed: 2, got: n });
    }
    let r = |i: usize| ref_axis.value(&[i]);
    for i in 1..n {
        // NaN or fill in the reference axis also fails this comparison.
        if !(r(i) > r(i - 1)) {
            return Err(QubeError::NonMonotonic { index: i });
        }
    }

    let shape = shape_of(query).ok_or(QubeError::NonQube { axis: 0 })?;
    debug!(n, ?shape, "searching reference axis");
    let mut md = Metadata::new();
    md.fill_value = query.metadata().fill_value;
    let fill = md.fill_or_nan();

    let mut out = QubeBuilder::new(&shape);
    let mut cursor = Cursor::new(&shape);
    let mut lo = 0usize;
    while cursor.has_next() {
        cursor.advance()?;
        let v = cursor.read(query);
        if query.is_fill(v) {
            cursor.write(&mut out, fill);
            continue;
        }
        if !(r(lo) <= v && v <= r(lo + 1)) {
            lo = bracket(ref_axis, n, v);
        }
        let ff = lo as f64 + (v - r(lo)) / (r(lo + 1) - r(lo));
        cursor.write(&mut out, ff);
    }
    out.set_metadata(md);
    Ok(out.build())
}

/// Index of the segment `[lo, lo+1]` to interpolate `v` within,
/// clamped to the edge segments for out-of-range values
fn bracket(ref_axis: &dyn Dataset, n: usize, v: f64) -> usize {
    let r = |i: usize| ref_axis.value(&[i]);
    if v < r(0) {
        return 0;
    }
    if v >= r(n - 1) {
        return n - 2;
    }
    let mut lo = 0;
    let mut hi = n - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if r(mid) <= v {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Segment base index and blend factor for a fractional index,
/// clamped to the edge segments
fn basis(ff: f64, n: usize) -> (usize, f64) {
    let i0 = if ff < 0.0 {
        0
    } else if ff >= (n - 1) as f64 {
        n - 2
    } else {
        ff.floor() as usize
    };
    (i0, ff - i0 as f64)
}

/// Linear interpolation of a rank-1 dataset at fractional indices.
///
/// The result has `findices`'s shape and carries `values`'s units and
/// fill. A fill fractional index or a fill basis sample yields fill.
pub fn interpolate_1d(values: &dyn Dataset, findices: &dyn Dataset) -> QubeResult<ArrayDataset> {
    if values.rank() != 1 {
        return Err(QubeError::UnsupportedRank {
            rank: values.rank(),
            max: 1,
        });
    }
    let n = values.length(&[]);
    if n < 2 {
        return Err(QubeError::TooShort { needed: 2, got: n });
    }

    let shape = shape_of(findices).ok_or(QubeError::NonQube { axis: 0 })?;
    let mut md = Metadata::new();
    md.name = values.metadata().name.clone();
    md.units = values.metadata().units.clone();
    md.fill_value = values.metadata().fill_value;
    let fill = md.fill_or_nan();

    let mut out = QubeBuilder::new(&shape);
    let mut cursor = Cursor::new(&shape);
    while cursor.has_next() {
        cursor.advance()?;
        let ff = cursor.read(findices);
        if findices.is_fill(ff) {
            cursor.write(&mut out, fill);
            continue;
        }
        let (i0, alpha) = basis(ff, n);
        let v0 = values.value(&[i0]);
        let v1 = values.value(&[i0 + 1]);
        let y = if values.is_fill(v0) || values.is_fill(v1) {
            fill
        } else {
            v0 + alpha * (v1 - v0)
        };
        cursor.write(&mut out, y);
    }
    out.set_metadata(md);
    Ok(out.build())
}

/// Bilinear interpolation of a rank-2 grid at per-axis fractional
/// indices.
///
/// `f0` and `f1` must share geometry; each axis clamps independently to
/// its edge segments, then the four corner samples blend with products
/// of `(1-alpha)`/`alpha` per axis. Any fill input or corner yields fill.
pub fn interpolate_2d(
    grid: &dyn Dataset,
    f0: &dyn Dataset,
    f1: &dyn Dataset,
) -> QubeResult<ArrayDataset> {
    if grid.rank() != 2 {
        return Err(QubeError::UnsupportedRank {
            rank: grid.rank(),
            max: 2,
        });
    }
    let n0 = grid.length(&[]);
    let n1 = grid.length(&[0]);
    if n0 < 2 {
        return Err(QubeError::TooShort { needed: 2, got: n0 });
    }
    if n1 < 2 {
        return Err(QubeError::TooShort { needed: 2, got: n1 });
    }
    if !same_geometry(f0, f1) {
        let s0 = shape_of(f0).unwrap_or_default();
        let s1 = shape_of(f1).unwrap_or_default();
        return Err(QubeError::GeometryMismatch { low: s1, high: s0 });
    }

    let shape = shape_of(f0).ok_or(QubeError::NonQube { axis: 0 })?;
    let mut md = Metadata::new();
    md.name = grid.metadata().name.clone();
    md.units = grid.metadata().units.clone();
    md.fill_value = grid.metadata().fill_value;
    let fill = md.fill_or_nan();

    let mut out = QubeBuilder::new(&shape);
    let mut cursor = Cursor::new(&shape);
    while cursor.has_next() {
        cursor.advance()?;
        let ff0 = cursor.read(f0);
        let ff1 = cursor.read(f1);
        if f0.is_fill(ff0) || f1.is_fill(ff1) {
            cursor.write(&mut out, fill);
            continue;
        }
        let (i0, a0) = basis(ff0, n0);
        let (j0, a1) = basis(ff1, n1);
        let c00 = grid.value(&[i0, j0]);
        let c01 = grid.value(&[i0, j0 + 1]);
        let c10 = grid.value(&[i0 + 1, j0]);
        let c11 = grid.value(&[i0 + 1, j0 + 1]);
        let y = if grid.is_fill(c00)
            || grid.is_fill(c01)
            || grid.is_fill(c10)
            || grid.is_fill(c11)
        {
            fill
        } else {
            (1.0 - a0) * (1.0 - a1) * c00
                + (1.0 - a0) * a1 * c01
                + a0 * (1.0 - a1) * c10
                + a0 * a1 * c11
        };
        cursor.write(&mut out, y);
    }
    out.set_metadata(md);
    Ok(out.build())
}
