//! Numeric operator library
//!
//! Thin wrappers over the elementwise engine: every function here is a
//! closure handed to `map_unary`/`map_binary`, so fill propagation and
//! metadata handling come for free. The few operators with extra rules
//! (`subtract`'s offset units, `magnitude`'s frame check, the rank-1-only
//! utilities) carry their own preconditions.

use qube_core::{
    ArrayDataset, CoordinateFrame, Dataset, Metadata, QubeError, QubeResult,
};

use crate::elementwise::{map_binary, map_binary_scalar, map_unary};
use crate::reduce::total;

// --- arithmetic ---

pub fn add(a: &dyn Dataset, b: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_binary(a, b, |x, y| x + y)
}

/// Elementwise difference.
///
/// When both operands carry the same unit the result gets that unit's
/// offset unit: a difference of two locations is a displacement, not a
/// location.
pub fn subtract(a: &dyn Dataset, b: &dyn Dataset) -> QubeResult<ArrayDataset> {
    let r = map_binary(a, b, |x, y| x - y)?;
    if let (Some(ua), Some(ub)) = (&a.metadata().units, &b.metadata().units) {
        if ua == ub {
            let mut md = r.metadata().clone();
            md.units = Some(ua.offset());
            return Ok(r.with_metadata(md));
        }
    }
    Ok(r)
}

pub fn multiply(a: &dyn Dataset, b: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_binary(a, b, |x, y| x * y)
}

pub fn divide(a: &dyn Dataset, b: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_binary(a, b, |x, y| x / y)
}

pub fn pow(a: &dyn Dataset, b: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_binary(a, b, f64::powf)
}

pub fn negate(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, |v| -v)
}

// --- trigonometric and hyperbolic ---

pub fn sin(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::sin)
}

pub fn cos(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::cos)
}

pub fn tan(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::tan)
}

pub fn asin(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::asin)
}

pub fn acos(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::acos)
}

pub fn atan(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::atan)
}

/// Four-quadrant arctangent of `y/x`, positionwise
pub fn atan2(y: &dyn Dataset, x: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_binary(y, x, f64::atan2)
}

pub fn sinh(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::sinh)
}

pub fn cosh(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::cosh)
}

pub fn tanh(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::tanh)
}

// --- exponential and rounding ---

pub fn exp(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::exp)
}

pub fn expm1(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::exp_m1)
}

/// Natural logarithm
pub fn log(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::ln)
}

pub fn log10(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::log10)
}

pub fn sqrt(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::sqrt)
}

pub fn abs(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::abs)
}

pub fn floor(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::floor)
}

pub fn ceil(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, f64::ceil)
}

/// Sign of each value: -1, 0, or +1
pub fn signum(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, |v| if v == 0.0 { 0.0 } else { v.signum() })
}

/// Magnitude of the first operand with the sign of the second.
///
/// A zero sign operand counts as positive.
pub fn copysign(magnitude: &dyn Dataset, sign: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_binary(magnitude, sign, |m, s| {
        if s < 0.0 {
            -m.abs()
        } else {
            m.abs()
        }
    })
}

// --- comparisons (1.0 true / 0.0 false) ---

pub fn eq(a: &dyn Dataset, b: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_binary(a, b, |x, y| bool_val(x == y))
}

pub fn ne(a: &dyn Dataset, b: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_binary(a, b, |x, y| bool_val(x != y))
}

pub fn gt(a: &dyn Dataset, b: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_binary(a, b, |x, y| bool_val(x > y))
}

pub fn ge(a: &dyn Dataset, b: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_binary(a, b, |x, y| bool_val(x >= y))
}

pub fn lt(a: &dyn Dataset, b: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_binary(a, b, |x, y| bool_val(x < y))
}

pub fn le(a: &dyn Dataset, b: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_binary(a, b, |x, y| bool_val(x <= y))
}

// --- boolean (nonzero as true) ---

pub fn and(a: &dyn Dataset, b: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_binary(a, b, |x, y| bool_val(x != 0.0 && y != 0.0))
}

pub fn or(a: &dyn Dataset, b: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_binary(a, b, |x, y| bool_val(x != 0.0 || y != 0.0))
}

pub fn not(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    map_unary(ds, |v| bool_val(v == 0.0))
}

fn bool_val(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

// --- vector and rank-1 utilities ---

/// Cartesian vector magnitude along the last axis.
///
/// The last axis's coordinate tags must be marked with a cartesian
/// frame; the result is `sqrt(total(ds², last_axis))`.
pub fn magnitude(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    let rank = ds.rank();
    let last = rank
        .checked_sub(1)
        .ok_or(QubeError::InvalidAxis { axis: 0, rank: 0 })?;
    let cartesian = ds
        .metadata()
        .depend(last)
        .and_then(|dep| dep.metadata().coordinate_frame.as_ref())
        .map(CoordinateFrame::is_cartesian)
        .unwrap_or(false);
    if !cartesian {
        return Err(QubeError::NotCartesian { axis: last });
    }
    let squared = map_binary_scalar(ds, 2.0, f64::powf)?;
    let summed = total(&squared, last)?;
    sqrt(&summed)
}

/// Differences of adjacent values of a rank-1 dataset (length n-1).
///
/// Result units are the input unit's offset unit; axis tags are trimmed
/// to the leading points.
pub fn diff(ds: &dyn Dataset) -> QubeResult<ArrayDataset> {
    require_rank1(ds)?;
    let n = ds.length(&[]);
    if n < 2 {
        return Err(QubeError::TooShort { needed: 2, got: n });
    }
    let md = ds.metadata();
    let fill = md.fill_or_nan();

    let mut values = Vec::with_capacity(n - 1);
    for i in 0..n - 1 {
        let a = ds.value(&[i]);
        let b = ds.value(&[i + 1]);
        values.push(if ds.is_fill(a) || ds.is_fill(b) {
            fill
        } else {
            b - a
        });
    }

    let mut out_md = Metadata::new();
    out_md.fill_value = md.fill_value;
    out_md.units = md.units.as_ref().map(|u| u.offset());
    if let Some(dep) = md.depend(0) {
        if dep.rank() == 1 && dep.length(&[]) == n {
            let tags: Vec<f64> = (0..n - 1).map(|i| dep.value(&[i])).collect();
            out_md.depend[0] = Some(Box::new(
                ArrayDataset::vector(&tags).with_metadata(dep.metadata().clone()),
            ));
        }
    }
    Ok(ArrayDataset::vector(&values).with_metadata(out_md))
}

/// Boxcar average of a rank-1 dataset over a window of odd `width`,
/// centered on each point.
///
/// The window is clamped at the edges; fill values are excluded from the
/// average, and a window with no valid values yields fill. An even or
/// zero `width` has no center point and is rejected.
pub fn smooth(ds: &dyn Dataset, width: usize) -> QubeResult<ArrayDataset> {
    require_rank1(ds)?;
    if width % 2 == 0 {
        return Err(QubeError::InvalidWindow { width });
    }
    let n = ds.length(&[]);
    let md = ds.metadata().clone();
    let fill = md.fill_or_nan();
    let half = width / 2;

    let mut values = Vec::with_capacity(n);
    for i in 0..n {
        let lo = i.saturating_sub(half);
        let hi = (i + half).min(n - 1);
        let mut sum = 0.0;
        let mut count = 0usize;
        for j in lo..=hi {
            let v = ds.value(&[j]);
            if !ds.is_fill(v) {
                sum += v;
                count += 1;
            }
        }
        values.push(if count > 0 {
            sum / count as f64
        } else {
            fill
        });
    }
    Ok(ArrayDataset::vector(&values).with_metadata(md))
}

/// Outer product of two rank-1 datasets, shape `[n, m]`.
///
/// The first operand's tags become the axis-0 tags of the result, the
/// second's become the axis-1 tags.
pub fn outer_product(a: &dyn Dataset, b: &dyn Dataset) -> QubeResult<ArrayDataset> {
    require_rank1(a)?;
    require_rank1(b)?;
    let n = a.length(&[]);
    let m = b.length(&[]);

    let mut md = Metadata::new();
    md.fill_value = a.metadata().fill_value.or(b.metadata().fill_value);
    md.depend[0] = a.metadata().depend(0).map(|d| Box::new(d.clone()));
    md.depend[1] = b.metadata().depend(0).map(|d| Box::new(d.clone()));
    let fill = md.fill_or_nan();

    let mut values = Vec::with_capacity(n * m);
    for i in 0..n {
        let va = a.value(&[i]);
        for j in 0..m {
            let vb = b.value(&[j]);
            values.push(if a.is_fill(va) || b.is_fill(vb) {
                fill
            } else {
                va * vb
            });
        }
    }
    Ok(ArrayDataset::from_elements(vec![n, m], values)?.with_metadata(md))
}

fn require_rank1(ds: &dyn Dataset) -> QubeResult<()> {
    if ds.rank() != 1 {
        return Err(QubeError::UnsupportedRank {
            rank: ds.rank(),
            max: 1,
        });
    }
    Ok(())
}
