//! Typed dataset metadata
//!
//! Replaces a string-keyed property map with a struct of optional fields
//! restricted to the recognized key set: name, units, fill sentinel,
//! per-axis coordinate tags, monotonic hint, cadence, and coordinate
//! frame. Binary elementwise operations merge two metadata values by
//! keeping only the fields that are present *and* equal on both sides
//! ([`Metadata::intersect`]).

use serde::{Deserialize, Serialize};

use crate::dataset::{ArrayDataset, MAX_RANK};
use crate::units::{CoordinateFrame, Units};

/// Metadata attached to a dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Dataset name
    pub name: Option<String>,

    /// Physical units of the values
    pub units: Option<Units>,

    /// Sentinel value meaning "no valid measurement".
    /// NaN is always treated as fill, with or without a declared sentinel.
    pub fill_value: Option<f64>,

    /// Coordinate tag dataset per axis (DEPEND_0..DEPEND_2)
    pub depend: [Option<Box<ArrayDataset>>; MAX_RANK],

    /// Hint that the values are monotonic increasing
    pub monotonic: Option<bool>,

    /// Nominal spacing between consecutive tags
    pub cadence: Option<f64>,

    /// Marks the values as components in a coordinate frame
    pub coordinate_frame: Option<CoordinateFrame>,
}

impl Metadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dataset name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the units
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    /// Set the fill sentinel
    pub fn with_fill(mut self, fill: f64) -> Self {
        self.fill_value = Some(fill);
        self
    }

    /// Set the coordinate tag dataset for an axis
    pub fn with_depend(mut self, axis: usize, tags: ArrayDataset) -> Self {
        self.depend[axis] = Some(Box::new(tags));
        self
    }

    /// Set the monotonic hint
    pub fn with_monotonic(mut self, monotonic: bool) -> Self {
        self.monotonic = Some(monotonic);
        self
    }

    /// Set the nominal cadence
    pub fn with_cadence(mut self, cadence: f64) -> Self {
        self.cadence = Some(cadence);
        self
    }

    /// Set the coordinate frame
    pub fn with_frame(mut self, frame: CoordinateFrame) -> Self {
        self.coordinate_frame = Some(frame);
        self
    }

    /// Coordinate tag dataset for an axis, if any
    pub fn depend(&self, axis: usize) -> Option<&ArrayDataset> {
        self.depend.get(axis).and_then(|d| d.as_deref())
    }

    /// Check whether a value is fill under this metadata.
    ///
    /// NaN is unconditionally fill; a declared sentinel matches exactly.
    pub fn is_fill(&self, value: f64) -> bool {
        if value.is_nan() {
            return true;
        }
        match self.fill_value {
            Some(fill) => value == fill,
            None => false,
        }
    }

    /// The sentinel written into results for invalid positions
    pub fn fill_or_nan(&self) -> f64 {
        self.fill_value.unwrap_or(f64::NAN)
    }

    /// Keep only the fields present and equal in both metadata values.
    ///
    /// This is the merge rule for binary elementwise results: a field
    /// survives iff both operands carry it with the same value.
    pub fn intersect(&self, other: &Metadata) -> Metadata {
        let mut out = Metadata::new();
        if self.name == other.name {
            out.name = self.name.clone();
        }
        if self.units == other.units {
            out.units = self.units.clone();
        }
        if fill_eq(self.fill_value, other.fill_value) {
            out.fill_value = self.fill_value;
        }
        for axis in 0..MAX_RANK {
            if self.depend[axis] == other.depend[axis] {
                out.depend[axis] = self.depend[axis].clone();
            }
        }
        if self.monotonic == other.monotonic {
            out.monotonic = self.monotonic;
        }
        if self.cadence == other.cadence {
            out.cadence = self.cadence;
        }
        if self.coordinate_frame == other.coordinate_frame {
            out.coordinate_frame = self.coordinate_frame.clone();
        }
        out
    }
}

/// Sentinel equality; two NaN sentinels count as equal
fn fill_eq(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x == y || (x.is_nan() && y.is_nan()),
        (None, None) => false,
        _ => false,
    }
}
