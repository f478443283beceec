//! Physical units and coordinate frames
//!
//! A unit here is a lightweight label with one extra piece of structure:
//! the *offset* unit, used for differences between two values carrying a
//! location-like unit (timestamps minus timestamps give durations, not
//! timestamps). `subtract` consults this when both operands share a unit.

use serde::{Deserialize, Serialize};

/// Unit label attached to a dataset via its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Units {
    /// Human-readable unit label (e.g. "km/s", "us2000")
    pub label: String,

    /// Unit used for differences of values carrying this unit.
    /// `None` means the unit is its own offset unit (ratio scale).
    pub offset_label: Option<String>,
}

impl Units {
    /// Create a ratio-scale unit (differences keep the same unit)
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            offset_label: None,
        }
    }

    /// Create a location unit with a distinct offset unit
    pub fn with_offset(label: impl Into<String>, offset: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            offset_label: Some(offset.into()),
        }
    }

    /// The unit carried by a difference of two values in this unit
    pub fn offset(&self) -> Units {
        match &self.offset_label {
            Some(off) => Units::new(off.clone()),
            None => self.clone(),
        }
    }
}

/// Coordinate frame tag for an axis, carried on the axis's tag dataset.
///
/// `magnitude` requires the last axis of its input to be tagged with a
/// cartesian frame before it will collapse that axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateFrame {
    Cartesian,
    Named(String),
}

impl CoordinateFrame {
    /// Check whether this frame supports cartesian vector magnitude
    pub fn is_cartesian(&self) -> bool {
        matches!(self, CoordinateFrame::Cartesian)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_unit_offset_is_self() {
        let u = Units::new("km/s");
        assert_eq!(u.offset(), u);
    }

    #[test]
    fn test_location_unit_offset() {
        let u = Units::with_offset("us2000", "microseconds");
        assert_eq!(u.offset(), Units::new("microseconds"));
    }

    #[test]
    fn test_coordinate_frame() {
        assert!(CoordinateFrame::Cartesian.is_cartesian());
        assert!(!CoordinateFrame::Named("GSM".to_string()).is_cartesian());
    }
}
