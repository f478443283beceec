//! qube-ops - Operators over qube datasets
//!
//! Everything here is built from the qube-core primitives (shape
//! detection, cursors, rank coercion) and shares the same two policies:
//! fill values propagate through every operator, and results are always
//! freshly allocated qubes.
//!
//! # Key Components
//!
//! - **Elementwise**: unary/binary engines with automatic rank coercion
//!   and metadata intersection
//! - **Math**: the numeric operator library (arithmetic, trig,
//!   comparisons, vector magnitude, rank-1 utilities)
//! - **Reduce**: policy-driven axis collapse (total, mean, min, max)
//!   around a derived weights mask
//! - **Interp**: monotonic index search and linear/bilinear
//!   interpolation with edge-segment extrapolation
//! - **Synth**: seeded synthetic datasets for tests and demos

pub mod elementwise;
pub mod interp;
pub mod math;
pub mod reduce;
pub mod synth;

pub use elementwise::{map_binary, map_binary_scalar, map_unary};
pub use interp::{findex, interpolate_1d, interpolate_2d};
pub use reduce::{
    mean, reduce, reduce_max, reduce_min, total, weights_of, Accumulator, Max, Mean, Min,
    ReducePolicy, Total,
};
pub use synth::SimpleRng;
