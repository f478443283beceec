//! qube-core - Generic N-dimensional dataset engine
//!
//! This crate provides the dataset model underneath qube, a plotting
//! toolkit for scientific data. It is deliberately small and purely
//! functional: immutable datasets in, freshly allocated datasets out.
//!
//! # Key Components
//!
//! - **Dataset**: the read contract every array-like value implements
//!   (rank up to 3, indexed scalar reads, typed metadata)
//! - **Metadata**: typed property schema (units, fill sentinel, per-axis
//!   coordinate tags, monotonic hint, cadence, coordinate frame)
//! - **Shape**: qube detection — collapsing rectangular geometry into a
//!   flat shape vector, rejecting jagged datasets
//! - **Cursor**: rank-agnostic index iteration with axis pinning
//! - **Broadcast**: rank coercion views for aligning mixed-rank operands
//!
//! # Fill Values
//!
//! Missing measurements travel in-band as fill sentinels, never through
//! the error channel. Every operation built on this crate is expected to
//! propagate fill: a fill input at a position always produces a fill
//! output at that position.

pub mod broadcast;
pub mod cursor;
pub mod dataset;
pub mod error;
pub mod metadata;
pub mod shape;
pub mod units;

pub use broadcast::{coerce, BroadcastView, Coerced};
pub use cursor::Cursor;
pub use dataset::{element_count, ArrayDataset, Dataset, QubeBuilder, RaggedDataset, MAX_RANK};
pub use error::{QubeError, QubeResult};
pub use metadata::Metadata;
pub use shape::{remove_axis, same_geometry, shape_of};
pub use units::{CoordinateFrame, Units};
