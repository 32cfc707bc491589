#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// neighborhood boundary extension policies.
pub mod boundary;

/// plane-by-plane orchestration of the neighborhood operators.
pub mod engine;

/// error types of the neighborhood operators.
pub mod error;

/// neighborhood filters.
pub mod filter;

/// prefix-sum tables for constant-time window moments.
pub mod integral;

/// sliding neighborhood windows over a plane.
pub mod neighborhood;

/// module containing parallization utilities.
pub mod parallel;

/// decomposition of N-dimensional images into planes.
pub mod plane;

/// neighborhood shapes.
pub mod shape;

/// per-window statistics.
pub mod statistic;

/// local thresholding operators.
pub mod threshold;

pub use crate::boundary::BoundaryPolicy;
pub use crate::error::LocalOpError;
pub use crate::shape::Shape;
