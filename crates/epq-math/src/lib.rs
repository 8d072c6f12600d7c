//! # epq-math
//!
//! Interpolation of tabulated physical data: natural and clamped cubic
//! splines in one to any number of dimensions, and Lagrange interpolation of
//! arbitrary order on uniform and non-uniform grids.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Floating-point comparison utilities.
pub mod comparison;

/// Spline and Lagrange interpolation.
pub mod interpolations;

/// Tridiagonal systems and spline second derivatives.
pub mod tridiagonal;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use comparison::close_enough;
pub use interpolations::lagrange::{
    FnInterpolation, InterpolationFunction, NonUniformLagrangeGrid, UniformLagrangeGrid,
};
pub use interpolations::{
    BicubicSpline, CubicSpline1D, CubicSplineGrid, DerivativeCache, Interpolation1D,
    InterpolationNd, NdCubicSpline, QuadricubicSpline, SplineOptions, TricubicSpline,
};
pub use tridiagonal::BoundaryCondition;
