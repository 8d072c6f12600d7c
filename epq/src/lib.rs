//! # epq
//!
//! Interpolation of tabulated electron-probe microanalysis data: cubic
//! splines in one to four (or more) dimensions and Lagrange interpolation of
//! arbitrary order.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on this crate rather than on `epq-core`
//! and `epq-math` individually.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! epq = "0.1"
//! ```
//!
//! ```rust
//! use epq::math::{CubicSpline1D, Interpolation1D};
//!
//! let spline = CubicSpline1D::new(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 1.0, 0.0, 1.0, 0.0])?;
//! assert_eq!(spline.interpolate(2.0)?, 0.0);
//! assert!(!spline.is_in_range(-1.0));
//! # Ok::<(), epq::core::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Scalar aliases, error definitions and process-wide settings.
pub use epq_core as core;

/// Spline and Lagrange interpolation.
pub use epq_math as math;
