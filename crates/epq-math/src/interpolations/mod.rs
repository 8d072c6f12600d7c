//! Interpolation traits and implementations.
//!
//! Two families share this module:
//!
//! - cubic splines ([`CubicSpline1D`] and the N-dimensional
//!   [`NdCubicSpline`] stack), which refuse to extrapolate;
//! - Lagrange / Neville interpolation on uniform and non-uniform grids
//!   ([`lagrange`]), which extrapolate by clamping the window to the table
//!   edge.

use epq_core::{errors::Result, Real};

pub mod cubic_spline;
pub mod duplicates;
pub mod lagrange;
pub mod nd_spline;

pub use cubic_spline::{evaluate_with_derivatives, CubicSpline1D, SplineOptions};
pub use duplicates::{Repair, RepairAction};
pub use nd_spline::{
    BicubicSpline, CubicSplineGrid, DerivativeCache, NdCubicSpline, QuadricubicSpline,
    TricubicSpline,
};

/// A 1D interpolation function `f: R → R` defined by a set of known points.
pub trait Interpolation1D: std::fmt::Debug {
    /// Evaluate the interpolation at `x`.
    fn interpolate(&self, x: Real) -> Result<Real>;

    /// Return the lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Return the upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// A function of `dimension()` real variables, usually backed by a table.
///
/// This is the seam along which interpolants of different kinds are
/// composed: an [`lagrange::InterpolationFunction`] holds its children as
/// `Box<dyn InterpolationNd>`.
pub trait InterpolationNd: std::fmt::Debug {
    /// Number of variables.
    fn dimension(&self) -> usize;

    /// Evaluate at `point`, whose length must equal [`dimension`](Self::dimension).
    fn interpolate(&self, point: &[Real]) -> Result<Real>;
}

/// Bisection on an ascending table: return `klo` such that
/// `xs[klo] <= x <= xs[klo + 1]`, clamped to `0..=n-2`.
///
/// `xs` must hold at least two points.
pub(crate) fn bracket(xs: &[Real], x: Real) -> usize {
    let mut lo = 0;
    let mut hi = xs.len() - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if xs[mid] > x {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    lo
}

/// Check that `xs` is finite and strictly ascending.
pub(crate) fn ensure_ascending(xs: &[Real], what: &str) -> Result<()> {
    epq_core::ensure!(
        xs.iter().all(|x| x.is_finite()),
        "{what} must be finite"
    );
    for (i, w) in xs.windows(2).enumerate() {
        epq_core::ensure!(
            w[1] > w[0],
            "{what} must be strictly ascending: x[{i}] = {} >= x[{}] = {}",
            w[0],
            i + 1,
            w[1]
        );
    }
    Ok(())
}
