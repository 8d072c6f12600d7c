//! Lagrange interpolation on irregular, strictly monotonic grids.
//!
//! [`locate`] picks the interpolation window; Neville's algorithm then runs
//! in the true coordinates of the samples.

use epq_core::{errors::Result, Real};

use super::{
    ensure_finite, ensure_monotonic, ensure_order, flatten2, flatten3, flatten4, neville::neville,
};
use crate::interpolations::InterpolationNd;

/// First index of the window of `order + 1` samples of `xsamp` used to
/// interpolate at `x`.
///
/// Bisection finds the pair of samples bracketing `x` (the first or last pair
/// if `x` is outside the table); the window then grows one sample at a time
/// towards whichever neighbour is closer to `x`, until it holds `order + 1`
/// samples or meets a table edge, in which case it grows the other way.
/// `xsamp` may be ascending or descending.
///
/// # Errors
/// Returns [`Error::InvalidArgument`](epq_core::Error::InvalidArgument)
/// unless `1 <= order <= xsamp.len() - 1`.
pub fn locate(x: Real, xsamp: &[Real], order: usize) -> Result<usize> {
    let n = xsamp.len();
    ensure_order(order, n, 0)?;

    let ascending = xsamp[n - 1] >= xsamp[0];
    let mut lo = 0;
    let mut hi = n - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if (x >= xsamp[mid]) == ascending {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let mut hi = lo + 1;
    while hi - lo < order {
        if lo == 0 {
            hi += 1;
        } else if hi == n - 1 {
            lo -= 1;
        } else if (xsamp[lo - 1] - x).abs() <= (xsamp[hi + 1] - x).abs() {
            lo -= 1;
        } else {
            hi += 1;
        }
    }
    Ok(lo)
}

/// A table sampled on a rectilinear grid with arbitrary monotonic axes.
///
/// Values are row-major with axis 0 outermost.
#[derive(Debug, Clone)]
pub struct NonUniformLagrangeGrid {
    axes: Vec<Vec<Real>>,
    values: Vec<Real>,
    order: usize,
}

impl NonUniformLagrangeGrid {
    /// Build a grid interpolant.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`](epq_core::Error::InvalidArgument)
    /// if an axis is not strictly monotonic, `values` does not match the
    /// grid, or `order` is outside `1..=n_k - 1` on some axis.
    pub fn new(axes: Vec<Vec<Real>>, values: Vec<Real>, order: usize) -> Result<Self> {
        epq_core::ensure!(!axes.is_empty(), "a grid needs at least one axis");
        for (k, axis) in axes.iter().enumerate() {
            ensure_order(order, axis.len(), k)?;
            ensure_monotonic(axis, k)?;
        }
        let expected: usize = axes.iter().map(Vec::len).product();
        epq_core::ensure!(
            values.len() == expected,
            "grid needs {expected} values, got {}",
            values.len()
        );
        Ok(Self {
            axes,
            values,
            order,
        })
    }

    /// Interpolation order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Abscissas of axis `k`.
    pub fn axis(&self, k: usize) -> &[Real] {
        &self.axes[k]
    }

    /// Interpolated value and error estimate at `point`.
    ///
    /// Points outside the table are extrapolated from the edge window.
    pub fn interpolate_with_error(&self, point: &[Real]) -> Result<(Real, Real)> {
        epq_core::ensure!(
            point.len() == self.axes.len(),
            "expected a {}-dimensional point, got {} coordinates",
            self.axes.len(),
            point.len()
        );
        ensure_finite(point)?;
        self.reduce(0, &self.values, point)
    }

    fn reduce(&self, axis: usize, values: &[Real], point: &[Real]) -> Result<(Real, Real)> {
        let xs = &self.axes[axis];
        let x = point[axis];
        let first = locate(x, xs, self.order)?;
        let window = first..=first + self.order;
        if axis + 1 == self.axes.len() {
            return neville(&xs[window.clone()], &values[window], x);
        }
        let stride = values.len() / xs.len();
        let samples = window
            .clone()
            .map(|j| {
                self.reduce(axis + 1, &values[j * stride..(j + 1) * stride], point)
                    .map(|(v, _)| v)
                    .map_err(|e| e.in_slice(j))
            })
            .collect::<Result<Vec<Real>>>()?;
        neville(&xs[window], &samples, x)
    }
}

impl InterpolationNd for NonUniformLagrangeGrid {
    fn dimension(&self) -> usize {
        self.axes.len()
    }

    fn interpolate(&self, point: &[Real]) -> Result<Real> {
        self.interpolate_with_error(point).map(|(v, _)| v)
    }
}

/// One-dimensional non-uniform Lagrange interpolation at `x`.
///
/// ```
/// use epq_math::interpolations::lagrange::non_uniform;
///
/// let xs = [0.0, 0.5, 2.0, 3.0];
/// let ys: Vec<f64> = xs.iter().map(|x| x * x).collect();
/// let (y, _) = non_uniform::d1(&xs, &ys, 2, 1.0).unwrap();
/// assert!((y - 1.0).abs() < 1e-12);
/// ```
pub fn d1(xsamp: &[Real], values: &[Real], order: usize, x: Real) -> Result<(Real, Real)> {
    epq_core::ensure!(
        xsamp.len() == values.len(),
        "abscissas ({}) and values ({}) differ in length",
        xsamp.len(),
        values.len()
    );
    NonUniformLagrangeGrid::new(vec![xsamp.to_vec()], values.to_vec(), order)?
        .interpolate_with_error(&[x])
}

/// Two-dimensional non-uniform Lagrange interpolation;
/// `values[i][j] = f(xsamp[0][i], xsamp[1][j])`.
pub fn d2(
    xsamp: [&[Real]; 2],
    values: &[Vec<Real>],
    order: usize,
    x: [Real; 2],
) -> Result<(Real, Real)> {
    let (shape, flat) = flatten2(values)?;
    grid(&xsamp, &shape, flat, order)?.interpolate_with_error(&x)
}

/// Three-dimensional non-uniform Lagrange interpolation.
pub fn d3(
    xsamp: [&[Real]; 3],
    values: &[Vec<Vec<Real>>],
    order: usize,
    x: [Real; 3],
) -> Result<(Real, Real)> {
    let (shape, flat) = flatten3(values)?;
    grid(&xsamp, &shape, flat, order)?.interpolate_with_error(&x)
}

/// Four-dimensional non-uniform Lagrange interpolation.
pub fn d4(
    xsamp: [&[Real]; 4],
    values: &[Vec<Vec<Vec<Real>>>],
    order: usize,
    x: [Real; 4],
) -> Result<(Real, Real)> {
    let (shape, flat) = flatten4(values)?;
    grid(&xsamp, &shape, flat, order)?.interpolate_with_error(&x)
}

fn grid(
    xsamp: &[&[Real]],
    shape: &[usize],
    flat: Vec<Real>,
    order: usize,
) -> Result<NonUniformLagrangeGrid> {
    for (k, (axis, &n)) in xsamp.iter().zip(shape).enumerate() {
        epq_core::ensure!(
            axis.len() == n,
            "axis {k} has {} abscissas but the table has {n} entries along it",
            axis.len()
        );
    }
    NonUniformLagrangeGrid::new(xsamp.iter().map(|a| a.to_vec()).collect(), flat, order)
}
