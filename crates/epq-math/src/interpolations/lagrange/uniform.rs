//! Lagrange interpolation on equally spaced grids.
//!
//! Along each axis the query coordinate is mapped to a reduced index
//! `r = (x - origin) / spacing`; the window of `order + 1` samples starts at
//! `round(r - order / 2)`, clamped so that it stays inside the table.  Neville's
//! algorithm then runs on the window's local integer coordinates.

use epq_core::{errors::Result, Real};
use num_traits::ToPrimitive;

use super::{ensure_finite, ensure_order, flatten2, flatten3, flatten4, neville::neville};
use crate::interpolations::InterpolationNd;

/// A table sampled on an equally spaced rectilinear grid.
///
/// Values are row-major with axis 0 outermost.
#[derive(Debug, Clone)]
pub struct UniformLagrangeGrid {
    origins: Vec<Real>,
    spacings: Vec<Real>,
    shape: Vec<usize>,
    values: Vec<Real>,
    order: usize,
    /// Local coordinates `0, 1, …, order` of a window.
    nodes: Vec<Real>,
}

impl UniformLagrangeGrid {
    /// Build a grid interpolant.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`](epq_core::Error::InvalidArgument)
    /// if the per-axis vectors differ in length, a spacing is zero or
    /// non-finite, an origin is non-finite, `values` does not match `shape`,
    /// or `order` is outside `1..=n_k - 1` on some axis.
    pub fn new(
        origins: Vec<Real>,
        spacings: Vec<Real>,
        shape: Vec<usize>,
        values: Vec<Real>,
        order: usize,
    ) -> Result<Self> {
        let k = shape.len();
        epq_core::ensure!(k >= 1, "a grid needs at least one axis");
        epq_core::ensure!(
            origins.len() == k && spacings.len() == k,
            "{k} axes need {k} origins and spacings, got {} and {}",
            origins.len(),
            spacings.len()
        );
        for axis in 0..k {
            epq_core::ensure!(
                spacings[axis] != 0.0 && spacings[axis].is_finite(),
                "spacing of axis {axis} must be finite and non-zero, got {}",
                spacings[axis]
            );
            epq_core::ensure!(
                origins[axis].is_finite(),
                "origin of axis {axis} must be finite"
            );
            ensure_order(order, shape[axis], axis)?;
        }
        let expected: usize = shape.iter().product();
        epq_core::ensure!(
            values.len() == expected,
            "grid of shape {shape:?} needs {expected} values, got {}",
            values.len()
        );
        Ok(Self {
            origins,
            spacings,
            shape,
            values,
            order,
            nodes: (0..=order).map(|i| i as Real).collect(),
        })
    }

    /// Interpolation order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of samples along each axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Interpolated value and error estimate at `point`.
    ///
    /// Points outside the table are extrapolated from the edge window.
    pub fn interpolate_with_error(&self, point: &[Real]) -> Result<(Real, Real)> {
        epq_core::ensure!(
            point.len() == self.shape.len(),
            "expected a {}-dimensional point, got {} coordinates",
            self.shape.len(),
            point.len()
        );
        ensure_finite(point)?;
        self.reduce(0, &self.values, point)
    }

    fn reduce(&self, axis: usize, values: &[Real], point: &[Real]) -> Result<(Real, Real)> {
        let (first, t) = self.window(axis, point[axis])?;
        let window = first..=first + self.order;
        if axis + 1 == self.shape.len() {
            return neville(&self.nodes, &values[window], t);
        }
        let stride = values.len() / self.shape[axis];
        let samples = window
            .map(|j| {
                self.reduce(axis + 1, &values[j * stride..(j + 1) * stride], point)
                    .map(|(v, _)| v)
                    .map_err(|e| e.in_slice(j))
            })
            .collect::<Result<Vec<Real>>>()?;
        neville(&self.nodes, &samples, t)
    }

    /// First index of the window along `axis` and the query's local
    /// coordinate relative to it.
    fn window(&self, axis: usize, x: Real) -> Result<(usize, Real)> {
        let last_start = (self.shape[axis] - self.order - 1) as Real;
        let r = (x - self.origins[axis]) / self.spacings[axis];
        let start = (r - self.order as Real / 2.0).round().clamp(0.0, last_start);
        let first = start.to_usize().ok_or_else(|| {
            epq_core::Error::InvalidArgument(format!(
                "reduced coordinate {r} on axis {axis} cannot be indexed"
            ))
        })?;
        Ok((first, r - start))
    }
}

impl InterpolationNd for UniformLagrangeGrid {
    fn dimension(&self) -> usize {
        self.shape.len()
    }

    fn interpolate(&self, point: &[Real]) -> Result<Real> {
        self.interpolate_with_error(point).map(|(v, _)| v)
    }
}

/// One-dimensional uniform Lagrange interpolation.
///
/// Returns the estimate and the error estimate at `x` for
/// `values[i] = f(origin + i * spacing)`.
///
/// ```
/// use epq_math::interpolations::lagrange::uniform;
///
/// let squares = [0.0, 1.0, 4.0, 9.0, 16.0];
/// let (y, _) = uniform::d1(&squares, 0.0, 1.0, 2, 2.5).unwrap();
/// assert!((y - 6.25).abs() < 1e-12);
/// ```
pub fn d1(values: &[Real], origin: Real, spacing: Real, order: usize, x: Real) -> Result<(Real, Real)> {
    UniformLagrangeGrid::new(
        vec![origin],
        vec![spacing],
        vec![values.len()],
        values.to_vec(),
        order,
    )?
    .interpolate_with_error(&[x])
}

/// Two-dimensional uniform Lagrange interpolation; `values[i][j]` is the
/// sample at `(origin[0] + i * spacing[0], origin[1] + j * spacing[1])`.
pub fn d2(
    values: &[Vec<Real>],
    origin: [Real; 2],
    spacing: [Real; 2],
    order: usize,
    x: [Real; 2],
) -> Result<(Real, Real)> {
    let (shape, flat) = flatten2(values)?;
    UniformLagrangeGrid::new(origin.to_vec(), spacing.to_vec(), shape, flat, order)?
        .interpolate_with_error(&x)
}

/// Three-dimensional uniform Lagrange interpolation.
pub fn d3(
    values: &[Vec<Vec<Real>>],
    origin: [Real; 3],
    spacing: [Real; 3],
    order: usize,
    x: [Real; 3],
) -> Result<(Real, Real)> {
    let (shape, flat) = flatten3(values)?;
    UniformLagrangeGrid::new(origin.to_vec(), spacing.to_vec(), shape, flat, order)?
        .interpolate_with_error(&x)
}

/// Four-dimensional uniform Lagrange interpolation.
pub fn d4(
    values: &[Vec<Vec<Vec<Real>>>],
    origin: [Real; 4],
    spacing: [Real; 4],
    order: usize,
    x: [Real; 4],
) -> Result<(Real, Real)> {
    let (shape, flat) = flatten4(values)?;
    UniformLagrangeGrid::new(origin.to_vec(), spacing.to_vec(), shape, flat, order)?
        .interpolate_with_error(&x)
}
