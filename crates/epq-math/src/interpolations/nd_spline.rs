//! Cubic spline interpolation on rectilinear grids of any dimension.
//!
//! A `k`-dimensional table `f(x_0, …, x_{k-1})` is stored row-major with
//! axis 0 outermost.  Evaluation collapses one axis at a time:
//!
//! 1. every line along the innermost axis is evaluated at `x_{k-1}` using
//!    second derivatives taken from a [`DerivativeCache`] (they depend only
//!    on the data, so they are solved once);
//! 2. the resulting `(k-1)`-dimensional table is collapsed along axis `k-2`
//!    with freshly solved natural splines, and so on out to axis 0.
//!
//! [`CubicSplineGrid`] is a typed façade over [`NdCubicSpline`] fixing the
//! dimension at compile time; [`BicubicSpline`], [`TricubicSpline`] and
//! [`QuadricubicSpline`] are its common instances.

use std::cell::OnceCell;

use epq_core::{errors::Result, Error, Real};
use nalgebra::DMatrix;

use super::{cubic_spline::evaluate_with_derivatives, ensure_ascending, InterpolationNd};
use crate::tridiagonal::{spline_second_derivatives, BoundaryCondition};

/// Second derivatives of every line along the innermost axis of an
/// [`NdCubicSpline`], laid out like its values.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeCache {
    shape: Vec<usize>,
    d2: Vec<Real>,
}

impl DerivativeCache {
    /// Grid shape the cache was computed for.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Raw second derivatives, row-major.
    pub fn as_slice(&self) -> &[Real] {
        &self.d2
    }
}

/// Natural cubic spline on a `k`-dimensional rectilinear grid.
#[derive(Debug, Clone)]
pub struct NdCubicSpline {
    axes: Vec<Vec<Real>>,
    values: Vec<Real>,
    cache: OnceCell<DerivativeCache>,
}

impl NdCubicSpline {
    /// Build from the grid axes and row-major values.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if there are no axes, an axis has
    /// fewer than 3 points or is not strictly ascending, or `values` does not
    /// hold one entry per grid node.
    pub fn new(axes: Vec<Vec<Real>>, values: Vec<Real>) -> Result<Self> {
        validate_axes(&axes)?;
        let expected: usize = axes.iter().map(Vec::len).product();
        epq_core::ensure!(
            values.len() == expected,
            "grid of shape {:?} needs {expected} values, got {}",
            shape_of(&axes),
            values.len()
        );
        Ok(Self {
            axes,
            values,
            cache: OnceCell::new(),
        })
    }

    /// A correctly sized grid of zeros, to be filled later with
    /// [`reset_values`](Self::reset_values).
    pub fn zeros(axes: Vec<Vec<Real>>) -> Result<Self> {
        validate_axes(&axes)?;
        let n = axes.iter().map(Vec::len).product();
        Self::new(axes, vec![0.0; n])
    }

    /// Stack `slices`, each a table over the same inner axes, along a new
    /// outer axis.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the slice count differs from
    /// `outer.len()` or the slices do not share their axes.
    pub fn stack(outer: Vec<Real>, slices: &[NdCubicSpline]) -> Result<Self> {
        epq_core::ensure!(
            slices.len() == outer.len(),
            "outer axis has {} points but {} slices were given",
            outer.len(),
            slices.len()
        );
        epq_core::ensure!(!slices.is_empty(), "cannot stack zero slices");
        let inner = &slices[0].axes;
        let mut values = Vec::with_capacity(outer.len() * slices[0].values.len());
        for (i, s) in slices.iter().enumerate() {
            epq_core::ensure!(
                &s.axes == inner,
                "slice {i} does not share the axes of slice 0"
            );
            values.extend_from_slice(&s.values);
        }
        let mut axes = Vec::with_capacity(inner.len() + 1);
        axes.push(outer);
        axes.extend(inner.iter().cloned());
        Self::new(axes, values)
    }

    /// Number of axes.
    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    /// Number of grid points along each axis.
    pub fn shape(&self) -> Vec<usize> {
        shape_of(&self.axes)
    }

    /// Abscissas of axis `k`.
    ///
    /// # Panics
    /// If `k >= self.dimension()`.
    pub fn axis(&self, k: usize) -> &[Real] {
        &self.axes[k]
    }

    /// Row-major tabulated values.
    pub fn values(&self) -> &[Real] {
        &self.values
    }

    /// Replace the tabulated values, keeping the grid.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] on a size mismatch.
    pub fn reset_values(&mut self, values: &[Real]) -> Result<()> {
        epq_core::ensure!(
            values.len() == self.values.len(),
            "reset needs {} values, got {}",
            self.values.len(),
            values.len()
        );
        self.values.copy_from_slice(values);
        self.cache = OnceCell::new();
        log::trace!("grid of shape {:?} reset", self.shape());
        Ok(())
    }

    /// Replace both the axes and the values; the shape must not change.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the shape differs or the new
    /// axes are invalid.
    pub fn reset_data(&mut self, axes: Vec<Vec<Real>>, values: &[Real]) -> Result<()> {
        epq_core::ensure!(
            shape_of(&axes) == self.shape(),
            "reset needs a grid of shape {:?}, got {:?}",
            self.shape(),
            shape_of(&axes)
        );
        validate_axes(&axes)?;
        self.reset_values(values)?;
        self.axes = axes;
        Ok(())
    }

    /// Solve for the innermost-axis second derivatives without storing them.
    pub fn compute_derivatives(&self) -> Result<DerivativeCache> {
        let shape = self.shape();
        let last = self.axes.len() - 1;
        let axis = &self.axes[last];
        let mut d2 = Vec::with_capacity(self.values.len());
        for (line, ys) in self.values.chunks(axis.len()).enumerate() {
            let line_d2 = spline_second_derivatives(axis, ys, BoundaryCondition::Natural)
                .map_err(|e| in_slices(e, &unravel(line, &shape[..last])))?;
            d2.extend(line_d2);
        }
        log::debug!("solved {} spline line(s) of grid {:?}", self.values.len() / axis.len(), shape);
        Ok(DerivativeCache { shape, d2 })
    }

    /// The cached innermost-axis derivatives, solving for them on first use.
    pub fn derivatives(&self) -> Result<&DerivativeCache> {
        if let Some(cache) = self.cache.get() {
            return Ok(cache);
        }
        let cache = self.compute_derivatives()?;
        Ok(self.cache.get_or_init(|| cache))
    }

    /// Install derivatives computed elsewhere (e.g. by an identical grid).
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the cache shape differs.
    pub fn set_derivatives(&mut self, cache: DerivativeCache) -> Result<()> {
        epq_core::ensure!(
            cache.shape == self.shape(),
            "derivative cache of shape {:?} does not fit grid {:?}",
            cache.shape,
            self.shape()
        );
        self.cache = OnceCell::from(cache);
        Ok(())
    }

    /// Evaluate at `point`, using the internal derivative cache.
    ///
    /// # Errors
    /// * [`Error::InvalidArgument`] if `point` has the wrong length.
    /// * [`Error::OutOfRange`] if any coordinate is outside its axis; `axis`
    ///   names the offending coordinate.
    /// * [`Error::DegenerateData`] with the slice path of the failing line.
    pub fn interpolate(&self, point: &[Real]) -> Result<Real> {
        let cache = self.derivatives()?;
        self.interpolate_with(point, cache)
    }

    /// Evaluate at `point` using caller-supplied innermost derivatives.
    pub fn interpolate_with(&self, point: &[Real], cache: &DerivativeCache) -> Result<Real> {
        let k = self.axes.len();
        epq_core::ensure!(
            point.len() == k,
            "expected a {k}-dimensional point, got {} coordinates",
            point.len()
        );
        let shape = self.shape();
        epq_core::ensure!(
            cache.shape == shape,
            "derivative cache of shape {:?} does not fit grid {:?}",
            cache.shape,
            shape
        );
        for (axis, (&x, xs)) in point.iter().zip(&self.axes).enumerate() {
            let (min, max) = (xs[0], xs[xs.len() - 1]);
            if !(x >= min && x <= max) {
                return Err(Error::OutOfRange {
                    value: x,
                    min,
                    max,
                    axis,
                });
            }
        }

        let last = k - 1;
        let inner = &self.axes[last];
        let mut column = self
            .values
            .chunks(inner.len())
            .zip(cache.d2.chunks(inner.len()))
            .enumerate()
            .map(|(line, (ys, d2))| {
                evaluate_with_derivatives(inner, ys, d2, point[last])
                    .map_err(|e| in_slices(e.on_axis(last), &unravel(line, &shape[..last])))
            })
            .collect::<Result<Vec<Real>>>()?;

        for axis in (0..last).rev() {
            let xs = &self.axes[axis];
            column = column
                .chunks(xs.len())
                .enumerate()
                .map(|(line, ys)| {
                    spline_second_derivatives(xs, ys, BoundaryCondition::Natural)
                        .and_then(|d2| evaluate_with_derivatives(xs, ys, &d2, point[axis]))
                        .map_err(|e| in_slices(e.on_axis(axis), &unravel(line, &shape[..axis])))
                })
                .collect::<Result<Vec<Real>>>()?;
        }

        Ok(column[0])
    }
}

impl InterpolationNd for NdCubicSpline {
    fn dimension(&self) -> usize {
        self.axes.len()
    }

    fn interpolate(&self, point: &[Real]) -> Result<Real> {
        NdCubicSpline::interpolate(self, point)
    }
}

fn shape_of(axes: &[Vec<Real>]) -> Vec<usize> {
    axes.iter().map(Vec::len).collect()
}

fn validate_axes(axes: &[Vec<Real>]) -> Result<()> {
    epq_core::ensure!(!axes.is_empty(), "a spline grid needs at least one axis");
    for (k, axis) in axes.iter().enumerate() {
        epq_core::ensure!(
            axis.len() >= 3,
            "axis {k} has {} points; cubic splines need at least 3",
            axis.len()
        );
        ensure_ascending(axis, &format!("axis {k}"))?;
    }
    Ok(())
}

/// Multi-index of flat position `flat` in a row-major array of `shape`.
fn unravel(mut flat: usize, shape: &[usize]) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    for (slot, &n) in index.iter_mut().zip(shape).rev() {
        *slot = flat % n;
        flat /= n;
    }
    index
}

fn in_slices(err: Error, path: &[usize]) -> Error {
    path.iter().rev().fold(err, |e, &i| e.in_slice(i))
}

/// An [`NdCubicSpline`] whose dimension is fixed at compile time.
#[derive(Debug, Clone)]
pub struct CubicSplineGrid<const D: usize> {
    inner: NdCubicSpline,
}

/// Two-dimensional cubic spline.
pub type BicubicSpline = CubicSplineGrid<2>;
/// Three-dimensional cubic spline.
pub type TricubicSpline = CubicSplineGrid<3>;
/// Four-dimensional cubic spline.
pub type QuadricubicSpline = CubicSplineGrid<4>;

impl<const D: usize> CubicSplineGrid<D> {
    /// Build from `D` ascending axes and row-major values
    /// (`values[((i0 * n1 + i1) * n2 + i2) …]`).
    pub fn new(axes: [&[Real]; D], values: &[Real]) -> Result<Self> {
        let axes = axes.iter().map(|a| a.to_vec()).collect();
        Ok(Self {
            inner: NdCubicSpline::new(axes, values.to_vec())?,
        })
    }

    /// A zero-filled placeholder with the given axes.
    pub fn zeros(axes: [&[Real]; D]) -> Result<Self> {
        let axes = axes.iter().map(|a| a.to_vec()).collect();
        Ok(Self {
            inner: NdCubicSpline::zeros(axes)?,
        })
    }

    /// Evaluate at `point`.
    pub fn interpolate(&self, point: [Real; D]) -> Result<Real> {
        self.inner.interpolate(&point)
    }

    /// Evaluate with caller-supplied innermost derivatives.
    pub fn interpolate_with(&self, point: [Real; D], cache: &DerivativeCache) -> Result<Real> {
        self.inner.interpolate_with(&point, cache)
    }

    /// Replace the tabulated values.
    pub fn reset_values(&mut self, values: &[Real]) -> Result<()> {
        self.inner.reset_values(values)
    }

    /// The cached innermost derivatives.
    pub fn derivatives(&self) -> Result<&DerivativeCache> {
        self.inner.derivatives()
    }

    /// Install innermost derivatives computed elsewhere.
    pub fn set_derivatives(&mut self, cache: DerivativeCache) -> Result<()> {
        self.inner.set_derivatives(cache)
    }

    /// Abscissas of axis `k`.
    pub fn axis(&self, k: usize) -> &[Real] {
        self.inner.axis(k)
    }

    /// The untyped grid.
    pub fn as_nd(&self) -> &NdCubicSpline {
        &self.inner
    }

    /// Consume into the untyped grid.
    pub fn into_nd(self) -> NdCubicSpline {
        self.inner
    }
}

impl CubicSplineGrid<2> {
    /// Build from a matrix with `z[(i, j)] = f(x1[i], x2[j])`.
    pub fn from_matrix(x1: &[Real], x2: &[Real], z: &DMatrix<Real>) -> Result<Self> {
        epq_core::ensure!(
            z.nrows() == x1.len() && z.ncols() == x2.len(),
            "matrix is {}x{} but the axes have {} and {} points",
            z.nrows(),
            z.ncols(),
            x1.len(),
            x2.len()
        );
        // nalgebra is column-major; the grid wants rows contiguous.
        let values: Vec<Real> = z.transpose().iter().copied().collect();
        Self::new([x1, x2], &values)
    }
}

impl<const D: usize> InterpolationNd for CubicSplineGrid<D> {
    fn dimension(&self) -> usize {
        D
    }

    fn interpolate(&self, point: &[Real]) -> Result<Real> {
        self.inner.interpolate(point)
    }
}
