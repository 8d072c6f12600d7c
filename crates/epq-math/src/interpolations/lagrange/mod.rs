//! Lagrange interpolation of arbitrary order and dimension.
//!
//! - [`uniform`]: equally spaced grids, addressed by origin and spacing;
//! - [`non_uniform`]: arbitrary strictly monotonic grids;
//! - [`function`]: the same non-uniform scheme built as a tree of
//!   function objects, for any number of variables.
//!
//! All of them select a window of `order + 1` consecutive samples around the
//! query point (clamped at the table edges, so queries outside the table
//! extrapolate) and evaluate the interpolating polynomial with Neville's
//! algorithm.  Multi-dimensional tables are reduced one axis at a time,
//! outermost first: for each of the `order + 1` selected indices of the
//! outer axis the inner axes are interpolated, and the resulting samples are
//! interpolated along the outer axis.  Only the outermost error estimate is
//! reported.

use epq_core::{errors::Result, Real};

pub mod function;
mod neville;
pub mod non_uniform;
pub mod uniform;

pub use function::{FnInterpolation, InterpolationFunction};
pub use non_uniform::{locate, NonUniformLagrangeGrid};
pub use uniform::UniformLagrangeGrid;

/// Check `1 <= order <= n - 1` for a table of `n` samples along `axis`.
pub(crate) fn ensure_order(order: usize, n: usize, axis: usize) -> Result<()> {
    epq_core::ensure!(order >= 1, "interpolation order must be at least 1");
    epq_core::ensure!(
        order < n,
        "order {order} needs at least {} samples, axis {axis} has {n}",
        order + 1
    );
    Ok(())
}

/// Check that `xs` is finite and strictly ascending or strictly descending.
pub(crate) fn ensure_monotonic(xs: &[Real], axis: usize) -> Result<()> {
    epq_core::ensure!(
        xs.iter().all(|x| x.is_finite()),
        "abscissas of axis {axis} must be finite"
    );
    if xs.len() < 2 {
        return Ok(());
    }
    let ascending = xs[1] > xs[0];
    for (i, w) in xs.windows(2).enumerate() {
        let ok = if ascending { w[1] > w[0] } else { w[1] < w[0] };
        epq_core::ensure!(
            ok,
            "abscissas of axis {axis} are not strictly monotonic at index {}",
            i + 1
        );
    }
    Ok(())
}

pub(crate) fn ensure_finite(point: &[Real]) -> Result<()> {
    epq_core::ensure!(
        point.iter().all(|x| x.is_finite()),
        "query point {point:?} is not finite"
    );
    Ok(())
}

/// Flatten a rectangular 2-D table to row-major order.
pub(crate) fn flatten2(values: &[Vec<Real>]) -> Result<(Vec<usize>, Vec<Real>)> {
    let n1 = values.first().map_or(0, Vec::len);
    let mut flat = Vec::with_capacity(values.len() * n1);
    for (i, row) in values.iter().enumerate() {
        epq_core::ensure!(
            row.len() == n1,
            "ragged table: row {i} has {} entries, row 0 has {n1}",
            row.len()
        );
        flat.extend_from_slice(row);
    }
    Ok((vec![values.len(), n1], flat))
}

/// Flatten a rectangular 3-D table to row-major order.
pub(crate) fn flatten3(values: &[Vec<Vec<Real>>]) -> Result<(Vec<usize>, Vec<Real>)> {
    let mut shape = None;
    let mut flat = Vec::new();
    for (i, plane) in values.iter().enumerate() {
        let (s, f) = flatten2(plane)?;
        if let Some(prev) = &shape {
            epq_core::ensure!(
                prev == &s,
                "ragged table: slice {i} has shape {s:?}, slice 0 has {prev:?}"
            );
        }
        shape = Some(s);
        flat.extend(f);
    }
    let mut full = vec![values.len()];
    full.extend(shape.unwrap_or_else(|| vec![0, 0]));
    Ok((full, flat))
}

/// Flatten a rectangular 4-D table to row-major order.
pub(crate) fn flatten4(values: &[Vec<Vec<Vec<Real>>>]) -> Result<(Vec<usize>, Vec<Real>)> {
    let mut shape = None;
    let mut flat = Vec::new();
    for (i, cube) in values.iter().enumerate() {
        let (s, f) = flatten3(cube)?;
        if let Some(prev) = &shape {
            epq_core::ensure!(
                prev == &s,
                "ragged table: slice {i} has shape {s:?}, slice 0 has {prev:?}"
            );
        }
        shape = Some(s);
        flat.extend(f);
    }
    let mut full = vec![values.len()];
    full.extend(shape.unwrap_or_else(|| vec![0, 0, 0]));
    Ok((full, flat))
}
