//! One-dimensional cubic spline with duplicate-abscissa repair.
//!
//! Construction sorts the samples by abscissa, repairs duplicates according
//! to the [`DuplicatePolicy`] in force (see [`super::duplicates`]) and keeps
//! the permutation back to the caller's indices.  Second derivatives are
//! solved lazily on the first evaluation and cached until the data or the
//! boundary condition changes.
//!
//! The spline does not extrapolate: queries outside `[x_min, x_max]` fail
//! with [`Error::OutOfRange`].

use std::cell::OnceCell;

use epq_core::{errors::Result, DuplicatePolicy, Error, Real, Settings, SlicePath};

use super::{
    bracket,
    duplicates::{self, Repair},
    Interpolation1D,
};
pub use crate::tridiagonal::BoundaryCondition;
use crate::tridiagonal::spline_second_derivatives;

/// Per-instance construction options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineOptions {
    /// End conditions.
    pub boundary: BoundaryCondition,
    /// How duplicate abscissas with differing ordinates are repaired.
    pub duplicate_policy: DuplicatePolicy,
    /// Separation of repaired duplicates as a fraction of the range.
    pub separation_fraction: Real,
}

impl SplineOptions {
    /// Natural boundaries and the duplicate handling currently configured
    /// in the global [`Settings`].
    pub fn from_settings() -> Self {
        let settings = Settings::instance();
        Self {
            boundary: BoundaryCondition::Natural,
            duplicate_policy: settings.duplicate_policy(),
            separation_fraction: settings.separation_fraction(),
        }
    }

    /// Replace the boundary condition.
    pub fn with_boundary(mut self, boundary: BoundaryCondition) -> Self {
        self.boundary = boundary;
        self
    }

    /// Replace the duplicate policy.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

impl Default for SplineOptions {
    fn default() -> Self {
        Self::from_settings()
    }
}

/// Cubic spline through a table of `(x, y)` samples.
///
/// Not `Sync`: the derivative cache is filled through `&self`.  Give each
/// thread its own instance.
#[derive(Debug, Clone)]
pub struct CubicSpline1D {
    /// Number of samples supplied at construction; `reset_data` must match.
    input_len: usize,
    xs: Vec<Real>,
    ys: Vec<Real>,
    indices: Vec<usize>,
    repairs: Vec<Repair>,
    options: SplineOptions,
    d2: OnceCell<Vec<Real>>,
}

impl CubicSpline1D {
    /// Build a natural cubic spline using the global duplicate settings.
    ///
    /// `xs` need not be sorted.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the slices have different
    /// lengths, hold fewer than 3 points, contain non-finite values, or span
    /// a zero abscissa range.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        Self::with_options(xs, ys, SplineOptions::from_settings())
    }

    /// Build a spline with explicit options.
    ///
    /// # Errors
    /// As [`new`](Self::new), and [`Error::InvalidArgument`] unless
    /// `0 < options.separation_fraction <= 0.1`.
    pub fn with_options(xs: &[Real], ys: &[Real], options: SplineOptions) -> Result<Self> {
        Settings::check_separation_fraction(options.separation_fraction)?;
        let mut spline = Self {
            input_len: xs.len(),
            xs: Vec::new(),
            ys: Vec::new(),
            indices: Vec::new(),
            repairs: Vec::new(),
            options,
            d2: OnceCell::new(),
        };
        spline.load(xs, ys)?;
        Ok(spline)
    }

    fn load(&mut self, xs: &[Real], ys: &[Real]) -> Result<()> {
        let n = xs.len();
        epq_core::ensure!(n >= 3, "cubic spline needs at least 3 points, got {n}");
        epq_core::ensure!(
            ys.len() == n,
            "xs ({n}) and ys ({}) must have the same length",
            ys.len()
        );
        epq_core::ensure!(
            xs.iter().chain(ys.iter()).all(|v| v.is_finite()),
            "spline samples must be finite"
        );

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]));
        let sorted_x: Vec<Real> = order.iter().map(|&i| xs[i]).collect();
        let sorted_y: Vec<Real> = order.iter().map(|&i| ys[i]).collect();
        epq_core::ensure!(
            sorted_x[n - 1] > sorted_x[0],
            "abscissas span a zero range (all equal to {})",
            sorted_x[0]
        );

        let table = duplicates::repair(
            &sorted_x,
            &sorted_y,
            &order,
            self.options.duplicate_policy,
            self.options.separation_fraction,
        );
        epq_core::ensure!(
            table.xs.len() >= 3,
            "only {} distinct samples remain after duplicate repair",
            table.xs.len()
        );
        if !table.repairs.is_empty() {
            log::debug!(
                "{} duplicate run(s) repaired; {} of {n} samples kept",
                table.repairs.len(),
                table.xs.len()
            );
        }

        self.xs = table.xs;
        self.ys = table.ys;
        self.indices = table.indices;
        self.repairs = table.repairs;
        self.d2 = OnceCell::new();
        Ok(())
    }

    /// Replace the samples in place.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the number of samples differs
    /// from the one given at construction, or on any construction failure.
    pub fn reset_data(&mut self, xs: &[Real], ys: &[Real]) -> Result<()> {
        epq_core::ensure!(
            xs.len() == self.input_len && ys.len() == self.input_len,
            "reset needs {} samples, got {} abscissas and {} ordinates",
            self.input_len,
            xs.len(),
            ys.len()
        );
        log::trace!("resetting spline data ({} samples)", self.input_len);
        self.load(xs, ys)
    }

    /// Switch to clamped end conditions with the given first derivatives.
    pub fn set_derivative_limits(&mut self, start: Real, end: Real) {
        self.set_boundary(BoundaryCondition::Clamped { start, end });
    }

    /// Switch back to natural end conditions.
    pub fn reset_to_natural(&mut self) {
        self.set_boundary(BoundaryCondition::Natural);
    }

    fn set_boundary(&mut self, boundary: BoundaryCondition) {
        if self.options.boundary != boundary {
            self.options.boundary = boundary;
            self.d2 = OnceCell::new();
        }
    }

    /// The current end conditions.
    pub fn boundary(&self) -> BoundaryCondition {
        self.options.boundary
    }

    /// Sorted, repaired abscissas.
    pub fn abscissas(&self) -> &[Real] {
        &self.xs
    }

    /// Ordinates matching [`abscissas`](Self::abscissas).
    pub fn ordinates(&self) -> &[Real] {
        &self.ys
    }

    /// `original_indices()[i]` is the caller-side index of sample `i`.
    pub fn original_indices(&self) -> &[usize] {
        &self.indices
    }

    /// Duplicate runs repaired during the last construction or reset.
    pub fn repairs(&self) -> &[Repair] {
        &self.repairs
    }

    /// Number of samples after repair.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Always `false`: a spline holds at least 3 samples.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Second derivatives at each knot, solving for them if needed.
    ///
    /// # Errors
    /// Propagates [`Error::DegenerateData`] if two knots coincide.
    pub fn second_derivatives(&self) -> Result<&[Real]> {
        if let Some(d2) = self.d2.get() {
            return Ok(d2);
        }
        let d2 = spline_second_derivatives(&self.xs, &self.ys, self.options.boundary)?;
        Ok(self.d2.get_or_init(|| d2))
    }

    /// Install externally computed second derivatives.
    ///
    /// They stay in use until the data or boundary condition changes.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the length does not match.
    pub fn set_second_derivatives(&mut self, d2: Vec<Real>) -> Result<()> {
        epq_core::ensure!(
            d2.len() == self.xs.len(),
            "expected {} second derivatives, got {}",
            self.xs.len(),
            d2.len()
        );
        self.d2 = OnceCell::from(d2);
        Ok(())
    }

    /// Evaluate the spline at `x`.
    ///
    /// # Errors
    /// [`Error::OutOfRange`] outside the tabulated domain;
    /// [`Error::DegenerateData`] on a zero-width bracket.
    pub fn interpolate(&self, x: Real) -> Result<Real> {
        let d2 = self.second_derivatives()?;
        evaluate_with_derivatives(&self.xs, &self.ys, d2, x)
    }
}

impl Interpolation1D for CubicSpline1D {
    fn interpolate(&self, x: Real) -> Result<Real> {
        CubicSpline1D::interpolate(self, x)
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}

/// Evaluate a cubic spline from caller-managed tables.
///
/// `xs` must be ascending; `d2` holds the second derivative at each knot.
/// Callers that cache derivatives themselves (the N-dimensional layers) use
/// this directly.
///
/// # Errors
/// * [`Error::InvalidArgument`] if the three slices differ in length or hold
///   fewer than two points.
/// * [`Error::OutOfRange`] if `x` lies outside `[xs[0], xs[n-1]]`.
/// * [`Error::DegenerateData`] if the bracket around `x` has zero width.
pub fn evaluate_with_derivatives(xs: &[Real], ys: &[Real], d2: &[Real], x: Real) -> Result<Real> {
    let n = xs.len();
    epq_core::ensure!(n >= 2, "spline evaluation needs at least 2 knots, got {n}");
    epq_core::ensure!(
        ys.len() == n && d2.len() == n,
        "knot ({n}), ordinate ({}) and derivative ({}) tables differ in length",
        ys.len(),
        d2.len()
    );
    let (min, max) = (xs[0], xs[n - 1]);
    if !(x >= min && x <= max) {
        return Err(Error::OutOfRange {
            value: x,
            min,
            max,
            axis: 0,
        });
    }

    let klo = bracket(xs, x);
    let khi = klo + 1;
    let h = xs[khi] - xs[klo];
    if h == 0.0 {
        return Err(Error::DegenerateData {
            lo: klo,
            x: xs[klo],
            slice: SlicePath::root(),
        });
    }
    let a = (xs[khi] - x) / h;
    let b = (x - xs[klo]) / h;
    Ok(a * ys[klo]
        + b * ys[khi]
        + ((a * a * a - a) * d2[klo] + (b * b * b - b) * d2[khi]) * (h * h) / 6.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn options(policy: DuplicatePolicy) -> SplineOptions {
        SplineOptions {
            boundary: BoundaryCondition::Natural,
            duplicate_policy: policy,
            separation_fraction: 5e-4,
        }
    }

    #[test]
    fn passes_through_nodes() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 1.0, 0.0, 1.0, 0.0];
        let s = CubicSpline1D::with_options(&xs, &ys, options(DuplicatePolicy::Separate)).unwrap();
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            assert_eq!(s.interpolate(x).unwrap(), y, "at x={x}");
        }
    }

    #[test]
    fn rejects_out_of_range() {
        let s = CubicSpline1D::new(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 1.0, 0.0, 1.0, 0.0])
            .unwrap();
        let err = s.interpolate(-1.0).unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfRange {
                min: 0.0,
                max: 4.0,
                ..
            }
        ));
        assert!(s.interpolate(4.000001).is_err());
        assert!(s.interpolate(Real::NAN).is_err());
    }

    #[test]
    fn construction_errors() {
        assert!(matches!(
            CubicSpline1D::new(&[0.0, 1.0], &[0.0, 1.0]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            CubicSpline1D::new(&[0.0, 1.0, 2.0], &[0.0, 1.0]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            CubicSpline1D::new(&[1.0, 1.0, 1.0], &[0.0, 1.0, 2.0]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            CubicSpline1D::new(&[0.0, 1.0, Real::INFINITY], &[0.0, 1.0, 2.0]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn sorts_and_keeps_permutation() {
        let s = CubicSpline1D::new(&[2.0, 0.0, 1.0], &[4.0, 0.0, 1.0]).unwrap();
        assert_eq!(s.abscissas(), &[0.0, 1.0, 2.0]);
        assert_eq!(s.ordinates(), &[0.0, 1.0, 4.0]);
        assert_eq!(s.original_indices(), &[1, 2, 0]);
    }

    #[test]
    fn natural_second_derivatives_vanish_at_ends() {
        let s = CubicSpline1D::new(&[0.0, 0.5, 2.0, 3.0], &[1.0, 3.0, -1.0, 2.0]).unwrap();
        let d2 = s.second_derivatives().unwrap();
        assert_abs_diff_eq!(d2[0], 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(d2[3], 0.0, epsilon = 1e-14);
    }

    #[test]
    fn clamped_boundary_reproduces_cubic() {
        let xs: Vec<Real> = (0..6).map(|i| i as Real).collect();
        let ys: Vec<Real> = xs.iter().map(|x| x * x * x - 2.0 * x).collect();
        let mut s = CubicSpline1D::new(&xs, &ys).unwrap();
        s.set_derivative_limits(-2.0, 3.0 * 25.0 - 2.0);
        assert_eq!(
            s.boundary(),
            BoundaryCondition::Clamped {
                start: -2.0,
                end: 73.0
            }
        );
        for i in 0..=50 {
            let x = 5.0 * i as Real / 50.0;
            assert_abs_diff_eq!(s.interpolate(x).unwrap(), x * x * x - 2.0 * x, epsilon = 1e-10);
        }
        s.reset_to_natural();
        assert_eq!(s.boundary(), BoundaryCondition::Natural);
        assert_eq!(s.second_derivatives().unwrap()[0], 0.0);
    }

    #[test]
    fn reset_requires_same_length() {
        let mut s = CubicSpline1D::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
        assert!(s.reset_data(&[0.0, 1.0], &[0.0, 1.0]).is_err());
        s.reset_data(&[0.0, 1.0, 2.0], &[0.0, 2.0, 0.0]).unwrap();
        assert_abs_diff_eq!(s.interpolate(1.0).unwrap(), 2.0, epsilon = 1e-15);
    }

    #[test]
    fn reset_invalidates_cache() {
        let mut s = CubicSpline1D::new(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 0.0, 1.0]).unwrap();
        let before = s.second_derivatives().unwrap().to_vec();
        s.reset_data(&[0.0, 1.0, 2.0, 3.0], &[0.0, -1.0, 0.0, -1.0])
            .unwrap();
        let after = s.second_derivatives().unwrap();
        for (a, b) in before.iter().zip(after.iter()) {
            assert_abs_diff_eq!(*a, -*b, epsilon = 1e-14);
        }
    }

    #[test]
    fn installed_derivatives_are_used() {
        let mut s = CubicSpline1D::new(&[0.0, 1.0, 2.0], &[0.0, 0.0, 0.0]).unwrap();
        s.set_second_derivatives(vec![0.0, 6.0, 0.0]).unwrap();
        // a = b = 0.5 on [0, 1]: (b³ - b) * 6 / 6 = -0.375
        assert_abs_diff_eq!(s.interpolate(0.5).unwrap(), -0.375, epsilon = 1e-15);
        assert!(s.set_second_derivatives(vec![0.0]).is_err());
    }

    #[test]
    fn duplicate_pair_is_separated() {
        let xs = [0.0, 1.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 1.0, 1.5, 2.0, 3.0];
        let s = CubicSpline1D::with_options(&xs, &ys, options(DuplicatePolicy::Separate)).unwrap();
        assert_eq!(s.len(), 5);
        let x = s.abscissas();
        assert!(x[2] > x[1]);
        assert!(x[2] - x[1] <= 5e-4 * 3.0 * (1.0 + 1e-12));
        assert_eq!(s.repairs().len(), 1);
        // Both ordinates survive at the separated positions.
        assert_abs_diff_eq!(s.interpolate(x[1]).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.interpolate(x[2]).unwrap(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn unusable_separation_fraction_is_rejected() {
        let xs = [0.0, 1.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 1.0, 1.5, 2.0, 3.0];
        for fraction in [-1e-3, 0.0, Real::NAN, 0.5] {
            let opts = SplineOptions {
                separation_fraction: fraction,
                ..options(DuplicatePolicy::Separate)
            };
            assert!(
                matches!(
                    CubicSpline1D::with_options(&xs, &ys, opts),
                    Err(Error::InvalidArgument(_))
                ),
                "fraction {fraction} accepted"
            );
        }
    }

    #[test]
    fn duplicate_pair_is_averaged() {
        let xs = [0.0, 1.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 1.0, 2.0, 2.0, 3.0];
        let s = CubicSpline1D::with_options(&xs, &ys, options(DuplicatePolicy::Average)).unwrap();
        assert_eq!(s.abscissas(), &[0.0, 1.0, 2.0, 3.0]);
        assert_abs_diff_eq!(s.interpolate(1.0).unwrap(), 1.5, epsilon = 1e-15);
    }

    #[test]
    fn too_few_points_after_repair() {
        let err = CubicSpline1D::new(&[0.0, 1.0, 1.0], &[0.0, 1.0, 1.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn static_evaluation_checks_bracket() {
        let err = evaluate_with_derivatives(&[0.0, 1.0, 1.0], &[0.0, 1.0, 2.0], &[0.0; 3], 1.0)
            .unwrap_err();
        // x = 1.0 falls into the zero-width interval [1, 1].
        assert!(matches!(err, Error::DegenerateData { lo: 1, .. }));
        assert!(evaluate_with_derivatives(&[0.0, 1.0], &[0.0], &[0.0, 0.0], 0.5).is_err());
    }

    #[test]
    fn trait_object_range() {
        let s = CubicSpline1D::new(&[3.0, 1.0, 2.0], &[0.0, 1.0, 2.0]).unwrap();
        let f: &dyn Interpolation1D = &s;
        assert_eq!(f.x_min(), 1.0);
        assert_eq!(f.x_max(), 3.0);
        assert!(f.is_in_range(2.5));
        assert!(!f.is_in_range(0.5));
    }
}
