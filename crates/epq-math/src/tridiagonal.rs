//! Tridiagonal systems and the cubic-spline second-derivative solve.
//!
//! * [`TridiagonalSystem`]: banded matrix with a Thomas-algorithm solver
//! * [`spline_second_derivatives`]: assembles and solves the spline system
//!   for natural or clamped end conditions in `O(n)`

use epq_core::{errors::Result, Error, Real, SlicePath};

/// End conditions of a cubic spline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BoundaryCondition {
    /// Second derivative forced to zero at both ends.
    #[default]
    Natural,
    /// Prescribed first derivative at the first (`start`) and last (`end`)
    /// knot.
    Clamped {
        /// `y'(x_0)`.
        start: Real,
        /// `y'(x_{n-1})`.
        end: Real,
    },
}

/// A tridiagonal matrix.
///
/// Stores the lower, diagonal, and upper bands.
#[derive(Debug, Clone)]
pub struct TridiagonalSystem {
    /// Lower diagonal (index 0 unused).
    pub lower: Vec<Real>,
    /// Main diagonal.
    pub diag: Vec<Real>,
    /// Upper diagonal (last index unused).
    pub upper: Vec<Real>,
}

impl TridiagonalSystem {
    /// Create a zero tridiagonal system of size `n`.
    pub fn new(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
        }
    }

    /// Size (number of rows/columns).
    pub fn size(&self) -> usize {
        self.diag.len()
    }

    /// Apply the matrix: `y = A · x`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `x` has the wrong length.
    pub fn apply(&self, x: &[Real]) -> Result<Vec<Real>> {
        let n = self.size();
        epq_core::ensure!(x.len() == n, "vector length {} != system size {n}", x.len());
        if n == 1 {
            return Ok(vec![self.diag[0] * x[0]]);
        }
        let mut y = vec![0.0; n];
        y[0] = self.diag[0] * x[0] + self.upper[0] * x[1];
        for i in 1..n - 1 {
            y[i] = self.lower[i] * x[i - 1] + self.diag[i] * x[i] + self.upper[i] * x[i + 1];
        }
        y[n - 1] = self.lower[n - 1] * x[n - 2] + self.diag[n - 1] * x[n - 1];
        Ok(y)
    }

    /// Solve `A · x = rhs` using the Thomas algorithm (forward elimination
    /// followed by back substitution).
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] on a length mismatch and
    /// [`Error::Runtime`] if a zero pivot is met.
    pub fn solve(&self, rhs: &[Real]) -> Result<Vec<Real>> {
        let n = self.size();
        epq_core::ensure!(n > 0, "cannot solve an empty system");
        epq_core::ensure!(rhs.len() == n, "rhs length {} != system size {n}", rhs.len());

        // Forward sweep
        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];

        if self.diag[0] == 0.0 {
            epq_core::fail!("zero pivot in row 0 of tridiagonal system");
        }
        c_prime[0] = self.upper[0] / self.diag[0];
        d_prime[0] = rhs[0] / self.diag[0];

        for i in 1..n {
            let m = self.diag[i] - self.lower[i] * c_prime[i - 1];
            if m == 0.0 || !m.is_finite() {
                epq_core::fail!("zero pivot in row {i} of tridiagonal system");
            }
            if i < n - 1 {
                c_prime[i] = self.upper[i] / m;
            }
            d_prime[i] = (rhs[i] - self.lower[i] * d_prime[i - 1]) / m;
        }

        // Back substitution
        let mut x = vec![0.0; n];
        x[n - 1] = d_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = d_prime[i] - c_prime[i] * x[i + 1];
        }

        Ok(x)
    }
}

/// Second derivatives of the interpolating cubic spline through
/// `(xs[i], ys[i])`.
///
/// `xs` must be strictly ascending with at least 3 points.
///
/// # Errors
/// * [`Error::InvalidArgument`] on mismatched lengths or fewer than 3 points.
/// * [`Error::DegenerateData`] if two consecutive abscissas coincide.
pub fn spline_second_derivatives(
    xs: &[Real],
    ys: &[Real],
    boundary: BoundaryCondition,
) -> Result<Vec<Real>> {
    let n = xs.len();
    epq_core::ensure!(n >= 3, "cubic spline needs at least 3 points, got {n}");
    epq_core::ensure!(
        ys.len() == n,
        "xs ({n}) and ys ({}) must have the same length",
        ys.len()
    );

    let mut h = Vec::with_capacity(n - 1);
    for i in 0..n - 1 {
        let hi = xs[i + 1] - xs[i];
        if hi == 0.0 {
            return Err(Error::DegenerateData {
                lo: i,
                x: xs[i],
                slice: SlicePath::root(),
            });
        }
        h.push(hi);
    }

    let mut system = TridiagonalSystem::new(n);
    let mut rhs = vec![0.0; n];

    for i in 1..n - 1 {
        system.lower[i] = h[i - 1] / 6.0;
        system.diag[i] = (h[i - 1] + h[i]) / 3.0;
        system.upper[i] = h[i] / 6.0;
        rhs[i] = (ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1];
    }

    match boundary {
        BoundaryCondition::Natural => {
            system.diag[0] = 1.0;
            system.diag[n - 1] = 1.0;
        }
        BoundaryCondition::Clamped { start, end } => {
            system.diag[0] = h[0] / 3.0;
            system.upper[0] = h[0] / 6.0;
            rhs[0] = (ys[1] - ys[0]) / h[0] - start;

            system.lower[n - 1] = h[n - 2] / 6.0;
            system.diag[n - 1] = h[n - 2] / 3.0;
            rhs[n - 1] = end - (ys[n - 1] - ys[n - 2]) / h[n - 2];
        }
    }

    system.solve(&rhs)
}
