//! Error types for the epq interpolation engine.
//!
//! All failures are reported through a single `thiserror`-derived enum.  The
//! `ensure!` and `fail!` macros defined here are the usual way of producing
//! them from precondition checks.

use std::fmt;

use thiserror::Error;

use crate::Real;

/// Path of outer grid indices leading to the sub-table in which an error was
/// detected.
///
/// A multi-dimensional interpolation collapses one axis at a time; each level
/// that forwards an error prepends the index of the slice it was working on,
/// so `[2][0]` means "slice 2 of the outermost axis, then slice 0 of the
/// next one".  An empty path means the error arose at the top level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlicePath(Vec<usize>);

impl SlicePath {
    /// An empty path (top level).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// The indices, outermost first.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// `true` if the error arose at the top level.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    fn prepend(&mut self, index: usize) {
        self.0.insert(0, index);
    }
}

impl From<Vec<usize>> for SlicePath {
    fn from(v: Vec<usize>) -> Self {
        Self(v)
    }
}

impl fmt::Display for SlicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("top level");
        }
        for i in &self.0 {
            write!(f, "[{i}]")?;
        }
        Ok(())
    }
}

/// The top-level error type used throughout epq.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Malformed construction or query input (maps to `ensure!`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Query coordinate outside the tabulated domain of a spline.
    #[error("value {value} on axis {axis} is outside the tabulated range [{min}, {max}]")]
    OutOfRange {
        /// The offending coordinate.
        value: Real,
        /// Lower bound of the tabulated domain.
        min: Real,
        /// Upper bound of the tabulated domain.
        max: Real,
        /// Which coordinate of the query failed (0 for one-dimensional tables).
        axis: usize,
    },

    /// Zero-width interval met during evaluation.
    #[error("zero-width interval at abscissa {x} (index {lo}) in slice {slice}")]
    DegenerateData {
        /// Lower index of the degenerate bracket or window.
        lo: usize,
        /// The abscissa shared by both ends of the bracket.
        x: Real,
        /// Sub-table in which the degeneracy was found.
        slice: SlicePath,
    },

    /// Internal numerical failure (maps to `fail!`).
    #[error("{0}")]
    Runtime(String),
}

impl Error {
    /// Record that this error occurred inside slice `index` of the caller's
    /// outermost axis.  Only [`Error::DegenerateData`] carries a path; other
    /// variants are returned unchanged.
    pub fn in_slice(mut self, index: usize) -> Self {
        if let Error::DegenerateData { slice, .. } = &mut self {
            slice.prepend(index);
        }
        self
    }

    /// Report the failure against query coordinate `axis`.  Only
    /// [`Error::OutOfRange`] carries an axis; it is shifted so that the
    /// inner table's axis 0 becomes the caller's axis `offset`.
    pub fn on_axis(mut self, offset: usize) -> Self {
        if let Error::OutOfRange { axis, .. } = &mut self {
            *axis += offset;
        }
        self
    }
}

/// Shorthand `Result` type used throughout epq.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::InvalidArgument(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use epq_core::{ensure, errors::Error};
/// fn positive(x: f64) -> epq_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::InvalidArgument(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidArgument(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use epq_core::{fail, errors::Error};
/// fn always_err() -> epq_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
