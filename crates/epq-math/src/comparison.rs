//! Floating-point comparison utilities.

use epq_core::Real;

/// Two abscissas closer than this fraction of the table range are treated
/// as the same point.
pub const DUPLICATE_TOLERANCE: Real = 1e-12;

/// Return `true` if `|a - b| <= n * epsilon` where `epsilon` is the
/// machine-epsilon relative to `max(|a|, |b|)`.
#[inline]
pub fn close_enough(a: Real, b: Real, n: u32) -> bool {
    if a == b {
        return true;
    }
    let eps = (a.abs().max(b.abs())) * Real::EPSILON * n as Real;
    (a - b).abs() <= eps
}

/// Return `true` if two abscissas of a table spanning `range` coincide for
/// interpolation purposes.
#[inline]
pub fn same_abscissa(a: Real, b: Real, range: Real) -> bool {
    a == b || (a - b).abs() <= DUPLICATE_TOLERANCE * range
}
