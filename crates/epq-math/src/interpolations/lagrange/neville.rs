//! Neville's algorithm.

use epq_core::{errors::Result, Real};

/// Value at `x` of the polynomial through `(xa[i], ya[i])`, with an error
/// estimate equal to the last correction added.
///
/// The tableau is walked along the path closest to `x`, so the estimate
/// starts from the nearest sample.
///
/// # Errors
/// Returns [`Error::InvalidArgument`](epq_core::Error::InvalidArgument) if
/// two abscissas coincide.
pub(crate) fn neville(xa: &[Real], ya: &[Real], x: Real) -> Result<(Real, Real)> {
    let n = xa.len();
    debug_assert_eq!(n, ya.len());
    debug_assert!(n >= 1);

    let mut ns = 0;
    let mut dif = (x - xa[0]).abs();
    for (i, &xi) in xa.iter().enumerate().skip(1) {
        let dift = (x - xi).abs();
        if dift < dif {
            ns = i;
            dif = dift;
        }
    }

    let mut c = ya.to_vec();
    let mut d = ya.to_vec();
    let mut y = ya[ns];
    // Position in the current column; -1 once the path has left the top.
    let mut ns = ns as isize - 1;
    let mut dy = 0.0;

    for m in 1..n {
        for i in 0..n - m {
            let ho = xa[i] - x;
            let hp = xa[i + m] - x;
            let den = ho - hp;
            epq_core::ensure!(
                den != 0.0,
                "identical abscissas {} at window positions {i} and {}",
                xa[i],
                i + m
            );
            let w = (c[i + 1] - d[i]) / den;
            d[i] = hp * w;
            c[i] = ho * w;
        }
        dy = if 2 * (ns + 1) < (n - m) as isize {
            c[(ns + 1) as usize]
        } else {
            let v = d[ns as usize];
            ns -= 1;
            v
        };
        y += dy;
    }

    Ok((y, dy))
}
