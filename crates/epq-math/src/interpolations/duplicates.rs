//! Repair of duplicate abscissas in measured tables.
//!
//! Real-world tables (detector efficiencies, window transmissions) often
//! contain samples that share an abscissa.  Rather than rejecting them, the
//! table is repaired before the spline is built:
//!
//! - identical `(x, y)` samples are collapsed to one;
//! - under [`DuplicatePolicy::Average`] the distinct ordinates of a run are
//!   replaced by their mean;
//! - under [`DuplicatePolicy::Separate`] the samples are spread over a window
//!   `separation_fraction · range` wide centred on the shared abscissa.  The
//!   order in which the ordinates are laid out is chosen so that, together
//!   with up to two neighbouring samples on each side, the sequence changes
//!   direction as rarely as possible.
//!
//! The layout rule is a heuristic; it makes no claim of optimality beyond
//! being deterministic and independent of the order of equal-abscissa input.
//! Every repair is logged at `warn` level and returned as a [`Repair`].

use epq_core::{DuplicatePolicy, Real};

use crate::comparison::{close_enough, same_abscissa};

/// What was done to a run of samples sharing an abscissa.
#[derive(Debug, Clone, PartialEq)]
pub enum RepairAction {
    /// Identical samples were dropped; one survives.
    Dropped {
        /// Number of samples removed.
        count: usize,
    },
    /// Distinct ordinates were replaced by their mean.
    Averaged {
        /// The mean ordinate.
        y: Real,
    },
    /// Samples were moved apart; `positions[k]` is the new abscissa of the
    /// sample with ordinate `ordinates[k]` in the enclosing [`Repair`].
    Separated {
        /// New abscissas, ascending.
        positions: Vec<Real>,
    },
}

/// One repaired run of duplicate abscissas.
#[derive(Debug, Clone, PartialEq)]
pub struct Repair {
    /// The shared abscissa.
    pub x: Real,
    /// The distinct ordinates of the run, in their final layout order.
    pub ordinates: Vec<Real>,
    /// Caller-side indices of the samples in the run.
    pub original_indices: Vec<usize>,
    /// The correction applied.
    pub action: RepairAction,
}

/// A sorted table after duplicate repair.
#[derive(Debug, Clone, Default)]
pub(crate) struct RepairedTable {
    pub xs: Vec<Real>,
    pub ys: Vec<Real>,
    pub indices: Vec<usize>,
    pub repairs: Vec<Repair>,
}

/// A run of equal abscissas with its distinct ordinates.
#[derive(Debug)]
struct Run {
    x: Real,
    ys: Vec<Real>,
    /// Index of the sample that survives for each entry of `ys`.
    keep: Vec<usize>,
    all: Vec<usize>,
    dropped: usize,
}

impl Run {
    fn representative(&self) -> Real {
        self.ys.iter().sum::<Real>() / self.ys.len() as Real
    }
}

/// Repair a table sorted by ascending abscissa.
///
/// `indices[i]` is the caller-side index of sample `i`.
pub(crate) fn repair(
    xs: &[Real],
    ys: &[Real],
    indices: &[usize],
    policy: DuplicatePolicy,
    separation_fraction: Real,
) -> RepairedTable {
    let n = xs.len();
    if n == 0 {
        return RepairedTable::default();
    }
    let range = xs[n - 1] - xs[0];
    let runs = group_runs(xs, ys, indices, range);

    let mut out = RepairedTable {
        xs: Vec::with_capacity(n),
        ys: Vec::with_capacity(n),
        indices: Vec::with_capacity(n),
        repairs: Vec::new(),
    };

    for (r, run) in runs.iter().enumerate() {
        if run.all.len() == 1 {
            out.push(run.x, run.ys[0], run.keep[0]);
            continue;
        }

        if run.ys.len() == 1 {
            log::warn!(
                "dropping {} repeated sample(s) at x = {} (y = {})",
                run.dropped,
                run.x,
                run.ys[0]
            );
            out.push(run.x, run.ys[0], run.keep[0]);
            out.repairs.push(Repair {
                x: run.x,
                ordinates: run.ys.clone(),
                original_indices: run.all.clone(),
                action: RepairAction::Dropped { count: run.dropped },
            });
            continue;
        }

        match policy {
            DuplicatePolicy::Average => {
                let mut sorted = run.ys.clone();
                sorted.sort_by(Real::total_cmp);
                let y = sorted.iter().sum::<Real>() / sorted.len() as Real;
                log::warn!(
                    "averaging {} ordinates {:?} at duplicate abscissa x = {} to y = {}",
                    sorted.len(),
                    sorted,
                    run.x,
                    y
                );
                out.push(run.x, y, run.keep[0]);
                out.repairs.push(Repair {
                    x: run.x,
                    ordinates: sorted,
                    original_indices: run.all.clone(),
                    action: RepairAction::Averaged { y },
                });
            }
            DuplicatePolicy::Separate => {
                let layout = layout_order(&runs, r);
                let positions = spread(&runs, r, range * separation_fraction);
                let ordinates: Vec<Real> = layout.iter().map(|&k| run.ys[k]).collect();
                log::warn!(
                    "separating duplicate abscissa x = {}: ordinates {:?} moved to {:?}",
                    run.x,
                    ordinates,
                    positions
                );
                if collapsed(&positions) {
                    log::warn!(
                        "separation of x = {} is below the floating-point resolution there \
                         ({:?}); the repaired table still holds a zero-width interval",
                        run.x,
                        positions
                    );
                }
                for (&k, &p) in layout.iter().zip(positions.iter()) {
                    out.push(p, run.ys[k], run.keep[k]);
                }
                out.repairs.push(Repair {
                    x: run.x,
                    ordinates,
                    original_indices: run.all.clone(),
                    action: RepairAction::Separated { positions },
                });
            }
        }
    }

    out
}

impl RepairedTable {
    fn push(&mut self, x: Real, y: Real, index: usize) {
        self.xs.push(x);
        self.ys.push(y);
        self.indices.push(index);
    }
}

fn group_runs(xs: &[Real], ys: &[Real], indices: &[usize], range: Real) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::with_capacity(xs.len());
    for i in 0..xs.len() {
        if let Some(run) = runs.last_mut() {
            if same_abscissa(run.x, xs[i], range) {
                run.all.push(indices[i]);
                if run.ys.iter().any(|&y| close_enough(y, ys[i], 4)) {
                    run.dropped += 1;
                } else {
                    run.ys.push(ys[i]);
                    run.keep.push(indices[i]);
                }
                continue;
            }
        }
        runs.push(Run {
            x: xs[i],
            ys: vec![ys[i]],
            keep: vec![indices[i]],
            all: vec![indices[i]],
            dropped: 0,
        });
    }
    runs
}

/// Choose the left-to-right order of the ordinates of run `r`.
///
/// Candidates are ascending and descending order.  The one producing fewer
/// direction changes with the two neighbouring runs on each side wins; ties
/// go to the smaller jump into the immediate neighbours, then to ascending.
fn layout_order(runs: &[Run], r: usize) -> Vec<usize> {
    let ys = &runs[r].ys;
    let mut ascending: Vec<usize> = (0..ys.len()).collect();
    ascending.sort_by(|&a, &b| ys[a].total_cmp(&ys[b]));
    let descending: Vec<usize> = ascending.iter().rev().copied().collect();

    let left: Vec<Real> = runs[r.saturating_sub(2)..r]
        .iter()
        .map(Run::representative)
        .collect();
    let right: Vec<Real> = runs[r + 1..(r + 3).min(runs.len())]
        .iter()
        .map(Run::representative)
        .collect();

    let score = |order: &[usize]| -> (usize, Real) {
        let seq: Vec<Real> = left
            .iter()
            .copied()
            .chain(order.iter().map(|&k| ys[k]))
            .chain(right.iter().copied())
            .collect();
        let jump = left.last().map_or(0.0, |&l| (l - ys[order[0]]).abs())
            + right
                .first()
                .map_or(0.0, |&rt| (ys[order[order.len() - 1]] - rt).abs());
        (direction_changes(&seq), jump)
    };

    let (asc_turns, asc_jump) = score(&ascending);
    let (desc_turns, desc_jump) = score(&descending);
    if desc_turns < asc_turns || (desc_turns == asc_turns && desc_jump < asc_jump) {
        descending
    } else {
        ascending
    }
}

fn direction_changes(seq: &[Real]) -> usize {
    let mut changes = 0;
    let mut last_sign = 0.0;
    for w in seq.windows(2) {
        let d = w[1] - w[0];
        if d == 0.0 {
            continue;
        }
        let sign = d.signum();
        if last_sign != 0.0 && sign != last_sign {
            changes += 1;
        }
        last_sign = sign;
    }
    changes
}

/// New abscissas for the ordinates of run `r`, ascending.
///
/// The total spread is `width`, reduced so that no point moves more than a
/// third of the gap towards a neighbouring run.  At a table edge the outer
/// sample stays put so the tabulated domain is unchanged.
///
/// When `|x|` is so large relative to `width` that `x ± width / 2` rounds
/// back to `x`, the positions coincide; see [`collapsed`].
fn spread(runs: &[Run], r: usize, width: Real) -> Vec<Real> {
    let x = runs[r].x;
    let m = runs[r].ys.len();
    let gap_left = (r > 0).then(|| x - runs[r - 1].x);
    let gap_right = runs.get(r + 1).map(|next| next.x - x);

    let (start, end) = match (gap_left, gap_right) {
        (Some(gl), Some(gr)) => {
            let half = (0.5 * width).min(gl / 3.0).min(gr / 3.0);
            (x - half, x + half)
        }
        (None, Some(gr)) => (x, x + width.min(gr / 3.0)),
        (Some(gl), None) => (x - width.min(gl / 3.0), x),
        (None, None) => (x, x + width),
    };

    let step = (end - start) / (m - 1) as Real;
    (0..m)
        .map(|k| match k {
            0 => start,
            k if k == m - 1 => end,
            k => start + step * k as Real,
        })
        .collect()
}

/// `true` if rounding left two neighbouring positions equal (or reversed).
fn collapsed(positions: &[Real]) -> bool {
    positions.windows(2).any(|w| w[1] <= w[0])
}
