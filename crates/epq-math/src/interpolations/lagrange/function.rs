//! Non-uniform Lagrange interpolation as a tree of function objects.
//!
//! An `N`-variable [`InterpolationFunction`] holds the abscissas of its first
//! variable and one `(N-1)`-variable child per abscissa.  Evaluating it
//! selects `order + 1` children with [`locate`], evaluates each at the
//! remaining coordinates and runs Neville's algorithm across the results.
//! The recursion bottoms out at one-variable leaves holding sampled values.
//!
//! Children are any [`InterpolationNd`], so a tree may mix tabulated leaves
//! with splines or closures ([`FnInterpolation`]).  For the same table the
//! results equal those of [`NonUniformLagrangeGrid`](super::NonUniformLagrangeGrid).

use std::fmt;

use epq_core::{errors::Result, Real};

use super::{ensure_finite, ensure_monotonic, ensure_order, locate, neville::neville};
use crate::interpolations::InterpolationNd;

#[derive(Debug)]
enum Node {
    Samples(Vec<Real>),
    Children(Vec<Box<dyn InterpolationNd>>),
}

/// Lagrange interpolation of arbitrary dimension built from function objects.
#[derive(Debug)]
pub struct InterpolationFunction {
    abscissas: Vec<Real>,
    order: usize,
    dimension: usize,
    node: Node,
}

impl InterpolationFunction {
    /// One-variable interpolation of `values[i] = f(abscissas[i])`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`](epq_core::Error::InvalidArgument) on
    /// a length mismatch, non-monotonic abscissas, or an order outside
    /// `1..=n - 1`.
    pub fn from_samples(abscissas: Vec<Real>, values: Vec<Real>, order: usize) -> Result<Self> {
        epq_core::ensure!(
            abscissas.len() == values.len(),
            "abscissas ({}) and values ({}) differ in length",
            abscissas.len(),
            values.len()
        );
        validate_axis(&abscissas, order)?;
        Ok(Self {
            abscissas,
            order,
            dimension: 1,
            node: Node::Samples(values),
        })
    }

    /// `(N+1)`-variable interpolation from one `N`-variable function per
    /// abscissa of the new first variable.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`](epq_core::Error::InvalidArgument)
    /// if the child count differs from the abscissa count, the children
    /// disagree on their dimension, or the axis/order is invalid.
    pub fn from_functions(
        abscissas: Vec<Real>,
        children: Vec<Box<dyn InterpolationNd>>,
        order: usize,
    ) -> Result<Self> {
        epq_core::ensure!(
            abscissas.len() == children.len(),
            "{} abscissas but {} child functions",
            abscissas.len(),
            children.len()
        );
        validate_axis(&abscissas, order)?;
        let inner = children[0].dimension();
        epq_core::ensure!(inner >= 1, "child functions must take at least one variable");
        for (i, c) in children.iter().enumerate() {
            epq_core::ensure!(
                c.dimension() == inner,
                "child {i} takes {} variables, child 0 takes {inner}",
                c.dimension()
            );
        }
        Ok(Self {
            abscissas,
            order,
            dimension: inner + 1,
            node: Node::Children(children),
        })
    }

    /// Build the tree for a row-major table on the grid `axes`, axis 0
    /// outermost.
    pub fn from_grid(axes: &[Vec<Real>], values: &[Real], order: usize) -> Result<Self> {
        epq_core::ensure!(!axes.is_empty(), "a grid needs at least one axis");
        let expected: usize = axes.iter().map(Vec::len).product();
        epq_core::ensure!(
            values.len() == expected,
            "grid needs {expected} values, got {}",
            values.len()
        );
        for (k, axis) in axes.iter().enumerate() {
            ensure_order(order, axis.len(), k)?;
            ensure_monotonic(axis, k)?;
        }
        if axes.len() == 1 {
            return Self::from_samples(axes[0].clone(), values.to_vec(), order);
        }
        let stride = expected / axes[0].len();
        let children = values
            .chunks(stride)
            .map(|slice| {
                Self::from_grid(&axes[1..], slice, order)
                    .map(|f| Box::new(f) as Box<dyn InterpolationNd>)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_functions(axes[0].clone(), children, order)
    }

    /// Number of variables.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Interpolation order along the first variable.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Interpolated value and the error estimate of the first variable.
    pub fn evaluate_with_error(&self, point: &[Real]) -> Result<(Real, Real)> {
        epq_core::ensure!(
            point.len() == self.dimension,
            "expected {} coordinates, got {}",
            self.dimension,
            point.len()
        );
        ensure_finite(point)?;
        let x = point[0];
        let first = locate(x, &self.abscissas, self.order)?;
        let window = first..=first + self.order;
        let xs = &self.abscissas[window.clone()];
        match &self.node {
            Node::Samples(values) => neville(xs, &values[window], x),
            Node::Children(children) => {
                let samples = window
                    .map(|j| children[j].interpolate(&point[1..]).map_err(|e| e.in_slice(j)))
                    .collect::<Result<Vec<Real>>>()?;
                neville(xs, &samples, x)
            }
        }
    }
}

impl InterpolationNd for InterpolationFunction {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn interpolate(&self, point: &[Real]) -> Result<Real> {
        self.evaluate_with_error(point).map(|(v, _)| v)
    }
}

fn validate_axis(abscissas: &[Real], order: usize) -> Result<()> {
    ensure_order(order, abscissas.len(), 0)?;
    ensure_monotonic(abscissas, 0)
}

/// Adapts a closure of `dimension` variables to [`InterpolationNd`].
pub struct FnInterpolation<F> {
    dimension: usize,
    f: F,
}

impl<F> FnInterpolation<F>
where
    F: Fn(&[Real]) -> Result<Real>,
{
    /// Wrap `f`, which will always be called with `dimension` coordinates.
    pub fn new(dimension: usize, f: F) -> Self {
        Self { dimension, f }
    }
}

impl<F> fmt::Debug for FnInterpolation<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInterpolation")
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl<F> InterpolationNd for FnInterpolation<F>
where
    F: Fn(&[Real]) -> Result<Real>,
{
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn interpolate(&self, point: &[Real]) -> Result<Real> {
        epq_core::ensure!(
            point.len() == self.dimension,
            "expected {} coordinates, got {}",
            self.dimension,
            point.len()
        );
        (self.f)(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolations::lagrange::{non_uniform, NonUniformLagrangeGrid};
    use approx::assert_abs_diff_eq;
    use epq_core::Error;

    #[test]
    fn leaf_matches_one_dimensional_routine() {
        let xs = vec![0.0, 0.4, 1.0, 2.2, 3.0];
        let ys: Vec<Real> = xs.iter().map(|x: &Real| x.cos()).collect();
        let f = InterpolationFunction::from_samples(xs.clone(), ys.clone(), 3).unwrap();
        for &x in &[0.1, 1.5, 2.9, 3.5] {
            assert_eq!(
                f.evaluate_with_error(&[x]).unwrap(),
                non_uniform::d1(&xs, &ys, 3, x).unwrap()
            );
        }
    }

    #[test]
    fn tree_matches_grid_in_three_dimensions() {
        let axes = vec![
            vec![0.0, 0.5, 1.5, 2.0],
            vec![3.0, 2.0, 1.0, 0.0],
            vec![-1.0, 0.0, 0.25, 1.0, 2.0],
        ];
        let values: Vec<Real> = (0..4 * 4 * 5).map(|i| ((i * 7) % 13) as Real).collect();
        let tree = InterpolationFunction::from_grid(&axes, &values, 2).unwrap();
        let grid = NonUniformLagrangeGrid::new(axes, values, 2).unwrap();
        assert_eq!(tree.dimension(), 3);
        for p in [[0.7, 1.2, 0.1], [2.5, -0.5, 1.9], [0.0, 3.0, -1.0]] {
            assert_eq!(
                tree.evaluate_with_error(&p).unwrap(),
                grid.interpolate_with_error(&p).unwrap()
            );
        }
    }

    #[test]
    fn five_variables() {
        let axis = vec![0.0, 1.0, 2.0];
        let axes = vec![axis; 5];
        let mut values = Vec::new();
        for i in 0..243usize {
            let mut rest = i;
            let mut sum = 0.0;
            for _ in 0..5 {
                sum += (rest % 3) as Real;
                rest /= 3;
            }
            values.push(sum);
        }
        let f = InterpolationFunction::from_grid(&axes, &values, 1).unwrap();
        assert_eq!(f.dimension(), 5);
        let p = [0.5, 1.25, 1.5, 0.0, 2.0];
        assert_abs_diff_eq!(f.interpolate(&p).unwrap(), p.iter().sum::<Real>(), epsilon = 1e-12);
    }

    #[test]
    fn closures_as_children() {
        let children: Vec<Box<dyn InterpolationNd>> = (0..4)
            .map(|i| {
                let a = i as Real;
                Box::new(FnInterpolation::new(1, move |p: &[Real]| Ok(a * a + p[0])))
                    as Box<dyn InterpolationNd>
            })
            .collect();
        let f = InterpolationFunction::from_functions(vec![0.0, 1.0, 2.0, 3.0], children, 2)
            .unwrap();
        assert_eq!(f.dimension(), 2);
        assert_abs_diff_eq!(f.interpolate(&[1.5, 10.0]).unwrap(), 12.25, epsilon = 1e-12);
    }

    #[test]
    fn child_errors_carry_slice() {
        let children: Vec<Box<dyn InterpolationNd>> = (0..3)
            .map(|i| {
                Box::new(FnInterpolation::new(1, move |_: &[Real]| {
                    if i == 1 {
                        Err(Error::DegenerateData {
                            lo: 0,
                            x: 0.0,
                            slice: Default::default(),
                        })
                    } else {
                        Ok(0.0)
                    }
                })) as Box<dyn InterpolationNd>
            })
            .collect();
        let f = InterpolationFunction::from_functions(vec![0.0, 1.0, 2.0], children, 1).unwrap();
        match f.interpolate(&[0.5, 0.0]).unwrap_err() {
            Error::DegenerateData { slice, .. } => assert_eq!(slice.indices(), &[1]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn construction_errors() {
        assert!(InterpolationFunction::from_samples(vec![0.0, 1.0], vec![0.0], 1).is_err());
        assert!(InterpolationFunction::from_samples(vec![0.0, 1.0, 2.0], vec![0.0; 3], 3).is_err());
        assert!(InterpolationFunction::from_samples(vec![0.0, 1.0, 2.0], vec![0.0; 3], 0).is_err());
        let mixed: Vec<Box<dyn InterpolationNd>> = vec![
            Box::new(FnInterpolation::new(1, |_: &[Real]| Ok(0.0))),
            Box::new(FnInterpolation::new(2, |_: &[Real]| Ok(0.0))),
        ];
        assert!(InterpolationFunction::from_functions(vec![0.0, 1.0], mixed, 1).is_err());
        let f = InterpolationFunction::from_samples(vec![0.0, 1.0], vec![0.0, 1.0], 1).unwrap();
        assert!(f.interpolate(&[0.5, 0.5]).is_err());
    }

    #[test]
    fn grid_with_empty_or_short_axis_is_rejected() {
        let err = InterpolationFunction::from_grid(&[vec![0.0, 1.0, 2.0], vec![]], &[], 1);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
        let short = InterpolationFunction::from_grid(&[vec![0.0, 1.0], vec![0.0]], &[0.0, 0.0], 1);
        assert!(matches!(short, Err(Error::InvalidArgument(_))));
        let flat = InterpolationFunction::from_grid(&[vec![0.0, 1.0], vec![]], &[], 1);
        assert!(matches!(flat, Err(Error::InvalidArgument(_))));
    }
}
