//! End-to-end tests of Lagrange interpolation on uniform and non-uniform
//! grids, and of the function-object tree.

use approx::assert_abs_diff_eq;
use epq_core::{Error, Real};
use epq_math::interpolations::lagrange::{locate, non_uniform, uniform};
use epq_math::{
    CubicSpline1D, FnInterpolation, InterpolationFunction, InterpolationNd,
    NonUniformLagrangeGrid, UniformLagrangeGrid,
};
use proptest::prelude::*;

#[test]
fn uniform_quadratic_is_exact() {
    let squares = [0.0, 1.0, 4.0, 9.0, 16.0];
    let (y, _) = uniform::d1(&squares, 0.0, 1.0, 2, 2.5).unwrap();
    assert_abs_diff_eq!(y, 6.25, epsilon = 1e-12);
}

#[test]
fn both_families_extrapolate_from_edge_window() {
    let squares = [0.0, 1.0, 4.0, 9.0, 16.0];
    let (y, _) = uniform::d1(&squares, 0.0, 1.0, 2, 6.0).unwrap();
    assert_abs_diff_eq!(y, 36.0, epsilon = 1e-10);
    let (y, _) = uniform::d1(&squares, 0.0, 1.0, 2, -1.0).unwrap();
    assert_abs_diff_eq!(y, 1.0, epsilon = 1e-10);

    let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
    let (y, _) = non_uniform::d1(&xs, &squares, 2, 6.0).unwrap();
    assert_abs_diff_eq!(y, 36.0, epsilon = 1e-10);
}

#[test]
fn order_bounds_are_enforced() {
    let values = [0.0, 1.0, 4.0, 9.0];
    let xs = [0.0, 1.0, 2.0, 3.0];
    for order in [0, values.len()] {
        assert!(matches!(
            uniform::d1(&values, 0.0, 1.0, order, 1.5),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            non_uniform::d1(&xs, &values, order, 1.5),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            InterpolationFunction::from_samples(xs.to_vec(), values.to_vec(), order),
            Err(Error::InvalidArgument(_))
        ));
    }
    assert!(uniform::d1(&values, 0.0, 1.0, values.len() - 1, 1.5).is_ok());
}

#[test]
fn uniform_rejects_zero_spacing() {
    assert!(matches!(
        uniform::d1(&[1.0, 2.0, 3.0], 0.0, 0.0, 1, 0.5),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn uniform_and_non_uniform_agree_on_regular_grids() {
    let x0: Vec<Real> = (0..6).map(|i| 1.0 + 0.5 * i as Real).collect();
    let x1: Vec<Real> = (0..5).map(|j| -2.0 + 0.25 * j as Real).collect();
    let table: Vec<Vec<Real>> = x0
        .iter()
        .map(|&a| x1.iter().map(|&b| (a * b).sin() + a).collect())
        .collect();
    for order in 1..=4 {
        for p in [[1.3, -1.9], [2.6, -1.1], [3.4, -1.0]] {
            let (u, _) = uniform::d2(&table, [1.0, -2.0], [0.5, 0.25], order, p).unwrap();
            let (n, _) = non_uniform::d2([&x0, &x1], &table, order, p).unwrap();
            assert_abs_diff_eq!(u, n, epsilon = 1e-10);
        }
    }
}

#[test]
fn grids_reproduce_their_samples_in_three_dimensions() {
    let axes = vec![vec![0.0, 0.4, 1.0, 1.8], vec![2.0, 1.0, 0.5], vec![-1.0, 0.0, 3.0, 4.0, 4.5]];
    let f = |p: &[Real]| p[0] * p[0] - 3.0 * p[1] + p[0] * p[2];
    let mut values = Vec::new();
    for &a in &axes[0] {
        for &b in &axes[1] {
            for &c in &axes[2] {
                values.push(f(&[a, b, c]));
            }
        }
    }
    let grid = NonUniformLagrangeGrid::new(axes.clone(), values.clone(), 2).unwrap();
    let tree = InterpolationFunction::from_grid(&axes, &values, 2).unwrap();
    for &a in &axes[0] {
        for &b in &axes[1] {
            for &c in &axes[2] {
                let p = [a, b, c];
                assert_abs_diff_eq!(grid.interpolate(&p).unwrap(), f(&p), epsilon = 1e-9);
                assert_abs_diff_eq!(tree.interpolate(&p).unwrap(), f(&p), epsilon = 1e-9);
            }
        }
    }
    // Quadratic in every variable: exact away from the nodes too.
    let p = [0.7, 1.3, 2.2];
    assert_abs_diff_eq!(grid.interpolate(&p).unwrap(), f(&p), epsilon = 1e-9);
}

#[test]
fn uniform_four_dimensional() {
    let n = 4;
    let f = |i: Real, j: Real, k: Real, l: Real| i + 2.0 * j - k * l;
    let table: Vec<Vec<Vec<Vec<Real>>>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    (0..n)
                        .map(|k| {
                            (0..n)
                                .map(|l| {
                                    f(
                                        0.1 * i as Real,
                                        0.1 * j as Real,
                                        0.1 * k as Real,
                                        0.1 * l as Real,
                                    )
                                })
                                .collect()
                        })
                        .collect()
                })
                .collect()
        })
        .collect();
    let (y, _) = uniform::d4(&table, [0.0; 4], [0.1; 4], 2, [0.15, 0.05, 0.22, 0.27]).unwrap();
    assert_abs_diff_eq!(y, f(0.15, 0.05, 0.22, 0.27), epsilon = 1e-10);

    let grid = UniformLagrangeGrid::new(
        vec![0.0; 4],
        vec![0.1; 4],
        vec![n; 4],
        table.iter().flatten().flatten().flatten().copied().collect(),
        2,
    )
    .unwrap();
    assert_abs_diff_eq!(
        grid.interpolate(&[0.15, 0.05, 0.22, 0.27]).unwrap(),
        y,
        epsilon = 1e-14
    );
}

#[test]
fn mixed_tree_of_splines_and_closures() {
    // f(t, x) = t + spline_t(x), where each child is a spline in x.
    let xs = [0.0, 1.0, 2.0, 3.0];
    let children: Vec<Box<dyn InterpolationNd>> = (0..3)
        .map(|i| {
            let t = i as Real;
            let ys: Vec<Real> = xs.iter().map(|&x| t + 2.0 * x).collect();
            let spline = CubicSpline1D::new(&xs, &ys).unwrap();
            Box::new(FnInterpolation::new(1, move |p: &[Real]| spline.interpolate(p[0])))
                as Box<dyn InterpolationNd>
        })
        .collect();
    let f = InterpolationFunction::from_functions(vec![0.0, 1.0, 2.0], children, 2).unwrap();
    assert_abs_diff_eq!(f.interpolate(&[0.5, 1.5]).unwrap(), 3.5, epsilon = 1e-12);

    // Children are splines, so the inner coordinate does not extrapolate.
    match f.interpolate(&[0.5, 7.0]) {
        Err(Error::OutOfRange { value, .. }) => assert_eq!(value, 7.0),
        other => panic!("expected OutOfRange, got {other:?}"),
    }
}

#[test]
fn non_finite_queries_are_rejected() {
    let xs = [0.0, 1.0, 2.0];
    let ys = [0.0, 1.0, 4.0];
    assert!(matches!(
        non_uniform::d1(&xs, &ys, 1, Real::NAN),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        uniform::d1(&ys, 0.0, 1.0, 1, Real::INFINITY),
        Err(Error::InvalidArgument(_))
    ));
}

proptest! {
    #[test]
    fn window_always_fits(
        n in 2usize..30,
        order_frac in 0.0..1.0f64,
        x in -10.0..40.0f64,
        descending in any::<bool>(),
    ) {
        let mut xs: Vec<Real> = (0..n).map(|i| i as Real * 1.3).collect();
        if descending {
            xs.reverse();
        }
        let order = 1 + ((n - 2) as Real * order_frac) as usize;
        let first = locate(x, &xs, order).unwrap();
        prop_assert!(first + order < n);
    }

    #[test]
    fn lagrange_reproduces_samples(
        ys in prop::collection::vec(-100.0..100.0f64, 3..12),
        order in 1usize..4,
    ) {
        let order = order.min(ys.len() - 1);
        let xs: Vec<Real> = (0..ys.len()).map(|i| (i as Real).powf(1.3)).collect();
        for (i, &y) in ys.iter().enumerate() {
            let (u, _) = uniform::d1(&ys, 0.0, 1.0, order, i as Real).unwrap();
            let (v, _) = non_uniform::d1(&xs, &ys, order, xs[i]).unwrap();
            prop_assert!((u - y).abs() <= 1e-9 * (1.0 + y.abs()));
            prop_assert!((v - y).abs() <= 1e-9 * (1.0 + y.abs()));
        }
    }
}
