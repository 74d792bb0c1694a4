use faer::{Mat, mat};
use mincurv::{
    ConvergenceReport, FieldValues, GridAxes, GridInterpError, GridShape, InterpolatedField,
    SolveStatus, generate_random_points, min_curvature_interp,
    config::{RelaxationParams, SplineParams, SplineSolver},
    interpolant_config::{Drift, InterpolationMethod, MinCurvatureSettings, OutputShape},
    progress::{ProgressMsg, ProgressSink},
};
use std::sync::{Arc, Mutex};

fn four_corners() -> (Mat<f64>, Mat<f64>) {
    (
        mat![[0.0, 0.0], [10.0, 0.0], [0.0, 10.0], [10.0, 10.0]],
        mat![[1.0], [1.0], [1.0], [1.0]],
    )
}

fn spline_settings(grid_size: f64) -> MinCurvatureSettings {
    MinCurvatureSettings::builder(InterpolationMethod::Spline)
        .grid_size(grid_size)
        .build()
}

fn flattened(field: &InterpolatedField) -> Mat<f64> {
    field.values.to_flattened()
}

#[test]
fn four_corners_on_derived_axes_are_flat() {
    let (locations, values) = four_corners();
    let field = min_curvature_interp(&locations, &values, &GridAxes::derived(), &spline_settings(5.0)).unwrap();

    assert_eq!(field.grid.shape(), GridShape::TwoD(2, 2));
    assert_eq!(field.grid.axes(), &[vec![5.0, 10.0], vec![5.0, 10.0]]);
    assert!(field.is_converged());
    assert!(flattened(&field).col(0).iter().all(|v| (v - 1.0).abs() < 1e-3));
}

#[test]
fn four_corners_on_explicit_axes_are_flat() {
    let (locations, values) = four_corners();
    let axes = GridAxes::derived()
        .x(vec![0.0, 5.0, 10.0])
        .y(vec![0.0, 5.0, 10.0]);

    let field = min_curvature_interp(&locations, &values, &axes, &spline_settings(5.0)).unwrap();

    let FieldValues::Gridded(gridded) = &field.values else {
        panic!("reshaped output expected by default");
    };
    assert_eq!(gridded.shape(), GridShape::TwoD(3, 3));
    for ix in 0..3 {
        for iy in 0..3 {
            let value = gridded.get(0, &[ix, iy]).unwrap();
            assert!((value - 1.0).abs() < 1e-3, "({ix}, {iy}) -> {value}");
        }
    }
}

#[test]
fn spline_honours_samples_on_grid_nodes() {
    // Samples on a 5 x 4 lattice, gridded on the same lattice.
    let xs: Vec<f64> = vec![0.0, 3.0, 6.0, 9.0, 12.0];
    let ys = vec![0.0, 4.0, 8.0, 12.0];
    let locations = Mat::from_fn(20, 2, |i, j| match j {
        0 => xs[i % 5],
        _ => ys[i / 5],
    });
    let values = Mat::from_fn(20, 2, |i, c| {
        let (x, y) = (locations[(i, 0)], locations[(i, 1)]);
        match c {
            0 => (0.3 * x).sin() + 0.1 * y,
            _ => x * y / 50.0,
        }
    });
    let settings = MinCurvatureSettings::builder(InterpolationMethod::Spline)
        .grid_size(3.0)
        .spline_params(SplineParams {
            tolerance: 1e-10,
            ..SplineParams::default()
        })
        .build();
    let axes = GridAxes::derived().x(xs).y(ys);

    let field = min_curvature_interp(&locations, &values, &axes, &settings).unwrap();
    let gridded = flattened(&field);

    // Grid order is x fastest, matching the lattice construction above.
    for i in 0..20 {
        for c in 0..2 {
            assert!((gridded[(i, c)] - values[(i, c)]).abs() < 1e-6);
        }
    }
}

#[test]
fn single_sample_gives_constant_field() {
    let locations = mat![[3.0, 4.0]];
    let values = mat![[7.5]];
    let axes = GridAxes::derived()
        .x(vec![0.0, 5.0, 10.0])
        .y(vec![0.0, 5.0]);

    let field = min_curvature_interp(&locations, &values, &axes, &spline_settings(5.0)).unwrap();

    assert!(field.is_converged());
    assert!(flattened(&field).col(0).iter().all(|v| (v - 7.5).abs() < 1e-9));
}

#[test]
fn single_sample_cannot_derive_a_grid() {
    let err = min_curvature_interp(&mat![[3.0, 4.0]], &mat![[7.5]], &GridAxes::derived(), &spline_settings(5.0))
        .unwrap_err();
    assert!(matches!(err, GridInterpError::DegenerateGrid { .. }));
}

#[test]
fn bicgstab_matches_gmres() {
    let locations = Mat::from_fn(9, 2, |i, c| match c {
        0 => (i % 3) as f64,
        _ => (i / 3) as f64,
    });
    let values = Mat::from_fn(9, 1, |i, _| (i as f64 * 0.7).cos());
    let nodes = vec![0.0, 0.5, 1.0, 1.5, 2.0];
    let axes = GridAxes::derived().x(nodes.clone()).y(nodes);

    let solve = |solver| {
        let settings = MinCurvatureSettings::builder(InterpolationMethod::Spline)
            .grid_size(0.5)
            .drift(Drift::None)
            .spline_params(SplineParams {
                solver,
                tolerance: 1e-10,
                ..SplineParams::default()
            })
            .build();
        min_curvature_interp(&locations, &values, &axes, &settings).unwrap()
    };

    let gmres = solve(SplineSolver::Gmres);
    let bicgstab = solve(SplineSolver::BiCgStab);

    assert!(gmres.is_converged(), "{:?}", gmres.convergence);
    assert!(bicgstab.is_converged(), "{:?}", bicgstab.convergence);
    let (a, b) = (flattened(&gmres), flattened(&bicgstab));
    assert_eq!(a.nrows(), 25);
    for g in 0..a.nrows() {
        assert!((a[(g, 0)] - b[(g, 0)]).abs() < 1e-6);
    }
}

#[test]
fn singular_kernel_system_gives_a_finite_field() {
    let settings = MinCurvatureSettings::builder(InterpolationMethod::Spline)
        .grid_size(5.0)
        .drift(Drift::None)
        .build();
    let axes = GridAxes::derived().x(vec![0.0, 5.0]).y(vec![0.0, 5.0]);

    let field = min_curvature_interp(&mat![[3.0, 4.0]], &mat![[7.5]], &axes, &settings).unwrap();

    assert!(!field.is_converged());
    let ConvergenceReport::Spline(reports) = &field.convergence else {
        panic!("spline report expected");
    };
    assert_eq!(reports[0].status, SolveStatus::Breakdown);
    assert!(reports[0].relative_residual.is_finite());
    assert!(flattened(&field).col(0).iter().all(|v| v.is_finite()));
}

#[test]
fn iteration_cap_is_surfaced_not_raised() {
    let unit = generate_random_points(60, 2, Some(4));
    let locations = Mat::from_fn(60, 2, |i, j| 100.0 * unit[(i, j)]);
    let values = Mat::from_fn(60, 1, |i, _| locations[(i, 0)].sqrt());
    let settings = MinCurvatureSettings::builder(InterpolationMethod::Spline)
        .grid_size(20.0)
        .spline_params(SplineParams {
            tolerance: 1e-14,
            max_iterations: 3,
            ..SplineParams::default()
        })
        .build();

    let field = min_curvature_interp(&locations, &values, &GridAxes::derived(), &settings).unwrap();

    assert!(!field.is_converged());
    let ConvergenceReport::Spline(reports) = &field.convergence else {
        panic!("spline report expected");
    };
    assert_eq!(reports[0].status, SolveStatus::MaxIterationsReached);
    assert_eq!(reports[0].iterations, 3);
}

#[test]
fn relaxation_requires_max_iterations() {
    let (locations, values) = four_corners();
    let settings = MinCurvatureSettings::builder(InterpolationMethod::Relaxation)
        .grid_size(5.0)
        .build();

    let err = min_curvature_interp(&locations, &values, &GridAxes::derived(), &settings).unwrap_err();
    assert!(matches!(err, GridInterpError::Configuration { .. }));
}

#[test]
fn mismatched_counts_are_rejected() {
    let (locations, _) = four_corners();
    let values = mat![[1.0], [1.0], [1.0]];

    let err = min_curvature_interp(&locations, &values, &GridAxes::derived(), &spline_settings(5.0)).unwrap_err();
    assert!(matches!(err, GridInterpError::DimensionMismatch { .. }));
}

#[test]
fn y_axis_needs_two_dimensional_samples() {
    let locations = mat![[0.0], [10.0]];
    let values = mat![[1.0], [2.0]];
    let axes = GridAxes::derived().y(vec![0.0, 1.0]);

    let err = min_curvature_interp(&locations, &values, &axes, &spline_settings(5.0)).unwrap_err();
    assert!(matches!(err, GridInterpError::DimensionMismatch { .. }));
}

#[test]
fn unknown_method_name_is_a_configuration_error() {
    assert_eq!(" Relaxation ".parse::<InterpolationMethod>(), Ok(InterpolationMethod::Relaxation));
    assert!(matches!(
        "kriging".parse::<InterpolationMethod>(),
        Err(GridInterpError::Configuration { .. })
    ));
}

#[test]
fn relaxation_stops_at_the_iteration_cap() {
    let locations = mat![[0.0, 0.0], [40.0, 0.0], [0.0, 40.0], [40.0, 40.0], [20.0, 20.0]];
    let values = mat![[1.0], [2.0], [3.0], [4.0], [10.0]];
    let settings = MinCurvatureSettings::builder(InterpolationMethod::Relaxation)
        .grid_size(5.0)
        .max_iterations(6)
        .build();

    let field = min_curvature_interp(&locations, &values, &GridAxes::derived(), &settings).unwrap();

    match field.convergence {
        ConvergenceReport::Relaxation {
            iterations,
            residual,
            converged,
        } => {
            assert_eq!(iterations, 6);
            assert!(residual > 1e-5);
            assert!(!converged);
        }
        other => panic!("unexpected report {other:?}"),
    }
    assert_eq!(field.grid.shape(), GridShape::TwoD(8, 8));
}

#[test]
fn relaxation_without_iterations_is_the_nearest_sample_field() {
    let locations = mat![[0.0], [10.0], [20.0]];
    let values = mat![[1.0], [2.0], [3.0]];
    let settings = MinCurvatureSettings::builder(InterpolationMethod::Relaxation)
        .grid_size(4.0)
        .max_iterations(0)
        .output_shape(OutputShape::Flattened)
        .build();

    let field = min_curvature_interp(&locations, &values, &GridAxes::derived(), &settings).unwrap();

    // Derived axis 4, 8, 12, 16, 20.
    assert_eq!(field.grid.axes(), &[vec![4.0, 8.0, 12.0, 16.0, 20.0]]);
    assert_eq!(field.values, FieldValues::Flattened(mat![[1.0], [2.0], [2.0], [3.0], [3.0]]));
}

#[test]
fn normalized_relaxation_converges_on_constant_data() {
    let locations = mat![[0.0, 0.0, 0.0], [9.0, 0.0, 3.0], [0.0, 9.0, 6.0], [9.0, 9.0, 9.0]];
    let values = mat![[2.0, -1.0], [2.0, -1.0], [2.0, -1.0], [2.0, -1.0]];
    let settings = MinCurvatureSettings::builder(InterpolationMethod::Relaxation)
        .grid_size(3.0)
        .max_iterations(100)
        .relaxation_params(RelaxationParams {
            normalize_smoothing: true,
            ..RelaxationParams::default()
        })
        .build();

    let field = min_curvature_interp(&locations, &values, &GridAxes::derived(), &settings).unwrap();

    assert!(field.is_converged());
    assert_eq!(field.grid.shape(), GridShape::ThreeD(3, 3, 3));
    let out = flattened(&field);
    assert!(out.col(0).iter().all(|v| (v - 2.0).abs() < 1e-9));
    assert!(out.col(1).iter().all(|v| (v + 1.0).abs() < 1e-9));
}

#[test]
fn output_shapes_hold_the_same_values() {
    let (locations, values) = four_corners();
    let values = Mat::from_fn(4, 2, |i, c| values[(i, 0)] + (i * (c + 1)) as f64);
    let axes = GridAxes::derived().x(vec![2.0, 4.0, 6.0]).y(vec![1.0, 9.0]);

    let reshaped = min_curvature_interp(&locations, &values, &axes, &spline_settings(5.0)).unwrap();
    let settings = MinCurvatureSettings::builder(InterpolationMethod::Spline)
        .grid_size(5.0)
        .output_shape(OutputShape::Flattened)
        .build();
    let flat = min_curvature_interp(&locations, &values, &axes, &settings).unwrap();

    let FieldValues::Flattened(flat_values) = &flat.values else {
        panic!("flattened output requested");
    };
    assert_eq!(flat_values.shape(), (6, 2));
    assert_eq!(&reshaped.values.to_flattened(), flat_values);

    let FieldValues::Gridded(gridded) = &reshaped.values else {
        panic!("reshaped output expected");
    };
    // Point (ix = 1, iy = 1) is row 1 + 3 * 1 of the flattened grid.
    assert_eq!(gridded.get(1, &[1, 1]), Some(flat_values[(4, 1)]));
}

#[test]
fn linear_drift_reproduces_a_plane() {
    let unit = generate_random_points(25, 2, Some(77));
    let locations = Mat::from_fn(25, 2, |i, j| 20.0 * unit[(i, j)]);
    let values = Mat::from_fn(25, 1, |i, _| 5.0 + 0.5 * locations[(i, 0)] - 0.25 * locations[(i, 1)]);
    let settings = MinCurvatureSettings::builder(InterpolationMethod::Spline)
        .drift(Drift::Linear)
        .spline_params(SplineParams {
            tolerance: 1e-12,
            ..SplineParams::default()
        })
        .build();
    let axes = GridAxes::derived().x(vec![5.0, 10.0, 15.0]).y(vec![5.0, 15.0]);

    let field = min_curvature_interp(&locations, &values, &axes, &settings).unwrap();
    let out = flattened(&field);
    let points = field.grid.points();

    for g in 0..points.nrows() {
        let expected = 5.0 + 0.5 * points[(g, 0)] - 0.25 * points[(g, 1)];
        assert!((out[(g, 0)] - expected).abs() < 1e-6);
    }
}

#[derive(Debug, Default)]
struct RecordingSink {
    messages: Mutex<Vec<ProgressMsg>>,
}

impl ProgressSink for RecordingSink {
    fn emit(&self, msg: ProgressMsg) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(msg);
        }
    }
}

#[test]
fn progress_is_reported_for_both_methods() {
    let (locations, values) = four_corners();
    let sink = Arc::new(RecordingSink::default());

    let settings = MinCurvatureSettings::builder(InterpolationMethod::Spline)
        .grid_size(5.0)
        .progress_callback(sink.clone())
        .build();
    min_curvature_interp(&locations, &values, &GridAxes::derived(), &settings).unwrap();

    let settings = MinCurvatureSettings::builder(InterpolationMethod::Relaxation)
        .grid_size(5.0)
        .max_iterations(3)
        .progress_callback(sink.clone())
        .build();
    min_curvature_interp(&locations, &values, &GridAxes::derived(), &settings).unwrap();

    let messages = sink.messages.lock().unwrap();
    assert!(messages.iter().any(|m| matches!(m, ProgressMsg::SolverIteration { channel: 0, .. })));
    assert_eq!(
        messages
            .iter()
            .filter(|m| matches!(m, ProgressMsg::RelaxationIteration { max_iterations: 3, .. }))
            .count(),
        3
    );
}
