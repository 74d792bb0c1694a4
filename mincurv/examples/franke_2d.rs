use faer::Mat;
use mincurv::{
    GridAxes, generate_random_points, min_curvature_interp,
    interpolant_config::{InterpolationMethod, MinCurvatureSettings},
    progress::{ProgressMsg, closure_sink},
};
use tracing_subscriber::EnvFilter;

/// Franke's bivariate test function on `[0, 1]^2`.
fn franke(x: f64, y: f64) -> f64 {
    let term1 = 0.75 * (-((9.0 * x - 2.0).powi(2) + (9.0 * y - 2.0).powi(2)) / 4.0).exp();
    let term2 = 0.75 * (-((9.0 * x + 1.0).powi(2) / 49.0 + (9.0 * y + 1.0) / 10.0)).exp();
    let term3 = 0.5 * (-((9.0 * x - 7.0).powi(2) + (9.0 * y - 3.0).powi(2)) / 4.0).exp();
    let term4 = -0.2 * (-(9.0 * x - 4.0).powi(2) - (9.0 * y - 7.0).powi(2)).exp();
    term1 + term2 + term3 + term4
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mincurv=info".parse()?))
        .init();

    // Scattered samples in [0, 100]^2
    let unit = generate_random_points(200, 2, Some(42));
    let points = Mat::from_fn(unit.nrows(), 2, |i, j| 100.0 * unit[(i, j)]);
    let values = Mat::from_fn(points.nrows(), 1, |i, _| {
        franke(points[(i, 0)] / 100.0, points[(i, 1)] / 100.0)
    });

    let (sink, listener) = closure_sink(256, |msg| {
        if let ProgressMsg::SolverIteration { iter, residual, .. } = msg {
            if iter % 25 == 0 {
                println!("iteration {iter:>4}: relative residual {residual:.3e}");
            }
        }
    });

    let settings = MinCurvatureSettings::builder(InterpolationMethod::Spline)
        .grid_size(2.0)
        .progress_callback(sink)
        .build();

    let field = min_curvature_interp(&points, &values, &GridAxes::derived(), &settings)?;

    println!(
        "gridded {} points on a {:?} grid, converged: {}",
        points.nrows(),
        field.grid.shape(),
        field.is_converged()
    );

    // Dropping the settings releases the last sink so the listener can finish.
    drop(settings);
    listener.join().ok();

    Ok(())
}
