use trifem::{
  assemble::{mass_matrix, solve_poisson},
  config::Tolerance,
  fe::l2_norm,
  mesh::{factory, gmsh},
  FemConfig, FemError,
};

use std::f64::consts::PI;
use tracing::info;

/// Usage: `poisson_square [mesh.msh] [output.csv]`
fn main() -> Result<(), FemError> {
  tracing_subscriber::fmt::init();

  let mut args = std::env::args().skip(1);
  // Without a gmsh file, mesh the unit square [0, 1]^2.
  let mesh = match args.next() {
    Some(path) => gmsh::read_gmsh(path)?,
    None => factory::unit_square(32),
  };
  let output = args.next().unwrap_or_else(|| "solution.csv".to_string());

  // Gaussian bump centered in the square.
  let source = |x: f64, y: f64| (-((x - 0.5).powi(2) + (y - 0.5).powi(2))).exp() / PI.powi(2);

  // The absolute default tolerance is too coarse for evaluating on a 32x32 mesh.
  let config = FemConfig::default().with_tolerance(Tolerance::Relative(1e-9));
  let solution = solve_poisson(&mesh, source, &config)?;

  let coeffs = solution.coeffs();
  let mass = mass_matrix(&mesh)?;
  info!(
    "max = {:.6e}, min = {:.6e}, l2 norm = {:.6e}",
    coeffs.max(),
    coeffs.min(),
    l2_norm(coeffs, &mass)
  );
  info!("u(0.5, 0.5) = {:.6e}", solution.eval(0.5, 0.5));

  let grid = solution.sample_grid(64)?;
  grid.save_csv(&output)?;
  info!("wrote {} samples to {output}", grid.values.len());

  Ok(())
}
