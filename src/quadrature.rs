use crate::{fe::ref_to_phys, geometry::Triangle, Coord, FemError};

use once_cell::sync::Lazy;

/// The only implemented quadrature order.
pub const SUPPORTED_ORDER: usize = 2;

/// A quadrature rule defined on the reference triangle,
/// in the parametric coordinates $(eta, nu)$.
#[derive(Debug, Clone)]
pub struct QuadRule {
  nodes: Vec<[f64; 2]>,
  weights: Vec<f64>,
}

/// Symmetric 3 point rule, exact for polynomials of degree 2.
static DEGREE2: Lazy<QuadRule> = Lazy::new(|| QuadRule {
  nodes: vec![
    [1.0 / 6.0, 1.0 / 6.0],
    [4.0 / 6.0, 1.0 / 6.0],
    [1.0 / 6.0, 4.0 / 6.0],
  ],
  weights: vec![1.0 / 6.0; 3],
});

/// A quadrature sample mapped onto a physical triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadPoint {
  pub eta: f64,
  pub nu: f64,
  pub weight: f64,
  pub coord: Coord,
}

impl QuadRule {
  pub fn for_order(order: usize) -> Result<&'static QuadRule, FemError> {
    match order {
      SUPPORTED_ORDER => Ok(Lazy::force(&DEGREE2)),
      _ => Err(FemError::UnsupportedQuadratureOrder(order)),
    }
  }

  pub fn npoints(&self) -> usize {
    self.weights.len()
  }
  pub fn weights(&self) -> &[f64] {
    &self.weights
  }

  /// Samples of the rule on `triangle`.
  pub fn points(&self, triangle: &Triangle) -> Vec<QuadPoint> {
    self
      .nodes
      .iter()
      .zip(&self.weights)
      .map(|(&[eta, nu], &weight)| QuadPoint {
        eta,
        nu,
        weight,
        coord: ref_to_phys(triangle, eta, nu),
      })
      .collect()
  }

  /// $sum_q omega_q f(eta_q, nu_q)$, integral of `f` over the reference triangle.
  pub fn apply_ref<F>(&self, f: F) -> f64
  where
    F: Fn(f64, f64) -> f64,
  {
    self
      .nodes
      .iter()
      .zip(&self.weights)
      .map(|(&[eta, nu], w)| w * f(eta, nu))
      .sum()
  }

  /// Integral of `f` over the physical `triangle`.
  pub fn apply<F>(&self, f: F, triangle: &Triangle) -> f64
  where
    F: Fn(&Coord) -> f64,
  {
    use crate::geometry::MeshElement as _;
    triangle.jac().abs()
      * self
        .points(triangle)
        .iter()
        .map(|q| q.weight * f(&q.coord))
        .sum::<f64>()
  }
}

/// The degree 2 samples of `triangle`, rejecting any other order.
pub fn gauss_point(triangle: &Triangle, order: usize) -> Result<Vec<QuadPoint>, FemError> {
  Ok(QuadRule::for_order(order)?.points(triangle))
}
