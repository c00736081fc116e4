use crate::{
  geometry::{MeshElement, Triangle, DIRICHLET_TAG},
  linalg::SolverKind,
  quadrature::SUPPORTED_ORDER,
  shape::DEFAULT_EPSILON,
  FemError,
};

/// Tolerance of the point-in-triangle test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tolerance {
  /// Absolute bound on the edge cross products (twice a signed area).
  ///
  /// Scale dependent: the band around a triangle that still counts as
  /// inside grows like `eps / h` relative to the element size `h`. Once it
  /// reaches neighbouring triangles, evaluation picks up shape functions far
  /// outside their triangle and solution values become meaningless.
  /// Use [`Tolerance::Relative`] to evaluate on fine meshes.
  Absolute(f64),
  /// Bound on the barycentric coordinates, i.e. the cross products are
  /// compared against `r * |jac|` of the tested triangle.
  Relative(f64),
}
impl Tolerance {
  pub const DEFAULT: Self = Self::Absolute(DEFAULT_EPSILON);

  /// The absolute epsilon to use for `triangle`.
  pub fn epsilon_for(&self, triangle: &Triangle) -> f64 {
    match *self {
      Self::Absolute(eps) => eps,
      Self::Relative(r) => r * triangle.jac().abs(),
    }
  }

  fn value(&self) -> f64 {
    match *self {
      Self::Absolute(v) | Self::Relative(v) => v,
    }
  }
}
impl Default for Tolerance {
  fn default() -> Self {
    Self::DEFAULT
  }
}

/// Parameters of a Poisson solve.
#[derive(Debug, Clone)]
pub struct FemConfig {
  pub tolerance: Tolerance,
  pub quadrature_order: usize,
  pub solver: SolverKind,
  /// Segments with this physical tag carry the Dirichlet condition.
  pub dirichlet_tag: i32,
}
impl Default for FemConfig {
  fn default() -> Self {
    Self {
      tolerance: Tolerance::DEFAULT,
      quadrature_order: SUPPORTED_ORDER,
      solver: SolverKind::DenseLu,
      dirichlet_tag: DIRICHLET_TAG,
    }
  }
}
impl FemConfig {
  pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
    self.tolerance = tolerance;
    self
  }
  pub fn with_quadrature_order(mut self, order: usize) -> Self {
    self.quadrature_order = order;
    self
  }
  pub fn with_solver(mut self, solver: SolverKind) -> Self {
    self.solver = solver;
    self
  }
  pub fn with_dirichlet_tag(mut self, tag: i32) -> Self {
    self.dirichlet_tag = tag;
    self
  }

  pub fn validate(&self) -> Result<(), FemError> {
    let tol = self.tolerance.value();
    if !(tol.is_finite() && tol >= 0.0) {
      return Err(FemError::InvalidTolerance(tol));
    }
    if self.quadrature_order != SUPPORTED_ORDER {
      return Err(FemError::UnsupportedQuadratureOrder(self.quadrature_order));
    }
    Ok(())
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::geometry::Point;

  #[test]
  fn defaults() {
    let config = FemConfig::default();
    assert_eq!(config.tolerance, Tolerance::Absolute(0.01));
    assert_eq!(config.quadrature_order, 2);
    assert_eq!(config.dirichlet_tag, 0);
    config.validate().unwrap();
  }

  #[test]
  fn invalid_settings_are_rejected() {
    let config = FemConfig::default().with_quadrature_order(3);
    assert!(matches!(
      config.validate(),
      Err(FemError::UnsupportedQuadratureOrder(3))
    ));
    let config = FemConfig::default().with_tolerance(Tolerance::Relative(f64::NAN));
    assert!(matches!(config.validate(), Err(FemError::InvalidTolerance(_))));
  }

  #[test]
  fn relative_tolerance_scales_with_triangle() {
    let t = Triangle::new(
      [
        Point::new(0.0, 0.0, 1),
        Point::new(2.0, 0.0, 2),
        Point::new(0.0, 2.0, 3),
      ],
      0,
    );
    assert_eq!(Tolerance::Absolute(0.01).epsilon_for(&t), 0.01);
    approx::assert_relative_eq!(Tolerance::Relative(0.01).epsilon_for(&t), 0.04);
  }
}
