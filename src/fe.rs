//! Reference element, element matrices and element vectors of the
//! linear Lagrange element on triangles.

use crate::{
  config::Tolerance,
  geometry::{MeshElement, Triangle},
  mesh::check_triangle,
  quadrature::QuadRule,
  shape::{local_shape_functions, ShapeFunction},
  Coord, FemError,
};

pub type ElMat = na::Matrix3<f64>;
pub type ElVec = na::Vector3<f64>;

pub trait ElmatProvider {
  fn eval(&self, triangle: &Triangle) -> Result<ElMat, FemError>;
}
impl<F> ElmatProvider for F
where
  F: Fn(&Triangle) -> Result<ElMat, FemError>,
{
  fn eval(&self, triangle: &Triangle) -> Result<ElMat, FemError> {
    self(triangle)
  }
}

pub trait ElvecProvider {
  fn eval(&self, triangle: &Triangle) -> Result<ElVec, FemError>;
}
impl<F> ElvecProvider for F
where
  F: Fn(&Triangle) -> Result<ElVec, FemError>,
{
  fn eval(&self, triangle: &Triangle) -> Result<ElVec, FemError> {
    self(triangle)
  }
}

/// Reference barycentric coordinate functions.
///
/// $psi_0 = 1 - eta - nu$, $psi_1 = eta$, $psi_2 = nu$.
pub fn psi(eta: f64, nu: f64, i: usize) -> f64 {
  match i {
    0 => 1.0 - eta - nu,
    1 => eta,
    2 => nu,
    _ => panic!("reference shape function {i} does not exist"),
  }
}

/// The constant gradients of the reference barycentric coordinate functions.
pub fn grad_phi(i: usize) -> na::Vector2<f64> {
  match i {
    0 => na::Vector2::new(-1.0, -1.0),
    1 => na::Vector2::new(1.0, 0.0),
    2 => na::Vector2::new(0.0, 1.0),
    _ => panic!("reference shape function {i} does not exist"),
  }
}

/// Image of the parametric point $(eta, nu)$ in the physical triangle.
pub fn ref_to_phys(triangle: &Triangle, eta: f64, nu: f64) -> Coord {
  let coords = triangle.coords();
  let x = (0..3)
    .map(|k| psi(eta, nu, k) * coords[k].coords)
    .sum::<na::Vector2<f64>>();
  Coord::from(x)
}

/// Shape function `i` of `triangle` evaluated at the image of $(eta, nu)$.
pub fn phi_ref(triangle: &Triangle, eta: f64, nu: f64, i: usize) -> Result<f64, FemError> {
  let phi = ShapeFunction::new(triangle, i, Tolerance::DEFAULT)?;
  Ok(phi.eval_coord(&ref_to_phys(triangle, eta, nu)))
}

/// Transposed inverse of the reference map Jacobian.
///
/// Maps reference gradients to physical gradients.
pub fn inv_jacobian_transpose(triangle: &Triangle) -> na::Matrix2<f64> {
  let [p1, p2, p3] = triangle.coords();
  #[rustfmt::skip]
  let m = na::Matrix2::new(
    p3.y - p1.y, p1.y - p2.y,
    p1.x - p3.x, p2.x - p1.x,
  );
  m / triangle.jac()
}

/// Exact element matrix of the mass bilinear form.
pub fn mass_elmat(triangle: &Triangle) -> Result<ElMat, FemError> {
  check_triangle(triangle)?;

  #[rustfmt::skip]
  let pattern = na::Matrix3::new(
    2.0, 1.0, 1.0,
    1.0, 2.0, 1.0,
    1.0, 1.0, 2.0,
  );
  Ok(triangle.area().abs() / 12.0 * pattern)
}

/// Exact element matrix of the Laplacian (stiffness) bilinear form.
///
/// $A_(i j) = |K| nabla phi_j^T B^T B nabla phi_i$
pub fn stiffness_elmat(triangle: &Triangle) -> Result<ElMat, FemError> {
  check_triangle(triangle)?;

  let bp = inv_jacobian_transpose(triangle);
  let metric = bp.transpose() * bp;
  let area = triangle.area();

  let mut elmat = ElMat::zeros();
  for i in 0..3 {
    for j in 0..3 {
      elmat[(i, j)] = area * grad_phi(j).dot(&(metric * grad_phi(i)));
    }
  }
  Ok(elmat)
}

/// Element Vector Provider for a scalar source function.
///
/// $b_k = |J| sum_q omega_q f(x_q) phi_k(x_q)$
pub struct LoadElvec<F> {
  source: F,
  rule: &'static QuadRule,
  tolerance: Tolerance,
}
impl<F> LoadElvec<F>
where
  F: Fn(f64, f64) -> f64,
{
  pub fn new(source: F, rule: &'static QuadRule, tolerance: Tolerance) -> Self {
    Self {
      source,
      rule,
      tolerance,
    }
  }
}
impl<F> ElvecProvider for LoadElvec<F>
where
  F: Fn(f64, f64) -> f64,
{
  fn eval(&self, triangle: &Triangle) -> Result<ElVec, FemError> {
    check_triangle(triangle)?;
    let phis = local_shape_functions(triangle, self.tolerance)?;

    let mut elvec = ElVec::zeros();
    for q in self.rule.points(triangle) {
      let f = (self.source)(q.coord.x, q.coord.y);
      for (k, phi) in phis.iter().enumerate() {
        elvec[k] += q.weight * f * phi.eval_coord(&q.coord);
      }
    }
    Ok(triangle.jac().abs() * elvec)
  }
}

/// Discrete $L^2$ norm $sqrt(u^T M u)$ of a coefficient vector.
pub fn l2_norm(coeffs: &na::DVector<f64>, mass: &nas::CsrMatrix<f64>) -> f64 {
  (mass * coeffs).dot(coeffs).max(0.0).sqrt()
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{geometry::Point, quadrature::SUPPORTED_ORDER};

  use approx::assert_relative_eq;

  fn triangle(coords: [[f64; 2]; 3]) -> Triangle {
    let [a, b, c] = coords;
    Triangle::new(
      [
        Point::new(a[0], a[1], 1),
        Point::new(b[0], b[1], 2),
        Point::new(c[0], c[1], 3),
      ],
      0,
    )
  }

  fn ref_triangle() -> Triangle {
    triangle([[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]])
  }

  #[test]
  fn psi_partition_of_unity() {
    for eta in [0.0, 0.1, 0.25, 0.7, 1.0] {
      for nu in [0.0, 0.2, 0.5, 0.9] {
        let sum: f64 = (0..3).map(|i| psi(eta, nu, i)).sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-15);
      }
    }
    let grad_sum: na::Vector2<f64> = (0..3).map(grad_phi).sum();
    assert_eq!(grad_sum, na::Vector2::zeros());
  }

  #[test]
  #[should_panic]
  fn psi_rejects_index() {
    psi(0.1, 0.1, 3);
  }

  #[test]
  fn reference_map_hits_vertices() {
    let t = triangle([[1.0, 2.0], [4.0, 2.5], [2.0, 5.0]]);
    let [a, b, c] = t.coords();
    assert_eq!(ref_to_phys(&t, 0.0, 0.0), a);
    assert_eq!(ref_to_phys(&t, 1.0, 0.0), b);
    assert_eq!(ref_to_phys(&t, 0.0, 1.0), c);
  }

  #[test]
  fn phi_ref_is_psi() {
    let t = triangle([[1.0, 2.0], [4.0, 2.5], [2.0, 5.0]]);
    for [eta, nu] in [[1.0 / 6.0, 1.0 / 6.0], [0.5, 0.25], [0.1, 0.8]] {
      for i in 0..3 {
        assert_relative_eq!(
          phi_ref(&t, eta, nu, i).unwrap(),
          psi(eta, nu, i),
          epsilon = 1e-12
        );
      }
    }
  }

  #[test]
  fn mass_refcell() {
    let computed = mass_elmat(&ref_triangle()).unwrap();
    #[rustfmt::skip]
    let expected = na::Matrix3::new(
      1.0/12.0, 1.0/24.0, 1.0/24.0,
      1.0/24.0, 1.0/12.0, 1.0/24.0,
      1.0/24.0, 1.0/24.0, 1.0/12.0,
    );
    assert_relative_eq!(computed, expected, epsilon = 1e-15);
  }

  #[test]
  fn mass_rejects_degenerate() {
    let t = triangle([[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
    assert!(matches!(
      mass_elmat(&t),
      Err(FemError::DegenerateTriangle { .. })
    ));
  }

  #[test]
  fn stiffness_refcell() {
    let computed = stiffness_elmat(&ref_triangle()).unwrap();
    #[rustfmt::skip]
    let expected = na::Matrix3::new(
       1.0, -0.5, -0.5,
      -0.5,  0.5,  0.0,
      -0.5,  0.0,  0.5,
    );
    assert_relative_eq!(computed, expected, epsilon = 1e-14);
  }

  #[test]
  fn stiffness_matches_physical_gradients() {
    let t = triangle([[0.3, -1.2], [2.5, 0.4], [-0.7, 1.9]]);
    let computed = stiffness_elmat(&t).unwrap();
    let phis = local_shape_functions(&t, Tolerance::DEFAULT).unwrap();
    for i in 0..3 {
      for j in 0..3 {
        let expected = t.area() * phis[i].gradient().dot(&phis[j].gradient());
        assert_relative_eq!(computed[(i, j)], expected, epsilon = 1e-12);
      }
    }
    assert_relative_eq!(computed, computed.transpose(), epsilon = 1e-14);
    for row in computed.row_iter() {
      assert_relative_eq!(row.sum(), 0.0, epsilon = 1e-12);
    }
  }

  #[test]
  fn stiffness_is_scale_invariant() {
    let small = triangle([[0.0, 0.0], [1.0, 0.2], [0.3, 0.9]]);
    let large = triangle([[0.0, 0.0], [10.0, 2.0], [3.0, 9.0]]);
    assert_relative_eq!(
      stiffness_elmat(&small).unwrap(),
      stiffness_elmat(&large).unwrap(),
      epsilon = 1e-12
    );
  }

  #[test]
  fn stiffness_rejects_degenerate() {
    let t = triangle([[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
    assert!(matches!(
      stiffness_elmat(&t),
      Err(FemError::DegenerateTriangle { .. })
    ));
  }

  #[test]
  fn load_of_constant_source() {
    let t = triangle([[1.0, 2.0], [4.0, 2.5], [2.0, 5.0]]);
    let rule = QuadRule::for_order(SUPPORTED_ORDER).unwrap();
    let elvec = LoadElvec::new(|_, _| 3.0, rule, Tolerance::DEFAULT)
      .eval(&t)
      .unwrap();
    // Each shape function integrates to a third of the area.
    for k in 0..3 {
      assert_relative_eq!(elvec[k], 3.0 * t.area() / 3.0, epsilon = 1e-12);
    }
  }

  #[test]
  fn load_of_linear_source() {
    let t = ref_triangle();
    let rule = QuadRule::for_order(SUPPORTED_ORDER).unwrap();
    let elvec = LoadElvec::new(|x, _| x, rule, Tolerance::DEFAULT)
      .eval(&t)
      .unwrap();
    // int x psi_k over the reference triangle, exact for degree 2.
    assert_relative_eq!(elvec[0], 1.0 / 24.0, epsilon = 1e-14);
    assert_relative_eq!(elvec[1], 1.0 / 12.0, epsilon = 1e-14);
    assert_relative_eq!(elvec[2], 1.0 / 24.0, epsilon = 1e-14);
  }
}
