//! Local linear shape functions of physical triangles.

use crate::{
  config::Tolerance,
  geometry::{MeshElement, Triangle},
  Coord, FemError,
};

/// Default absolute tolerance of [`is_point_in_triangle`].
pub const DEFAULT_EPSILON: f64 = 0.01;

/// Cross product $(p_2 - p_1) times (p_3 - p_1)$.
///
/// Positive if `p1, p2, p3` turn counter-clockwise.
pub fn sign(p1: &Coord, p2: &Coord, p3: &Coord) -> f64 {
  (p2 - p1).perp(&(p3 - p1))
}

/// Half-plane test of `point` against the edges of `triangle`.
///
/// The point is outside only if it lies strictly beyond `epsilon` on both
/// sides of some edges. Points on an edge, within `epsilon` of it, and
/// any point tested against a triangle collapsed to within `epsilon` are inside.
pub fn is_point_in_triangle(point: &Coord, triangle: &Triangle, epsilon: f64) -> bool {
  let [a, b, c] = triangle.coords();
  let d = [sign(point, &a, &b), sign(point, &b, &c), sign(point, &c, &a)];

  let has_neg = d.iter().any(|&di| di < -epsilon);
  let has_pos = d.iter().any(|&di| di > epsilon);
  !(has_neg && has_pos)
}

/// The affine function of a triangle that is one on vertex `ilocal`
/// and zero on the other vertices, cut off outside the triangle.
#[derive(Debug, Clone)]
pub struct ShapeFunction {
  /// Plane coefficients `(a, b, c)` of `a x + b y + c`.
  coeffs: na::Vector3<f64>,
  triangle: Triangle,
  epsilon: f64,
}
impl ShapeFunction {
  pub fn new(triangle: &Triangle, ilocal: usize, tolerance: Tolerance) -> Result<Self, FemError> {
    assert!(ilocal < 3, "local vertex {ilocal} out of range");

    let [p0, p1, p2] = triangle.coords();
    #[rustfmt::skip]
    let mat = na::Matrix3::new(
      p0.x, p0.y, 1.0,
      p1.x, p1.y, 1.0,
      p2.x, p2.y, 1.0,
    );
    let rhs = na::Vector3::ith(ilocal, 1.0);

    let singular = || FemError::SingularShapeSystem {
      triangle: triangle.id(),
      ilocal,
    };
    if mat.determinant() == 0.0 {
      return Err(singular());
    }
    let coeffs = mat
      .lu()
      .solve(&rhs)
      .filter(|c| c.iter().all(|v| v.is_finite()))
      .ok_or_else(singular)?;

    Ok(Self {
      coeffs,
      triangle: triangle.clone(),
      epsilon: tolerance.epsilon_for(triangle),
    })
  }

  pub fn triangle(&self) -> &Triangle {
    &self.triangle
  }
  pub fn coeffs(&self) -> &na::Vector3<f64> {
    &self.coeffs
  }

  /// Constant gradient inside the triangle.
  pub fn gradient(&self) -> na::Vector2<f64> {
    na::Vector2::new(self.coeffs[0], self.coeffs[1])
  }

  pub fn contains(&self, coord: &Coord) -> bool {
    is_point_in_triangle(coord, &self.triangle, self.epsilon)
  }

  /// The affine plane, without the cut off.
  pub fn eval_affine(&self, coord: &Coord) -> f64 {
    self.coeffs[0] * coord.x + self.coeffs[1] * coord.y + self.coeffs[2]
  }

  pub fn eval_coord(&self, coord: &Coord) -> f64 {
    if self.contains(coord) {
      self.eval_affine(coord)
    } else {
      0.0
    }
  }

  pub fn eval(&self, x: f64, y: f64) -> f64 {
    self.eval_coord(&Coord::new(x, y))
  }
}

/// Shape function of vertex `ilocal` with the default tolerance.
pub fn get_shape_functions(triangle: &Triangle, ilocal: usize) -> Result<ShapeFunction, FemError> {
  ShapeFunction::new(triangle, ilocal, Tolerance::DEFAULT)
}

/// All three shape functions of a triangle, in local vertex order.
pub fn local_shape_functions(
  triangle: &Triangle,
  tolerance: Tolerance,
) -> Result<[ShapeFunction; 3], FemError> {
  Ok([
    ShapeFunction::new(triangle, 0, tolerance)?,
    ShapeFunction::new(triangle, 1, tolerance)?,
    ShapeFunction::new(triangle, 2, tolerance)?,
  ])
}
