//! Geometric primitives of a planar triangle mesh.
//!
//! Local vertex indices are 0-based throughout the crate.
//! Node ids are 1-based and map to galerkin rows through [`Point::dof`].

use crate::{mesh::NodeId, Coord, DofIdx};

use std::hash::{Hash, Hasher};

/// Tag of elements that belong to no physical group.
pub const UNTAGGED: i32 = -1;
/// Tag of segments that carry the homogeneous Dirichlet condition.
pub const DIRICHLET_TAG: i32 = 0;

/// A mesh node.
///
/// Identity is given by the id alone, two points with the same id
/// are the same node regardless of their coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Point {
  x: f64,
  y: f64,
  id: NodeId,
}
impl Point {
  pub fn new(x: f64, y: f64, id: NodeId) -> Self {
    Self { x, y, id }
  }

  pub fn x(&self) -> f64 {
    self.x
  }
  pub fn y(&self) -> f64 {
    self.y
  }
  pub fn coord(&self) -> Coord {
    Coord::new(self.x, self.y)
  }
  pub fn id(&self) -> NodeId {
    self.id
  }

  /// Row/column of this node in the galerkin system.
  ///
  /// # Panics
  /// If the id is 0. Meshes that passed [`Mesh::validate`](crate::mesh::Mesh::validate)
  /// only hold ids starting at 1.
  pub fn dof(&self) -> DofIdx {
    assert!(self.id > 0, "node ids start at 1");
    self.id - 1
  }

  pub fn dist(&self, other: &Point) -> f64 {
    (other.coord() - self.coord()).norm()
  }
}
impl PartialEq for Point {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}
impl Eq for Point {}
impl Hash for Point {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

/// Capabilities shared by the element kinds of the mesh.
pub trait MeshElement {
  const NVERTICES: usize;

  fn id(&self) -> usize;
  fn physical_tag(&self) -> i32;
  fn vertices(&self) -> &[Point];

  /// Measure of the element (length or area).
  fn area(&self) -> f64;
  /// Jacobian determinant of the map from the reference element.
  fn jac(&self) -> f64;

  /// The `ilocal`-th vertex.
  fn boundary(&self, ilocal: usize) -> &Point {
    assert!(
      ilocal < Self::NVERTICES,
      "local vertex {ilocal} out of range"
    );
    &self.vertices()[ilocal]
  }
}

/// A boundary edge of the mesh.
#[derive(Debug, Clone)]
pub struct Segment {
  vertices: [Point; 2],
  id: usize,
  physical_tag: i32,
}
impl Segment {
  pub fn new(vertices: [Point; 2], id: usize) -> Self {
    Self {
      vertices,
      id,
      physical_tag: UNTAGGED,
    }
  }
  pub fn with_physical_tag(mut self, physical_tag: i32) -> Self {
    self.physical_tag = physical_tag;
    self
  }

  pub fn length(&self) -> f64 {
    self.vertices[0].dist(&self.vertices[1])
  }
}
impl MeshElement for Segment {
  const NVERTICES: usize = 2;

  fn id(&self) -> usize {
    self.id
  }
  fn physical_tag(&self) -> i32 {
    self.physical_tag
  }
  fn vertices(&self) -> &[Point] {
    &self.vertices
  }
  fn area(&self) -> f64 {
    self.length()
  }
  // Only meaningful for 1D elements.
  fn jac(&self) -> f64 {
    self.length()
  }
}

/// A counter-clockwise oriented triangle of the mesh.
#[derive(Debug, Clone)]
pub struct Triangle {
  vertices: [Point; 3],
  id: usize,
  physical_tag: i32,
}
impl Triangle {
  pub fn new(vertices: [Point; 3], id: usize) -> Self {
    Self {
      vertices,
      id,
      physical_tag: UNTAGGED,
    }
  }
  pub fn with_physical_tag(mut self, physical_tag: i32) -> Self {
    self.physical_tag = physical_tag;
    self
  }

  /// Same triangle with the last two vertices swapped.
  pub fn flipped(&self) -> Self {
    let [a, b, c] = self.vertices;
    Self {
      vertices: [a, c, b],
      ..self.clone()
    }
  }

  pub fn coords(&self) -> [Coord; 3] {
    self.vertices.map(|p| p.coord())
  }

  pub fn edge_lengths(&self) -> [f64; 3] {
    let [a, b, c] = &self.vertices;
    [a.dist(b), b.dist(c), c.dist(a)]
  }

  /// Shoelace area, positive for counter-clockwise vertices.
  pub fn signed_area(&self) -> f64 {
    let [a, b, c] = self.coords();
    0.5 * (b - a).perp(&(c - a))
  }

  pub fn is_ccw(&self) -> bool {
    self.signed_area() > 0.0
  }

  pub fn contains_node(&self, id: NodeId) -> bool {
    self.vertices.iter().any(|p| p.id() == id)
  }
}
impl MeshElement for Triangle {
  const NVERTICES: usize = 3;

  fn id(&self) -> usize {
    self.id
  }
  fn physical_tag(&self) -> i32 {
    self.physical_tag
  }
  fn vertices(&self) -> &[Point] {
    &self.vertices
  }

  /// Heron's formula.
  ///
  /// NaN or zero for degenerate triangles.
  fn area(&self) -> f64 {
    let [l0, l1, l2] = self.edge_lengths();
    let s = 0.5 * (l0 + l1 + l2);
    (s * (s - l0) * (s - l1) * (s - l2)).sqrt()
  }

  fn jac(&self) -> f64 {
    2.0 * self.area()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  use approx::assert_relative_eq;
  use std::collections::HashSet;

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

  #[test]
  fn heron_matches_shoelace() {
    let trias = [
      triangle([[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]),
      triangle([[0.3, -1.2], [2.5, 0.4], [-0.7, 1.9]]),
      triangle([[10.0, 10.0], [10.5, 10.1], [10.2, 10.7]]),
    ];
    for t in &trias {
      assert_relative_eq!(t.area(), t.signed_area(), epsilon = 1e-10);
      assert_relative_eq!(t.jac(), 2.0 * t.area());
    }
  }

  #[test]
  fn degenerate_triangle_has_no_positive_area() {
    let t = triangle([[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
    let area = t.area();
    assert!(!(area > 1e-12), "area = {area}");
  }

  #[test]
  fn orientation() {
    let t = triangle([[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
    assert!(t.is_ccw());
    assert!(!t.flipped().is_ccw());
    assert_relative_eq!(t.flipped().area(), t.area());
  }

  #[test]
  fn segment_length_and_tag() {
    let s = Segment::new([Point::new(0.0, 0.0, 1), Point::new(3.0, 4.0, 2)], 7);
    assert_eq!(s.physical_tag(), UNTAGGED);
    assert_relative_eq!(s.area(), 5.0);
    assert_relative_eq!(s.jac(), 5.0);
    assert_eq!(s.boundary(1).id(), 2);
    let s = s.with_physical_tag(DIRICHLET_TAG);
    assert_eq!(s.physical_tag(), DIRICHLET_TAG);
  }

  #[test]
  fn point_identity_is_id() {
    let a = Point::new(0.0, 0.0, 4);
    let b = Point::new(9.0, 9.0, 4);
    let c = Point::new(0.0, 0.0, 5);
    assert_eq!(a, b);
    assert_ne!(a, c);
    let set: HashSet<_> = [a, b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
    assert_eq!(c.dof(), 4);
  }

  #[test]
  #[should_panic(expected = "node ids start at 1")]
  fn zero_id_has_no_dof() {
    Point::new(0.0, 0.0, 0).dof();
  }

  #[test]
  #[should_panic]
  fn boundary_out_of_range() {
    let t = triangle([[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
    t.boundary(3);
  }
}
