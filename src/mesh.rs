pub mod factory;
pub mod gmsh;

use crate::{
  geometry::{MeshElement, Point, Segment, Triangle},
  Coord, FemError,
};

use itertools::Itertools;
use tracing::debug;

/// 1-based id of a mesh node.
pub type NodeId = usize;

/// Relative area below which a triangle counts as degenerate.
const DEGENERACY_TOL: f64 = 1e-12;

/// A planar triangle mesh.
///
/// Populated once by an importer or a factory, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
  points: Vec<Point>,
  segments: Vec<Segment>,
  triangles: Vec<Triangle>,
}

impl Mesh {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_parts(points: Vec<Point>, segments: Vec<Segment>, triangles: Vec<Triangle>) -> Self {
    Self {
      points,
      segments,
      triangles,
    }
  }

  pub fn push_point(&mut self, point: Point) {
    self.points.push(point);
  }
  pub fn push_segment(&mut self, segment: Segment) {
    self.segments.push(segment);
  }
  pub fn push_triangle(&mut self, triangle: Triangle) {
    self.triangles.push(triangle);
  }

  pub fn points(&self) -> &[Point] {
    &self.points
  }
  pub fn segments(&self) -> &[Segment] {
    &self.segments
  }
  pub fn triangles(&self) -> &[Triangle] {
    &self.triangles
  }

  pub fn npoints(&self) -> usize {
    self.points.len()
  }
  pub fn nsegments(&self) -> usize {
    self.segments.len()
  }
  pub fn ntriangles(&self) -> usize {
    self.triangles.len()
  }

  pub fn point(&self, id: NodeId) -> Option<&Point> {
    self.points.iter().find(|p| p.id() == id)
  }

  pub fn segments_with_tag(&self, physical_tag: i32) -> impl Iterator<Item = &Segment> {
    self
      .segments
      .iter()
      .filter(move |s| s.physical_tag() == physical_tag)
  }

  /// Endpoints of all segments carrying `physical_tag`, sorted and unique.
  pub fn dirichlet_nodes(&self, physical_tag: i32) -> Vec<NodeId> {
    self
      .segments_with_tag(physical_tag)
      .flat_map(|s| s.vertices().iter().map(|p| p.id()))
      .sorted_unstable()
      .dedup()
      .collect()
  }

  /// Axis aligned bounding box `(min, max)` of all points.
  pub fn bounding_box(&self) -> Option<(Coord, Coord)> {
    let (xmin, xmax) = self
      .points
      .iter()
      .map(|p| p.x())
      .minmax_by(f64::total_cmp)
      .into_option()?;
    let (ymin, ymax) = self
      .points
      .iter()
      .map(|p| p.y())
      .minmax_by(f64::total_cmp)
      .into_option()?;
    Some((Coord::new(xmin, ymin), Coord::new(xmax, ymax)))
  }

  /// Checks the guarantees the assembly relies on.
  ///
  /// Node ids must be exactly `1..=npoints`, every element must reference
  /// known nodes, segments must have positive length and triangles must have
  /// positive area and counter-clockwise vertices.
  pub fn validate(&self) -> Result<(), FemError> {
    let npoints = self.npoints();
    let mut seen = vec![false; npoints];
    for p in &self.points {
      let id = p.id();
      if id == 0 || id > npoints {
        return Err(FemError::NodeIdOutOfRange { id, npoints });
      }
      if std::mem::replace(&mut seen[id - 1], true) {
        return Err(FemError::DuplicateNodeId(id));
      }
    }

    for s in &self.segments {
      self.check_element_nodes(s)?;
      let length = s.area();
      if !(length > 0.0 && length.is_finite()) {
        return Err(FemError::DegenerateSegment { id: s.id(), length });
      }
    }

    for t in &self.triangles {
      self.check_element_nodes(t)?;
      check_triangle(t)?;
    }

    debug!(
      "validated mesh with {} points, {} segments, {} triangles",
      npoints,
      self.nsegments(),
      self.ntriangles()
    );
    Ok(())
  }

  fn check_element_nodes<E: MeshElement>(&self, element: &E) -> Result<(), FemError> {
    let npoints = self.npoints();
    for p in element.vertices() {
      if p.id() == 0 || p.id() > npoints {
        return Err(FemError::UnknownNode {
          element: element.id(),
          id: p.id(),
        });
      }
    }
    Ok(())
  }
}

/// Rejects degenerate and clockwise triangles.
pub fn check_triangle(t: &Triangle) -> Result<(), FemError> {
  let area = t.area();
  let scale = t
    .edge_lengths()
    .into_iter()
    .fold(0.0, f64::max)
    .powi(2);
  if !(area.is_finite() && area > DEGENERACY_TOL * scale) {
    return Err(FemError::DegenerateTriangle { id: t.id(), area });
  }
  if !t.is_ccw() {
    return Err(FemError::ClockwiseTriangle { id: t.id() });
  }
  Ok(())
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::geometry::DIRICHLET_TAG;

  fn square() -> Mesh {
    factory::unit_square(1)
  }

  #[test]
  fn square_is_valid() {
    let mesh = square();
    assert_eq!(mesh.npoints(), 4);
    assert_eq!(mesh.ntriangles(), 2);
    assert_eq!(mesh.nsegments(), 4);
    mesh.validate().unwrap();
    assert_eq!(mesh.dirichlet_nodes(DIRICHLET_TAG), vec![1, 2, 3, 4]);
    let (min, max) = mesh.bounding_box().unwrap();
    assert_eq!(min, Coord::new(0.0, 0.0));
    assert_eq!(max, Coord::new(1.0, 1.0));
  }

  #[test]
  fn duplicate_ids_are_rejected() {
    let mesh = Mesh::from_parts(
      vec![Point::new(0.0, 0.0, 1), Point::new(1.0, 0.0, 1)],
      vec![],
      vec![],
    );
    assert!(matches!(mesh.validate(), Err(FemError::DuplicateNodeId(1))));
  }

  #[test]
  fn out_of_range_ids_are_rejected() {
    let mesh = Mesh::from_parts(vec![Point::new(0.0, 0.0, 0)], vec![], vec![]);
    assert!(matches!(
      mesh.validate(),
      Err(FemError::NodeIdOutOfRange { id: 0, npoints: 1 })
    ));
  }

  #[test]
  fn clockwise_triangle_is_rejected() {
    let mut mesh = square();
    let flipped = mesh.triangles[0].flipped();
    mesh.triangles[0] = flipped;
    assert!(matches!(
      mesh.validate(),
      Err(FemError::ClockwiseTriangle { .. })
    ));
  }

  #[test]
  fn collinear_triangle_is_rejected() {
    let points = vec![
      Point::new(0.0, 0.0, 1),
      Point::new(1.0, 1.0, 2),
      Point::new(2.0, 2.0, 3),
    ];
    let tria = Triangle::new([points[0], points[1], points[2]], 0);
    let mesh = Mesh::from_parts(points, vec![], vec![tria]);
    assert!(matches!(
      mesh.validate(),
      Err(FemError::DegenerateTriangle { id: 0, .. })
    ));
  }

  #[test]
  fn empty_mesh_has_no_bounding_box() {
    assert!(Mesh::new().bounding_box().is_none());
  }
}
