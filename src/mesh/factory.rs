use super::{Mesh, NodeId};
use crate::geometry::{Point, Segment, Triangle, DIRICHLET_TAG};

/// Create a structured mesh of the unit square $[0, 1]^2$.
///
/// Every sub-square is split along its diagonal into two counter-clockwise
/// triangles. Nodes are ordered lexicographically (x fastest) starting at id 1.
/// The boundary is made of `4 * nsubdivisions` segments tagged as Dirichlet,
/// traversed counter-clockwise.
pub fn unit_square(nsubdivisions: usize) -> Mesh {
  assert!(nsubdivisions > 0, "need at least one subdivision");

  let nodes_per_dim = nsubdivisions + 1;
  let h = (nsubdivisions as f64).recip();
  let node_id = |ix: usize, iy: usize| -> NodeId { ix + iy * nodes_per_dim + 1 };

  let mut mesh = Mesh::new();
  for iy in 0..nodes_per_dim {
    for ix in 0..nodes_per_dim {
      mesh.push_point(Point::new(ix as f64 * h, iy as f64 * h, node_id(ix, iy)));
    }
  }
  let point = |ix: usize, iy: usize| mesh.points()[node_id(ix, iy) - 1];

  let mut triangles = Vec::with_capacity(2 * nsubdivisions.pow(2));
  for iy in 0..nsubdivisions {
    for ix in 0..nsubdivisions {
      let v00 = point(ix, iy);
      let v10 = point(ix + 1, iy);
      let v11 = point(ix + 1, iy + 1);
      let v01 = point(ix, iy + 1);
      let id = triangles.len();
      triangles.push(Triangle::new([v00, v10, v11], id));
      triangles.push(Triangle::new([v11, v01, v00], id + 1));
    }
  }

  let n = nsubdivisions;
  let boundary_walk: Vec<(usize, usize)> = (0..n)
    .map(|i| (i, 0))
    .chain((0..n).map(|i| (n, i)))
    .chain((0..n).map(|i| (n - i, n)))
    .chain((0..n).map(|i| (0, n - i)))
    .collect();
  let segments: Vec<_> = boundary_walk
    .iter()
    .enumerate()
    .map(|(iseg, &(ix, iy))| {
      let (jx, jy) = boundary_walk[(iseg + 1) % boundary_walk.len()];
      Segment::new([point(ix, iy), point(jx, jy)], iseg).with_physical_tag(DIRICHLET_TAG)
    })
    .collect();

  for t in triangles {
    mesh.push_triangle(t);
  }
  for s in segments {
    mesh.push_segment(s);
  }
  mesh
}
