use super::Mesh;
use crate::{
  geometry::{Point, Segment, Triangle, UNTAGGED},
  FemError,
};

use std::{collections::HashMap, path::Path};
use tracing::{info, warn};

/// Load a gmsh `.msh` file (version 4.1).
pub fn read_gmsh(path: impl AsRef<Path>) -> Result<Mesh, FemError> {
  let bytes = std::fs::read(path)?;
  gmsh2mesh(&bytes)
}

/// Parse gmsh `.msh` bytes (version 4.1) into a mesh.
///
/// Nodes are numbered $1..=n$ in file order, whatever their gmsh tags.
/// `Lin2` elements become segments and `Tri3`
/// elements become triangles. The physical tag of an element is the first
/// physical tag of the curve or surface it belongs to, [`UNTAGGED`] otherwise.
pub fn gmsh2mesh(bytes: &[u8]) -> Result<Mesh, FemError> {
  let msh = mshio::parse_msh_bytes(bytes).map_err(|e| FemError::MeshImport(format!("{e:?}")))?;

  let mut curve_tags = HashMap::new();
  let mut surface_tags = HashMap::new();
  if let Some(entities) = &msh.data.entities {
    for curve in &entities.curves {
      if let Some(&tag) = curve.physical_tags.first() {
        curve_tags.insert(curve.tag, tag);
      }
    }
    for surface in &entities.surfaces {
      if let Some(&tag) = surface.physical_tags.first() {
        surface_tags.insert(surface.tag, tag);
      }
    }
  }

  let nodes = msh
    .data
    .nodes
    .ok_or_else(|| FemError::MeshImport("missing $Nodes section".to_string()))?;
  // Node ids are positions in the $Nodes section, element node tags are
  // resolved through `by_tag`. Dense tags run consecutively from
  // `min_node_tag` over all blocks.
  let mut points = Vec::with_capacity(nodes.num_nodes as usize);
  let mut by_tag: HashMap<u64, Point> = HashMap::new();
  let mut next_tag = nodes.min_node_tag;
  for block in &nodes.node_blocks {
    let mut tags: Vec<u64> = (next_tag..next_tag + block.nodes.len() as u64).collect();
    if let Some(node_tags) = &block.node_tags {
      for (&tag, &inode) in node_tags {
        tags[inode] = tag;
      }
    }
    next_tag += block.nodes.len() as u64;

    for (node, tag) in block.nodes.iter().zip(tags) {
      let point = Point::new(node.x, node.y, points.len() + 1);
      if by_tag.insert(tag, point).is_some() {
        return Err(FemError::MeshImport(format!("duplicate node tag {tag}")));
      }
      points.push(point);
    }
  }

  let point = |tag: u64| -> Result<Point, FemError> {
    by_tag
      .get(&tag)
      .copied()
      .ok_or_else(|| FemError::MeshImport(format!("element references unknown node tag {tag}")))
  };

  let elements = msh
    .data
    .elements
    .ok_or_else(|| FemError::MeshImport("missing $Elements section".to_string()))?;

  let mut segments = Vec::new();
  let mut triangles = Vec::new();
  let mut nflipped = 0;
  for block in elements.element_blocks {
    type ElType = mshio::ElementType;
    match block.element_type {
      ElType::Lin2 => {
        let tag = curve_tags.get(&block.entity_tag).copied().unwrap_or(UNTAGGED);
        for e in &block.elements {
          let vertices = [point(e.nodes[0])?, point(e.nodes[1])?];
          let segment = Segment::new(vertices, segments.len()).with_physical_tag(tag);
          segments.push(segment);
        }
      }
      ElType::Tri3 => {
        let tag = surface_tags
          .get(&block.entity_tag)
          .copied()
          .unwrap_or(UNTAGGED);
        for e in &block.elements {
          let vertices = [point(e.nodes[0])?, point(e.nodes[1])?, point(e.nodes[2])?];
          let mut triangle = Triangle::new(vertices, triangles.len()).with_physical_tag(tag);
          if triangle.signed_area() < 0.0 {
            triangle = triangle.flipped();
            nflipped += 1;
          }
          triangles.push(triangle);
        }
      }
      ElType::Pnt => {}
      _ => {
        warn!("unsupported gmsh ElementType: {:?}", block.element_type);
      }
    }
  }
  if nflipped > 0 {
    warn!("re-oriented {nflipped} clockwise triangles");
  }
  if triangles.is_empty() {
    return Err(FemError::MeshImport("mesh has no triangles".to_string()));
  }

  info!(
    "imported gmsh mesh: {} points, {} segments, {} triangles",
    points.len(),
    segments.len(),
    triangles.len()
  );
  Ok(Mesh::from_parts(points, segments, triangles))
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    geometry::{MeshElement, DIRICHLET_TAG},
    Coord,
  };

  /// Unit square split into two triangles, the boundary curve carries
  /// physical tag 0, the second triangle is listed clockwise.
  const UNIT_SQUARE_MSH: &str = "$MeshFormat
4.1 0 8
$EndMeshFormat
$Entities
0 1 1 0
1 0 0 0 1 1 0 1 0 0
1 0 0 0 1 1 0 0 1 1
$EndEntities
$Nodes
1 4 1 4
2 1 0 4
1
2
3
4
0 0 0
1 0 0
1 1 0
0 1 0
$EndNodes
$Elements
2 6 1 6
1 1 1 4
1 1 2
2 2 3
3 3 4
4 4 1
2 1 2 2
5 1 2 3
6 1 4 3
$EndElements
";

  #[test]
  fn import_unit_square() {
    let mesh = gmsh2mesh(UNIT_SQUARE_MSH.as_bytes()).unwrap();
    assert_eq!(mesh.npoints(), 4);
    assert_eq!(mesh.nsegments(), 4);
    assert_eq!(mesh.ntriangles(), 2);
    assert!(mesh.segments().iter().all(|s| s.physical_tag() == DIRICHLET_TAG));
    assert!(mesh.triangles().iter().all(|t| t.physical_tag() == UNTAGGED));
    mesh.validate().unwrap();
    assert_eq!(mesh.point(3).unwrap().coord(), Coord::new(1.0, 1.0));
  }

  /// Same square with sparse node tags listed out of order.
  const SPARSE_TAGS_MSH: &str = "$MeshFormat
4.1 0 8
$EndMeshFormat
$Nodes
1 4 10 40
2 1 0 4
40
10
20
30
0 1 0
0 0 0
1 0 0
1 1 0
$EndNodes
$Elements
1 2 1 2
2 1 2 2
1 10 20 30
2 10 30 40
$EndElements
";

  #[test]
  fn sparse_node_tags_are_resolved() {
    let mesh = gmsh2mesh(SPARSE_TAGS_MSH.as_bytes()).unwrap();
    assert_eq!(mesh.npoints(), 4);
    mesh.validate().unwrap();

    // Ids follow file order, the tag 40 node comes first.
    assert_eq!(mesh.point(1).unwrap().coord(), Coord::new(0.0, 1.0));
    let [t0, t1] = [&mesh.triangles()[0], &mesh.triangles()[1]];
    assert_eq!(
      t0.coords(),
      [Coord::new(0.0, 0.0), Coord::new(1.0, 0.0), Coord::new(1.0, 1.0)]
    );
    assert_eq!(
      t1.coords(),
      [Coord::new(0.0, 0.0), Coord::new(1.0, 1.0), Coord::new(0.0, 1.0)]
    );
    let ids: Vec<_> = t0.vertices().iter().map(|p| p.id()).collect();
    assert_eq!(ids, [2, 3, 4]);
  }

  #[test]
  fn unknown_node_tag_is_an_import_error() {
    let msh = SPARSE_TAGS_MSH.replace("2 10 30 40", "2 10 30 50");
    assert!(matches!(
      gmsh2mesh(msh.as_bytes()),
      Err(FemError::MeshImport(msg)) if msg.contains("50")
    ));
  }

  #[test]
  fn garbage_is_an_import_error() {
    assert!(matches!(
      gmsh2mesh(b"not a mesh"),
      Err(FemError::MeshImport(_))
    ));
  }
}
