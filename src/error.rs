use crate::{assemble::Phase, mesh::NodeId};

#[derive(Debug, thiserror::Error)]
pub enum FemError {
  #[error("triangle {id} is degenerate (area = {area})")]
  DegenerateTriangle { id: usize, area: f64 },
  #[error("segment {id} is degenerate (length = {length})")]
  DegenerateSegment { id: usize, length: f64 },
  #[error("triangle {id} is clockwise oriented")]
  ClockwiseTriangle { id: usize },

  #[error("shape function {ilocal} of triangle {triangle} has a singular coefficient system")]
  SingularShapeSystem { triangle: usize, ilocal: usize },
  #[error("quadrature order {0} is not supported (only order 2 is)")]
  UnsupportedQuadratureOrder(usize),

  #[error("node id {id} is out of range 1..={npoints}")]
  NodeIdOutOfRange { id: NodeId, npoints: usize },
  #[error("node id {0} is used by more than one point")]
  DuplicateNodeId(NodeId),
  #[error("element {element} references unknown node {id}")]
  UnknownNode { element: usize, id: NodeId },
  #[error("invalid triplets: {0}")]
  InvalidTriplets(String),

  #[error("linear system is singular: {0}")]
  SingularSystem(String),
  #[error("assembly phase {requested:?} called while in phase {current:?}")]
  PhaseOrder { requested: Phase, current: Phase },
  #[error("invalid tolerance {0}")]
  InvalidTolerance(f64),

  #[error("mesh has no points")]
  EmptyMesh,
  #[error("mesh import failed: {0}")]
  MeshImport(String),
  #[error(transparent)]
  Io(#[from] std::io::Error),
}
