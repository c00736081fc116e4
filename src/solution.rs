//! Reconstruction and evaluation of the discrete solution.

use crate::{
  config::Tolerance,
  geometry::MeshElement,
  mesh::{Mesh, NodeId},
  shape::ShapeFunction,
  Coord, DofIdx, FemError,
};

use indexmap::IndexMap;
use std::{
  fs::File,
  io::{BufWriter, Write},
  path::Path,
};
use tracing::debug;

/// The global hat function of a node.
///
/// Made of the local shape functions of all incident triangles, in mesh order.
#[derive(Debug, Clone)]
pub struct NodalBasis {
  dof: DofIdx,
  pieces: Vec<ShapeFunction>,
}
impl NodalBasis {
  pub fn dof(&self) -> DofIdx {
    self.dof
  }
  pub fn pieces(&self) -> &[ShapeFunction] {
    &self.pieces
  }
  /// Shape function of the first triangle that owns the node.
  pub fn primary(&self) -> &ShapeFunction {
    &self.pieces[0]
  }

  /// Value of the first piece whose triangle contains `coord`, zero elsewhere.
  pub fn eval_coord(&self, coord: &Coord) -> f64 {
    self
      .pieces
      .iter()
      .find(|phi| phi.contains(coord))
      .map_or(0.0, |phi| phi.eval_affine(coord))
  }
}

/// Node id to basis function, in order of first ownership.
#[derive(Debug, Clone, Default)]
pub struct BasisTable {
  table: IndexMap<NodeId, NodalBasis>,
}
impl BasisTable {
  pub fn build(mesh: &Mesh, tolerance: Tolerance) -> Result<Self, FemError> {
    mesh.validate()?;
    let mut table: IndexMap<NodeId, NodalBasis> = IndexMap::with_capacity(mesh.npoints());
    for triangle in mesh.triangles() {
      for (ilocal, p) in triangle.vertices().iter().enumerate() {
        let phi = ShapeFunction::new(triangle, ilocal, tolerance)?;
        table
          .entry(p.id())
          .or_insert_with(|| NodalBasis {
            dof: p.dof(),
            pieces: Vec::new(),
          })
          .pieces
          .push(phi);
      }
    }
    debug!("built basis table for {} nodes", table.len());
    Ok(Self { table })
  }

  pub fn len(&self) -> usize {
    self.table.len()
  }
  pub fn is_empty(&self) -> bool {
    self.table.is_empty()
  }
  pub fn get(&self, id: NodeId) -> Option<&NodalBasis> {
    self.table.get(&id)
  }
  pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodalBasis)> {
    self.table.iter().map(|(&id, basis)| (id, basis))
  }
}

/// The finite element solution $u_h = sum_i U_i phi_i$.
#[derive(Debug, Clone)]
pub struct Solution {
  coeffs: na::DVector<f64>,
  basis: BasisTable,
  bounding_box: Option<(Coord, Coord)>,
}
impl Solution {
  pub fn new(
    coeffs: na::DVector<f64>,
    basis: BasisTable,
    bounding_box: Option<(Coord, Coord)>,
  ) -> Self {
    Self {
      coeffs,
      basis,
      bounding_box,
    }
  }

  pub fn coeffs(&self) -> &na::DVector<f64> {
    &self.coeffs
  }
  pub fn basis(&self) -> &BasisTable {
    &self.basis
  }

  pub fn eval_coord(&self, coord: &Coord) -> f64 {
    self
      .basis
      .iter()
      .map(|(_, phi)| self.coeffs[phi.dof()] * phi.eval_coord(coord))
      .sum()
  }

  pub fn eval(&self, x: f64, y: f64) -> f64 {
    self.eval_coord(&Coord::new(x, y))
  }

  /// Evaluates on `n` x `n` equispaced points spanning the bounding box.
  pub fn sample_grid(&self, n: usize) -> Result<GridSamples, FemError> {
    let (min, max) = self.bounding_box.ok_or(FemError::EmptyMesh)?;
    let axis = |lo: f64, hi: f64| -> Vec<f64> {
      match n {
        0 => Vec::new(),
        1 => vec![0.5 * (lo + hi)],
        _ => (0..n)
          .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
          .collect(),
      }
    };
    let xs = axis(min.x, max.x);
    let ys = axis(min.y, max.y);
    let values = na::DMatrix::from_fn(ys.len(), xs.len(), |iy, ix| self.eval(xs[ix], ys[iy]));
    Ok(GridSamples { xs, ys, values })
  }
}

/// Solution values on a tensor grid, `values[(iy, ix)]`.
#[derive(Debug, Clone)]
pub struct GridSamples {
  pub xs: Vec<f64>,
  pub ys: Vec<f64>,
  pub values: na::DMatrix<f64>,
}
impl GridSamples {
  pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<(), FemError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "x,y,value")?;
    for (iy, y) in self.ys.iter().enumerate() {
      for (ix, x) in self.xs.iter().enumerate() {
        writeln!(writer, "{x},{y},{}", self.values[(iy, ix)])?;
      }
    }
    writer.flush()?;
    Ok(())
  }
}
