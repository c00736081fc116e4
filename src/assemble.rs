//! Assembly of the galerkin system of $-Delta u + u = f$ with homogeneous
//! Dirichlet data.
//!
//! The [`Assembler`] walks through the phases mass, stiffness, load and
//! Dirichlet enforcement in this order. Each phase runs exactly once.

use crate::{
  fe::{mass_elmat, stiffness_elmat, ElmatProvider, ElvecProvider, LoadElvec},
  geometry::MeshElement,
  linalg::{self, SolverKind},
  mesh::Mesh,
  quadrature::QuadRule,
  solution::{BasisTable, Solution},
  sparse::Triplets,
  DofIdx, FemConfig, FemError,
};

use itertools::Itertools;
use tracing::{debug, info};

pub type GalMat = Triplets;
pub type GalVec = na::DVector<f64>;

/// The next phase an [`Assembler`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Mass,
  Stiffness,
  Load,
  Dirichlet,
  /// All phases ran, the system can be materialized.
  Assembled,
}
impl Phase {
  fn next(self) -> Self {
    match self {
      Self::Mass => Self::Stiffness,
      Self::Stiffness => Self::Load,
      Self::Load => Self::Dirichlet,
      Self::Dirichlet | Self::Assembled => Self::Assembled,
    }
  }
}

/// Accumulates the element matrices of all triangles into `galmat`.
///
/// `mesh` must have passed [`Mesh::validate`], node ids are turned into
/// rows without further checks.
pub fn assemble_galmat(
  mesh: &Mesh,
  elmat: impl ElmatProvider,
  galmat: &mut GalMat,
) -> Result<(), FemError> {
  for triangle in mesh.triangles() {
    let elmat = elmat.eval(triangle)?;
    for (ilocal, pi) in triangle.vertices().iter().enumerate() {
      for (jlocal, pj) in triangle.vertices().iter().enumerate() {
        galmat.append(pi.dof(), pj.dof(), elmat[(ilocal, jlocal)]);
      }
    }
  }
  Ok(())
}

/// Accumulates the element vectors of all triangles into `galvec`.
///
/// Same precondition as [`assemble_galmat`].
pub fn assemble_galvec(
  mesh: &Mesh,
  elvec: impl ElvecProvider,
  galvec: &mut GalVec,
) -> Result<(), FemError> {
  for triangle in mesh.triangles() {
    let elvec = elvec.eval(triangle)?;
    for (ilocal, p) in triangle.vertices().iter().enumerate() {
      galvec[p.dof()] += elvec[ilocal];
    }
  }
  Ok(())
}

/// The unconstrained mass matrix of the mesh.
pub fn mass_matrix(mesh: &Mesh) -> Result<nas::CsrMatrix<f64>, FemError> {
  mesh.validate()?;
  let n = mesh.npoints();
  let mut galmat = GalMat::zeros(n, n);
  assemble_galmat(mesh, mass_elmat, &mut galmat)?;
  galmat.to_nalgebra_csr()
}

/// Builds the galerkin system phase by phase.
pub struct Assembler<'m> {
  mesh: &'m Mesh,
  config: FemConfig,
  phase: Phase,
  galmat: GalMat,
  galvec: GalVec,
}

impl<'m> Assembler<'m> {
  /// Validates `mesh` and `config` and starts in the mass phase.
  pub fn new(mesh: &'m Mesh, config: FemConfig) -> Result<Self, FemError> {
    config.validate()?;
    mesh.validate()?;

    let ndofs = mesh.npoints();
    Ok(Self {
      mesh,
      config,
      phase: Phase::Mass,
      galmat: GalMat::zeros(ndofs, ndofs),
      galvec: GalVec::zeros(ndofs),
    })
  }

  pub fn mesh(&self) -> &'m Mesh {
    self.mesh
  }
  pub fn config(&self) -> &FemConfig {
    &self.config
  }
  pub fn phase(&self) -> Phase {
    self.phase
  }
  pub fn galmat(&self) -> &GalMat {
    &self.galmat
  }
  pub fn galvec(&self) -> &GalVec {
    &self.galvec
  }

  fn enter(&self, requested: Phase) -> Result<(), FemError> {
    if self.phase == requested {
      Ok(())
    } else {
      Err(FemError::PhaseOrder {
        requested,
        current: self.phase,
      })
    }
  }

  fn leave(&mut self) {
    debug!(
      "leaving phase {:?} with {} triplets",
      self.phase,
      self.galmat.len()
    );
    self.phase = self.phase.next();
  }

  pub fn assemble_mass(&mut self) -> Result<(), FemError> {
    self.enter(Phase::Mass)?;
    info!("assembling mass matrix");
    assemble_galmat(self.mesh, mass_elmat, &mut self.galmat)?;
    self.leave();
    Ok(())
  }

  pub fn assemble_stiffness(&mut self) -> Result<(), FemError> {
    self.enter(Phase::Stiffness)?;
    info!("assembling stiffness matrix");
    assemble_galmat(self.mesh, stiffness_elmat, &mut self.galmat)?;
    self.leave();
    Ok(())
  }

  pub fn assemble_load<F>(&mut self, source: F) -> Result<(), FemError>
  where
    F: Fn(f64, f64) -> f64,
  {
    self.enter(Phase::Load)?;
    info!("assembling load vector");
    let rule = QuadRule::for_order(self.config.quadrature_order)?;
    let elvec = LoadElvec::new(source, rule, self.config.tolerance);
    assemble_galvec(self.mesh, elvec, &mut self.galvec)?;
    self.leave();
    Ok(())
  }

  /// Fixes the endpoints of all Dirichlet segments to zero.
  pub fn enforce_dirichlet(&mut self) -> Result<(), FemError> {
    self.enter(Phase::Dirichlet)?;
    let dofs: Vec<DofIdx> = self
      .mesh
      .segments_with_tag(self.config.dirichlet_tag)
      .flat_map(|s| s.vertices().iter().map(|p| p.dof()))
      .sorted_unstable()
      .dedup()
      .collect();
    info!("enforcing dirichlet condition on {} dofs", dofs.len());
    self.galmat.fix_dofs_zero(&dofs, &mut self.galvec);
    self.leave();
    Ok(())
  }

  /// Materializes the assembled system.
  pub fn finish(self) -> Result<LinearSystem, FemError> {
    self.enter(Phase::Assembled)?;
    let matrix = self.galmat.to_nalgebra_csr()?;
    info!(
      "assembled {}x{} system with {} nonzeros",
      matrix.nrows(),
      matrix.ncols(),
      matrix.nnz()
    );
    Ok(LinearSystem {
      matrix,
      rhs: self.galvec,
    })
  }
}

/// A materialized galerkin system.
#[derive(Debug, Clone)]
pub struct LinearSystem {
  pub matrix: nas::CsrMatrix<f64>,
  pub rhs: GalVec,
}
impl LinearSystem {
  pub fn solve(&self, kind: SolverKind) -> Result<na::DVector<f64>, FemError> {
    linalg::solve(kind, &self.matrix, &self.rhs)
  }
}

/// Solves $-Delta u + u = f$ on `mesh` with $u = 0$ on the Dirichlet segments.
pub fn solve_poisson<F>(mesh: &Mesh, source: F, config: &FemConfig) -> Result<Solution, FemError>
where
  F: Fn(f64, f64) -> f64,
{
  let mut assembler = Assembler::new(mesh, config.clone())?;
  assembler.assemble_mass()?;
  assembler.assemble_stiffness()?;
  assembler.assemble_load(source)?;
  assembler.enforce_dirichlet()?;
  let system = assembler.finish()?;

  let coeffs = system.solve(config.solver)?;
  let basis = BasisTable::build(mesh, config.tolerance)?;
  info!("solved for {} coefficients", coeffs.len());
  Ok(Solution::new(coeffs, basis, mesh.bounding_box()))
}
