use crate::FemError;

use faer::solvers::SpSolver;
use tracing::debug;

/// Backend used to solve the galerkin system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverKind {
  /// Dense LU with partial pivoting.
  #[default]
  DenseLu,
  /// Sparse LU, for any nonsingular system.
  SparseLu,
  /// Sparse Cholesky, for symmetric positive definite systems.
  SparseCholesky,
}

type SparseMatrixFaer = faer::sparse::SparseColMat<usize, f64>;

pub fn nalgebra2faer(m: nas::CscMatrix<f64>) -> SparseMatrixFaer {
  let nrows = m.nrows();
  let ncols = m.ncols();
  let (col_ptrs, row_indices, values) = m.disassemble();

  let symbolic =
    faer::sparse::SymbolicSparseColMat::new_checked(nrows, ncols, col_ptrs, None, row_indices);
  faer::sparse::SparseColMat::new(symbolic, values)
}

pub struct FaerLu {
  raw: faer::sparse::linalg::solvers::Lu<usize, f64>,
}
impl FaerLu {
  pub fn new(a: nas::CscMatrix<f64>) -> Result<Self, FemError> {
    let raw = nalgebra2faer(a)
      .sp_lu()
      .map_err(|e| FemError::SingularSystem(format!("sparse lu: {e:?}")))?;
    Ok(Self { raw })
  }

  pub fn solve(&self, b: &na::DVector<f64>) -> na::DVector<f64> {
    let b = faer::col::from_slice(b.as_slice());
    na::DVector::from_vec(self.raw.solve(b).as_slice().to_vec())
  }
}

pub struct FaerCholesky {
  raw: faer::sparse::linalg::solvers::Cholesky<usize, f64>,
}
impl FaerCholesky {
  pub fn new(a: nas::CscMatrix<f64>) -> Result<Self, FemError> {
    let raw = nalgebra2faer(a)
      .sp_cholesky(faer::Side::Upper)
      .map_err(|e| FemError::SingularSystem(format!("sparse cholesky: {e:?}")))?;
    Ok(Self { raw })
  }

  pub fn solve(&self, b: &na::DVector<f64>) -> na::DVector<f64> {
    let b = faer::col::from_slice(b.as_slice());
    na::DVector::from_vec(self.raw.solve(b).as_slice().to_vec())
  }
}

/// Solves `A x = b`.
///
/// Fails if the matrix is not square, the factorization breaks down
/// or the solution is not finite.
pub fn solve(
  kind: SolverKind,
  a: &nas::CsrMatrix<f64>,
  b: &na::DVector<f64>,
) -> Result<na::DVector<f64>, FemError> {
  if a.nrows() != a.ncols() || a.nrows() != b.len() {
    return Err(FemError::SingularSystem(format!(
      "dimension mismatch: {}x{} matrix, {} rhs",
      a.nrows(),
      a.ncols(),
      b.len()
    )));
  }
  debug!("solving {}x{} system with {kind:?}", a.nrows(), a.ncols());

  let x = match kind {
    SolverKind::DenseLu => {
      let dense = na::DMatrix::from(a);
      dense
        .lu()
        .solve(b)
        .ok_or_else(|| FemError::SingularSystem("dense lu: zero pivot".to_string()))?
    }
    SolverKind::SparseLu => FaerLu::new(nas::CscMatrix::from(a))?.solve(b),
    SolverKind::SparseCholesky => FaerCholesky::new(nas::CscMatrix::from(a))?.solve(b),
  };

  if x.iter().all(|v| v.is_finite()) {
    Ok(x)
  } else {
    Err(FemError::SingularSystem(format!(
      "{kind:?} produced a non-finite solution"
    )))
  }
}
