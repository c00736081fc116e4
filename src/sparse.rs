use crate::{DofIdx, FemError};

use itertools::multiunzip;

/// Sparse matrix in triplet (coordinate) form.
///
/// Duplicate entries are kept and summed on materialization.
#[derive(Debug, Clone, Default)]
pub struct Triplets {
  nrows: usize,
  ncols: usize,
  triplets: Vec<(DofIdx, DofIdx, f64)>,
}

impl Triplets {
  pub fn zeros(nrows: usize, ncols: usize) -> Self {
    Self::new(nrows, ncols, Vec::new())
  }
  pub fn new(nrows: usize, ncols: usize, triplets: Vec<(DofIdx, DofIdx, f64)>) -> Self {
    Self {
      nrows,
      ncols,
      triplets,
    }
  }

  pub fn nrows(&self) -> usize {
    self.nrows
  }
  pub fn ncols(&self) -> usize {
    self.ncols
  }
  pub fn len(&self) -> usize {
    self.triplets.len()
  }
  pub fn is_empty(&self) -> bool {
    self.triplets.is_empty()
  }
  pub fn triplets(&self) -> &[(DofIdx, DofIdx, f64)] {
    &self.triplets
  }

  /// Records the contribution `v` at `(r, c)`.
  ///
  /// Indices are checked when materializing.
  pub fn append(&mut self, r: DofIdx, c: DofIdx, v: f64) {
    self.triplets.push((r, c, v));
  }

  /// Removes every triplet whose position satisfies `predicate`.
  pub fn set_zero<F>(&mut self, predicate: F)
  where
    F: Fn(DofIdx, DofIdx) -> bool,
  {
    let mut i = 0;
    while i < self.triplets.len() {
      let (r, c, _) = self.triplets[i];
      if predicate(r, c) {
        self.triplets.swap_remove(i);
      } else {
        i += 1;
      }
    }
  }

  /// Fixes `dofs` to zero.
  ///
  /// Rows and columns of the fixed dofs are removed, a unit diagonal entry
  /// is appended and the right hand side entries are zeroed.
  /// Symmetry of the matrix is preserved.
  pub fn fix_dofs_zero(&mut self, dofs: &[DofIdx], galvec: &mut na::DVector<f64>) {
    let mut flags = vec![false; self.nrows.max(self.ncols)];
    for &dof in dofs {
      flags[dof] = true;
    }
    self.set_zero(|r, c| flags[r] || flags[c]);

    for &dof in dofs {
      self.append(dof, dof, 1.0);
      galvec[dof] = 0.0;
    }
  }

  pub fn to_nalgebra_coo(&self) -> Result<nas::CooMatrix<f64>, FemError> {
    let (rows, cols, vals): (Vec<_>, Vec<_>, Vec<_>) = multiunzip(self.triplets.iter().copied());
    nas::CooMatrix::try_from_triplets(self.nrows, self.ncols, rows, cols, vals)
      .map_err(|e| FemError::InvalidTriplets(e.to_string()))
  }

  pub fn to_nalgebra_csr(&self) -> Result<nas::CsrMatrix<f64>, FemError> {
    Ok((&self.to_nalgebra_coo()?).into())
  }

  pub fn to_nalgebra_csc(&self) -> Result<nas::CscMatrix<f64>, FemError> {
    Ok((&self.to_nalgebra_coo()?).into())
  }

  pub fn to_nalgebra_dense(&self) -> Result<na::DMatrix<f64>, FemError> {
    Ok((&self.to_nalgebra_coo()?).into())
  }
}
