use super::{Elements, FemMesh};
use crate::StrError;
use russell_lab::Vector;
use russell_sparse::{SparseMatrix, Sym};

/// Holds variables to solve the global linear system
pub struct LinearSystem {
    /// Total number of global equations (total number of DOFs)
    pub n_equation: usize,

    /// Holds the supremum of the number of nonzero values (nnz) in the global matrix
    ///
    /// The local element matrices add only to parts of the global matrix; the
    /// least upper bound of nnz equals the sum of all local-matrix entries plus
    /// `n_equation` (room for the ones put on the diagonal of the prescribed
    /// equations, whichever they are in a given step).
    pub nnz_sup: usize,

    /// Holds the residual vector R
    pub rr: Vector,

    /// Holds the global Jacobian matrix K
    pub kk: SparseMatrix,

    /// Holds the "minus-delta-U" vector (the solution of the linear system)
    pub mdu: Vector,
}

impl LinearSystem {
    /// Allocates a new instance
    pub fn new(fem: &FemMesh, elements: &Elements) -> Result<Self, StrError> {
        let n_equation = fem.equations.n_equation;
        let mut nnz_sup = n_equation;
        nnz_sup += elements.all.iter().fold(0, |acc, e| {
            acc + e.local_to_global.len() * e.local_to_global.len()
        });
        Ok(LinearSystem {
            n_equation,
            nnz_sup,
            rr: Vector::new(n_equation),
            kk: SparseMatrix::new_coo(n_equation, n_equation, nnz_sup, Sym::No)?,
            mdu: Vector::new(n_equation),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
