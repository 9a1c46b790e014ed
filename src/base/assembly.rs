use crate::StrError;
use russell_lab::{Matrix, Vector};
use russell_sparse::CooMatrix;

/// Assembles a local vector into the global vector
///
/// Rows corresponding to prescribed equations are skipped.
pub fn assemble_vector(rr: &mut Vector, local: &Vector, local_to_global: &[usize], prescribed: &[bool]) {
    for i in 0..local.dim() {
        let g = local_to_global[i];
        if !prescribed[g] {
            rr[g] += local[i];
        }
    }
}

/// Assembles a local matrix into the global sparse matrix
///
/// Rows and columns corresponding to prescribed equations are skipped.
pub fn assemble_matrix(
    kk: &mut CooMatrix,
    local: &Matrix,
    local_to_global: &[usize],
    prescribed: &[bool],
) -> Result<(), StrError> {
    let (nrow, ncol) = local.dims();
    for i in 0..nrow {
        let gi = local_to_global[i];
        if prescribed[gi] {
            continue;
        }
        for j in 0..ncol {
            let gj = local_to_global[j];
            if !prescribed[gj] {
                kk.put(gi, gj, local.get(i, j))?;
            }
        }
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
