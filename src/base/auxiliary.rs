use super::STRESS_NCOMP;
use crate::StrError;
use russell_tensor::{Mandel, Tensor2};

/// Copies a symmetric 3D tensor into a Voigt-ordered slice
///
/// The Voigt ordering is (σ11, σ22, σ33, σ21, σ31, σ32).
pub fn tensor2_to_voigt(voigt: &mut [f64], sigma: &Tensor2) -> Result<(), StrError> {
    if voigt.len() != STRESS_NCOMP {
        return Err("voigt slice must have 6 components");
    }
    if sigma.mandel() != Mandel::Symmetric {
        return Err("tensor must be symmetric 3D");
    }
    voigt[0] = sigma.get(0, 0);
    voigt[1] = sigma.get(1, 1);
    voigt[2] = sigma.get(2, 2);
    voigt[3] = sigma.get(1, 0);
    voigt[4] = sigma.get(2, 0);
    voigt[5] = sigma.get(2, 1);
    Ok(())
}

/// Sets a symmetric 3D tensor from a Voigt-ordered slice
///
/// The Voigt ordering is (σ11, σ22, σ33, σ21, σ31, σ32).
pub fn voigt_to_tensor2(sigma: &mut Tensor2, voigt: &[f64]) -> Result<(), StrError> {
    if voigt.len() != STRESS_NCOMP {
        return Err("voigt slice must have 6 components");
    }
    if sigma.mandel() != Mandel::Symmetric {
        return Err("tensor must be symmetric 3D");
    }
    sigma.sym_set(0, 0, voigt[0]);
    sigma.sym_set(1, 1, voigt[1]);
    sigma.sym_set(2, 2, voigt[2]);
    sigma.sym_set(1, 0, voigt[3]);
    sigma.sym_set(2, 0, voigt[4]);
    sigma.sym_set(2, 1, voigt[5]);
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
