use super::{MechModelTrait, PointState};
use crate::base::{STRESS_NCOMP, TANGENT_NCOMP};
use crate::StrError;
use russell_lab::Matrix;
use russell_tensor::{Tensor4, IDENTITY2, P_SYMDEV, SQRT_2};

/// Defines an alias to IDENTITY2
const I: &[f64; 9] = &IDENTITY2;

/// Defines an alias to P_SYMDEV
const PSD: &[[f64; 9]; 9] = &P_SYMDEV;

/// Implements the compressible Neo-Hookean hyperelastic model
///
/// The strain energy is split into an isochoric part governed by the shear-like
/// constant and a volumetric part governed by the bulk-like constant:
///
/// ```text
/// σ = μ J⁻⁵ᐟ³ dev(B) + κ (J − 1) I,    B = F·Fᵀ,   J = det(F)
/// ```
///
/// The model has no history dependence; stress and consistent tangent follow
/// analytically from the deformation gradient.
pub struct NeoHookean {
    /// Shear-like material constant (μ)
    shear: f64,

    /// Bulk-like material constant (κ)
    bulk: f64,
}

/// Computes the determinant of the 3×3 deformation gradient
fn det3(ff: &Matrix) -> f64 {
    ff.get(0, 0) * (ff.get(1, 1) * ff.get(2, 2) - ff.get(1, 2) * ff.get(2, 1))
        - ff.get(0, 1) * (ff.get(1, 0) * ff.get(2, 2) - ff.get(1, 2) * ff.get(2, 0))
        + ff.get(0, 2) * (ff.get(1, 0) * ff.get(2, 1) - ff.get(1, 1) * ff.get(2, 0))
}

/// Computes the left Cauchy-Green tensor B = F·Fᵀ (3×3 components)
fn left_cauchy_green(bb: &mut [[f64; 3]; 3], ff: &Matrix) {
    for i in 0..3 {
        for j in 0..3 {
            let mut sum = 0.0;
            for k in 0..3 {
                sum += ff.get(i, k) * ff.get(j, k);
            }
            bb[i][j] = sum;
        }
    }
}

impl NeoHookean {
    /// Allocates a new instance
    pub fn new(shear: f64, bulk: f64) -> Result<Self, StrError> {
        if shear <= 0.0 {
            return Err("the shear-like constant must be positive");
        }
        if bulk <= 0.0 {
            return Err("the bulk-like constant must be positive");
        }
        Ok(NeoHookean { shear, bulk })
    }

    /// Computes the tangent coefficients at the given deformation gradient
    ///
    /// Returns (d1, d2, c3, bv) such that the Mandel matrix of the tangent is
    /// `d1 P_symdev + d2 I⊗I + c3 (B⊗I + I⊗B)` with bv the Mandel vector of B.
    fn tangent_coefficients(&self, ff: &Matrix) -> Result<(f64, f64, f64, [f64; 6]), StrError> {
        let jj = det3(ff);
        if jj <= 0.0 {
            return Err("the deformation gradient is not invertible (det F ≤ 0)");
        }
        let mut bb = [[0.0; 3]; 3];
        left_cauchy_green(&mut bb, ff);
        let tr_b = bb[0][0] + bb[1][1] + bb[2][2];
        let jm53 = f64::powf(jj, -5.0 / 3.0);
        let c1 = 2.0 * self.shear * jm53 * tr_b / 3.0 - 2.0 * self.bulk * (jj - 1.0);
        let c2 = 2.0 * self.shear * jm53 * tr_b / 9.0 + self.bulk * (2.0 * jj - 1.0);
        let c3 = -(2.0 / 3.0) * self.shear * jm53;
        let d1 = c1;
        let d2 = c2 + c1 / 3.0;
        let bv = [
            bb[0][0],
            bb[1][1],
            bb[2][2],
            bb[1][0] * SQRT_2,
            bb[2][0] * SQRT_2,
            bb[2][1] * SQRT_2,
        ];
        Ok((d1, d2, c3, bv))
    }
}

impl MechModelTrait for NeoHookean {
    /// Indicates that the stiffness matrix is symmetric
    fn symmetric_stiffness(&self) -> bool {
        true
    }

    /// Returns the number of history values per quadrature point
    fn n_history(&self) -> usize {
        0
    }

    /// Initializes the history values (none for this model)
    fn init_history(&self, _vars: &mut [f64], _orientation: &[f64]) -> Result<(), StrError> {
        Ok(())
    }

    /// Updates the end-of-step stress and tangent summary
    fn update_stress(&mut self, args: &mut PointState) -> Result<(), StrError> {
        let jj = det3(args.def_grad);
        if jj <= 0.0 {
            return Err("the deformation gradient is not invertible (det F ≤ 0)");
        }
        let mut bb = [[0.0; 3]; 3];
        left_cauchy_green(&mut bb, args.def_grad);
        let tr_b = bb[0][0] + bb[1][1] + bb[2][2];
        let jm53 = f64::powf(jj, -5.0 / 3.0);
        let vol = self.bulk * (jj - 1.0);

        // Cauchy stress in Voigt ordering (σ11, σ22, σ33, σ21, σ31, σ32)
        debug_assert_eq!(args.stress1.len(), STRESS_NCOMP);
        args.stress1[0] = self.shear * jm53 * (bb[0][0] - tr_b / 3.0) + vol;
        args.stress1[1] = self.shear * jm53 * (bb[1][1] - tr_b / 3.0) + vol;
        args.stress1[2] = self.shear * jm53 * (bb[2][2] - tr_b / 3.0) + vol;
        args.stress1[3] = self.shear * jm53 * bb[1][0];
        args.stress1[4] = self.shear * jm53 * bb[2][0];
        args.stress1[5] = self.shear * jm53 * bb[2][1];

        // normal block of the consistent tangent
        debug_assert_eq!(args.tangent.len(), TANGENT_NCOMP);
        let (d1, d2, c3, bv) = self.tangent_coefficients(args.def_grad)?;
        for a in 0..3 {
            for b in 0..3 {
                let delta = if a == b { 1.0 } else { 0.0 };
                args.tangent[3 * a + b] = d1 * (delta - 1.0 / 3.0) + d2 + c3 * (bv[a] + bv[b]);
            }
        }
        Ok(())
    }

    /// Computes the consistent tangent stiffness
    fn stiffness(
        &self,
        dd: &mut Tensor4,
        def_grad: &Matrix,
        _stress: &[f64],
        _vars: &[f64],
    ) -> Result<(), StrError> {
        let (d1, d2, c3, bv) = self.tangent_coefficients(def_grad)?;
        let mat = dd.matrix_mut();
        let (nrow, ncol) = mat.dims();
        for i in 0..nrow {
            for j in 0..ncol {
                mat.set(i, j, d1 * PSD[i][j] + d2 * I[i] * I[j] + c3 * (bv[i] * I[j] + I[i] * bv[j]));
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
