use super::{FnStiffness, FnStressUpdate, MechModelTrait, PointState};
use crate::StrError;
use russell_lab::Matrix;
use russell_tensor::{Tensor4, IDENTITY2, P_SYMDEV};

/// Young modulus of the sample hypoelastic updater
pub const SAMPLE_YOUNG: f64 = 1000.0;

/// Poisson coefficient of the sample hypoelastic updater
pub const SAMPLE_POISSON: f64 = 0.3;

/// Implements a user-supplied incremental (UMAT-style) constitutive model
///
/// The update and stiffness routines are externally defined and opaque; they
/// receive the beginning- and end-of-step buffers by reference and mutate the
/// end-of-step buffers in place. With `requires_orientation`, the model refuses
/// to run without grain orientation data (crystal plasticity).
pub struct Incremental {
    /// User-supplied incremental stress-update routine
    update: FnStressUpdate,

    /// User-supplied consistent stiffness routine
    stiffness_fn: FnStiffness,

    /// Number of history values per quadrature point
    n_history: usize,

    /// Requires grain orientation data (crystal plasticity)
    requires_orientation: bool,
}

impl Incremental {
    /// Allocates a new instance
    pub fn new(
        update: FnStressUpdate,
        stiffness_fn: FnStiffness,
        n_history: usize,
        requires_orientation: bool,
    ) -> Self {
        Incremental {
            update,
            stiffness_fn,
            n_history,
            requires_orientation,
        }
    }
}

impl MechModelTrait for Incremental {
    /// Indicates that the stiffness matrix is symmetric
    ///
    /// User-supplied tangents are not assumed symmetric.
    fn symmetric_stiffness(&self) -> bool {
        false
    }

    /// Returns the number of history values per quadrature point
    fn n_history(&self) -> usize {
        self.n_history
    }

    /// Initializes the history values
    fn init_history(&self, vars: &mut [f64], orientation: &[f64]) -> Result<(), StrError> {
        if self.requires_orientation && orientation.is_empty() {
            return Err("crystal plasticity requires grain orientation data at the quadrature points");
        }
        vars.iter_mut().for_each(|v| *v = 0.0);
        Ok(())
    }

    /// Updates the end-of-step stress, tangent summary, and history
    fn update_stress(&mut self, args: &mut PointState) -> Result<(), StrError> {
        if self.requires_orientation && args.orientation.is_empty() {
            return Err("crystal plasticity requires grain orientation data at the quadrature points");
        }
        (self.update)(args)
    }

    /// Computes the consistent tangent stiffness
    fn stiffness(
        &self,
        dd: &mut Tensor4,
        def_grad: &Matrix,
        stress: &[f64],
        vars: &[f64],
    ) -> Result<(), StrError> {
        (self.stiffness_fn)(dd, def_grad, stress, vars)
    }
}

/// Sample incremental updater: isotropic hypoelastic stress update
///
/// Computes the small-strain increment `ε = sym(F − I)` and performs
/// `σ1 = σ0 + λ tr(ε) I + 2μ ε`. The first history value (if allocated)
/// accumulates the norm of the strain increments.
pub fn sample_hypoelastic_update(args: &mut PointState) -> Result<(), StrError> {
    let lam = SAMPLE_YOUNG * SAMPLE_POISSON / ((1.0 + SAMPLE_POISSON) * (1.0 - 2.0 * SAMPLE_POISSON));
    let mu = SAMPLE_YOUNG / (2.0 * (1.0 + SAMPLE_POISSON));
    let ff = args.def_grad;

    // strain increment (Voigt ordering, tensor shear components)
    let eps = [
        ff.get(0, 0) - 1.0,
        ff.get(1, 1) - 1.0,
        ff.get(2, 2) - 1.0,
        (ff.get(1, 0) + ff.get(0, 1)) / 2.0,
        (ff.get(2, 0) + ff.get(0, 2)) / 2.0,
        (ff.get(2, 1) + ff.get(1, 2)) / 2.0,
    ];
    let tr_eps = eps[0] + eps[1] + eps[2];

    // incremental stress update
    for i in 0..3 {
        args.stress1[i] = args.stress0[i] + lam * tr_eps + 2.0 * mu * eps[i];
        args.stress1[3 + i] = args.stress0[3 + i] + 2.0 * mu * eps[3 + i];
    }

    // normal block of the (constant) tangent
    for a in 0..3 {
        for b in 0..3 {
            let delta = if a == b { 1.0 } else { 0.0 };
            args.tangent[3 * a + b] = lam + 2.0 * mu * delta;
        }
    }

    // accumulate the strain increment norm
    if !args.vars1.is_empty() {
        let mut sum = 0.0;
        for i in 0..3 {
            sum += eps[i] * eps[i] + 2.0 * eps[3 + i] * eps[3 + i];
        }
        args.vars1[0] = args.vars0[0] + f64::sqrt(sum);
    }
    Ok(())
}

/// Sample stiffness routine: constant isotropic elasticity tensor
pub fn sample_hypoelastic_stiffness(
    dd: &mut Tensor4,
    _def_grad: &Matrix,
    _stress: &[f64],
    _vars: &[f64],
) -> Result<(), StrError> {
    let lam = SAMPLE_YOUNG * SAMPLE_POISSON / ((1.0 + SAMPLE_POISSON) * (1.0 - 2.0 * SAMPLE_POISSON));
    let mu = SAMPLE_YOUNG / (2.0 * (1.0 + SAMPLE_POISSON));
    let mat = dd.matrix_mut();
    let (nrow, ncol) = mat.dims();
    for i in 0..nrow {
        for j in 0..ncol {
            mat.set(
                i,
                j,
                2.0 * mu * P_SYMDEV[i][j] + (lam + 2.0 * mu / 3.0) * IDENTITY2[i] * IDENTITY2[j],
            );
        }
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
