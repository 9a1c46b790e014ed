use super::{Incremental, NeoHookean};
use crate::StrError;
use russell_lab::Matrix;
use russell_tensor::Tensor4;

/// Holds the per-quadrature-point data exchanged with material models
///
/// The beginning-of-step buffers are read-only during a time step; the
/// end-of-step buffers are rewritten on every evaluation and must not be used
/// to accumulate state across evaluations.
pub struct PointState<'a> {
    /// Deformation gradient F = I + ∂u/∂X relative to the beginning-of-step configuration (3×3)
    pub def_grad: &'a Matrix,

    /// Beginning-of-step stress (Voigt, 6 components)
    pub stress0: &'a [f64],

    /// End-of-step stress (Voigt, 6 components)
    pub stress1: &'a mut [f64],

    /// End-of-step tangent summary (row-major 3×3 normal block, 9 components)
    pub tangent: &'a mut [f64],

    /// Beginning-of-step history values
    pub vars0: &'a [f64],

    /// End-of-step history values
    pub vars1: &'a mut [f64],

    /// Grain orientation values (empty unless crystal plasticity)
    pub orientation: &'a [f64],
}

/// Defines the signature of user-supplied incremental stress-update routines
pub type FnStressUpdate = fn(args: &mut PointState) -> Result<(), StrError>;

/// Defines the signature of user-supplied consistent stiffness routines
pub type FnStiffness =
    fn(dd: &mut Tensor4, def_grad: &Matrix, stress: &[f64], vars: &[f64]) -> Result<(), StrError>;

/// Holds material model parameters
#[derive(Clone, Copy, Debug)]
pub enum ParamMaterial {
    /// Closed-form compressible Neo-Hookean hyperelastic model
    NeoHookean {
        /// Shear-like material constant
        shear: f64,

        /// Bulk-like material constant
        bulk: f64,
    },

    /// User-supplied incremental (UMAT-style) model
    UserDefined {
        update: FnStressUpdate,
        stiffness: FnStiffness,
        n_history: usize,
    },

    /// User-supplied crystal-plasticity model (requires grain orientation data)
    CrystalPlasticity {
        update: FnStressUpdate,
        stiffness: FnStiffness,
        n_history: usize,
    },
}

impl ParamMaterial {
    /// Returns sample parameters for the Neo-Hookean model
    pub fn sample_neo_hookean() -> Self {
        ParamMaterial::NeoHookean { shear: 0.25, bulk: 5.0 }
    }

    /// Returns the number of history values per quadrature point
    pub fn n_history(&self) -> usize {
        match self {
            ParamMaterial::NeoHookean { .. } => 0,
            ParamMaterial::UserDefined { n_history, .. } => *n_history,
            ParamMaterial::CrystalPlasticity { n_history, .. } => *n_history,
        }
    }
}

/// Specifies the essential functions of mechanical constitutive models
pub trait MechModelTrait: Send {
    /// Indicates that the stiffness matrix is symmetric
    fn symmetric_stiffness(&self) -> bool;

    /// Returns the number of history values per quadrature point
    fn n_history(&self) -> usize;

    /// Initializes the history values
    fn init_history(&self, vars: &mut [f64], orientation: &[f64]) -> Result<(), StrError>;

    /// Updates the end-of-step stress, tangent summary, and history
    ///
    /// The update always starts from the beginning-of-step buffers; repeated
    /// calls with the same deformation gradient produce identical results.
    fn update_stress(&mut self, args: &mut PointState) -> Result<(), StrError>;

    /// Computes the consistent tangent stiffness for the Jacobian assembly
    fn stiffness(
        &self,
        dd: &mut Tensor4,
        def_grad: &Matrix,
        stress: &[f64],
        vars: &[f64],
    ) -> Result<(), StrError>;
}

/// Holds the actual constitutive model implementation
pub struct MechModel {
    /// Holds the actual model implementation
    pub actual: Box<dyn MechModelTrait>,
}

impl MechModel {
    /// Allocates a new instance
    pub fn new(param: &ParamMaterial) -> Result<Self, StrError> {
        let actual: Box<dyn MechModelTrait> = match param {
            ParamMaterial::NeoHookean { shear, bulk } => Box::new(NeoHookean::new(*shear, *bulk)?),
            ParamMaterial::UserDefined {
                update,
                stiffness,
                n_history,
            } => Box::new(Incremental::new(*update, *stiffness, *n_history, false)),
            ParamMaterial::CrystalPlasticity {
                update,
                stiffness,
                n_history,
            } => Box::new(Incremental::new(*update, *stiffness, *n_history, true)),
        };
        Ok(MechModel { actual })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{MechModel, ParamMaterial};
    use crate::material::{sample_hypoelastic_stiffness, sample_hypoelastic_update};

    #[test]
    fn n_history_works() {
        assert_eq!(ParamMaterial::sample_neo_hookean().n_history(), 0);
        let param = ParamMaterial::UserDefined {
            update: sample_hypoelastic_update,
            stiffness: sample_hypoelastic_stiffness,
            n_history: 3,
        };
        assert_eq!(param.n_history(), 3);
    }

    #[test]
    fn new_works() {
        let model = MechModel::new(&ParamMaterial::sample_neo_hookean()).unwrap();
        assert_eq!(model.actual.n_history(), 0);
        assert_eq!(model.actual.symmetric_stiffness(), true);

        let param = ParamMaterial::CrystalPlasticity {
            update: sample_hypoelastic_update,
            stiffness: sample_hypoelastic_stiffness,
            n_history: 1,
        };
        let model = MechModel::new(&param).unwrap();
        assert_eq!(model.actual.n_history(), 1);
    }
}
