use crate::StrError;

/// Holds the material model and grain-orientation selection flags
///
/// Exactly one of {hyperelastic, user_defined, crystal_plasticity} must be set.
/// The grain flags only matter for crystal plasticity, where exactly one
/// orientation representation must be selected.
#[derive(Clone, Debug)]
pub struct MaterialSelection {
    /// Neo-Hookean hyperelastic model
    pub hyperelastic: bool,

    /// User-supplied incremental (UMAT-style) model
    pub user_defined: bool,

    /// User-supplied crystal-plasticity model
    pub crystal_plasticity: bool,

    /// Grain orientations given as Euler angles (3 values per grain)
    pub grain_euler: bool,

    /// Grain orientations given as quaternions (4 values per grain)
    pub grain_quaternion: bool,

    /// Uniform grain orientation (a single 3-vector for all grains)
    pub grain_uniform: bool,

    /// Number of grains
    pub n_grains: usize,

    /// The uniform grain orientation vector (with grain_uniform only)
    pub grain_uniform_vector: Vec<f64>,
}

impl MaterialSelection {
    /// Allocates a new instance with all flags unset
    pub fn new() -> Self {
        MaterialSelection {
            hyperelastic: false,
            user_defined: false,
            crystal_plasticity: false,
            grain_euler: false,
            grain_quaternion: false,
            grain_uniform: false,
            n_grains: 0,
            grain_uniform_vector: Vec::new(),
        }
    }

    /// Validates the combination of material model and grain data flags
    pub fn validate(&self) -> Result<(), StrError> {
        let n_models = [self.hyperelastic, self.user_defined, self.crystal_plasticity]
            .iter()
            .filter(|f| **f)
            .count();
        if n_models == 0 {
            return Err("a material model must be selected");
        }
        if n_models > 1 {
            return Err("cannot select more than one material model");
        }
        if self.crystal_plasticity {
            let n_repr = [self.grain_euler, self.grain_quaternion, self.grain_uniform]
                .iter()
                .filter(|f| **f)
                .count();
            if n_repr == 0 {
                return Err("crystal plasticity requires a grain orientation representation");
            }
            if n_repr > 1 {
                return Err("cannot select more than one grain orientation representation");
            }
            if self.grain_uniform && self.grain_uniform_vector.len() != 3 {
                return Err("a uniform grain orientation vector with three components must be given");
            }
            if self.n_grains < 1 {
                return Err("the number of grains must be at least one for crystal plasticity");
            }
        }
        Ok(())
    }

    /// Returns the number of values defining one grain orientation
    ///
    /// Returns zero if crystal plasticity is not selected.
    pub fn grain_offset(&self) -> usize {
        if !self.crystal_plasticity {
            return 0;
        }
        if self.grain_quaternion {
            4
        } else {
            3 // Euler angles or uniform vector
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
