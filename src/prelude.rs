//! Makes available common structures needed to run a simulation
//!
//! You may write `use amsim::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{BcRole, Config, Dof, Essential, LinSolKind, DEFAULT_OUT_DIR, DEFAULT_TEST_DIR};
pub use crate::fem::{
    read_mesh, BcEssentialArray, FemMesh, FemState, FileIo, NewtonSolver, TimeStepping,
};
pub use crate::material::{GrainData, MaterialSelection, MechModel, ParamMaterial};
pub use crate::{FnBcDisplacement, StrError};
