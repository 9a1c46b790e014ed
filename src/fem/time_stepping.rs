use super::{BcEssentialArray, FemMesh, FemState, FileIo, NewtonSolver, Visualization};
use crate::base::{BcRole, Config, Essential};
use crate::material::ParamMaterial;
use crate::{FnBcDisplacement, StrError};
use russell_lab::{vec_add, vec_copy};

/// Index of the boundary attribute with the homogeneous Dirichlet role
pub const BC_ATTRIBUTE_FIXED: usize = 0;

/// Index of the boundary attribute with the prescribed (nonzero) Dirichlet role
pub const BC_ATTRIBUTE_PRESCRIBED: usize = 1;

/// Implements the quasi-static time stepping controller
///
/// Every pseudo-time step applies the prescribed boundary displacement at the
/// new time, runs the Newton driver, and accepts the converged configuration as
/// the reference configuration of the next step (updated-Lagrangian stepping).
pub struct TimeStepping<'a> {
    /// Holds configuration parameters
    pub config: &'a Config,

    /// Holds the mesh and DOF numbers
    pub fem: &'a FemMesh<'a>,

    /// Holds the boundary attributes and their per-step roles
    pub essential: Essential,

    /// The prescribed boundary displacement function
    pub bc_fn: FnBcDisplacement,

    /// Holds the nonlinear mechanics operator and Newton driver
    pub newton: NewtonSolver<'a>,

    /// Generates the per-step output files
    pub file_io: FileIo,

    /// Streams to the live visualization server (optional)
    pub vis: Visualization,
}

impl<'a> TimeStepping<'a> {
    /// Allocates a new instance
    ///
    /// The essential boundary conditions must define at least two attributes:
    /// attribute 0 takes the homogeneous role and attribute 1 takes the
    /// prescribed (nonzero) role at every step.
    pub fn new(
        fem: &'a FemMesh,
        config: &'a Config,
        param: &ParamMaterial,
        essential: Essential,
        bc_fn: FnBcDisplacement,
        file_io: FileIo,
    ) -> Result<Self, StrError> {
        if essential.n_attribute() < 2 {
            return Err("two boundary attributes (fixed and prescribed) must be defined");
        }
        let newton = NewtonSolver::new(fem, config, param)?;
        let vis = Visualization::new(config.visualization);
        Ok(TimeStepping {
            config,
            fem,
            essential,
            bc_fn,
            newton,
            file_io,
            vis,
        })
    }

    /// Initializes the history values of the material models
    pub fn initialize(&mut self, state: &mut FemState) -> Result<(), StrError> {
        self.newton.elements.init_history(state)
    }

    /// Runs the time loop until the final time
    pub fn run(&mut self, state: &mut FemState) -> Result<(), StrError> {
        let config = &self.config;
        config.print_header();

        let mut last_step = false;
        for ti in 1..=config.n_max_time_steps {
            // advance the pseudo time
            let dt_real = f64::min(state.dt, config.t_fin - state.t);
            state.t += dt_real;

            // fresh boundary-role map for this step
            self.essential.reset();
            self.essential.set_role(BC_ATTRIBUTE_PRESCRIBED, BcRole::Prescribed)?;
            self.essential.set_role(BC_ATTRIBUTE_FIXED, BcRole::Fixed)?;
            let bcs = BcEssentialArray::new(self.fem, &self.essential, self.bc_fn, state.t)?;

            // solve the Newton system (fatal on non-convergence)
            config.print_timestep(ti, state.t, dt_real);
            self.newton.solve(state, &bcs)?;

            // accepted configuration and deformation
            let neq = state.uu.dim();
            for i in 0..neq {
                state.xx[i] = state.xx_ref[i] + state.uu[i];
            }
            vec_add(&mut state.xx_def, 1.0, &state.xx, -1.0, &state.xx_ref)?;

            last_step = state.t >= config.t_fin - 1e-8 * state.dt;
            if !last_step {
                // the accepted configuration becomes the new reference
                vec_copy(&mut state.xx_ref, &state.xx)?;
                self.newton.elements.update_reference(&state.xx_ref);
                state.quad.commit();
                state.uu.fill(0.0);
            }

            // per-step output
            self.file_io.write_step(self.fem.mesh, state, ti)?;
            if ti % config.vis_steps == 0 || last_step {
                self.vis.send_step(state, ti);
            }

            if last_step {
                break;
            }
        }
        if !last_step {
            return Err("the maximum number of time steps was reached before the final time");
        }
        self.file_io.write_summary()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::TimeStepping;
    use crate::base::{Config, Essential};
    use crate::fem::{FemMesh, FemState, FileIo};
    use crate::material::ParamMaterial;
    use gemlab::mesh::Samples;

    fn zero_bc(_x: &[f64], _t: f64) -> Vec<f64> {
        vec![0.0, 0.0, 0.0]
    }

    #[test]
    fn new_captures_errors() {
        let mesh = Samples::one_hex8();
        let fem = FemMesh::new(&mesh).unwrap();
        let config = Config::new();
        let param = ParamMaterial::sample_neo_hookean();
        let essential = Essential::new(vec![vec![0]]);
        assert_eq!(
            TimeStepping::new(&fem, &config, &param, essential, zero_bc, FileIo::new()).err(),
            Some("two boundary attributes (fixed and prescribed) must be defined")
        );
    }

    #[test]
    fn run_with_zero_bc_works() {
        let mesh = Samples::one_hex8();
        let fem = FemMesh::new(&mesh).unwrap();
        let mut config = Config::new();
        config.verbose_timesteps = false;
        config.verbose_iterations = false;
        let param = ParamMaterial::sample_neo_hookean();

        let mut bottom = Vec::new();
        let mut top = Vec::new();
        for point in &mesh.points {
            if point.coords[2] < 0.01 {
                bottom.push(point.id);
            } else {
                top.push(point.id);
            }
        }
        let essential = Essential::new(vec![bottom, top]);
        let mut sim = TimeStepping::new(&fem, &config, &param, essential, zero_bc, FileIo::new()).unwrap();
        let mut state = FemState::new(&fem, &config, &param, 0).unwrap();
        sim.initialize(&mut state).unwrap();
        sim.run(&mut state).unwrap();

        // t advanced to t_fin and nothing moved
        assert!(state.t >= config.t_fin - 1e-10);
        for i in 0..state.xx.dim() {
            assert_eq!(state.xx[i], state.xx_ref[i] + state.uu[i]);
            assert_eq!(state.xx_def[i], 0.0);
        }
    }
}
