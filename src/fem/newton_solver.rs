use super::{BcEssentialArray, Elements, FemMesh, FemState, LinSolStrategy, LinearSystem, PrecondData};
use crate::base::Config;
use crate::material::ParamMaterial;
use crate::StrError;
use russell_lab::{vec_norm, Norm};
use russell_sparse::SparseMatrix;

/// Holds the convergence statistics of one Newton solve
#[derive(Clone, Copy, Debug)]
pub struct NewtonStats {
    /// The residual norm satisfied a tolerance within the iteration budget
    pub converged: bool,

    /// Number of residual evaluations performed
    ///
    /// An exact initial guess (e.g., zero load) converges with one evaluation
    /// and no linear solve.
    pub iterations: usize,

    /// Euclidean norm of the residual at the last evaluation
    pub norm_rr: f64,
}

/// Implements the nonlinear mechanics operator and its Newton driver
///
/// The operator exposes the residual evaluation and the Jacobian of the
/// assembled system, and drives the Newton-Raphson iterations per time step
/// through [NewtonSolver::solve].
pub struct NewtonSolver<'a> {
    /// Holds configuration parameters
    pub config: &'a Config,

    /// Holds the collection of elements (residual/Jacobian assembler)
    pub elements: Elements<'a>,

    /// Holds the variables of the global linear system
    pub lin_system: LinearSystem,

    /// Holds the linear solver backend
    pub strategy: LinSolStrategy<'a>,

    /// Holds the preconditioner data of the iterative backends
    pub precond: PrecondData,
}

impl<'a> NewtonSolver<'a> {
    /// Allocates a new instance
    pub fn new(fem: &'a FemMesh, config: &'a Config, param: &ParamMaterial) -> Result<Self, StrError> {
        if let Some(_) = config.validate() {
            return Err("cannot allocate the solver because config.validate() failed");
        }
        let elements = Elements::new(fem, config, param)?;
        let lin_system = LinearSystem::new(fem, &elements)?;
        let strategy = LinSolStrategy::new(config)?;
        let precond = PrecondData::new(fem.equations.n_equation, fem.mesh.ndim)?;
        Ok(NewtonSolver {
            config,
            elements,
            lin_system,
            strategy,
            precond,
        })
    }

    /// Accesses the assembled Jacobian matrix
    ///
    /// The returned view is derived from the latest residual evaluation and is
    /// valid only until the next call to [NewtonSolver::solve] (which
    /// re-evaluates the residual); it must not be stored across iterations.
    pub fn jacobian(&self) -> &SparseMatrix {
        &self.lin_system.kk
    }

    /// Solves the nonlinear system for one time step
    ///
    /// The trial displacement in `state.uu` is the initial guess (iterative
    /// mode) and is mutated in place; on success it holds the accepted step
    /// solution. Non-convergence within the iteration budget is a fatal error.
    pub fn solve(&mut self, state: &mut FemState, bcs: &BcEssentialArray) -> Result<NewtonStats, StrError> {
        // set the prescribed increments on the trial displacement
        bcs.apply(&mut state.uu);
        let prescribed = &bcs.flags;

        let neq = self.lin_system.n_equation;
        let mut stats = NewtonStats {
            converged: false,
            iterations: 0,
            norm_rr: f64::INFINITY,
        };
        let mut norm_rr0 = 0.0;

        for iteration in 0..self.config.n_max_iterations {
            // refresh the end-of-step quadrature generation and the residual
            self.elements.update_state(state)?;
            self.elements.calc_residuals(state)?;
            self.elements.assemble_residuals(&mut self.lin_system.rr, prescribed);

            // check convergence
            let norm_rr = vec_norm(&self.lin_system.rr, Norm::Euc);
            stats.iterations = iteration + 1;
            stats.norm_rr = norm_rr;
            if iteration == 0 {
                norm_rr0 = norm_rr;
            }
            self.config.print_iteration(iteration, norm_rr, norm_rr0);
            if !norm_rr.is_finite() {
                return Err("the residual norm is not finite (NaN or Inf)");
            }
            if norm_rr < self.config.tol_abs_residual || norm_rr < self.config.tol_rel_residual * norm_rr0 {
                stats.converged = true;
                return Ok(stats);
            }

            // assemble the Jacobian (valid until the next residual evaluation)
            self.elements.calc_jacobians(state)?;
            let kk = self.lin_system.kk.get_coo_mut()?;
            self.elements.assemble_jacobians(kk, prescribed)?;
            for eq in &bcs.equations {
                kk.put(*eq, *eq, 1.0)?;
            }
            self.precond.update(&self.elements, prescribed)?;

            // solve for the correction and update the trial displacement
            self.strategy.solve(
                &mut self.lin_system.kk,
                &self.lin_system.rr,
                &self.precond,
                &mut self.lin_system.mdu,
                false,
            )?;
            for i in 0..neq {
                state.uu[i] -= self.lin_system.mdu[i];
            }
        }
        Err("Newton-Raphson did not converge")
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
