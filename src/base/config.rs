use crate::StrError;
use gemlab::integ::{self, IntegPointData};
use gemlab::mesh::Cell;
use gemlab::shapes::{GeoClass, GeoKind};
use russell_sparse::Genie;

/// Defines the smallest allowed time step
///
/// The nonzero Dirichlet boundary function applies a fixed displacement increment
/// per step; smaller steps would over-resolve the prescribed ramp.
pub const CONFIG_MIN_DT: f64 = 0.2;

/// Defines the smallest allowed tolerance
pub const CONFIG_MIN_TOL: f64 = 1e-15;

/// Selects the linear solver backend for the Jacobian solves
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinSolKind {
    /// Restarted GMRES with a nodal block-Jacobi preconditioner (default)
    Gmres,

    /// Direct sparse factorization (UMFPACK/MUMPS) with a fill-reducing ordering
    Direct,

    /// MINRES with a smoother (l1-Jacobi) diagonal preconditioner
    Minres,
}

/// Holds configuration parameters and controls the simulation
pub struct Config {
    /// Initial time
    pub t_ini: f64,

    /// Final (pseudo) time
    pub t_fin: f64,

    /// Time step
    pub dt: f64,

    /// Minimum allowed time step
    pub dt_min: f64,

    /// Maximum number of time steps
    pub n_max_time_steps: usize,

    /// Maximum number of Newton iterations per time step
    pub n_max_iterations: usize,

    /// Absolute tolerance for the residual vector
    pub tol_abs_residual: f64,

    /// Relative tolerance for the residual vector
    pub tol_rel_residual: f64,

    /// Linear solver backend
    pub lin_sol_kind: LinSolKind,

    /// Direct sparse solver kind (Direct backend only)
    pub lin_sol_genie: Genie,

    /// Relative tolerance of the iterative linear solvers
    pub lin_sol_tol_rel: f64,

    /// Absolute tolerance of the iterative linear solvers
    pub lin_sol_tol_abs: f64,

    /// Maximum number of iterations of the iterative linear solvers
    pub lin_sol_n_max_iterations: usize,

    /// Restart length of GMRES
    pub gmres_restart: usize,

    /// Enables the live visualization stream
    pub visualization: bool,

    /// Streams to the visualization socket every n-th timestep
    pub vis_steps: usize,

    /// Verbose mode during timesteps
    pub verbose_timesteps: bool,

    /// Verbose mode during iterations
    pub verbose_iterations: bool,
}

impl Config {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        Config {
            t_ini: 0.0,
            t_fin: 1.0,
            dt: 0.2,
            dt_min: CONFIG_MIN_DT,
            n_max_time_steps: 1_000,
            n_max_iterations: 500,
            tol_abs_residual: 1e-12,
            tol_rel_residual: 1e-12,
            lin_sol_kind: LinSolKind::Gmres,
            lin_sol_genie: Genie::Umfpack,
            lin_sol_tol_rel: 1e-12,
            lin_sol_tol_abs: 1e-12,
            lin_sol_n_max_iterations: 300,
            gmres_restart: 30,
            visualization: false,
            vis_steps: 1,
            verbose_timesteps: true,
            verbose_iterations: true,
        }
    }

    /// Validates all data
    ///
    /// Returns a message with the first inconsistency, or None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.t_ini < 0.0 {
            return Some(format!("t_ini = {:?} is incorrect; it must be ≥ 0.0", self.t_ini));
        }
        if self.t_fin <= self.t_ini {
            return Some(format!(
                "t_fin = {:?} is incorrect; it must be > t_ini = {:?}",
                self.t_fin, self.t_ini
            ));
        }
        if self.dt < self.dt_min {
            return Some(format!(
                "dt = {:?} is incorrect; it must be ≥ dt_min = {:?}",
                self.dt, self.dt_min
            ));
        }
        if self.n_max_iterations < 1 {
            return Some(format!(
                "n_max_iterations = {:?} is incorrect; it must be ≥ 1",
                self.n_max_iterations
            ));
        }
        if self.tol_abs_residual < CONFIG_MIN_TOL {
            return Some(format!(
                "tol_abs_residual = {:?} is incorrect; it must be ≥ {:e}",
                self.tol_abs_residual, CONFIG_MIN_TOL
            ));
        }
        if self.tol_rel_residual < CONFIG_MIN_TOL {
            return Some(format!(
                "tol_rel_residual = {:?} is incorrect; it must be ≥ {:e}",
                self.tol_rel_residual, CONFIG_MIN_TOL
            ));
        }
        if self.lin_sol_tol_rel < CONFIG_MIN_TOL {
            return Some(format!(
                "lin_sol_tol_rel = {:?} is incorrect; it must be ≥ {:e}",
                self.lin_sol_tol_rel, CONFIG_MIN_TOL
            ));
        }
        if self.lin_sol_n_max_iterations < 1 {
            return Some(format!(
                "lin_sol_n_max_iterations = {:?} is incorrect; it must be ≥ 1",
                self.lin_sol_n_max_iterations
            ));
        }
        if self.gmres_restart < 1 {
            return Some(format!(
                "gmres_restart = {:?} is incorrect; it must be ≥ 1",
                self.gmres_restart
            ));
        }
        if self.vis_steps < 1 {
            return Some(format!("vis_steps = {:?} is incorrect; it must be ≥ 1", self.vis_steps));
        }
        None // all good
    }

    /// Returns the integration (quadrature) points of a cell
    ///
    /// The quadrature degree is fixed at `2 × order + 3`, where order is the
    /// polynomial order of the cell geometry; the rule is capped at the richest
    /// set available for the geometry class (Hex → 27 points, Tet → 14 points).
    pub fn integ_point_data(&self, cell: &Cell) -> Result<IntegPointData, StrError> {
        match cell.kind {
            GeoKind::Tet4 | GeoKind::Tet10 => integ::points(GeoClass::Tet, 14),
            GeoKind::Hex8 | GeoKind::Hex20 => integ::points(GeoClass::Hex, 27),
            _ => Err("cell kind is not available for solid mechanics; use Tet or Hex cells"),
        }
    }

    /// Prints the header of the table with timestep and iteration data
    #[inline]
    pub fn print_header(&self) {
        if self.verbose_timesteps || self.verbose_iterations {
            println!("Legend:");
            println!("✅ : converged");
            println!("👍 : converging");
            println!("🥵 : diverging");
            println!("😱 : found NaN or Inf\n");
            println!(
                "{:>8} {:>13} {:>13} {:>5} {:>8}   {:>8}  ",
                "timestep", "t", "Δt", "iter", "‖R‖", "tol·‖R₀‖"
            );
        }
    }

    /// Prints timestep data
    #[inline]
    #[rustfmt::skip]
    pub fn print_timestep(&self, timestep: usize, t: f64, dt: f64) {
        if !self.verbose_timesteps {
            return;
        }
        println!(
            "{:>8} {:>13.6e} {:>13.6e} {:>5} {:>8}   {:>8}  ",
            timestep, t, dt, ".", ".", "."
        );
    }

    /// Prints iteration data
    #[inline]
    pub fn print_iteration(&self, it: usize, norm_rr: f64, norm_rr0: f64) {
        if !self.verbose_iterations {
            return;
        }
        let (l, r) = if !norm_rr.is_finite() {
            ("😱", "  ") // found NaN or Inf
        } else if norm_rr < self.tol_abs_residual {
            ("✅", "  ") // converged on absolute residual
        } else if it == 0 {
            ("  ", "? ") // first iteration (we don't have norm_rr0 yet)
        } else if norm_rr < self.tol_rel_residual * norm_rr0 {
            ("  ", "✅") // converged on relative residual
        } else if norm_rr > norm_rr0 {
            ("🥵", "  ") // diverging
        } else {
            ("👍", "  ") // converging
        };
        let n = it + 1;
        let v = self.tol_rel_residual * norm_rr0;
        println!(
            "{:>8} {:>13} {:>13} {:>5} {:>8.2e}{} {:>8.2e}{}",
            ".", ".", ".", n, norm_rr, l, v, r,
        );
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
