use super::Elements;
use crate::base::{Config, LinSolKind};
use crate::StrError;
use russell_lab::{mat_inverse, vec_inner, vec_norm, Matrix, Norm, Vector};
use russell_sparse::{CooMatrix, LinSolParams, LinSolver, Ordering, SparseMatrix};

/// Holds preconditioner data assembled alongside the global Jacobian
///
/// Two preconditioners share this storage: the elasticity-aware nodal
/// block-Jacobi (the inverted ndim × ndim diagonal block of each node, coupling
/// the displacement components of the node) used by GMRES, and the smoother
/// (l1-Jacobi) diagonal used by MINRES. Until [PrecondData::update] is called,
/// both act as the identity.
pub struct PrecondData {
    /// Space dimension (size of the nodal blocks)
    ndim: usize,

    /// Inverted nodal diagonal blocks (ndim × ndim each)
    blocks: Vec<Matrix>,

    /// Sums of the absolute row values (smoother diagonal)
    l1_diag: Vector,
}

impl PrecondData {
    /// Allocates a new instance acting as the identity
    pub fn new(n_equation: usize, ndim: usize) -> Result<Self, StrError> {
        if ndim < 1 || n_equation % ndim != 0 {
            return Err("n_equation must be a multiple of ndim");
        }
        let n_node = n_equation / ndim;
        let mut identity = Matrix::new(ndim, ndim);
        for d in 0..ndim {
            identity.set(d, d, 1.0);
        }
        let mut l1_diag = Vector::new(n_equation);
        l1_diag.fill(1.0);
        Ok(PrecondData {
            ndim,
            blocks: vec![identity; n_node],
            l1_diag,
        })
    }

    /// Rebuilds the preconditioner data from the local Jacobian matrices
    ///
    /// **Note:** You must call the elements' calc jacobians first. Prescribed
    /// equations receive unit entries.
    pub fn update(&mut self, elements: &Elements, prescribed: &[bool]) -> Result<(), StrError> {
        let ndim = self.ndim;
        let n_node = self.blocks.len();
        let mut acc = vec![Matrix::new(ndim, ndim); n_node];
        self.l1_diag.fill(0.0);

        // accumulate nodal blocks and l1 row sums
        for e in &elements.all {
            let n_local = e.local_to_global.len();
            for i in 0..n_local {
                let gi = e.local_to_global[i];
                if prescribed[gi] {
                    continue;
                }
                for j in 0..n_local {
                    let gj = e.local_to_global[j];
                    if prescribed[gj] {
                        continue;
                    }
                    let value = e.jacobian.get(i, j);
                    self.l1_diag[gi] += f64::abs(value);
                    if gi / ndim == gj / ndim {
                        let node = gi / ndim;
                        let (a, b) = (gi % ndim, gj % ndim);
                        let cur = acc[node].get(a, b);
                        acc[node].set(a, b, cur + value);
                    }
                }
            }
        }

        // prescribed and untouched equations act as the identity
        for eq in 0..self.l1_diag.dim() {
            if self.l1_diag[eq] == 0.0 {
                self.l1_diag[eq] = 1.0;
            }
        }
        for node in 0..n_node {
            for d in 0..ndim {
                if acc[node].get(d, d) == 0.0 {
                    acc[node].set(d, d, 1.0);
                }
            }
            mat_inverse(&mut self.blocks[node], &acc[node])
                .map_err(|_| "cannot invert a nodal block of the preconditioner")?;
        }
        Ok(())
    }

    /// Applies the nodal block-Jacobi preconditioner: z = P⁻¹ r
    pub fn apply_blocks(&self, z: &mut Vector, r: &Vector) {
        let ndim = self.ndim;
        for node in 0..self.blocks.len() {
            for a in 0..ndim {
                let mut sum = 0.0;
                for b in 0..ndim {
                    sum += self.blocks[node].get(a, b) * r[node * ndim + b];
                }
                z[node * ndim + a] = sum;
            }
        }
    }

    /// Applies the smoother (l1-Jacobi) diagonal preconditioner: z = D⁻¹ r
    pub fn apply_l1(&self, z: &mut Vector, r: &Vector) {
        for i in 0..self.l1_diag.dim() {
            z[i] = r[i] / self.l1_diag[i];
        }
    }
}

/// Selects and configures the linear solver backend for Jacobian solves
///
/// Contract: [LinSolStrategy::solve] computes the correction with the
/// configured tolerances and iteration cap; non-convergence of the iterative
/// backends is an error, never a silently stale correction.
pub struct LinSolStrategy<'a> {
    /// Selected backend
    kind: LinSolKind,

    /// Direct sparse solver (Direct backend only)
    solver: Option<LinSolver<'a>>,

    /// Parameters of the direct sparse solver (fill-reducing ordering)
    params: LinSolParams,

    /// Relative tolerance of the iterative backends
    tol_rel: f64,

    /// Absolute tolerance of the iterative backends
    tol_abs: f64,

    /// Iteration cap of the iterative backends
    n_max_iterations: usize,

    /// Restart length of GMRES
    restart: usize,
}

impl<'a> LinSolStrategy<'a> {
    /// Allocates a new instance
    pub fn new(config: &Config) -> Result<Self, StrError> {
        let solver = match config.lin_sol_kind {
            LinSolKind::Direct => Some(LinSolver::new(config.lin_sol_genie)?),
            _ => None,
        };
        let mut params = LinSolParams::new();
        params.ordering = Ordering::Metis; // fill-reducing permutation
        Ok(LinSolStrategy {
            kind: config.lin_sol_kind,
            solver,
            params,
            tol_rel: config.lin_sol_tol_rel,
            tol_abs: config.lin_sol_tol_abs,
            n_max_iterations: config.lin_sol_n_max_iterations,
            restart: config.gmres_restart,
        })
    }

    /// Solves the linear system K · mdu = R
    pub fn solve(
        &mut self,
        kk: &mut SparseMatrix,
        rr: &Vector,
        precond: &PrecondData,
        mdu: &mut Vector,
        verbose: bool,
    ) -> Result<(), StrError> {
        match self.kind {
            LinSolKind::Direct => {
                let solver = self.solver.as_mut().unwrap(); // allocated in new
                solver.actual.factorize(kk, Some(self.params))?;
                solver.actual.solve(mdu, kk, rr, verbose)
            }
            LinSolKind::Gmres => gmres_solve(
                kk.get_coo()?,
                rr,
                precond,
                mdu,
                self.tol_rel,
                self.tol_abs,
                self.n_max_iterations,
                self.restart,
            ),
            LinSolKind::Minres => minres_solve(
                kk.get_coo()?,
                rr,
                precond,
                mdu,
                self.tol_rel,
                self.tol_abs,
                self.n_max_iterations,
            ),
        }
    }
}

/// Computes a Givens rotation (c, s, rho)
fn givens(a: f64, b: f64) -> (f64, f64, f64) {
    if f64::abs(b) < 1e-40 {
        (1.0, 0.0, a)
    } else if f64::abs(b) > f64::abs(a) {
        let tau = a / b;
        let s = 1.0 / f64::sqrt(1.0 + tau * tau);
        let c = s * tau;
        (c, s, b * f64::sqrt(1.0 + tau * tau))
    } else {
        let tau = b / a;
        let c = 1.0 / f64::sqrt(1.0 + tau * tau);
        let s = c * tau;
        (c, s, a * f64::sqrt(1.0 + tau * tau))
    }
}

/// Solves A x = b with restarted right-preconditioned GMRES
fn gmres_solve(
    aa: &CooMatrix,
    b: &Vector,
    precond: &PrecondData,
    x: &mut Vector,
    tol_rel: f64,
    tol_abs: f64,
    n_max_iterations: usize,
    restart: usize,
) -> Result<(), StrError> {
    let n = b.dim();
    x.fill(0.0);
    let b_norm = vec_norm(b, Norm::Euc);
    if b_norm <= tol_abs {
        return Ok(());
    }

    let m = restart;
    let mut v = vec![Vector::new(n); m + 1];
    let mut z = Vector::new(n);
    let mut w = Vector::new(n);
    let mut r = Vector::new(n);
    let mut h = Matrix::new(m + 1, m);
    let mut g = vec![0.0; m + 1];
    let mut cs = vec![0.0; m];
    let mut sn = vec![0.0; m];
    let mut total_iterations = 0;

    loop {
        // residual r = b − A x
        aa.mat_vec_mul(&mut r, 1.0, x)?;
        for i in 0..n {
            r[i] = b[i] - r[i];
        }
        let r_norm = vec_norm(&r, Norm::Euc);
        if r_norm < tol_rel * b_norm || r_norm < tol_abs {
            return Ok(());
        }
        if total_iterations >= n_max_iterations {
            return Err("GMRES did not converge within the maximum number of iterations");
        }

        // Arnoldi process with modified Gram-Schmidt
        for i in 0..n {
            v[0][i] = r[i] / r_norm;
        }
        g.iter_mut().for_each(|value| *value = 0.0);
        g[0] = r_norm;
        let mut k = 0;
        for j in 0..m {
            precond.apply_blocks(&mut z, &v[j]);
            aa.mat_vec_mul(&mut w, 1.0, &z)?;
            for i in 0..=j {
                let hij = vec_inner(&v[i], &w);
                h.set(i, j, hij);
                for l in 0..n {
                    w[l] -= hij * v[i][l];
                }
            }
            let hjj = vec_norm(&w, Norm::Euc);
            h.set(j + 1, j, hjj);
            if hjj > 1e-40 {
                for l in 0..n {
                    v[j + 1][l] = w[l] / hjj;
                }
            }

            // apply the previous Givens rotations and compute a new one
            for i in 0..j {
                let t = cs[i] * h.get(i, j) + sn[i] * h.get(i + 1, j);
                h.set(i + 1, j, -sn[i] * h.get(i, j) + cs[i] * h.get(i + 1, j));
                h.set(i, j, t);
            }
            let (c, s, rho) = givens(h.get(j, j), h.get(j + 1, j));
            cs[j] = c;
            sn[j] = s;
            h.set(j, j, rho);
            h.set(j + 1, j, 0.0);
            let t = c * g[j];
            g[j + 1] = -s * g[j];
            g[j] = t;

            k = j + 1;
            total_iterations += 1;
            let res = f64::abs(g[k]);
            if res < tol_rel * b_norm || res < tol_abs || total_iterations >= n_max_iterations {
                break;
            }
        }

        // back substitution and update x += M⁻¹ (V y)
        let mut y = vec![0.0; k];
        for i in (0..k).rev() {
            let mut sum = g[i];
            for j in (i + 1)..k {
                sum -= h.get(i, j) * y[j];
            }
            if f64::abs(h.get(i, i)) < 1e-40 {
                break;
            }
            y[i] = sum / h.get(i, i);
        }
        w.fill(0.0);
        for j in 0..k {
            for l in 0..n {
                w[l] += v[j][l] * y[j];
            }
        }
        precond.apply_blocks(&mut z, &w);
        for l in 0..n {
            x[l] += z[l];
        }
    }
}

/// Solves A x = b with preconditioned MINRES (A symmetric, possibly indefinite)
fn minres_solve(
    aa: &CooMatrix,
    b: &Vector,
    precond: &PrecondData,
    x: &mut Vector,
    tol_rel: f64,
    tol_abs: f64,
    n_max_iterations: usize,
) -> Result<(), StrError> {
    let n = b.dim();
    x.fill(0.0);
    let b_norm = vec_norm(b, Norm::Euc);
    if b_norm <= tol_abs {
        return Ok(());
    }

    // Lanczos initialization
    let mut r1 = Vector::new(n);
    let mut r2 = Vector::new(n);
    let mut y = Vector::new(n);
    let mut v = Vector::new(n);
    let mut av = Vector::new(n);
    let mut w = Vector::new(n);
    let mut w1 = Vector::new(n);
    let mut w2 = Vector::new(n);
    for i in 0..n {
        r1[i] = b[i];
        r2[i] = b[i];
    }
    precond.apply_l1(&mut y, &r1);
    let beta1_sq = vec_inner(&r1, &y);
    if beta1_sq < 0.0 {
        return Err("the smoother preconditioner is not positive definite");
    }
    let beta1 = f64::sqrt(beta1_sq);
    if beta1 == 0.0 {
        return Ok(());
    }

    let (mut oldb, mut beta) = (0.0, beta1);
    let (mut dbar, mut epsln, mut phibar) = (0.0, 0.0, beta1);
    let (mut cs, mut sn) = (-1.0, 0.0);

    for _iteration in 0..n_max_iterations {
        // Lanczos step
        for i in 0..n {
            v[i] = y[i] / beta;
        }
        aa.mat_vec_mul(&mut av, 1.0, &v)?;
        if oldb > 0.0 {
            for i in 0..n {
                av[i] -= (beta / oldb) * r1[i];
            }
        }
        let alfa = vec_inner(&v, &av);
        for i in 0..n {
            av[i] -= (alfa / beta) * r2[i];
        }
        for i in 0..n {
            r1[i] = r2[i];
            r2[i] = av[i];
        }
        precond.apply_l1(&mut y, &r2);
        oldb = beta;
        let beta_sq = vec_inner(&r2, &y);
        if beta_sq < 0.0 {
            return Err("the smoother preconditioner is not positive definite");
        }
        beta = f64::sqrt(beta_sq);

        // QR factorization of the tridiagonal matrix (Givens rotations)
        let oldeps = epsln;
        let delta = cs * dbar + sn * alfa;
        let gbar = sn * dbar - cs * alfa;
        epsln = sn * beta;
        dbar = -cs * beta;
        let gamma = f64::max(f64::sqrt(gbar * gbar + beta * beta), f64::EPSILON);
        cs = gbar / gamma;
        sn = beta / gamma;
        let phi = cs * phibar;
        phibar = sn * phibar;

        // update the solution
        for i in 0..n {
            let wi = w[i];
            w1[i] = w2[i];
            w2[i] = wi;
            w[i] = (v[i] - oldeps * w1[i] - delta * w2[i]) / gamma;
            x[i] += phi * w[i];
        }

        if phibar < tol_rel * beta1 || phibar < tol_abs {
            return Ok(());
        }
    }
    Err("MINRES did not converge within the maximum number of iterations")
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{gmres_solve, minres_solve, LinSolStrategy, PrecondData};
    use crate::base::{Config, LinSolKind};
    use russell_lab::{vec_approx_eq, Vector};
    use russell_sparse::{CooMatrix, SparseMatrix, Sym};

    /// Returns a small SPD system (2 nodes × 3 DOFs) and its solution
    fn sample_system() -> (CooMatrix, Vector, Vector) {
        let n = 6;
        let mut aa = CooMatrix::new(n, n, n * n, Sym::No).unwrap();
        // diagonally dominant symmetric matrix
        for i in 0..n {
            aa.put(i, i, 4.0 + i as f64).unwrap();
            if i + 1 < n {
                aa.put(i, i + 1, -1.0).unwrap();
                aa.put(i + 1, i, -1.0).unwrap();
            }
        }
        let x_correct = Vector::from(&[1.0, -2.0, 3.0, -4.0, 5.0, -6.0]);
        let mut b = Vector::new(n);
        aa.mat_vec_mul(&mut b, 1.0, &x_correct).unwrap();
        (aa, b, x_correct)
    }

    #[test]
    fn gmres_solve_works() {
        let (aa, b, x_correct) = sample_system();
        let precond = PrecondData::new(6, 3).unwrap();
        let mut x = Vector::new(6);
        gmres_solve(&aa, &b, &precond, &mut x, 1e-12, 1e-14, 100, 30).unwrap();
        vec_approx_eq(x.as_data(), x_correct.as_data(), 1e-10);
    }

    #[test]
    fn gmres_solve_captures_non_convergence() {
        let (aa, b, _) = sample_system();
        let precond = PrecondData::new(6, 3).unwrap();
        let mut x = Vector::new(6);
        assert_eq!(
            gmres_solve(&aa, &b, &precond, &mut x, 1e-15, 1e-15, 1, 1).err(),
            Some("GMRES did not converge within the maximum number of iterations")
        );
    }

    #[test]
    fn minres_solve_works() {
        let (aa, b, x_correct) = sample_system();
        let precond = PrecondData::new(6, 3).unwrap();
        let mut x = Vector::new(6);
        minres_solve(&aa, &b, &precond, &mut x, 1e-12, 1e-14, 100).unwrap();
        vec_approx_eq(x.as_data(), x_correct.as_data(), 1e-9);
    }

    #[test]
    fn minres_solve_captures_non_convergence() {
        let (aa, b, _) = sample_system();
        let precond = PrecondData::new(6, 3).unwrap();
        let mut x = Vector::new(6);
        assert_eq!(
            minres_solve(&aa, &b, &precond, &mut x, 1e-15, 1e-15, 1).err(),
            Some("MINRES did not converge within the maximum number of iterations")
        );
    }

    #[test]
    fn strategy_solves_with_all_backends() {
        for kind in [LinSolKind::Gmres, LinSolKind::Minres, LinSolKind::Direct] {
            let (aa, b, x_correct) = sample_system();
            let mut kk = SparseMatrix::new_coo(6, 6, 36, Sym::No).unwrap();
            let coo = kk.get_coo_mut().unwrap();
            let dense = aa.as_dense();
            for i in 0..6 {
                for j in 0..6 {
                    if dense.get(i, j) != 0.0 {
                        coo.put(i, j, dense.get(i, j)).unwrap();
                    }
                }
            }
            let mut config = Config::new();
            config.lin_sol_kind = kind;
            let mut strategy = LinSolStrategy::new(&config).unwrap();
            let precond = PrecondData::new(6, 3).unwrap();
            let mut mdu = Vector::new(6);
            strategy.solve(&mut kk, &b, &precond, &mut mdu, false).unwrap();
            vec_approx_eq(mdu.as_data(), x_correct.as_data(), 1e-9);
        }
    }

    #[test]
    fn precond_new_captures_errors() {
        assert_eq!(
            PrecondData::new(7, 3).err(),
            Some("n_equation must be a multiple of ndim")
        );
    }
}
