use super::{FemMesh, FemState, MechState};
use crate::base::{voigt_to_tensor2, Config};
use crate::material::{MechModel, ParamMaterial, PointState};
use crate::StrError;
use gemlab::integ::{self, IntegPointData};
use gemlab::mesh::{set_pad_coords, Cell};
use gemlab::shapes::Scratchpad;
use russell_lab::{Matrix, Vector};

/// Implements a solid mechanics finite element
///
/// The element integrates the material response over its quadrature points.
/// [ElementSolid::update_state] refreshes the end-of-step quadrature generation
/// and the deformation gradients; the residual and Jacobian are then integrated
/// from that generation. Therefore, update_state must be called before
/// calc_residual and calc_jacobian.
pub struct ElementSolid<'a> {
    /// Configuration parameters
    pub config: &'a Config,

    /// The cell of this element
    pub cell: &'a Cell,

    /// The constitutive model instance of this element
    pub model: MechModel,

    /// Scratchpad to perform numerical integration
    pub pad: Scratchpad,

    /// Integration (quadrature) points
    pub ips: IntegPointData,

    /// Local residual vector
    pub residual: Vector,

    /// Local Jacobian matrix
    pub jacobian: Matrix,

    /// Local-to-global DOF map
    pub local_to_global: Vec<usize>,

    /// Deformation gradient at each quadrature point (refreshed by update_state)
    def_grads: Vec<Matrix>,
}

impl<'a> ElementSolid<'a> {
    /// Allocates a new instance
    pub fn new(
        fem: &FemMesh,
        config: &'a Config,
        cell: &'a Cell,
        param: &ParamMaterial,
    ) -> Result<Self, StrError> {
        let ndim = fem.mesh.ndim;
        let neq = fem.n_local_eq(cell);
        let mut pad = Scratchpad::new(ndim, cell.kind)?;
        set_pad_coords(&mut pad, &cell.points, fem.mesh);
        let ips = config.integ_point_data(cell)?;
        Ok(ElementSolid {
            config,
            cell,
            model: MechModel::new(param)?,
            pad,
            ips,
            residual: Vector::new(neq),
            jacobian: Matrix::new(neq, neq),
            local_to_global: fem.local_to_global(cell),
            def_grads: vec![Matrix::new(3, 3); ips.len()],
        })
    }

    /// Initializes the history values at all quadrature points
    pub fn init_history(&mut self, state: &mut FemState) -> Result<(), StrError> {
        let cell_id = self.cell.id;
        let MechState { vars0, orient, .. } = &mut state.quad;
        for p in 0..self.ips.len() {
            self.model
                .actual
                .init_history(vars0.point_values_mut(cell_id, p), orient.point_values(cell_id, p))?;
        }
        Ok(())
    }

    /// Updates the end-of-step quadrature values from the trial displacement
    ///
    /// Computes the deformation gradient F = I + ∂u/∂X at every quadrature point
    /// (X are the current reference coordinates held by the scratchpad) and runs
    /// the material model. The update always starts from the beginning-of-step
    /// generation; thus repeated calls at a fixed trial displacement are
    /// idempotent.
    pub fn update_state(&mut self, state: &mut FemState) -> Result<(), StrError> {
        let cell_id = self.cell.id;
        let ndim = 3;
        let nnode = self.cell.points.len();
        let MechState {
            stress0,
            stress1,
            tangent,
            vars0,
            vars1,
            orient,
        } = &mut state.quad;
        for p in 0..self.ips.len() {
            // gradient of the shape functions w.r.t. the reference coordinates
            let iota = &self.ips[p];
            self.pad.calc_gradient(iota)?;

            // deformation gradient F = I + Σm u(m) ⊗ g(m)
            let gg = &self.pad.gradient;
            for i in 0..ndim {
                for j in 0..ndim {
                    let mut sum = 0.0;
                    for m in 0..nnode {
                        let eq = self.local_to_global[m * ndim + i];
                        sum += state.uu[eq] * gg.get(m, j);
                    }
                    let delta = if i == j { 1.0 } else { 0.0 };
                    self.def_grads[p].set(i, j, delta + sum);
                }
            }

            // run the material model
            let mut args = PointState {
                def_grad: &self.def_grads[p],
                stress0: stress0.point_values(cell_id, p),
                stress1: stress1.point_values_mut(cell_id, p),
                tangent: tangent.point_values_mut(cell_id, p),
                vars0: vars0.point_values(cell_id, p),
                vars1: vars1.point_values_mut(cell_id, p),
                orientation: orient.point_values(cell_id, p),
            };
            self.model.actual.update_stress(&mut args)?;
        }
        Ok(())
    }

    /// Calculates the local residual vector
    ///
    /// **Note:** You must call update_state first.
    pub fn calc_residual(&mut self, state: &FemState) -> Result<(), StrError> {
        let cell_id = self.cell.id;
        let stress1 = &state.quad.stress1;
        integ::vec_04_tb(&mut self.residual, &mut self.pad, 0, true, self.ips, |sig, p| {
            voigt_to_tensor2(sig, stress1.point_values(cell_id, p))
        })
    }

    /// Calculates the local Jacobian matrix
    ///
    /// **Note:** You must call update_state first.
    pub fn calc_jacobian(&mut self, state: &FemState) -> Result<(), StrError> {
        let cell_id = self.cell.id;
        let model = &self.model;
        let def_grads = &self.def_grads;
        let stress1 = &state.quad.stress1;
        let vars1 = &state.quad.vars1;
        integ::mat_10_bdb(&mut self.jacobian, &mut self.pad, 0, 0, true, self.ips, |dd, p| {
            model.actual.stiffness(
                dd,
                &def_grads[p],
                stress1.point_values(cell_id, p),
                vars1.point_values(cell_id, p),
            )
        })
    }

    /// Rewrites the scratchpad coordinates after a reference configuration update
    pub fn update_reference(&mut self, xx_ref: &Vector) {
        for (m, point_id) in self.cell.points.iter().enumerate() {
            for j in 0..3 {
                self.pad.set_xx(m, j, xx_ref[point_id * 3 + j]);
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::ElementSolid;
    use crate::base::Config;
    use crate::fem::{FemMesh, FemState};
    use crate::material::ParamMaterial;
    use gemlab::mesh::Samples;
    use russell_lab::approx_eq;

    #[test]
    fn new_works() {
        let mesh = Samples::one_hex8();
        let fem = FemMesh::new(&mesh).unwrap();
        let config = Config::new();
        let param = ParamMaterial::sample_neo_hookean();
        let element = ElementSolid::new(&fem, &config, &mesh.cells[0], &param).unwrap();
        assert_eq!(element.ips.len(), 27);
        assert_eq!(element.residual.dim(), 24);
        assert_eq!(element.jacobian.dims(), (24, 24));
        assert_eq!(element.local_to_global.len(), 24);
    }

    #[test]
    fn zero_displacement_gives_zero_residual() {
        let mesh = Samples::one_hex8();
        let fem = FemMesh::new(&mesh).unwrap();
        let config = Config::new();
        let param = ParamMaterial::sample_neo_hookean();
        let mut element = ElementSolid::new(&fem, &config, &mesh.cells[0], &param).unwrap();
        let mut state = FemState::new(&fem, &config, &param, 0).unwrap();
        element.update_state(&mut state).unwrap();
        element.calc_residual(&state).unwrap();
        for i in 0..element.residual.dim() {
            approx_eq(element.residual[i], 0.0, 1e-14);
        }
        // the end-of-step stress is zero as well
        for p in 0..27 {
            for component in state.quad.stress1.point_values(0, p) {
                approx_eq(*component, 0.0, 1e-15);
            }
        }
    }

    #[test]
    fn update_state_is_idempotent() {
        let mesh = Samples::one_hex8();
        let fem = FemMesh::new(&mesh).unwrap();
        let config = Config::new();
        let param = ParamMaterial::sample_neo_hookean();
        let mut element = ElementSolid::new(&fem, &config, &mesh.cells[0], &param).unwrap();
        let mut state = FemState::new(&fem, &config, &param, 0).unwrap();

        // impose a compression of the top face (points with z = max)
        for point in &mesh.points {
            if point.coords[2] > 0.99 {
                state.uu[point.id * 3 + 2] = -0.1;
            }
        }
        element.update_state(&mut state).unwrap();
        element.calc_residual(&state).unwrap();
        let stress_first = state.quad.stress1.values.clone();
        let residual_first = element.residual.clone();

        // re-evaluating at the same trial displacement changes nothing
        element.update_state(&mut state).unwrap();
        element.calc_residual(&state).unwrap();
        assert_eq!(state.quad.stress1.values.as_data(), stress_first.as_data());
        assert_eq!(element.residual.as_data(), residual_first.as_data());

        // the residual is nonzero under load
        let norm: f64 = element.residual.as_data().iter().map(|r| r * r).sum();
        assert!(norm > 1e-6);
    }

    #[test]
    fn jacobian_is_symmetric_for_neo_hookean() {
        let mesh = Samples::one_hex8();
        let fem = FemMesh::new(&mesh).unwrap();
        let config = Config::new();
        let param = ParamMaterial::sample_neo_hookean();
        let mut element = ElementSolid::new(&fem, &config, &mesh.cells[0], &param).unwrap();
        let mut state = FemState::new(&fem, &config, &param, 0).unwrap();
        for point in &mesh.points {
            if point.coords[2] > 0.99 {
                state.uu[point.id * 3 + 2] = -0.05;
            }
        }
        element.update_state(&mut state).unwrap();
        element.calc_jacobian(&state).unwrap();
        let (n, _) = element.jacobian.dims();
        for i in 0..n {
            for j in 0..n {
                approx_eq(element.jacobian.get(i, j), element.jacobian.get(j, i), 1e-10);
            }
        }
    }
}
