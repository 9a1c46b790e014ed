use super::{ElementSolid, FemMesh, FemState};
use crate::base::{assemble_matrix, assemble_vector, Config};
use crate::material::ParamMaterial;
use crate::StrError;
use russell_lab::Vector;
use russell_sparse::CooMatrix;

/// Holds a collection of solid elements
pub struct Elements<'a> {
    /// All elements
    pub all: Vec<ElementSolid<'a>>,
}

impl<'a> Elements<'a> {
    /// Allocates new instance
    pub fn new(fem: &'a FemMesh, config: &'a Config, param: &ParamMaterial) -> Result<Self, StrError> {
        let res: Result<Vec<_>, _> = fem
            .mesh
            .cells
            .iter()
            .map(|cell| ElementSolid::new(fem, config, cell, param))
            .collect();
        match res {
            Ok(all) => Ok(Elements { all }),
            Err(e) => Err(e),
        }
    }

    /// Initializes the history values of all elements
    pub fn init_history(&mut self, state: &mut FemState) -> Result<(), StrError> {
        self.all.iter_mut().map(|e| e.init_history(state)).collect()
    }

    /// Updates the end-of-step quadrature values of all elements
    pub fn update_state(&mut self, state: &mut FemState) -> Result<(), StrError> {
        self.all.iter_mut().map(|e| e.update_state(state)).collect()
    }

    /// Computes the local residual vectors
    pub fn calc_residuals(&mut self, state: &FemState) -> Result<(), StrError> {
        self.all.iter_mut().map(|e| e.calc_residual(state)).collect()
    }

    /// Computes the local Jacobian matrices
    pub fn calc_jacobians(&mut self, state: &FemState) -> Result<(), StrError> {
        self.all.iter_mut().map(|e| e.calc_jacobian(state)).collect()
    }

    /// Assembles the local residual vectors into the global residual vector
    ///
    /// **Notes:**
    ///
    /// 1. You must call calc residuals first
    /// 2. The global vector R will be cleared (with zeros) at the beginning
    pub fn assemble_residuals(&self, rr: &mut Vector, prescribed: &[bool]) {
        rr.fill(0.0); // << important
        self.all
            .iter()
            .for_each(|e| assemble_vector(rr, &e.residual, &e.local_to_global, prescribed));
    }

    /// Assembles the local Jacobian matrices into the global sparse matrix
    ///
    /// **Notes:**
    ///
    /// 1. You must call calc jacobians first
    /// 2. The CooMatrix position in the global matrix K will be reset at the beginning
    pub fn assemble_jacobians(&self, kk: &mut CooMatrix, prescribed: &[bool]) -> Result<(), StrError> {
        kk.reset(); // << important
        for e in &self.all {
            assemble_matrix(kk, &e.jacobian, &e.local_to_global, prescribed)?;
        }
        Ok(())
    }

    /// Rewrites the scratchpad coordinates after a reference configuration update
    pub fn update_reference(&mut self, xx_ref: &Vector) {
        self.all.iter_mut().for_each(|e| e.update_reference(xx_ref));
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Elements;
    use crate::base::Config;
    use crate::fem::{FemMesh, FemState};
    use crate::material::ParamMaterial;
    use gemlab::mesh::Samples;
    use russell_lab::Vector;
    use russell_sparse::{CooMatrix, Sym};

    #[test]
    fn new_works() {
        let mesh = Samples::one_hex8();
        let fem = FemMesh::new(&mesh).unwrap();
        let config = Config::new();
        let param = ParamMaterial::sample_neo_hookean();
        let elements = Elements::new(&fem, &config, &param).unwrap();
        assert_eq!(elements.all.len(), 1);
    }

    #[test]
    fn assemble_works() {
        let mesh = Samples::one_hex8();
        let fem = FemMesh::new(&mesh).unwrap();
        let config = Config::new();
        let param = ParamMaterial::sample_neo_hookean();
        let mut elements = Elements::new(&fem, &config, &param).unwrap();
        let mut state = FemState::new(&fem, &config, &param, 0).unwrap();

        // compress the top face
        for point in &mesh.points {
            if point.coords[2] > 0.99 {
                state.uu[point.id * 3 + 2] = -0.1;
            }
        }
        elements.update_state(&mut state).unwrap();
        elements.calc_residuals(&state).unwrap();
        elements.calc_jacobians(&state).unwrap();

        let neq = fem.equations.n_equation;
        let mut rr = Vector::new(neq);
        let prescribed = vec![false; neq];
        elements.assemble_residuals(&mut rr, &prescribed);
        let norm: f64 = rr.as_data().iter().map(|r| r * r).sum();
        assert!(norm > 1e-6);

        let mut kk = CooMatrix::new(neq, neq, neq * neq, Sym::No).unwrap();
        elements.assemble_jacobians(&mut kk, &prescribed).unwrap();
        let dense = kk.as_dense();
        assert!(dense.get(0, 0).abs() > 1e-6);

        // prescribed rows/columns are skipped
        let mut prescribed = vec![false; neq];
        prescribed[0] = true;
        elements.assemble_residuals(&mut rr, &prescribed);
        assert_eq!(rr[0], 0.0);
        elements.assemble_jacobians(&mut kk, &prescribed).unwrap();
        let dense = kk.as_dense();
        assert_eq!(dense.get(0, 0), 0.0);
    }
}
