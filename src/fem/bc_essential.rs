use super::FemMesh;
use crate::base::{BcRole, Essential};
use crate::{FnBcDisplacement, StrError};
use russell_lab::Vector;
use std::collections::HashMap;

/// Holds the prescribed equations and values of a single time step
///
/// This array is rebuilt every time step from the fresh boundary-role map; it
/// never carries values from a previous step.
pub struct BcEssentialArray {
    /// An array indicating which DOFs (equations) are prescribed
    ///
    /// The length of `flags` is equal to `n_equation`, the total number of DOFs.
    pub flags: Vec<bool>,

    /// Array with only the DOFs numbers of the prescribed equations
    pub equations: Vec<usize>,

    /// Prescribed displacement increment of each entry of `equations`
    pub values: Vec<f64>,
}

impl BcEssentialArray {
    /// Allocates new instance
    ///
    /// The boundary displacement function is evaluated at time `t` for every
    /// point of the attributes with the Prescribed role. Fixed roles constrain
    /// all displacement components to a zero increment; on overlapping
    /// attributes, Fixed wins.
    pub fn new(
        fem: &FemMesh,
        essential: &Essential,
        bc_fn: FnBcDisplacement,
        t: f64,
    ) -> Result<Self, StrError> {
        let ndim = fem.mesh.ndim;
        let npoint = fem.mesh.points.len();
        let mut map: HashMap<usize, f64> = HashMap::new();

        // prescribed (nonzero) values
        for (attribute, points) in essential.attributes.iter().enumerate() {
            if essential.roles[attribute] != Some(BcRole::Prescribed) {
                continue;
            }
            for point_id in points {
                if *point_id >= npoint {
                    return Err("cannot set prescribed value because PointId is out-of-bounds");
                }
                let increment = bc_fn(&fem.mesh.points[*point_id].coords, t);
                if increment.len() != ndim {
                    return Err("the boundary displacement function must return ndim components");
                }
                for d in 0..ndim {
                    map.insert(point_id * ndim + d, increment[d]);
                }
            }
        }

        // homogeneous (fixed) values overwrite on overlap
        for (attribute, points) in essential.attributes.iter().enumerate() {
            if essential.roles[attribute] != Some(BcRole::Fixed) {
                continue;
            }
            for point_id in points {
                if *point_id >= npoint {
                    return Err("cannot set prescribed value because PointId is out-of-bounds");
                }
                for d in 0..ndim {
                    map.insert(point_id * ndim + d, 0.0);
                }
            }
        }

        // flatten the map into flags, equations, and values
        let mut flags = vec![false; fem.equations.n_equation];
        let mut equations: Vec<_> = map.keys().copied().collect();
        equations.sort();
        let values = equations.iter().map(|eq| *map.get(eq).unwrap()).collect();
        for eq in &equations {
            flags[*eq] = true;
        }
        Ok(BcEssentialArray {
            flags,
            equations,
            values,
        })
    }

    /// Sets all prescribed increments in the trial displacement vector
    pub fn apply(&self, uu: &mut Vector) {
        for (i, eq) in self.equations.iter().enumerate() {
            uu[*eq] = self.values[i];
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
