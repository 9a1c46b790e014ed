use crate::StrError;
use gemlab::mesh::{Mesh, PointId};
use serde::{Deserialize, Serialize};

/// Defines displacement degrees of freedom
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Dof {
    /// Displacement along the first dimension
    Ux,

    /// Displacement along the second dimension
    Uy,

    /// Displacement along the third dimension
    Uz,
}

impl Dof {
    /// Returns the index of this DOF within a point
    pub fn index(&self) -> usize {
        match self {
            Dof::Ux => 0,
            Dof::Uy => 1,
            Dof::Uz => 2,
        }
    }
}

/// Maps (PointId, DOF) pairs onto global equation numbers
///
/// All points carry the same displacement DOFs; therefore the equation number
/// of (point, dof) is simply `point × ndim + dof.index()`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Equations {
    /// Space dimension
    pub ndim: usize,

    /// Total number of points
    pub npoint: usize,

    /// Total number of equations (total number of DOFs)
    pub n_equation: usize,
}

impl Equations {
    /// Allocates a new instance
    pub fn new(mesh: &Mesh) -> Self {
        Equations {
            ndim: mesh.ndim,
            npoint: mesh.points.len(),
            n_equation: mesh.points.len() * mesh.ndim,
        }
    }

    /// Returns the equation number corresponding to (PointId, DOF)
    pub fn eq(&self, point_id: PointId, dof: Dof) -> Result<usize, StrError> {
        if point_id >= self.npoint {
            return Err("cannot find equation number because PointId is out-of-bounds");
        }
        if dof.index() >= self.ndim {
            return Err("cannot find equation number because DOF is incompatible with ndim");
        }
        Ok(point_id * self.ndim + dof.index())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{Dof, Equations};
    use gemlab::mesh::Samples;

    #[test]
    fn dof_index_works() {
        assert_eq!(Dof::Ux.index(), 0);
        assert_eq!(Dof::Uy.index(), 1);
        assert_eq!(Dof::Uz.index(), 2);
    }

    #[test]
    fn eq_works() {
        let mesh = Samples::one_hex8();
        let equations = Equations::new(&mesh);
        assert_eq!(equations.ndim, 3);
        assert_eq!(equations.npoint, 8);
        assert_eq!(equations.n_equation, 24);
        assert_eq!(equations.eq(0, Dof::Ux).unwrap(), 0);
        assert_eq!(equations.eq(0, Dof::Uz).unwrap(), 2);
        assert_eq!(equations.eq(7, Dof::Uy).unwrap(), 22);
    }

    #[test]
    fn eq_captures_errors() {
        let mesh = Samples::one_hex8();
        let equations = Equations::new(&mesh);
        assert_eq!(
            equations.eq(123, Dof::Ux).err(),
            Some("cannot find equation number because PointId is out-of-bounds")
        );
        let mut equations_2d = equations.clone();
        equations_2d.ndim = 2;
        assert_eq!(
            equations_2d.eq(0, Dof::Uz).err(),
            Some("cannot find equation number because DOF is incompatible with ndim")
        );
    }

    #[test]
    fn derive_works() {
        let mesh = Samples::one_hex8();
        let equations = Equations::new(&mesh);
        let clone = equations.clone();
        assert_eq!(clone.n_equation, equations.n_equation);
        let json = serde_json::to_string(&equations).unwrap();
        let read: Equations = serde_json::from_str(&json).unwrap();
        assert_eq!(read.n_equation, equations.n_equation);
    }
}
