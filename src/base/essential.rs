use crate::StrError;
use gemlab::mesh::PointId;
use std::fmt;

/// Defines the role of a boundary attribute within a single time step
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BcRole {
    /// Homogeneous Dirichlet condition (all displacement components fixed)
    Fixed,

    /// Nonzero Dirichlet condition (prescribed displacement increment)
    Prescribed,
}

/// Holds the essential boundary attributes and their per-step roles
///
/// Each boundary attribute is a set of mesh points (e.g., all points of the faces
/// lying on one side of the domain). The role map is rebuilt every time step:
/// call [Essential::reset] followed by [Essential::set_role] before assembling
/// the prescribed values, so that no stale role survives from a previous step.
pub struct Essential {
    /// Point sets, one per boundary attribute
    pub attributes: Vec<Vec<PointId>>,

    /// Role of each boundary attribute in the current step (None = inactive)
    pub roles: Vec<Option<BcRole>>,
}

impl Essential {
    /// Allocates a new instance with all roles inactive
    pub fn new(attributes: Vec<Vec<PointId>>) -> Self {
        let n = attributes.len();
        Essential {
            attributes,
            roles: vec![None; n],
        }
    }

    /// Returns the number of boundary attributes
    pub fn n_attribute(&self) -> usize {
        self.attributes.len()
    }

    /// Deactivates all roles (must be called at the beginning of each step)
    pub fn reset(&mut self) -> &mut Self {
        self.roles.iter_mut().for_each(|r| *r = None);
        self
    }

    /// Sets the role of a boundary attribute for the current step
    pub fn set_role(&mut self, attribute: usize, role: BcRole) -> Result<&mut Self, StrError> {
        if attribute >= self.roles.len() {
            return Err("cannot set role because the boundary attribute is out-of-bounds");
        }
        self.roles[attribute] = Some(role);
        Ok(self)
    }
}

impl fmt::Display for Essential {
    /// Prints a formatted summary of the boundary attributes and roles
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Essential boundary conditions\n").unwrap();
        write!(f, "=============================\n").unwrap();
        for (i, points) in self.attributes.iter().enumerate() {
            write!(f, "{} : {:?} npoint = {}\n", i, self.roles[i], points.len()).unwrap();
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
