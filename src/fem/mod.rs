//! Implements the finite element mechanics operator and time stepping

mod bc_essential;
mod element_solid;
mod elements;
mod fem_mesh;
mod fem_state;
mod file_io;
mod lin_solver;
mod linear_system;
mod newton_solver;
mod quadrature_values;
mod time_stepping;
mod visualization;
pub use crate::fem::bc_essential::*;
pub use crate::fem::element_solid::*;
pub use crate::fem::elements::*;
pub use crate::fem::fem_mesh::*;
pub use crate::fem::fem_state::*;
pub use crate::fem::file_io::*;
pub use crate::fem::lin_solver::*;
pub use crate::fem::linear_system::*;
pub use crate::fem::newton_solver::*;
pub use crate::fem::quadrature_values::*;
pub use crate::fem::time_stepping::*;
pub use crate::fem::visualization::*;
