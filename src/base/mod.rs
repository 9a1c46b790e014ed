//! Implements the base structures for the simulation

mod assembly;
mod auxiliary;
mod config;
mod constants;
mod degrees_of_freedom;
mod essential;
pub use crate::base::assembly::*;
pub use crate::base::auxiliary::*;
pub use crate::base::config::*;
pub use crate::base::constants::*;
pub use crate::base::degrees_of_freedom::*;
pub use crate::base::essential::*;
