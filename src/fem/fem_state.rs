use super::{FemMesh, MechState};
use crate::base::Config;
use crate::material::ParamMaterial;
use crate::StrError;
use russell_lab::Vector;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the state of a simulation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FemState {
    /// Time
    pub t: f64,

    /// Delta time
    pub dt: f64,

    /// Trial displacement relative to the current reference configuration
    ///
    /// (n_equation)
    pub uu: Vector,

    /// Current configuration coordinates
    ///
    /// (n_equation)
    pub xx: Vector,

    /// Rolling reference configuration coordinates
    ///
    /// (n_equation)
    pub xx_ref: Vector,

    /// Deformation (current minus reference configuration at output time)
    ///
    /// (n_equation)
    pub xx_def: Vector,

    /// Material history at all quadrature points (two generations)
    pub quad: MechState,
}

impl FemState {
    /// Allocates a new instance
    pub fn new(
        fem: &FemMesh,
        config: &Config,
        param: &ParamMaterial,
        grain_offset: usize,
    ) -> Result<FemState, StrError> {
        let counts: Vec<usize> = fem
            .mesh
            .cells
            .iter()
            .map(|cell| config.integ_point_data(cell).map(|ips| ips.len()))
            .collect::<Result<_, _>>()?;
        let n_equation = fem.equations.n_equation;
        let xx = fem.reference_coords();
        let xx_ref = xx.clone();
        Ok(FemState {
            t: config.t_ini,
            dt: config.dt,
            uu: Vector::new(n_equation),
            xx,
            xx_ref,
            xx_def: Vector::new(n_equation),
            quad: MechState::new(&counts, param.n_history(), grain_offset),
        })
    }

    /// Reads a JSON file containing the state data
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let input = File::open(path).map_err(|_| "cannot open file")?;
        let buffered = BufReader::new(input);
        let state = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(state)
    }

    /// Writes a JSON file with the state data
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
        }
        let mut file = File::create(&path).map_err(|_| "cannot create file")?;
        serde_json::to_writer(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
