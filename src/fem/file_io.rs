use super::FemState;
use crate::base::DEFAULT_OUT_DIR;
use crate::StrError;
use gemlab::mesh::Mesh;
use russell_lab::Vector;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::path::Path;

/// Holds the deformation field of one time step
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeformationSnapshot {
    /// Time of the step
    pub t: f64,

    /// Deformation (displacement relative to the evolving reference configuration)
    pub values: Vector,
}

/// Assists in generating the per-step output files
///
/// Every time step produces two files: a mesh snapshot with the deformed
/// coordinates and a deformation-field snapshot. The names carry a zero-padded
/// process id and the step index, e.g., `sim-mesh-000000_3.json`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileIo {
    /// Holds a flag to enable/disable the file generation
    enabled: bool,

    /// Defines the output directory
    output_dir: String,

    /// Defines the filename stem
    filename_stem: String,

    /// Process id used in the file names (always zero in a single-process run)
    proc_id: usize,

    /// Holds the indices (time step numbers) of the output files
    pub indices: Vec<usize>,

    /// Holds the simulation times corresponding to each output file
    pub times: Vec<f64>,
}

impl FileIo {
    /// Allocates a new instance with deactivated generation of files
    pub fn new() -> Self {
        FileIo {
            enabled: false,
            output_dir: String::new(),
            filename_stem: String::new(),
            proc_id: 0,
            indices: Vec::new(),
            times: Vec::new(),
        }
    }

    /// Allocates a new instance writing into the output directory
    ///
    /// # Input
    ///
    /// * `filename_stem` -- the first part of the filenames, e.g., "my_simulation"
    /// * `output_directory` -- the directory to save the output files.
    ///   None means that the default directory will be used; see [DEFAULT_OUT_DIR]
    pub fn new_enabled(filename_stem: &str, output_directory: Option<&str>) -> Result<Self, StrError> {
        let out_dir = match output_directory {
            Some(d) => d,
            None => DEFAULT_OUT_DIR,
        };
        fs::create_dir_all(out_dir).map_err(|_| "cannot create output directory")?;
        Ok(FileIo {
            enabled: true,
            output_dir: out_dir.to_string(),
            filename_stem: filename_stem.to_string(),
            proc_id: 0,
            indices: Vec::new(),
            times: Vec::new(),
        })
    }

    /// Generates the filename path of the mesh snapshot of a step
    pub fn path_mesh(&self, step: usize) -> String {
        if self.enabled {
            format!(
                "{}/{}-mesh-{:0>6}_{}.json",
                self.output_dir, self.filename_stem, self.proc_id, step
            )
        } else {
            "".to_string()
        }
    }

    /// Generates the filename path of the deformation snapshot of a step
    pub fn path_deformation(&self, step: usize) -> String {
        if self.enabled {
            format!(
                "{}/{}-def-{:0>6}_{}.json",
                self.output_dir, self.filename_stem, self.proc_id, step
            )
        } else {
            "".to_string()
        }
    }

    /// Generates the filename path of the summary file
    pub fn path_summary(&self) -> String {
        if self.enabled {
            format!("{}/{}-summary.json", self.output_dir, self.filename_stem)
        } else {
            "".to_string()
        }
    }

    /// Writes the mesh and deformation snapshots of one time step
    pub fn write_step(&mut self, mesh: &Mesh, state: &FemState, step: usize) -> Result<(), StrError> {
        if !self.enabled {
            return Ok(());
        }

        // mesh snapshot with the deformed (current) coordinates
        let mut snapshot = mesh.clone();
        for point in &mut snapshot.points {
            for d in 0..snapshot.ndim {
                point.coords[d] = state.xx[point.id * snapshot.ndim + d];
            }
        }
        snapshot.write_json(&self.path_mesh(step))?;

        // deformation field snapshot
        let deformation = DeformationSnapshot {
            t: state.t,
            values: state.xx_def.clone(),
        };
        let path = self.path_deformation(step);
        let mut file = File::create(&path).map_err(|_| "cannot create deformation file")?;
        serde_json::to_writer(&mut file, &deformation).map_err(|_| "cannot write deformation file")?;

        // update counters
        self.indices.push(step);
        self.times.push(state.t);
        Ok(())
    }

    /// Writes the summary file with the indices and times of all outputs
    pub fn write_summary(&self) -> Result<(), StrError> {
        if !self.enabled {
            return Ok(());
        }
        let path = self.path_summary();
        let mut file = File::create(&path).map_err(|_| "cannot create summary file")?;
        serde_json::to_writer(&mut file, &self).map_err(|_| "cannot write summary file")?;
        Ok(())
    }

    /// Reads a JSON file containing this struct
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let file = File::open(path).map_err(|_| "cannot open file")?;
        let summary = serde_json::from_reader(file).map_err(|_| "cannot parse JSON file")?;
        Ok(summary)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
