use crate::base::Equations;
use crate::StrError;
use gemlab::mesh::{Cell, Mesh};
use gemlab::shapes::GeoKind;
use russell_lab::Vector;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Holds the mesh and the DOF numbering of a simulation
pub struct FemMesh<'a> {
    /// Holds an access to the mesh
    pub mesh: &'a Mesh,

    /// Holds the DOF (equation) numbers
    pub equations: Equations,
}

impl<'a> FemMesh<'a> {
    /// Allocates a new instance
    pub fn new(mesh: &'a Mesh) -> Result<Self, StrError> {
        if mesh.ndim != 3 {
            return Err("the mesh must be three-dimensional");
        }
        if mesh.cells.is_empty() {
            return Err("there are no cells in the mesh");
        }
        for cell in &mesh.cells {
            match cell.kind {
                GeoKind::Tet4 | GeoKind::Tet10 | GeoKind::Hex8 | GeoKind::Hex20 => (),
                _ => return Err("cell kind is not available for solid mechanics; use Tet or Hex cells"),
            }
        }
        Ok(FemMesh {
            mesh,
            equations: Equations::new(mesh),
        })
    }

    /// Returns the number of local equations of a cell
    pub fn n_local_eq(&self, cell: &Cell) -> usize {
        cell.points.len() * self.mesh.ndim
    }

    /// Returns the local-to-global DOF map of a cell
    ///
    /// The local ordering is point-major: (Ux, Uy, Uz) of the first point,
    /// then (Ux, Uy, Uz) of the second point, and so on.
    pub fn local_to_global(&self, cell: &Cell) -> Vec<usize> {
        let ndim = self.mesh.ndim;
        let mut l2g = Vec::with_capacity(cell.points.len() * ndim);
        for point_id in &cell.points {
            for d in 0..ndim {
                l2g.push(point_id * ndim + d);
            }
        }
        l2g
    }

    /// Returns the flattened reference coordinates of all points
    pub fn reference_coords(&self) -> Vector {
        let ndim = self.mesh.ndim;
        let mut xx = Vector::new(self.equations.n_equation);
        for point in &self.mesh.points {
            for d in 0..ndim {
                xx[point.id * ndim + d] = point.coords[d];
            }
        }
        xx
    }
}

/// Reads a mesh from a JSON file
///
/// # Input
///
/// * `full_path` -- may be a String, &str, or Path
pub fn read_mesh<P>(full_path: &P) -> Result<Mesh, StrError>
where
    P: AsRef<OsStr> + ?Sized,
{
    let path = Path::new(full_path).to_path_buf();
    let file = File::open(path).map_err(|_| "cannot open mesh file")?;
    let buffered = BufReader::new(file);
    let mesh = serde_json::from_reader(buffered).map_err(|_| "cannot parse mesh file")?;
    Ok(mesh)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
