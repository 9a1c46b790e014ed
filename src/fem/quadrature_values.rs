use crate::base::{STRESS_NCOMP, TANGENT_NCOMP};
use crate::material::GrainData;
use crate::StrError;
use gemlab::mesh::{CellId, Mesh};
use russell_lab::Vector;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Holds one fixed-size value vector per (element, quadrature point) pair
///
/// The storage is a single contiguous arena addressed through an explicit
/// (element, point) → range index function. The total length equals
/// `Σ counts[e] × vdim` and never changes after allocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuadratureValues {
    /// Dimension of the value vector at each quadrature point
    pub vdim: usize,

    /// Number of quadrature points of each cell
    counts: Vec<usize>,

    /// Start position of each cell within the arena (in value units)
    offsets: Vec<usize>,

    /// Contiguous zero-initialized storage
    pub values: Vector,
}

impl QuadratureValues {
    /// Allocates zero-initialized storage
    ///
    /// # Input
    ///
    /// * `counts` -- number of quadrature points of each cell
    /// * `vdim` -- dimension of the value vector at each quadrature point
    pub fn new(counts: &[usize], vdim: usize) -> Self {
        let mut offsets = Vec::with_capacity(counts.len());
        let mut total = 0;
        for count in counts {
            offsets.push(total);
            total += count * vdim;
        }
        QuadratureValues {
            vdim,
            counts: counts.to_vec(),
            offsets,
            values: Vector::new(total),
        }
    }

    /// Returns the number of cells
    pub fn n_cell(&self) -> usize {
        self.counts.len()
    }

    /// Returns the number of quadrature points of a cell
    pub fn n_point(&self, cell_id: CellId) -> usize {
        self.counts[cell_id]
    }

    /// Returns the arena range of one quadrature point of a cell
    #[inline]
    fn point_range(&self, cell_id: CellId, p: usize) -> Range<usize> {
        debug_assert!(cell_id < self.counts.len());
        debug_assert!(p < self.counts[cell_id]);
        let start = self.offsets[cell_id] + p * self.vdim;
        start..start + self.vdim
    }

    /// Returns the values of one quadrature point of a cell
    pub fn point_values(&self, cell_id: CellId, p: usize) -> &[f64] {
        &self.values.as_data()[self.point_range(cell_id, p)]
    }

    /// Returns the mutable values of one quadrature point of a cell
    pub fn point_values_mut(&mut self, cell_id: CellId, p: usize) -> &mut [f64] {
        let range = self.point_range(cell_id, p);
        &mut self.values.as_mut_data()[range]
    }

    /// Returns the contiguous values of all quadrature points of a cell
    pub fn cell_values(&self, cell_id: CellId) -> &[f64] {
        debug_assert!(cell_id < self.counts.len());
        let start = self.offsets[cell_id];
        &self.values.as_data()[start..start + self.counts[cell_id] * self.vdim]
    }
}

/// Holds the two generations of material history at all quadrature points
///
/// The beginning-of-step generation (`stress0`, `vars0`) is immutable during a
/// time step and is the only input the material models read. The end-of-step
/// generation (`stress1`, `tangent`, `vars1`) is scratch rewritten on every
/// residual evaluation. On step acceptance, [MechState::commit] swaps the
/// end-of-step generation into the beginning-of-step position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MechState {
    /// Beginning-of-step stress (Voigt, 6 components per point)
    pub stress0: QuadratureValues,

    /// End-of-step stress (Voigt, 6 components per point)
    pub stress1: QuadratureValues,

    /// End-of-step tangent summary (9 components per point)
    pub tangent: QuadratureValues,

    /// Beginning-of-step history values (model-defined length)
    pub vars0: QuadratureValues,

    /// End-of-step history values (model-defined length)
    pub vars1: QuadratureValues,

    /// Grain orientation values (grain-offset components per point; zero length without crystal plasticity)
    pub orient: QuadratureValues,
}

impl MechState {
    /// Allocates zero-initialized storage for all generations
    pub fn new(counts: &[usize], n_history: usize, grain_offset: usize) -> Self {
        MechState {
            stress0: QuadratureValues::new(counts, STRESS_NCOMP),
            stress1: QuadratureValues::new(counts, STRESS_NCOMP),
            tangent: QuadratureValues::new(counts, TANGENT_NCOMP),
            vars0: QuadratureValues::new(counts, n_history),
            vars1: QuadratureValues::new(counts, n_history),
            orient: QuadratureValues::new(counts, grain_offset),
        }
    }

    /// Accepts the end-of-step generation as the next beginning-of-step generation
    ///
    /// The buffers are swapped; the (now stale) end-of-step buffers are fully
    /// rewritten by the next residual evaluation.
    pub fn commit(&mut self) {
        std::mem::swap(&mut self.stress0.values, &mut self.stress1.values);
        std::mem::swap(&mut self.vars0.values, &mut self.vars1.values);
    }

    /// Broadcasts the grain orientation data onto the quadrature points
    ///
    /// Every quadrature point of a cell with attribute `a` receives the
    /// orientation vector of grain `a`.
    pub fn set_grain_data(&mut self, mesh: &Mesh, grains: &GrainData) -> Result<(), StrError> {
        if self.orient.vdim != grains.offset {
            return Err("the grain orientation offset does not match the allocated quadrature storage");
        }
        for cell in &mesh.cells {
            let orientation = grains.orientation(cell.attribute)?;
            for p in 0..self.orient.n_point(cell.id) {
                self.orient.point_values_mut(cell.id, p).copy_from_slice(orientation);
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
