use amsim::base::{Config, Essential};
use amsim::fem::{FemMesh, FemState, FileIo, TimeStepping};
use amsim::material::{sample_hypoelastic_stiffness, sample_hypoelastic_update, ParamMaterial};
use amsim::StrError;
use gemlab::mesh::{Block, Mesh};
use gemlab::shapes::GeoKind;
use russell_lab::approx_eq;

// TEST GOAL
//
// This test verifies the user-defined (UMAT-style) incremental model within the
// time stepping: the beginning-of-step stress and history buffers must advance
// across steps (the end-of-step generation is committed on acceptance), and the
// accumulated history must grow monotonically under continued compression.
//
// MESH
//
// 2×2×2 = 8 Hex8 cells forming a unit cube.
//
// BOUNDARY CONDITIONS
//
// Attribute 0 (z = 0 face): homogeneous Dirichlet.
// Attribute 1 (z = 1 face): prescribed Dirichlet, increment -0.1 in z per step.
//
// CONFIGURATION AND PARAMETERS
//
// Sample hypoelastic incremental updater with one history value; two steps.

fn ramp_bc(_x: &[f64], _t: f64) -> Vec<f64> {
    vec![0.0, 0.0, -0.1]
}

fn cube_mesh() -> Result<Mesh, StrError> {
    let mut block = Block::new(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ])?;
    block.set_ndiv(&[2, 2, 2])?;
    block.subdivide(GeoKind::Hex8)
}

#[test]
fn test_cube_user_defined() -> Result<(), StrError> {
    // mesh and boundary attributes
    let mesh = cube_mesh()?;
    let fem = FemMesh::new(&mesh)?;
    let mut bottom = Vec::new();
    let mut top = Vec::new();
    for point in &mesh.points {
        if point.coords[2] < 1e-8 {
            bottom.push(point.id);
        }
        if point.coords[2] > 1.0 - 1e-8 {
            top.push(point.id);
        }
    }
    let essential = Essential::new(vec![bottom, top.clone()]);

    // configuration: two steps
    let mut config = Config::new();
    config.t_fin = 0.4;
    config.dt = 0.2;
    config.verbose_timesteps = false;
    config.verbose_iterations = false;
    let param = ParamMaterial::UserDefined {
        update: sample_hypoelastic_update,
        stiffness: sample_hypoelastic_stiffness,
        n_history: 1,
    };

    // run
    let mut sim = TimeStepping::new(&fem, &config, &param, essential, ramp_bc, FileIo::new())?;
    let mut state = FemState::new(&fem, &config, &param, 0)?;
    sim.initialize(&mut state)?;
    sim.run(&mut state)?;

    // two steps of -0.1
    for point_id in &top {
        approx_eq(state.xx[point_id * 3 + 2], 0.8, 1e-10);
    }

    // the first step was committed: the beginning-of-step generation carries
    // stress and accumulated history
    let mut max_stress0 = 0.0_f64;
    let mut max_vars0 = 0.0_f64;
    for value in state.quad.stress0.values.as_data() {
        max_stress0 = f64::max(max_stress0, f64::abs(*value));
    }
    for value in state.quad.vars0.values.as_data() {
        max_vars0 = f64::max(max_vars0, *value);
    }
    assert!(max_stress0 > 1.0);
    assert!(max_vars0 > 0.01);

    // the end-of-step generation accumulated on top of the first step
    let mut max_vars1 = 0.0_f64;
    for value in state.quad.vars1.values.as_data() {
        max_vars1 = f64::max(max_vars1, *value);
    }
    assert!(max_vars1 > max_vars0);
    Ok(())
}
