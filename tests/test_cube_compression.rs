use amsim::base::{Config, Essential, LinSolKind, DEFAULT_TEST_DIR};
use amsim::fem::{FemMesh, FemState, FileIo, TimeStepping};
use amsim::material::ParamMaterial;
use amsim::StrError;
use gemlab::mesh::{Block, Mesh};
use gemlab::shapes::GeoKind;
use russell_lab::approx_eq;

// TEST GOAL
//
// This test verifies the full quasi-static time stepping: five pseudo-time
// steps compress a unit cube by a fixed increment of -0.1 per step in the z
// direction. Each accepted configuration becomes the reference of the next
// step; the recorded deformation must equal the current minus the rolling
// reference configuration. The mesh and deformation snapshots are written for
// every step.
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
// Neo-Hookean hyperelastic model (0.25, 5.0); t_fin = 1.0; dt = 0.2.

const NAME: &str = "test_cube_compression";

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

fn attributes(mesh: &Mesh) -> Essential {
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
    Essential::new(vec![bottom, top])
}

#[test]
fn test_cube_compression() -> Result<(), StrError> {
    // mesh and boundary attributes
    let mesh = cube_mesh()?;
    let fem = FemMesh::new(&mesh)?;
    let essential = attributes(&mesh);
    let top: Vec<_> = essential.attributes[1].clone();

    // configuration
    let mut config = Config::new();
    config.t_fin = 1.0;
    config.dt = 0.2;
    config.verbose_timesteps = false;
    config.verbose_iterations = false;
    let param = ParamMaterial::sample_neo_hookean();

    // run
    let file_io = FileIo::new_enabled(NAME, Some(DEFAULT_TEST_DIR))?;
    let mut sim = TimeStepping::new(&fem, &config, &param, essential, ramp_bc, file_io)?;
    let mut state = FemState::new(&fem, &config, &param, 0)?;
    sim.initialize(&mut state)?;
    sim.run(&mut state)?;

    // five steps of -0.1 move the top face to z = 0.5
    assert!(state.t >= 1.0 - 1e-10);
    assert_eq!(sim.file_io.indices, &[1, 2, 3, 4, 5]);
    for point_id in &top {
        approx_eq(state.xx[point_id * 3 + 2], 0.5, 1e-10);
    }

    // the bottom face never moves
    for point in &mesh.points {
        if point.coords[2] < 1e-8 {
            approx_eq(state.xx[point.id * 3 + 2], 0.0, 1e-12);
        }
    }

    // interior points moved downwards
    for point in &mesh.points {
        if point.coords[2] > 0.49 && point.coords[2] < 0.51 {
            assert!(state.xx[point.id * 3 + 2] < point.coords[2]);
        }
    }

    // round-trip: the recorded deformation equals current minus rolling reference
    for i in 0..state.xx.dim() {
        approx_eq(state.xx_def[i], state.xx[i] - state.xx_ref[i], 1e-14);
    }
    for point_id in &top {
        approx_eq(state.xx_def[point_id * 3 + 2], -0.1, 1e-12);
    }

    // both snapshot files of every step exist on disk
    for step in 1..=5 {
        assert!(std::fs::metadata(sim.file_io.path_mesh(step)).is_ok());
        assert!(std::fs::metadata(sim.file_io.path_deformation(step)).is_ok());
    }
    Ok(())
}

#[test]
fn test_cube_compression_direct_and_minres() -> Result<(), StrError> {
    for kind in [LinSolKind::Direct, LinSolKind::Minres] {
        let mesh = cube_mesh()?;
        let fem = FemMesh::new(&mesh)?;
        let essential = attributes(&mesh);
        let top: Vec<_> = essential.attributes[1].clone();

        // a single step with each alternative linear solver backend
        let mut config = Config::new();
        config.t_fin = 0.2;
        config.dt = 0.2;
        config.lin_sol_kind = kind;
        config.verbose_timesteps = false;
        config.verbose_iterations = false;
        let param = ParamMaterial::sample_neo_hookean();

        let mut sim = TimeStepping::new(&fem, &config, &param, essential, ramp_bc, FileIo::new())?;
        let mut state = FemState::new(&fem, &config, &param, 0)?;
        sim.initialize(&mut state)?;
        sim.run(&mut state)?;
        for point_id in &top {
            approx_eq(state.xx[point_id * 3 + 2], 0.9, 1e-10);
        }
    }
    Ok(())
}
