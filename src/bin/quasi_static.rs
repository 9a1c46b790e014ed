use amsim::base::{Config, Essential, LinSolKind};
use amsim::fem::{read_mesh, FemMesh, FemState, FileIo, TimeStepping};
use amsim::material::{
    sample_hypoelastic_stiffness, sample_hypoelastic_update, GrainData, MaterialSelection, ParamMaterial,
};
use amsim::StrError;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "quasi_static",
    about = "Quasi-static implicit solid mechanics driver for additively manufactured material"
)]
struct Options {
    /// Mesh file (JSON) to use
    #[structopt(short = "m", long)]
    mesh: String,

    /// Grain orientation file to use
    #[structopt(short = "g", long, default_value = "grains.txt")]
    grain: String,

    /// Number of grains
    #[structopt(long, default_value = "0")]
    ngrains: usize,

    /// Final time; start time is 0
    #[structopt(long = "tf", default_value = "1.0")]
    t_fin: f64,

    /// Time step
    #[structopt(long = "dt", default_value = "0.2")]
    dt: f64,

    /// Use the direct sparse solver instead of GMRES
    #[structopt(long)]
    direct: bool,

    /// Use MINRES instead of GMRES
    #[structopt(long)]
    minres: bool,

    /// Relative tolerance for the Newton solve
    #[structopt(long = "rel", default_value = "1e-12")]
    newton_rel_tol: f64,

    /// Absolute tolerance for the Newton solve
    #[structopt(long = "abs", default_value = "1e-12")]
    newton_abs_tol: f64,

    /// Maximum iterations for the Newton solve
    #[structopt(long = "it", default_value = "500")]
    newton_iter: usize,

    /// Use the Neo-Hookean hyperelastic material model
    #[structopt(long)]
    hyperelastic: bool,

    /// Shear-like constant of the hyperelastic model
    #[structopt(long, default_value = "0.25")]
    shear: f64,

    /// Bulk-like constant of the hyperelastic model
    #[structopt(long, default_value = "5.0")]
    bulk: f64,

    /// Use the user-supplied incremental (UMAT-style) model
    #[structopt(long)]
    umat: bool,

    /// Use the user-supplied crystal plasticity model
    #[structopt(long)]
    cp: bool,

    /// Use Euler angles to define the grain orientations
    #[structopt(long = "ge")]
    grain_euler: bool,

    /// Use quaternions to define the grain orientations
    #[structopt(long = "gq")]
    grain_quaternion: bool,

    /// Use a uniform grain orientation
    #[structopt(long = "gu")]
    grain_uniform: bool,

    /// The uniform grain orientation vector (comma-separated, e.g., 1.0,0.0,0.0)
    #[structopt(long = "guv", use_delimiter = true)]
    grain_uniform_vector: Vec<f64>,

    /// Enable the live visualization stream
    #[structopt(long)]
    vis: bool,

    /// Stream to the visualization socket every n-th timestep
    #[structopt(long = "vs", default_value = "1")]
    vis_steps: usize,

    /// Output directory
    #[structopt(long, default_value = "/tmp/amsim/results")]
    out_dir: String,

    /// Filename stem of the output files
    #[structopt(long, default_value = "quasi_static")]
    stem: String,
}

/// The prescribed boundary displacement increment (a fixed ramp in -z)
///
/// The increment is independent of the elapsed fraction of the total time.
fn prescribed_displacement(_x: &[f64], _t: f64) -> Vec<f64> {
    vec![0.0, 0.0, -0.1]
}

fn main() -> Result<(), StrError> {
    // parse the command line options
    let options = Options::from_args();

    // check the material model and grain data arguments
    let mut selection = MaterialSelection::new();
    selection.hyperelastic = options.hyperelastic;
    selection.user_defined = options.umat;
    selection.crystal_plasticity = options.cp;
    selection.grain_euler = options.grain_euler;
    selection.grain_quaternion = options.grain_quaternion;
    selection.grain_uniform = options.grain_uniform;
    selection.n_grains = options.ngrains;
    selection.grain_uniform_vector = options.grain_uniform_vector.clone();
    if let Err(message) = selection.validate() {
        eprintln!("ERROR: inconsistent material input; {}", message);
        return Err(message);
    }

    // configuration
    let mut config = Config::new();
    config.t_fin = options.t_fin;
    config.dt = options.dt;
    config.n_max_iterations = options.newton_iter;
    config.tol_rel_residual = options.newton_rel_tol;
    config.tol_abs_residual = options.newton_abs_tol;
    config.lin_sol_kind = if options.direct {
        LinSolKind::Direct
    } else if options.minres {
        LinSolKind::Minres
    } else {
        LinSolKind::Gmres
    };
    config.visualization = options.vis;
    config.vis_steps = options.vis_steps;
    if let Some(message) = config.validate() {
        eprintln!("ERROR: {}", message);
        return Err("invalid configuration; check the arguments");
    }

    // mesh and DOF numbers
    let mesh = read_mesh(&options.mesh)?;
    let fem = FemMesh::new(&mesh)?;
    println!("***********************************************************");
    println!("dim(u) = {}", fem.equations.n_equation);
    println!("***********************************************************");

    // boundary attributes: 0 = fixed (z-min face), 1 = prescribed (z-max face)
    let (mut z_min, mut z_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for point in &mesh.points {
        z_min = f64::min(z_min, point.coords[2]);
        z_max = f64::max(z_max, point.coords[2]);
    }
    let tol = 1e-8 * f64::max(1.0, z_max - z_min);
    let mut fixed = Vec::new();
    let mut prescribed = Vec::new();
    for point in &mesh.points {
        if f64::abs(point.coords[2] - z_min) < tol {
            fixed.push(point.id);
        }
        if f64::abs(point.coords[2] - z_max) < tol {
            prescribed.push(point.id);
        }
    }
    let essential = Essential::new(vec![fixed, prescribed]);

    // material model
    let param = if options.hyperelastic {
        ParamMaterial::NeoHookean {
            shear: options.shear,
            bulk: options.bulk,
        }
    } else if options.umat {
        ParamMaterial::UserDefined {
            update: sample_hypoelastic_update,
            stiffness: sample_hypoelastic_stiffness,
            n_history: 1,
        }
    } else {
        ParamMaterial::CrystalPlasticity {
            update: sample_hypoelastic_update,
            stiffness: sample_hypoelastic_stiffness,
            n_history: 1,
        }
    };

    // grain orientation data
    let grain_data = if options.cp {
        let grains = if options.grain_uniform {
            GrainData::from_uniform(&options.grain_uniform_vector, options.ngrains)?
        } else {
            GrainData::read_text_file(&options.grain, options.ngrains, selection.grain_offset())?
        };
        Some(grains)
    } else {
        None
    };

    // state and grain data broadcast
    let mut state = FemState::new(&fem, &config, &param, selection.grain_offset())?;
    if let Some(grains) = &grain_data {
        state.quad.set_grain_data(&mesh, grains)?;
    }

    // run the simulation
    let file_io = FileIo::new_enabled(&options.stem, Some(&options.out_dir))?;
    let mut sim = TimeStepping::new(&fem, &config, &param, essential, prescribed_displacement, file_io)?;
    sim.initialize(&mut state)?;
    sim.run(&mut state)?;

    println!("done: t = {}, output files = {}", state.t, sim.file_io.indices.len());
    Ok(())
}
