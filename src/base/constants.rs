/// Defines the default output directory
pub const DEFAULT_OUT_DIR: &str = "/tmp/amsim/results";

/// Defines the default directory for test results
pub const DEFAULT_TEST_DIR: &str = "/tmp/amsim/tests";

/// Defines the number of stress components stored per quadrature point
///
/// The storage follows the Voigt ordering (σ11, σ22, σ33, σ21, σ31, σ32).
pub const STRESS_NCOMP: usize = 6;

/// Defines the number of tangent-summary components stored per quadrature point
///
/// The storage holds the row-major 3×3 block of the consistent tangent coupling
/// the normal stress and normal strain components.
pub const TANGENT_NCOMP: usize = 9;

/// Defines the number of space dimensions (3D only)
pub const NDIM: usize = 3;

/// Defines the default port of the live visualization stream
pub const DEFAULT_VIS_PORT: u16 = 19916;
