//! Numeric constants and default tolerances

/// How far the sum of a probability vector may stray from 1
pub const PROB_SUM_TOL: f64 = 1E-8;
/// Largest allowed `|a_ij - a_ji|`, relative to `max(1, max|a|)`
pub const SYMMETRY_TOL: f64 = 1E-9;
/// Largest allowed `|dot(v_i, v_j)|` between distinct eigenvectors
pub const ORTHOGONALITY_TOL: f64 = 1E-9;
/// Components smaller than this are treated as zero when fixing the sign of
/// an eigenvector
pub const SIGN_EPS: f64 = 1E-12;
/// Convergence threshold handed to the symmetric eigen solver
pub const EIGEN_EPS: f64 = f64::EPSILON;
/// Iteration cap for the symmetric eigen solver
pub const EIGEN_MAX_ITERS: usize = 10_000;
