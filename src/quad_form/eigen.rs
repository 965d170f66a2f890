//! Symmetric eigen-decomposition with a deterministic layout
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use super::QuadFormError;
use crate::consts::{
    EIGEN_EPS, EIGEN_MAX_ITERS, ORTHOGONALITY_TOL, SIGN_EPS, SYMMETRY_TOL,
};
use crate::impl_display;
use crate::misc::vec_to_string;
use itertools::Itertools;
use nalgebra::linalg::SymmetricEigen;
use nalgebra::{DMatrix, DVector};
use std::fmt;
use tracing::{debug, warn};

/// Order of the eigenpairs in an [`EigenDecomposition`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum EigenOrder {
    /// Largest eigenvalue first
    #[default]
    Descending,
    /// Smallest eigenvalue first
    Ascending,
}

/// Knobs for [`eigen_decompose_with`]
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct EigenOptions {
    /// Order of the returned eigenpairs
    pub order: EigenOrder,
    /// Largest `|a_ij - a_ji|` tolerated, relative to `max(1, max|a|)`
    pub symmetry_tol: f64,
    /// Iteration cap for the solver. Must be at least one.
    pub max_iters: usize,
}

impl Default for EigenOptions {
    fn default() -> Self {
        EigenOptions {
            order: EigenOrder::default(),
            symmetry_tol: SYMMETRY_TOL,
            max_iters: EIGEN_MAX_ITERS,
        }
    }
}

impl EigenOptions {
    #[must_use]
    pub fn with_order(mut self, order: EigenOrder) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn with_symmetry_tol(mut self, symmetry_tol: f64) -> Self {
        self.symmetry_tol = symmetry_tol;
        self
    }

    /// Zero is rejected by [`eigen_decompose_with`] with `ZeroMaxIters`
    #[must_use]
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }
}

/// Eigenvalues and unit eigenvectors of a symmetric matrix.
///
/// Column `i` of [`eigenvectors`](EigenDecomposition::eigenvectors) pairs with
/// `eigenvalues[i]`. The eigenvector matrix `S` is orthogonal, so
/// `A = S Λ Sᵀ`.
///
/// Layout is fixed for a given input: pairs are sorted by eigenvalue (ties
/// keep the solver's order), each eigenvector is flipped so that its first
/// non-negligible component is positive, and then the last column is flipped
/// if needed so that `det(S) = +1`, making `S` a proper rotation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct EigenDecomposition {
    eigenvalues: DVector<f64>,
    eigenvectors: DMatrix<f64>,
}

impl EigenDecomposition {
    /// Build a decomposition from its parts without checking them.
    ///
    /// Useful for testing property checks such as
    /// [`is_orthogonal`](EigenDecomposition::is_orthogonal) against a
    /// defective decomposition.
    pub fn new_unchecked(
        eigenvalues: DVector<f64>,
        eigenvectors: DMatrix<f64>,
    ) -> Self {
        EigenDecomposition {
            eigenvalues,
            eigenvectors,
        }
    }

    /// The number of dimensions
    #[inline]
    pub fn dim(&self) -> usize {
        self.eigenvalues.len()
    }

    #[inline]
    pub fn eigenvalues(&self) -> &DVector<f64> {
        &self.eigenvalues
    }

    /// The orthogonal matrix `S` whose columns are the eigenvectors
    #[inline]
    pub fn eigenvectors(&self) -> &DMatrix<f64> {
        &self.eigenvectors
    }

    /// The `ix`<sup>th</sup> eigenvector
    ///
    /// # Panics
    ///
    /// If `ix >= self.dim()`
    pub fn eigenvector(&self, ix: usize) -> DVector<f64> {
        self.eigenvectors.column(ix).into_owned()
    }

    /// Iterate over (eigenvalue, eigenvector) pairs in order
    pub fn eigenpairs(&self) -> impl Iterator<Item = (f64, DVector<f64>)> + '_ {
        self.eigenvalues
            .iter()
            .zip(self.eigenvectors.column_iter())
            .map(|(&val, vec)| (val, vec.into_owned()))
    }

    /// `true` if every pair of distinct eigenvectors has `|dot| <= tol`.
    ///
    /// This only inspects the decomposition; it never alters it.
    pub fn is_orthogonal(&self, tol: f64) -> bool {
        (0..self.dim()).tuple_combinations().all(|(i, j)| {
            let dot = self.eigenvectors.column(i).dot(&self.eigenvectors.column(j));
            dot.abs() <= tol
        })
    }

    /// `S Λ Sᵀ`, which recovers the decomposed matrix
    pub fn reconstruct(&self) -> DMatrix<f64> {
        &self.eigenvectors
            * DMatrix::from_diagonal(&self.eigenvalues)
            * self.eigenvectors.transpose()
    }

    /// `Sᵀ A S`. For the decomposed matrix this is diagonal, holding the
    /// eigenvalues: the quadratic form written in its principal axes.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `a` is not `dim x dim`.
    pub fn diagonalize(
        &self,
        a: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, QuadFormError> {
        let d = self.dim();
        if a.nrows() != d || a.ncols() != d {
            return Err(QuadFormError::DimensionMismatch {
                left: d,
                right: a.nrows().max(a.ncols()),
            });
        }
        Ok(self.eigenvectors.transpose() * a * &self.eigenvectors)
    }

    /// Signed angle, in degrees, of the rotation that takes the coordinate
    /// axes onto the principal axes. Only defined in two dimensions.
    ///
    /// Since `S` is a proper rotation, this is `atan2(S₁₀, S₀₀)`.
    ///
    /// # Example
    ///
    /// ```
    /// use ellipstat::quad_form::eigen_decompose;
    /// use nalgebra::DMatrix;
    ///
    /// let a = DMatrix::from_row_slice(2, 2, &[5.0, 3.0, 3.0, 5.0]);
    /// let eig = eigen_decompose(&a).unwrap();
    ///
    /// assert!((eig.rotation_angle().unwrap() - 45.0).abs() < 1E-9);
    /// ```
    pub fn rotation_angle(&self) -> Result<f64, QuadFormError> {
        if self.dim() != 2 {
            return Err(QuadFormError::NotPlanar { dim: self.dim() });
        }
        let s = &self.eigenvectors;
        Ok(s[(1, 0)].atan2(s[(0, 0)]).to_degrees())
    }
}

impl From<&EigenDecomposition> for String {
    fn from(eig: &EigenDecomposition) -> String {
        let vals: Vec<f64> = eig.eigenvalues.iter().copied().collect();
        format!("EigenDecomposition(eigenvalues: {})", vec_to_string(&vals, 5))
    }
}

impl_display!(EigenDecomposition);

/// Check that `a` is square, finite, at least 2x2 and symmetric within
/// `symmetry_tol`
pub(crate) fn check_symmetric(
    a: &DMatrix<f64>,
    symmetry_tol: f64,
) -> Result<(), QuadFormError> {
    let (nrows, ncols) = a.shape();
    if nrows != ncols {
        return Err(QuadFormError::NotSquare { nrows, ncols });
    }
    if nrows < 2 {
        return Err(QuadFormError::TooSmall { dim: nrows });
    }

    // nalgebra storage is column-major
    if let Some(ix) = a.iter().position(|x| !x.is_finite()) {
        return Err(QuadFormError::NonFinite {
            row: ix % nrows,
            col: ix / nrows,
            value: a[(ix % nrows, ix / nrows)],
        });
    }

    let scale = a.amax().max(1.0);
    (0..nrows).tuple_combinations().try_for_each(|(row, col)| {
        let diff = (a[(row, col)] - a[(col, row)]).abs();
        if diff > symmetry_tol * scale {
            Err(QuadFormError::NotSymmetric { row, col, diff })
        } else {
            Ok(())
        }
    })
}

/// Flip eigenvector signs into the canonical layout. Returns the number of
/// columns flipped.
fn canonicalize_signs(vecs: &mut DMatrix<f64>) -> usize {
    let mut flipped = 0;
    for mut col in vecs.column_iter_mut() {
        let first = col.iter().copied().find(|x| x.abs() > SIGN_EPS);
        if first.map_or(false, |x| x < 0.0) {
            col.neg_mut();
            flipped += 1;
        }
    }

    if vecs.determinant() < 0.0 {
        let last = vecs.ncols() - 1;
        vecs.column_mut(last).neg_mut();
        flipped += 1;
    }
    flipped
}

/// Eigen-decomposition of a symmetric matrix with the default
/// [`EigenOptions`]: eigenvalues in descending order.
///
/// # Errors
///
/// - `NotSquare`, `TooSmall`, or `NonFinite` for malformed input
/// - `NotSymmetric` if `a` differs from its transpose beyond tolerance
/// - `ZeroMaxIters` if the options allow no iterations
/// - `DidNotConverge` if the solver runs out of iterations
///
/// # Example
///
/// ```
/// use ellipstat::quad_form::eigen_decompose;
/// use nalgebra::DMatrix;
///
/// let a = DMatrix::from_row_slice(2, 2, &[5.0, 3.0, 3.0, 5.0]);
/// let eig = eigen_decompose(&a).unwrap();
///
/// assert!((eig.eigenvalues()[0] - 8.0).abs() < 1E-12);
/// assert!((eig.eigenvalues()[1] - 2.0).abs() < 1E-12);
/// ```
pub fn eigen_decompose(
    a: &DMatrix<f64>,
) -> Result<EigenDecomposition, QuadFormError> {
    eigen_decompose_with(a, &EigenOptions::default())
}

/// Eigen-decomposition of a symmetric matrix with explicit options
///
/// # Example
///
/// ```
/// use ellipstat::quad_form::{eigen_decompose_with, EigenOptions, EigenOrder};
/// use nalgebra::DMatrix;
///
/// let a = DMatrix::from_row_slice(2, 2, &[5.0, 3.0, 3.0, 5.0]);
/// let opts = EigenOptions::default().with_order(EigenOrder::Ascending);
/// let eig = eigen_decompose_with(&a, &opts).unwrap();
///
/// assert!((eig.eigenvalues()[0] - 2.0).abs() < 1E-12);
/// ```
pub fn eigen_decompose_with(
    a: &DMatrix<f64>,
    opts: &EigenOptions,
) -> Result<EigenDecomposition, QuadFormError> {
    check_symmetric(a, opts.symmetry_tol)?;
    if opts.max_iters == 0 {
        return Err(QuadFormError::ZeroMaxIters);
    }

    let eig = SymmetricEigen::try_new(a.clone(), EIGEN_EPS, opts.max_iters)
        .ok_or_else(|| {
            warn!(
                dim = a.nrows(),
                max_iters = opts.max_iters,
                "symmetric eigen solver did not converge"
            );
            QuadFormError::DidNotConverge {
                max_iters: opts.max_iters,
            }
        })?;

    let vals = &eig.eigenvalues;
    let mut order: Vec<usize> = (0..vals.len()).collect();
    match opts.order {
        EigenOrder::Descending => {
            order.sort_by(|&i, &j| vals[j].total_cmp(&vals[i]))
        }
        EigenOrder::Ascending => {
            order.sort_by(|&i, &j| vals[i].total_cmp(&vals[j]))
        }
    }

    let eigenvalues =
        DVector::from_iterator(order.len(), order.iter().map(|&ix| vals[ix]));
    let mut eigenvectors = eig.eigenvectors.select_columns(order.iter());

    let flipped = canonicalize_signs(&mut eigenvectors);
    if flipped > 0 {
        debug!(flipped, "flipped eigenvector signs into canonical layout");
    }

    Ok(EigenDecomposition {
        eigenvalues,
        eigenvectors,
    })
}

/// `true` if the eigenvectors are pairwise orthogonal within
/// [`ORTHOGONALITY_TOL`].
///
/// A `false` here means the decomposition itself is defective and should be
/// treated as a failed computation.
pub fn verify_orthogonality(decomposition: &EigenDecomposition) -> bool {
    decomposition.is_orthogonal(ORTHOGONALITY_TOL)
}

impl fmt::Display for EigenOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Descending => write!(f, "descending"),
            Self::Ascending => write!(f, "ascending"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ErrorKind;
    use crate::test_basic_impls;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_1_SQRT_2;

    const TOL: f64 = 1E-12;

    fn ellipse_matrix() -> DMatrix<f64> {
        DMatrix::from_row_slice(2, 2, &[5.0, 3.0, 3.0, 5.0])
    }

    test_basic_impls!(eigen_decompose(&ellipse_matrix()).unwrap());

    #[test]
    fn ellipse_eigenpairs() {
        let eig = eigen_decompose(&ellipse_matrix()).unwrap();

        assert::close(eig.eigenvalues()[0], 8.0, TOL);
        assert::close(eig.eigenvalues()[1], 2.0, TOL);

        let v0 = eig.eigenvector(0);
        let v1 = eig.eigenvector(1);
        assert::close(v0[0], FRAC_1_SQRT_2, TOL);
        assert::close(v0[1], FRAC_1_SQRT_2, TOL);
        assert::close(v1[0], -FRAC_1_SQRT_2, TOL);
        assert::close(v1[1], FRAC_1_SQRT_2, TOL);
    }

    #[test]
    fn ascending_order() {
        let opts = EigenOptions::default().with_order(EigenOrder::Ascending);
        let eig = eigen_decompose_with(&ellipse_matrix(), &opts).unwrap();
        assert::close(eig.eigenvalues()[0], 2.0, TOL);
        assert::close(eig.eigenvalues()[1], 8.0, TOL);
        assert!(eig.eigenvectors().determinant() > 0.0);
    }

    #[test]
    fn eigenvectors_are_unit_and_orthogonal() {
        let a = DMatrix::from_row_slice(
            3,
            3,
            &[4.0, 1.0, -2.0, 1.0, 2.0, 0.5, -2.0, 0.5, 3.0],
        );
        let eig = eigen_decompose(&a).unwrap();
        for (_, v) in eig.eigenpairs() {
            assert::close(v.norm(), 1.0, TOL);
        }
        assert!(verify_orthogonality(&eig));
        assert_relative_eq!(eig.reconstruct(), a, epsilon = 1E-10);
    }

    #[test]
    fn eigenpairs_satisfy_definition() {
        let a = DMatrix::from_row_slice(
            3,
            3,
            &[2.0, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 2.0],
        );
        let eig = eigen_decompose(&a).unwrap();
        for (val, vec) in eig.eigenpairs() {
            assert_relative_eq!(&a * &vec, vec * val, epsilon = 1E-10);
        }
    }

    #[test]
    fn descending_values_are_sorted() {
        let a = DMatrix::from_row_slice(
            3,
            3,
            &[1.0, 0.2, 0.0, 0.2, 7.0, 0.1, 0.0, 0.1, 3.0],
        );
        let eig = eigen_decompose(&a).unwrap();
        let vals = eig.eigenvalues();
        assert!(vals[0] >= vals[1] && vals[1] >= vals[2]);
    }

    #[test]
    fn diagonalize_gives_eigenvalues() {
        let a = ellipse_matrix();
        let eig = eigen_decompose(&a).unwrap();
        let d = eig.diagonalize(&a).unwrap();
        assert_relative_eq!(
            d,
            DMatrix::from_diagonal(eig.eigenvalues()),
            epsilon = 1E-10
        );
    }

    #[test]
    fn diagonalize_rejects_wrong_size() {
        let eig = eigen_decompose(&ellipse_matrix()).unwrap();
        let b = DMatrix::<f64>::identity(3, 3);
        assert!(matches!(
            eig.diagonalize(&b),
            Err(QuadFormError::DimensionMismatch { left: 2, right: 3 })
        ));
    }

    #[test]
    fn decomposition_is_deterministic() {
        let a = DMatrix::from_row_slice(
            3,
            3,
            &[4.0, 1.0, -2.0, 1.0, 2.0, 0.5, -2.0, 0.5, 3.0],
        );
        let e1 = eigen_decompose(&a).unwrap();
        let e2 = eigen_decompose(&a).unwrap();
        assert_eq!(e1, e2);
    }

    #[test]
    fn eigenvector_matrix_is_a_rotation() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, -1.0, -1.0, 3.0]);
        let eig = eigen_decompose(&a).unwrap();
        assert::close(eig.eigenvectors().determinant(), 1.0, 1E-10);
    }

    #[test]
    fn rejects_non_symmetric() {
        let a = DMatrix::from_row_slice(2, 2, &[5.0, 3.0, 2.0, 5.0]);
        let err = eigen_decompose(&a).unwrap_err();
        assert_eq!(
            err,
            QuadFormError::NotSymmetric {
                row: 0,
                col: 1,
                diff: 1.0
            }
        );
        assert_eq!(err.kind(), ErrorKind::NotSymmetric);
    }

    #[test]
    fn tolerates_round_off_asymmetry() {
        let a = DMatrix::from_row_slice(2, 2, &[5.0, 3.0, 3.0 + 1E-13, 5.0]);
        assert!(eigen_decompose(&a).is_ok());
    }

    #[test]
    fn looser_symmetry_tolerance() {
        let a = DMatrix::from_row_slice(2, 2, &[5.0, 3.0, 3.001, 5.0]);
        assert!(eigen_decompose(&a).is_err());
        let opts = EigenOptions::default().with_symmetry_tol(1E-3);
        assert!(eigen_decompose_with(&a, &opts).is_ok());
    }

    #[test]
    fn rejects_malformed_matrices() {
        let rect = DMatrix::<f64>::zeros(2, 3);
        assert_eq!(
            eigen_decompose(&rect),
            Err(QuadFormError::NotSquare { nrows: 2, ncols: 3 })
        );

        let tiny = DMatrix::from_row_slice(1, 1, &[1.0]);
        assert_eq!(
            eigen_decompose(&tiny),
            Err(QuadFormError::TooSmall { dim: 1 })
        );

        let nan = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, f64::NAN]);
        assert!(matches!(
            eigen_decompose(&nan),
            Err(QuadFormError::NonFinite { row: 1, col: 1, .. })
        ));
    }

    #[test]
    fn zero_iteration_cap_is_rejected() {
        let opts = EigenOptions::default().with_max_iters(0);
        let err = eigen_decompose_with(&ellipse_matrix(), &opts).unwrap_err();
        assert_eq!(err, QuadFormError::ZeroMaxIters);
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let capped = EigenOptions::default().with_max_iters(EIGEN_MAX_ITERS);
        assert!(eigen_decompose_with(&ellipse_matrix(), &capped).is_ok());
    }

    #[test]
    fn defective_decomposition_fails_orthogonality() {
        let vals = DVector::from_column_slice(&[1.0, 1.0]);
        let vecs = DMatrix::from_row_slice(
            2,
            2,
            &[1.0, FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2],
        );
        let eig = EigenDecomposition::new_unchecked(vals, vecs);
        assert!(!verify_orthogonality(&eig));
        // the check must not touch the decomposition
        assert_eq!(eig.eigenvector(1)[0], FRAC_1_SQRT_2);
    }

    #[test]
    fn rotation_angle_needs_two_dims() {
        let eig = eigen_decompose(&DMatrix::identity(3, 3)).unwrap();
        assert_eq!(
            eig.rotation_angle(),
            Err(QuadFormError::NotPlanar { dim: 3 })
        );
    }

    #[test]
    fn rotation_angle_of_axis_aligned_form() {
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 0.0, 0.0, 1.0]);
        let eig = eigen_decompose(&a).unwrap();
        assert::close(eig.rotation_angle().unwrap(), 0.0, TOL);
    }

    #[cfg(feature = "serde1")]
    #[test]
    fn serde_keeps_layout() {
        let eig = eigen_decompose(&ellipse_matrix()).unwrap();
        let json = serde_json::to_string(&eig).unwrap();
        let back: EigenDecomposition = serde_json::from_str(&json).unwrap();
        assert_eq!(eig, back);
    }

    #[test]
    fn display() {
        let eig = eigen_decompose(&ellipse_matrix()).unwrap();
        assert!(format!("{}", eig).starts_with("EigenDecomposition(eigenvalues: ["));
        assert_eq!(format!("{}", EigenOrder::Ascending), "ascending");
    }
}
