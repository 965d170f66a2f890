//! Quadratic forms xᵀAx = c and their principal axes
//!
//! A symmetric matrix `A` has real eigenvalues and orthogonal eigenvectors.
//! Written in the basis of those eigenvectors, `xᵀAx = c` loses its cross
//! terms and becomes `Σ λ_i y_i² = c`. For a positive definite `A` and
//! `c > 0` that is an ellipse (or ellipsoid) with semi-axes `sqrt(c / λ_i)`
//! along the eigenvectors.
//!
//! # Example
//!
//! ```
//! use ellipstat::quad_form::{ConicKind, QuadraticForm};
//! use nalgebra::DMatrix;
//!
//! // 5x² + 6xy + 5y² = 8
//! let a = DMatrix::from_row_slice(2, 2, &[5.0, 3.0, 3.0, 5.0]);
//! let form = QuadraticForm::new(a, 8.0).unwrap();
//!
//! assert_eq!(form.conic_kind().unwrap(), ConicKind::Ellipse);
//!
//! let axes = form.semi_axes().unwrap();
//! assert!((axes[0] - 1.0).abs() < 1E-12);
//! assert!((axes[1] - 2.0).abs() < 1E-12);
//! ```
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

mod axes;
mod eigen;

pub use axes::principal_axis_angle;
pub use eigen::{
    eigen_decompose, eigen_decompose_with, verify_orthogonality,
    EigenDecomposition, EigenOptions, EigenOrder,
};

use crate::consts::SYMMETRY_TOL;
use crate::impl_display;
use crate::result::ErrorKind;
use nalgebra::{DMatrix, DVector};
use std::f64::consts::TAU;
use std::fmt;

/// Relative size below which an eigenvalue counts as zero when classifying
const ZERO_EIGENVALUE_TOL: f64 = 1E-12;

/// The level set `xᵀAx = c` of a symmetric matrix `A`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct QuadraticForm {
    a: DMatrix<f64>,
    c: f64,
}

/// The shape of the level set `xᵀAx = c`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum ConicKind {
    /// Definite `A` with `c` of the same sign: an ellipse or ellipsoid
    Ellipse,
    /// Definite `A` with `c = 0`: only the origin
    Point,
    /// Definite `A` with `c` of the opposite sign: no real points
    Empty,
    /// Eigenvalues of both signs: a hyperbola or hyperboloid
    Hyperbola,
    /// At least one zero eigenvalue: parallel lines, cylinders, and the like
    Parabolic,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum QuadFormError {
    /// The matrix is not square
    NotSquare { nrows: usize, ncols: usize },
    /// The matrix is smaller than 2x2
    TooSmall { dim: usize },
    /// The matrix contains an infinite or NaN entry
    NonFinite { row: usize, col: usize, value: f64 },
    /// `a[row, col]` and `a[col, row]` differ by `diff`
    NotSymmetric { row: usize, col: usize, diff: f64 },
    /// The level constant is infinite or NaN
    NonFiniteLevel { c: f64 },
    /// Two operands have different dimensions
    DimensionMismatch { left: usize, right: usize },
    /// A direction vector has zero or non-finite length
    ZeroVector,
    /// The operation only exists in two dimensions
    NotPlanar { dim: usize },
    /// The operation needs an ellipse but the form is something else
    NotEllipse { kind: ConicKind },
    /// The iteration cap is zero, which the solver reads as unbounded
    ZeroMaxIters,
    /// The eigen solver did not converge
    DidNotConverge { max_iters: usize },
}

impl QuadFormError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotSymmetric { .. } => ErrorKind::NotSymmetric,
            Self::DidNotConverge { .. } => ErrorKind::MaxIterationsExceeded,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

impl QuadraticForm {
    /// Create the quadratic form `xᵀAx = c`
    ///
    /// # Errors
    ///
    /// If `a` is not a finite, symmetric matrix of at least 2x2, or if `c` is
    /// not finite.
    pub fn new(a: DMatrix<f64>, c: f64) -> Result<Self, QuadFormError> {
        eigen::check_symmetric(&a, SYMMETRY_TOL)?;
        if !c.is_finite() {
            return Err(QuadFormError::NonFiniteLevel { c });
        }
        Ok(QuadraticForm { a, c })
    }

    /// Creates a new QuadraticForm without checking whether the parameters
    /// are valid.
    #[inline]
    pub fn new_unchecked(a: DMatrix<f64>, c: f64) -> Self {
        QuadraticForm { a, c }
    }

    /// The general conic `αx² + βxy + γy² = c`
    ///
    /// # Example
    ///
    /// ```
    /// # use ellipstat::quad_form::QuadraticForm;
    /// let form = QuadraticForm::from_conic(5.0, 6.0, 5.0, 8.0).unwrap();
    /// assert_eq!(form.a()[(0, 1)], 3.0);
    /// ```
    pub fn from_conic(
        alpha: f64,
        beta: f64,
        gamma: f64,
        c: f64,
    ) -> Result<Self, QuadFormError> {
        let half_beta = beta / 2.0;
        let a = DMatrix::from_row_slice(2, 2, &[alpha, half_beta, half_beta, gamma]);
        QuadraticForm::new(a, c)
    }

    #[inline]
    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    #[inline]
    pub fn c(&self) -> f64 {
        self.c
    }

    /// The number of dimensions
    #[inline]
    pub fn dim(&self) -> usize {
        self.a.nrows()
    }

    /// xᵀAx
    pub fn eval(&self, x: &DVector<f64>) -> Result<f64, QuadFormError> {
        if x.len() != self.dim() {
            return Err(QuadFormError::DimensionMismatch {
                left: self.dim(),
                right: x.len(),
            });
        }
        Ok(x.dot(&(&self.a * x)))
    }

    /// Eigen-decomposition of `A` with the default options
    pub fn decompose(&self) -> Result<EigenDecomposition, QuadFormError> {
        eigen_decompose(&self.a)
    }

    /// Classify the level set from the signs of the eigenvalues and `c`
    pub fn conic_kind(&self) -> Result<ConicKind, QuadFormError> {
        let eig = self.decompose()?;
        Ok(self.classify(eig.eigenvalues()))
    }

    fn classify(&self, eigenvalues: &DVector<f64>) -> ConicKind {
        let scale = eigenvalues.amax().max(1.0);
        let tol = ZERO_EIGENVALUE_TOL * scale;

        if eigenvalues.iter().any(|l| l.abs() <= tol) {
            return ConicKind::Parabolic;
        }

        let n_pos = eigenvalues.iter().filter(|&&l| l > 0.0).count();
        let sign = if n_pos == eigenvalues.len() {
            1.0
        } else if n_pos == 0 {
            -1.0
        } else {
            return ConicKind::Hyperbola;
        };

        let signed_c = sign * self.c;
        if signed_c > 0.0 {
            ConicKind::Ellipse
        } else if signed_c == 0.0 {
            ConicKind::Point
        } else {
            ConicKind::Empty
        }
    }

    /// Length of each semi-axis, `sqrt(c / λ_i)`, in eigenpair order
    /// (descending eigenvalue, so the shortest axis comes first).
    ///
    /// # Errors
    ///
    /// `NotEllipse` unless the form is an ellipse or ellipsoid.
    pub fn semi_axes(&self) -> Result<Vec<f64>, QuadFormError> {
        let eig = self.decompose()?;
        self.semi_axes_from(&eig)
    }

    fn semi_axes_from(
        &self,
        eig: &EigenDecomposition,
    ) -> Result<Vec<f64>, QuadFormError> {
        match self.classify(eig.eigenvalues()) {
            ConicKind::Ellipse => {
                Ok(eig.eigenvalues().iter().map(|l| (self.c / l).sqrt()).collect())
            }
            kind => Err(QuadFormError::NotEllipse { kind }),
        }
    }

    /// `count` points evenly spaced in angle around a 2-D ellipse, for
    /// plotting. Each point is `S (a₀ cos t, a₁ sin t)` where `S` holds the
    /// eigenvectors and `a₀, a₁` are the semi-axes.
    ///
    /// # Errors
    ///
    /// `NotPlanar` outside two dimensions and `NotEllipse` if the form is
    /// not an ellipse.
    ///
    /// # Example
    ///
    /// ```
    /// # use ellipstat::quad_form::QuadraticForm;
    /// use nalgebra::DVector;
    ///
    /// let form = QuadraticForm::from_conic(5.0, 6.0, 5.0, 8.0).unwrap();
    /// let pts = form.ellipse_points(16).unwrap();
    ///
    /// assert_eq!(pts.len(), 16);
    /// for [x, y] in pts {
    ///     let level = form.eval(&DVector::from_column_slice(&[x, y])).unwrap();
    ///     assert!((level - 8.0).abs() < 1E-9);
    /// }
    /// ```
    pub fn ellipse_points(
        &self,
        count: usize,
    ) -> Result<Vec<[f64; 2]>, QuadFormError> {
        if self.dim() != 2 {
            return Err(QuadFormError::NotPlanar { dim: self.dim() });
        }
        let eig = self.decompose()?;
        let semi = self.semi_axes_from(&eig)?;
        let s = eig.eigenvectors();

        let pts = (0..count)
            .map(|ix| {
                let t = TAU * ix as f64 / count as f64;
                let local =
                    DVector::from_column_slice(&[semi[0] * t.cos(), semi[1] * t.sin()]);
                let x = s * &local;
                [x[0], x[1]]
            })
            .collect();
        Ok(pts)
    }
}

impl From<&QuadraticForm> for String {
    fn from(form: &QuadraticForm) -> String {
        let terms: Vec<String> = form
            .a
            .row_iter()
            .map(|row| {
                let xs: Vec<String> = row.iter().map(|x| format!("{}", x)).collect();
                format!("[{}]", xs.join(", "))
            })
            .collect();
        format!("QuadraticForm(A: [{}], c: {})", terms.join(", "), form.c)
    }
}

impl_display!(QuadraticForm);

impl fmt::Display for ConicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ellipse => "ellipse",
            Self::Point => "point",
            Self::Empty => "empty",
            Self::Hyperbola => "hyperbola",
            Self::Parabolic => "parabolic",
        };
        write!(f, "{}", s)
    }
}

impl std::error::Error for QuadFormError {}

impl fmt::Display for QuadFormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSquare { nrows, ncols } => {
                write!(f, "matrix is {}x{}, not square", nrows, ncols)
            }
            Self::TooSmall { dim } => {
                write!(f, "matrix is {}x{} but must be at least 2x2", dim, dim)
            }
            Self::NonFinite { row, col, value } => {
                write!(f, "a[{}, {}] ({}) was non-finite", row, col, value)
            }
            Self::NotSymmetric { row, col, diff } => write!(
                f,
                "matrix is not symmetric: a[{}, {}] and a[{}, {}] differ by {}",
                row, col, col, row, diff
            ),
            Self::NonFiniteLevel { c } => {
                write!(f, "level constant c ({}) was non-finite", c)
            }
            Self::DimensionMismatch { left, right } => {
                write!(f, "dimensions do not match ({} vs {})", left, right)
            }
            Self::ZeroVector => {
                write!(f, "vector has zero or non-finite length")
            }
            Self::NotPlanar { dim } => {
                write!(f, "only defined in 2 dimensions, got {}", dim)
            }
            Self::NotEllipse { kind } => {
                write!(f, "the level set is {}, not an ellipse", kind)
            }
            Self::ZeroMaxIters => {
                write!(f, "the iteration cap must be at least one")
            }
            Self::DidNotConverge { max_iters } => write!(
                f,
                "eigen solver did not converge in {} iterations",
                max_iters
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_basic_impls;

    const TOL: f64 = 1E-12;

    fn ellipse() -> QuadraticForm {
        QuadraticForm::from_conic(5.0, 6.0, 5.0, 8.0).unwrap()
    }

    test_basic_impls!(ellipse());

    #[test]
    fn new_rejects_non_symmetric() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 0.0, 1.0]);
        let err = QuadraticForm::new(a, 1.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSymmetric);
    }

    #[test]
    fn new_rejects_non_finite_level() {
        let a = DMatrix::identity(2, 2);
        assert!(matches!(
            QuadraticForm::new(a, f64::NAN),
            Err(QuadFormError::NonFiniteLevel { .. })
        ));
    }

    #[test]
    fn eval() {
        let form = ellipse();
        let x = DVector::from_column_slice(&[1.0, 2.0]);
        // 5 + 12 + 20
        assert::close(form.eval(&x).unwrap(), 37.0, TOL);
        assert!(form.eval(&DVector::zeros(3)).is_err());
    }

    #[test]
    fn eval_in_principal_axes_has_no_cross_terms() {
        let form = ellipse();
        let eig = form.decompose().unwrap();
        let s = eig.eigenvectors();
        let y = DVector::from_column_slice(&[0.3, -1.7]);
        let x = s * &y;
        let expected = 8.0 * 0.3 * 0.3 + 2.0 * 1.7 * 1.7;
        assert::close(form.eval(&x).unwrap(), expected, 1E-10);
    }

    #[test]
    fn conic_kinds() {
        let kind = |alpha, beta, gamma, c| {
            QuadraticForm::from_conic(alpha, beta, gamma, c)
                .unwrap()
                .conic_kind()
                .unwrap()
        };
        assert_eq!(kind(5.0, 6.0, 5.0, 8.0), ConicKind::Ellipse);
        assert_eq!(kind(5.0, 6.0, 5.0, 0.0), ConicKind::Point);
        assert_eq!(kind(5.0, 6.0, 5.0, -1.0), ConicKind::Empty);
        assert_eq!(kind(-5.0, 6.0, -5.0, -8.0), ConicKind::Ellipse);
        assert_eq!(kind(1.0, 0.0, -1.0, 1.0), ConicKind::Hyperbola);
        assert_eq!(kind(1.0, 2.0, 1.0, 1.0), ConicKind::Parabolic);
    }

    #[test]
    fn semi_axes() {
        let axes = ellipse().semi_axes().unwrap();
        assert::close(axes, vec![1.0, 2.0], TOL);
    }

    #[test]
    fn semi_axes_of_ellipsoid() {
        let a = DMatrix::from_diagonal(&DVector::from_column_slice(&[4.0, 1.0, 0.25]));
        let form = QuadraticForm::new(a, 1.0).unwrap();
        assert::close(form.semi_axes().unwrap(), vec![0.5, 1.0, 2.0], TOL);
    }

    #[test]
    fn semi_axes_reject_hyperbola() {
        let form = QuadraticForm::from_conic(1.0, 0.0, -1.0, 1.0).unwrap();
        assert_eq!(
            form.semi_axes(),
            Err(QuadFormError::NotEllipse {
                kind: ConicKind::Hyperbola
            })
        );
    }

    #[test]
    fn ellipse_points_lie_on_the_curve() {
        let form = ellipse();
        let pts = form.ellipse_points(64).unwrap();
        assert_eq!(pts.len(), 64);
        for [x, y] in pts {
            let level = form.eval(&DVector::from_column_slice(&[x, y])).unwrap();
            assert::close(level, 8.0, 1E-9);
        }
    }

    #[test]
    fn ellipse_points_start_on_first_principal_axis() {
        // t = 0 lands on the first principal axis, scaled by its semi-axis
        let pts = ellipse().ellipse_points(4).unwrap();
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert::close(pts[0][0], h, 1E-10);
        assert::close(pts[0][1], h, 1E-10);
    }

    #[test]
    fn ellipse_points_need_two_dims() {
        let form = QuadraticForm::new(DMatrix::identity(3, 3), 1.0).unwrap();
        assert_eq!(
            form.ellipse_points(8),
            Err(QuadFormError::NotPlanar { dim: 3 })
        );
    }

    #[test]
    fn error_kinds() {
        assert_eq!(
            QuadFormError::DidNotConverge { max_iters: 3 }.kind(),
            ErrorKind::MaxIterationsExceeded
        );
        assert_eq!(QuadFormError::ZeroVector.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn display() {
        assert_eq!(
            format!("{}", ellipse()),
            "QuadraticForm(A: [[5, 3], [3, 5]], c: 8)"
        );
    }
}
