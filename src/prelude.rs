//! Re-imports for convenience
#[doc(no_inline)]
pub use crate::dist::*;
#[doc(no_inline)]
pub use crate::quad_form::{
    eigen_decompose, eigen_decompose_with, principal_axis_angle,
    verify_orthogonality, ConicKind, EigenDecomposition, EigenOptions,
    EigenOrder, QuadFormError, QuadraticForm,
};
#[doc(no_inline)]
pub use crate::result::ErrorKind;
#[doc(no_inline)]
pub use crate::traits::*;
