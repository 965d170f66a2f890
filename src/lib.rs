//! Multinomial log-probabilities and moments, and the principal axes of
//! quadratic forms.
//!
//! # Multinomial
//!
//! ```
//! use ellipstat::dist::multinomial::ln_pmf;
//!
//! let ln_p = ln_pmf(10, &[0.1, 0.42, 0.04, 0.44], &[1_u32, 2, 1, 6]).unwrap();
//! assert!((ln_p - -4.3503).abs() < 1E-4);
//! ```
//!
//! # Quadratic forms
//!
//! ```
//! use ellipstat::quad_form::{eigen_decompose, principal_axis_angle};
//! use nalgebra::{DMatrix, DVector};
//!
//! let a = DMatrix::from_row_slice(2, 2, &[5.0, 3.0, 3.0, 5.0]);
//! let eig = eigen_decompose(&a).unwrap();
//!
//! let x_axis = DVector::from_column_slice(&[1.0, 0.0]);
//! let angle = principal_axis_angle(&eig.eigenvector(0), &x_axis).unwrap();
//! assert!((angle - 45.0).abs() < 1E-9);
//! ```
#![warn(
    clippy::all,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::unseparated_literal_suffix,
    clippy::unreadable_literal,
    clippy::option_option,
    clippy::implicit_clone
)]

#[cfg(doctest)]
doc_comment::doctest!("../README.md");

pub mod consts;
pub mod dist;
pub mod misc;
pub mod prelude;
pub mod quad_form;
pub mod result;
pub mod traits;

#[macro_export]
macro_rules! impl_display {
    ($kind: ty) => {
        impl ::std::fmt::Display for $kind {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", String::from(self))
            }
        }
    };
}
