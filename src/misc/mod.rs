//! Numeric utilities
mod func;
mod moments;
mod x2;

pub use func::*;
pub use moments::*;
pub use x2::x2_test;
