//! Probability distributions
pub mod binomial;
pub mod multinomial;

pub use binomial::{Binomial, BinomialError, BinomialParameters};
pub use multinomial::{
    Multinomial, MultinomialError, MultinomialParameters,
};
