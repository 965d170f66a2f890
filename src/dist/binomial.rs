//! Binomial law of a single multinomial category
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::impl_display;
use crate::misc::{ln_binom, xlogy};
use crate::result::ErrorKind;
use crate::traits::*;
use rand::Rng;
use std::fmt;

/// Number of successes in `n` trials that each succeed with probability `p`.
///
/// A multinomial with two categories is a binomial, and every category of a
/// multinomial is binomially distributed on its own. See
/// [`Multinomial::marginal`](crate::dist::Multinomial::marginal).
///
/// ```
/// use ellipstat::prelude::*;
///
/// let binom = Binomial::new(4, 0.5).unwrap();
///
/// assert!((binom.pmf(&2_u8) - 0.375).abs() < 1E-12);
/// assert_eq!(binom.pmf(&5_u8), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct Binomial {
    n: u64,
    p: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct BinomialParameters {
    pub n: u64,
    pub p: f64,
}

impl Parameterized for Binomial {
    type Parameters = BinomialParameters;

    fn emit_params(&self) -> Self::Parameters {
        BinomialParameters {
            n: self.n,
            p: self.p,
        }
    }

    fn from_params(params: Self::Parameters) -> Self {
        Self::new_unchecked(params.n, params.p)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum BinomialError {
    /// The success probability is infinite or NaN
    NonFiniteProbability { p: f64 },
    /// The success probability is below zero
    NegativeProbability { p: f64 },
    /// The success probability is above one
    ProbabilityGreaterThanOne { p: f64 },
}

impl BinomialError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

impl Binomial {
    /// `Binomial(n, p)` for any `p` in [0, 1]. With `n = 0` all the mass sits
    /// on zero successes.
    pub fn new(n: u64, p: f64) -> Result<Self, BinomialError> {
        if !p.is_finite() {
            Err(BinomialError::NonFiniteProbability { p })
        } else if p < 0.0 {
            Err(BinomialError::NegativeProbability { p })
        } else if p > 1.0 {
            Err(BinomialError::ProbabilityGreaterThanOne { p })
        } else {
            Ok(Binomial { n, p })
        }
    }

    #[inline]
    pub fn new_unchecked(n: u64, p: f64) -> Self {
        Binomial { n, p }
    }

    #[inline]
    pub fn n(&self) -> u64 {
        self.n
    }

    #[inline]
    pub fn p(&self) -> f64 {
        self.p
    }

    /// Probability of a failure
    ///
    /// ```
    /// # use ellipstat::dist::Binomial;
    /// assert_eq!(Binomial::new(10, 0.25).unwrap().q(), 0.75);
    /// ```
    #[inline]
    pub fn q(&self) -> f64 {
        1.0 - self.p
    }

    /// ln C(n, k) + k ln p + (n - k) ln q, with `0 ln 0 = 0` so that `p` of
    /// zero or one gives a point mass
    fn ln_f_count(&self, k: u64) -> f64 {
        if k > self.n {
            return f64::NEG_INFINITY;
        }
        let nf = self.n as f64;
        let kf = k as f64;
        ln_binom(nf, kf) + xlogy(kf, self.p) + xlogy(nf - kf, self.q())
    }

    fn draw_count<R: Rng>(&self, rng: &mut R) -> u64 {
        if self.n == 0 {
            return 0;
        }
        let b = rand_distr::Binomial::new(self.n, self.p)
            .expect("p was validated on construction");
        rng.sample(b)
    }
}

impl From<&Binomial> for String {
    fn from(b: &Binomial) -> String {
        format!("Binomial(n: {}, p: {})", b.n, b.p)
    }
}

impl_display!(Binomial);

macro_rules! impl_int_traits {
    ($kind:ty) => {
        impl HasDensity<$kind> for Binomial {
            fn ln_f(&self, k: &$kind) -> f64 {
                u64::try_from(*k)
                    .map_or(f64::NEG_INFINITY, |k| self.ln_f_count(k))
            }
        }

        impl Support<$kind> for Binomial {
            fn supports(&self, k: &$kind) -> bool {
                u64::try_from(*k).map_or(false, |k| k <= self.n)
            }
        }

        impl DiscreteDistr<$kind> for Binomial {}
    };
}

// Counts run up to `n`, so only types that hold any u64 count are drawn
macro_rules! impl_sampleable {
    ($kind:ty) => {
        impl Sampleable<$kind> for Binomial {
            fn draw<R: Rng>(&self, rng: &mut R) -> $kind {
                <$kind>::try_from(self.draw_count(rng))
                    .expect("count overflows sample type")
            }
        }
    };
}

impl Mean<f64> for Binomial {
    fn mean(&self) -> Option<f64> {
        Some(self.n as f64 * self.p)
    }
}

impl Variance<f64> for Binomial {
    fn variance(&self) -> Option<f64> {
        Some(self.n as f64 * self.p * self.q())
    }
}

impl_int_traits!(u8);
impl_int_traits!(u16);
impl_int_traits!(u32);
impl_int_traits!(u64);
impl_int_traits!(usize);
impl_int_traits!(i8);
impl_int_traits!(i16);
impl_int_traits!(i32);
impl_int_traits!(i64);

impl_sampleable!(u64);
impl_sampleable!(usize);
impl_sampleable!(i64);

impl std::error::Error for BinomialError {}

impl fmt::Display for BinomialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteProbability { p } => {
                write!(f, "success probability ({}) was non-finite", p)
            }
            Self::NegativeProbability { p } => {
                write!(f, "success probability ({}) was below zero", p)
            }
            Self::ProbabilityGreaterThanOne { p } => {
                write!(f, "success probability ({}) was above one", p)
            }
        }
    }
}
