//! Multinomial distribution over count vectors
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::consts::PROB_SUM_TOL;
use crate::dist::Binomial;
use crate::impl_display;
use crate::misc::{ln_fact, vec_to_string, xlogy};
use crate::result::ErrorKind;
use crate::traits::*;
use nalgebra::DMatrix;
use num_traits::PrimInt;
use rand::Rng;
use std::fmt;
use tracing::trace;

/// [Multinomial distribution](https://en.wikipedia.org/wiki/Multinomial_distribution)
/// over the counts of `k` categories in `n` independent trials.
///
/// The distribution is a plain, immutable pair of parameters. Observations are
/// vectors of non-negative integers aligned with the probabilities and summing
/// to `n`.
///
/// # Example
///
/// ```
/// use ellipstat::prelude::*;
///
/// let mn = Multinomial::new(10, vec![0.1, 0.42, 0.04, 0.44]).unwrap();
///
/// let ln_p = mn.try_ln_pmf(&[1_u32, 2, 1, 6]).unwrap();
/// assert!((ln_p - -4.3503).abs() < 1E-4);
///
/// // the mean number of draws in each category
/// let mean: Vec<f64> = mn.mean().unwrap();
/// assert!((mean[3] - 4.4).abs() < 1E-12);
/// ```
///
/// Categories with zero probability make any count in them impossible. That
/// is reported as a log-probability of negative infinity, not as an error.
///
/// ```
/// # use ellipstat::prelude::*;
/// let mn = Multinomial::new(3, vec![0.5, 0.0, 0.5]).unwrap();
///
/// assert_eq!(mn.try_ln_pmf(&[1_u32, 1, 1]), Ok(f64::NEG_INFINITY));
/// assert!(mn.try_ln_pmf(&[2_u32, 0, 1]).unwrap().is_finite());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct Multinomial {
    /// Number of trials
    n: u64,
    /// Probability of each category
    ps: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct MultinomialParameters {
    pub n: u64,
    pub ps: Vec<f64>,
}

impl Parameterized for Multinomial {
    type Parameters = MultinomialParameters;

    fn emit_params(&self) -> Self::Parameters {
        Self::Parameters {
            n: self.n(),
            ps: self.ps().to_vec(),
        }
    }

    fn from_params(params: Self::Parameters) -> Self {
        Self::new_unchecked(params.n, params.ps)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum MultinomialError {
    /// There are no categories
    EmptyProbabilities,
    /// A probability is infinite or NaN
    NonFiniteProbability { ix: usize, p: f64 },
    /// A probability is less than zero
    NegativeProbability { ix: usize, p: f64 },
    /// A probability is greater than one
    ProbabilityGreaterThanOne { ix: usize, p: f64 },
    /// The probabilities do not sum to one
    ProbabilitiesDoNotSumToOne { sum: f64 },
    /// The observation does not have one count per category
    ObservationLengthMismatch { len: usize, expected: usize },
    /// A count is negative
    NegativeCount { ix: usize },
    /// A count is larger than the number of trials
    CountExceedsTrials { ix: usize, n: u64 },
    /// The counts do not sum to the number of trials
    CountsDoNotSumToTrials { sum: u128, n: u64 },
}

impl MultinomialError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

impl Multinomial {
    /// Create a new Multinomial distribution
    ///
    /// # Arguments
    ///
    /// - n: the number of trials
    /// - ps: the probability of each category. Each must be in [0, 1] and
    ///   they must sum to 1.
    ///
    /// # Example
    ///
    /// ```
    /// # use ellipstat::dist::{Multinomial, MultinomialError};
    /// assert!(Multinomial::new(4, vec![0.25; 4]).is_ok());
    ///
    /// assert_eq!(
    ///     Multinomial::new(4, vec![0.5, 0.4]),
    ///     Err(MultinomialError::ProbabilitiesDoNotSumToOne { sum: 0.9 })
    /// );
    /// ```
    pub fn new(n: u64, ps: Vec<f64>) -> Result<Self, MultinomialError> {
        if ps.is_empty() {
            return Err(MultinomialError::EmptyProbabilities);
        }

        ps.iter().enumerate().try_for_each(|(ix, &p)| {
            if !p.is_finite() {
                Err(MultinomialError::NonFiniteProbability { ix, p })
            } else if p < 0.0 {
                Err(MultinomialError::NegativeProbability { ix, p })
            } else if p > 1.0 {
                Err(MultinomialError::ProbabilityGreaterThanOne { ix, p })
            } else {
                Ok(())
            }
        })?;

        let sum: f64 = ps.iter().sum();
        if (sum - 1.0).abs() > PROB_SUM_TOL {
            return Err(MultinomialError::ProbabilitiesDoNotSumToOne { sum });
        }

        Ok(Multinomial { n, ps })
    }

    /// Creates a new Multinomial without checking whether the parameters are
    /// valid.
    #[inline]
    pub fn new_unchecked(n: u64, ps: Vec<f64>) -> Self {
        Multinomial { n, ps }
    }

    /// Multinomial with equal probability for each of `k` categories
    ///
    /// # Example
    ///
    /// ```
    /// # use ellipstat::dist::Multinomial;
    /// let mn = Multinomial::uniform(6, 3);
    /// assert_eq!(mn.k(), 3);
    /// assert_eq!(mn.ps(), &[1.0 / 3.0; 3]);
    /// ```
    pub fn uniform(n: u64, k: usize) -> Self {
        Multinomial::new_unchecked(n, vec![1.0 / k as f64; k])
    }

    /// Get the number of trials
    #[inline]
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Get the category probabilities
    #[inline]
    pub fn ps(&self) -> &[f64] {
        &self.ps
    }

    /// Get the number of categories
    #[inline]
    pub fn k(&self) -> usize {
        self.ps.len()
    }

    /// Validate an observation and return its counts as `u64`
    fn counts<X: PrimInt>(&self, xs: &[X]) -> Result<Vec<u64>, MultinomialError> {
        if xs.len() != self.k() {
            return Err(MultinomialError::ObservationLengthMismatch {
                len: xs.len(),
                expected: self.k(),
            });
        }

        let counts = xs
            .iter()
            .enumerate()
            .map(|(ix, &x)| {
                if x < X::zero() {
                    Err(MultinomialError::NegativeCount { ix })
                } else {
                    x.to_u64()
                        .filter(|&k| k <= self.n)
                        .ok_or(MultinomialError::CountExceedsTrials {
                            ix,
                            n: self.n,
                        })
                }
            })
            .collect::<Result<Vec<u64>, _>>()?;

        let sum: u128 = counts.iter().map(|&k| u128::from(k)).sum();
        if sum != u128::from(self.n) {
            return Err(MultinomialError::CountsDoNotSumToTrials {
                sum,
                n: self.n,
            });
        }

        Ok(counts)
    }

    /// ln(n! / ∏ k_i!) + Σ k_i ln(p_i) for counts already known to be valid
    fn ln_f_counts(&self, counts: &[u64]) -> f64 {
        let ln_coef = counts
            .iter()
            .fold(ln_fact(self.n), |acc, &k| acc - ln_fact(k));
        counts
            .iter()
            .zip(self.ps.iter())
            .fold(ln_coef, |acc, (&k, &p)| acc + xlogy(k as f64, p))
    }

    /// Log probability of an observation, with the observation checked first.
    ///
    /// Returns an error if the observation has the wrong length, contains a
    /// negative count, or does not sum to `n`. An observation that puts counts
    /// in a zero-probability category is valid but impossible, and yields
    /// `Ok(f64::NEG_INFINITY)`.
    pub fn try_ln_pmf<X: PrimInt>(
        &self,
        xs: &[X],
    ) -> Result<f64, MultinomialError> {
        self.counts(xs).map(|counts| self.ln_f_counts(&counts))
    }

    /// The full covariance matrix of the counts.
    ///
    /// The diagonal holds `n p_i (1 - p_i)` and the off-diagonal entries are
    /// `-n p_i p_j`.
    ///
    /// # Example
    ///
    /// ```
    /// # use ellipstat::dist::Multinomial;
    /// let mn = Multinomial::new(10, vec![0.5, 0.5]).unwrap();
    /// let cov = mn.covariance();
    ///
    /// assert_eq!(cov[(0, 0)], 2.5);
    /// assert_eq!(cov[(0, 1)], -2.5);
    /// ```
    pub fn covariance(&self) -> DMatrix<f64> {
        let nf = self.n as f64;
        let k = self.k();
        DMatrix::from_fn(k, k, |i, j| {
            if i == j {
                nf * self.ps[i] * (1.0 - self.ps[i])
            } else {
                -nf * self.ps[i] * self.ps[j]
            }
        })
    }

    /// The binomial law of the count in category `ix`, or `None` if there is
    /// no such category.
    ///
    /// # Example
    ///
    /// ```
    /// # use ellipstat::dist::{Binomial, Multinomial};
    /// let mn = Multinomial::new(10, vec![0.2, 0.3, 0.5]).unwrap();
    ///
    /// assert_eq!(mn.marginal(1), Some(Binomial::new(10, 0.3).unwrap()));
    /// assert_eq!(mn.marginal(3), None);
    /// ```
    pub fn marginal(&self, ix: usize) -> Option<Binomial> {
        self.ps.get(ix).map(|&p| Binomial::new_unchecked(self.n, p))
    }

    /// Draw one count vector by sequential binomial conditioning.
    ///
    /// Category `i` receives `Binomial(n_left, p_i / p_left)` trials, where
    /// `n_left` and `p_left` are the trials and probability mass not yet
    /// assigned. The last category with non-zero probability takes whatever
    /// remains, so every draw sums to `n` exactly.
    fn draw_counts<R: Rng>(&self, rng: &mut R) -> Vec<u64> {
        let k = self.k();
        let mut counts = vec![0_u64; k];
        let last = match self.ps.iter().rposition(|&p| p > 0.0) {
            Some(ix) => ix,
            None => return counts,
        };

        let mut n_left = self.n;
        let mut p_left = 1.0;
        for (ix, &p) in self.ps.iter().enumerate().take(last + 1) {
            if n_left == 0 {
                break;
            }
            if ix == last {
                counts[ix] = n_left;
                break;
            }

            let q = if p_left > 0.0 {
                (p / p_left).clamp(0.0, 1.0)
            } else {
                0.0
            };

            let x = if q == 0.0 {
                0
            } else if q == 1.0 {
                n_left
            } else {
                let b = rand_distr::Binomial::new(n_left, q)
                    .expect("conditional probability lies in (0, 1)");
                rng.sample(b)
            };

            counts[ix] = x;
            n_left -= x;
            p_left -= p;
        }
        counts
    }
}

/// Log probability of observing counts `ks` in `n` trials with category
/// probabilities `ps`.
///
/// Computed as `ln Γ(n+1) - Σ ln Γ(k_i+1) + Σ k_i ln p_i`, so large `n` does
/// not overflow.
///
/// # Errors
///
/// Any malformed argument: empty or invalid `ps`, `ps` not summing to 1,
/// `ks` of the wrong length, negative counts, or counts not summing to `n`.
///
/// # Example
///
/// ```
/// use ellipstat::dist::multinomial::ln_pmf;
///
/// let ln_p = ln_pmf(10, &[0.1, 0.42, 0.04, 0.44], &[1_i64, 2, 1, 6]).unwrap();
/// assert!((ln_p - -4.350_331_19).abs() < 1E-6);
///
/// assert!(ln_pmf(10, &[0.1, 0.42, 0.04, 0.44], &[1_i64, 2, 1, 5]).is_err());
/// assert!(ln_pmf(10, &[0.5, 0.6], &[5_i64, 5]).is_err());
/// ```
pub fn ln_pmf<X: PrimInt>(
    n: u64,
    ps: &[f64],
    ks: &[X],
) -> Result<f64, MultinomialError> {
    Multinomial::new(n, ps.to_vec())?.try_ln_pmf(ks)
}

/// Draw `num_samples` independent count vectors from `Multinomial(n, ps)`
/// using the supplied random source.
///
/// # Example
///
/// ```
/// use ellipstat::dist::multinomial::sample_many;
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
///
/// let mut rng = SmallRng::seed_from_u64(0x1234);
/// let xs = sample_many(10, &[0.1, 0.42, 0.04, 0.44], 100, &mut rng).unwrap();
///
/// assert_eq!(xs.len(), 100);
/// assert!(xs.iter().all(|x| x.len() == 4 && x.iter().sum::<u64>() == 10));
/// ```
pub fn sample_many<R: Rng>(
    n: u64,
    ps: &[f64],
    num_samples: usize,
    rng: &mut R,
) -> Result<Vec<Vec<u64>>, MultinomialError> {
    let mn = Multinomial::new(n, ps.to_vec())?;
    trace!(n, k = mn.k(), num_samples, "drawing multinomial samples");
    Ok(mn.sample(num_samples, rng))
}

impl From<&Multinomial> for String {
    fn from(mn: &Multinomial) -> String {
        format!("Multinomial(n: {}, ps: {})", mn.n, vec_to_string(&mn.ps, 5))
    }
}

impl_display!(Multinomial);

macro_rules! impl_int_traits {
    ($kind:ty) => {
        impl HasDensity<Vec<$kind>> for Multinomial {
            fn ln_f(&self, xs: &Vec<$kind>) -> f64 {
                self.try_ln_pmf(xs.as_slice()).unwrap_or(f64::NEG_INFINITY)
            }
        }

        impl Support<Vec<$kind>> for Multinomial {
            fn supports(&self, xs: &Vec<$kind>) -> bool {
                self.counts(xs.as_slice()).is_ok()
            }
        }

        impl DiscreteDistr<Vec<$kind>> for Multinomial {}
    };
}

// A single count can be as large as `n`, so draws are only produced in types
// that hold any u64 count.
macro_rules! impl_sampleable {
    ($kind:ty) => {
        impl Sampleable<Vec<$kind>> for Multinomial {
            /// # Panics
            ///
            /// If a count does not fit in the target type, which takes more
            /// than `i64::MAX` trials.
            fn draw<R: Rng>(&self, rng: &mut R) -> Vec<$kind> {
                self.draw_counts(rng)
                    .into_iter()
                    .map(|x| {
                        <$kind>::try_from(x).expect("count overflows sample type")
                    })
                    .collect()
            }
        }
    };
}

impl Mean<Vec<f64>> for Multinomial {
    fn mean(&self) -> Option<Vec<f64>> {
        let nf = self.n as f64;
        Some(self.ps.iter().map(|&p| nf * p).collect())
    }
}

impl Variance<Vec<f64>> for Multinomial {
    fn variance(&self) -> Option<Vec<f64>> {
        let nf = self.n as f64;
        Some(self.ps.iter().map(|&p| nf * p * (1.0 - p)).collect())
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

impl std::error::Error for MultinomialError {}

impl fmt::Display for MultinomialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyProbabilities => {
                write!(f, "the probability vector was empty")
            }
            Self::NonFiniteProbability { ix, p } => {
                write!(f, "p[{}] ({}) was non-finite", ix, p)
            }
            Self::NegativeProbability { ix, p } => {
                write!(f, "p[{}] ({}) was less than zero", ix, p)
            }
            Self::ProbabilityGreaterThanOne { ix, p } => {
                write!(f, "p[{}] ({}) was greater than one", ix, p)
            }
            Self::ProbabilitiesDoNotSumToOne { sum } => {
                write!(f, "probabilities sum to {} instead of 1", sum)
            }
            Self::ObservationLengthMismatch { len, expected } => write!(
                f,
                "observation has {} counts but there are {} categories",
                len, expected
            ),
            Self::NegativeCount { ix } => {
                write!(f, "count {} was negative", ix)
            }
            Self::CountExceedsTrials { ix, n } => {
                write!(f, "count {} exceeds the number of trials ({})", ix, n)
            }
            Self::CountsDoNotSumToTrials { sum, n } => write!(
                f,
                "counts sum to {} but the number of trials is {}",
                sum, n
            ),
        }
    }
}
