//! Per-category sample moments of count vectors
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::result::ErrorKind;
use num_traits::AsPrimitive;
use std::fmt;

/// Which divisor to use for the variance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum VarianceKind {
    /// Divide by N
    #[default]
    Population,
    /// Divide by N - 1 (Bessel's correction)
    Sample,
}

impl VarianceKind {
    fn ddof(self) -> usize {
        match self {
            VarianceKind::Population => 0,
            VarianceKind::Sample => 1,
        }
    }
}

/// Component-wise mean and variance of a set of equal-length vectors
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct EmpiricalMoments {
    pub mean: Vec<f64>,
    pub variance: Vec<f64>,
    pub n_samples: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum MomentsError {
    /// No samples were supplied
    NoSamples,
    /// A sample has a different length than the first one
    RaggedSamples {
        ix: usize,
        len: usize,
        expected: usize,
    },
    /// Too few samples for the requested variance divisor
    TooFewSamples { n_samples: usize, required: usize },
}

impl MomentsError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

/// Per-category mean and population variance (divisor N) of `samples`.
///
/// Both moments come from the same set of samples.
///
/// # Example
///
/// ```
/// use ellipstat::misc::empirical_moments;
///
/// let xs: Vec<Vec<u32>> = vec![vec![1, 3], vec![3, 1]];
/// let moments = empirical_moments(&xs).unwrap();
///
/// assert_eq!(moments.mean, vec![2.0, 2.0]);
/// assert_eq!(moments.variance, vec![1.0, 1.0]);
/// ```
pub fn empirical_moments<X, S>(
    samples: &[S],
) -> Result<EmpiricalMoments, MomentsError>
where
    X: AsPrimitive<f64>,
    S: AsRef<[X]>,
{
    empirical_moments_with(samples, VarianceKind::Population)
}

/// Per-category mean and variance with an explicit variance divisor
///
/// # Example
///
/// ```
/// use ellipstat::misc::{empirical_moments_with, VarianceKind};
///
/// let xs: Vec<Vec<u32>> = vec![vec![1, 3], vec![3, 1]];
/// let moments = empirical_moments_with(&xs, VarianceKind::Sample).unwrap();
///
/// assert_eq!(moments.variance, vec![2.0, 2.0]);
/// ```
pub fn empirical_moments_with<X, S>(
    samples: &[S],
    kind: VarianceKind,
) -> Result<EmpiricalMoments, MomentsError>
where
    X: AsPrimitive<f64>,
    S: AsRef<[X]>,
{
    let n_samples = samples.len();
    if n_samples == 0 {
        return Err(MomentsError::NoSamples);
    }

    let ddof = kind.ddof();
    if n_samples <= ddof {
        return Err(MomentsError::TooFewSamples {
            n_samples,
            required: ddof + 1,
        });
    }

    let k = samples[0].as_ref().len();
    samples
        .iter()
        .enumerate()
        .try_for_each(|(ix, xs)| {
            let len = xs.as_ref().len();
            if len == k {
                Ok(())
            } else {
                Err(MomentsError::RaggedSamples {
                    ix,
                    len,
                    expected: k,
                })
            }
        })?;

    let nf = n_samples as f64;

    let mean: Vec<f64> = samples
        .iter()
        .fold(vec![0.0; k], |mut acc, xs| {
            acc.iter_mut()
                .zip(xs.as_ref().iter())
                .for_each(|(a, &x)| *a += x.as_());
            acc
        })
        .into_iter()
        .map(|sum| sum / nf)
        .collect();

    let denom = (n_samples - ddof) as f64;
    let variance: Vec<f64> = samples
        .iter()
        .fold(vec![0.0; k], |mut acc, xs| {
            acc.iter_mut().zip(xs.as_ref().iter()).zip(mean.iter()).for_each(
                |((a, &x), m)| {
                    let diff = x.as_() - m;
                    *a = diff.mul_add(diff, *a);
                },
            );
            acc
        })
        .into_iter()
        .map(|ss| ss / denom)
        .collect();

    Ok(EmpiricalMoments {
        mean,
        variance,
        n_samples,
    })
}

impl std::error::Error for MomentsError {}

impl fmt::Display for MomentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSamples => write!(f, "no samples were supplied"),
            Self::RaggedSamples { ix, len, expected } => write!(
                f,
                "sample {} has length {} but the first sample has length {}",
                ix, len, expected
            ),
            Self::TooFewSamples {
                n_samples,
                required,
            } => write!(
                f,
                "{} sample(s) supplied but at least {} are required",
                n_samples, required
            ),
        }
    }
}
