//! Error classification shared by every error type in the crate
//!
//! Each distribution or geometry type has its own error enum carrying the
//! offending values. `ErrorKind` groups those variants into the handful of
//! failure classes a caller usually branches on.
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    /// One or more of the supplied parameters or observations is invalid
    InvalidArgument,
    /// The event has zero probability under the model. Log-probabilities
    /// report this as negative infinity rather than as an error value.
    ImpossibleEvent,
    /// A symmetric matrix was required
    NotSymmetric,
    /// An intermediate value left its mathematical domain through round-off.
    /// These are clamped where they occur and never returned as errors.
    NumericDomainViolation,
    /// An algorithm has reached the maximum number of iterations allowed
    MaxIterationsExceeded,
}

impl ErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::ImpossibleEvent => "impossible event",
            ErrorKind::NotSymmetric => "not symmetric",
            ErrorKind::NumericDomainViolation => "numeric domain violation",
            ErrorKind::MaxIterationsExceeded => "max iterations exceeded",
        }
    }

    /// Classify a log-probability.
    ///
    /// Returns `Some(ErrorKind::ImpossibleEvent)` for negative infinity and
    /// `None` for any other value.
    ///
    /// # Example
    ///
    /// ```
    /// use ellipstat::result::ErrorKind;
    ///
    /// assert_eq!(
    ///     ErrorKind::of_ln_prob(f64::NEG_INFINITY),
    ///     Some(ErrorKind::ImpossibleEvent)
    /// );
    /// assert_eq!(ErrorKind::of_ln_prob(-4.35), None);
    /// ```
    pub fn of_ln_prob(ln_p: f64) -> Option<ErrorKind> {
        if ln_p == f64::NEG_INFINITY {
            Some(ErrorKind::ImpossibleEvent)
        } else {
            None
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
