use special::Gamma;
use std::fmt::Debug;
use tracing::debug;

/// Natural logarithm of n!, ln Γ(n + 1)
///
/// # Example
///
/// ```rust
/// use ellipstat::misc::ln_fact;
///
/// assert!((ln_fact(5) - 120.0_f64.ln()).abs() < 1E-12);
/// assert_eq!(ln_fact(0), 0.0);
/// ```
pub fn ln_fact(n: u64) -> f64 {
    if n < 2 {
        0.0
    } else {
        (n as f64 + 1.0).ln_gamma().0
    }
}

/// Natural logarithm of binomial coefficent, ln nCk
///
/// # Example
///
/// ```rust
/// use ellipstat::misc::ln_binom;
///
/// assert!((ln_binom(4.0, 2.0) - 6.0_f64.ln()).abs() < 1E-12);
/// ```
pub fn ln_binom(n: f64, k: f64) -> f64 {
    (n + 1.0).ln_gamma().0 - (k + 1.0).ln_gamma().0 - (n - k + 1.0).ln_gamma().0
}

/// `k * ln(p)` with the convention that `0 * ln(0) = 0`
#[inline]
pub fn xlogy(k: f64, p: f64) -> f64 {
    if k == 0.0 {
        0.0
    } else {
        k * p.ln()
    }
}

/// Clamp a cosine into [-1, 1].
///
/// Dot products of unit vectors can land a few ulps outside the domain of
/// `acos`. Those are pulled back to the boundary here so that downstream
/// angles are never NaN.
///
/// # Example
///
/// ```rust
/// use ellipstat::misc::clamp_unit;
///
/// assert_eq!(clamp_unit(1.0 + 1E-15), 1.0);
/// assert_eq!(clamp_unit(-1.0 - 1E-15), -1.0);
/// assert_eq!(clamp_unit(0.5), 0.5);
/// ```
pub fn clamp_unit(x: f64) -> f64 {
    if x > 1.0 {
        debug!(value = x, "clamping cosine down to 1");
        1.0
    } else if x < -1.0 {
        debug!(value = x, "clamping cosine up to -1");
        -1.0
    } else {
        x
    }
}

/// Convert a Vector to a printable string
///
/// # Example
///
/// ```rust
/// # use ellipstat::misc::vec_to_string;
/// let xs: Vec<u8> = vec![0, 1, 2, 3, 4, 5];
///
/// assert_eq!(vec_to_string(&xs, 6).as_str(), "[0, 1, 2, 3, 4, 5]");
/// assert_eq!(vec_to_string(&xs, 5).as_str(), "[0, 1, 2, 3, ... , 5]");
/// ```
pub fn vec_to_string<T: Debug>(xs: &[T], max_entries: usize) -> String {
    let n = xs.len();
    let show = |ys: &[T]| {
        ys.iter()
            .map(|y| format!("{:?}", y))
            .collect::<Vec<_>>()
            .join(", ")
    };
    if n <= max_entries || max_entries < 2 {
        format!("[{}]", show(xs))
    } else {
        format!("[{}, ... , {:?}]", show(&xs[..max_entries - 1]), xs[n - 1])
    }
}
