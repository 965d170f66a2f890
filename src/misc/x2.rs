use num_traits::AsPrimitive;
use special::Gamma;

/// Χ<sup>2</sup> (Chi-squared) goodness-of-fit test.
///
/// Returns the statistic and its p-value. Bins with an expected probability
/// of zero are skipped and do not count towards the degrees of freedom.
///
/// # Example
///
/// Test whether the observed counts were generated uniformly.
///
/// ```
/// use ellipstat::misc::x2_test;
///
/// // The observed counts/frequencies
/// let f_obs: Vec<u32> = vec![28, 31, 40, 35];
///
/// // The probabilty with which each entry should occur
/// let ps: Vec<f64> = vec![0.25; 4];
///
/// let (stat, p) = x2_test(&f_obs, &ps);
/// assert!(p > 0.05);
/// ```
pub fn x2_test<X: AsPrimitive<f64>>(f_obs: &[X], ps: &[f64]) -> (f64, f64) {
    let nf: f64 = f_obs.iter().map(|o| o.as_()).sum();

    let (x2, k) = f_obs.iter().zip(ps.iter()).filter(|&(_, &p)| p > 0.0).fold(
        (0.0, 0_usize),
        |(acc, k), (o, &p)| {
            let expected = nf * p;
            let diff = o.as_() - expected;
            (acc + diff * diff / expected, k + 1)
        },
    );

    let df = k.saturating_sub(1) as f64;
    let p = 1.0 - (x2 / 2.0).inc_gamma(df / 2.0);
    (x2, p)
}
