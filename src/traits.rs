//! Traits shared by the distributions in this crate
use rand::Rng;

/// Conversion between a distribution and a plain parameter struct.
///
/// Distributions are immutable once built; the parameter struct is the way
/// to inspect or rebuild one.
pub trait Parameterized: Sized {
    type Parameters;

    fn emit_params(&self) -> Self::Parameters;

    fn from_params(params: Self::Parameters) -> Self;

    fn map_params(&self, f: impl Fn(Self::Parameters) -> Self::Parameters) -> Self {
        let params = self.emit_params();
        let new_params = f(params);
        Self::from_params(new_params)
    }
}

/// Has a probability mass or density
pub trait HasDensity<X> {
    /// Probability function
    ///
    /// # Example
    ///
    /// ```
    /// use ellipstat::dist::Binomial;
    /// use ellipstat::traits::*;
    ///
    /// let binom = Binomial::new(2, 0.5).unwrap();
    /// assert!((binom.f(&1_u32) - 0.5).abs() < 1E-12);
    /// ```
    fn f(&self, x: &X) -> f64 {
        self.ln_f(x).exp()
    }

    /// Natural logarithm of the probability function
    fn ln_f(&self, x: &X) -> f64;
}

/// Can draw random values of type `X`
pub trait Sampleable<X> {
    /// Single draw from the distribution
    fn draw<R: Rng>(&self, rng: &mut R) -> X;

    /// Multiple draws from the distribution
    ///
    /// # Example
    ///
    /// ```
    /// use ellipstat::dist::Multinomial;
    /// use ellipstat::traits::*;
    ///
    /// let mut rng = rand::thread_rng();
    /// let mn = Multinomial::new(5, vec![0.2, 0.8]).unwrap();
    ///
    /// let xs: Vec<Vec<u64>> = mn.sample(10, &mut rng);
    /// assert_eq!(xs.len(), 10);
    /// assert!(xs.iter().all(|x| x.iter().sum::<u64>() == 5));
    /// ```
    fn sample<R: Rng>(&self, n: usize, mut rng: &mut R) -> Vec<X> {
        (0..n).map(|_| self.draw(&mut rng)).collect()
    }

    /// An endless stream of draws
    fn sample_stream<'r, R: Rng>(
        &'r self,
        mut rng: &'r mut R,
    ) -> Box<dyn Iterator<Item = X> + 'r> {
        Box::new(std::iter::repeat_with(move || self.draw(&mut rng)))
    }
}

/// Identifies the support of the distribution
pub trait Support<X> {
    /// Returns `true` if `x` is in the support of the distribution
    fn supports(&self, x: &X) -> bool;
}

/// A distribution over a countable set
pub trait DiscreteDistr<X>: HasDensity<X> + Support<X> {
    /// Probability mass function (PMF) at `x`
    ///
    /// # Panics
    ///
    /// Never. Values outside the support have mass zero.
    fn pmf(&self, x: &X) -> f64 {
        self.ln_pmf(x).exp()
    }

    /// Natural logarithm of the PMF at `x`. Values outside the support give
    /// negative infinity.
    fn ln_pmf(&self, x: &X) -> f64 {
        if self.supports(x) {
            self.ln_f(x)
        } else {
            f64::NEG_INFINITY
        }
    }
}

pub trait Mean<M> {
    /// The closed-form mean, if defined
    fn mean(&self) -> Option<M>;
}

pub trait Variance<V> {
    /// The closed-form variance, if defined
    fn variance(&self) -> Option<V>;
}
