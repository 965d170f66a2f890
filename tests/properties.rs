use ellipstat::dist::multinomial::ln_pmf;
use ellipstat::prelude::*;
use nalgebra::{DMatrix, DVector};
use proptest::collection::vec;
use proptest::prelude::*;

fn fact(n: u64) -> u128 {
    (1..=u128::from(n)).product()
}

/// ln(n! / ∏k! · ∏p^k) with exact integer factorials and `powi`
fn direct_ln_pmf(ps: &[f64], ks: &[u64]) -> f64 {
    let n: u64 = ks.iter().sum();
    let coef = ks.iter().fold(fact(n), |acc, &k| acc / fact(k)) as f64;
    let prod = ps
        .iter()
        .zip(ks.iter())
        .fold(1.0, |acc, (&p, &k)| acc * p.powi(k as i32));
    (coef * prod).ln()
}

/// ln k! as a plain sum of logs
fn ln_fact_sum(k: u64) -> f64 {
    (2..=k).map(|i| (i as f64).ln()).sum()
}

/// ln n! - Σ ln k! + Σ k ln p, every factorial summed term by term
fn log_sum_ln_pmf(ps: &[f64], ks: &[u64]) -> f64 {
    let n: u64 = ks.iter().sum();
    ks.iter()
        .zip(ps.iter())
        .fold(ln_fact_sum(n), |acc, (&k, &p)| {
            acc - ln_fact_sum(k) + k as f64 * p.ln()
        })
}

fn normalize(ws: &[f64]) -> Vec<f64> {
    let z: f64 = ws.iter().sum();
    ws.iter().map(|w| w / z).collect()
}

fn histogram(assignments: &[usize], k: usize) -> Vec<u64> {
    let mut counts = vec![0_u64; k];
    assignments.iter().for_each(|&ix| counts[ix] += 1);
    counts
}

fn symmetric(d: usize, xs: &[f64]) -> DMatrix<f64> {
    let b = DMatrix::from_row_slice(d, d, xs);
    (&b + b.transpose()) * 0.5
}

prop_compose! {
    fn categorical_experiment()
        (k in 2_usize..6)
        (ws in vec(0.05_f64..1.0, k), assignments in vec(0..k, 0..=30), k in Just(k))
        -> (Vec<f64>, Vec<u64>)
    {
        (normalize(&ws), histogram(&assignments, k))
    }
}

prop_compose! {
    fn larger_categorical_experiment()
        (k in 2_usize..6)
        (ws in vec(0.05_f64..1.0, k), assignments in vec(0..k, 31..=50), k in Just(k))
        -> (Vec<f64>, Vec<u64>)
    {
        (normalize(&ws), histogram(&assignments, k))
    }
}

prop_compose! {
    fn symmetric_matrix()
        (d in 2_usize..6)
        (xs in vec(-10.0_f64..10.0, d * d), d in Just(d))
        -> DMatrix<f64>
    {
        symmetric(d, &xs)
    }
}

proptest! {
    #[test]
    fn ln_pmf_matches_direct_computation((ps, ks) in categorical_experiment()) {
        let n: u64 = ks.iter().sum();
        let ln_p = ln_pmf(n, &ps, &ks).unwrap();
        let direct = direct_ln_pmf(&ps, &ks);
        prop_assert!((ln_p - direct).abs() < 1E-4, "{} != {}", ln_p, direct);
    }

    #[test]
    fn ln_pmf_matches_log_factorial_sum((ps, ks) in larger_categorical_experiment()) {
        let n: u64 = ks.iter().sum();
        prop_assert!((31..=50).contains(&n));
        let ln_p = ln_pmf(n, &ps, &ks).unwrap();
        let direct = log_sum_ln_pmf(&ps, &ks);
        prop_assert!((ln_p - direct).abs() < 1E-8, "{} != {}", ln_p, direct);
    }

    #[test]
    fn two_category_ln_pmf_is_binomial(
        (n, p, k) in (0_u64..50).prop_flat_map(|n| (Just(n), 0.01_f64..0.99, 0..=n))
    ) {
        let ln_p = ln_pmf(n, &[p, 1.0 - p], &[k, n - k]).unwrap();
        let binom = Binomial::new(n, p).unwrap();
        prop_assert!((ln_p - binom.ln_pmf(&k)).abs() < 1E-9);
    }

    #[test]
    fn draws_are_valid_observations(
        (ps, ks) in categorical_experiment(),
        seed in any::<u64>(),
    ) {
        use rand::SeedableRng;
        let n: u64 = ks.iter().sum();
        let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(seed);
        let mn = Multinomial::new(n, ps).unwrap();
        let xs: Vec<Vec<u64>> = mn.sample(20, &mut rng);
        for x in xs.iter() {
            prop_assert!(mn.supports(x));
            prop_assert!(mn.ln_pmf(x).is_finite());
        }
    }

    #[test]
    fn symmetric_eigenvectors_are_orthogonal(a in symmetric_matrix()) {
        let eig = eigen_decompose(&a).unwrap();
        prop_assert!(verify_orthogonality(&eig));
        for (_, v) in eig.eigenpairs() {
            prop_assert!((v.norm() - 1.0).abs() < 1E-9);
        }
        let diff = (eig.reconstruct() - &a).amax();
        prop_assert!(diff < 1E-8);
    }

    #[test]
    fn eigenvalues_are_sorted_descending(a in symmetric_matrix()) {
        let eig = eigen_decompose(&a).unwrap();
        let vals = eig.eigenvalues();
        for ix in 1..vals.len() {
            prop_assert!(vals[ix - 1] >= vals[ix]);
        }
    }

    #[test]
    fn sign_flip_reflects_axis_angle(
        v in vec(-10.0_f64..10.0, 3),
        r in vec(-10.0_f64..10.0, 3),
    ) {
        let v = DVector::from_vec(v);
        let r = DVector::from_vec(r);
        prop_assume!(v.norm() > 1E-3 && r.norm() > 1E-3);

        let theta = principal_axis_angle(&v, &r).unwrap();
        let flipped = principal_axis_angle(&(-&v), &r).unwrap();

        prop_assert!((0.0..=180.0).contains(&theta));
        prop_assert!((theta + flipped - 180.0).abs() < 1E-9);
    }
}
