//! # densemx-harness
//!
//! Correctness and performance helpers that sit outside the engine: the
//! naive reference multiply every engine result is checked against, seeded
//! input generation and the comparison helpers the tests and benchmarks
//! share. Nothing here calls the engine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed used by the oracle tests and benchmarks.
pub const DEFAULT_SEED: u64 = 1_234_567;

/// Per-element tolerance for engine vs. oracle comparisons.
pub const TOLERANCE: f64 = 1e-7;

/// Naive triple loop, square `n x n`, row-major.
///
/// Textbook i-j-p order with a scalar accumulator; shares no code with the
/// engine kernel.
pub fn reference_multiply(a: &[f64], b: &[f64], n: usize) -> Vec<f64> {
    assert_eq!(a.len(), n * n, "lhs is not {n}x{n}");
    assert_eq!(b.len(), n * n, "rhs is not {n}x{n}");
    let mut c = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            let mut sum = 0.0;
            for p in 0..n {
                sum += a[i * n + p] * b[p * n + j];
            }
            c[i * n + j] = sum;
        }
    }
    c
}

/// `n x n` row-major matrix with entries uniform in `[-1, 1)`.
pub fn random_matrix(n: usize, rng: &mut StdRng) -> Vec<f64> {
    (0..n * n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

/// `(a, b)` operand pair drawn from a fresh [`StdRng`] seeded with `seed`.
pub fn random_pair(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = random_matrix(n, &mut rng);
    let b = random_matrix(n, &mut rng);
    (a, b)
}

/// Sum of the first 10 elements (fewer if the buffer is shorter).
pub fn checksum10(buf: &[f64]) -> f64 {
    buf.iter().take(10).sum()
}

/// Largest absolute element-wise difference.
///
/// # Panics
/// If the lengths differ.
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "length mismatch");
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Same length and every element within `eps`.
pub fn approx_equal(a: &[f64], b: &[f64], eps: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= eps)
}
