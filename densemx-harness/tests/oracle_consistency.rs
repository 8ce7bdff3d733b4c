//! Engine results against the naive oracle.

use approx::assert_abs_diff_eq;
use densemx::Matrix;
use densemx_harness::{
    checksum10, max_abs_diff, random_pair, reference_multiply, DEFAULT_SEED, TOLERANCE,
};

fn engine_product(n: usize, a: &[f64], b: &[f64]) -> Vec<f64> {
    let a = Matrix::new(n, n, a).unwrap();
    let b = Matrix::new(n, n, b).unwrap();
    a.multiply(&b).unwrap().to_vec().unwrap()
}

#[test]
fn random_64x64_matches_oracle() {
    let n = 64;
    let (a, b) = random_pair(n, DEFAULT_SEED);
    let expected = reference_multiply(&a, &b, n);
    let actual = engine_product(n, &a, &b);

    assert!(
        max_abs_diff(&actual, &expected) <= TOLERANCE,
        "max diff {}",
        max_abs_diff(&actual, &expected)
    );
    assert_abs_diff_eq!(checksum10(&actual), checksum10(&expected), epsilon = TOLERANCE);
}

#[test]
fn sizes_around_kernel_thresholds() {
    // small path, blocked path, and sizes that are not block multiples
    for (i, n) in [1usize, 7, 33, 48, 65, 130].into_iter().enumerate() {
        let (a, b) = random_pair(n, DEFAULT_SEED + i as u64);
        let expected = reference_multiply(&a, &b, n);
        let actual = engine_product(n, &a, &b);
        assert!(max_abs_diff(&actual, &expected) <= TOLERANCE, "n = {n}");
    }
}

#[test]
fn leading_block_sanity_on_larger_input() {
    // The top-left 64x64 block of A*B only depends on the first 64 rows of
    // A and the first 64 columns of B, so it can be checked against the
    // oracle without an O(n^3) reference on the whole product.
    let n = 200;
    let (a, b) = random_pair(n, DEFAULT_SEED);
    let c = engine_product(n, &a, &b);

    let t = n.min(64);
    let mut expected = vec![0.0; t * t];
    for i in 0..t {
        for j in 0..t {
            expected[i * t + j] = (0..n).map(|p| a[i * n + p] * b[p * n + j]).sum();
        }
    }
    let block: Vec<f64> = (0..t).flat_map(|i| c[i * n..i * n + t].iter().copied()).collect();
    assert!(max_abs_diff(&block, &expected) <= TOLERANCE);
}
