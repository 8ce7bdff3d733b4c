//! BLAS Level 3: double-precision matrix-matrix multiply.
//!
//! `C := alpha * A * B + beta * C`, CBLAS argument order, no transposes.
//!
//! The row-major kernel runs in i-k-j order: for each row of A it streams
//! whole rows of B into the matching row of C, so the innermost loop always
//! walks contiguous memory in both B and C. Large products are blocked:
//!
//! - Outer loop over N (panels of `block_n` columns of B and C)
//! - Middle loop over K (`block_k` rows of B, kept hot in L2)
//! - Inner loop over the rows of C (split across scoped threads when the
//!   output is big enough; each thread owns a disjoint block of rows)
//!
//! Every element of C is accumulated over `p = 0..k` in the same order on
//! all paths, so blocking and threading do not change the result.
//!
//! Column-major operands are handled by computing the row-major product of
//! the transposes: `C^T = B^T * A^T`.

use densemx_core::config::KernelConfig;
use densemx_core::layout::Layout;
use densemx_core::parallel::for_each_row_block;

/// Double-precision GEMM with the process-wide [`KernelConfig`].
pub fn dgemm(
    layout: Layout,
    m: usize,
    n: usize,
    k: usize,
    alpha: f64,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    beta: f64,
    c: &mut [f64],
    ldc: usize,
) {
    dgemm_with(
        KernelConfig::global(),
        layout,
        m,
        n,
        k,
        alpha,
        a,
        lda,
        b,
        ldb,
        beta,
        c,
        ldc,
    );
}

/// Double-precision GEMM with an explicit configuration.
pub fn dgemm_with(
    config: &KernelConfig,
    layout: Layout,
    m: usize,
    n: usize,
    k: usize,
    alpha: f64,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    beta: f64,
    c: &mut [f64],
    ldc: usize,
) {
    match layout {
        Layout::RowMajor => gemm_row_major(config, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc),
        Layout::ColMajor => gemm_row_major(config, n, m, k, alpha, b, ldb, a, lda, beta, c, ldc),
    }
}

/// Row-major `C[m x n] := alpha * A[m x k] * B[k x n] + beta * C`.
fn gemm_row_major(
    config: &KernelConfig,
    m: usize,
    n: usize,
    k: usize,
    alpha: f64,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    beta: f64,
    c: &mut [f64],
    ldc: usize,
) {
    if m == 0 || n == 0 {
        return;
    }
    debug_assert!(c.len() >= (m - 1) * ldc + n, "C too short");
    debug_assert!(k == 0 || a.len() >= (m - 1) * lda + k, "A too short");
    debug_assert!(k == 0 || b.len() >= (k - 1) * ldb + n, "B too short");

    // Scale C by beta
    if beta != 1.0 {
        for i in 0..m {
            let row = &mut c[i * ldc..i * ldc + n];
            if beta == 0.0 {
                row.fill(0.0);
            } else {
                row.iter_mut().for_each(|x| *x *= beta);
            }
        }
    }

    if alpha == 0.0 || k == 0 {
        return;
    }

    let blocked = m.saturating_mul(n).saturating_mul(k) >= config.small_threshold;
    let threads = if cfg!(feature = "parallel") {
        config.threads_for(m, n)
    } else {
        1
    };
    if threads > 1 {
        tracing::trace!(m, n, k, threads, "dgemm: threaded path");
    }

    let c_len = ((m - 1) * ldc + n).min(c.len());
    for_each_row_block(&mut c[..c_len], m, ldc, threads, |first_row, c_block| {
        let rows = if c_block.len() >= ldc {
            (c_block.len() - n) / ldc + 1
        } else {
            1
        };
        let a_block = &a[first_row * lda..];
        if blocked {
            rows_blocked(config, rows, n, k, alpha, a_block, lda, b, ldb, c_block, ldc);
        } else {
            rows_simple(rows, n, k, alpha, a_block, lda, b, ldb, c_block, ldc);
        }
    });
}

/// `c_row += alpha_a * b_row`, the contiguous inner loop.
#[inline(always)]
fn axpy_row(c_row: &mut [f64], alpha_a: f64, b_row: &[f64]) {
    for (cj, &bj) in c_row.iter_mut().zip(b_row) {
        *cj += alpha_a * bj;
    }
}

/// Plain i-k-j loop for small products.
fn rows_simple(
    rows: usize,
    n: usize,
    k: usize,
    alpha: f64,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    c: &mut [f64],
    ldc: usize,
) {
    for i in 0..rows {
        let c_row = &mut c[i * ldc..i * ldc + n];
        let a_row = &a[i * lda..i * lda + k];
        for (p, &aip) in a_row.iter().enumerate() {
            axpy_row(c_row, alpha * aip, &b[p * ldb..p * ldb + n]);
        }
    }
}

/// i-k-j loop tiled over K and N panels.
fn rows_blocked(
    config: &KernelConfig,
    rows: usize,
    n: usize,
    k: usize,
    alpha: f64,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    c: &mut [f64],
    ldc: usize,
) {
    let nc = config.block_n.max(1).min(n);
    let kc = config.block_k.max(1).min(k);

    for jc in (0..n).step_by(nc) {
        let jb = nc.min(n - jc);
        for pc in (0..k).step_by(kc) {
            let pb = kc.min(k - pc);
            for i in 0..rows {
                let c_row = &mut c[i * ldc + jc..i * ldc + jc + jb];
                let a_panel = &a[i * lda + pc..i * lda + pc + pb];
                for (p, &aip) in a_panel.iter().enumerate() {
                    let b_start = (pc + p) * ldb + jc;
                    axpy_row(c_row, alpha * aip, &b[b_start..b_start + jb]);
                }
            }
        }
    }
}
