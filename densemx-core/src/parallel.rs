//! Scoped-thread helpers for splitting an output matrix by rows.
//!
//! Uses `std::thread::scope`: no pool, no runtime, and every thread has
//! joined before the call returns, so callers stay synchronous.

/// Run `f(first_row, block)` over disjoint row blocks of `out`.
///
/// `out` holds `rows` rows laid out `row_stride` elements apart (the last
/// row may be shorter than the stride). It is cut into at most
/// `num_threads` blocks of whole rows; each block goes to exactly one
/// invocation of `f`. With one thread (or one row) `f` runs inline on the
/// caller's thread.
pub fn for_each_row_block<F>(
    out: &mut [f64],
    rows: usize,
    row_stride: usize,
    num_threads: usize,
    f: F,
) where
    F: Fn(usize, &mut [f64]) + Sync,
{
    if rows == 0 || out.is_empty() {
        return;
    }
    let num_threads = num_threads.clamp(1, rows);
    if num_threads == 1 {
        f(0, out);
        return;
    }

    let rows_per_block = rows.div_ceil(num_threads);
    let f = &f;
    std::thread::scope(|s| {
        let mut rest = out;
        let mut first_row = 0;
        while first_row < rows && !rest.is_empty() {
            let take = (rows_per_block * row_stride).min(rest.len());
            let (block, tail) = std::mem::take(&mut rest).split_at_mut(take);
            let start = first_row;
            s.spawn(move || f(start, block));
            rest = tail;
            first_row += rows_per_block;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn covers_every_row_once() {
        let mut out = vec![0.0; 7 * 3];
        for_each_row_block(&mut out, 7, 3, 4, |first_row, block| {
            for (r, row) in block.chunks_mut(3).enumerate() {
                row.fill((first_row + r) as f64);
            }
        });
        for (r, row) in out.chunks(3).enumerate() {
            assert!(row.iter().all(|&v| v == r as f64), "row {r}: {row:?}");
        }
    }

    #[test]
    fn short_last_row_is_kept() {
        // 3 rows, stride 4, only 2 live columns in the final row
        let mut out = vec![0.0; 2 * 4 + 2];
        let seen = AtomicUsize::new(0);
        for_each_row_block(&mut out, 3, 4, 3, |_, block| {
            seen.fetch_add(block.len(), Ordering::Relaxed);
        });
        assert_eq!(seen.load(Ordering::Relaxed), 10);
    }

    #[test]
    fn single_thread_runs_inline() {
        let calls = AtomicUsize::new(0);
        let mut out = vec![0.0; 12];
        for_each_row_block(&mut out, 3, 4, 1, |first_row, block| {
            assert_eq!(first_row, 0);
            assert_eq!(block.len(), 12);
            calls.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn empty_output_is_a_no_op() {
        let calls = AtomicUsize::new(0);
        for_each_row_block(&mut [], 0, 4, 8, |_, _| {
            calls.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }
}
