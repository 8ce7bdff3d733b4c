//! Safe Rust API over the process-wide registry.
//!
//! Every function here is what the matching `mx_*` export does once its
//! pointers have been checked. The registry lock is held only to look up or
//! store entries; copying and multiplying happen after it is released.

use std::sync::Arc;

use densemx_blas::{dgemm, Layout};
use densemx_core::{DenseMatrix, MatrixError, Result, Shape};
use tracing::{debug, trace, warn};

use crate::registry::{self, MatrixHandle};

fn lookup(handle: MatrixHandle) -> Result<Arc<DenseMatrix>> {
    trace!(%handle, "lookup");
    registry::global().lock().get(handle)
}

/// Copy `data` into a new engine-owned `rows x cols` matrix.
///
/// The caller keeps ownership of `data`; later changes to it do not affect
/// the stored matrix.
pub fn create(rows: usize, cols: usize, data: &[f64]) -> Result<MatrixHandle> {
    let matrix = DenseMatrix::from_slice(rows, cols, data)?;
    let handle = registry::global().lock().insert(matrix)?;
    debug!(%handle, rows, cols, "matrix created");
    Ok(handle)
}

/// Release `handle`. The null handle is a no-op.
///
/// A handle that was already destroyed is reported as stale and nothing is
/// freed twice.
pub fn destroy(handle: MatrixHandle) -> Result<()> {
    if handle.is_null() {
        return Ok(());
    }
    let removed = registry::global().lock().remove(handle);
    match removed {
        Ok(matrix) => {
            // freed here, outside the lock
            drop(matrix);
            debug!(%handle, "matrix destroyed");
            Ok(())
        }
        Err(err) => {
            warn!(%handle, %err, "destroy of an unknown handle ignored");
            Err(err)
        }
    }
}

/// Multiply two matrices into a new handle.
///
/// Nothing is registered unless the whole product succeeds.
pub fn multiply(a: MatrixHandle, b: MatrixHandle) -> Result<MatrixHandle> {
    let (lhs, rhs) = {
        let reg = registry::global().lock();
        (reg.get(a)?, reg.get(b)?)
    };
    let shape = lhs.shape().product(rhs.shape())?;
    let (m, k, n) = (lhs.rows(), lhs.cols(), rhs.cols());

    let mut out = DenseMatrix::zeros(shape)?;
    trace!(m, k, n, "multiply");
    dgemm(
        Layout::RowMajor,
        m,
        n,
        k,
        1.0,
        lhs.as_slice(),
        k,
        rhs.as_slice(),
        n,
        0.0,
        out.as_mut_slice(),
        n,
    );

    let handle = registry::global().lock().insert(out)?;
    debug!(%a, %b, %handle, "product {}", shape);
    Ok(handle)
}

pub fn shape(handle: MatrixHandle) -> Result<Shape> {
    lookup(handle).map(|m| m.shape())
}

#[inline]
pub fn rows(handle: MatrixHandle) -> Result<usize> {
    shape(handle).map(|s| s.rows)
}

#[inline]
pub fn cols(handle: MatrixHandle) -> Result<usize> {
    shape(handle).map(|s| s.cols)
}

/// Copy the contents of `handle` into the front of `out`.
///
/// `out` must hold at least `rows * cols` elements; anything after that is
/// left untouched.
pub fn copy_out(handle: MatrixHandle, out: &mut [f64]) -> Result<()> {
    lookup(handle)?.copy_into(out)
}

/// Number of handles currently owned by callers.
pub fn live_handles() -> usize {
    registry::global().lock().live()
}

/// Convert a caught panic payload into an engine error.
pub(crate) fn panic_error(payload: &(dyn std::any::Any + Send)) -> MatrixError {
    let msg = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".to_string());
    MatrixError::Internal(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use densemx_core::ErrorCode;

    #[test]
    fn create_and_read_back() {
        let h = create(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(shape(h).unwrap(), Shape::new(2, 3));
        assert_eq!(rows(h).unwrap(), 2);
        assert_eq!(cols(h).unwrap(), 3);
        let mut out = [0.0; 6];
        copy_out(h, &mut out).unwrap();
        assert_eq!(out, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        destroy(h).unwrap();
    }

    #[test]
    fn caller_buffer_is_copied() {
        let mut data = vec![1.0, 2.0, 3.0, 4.0];
        let h = create(2, 2, &data).unwrap();
        data[0] = 100.0;
        let mut out = [0.0; 4];
        copy_out(h, &mut out).unwrap();
        assert_eq!(out[0], 1.0);
        destroy(h).unwrap();
    }

    #[test]
    fn multiply_2x3_by_3x2() {
        let a = create(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = create(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0]).unwrap();
        let c = multiply(a, b).unwrap();
        assert_eq!(shape(c).unwrap(), Shape::new(2, 2));
        let mut out = [0.0; 4];
        copy_out(c, &mut out).unwrap();
        assert_eq!(out, [58.0, 64.0, 139.0, 154.0]);
        for h in [a, b, c] {
            destroy(h).unwrap();
        }
    }

    #[test]
    fn multiply_rejects_mismatched_shapes() {
        let a = create(2, 3, &[0.0; 6]).unwrap();
        let b = create(2, 3, &[0.0; 6]).unwrap();
        let err = multiply(a, b).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Shape);
        destroy(a).unwrap();
        destroy(b).unwrap();
    }

    #[test]
    fn self_multiply_is_allowed() {
        let a = create(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let c = multiply(a, a).unwrap();
        let mut out = [0.0; 4];
        copy_out(c, &mut out).unwrap();
        assert_eq!(out, [7.0, 10.0, 15.0, 22.0]);
        destroy(a).unwrap();
        destroy(c).unwrap();
    }

    #[test]
    fn destroyed_handle_is_stale_everywhere() {
        let a = create(1, 1, &[1.0]).unwrap();
        destroy(a).unwrap();
        assert_eq!(shape(a).unwrap_err().code(), ErrorCode::State);
        assert_eq!(copy_out(a, &mut [0.0]).unwrap_err().code(), ErrorCode::State);
        assert_eq!(multiply(a, a).unwrap_err().code(), ErrorCode::State);
        assert_eq!(destroy(a).unwrap_err().code(), ErrorCode::State);
    }

    #[test]
    fn null_handle() {
        assert!(destroy(MatrixHandle::NULL).is_ok());
        assert_eq!(shape(MatrixHandle::NULL).unwrap_err().code(), ErrorCode::Null);
        assert_eq!(
            multiply(MatrixHandle::NULL, MatrixHandle::NULL).unwrap_err().code(),
            ErrorCode::Null
        );
    }

    #[test]
    fn copy_out_needs_capacity() {
        let h = create(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut small = [0.0; 3];
        assert_eq!(copy_out(h, &mut small).unwrap_err().code(), ErrorCode::Shape);
        let mut large = [-1.0; 6];
        copy_out(h, &mut large).unwrap();
        assert_eq!(large, [1.0, 2.0, 3.0, 4.0, -1.0, -1.0]);
        destroy(h).unwrap();
    }

    #[test]
    fn panic_payloads_become_internal_errors() {
        let err = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_error(&*err), MatrixError::Internal("boom".into()));
        let err = std::panic::catch_unwind(|| panic!("{}", 42)).unwrap_err();
        assert_eq!(panic_error(&*err), MatrixError::Internal("42".into()));
    }
}
