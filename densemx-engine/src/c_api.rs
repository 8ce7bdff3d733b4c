//! C ABI.
//!
//! Status codes and their message text come from [`ErrorCode`]; see
//! `include/densemx.h` for the C declarations. No panic unwinds across this
//! boundary: each export runs under `catch_unwind` and a caught panic is
//! reported as `MX_ERR_UNKNOWN`, or as `0` / a no-op where the function has
//! no status channel.

use std::ffi::{c_char, c_int};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::slice;

use densemx_core::{matrix, ErrorCode, MatrixError, Result};

use crate::engine;
use crate::registry::MatrixHandle;

/// ABI version for compatibility checking.
pub const MX_ABI_VERSION: u32 = 1;

pub const MX_OK: c_int = ErrorCode::Ok.as_raw();
pub const MX_ERR_NULL: c_int = ErrorCode::Null.as_raw();
pub const MX_ERR_SHAPE: c_int = ErrorCode::Shape.as_raw();
pub const MX_ERR_ALLOC: c_int = ErrorCode::Alloc.as_raw();
pub const MX_ERR_STATE: c_int = ErrorCode::State.as_raw();
pub const MX_ERR_UNKNOWN: c_int = ErrorCode::Unknown.as_raw();

/// Run `f` and turn its outcome into a status code.
fn guarded(op: &'static str, f: impl FnOnce() -> Result<()>) -> c_int {
    let err = match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => return MX_OK,
        Ok(Err(err)) => err,
        Err(payload) => {
            let err = engine::panic_error(&*payload);
            tracing::error!(op, %err, "panic caught at the C boundary");
            err
        }
    };
    tracing::debug!(op, %err, "call failed");
    err.code().as_raw()
}

/// Like [`guarded`] for exports without a status channel.
fn guarded_or<T>(fallback: T, f: impl FnOnce() -> T) -> T {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or(fallback)
}

/// Create a `rows x cols` matrix from a row-major buffer.
///
/// `*out` is set to the new handle on success and to the null handle on any
/// failure.
///
/// # Safety
/// `data` must point to `data_len` readable `f64`s for the duration of the
/// call. `out` must be null or valid for a write.
#[no_mangle]
pub unsafe extern "C" fn mx_create(
    rows: usize,
    cols: usize,
    data: *const f64,
    data_len: usize,
    out: *mut MatrixHandle,
) -> c_int {
    guarded("mx_create", || {
        let out = out.as_mut().ok_or(MatrixError::Null("output handle"))?;
        *out = MatrixHandle::NULL;
        if data.is_null() {
            return Err(MatrixError::Null("data"));
        }
        matrix::validate(rows, cols, data_len)?;
        let data = slice::from_raw_parts(data, data_len);
        *out = engine::create(rows, cols, data)?;
        Ok(())
    })
}

/// Release a handle. Null is a no-op; an already destroyed handle is
/// logged and ignored.
#[no_mangle]
pub extern "C" fn mx_destroy(handle: MatrixHandle) {
    guarded_or((), || {
        let _ = engine::destroy(handle);
    })
}

/// `*out = a * b` as a new handle.
///
/// # Safety
/// `out` must be null or valid for a write.
#[no_mangle]
pub unsafe extern "C" fn mx_multiply(
    a: MatrixHandle,
    b: MatrixHandle,
    out: *mut MatrixHandle,
) -> c_int {
    guarded("mx_multiply", || {
        let out = out.as_mut().ok_or(MatrixError::Null("output handle"))?;
        *out = MatrixHandle::NULL;
        *out = engine::multiply(a, b)?;
        Ok(())
    })
}

/// Row count, or 0 for an invalid handle.
#[no_mangle]
pub extern "C" fn mx_rows(handle: MatrixHandle) -> usize {
    guarded_or(0, || engine::rows(handle).unwrap_or(0))
}

/// Column count, or 0 for an invalid handle.
#[no_mangle]
pub extern "C" fn mx_cols(handle: MatrixHandle) -> usize {
    guarded_or(0, || engine::cols(handle).unwrap_or(0))
}

/// Both dimensions with a status code.
///
/// # Safety
/// `rows_out` and `cols_out` must each be null or valid for a write.
#[no_mangle]
pub unsafe extern "C" fn mx_shape(
    handle: MatrixHandle,
    rows_out: *mut usize,
    cols_out: *mut usize,
) -> c_int {
    guarded("mx_shape", || {
        let rows_out = rows_out.as_mut().ok_or(MatrixError::Null("rows output"))?;
        let cols_out = cols_out.as_mut().ok_or(MatrixError::Null("cols output"))?;
        let shape = engine::shape(handle)?;
        *rows_out = shape.rows;
        *cols_out = shape.cols;
        Ok(())
    })
}

/// Copy the matrix into `out`, row-major.
///
/// Fails with `MX_ERR_SHAPE` if `capacity < rows * cols`. Elements past
/// `rows * cols` are not written.
///
/// # Safety
/// `out` must be null or point to `capacity` writable `f64`s for the
/// duration of the call.
#[no_mangle]
pub unsafe extern "C" fn mx_copy_out(
    handle: MatrixHandle,
    out: *mut f64,
    capacity: usize,
) -> c_int {
    guarded("mx_copy_out", || {
        // an invalid handle wins over a null buffer
        engine::shape(handle)?;
        if out.is_null() {
            return Err(MatrixError::Null("output buffer"));
        }
        let out = slice::from_raw_parts_mut(out, capacity);
        engine::copy_out(handle, out)
    })
}

/// Static, NUL-terminated text for `code`. Never free it.
///
/// Unrecognised codes get the `MX_ERR_UNKNOWN` text.
#[no_mangle]
pub extern "C" fn mx_strerror(code: c_int) -> *const c_char {
    ErrorCode::from_raw(code).message_cstr().as_ptr()
}

/// Number of handles currently owned by callers.
#[no_mangle]
pub extern "C" fn mx_live_handles() -> usize {
    guarded_or(0, engine::live_handles)
}

#[no_mangle]
pub extern "C" fn mx_abi_version() -> u32 {
    MX_ABI_VERSION
}

/// Library version, NUL-terminated and valid for the life of the program.
#[no_mangle]
pub extern "C" fn mx_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}
