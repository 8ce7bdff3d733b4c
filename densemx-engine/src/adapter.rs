//! Binding-side ownership of one engine handle.
//!
//! [`OwnedHandle`] is the piece both language adapters wrap. It goes through
//! the C ABI exactly like a foreign caller would, and it is the only place
//! that implements the adapter contract:
//!
//! - inputs are validated before the boundary is crossed;
//! - caller buffers are lent for a single call and never kept;
//! - a local released flag is checked first, so use after release fails
//!   here instead of reaching the engine;
//! - release is idempotent and also runs on drop;
//! - engine codes become [`BindingError`]s carrying the engine's message.

use std::ffi::CStr;
use std::os::raw::c_int;

use densemx_core::binding::{self, BindingError, BindingResult};
use densemx_core::{ErrorCode, ErrorKind, Shape};

use crate::c_api;
use crate::registry::MatrixHandle;

/// Turn an engine status into a binding result.
fn check(code: c_int) -> BindingResult<()> {
    let code = ErrorCode::from_raw(code);
    if code.is_ok() {
        return Ok(());
    }
    // SAFETY: mx_strerror always returns a static NUL-terminated string.
    let message = unsafe { CStr::from_ptr(c_api::mx_strerror(code.as_raw())) };
    Err(BindingError::from_code(code, message.to_string_lossy()))
}

/// A live engine handle plus its cached shape.
#[derive(Debug)]
pub struct OwnedHandle {
    raw: MatrixHandle,
    shape: Shape,
    released: bool,
}

impl OwnedHandle {
    /// Validate `data` and hand a copy of it to the engine.
    pub fn create(rows: usize, cols: usize, data: &[f64]) -> BindingResult<Self> {
        binding::validate_input(rows, cols, data.len())?;
        let mut raw = MatrixHandle::NULL;
        // SAFETY: `data` is a live slice for the whole call and `raw` is a
        // local the engine writes to.
        check(unsafe { c_api::mx_create(rows, cols, data.as_ptr(), data.len(), &mut raw) })?;
        Ok(Self {
            raw,
            shape: Shape::new(rows, cols),
            released: false,
        })
    }

    /// Take ownership of a handle the engine has just returned.
    ///
    /// The shape is read from the engine. On failure nothing is owned.
    pub fn from_raw(raw: MatrixHandle) -> BindingResult<Self> {
        let (mut rows, mut cols) = (0, 0);
        // SAFETY: both outputs are locals.
        check(unsafe { c_api::mx_shape(raw, &mut rows, &mut cols) })?;
        Ok(Self {
            raw,
            shape: Shape::new(rows, cols),
            released: false,
        })
    }

    #[inline]
    fn ensure_live(&self) -> BindingResult<()> {
        if self.released {
            Err(BindingError::released())
        } else {
            Ok(())
        }
    }

    /// The engine token. Fails once released.
    pub fn raw(&self) -> BindingResult<MatrixHandle> {
        self.ensure_live()?;
        Ok(self.raw)
    }

    /// Dimensions are fixed at creation and stay readable after release.
    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Fresh row-major copy of the contents.
    pub fn to_vec(&self) -> BindingResult<Vec<f64>> {
        self.ensure_live()?;
        let len = self.shape.rows * self.shape.cols;
        let mut out = Vec::new();
        out.try_reserve_exact(len).map_err(|_| {
            BindingError::new(
                ErrorKind::ResourceExhausted,
                format!("failed to allocate {len} elements"),
            )
        })?;
        out.resize(len, 0.0);
        // SAFETY: `out` holds `len` initialised elements for the whole call.
        check(unsafe { c_api::mx_copy_out(self.raw, out.as_mut_ptr(), out.len()) })?;
        Ok(out)
    }

    /// `self * other` as a new owned handle.
    pub fn multiply(&self, other: &OwnedHandle) -> BindingResult<OwnedHandle> {
        self.ensure_live()?;
        other.ensure_live()?;
        binding::check_product(self.shape, other.shape)?;

        let mut raw = MatrixHandle::NULL;
        // SAFETY: `raw` is a local the engine writes to.
        check(unsafe { c_api::mx_multiply(self.raw, other.raw, &mut raw) })?;
        Self::from_raw(raw).map_err(|err| {
            c_api::mx_destroy(raw);
            err
        })
    }

    /// Give the handle back to the engine. Later calls do nothing.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        c_api::mx_destroy(self.raw);
        self.raw = MatrixHandle::NULL;
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_validates_before_the_engine() {
        let err = OwnedHandle::create(0, 2, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = OwnedHandle::create(2, 2, &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.message(), "data length mismatch: 3 != 4");
    }

    #[test]
    fn released_handle_fails_locally() {
        let mut h = OwnedHandle::create(1, 2, &[1.0, 2.0]).unwrap();
        let other = OwnedHandle::create(2, 1, &[3.0, 4.0]).unwrap();
        h.release();
        assert!(h.is_released());
        assert_eq!(h.to_vec().unwrap_err(), BindingError::released());
        assert_eq!(h.multiply(&other).unwrap_err(), BindingError::released());
        assert_eq!(other.multiply(&h).unwrap_err(), BindingError::released());
        assert_eq!(h.raw().unwrap_err(), BindingError::released());
        // idempotent
        h.release();
        assert_eq!(h.shape(), Shape::new(1, 2));
    }

    #[test]
    fn multiply_wraps_the_result_handle() {
        let a = OwnedHandle::create(1, 2, &[1.0, 2.0]).unwrap();
        let b = OwnedHandle::create(2, 1, &[3.0, 4.0]).unwrap();
        let c = a.multiply(&b).unwrap();
        assert_eq!(c.shape(), Shape::new(1, 1));
        assert_eq!(c.to_vec().unwrap(), vec![11.0]);
    }

    #[test]
    fn shape_mismatch_message() {
        let a = OwnedHandle::create(2, 3, &[0.0; 6]).unwrap();
        let err = a.multiply(&a).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.message(), "shape mismatch: 2x3 * 2x3");
    }

    #[test]
    fn engine_codes_carry_engine_text() {
        let err = check(c_api::MX_ERR_STATE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(err.message(), "invalid matrix handle");
        let err = check(c_api::MX_ERR_ALLOC).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
        assert_eq!(err.message(), "allocation failure");
        let err = check(99).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Runtime);
        assert_eq!(err.message(), "unknown error");
        assert!(check(c_api::MX_OK).is_ok());
    }

    #[test]
    fn from_raw_rejects_stale_tokens() {
        let mut a = OwnedHandle::create(1, 1, &[1.0]).unwrap();
        let raw = a.raw().unwrap();
        a.release();
        let err = OwnedHandle::from_raw(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }
}
