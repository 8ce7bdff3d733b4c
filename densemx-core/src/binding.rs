//! Validation and error translation shared by every binding adapter.
//!
//! Both adapters check their inputs here before crossing the boundary and
//! raise [`BindingError`], converting it to the runtime idiom (a Rust
//! `Result`, a Python exception) only at their own surface.

use crate::error::{ErrorCode, ErrorKind, MatrixError};
use crate::matrix::{self, Shape};

/// Message raised when a released binding object is used.
pub const RELEASED: &str = "matrix is released";

/// The single error type adapters produce.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BindingError {
    kind: ErrorKind,
    message: String,
}

impl BindingError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    /// Error for an operation attempted on a released object.
    pub fn released() -> Self {
        Self::invalid_state(RELEASED)
    }

    /// Translate an engine status. `message` is the engine's text for `code`.
    ///
    /// `ErrorCode::Ok` is not an error; it is reported as a runtime error so
    /// that a caller mistake cannot be silently swallowed.
    pub fn from_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code.kind().unwrap_or(ErrorKind::Runtime), message)
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<MatrixError> for BindingError {
    fn from(err: MatrixError) -> Self {
        Self::from_code(err.code(), err.to_string())
    }
}

pub type BindingResult<T> = std::result::Result<T, BindingError>;

/// Pre-boundary check of constructor input. Returns the element count.
pub fn validate_input(rows: usize, cols: usize, len: usize) -> BindingResult<usize> {
    matrix::validate(rows, cols, len).map_err(BindingError::from)
}

/// Accept dimensions from runtimes with signed integers.
///
/// Negative values get the same invalid-argument error as zero, rather than
/// an integer conversion error.
pub fn dims_from_signed(rows: i64, cols: i64) -> BindingResult<(usize, usize)> {
    match (usize::try_from(rows), usize::try_from(cols)) {
        (Ok(r), Ok(c)) if r > 0 && c > 0 => Ok((r, c)),
        _ => Err(BindingError::invalid_argument(format!(
            "rows and cols must be > 0, got {rows}x{cols}"
        ))),
    }
}

/// Pre-boundary check of `lhs * rhs`. Returns the result shape.
pub fn check_product(lhs: Shape, rhs: Shape) -> BindingResult<Shape> {
    lhs.product(rhs).map_err(BindingError::from)
}
