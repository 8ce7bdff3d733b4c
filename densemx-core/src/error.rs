//! Error taxonomy shared by the engine, its C ABI and both bindings.
//!
//! Failures are re-encoded once per boundary:
//!
//! | Layer | Type | Produced by |
//! |-------|------|-------------|
//! | engine | [`MatrixError`] | validation, registry, allocation |
//! | C ABI | [`ErrorCode`] | `MatrixError::code` |
//! | adapters | [`crate::BindingError`] | local checks or `ErrorCode` + `mx_strerror` text |
//!
//! The code set is the only channel through which the engine reports
//! failure. Each code maps onto exactly one binding-level [`ErrorKind`].

use std::ffi::{c_int, CStr};
use std::fmt;

use crate::matrix::Shape;

/// Integer status code returned across the C ABI.
///
/// Values match the `MX_*` constants in `densemx.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// Success.
    Ok = 0,
    /// Null handle or null pointer argument.
    Null = 1,
    /// Dimension mismatch or malformed buffer length.
    Shape = 2,
    /// Allocation failure.
    Alloc = 3,
    /// Handle already released or otherwise unusable.
    State = 4,
    /// Any other internal failure.
    Unknown = 255,
}

impl ErrorCode {
    /// Every code, in ABI order.
    pub const ALL: [ErrorCode; 6] = [
        ErrorCode::Ok,
        ErrorCode::Null,
        ErrorCode::Shape,
        ErrorCode::Alloc,
        ErrorCode::State,
        ErrorCode::Unknown,
    ];

    #[inline]
    pub const fn as_raw(self) -> c_int {
        self as c_int
    }

    /// Decode a raw status. Unrecognized values decode to [`ErrorCode::Unknown`].
    pub const fn from_raw(raw: c_int) -> Self {
        match raw {
            0 => ErrorCode::Ok,
            1 => ErrorCode::Null,
            2 => ErrorCode::Shape,
            3 => ErrorCode::Alloc,
            4 => ErrorCode::State,
            _ => ErrorCode::Unknown,
        }
    }

    #[inline]
    pub const fn is_ok(self) -> bool {
        matches!(self, ErrorCode::Ok)
    }

    /// Static, NUL-terminated message. This is what `mx_strerror` hands out.
    pub const fn message_cstr(self) -> &'static CStr {
        match self {
            ErrorCode::Ok => c"OK",
            ErrorCode::Null => c"null argument",
            ErrorCode::Shape => c"shape mismatch",
            ErrorCode::Alloc => c"allocation failure",
            ErrorCode::State => c"invalid matrix handle",
            ErrorCode::Unknown => c"unknown error",
        }
    }

    /// Same text as [`ErrorCode::message_cstr`], as a Rust string.
    pub const fn message(self) -> &'static str {
        match self {
            ErrorCode::Ok => "OK",
            ErrorCode::Null => "null argument",
            ErrorCode::Shape => "shape mismatch",
            ErrorCode::Alloc => "allocation failure",
            ErrorCode::State => "invalid matrix handle",
            ErrorCode::Unknown => "unknown error",
        }
    }

    /// Binding-level category, or `None` for [`ErrorCode::Ok`].
    pub const fn kind(self) -> Option<ErrorKind> {
        match self {
            ErrorCode::Ok => None,
            ErrorCode::Shape => Some(ErrorKind::InvalidArgument),
            ErrorCode::Null | ErrorCode::State => Some(ErrorKind::InvalidState),
            ErrorCode::Alloc => Some(ErrorKind::ResourceExhausted),
            ErrorCode::Unknown => Some(ErrorKind::Runtime),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Error category each binding translates into its own idiom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed shape or buffer length.
    InvalidArgument,
    /// Use of a released or null handle.
    InvalidState,
    /// Allocation failure.
    ResourceExhausted,
    /// Anything else.
    Runtime,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::InvalidState => "invalid state",
            ErrorKind::ResourceExhausted => "resource exhausted",
            ErrorKind::Runtime => "runtime error",
        })
    }
}

/// Failure detected inside the engine, with enough context to log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("rows and cols must be > 0, got {0}")]
    EmptyShape(Shape),

    #[error("{0} overflows the addressable element count")]
    ShapeOverflow(Shape),

    #[error("data length mismatch: {actual} != {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("shape mismatch: {lhs} * {rhs}")]
    IncompatibleShapes { lhs: Shape, rhs: Shape },

    #[error("output buffer holds {capacity} elements, matrix needs {required}")]
    BufferTooSmall { required: usize, capacity: usize },

    #[error("null {0}")]
    Null(&'static str),

    #[error("stale or unknown matrix handle {0:#018x}")]
    StaleHandle(u64),

    #[error("failed to allocate {elements} elements")]
    Alloc { elements: usize },

    #[error("internal error: {0}")]
    Internal(String),
}

impl MatrixError {
    /// The ABI code this error is reported as.
    pub const fn code(&self) -> ErrorCode {
        match self {
            MatrixError::EmptyShape(_)
            | MatrixError::ShapeOverflow(_)
            | MatrixError::LengthMismatch { .. }
            | MatrixError::IncompatibleShapes { .. }
            | MatrixError::BufferTooSmall { .. } => ErrorCode::Shape,
            MatrixError::Null(_) => ErrorCode::Null,
            MatrixError::StaleHandle(_) => ErrorCode::State,
            MatrixError::Alloc { .. } => ErrorCode::Alloc,
            MatrixError::Internal(_) => ErrorCode::Unknown,
        }
    }
}

pub type Result<T> = std::result::Result<T, MatrixError>;
