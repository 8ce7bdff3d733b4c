//! # densemx-core
//!
//! Shared building blocks for the densemx engine and its bindings.
//!
//! This crate provides:
//! - **Storage**: [`DenseMatrix`], the owned row-major `f64` buffer behind
//!   every engine handle, and [`Shape`].
//! - **Error taxonomy**: [`ErrorCode`] (the C ABI status set),
//!   [`MatrixError`] (engine-side detail) and [`BindingError`] (what adapters
//!   raise), with the one translation table between them.
//! - **Binding contract**: the validation both adapters run before crossing
//!   the boundary ([`binding`]).
//! - **Kernel configuration** and scoped-thread helpers used by `densemx-blas`.

pub mod binding;
pub mod config;
pub mod error;
pub mod layout;
pub mod matrix;
pub mod parallel;

pub use binding::{BindingError, BindingResult};
pub use config::KernelConfig;
pub use error::{ErrorCode, ErrorKind, MatrixError, Result};
pub use layout::Layout;
pub use matrix::{DenseMatrix, Shape};
pub use parallel::for_each_row_block;
