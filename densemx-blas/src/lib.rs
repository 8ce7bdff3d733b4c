// BLAS functions match CBLAS signatures: many parameters are inherent to the API.
#![allow(clippy::too_many_arguments)]

//! # densemx-blas
//!
//! Pure Rust, stable-toolchain GEMM kernel behind the densemx engine.
//!
//! No FFI, no C dependencies. The kernel is an i-k-j loop blocked over K
//! and N panels, with rows of C split across scoped threads for large
//! products (feature `parallel`, on by default).
//!
//! ## Memory Layout
//!
//! Both row-major and column-major layouts are accepted via a CBLAS-style
//! `Layout` parameter. The engine only ever uses row-major.
//!
//! ```
//! use densemx_blas::{level3, Layout};
//!
//! let a = [1.0, 2.0, 3.0, 4.0];
//! let b = [5.0, 6.0, 7.0, 8.0];
//! let mut c = [0.0; 4];
//! level3::dgemm(Layout::RowMajor, 2, 2, 2, 1.0, &a, 2, &b, 2, 0.0, &mut c, 2);
//! assert_eq!(c, [19.0, 22.0, 43.0, 50.0]);
//! ```

pub mod level3;

pub use densemx_core::layout::Layout;
pub use level3::{dgemm, dgemm_with};
