//! # densemx-engine
//!
//! The engine owns every matrix. Callers hold opaque [`MatrixHandle`]
//! tokens and reach the storage only through handle operations.
//!
//! - [`registry`]: generational arena behind the handles; a destroyed
//!   handle is reported as stale, never dereferenced.
//! - [`engine`]: the safe Rust API (create, destroy, multiply, shape
//!   queries, copy-out).
//! - [`c_api`]: the `mx_*` C exports, status codes and messages. The C
//!   declarations live in `include/densemx.h`.
//! - [`adapter`]: [`OwnedHandle`], the ownership wrapper both language
//!   bindings are built on.
//!
//! ```
//! use densemx_engine::OwnedHandle;
//!
//! let a = OwnedHandle::create(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
//! let b = OwnedHandle::create(2, 2, &[5.0, 6.0, 7.0, 8.0]).unwrap();
//! let c = a.multiply(&b).unwrap();
//! assert_eq!(c.to_vec().unwrap(), vec![19.0, 22.0, 43.0, 50.0]);
//! ```

pub mod adapter;
pub mod c_api;
pub mod engine;
pub mod registry;

pub use adapter::OwnedHandle;
pub use registry::MatrixHandle;
