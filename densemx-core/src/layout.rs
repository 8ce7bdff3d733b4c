//! CBLAS-style storage order.
//!
//! The engine stores everything row-major; the kernel also accepts
//! column-major operands so it can be driven like a CBLAS `dgemm`.

/// Memory layout for matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum Layout {
    /// Row-major (C-style): elements in a row are contiguous.
    #[default]
    RowMajor = 101,
    /// Column-major (Fortran-style): elements in a column are contiguous.
    ColMajor = 102,
}
