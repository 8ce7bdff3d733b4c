//! # densemx
//!
//! Native Rust binding for the densemx engine. A [`Matrix`] owns one engine
//! handle and gives it back when it is released or dropped.
//!
//! ```
//! use densemx::Matrix;
//!
//! let a = Matrix::new(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
//! let b = Matrix::new(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0])?;
//! let c = a.multiply(&b)?;
//! assert_eq!(c.shape(), (2, 2));
//! assert_eq!(c.to_vec()?, vec![58.0, 64.0, 139.0, 154.0]);
//! # Ok::<(), densemx::Error>(())
//! ```

use std::fmt;

use densemx_core::Shape;
use densemx_engine::OwnedHandle;

pub use densemx_core::{BindingError as Error, ErrorKind};

pub type Result<T> = std::result::Result<T, Error>;

/// Dense row-major `f64` matrix stored in the engine.
pub struct Matrix {
    handle: OwnedHandle,
}

impl Matrix {
    /// Copy `data` (row-major, `rows * cols` long) into a new matrix.
    pub fn new(rows: usize, cols: usize, data: &[f64]) -> Result<Self> {
        OwnedHandle::create(rows, cols, data).map(|handle| Self { handle })
    }

    /// Build from a slice of equally long rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        if let Some((i, r)) = rows.iter().enumerate().find(|(_, r)| r.as_ref().len() != cols) {
            return Err(Error::invalid_argument(format!(
                "row {i} has {} elements, expected {cols}",
                r.as_ref().len()
            )));
        }
        let data: Vec<f64> = rows.iter().flat_map(|r| r.as_ref().iter().copied()).collect();
        Self::new(rows.len(), cols, &data)
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Result<Self> {
        let len = Shape::new(n, n).checked_len().map_err(Error::from)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| {
            Error::new(
                ErrorKind::ResourceExhausted,
                format!("failed to allocate {len} elements"),
            )
        })?;
        data.resize(len, 0.0);
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Self::new(n, n, &data)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.handle.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.handle.cols()
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Copy of the contents, row-major. Fails once released.
    pub fn to_vec(&self) -> Result<Vec<f64>> {
        self.handle.to_vec()
    }

    /// `self * other` as a new matrix.
    ///
    /// Requires `self.cols() == other.rows()`.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        self.handle
            .multiply(&other.handle)
            .map(|handle| Matrix { handle })
    }

    /// Free the engine storage now instead of on drop. Idempotent.
    pub fn release(&mut self) {
        self.handle.release();
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.handle.is_released()
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("rows", &self.rows())
            .field("cols", &self.cols())
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_checks_row_lengths() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.to_vec().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);

        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.message(), "row 1 has 1 elements, expected 2");

        let empty: [Vec<f64>; 0] = [];
        assert_eq!(
            Matrix::from_rows(&empty).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn identity_is_neutral() {
        let a = Matrix::new(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let i2 = Matrix::identity(2).unwrap();
        let i3 = Matrix::identity(3).unwrap();
        assert_eq!(i2.multiply(&a).unwrap().to_vec().unwrap(), a.to_vec().unwrap());
        assert_eq!(a.multiply(&i3).unwrap().to_vec().unwrap(), a.to_vec().unwrap());
        assert!(Matrix::identity(0).is_err());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn identity_rejects_overflowing_size() {
        let err = Matrix::identity(1usize << 32).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn debug_shows_shape_and_state() {
        let mut m = Matrix::new(1, 2, &[1.0, 2.0]).unwrap();
        assert_eq!(format!("{m:?}"), "Matrix { rows: 1, cols: 2, released: false }");
        m.release();
        assert_eq!(format!("{m:?}"), "Matrix { rows: 1, cols: 2, released: true }");
    }
}
