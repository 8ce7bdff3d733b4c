//! Owned dense storage behind every engine handle.
//!
//! `DenseMatrix` is row-major `f64` with immutable dimensions. All
//! allocation goes through `try_reserve_exact` so that an oversized request
//! surfaces as [`MatrixError::Alloc`] instead of aborting the process.

use std::fmt;

use crate::error::{MatrixError, Result};

/// `(rows, cols)` pair describing a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    #[inline]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Element count, rejecting zero dimensions and `rows * cols` overflow.
    pub fn checked_len(self) -> Result<usize> {
        if self.rows == 0 || self.cols == 0 {
            return Err(MatrixError::EmptyShape(self));
        }
        self.rows
            .checked_mul(self.cols)
            .ok_or(MatrixError::ShapeOverflow(self))
    }

    /// Shape of `self * rhs`, or `IncompatibleShapes` if the inner dimensions differ.
    pub fn product(self, rhs: Shape) -> Result<Shape> {
        if self.cols != rhs.rows {
            return Err(MatrixError::IncompatibleShapes { lhs: self, rhs });
        }
        Ok(Shape::new(self.rows, rhs.cols))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Validate a `(rows, cols)` pair against a buffer length.
///
/// Returns the element count. This is the one structural check both the
/// engine and the adapters run.
pub fn validate(rows: usize, cols: usize, len: usize) -> Result<usize> {
    let expected = Shape::new(rows, cols).checked_len()?;
    if len != expected {
        return Err(MatrixError::LengthMismatch {
            expected,
            actual: len,
        });
    }
    Ok(expected)
}

fn try_alloc(elements: usize) -> Result<Vec<f64>> {
    let mut data = Vec::new();
    data.try_reserve_exact(elements)
        .map_err(|_| MatrixError::Alloc { elements })?;
    Ok(data)
}

/// Row-major `f64` matrix that owns its buffer.
#[derive(Clone, PartialEq)]
pub struct DenseMatrix {
    shape: Shape,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// Copy `data` into a fresh buffer. The caller's slice is not retained.
    pub fn from_slice(rows: usize, cols: usize, data: &[f64]) -> Result<Self> {
        let len = validate(rows, cols, data.len())?;
        let mut buf = try_alloc(len)?;
        buf.extend_from_slice(data);
        Ok(Self {
            shape: Shape::new(rows, cols),
            data: buf,
        })
    }

    /// Zero-filled matrix of the given shape.
    pub fn zeros(shape: Shape) -> Result<Self> {
        let len = shape.checked_len()?;
        let mut buf = try_alloc(len)?;
        buf.resize(len, 0.0);
        Ok(Self { shape, data: buf })
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
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Number of stored elements (`rows * cols`).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`: zero-sized matrices cannot be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Copy the contents into the first `len()` elements of `out`.
    pub fn copy_into(&self, out: &mut [f64]) -> Result<()> {
        if out.len() < self.data.len() {
            return Err(MatrixError::BufferTooSmall {
                required: self.data.len(),
                capacity: out.len(),
            });
        }
        out[..self.data.len()].copy_from_slice(&self.data);
        Ok(())
    }
}

impl fmt::Debug for DenseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseMatrix")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn from_slice_copies() {
        let mut src = vec![1.0, 2.0, 3.0, 4.0];
        let m = DenseMatrix::from_slice(2, 2, &src).unwrap();
        src[0] = 99.0;
        assert_eq!(m.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(m.shape(), Shape::new(2, 2));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(
            DenseMatrix::from_slice(0, 2, &[]).unwrap_err(),
            MatrixError::EmptyShape(Shape::new(0, 2))
        );
        assert_eq!(
            DenseMatrix::from_slice(2, 2, &[1.0; 3]).unwrap_err(),
            MatrixError::LengthMismatch {
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(
            Shape::new(usize::MAX, 2).checked_len().unwrap_err(),
            MatrixError::ShapeOverflow(Shape::new(usize::MAX, 2))
        );
    }

    #[test]
    fn oversized_zeros_reports_alloc() {
        let huge = Shape::new(usize::MAX / 8, 2);
        let err = DenseMatrix::zeros(huge).unwrap_err();
        assert!(matches!(err, MatrixError::Alloc { .. }), "{err:?}");
    }

    #[test]
    fn copy_into_checks_capacity() {
        let m = DenseMatrix::from_slice(1, 3, &[1.0, 2.0, 3.0]).unwrap();
        let mut small = [0.0; 2];
        assert_eq!(
            m.copy_into(&mut small).unwrap_err(),
            MatrixError::BufferTooSmall {
                required: 3,
                capacity: 2
            }
        );
        let mut large = [-1.0; 5];
        m.copy_into(&mut large).unwrap();
        assert_eq!(large, [1.0, 2.0, 3.0, -1.0, -1.0]);
    }

    #[test]
    fn product_shape() {
        let a = Shape::new(2, 3);
        let b = Shape::new(3, 4);
        assert_eq!(a.product(b).unwrap(), Shape::new(2, 4));
        assert!(b.product(a).is_err());
    }

    proptest! {
        #[test]
        fn validate_accepts_exactly_rows_times_cols(
            rows in 1usize..32,
            cols in 1usize..32,
            delta in -3isize..3,
        ) {
            let len = ((rows * cols) as isize + delta).max(0) as usize;
            let result = validate(rows, cols, len);
            prop_assert_eq!(result.is_ok(), len == rows * cols);
        }
    }
}
