// bindings/python/src/matrix.rs
use densemx_core::binding;
use densemx_engine::OwnedHandle;
use pyo3::prelude::*;

use crate::error::to_pyerr;

/// Dense row-major float64 matrix owned by the densemx engine.
///
/// `Matrix(rows, cols, data)` copies `data` (a flat sequence of
/// `rows * cols` floats). Call `release()` or use it as a context manager
/// to free the storage early; it is also freed when collected.
#[pyclass(module = "densemx._densemx", name = "Matrix")]
pub struct PyMatrix {
    inner: OwnedHandle,
}

#[pymethods]
impl PyMatrix {
    #[new]
    fn new(rows: i64, cols: i64, data: Vec<f64>) -> PyResult<Self> {
        let (rows, cols) = binding::dims_from_signed(rows, cols).map_err(to_pyerr)?;
        let inner = OwnedHandle::create(rows, cols, &data).map_err(to_pyerr)?;
        Ok(PyMatrix { inner })
    }

    #[getter]
    fn rows(&self) -> usize {
        self.inner.rows()
    }

    #[getter]
    fn cols(&self) -> usize {
        self.inner.cols()
    }

    /// `(rows, cols)` tuple.
    #[getter]
    fn shape(&self) -> (usize, usize) {
        (self.inner.rows(), self.inner.cols())
    }

    #[getter]
    fn is_released(&self) -> bool {
        self.inner.is_released()
    }

    /// Copy of the contents as a flat list, row-major.
    fn to_array(&self) -> PyResult<Vec<f64>> {
        self.inner.to_vec().map_err(to_pyerr)
    }

    #[pyo3(name = "toArray")]
    fn to_array_camel(&self) -> PyResult<Vec<f64>> {
        self.to_array()
    }

    /// `self @ other` as a new matrix. The GIL is released while the
    /// engine computes.
    fn multiply(&self, py: Python<'_>, other: PyRef<'_, PyMatrix>) -> PyResult<PyMatrix> {
        let (lhs, rhs) = (&self.inner, &other.inner);
        let inner = py.allow_threads(|| lhs.multiply(rhs)).map_err(to_pyerr)?;
        Ok(PyMatrix { inner })
    }

    fn __matmul__(&self, py: Python<'_>, other: PyRef<'_, PyMatrix>) -> PyResult<PyMatrix> {
        self.multiply(py, other)
    }

    /// Free the engine storage. Calling it again does nothing.
    fn release(&mut self) {
        self.inner.release();
    }

    fn __enter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    fn __exit__(
        &mut self,
        _exc_type: Option<&PyAny>,
        _exc_value: Option<&PyAny>,
        _traceback: Option<&PyAny>,
    ) -> bool {
        self.inner.release();
        false
    }

    fn __repr__(&self) -> String {
        let state = if self.inner.is_released() { ", released" } else { "" };
        format!("Matrix(rows={}, cols={}{})", self.inner.rows(), self.inner.cols(), state)
    }
}
