use densemx_core::{BindingError, ErrorKind};
use pyo3::exceptions::{PyMemoryError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

pyo3::create_exception!(
    _densemx,
    MatrixStateError,
    PyRuntimeError,
    "Operation on a released matrix or an invalid engine handle."
);

/// Register the exception types on the module.
pub fn register_exceptions(py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add("MatrixStateError", py.get_type::<MatrixStateError>())?;
    Ok(())
}

// Orphan rule: no `impl From<BindingError> for PyErr` here.
pub fn to_pyerr(err: BindingError) -> PyErr {
    let msg = err.message().to_owned();
    match err.kind() {
        ErrorKind::InvalidArgument => PyValueError::new_err(msg),
        ErrorKind::InvalidState => MatrixStateError::new_err(msg),
        ErrorKind::ResourceExhausted => PyMemoryError::new_err(msg),
        ErrorKind::Runtime => PyRuntimeError::new_err(msg),
    }
}
