// bindings/python/src/lib.rs

#![allow(non_local_definitions)]

use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

mod error;
mod matrix;

use densemx_engine::c_api;
use matrix::PyMatrix;

/// Number of handles created through this module and not yet released.
#[pyfunction]
fn live_handles() -> usize {
    c_api::mx_live_handles()
}

/// ABI version of the loaded engine.
#[pyfunction]
fn abi_version() -> u32 {
    c_api::mx_abi_version()
}

#[pymodule]
fn _densemx(py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyMatrix>()?;
    error::register_exceptions(py, m)?;

    m.add_function(wrap_pyfunction!(live_handles, m)?)?;
    m.add_function(wrap_pyfunction!(abi_version, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
