use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use crate::bigint::BigInt;
use crate::dfa::Dfa;
use crate::encoder::Encoder;
use crate::error::Error;

fn to_py_err(err: Error) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Python-visible DFA wrapper. Compiles a pattern once, then hands the
/// FST text to `Encoder`.
#[pyclass(name = "Dfa")]
pub struct PyDfa {
    inner: Dfa,
}

#[pymethods]
impl PyDfa {
    #[staticmethod]
    fn from_pattern(pattern: &str) -> PyResult<Self> {
        let inner = Dfa::from_pattern(pattern).map_err(to_py_err)?;
        Ok(PyDfa { inner })
    }

    fn to_fst(&self) -> String {
        self.inner.to_fst()
    }

    fn to_dot(&self) -> String {
        self.inner.to_dot()
    }
}

/// Python-visible encoder. Big integers cross the boundary as base-10
/// strings; words cross as `bytes`.
#[pyclass(name = "Encoder")]
pub struct PyEncoder {
    inner: Encoder,
}

#[pymethods]
impl PyEncoder {
    #[new]
    fn new(fst: &str, fixed_slice: u32) -> PyResult<Self> {
        let inner = Encoder::new(fst, fixed_slice).map_err(to_py_err)?;
        Ok(PyEncoder { inner })
    }

    #[staticmethod]
    fn from_pattern(pattern: &str, fixed_slice: u32) -> PyResult<Self> {
        let inner = Encoder::from_pattern(pattern, fixed_slice).map_err(to_py_err)?;
        Ok(PyEncoder { inner })
    }

    fn rank(&self, word: &[u8]) -> PyResult<String> {
        self.inner
            .rank(word)
            .map(|r| r.to_string())
            .map_err(to_py_err)
    }

    fn unrank<'py>(&self, py: Python<'py>, index: &str) -> PyResult<Bound<'py, PyBytes>> {
        let index: BigInt = index.parse().map_err(to_py_err)?;
        let word = self.inner.unrank(&index).map_err(to_py_err)?;
        Ok(PyBytes::new(py, &word))
    }

    fn num_words(&self, lower: u32, upper: u32) -> PyResult<String> {
        self.inner
            .num_words(lower, upper)
            .map(|n| n.to_string())
            .map_err(to_py_err)
    }

    fn set_fixed_slice(&mut self, fixed_slice: u32) {
        self.inner.set_fixed_slice(fixed_slice);
    }

    fn get_fixed_slice(&self) -> u32 {
        self.inner.get_fixed_slice()
    }

    fn num_states(&self) -> u32 {
        self.inner.num_states()
    }
}
