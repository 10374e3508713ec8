//! Bijective rank/unrank encoding for length-bounded regular languages.
//!
//! A pattern compiles to a minimal DFA (`regex → ε-NFA → DFA` plus
//! Brzozowski minimization), serializes to FST text, and feeds an
//! [`Encoder`] that maps integers to words of the language and back.

pub mod bigint;
pub mod dfa;
pub mod encoder;
pub mod error;
pub mod nfa;
#[cfg(feature = "python")]
pub mod py;

pub use crate::bigint::BigInt;
pub use crate::dfa::Dfa;
pub use crate::encoder::{Encoder, Words};
pub use crate::error::{Error, Result};
pub use crate::nfa::Nfa;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn regrank_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<py::PyDfa>()?;
    m.add_class::<py::PyEncoder>()?;
    Ok(())
}
