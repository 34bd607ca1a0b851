//! PyO3 bindings for Python integration

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::error::{CoreError, ErrorKind};

mod denoise_bindings;
mod equalizer_bindings;
mod playback_bindings;
mod signal_bindings;

/// Map a core error onto the Python exception hierarchy: bad arguments and
/// degenerate inputs become ValueError, device failures RuntimeError.
pub(crate) fn to_py_err(err: CoreError) -> PyErr {
    match err.kind() {
        ErrorKind::Device => PyRuntimeError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

/// Python module definition
#[pymodule]
fn signal_equalizer(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<signal_bindings::PySignalBuffer>()?;
    m.add_class::<equalizer_bindings::PyEqualizer>()?;
    m.add_class::<denoise_bindings::PyNoiseReducer>()?;
    m.add_class::<playback_bindings::PyPlayer>()?;

    // Add EqualizerMode enum
    m.add_class::<equalizer_bindings::PyEqualizerMode>()?;

    Ok(())
}
