//! Uniform bindings for spectrum-driven materials

use serde::{Deserialize, Serialize};

/// Names of the shader uniforms a spectrogram feed writes to.
///
/// `array_key` targets a `uniform float name[64]`, `average_key` a scalar
/// `uniform float`. Both are passed through verbatim to the material; nothing
/// checks that the shader declares them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniformBinding {
    array_key: String,
    average_key: String,
}

impl UniformBinding {
    /// Create a binding from the array and average uniform names
    pub fn new(array_key: impl Into<String>, average_key: impl Into<String>) -> Self {
        Self {
            array_key: array_key.into(),
            average_key: average_key.into(),
        }
    }

    /// Uniform receiving the full sample array
    pub fn array_key(&self) -> &str {
        &self.array_key
    }

    /// Uniform receiving the mean intensity
    pub fn average_key(&self) -> &str {
        &self.average_key
    }
}
