//! Materials and their uniform state

use std::collections::HashMap;

use platforms_core::{UniformBinding, SAMPLE_COUNT};

/// Write access to a material's named shader uniforms.
///
/// Names the shader does not declare are accepted and simply have no effect
/// on rendering.
pub trait ShaderParams {
    /// Set a `uniform float name[N]`
    fn set_float_array(&mut self, name: &str, values: &[f32]);

    /// Set a scalar `uniform float name`
    fn set_float(&mut self, name: &str, value: f32);
}

/// Value stored for one uniform
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    FloatArray(Vec<f32>),
}

/// A named material with CPU-side uniform state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    name: String,
    uniforms: HashMap<String, UniformValue>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uniforms: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a uniform by name
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    /// Get a scalar uniform, if set and scalar
    pub fn float(&self, name: &str) -> Option<f32> {
        match self.uniforms.get(name) {
            Some(UniformValue::Float(value)) => Some(*value),
            _ => None,
        }
    }

    /// Get an array uniform, if set and an array
    pub fn float_array(&self, name: &str) -> Option<&[f32]> {
        match self.uniforms.get(name) {
            Some(UniformValue::FloatArray(values)) => Some(values),
            _ => None,
        }
    }

    /// Number of uniforms that have been set
    pub fn uniform_count(&self) -> usize {
        self.uniforms.len()
    }

    /// Pack the spectrum uniforms named by `binding` for upload.
    ///
    /// Returns `None` until both uniforms have been written.
    pub fn spectrum_uniforms(&self, binding: &UniformBinding) -> Option<SpectrumUniforms> {
        let samples = self.float_array(binding.array_key())?;
        let average = self.float(binding.average_key())?;
        Some(SpectrumUniforms::new(samples, average))
    }
}

impl ShaderParams for Material {
    fn set_float_array(&mut self, name: &str, values: &[f32]) {
        match self.uniforms.get_mut(name) {
            Some(UniformValue::FloatArray(existing)) => {
                existing.clear();
                existing.extend_from_slice(values);
            }
            _ => {
                self.uniforms
                    .insert(name.to_owned(), UniformValue::FloatArray(values.to_vec()));
            }
        }
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.uniforms.insert(name.to_owned(), UniformValue::Float(value));
    }
}

/// Spectrum uniform block in std140 layout.
///
/// std140 pads every `float` array element to 16 bytes, so the 64 samples
/// are packed four to a `vec4`: sample `i` lives at `samples[i / 4][i % 4]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpectrumUniforms {
    pub samples: [[f32; 4]; SAMPLE_COUNT / 4],
    pub average: [f32; 4], // x = mean intensity
}

impl SpectrumUniforms {
    /// Pack up to 64 samples; missing samples are zero.
    pub fn new(samples: &[f32], average: f32) -> Self {
        let mut packed = [[0.0; 4]; SAMPLE_COUNT / 4];
        for (i, &sample) in samples.iter().take(SAMPLE_COUNT).enumerate() {
            packed[i / 4][i % 4] = sample;
        }
        Self {
            samples: packed,
            average: [average, 0.0, 0.0, 0.0],
        }
    }

    /// Raw bytes ready for a uniform buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_read_uniforms() {
        let mut material = Material::new("floor");
        material.set_float("_Intensity", 0.5);
        material.set_float_array("_Spectrum", &[1.0, 2.0, 3.0]);

        assert_eq!(material.float("_Intensity"), Some(0.5));
        assert_eq!(material.float_array("_Spectrum"), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(material.float("_Spectrum"), None);
        assert_eq!(material.uniform_count(), 2);
    }

    #[test]
    fn array_overwrite_replaces_contents() {
        let mut material = Material::new("floor");
        material.set_float_array("_Spectrum", &[1.0; 64]);
        material.set_float_array("_Spectrum", &[0.5; 4]);
        assert_eq!(material.float_array("_Spectrum").unwrap().len(), 4);
    }

    #[test]
    fn scalar_replaces_array_of_same_name() {
        let mut material = Material::new("floor");
        material.set_float_array("_Value", &[1.0]);
        material.set_float("_Value", 2.0);
        assert_eq!(material.uniform("_Value"), Some(&UniformValue::Float(2.0)));
    }

    #[test]
    fn spectrum_uniforms_layout() {
        let samples: Vec<f32> = (0..SAMPLE_COUNT).map(|i| i as f32).collect();
        let packed = SpectrumUniforms::new(&samples, 0.25);
        assert_eq!(packed.samples[0], [0.0, 1.0, 2.0, 3.0]);
        assert_eq!(packed.samples[15][3], 63.0);
        assert_eq!(packed.average[0], 0.25);
        assert_eq!(packed.as_bytes().len(), (SAMPLE_COUNT + 4) * 4);
    }

    #[test]
    fn spectrum_uniforms_need_both_values() {
        let binding = UniformBinding::new("_Spectrum", "_Intensity");
        let mut material = Material::new("floor");
        assert!(material.spectrum_uniforms(&binding).is_none());

        material.set_float_array("_Spectrum", &[0.5; SAMPLE_COUNT]);
        assert!(material.spectrum_uniforms(&binding).is_none());

        material.set_float("_Intensity", 0.5);
        let packed = material.spectrum_uniforms(&binding).unwrap();
        assert_eq!(packed.samples[7], [0.5; 4]);
        assert_eq!(packed.average[0], 0.5);
    }
}
