//! Platforms Render - Shader parameters driven by audio spectrum data
//!
//! Materials hold named uniforms, renderers expose the materials currently
//! attached to an object, and [`SpectrogramFeed`] pushes spectrogram
//! snapshots into those uniforms once per render tick.

pub mod feed;
pub mod material;
pub mod renderer;

pub use feed::{SpectrogramFeed, TickOutcome};
pub use material::{Material, ShaderParams, SpectrumUniforms, UniformValue};
pub use renderer::{MaterialSurface, MeshRenderer, RenderObject, SceneObject};
