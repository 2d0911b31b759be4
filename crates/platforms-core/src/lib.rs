//! Platforms Core - Shared types for the Custom Platforms runtime
//!
//! This crate provides the types passed between the audio and render sides:
//! - Fixed-size spectrogram snapshots and their aggregate intensity
//! - Uniform bindings naming the shader parameters a feed writes to
//! - Common error types

pub mod binding;
mod error;
pub mod spectrum;

pub use binding::UniformBinding;
pub use error::SnapshotError;
pub use spectrum::{SpectrogramSnapshot, SAMPLE_COUNT};
