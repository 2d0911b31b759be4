//! Platforms Audio - Spectrogram data for audio-reactive platforms
//!
//! Provides the snapshot handoff between the audio analysis cadence and the
//! render loop, and the band processor that produces 64-sample snapshots
//! from raw magnitude spectra.

mod bands;
mod source;

pub use bands::{BandConfig, BandProcessor};
pub use source::SpectrogramSource;
