//! Processed spectrum snapshots

use crate::error::SnapshotError;

/// Number of processed magnitude samples in every snapshot.
pub const SAMPLE_COUNT: usize = 64;

/// One frame of processed audio spectrum data.
///
/// Magnitudes are conceptually in `[0, 1]` but this is not enforced. A
/// snapshot is immutable once built; producers publish a new one rather than
/// editing the current one in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrogramSnapshot {
    samples: [f32; SAMPLE_COUNT],
}

impl SpectrogramSnapshot {
    /// A snapshot where every band is silent.
    pub const SILENT: SpectrogramSnapshot = SpectrogramSnapshot {
        samples: [0.0; SAMPLE_COUNT],
    };

    /// Create a snapshot from an owned array of samples
    pub const fn new(samples: [f32; SAMPLE_COUNT]) -> Self {
        Self { samples }
    }

    /// Create a snapshot from a slice, rejecting anything that is not
    /// exactly [`SAMPLE_COUNT`] long.
    pub fn from_slice(samples: &[f32]) -> Result<Self, SnapshotError> {
        let samples: [f32; SAMPLE_COUNT] =
            samples.try_into().map_err(|_| SnapshotError::WrongLength {
                expected: SAMPLE_COUNT,
                actual: samples.len(),
            })?;
        Ok(Self { samples })
    }

    /// The processed samples, lowest band first
    pub fn samples(&self) -> &[f32; SAMPLE_COUNT] {
        &self.samples
    }

    /// Mean of all samples.
    ///
    /// Accumulates left to right in `f32` and divides once, so results are
    /// bit-for-bit reproducible.
    pub fn average(&self) -> f32 {
        let sum = self.samples.iter().fold(0.0f32, |acc, &sample| acc + sample);
        sum / SAMPLE_COUNT as f32
    }

    /// Peak sample value
    pub fn peak(&self) -> f32 {
        self.samples.iter().copied().fold(0.0f32, f32::max)
    }
}

impl Default for SpectrogramSnapshot {
    fn default() -> Self {
        Self::SILENT
    }
}

impl TryFrom<Vec<f32>> for SpectrogramSnapshot {
    type Error = SnapshotError;

    fn try_from(samples: Vec<f32>) -> Result<Self, Self::Error> {
        Self::from_slice(&samples)
    }
}
