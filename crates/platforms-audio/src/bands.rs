use platforms_core::{SpectrogramSnapshot, SAMPLE_COUNT};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Highest accepted decay factor. A decay of 1.0 would freeze every band.
const MAX_DECAY: f32 = 0.999;

/// Tuning for [`BandProcessor`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    /// Multiplier applied to each band peak before clamping to `[0, 1]`.
    pub gain: f32,
    /// Fraction of the previous value kept when a band falls (0.0–0.999).
    pub decay: f32,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            gain: 1.0,
            decay: 0.85,
        }
    }
}

impl BandConfig {
    /// Clamp out-of-range values into their valid ranges.
    pub fn sanitized(self) -> Self {
        Self {
            gain: self.gain.max(0.0),
            decay: self.decay.clamp(0.0, MAX_DECAY),
        }
    }
}

/// Folds raw magnitude spectra into 64-band processed snapshots.
///
/// Bins are split into contiguous bands, each band takes its peak bin, and
/// falling bands decay toward the new value instead of dropping at once.
pub struct BandProcessor {
    config: BandConfig,
    previous: [f32; SAMPLE_COUNT],
}

impl BandProcessor {
    pub fn new(config: BandConfig) -> Self {
        let config = config.sanitized();
        debug!(gain = config.gain, decay = config.decay, "Band processor created");
        Self {
            config,
            previous: [0.0; SAMPLE_COUNT],
        }
    }

    /// Process one frame of raw magnitudes.
    ///
    /// An empty frame resets the smoothing state and yields silence.
    pub fn process(&mut self, magnitudes: &[f32]) -> SpectrogramSnapshot {
        if magnitudes.is_empty() {
            self.reset();
            return SpectrogramSnapshot::SILENT;
        }

        let bins = magnitudes.len();
        let mut out = [0.0; SAMPLE_COUNT];
        for (band, value) in out.iter_mut().enumerate() {
            let (start, end) = band_range(band, bins);
            let peak = magnitudes[start..end].iter().copied().fold(0.0f32, f32::max);
            let target = (peak * self.config.gain).clamp(0.0, 1.0);

            let previous = self.previous[band];
            *value = if target < previous {
                previous * self.config.decay + target * (1.0 - self.config.decay)
            } else {
                target
            };
        }

        self.previous = out;
        SpectrogramSnapshot::new(out)
    }

    /// Forget the smoothing history.
    pub fn reset(&mut self) {
        self.previous = [0.0; SAMPLE_COUNT];
    }

    pub fn config(&self) -> BandConfig {
        self.config
    }
}

impl Default for BandProcessor {
    fn default() -> Self {
        Self::new(BandConfig::default())
    }
}

/// Bin range `[start, end)` covered by `band`. Always at least one bin wide.
fn band_range(band: usize, bins: usize) -> (usize, usize) {
    let start = band * bins / SAMPLE_COUNT;
    let end = ((band + 1) * bins / SAMPLE_COUNT).max(start + 1);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_decay() -> BandConfig {
        BandConfig {
            gain: 1.0,
            decay: 0.0,
        }
    }

    #[test]
    fn band_takes_peak_bin() {
        let mut processor = BandProcessor::new(no_decay());
        let magnitudes: Vec<f32> = (0..128).map(|i| if i % 2 == 0 { 0.5 } else { 0.25 }).collect();
        let snapshot = processor.process(&magnitudes);
        assert!(snapshot.samples().iter().all(|&s| s == 0.5));
    }

    #[test]
    fn gain_is_clamped() {
        let mut processor = BandProcessor::new(BandConfig {
            gain: 2.0,
            decay: 0.0,
        });
        let snapshot = processor.process(&[0.8; 64]);
        assert!(snapshot.samples().iter().all(|&s| s == 1.0));

        let snapshot = processor.process(&[-0.5; 64]);
        assert!(snapshot.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn falling_bands_decay() {
        let mut processor = BandProcessor::new(BandConfig {
            gain: 1.0,
            decay: 0.5,
        });
        processor.process(&[1.0; 64]);
        let snapshot = processor.process(&[0.0; 64]);
        assert_eq!(snapshot.samples()[0], 0.5);
        let snapshot = processor.process(&[0.0; 64]);
        assert_eq!(snapshot.samples()[0], 0.25);

        // Rises are immediate
        let snapshot = processor.process(&[0.9; 64]);
        assert_eq!(snapshot.samples()[0], 0.9);
    }

    #[test]
    fn short_input_repeats_bins() {
        let mut processor = BandProcessor::new(no_decay());
        let snapshot = processor.process(&[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(snapshot.samples()[0], 0.1);
        assert_eq!(snapshot.samples()[15], 0.1);
        assert_eq!(snapshot.samples()[16], 0.2);
        assert_eq!(snapshot.samples()[63], 0.4);
    }

    #[test]
    fn empty_input_resets() {
        let mut processor = BandProcessor::default();
        processor.process(&[1.0; 64]);
        assert_eq!(processor.process(&[]), SpectrogramSnapshot::SILENT);
        // No decay tail after a reset
        let snapshot = processor.process(&[0.0; 64]);
        assert_eq!(snapshot.peak(), 0.0);
    }

    #[test]
    fn ranges_cover_every_bin_once() {
        for bins in [1, 7, 64, 100, 513] {
            let mut covered = 0;
            let mut last_end = 0;
            for band in 0..SAMPLE_COUNT {
                let (start, end) = band_range(band, bins);
                assert!(end <= bins);
                assert!(start < end);
                if bins >= SAMPLE_COUNT {
                    assert_eq!(start, last_end);
                    covered += end - start;
                }
                last_end = end;
            }
            if bins >= SAMPLE_COUNT {
                assert_eq!(covered, bins);
            }
        }
    }

    #[test]
    fn config_is_sanitized() {
        let processor = BandProcessor::new(BandConfig {
            gain: -3.0,
            decay: 1.5,
        });
        assert_eq!(processor.config().gain, 0.0);
        assert_eq!(processor.config().decay, MAX_DECAY);
    }
}
