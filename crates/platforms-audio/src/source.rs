use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use platforms_core::{SnapshotError, SpectrogramSnapshot};
use tracing::{trace, warn};

struct Shared {
    latest: RwLock<Option<Arc<SpectrogramSnapshot>>>,
    generation: AtomicU64,
}

/// Latest published spectrogram snapshot, shared between one producer and
/// one reader.
///
/// Publishing swaps the `Arc` held inside; readers clone it out and never
/// see a partially written snapshot. Cloning the handle shares the same slot.
#[derive(Clone)]
pub struct SpectrogramSource {
    shared: Arc<Shared>,
}

impl SpectrogramSource {
    /// Create a source with no snapshot yet.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                latest: RwLock::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Create a source that already holds a snapshot.
    pub fn with_snapshot(snapshot: SpectrogramSnapshot) -> Self {
        let source = Self::new();
        source.publish(snapshot);
        source
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: SpectrogramSnapshot) {
        self.publish_shared(Arc::new(snapshot));
    }

    /// Replace the current snapshot with an already shared one.
    pub fn publish_shared(&self, snapshot: Arc<SpectrogramSnapshot>) {
        *self.shared.latest.write() = Some(snapshot);
        let generation = self.shared.generation.fetch_add(1, Ordering::Relaxed) + 1;
        trace!(generation, "Published spectrogram snapshot");
    }

    /// Validate and publish raw samples.
    ///
    /// A malformed slice is rejected and the previous snapshot stays current.
    pub fn publish_samples(&self, samples: &[f32]) -> Result<(), SnapshotError> {
        match SpectrogramSnapshot::from_slice(samples) {
            Ok(snapshot) => {
                self.publish(snapshot);
                Ok(())
            }
            Err(e) => {
                warn!("Dropping malformed spectrogram data: {}", e);
                Err(e)
            }
        }
    }

    /// The most recently published snapshot, if any.
    pub fn latest(&self) -> Option<Arc<SpectrogramSnapshot>> {
        self.shared.latest.read().clone()
    }

    /// Whether a snapshot has been published since creation or the last clear.
    pub fn has_snapshot(&self) -> bool {
        self.shared.latest.read().is_some()
    }

    /// Drop the current snapshot.
    pub fn clear(&self) {
        *self.shared.latest.write() = None;
    }

    /// Number of successful publishes so far.
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Relaxed)
    }
}

impl Default for SpectrogramSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SpectrogramSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrogramSource")
            .field("has_snapshot", &self.has_snapshot())
            .field("generation", &self.generation())
            .finish()
    }
}
