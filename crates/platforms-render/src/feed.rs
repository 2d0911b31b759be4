//! Per-frame spectrogram to material uniform feed

use std::sync::Arc;

use platforms_audio::SpectrogramSource;
use platforms_core::UniformBinding;
use tracing::{debug, trace};

use crate::material::ShaderParams;
use crate::renderer::{MaterialSurface, RenderObject};

/// Result of one [`SpectrogramFeed::tick`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// No renderer bound or no snapshot available; nothing was written.
    NotReady,
    /// Both uniforms were written to `materials` materials.
    Written { materials: usize, average: f32 },
}

/// Pushes the latest spectrogram snapshot into the shader uniforms of every
/// material on a renderer, once per render tick.
///
/// The feed is armed once [`bind_renderer`](Self::bind_renderer) has found a
/// renderer. Ticks re-push the snapshot every frame whether or not it
/// changed, and re-enumerate the renderer's materials each time so swapped
/// materials pick up the data on the very next tick.
pub struct SpectrogramFeed {
    binding: UniformBinding,
    renderer: Option<Arc<dyn MaterialSurface>>,
    source: Option<SpectrogramSource>,
}

impl SpectrogramFeed {
    pub fn new(binding: UniformBinding) -> Self {
        Self {
            binding,
            renderer: None,
            source: None,
        }
    }

    /// Resolve and store the object's renderer. Calling again re-resolves.
    pub fn bind_renderer(&mut self, object: &dyn RenderObject) {
        self.renderer = object.renderer();
        debug!(
            armed = self.renderer.is_some(),
            array = self.binding.array_key(),
            average = self.binding.average_key(),
            "Spectrogram feed bound"
        );
    }

    /// Install or clear the snapshot provider.
    pub fn set_source(&mut self, source: Option<SpectrogramSource>) {
        self.source = source;
    }

    /// Write the current snapshot to every attached material.
    pub fn tick(&self) -> TickOutcome {
        let Some(renderer) = &self.renderer else {
            trace!("Spectrogram feed not armed, skipping tick");
            return TickOutcome::NotReady;
        };
        let Some(snapshot) = self.source.as_ref().and_then(SpectrogramSource::latest) else {
            trace!("No spectrogram snapshot yet, skipping tick");
            return TickOutcome::NotReady;
        };

        let average = snapshot.average();
        let samples = snapshot.samples();

        let mut materials = 0;
        renderer.for_each_material(&mut |params: &mut dyn ShaderParams| {
            params.set_float_array(self.binding.array_key(), samples);
            params.set_float(self.binding.average_key(), average);
            materials += 1;
        });

        trace!(materials, average, "Spectrogram uniforms written");
        TickOutcome::Written { materials, average }
    }

    /// Whether a renderer is bound
    pub fn is_armed(&self) -> bool {
        self.renderer.is_some()
    }

    pub fn binding(&self) -> &UniformBinding {
        &self.binding
    }

    pub fn source(&self) -> Option<&SpectrogramSource> {
        self.source.as_ref()
    }
}
