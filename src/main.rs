//! Custom Platforms - audio-reactive platform runtime
//!
//! Runs a render loop that feeds a live audio spectrum into the shader
//! uniforms of the current platform's materials.

mod cli;
mod player_data;
mod settings;

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rand::Rng;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use platforms_audio::{BandConfig, BandProcessor, SpectrogramSource};
use platforms_core::UniformBinding;
use platforms_render::{Material, MeshRenderer, SceneObject, SpectrogramFeed, TickOutcome};

use cli::Args;
use player_data::{LocalPlayerDataProvider, PlayerData, PlayerDataCache};
use settings::{
    PluginSettings, TomlConfigStore, LOADING_CUSTOM_SCRIPTS_TEXT, USE_IN_360_TEXT,
    USE_IN_MULTIPLAYER_TEXT,
};

/// Target render frame time (60 fps)
const FRAME_TIME: Duration = Duration::from_micros(16_667);
/// Audio analysis cadence (1024 samples at 44.1 kHz)
const AUDIO_FRAME_TIME: Duration = Duration::from_millis(23);
/// Raw FFT bins produced per audio frame
const FFT_BINS: usize = 512;
/// Log feed status every this many frames
const LOG_INTERVAL: u64 = 120;

/// Application state
struct PlatformsApp {
    platform: SceneObject,
    feed: SpectrogramFeed,
    source: SpectrogramSource,
    player_data: Option<PlayerDataCache<LocalPlayerDataProvider>>,
    reload_requested: Rc<Cell<bool>>,
}

impl PlatformsApp {
    fn new(args: &Args, source: SpectrogramSource, reload_requested: Rc<Cell<bool>>) -> Self {
        let materials = (0..args.materials)
            .map(|i| Material::new(format!("PlatformSpectrogram{}", i)))
            .collect();
        let renderer = Arc::new(MeshRenderer::new(materials));
        let platform = SceneObject::with_renderer("CustomPlatform", renderer);

        let binding = UniformBinding::new(&args.array_uniform, &args.average_uniform);

        let player_data = match LocalPlayerDataProvider::from_default_location() {
            Ok(provider) => Some(PlayerDataCache::new(provider)),
            Err(e) => {
                warn!("Player data unavailable: {:#}", e);
                None
            }
        };

        Self {
            platform,
            feed: SpectrogramFeed::new(binding),
            source,
            player_data,
            reload_requested,
        }
    }

    /// Bind the feed to the platform for the first time
    fn activate(&mut self) {
        let static_lights =
            player_prefers_static_lights(self.player_data.as_mut().and_then(|c| c.initialize()));
        self.attach_feed(static_lights);
    }

    /// Re-resolve everything the platform depends on
    fn reload_platform(&mut self) {
        info!("Reloading platform '{}'", self.platform.name());
        let static_lights = match &mut self.player_data {
            Some(cache) => {
                cache.invalidate();
                player_prefers_static_lights(cache.get())
            }
            None => false,
        };
        self.attach_feed(static_lights);
    }

    fn attach_feed(&mut self, static_lights: bool) {
        self.feed.bind_renderer(&self.platform);
        if static_lights {
            info!("Player prefers static lights, spectrogram feed disabled");
            self.feed.set_source(None);
        } else {
            self.feed.set_source(Some(self.source.clone()));
        }
    }

    /// Snapshots the producer has published, whether or not the feed reads them
    fn published_snapshots(&self) -> u64 {
        self.source.generation()
    }

    fn update(&mut self) -> TickOutcome {
        if self.reload_requested.replace(false) {
            self.reload_platform();
        }
        self.feed.tick()
    }
}

/// Log who is playing and whether they asked for static lights
fn player_prefers_static_lights(player: Option<&PlayerData>) -> bool {
    let Some(player) = player else {
        info!("No player data found, using default lighting");
        return false;
    };
    info!(
        player_id = %player.player_id,
        player_name = %player.player_name,
        left_handed = player.left_handed,
        static_lights = player.static_lights,
        "Player data loaded"
    );
    player.static_lights
}

/// Spawn the audio analysis stand-in: a 120 bpm kick over a pink-ish noise
/// floor, folded into 64 bands and published every audio frame.
fn spawn_producer(source: SpectrogramSource, running: Arc<AtomicBool>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut processor = BandProcessor::new(BandConfig::default());
        let mut rng = rand::thread_rng();
        let mut magnitudes = vec![0.0f32; FFT_BINS];
        let start = Instant::now();

        while running.load(Ordering::Relaxed) {
            let t = start.elapsed().as_secs_f32();
            let kick = (1.0 - (t * 2.0).fract()).powi(3);
            for (bin, magnitude) in magnitudes.iter_mut().enumerate() {
                let falloff = 1.0 / (1.0 + bin as f32 * 0.02);
                *magnitude = kick * falloff + rng.gen_range(0.0..0.08);
            }
            source.publish(processor.process(&magnitudes));
            thread::sleep(AUDIO_FRAME_TIME);
        }
    })
}

fn apply_settings(settings: &mut PluginSettings<TomlConfigStore>, args: &Args) {
    if let Some(value) = args.always_show_feet {
        settings.set_always_show_feet(value);
    }
    if let Some(value) = args.show_heart {
        settings.set_show_heart(value);
    }
    if let Some(value) = args.load_custom_scripts {
        settings.set_load_custom_scripts(value);
    }
    if let Some(value) = args.use_in_360 {
        settings.set_use_in_360(value);
    }
    if let Some(value) = args.use_in_multiplayer {
        settings.set_use_in_multiplayer(value);
    }

    info!(
        always_show_feet = settings.always_show_feet(),
        show_heart = settings.show_heart(),
        load_custom_scripts = settings.load_custom_scripts(),
        use_in_360 = settings.use_in_360(),
        use_in_multiplayer = settings.use_in_multiplayer(),
        "Settings"
    );

    if settings.load_custom_scripts() {
        warn!("{}", LOADING_CUSTOM_SCRIPTS_TEXT);
    }
    if settings.use_in_360() {
        warn!("{}", USE_IN_360_TEXT);
    }
    if settings.use_in_multiplayer() {
        warn!("{}", USE_IN_MULTIPLAYER_TEXT);
    }
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    let args = Args::parse();
    info!("Starting Custom Platforms...");

    let reload_requested = Rc::new(Cell::new(false));
    let mut settings = PluginSettings::new(TomlConfigStore::load());
    settings.initialize();
    let reload = reload_requested.clone();
    settings.set_platform_reload(move || reload.set(true));
    settings.on_show_heart_changed(|visible| {
        info!("Heart is now {}", if visible { "visible" } else { "hidden" });
    });
    apply_settings(&mut settings, &args);

    let source = SpectrogramSource::new();
    let running = Arc::new(AtomicBool::new(true));
    let producer = spawn_producer(source.clone(), running.clone());

    let mut app = PlatformsApp::new(&args, source, reload_requested);
    app.activate();
    info!(
        "Platform '{}' ready, feed armed: {}",
        app.platform.name(),
        app.feed.is_armed()
    );

    for frame in 0..args.frames {
        let frame_start = Instant::now();

        let outcome = app.update();
        if frame % LOG_INTERVAL == 0 {
            match outcome {
                TickOutcome::Written { materials, average } => {
                    info!(frame, materials, average, "Spectrogram uniforms updated");
                }
                TickOutcome::NotReady => info!(frame, "Spectrogram feed waiting"),
            }
        }

        if let Some(remaining) = FRAME_TIME.checked_sub(frame_start.elapsed()) {
            thread::sleep(remaining);
        }
    }

    running.store(false, Ordering::Relaxed);
    producer
        .join()
        .map_err(|_| anyhow!("Spectrum producer thread panicked"))?;

    if let Some(renderer) = app.platform.mesh_renderer() {
        for material in renderer.materials() {
            match material.spectrum_uniforms(app.feed.binding()) {
                Some(block) => info!(
                    "Material '{}' uniform block: {} bytes, mean {:.3}",
                    material.name(),
                    block.as_bytes().len(),
                    block.average[0]
                ),
                None => info!("Material '{}' never received spectrum data", material.name()),
            }
        }
    }

    info!(
        "Published {} spectrogram snapshots",
        app.published_snapshots()
    );

    if let Err(e) = settings.store().save() {
        warn!("Failed to save settings: {:#}", e);
    }

    info!("Custom Platforms stopped");
    Ok(())
}
