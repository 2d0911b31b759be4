//! Player data lookup with an explicitly invalidated cache

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The parts of the player's profile platforms care about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    pub player_id: String,
    pub player_name: String,
    /// Player asked for static lights; platforms skip light effects
    #[serde(default)]
    pub static_lights: bool,
    #[serde(default)]
    pub left_handed: bool,
}

/// Somewhere player data can be found.
pub trait PlayerDataProvider {
    /// The first player data instance available, if any
    fn find_player_data(&self) -> Option<PlayerData>;
}

/// Reads player data from a TOML profile on disk
#[derive(Debug, Clone)]
pub struct LocalPlayerDataProvider {
    path: PathBuf,
}

impl LocalPlayerDataProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Provider for `<local data dir>/custom-platforms/player.toml`
    pub fn from_default_location() -> Result<Self> {
        let path = dirs::data_local_dir()
            .context("Could not determine local data directory")?
            .join("custom-platforms")
            .join("player.toml");
        Ok(Self::new(path))
    }

    fn read(&self) -> Result<PlayerData> {
        let content = fs::read_to_string(&self.path).context("Failed to read player data file")?;
        let data = toml::from_str(&content).context("Failed to parse player data file")?;
        Ok(data)
    }
}

impl PlayerDataProvider for LocalPlayerDataProvider {
    fn find_player_data(&self) -> Option<PlayerData> {
        if !self.path.exists() {
            debug!("No player data at {:?}", self.path);
            return None;
        }
        match self.read() {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("{:#}", e);
                None
            }
        }
    }
}

/// Lazily resolved player data.
///
/// A successful lookup is cached until [`invalidate`](Self::invalidate); a
/// failed lookup is retried on the next access.
pub struct PlayerDataCache<P: PlayerDataProvider> {
    provider: P,
    cached: Option<PlayerData>,
}

impl<P: PlayerDataProvider> PlayerDataCache<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            cached: None,
        }
    }

    /// Look the data up now, replacing any cached value
    pub fn initialize(&mut self) -> Option<&PlayerData> {
        self.cached = self.provider.find_player_data();
        self.cached.as_ref()
    }

    /// Cached data, looking it up first if needed
    pub fn get(&mut self) -> Option<&PlayerData> {
        if self.cached.is_none() {
            self.cached = self.provider.find_player_data();
        }
        self.cached.as_ref()
    }

    /// Forget the cached data; call before relying on it again
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
