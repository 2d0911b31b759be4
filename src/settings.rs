//! Plugin settings with persistence
//!
//! Settings are saved to `~/.config/custom-platforms/settings.toml`. Values
//! are read through a [`ConfigStore`] and cached by [`PluginSettings`] until
//! explicitly invalidated.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

/// Section holding every plugin toggle
pub const SETTINGS_SECTION: &str = "Settings";

/// Hover hint for the load-custom-scripts toggle
pub const LOADING_CUSTOM_SCRIPTS_TEXT: &str =
    "Loading Custom Scripts \nUse this at your own risk! \nOnly use scripts of trusted sources!";

/// Hover hint for the use-in-360 toggle
pub const USE_IN_360_TEXT: &str =
    "Toggle if Custom Platforms is used in 360°-Levels \n!Not supported!";

/// Hover hint for the use-in-multiplayer toggle
pub const USE_IN_MULTIPLAYER_TEXT: &str =
    "Toggle if Custom Platforms is used in Multiplayer \n!Not supported!";

/// Key-value configuration backing the settings.
pub trait ConfigStore {
    /// Read a boolean. If the key is missing, returns `default` and, when
    /// `write_default` is set, stores it.
    fn get_bool(&mut self, section: &str, key: &str, default: bool, write_default: bool) -> bool;

    /// Store a boolean
    fn set_bool(&mut self, section: &str, key: &str, value: bool);
}

/// Config store kept in memory and persisted as TOML
#[derive(Debug, Clone, Default)]
pub struct TomlConfigStore {
    path: Option<PathBuf>,
    sections: BTreeMap<String, BTreeMap<String, bool>>,
}

impl TomlConfigStore {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("custom-platforms"))
    }

    /// A store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from the default settings file, or start empty if not found
    pub fn load() -> Self {
        let Some(dir) = Self::config_dir() else {
            warn!("Could not determine config directory");
            return Self::in_memory();
        };
        Self::load_from(dir.join("settings.toml"))
    }

    /// Load from `path`, or start empty if it is missing or unreadable.
    /// The path is remembered for [`save`](Self::save).
    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let sections = if !path.exists() {
            info!("No settings file found, using defaults");
            BTreeMap::new()
        } else {
            match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(sections) => {
                        info!("Loaded settings from {:?}", path);
                        sections
                    }
                    Err(e) => {
                        warn!("Failed to parse settings: {}, using defaults", e);
                        BTreeMap::new()
                    }
                },
                Err(e) => {
                    warn!("Failed to read settings file: {}, using defaults", e);
                    BTreeMap::new()
                }
            }
        };

        Self {
            path: Some(path),
            sections,
        }
    }

    /// Save to the file this store was loaded from
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            anyhow::bail!("Settings store has no file to save to");
        };

        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(&self.sections)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Look up a value without writing defaults
    pub fn peek_bool(&self, section: &str, key: &str) -> Option<bool> {
        self.sections.get(section)?.get(key).copied()
    }
}

impl ConfigStore for TomlConfigStore {
    fn get_bool(&mut self, section: &str, key: &str, default: bool, write_default: bool) -> bool {
        if let Some(value) = self.peek_bool(section, key) {
            return value;
        }
        if write_default {
            self.set_bool(section, key, default);
        }
        default
    }

    fn set_bool(&mut self, section: &str, key: &str, value: bool) {
        self.sections
            .entry(section.to_owned())
            .or_default()
            .insert(key.to_owned(), value);
    }
}

const TOGGLE_COUNT: usize = 5;

/// The plugin's boolean toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    /// Show the feet icon even where the platform would hide it
    AlwaysShowFeet,
    /// Show the heart next to the logo
    ShowHeart,
    /// Load custom scripts shipped with platforms
    LoadCustomScripts,
    /// Spawn platforms in 360° levels
    UseIn360,
    /// Spawn platforms in multiplayer
    UseInMultiplayer,
}

impl Toggle {
    pub const ALL: [Toggle; TOGGLE_COUNT] = [
        Toggle::AlwaysShowFeet,
        Toggle::ShowHeart,
        Toggle::LoadCustomScripts,
        Toggle::UseIn360,
        Toggle::UseInMultiplayer,
    ];

    /// Key in the settings section
    pub fn key(self) -> &'static str {
        match self {
            Toggle::AlwaysShowFeet => "AlwaysShowFeet",
            Toggle::ShowHeart => "ShowHeart",
            Toggle::LoadCustomScripts => "LoadCustomScripts",
            Toggle::UseIn360 => "UseIn360",
            Toggle::UseInMultiplayer => "UseInMultiplayer",
        }
    }

    pub fn default_value(self) -> bool {
        matches!(self, Toggle::ShowHeart)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Typed, cached view of the plugin toggles.
///
/// Each toggle is read from the store on first access and cached. Setting a
/// toggle to a new value writes it through to the store; setting the current
/// value does nothing. Call [`invalidate`](Self::invalidate) after the store
/// changes underneath.
pub struct PluginSettings<S: ConfigStore> {
    store: S,
    cache: [Option<bool>; TOGGLE_COUNT],
    show_heart_listeners: Vec<Box<dyn FnMut(bool)>>,
    platform_reload: Option<Box<dyn FnMut()>>,
}

impl<S: ConfigStore> PluginSettings<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: [None; TOGGLE_COUNT],
            show_heart_listeners: Vec::new(),
            platform_reload: None,
        }
    }

    /// Read every toggle into the cache now
    pub fn initialize(&mut self) {
        for toggle in Toggle::ALL {
            self.get(toggle);
        }
        debug!("Settings cache initialized");
    }

    /// Drop the cache; the next access re-reads the store
    pub fn invalidate(&mut self) {
        self.cache = [None; TOGGLE_COUNT];
        debug!("Settings cache invalidated");
    }

    /// Current value of a toggle
    pub fn get(&mut self, toggle: Toggle) -> bool {
        if let Some(value) = self.cache[toggle.index()] {
            return value;
        }
        let value =
            self.store
                .get_bool(SETTINGS_SECTION, toggle.key(), toggle.default_value(), true);
        self.cache[toggle.index()] = Some(value);
        value
    }

    /// Change a toggle, notifying listeners if the value actually changed
    pub fn set(&mut self, toggle: Toggle, value: bool) {
        if self.get(toggle) == value {
            return;
        }
        self.store.set_bool(SETTINGS_SECTION, toggle.key(), value);
        self.cache[toggle.index()] = Some(value);

        match toggle {
            Toggle::ShowHeart => {
                info!(
                    "ShowHeart value changed, notifying {} listeners. New value: {}",
                    self.show_heart_listeners.len(),
                    value
                );
                for listener in &mut self.show_heart_listeners {
                    listener(value);
                }
            }
            Toggle::LoadCustomScripts => {
                info!("LoadCustomScripts changed to {}, reloading platform", value);
                if let Some(reload) = &mut self.platform_reload {
                    reload();
                }
            }
            _ => {}
        }
    }

    /// Register a listener for show-heart changes
    pub fn on_show_heart_changed(&mut self, listener: impl FnMut(bool) + 'static) {
        self.show_heart_listeners.push(Box::new(listener));
    }

    /// Install the trigger used to reload the current platform
    pub fn set_platform_reload(&mut self, reload: impl FnMut() + 'static) {
        self.platform_reload = Some(Box::new(reload));
    }

    pub fn always_show_feet(&mut self) -> bool {
        self.get(Toggle::AlwaysShowFeet)
    }

    pub fn set_always_show_feet(&mut self, value: bool) {
        self.set(Toggle::AlwaysShowFeet, value);
    }

    pub fn show_heart(&mut self) -> bool {
        self.get(Toggle::ShowHeart)
    }

    pub fn set_show_heart(&mut self, value: bool) {
        self.set(Toggle::ShowHeart, value);
    }

    pub fn load_custom_scripts(&mut self) -> bool {
        self.get(Toggle::LoadCustomScripts)
    }

    pub fn set_load_custom_scripts(&mut self, value: bool) {
        self.set(Toggle::LoadCustomScripts, value);
    }

    pub fn use_in_360(&mut self) -> bool {
        self.get(Toggle::UseIn360)
    }

    pub fn set_use_in_360(&mut self, value: bool) {
        self.set(Toggle::UseIn360, value);
    }

    pub fn use_in_multiplayer(&mut self) -> bool {
        self.get(Toggle::UseInMultiplayer)
    }

    pub fn set_use_in_multiplayer(&mut self, value: bool) {
        self.set(Toggle::UseInMultiplayer, value);
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Wraps a store and counts reads and writes
    #[derive(Default)]
    struct CountingStore {
        inner: TomlConfigStore,
        reads: usize,
        writes: usize,
    }

    impl ConfigStore for CountingStore {
        fn get_bool(
            &mut self,
            section: &str,
            key: &str,
            default: bool,
            write_default: bool,
        ) -> bool {
            self.reads += 1;
            self.inner.get_bool(section, key, default, write_default)
        }

        fn set_bool(&mut self, section: &str, key: &str, value: bool) {
            self.writes += 1;
            self.inner.set_bool(section, key, value);
        }
    }

    #[test]
    fn defaults() {
        let mut settings = PluginSettings::new(TomlConfigStore::in_memory());
        assert!(!settings.always_show_feet());
        assert!(settings.show_heart());
        assert!(!settings.load_custom_scripts());
        assert!(!settings.use_in_360());
        assert!(!settings.use_in_multiplayer());
    }

    #[test]
    fn first_read_writes_default_back() {
        let mut settings = PluginSettings::new(TomlConfigStore::in_memory());
        assert_eq!(settings.store().peek_bool(SETTINGS_SECTION, "ShowHeart"), None);
        settings.show_heart();
        assert_eq!(
            settings.store().peek_bool(SETTINGS_SECTION, "ShowHeart"),
            Some(true)
        );
    }

    #[test]
    fn reads_are_cached_until_invalidated() {
        let mut store = CountingStore::default();
        store.inner.set_bool(SETTINGS_SECTION, "UseIn360", true);

        let mut settings = PluginSettings::new(store);
        assert!(settings.use_in_360());
        assert!(settings.use_in_360());
        assert_eq!(settings.store().reads, 1);

        settings.invalidate();
        assert!(settings.use_in_360());
        assert_eq!(settings.store().reads, 2);
    }

    #[test]
    fn initialize_reads_everything_once() {
        let mut settings = PluginSettings::new(CountingStore::default());
        settings.initialize();
        assert_eq!(settings.store().reads, Toggle::ALL.len());

        for toggle in Toggle::ALL {
            settings.get(toggle);
        }
        assert_eq!(settings.store().reads, Toggle::ALL.len());
        // Defaults were written back on first read
        assert!(Toggle::ALL
            .iter()
            .all(|t| settings.store().inner.peek_bool(SETTINGS_SECTION, t.key()).is_some()));
    }

    #[test]
    fn set_writes_only_on_change() {
        let mut settings = PluginSettings::new(CountingStore::default());
        settings.set_use_in_multiplayer(false);
        assert_eq!(settings.store().writes, 0);

        settings.set_use_in_multiplayer(true);
        assert_eq!(settings.store().writes, 1);
        assert!(settings.use_in_multiplayer());
        assert_eq!(
            settings.store().inner.peek_bool(SETTINGS_SECTION, "UseInMultiplayer"),
            Some(true)
        );
    }

    #[test]
    fn show_heart_listeners_fire_on_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut settings = PluginSettings::new(TomlConfigStore::in_memory());
        let log = seen.clone();
        settings.on_show_heart_changed(move |value| log.borrow_mut().push(value));

        settings.set_show_heart(true);
        settings.set_show_heart(false);
        settings.set_show_heart(false);
        settings.set_show_heart(true);
        assert_eq!(*seen.borrow(), vec![false, true]);
    }

    #[test]
    fn load_custom_scripts_triggers_reload() {
        let reloads = Rc::new(Cell::new(0));
        let mut settings = PluginSettings::new(TomlConfigStore::in_memory());
        let counter = reloads.clone();
        settings.set_platform_reload(move || counter.set(counter.get() + 1));

        settings.set_load_custom_scripts(false);
        assert_eq!(reloads.get(), 0);
        settings.set_load_custom_scripts(true);
        assert_eq!(reloads.get(), 1);
        settings.set_always_show_feet(true);
        assert_eq!(reloads.get(), 1);
    }

    #[test]
    fn toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut settings = PluginSettings::new(TomlConfigStore::load_from(&path));
        settings.set_always_show_feet(true);
        settings.set_show_heart(false);
        settings.store().save().unwrap();

        let mut reloaded = PluginSettings::new(TomlConfigStore::load_from(&path));
        assert!(reloaded.always_show_feet());
        assert!(!reloaded.show_heart());
    }

    #[test]
    fn unparseable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "this is not = [toml").unwrap();

        let mut settings = PluginSettings::new(TomlConfigStore::load_from(&path));
        assert!(settings.show_heart());
    }

    #[test]
    fn in_memory_store_cannot_save() {
        assert!(TomlConfigStore::in_memory().save().is_err());
    }
}
