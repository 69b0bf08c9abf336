use crate::events::AppEvent;
use crate::geometry::Viewport;
use crate::menu::{ItemId, ItemLabel, ShellCommand};
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ItemConfig {
    pub id: ItemId,
    pub label: ItemLabel,
    pub description: Option<String>,
    pub exec: ShellCommand,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub orbit_radius: f64,
    pub item_size: f64,
    /// Anchor side length; measured by the host when unset.
    pub anchor_size: Option<f64>,
    pub anchor_icon_size: f64,
    pub item_icon_size: f64,
    pub drag_threshold: f64,
    pub hover_scale: f64,
    pub toggle_cooldown_ms: u64,
    pub viewport: Option<Viewport>,
    pub items: Vec<ItemConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            orbit_radius: 120.0,
            item_size: 48.0,
            anchor_size: None,
            anchor_icon_size: 28.0,
            item_icon_size: 24.0,
            drag_threshold: crate::drag::DEFAULT_DRAG_THRESHOLD,
            hover_scale: 1.15,
            toggle_cooldown_ms: crate::arbiter::DEFAULT_TOGGLE_COOLDOWN.as_millis() as u64,
            viewport: None,
            items: Vec::new(),
        }
    }
}

impl Config {
    pub fn toggle_cooldown(&self) -> Duration {
        Duration::from_millis(self.toggle_cooldown_ms)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Where the config file lives. The whole directory is watched because editors
/// often replace the file instead of writing it in place.
#[derive(Debug, Clone, PartialEq)]
struct ConfigLocation {
    dir: PathBuf,
    file: PathBuf,
}

impl ConfigLocation {
    fn resolve() -> Result<Self, ConfigError> {
        let proj_dirs =
            ProjectDirs::from("org", "orbit", "orbit").ok_or(ConfigError::ConfigDirNotFound)?;
        Ok(Self::in_dir(proj_dirs.config_dir()))
    }

    fn in_dir(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            file: dir.join("config.toml"),
        }
    }

    /// Whether `event` may have changed what `load_config` would return.
    fn touched_by(&self, event: &notify::Event) -> bool {
        let changed = matches!(
            event.kind,
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
        );
        changed && event.paths.iter().any(|p| p == &self.file)
    }
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    Ok(ConfigLocation::resolve()?.file)
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("ORBIT"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Falling back to default config: {}", e);
            Config::default()
        }
    }
}

/// Seeds the config file with the bundled defaults unless one already exists.
pub fn write_default_config() -> Result<PathBuf, ConfigError> {
    let location = ConfigLocation::resolve()?;
    fs_err::create_dir_all(&location.dir)?;
    if !location.file.exists() {
        fs_err::write(&location.file, DEFAULT_CONFIG)?;
        log::info!("Wrote default config to {}", location.file.display());
    }
    Ok(location.file)
}

/// Sends `AppEvent::ConfigReload` whenever the config file changes on disk.
/// Runs until the receiving side of `tx` is dropped.
pub async fn watch_for_reloads(tx: Sender<AppEvent>) {
    if let Err(e) = forward_reloads(&tx).await {
        log::error!("Config reloading disabled: {}", e);
    }
}

async fn forward_reloads(tx: &Sender<AppEvent>) -> Result<(), ConfigError> {
    let location = ConfigLocation::resolve()?;
    fs_err::create_dir_all(&location.dir)?;

    let (fs_tx, fs_rx) = async_channel::unbounded();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = fs_tx.send_blocking(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(&location.dir, RecursiveMode::NonRecursive)?;
    log::debug!("Watching {} for config changes", location.dir.display());

    while let Ok(res) = fs_rx.recv().await {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Config watch error: {}", e);
                continue;
            }
        };
        if !location.touched_by(&event) {
            continue;
        }
        if tx.send(AppEvent::ConfigReload).await.is_err() {
            break;
        }
    }
    Ok(())
}
