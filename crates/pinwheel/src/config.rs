use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use spokes::menu::{MAX_MENU_RADIUS, MenuTheme, Settings};
use std::path::PathBuf;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

/// How child items are stacked relative to their parents.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Stacking {
    #[default]
    #[strum(serialize = "above", serialize = "over", serialize = "top")]
    Above,
    #[strum(serialize = "below", serialize = "under", serialize = "bottom")]
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub max_menu_radius: f64,
    pub stacking: Stacking,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            max_menu_radius: MAX_MENU_RADIUS,
            stacking: Stacking::default(),
        }
    }
}

impl MenuTheme for ThemeConfig {
    fn max_menu_radius(&self) -> f64 {
        self.max_menu_radius
    }

    fn draw_children_below(&self) -> bool {
        self.stacking == Stacking::Below
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub menu: Settings,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            menu: Settings::default(),
            theme: ThemeConfig::default(),
            socket_path: default_socket_path(),
        }
    }
}

fn default_socket_path() -> PathBuf {
    PathBuf::from(spokes::SOCKET_PATH)
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "pinwheel", "pinwheel").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(
            config::Environment::with_prefix("PINWHEEL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", ConfigError::from(e));
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    log::debug!("Watching {}", config_path.display());

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stacking_deserialization() {
        let cases = vec![
            ("\"above\"", Stacking::Above),
            ("\"Above\"", Stacking::Above),
            ("\"over\"", Stacking::Above),
            ("\"BELOW\"", Stacking::Below),
            ("\"under\"", Stacking::Below),
            ("\"bottom\"", Stacking::Below),
        ];

        for (json, expected) in cases {
            let deserialized: Stacking = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
        assert!(serde_json::from_str::<Stacking>("\"sideways\"").is_err());
    }

    #[test]
    fn test_partial_config() {
        let config: Config = serde_json::from_str(
            r#"{ "menu": { "center_radius": 35 }, "theme": { "stacking": "below" } }"#,
        )
        .unwrap();

        assert_eq!(config.menu.center_radius, 35.0);
        assert_eq!(config.menu.parent_distance, Settings::default().parent_distance);
        assert_eq!(config.theme.max_menu_radius, MAX_MENU_RADIUS);
        assert!(config.theme.draw_children_below());
        assert_eq!(config.socket_path, PathBuf::from(spokes::SOCKET_PATH));
    }

    #[test]
    fn test_default_config_file_matches_defaults() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config, Config::default());
        assert!(!config.theme.draw_children_below());
    }
}
