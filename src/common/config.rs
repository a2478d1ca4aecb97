//! User configuration, read from `~/.config/rift-switcher/config.toml`.
//!
//! Every key is optional; a missing file means the defaults.

use std::path::{Path, PathBuf};
use std::{fs, io};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::sys::geometry::Size;
use crate::sys::hotkey::SymbolicHotKey;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub settings: Settings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub switcher: SwitcherSettings,
    pub discovery: DiscoverySettings,
    pub hotkeys: HotkeySettings,
}

/// Upper bound for grid columns and rows.
pub const MAX_GRID_DIMENSION: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwitcherSettings {
    /// Icons per row in the overlay grid.
    pub columns: usize,
    /// Rows per page. A page holds `columns * rows` windows.
    pub rows: usize,
    pub icon_size: f64,
    pub icon_spacing: f64,
    pub preview: PreviewSettings,
}

impl Default for SwitcherSettings {
    fn default() -> Self {
        Self {
            columns: 8,
            rows: 4,
            icon_size: 70.0,
            icon_spacing: 15.0,
            preview: PreviewSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewSettings {
    pub enabled: bool,
    pub width: f64,
    pub height: f64,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 200.0,
            height: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoverySettings {
    /// Applications whose name contains any of these strings are skipped.
    pub excluded_apps: Vec<String>,
    /// Probe hidden accessibility elements with remote tokens.
    pub brute_force: bool,
    /// Element ids `0..brute_force_limit` are tried per application.
    pub brute_force_limit: u64,
    /// Windows must be strictly larger than this unless their title is
    /// meaningful.
    pub min_size: Size,
    /// Bounds used for titled windows that report no usable size.
    pub fallback_size: Size,
    /// Titles that do not count as meaningful.
    pub placeholder_titles: Vec<String>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            excluded_apps: DEFAULT_EXCLUDED_APPS.iter().map(|s| s.to_string()).collect(),
            brute_force: true,
            brute_force_limit: 500,
            min_size: Size::new(50.0, 30.0),
            fallback_size: Size::new(800.0, 600.0),
            placeholder_titles: vec!["Window".into(), "Untitled".into()],
        }
    }
}

const DEFAULT_EXCLUDED_APPS: &[&str] = &[
    "Window Server",
    "WindowServer",
    "Dock",
    "SystemUIServer",
    "ControlCenter",
    "NotificationCenter",
    "TextInputMenuAgent",
    "TextInputSwitcher",
    "Spotlight",
    "Siri",
    "VoiceOver",
    "AXVisualSupportAgent",
    "UniversalAccessAuthWarn",
    "WiFiAgent",
    "UserEventAgent",
    "CommCenter",
    "ReportCrash",
    "CrashReporter",
    "Problem Reporter",
    "loginwindow",
    "SecurityAgent",
    "ScreenSaverEngine",
    "rift-switcher",
    "Steam Helper",
    "CleanMyMac",
    "Raycast",
    "Alfred",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HotkeySettings {
    /// Turn off the system application switcher while running.
    pub disable_native: bool,
    pub native: Vec<SymbolicHotKey>,
}

impl Default for HotkeySettings {
    fn default() -> Self {
        Self {
            disable_native: true,
            native: SymbolicHotKey::iter().collect(),
        }
    }
}

pub fn config_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("rift-switcher").join("config.toml"))
}

impl Config {
    pub fn parse(text: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn read(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Loads `path` if given (it must exist), otherwise the default config
    /// file if there is one, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = path {
            info!(path = %path.display(), "loading config");
            return Self::read(path);
        }
        match config_file() {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "loading config");
                Self::read(&path)
            }
            other => {
                debug!(?other, "no config file; using defaults");
                Ok(Config::default())
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let switcher = &self.settings.switcher;
        if !(1..=MAX_GRID_DIMENSION).contains(&switcher.columns)
            || !(1..=MAX_GRID_DIMENSION).contains(&switcher.rows)
        {
            return Err(ConfigError::Invalid(format!(
                "settings.switcher.columns and rows must be between 1 and {MAX_GRID_DIMENSION}"
            )));
        }
        if !(switcher.icon_size > 0.0) || switcher.icon_spacing < 0.0 {
            return Err(ConfigError::Invalid(
                "settings.switcher.icon_size must be positive and icon_spacing non-negative"
                    .into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_file_is_the_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn defaults_match_the_stock_switcher() {
        let config = Config::default();
        let switcher = &config.settings.switcher;
        assert_eq!((switcher.columns, switcher.rows), (8, 4));
        assert_eq!((switcher.icon_size, switcher.icon_spacing), (70.0, 15.0));
        assert!(switcher.preview.enabled);

        let discovery = &config.settings.discovery;
        assert!(discovery.brute_force);
        assert_eq!(discovery.brute_force_limit, 500);
        assert_eq!(discovery.min_size, Size::new(50.0, 30.0));
        assert_eq!(discovery.fallback_size, Size::new(800.0, 600.0));
        assert!(discovery.excluded_apps.iter().any(|a| a == "Dock"));

        assert_eq!(config.settings.hotkeys.native, vec![
            SymbolicHotKey::CommandTab,
            SymbolicHotKey::CommandShiftTab,
            SymbolicHotKey::CommandKeyAboveTab,
        ]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::parse(
            r#"
            [settings.switcher]
            columns = 6

            [settings.switcher.preview]
            enabled = false

            [settings.discovery]
            excluded_apps = ["Finder"]
            min_size = { width = 100.0, height = 80.0 }

            [settings.hotkeys]
            native = ["command_tab"]
            "#,
        )
        .unwrap();

        let switcher = &config.settings.switcher;
        assert_eq!(switcher.columns, 6);
        assert_eq!(switcher.rows, 4);
        assert!(!switcher.preview.enabled);
        assert_eq!(switcher.preview.width, 200.0);
        assert_eq!(config.settings.discovery.excluded_apps, vec!["Finder".to_string()]);
        assert_eq!(config.settings.discovery.min_size, Size::new(100.0, 80.0));
        assert!(config.settings.discovery.brute_force);
        assert_eq!(config.settings.hotkeys.native, vec![SymbolicHotKey::CommandTab]);
        assert!(config.settings.hotkeys.disable_native);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = Config::parse("[settings.switcher]\ncolums = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err:?}");
    }

    #[test]
    fn rejects_empty_grid() {
        let err = Config::parse("[settings.switcher]\nrows = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err:?}");
    }

    #[test]
    fn rejects_oversized_grid() {
        let err = Config::parse("[settings.switcher]\ncolumns = 4294967296\nrows = 4294967296\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err:?}");
        assert!(Config::parse("[settings.switcher]\ncolumns = 65\n").is_err());

        let config = Config::parse("[settings.switcher]\ncolumns = 64\nrows = 64\n").unwrap();
        assert_eq!(config.settings.switcher.columns * config.settings.switcher.rows, 4096);
    }

    #[test]
    fn rejects_non_positive_icon_size() {
        let err = Config::parse("[settings.switcher]\nicon_size = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err:?}");
    }

    #[test]
    fn loads_an_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[settings.discovery]\nbrute_force = false").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert!(!config.settings.discovery.brute_force);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }), "{err:?}");
        let message = err.to_string();
        assert!(message.starts_with("could not read config file "), "{message}");
        assert!(message.contains(&*path.to_string_lossy()), "{message}");
    }

    #[test]
    fn default_location_is_optional() {
        let home = tempfile::tempdir().unwrap();
        // Only this test reads HOME.
        unsafe { std::env::set_var("HOME", home.path()) };

        let path = config_file().unwrap();
        assert!(path.starts_with(home.path()));
        assert_eq!(Config::load(None).unwrap(), Config::default());

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[settings.switcher]\nrows = 2\n").unwrap();
        assert_eq!(Config::load(None).unwrap().settings.switcher.rows, 2);
    }
}
