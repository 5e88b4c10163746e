use crate::catalog::View;
use crate::error::ConfigError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "arcade_frontend";
const CONFIG_FILE: &str = "config.toml";

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        ScreenConfig {
            width: 800,
            height: 600,
            fullscreen: true,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct FontConfig {
    pub path: Option<String>,
    pub title_size: u16,
    pub list_size: u16,
}

impl Default for FontConfig {
    fn default() -> Self {
        FontConfig {
            path: None,
            title_size: 40,
            list_size: 30,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct UiConfig {
    /// Used when the layout cannot derive a page size from the window height.
    pub page_size: usize,
    pub snapshot_delay_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            page_size: 15,
            snapshot_delay_ms: 500,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct EmulatorConfig {
    /// `%r` is the rom name, `%d` the rom path, `%p` the merged parameters.
    pub command: String,
    pub rom_path: String,
    pub params: String,
    /// Snapshot image path, `%r` is the rom name.
    pub snap: String,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            command: "mame %r".to_string(),
            rom_path: String::new(),
            params: "-skip_gameinfo".to_string(),
            snap: "/usr/share/games/mame/snap/%r.png".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct KeyConfig {
    pub exit: String,
    pub up: String,
    pub down: String,
    pub pgup: String,
    pub pgdown: String,
    pub select: String,
    pub back: String,
    pub showhide: String,
    pub reload: String,
    pub view: String,
    /// Modifier turning page keys into alphabetic jumps: shift, ctrl or alt.
    pub alphamod: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        KeyConfig {
            exit: "Escape".to_string(),
            up: "Up".to_string(),
            down: "Down".to_string(),
            pgup: "Left".to_string(),
            pgdown: "Right".to_string(),
            select: "Left Ctrl".to_string(),
            back: "Left Alt".to_string(),
            showhide: "1".to_string(),
            reload: "2".to_string(),
            view: "3".to_string(),
            alphamod: "shift".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Flat,
    Structured,
    Table,
    Database,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CatalogConfig {
    pub source: SourceKind,
    /// Game list file: `gamelist`, structured TOML or the TOML games table.
    pub games: String,
    /// SQLite database with a `games` table.
    pub database: String,
    /// Menu list file, only read by the flat source.
    pub menus: String,
    pub stats: String,
    pub view: View,
    /// Secondary name ordering for the favorites and most played views.
    pub sort_by_name: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            source: SourceKind::Database,
            games: "games.toml".to_string(),
            database: "games.db".to_string(),
            menus: "menulist".to_string(),
            stats: "stats.toml".to_string(),
            view: View::Genre,
            sort_by_name: true,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
    /// 0 = off, 1 = error, 2 = info, 3 = warning, 4 = debug
    pub loglevel: u8,
    pub screen: ScreenConfig,
    pub font: FontConfig,
    pub ui: UiConfig,
    pub emulator: EmulatorConfig,
    pub keys: KeyConfig,
    /// action name -> SDL game controller button name
    pub controller: HashMap<String, String>,
    pub catalog: CatalogConfig,
    #[serde(skip)]
    pub dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let mut controller = HashMap::new();
        controller.insert("up".to_string(), "dpup".to_string());
        controller.insert("down".to_string(), "dpdown".to_string());
        controller.insert("pgup".to_string(), "dpleft".to_string());
        controller.insert("pgdown".to_string(), "dpright".to_string());
        controller.insert("select".to_string(), "a".to_string());
        controller.insert("back".to_string(), "b".to_string());
        controller.insert("exit".to_string(), "back".to_string());
        Config {
            loglevel: 2,
            screen: ScreenConfig::default(),
            font: FontConfig::default(),
            ui: UiConfig::default(),
            emulator: EmulatorConfig::default(),
            keys: KeyConfig::default(),
            controller,
            catalog: CatalogConfig::default(),
            dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Returns `file` unchanged when absolute, otherwise relative to the
    /// config directory.
    pub fn resolve(&self, file: &str) -> PathBuf {
        let p = Path::new(file);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.dir.join(p)
        }
    }

    pub fn log_filter(&self) -> log::LevelFilter {
        match self.loglevel {
            0 => log::LevelFilter::Off,
            1 => log::LevelFilter::Error,
            2 => log::LevelFilter::Info,
            3 => log::LevelFilter::Warn,
            _ => log::LevelFilter::Debug,
        }
    }

    /// Font preference order: config -> FONT_PATH env -> common system fonts.
    pub fn font_path(&self) -> Option<PathBuf> {
        if let Some(p) = self.font.path.as_ref() {
            let resolved = self.resolve(p);
            if resolved.exists() {
                return Some(resolved);
            }
            warn!("font {} not found, falling back to system fonts", resolved.display());
        }
        std::env::var("FONT_PATH")
            .ok()
            .map(PathBuf::from)
            .filter(|p| p.exists())
            .or_else(|| {
                let candidates = [
                    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
                    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
                ];
                candidates
                    .iter()
                    .map(PathBuf::from)
                    .find(|p| p.exists())
            })
    }
}

pub fn user_config_dir() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let mut p = PathBuf::from(xdg);
        p.push(APP_DIR);
        Some(p)
    } else if let Some(home) = dirs::home_dir() {
        let mut p = home;
        p.push(".config");
        p.push(APP_DIR);
        Some(p)
    } else {
        None
    }
}

fn write_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, include_str!("../config.sample.toml"))?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

pub fn parse_config(contents: &str, path: &Path) -> Result<Config, ConfigError> {
    let cfg: Config = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if !cfg.emulator.command.contains("%r") {
        return Err(ConfigError::MissingPlaceholder(cfg.emulator.command));
    }
    Ok(cfg)
}

/// Loads `config.toml` from `dir`, writing the sample first when it does not
/// exist. A missing file after that falls back to defaults.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        if let Err(e) = write_default_config(&path) {
            warn!("failed to write default config {}: {}", path.display(), e);
        }
    }
    let mut cfg = match std::fs::read_to_string(&path) {
        Ok(contents) => parse_config(&contents, &path)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("config {} not found, using defaults", path.display());
            Config::default()
        }
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    cfg.dir = dir.to_path_buf();
    info!("loaded config from {}", dir.display());
    Ok(cfg)
}
