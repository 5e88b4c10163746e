use crate::error::StatsError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GameStats {
    #[serde(default)]
    pub play_count: u32,
    #[serde(default)]
    pub favorite: bool,
}

/// Play counts and favorites keyed by rom name.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct StatsStore {
    #[serde(default)]
    games: BTreeMap<String, GameStats>,
    #[serde(skip)]
    path: PathBuf,
}

impl StatsStore {
    /// Opens the store at `path`; a missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, StatsError> {
        let mut store = match std::fs::read_to_string(path) {
            Ok(s) => toml::from_str::<StatsStore>(&s).map_err(|source| StatsError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no stats at {}, starting empty", path.display());
                StatsStore::default()
            }
            Err(source) => {
                return Err(StatsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        store.path = path.to_path_buf();
        Ok(store)
    }

    pub fn get(&self, rom: &str) -> Option<&GameStats> {
        self.games.get(rom)
    }

    pub fn play_count(&self, rom: &str) -> u32 {
        self.games.get(rom).map(|s| s.play_count).unwrap_or(0)
    }

    /// Bumps the play count of `rom` and returns the new value.
    pub fn record_play(&mut self, rom: &str) -> u32 {
        let stats = self.games.entry(rom.to_string()).or_default();
        stats.play_count += 1;
        stats.play_count
    }

    pub fn save(&self) -> Result<(), StatsError> {
        let io_err = |source| StatsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let s = toml::to_string_pretty(self)?;
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, s.as_bytes()).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}
