//! Builds the item tree shown by the frontend from one of the supported game
//! list formats.

mod database;
mod flat;
mod structured;
mod table;

pub use database::DatabaseSource;
pub use flat::FlatSource;
pub use structured::StructuredSource;
pub use table::TableSource;

use crate::config::{Config, SourceKind};
use crate::error::CatalogError;
use crate::item::{Game, Menu};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Leading character marking an item as hidden.
pub const HIDDEN_MARKER: char = '.';

/// Group name for games without a genre.
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Grouping policy applied when building the tree.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Genre,
    Favorites,
    MostPlayed,
}

impl View {
    pub fn next(self) -> View {
        match self {
            View::Genre => View::Favorites,
            View::Favorites => View::MostPlayed,
            View::MostPlayed => View::Genre,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Genre => "Genres",
            View::Favorites => "Favorites",
            View::MostPlayed => "Most Played",
        }
    }
}

pub trait CatalogSource {
    /// Builds a fresh root menu. A missing source yields an empty root, a
    /// malformed one an error.
    fn load(&self, view: View, show_hidden: bool) -> Result<Menu, CatalogError>;

    /// Counts a finished play of `rom` in the source itself. Returns false
    /// when the source keeps no counts and the stats store must.
    fn record_play(&self, _rom: &str) -> Result<bool, CatalogError> {
        Ok(false)
    }
}

/// Appends `game` to the last menu of `root` when it is named `genre`,
/// otherwise opens a new genre menu. Rows must arrive ordered by genre.
pub(crate) fn push_grouped(root: &mut Menu, genre: &str, game: Game) {
    let same_group = root.last_menu_mut().map(|m| m.name == genre).unwrap_or(false);
    if !same_group {
        root.add_menu(Menu::new(genre));
    }
    if let Some(m) = root.last_menu_mut() {
        m.add_game(game);
    }
}

/// Applies the hidden filter to a title: `None` when the item must be left
/// out, otherwise the title with the marker stripped.
pub fn visible_title(title: &str, show_hidden: bool) -> Option<&str> {
    match title.strip_prefix(HIDDEN_MARKER) {
        Some(_) if !show_hidden => None,
        Some(stripped) => Some(stripped),
        None => Some(title),
    }
}

/// Reads a catalog file, treating a missing file as "no entries".
pub(crate) fn read_source(path: &Path) -> Result<Option<String>, CatalogError> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("catalog {} not found, using defaults", path.display());
            Ok(None)
        }
        Err(source) => Err(CatalogError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Creates the source selected in the config.
pub fn open_source(cfg: &Config) -> Box<dyn CatalogSource> {
    let games = cfg.resolve(&cfg.catalog.games);
    match cfg.catalog.source {
        SourceKind::Flat => Box::new(FlatSource::new(cfg.resolve(&cfg.catalog.menus), games)),
        SourceKind::Structured => Box::new(StructuredSource::new(games)),
        SourceKind::Table => Box::new(TableSource::new(
            games,
            cfg.resolve(&cfg.catalog.stats),
            cfg.catalog.sort_by_name,
        )),
        SourceKind::Database => Box::new(DatabaseSource::new(
            cfg.resolve(&cfg.catalog.database),
            cfg.catalog.sort_by_name,
        )),
    }
}

#[cfg(test)]
pub(crate) fn scratch_dir(tag: &str) -> std::path::PathBuf {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let dir = std::env::temp_dir().join(format!(
        "arcade_frontend_{}_{}_{}",
        tag,
        std::process::id(),
        NEXT.fetch_add(1, Ordering::SeqCst)
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;

    #[test]
    fn hidden_titles_are_filtered_or_stripped() {
        assert_eq!(visible_title(".SecretGame", false), None);
        assert_eq!(visible_title(".SecretGame", true), Some("SecretGame"));
        assert_eq!(visible_title("Galaga", false), Some("Galaga"));
    }

    #[test]
    fn views_cycle() {
        assert_eq!(View::Genre.next().next().next(), View::Genre);
        assert_eq!(View::MostPlayed.label(), "Most Played");
    }

    #[test]
    fn grouping_follows_genre_changes() {
        let mut root = Menu::new("Genres");
        push_grouped(&mut root, "Maze", Game::new("pacman", "Pac-Man"));
        push_grouped(&mut root, "Maze", Game::new("digdug", "Dig Dug"));
        push_grouped(&mut root, "Shooter", Game::new("galaga", "Galaga"));
        assert_eq!(root.len(), 2);
        assert_eq!(root.child(0).and_then(Item::as_menu).map(Menu::len), Some(2));
    }

    #[test]
    fn missing_source_reads_as_none() {
        let dir = scratch_dir("missing");
        assert!(read_source(&dir.join("nope")).unwrap().is_none());
    }
}
