//! Table of game rows in TOML, with play counts and favorites from the stats
//! store merged in.
//!
//! ```toml
//! [[game]]
//! rom = "pacman"
//! name = "Pac-Man"
//! genre = "Maze"
//! favorite = true
//! count = 3
//! ```

use super::{push_grouped, read_source, visible_title, CatalogSource, View, UNKNOWN_GENRE};
use crate::error::CatalogError;
use crate::item::{Game, Menu};
use crate::stats::StatsStore;
use log::{debug, warn};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone)]
struct GameRow {
    rom: String,
    name: String,
    #[serde(default)]
    params: String,
    genre: Option<String>,
    #[serde(default)]
    favorite: bool,
    #[serde(default)]
    count: u32,
}

#[derive(Deserialize, Debug, Default)]
struct GameTable {
    #[serde(default)]
    game: Vec<GameRow>,
}

pub struct TableSource {
    games: PathBuf,
    stats: PathBuf,
    sort_by_name: bool,
}

impl TableSource {
    pub fn new(games: PathBuf, stats: PathBuf, sort_by_name: bool) -> Self {
        TableSource {
            games,
            stats,
            sort_by_name,
        }
    }

    fn rows(&self, show_hidden: bool) -> Result<Vec<Game>, CatalogError> {
        let table: GameTable = match read_source(&self.games)? {
            Some(text) => toml::from_str(&text).map_err(|source| CatalogError::Toml {
                path: self.games.clone(),
                source,
            })?,
            None => GameTable::default(),
        };
        let stats = StatsStore::load(&self.stats).unwrap_or_else(|e| {
            warn!("ignoring play statistics: {}", e);
            StatsStore::default()
        });

        let mut out = Vec::with_capacity(table.game.len());
        for row in table.game {
            let title = match visible_title(&row.name, show_hidden) {
                Some(t) => t.to_string(),
                None => {
                    debug!("hiding game {}", row.rom);
                    continue;
                }
            };
            // the table count is a baseline, recorded plays come on top
            let recorded = stats.get(&row.rom);
            out.push(Game {
                play_count: row
                    .count
                    .saturating_add(recorded.map(|s| s.play_count).unwrap_or(0)),
                favorite: row.favorite || recorded.map(|s| s.favorite).unwrap_or(false),
                genre: row.genre,
                params: row.params,
                title,
                rom: row.rom,
            });
        }
        Ok(out)
    }
}

impl CatalogSource for TableSource {
    fn load(&self, view: View, show_hidden: bool) -> Result<Menu, CatalogError> {
        let mut games = self.rows(show_hidden)?;
        let mut root = Menu::new(view.label());
        match view {
            View::Genre => {
                games.sort_by(|a, b| genre_of(a).cmp(genre_of(b)).then_with(|| a.title.cmp(&b.title)));
                for g in games {
                    let genre = genre_of(&g).to_string();
                    push_grouped(&mut root, &genre, g);
                }
            }
            View::Favorites => {
                games.retain(|g| g.favorite);
                if self.sort_by_name {
                    games.sort_by(|a, b| a.title.cmp(&b.title));
                }
                games.into_iter().for_each(|g| root.add_game(g));
            }
            View::MostPlayed => {
                games.retain(|g| g.play_count > 0);
                if self.sort_by_name {
                    games.sort_by(|a, b| a.title.cmp(&b.title));
                }
                // stable, so equal counts keep the order above
                games.sort_by(|a, b| b.play_count.cmp(&a.play_count));
                games.into_iter().for_each(|g| root.add_game(g));
            }
        }
        Ok(root)
    }
}

fn genre_of(g: &Game) -> &str {
    g.genre.as_deref().unwrap_or(UNKNOWN_GENRE)
}
