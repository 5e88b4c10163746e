//! SQLite games database. Each view is a single query on
//! `games(rom, name, params, genre, fav, count)`, and finished plays are
//! counted back into the same table.

use super::{push_grouped, visible_title, CatalogSource, View, UNKNOWN_GENRE};
use crate::error::CatalogError;
use crate::item::{Game, Menu};
use log::{debug, warn};
use rusqlite::{params, Connection, OpenFlags};
use std::path::PathBuf;

pub struct DatabaseSource {
    path: PathBuf,
    sort_by_name: bool,
}

struct GameRow {
    rom: String,
    name: String,
    params: Option<String>,
    genre: String,
    fav: bool,
    count: u32,
}

impl DatabaseSource {
    pub fn new(path: PathBuf, sort_by_name: bool) -> Self {
        DatabaseSource { path, sort_by_name }
    }

    fn sql_error(&self, source: rusqlite::Error) -> CatalogError {
        CatalogError::Sql {
            path: self.path.clone(),
            source,
        }
    }

    fn query(&self, view: View) -> String {
        // hidden titles sort by their visible text
        let name = "ltrim(name, '.')";
        let genre = format!("COALESCE(genre, '{}')", UNKNOWN_GENRE);
        let mut q = format!(
            "SELECT rom, name, params, {}, COALESCE(fav, 0), COALESCE(count, 0) FROM games",
            genre
        );
        match view {
            View::Genre => q.push_str(&format!(" ORDER BY {}, {}", genre, name)),
            View::Favorites => {
                q.push_str(" WHERE fav = 1");
                if self.sort_by_name {
                    q.push_str(&format!(" ORDER BY {}", name));
                }
            }
            View::MostPlayed => {
                q.push_str(" WHERE count > 0 ORDER BY count DESC");
                if self.sort_by_name {
                    q.push_str(&format!(", {}", name));
                }
            }
        }
        q
    }
}

impl CatalogSource for DatabaseSource {
    fn load(&self, view: View, show_hidden: bool) -> Result<Menu, CatalogError> {
        let mut root = Menu::new(view.label());
        if !self.path.exists() {
            warn!("catalog {} not found, using defaults", self.path.display());
            return Ok(root);
        }
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| self.sql_error(e))?;
        let sql = self.query(view);
        debug!("{}", sql);
        let mut stmt = conn.prepare(&sql).map_err(|e| self.sql_error(e))?;
        let rows = stmt
            .query_map([], |row| {
                let count: i64 = row.get(5)?;
                Ok(GameRow {
                    rom: row.get(0)?,
                    name: row.get(1)?,
                    params: row.get(2)?,
                    genre: row.get(3)?,
                    fav: row.get::<_, i64>(4)? != 0,
                    count: u32::try_from(count.max(0)).unwrap_or(u32::MAX),
                })
            })
            .map_err(|e| self.sql_error(e))?;

        for row in rows {
            let row = row.map_err(|e| self.sql_error(e))?;
            let title = match visible_title(&row.name, show_hidden) {
                Some(t) => t.to_string(),
                None => {
                    debug!("hiding game {}", row.rom);
                    continue;
                }
            };
            let game = Game {
                rom: row.rom,
                title,
                params: row.params.unwrap_or_default(),
                genre: Some(row.genre.clone()),
                favorite: row.fav,
                play_count: row.count,
            };
            match view {
                View::Genre => push_grouped(&mut root, &row.genre, game),
                View::Favorites | View::MostPlayed => root.add_game(game),
            }
        }
        Ok(root)
    }

    fn record_play(&self, rom: &str) -> Result<bool, CatalogError> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_WRITE)
            .map_err(|e| self.sql_error(e))?;
        let updated = conn
            .execute(
                "UPDATE games SET count = COALESCE(count, 0) + 1 WHERE rom = ?1",
                params![rom],
            )
            .map_err(|e| self.sql_error(e))?;
        if updated == 0 {
            warn!("{} has no row in {}", rom, self.path.display());
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::scratch_dir;
    use crate::item::Item;
    use std::path::Path;

    const SCHEMA: &str = "
CREATE TABLE games (rom TEXT, name TEXT, params TEXT, genre TEXT, fav INTEGER DEFAULT 0, count INTEGER DEFAULT 0);
INSERT INTO games VALUES ('pacman', 'Pac-Man', NULL, 'Maze', 0, 3);
INSERT INTO games VALUES ('galaga', 'Galaga', '-nosound', 'Shooter', 1, 3);
INSERT INTO games VALUES ('digdug', 'Dig Dug', NULL, 'Maze', 0, 0);
INSERT INTO games VALUES ('secret', '.SecretGame', NULL, 'Shooter', 0, 9);
INSERT INTO games VALUES ('qix', 'Qix', NULL, NULL, 1, NULL);
";

    fn source(dir: &Path) -> DatabaseSource {
        let path = dir.join("games.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        DatabaseSource::new(path, true)
    }

    fn titles(m: &Menu) -> Vec<&str> {
        m.children().iter().map(Item::text).collect()
    }

    #[test]
    fn genre_view_groups_rows() {
        let dir = scratch_dir("db_genre");
        let root = source(&dir).load(View::Genre, false).unwrap();
        assert_eq!(root.name, "Genres");
        assert_eq!(titles(&root), vec!["Maze", "Shooter", "Unknown"]);
        let maze = root.child(0).and_then(Item::as_menu).unwrap();
        assert_eq!(titles(maze), vec!["Dig Dug", "Pac-Man"]);
        let shooter = root.child(1).and_then(Item::as_menu).unwrap();
        assert_eq!(titles(shooter), vec!["Galaga"]);
    }

    #[test]
    fn hidden_rows_only_with_show_hidden() {
        let dir = scratch_dir("db_hidden");
        let root = source(&dir).load(View::Genre, true).unwrap();
        let shooter = root.child(1).and_then(Item::as_menu).unwrap();
        assert_eq!(titles(shooter), vec!["Galaga", "SecretGame"]);
    }

    #[test]
    fn favorites_and_most_played() {
        let dir = scratch_dir("db_views");
        let src = source(&dir);
        let favs = src.load(View::Favorites, false).unwrap();
        assert_eq!(titles(&favs), vec!["Galaga", "Qix"]);
        let galaga = favs.child(0).and_then(Item::as_game).unwrap();
        assert_eq!(galaga.params, "-nosound");

        let most = src.load(View::MostPlayed, true).unwrap();
        assert_eq!(titles(&most), vec!["SecretGame", "Galaga", "Pac-Man"]);
    }

    #[test]
    fn plays_are_counted_in_the_table() {
        let dir = scratch_dir("db_plays");
        let src = source(&dir);
        assert!(src.record_play("pacman").unwrap());
        let most = src.load(View::MostPlayed, false).unwrap();
        assert_eq!(titles(&most), vec!["Pac-Man", "Galaga"]);
        assert_eq!(most.child(0).and_then(Item::as_game).unwrap().play_count, 4);

        assert!(src.record_play("unknown").unwrap());
        assert!(src.record_play("qix").unwrap());
        let most = src.load(View::MostPlayed, false).unwrap();
        assert_eq!(titles(&most), vec!["Pac-Man", "Galaga", "Qix"]);
    }

    #[test]
    fn missing_database_is_empty() {
        let dir = scratch_dir("db_missing");
        let src = DatabaseSource::new(dir.join("games.db"), true);
        assert!(!src.load(View::Genre, false).unwrap().has_children());
    }

    #[test]
    fn wrong_schema_is_an_error() {
        let dir = scratch_dir("db_schema");
        let path = dir.join("games.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE roms (filename TEXT);")
            .unwrap();
        let src = DatabaseSource::new(path, true);
        assert!(matches!(
            src.load(View::Genre, false),
            Err(CatalogError::Sql { .. })
        ));
    }
}
