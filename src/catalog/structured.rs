//! Hierarchical TOML game list. Submenus come before games within a menu,
//! each in file order.
//!
//! ```toml
//! name = "Main Menu"
//! [[menu]]
//! name = "Shooters"
//!   [[menu.game]]
//!   rom = "galaga"
//!   title = "Galaga"
//! [[game]]
//! rom = "pacman"
//! title = "Pac-Man"
//! ```

use super::{read_source, visible_title, CatalogSource, View};
use crate::error::CatalogError;
use crate::item::{Game, Menu};
use log::debug;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug)]
struct MenuDef {
    name: String,
    #[serde(default)]
    menu: Vec<MenuDef>,
    #[serde(default)]
    game: Vec<GameDef>,
}

#[derive(Deserialize, Debug)]
struct GameDef {
    rom: String,
    title: Option<String>,
    #[serde(default)]
    params: String,
}

#[derive(Deserialize, Debug)]
struct RootDef {
    name: Option<String>,
    #[serde(default)]
    menu: Vec<MenuDef>,
    #[serde(default)]
    game: Vec<GameDef>,
}

pub struct StructuredSource {
    path: PathBuf,
}

impl StructuredSource {
    pub fn new(path: PathBuf) -> Self {
        StructuredSource { path }
    }
}

impl CatalogSource for StructuredSource {
    fn load(&self, view: View, show_hidden: bool) -> Result<Menu, CatalogError> {
        if view != View::Genre {
            debug!("structured catalog has no metadata, ignoring view {:?}", view);
        }
        let text = match read_source(&self.path)? {
            Some(text) => text,
            None => return Ok(Menu::new(View::Genre.label())),
        };
        let def: RootDef = toml::from_str(&text).map_err(|source| CatalogError::Toml {
            path: self.path.clone(),
            source,
        })?;
        let mut root = Menu::new(def.name.unwrap_or_else(|| View::Genre.label().to_string()));
        fill(&mut root, def.menu, def.game, show_hidden);
        Ok(root)
    }
}

fn fill(menu: &mut Menu, menus: Vec<MenuDef>, games: Vec<GameDef>, show_hidden: bool) {
    for m in menus {
        let name = match visible_title(&m.name, show_hidden) {
            Some(name) => name.to_string(),
            None => continue,
        };
        let mut child = Menu::new(name);
        fill(&mut child, m.menu, m.game, show_hidden);
        menu.add_menu(child);
    }
    for g in games {
        let title = g.title.as_deref().unwrap_or(&g.rom);
        if let Some(title) = visible_title(title, show_hidden) {
            let game = Game::new(g.rom.as_str(), title).with_params(g.params.as_str());
            menu.add_game(game);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::scratch_dir;
    use crate::item::Item;

    const LIST: &str = r#"
name = "Arcade"

[[menu]]
name = "Shooters"

  [[menu.game]]
  rom = "galaga"
  title = "Galaga"

  [[menu.game]]
  rom = "1942"
  params = "-nosound"

[[menu]]
name = ".Mature"

  [[menu.game]]
  rom = "mk"
  title = "Mortal Kombat"

[[game]]
rom = "secret"
title = ".SecretGame"
"#;

    #[test]
    fn keeps_file_order_and_filters_hidden() {
        let dir = scratch_dir("structured");
        let path = dir.join("games.toml");
        std::fs::write(&path, LIST).unwrap();
        let src = StructuredSource::new(path);

        let root = src.load(View::Genre, false).unwrap();
        assert_eq!(root.name, "Arcade");
        assert_eq!(root.len(), 1);
        let shooters = root.child(0).and_then(Item::as_menu).unwrap();
        let texts: Vec<&str> = shooters.children().iter().map(Item::text).collect();
        assert_eq!(texts, vec!["Galaga", "1942"]);
        assert_eq!(shooters.children()[1].as_game().unwrap().params, "-nosound");

        let root = src.load(View::Genre, true).unwrap();
        let texts: Vec<&str> = root.children().iter().map(Item::text).collect();
        assert_eq!(texts, vec!["Shooters", "Mature", "SecretGame"]);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = scratch_dir("structured_bad");
        let path = dir.join("games.toml");
        std::fs::write(&path, "[[menu]]\ntitle = 3\n").unwrap();
        let src = StructuredSource::new(path);
        assert!(matches!(src.load(View::Genre, false), Err(CatalogError::Toml { .. })));
    }
}
