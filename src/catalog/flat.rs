//! Line oriented `menulist` / `gamelist` pair.
//!
//! ```text
//! # menulist: <id> <parent id> <name>
//! 0 0 Main Menu
//! 1 0 Shooters
//! # gamelist: <parent id> <rom> "<title>" <params>
//! 1 galaga "Galaga" -nosound
//! ```

use super::{read_source, visible_title, CatalogSource, View};
use crate::error::CatalogError;
use crate::item::{Game, Menu};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

const ROOT_ID: u32 = 0;

pub struct FlatSource {
    menus: PathBuf,
    games: PathBuf,
}

struct MenuLine {
    id: u32,
    parent: u32,
    name: String,
}

struct GameLine {
    parent: u32,
    game: Game,
}

impl FlatSource {
    pub fn new(menus: PathBuf, games: PathBuf) -> Self {
        FlatSource { menus, games }
    }
}

impl CatalogSource for FlatSource {
    fn load(&self, view: View, show_hidden: bool) -> Result<Menu, CatalogError> {
        if view != View::Genre {
            debug!("flat catalog has no metadata, ignoring view {:?}", view);
        }
        let (menus, hidden) = match read_source(&self.menus)? {
            Some(text) => parse_menus(&text, &self.menus, show_hidden)?,
            None => (Vec::new(), HashSet::new()),
        };
        let games = match read_source(&self.games)? {
            Some(text) => parse_games(&text, &self.games, show_hidden)?,
            None => Vec::new(),
        };
        Ok(build_tree(menus, hidden, games))
    }
}

fn parse_err(path: &Path, line: usize, message: impl Into<String>) -> CatalogError {
    CatalogError::Parse {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
}

fn parse_id(field: Option<&str>, what: &str, path: &Path, line: usize) -> Result<u32, CatalogError> {
    let field = field.ok_or_else(|| parse_err(path, line, format!("missing {}", what)))?;
    field
        .parse()
        .map_err(|_| parse_err(path, line, format!("invalid {} `{}`", what, field)))
}

/// Visible menu lines plus the ids of the hidden ones.
fn parse_menus(
    text: &str,
    path: &Path,
    show_hidden: bool,
) -> Result<(Vec<MenuLine>, HashSet<u32>), CatalogError> {
    let mut out = Vec::new();
    let mut hidden = HashSet::new();
    let mut seen = HashSet::new();
    for (n, line) in content_lines(text) {
        let mut fields = line.splitn(3, ' ');
        let id = parse_id(fields.next(), "menu id", path, n)?;
        let parent = parse_id(fields.next(), "parent id", path, n)?;
        let raw = fields.next().map(str::trim).unwrap_or("");
        if raw.is_empty() {
            return Err(parse_err(path, n, "missing menu name"));
        }
        if !seen.insert(id) {
            return Err(parse_err(path, n, format!("duplicate menu id {}", id)));
        }
        match visible_title(raw, show_hidden) {
            Some(name) => out.push(MenuLine {
                id,
                parent,
                name: name.to_string(),
            }),
            None => {
                debug!("hiding menu {}", raw);
                hidden.insert(id);
            }
        }
    }
    Ok((out, hidden))
}

fn parse_games(text: &str, path: &Path, show_hidden: bool) -> Result<Vec<GameLine>, CatalogError> {
    let mut out = Vec::new();
    for (n, line) in content_lines(text) {
        let (parent, rest) = line
            .split_once(' ')
            .ok_or_else(|| parse_err(path, n, "missing rom name"))?;
        let parent = parse_id(Some(parent), "parent id", path, n)?;
        let rest = rest.trim_start();
        let (rom, rest) = rest.split_once(' ').unwrap_or((rest, ""));
        if rom.is_empty() {
            return Err(parse_err(path, n, "missing rom name"));
        }
        let rest = rest.trim_start();
        let (title, params) = match rest.strip_prefix('"') {
            Some(quoted) => {
                let (title, params) = quoted
                    .split_once('"')
                    .ok_or_else(|| parse_err(path, n, "unterminated title"))?;
                (title, params.trim())
            }
            None => (rom, rest),
        };
        match visible_title(title, show_hidden) {
            Some(title) => out.push(GameLine {
                parent,
                game: Game::new(rom, title).with_params(params),
            }),
            None => debug!("hiding game {}", rom),
        }
    }
    Ok(out)
}

/// Extends `hidden` with every menu nested below a hidden one. The root is
/// never hidden.
fn hidden_closure(menus: &[MenuLine], mut hidden: HashSet<u32>) -> HashSet<u32> {
    hidden.remove(&ROOT_ID);
    loop {
        let before = hidden.len();
        for m in menus.iter().filter(|m| m.id != ROOT_ID) {
            if hidden.contains(&m.parent) {
                hidden.insert(m.id);
            }
        }
        if hidden.len() == before {
            return hidden;
        }
    }
}

#[derive(Debug, PartialEq)]
enum Parent {
    Known,
    Hidden,
    Unknown,
}

fn classify(parent: u32, known: &HashSet<u32>, hidden: &HashSet<u32>) -> Parent {
    if hidden.contains(&parent) {
        Parent::Hidden
    } else if known.contains(&parent) {
        Parent::Known
    } else {
        Parent::Unknown
    }
}

fn build_tree(menus: Vec<MenuLine>, hidden: HashSet<u32>, games: Vec<GameLine>) -> Menu {
    let hidden = hidden_closure(&menus, hidden);
    let known: HashSet<u32> = menus
        .iter()
        .map(|m| m.id)
        .filter(|id| !hidden.contains(id))
        .chain([ROOT_ID])
        .collect();
    let root_name = menus
        .iter()
        .find(|m| m.id == ROOT_ID)
        .map(|m| m.name.clone())
        .unwrap_or_else(|| View::Genre.label().to_string());

    let mut sub_menus: HashMap<u32, Vec<MenuLine>> = HashMap::new();
    for m in menus.into_iter().filter(|m| m.id != ROOT_ID) {
        match classify(m.parent, &known, &hidden) {
            Parent::Known => sub_menus.entry(m.parent).or_default().push(m),
            Parent::Hidden => debug!("menu {} sits under a hidden menu", m.name),
            Parent::Unknown => warn!("menu {} refers to unknown parent {}", m.name, m.parent),
        }
    }
    let mut sub_games: HashMap<u32, Vec<Game>> = HashMap::new();
    for g in games {
        match classify(g.parent, &known, &hidden) {
            Parent::Known => sub_games.entry(g.parent).or_default().push(g.game),
            Parent::Hidden => debug!("game {} sits under a hidden menu", g.game.rom),
            Parent::Unknown => warn!("game {} refers to unknown menu {}", g.game.rom, g.parent),
        }
    }

    let mut root = Menu::new(root_name);
    attach(&mut root, ROOT_ID, &mut sub_menus, &mut sub_games);
    // the flat lists carry no order of their own
    root.sort_recursive();
    root
}

fn attach(
    menu: &mut Menu,
    id: u32,
    sub_menus: &mut HashMap<u32, Vec<MenuLine>>,
    sub_games: &mut HashMap<u32, Vec<Game>>,
) {
    for line in sub_menus.remove(&id).unwrap_or_default() {
        let mut child = Menu::new(line.name);
        attach(&mut child, line.id, sub_menus, sub_games);
        menu.add_menu(child);
    }
    for game in sub_games.remove(&id).unwrap_or_default() {
        menu.add_game(game);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::scratch_dir;
    use crate::item::Item;

    const MENUS: &str = "# id parent name\n0 0 Main\n1 0 Shooters\n2 0 .Adult\n3 1 Vertical\n";
    const GAMES: &str = "1 defender \"Defender\" -nosound\n3 galaga \"Galaga\"\n3 1942 \"1942\"\n0 pacman \"Pac-Man\"\n0 secret \".SecretGame\"\n2 hidden \"Hidden Child\"\n";

    fn write(dir: &Path, menus: &str, games: &str) -> FlatSource {
        std::fs::write(dir.join("menulist"), menus).unwrap();
        std::fs::write(dir.join("gamelist"), games).unwrap();
        FlatSource::new(dir.join("menulist"), dir.join("gamelist"))
    }

    #[test]
    fn builds_sorted_hierarchy() {
        let dir = scratch_dir("flat_tree");
        let src = write(&dir, MENUS, GAMES);
        let root = src.load(View::Genre, false).unwrap();
        assert_eq!(root.name, "Main");
        let texts: Vec<&str> = root.children().iter().map(Item::text).collect();
        assert_eq!(texts, vec!["Pac-Man", "Shooters"]);

        let shooters = root.child(1).and_then(Item::as_menu).unwrap();
        assert_eq!(shooters.children()[0].text(), "Defender");
        let defender = shooters.children()[0].as_game().unwrap();
        assert_eq!(defender.params, "-nosound");
        let vertical = shooters.children()[1].as_menu().unwrap();
        let texts: Vec<&str> = vertical.children().iter().map(Item::text).collect();
        assert_eq!(texts, vec!["1942", "Galaga"]);
    }

    #[test]
    fn show_hidden_strips_marker() {
        let dir = scratch_dir("flat_hidden");
        let src = write(&dir, MENUS, GAMES);
        let root = src.load(View::Genre, true).unwrap();
        let texts: Vec<&str> = root.children().iter().map(Item::text).collect();
        assert_eq!(texts, vec!["Adult", "Pac-Man", "SecretGame", "Shooters"]);
        let adult = root.child(0).and_then(Item::as_menu).unwrap();
        assert_eq!(adult.children()[0].text(), "Hidden Child");
    }

    #[test]
    fn children_of_hidden_menus_are_not_orphans() {
        let (menus, hidden) = parse_menus(
            "0 0 Main\n1 0 Shooters\n2 0 .Adult\n4 2 Nested\n",
            Path::new("menulist"),
            false,
        )
        .unwrap();
        assert_eq!(hidden, HashSet::from([2]));
        let hidden = hidden_closure(&menus, hidden);
        assert_eq!(hidden, HashSet::from([2, 4]));

        let known = HashSet::from([ROOT_ID, 1]);
        assert_eq!(classify(2, &known, &hidden), Parent::Hidden);
        assert_eq!(classify(4, &known, &hidden), Parent::Hidden);
        assert_eq!(classify(1, &known, &hidden), Parent::Known);
        assert_eq!(classify(9, &known, &hidden), Parent::Unknown);

        let games = parse_games("4 deep \"Deep\"\n1 defender \"Defender\"\n", Path::new("gamelist"), false).unwrap();
        let root = build_tree(menus, hidden, games);
        let texts: Vec<&str> = root.children().iter().map(Item::text).collect();
        assert_eq!(texts, vec!["Shooters"]);
        assert_eq!(root.game_count(), 1);
    }

    #[test]
    fn missing_files_give_empty_root() {
        let dir = scratch_dir("flat_missing");
        let src = FlatSource::new(dir.join("menulist"), dir.join("gamelist"));
        let root = src.load(View::Genre, false).unwrap();
        assert!(!root.has_children());
    }

    #[test]
    fn title_defaults_to_rom() {
        let dir = scratch_dir("flat_notitle");
        let src = write(&dir, "", "0 dkong\n");
        let root = src.load(View::Genre, false).unwrap();
        assert_eq!(root.children()[0].text(), "dkong");
    }

    #[test]
    fn malformed_lines_are_parse_errors() {
        let dir = scratch_dir("flat_bad");
        let src = write(&dir, "x 0 Broken\n", "");
        assert!(matches!(
            src.load(View::Genre, false),
            Err(CatalogError::Parse { line: 1, .. })
        ));

        let src = write(&dir, "", "# c\n0 galaga \"Galaga\n");
        assert!(matches!(
            src.load(View::Genre, false),
            Err(CatalogError::Parse { line: 2, .. })
        ));

        let src = write(&dir, "1 0 A\n1 0 B\n", "");
        assert!(src.load(View::Genre, false).is_err());
    }
}
