/// A node in the menu tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Menu(Menu),
    Game(Game),
}

impl Item {
    pub fn text(&self) -> &str {
        match self {
            Item::Menu(m) => &m.name,
            Item::Game(g) => &g.title,
        }
    }

    pub fn has_children(&self) -> bool {
        match self {
            Item::Menu(m) => m.has_children(),
            Item::Game(_) => false,
        }
    }

    pub fn as_menu(&self) -> Option<&Menu> {
        match self {
            Item::Menu(m) => Some(m),
            Item::Game(_) => None,
        }
    }

    pub fn as_game(&self) -> Option<&Game> {
        match self {
            Item::Game(g) => Some(g),
            Item::Menu(_) => None,
        }
    }
}

/// A launchable title.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Game {
    pub rom: String,
    pub title: String,
    /// Per-game emulator parameters, may be empty.
    pub params: String,
    pub genre: Option<String>,
    pub favorite: bool,
    pub play_count: u32,
}

impl Game {
    pub fn new(rom: impl Into<String>, title: impl Into<String>) -> Self {
        Game {
            rom: rom.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: impl Into<String>) -> Self {
        self.params = params.into();
        self
    }
}

/// Container item. Owns its children; `selected` is only meaningful while
/// `children` is non-empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Menu {
    pub name: String,
    children: Vec<Item>,
    selected: usize,
}

impl Menu {
    pub fn new(name: impl Into<String>) -> Self {
        Menu {
            name: name.into(),
            children: Vec::new(),
            selected: 0,
        }
    }

    pub fn add_child(&mut self, child: Item) {
        self.children.push(child);
    }

    pub fn add_menu(&mut self, menu: Menu) {
        self.add_child(Item::Menu(menu));
    }

    pub fn add_game(&mut self, game: Game) {
        self.add_child(Item::Game(game));
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn children(&self) -> &[Item] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Moves the selection to `index`, clamped to the last child.
    pub fn set_selected(&mut self, index: usize) {
        self.selected = index.min(self.children.len().saturating_sub(1));
    }

    pub fn selected(&self) -> Option<&Item> {
        self.children.get(self.selected)
    }

    pub fn child(&self, index: usize) -> Option<&Item> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Item> {
        self.children.get_mut(index)
    }

    /// Mutable access to the last child if it is a menu, used by loaders that
    /// group consecutive rows.
    pub fn last_menu_mut(&mut self) -> Option<&mut Menu> {
        match self.children.last_mut() {
            Some(Item::Menu(m)) => Some(m),
            _ => None,
        }
    }

    /// Selects the child `step` places after the current one, stopping at the
    /// last child. Returns false when the selection was already there.
    pub fn select_next(&mut self, step: usize) -> bool {
        let last = match self.children.len() {
            0 => return false,
            n => n - 1,
        };
        if self.selected >= last {
            return false;
        }
        self.selected = self.selected.saturating_add(step).min(last);
        true
    }

    /// Selects the child `step` places before the current one, stopping at the
    /// first child. Returns false when the selection was already there.
    pub fn select_previous(&mut self, step: usize) -> bool {
        if self.children.is_empty() || self.selected == 0 {
            return false;
        }
        self.selected = self.selected.saturating_sub(step);
        true
    }

    /// Jumps to the first child of the next leading-character group.
    ///
    /// Children must already be in alphabetical order; on an unsorted list the
    /// groups are whatever runs of equal leading characters happen to exist.
    pub fn select_next_alpha(&mut self) -> bool {
        let current = match self.selected() {
            Some(item) => group_key(item.text()),
            None => return false,
        };
        let found = self
            .children
            .iter()
            .enumerate()
            .skip(self.selected + 1)
            .find(|(_, c)| group_key(c.text()) != current)
            .map(|(i, _)| i);
        match found {
            Some(i) => {
                self.selected = i;
                true
            }
            None => false,
        }
    }

    /// Jumps to the first child of the previous leading-character group. Same
    /// ordering contract as [`Menu::select_next_alpha`].
    pub fn select_previous_alpha(&mut self) -> bool {
        let current = match self.selected() {
            Some(item) => group_key(item.text()),
            None => return false,
        };
        let prev_end = match self.children[..self.selected]
            .iter()
            .rposition(|c| group_key(c.text()) != current)
        {
            Some(i) => i,
            None => return false,
        };
        let prev = group_key(self.children[prev_end].text());
        let mut start = prev_end;
        while start > 0 && group_key(self.children[start - 1].text()) == prev {
            start -= 1;
        }
        self.selected = start;
        true
    }

    /// Sorts children by display text and resets the selection to the top.
    pub fn sort_children(&mut self) {
        self.children.sort_by(|a, b| a.text().cmp(b.text()));
        self.selected = 0;
    }

    /// Sorts this menu and every submenu below it.
    pub fn sort_recursive(&mut self) {
        for child in self.children.iter_mut() {
            if let Item::Menu(m) = child {
                m.sort_recursive();
            }
        }
        self.sort_children();
    }

    /// Total number of games anywhere below this menu.
    pub fn game_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| match c {
                Item::Menu(m) => m.game_count(),
                Item::Game(_) => 1,
            })
            .sum()
    }
}

fn group_key(text: &str) -> Option<char> {
    text.chars().next().map(|c| c.to_ascii_lowercase())
}
