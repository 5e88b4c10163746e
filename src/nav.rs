use crate::item::{Item, Menu};
use log::debug;

/// Owns the item tree and the cursor into it.
///
/// The cursor is the chain of child indices leading from the root to the
/// current menu, so a menu's parent is simply the previous entry on the path.
/// Every index on the path names a menu: only [`Navigator::enter`] pushes,
/// and the tree is never edited while a path into it exists.
#[derive(Debug, Default)]
pub struct Navigator {
    root: Menu,
    path: Vec<usize>,
}

impl Navigator {
    pub fn new(root: Menu) -> Self {
        Navigator {
            root,
            path: Vec::new(),
        }
    }

    /// Drops the old tree and puts the cursor on the new root.
    pub fn replace_root(&mut self, root: Menu) {
        self.root = root;
        self.path.clear();
    }

    pub fn root(&self) -> &Menu {
        &self.root
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn at_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn current(&self) -> &Menu {
        let mut menu = &self.root;
        for &i in &self.path {
            menu = match menu.child(i) {
                Some(Item::Menu(m)) => m,
                _ => unreachable!("cursor path points at a non-menu item"),
            };
        }
        menu
    }

    fn current_mut(&mut self) -> &mut Menu {
        let mut menu = &mut self.root;
        for &i in &self.path {
            menu = match menu.child_mut(i) {
                Some(Item::Menu(m)) => m,
                _ => unreachable!("cursor path points at a non-menu item"),
            };
        }
        menu
    }

    pub fn selected(&self) -> Option<&Item> {
        self.current().selected()
    }

    pub fn move_up(&mut self) -> bool {
        self.current_mut().select_previous(1)
    }

    pub fn move_down(&mut self) -> bool {
        self.current_mut().select_next(1)
    }

    pub fn page_up(&mut self, page_size: usize) -> bool {
        self.current_mut().select_previous(page_size.max(1))
    }

    pub fn page_down(&mut self, page_size: usize) -> bool {
        self.current_mut().select_next(page_size.max(1))
    }

    pub fn alpha_next(&mut self) -> bool {
        self.current_mut().select_next_alpha()
    }

    pub fn alpha_previous(&mut self) -> bool {
        self.current_mut().select_previous_alpha()
    }

    /// Descends into the selected child when it is a menu.
    pub fn enter(&mut self) -> bool {
        let current = self.current();
        match current.selected() {
            Some(Item::Menu(m)) => {
                debug!("entering menu {}", m.name);
                let index = current.selected_index();
                self.path.push(index);
                true
            }
            _ => false,
        }
    }

    /// Returns to the parent menu with the former current menu selected.
    pub fn back(&mut self) -> bool {
        match self.path.pop() {
            Some(index) => {
                self.current_mut().set_selected(index);
                debug!("back to menu {}", self.current().name);
                true
            }
            None => false,
        }
    }
}
