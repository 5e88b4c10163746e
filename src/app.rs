use crate::catalog::{CatalogSource, View};
use crate::config::{Config, EmulatorConfig};
use crate::error::{CatalogError, FrontendError};
use crate::item::Item;
use crate::launch::{build_command, Launch};
use crate::nav::Navigator;
use crate::snap::{item_snap_path, SnapLoader, SnapScheduler};
use crate::stats::StatsStore;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Everything the input layer can ask the frontend to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Up,
    Down,
    PageUp,
    PageDown,
    AlphaNext,
    AlphaPrevious,
    Activate,
    Back,
    Reload,
    ToggleHidden,
    NextView,
    Quit,
}

impl Command {
    /// Parses an action name as used in the config bindings.
    pub fn from_action(name: &str) -> Option<Command> {
        let cmd = match name {
            "up" => Command::Up,
            "down" => Command::Down,
            "pgup" => Command::PageUp,
            "pgdown" => Command::PageDown,
            "alphaup" => Command::AlphaNext,
            "alphadown" => Command::AlphaPrevious,
            "select" => Command::Activate,
            "back" => Command::Back,
            "reload" => Command::Reload,
            "showhide" => Command::ToggleHidden,
            "view" => Command::NextView,
            "exit" => Command::Quit,
            _ => return None,
        };
        Some(cmd)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub redraw: bool,
    pub quit: bool,
}

impl Outcome {
    fn redraw_if(changed: bool) -> Self {
        Outcome {
            redraw: changed,
            quit: false,
        }
    }
}

/// The frontend state machine: the menu tree and cursor, the snapshot
/// scheduler and the catalog they are rebuilt from. All mutation goes
/// through [`App::dispatch`] and [`App::update_snapshot`].
pub struct App<T> {
    nav: Navigator,
    snaps: SnapScheduler<T>,
    source: Box<dyn CatalogSource>,
    emulator: EmulatorConfig,
    stats_path: PathBuf,
    view: View,
    show_hidden: bool,
    page_size: usize,
}

impl<T> App<T> {
    /// Loads the initial tree and schedules the first snapshot.
    pub fn new(cfg: &Config, source: Box<dyn CatalogSource>, now: Instant) -> Result<Self, CatalogError> {
        let view = cfg.catalog.view;
        let root = source.load(view, false)?;
        info!("catalog loaded: {} games", root.game_count());
        let mut snaps = SnapScheduler::new(Duration::from_millis(cfg.ui.snapshot_delay_ms));
        snaps.on_navigation_event(now);
        Ok(App {
            nav: Navigator::new(root),
            snaps,
            source,
            emulator: cfg.emulator.clone(),
            stats_path: cfg.resolve(&cfg.catalog.stats),
            view,
            show_hidden: false,
            page_size: cfg.ui.page_size.max(1),
        })
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn snapshot(&self) -> Option<&T> {
        self.snaps.image()
    }

    pub fn scheduler(&self) -> &SnapScheduler<T> {
        &self.snaps
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    /// Page size as laid out by the renderer.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    pub fn dispatch(
        &mut self,
        cmd: Command,
        now: Instant,
        launcher: &mut dyn Launch,
    ) -> Result<Outcome, FrontendError> {
        debug!("dispatch {:?}", cmd);
        let changed = match cmd {
            Command::Quit => {
                self.snaps.cancel();
                return Ok(Outcome {
                    redraw: false,
                    quit: true,
                });
            }
            Command::Up => self.nav.move_up(),
            Command::Down => self.nav.move_down(),
            Command::PageUp => self.nav.page_up(self.page_size),
            Command::PageDown => self.nav.page_down(self.page_size),
            Command::AlphaNext => self.nav.alpha_next(),
            Command::AlphaPrevious => self.nav.alpha_previous(),
            Command::Back => self.nav.back(),
            Command::Activate => {
                let on_game = match self.nav.selected() {
                    Some(Item::Menu(_)) => false,
                    Some(Item::Game(_)) => true,
                    None => return Ok(Outcome::default()),
                };
                if on_game {
                    self.run_selected(launcher)?;
                    // the screen was handed to the emulator, repaint it
                    return Ok(Outcome::redraw_if(true));
                }
                self.nav.enter()
            }
            Command::Reload => {
                self.reload(now)?;
                true
            }
            Command::ToggleHidden => {
                self.show_hidden = !self.show_hidden;
                info!("show hidden: {}", self.show_hidden);
                if let Err(e) = self.reload(now) {
                    self.show_hidden = !self.show_hidden;
                    return Err(e.into());
                }
                true
            }
            Command::NextView => {
                let previous = self.view;
                self.view = self.view.next();
                info!("switching to view {}", self.view.label());
                if let Err(e) = self.reload(now) {
                    self.view = previous;
                    return Err(e.into());
                }
                true
            }
        };
        if changed {
            self.snaps.on_navigation_event(now);
        }
        Ok(Outcome::redraw_if(changed))
    }

    /// Rebuilds the tree from the catalog. On failure the current tree stays.
    pub fn reload(&mut self, now: Instant) -> Result<(), CatalogError> {
        let root = self.source.load(self.view, self.show_hidden)?;
        info!("catalog reloaded: {} games", root.game_count());
        self.nav.replace_root(root);
        self.snaps.on_navigation_event(now);
        Ok(())
    }

    fn run_selected(&mut self, launcher: &mut dyn Launch) -> Result<(), FrontendError> {
        let game = match self.nav.selected() {
            Some(Item::Game(g)) => g,
            _ => return Ok(()),
        };
        let command = build_command(&self.emulator, &game.rom, &game.params)?;
        info!("launching {} ({})", game.title, game.rom);
        let rom = game.rom.clone();
        match launcher.run(&command)? {
            0 => self.record_play(&rom),
            code => warn!("emulator for {} exited with status {}", rom, code),
        }
        Ok(())
    }

    fn record_play(&self, rom: &str) {
        match self.source.record_play(rom) {
            Ok(true) => {
                debug!("{} counted by the catalog", rom);
                return;
            }
            Ok(false) => {}
            Err(e) => {
                warn!("failed to record play of {}: {}", rom, e);
                return;
            }
        }
        let result = StatsStore::load(&self.stats_path).and_then(|mut stats| {
            let count = stats.record_play(rom);
            stats.save()?;
            Ok(count)
        });
        match result {
            Ok(count) => debug!("{} played {} times", rom, count),
            Err(e) => warn!("failed to record play of {}: {}", rom, e),
        }
    }

    /// Fetches the snapshot for whatever is selected once the debounce delay
    /// has passed. Returns true when a new image needs to be drawn.
    pub fn update_snapshot<L>(&mut self, now: Instant, loader: &mut L) -> bool
    where
        L: SnapLoader<Image = T>,
    {
        if !self.snaps.poll_due(now) {
            return false;
        }
        let path = match self
            .nav
            .selected()
            .and_then(|item| item_snap_path(item, &self.emulator.snap))
        {
            Some(p) => p,
            None => return false,
        };
        match loader.load(&path) {
            Some(image) => {
                self.snaps.set_image(image);
                true
            }
            None => {
                debug!("no snapshot at {}", path.display());
                false
            }
        }
    }
}
