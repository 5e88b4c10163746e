//! Debounced snapshot fetching.
//!
//! Every navigation event pushes the deadline out by the configured delay and
//! drops the snapshot on screen. The event loop waits no longer than
//! [`SnapScheduler::time_until_due`] and calls [`SnapScheduler::poll_due`],
//! which reports the deadline exactly once; only the most recent deadline can
//! ever fire.

use crate::item::Item;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Decodes snapshot images. `None` means there is no image for the path.
pub trait SnapLoader {
    type Image;

    fn load(&mut self, path: &Path) -> Option<Self::Image>;
}

pub struct SnapScheduler<T> {
    delay: Duration,
    deadline: Option<Instant>,
    image: Option<T>,
}

impl<T> SnapScheduler<T> {
    pub fn new(delay: Duration) -> Self {
        SnapScheduler {
            delay,
            deadline: None,
            image: None,
        }
    }

    /// Replaces any pending fetch with one due `delay` from `now` and clears
    /// the current snapshot.
    pub fn on_navigation_event(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
        self.image = None;
    }

    /// Drops the pending fetch without scheduling a new one.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Remaining wait before the pending fetch is due, `None` when idle.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// True once when the pending deadline has passed.
    pub fn poll_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn set_image(&mut self, image: T) {
        self.image = Some(image);
    }

    pub fn image(&self) -> Option<&T> {
        self.image.as_ref()
    }
}

/// Expands the snapshot template for `rom`, `None` when the template has no
/// `%r` placeholder.
pub fn snap_path(template: &str, rom: &str) -> Option<PathBuf> {
    if !template.contains("%r") {
        warn!("snapshot template `{}` is missing the %r placeholder", template);
        return None;
    }
    Some(PathBuf::from(template.replacen("%r", rom, 1)))
}

/// Snapshot path of an item; menus have none.
pub fn item_snap_path(item: &Item, template: &str) -> Option<PathBuf> {
    match item {
        Item::Game(g) => {
            let path = snap_path(template, &g.rom)?;
            debug!("snapshot for {}: {}", g.rom, path.display());
            Some(path)
        }
        Item::Menu(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Game, Menu};

    #[test]
    fn fires_once_after_the_delay() {
        let t0 = Instant::now();
        let mut s: SnapScheduler<u8> = SnapScheduler::new(Duration::from_millis(500));
        assert!(!s.poll_due(t0));
        s.on_navigation_event(t0);
        assert!(!s.poll_due(t0 + Duration::from_millis(499)));
        assert!(s.poll_due(t0 + Duration::from_millis(500)));
        assert!(!s.poll_due(t0 + Duration::from_millis(900)));
        assert!(!s.is_pending());
    }

    #[test]
    fn rescheduling_keeps_only_the_latest_deadline() {
        let t0 = Instant::now();
        let mut s: SnapScheduler<u8> = SnapScheduler::new(Duration::from_millis(500));
        s.on_navigation_event(t0);
        s.on_navigation_event(t0 + Duration::from_millis(300));
        assert!(!s.poll_due(t0 + Duration::from_millis(600)));
        assert_eq!(
            s.time_until_due(t0 + Duration::from_millis(600)),
            Some(Duration::from_millis(200))
        );
        assert!(s.poll_due(t0 + Duration::from_millis(800)));
        assert!(!s.poll_due(t0 + Duration::from_millis(2000)));
    }

    #[test]
    fn navigation_drops_current_image() {
        let t0 = Instant::now();
        let mut s = SnapScheduler::new(Duration::from_millis(10));
        s.set_image("galaga.png");
        assert!(s.image().is_some());
        s.on_navigation_event(t0);
        assert!(s.image().is_none());
        s.cancel();
        assert_eq!(s.time_until_due(t0), None);
    }

    #[test]
    fn template_substitution() {
        assert_eq!(
            snap_path("/snap/%r.png", "pacman"),
            Some(PathBuf::from("/snap/pacman.png"))
        );
        assert_eq!(snap_path("/snap/default.png", "pacman"), None);

        let game = Item::Game(Game::new("dkong", "Donkey Kong"));
        assert_eq!(
            item_snap_path(&game, "%r.png"),
            Some(PathBuf::from("dkong.png"))
        );
        assert_eq!(item_snap_path(&Item::Menu(Menu::new("m")), "%r.png"), None);
    }
}
