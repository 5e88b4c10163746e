use crate::app::Command;
use crate::config::KeyConfig;
use log::warn;
use sdl2::controller::Button as CButton;
use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Mod};
use std::collections::HashMap;

/// Translates SDL input events into frontend commands.
///
/// Movement acts on key down so auto-repeat scrolls; everything else acts on
/// key up. Holding the alpha modifier turns the page keys into alphabetic
/// jumps.
pub struct Keymap {
    keys: HashMap<Keycode, Command>,
    buttons: HashMap<CButton, Command>,
    alphamod: Mod,
}

fn is_movement(cmd: Command) -> bool {
    matches!(
        cmd,
        Command::Up | Command::Down | Command::PageUp | Command::PageDown
    )
}

/// Modifier mask for a config name; unknown names disable alpha jumps.
pub fn parse_modifier(name: &str) -> Mod {
    match name.to_ascii_lowercase().as_str() {
        "shift" => Mod::LSHIFTMOD | Mod::RSHIFTMOD,
        "ctrl" | "control" => Mod::LCTRLMOD | Mod::RCTRLMOD,
        "alt" => Mod::LALTMOD | Mod::RALTMOD,
        "" | "none" => Mod::NOMOD,
        other => {
            warn!("unknown alpha modifier `{}`", other);
            Mod::NOMOD
        }
    }
}

impl Keymap {
    pub fn new(keys: HashMap<Keycode, Command>, buttons: HashMap<CButton, Command>, alphamod: Mod) -> Self {
        Keymap {
            keys,
            buttons,
            alphamod,
        }
    }

    pub fn from_config(cfg: &KeyConfig, controller: &HashMap<String, String>) -> Self {
        let bindings = [
            (&cfg.exit, Command::Quit),
            (&cfg.up, Command::Up),
            (&cfg.down, Command::Down),
            (&cfg.pgup, Command::PageUp),
            (&cfg.pgdown, Command::PageDown),
            (&cfg.select, Command::Activate),
            (&cfg.back, Command::Back),
            (&cfg.showhide, Command::ToggleHidden),
            (&cfg.reload, Command::Reload),
            (&cfg.view, Command::NextView),
        ];
        let mut keys = HashMap::new();
        for (name, cmd) in bindings {
            match Keycode::from_name(name) {
                Some(k) => {
                    keys.insert(k, cmd);
                }
                None => warn!("unknown key `{}` for {:?}", name, cmd),
            }
        }

        let mut buttons = HashMap::new();
        for (action, button) in controller {
            let cmd = match Command::from_action(action) {
                Some(c) => c,
                None => {
                    warn!("unknown controller action `{}`", action);
                    continue;
                }
            };
            match CButton::from_string(button) {
                Some(b) => {
                    buttons.insert(b, cmd);
                }
                None => warn!("unknown controller button `{}`", button),
            }
        }

        Keymap::new(keys, buttons, parse_modifier(&cfg.alphamod))
    }

    pub fn translate(&self, event: &Event) -> Option<Command> {
        match event {
            Event::Quit { .. } => Some(Command::Quit),
            Event::KeyDown {
                keycode: Some(k),
                keymod,
                ..
            } => {
                let cmd = *self.keys.get(k)?;
                if !is_movement(cmd) {
                    return None;
                }
                let alpha = !self.alphamod.is_empty() && keymod.intersects(self.alphamod);
                Some(match cmd {
                    Command::PageUp if alpha => Command::AlphaPrevious,
                    Command::PageDown if alpha => Command::AlphaNext,
                    other => other,
                })
            }
            Event::KeyUp {
                keycode: Some(k), ..
            } => self.keys.get(k).copied().filter(|c| !is_movement(*c)),
            Event::ControllerButtonDown { button, .. } => self.buttons.get(button).copied(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keymap() -> Keymap {
        let mut keys = HashMap::new();
        keys.insert(Keycode::Up, Command::Up);
        keys.insert(Keycode::Left, Command::PageUp);
        keys.insert(Keycode::Right, Command::PageDown);
        keys.insert(Keycode::LCtrl, Command::Activate);
        keys.insert(Keycode::Escape, Command::Quit);
        let mut buttons = HashMap::new();
        buttons.insert(CButton::A, Command::Activate);
        Keymap::new(keys, buttons, parse_modifier("shift"))
    }

    fn down(k: Keycode, keymod: Mod) -> Event {
        Event::KeyDown {
            timestamp: 0,
            window_id: 0,
            keycode: Some(k),
            scancode: None,
            keymod,
            repeat: false,
        }
    }

    fn up(k: Keycode) -> Event {
        Event::KeyUp {
            timestamp: 0,
            window_id: 0,
            keycode: Some(k),
            scancode: None,
            keymod: Mod::NOMOD,
            repeat: false,
        }
    }

    #[test]
    fn movement_on_key_down_actions_on_key_up() {
        let km = keymap();
        assert_eq!(km.translate(&down(Keycode::Up, Mod::NOMOD)), Some(Command::Up));
        assert_eq!(km.translate(&up(Keycode::Up)), None);
        assert_eq!(km.translate(&down(Keycode::LCtrl, Mod::NOMOD)), None);
        assert_eq!(km.translate(&up(Keycode::LCtrl)), Some(Command::Activate));
        assert_eq!(km.translate(&up(Keycode::Escape)), Some(Command::Quit));
        assert_eq!(km.translate(&down(Keycode::Z, Mod::NOMOD)), None);
    }

    #[test]
    fn alpha_modifier_turns_paging_into_jumps() {
        let km = keymap();
        assert_eq!(km.translate(&down(Keycode::Right, Mod::NOMOD)), Some(Command::PageDown));
        assert_eq!(
            km.translate(&down(Keycode::Right, Mod::RSHIFTMOD)),
            Some(Command::AlphaNext)
        );
        assert_eq!(
            km.translate(&down(Keycode::Left, Mod::LSHIFTMOD)),
            Some(Command::AlphaPrevious)
        );
    }

    #[test]
    fn window_close_and_controller() {
        let km = keymap();
        assert_eq!(km.translate(&Event::Quit { timestamp: 0 }), Some(Command::Quit));
        let press = Event::ControllerButtonDown {
            timestamp: 0,
            which: 0,
            button: CButton::A,
        };
        assert_eq!(km.translate(&press), Some(Command::Activate));
    }

    #[test]
    fn modifier_names() {
        assert!(parse_modifier("CTRL").contains(Mod::LCTRLMOD));
        assert!(parse_modifier("none").is_empty());
        assert!(parse_modifier("hyper").is_empty());
    }
}
