use crate::config::EmulatorConfig;
use crate::error::LaunchError;
use log::{debug, info};
use std::process::Command;

/// Runs an emulator command to completion.
pub trait Launch {
    /// Blocks until the command exits and returns its exit code; a process
    /// killed by a signal reports -1.
    fn run(&mut self, command: &str) -> Result<i32, LaunchError>;
}

/// Builds the command line for `rom`.
///
/// `%r` (required) becomes the rom name, `%d` the rom path and `%p` the game
/// parameters followed by the global ones. Without `%p` non-empty parameters
/// are appended to the end.
pub fn build_command(emu: &EmulatorConfig, rom: &str, game_params: &str) -> Result<String, LaunchError> {
    if !emu.command.contains("%r") {
        return Err(LaunchError::MissingPlaceholder(emu.command.clone()));
    }
    let params = [game_params.trim(), emu.params.trim()]
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let mut cmd = emu.command.replace("%r", rom).replace("%d", &emu.rom_path);
    if params.is_empty() {
        // an empty %p takes its leading separator with it
        cmd = cmd.replace(" %p", "").replace("%p", "");
    } else if cmd.contains("%p") {
        cmd = cmd.replace("%p", &params);
    } else {
        cmd.push(' ');
        cmd.push_str(&params);
    }
    Ok(cmd)
}

/// Runs commands through `sh -c` and waits without a timeout.
pub struct ShellLauncher;

impl Launch for ShellLauncher {
    fn run(&mut self, command: &str) -> Result<i32, LaunchError> {
        debug!("running `{}`", command);
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                command: command.to_string(),
                source,
            })?;
        info!("launched emulator with pid={}", child.id());
        let status = child.wait().map_err(|source| LaunchError::Spawn {
            command: command.to_string(),
            source,
        })?;
        info!("emulator exited with {}", status);
        Ok(status.code().unwrap_or(-1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emu(command: &str, params: &str) -> EmulatorConfig {
        EmulatorConfig {
            command: command.to_string(),
            rom_path: "/roms".to_string(),
            params: params.to_string(),
            snap: "%r.png".to_string(),
        }
    }

    #[test]
    fn substitutes_rom() {
        let cmd = build_command(&emu("mame %r -fullscreen", ""), "pacman", "").unwrap();
        assert_eq!(cmd, "mame pacman -fullscreen");
    }

    #[test]
    fn missing_rom_placeholder_is_rejected() {
        let err = build_command(&emu("mame -fullscreen", ""), "pacman", "");
        assert!(matches!(err, Err(LaunchError::MissingPlaceholder(_))));
    }

    #[test]
    fn merges_parameters() {
        let cmd = build_command(&emu("mame -rompath %d %r %p -v", "-skip_gameinfo"), "galaga", "-nosound")
            .unwrap();
        assert_eq!(cmd, "mame -rompath /roms galaga -nosound -skip_gameinfo -v");

        let cmd = build_command(&emu("mame %r", "-skip_gameinfo"), "galaga", "").unwrap();
        assert_eq!(cmd, "mame galaga -skip_gameinfo");

        let cmd = build_command(&emu("mame %r %p", ""), "galaga", "").unwrap();
        assert_eq!(cmd, "mame galaga");
    }

    #[test]
    fn quoted_arguments_keep_their_spacing() {
        let mut e = emu("mame -rompath \"%d\" %r %p -v", "");
        e.rom_path = "/media/my  roms".to_string();
        let cmd = build_command(&e, "galaga", "").unwrap();
        assert_eq!(cmd, "mame -rompath \"/media/my  roms\" galaga -v");
    }

    #[cfg(unix)]
    #[test]
    fn shell_launcher_reports_exit_codes() {
        let mut l = ShellLauncher;
        assert_eq!(l.run("true").unwrap(), 0);
        assert_eq!(l.run("exit 3").unwrap(), 3);
    }
}
