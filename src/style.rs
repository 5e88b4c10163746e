use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Horizontal placement of text inside its area.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Justify {
    Left,
    #[default]
    Center,
    Right,
}

/// A screen rectangle. Missing width or height extends to the screen edge.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AreaStyle {
    pub x: i32,
    pub y: i32,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub justify: Justify,
    /// Gap between list lines, only used by the list area.
    pub spacing: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct StyleConfig {
    /// Image drawn behind everything, relative to the config directory.
    pub background_image: Option<String>,
    pub background: Option<[u8; 3]>,
    pub title: Option<[u8; 3]>,
    pub list: Option<[u8; 3]>,
    pub menu: Option<[u8; 3]>,
    pub hover: Option<[u8; 3]>,
    pub menu_hover: Option<[u8; 3]>,
    pub snap_overlay_alpha: Option<u8>,
    pub title_area: Option<AreaStyle>,
    pub list_area: Option<AreaStyle>,
    pub snapshot_area: Option<AreaStyle>,
}

fn write_default_style(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, include_str!("../style.sample.toml"))?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn builtin_style() -> StyleConfig {
    StyleConfig {
        background: Some([0, 0, 0]),
        title: Some([0xEF, 0xEF, 0xEF]),
        list: Some([0xEF, 0xEF, 0xEF]),
        menu: Some([0xC2, 0xF4, 0xFF]),
        hover: Some([0xFF, 0xE4, 0x32]),
        menu_hover: Some([0x32, 0xE4, 0xFF]),
        snap_overlay_alpha: Some(200),
        ..StyleConfig::default()
    }
}

/// Overlays the values present in `parsed` onto `s`.
fn merge(s: &mut StyleConfig, parsed: StyleConfig) {
    if parsed.background.is_some() {
        s.background = parsed.background;
    }
    if parsed.title.is_some() {
        s.title = parsed.title;
    }
    if parsed.list.is_some() {
        s.list = parsed.list;
    }
    if parsed.menu.is_some() {
        s.menu = parsed.menu;
    }
    if parsed.hover.is_some() {
        s.hover = parsed.hover;
    }
    if parsed.menu_hover.is_some() {
        s.menu_hover = parsed.menu_hover;
    }
    if parsed.snap_overlay_alpha.is_some() {
        s.snap_overlay_alpha = parsed.snap_overlay_alpha;
    }
    if parsed.background_image.is_some() {
        s.background_image = parsed.background_image;
    }
    if parsed.title_area.is_some() {
        s.title_area = parsed.title_area;
    }
    if parsed.list_area.is_some() {
        s.list_area = parsed.list_area;
    }
    if parsed.snapshot_area.is_some() {
        s.snapshot_area = parsed.snapshot_area;
    }
}

/// Loads `style.toml` from the config directory. A broken style file only
/// costs the theme, so errors fall back to the built-in colours.
pub fn load_style(dir: &Path) -> StyleConfig {
    let mut s = builtin_style();
    let p = dir.join("style.toml");
    if !p.exists() {
        if let Err(e) = write_default_style(&p) {
            warn!("failed to write default style: {}", e);
        }
    }
    if let Ok(contents) = std::fs::read_to_string(&p) {
        match toml::from_str::<StyleConfig>(&contents) {
            Ok(parsed) => merge(&mut s, parsed),
            Err(e) => warn!("failed to parse style at {}: {}", p.display(), e),
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_only_overrides_present_fields() {
        let mut s = builtin_style();
        let parsed: StyleConfig = toml::from_str("hover = [1, 2, 3]").unwrap();
        merge(&mut s, parsed);
        assert_eq!(s.hover, Some([1, 2, 3]));
        assert_eq!(s.snap_overlay_alpha, Some(200));
    }

    #[test]
    fn areas_parse_with_partial_fields() {
        let mut s = builtin_style();
        let parsed: StyleConfig = toml::from_str(
            "background_image = \"bg.png\"\n[list_area]\ny = 100\nheight = 300\njustify = \"left\"\n",
        )
        .unwrap();
        merge(&mut s, parsed);
        assert_eq!(s.background_image.as_deref(), Some("bg.png"));
        let list = s.list_area.unwrap();
        assert_eq!((list.x, list.y, list.width, list.height), (0, 100, None, Some(300)));
        assert_eq!(list.justify, Justify::Left);
        assert!(s.title_area.is_none());
    }

    #[test]
    fn load_writes_builtin_sample() {
        let dir = crate::catalog::scratch_dir("style");
        let s = load_style(&dir);
        assert_eq!(
            std::fs::read_to_string(dir.join("style.toml")).unwrap(),
            include_str!("../style.sample.toml")
        );
        assert_eq!(s.snap_overlay_alpha, Some(200));
        assert!(s.background_image.is_none());
    }

    #[test]
    fn sample_style_parses() {
        let parsed: StyleConfig = toml::from_str(include_str!("../style.sample.toml")).unwrap();
        assert!(parsed.background.is_some());
    }
}
