use crate::item::{Item, Menu};
use crate::snap::SnapLoader;
use crate::style::{AreaStyle, Justify, StyleConfig};
use log::{debug, warn};
use sdl2::image::{LoadSurface, LoadTexture};
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::{BlendMode, Texture, TextureCreator, WindowCanvas};
use sdl2::surface::Surface;
use sdl2::ttf::Font;
use sdl2::video::WindowContext;
use std::path::Path;

const PADDING: i32 = 20;
const LINE_SPACING: i32 = 5;

pub struct UIColors {
    pub bg: Color,
    pub title: Color,
    pub list: Color,
    pub menu: Color,
    pub hover: Color,
    pub menu_hover: Color,
    pub overlay_rgba: Color,
}

fn rgb(c: Option<[u8; 3]>, fallback: [u8; 3]) -> Color {
    let [r, g, b] = c.unwrap_or(fallback);
    Color::RGB(r, g, b)
}

impl UIColors {
    pub fn from_style(s: &StyleConfig) -> Self {
        UIColors {
            bg: rgb(s.background, [0, 0, 0]),
            title: rgb(s.title, [0xEF, 0xEF, 0xEF]),
            list: rgb(s.list, [0xEF, 0xEF, 0xEF]),
            menu: rgb(s.menu, [0xC2, 0xF4, 0xFF]),
            hover: rgb(s.hover, [0xFF, 0xE4, 0x32]),
            menu_hover: rgb(s.menu_hover, [0x32, 0xE4, 0xFF]),
            overlay_rgba: Color::RGBA(0, 0, 0, s.snap_overlay_alpha.unwrap_or(200)),
        }
    }

    fn item_color(&self, item: &Item, selected: bool) -> Color {
        match (item, selected) {
            (Item::Menu(_), true) => self.menu_hover,
            (Item::Menu(_), false) => self.menu,
            (Item::Game(_), true) => self.hover,
            (Item::Game(_), false) => self.list,
        }
    }
}

/// Screen areas for the title, the list and the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub title: Rect,
    pub title_justify: Justify,
    pub list: Rect,
    pub list_justify: Justify,
    pub spacing: i32,
    pub snapshot: Rect,
}

fn area_rect(area: &AreaStyle, w: u32, h: u32) -> Rect {
    let rest_w = (w as i32 - area.x).max(1) as u32;
    let rest_h = (h as i32 - area.y).max(1) as u32;
    Rect::new(
        area.x,
        area.y,
        area.width.unwrap_or(rest_w).max(1),
        area.height.unwrap_or(rest_h).max(1),
    )
}

impl Layout {
    /// Resolves the style areas for a `w` x `h` screen. Areas the style leaves
    /// out get a title band sized for `title_h` with list and snapshot below.
    pub fn new(style: &StyleConfig, w: u32, h: u32, title_h: i32) -> Self {
        let title = style.title_area.unwrap_or(AreaStyle {
            height: Some((title_h + PADDING * 2).max(1) as u32),
            ..AreaStyle::default()
        });
        let below = AreaStyle {
            y: title.y + title.height.map(|v| v as i32).unwrap_or(title_h + PADDING * 2),
            ..AreaStyle::default()
        };
        let list = style.list_area.unwrap_or(below);
        let snapshot = style.snapshot_area.unwrap_or(below);
        Layout {
            title: area_rect(&title, w, h),
            title_justify: title.justify,
            list: area_rect(&list, w, h),
            list_justify: list.justify,
            spacing: list.spacing.unwrap_or(LINE_SPACING),
            snapshot: area_rect(&snapshot, w, h),
        }
    }

    /// Number of list lines that fit the list area, `None` when not even one
    /// does.
    pub fn page_size(&self, line_h: i32) -> Option<usize> {
        let lines = self.list.height() as i32 / (line_h + self.spacing).max(1);
        if lines > 0 {
            Some(lines as usize)
        } else {
            None
        }
    }
}

/// Left edge of a `text_w` wide line placed in `area`.
pub fn justify_x(area: Rect, text_w: u32, justify: Justify) -> i32 {
    let slack = area.width() as i32 - text_w as i32;
    match justify {
        Justify::Left => area.x(),
        Justify::Center => area.x() + slack / 2,
        Justify::Right => area.x() + slack,
    }
}

/// Largest rectangle with the source aspect ratio centred inside `area`.
pub fn fit_rect(src_w: u32, src_h: u32, area: Rect) -> Rect {
    if src_w == 0 || src_h == 0 {
        return Rect::new(area.x(), area.y(), 1, 1);
    }
    let scale = f64::min(
        area.width() as f64 / src_w as f64,
        area.height() as f64 / src_h as f64,
    );
    let w = ((src_w as f64 * scale) as u32).max(1);
    let h = ((src_h as f64 * scale) as u32).max(1);
    let x = area.x() + (area.width() as i32 - w as i32) / 2;
    let y = area.y() + (area.height() as i32 - h as i32) / 2;
    Rect::new(x, y, w, h)
}

/// Longest prefix of `text` that fits `max_w` with an ellipsis appended.
pub fn elide(text: &str, max_w: u32, width_of: impl Fn(&str) -> u32) -> String {
    if width_of(text) <= max_w {
        return text.to_string();
    }
    let ell = "...";
    let chars: Vec<char> = text.chars().collect();
    let mut lo = 0usize;
    let mut hi = chars.len();
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        let cand: String = chars.iter().take(mid).collect::<String>() + ell;
        if width_of(&cand) <= max_w {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    chars.iter().take(lo).collect::<String>().trim_end().to_string() + ell
}

/// Draws `text` inside `area` with its top at `y`.
#[allow(clippy::too_many_arguments)]
fn draw_text(
    canvas: &mut WindowCanvas,
    texture_creator: &TextureCreator<WindowContext>,
    font: &Font,
    text: &str,
    color: Color,
    area: Rect,
    justify: Justify,
    y: i32,
) {
    if text.is_empty() {
        return;
    }
    let shown = elide(text, area.width(), |s| font.size_of(s).map(|(w, _)| w).unwrap_or(0));
    let surface = match font.render(&shown).blended(color) {
        Ok(s) => s,
        Err(e) => {
            warn!("failed to render `{}`: {}", text, e);
            return;
        }
    };
    if let Ok(tex) = texture_creator.create_texture_from_surface(&surface) {
        let q = tex.query();
        let dst = Rect::new(justify_x(area, q.width, justify), y, q.width, q.height);
        let _ = canvas.copy(&tex, None, dst);
    }
}

/// Loads the themed background; a missing image leaves the plain colour.
pub fn load_background<'a>(
    texture_creator: &'a TextureCreator<WindowContext>,
    path: &Path,
) -> Option<Texture<'a>> {
    match texture_creator.load_texture(path) {
        Ok(tex) => {
            debug!("using background {}", path.display());
            Some(tex)
        }
        Err(e) => {
            warn!("background image {} not loaded: {}", path.display(), e);
            None
        }
    }
}

/// Render the backdrop, the snapshot, the menu title and the list centred on
/// the selected item.
#[allow(clippy::too_many_arguments)]
pub fn render_frame(
    canvas: &mut WindowCanvas,
    texture_creator: &TextureCreator<WindowContext>,
    title_font: &Font,
    list_font: &Font,
    colors: &UIColors,
    layout: &Layout,
    background: Option<&Texture>,
    menu: &Menu,
    snapshot: Option<&Surface>,
) {
    match background {
        Some(bg) => {
            let _ = canvas.copy(bg, None, None);
        }
        None => {
            canvas.set_draw_color(colors.bg);
            canvas.clear();
        }
    }

    if let Some(snap) = snapshot {
        let dst = fit_rect(snap.width(), snap.height(), layout.snapshot);
        if let Ok(tex) = texture_creator.create_texture_from_surface(snap) {
            let _ = canvas.copy(&tex, None, dst);
        }
        // veil only the picture so the background stays intact
        canvas.set_blend_mode(BlendMode::Blend);
        canvas.set_draw_color(colors.overlay_rgba);
        let _ = canvas.fill_rect(dst);
        canvas.set_blend_mode(BlendMode::None);
    }

    let title_y = layout.title.y() + (layout.title.height() as i32 - title_font.height()) / 2;
    draw_text(
        canvas,
        texture_creator,
        title_font,
        &menu.name,
        colors.title,
        layout.title,
        layout.title_justify,
        title_y,
    );

    if menu.is_empty() {
        return;
    }

    let line_h = list_font.height();
    let top = layout.list.y();
    let bottom = layout.list.bottom();
    let step = line_h + layout.spacing;
    let centre = top + (layout.list.height() as i32 - line_h) / 2;
    let sel = menu.selected_index() as i32;
    for (i, item) in menu.children().iter().enumerate() {
        let y = centre + (i as i32 - sel) * step;
        if y < top || y + line_h > bottom {
            continue;
        }
        let color = colors.item_color(item, i as i32 == sel);
        draw_text(
            canvas,
            texture_creator,
            list_font,
            item.text(),
            color,
            layout.list,
            layout.list_justify,
            y,
        );
    }
}

/// Loads snapshots with SDL_image.
pub struct ImageLoader;

impl SnapLoader for ImageLoader {
    type Image = Surface<'static>;

    fn load(&mut self, path: &Path) -> Option<Surface<'static>> {
        if !path.exists() {
            return None;
        }
        match Surface::from_file(path) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!("failed to load snapshot {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_stacks_list_below_title() {
        let layout = Layout::new(&StyleConfig::default(), 640, 480, 40);
        assert_eq!(layout.title, Rect::new(0, 0, 640, 80));
        assert_eq!(layout.list, Rect::new(0, 80, 640, 400));
        assert_eq!(layout.snapshot, layout.list);
        // 400 px of list at 30 + 5 px per line
        assert_eq!(layout.page_size(30), Some(11));
    }

    #[test]
    fn page_size_follows_the_configured_list_area() {
        let style = StyleConfig {
            list_area: Some(AreaStyle {
                x: 300,
                y: 100,
                height: Some(140),
                spacing: Some(4),
                justify: Justify::Left,
                ..AreaStyle::default()
            }),
            ..StyleConfig::default()
        };
        let layout = Layout::new(&style, 640, 480, 40);
        assert_eq!(layout.list, Rect::new(300, 100, 340, 140));
        assert_eq!(layout.list_justify, Justify::Left);
        assert_eq!(layout.page_size(31), Some(4));
        assert_eq!(layout.page_size(200), None);
        assert_eq!(layout.snapshot, Rect::new(0, 80, 640, 400));
    }

    #[test]
    fn justification() {
        let area = Rect::new(100, 0, 200, 50);
        assert_eq!(justify_x(area, 50, Justify::Left), 100);
        assert_eq!(justify_x(area, 50, Justify::Center), 175);
        assert_eq!(justify_x(area, 50, Justify::Right), 250);
    }

    #[test]
    fn snapshot_keeps_aspect_ratio() {
        let area = Rect::new(40, 40, 560, 400);
        let r = fit_rect(320, 240, area);
        assert_eq!((r.width(), r.height()), (533, 400));
        assert_eq!((r.x(), r.y()), (53, 40));

        let r = fit_rect(240, 320, area);
        assert_eq!((r.width(), r.height()), (300, 400));
    }

    #[test]
    fn elides_long_titles() {
        let width = |s: &str| s.chars().count() as u32 * 10;
        assert_eq!(elide("Pac-Man", 100, width), "Pac-Man");
        assert_eq!(elide("Donkey Kong Junior", 100, width), "Donkey...");
    }

    #[test]
    fn colours_fall_back_to_builtin() {
        let c = UIColors::from_style(&StyleConfig::default());
        assert_eq!(c.hover, Color::RGB(0xFF, 0xE4, 0x32));
        assert_eq!(c.overlay_rgba.a, 200);
    }
}
