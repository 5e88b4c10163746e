mod app;
mod catalog;
mod config;
mod error;
mod item;
mod keymap;
mod launch;
mod nav;
mod snap;
mod stats;
mod style;
mod ui;

use app::App;
use error::{FrontendError, LaunchError};
use keymap::Keymap;
use launch::{Launch, ShellLauncher};
use log::{debug, error, info, warn};
use sdl2::event::{Event, WindowEvent};
use sdl2::image::InitFlag;
use sdl2::render::WindowCanvas;
use sdl2::surface::Surface;
use sdl2::ttf::Sdl2TtfContext;
use sdl2::video::FullscreenType;
use sdl2::EventPump;
use std::env;
use std::path::PathBuf;
use std::time::Instant;

/// Hands the screen to the emulator for the duration of a run and swallows
/// whatever input piled up meanwhile.
struct SdlLauncher<'a> {
    canvas: &'a mut WindowCanvas,
    event_pump: &'a mut EventPump,
    fullscreen: bool,
}

impl Launch for SdlLauncher<'_> {
    fn run(&mut self, command: &str) -> Result<i32, LaunchError> {
        if self.fullscreen {
            let _ = self.canvas.window_mut().set_fullscreen(FullscreenType::Off);
        }
        let result = ShellLauncher.run(command);
        if self.fullscreen {
            let _ = self.canvas.window_mut().set_fullscreen(FullscreenType::Desktop);
        }
        let dropped = self.event_pump.poll_iter().count();
        debug!("dropped {} events queued during the run", dropped);
        result
    }
}

fn init_logging() {
    // RUST_LOG wins over the config loglevel
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Trace)
        .parse_default_env()
        .init();
    if env::var_os("RUST_LOG").is_none() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

fn run() -> Result<(), FrontendError> {
    let dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(config::user_config_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let config = config::load_config(&dir)?;
    if env::var_os("RUST_LOG").is_none() {
        log::set_max_level(config.log_filter());
    }
    info!("{} {} using {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), dir.display());
    let style = style::load_style(&dir);
    let colors = ui::UIColors::from_style(&style);
    let keymap = Keymap::from_config(&config.keys, &config.controller);

    let source = catalog::open_source(&config);
    let mut app: App<Surface<'static>> = App::new(&config, source, Instant::now())?;

    let sdl_ctx = sdl2::init()?;
    let video = sdl_ctx.video()?;
    let controller_subsystem = sdl_ctx.game_controller()?;
    let _image_ctx = sdl2::image::init(InitFlag::PNG | InitFlag::JPG)?;

    let mut builder = video.window("Arcade Frontend", config.screen.width, config.screen.height);
    builder.position_centered();
    if config.screen.fullscreen {
        builder.fullscreen_desktop();
    }
    let window = builder.build().map_err(|e| e.to_string())?;
    let mut canvas = window
        .into_canvas()
        .accelerated()
        .present_vsync()
        .build()
        .map_err(|e| e.to_string())?;
    sdl_ctx.mouse().show_cursor(false);
    let texture_creator = canvas.texture_creator();

    let ttf_ctx: Sdl2TtfContext = sdl2::ttf::init().map_err(|e| e.to_string())?;
    let font_path = config.font_path().ok_or_else(|| {
        FrontendError::Sdl(
            "No TTF font found. Set [font] path in config or install DejaVu/FreeSans or set FONT_PATH."
                .to_string(),
        )
    })?;
    info!("using font {}", font_path.display());
    let title_font = ttf_ctx.load_font(&font_path, config.font.title_size)?;
    let list_font = ttf_ctx.load_font(&font_path, config.font.list_size)?;

    // dropped controllers stop reporting events
    let mut controllers: Vec<sdl2::controller::GameController> = Vec::new();
    for id in 0..sdl_ctx.joystick()?.num_joysticks()? {
        if controller_subsystem.is_game_controller(id) {
            match controller_subsystem.open(id) {
                Ok(gc) => {
                    info!("opened controller: {}", gc.name());
                    controllers.push(gc);
                }
                Err(e) => warn!("failed opening controller {}: {}", id, e),
            }
        }
    }

    let (w, h) = canvas.output_size()?;
    let layout = ui::Layout::new(&style, w, h, title_font.height());
    match layout.page_size(list_font.height()) {
        Some(n) => app.set_page_size(n),
        None => debug!("list area too small, keeping page size {}", config.ui.page_size),
    }
    let background = style
        .background_image
        .as_ref()
        .and_then(|p| ui::load_background(&texture_creator, &config.resolve(p)));

    let mut event_pump = sdl_ctx.event_pump()?;
    let mut loader = ui::ImageLoader;
    let mut redraw = true;

    'running: loop {
        if redraw {
            ui::render_frame(
                &mut canvas,
                &texture_creator,
                &title_font,
                &list_font,
                &colors,
                &layout,
                background.as_ref(),
                app.navigator().current(),
                app.snapshot(),
            );
            canvas.present();
            redraw = false;
        }

        let event = match app.scheduler().time_until_due(Instant::now()) {
            Some(wait) => event_pump.wait_event_timeout(wait.as_millis().min(u32::MAX as u128) as u32),
            None => Some(event_pump.wait_event()),
        };

        if let Some(event) = event {
            match keymap.translate(&event) {
                Some(cmd) => {
                    let mut launcher = SdlLauncher {
                        canvas: &mut canvas,
                        event_pump: &mut event_pump,
                        fullscreen: config.screen.fullscreen,
                    };
                    match app.dispatch(cmd, Instant::now(), &mut launcher) {
                        Ok(outcome) if outcome.quit => break 'running,
                        Ok(outcome) => redraw |= outcome.redraw,
                        Err(e) => {
                            error!("{}", e);
                            redraw = true;
                        }
                    }
                }
                None => {
                    if let Event::Window {
                        win_event: WindowEvent::Exposed,
                        ..
                    } = event
                    {
                        redraw = true;
                    }
                }
            }
        }

        if app.update_snapshot(Instant::now(), &mut loader) {
            redraw = true;
        }
    }

    info!("exiting");
    Ok(())
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
