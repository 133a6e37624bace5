//! Terminal manga reader.
//!
//! Layout:
//!   row 0               : top bar (overlay only)
//!   rows 0..rows-1      : page strip of the mounted chapter window
//!   last content row    : progress bar (overlay only, bottom position)
//!   row rows-1          : status bar
//!
//! The page strip stands in for rendered pages: each chapter is a header row
//! followed by `page_rows` rows per page. All interaction state lives in a
//! `ReaderSession`; this module only turns terminal events into session
//! calls and carries out the effects it hands back.

mod input;
mod state;
mod terminal;

use crossterm::event;
use log::{debug, info, warn};
use std::cell::RefCell;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::auto_scroll::{AutoScrollDirection, ScrollRef, ScrollTarget};
use crate::chapter_window::ResumeMode;
use crate::config::{self, CliOverrides, Config, ReaderConfig};
use crate::library::Library;
use crate::session::{Effect, PageTurn, ReaderSession};
use crate::tap_zone::TapPoint;
use crate::watch::SettingsWatcher;

use input::{Action, map_event};
use state::{Layout, Strip, Viewport};

const FLASH_DURATION: Duration = Duration::from_secs(3);

/// Run the terminal reader over `library`.
///
/// `config_path` is the settings file to watch (when `watch` is set);
/// `overrides` are re-applied on every reload.
pub fn run(
    library: Library,
    config: Config,
    overrides: CliOverrides,
    config_path: Option<PathBuf>,
    watch: bool,
) -> anyhow::Result<()> {
    terminal::check_tty()?;
    if library.chapters.is_empty() {
        anyhow::bail!("library has no chapters to read");
    }

    let title = library
        .manga
        .as_ref()
        .map_or_else(|| "untitled".to_string(), |m| m.title.clone());
    let resume = library.resume_index();

    let watcher = match (watch, config_path.as_deref()) {
        (true, Some(path)) => match SettingsWatcher::new(path) {
            Ok(w) => Some(w),
            Err(e) => {
                warn!("viewer: settings watch disabled: {e:#}");
                None
            }
        },
        _ => None,
    };

    let (cols, rows) = terminal::terminal_size()
        .map_err(|e| anyhow::anyhow!("failed to get terminal size: {e}"))?;
    let layout = state::compute_layout(cols, rows);

    let mut guard = terminal::RawGuard::enter()?;
    let mut reader = Reader::new(library, &config, layout);
    let now = Instant::now();
    let effects = reader
        .session
        .open_chapter(resume, Some(ResumeMode::LastRead), now);
    reader.apply(effects);
    reader.settle(now);

    info!("viewer: started on chapter {resume} of {title}");
    let result = event_loop(&mut reader, &config, &overrides, watcher.as_ref(), &title);

    reader.session.unmount();
    guard.cleanup();
    info!("viewer: exited");
    result
}

fn event_loop(
    reader: &mut Reader,
    config: &Config,
    overrides: &CliOverrides,
    watcher: Option<&SettingsWatcher>,
    title: &str,
) -> anyhow::Result<()> {
    let frame_budget = config.viewer.frame_budget;
    let watch_interval = config.viewer.watch_interval;
    let mut last_tick = Instant::now();
    let mut last_watch = Instant::now();
    let mut dirty = true;

    loop {
        if dirty || reader.session.auto_scroll().is_scrolling() {
            reader.draw(title)?;
            dirty = false;
        }

        if event::poll(frame_budget)? {
            let now = Instant::now();
            if let Some(action) = map_event(event::read()?) {
                if action == Action::Quit {
                    return Ok(());
                }
                reader.handle(action, now)?;
                reader.settle(now);
                dirty = true;
            }
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last_tick);
        last_tick = now;
        let effects = reader.session.tick(now, elapsed);
        if !effects.is_empty() {
            dirty = true;
        }
        reader.apply(effects);
        if reader.session.auto_scroll().is_scrolling() {
            reader.settle(now);
        }

        if let Some(w) = watcher
            && last_watch.elapsed() >= watch_interval
        {
            last_watch = Instant::now();
            if w.has_changed() {
                reader.reload_settings(w.path(), overrides, now);
                dirty = true;
            }
        }

        if let Some((_, at)) = &reader.flash
            && at.elapsed() >= FLASH_DURATION
        {
            reader.flash = None;
            dirty = true;
        }
    }
}

fn load_reader_config(path: &Path, overrides: &CliOverrides) -> anyhow::Result<ReaderConfig> {
    let mut file = config::load_config_from(path)?;
    file.merge_cli(overrides);
    Ok(file.resolve().reader)
}

/// The mounted reader: session plus the terminal-side geometry it drives.
struct Reader {
    session: ReaderSession,
    viewport: Rc<RefCell<Viewport>>,
    strip: Strip,
    /// Window the strip was last built for.
    mounted: RangeInclusive<usize>,
    layout: Layout,
    page_rows: u16,
    preload_rows: u32,
    flash: Option<(String, Instant)>,
}

impl Reader {
    fn new(library: Library, config: &Config, layout: Layout) -> Self {
        let page_rows = config.viewer.page_rows;
        let viewport = Rc::new(RefCell::new(Viewport::new(layout.content_rows, page_rows)));
        let mut session = ReaderSession::new(config.reader.clone(), library.chapters);
        let scroll_ref: ScrollRef = viewport.clone();
        session.set_scroll_ref(Some(scroll_ref));
        let mounted = session.chapter_window().indices();
        let strip = Strip::build(session.chapters(), mounted.clone(), page_rows);
        viewport.borrow_mut().set_strip(&strip);
        Self {
            session,
            viewport,
            strip,
            layout,
            page_rows,
            preload_rows: config.viewer.preload_rows,
            mounted,
            flash: None,
        }
    }

    fn draw(&self, title: &str) -> anyhow::Result<()> {
        let viewport = self.viewport.borrow();
        terminal::draw_frame(&terminal::FrameCtx {
            layout: &self.layout,
            session: &self.session,
            strip: &self.strip,
            viewport: &viewport,
            title,
            flash: self.flash.as_ref().map(|(msg, _)| msg.as_str()),
        })?;
        Ok(())
    }

    fn handle(&mut self, action: Action, now: Instant) -> anyhow::Result<()> {
        let session = &mut self.session;
        let effects = match action {
            Action::Quit => Vec::new(),
            Action::ScrollRows(n) => {
                self.viewport.borrow_mut().scroll_by(n as f64);
                Vec::new()
            }
            Action::PageForward => vec![Effect::TurnPage(PageTurn::Next)],
            Action::PageBackward => vec![Effect::TurnPage(PageTurn::Previous)],
            Action::NextChapter => {
                let next = session.current_chapter() + 1;
                if next < session.chapters().len() {
                    session.open_chapter(next, Some(ResumeMode::Start), now)
                } else {
                    self.flash = Some(("last chapter".to_string(), now));
                    Vec::new()
                }
            }
            Action::PrevChapter => match session.current_chapter().checked_sub(1) {
                Some(prev) => session.open_chapter(prev, Some(ResumeMode::Start), now),
                None => {
                    self.flash = Some(("first chapter".to_string(), now));
                    Vec::new()
                }
            },
            Action::ResumeChapter => {
                let current = session.current_chapter();
                session.open_chapter(current, Some(ResumeMode::LastRead), now)
            }
            Action::ToggleOverlay => session.toggle_overlay(now),
            Action::ToggleSettings => {
                if session.overlay().is_settings_open() {
                    session.close_settings(now);
                    Vec::new()
                } else {
                    session.open_settings(now)
                }
            }
            Action::ToggleStaticNav => {
                let on = !session.config().static_nav;
                session.set_static_nav(on);
                let label = if on { "static nav on" } else { "static nav off" };
                self.flash = Some((label.to_string(), now));
                Vec::new()
            }
            Action::AutoScrollToggle => {
                if session.auto_scroll().is_active() {
                    session.toggle_auto_scroll();
                } else {
                    session.start_auto_scroll();
                }
                Vec::new()
            }
            Action::AutoScrollCancel => {
                session.cancel_auto_scroll();
                Vec::new()
            }
            Action::AutoScrollPause => {
                if session.auto_scroll().is_paused() {
                    session.resume_auto_scroll();
                } else {
                    session.pause_auto_scroll();
                }
                Vec::new()
            }
            Action::AutoScrollReverse => {
                let reversed = match session.auto_scroll().direction() {
                    AutoScrollDirection::Forward => AutoScrollDirection::Backward,
                    AutoScrollDirection::Backward => AutoScrollDirection::Forward,
                };
                session.set_auto_scroll_direction(reversed);
                Vec::new()
            }
            Action::PointerDown { col, row } => self.pointer_down(col, row, now),
            Action::PointerDrag { col, row } => {
                let position = self.session.config().progress_bar_position;
                match state::bar_fraction(&self.layout, position, col, row) {
                    Some(fraction) => self.session.drag_to(fraction),
                    None => Vec::new(),
                }
            }
            Action::PointerUp => {
                if self.session.progress_bar().is_dragging() {
                    self.session.end_drag(now);
                    self.session.set_progress_maximized(false);
                }
                Vec::new()
            }
            Action::Resize { cols, rows } => {
                self.layout = state::compute_layout(cols, rows);
                debug!("viewer: resize {}x{}", self.layout.cols, self.layout.rows);
                let mut vp = self.viewport.borrow_mut();
                vp.extent = self.layout.content_rows as f64;
                let y = vp.y;
                vp.scroll_to(y);
                drop(vp);
                terminal::clear_screen()?;
                Vec::new()
            }
        };
        self.apply(effects);
        Ok(())
    }

    fn pointer_down(&mut self, col: u16, row: u16, now: Instant) -> Vec<Effect> {
        if self.session.overlay().is_visible() {
            let position = self.session.config().progress_bar_position;
            if let Some(fraction) = state::bar_fraction(&self.layout, position, col, row) {
                self.session.set_progress_maximized(true);
                self.session.begin_drag(now);
                return self.session.drag_to(fraction);
            }
        }
        if row >= self.layout.content_rows {
            return Vec::new();
        }
        let point = TapPoint::from_viewport(
            col as f64 + 0.5,
            row as f64 + 0.5,
            self.layout.cols as f64,
            self.layout.content_rows as f64,
        );
        self.session.handle_tap(point, now)
    }

    /// Carry out session effects on the viewport and strip.
    fn apply(&mut self, effects: Vec<Effect>) {
        let mut grown = false;
        for effect in effects {
            match effect {
                Effect::TurnPage(turn) => {
                    let direction = match turn {
                        PageTurn::Next => AutoScrollDirection::Forward,
                        PageTurn::Previous => AutoScrollDirection::Backward,
                    };
                    self.viewport.borrow_mut().turn_page(direction);
                }
                Effect::OverlayChanged(visible) => {
                    debug!("viewer: overlay {}", if visible { "shown" } else { "hidden" });
                }
                Effect::PreloadChapter(index) => {
                    debug!("viewer: preload chapter {index}");
                    grown = true;
                }
                Effect::JumpToPage { chapter, page } => {
                    if let Some(row) = self.strip.page_row(chapter, page) {
                        self.viewport.borrow_mut().scroll_to(row as f64);
                    }
                }
            }
        }
        if grown {
            self.rebuild_strip();
        }
    }

    /// Re-lay the strip after the mounted window changed, keeping the row
    /// under the top of the viewport in place.
    fn rebuild_strip(&mut self) {
        let anchor = {
            let vp = self.viewport.borrow();
            self.strip
                .locate(vp.top_row())
                .map(|(idx, local)| (idx, local as f64 + vp.y.fract()))
        };
        self.mounted = self.session.chapter_window().indices();
        self.strip = Strip::build(self.session.chapters(), self.mounted.clone(), self.page_rows);
        let mut vp = self.viewport.borrow_mut();
        vp.set_strip(&self.strip);
        let y = anchor
            .and_then(|(idx, off)| self.strip.chapter_start(idx).map(|start| start as f64 + off))
            .unwrap_or(vp.y);
        vp.scroll_to(y);
    }

    /// Bring the window, current chapter and pending scroll instruction in
    /// line with the viewport position.
    fn settle(&mut self, now: Instant) {
        if self.session.chapter_window().indices() != self.mounted {
            self.rebuild_strip();
        }

        if let Some(instruction) = self.session.take_scroll_instruction() {
            let row = self
                .strip
                .instruction_row(self.session.chapters(), &instruction);
            debug!(
                "viewer: scroll to chapter {} ({:?}) row {row}",
                instruction.chapter, instruction.resume_mode
            );
            self.viewport.borrow_mut().scroll_to(row as f64);
        }

        let (near_leading, near_trailing) = self.viewport.borrow().near_edges(self.preload_rows);
        let effects = self.session.on_scroll(near_leading, near_trailing);
        self.apply(effects);

        let top = self.viewport.borrow().top_row();
        if let Some((idx, _)) = self.strip.locate(top) {
            let effects = self.session.set_current_chapter(idx, now);
            self.apply(effects);
        }
    }

    fn reload_settings(&mut self, path: &Path, overrides: &CliOverrides, now: Instant) {
        match load_reader_config(path, overrides) {
            Ok(reader) => {
                info!("viewer: settings reloaded from {}", path.display());
                self.session.apply_settings(reader, now);
                self.flash = Some(("settings reloaded".to_string(), now));
            }
            Err(e) => {
                warn!("viewer: settings reload failed: {e:#}");
                self.flash = Some((format!("settings error: {e}"), now));
            }
        }
    }
}
