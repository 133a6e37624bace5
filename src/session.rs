//! Reader session: owns the interaction state of one mounted reader and keeps
//! the pieces consistent with each other.
//!
//! Every write goes through a `ReaderSession` method, and each method re-runs
//! the reactions that depend on what it changed before returning. A caller
//! therefore never observes, say, a visible overlay next to a still-running
//! auto-scroll.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::auto_scroll::{AutoScroll, AutoScrollDirection, ScrollRef};
use crate::chapter_window::{
    ChapterWindow, ChapterWindowUpdate, ResumeMode, ScrollInstruction, WindowEdge,
};
use crate::config::ReaderConfig;
use crate::library::Chapter;
use crate::overlay::Overlay;
use crate::progress_bar::{self, ProgressBar};
use crate::tap_zone::{self, TapPoint, TapZoneRegionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTurn {
    Previous,
    Next,
}

/// Side effects for the embedding view to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    TurnPage(PageTurn),
    OverlayChanged(bool),
    /// Chapter index that just joined the mounted window.
    PreloadChapter(usize),
    JumpToPage { chapter: usize, page: usize },
}

pub struct ReaderSession {
    config: ReaderConfig,
    chapters: Vec<Chapter>,
    current_chapter: usize,
    overlay: Overlay,
    auto_scroll: AutoScroll,
    progress: ProgressBar,
    window: ChapterWindow,
}

impl ReaderSession {
    /// Mount a reader over `chapters` (ordered by source order).
    pub fn new(config: ReaderConfig, chapters: Vec<Chapter>) -> Self {
        info!(
            "session: mount ({} chapters, layout={})",
            chapters.len(),
            config.tap_zone_layout.name()
        );
        let window = ChapterWindow::new(chapters.len());
        let auto_scroll = AutoScroll::new(config.auto_scroll_mode, config.auto_scroll_interval);
        Self {
            overlay: Overlay::new(config.overlay_idle_hide),
            auto_scroll,
            progress: ProgressBar::new(),
            window,
            current_chapter: 0,
            chapters,
            config,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn current_chapter(&self) -> usize {
        self.current_chapter
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn auto_scroll(&self) -> &AutoScroll {
        &self.auto_scroll
    }

    pub fn progress_bar(&self) -> &ProgressBar {
        &self.progress
    }

    pub fn chapter_window(&self) -> &ChapterWindow {
        &self.window
    }

    // -- settings ----------------------------------------------------------

    /// Apply reloaded settings to the live session.
    pub fn apply_settings(&mut self, config: ReaderConfig, now: Instant) {
        if config == self.config {
            return;
        }
        debug!("session: settings changed");
        self.overlay.set_idle_hide(config.overlay_idle_hide, now);
        self.auto_scroll.set_mode(config.auto_scroll_mode);
        self.auto_scroll.set_interval(config.auto_scroll_interval);
        self.config = config;
        self.sync_pause();
    }

    pub fn set_static_nav(&mut self, static_nav: bool) {
        self.config.static_nav = static_nav;
        self.sync_pause();
    }

    // -- overlay -----------------------------------------------------------

    pub fn set_overlay_visible(&mut self, visible: bool, now: Instant) -> Vec<Effect> {
        let changed = self.overlay.set_visible(visible, now);
        self.after_overlay(changed)
    }

    pub fn toggle_overlay(&mut self, now: Instant) -> Vec<Effect> {
        let changed = self.overlay.toggle(now);
        self.after_overlay(changed)
    }

    pub fn open_settings(&mut self, now: Instant) -> Vec<Effect> {
        let changed = self.overlay.open_settings(now);
        self.after_overlay(changed)
    }

    pub fn close_settings(&mut self, now: Instant) {
        self.overlay.close_settings(now);
    }

    /// Route a tap through the active tap-zone layout.
    pub fn handle_tap(&mut self, point: TapPoint, now: Instant) -> Vec<Effect> {
        let zone = tap_zone::classify(
            self.config.tap_zone_layout,
            self.config.tap_zone_invert,
            point,
        );
        match zone {
            TapZoneRegionType::Menu => self.toggle_overlay(now),
            TapZoneRegionType::Previous => {
                self.overlay.touch(now);
                vec![Effect::TurnPage(PageTurn::Previous)]
            }
            TapZoneRegionType::Next => {
                self.overlay.touch(now);
                vec![Effect::TurnPage(PageTurn::Next)]
            }
        }
    }

    fn after_overlay(&mut self, changed: bool) -> Vec<Effect> {
        self.sync_pause();
        if changed {
            vec![Effect::OverlayChanged(self.overlay.is_visible())]
        } else {
            Vec::new()
        }
    }

    fn sync_pause(&mut self) {
        self.auto_scroll
            .sync_pause(self.overlay.is_visible(), self.config.static_nav);
    }

    // -- auto-scroll -------------------------------------------------------

    pub fn set_scroll_ref(&mut self, scroll_ref: Option<ScrollRef>) {
        self.auto_scroll.set_scroll_ref(scroll_ref);
    }

    pub fn start_auto_scroll(&mut self) {
        self.sync_pause();
        self.auto_scroll.start();
    }

    pub fn cancel_auto_scroll(&mut self) {
        self.auto_scroll.cancel();
    }

    pub fn toggle_auto_scroll(&mut self) {
        self.auto_scroll.toggle_active();
    }

    pub fn pause_auto_scroll(&mut self) {
        self.auto_scroll.pause();
    }

    pub fn resume_auto_scroll(&mut self) {
        self.auto_scroll.resume();
    }

    pub fn set_auto_scroll_direction(&mut self, direction: AutoScrollDirection) {
        self.auto_scroll.set_direction(direction);
    }

    /// Advance timers: overlay idle auto-hide first, so a hide in this tick
    /// already resumes auto-scroll for the scroll step that follows.
    pub fn tick(&mut self, now: Instant, elapsed: Duration) -> Vec<Effect> {
        let hidden = self.overlay.tick(now, self.progress.suppresses_auto_hide());
        let effects = self.after_overlay(hidden);
        self.auto_scroll.tick(elapsed);
        effects
    }

    // -- progress bar ------------------------------------------------------

    pub fn set_progress_maximized(&mut self, maximized: bool) {
        self.progress.set_maximized(maximized);
    }

    pub fn begin_drag(&mut self, now: Instant) {
        self.progress.set_dragging(true);
        self.overlay.touch(now);
    }

    /// Pointer moved to `fraction` of the bar while dragging.
    pub fn drag_to(&mut self, fraction: f64) -> Vec<Effect> {
        if !self.progress.is_dragging() {
            return Vec::new();
        }
        let Some(chapter) = self.chapters.get(self.current_chapter) else {
            return Vec::new();
        };
        progress_bar::page_at(
            fraction,
            chapter.page_count,
            self.config.progress_bar_position,
            self.config.reading_direction,
        )
        .map(|page| {
            vec![Effect::JumpToPage {
                chapter: self.current_chapter,
                page,
            }]
        })
        .unwrap_or_default()
    }

    pub fn end_drag(&mut self, now: Instant) {
        self.progress.set_dragging(false);
        self.overlay.touch(now);
    }

    // -- chapters ----------------------------------------------------------

    /// Jump to a chapter: collapse the window onto it and queue a scroll.
    pub fn open_chapter(
        &mut self,
        index: usize,
        resume_mode: Option<ResumeMode>,
        now: Instant,
    ) -> Vec<Effect> {
        self.window.open_chapter(index, resume_mode);
        let index = self.window.leading();
        self.enter_chapter(index, now)
    }

    /// The chapter under the viewport changed through scrolling.
    pub fn set_current_chapter(&mut self, index: usize, now: Instant) -> Vec<Effect> {
        let index = index.min(self.chapters.len().saturating_sub(1));
        if index == self.current_chapter {
            return Vec::new();
        }
        self.enter_chapter(index, now)
    }

    fn enter_chapter(&mut self, index: usize, now: Instant) -> Vec<Effect> {
        debug!("session: chapter {} → {index}", self.current_chapter);
        self.current_chapter = index;
        let hidden = self
            .overlay
            .on_chapter_change(self.config.hide_overlay_on_chapter_change, now);
        self.after_overlay(hidden)
    }

    /// Feed the scroll position relative to the mounted window's edges.
    pub fn on_scroll(&mut self, near_leading: bool, near_trailing: bool) -> Vec<Effect> {
        let mut effects = Vec::new();
        let edges = [
            (WindowEdge::Leading, self.window.leading(), near_leading),
            (WindowEdge::Trailing, self.window.trailing(), near_trailing),
        ];
        for (edge, index, near) in edges {
            let Some(chapter) = self.chapters.get(index) else {
                continue;
            };
            if let Some(grown) = self.window.observe_edge(edge, chapter.source_order, near) {
                effects.push(Effect::PreloadChapter(grown));
            }
        }
        effects
    }

    pub fn update_window(&mut self, update: ChapterWindowUpdate) {
        self.window.update(update);
    }

    pub fn take_scroll_instruction(&mut self) -> Option<ScrollInstruction> {
        self.window.take_scroll_instruction()
    }

    /// Tear down: stop auto-scroll, drop the viewport handle and return every
    /// piece of state to its mount-time default.
    pub fn unmount(&mut self) {
        info!("session: unmount");
        self.auto_scroll.cancel();
        self.auto_scroll.set_scroll_ref(None);
        self.overlay.reset();
        self.progress.reset();
        self.window.reset();
        self.current_chapter = 0;
        self.sync_pause();
    }
}
