//! Reading-control overlay visibility, with optional idle auto-hide.
//!
//! Time is passed in explicitly (`now: Instant`) so that the caller's event
//! loop owns the clock and tests can drive it deterministically.

use std::time::{Duration, Instant};

use log::debug;

#[derive(Debug)]
pub struct Overlay {
    visible: bool,
    idle_hide: Option<Duration>,
    /// Auto-hide deadline; armed only while visible.
    hide_at: Option<Instant>,
    settings_open: bool,
}

impl Overlay {
    /// `idle_hide = None` disables auto-hide.
    pub fn new(idle_hide: Option<Duration>) -> Self {
        Self {
            visible: false,
            idle_hide,
            hide_at: None,
            settings_open: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_settings_open(&self) -> bool {
        self.settings_open
    }

    pub fn set_idle_hide(&mut self, idle_hide: Option<Duration>, now: Instant) {
        self.idle_hide = idle_hide;
        self.rearm(now);
    }

    /// Returns true if visibility changed.
    pub fn set_visible(&mut self, visible: bool, now: Instant) -> bool {
        if self.visible == visible {
            self.rearm(now);
            return false;
        }
        debug!("overlay: {} → {}", self.visible, visible);
        self.visible = visible;
        if !visible {
            self.settings_open = false;
        }
        self.rearm(now);
        true
    }

    pub fn toggle(&mut self, now: Instant) -> bool {
        self.set_visible(!self.visible, now)
    }

    /// Any interaction with the overlay postpones auto-hide.
    pub fn touch(&mut self, now: Instant) {
        self.rearm(now);
    }

    /// Settings panel forces the overlay on and holds it there.
    pub fn open_settings(&mut self, now: Instant) -> bool {
        self.settings_open = true;
        self.set_visible(true, now)
    }

    pub fn close_settings(&mut self, now: Instant) {
        self.settings_open = false;
        self.rearm(now);
    }

    /// Chapter navigation: hide when the policy asks for it.
    pub fn on_chapter_change(&mut self, hide: bool, now: Instant) -> bool {
        if hide && !self.settings_open {
            self.set_visible(false, now)
        } else {
            false
        }
    }

    /// Fire the idle timer if due. While `suppressed` (an ongoing drag) the
    /// timer never fires; the deadline is pushed forward instead.
    ///
    /// Returns true if the overlay was hidden.
    pub fn tick(&mut self, now: Instant, suppressed: bool) -> bool {
        let Some(deadline) = self.hide_at else {
            return false;
        };
        if suppressed {
            self.rearm(now);
            return false;
        }
        if now < deadline {
            return false;
        }
        debug!("overlay: idle auto-hide");
        self.set_visible(false, now)
    }

    pub fn reset(&mut self) {
        self.visible = false;
        self.hide_at = None;
        self.settings_open = false;
    }

    fn rearm(&mut self, now: Instant) {
        self.hide_at = match self.idle_hide {
            Some(idle) if self.visible && !self.settings_open => Some(now + idle),
            _ => None,
        };
    }
}
