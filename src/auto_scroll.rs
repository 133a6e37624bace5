//! Auto-scroll controller.
//!
//! Two independent flags gate scrolling: `active` is owned by the user
//! (start / cancel / toggle) and `paused` is derived. The controller is
//! paused whenever the overlay holds it (overlay visible, navigation not
//! static) or the user paused it by hand. The scroll target only moves while
//! `active && !paused`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoScrollDirection {
    #[default]
    Forward,
    Backward,
}

impl AutoScrollDirection {
    pub fn sign(self) -> f64 {
        match self {
            AutoScrollDirection::Forward => 1.0,
            AutoScrollDirection::Backward => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoScrollMode {
    /// Continuous scrolling, one viewport per interval.
    #[default]
    Smooth,
    /// One page turn per interval.
    Paged,
}

/// The scrollable viewport driven by auto-scroll.
pub trait ScrollTarget {
    /// Visible extent along the scroll axis, in the target's own units.
    fn viewport_extent(&self) -> f64;
    fn scroll_by(&mut self, delta: f64);
    fn turn_page(&mut self, direction: AutoScrollDirection);
}

/// Shared handle to the viewport. The reader runs on one thread, so the
/// viewer and the controller share it through `Rc<RefCell<_>>`.
pub type ScrollRef = Rc<RefCell<dyn ScrollTarget>>;

pub struct AutoScroll {
    active: bool,
    /// Pause requested by the user; survives (de)activation.
    manual_pause: bool,
    direction: AutoScrollDirection,
    mode: AutoScrollMode,
    interval: Duration,
    scroll_ref: Option<ScrollRef>,
    /// `overlay_visible && !static_nav`, as last synced.
    overlay_holds: bool,
    /// Time accumulated toward the next page turn (paged mode).
    carry: Duration,
}

impl AutoScroll {
    pub fn new(mode: AutoScrollMode, interval: Duration) -> Self {
        Self {
            active: false,
            manual_pause: false,
            direction: AutoScrollDirection::Forward,
            mode,
            interval: interval.max(Duration::from_millis(1)),
            scroll_ref: None,
            overlay_holds: false,
            carry: Duration::ZERO,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_paused(&self) -> bool {
        self.manual_pause || self.overlay_holds
    }

    /// True when a tick would actually move the target.
    pub fn is_scrolling(&self) -> bool {
        self.active && !self.is_paused() && self.scroll_ref.is_some()
    }

    pub fn direction(&self) -> AutoScrollDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: AutoScrollDirection) {
        self.direction = direction;
    }

    pub fn set_mode(&mut self, mode: AutoScrollMode) {
        if self.mode != mode {
            self.mode = mode;
            self.carry = Duration::ZERO;
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(Duration::from_millis(1));
    }

    pub fn set_scroll_ref(&mut self, scroll_ref: Option<ScrollRef>) {
        self.scroll_ref = scroll_ref;
    }

    /// Activate. Without a scroll ref the controller is active but inert.
    pub fn start(&mut self) {
        if self.scroll_ref.is_none() {
            debug!("autoscroll: started without a scroll target, nothing will move");
        }
        self.active = true;
        self.manual_pause = false;
        self.carry = Duration::ZERO;
        debug!("autoscroll: start (paused={})", self.is_paused());
    }

    /// Stop and reset to inactive. Only `start()` brings it back.
    pub fn cancel(&mut self) {
        debug!("autoscroll: cancel");
        self.active = false;
        self.manual_pause = false;
        self.carry = Duration::ZERO;
    }

    pub fn pause(&mut self) {
        if !self.manual_pause {
            debug!("autoscroll: pause");
            self.manual_pause = true;
        }
    }

    /// Drop a manual pause. Has no effect on the overlay hold.
    pub fn resume(&mut self) {
        if self.manual_pause {
            debug!("autoscroll: resume");
            self.manual_pause = false;
        }
    }

    /// Flip `active` without touching the pause state.
    pub fn toggle_active(&mut self) {
        self.active = !self.active;
        self.carry = Duration::ZERO;
        debug!("autoscroll: active={} (paused={})", self.active, self.is_paused());
    }

    /// Track the overlay condition. While it holds the controller is paused
    /// no matter what `resume()` says; when it is released, any pause taken
    /// meanwhile is dropped too, so hiding the overlay always resumes.
    pub fn sync_pause(&mut self, overlay_visible: bool, static_nav: bool) {
        let holds = overlay_visible && !static_nav;
        if holds == self.overlay_holds {
            return;
        }
        debug!("autoscroll: overlay hold {} → {holds}", self.overlay_holds);
        self.overlay_holds = holds;
        if !holds {
            self.manual_pause = false;
        }
    }

    /// Advance the scroll target by `elapsed` worth of motion.
    pub fn tick(&mut self, elapsed: Duration) {
        if !self.active || self.is_paused() {
            return;
        }
        let Some(target) = &self.scroll_ref else {
            return;
        };
        let mut target = target.borrow_mut();
        match self.mode {
            AutoScrollMode::Smooth => {
                let per_sec = target.viewport_extent() / self.interval.as_secs_f64();
                let delta = per_sec * elapsed.as_secs_f64() * self.direction.sign();
                if delta != 0.0 {
                    target.scroll_by(delta);
                }
            }
            AutoScrollMode::Paged => {
                self.carry += elapsed;
                while self.carry >= self.interval {
                    self.carry -= self.interval;
                    target.turn_page(self.direction);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        offset: f64,
        pages: i32,
    }

    impl ScrollTarget for Recorder {
        fn viewport_extent(&self) -> f64 {
            100.0
        }
        fn scroll_by(&mut self, delta: f64) {
            self.offset += delta;
        }
        fn turn_page(&mut self, direction: AutoScrollDirection) {
            self.pages += direction.sign() as i32;
        }
    }

    fn with_target(mode: AutoScrollMode) -> (AutoScroll, Rc<RefCell<Recorder>>) {
        let rec = Rc::new(RefCell::new(Recorder::default()));
        let mut ctl = AutoScroll::new(mode, Duration::from_secs(1));
        let handle: ScrollRef = rec.clone();
        ctl.set_scroll_ref(Some(handle));
        (ctl, rec)
    }

    #[test]
    fn inactive_never_scrolls() {
        let (mut ctl, rec) = with_target(AutoScrollMode::Smooth);
        ctl.tick(Duration::from_secs(1));
        assert_eq!(rec.borrow().offset, 0.0);
    }

    #[test]
    fn smooth_scrolls_one_viewport_per_interval() {
        let (mut ctl, rec) = with_target(AutoScrollMode::Smooth);
        ctl.start();
        ctl.tick(Duration::from_millis(500));
        assert!((rec.borrow().offset - 50.0).abs() < 1e-9);
        ctl.set_direction(AutoScrollDirection::Backward);
        ctl.tick(Duration::from_millis(250));
        assert!((rec.borrow().offset - 25.0).abs() < 1e-9);
    }

    #[test]
    fn paged_turns_on_full_intervals() {
        let (mut ctl, rec) = with_target(AutoScrollMode::Paged);
        ctl.start();
        ctl.tick(Duration::from_millis(700));
        assert_eq!(rec.borrow().pages, 0);
        ctl.tick(Duration::from_millis(700));
        assert_eq!(rec.borrow().pages, 1);
        ctl.tick(Duration::from_millis(2000));
        assert_eq!(rec.borrow().pages, 3);
    }

    #[test]
    fn paused_does_not_scroll() {
        let (mut ctl, rec) = with_target(AutoScrollMode::Smooth);
        ctl.start();
        ctl.pause();
        ctl.tick(Duration::from_secs(1));
        assert_eq!(rec.borrow().offset, 0.0);
        ctl.resume();
        ctl.tick(Duration::from_secs(1));
        assert!(rec.borrow().offset > 0.0);
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let mut ctl = AutoScroll::new(AutoScrollMode::Smooth, Duration::from_secs(1));
        ctl.pause();
        ctl.pause();
        assert!(ctl.is_paused());
        ctl.resume();
        ctl.resume();
        assert!(!ctl.is_paused());
    }

    #[test]
    fn pause_is_sticky_across_reactivation() {
        let (mut ctl, rec) = with_target(AutoScrollMode::Smooth);
        ctl.start();
        ctl.pause();
        ctl.toggle_active();
        ctl.toggle_active();
        assert!(ctl.is_active());
        assert!(ctl.is_paused());
        ctl.tick(Duration::from_secs(1));
        assert_eq!(rec.borrow().offset, 0.0);
    }

    #[test]
    fn cancel_requires_start() {
        let (mut ctl, rec) = with_target(AutoScrollMode::Smooth);
        ctl.start();
        ctl.cancel();
        assert!(!ctl.is_active());
        ctl.resume();
        ctl.tick(Duration::from_secs(1));
        assert_eq!(rec.borrow().offset, 0.0);
        ctl.start();
        ctl.tick(Duration::from_secs(1));
        assert!(rec.borrow().offset > 0.0);
    }

    #[test]
    fn start_without_target_is_inert() {
        let mut ctl = AutoScroll::new(AutoScrollMode::Smooth, Duration::from_secs(1));
        ctl.start();
        assert!(ctl.is_active());
        assert!(!ctl.is_scrolling());
        ctl.tick(Duration::from_secs(1));
    }

    #[test]
    fn overlay_drives_pause_both_ways() {
        let mut ctl = AutoScroll::new(AutoScrollMode::Smooth, Duration::from_secs(1));
        ctl.start();
        for _ in 0..3 {
            ctl.sync_pause(true, false);
            assert!(ctl.is_paused());
            ctl.sync_pause(false, false);
            assert!(!ctl.is_paused());
        }
    }

    #[test]
    fn static_nav_ignores_overlay() {
        let mut ctl = AutoScroll::new(AutoScrollMode::Smooth, Duration::from_secs(1));
        ctl.start();
        ctl.sync_pause(true, true);
        assert!(!ctl.is_paused());
        // leaving static nav while the overlay is up pauses
        ctl.sync_pause(true, false);
        assert!(ctl.is_paused());
    }

    #[test]
    fn resume_cannot_override_overlay() {
        let (mut ctl, rec) = with_target(AutoScrollMode::Smooth);
        ctl.start();
        ctl.sync_pause(true, false);
        ctl.resume();
        assert!(ctl.is_paused());
        ctl.tick(Duration::from_secs(1));
        assert_eq!(rec.borrow().offset, 0.0);
    }

    #[test]
    fn cancel_and_reactivate_under_overlay_stays_paused() {
        let (mut ctl, rec) = with_target(AutoScrollMode::Smooth);
        ctl.start();
        ctl.sync_pause(true, false);
        ctl.cancel();
        assert!(ctl.is_paused());
        ctl.toggle_active();
        assert!(ctl.is_active());
        assert!(ctl.is_paused());
        ctl.tick(Duration::from_secs(1));
        assert_eq!(rec.borrow().offset, 0.0);
    }

    #[test]
    fn hiding_overlay_clears_manual_pause() {
        let mut ctl = AutoScroll::new(AutoScrollMode::Smooth, Duration::from_secs(1));
        ctl.start();
        ctl.sync_pause(true, false);
        ctl.pause();
        ctl.sync_pause(false, false);
        assert!(!ctl.is_paused());
    }

    #[test]
    fn start_applies_current_overlay_state() {
        let mut ctl = AutoScroll::new(AutoScrollMode::Smooth, Duration::from_secs(1));
        ctl.sync_pause(true, false);
        ctl.cancel();
        ctl.start();
        assert!(ctl.is_paused());
    }
}
