//! Chapter progress bar: maximize / drag state and pointer-to-page mapping.

use log::debug;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressBarPosition {
    #[default]
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingDirection {
    #[default]
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipPlacement {
    Top,
    Right,
    Left,
}

/// Tooltips open away from the screen edge the bar is docked to.
pub fn tooltip_placement(position: ProgressBarPosition) -> TooltipPlacement {
    match position {
        ProgressBarPosition::Bottom => TooltipPlacement::Top,
        ProgressBarPosition::Left => TooltipPlacement::Right,
        ProgressBarPosition::Right => TooltipPlacement::Left,
    }
}

/// Page index under a pointer at `fraction` (0.0 = bar start) of the bar.
///
/// A bottom bar follows the reading direction, so in right-to-left mode the
/// first page sits at the right end. Side bars always run top to bottom.
/// Returns `None` for chapters without pages.
pub fn page_at(
    fraction: f64,
    page_count: usize,
    position: ProgressBarPosition,
    direction: ReadingDirection,
) -> Option<usize> {
    if page_count == 0 {
        return None;
    }
    let f = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let f = match (position, direction) {
        (ProgressBarPosition::Bottom, ReadingDirection::Rtl) => 1.0 - f,
        _ => f,
    };
    let idx = (f * page_count as f64).floor() as usize;
    Some(idx.min(page_count - 1))
}

#[derive(Debug, Default)]
pub struct ProgressBar {
    maximized: bool,
    dragging: bool,
}

impl ProgressBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_maximized(&self) -> bool {
        self.maximized
    }

    pub fn set_maximized(&mut self, maximized: bool) {
        self.maximized = maximized;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        if self.dragging != dragging {
            debug!("progress: dragging={dragging}");
        }
        self.dragging = dragging;
    }

    /// A drag counts as continuous interaction: idle auto-hide must wait.
    pub fn suppresses_auto_hide(&self) -> bool {
        self.dragging
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
