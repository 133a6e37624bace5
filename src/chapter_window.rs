//! Sliding window of mounted chapters for continuous (infinite-scroll) reading.
//!
//! The window `[leading, trailing]` indexes into the session's chapter list.
//! As the viewport nears either end, the edge chapter is checked against the
//! last one seen at that edge; a genuinely new edge chapter extends the
//! window one step so the neighbour is preloaded before the user gets there.

use log::debug;

/// Where to put the viewport when a chapter is (re)entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeMode {
    /// First page.
    Start,
    /// Last page (entered backwards from the following chapter).
    End,
    /// The chapter's last-read page.
    LastRead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEdge {
    Leading,
    Trailing,
}

/// Plain snapshot of the window. `Default` is the freshly mounted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterWindowState {
    pub leading: usize,
    pub trailing: usize,
    /// Source order of the last chapter observed at the leading edge.
    pub last_leading_source_order: Option<i64>,
    /// Source order of the last chapter observed at the trailing edge.
    pub last_trailing_source_order: Option<i64>,
    pub is_leading_chapter_preload_mode: bool,
    pub is_trailing_chapter_preload_mode: bool,
    pub scroll_into_view: bool,
    pub resume_mode: Option<ResumeMode>,
}

impl Default for ChapterWindowState {
    fn default() -> Self {
        Self {
            leading: 0,
            trailing: 0,
            last_leading_source_order: None,
            last_trailing_source_order: None,
            is_leading_chapter_preload_mode: true,
            is_trailing_chapter_preload_mode: true,
            scroll_into_view: false,
            resume_mode: None,
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ChapterWindowUpdate {
    pub leading: Option<usize>,
    pub trailing: Option<usize>,
    pub last_leading_source_order: Option<Option<i64>>,
    pub last_trailing_source_order: Option<Option<i64>>,
    pub is_leading_chapter_preload_mode: Option<bool>,
    pub is_trailing_chapter_preload_mode: Option<bool>,
    pub scroll_into_view: Option<bool>,
    pub resume_mode: Option<Option<ResumeMode>>,
}

/// One-shot instruction for the scroll-restoring logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollInstruction {
    pub chapter: usize,
    pub resume_mode: Option<ResumeMode>,
}

#[derive(Debug, Default)]
pub struct ChapterWindow {
    state: ChapterWindowState,
    chapter_count: usize,
    /// Chapter the pending scroll instruction refers to.
    scroll_chapter: usize,
}

impl ChapterWindow {
    pub fn new(chapter_count: usize) -> Self {
        Self {
            chapter_count,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &ChapterWindowState {
        &self.state
    }

    pub fn leading(&self) -> usize {
        self.state.leading
    }

    pub fn trailing(&self) -> usize {
        self.state.trailing
    }

    pub fn chapter_count(&self) -> usize {
        self.chapter_count
    }

    /// Mounted chapter indices, leading first.
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.state.leading..=self.state.trailing
    }

    pub fn set_chapter_count(&mut self, chapter_count: usize) {
        self.chapter_count = chapter_count;
        self.normalize();
    }

    /// Merge a partial update, then clamp back into a valid window.
    pub fn update(&mut self, update: ChapterWindowUpdate) {
        let s = &mut self.state;
        if let Some(v) = update.leading {
            s.leading = v;
        }
        if let Some(v) = update.trailing {
            s.trailing = v;
        }
        if let Some(v) = update.last_leading_source_order {
            s.last_leading_source_order = v;
        }
        if let Some(v) = update.last_trailing_source_order {
            s.last_trailing_source_order = v;
        }
        if let Some(v) = update.is_leading_chapter_preload_mode {
            s.is_leading_chapter_preload_mode = v;
        }
        if let Some(v) = update.is_trailing_chapter_preload_mode {
            s.is_trailing_chapter_preload_mode = v;
        }
        if let Some(v) = update.scroll_into_view {
            s.scroll_into_view = v;
        }
        if let Some(v) = update.resume_mode {
            s.resume_mode = v;
        }
        self.normalize();
    }

    /// Observe the chapter currently at `edge`.
    ///
    /// `near_edge` is whether the viewport is within the preload distance of
    /// that edge. Returns the index of the newly mounted chapter when the
    /// window grew.
    pub fn observe_edge(
        &mut self,
        edge: WindowEdge,
        source_order: i64,
        near_edge: bool,
    ) -> Option<usize> {
        if !near_edge {
            return None;
        }
        let last_max = self.last_index();
        let s = &mut self.state;
        let (last, preload) = match edge {
            WindowEdge::Leading => (
                &mut s.last_leading_source_order,
                &mut s.is_leading_chapter_preload_mode,
            ),
            WindowEdge::Trailing => (
                &mut s.last_trailing_source_order,
                &mut s.is_trailing_chapter_preload_mode,
            ),
        };
        if *last == Some(source_order) {
            return None;
        }
        *last = Some(source_order);

        let grown = match edge {
            WindowEdge::Leading if s.leading > 0 => {
                s.leading -= 1;
                Some(s.leading)
            }
            WindowEdge::Trailing if s.trailing < last_max => {
                s.trailing += 1;
                Some(s.trailing)
            }
            _ => None,
        };
        *preload = grown.is_some();
        debug!(
            "window: {edge:?} edge at source_order={source_order} → [{}, {}] (grown={grown:?})",
            s.leading, s.trailing
        );
        grown
    }

    /// Collapse the window onto one chapter and arm a scroll instruction.
    pub fn open_chapter(&mut self, index: usize, resume_mode: Option<ResumeMode>) {
        let index = index.min(self.last_index());
        debug!("window: open chapter {index} (resume={resume_mode:?})");
        self.state = ChapterWindowState {
            leading: index,
            trailing: index,
            scroll_into_view: true,
            resume_mode,
            ..ChapterWindowState::default()
        };
        self.scroll_chapter = index;
    }

    /// Read and clear the pending scroll instruction.
    pub fn take_scroll_instruction(&mut self) -> Option<ScrollInstruction> {
        if !self.state.scroll_into_view {
            return None;
        }
        self.state.scroll_into_view = false;
        Some(ScrollInstruction {
            chapter: self.scroll_chapter,
            resume_mode: self.state.resume_mode.take(),
        })
    }

    pub fn reset(&mut self) {
        self.state = ChapterWindowState::default();
        self.scroll_chapter = 0;
        self.normalize();
    }

    fn last_index(&self) -> usize {
        self.chapter_count.saturating_sub(1)
    }

    fn normalize(&mut self) {
        let max = self.last_index();
        let s = &mut self.state;
        s.leading = s.leading.min(max);
        s.trailing = s.trailing.min(max);
        if s.leading > s.trailing {
            std::mem::swap(&mut s.leading, &mut s.trailing);
        }
        self.scroll_chapter = self.scroll_chapter.min(max);
    }
}
