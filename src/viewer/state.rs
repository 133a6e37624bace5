//! Viewer state: terminal layout, the scrollable viewport and the geometry of
//! the mounted chapter strip.

use std::ops::RangeInclusive;

use log::debug;

use crate::auto_scroll::{AutoScrollDirection, ScrollTarget};
use crate::chapter_window::{ResumeMode, ScrollInstruction};
use crate::library::Chapter;
use crate::progress_bar::ProgressBarPosition;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

pub(super) struct Layout {
    pub cols: u16,
    pub rows: u16,
    pub content_rows: u16, // 本文領域の高さ (= rows - 1)
    pub status_row: u16,   // ステータスバーの行 (= rows - 1)
}

pub(super) fn compute_layout(cols: u16, rows: u16) -> Layout {
    let content_rows = rows.saturating_sub(1).max(1);
    Layout {
        cols,
        rows,
        content_rows,
        status_row: rows.saturating_sub(1),
    }
}

/// Where the progress bar is drawn when the overlay is visible.
pub(super) enum BarGeometry {
    /// Horizontal bar on `row`, spanning `cols`.
    Row { row: u16, cols: u16 },
    /// Vertical bar in `col`, spanning rows `1..=last_row`.
    Column { col: u16, last_row: u16 },
}

pub(super) fn bar_geometry(layout: &Layout, position: ProgressBarPosition) -> BarGeometry {
    let last_content = layout.content_rows.saturating_sub(1);
    match position {
        ProgressBarPosition::Bottom => BarGeometry::Row {
            row: last_content,
            cols: layout.cols,
        },
        ProgressBarPosition::Left => BarGeometry::Column {
            col: 0,
            last_row: last_content.saturating_sub(1),
        },
        ProgressBarPosition::Right => BarGeometry::Column {
            col: layout.cols.saturating_sub(1),
            last_row: last_content.saturating_sub(1),
        },
    }
}

/// Fraction along the progress bar under a pointer, or `None` if the pointer
/// is not on the bar.
pub(super) fn bar_fraction(
    layout: &Layout,
    position: ProgressBarPosition,
    col: u16,
    row: u16,
) -> Option<f64> {
    match bar_geometry(layout, position) {
        BarGeometry::Row { row: bar_row, cols } => {
            (row == bar_row && cols > 0).then(|| (col as f64 + 0.5) / cols as f64)
        }
        BarGeometry::Column { col: bar_col, last_row } => {
            let span = last_row.saturating_sub(1) + 1; // rows 1..=last_row
            (col == bar_col && (1..=last_row).contains(&row))
                .then(|| ((row - 1) as f64 + 0.5) / span as f64)
        }
    }
}

// ---------------------------------------------------------------------------
// Strip — chapters of the mounted window laid out top to bottom
// ---------------------------------------------------------------------------

/// Row geometry of the mounted chapters. Each chapter is one header row
/// followed by `page_count * page_rows` page rows.
pub(super) struct Strip {
    /// (chapter index, first row) for each mounted chapter.
    offsets: Vec<(usize, u32)>,
    total_rows: u32,
    page_rows: u32,
}

impl Strip {
    pub(super) fn build(chapters: &[Chapter], window: RangeInclusive<usize>, page_rows: u16) -> Self {
        let page_rows = page_rows.max(1) as u32;
        let mut offsets = Vec::new();
        let mut row = 0u32;
        for idx in window {
            let Some(ch) = chapters.get(idx) else { break };
            offsets.push((idx, row));
            row = row.saturating_add(chapter_rows(ch, page_rows));
        }
        Self {
            offsets,
            total_rows: row,
            page_rows,
        }
    }

    pub(super) fn total_rows(&self) -> u32 {
        self.total_rows
    }

    pub(super) fn page_rows(&self) -> u32 {
        self.page_rows
    }

    pub(super) fn chapter_start(&self, chapter: usize) -> Option<u32> {
        self.offsets
            .iter()
            .find(|(idx, _)| *idx == chapter)
            .map(|(_, row)| *row)
    }

    /// Chapter index and row-within-chapter at an absolute strip row.
    pub(super) fn locate(&self, row: u32) -> Option<(usize, u32)> {
        self.offsets
            .iter()
            .rev()
            .find(|(_, start)| *start <= row)
            .map(|(idx, start)| (*idx, row - start))
    }

    /// Row to scroll to when honouring a scroll instruction.
    pub(super) fn instruction_row(
        &self,
        chapters: &[Chapter],
        instruction: &ScrollInstruction,
    ) -> u32 {
        let Some(start) = self.chapter_start(instruction.chapter) else {
            return 0;
        };
        let Some(ch) = chapters.get(instruction.chapter) else {
            return start;
        };
        let page = match instruction.resume_mode {
            None | Some(ResumeMode::Start) => return start,
            Some(ResumeMode::End) => ch.page_count.saturating_sub(1),
            Some(ResumeMode::LastRead) => ch.last_page_read,
        };
        page_offset(start, page, self.page_rows)
    }

    pub(super) fn page_row(&self, chapter: usize, page: usize) -> Option<u32> {
        self.chapter_start(chapter)
            .map(|start| page_offset(start, page, self.page_rows))
    }

    /// Page rows of each mounted chapter, in strip order.
    pub(super) fn page_spans(&self) -> Vec<PageSpan> {
        self.offsets
            .iter()
            .enumerate()
            .map(|(i, (_, start))| PageSpan {
                first: start.saturating_add(1),
                end: self
                    .offsets
                    .get(i + 1)
                    .map_or(self.total_rows, |(_, next)| *next),
            })
            .collect()
    }
}

// Row counts saturate at u32::MAX instead of wrapping on absurd page counts.
fn page_offset(start: u32, page: usize, page_rows: u32) -> u32 {
    let page = u32::try_from(page).unwrap_or(u32::MAX);
    start
        .saturating_add(1)
        .saturating_add(page.saturating_mul(page_rows))
}

pub(super) fn chapter_rows(ch: &Chapter, page_rows: u32) -> u32 {
    u32::try_from(ch.page_count)
        .unwrap_or(u32::MAX)
        .saturating_mul(page_rows)
        .saturating_add(1)
}

/// Page rows `[first, end)` of one mounted chapter, one page every
/// `page_rows` rows. The chapter header sits just above `first`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct PageSpan {
    pub first: u32,
    pub end: u32,
}

impl PageSpan {
    /// First page boundary strictly after `y`.
    fn next_after(self, y: f64, page_rows: f64) -> Option<f64> {
        let (first, end) = (self.first as f64, self.end as f64);
        if end <= first {
            return None;
        }
        if y < first - EPS {
            return Some(first);
        }
        let k = ((y - first + EPS) / page_rows).floor() + 1.0;
        let row = first + k * page_rows;
        (row < end).then_some(row)
    }

    /// Last page boundary strictly before `y`.
    fn prev_before(self, y: f64, page_rows: f64) -> Option<f64> {
        let (first, end) = (self.first as f64, self.end as f64);
        if end <= first || first >= y - EPS {
            return None;
        }
        let last = first + ((end - first - 1.0) / page_rows).floor() * page_rows;
        let k = ((y - first - EPS) / page_rows).ceil() - 1.0;
        Some((first + k * page_rows).min(last))
    }
}

const EPS: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Viewport — the auto-scroll target
// ---------------------------------------------------------------------------

/// Scroll position over the strip, in rows. Fractional so smooth
/// auto-scroll can advance by less than a row per frame.
pub(super) struct Viewport {
    pub y: f64,
    pub extent: f64,
    pub total: f64,
    pub page_rows: f64,
    /// Page boundaries of the mounted strip; page turns snap to these.
    pub spans: Vec<PageSpan>,
}

impl Viewport {
    pub(super) fn new(extent: u16, page_rows: u16) -> Self {
        Self {
            y: 0.0,
            extent: extent as f64,
            total: 0.0,
            page_rows: page_rows.max(1) as f64,
            spans: Vec::new(),
        }
    }

    /// Adopt the geometry of a freshly built strip.
    pub(super) fn set_strip(&mut self, strip: &Strip) {
        self.total = strip.total_rows() as f64;
        self.spans = strip.page_spans();
    }

    pub(super) fn max_scroll(&self) -> f64 {
        (self.total - self.extent).max(0.0)
    }

    pub(super) fn scroll_to(&mut self, y: f64) {
        self.y = y.clamp(0.0, self.max_scroll());
    }

    pub(super) fn top_row(&self) -> u32 {
        self.y.floor() as u32
    }

    /// (near leading edge, near trailing edge) within `distance` rows.
    pub(super) fn near_edges(&self, distance: u32) -> (bool, bool) {
        let d = distance as f64;
        (self.y < d, self.max_scroll() - self.y < d)
    }
}

impl ScrollTarget for Viewport {
    fn viewport_extent(&self) -> f64 {
        self.extent
    }

    fn scroll_by(&mut self, delta: f64) {
        self.scroll_to(self.y + delta);
    }

    fn turn_page(&mut self, direction: AutoScrollDirection) {
        // snap to the neighbouring page start, skipping chapter headers
        let (y, rows) = (self.y, self.page_rows);
        let target = match direction {
            AutoScrollDirection::Forward => self
                .spans
                .iter()
                .find_map(|s| s.next_after(y, rows))
                .unwrap_or(self.total),
            AutoScrollDirection::Backward => self
                .spans
                .iter()
                .rev()
                .find_map(|s| s.prev_before(y, rows))
                .unwrap_or(0.0),
        };
        let old = self.y;
        self.scroll_to(target);
        debug!("viewport: page {direction:?} y {old:.1} → {:.1}", self.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(pages: usize, last_read: usize) -> Chapter {
        Chapter {
            id: 0,
            source_order: 0,
            name: String::new(),
            page_count: pages,
            last_page_read: last_read,
            is_read: false,
        }
    }

    #[test]
    fn layout_reserves_status_row() {
        let l = compute_layout(80, 24);
        assert_eq!(l.content_rows, 23);
        assert_eq!(l.status_row, 23);
    }

    #[test]
    fn strip_offsets() {
        let chapters = vec![chapter(2, 0), chapter(3, 0), chapter(1, 0)];
        let strip = Strip::build(&chapters, 1..=2, 4);
        assert_eq!(strip.chapter_start(1), Some(0));
        assert_eq!(strip.chapter_start(2), Some(13));
        assert_eq!(strip.chapter_start(0), None);
        assert_eq!(strip.total_rows(), 18);
        assert_eq!(strip.locate(12), Some((1, 12)));
        assert_eq!(strip.locate(13), Some((2, 0)));
    }

    #[test]
    fn instruction_rows() {
        let chapters = vec![chapter(5, 3)];
        let strip = Strip::build(&chapters, 0..=0, 2);
        let at = |mode| {
            strip.instruction_row(
                &chapters,
                &ScrollInstruction {
                    chapter: 0,
                    resume_mode: mode,
                },
            )
        };
        assert_eq!(at(None), 0);
        assert_eq!(at(Some(ResumeMode::Start)), 0);
        assert_eq!(at(Some(ResumeMode::LastRead)), 7);
        assert_eq!(at(Some(ResumeMode::End)), 9);
    }

    #[test]
    fn viewport_clamps_and_turns_pages() {
        let chapters = vec![chapter(10, 0)];
        let strip = Strip::build(&chapters, 0..=0, 4);
        let mut vp = Viewport::new(10, 4);
        vp.set_strip(&strip);
        assert_eq!(vp.total, 41.0);
        vp.scroll_by(-5.0);
        assert_eq!(vp.y, 0.0);
        vp.turn_page(AutoScrollDirection::Forward);
        assert_eq!(vp.y, 1.0);
        vp.turn_page(AutoScrollDirection::Forward);
        assert_eq!(vp.y, 5.0);
        vp.scroll_by(1.5);
        vp.turn_page(AutoScrollDirection::Backward);
        assert_eq!(vp.y, 5.0);
        vp.scroll_by(100.0);
        assert_eq!(vp.y, 31.0);
    }

    #[test]
    fn page_turns_skip_chapter_headers() {
        // ch0: header 0, pages at 1 and 5; ch1: header 9, pages at 10, 14, 18
        let chapters = vec![chapter(2, 0), chapter(3, 0)];
        let strip = Strip::build(&chapters, 0..=1, 4);
        let mut vp = Viewport::new(5, 4);
        vp.set_strip(&strip);

        let mut forward = Vec::new();
        for _ in 0..5 {
            vp.turn_page(AutoScrollDirection::Forward);
            forward.push(vp.y);
        }
        assert_eq!(forward, [1.0, 5.0, 10.0, 14.0, 17.0]);
        assert_eq!(Some(forward[2] as u32), strip.page_row(1, 0));

        let mut backward = Vec::new();
        for _ in 0..5 {
            vp.turn_page(AutoScrollDirection::Backward);
            backward.push(vp.y);
        }
        assert_eq!(backward, [14.0, 10.0, 5.0, 1.0, 0.0]);
    }

    #[test]
    fn huge_page_counts_saturate() {
        let chapters = vec![chapter(usize::MAX, usize::MAX), chapter(3, 0)];
        let strip = Strip::build(&chapters, 0..=1, 4);
        assert_eq!(strip.total_rows(), u32::MAX);
        assert_eq!(strip.chapter_start(1), Some(u32::MAX));
        assert_eq!(strip.page_row(0, usize::MAX), Some(u32::MAX));
        assert_eq!(strip.page_row(1, 2), Some(u32::MAX));
        let row = strip.instruction_row(
            &chapters,
            &ScrollInstruction {
                chapter: 0,
                resume_mode: Some(ResumeMode::LastRead),
            },
        );
        assert_eq!(row, u32::MAX);
    }

    #[test]
    fn near_edges() {
        let mut vp = Viewport::new(10, 4);
        vp.total = 100.0;
        assert_eq!(vp.near_edges(5), (true, false));
        vp.scroll_to(88.0);
        assert_eq!(vp.near_edges(5), (false, true));
    }

    #[test]
    fn bottom_bar_fraction() {
        let l = compute_layout(10, 12);
        assert_eq!(bar_fraction(&l, ProgressBarPosition::Bottom, 0, 10), Some(0.05));
        assert_eq!(bar_fraction(&l, ProgressBarPosition::Bottom, 0, 5), None);
    }

    #[test]
    fn side_bar_fraction() {
        let l = compute_layout(10, 12);
        // content rows 0..=10, bar spans rows 1..=9
        assert!(bar_fraction(&l, ProgressBarPosition::Right, 9, 1).is_some());
        assert_eq!(bar_fraction(&l, ProgressBarPosition::Right, 9, 0), None);
        assert_eq!(bar_fraction(&l, ProgressBarPosition::Left, 9, 3), None);
    }
}
