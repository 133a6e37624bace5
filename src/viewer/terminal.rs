//! Terminal I/O layer: raw mode, mouse capture, page strip, overlay bars.

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    style::{self, Stylize},
    terminal,
};
use std::io::{self, Write, stdout};

use super::state::{BarGeometry, Layout, Strip, Viewport, bar_geometry};
use crate::progress_bar::{ProgressBarPosition, ReadingDirection, TooltipPlacement, tooltip_placement};
use crate::session::ReaderSession;

// ---------------------------------------------------------------------------
// RawGuard — Drop で raw mode / alternate screen / mouse capture を確実に復元
// ---------------------------------------------------------------------------

pub(super) struct RawGuard {
    cleaned: bool,
}

impl RawGuard {
    pub(super) fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        out.execute(terminal::EnterAlternateScreen)?;
        out.execute(EnableMouseCapture)?;
        out.execute(cursor::Hide)?;
        Ok(Self { cleaned: false })
    }

    pub(super) fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;
        let mut out = stdout();
        let _ = out.execute(cursor::Show);
        let _ = out.execute(DisableMouseCapture);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Drop for RawGuard {
    fn drop(&mut self) {
        self.cleanup();
    }
}

pub(super) fn check_tty() -> anyhow::Result<()> {
    use std::io::IsTerminal;
    if !io::stdout().is_terminal() {
        anyhow::bail!(
            "mangaview viewer requires an interactive terminal.\n\
             \n\
             To test tap zones without one, use: mangaview classify <x> <y>"
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Frame drawing
// ---------------------------------------------------------------------------

/// Everything a frame needs to be drawn.
pub(super) struct FrameCtx<'a> {
    pub layout: &'a Layout,
    pub session: &'a ReaderSession,
    pub strip: &'a Strip,
    pub viewport: &'a Viewport,
    pub title: &'a str,
    pub flash: Option<&'a str>,
}

/// Full redraw: page strip, overlay (top bar, progress bar, settings panel)
/// and status bar.
pub(super) fn draw_frame(ctx: &FrameCtx) -> io::Result<()> {
    let mut out = stdout();
    let width = ctx.layout.cols as usize;
    let top = ctx.viewport.top_row();

    for i in 0..ctx.layout.content_rows {
        out.queue(cursor::MoveTo(0, i))?;
        let line = strip_line(ctx, top + i as u32);
        write!(out, "{line:<width$.width$}")?;
    }

    if ctx.session.overlay().is_visible() {
        draw_top_bar(&mut out, ctx)?;
        draw_progress_bar(&mut out, ctx)?;
        if ctx.session.overlay().is_settings_open() {
            draw_settings_panel(&mut out, ctx)?;
        }
    }

    draw_status_bar(&mut out, ctx)?;
    out.flush()
}

fn strip_line(ctx: &FrameCtx, row: u32) -> String {
    if row >= ctx.strip.total_rows() {
        return "~".to_string();
    }
    let Some((idx, local)) = ctx.strip.locate(row) else {
        return String::new();
    };
    let Some(ch) = ctx.session.chapters().get(idx) else {
        return String::new();
    };
    if local == 0 {
        let read = if ch.is_read { " (read)" } else { "" };
        return format!("━━━━ {}{read} ━━━━", ch.name);
    }
    let page_rows = ctx.strip.page_rows();
    let page = (local - 1) / page_rows;
    let line = (local - 1) % page_rows;
    let inner = (ctx.layout.cols as usize).saturating_sub(4);
    if line == 0 {
        let label = format!(" page {}/{} ", page + 1, ch.page_count);
        format!("  ┌{label:─<inner$}")
    } else if line + 1 == page_rows {
        format!("  └{}", "─".repeat(inner))
    } else {
        "  │".to_string()
    }
}

fn draw_top_bar(out: &mut impl Write, ctx: &FrameCtx) -> io::Result<()> {
    let session = ctx.session;
    let chapter = session
        .chapters()
        .get(session.current_chapter())
        .map_or("", |c| c.name.as_str());
    let text = format!(
        " {} · {}   [tap zones: {}]",
        ctx.title,
        chapter,
        session.config().tap_zone_layout.name()
    );
    out.queue(cursor::MoveTo(0, 0))?;
    let width = ctx.layout.cols as usize;
    let padded = format!("{text:<width$.width$}");
    write!(out, "{}", padded.on_dark_grey().white())?;
    out.queue(style::ResetColor)?;
    Ok(())
}

/// Current page of the current chapter, from the viewport position.
fn current_page(ctx: &FrameCtx) -> Option<(usize, usize)> {
    let (idx, local) = ctx.strip.locate(ctx.viewport.top_row())?;
    let ch = ctx.session.chapters().get(idx)?;
    let page = (local.saturating_sub(1) / ctx.strip.page_rows()) as usize;
    Some((page.min(ch.page_count.saturating_sub(1)), ch.page_count))
}

fn draw_progress_bar(out: &mut impl Write, ctx: &FrameCtx) -> io::Result<()> {
    let config = ctx.session.config();
    let Some((page, count)) = current_page(ctx) else {
        return Ok(());
    };
    let filled = |cells: usize| -> usize {
        if count == 0 {
            0
        } else {
            ((page + 1) * cells).div_ceil(count)
        }
    };
    let bar = ctx.session.progress_bar();
    let thick = bar.is_maximized() || bar.is_dragging();
    let (on, off) = if thick { ('█', '░') } else { ('━', '─') };

    // Cell of the current page, for the drag tooltip.
    let anchor = match bar_geometry(ctx.layout, config.progress_bar_position) {
        BarGeometry::Row { row, cols } => {
            let rtl = config.progress_bar_position == ProgressBarPosition::Bottom
                && config.reading_direction == ReadingDirection::Rtl;
            let cells = cols as usize;
            let n = filled(cells);
            let mut cells_text: String =
                (0..cells).map(|i| if i < n { on } else { off }).collect();
            if rtl {
                cells_text = cells_text.chars().rev().collect();
            }
            out.queue(cursor::MoveTo(0, row))?;
            write!(out, "{}", cells_text.cyan())?;
            let mut at = n.saturating_sub(1) as u16;
            if rtl {
                at = cols.saturating_sub(1).saturating_sub(at);
            }
            (at, row)
        }
        BarGeometry::Column { col, last_row } => {
            let cells = last_row as usize;
            let n = filled(cells);
            for i in 0..cells {
                out.queue(cursor::MoveTo(col, i as u16 + 1))?;
                let c = if i < n { on } else { off };
                write!(out, "{}", c.to_string().cyan())?;
            }
            (col, n.max(1) as u16)
        }
    };
    out.queue(style::ResetColor)?;

    if bar.is_dragging() {
        let label = format!(" {}/{count} ", page + 1);
        let width = label.chars().count() as u16;
        let (col, row) = anchor;
        let (x, y) = match tooltip_placement(config.progress_bar_position) {
            TooltipPlacement::Top => (
                col.saturating_sub(width / 2)
                    .min(ctx.layout.cols.saturating_sub(width)),
                row.saturating_sub(1),
            ),
            TooltipPlacement::Right => (col + 1, row),
            TooltipPlacement::Left => (col.saturating_sub(width), row),
        };
        out.queue(cursor::MoveTo(x, y))?;
        write!(out, "{}", label.black().on_cyan())?;
        out.queue(style::ResetColor)?;
    }
    Ok(())
}

fn draw_settings_panel(out: &mut impl Write, ctx: &FrameCtx) -> io::Result<()> {
    let c = ctx.session.config();
    let lines = [
        " Settings ".to_string(),
        format!(" tap zones:    {}", c.tap_zone_layout.name()),
        format!(
            " invert:       h={} v={}",
            c.tap_zone_invert.horizontal, c.tap_zone_invert.vertical
        ),
        format!(" static nav:   {}", c.static_nav),
        format!(" direction:    {:?}", c.reading_direction),
        format!(" progress bar: {:?}", c.progress_bar_position),
        format!(
            " auto-scroll:  {:?} every {}ms",
            c.auto_scroll_mode,
            c.auto_scroll_interval.as_millis()
        ),
        " (edit the config file to change; s to close)".to_string(),
    ];
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 2;
    let left = (ctx.layout.cols as usize).saturating_sub(width) / 2;
    let top = (ctx.layout.content_rows as usize).saturating_sub(lines.len()) / 2;
    for (i, line) in lines.iter().enumerate() {
        out.queue(cursor::MoveTo(left as u16, (top + i) as u16))?;
        let padded = format!("{line:<width$}");
        write!(out, "{}", padded.black().on_grey())?;
    }
    out.queue(style::ResetColor)?;
    Ok(())
}

fn draw_status_bar(out: &mut impl Write, ctx: &FrameCtx) -> io::Result<()> {
    let session = ctx.session;
    let auto = session.auto_scroll();
    let auto_label = match (auto.is_active(), auto.is_paused()) {
        (false, _) => "off",
        (true, true) => "paused",
        (true, false) if auto.is_scrolling() => "scrolling",
        (true, false) => "idle",
    };
    let page = current_page(ctx)
        .map(|(p, n)| format!("p{}/{n}", p + 1))
        .unwrap_or_default();
    let window = session.chapter_window();
    let middle = match ctx.flash {
        Some(msg) => format!(" {page} | {msg}"),
        None => format!(
            " {page} | auto:{auto_label} | window [{}..{}]  [space:auto m:menu s:settings n/N:chapter q:quit]",
            window.leading() + 1,
            window.trailing() + 1,
        ),
    };
    out.queue(cursor::MoveTo(0, ctx.layout.status_row))?;
    let width = ctx.layout.cols as usize;
    let padded = format!("{middle:<width$.width$}");
    write!(out, "{}", padded.on_dark_grey().white())?;
    out.queue(style::ResetColor)?;
    Ok(())
}

pub(super) fn clear_screen() -> io::Result<()> {
    let mut out = stdout();
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.flush()
}

pub(super) fn terminal_size() -> io::Result<(u16, u16)> {
    terminal::size()
}
