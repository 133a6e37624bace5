//! Input processing layer: terminal key / mouse events to viewer actions.
//!
//! Pure logic, no I/O. All functions are deterministic and testable.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

const WHEEL_ROWS: i32 = 3;

/// Actions produced by input processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Action {
    Quit,
    /// Manual scroll by rows (positive = forward).
    ScrollRows(i32),
    PageForward,
    PageBackward,
    NextChapter,
    PrevChapter,
    /// Jump back to the last-read page of the current chapter.
    ResumeChapter,
    ToggleOverlay,
    ToggleSettings,
    ToggleStaticNav,
    /// Space: start auto-scroll if stopped, otherwise flip active.
    AutoScrollToggle,
    AutoScrollCancel,
    AutoScrollPause,
    AutoScrollReverse,
    PointerDown { col: u16, row: u16 },
    PointerDrag { col: u16, row: u16 },
    PointerUp,
    Resize { cols: u16, rows: u16 },
}

pub(super) fn map_event(ev: Event) -> Option<Action> {
    match ev {
        Event::Key(key) => map_key_event(key),
        Event::Mouse(mouse) => map_mouse_event(mouse),
        Event::Resize(cols, rows) => Some(Action::Resize { cols, rows }),
        _ => None,
    }
}

fn map_key_event(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let KeyEvent { code, modifiers, .. } = key;

    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            Some(Action::Quit)
        }

        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(Action::ScrollRows(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(Action::ScrollRows(-1)),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) | (KeyCode::PageDown, _) => {
            Some(Action::PageForward)
        }
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) | (KeyCode::PageUp, _) => {
            Some(Action::PageBackward)
        }
        (KeyCode::Char('n'), _) => Some(Action::NextChapter),
        (KeyCode::Char('N'), _) => Some(Action::PrevChapter),
        (KeyCode::Char('r'), _) => Some(Action::ResumeChapter),

        (KeyCode::Char('m'), _) | (KeyCode::Enter, _) => Some(Action::ToggleOverlay),
        (KeyCode::Char('s'), _) => Some(Action::ToggleSettings),
        (KeyCode::Char('t'), _) => Some(Action::ToggleStaticNav),

        (KeyCode::Char(' '), _) => Some(Action::AutoScrollToggle),
        (KeyCode::Char('x'), _) => Some(Action::AutoScrollCancel),
        (KeyCode::Char('p'), _) => Some(Action::AutoScrollPause),
        (KeyCode::Char('b'), _) => Some(Action::AutoScrollReverse),

        _ => None,
    }
}

fn map_mouse_event(mouse: MouseEvent) -> Option<Action> {
    let MouseEvent { kind, column, row, .. } = mouse;
    match kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Action::PointerDown { col: column, row }),
        MouseEventKind::Drag(MouseButton::Left) => Some(Action::PointerDrag { col: column, row }),
        MouseEventKind::Up(MouseButton::Left) => Some(Action::PointerUp),
        MouseEventKind::ScrollDown => Some(Action::ScrollRows(WHEEL_ROWS)),
        MouseEventKind::ScrollUp => Some(Action::ScrollRows(-WHEEL_ROWS)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn simple_key(code: KeyCode) -> Event {
        key(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_q_quits() {
        assert_eq!(map_event(simple_key(KeyCode::Char('q'))), Some(Action::Quit));
    }

    #[test]
    fn test_ctrl_c_quits() {
        assert_eq!(
            map_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_space_toggles_auto_scroll() {
        assert_eq!(
            map_event(simple_key(KeyCode::Char(' '))),
            Some(Action::AutoScrollToggle)
        );
    }

    #[test]
    fn test_chapter_keys() {
        assert_eq!(map_event(simple_key(KeyCode::Char('n'))), Some(Action::NextChapter));
        assert_eq!(
            map_event(key(KeyCode::Char('N'), KeyModifiers::SHIFT)),
            Some(Action::PrevChapter)
        );
    }

    #[test]
    fn test_release_ignored() {
        let ev = Event::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(map_event(ev), None);
    }

    #[test]
    fn test_left_click_is_pointer_down() {
        assert_eq!(
            map_event(mouse(MouseEventKind::Down(MouseButton::Left), 4, 7)),
            Some(Action::PointerDown { col: 4, row: 7 })
        );
    }

    #[test]
    fn test_drag_and_release() {
        assert_eq!(
            map_event(mouse(MouseEventKind::Drag(MouseButton::Left), 9, 2)),
            Some(Action::PointerDrag { col: 9, row: 2 })
        );
        assert_eq!(
            map_event(mouse(MouseEventKind::Up(MouseButton::Left), 9, 2)),
            Some(Action::PointerUp)
        );
    }

    #[test]
    fn test_right_click_ignored() {
        assert_eq!(
            map_event(mouse(MouseEventKind::Down(MouseButton::Right), 0, 0)),
            None
        );
    }

    #[test]
    fn test_wheel_scrolls() {
        assert_eq!(
            map_event(mouse(MouseEventKind::ScrollDown, 0, 0)),
            Some(Action::ScrollRows(3))
        );
    }

    #[test]
    fn test_unknown_key_returns_none() {
        assert_eq!(map_event(simple_key(KeyCode::Char('z'))), None);
    }
}
