// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! This event module provides a process-wide event queue.
//! It is based on Mutex. Mutex is easy to use despite a tiny loss of
//! performance. Another way to achieve this is to put the queue in a context
//! object. However, it requires access to context from everywhere, which is
//! again not ideal.
//!
//! Native window and input events delivered by the windowing backend are
//! converted into the unified [`Event`] here. The queue is single producer
//! (the native callback runs on the context thread) and single consumer.

use bitflags::bitflags;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, sync::Mutex};

lazy_static! {
    static ref EVENT_QUEUE: Mutex<VecDeque<Event>> = Mutex::new(VecDeque::new());
    static ref EVENT_MASK: Mutex<EventMask> = Mutex::new(EventMask::empty());
}

bitflags! {
    /// Selects which native events get translated and queued.
    #[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash)]
    pub struct EventMask: u32 {
        const FRAMEBUFFER_RESIZE = 0b0000_0000_0001;
        const WINDOW_POS         = 0b0000_0000_0010;
        const WINDOW_SIZE        = 0b0000_0000_0100;
        const WINDOW_CLOSE       = 0b0000_0000_1000;
        const WINDOW_MAXIMIZE    = 0b0000_0001_0000;
        const KEY                = 0b0000_0010_0000;
        const CURSOR_ENTER       = 0b0000_0100_0000;
        const CURSOR_POS         = 0b0000_1000_0000;
        const MOUSE_BUTTON       = 0b0001_0000_0000;
        const MOUSE_SCROLL       = 0b0010_0000_0000;
    }
}

/// Unified event with a typed payload per kind.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum Event {
    /// drawable framebuffer size changed (physical pixels)
    FramebufferResize { width: u32, height: u32 },
    /// window moved (screen coordinates)
    WindowPos { x: i32, y: i32 },
    /// window resized (logical size)
    WindowSize { width: u32, height: u32 },
    /// close requested
    WindowClose,
    /// maximized or restored
    WindowMaximize { maximized: bool },
    /// a single key event with additional pressed modifiers
    Key(KeyEvent),
    /// cursor entered or left the window
    CursorEnter { entered: bool },
    /// cursor moved (window coordinates)
    CursorPos { x: f64, y: f64 },
    /// a single mouse button event
    MouseButton(MouseEvent),
    /// scroll wheel delta
    MouseScroll { dx: f64, dy: f64 },
}

impl Event {
    /// the mask bit this event belongs to
    pub fn mask(&self) -> EventMask {
        match self {
            Event::FramebufferResize { .. } => EventMask::FRAMEBUFFER_RESIZE,
            Event::WindowPos { .. } => EventMask::WINDOW_POS,
            Event::WindowSize { .. } => EventMask::WINDOW_SIZE,
            Event::WindowClose => EventMask::WINDOW_CLOSE,
            Event::WindowMaximize { .. } => EventMask::WINDOW_MAXIMIZE,
            Event::Key(_) => EventMask::KEY,
            Event::CursorEnter { .. } => EventMask::CURSOR_ENTER,
            Event::CursorPos { .. } => EventMask::CURSOR_POS,
            Event::MouseButton(_) => EventMask::MOUSE_BUTTON,
            Event::MouseScroll { .. } => EventMask::MOUSE_SCROLL,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct MouseEvent {
    /// the kind of mouse event that was caused
    pub kind: MouseEventKind,
    /// cursor position when the event occurred (window coordinates)
    pub x: f64,
    pub y: f64,
    /// the key modifiers active when the event occurred
    pub modifiers: KeyModifiers,
}

#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum MouseEventKind {
    /// pressed mouse button; contains the button that was pressed
    Down(MouseButton),
    /// released mouse button; contains the button that was released
    Up(MouseButton),
}

#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

bitflags! {
    /// Represents key modifiers (shift, control, alt, etc.).
    #[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 0b0000_0001;
        const CONTROL = 0b0000_0010;
        const ALT = 0b0000_0100;
        const SUPER = 0b0000_1000;
        const NONE = 0b0000_0000;
    }
}

#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum KeyEventKind {
    Press,
    Repeat,
    Release,
}

/// Represents a key event.
#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    /// the key itself
    pub code: KeyCode,
    /// additional key modifiers
    pub modifiers: KeyModifiers,
    /// kind of event
    pub kind: KeyEventKind,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
        }
    }

    pub const fn new_with_kind(
        code: KeyCode,
        modifiers: KeyModifiers,
        kind: KeyEventKind,
    ) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind,
        }
    }
}

/// Represents a key.
#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// Backspace key.
    Backspace,
    /// Enter key.
    Enter,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page up key.
    PageUp,
    /// Page down key.
    PageDown,
    /// Tab key.
    Tab,
    /// Delete key.
    Delete,
    /// Insert key.
    Insert,
    /// F key.
    /// `KeyCode::F(1)` represents F1 key, etc.
    F(u8),
    /// A character.
    /// `KeyCode::Char('c')` represents `c` character, etc.
    Char(char),
    /// Escape key.
    Esc,
}

/// Queue an event. Any thread may push; the renderer pushes from its
/// native callback on the context thread.
pub fn push_event(e: Event) {
    EVENT_QUEUE.lock().unwrap().push_back(e);
}

/// Pop the next queued event, oldest first.
pub fn pop_event() -> Option<Event> {
    EVENT_QUEUE.lock().unwrap().pop_front()
}

/// Peek whether anything is queued.
pub fn has_event() -> bool {
    !EVENT_QUEUE.lock().unwrap().is_empty()
}

/// Drop everything queued. Used on renderer teardown.
pub fn clear_events() {
    EVENT_QUEUE.lock().unwrap().clear();
}

/// Install translation for the event kinds in `mask`.
pub fn enable_event(mask: EventMask) {
    let mut m = EVENT_MASK.lock().unwrap();
    *m |= mask;
}

/// Remove translation for the event kinds in `mask`.
pub fn disable_event(mask: EventMask) {
    let mut m = EVENT_MASK.lock().unwrap();
    *m &= !mask;
}

/// Currently enabled event kinds.
pub fn event_mask() -> EventMask {
    *EVENT_MASK.lock().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_fifo() {
        clear_events();
        push_event(Event::WindowClose);
        push_event(Event::CursorEnter { entered: true });
        assert!(has_event());
        assert_eq!(pop_event(), Some(Event::WindowClose));
        assert_eq!(pop_event(), Some(Event::CursorEnter { entered: true }));
        assert_eq!(pop_event(), None);
        assert!(!has_event());
    }

    #[test]
    fn enable_then_disable_is_identity() {
        let before = event_mask();
        enable_event(EventMask::KEY | EventMask::MOUSE_BUTTON);
        disable_event(EventMask::KEY | EventMask::MOUSE_BUTTON);
        assert_eq!(event_mask() & (EventMask::KEY | EventMask::MOUSE_BUTTON),
                   before & (EventMask::KEY | EventMask::MOUSE_BUTTON));
    }

    #[test]
    fn every_event_maps_to_one_mask_bit() {
        let es = [
            Event::FramebufferResize { width: 1, height: 1 },
            Event::WindowPos { x: 0, y: 0 },
            Event::WindowSize { width: 1, height: 1 },
            Event::WindowClose,
            Event::WindowMaximize { maximized: true },
            Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE)),
            Event::CursorEnter { entered: false },
            Event::CursorPos { x: 1.0, y: 2.0 },
            Event::MouseButton(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                x: 0.0,
                y: 0.0,
                modifiers: KeyModifiers::NONE,
            }),
            Event::MouseScroll { dx: 0.0, dy: 1.0 },
        ];
        for e in es {
            assert_eq!(e.mask().bits().count_ones(), 1);
        }
    }
}
