//! The event taxonomy emitted by a [`crate::terminal::Terminal`] and
//! consumed by the engine.

use std::fmt;

/// An event sourced from a [`crate::terminal::Terminal`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// A mouse action occurred.
    Mouse(MouseEvent),
    /// The terminal was resized to the given (width, height).
    Resize(u16, u16),
    /// A non-fatal-by-default error reported by the back end.
    Error(String),
}

impl Event {
    /// The event type tag used for subscriber filtering. `Error` events
    /// are handled separately from filtering (they always deliver),
    /// but still report a tag for completeness.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Key(_) => EventKind::Key,
            Event::Mouse(_) => EventKind::Mouse,
            Event::Resize(..) => EventKind::Resize,
            Event::Error(_) => EventKind::Error,
        }
    }
}

/// The type tag of an [`Event`], used by [`crate::dist`] subscriber
/// filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Tag for [`Event::Key`].
    Key,
    /// Tag for [`Event::Mouse`].
    Mouse,
    /// Tag for [`Event::Resize`].
    Resize,
    /// Tag for [`Event::Error`].
    Error,
}

/// A keyboard event: a logical key plus active modifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Active modifiers.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Construct a key event.
    pub fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Construct a key event with no modifiers.
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// True if Ctrl is held.
    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// True if Alt is held.
    pub fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// True if Shift is held.
    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// True if a platform "meta" key (Cmd/Super/Windows) is held.
    pub fn meta(&self) -> bool {
        self.modifiers.contains(Modifiers::META)
    }
}

/// A logical key: a Unicode rune, or one of the named keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    /// Enter / Return.
    Enter,
    /// Tab.
    Tab,
    /// Escape.
    Escape,
    /// Space.
    Space,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Insert.
    Insert,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Function key, 1 through 12.
    F(u8),
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Enter => write!(f, "Enter"),
            KeyCode::Tab => write!(f, "Tab"),
            KeyCode::Escape => write!(f, "Escape"),
            KeyCode::Space => write!(f, "Space"),
            KeyCode::Backspace => write!(f, "Backspace"),
            KeyCode::Delete => write!(f, "Delete"),
            KeyCode::Insert => write!(f, "Insert"),
            KeyCode::Home => write!(f, "Home"),
            KeyCode::End => write!(f, "End"),
            KeyCode::PageUp => write!(f, "PageUp"),
            KeyCode::PageDown => write!(f, "PageDown"),
            KeyCode::Up => write!(f, "Up"),
            KeyCode::Down => write!(f, "Down"),
            KeyCode::Left => write!(f, "Left"),
            KeyCode::Right => write!(f, "Right"),
            KeyCode::F(n) => write!(f, "F{n}"),
        }
    }
}

/// Keyboard modifier flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self(0);
    /// Shift.
    pub const SHIFT: Self = Self(1);
    /// Ctrl.
    pub const CTRL: Self = Self(2);
    /// Alt/Option.
    pub const ALT: Self = Self(4);
    /// Super/Cmd/Windows.
    pub const META: Self = Self(8);

    /// True if this set contains every flag in `other`.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0 && other.0 != 0
    }

    /// Union of two modifier sets.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// The button or wheel direction of a mouse action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button press.
    Left,
    /// Middle button press.
    Middle,
    /// Right button press.
    Right,
    /// Scroll wheel up.
    WheelUp,
    /// Scroll wheel down.
    WheelDown,
    /// Any button release.
    Release,
}

/// A mouse event: a point in terminal coordinates plus a button code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseEvent {
    /// Column, zero-based.
    pub x: u16,
    /// Row, zero-based.
    pub y: u16,
    /// The button or wheel action.
    pub button: MouseButton,
    /// Active modifiers.
    pub modifiers: Modifiers,
}

impl MouseEvent {
    /// Translate this event into a coordinate system whose origin sits
    /// at `origin` in this event's current coordinates, as the
    /// container tree does before delivering a mouse event to a
    /// widget- or container-scoped recipient.
    #[must_use]
    pub fn translated(self, origin_x: u16, origin_y: u16) -> Self {
        Self {
            x: self.x.saturating_sub(origin_x),
            y: self.y.saturating_sub(origin_y),
            ..self
        }
    }
}

// -- crossterm conversions, used by the crossterm terminal back end --

impl From<crossterm::event::Event> for Event {
    fn from(ct: crossterm::event::Event) -> Self {
        match ct {
            crossterm::event::Event::Key(key) => Event::Key(key.into()),
            crossterm::event::Event::Mouse(mouse) => Event::Mouse(mouse.into()),
            crossterm::event::Event::Resize(w, h) => Event::Resize(w, h),
            _ => Event::Resize(0, 0), // FocusGained/Lost/Paste carry no geometry; ignored upstream
        }
    }
}

impl From<crossterm::event::KeyEvent> for KeyEvent {
    fn from(ct: crossterm::event::KeyEvent) -> Self {
        Self {
            code: ct.code.into(),
            modifiers: ct.modifiers.into(),
        }
    }
}

impl From<crossterm::event::KeyCode> for KeyCode {
    fn from(ct: crossterm::event::KeyCode) -> Self {
        match ct {
            crossterm::event::KeyCode::Char(' ') => KeyCode::Space,
            crossterm::event::KeyCode::Char(c) => KeyCode::Char(c),
            crossterm::event::KeyCode::Enter => KeyCode::Enter,
            crossterm::event::KeyCode::Tab => KeyCode::Tab,
            crossterm::event::KeyCode::Backspace => KeyCode::Backspace,
            crossterm::event::KeyCode::Delete => KeyCode::Delete,
            crossterm::event::KeyCode::Insert => KeyCode::Insert,
            crossterm::event::KeyCode::Esc => KeyCode::Escape,
            crossterm::event::KeyCode::Up => KeyCode::Up,
            crossterm::event::KeyCode::Down => KeyCode::Down,
            crossterm::event::KeyCode::Left => KeyCode::Left,
            crossterm::event::KeyCode::Right => KeyCode::Right,
            crossterm::event::KeyCode::Home => KeyCode::Home,
            crossterm::event::KeyCode::End => KeyCode::End,
            crossterm::event::KeyCode::PageUp => KeyCode::PageUp,
            crossterm::event::KeyCode::PageDown => KeyCode::PageDown,
            crossterm::event::KeyCode::F(n) => KeyCode::F(n),
            _ => KeyCode::Escape,
        }
    }
}

impl From<crossterm::event::KeyModifiers> for Modifiers {
    fn from(ct: crossterm::event::KeyModifiers) -> Self {
        let mut m = Modifiers::NONE;
        if ct.contains(crossterm::event::KeyModifiers::SHIFT) {
            m = m | Modifiers::SHIFT;
        }
        if ct.contains(crossterm::event::KeyModifiers::CONTROL) {
            m = m | Modifiers::CTRL;
        }
        if ct.contains(crossterm::event::KeyModifiers::ALT) {
            m = m | Modifiers::ALT;
        }
        if ct.contains(crossterm::event::KeyModifiers::SUPER) {
            m = m | Modifiers::META;
        }
        m
    }
}

impl From<crossterm::event::MouseEvent> for MouseEvent {
    fn from(ct: crossterm::event::MouseEvent) -> Self {
        Self {
            x: ct.column,
            y: ct.row,
            button: button_from(ct.kind),
            modifiers: ct.modifiers.into(),
        }
    }
}

fn button_from(kind: crossterm::event::MouseEventKind) -> MouseButton {
    use crossterm::event::{MouseButton as CtButton, MouseEventKind as CtKind};
    match kind {
        CtKind::Down(CtButton::Left) | CtKind::Drag(CtButton::Left) => MouseButton::Left,
        CtKind::Down(CtButton::Middle) | CtKind::Drag(CtButton::Middle) => MouseButton::Middle,
        CtKind::Down(CtButton::Right) | CtKind::Drag(CtButton::Right) => MouseButton::Right,
        CtKind::Up(_) | CtKind::Moved => MouseButton::Release,
        CtKind::ScrollUp => MouseButton::WheelUp,
        CtKind::ScrollDown => MouseButton::WheelDown,
        _ => MouseButton::Release,
    }
}
