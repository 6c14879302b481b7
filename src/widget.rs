//! The contract every leaf of a [`crate::container`] tree must meet.
//!
//! A widget is a polymorphic value behind a trait object rather than a
//! class hierarchy: the engine never downcasts to a concrete widget
//! type, it only calls through the four operations below.

use crate::canvas::Canvas;
use crate::error::Result;
use crate::event::{KeyEvent, MouseEvent};
use crate::geometry::Size;

/// Whether, and how, a widget wants keyboard events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyboardScope {
    /// Never receives keyboard events.
    #[default]
    None,
    /// Receives keyboard events only while its leaf holds focus.
    Focused,
    /// Receives every keyboard event regardless of focus.
    Global,
}

/// Whether, and how, a widget wants mouse events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MouseScope {
    /// Never receives mouse events.
    #[default]
    None,
    /// Receives mouse events whose coordinates fall inside the
    /// widget's own negotiated rectangle, translated to widget-local
    /// coordinates.
    Widget,
    /// Receives mouse events anywhere inside the containing leaf's
    /// negotiated rectangle (which may be larger than the widget's own
    /// rectangle after alignment), translated relative to that
    /// rectangle's top-left.
    Container,
    /// Receives every mouse event with untranslated, terminal-relative
    /// coordinates.
    Global,
}

/// A widget's static capabilities and size preferences, returned by
/// [`Widget::options`].
///
/// `min_size`/`max_size` use 0 in a dimension to mean "no constraint"
/// (no minimum, unlimited maximum), matching §6's "0 = none" /
/// "0 = unlimited" convention. `aspect_ratio` of `(0, 0)` (the default)
/// means no ratio constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WidgetOptions {
    /// Minimum usable size; a negotiated rectangle smaller than this in
    /// either dimension causes the container tree to skip drawing the
    /// widget and draw the resize-needed glyph instead.
    pub min_size: Size,
    /// Maximum usable size; the negotiated rectangle is clamped to
    /// this before alignment. 0 in a dimension means unlimited.
    pub max_size: Size,
    /// Width:height aspect ratio the negotiated rectangle should be
    /// clamped to, as `(x, y)` meaning the ratio `x:y`. `(0, 0)` means
    /// no constraint.
    pub aspect_ratio: (u16, u16),
    /// Keyboard event scope.
    pub keyboard_scope: KeyboardScope,
    /// Mouse event scope.
    pub mouse_scope: MouseScope,
    /// If set while this widget's leaf holds focus, no other widget
    /// (not even one with global keyboard scope) receives a key that
    /// was offered to this one.
    pub exclusive_keyboard_on_focus: bool,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            min_size: Size::new(0, 0),
            max_size: Size::new(0, 0),
            aspect_ratio: (0, 0),
            keyboard_scope: KeyboardScope::None,
            mouse_scope: MouseScope::None,
            exclusive_keyboard_on_focus: false,
        }
    }
}

impl WidgetOptions {
    /// Start from the defaults (no events, no size constraints).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum size.
    #[must_use]
    pub fn min_size(mut self, size: Size) -> Self {
        self.min_size = size;
        self
    }

    /// Set the maximum size.
    #[must_use]
    pub fn max_size(mut self, size: Size) -> Self {
        self.max_size = size;
        self
    }

    /// Set the aspect ratio as `x:y`.
    #[must_use]
    pub fn aspect_ratio(mut self, x: u16, y: u16) -> Self {
        self.aspect_ratio = (x, y);
        self
    }

    /// Set the keyboard scope.
    #[must_use]
    pub fn keyboard_scope(mut self, scope: KeyboardScope) -> Self {
        self.keyboard_scope = scope;
        self
    }

    /// Set the mouse scope.
    #[must_use]
    pub fn mouse_scope(mut self, scope: MouseScope) -> Self {
        self.mouse_scope = scope;
        self
    }

    /// Set whether this widget claims a focused key exclusively.
    #[must_use]
    pub fn exclusive_keyboard_on_focus(mut self, val: bool) -> Self {
        self.exclusive_keyboard_on_focus = val;
        self
    }
}

/// Context passed alongside every call into a [`Widget`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WidgetMeta {
    /// Whether this widget's containing leaf currently holds focus.
    pub focused: bool,
}

impl WidgetMeta {
    /// Construct meta with the given focus state.
    pub fn new(focused: bool) -> Self {
        Self { focused }
    }
}

/// The outward shape every leaf of a container tree must implement.
///
/// The engine sees a widget only through this trait: concrete widgets
/// (bar charts, gauges, text inputs, and so on) are out of scope for
/// this crate. A widget instance is bound to at most one leaf; the
/// container tree enforces that at construction.
///
/// Implementations must be `Send`: the engine may call `draw` from the
/// task running a draw pass and `keyboard`/`mouse` from the task
/// delivering that event, and these calls move the trait object's
/// exclusive reference across task boundaries via the container tree's
/// single root lock.
pub trait Widget: Send {
    /// Draw into `canvas`, a fresh surface covering this widget's
    /// negotiated rectangle for this draw pass.
    fn draw(&mut self, canvas: &mut Canvas, meta: WidgetMeta) -> Result<()>;

    /// Handle a keyboard event. Only called if [`WidgetOptions::keyboard_scope`]
    /// requests it. The default does nothing.
    fn keyboard(&mut self, _event: &KeyEvent, _meta: WidgetMeta) -> Result<()> {
        Ok(())
    }

    /// Handle a mouse event, already translated into this widget's
    /// coordinate system unless [`WidgetOptions::mouse_scope`] is
    /// [`MouseScope::Global`]. Only called if the scope requests it.
    /// The default does nothing.
    fn mouse(&mut self, _event: &MouseEvent, _meta: WidgetMeta) -> Result<()> {
        Ok(())
    }

    /// Static capabilities and size preferences. Called once per draw
    /// pass during area negotiation, so it should be cheap.
    fn options(&self) -> WidgetOptions {
        WidgetOptions::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    struct Probe {
        draws: u32,
    }

    impl Widget for Probe {
        fn draw(&mut self, canvas: &mut Canvas, _meta: WidgetMeta) -> Result<()> {
            self.draws += 1;
            canvas.set(Point::new(0, 0), 'x', crate::style::CellOptions::new())
        }

        fn options(&self) -> WidgetOptions {
            WidgetOptions::new().min_size(Size::new(2, 2))
        }
    }

    #[test]
    fn default_options_want_nothing() {
        let opts = WidgetOptions::default();
        assert_eq!(opts.keyboard_scope, KeyboardScope::None);
        assert_eq!(opts.mouse_scope, MouseScope::None);
        assert_eq!(opts.min_size, Size::new(0, 0));
    }

    #[test]
    fn draw_mutates_widget_state() {
        let mut w = Probe { draws: 0 };
        let mut canvas = Canvas::new(crate::geometry::Rect::new(0, 0, 3, 3));
        w.draw(&mut canvas, WidgetMeta::new(true)).unwrap();
        assert_eq!(w.draws, 1);
        assert_eq!(canvas.get(Point::new(0, 0)).unwrap().rune(), Some('x'));
    }

    #[test]
    fn builder_sets_fields() {
        let opts = WidgetOptions::new()
            .min_size(Size::new(2, 2))
            .max_size(Size::new(10, 10))
            .aspect_ratio(16, 9)
            .keyboard_scope(KeyboardScope::Global)
            .mouse_scope(MouseScope::Container)
            .exclusive_keyboard_on_focus(true);
        assert_eq!(opts.min_size, Size::new(2, 2));
        assert_eq!(opts.aspect_ratio, (16, 9));
        assert_eq!(opts.keyboard_scope, KeyboardScope::Global);
        assert!(opts.exclusive_keyboard_on_focus);
    }
}
