//! The abstract terminal back end the engine draws to and reads events
//! from (§6's `Terminal` contract). Concrete back ends live in
//! [`crossterm_backend`] and [`test_backend`]; the container tree and
//! run loop never depend on either directly, only on this trait.

pub mod crossterm_backend;
pub mod test_backend;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::event::Event;
use crate::geometry::{Point, Rect, Size};
use crate::style::CellOptions;

pub use crossterm_backend::CrosstermTerminal;
pub use test_backend::TestTerminal;

/// The contract an input/output back end must meet for the engine to
/// drive it. Implementations own a back buffer and a cursor; `flush`
/// is the only operation that must reach the physical device
/// atomically.
#[allow(async_fn_in_trait)]
pub trait Terminal: Send {
    /// Current size in cells.
    fn size(&self) -> Size;

    /// The rectangle `[0,W) x [0,H)` for the current size.
    fn area(&self) -> Rect {
        self.size().area()
    }

    /// Reset every back-buffer cell to blank with `options`.
    fn clear(&mut self, options: CellOptions) -> Result<()>;

    /// Write one back-buffer cell, following the same full-width/partial
    /// pairing rules as [`crate::buffer::Buffer::set`].
    fn set_cell(&mut self, point: Point, rune: char, options: CellOptions) -> Result<()>;

    /// Move the cursor to `point`. Back ends that cannot position a
    /// cursor may treat this as a no-op.
    fn set_cursor(&mut self, point: Point) -> Result<()>;

    /// Hide the cursor. Back ends that cannot hide a cursor may treat
    /// this as a no-op.
    fn hide_cursor(&mut self) -> Result<()>;

    /// Publish the back buffer to the physical terminal atomically.
    fn flush(&mut self) -> Result<()>;

    /// Block until the next input event, or until `cancel` fires (in
    /// which case this should still return promptly; callers select
    /// against cancellation separately, so a back end that cannot
    /// observe `cancel` mid-read is acceptable as long as it checks it
    /// between reads).
    ///
    /// `where Self: Sized` keeps this method out of the vtable so
    /// `Terminal` stays usable as `&mut dyn Terminal` for drawing (the
    /// container tree never reads events); the run loop, which does,
    /// holds a concrete back end instead.
    async fn event(&mut self, cancel: &CancelToken) -> Result<Option<Event>>
    where
        Self: Sized;

    /// Release the terminal (restore cooked mode, disable mouse
    /// capture, and so on). Called exactly once, on every exit path.
    fn close(&mut self) -> Result<()>;
}
