//! An in-memory terminal back end for the test suite and the
//! end-to-end scenarios of `spec.md` §8.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Notify;

use crate::buffer::Buffer;
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::event::Event;
use crate::geometry::{Point, Size};
use crate::style::CellOptions;

use super::Terminal;

/// A terminal back end whose back buffer and event stream are plain
/// in-memory values a test can push into and inspect.
pub struct TestTerminal {
    back: Buffer,
    queue: VecDeque<Event>,
    notify: Arc<Notify>,
    cursor: Option<Point>,
    cursor_hidden: bool,
    flushes: u32,
    closed: bool,
}

impl TestTerminal {
    /// A terminal of the given size with no queued events.
    pub fn new(size: Size) -> Self {
        Self {
            back: Buffer::new(size),
            queue: VecDeque::new(),
            notify: Arc::new(Notify::new()),
            cursor: None,
            cursor_hidden: false,
            flushes: 0,
            closed: false,
        }
    }

    /// Queue an event for the next [`Terminal::event`] call to return,
    /// waking anyone already waiting.
    pub fn push_event(&mut self, event: Event) {
        self.queue.push_back(event);
        self.notify.notify_waiters();
    }

    /// Resize the back buffer (discarding its contents, per
    /// [`Buffer::new`]'s replacement semantics) and queue the matching
    /// [`Event::Resize`].
    pub fn resize(&mut self, size: Size) {
        self.back = Buffer::new(size);
        self.push_event(Event::Resize(size.width, size.height));
    }

    /// The current back buffer, for assertions.
    pub fn buffer(&self) -> &Buffer {
        &self.back
    }

    /// Number of completed [`Terminal::flush`] calls.
    pub fn flush_count(&self) -> u32 {
        self.flushes
    }

    /// The last cursor position set, if any and not hidden.
    pub fn cursor(&self) -> Option<Point> {
        if self.cursor_hidden { None } else { self.cursor }
    }

    /// Whether [`Terminal::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Terminal for TestTerminal {
    fn size(&self) -> Size {
        self.back.size()
    }

    fn clear(&mut self, options: CellOptions) -> Result<()> {
        self.back.clear(options);
        Ok(())
    }

    fn set_cell(&mut self, point: Point, rune: char, options: CellOptions) -> Result<()> {
        self.back.set(point, rune, options)
    }

    fn set_cursor(&mut self, point: Point) -> Result<()> {
        self.cursor = Some(point);
        self.cursor_hidden = false;
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        self.cursor_hidden = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }

    async fn event(&mut self, cancel: &CancelToken) -> Result<Option<Event>> {
        let notify = self.notify.clone();
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Ok(Some(event));
            }
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Ok(None),
                () = notify.notified() => {}
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_the_requested_size() {
        let term = TestTerminal::new(Size::new(80, 24));
        assert_eq!(term.size(), Size::new(80, 24));
    }

    #[tokio::test]
    async fn event_returns_queued_events_in_order() {
        let mut term = TestTerminal::new(Size::new(10, 10));
        term.push_event(Event::Resize(10, 10));
        term.push_event(Event::Error("x".into()));
        let cancel = CancelToken::new();
        assert_eq!(term.event(&cancel).await.unwrap(), Some(Event::Resize(10, 10)));
        assert_eq!(
            term.event(&cancel).await.unwrap(),
            Some(Event::Error("x".into()))
        );
    }

    #[tokio::test]
    async fn event_returns_none_on_cancellation() {
        let mut term = TestTerminal::new(Size::new(10, 10));
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(term.event(&cancel).await.unwrap(), None);
    }

    #[tokio::test]
    async fn cancel_after_one_millisecond_unblocks_an_empty_wait() {
        let mut term = TestTerminal::new(Size::new(10, 10));
        let cancel = CancelToken::new();
        let delayed = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            delayed.cancel();
        });
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            term.event(&cancel),
        )
        .await
        .expect("event() should return once cancelled, not hang");
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn resize_replaces_buffer_and_queues_event() {
        let mut term = TestTerminal::new(Size::new(10, 10));
        term.resize(Size::new(20, 5));
        assert_eq!(term.buffer().size(), Size::new(20, 5));
    }
}
