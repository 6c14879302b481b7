//! A real terminal back end built on `crossterm`.

use std::io::{self, Write};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, EventStream};
use crossterm::style::PrintStyledContent;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use futures::StreamExt;

use crate::buffer::Buffer;
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::event::Event;
use crate::geometry::{Point, Size};
use crate::style::CellOptions;

use super::Terminal;

/// A `crossterm`-backed terminal: enters the alternate screen and raw
/// mode on construction, reads input through an [`EventStream`], and
/// composites a full frame on every [`Terminal::flush`].
///
/// There is deliberately no incremental diffing against the previous
/// frame: the container tree already recomputes only what changed
/// (§4.1), and a full repaint keeps this back end's invariants simple.
pub struct CrosstermTerminal {
    back: Buffer,
    stream: EventStream,
    raw_mode: bool,
    cursor: Option<Point>,
    cursor_hidden: bool,
}

impl CrosstermTerminal {
    /// Enter the alternate screen, enable raw mode and mouse capture,
    /// and return a terminal sized to the current window.
    pub fn new() -> Result<Self> {
        let (width, height) = crossterm::terminal::size()?;
        let mut term = Self {
            back: Buffer::new(Size::new(width.max(1), height.max(1))),
            stream: EventStream::new(),
            raw_mode: false,
            cursor: None,
            cursor_hidden: false,
        };
        term.enter()?;
        Ok(term)
    }

    fn enter(&mut self) -> Result<()> {
        if self.raw_mode {
            return Ok(());
        }
        crossterm::terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        self.raw_mode = true;
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if !self.raw_mode {
            return Ok(());
        }
        execute!(
            io::stdout(),
            cursor::Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        crossterm::terminal::disable_raw_mode()?;
        self.raw_mode = false;
        Ok(())
    }
}

impl Terminal for CrosstermTerminal {
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
        let mut out = io::stdout();
        let area = self.back.area();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                let point = Point::new(x, y);
                let cell = self.back.get(point)?;
                if cell.is_partial() {
                    continue;
                }
                let Some(rune) = cell.rune() else {
                    continue;
                };
                let style: crossterm::style::ContentStyle = cell.options().into();
                queue!(
                    out,
                    cursor::MoveTo(x, y),
                    PrintStyledContent(style.apply(rune))
                )?;
            }
        }
        match self.cursor {
            Some(p) if !self.cursor_hidden => {
                queue!(out, cursor::MoveTo(p.x, p.y), cursor::Show)?;
            }
            _ => {
                queue!(out, cursor::Hide)?;
            }
        }
        out.flush()?;
        Ok(())
    }

    async fn event(&mut self, cancel: &CancelToken) -> Result<Option<Event>> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Ok(None),
            next = self.stream.next() => match next {
                Some(Ok(ct_event)) => {
                    if let crossterm::event::Event::Resize(w, h) = ct_event {
                        self.back = Buffer::new(Size::new(w.max(1), h.max(1)));
                    }
                    Ok(Some(ct_event.into()))
                }
                Some(Err(e)) => Ok(Some(Event::Error(e.to_string()))),
                None => Ok(None),
            },
        }
    }

    fn close(&mut self) -> Result<()> {
        self.leave()
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
