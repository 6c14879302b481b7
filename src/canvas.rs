//! A movable, clipped view a widget draws into, bound to a rectangle
//! inside a parent [`Buffer`].

use crate::buffer::Buffer;
use crate::cell::Cell;
use crate::error::{Result, TermGridError};
use crate::geometry::{Point, Rect, Size};
use crate::style::CellOptions;

/// A logical drawing surface with its own origin at (0,0), bound to a
/// rectangular region of some parent [`Buffer`].
///
/// A canvas owns its cell storage exclusively; it never holds a pointer
/// into the parent. [`Canvas::apply`] copies its contents into the
/// parent's bound region in a single pass, so two canvases covering
/// overlapping regions of the same parent are legal — whichever applies
/// last wins for the overlap.
#[derive(Debug)]
pub struct Canvas {
    bounds: Rect,
    buffer: Buffer,
}

impl Canvas {
    /// Create a canvas covering `bounds` inside some parent buffer. The
    /// canvas starts out blank; it has no knowledge of what the parent
    /// currently holds there.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            buffer: Buffer::new(bounds.size),
        }
    }

    /// The canvas's size.
    pub fn size(&self) -> Size {
        self.buffer.size()
    }

    /// Where this canvas is bound within its parent.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Write `rune` with `options` at canvas-local `p`.
    pub fn set(&mut self, p: Point, rune: char, options: CellOptions) -> Result<()> {
        self.buffer.set(p, rune, options)
    }

    /// Update the style of the cell at `p` without changing its rune.
    pub fn set_cell_opts(&mut self, p: Point, options: CellOptions) -> Result<()> {
        let cell = self.buffer.get(p)?.clone();
        if let Some(r) = cell.rune() {
            return self.buffer.set(p, r, options);
        }
        if cell.is_partial() {
            // Restyling a partial cell in isolation would break the
            // anchor/partial pairing; restyle through the anchor.
            if p.x == 0 {
                return Ok(());
            }
            let anchor = Point::new(p.x - 1, p.y);
            let anchor_cell = self.buffer.get(anchor)?.clone();
            if let Some(r) = anchor_cell.rune() {
                return self.buffer.set(anchor, r, options);
            }
            return Ok(());
        }
        self.buffer.put_raw(p, Cell::blank_with_options(options))
    }

    /// Fill a sub-rectangle (clipped to the canvas) with `rune` and
    /// `options`.
    pub fn set_area_cells(&mut self, area: Rect, rune: char, options: CellOptions) -> Result<()> {
        let clipped = clip(area, self.buffer.area());
        for y in clipped.top()..clipped.bottom() {
            for x in clipped.left()..clipped.right() {
                self.set(Point::new(x, y), rune, options.clone())?;
            }
        }
        Ok(())
    }

    /// Restyle every cell in a sub-rectangle (clipped to the canvas)
    /// without changing runes.
    pub fn set_area_cell_opts(&mut self, area: Rect, options: CellOptions) -> Result<()> {
        let clipped = clip(area, self.buffer.area());
        for y in clipped.top()..clipped.bottom() {
            for x in clipped.left()..clipped.right() {
                self.set_cell_opts(Point::new(x, y), options.clone())?;
            }
        }
        Ok(())
    }

    /// Read the cell at canvas-local `p`.
    pub fn get(&self, p: Point) -> Result<&Cell> {
        self.buffer.get(p)
    }

    /// Reset every cell in the canvas to blank.
    pub fn clear(&mut self) {
        self.buffer.clear(CellOptions::new());
    }

    /// Copy this canvas's contents into `parent` at this canvas's bound
    /// rectangle, preserving anchor/partial pairings. Apply is atomic:
    /// if any individual cell write fails the parent is left unchanged.
    pub fn apply(&self, parent: &mut Buffer) -> Result<()> {
        let clipped = clip(self.bounds, parent.area());
        if clipped.is_empty() {
            return Ok(());
        }

        // Write into a scratch copy so a failure partway through never
        // leaves the real parent mutated.
        let mut scratch = parent.clone();
        for y in 0..clipped.size.height {
            for x in 0..clipped.size.width {
                let src = Point::new(x, y);
                let cell = self.buffer.get(src).map_err(|e| {
                    TermGridError::ApplyAborted(format!("reading canvas cell {src}: {e}"))
                })?;
                let dst = Point::new(clipped.left() + x, clipped.top() + y);
                scratch.put_raw(dst, cell.clone()).map_err(|e| {
                    TermGridError::ApplyAborted(format!("writing parent cell {dst}: {e}"))
                })?;
            }
        }
        *parent = scratch;
        Ok(())
    }
}

fn clip(rect: Rect, bounds: Rect) -> Rect {
    let left = rect.left().max(bounds.left());
    let top = rect.top().max(bounds.top());
    let right = rect.right().min(bounds.right());
    let bottom = rect.bottom().min(bounds.bottom());
    if right <= left || bottom <= top {
        return Rect::new(left, top, 0, 0);
    }
    Rect::new(left, top, right - left, bottom - top)
}
