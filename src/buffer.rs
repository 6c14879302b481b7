//! A row-major grid of cells, the back buffer of a terminal or the
//! backing store of a [`crate::canvas::Canvas`].

use crate::cell::{self, Cell};
use crate::error::{Result, TermGridError};
use crate::geometry::{Point, Rect, Size};
use crate::style::CellOptions;

/// An owned 2-D grid of [`Cell`]s.
///
/// Resizable only by replacement: [`Buffer::new`] always starts from a
/// blank grid, and there is deliberately no in-place resize that would
/// carry old cells forward (see [`crate::canvas::Canvas::apply`] for how
/// content survives a resize).
#[derive(Clone, Debug)]
pub struct Buffer {
    size: Size,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a `width` x `height` grid of blank cells. Both dimensions
    /// must be at least 1.
    pub fn new(size: Size) -> Self {
        let width = size.width.max(1);
        let height = size.height.max(1);
        let size = Size::new(width, height);
        Self {
            size,
            cells: vec![Cell::blank(); width as usize * height as usize],
        }
    }

    /// Current size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// The rectangle [0,W) x [0,H) covering this buffer.
    pub fn area(&self) -> Rect {
        self.size.area()
    }

    fn index(&self, p: Point) -> Result<usize> {
        if p.x >= self.size.width || p.y >= self.size.height {
            return Err(TermGridError::OutOfBounds {
                point: p.to_string(),
                size: format!("{}x{}", self.size.width, self.size.height),
            });
        }
        Ok(p.y as usize * self.size.width as usize + p.x as usize)
    }

    /// Read the cell at `p`.
    pub fn get(&self, p: Point) -> Result<&Cell> {
        let i = self.index(p)?;
        Ok(&self.cells[i])
    }

    /// True if the cell at `p` is the partial half of a preceding
    /// full-width anchor.
    pub fn is_partial(&self, p: Point) -> Result<bool> {
        Ok(self.get(p)?.is_partial())
    }

    /// Write a blank cell, clearing any rune and resetting the anchor
    /// pairing. Used internally before overwriting an anchor so its old
    /// partial does not linger.
    fn set_blank(&mut self, p: Point) -> Result<()> {
        let i = self.index(p)?;
        self.cells[i] = Cell::blank();
        Ok(())
    }

    /// Write an already-formed cell verbatim, bypassing full-width
    /// pairing logic. Used when copying cells from a source that has
    /// already established a correct anchor/partial pairing, such as
    /// [`crate::canvas::Canvas::apply`].
    pub(crate) fn put_raw(&mut self, p: Point, cell: Cell) -> Result<()> {
        let i = self.index(p)?;
        self.cells[i] = cell;
        Ok(())
    }

    /// Write `rune` with `options` at `p`. For a full-width rune this
    /// also marks the next cell on the same row as partial; fails if `p`
    /// is the last column (no room for the partial) without modifying
    /// the buffer.
    ///
    /// If `p` lands on a cell that is currently a partial, its
    /// preceding anchor is cleared to blank first, matching the rule
    /// that setting any rune at a partial position first clears the
    /// anchor it belonged to. Symmetrically, if `p` lands on a cell
    /// that is currently a full-width anchor, its trailing partial is
    /// cleared to blank first, so a narrow (or new full-width) rune
    /// never leaves a stale partial with no anchor behind it.
    pub fn set(&mut self, p: Point, rune: char, options: CellOptions) -> Result<()> {
        let i = self.index(p)?;
        if self.cells[i].is_partial() && p.x > 0 {
            self.set_blank(Point::new(p.x - 1, p.y))?;
        } else if self.cells[i].width() == 2 && p.x + 1 < self.size.width {
            self.set_blank(Point::new(p.x + 1, p.y))?;
        }

        if cell::is_full_width(rune) {
            if p.x + 1 >= self.size.width {
                return Err(TermGridError::NoRoomForFullWidth(p.x));
            }
            let i = self.index(p)?;
            self.cells[i] = Cell::anchor(rune, options.clone());
            let next = self.index(Point::new(p.x + 1, p.y))?;
            self.cells[next] = Cell::partial(options);
        } else {
            let i = self.index(p)?;
            self.cells[i] = Cell::narrow(rune, options);
        }
        Ok(())
    }

    /// Reset every cell to blank, stamped with the given options so a
    /// themed blank area (e.g. a colored background) can be painted
    /// without writing a rune into each cell individually.
    pub fn clear(&mut self, options: CellOptions) {
        let blank = Cell::blank_with_options(options);
        for c in &mut self.cells {
            *c = blank.clone();
        }
    }
}
