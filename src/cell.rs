//! The atom of display: one rune plus display options.

use unicode_width::UnicodeWidthChar;

use crate::style::CellOptions;

/// One character position in a [`crate::buffer::Buffer`] or
/// [`crate::canvas::Canvas`].
///
/// A cell is either blank, a narrow (single-column) rune, the anchor of
/// a full-width (double-column) rune, or the partial cell immediately
/// following such an anchor. Partiality is a property of the cell
/// itself rather than something inferred from its neighbours: a partial
/// cell always has no rune of its own and carries a copy of its
/// anchor's options.
///
/// Only [`crate::buffer::Buffer`] and [`crate::canvas::Canvas`] mutate
/// cells, and only in ways that preserve the anchor/partial pairing
/// invariant; this type exposes no public constructor that could
/// violate it.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Cell {
    rune: Option<char>,
    partial: bool,
    options: CellOptions,
}

impl Cell {
    /// A blank cell with default options.
    pub fn blank() -> Self {
        Self::default()
    }

    pub(crate) fn blank_with_options(options: CellOptions) -> Self {
        Self {
            rune: None,
            partial: false,
            options,
        }
    }

    pub(crate) fn narrow(rune: char, options: CellOptions) -> Self {
        Self {
            rune: Some(rune),
            partial: false,
            options,
        }
    }

    pub(crate) fn anchor(rune: char, options: CellOptions) -> Self {
        Self {
            rune: Some(rune),
            partial: false,
            options,
        }
    }

    pub(crate) fn partial(anchor_options: CellOptions) -> Self {
        Self {
            rune: None,
            partial: true,
            options: anchor_options,
        }
    }

    /// The rune occupying this cell, or `None` if blank or partial.
    pub fn rune(&self) -> Option<char> {
        self.rune
    }

    /// The display options for this cell.
    pub fn options(&self) -> &CellOptions {
        &self.options
    }

    /// True if this cell is the partial half of a preceding full-width
    /// anchor.
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// True if this cell holds no rune and is not a partial cell.
    pub fn is_blank(&self) -> bool {
        self.rune.is_none() && !self.partial
    }

    /// Column width this cell's rune occupies: 0 for blank/partial, 1
    /// for a narrow rune, 2 for a full-width anchor.
    pub fn width(&self) -> u16 {
        match self.rune {
            None => 0,
            Some(c) if is_full_width(c) => 2,
            Some(_) => 1,
        }
    }
}

/// True if `rune` occupies two terminal columns.
pub(crate) fn is_full_width(rune: char) -> bool {
    UnicodeWidthChar::width(rune).unwrap_or(1) >= 2
}
