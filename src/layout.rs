//! The pure geometry primitive the container tree's area computation is
//! built on: splitting one rectangle into two along an axis.

use crate::geometry::{Axis, Rect};

/// Where a split divides its container along the split axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitPosition {
    /// A percentage in (0, 100) of the container's current size along
    /// the split axis.
    Percentage(u8),
    /// A fixed cell count measured from the leading edge (top for a
    /// horizontal split, left for a vertical split).
    Fixed(u16),
    /// A fixed cell count measured from the trailing edge (bottom or
    /// right).
    FixedFromEnd(u16),
}

/// Split `total` cells into (first, second) at `position`, truncating
/// percentage splits toward zero and clamping fixed splits to
/// `(0, total - 1)` so both children always get at least one cell.
pub fn solve(total: u16, position: SplitPosition) -> (u16, u16) {
    if total == 0 {
        return (0, 0);
    }
    let first = match position {
        SplitPosition::Percentage(p) => {
            let p = u32::from(p.min(100));
            let total = u32::from(total);
            ((total * p) / 100) as u16
        }
        SplitPosition::Fixed(n) => n,
        SplitPosition::FixedFromEnd(n) => total.saturating_sub(n),
    };
    let first = first.clamp(0, total.saturating_sub(1).max(0));
    let first = if total >= 2 { first.max(1) } else { first };
    (first, total - first)
}

/// Divide `area` into a leading and trailing rectangle along `axis` at
/// `position`.
pub fn split_rect(area: Rect, axis: Axis, position: SplitPosition) -> (Rect, Rect) {
    match axis {
        Axis::Horizontal => {
            let (top, bottom) = solve(area.size.height, position);
            (
                Rect::new(area.position.x, area.position.y, area.size.width, top),
                Rect::new(
                    area.position.x,
                    area.position.y + top,
                    area.size.width,
                    bottom,
                ),
            )
        }
        Axis::Vertical => {
            let (left, right) = solve(area.size.width, position);
            (
                Rect::new(area.position.x, area.position.y, left, area.size.height),
                Rect::new(
                    area.position.x + left,
                    area.position.y,
                    right,
                    area.size.height,
                ),
            )
        }
    }
}
