//! Property-based tests for the invariants listed in the container
//! tree's split arithmetic and the buffer's full-width/partial
//! bookkeeping.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use termgrid::buffer::Buffer;
use termgrid::layout::{SplitPosition, solve};
use termgrid::{CellOptions, Point, Size};

proptest! {
    /// For any valid split with percentage p and container size total,
    /// the resulting child sizes sum back to total.
    #[test]
    fn percentage_split_children_sum_to_total(
        total in 0u16..=2000,
        p in 0u8..=100,
    ) {
        let (first, second) = solve(total, SplitPosition::Percentage(p));
        prop_assert_eq!(first + second, total);
    }

    /// A fixed split, however large, never produces a child larger than
    /// the container and never leaves the other child empty unless the
    /// container itself has fewer than two cells.
    #[test]
    fn fixed_split_clamped_within_bounds(
        total in 2u16..=2000,
        n in 0u16..=u16::MAX,
    ) {
        let (first, second) = solve(total, SplitPosition::Fixed(n));
        prop_assert_eq!(first + second, total);
        prop_assert!(first >= 1);
        prop_assert!(second >= 1);
    }

    /// After any sequence of `set` calls at random points with random
    /// runes, every cell is either blank, an anchor, or a partial whose
    /// immediate left neighbour on the same row is an anchor.
    #[test]
    fn buffer_set_sequence_preserves_anchor_partial_pairing(
        width in 2u16..=12,
        height in 1u16..=6,
        ops in prop::collection::vec(
            (0u16..12, 0u16..6, prop_oneof![Just('a'), Just('中'), Just(' ')]),
            0..40,
        ),
    ) {
        let mut buffer = Buffer::new(Size::new(width, height));
        for (x, y, rune) in ops {
            if x < width && y < height {
                let _ = buffer.set(Point::new(x, y), rune, CellOptions::new());
            }
        }
        for y in 0..height {
            for x in 0..width {
                let cell = buffer.get(Point::new(x, y)).unwrap();
                if cell.is_partial() {
                    prop_assert!(x > 0, "a partial cell can never be the first column of a row");
                    let anchor = buffer.get(Point::new(x - 1, y)).unwrap();
                    prop_assert_eq!(anchor.width(), 2, "a partial's left neighbour must be a full-width anchor");
                }
            }
        }
    }
}
