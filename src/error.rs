//! Crate-wide error type.

use thiserror::Error;

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, TermGridError>;

/// Conditions the engine distinguishes. Variant names describe the
/// condition, not an internal type.
#[derive(Debug, Error)]
pub enum TermGridError {
    /// A container tree was built with an invalid option value.
    #[error("invalid option value for `{option}`: {reason}")]
    InvalidOption {
        /// Name of the offending option.
        option: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Two containers in the same tree share an id.
    #[error("duplicate container id: `{0}`")]
    DuplicateId(String),

    /// `Update` was addressed to an id that does not exist in the tree.
    #[error("no container with id `{0}`")]
    IdNotFound(String),

    /// A split container was given both a horizontal and vertical split,
    /// or a leaf was given a split position.
    #[error("illegal container tree shape: {0}")]
    IllegalShape(String),

    /// A widget was placed on a container that already has children.
    #[error("cannot place a widget on an internal container")]
    WidgetOnInternalContainer,

    /// Focus groups form a cycle or reference an undefined group.
    #[error("circular or undefined focus group definition: {0}")]
    InvalidFocusGroup(String),

    /// A point or rectangle fell outside a buffer's bounds.
    #[error("point {point} out of bounds for buffer of size {size}")]
    OutOfBounds {
        /// The offending point, formatted.
        point: String,
        /// The buffer's size, formatted.
        size: String,
    },

    /// A full-width rune was written at the last column of a buffer or
    /// canvas, leaving no room for its partial cell.
    #[error("no room for full-width rune at column {0}: buffer edge reached")]
    NoRoomForFullWidth(u16),

    /// A widget's negotiated rectangle is smaller than its minimum size.
    #[error("widget minimum size exceeds negotiated rectangle")]
    SizeUnderflow,

    /// A widget's `draw` returned an error.
    #[error("widget draw failed: {0}")]
    WidgetDraw(String),

    /// A widget's `keyboard` or `mouse` callback returned an error.
    #[error("widget event handling failed: {0}")]
    WidgetEvent(String),

    /// The terminal back end reported an I/O failure.
    #[error("terminal I/O error: {0}")]
    TerminalIo(#[from] std::io::Error),

    /// A canvas apply was aborted partway through; the target buffer is
    /// unchanged.
    #[error("canvas apply aborted: {0}")]
    ApplyAborted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_id_message() {
        let e = TermGridError::DuplicateId("main".into());
        assert_eq!(e.to_string(), "duplicate container id: `main`");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::other("boom");
        let e: TermGridError = io.into();
        assert!(matches!(e, TermGridError::TerminalIo(_)));
    }
}
