//! The color values a cell's style may carry.
//!
//! Color selection (palettes, hex parsing, theme lookup) is assumed to
//! live outside this crate as a pure-function helper; this module only
//! carries the value type cells and styles are built from, plus the
//! conversion a concrete terminal back end needs.

/// A terminal color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Color {
    /// True color RGB.
    Rgb {
        /// Red component.
        r: u8,
        /// Green component.
        g: u8,
        /// Blue component.
        b: u8,
    },
    /// 256-color palette index.
    Indexed(u8),
    /// Named ANSI color.
    Named(NamedColor),
    /// Reset to the terminal's default color.
    Reset,
}

/// The 16 standard ANSI colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NamedColor {
    /// Black (0).
    Black,
    /// Red (1).
    Red,
    /// Green (2).
    Green,
    /// Yellow (3).
    Yellow,
    /// Blue (4).
    Blue,
    /// Magenta (5).
    Magenta,
    /// Cyan (6).
    Cyan,
    /// White (7).
    White,
    /// Bright black / dark gray (8).
    BrightBlack,
    /// Bright red (9).
    BrightRed,
    /// Bright green (10).
    BrightGreen,
    /// Bright yellow (11).
    BrightYellow,
    /// Bright blue (12).
    BrightBlue,
    /// Bright magenta (13).
    BrightMagenta,
    /// Bright cyan (14).
    BrightCyan,
    /// Bright white (15).
    BrightWhite,
}

impl From<Color> for crossterm::style::Color {
    fn from(color: Color) -> Self {
        match color {
            Color::Rgb { r, g, b } => crossterm::style::Color::Rgb { r, g, b },
            Color::Indexed(i) => crossterm::style::Color::AnsiValue(i),
            Color::Named(n) => match n {
                NamedColor::Black => crossterm::style::Color::Black,
                NamedColor::Red => crossterm::style::Color::DarkRed,
                NamedColor::Green => crossterm::style::Color::DarkGreen,
                NamedColor::Yellow => crossterm::style::Color::DarkYellow,
                NamedColor::Blue => crossterm::style::Color::DarkBlue,
                NamedColor::Magenta => crossterm::style::Color::DarkMagenta,
                NamedColor::Cyan => crossterm::style::Color::DarkCyan,
                NamedColor::White => crossterm::style::Color::Grey,
                NamedColor::BrightBlack => crossterm::style::Color::DarkGrey,
                NamedColor::BrightRed => crossterm::style::Color::Red,
                NamedColor::BrightGreen => crossterm::style::Color::Green,
                NamedColor::BrightYellow => crossterm::style::Color::Yellow,
                NamedColor::BrightBlue => crossterm::style::Color::Blue,
                NamedColor::BrightMagenta => crossterm::style::Color::Magenta,
                NamedColor::BrightCyan => crossterm::style::Color::Cyan,
                NamedColor::BrightWhite => crossterm::style::Color::White,
            },
            Color::Reset => crossterm::style::Color::Reset,
        }
    }
}

impl From<&Color> for crossterm::style::Color {
    fn from(color: &Color) -> Self {
        (*color).into()
    }
}
