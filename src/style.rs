//! Display options carried by a cell.

use crate::color::Color;

/// The display attributes a [`crate::cell::Cell`] carries alongside its
/// rune.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellOptions {
    /// Foreground color.
    pub fg: Option<Color>,
    /// Background color.
    pub bg: Option<Color>,
    /// Bold text.
    pub bold: bool,
    /// Italic text.
    pub italic: bool,
    /// Underlined text.
    pub underline: bool,
    /// Foreground/background swapped.
    pub inverse: bool,
    /// Strikethrough text.
    pub strikethrough: bool,
}

impl CellOptions {
    /// An empty set of options: no color, no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the foreground color.
    #[must_use]
    pub fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color.
    #[must_use]
    pub fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    /// Set bold.
    #[must_use]
    pub fn bold(mut self, val: bool) -> Self {
        self.bold = val;
        self
    }

    /// Set italic.
    #[must_use]
    pub fn italic(mut self, val: bool) -> Self {
        self.italic = val;
        self
    }

    /// Set underline.
    #[must_use]
    pub fn underline(mut self, val: bool) -> Self {
        self.underline = val;
        self
    }

    /// Set inverse video.
    #[must_use]
    pub fn inverse(mut self, val: bool) -> Self {
        self.inverse = val;
        self
    }

    /// Set strikethrough.
    #[must_use]
    pub fn strikethrough(mut self, val: bool) -> Self {
        self.strikethrough = val;
        self
    }

    /// True if no attributes and no colors are set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&CellOptions> for crossterm::style::ContentStyle {
    fn from(opts: &CellOptions) -> Self {
        use crossterm::style::{Attribute, ContentStyle};

        let mut cs = ContentStyle::new();
        if let Some(fg) = opts.fg {
            cs.foreground_color = Some(fg.into());
        }
        if let Some(bg) = opts.bg {
            cs.background_color = Some(bg.into());
        }
        if opts.bold {
            cs.attributes.set(Attribute::Bold);
        }
        if opts.italic {
            cs.attributes.set(Attribute::Italic);
        }
        if opts.underline {
            cs.attributes.set(Attribute::Underlined);
        }
        if opts.inverse {
            cs.attributes.set(Attribute::Reverse);
        }
        if opts.strikethrough {
            cs.attributes.set(Attribute::CrossedOut);
        }
        cs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::NamedColor;

    #[test]
    fn builder_pattern() {
        let s = CellOptions::new()
            .fg(Color::Named(NamedColor::Red))
            .bold(true)
            .italic(true);
        assert_eq!(s.fg, Some(Color::Named(NamedColor::Red)));
        assert!(s.bold);
        assert!(s.italic);
        assert!(!s.underline);
    }

    #[test]
    fn default_is_empty() {
        assert!(CellOptions::new().is_empty());
    }

    #[test]
    fn crossterm_conversion() {
        let s = CellOptions::new()
            .fg(Color::Rgb { r: 1, g: 2, b: 3 })
            .bold(true);
        let cs: crossterm::style::ContentStyle = (&s).into();
        assert_eq!(
            cs.foreground_color,
            Some(crossterm::style::Color::Rgb { r: 1, g: 2, b: 3 })
        );
    }
}
