// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

/// One terminal character cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: None,
        bg: None,
        bold: false,
    };

    pub fn glyph(ch: char, fg: Option<Color>, bg: Option<Color>) -> Self {
        Self {
            ch,
            fg,
            bg,
            bold: false,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::BLANK
    }
}
