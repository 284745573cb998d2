// Copyright (c) 2026 rezky_nightky

use std::fmt;

/// A hue in degrees. Trails are always drawn at 100% saturation, 60% lightness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hue(pub u16);

impl Hue {
    pub const PALETTE: [Hue; 4] = [Hue(280), Hue(300), Hue(240), Hue(200)];
    pub const FALLBACK: Hue = Hue(280);

    pub fn degrees(self) -> u16 {
        self.0
    }

    /// Reads the hue back out of `hsl(H, ...)`, or a bare `H`.
    /// Anything else, including hues outside [`Hue::PALETTE`], yields
    /// [`Hue::FALLBACK`].
    pub fn from_css(s: &str) -> Hue {
        let s = s.trim();
        let digits = match s.strip_prefix("hsl(") {
            Some(rest) => match rest.split_once(',') {
                Some((d, _)) => d,
                None => return Hue::FALLBACK,
            },
            None => s,
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Hue::FALLBACK;
        }
        match digits.parse::<u16>() {
            Ok(deg) if Hue::PALETTE.contains(&Hue(deg)) => Hue(deg),
            _ => Hue::FALLBACK,
        }
    }

    pub fn to_css(self) -> String {
        format!("hsl({}, 100%, 60%)", self.0)
    }
}

impl fmt::Display for Hue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Shade {
    #[default]
    Background,
    Lit {
        hue: Hue,
        alpha: f32,
    },
}

impl Shade {
    pub fn lit(hue: Hue, alpha: f32) -> Self {
        Shade::Lit {
            hue,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn is_background(&self) -> bool {
        matches!(self, Shade::Background)
    }

    pub fn alpha(&self) -> f32 {
        match *self {
            Shade::Background => 0.0,
            Shade::Lit { alpha, .. } => alpha,
        }
    }
}

/// Row-major `rows x cols` buffer of shades.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    rows: u16,
    cols: u16,
    cells: Vec<Shade>,
}

impl Grid {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Shade::Background; rows as usize * cols as usize],
        }
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn index(&self, row: u16, col: u16) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    pub fn get(&self, row: u16, col: u16) -> Shade {
        self.index(row, col)
            .map(|i| self.cells[i])
            .unwrap_or_default()
    }

    pub fn set(&mut self, row: u16, col: u16, shade: Shade) {
        if let Some(i) = self.index(row, col) {
            self.cells[i] = shade;
        }
    }

    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_background()).count()
    }
}
